use crate::commands::split::ProgressMode;
use crate::ffmpeg::error::{FfmpegError, FfmpegResult};
use crate::splitter::recipe::Recipe;
use chrono::Local;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

pub mod error;
pub mod probe;

/// Executes split recipes through the external ffmpeg tool, one at a time
/// and in emission order. ffmpeg's own stderr goes to a per-sheet log file
/// so the console stays readable.
pub struct FfmpegRunner {
    multi: MultiProgress,
    meter: ProgressMode,
    log_path: PathBuf,
}

impl FfmpegRunner {
    pub fn new(multi: MultiProgress, meter: ProgressMode, log_path: PathBuf) -> Self {
        Self {
            multi,
            meter,
            log_path,
        }
    }

    /// Truncates the log file left over from a previous run.
    pub async fn clear_log(&self) -> FfmpegResult<()> {
        tokio::fs::write(&self.log_path, b"").await?;
        Ok(())
    }

    pub async fn run(&self, recipe: &Recipe) -> FfmpegResult<()> {
        let (cmd, args) = recipe
            .args
            .split_first()
            .ok_or(FfmpegError::EmptyCommand)?;

        self.append_log_header(&recipe.args.join(" ")).await?;

        match self.meter {
            ProgressMode::Bar => self.run_with_progress(cmd, args, recipe.duration).await,
            ProgressMode::Plain => self.run_plain(cmd, args).await,
        }
    }

    async fn append_log_header(&self, cmdline: &str) -> FfmpegResult<()> {
        let mut log = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await?;
        let header = format!(
            "\n[{}] Command: {cmdline}\n=======================================================\n\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
        );
        log.write_all(header.as_bytes()).await?;
        Ok(())
    }

    /// Runs ffmpeg with `-progress pipe:1` output driving an indicatif bar
    /// sized to the expected track duration.
    async fn run_with_progress(
        &self,
        cmd: &str,
        args: &[String],
        duration: f64,
    ) -> FfmpegResult<()> {
        let stderr_log = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        let mut child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::from(stderr_log))
            .spawn()?;

        let bar = self
            .multi
            .add(ProgressBar::new(duration.round().max(1.0) as u64));
        bar.set_style(progress_style());

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                // ffmpeg reports elapsed output time in microseconds.
                if let Some(value) = line.strip_prefix("out_time_ms=")
                    && let Ok(micros) = value.trim().parse::<u64>()
                {
                    bar.set_position(micros / 1_000_000);
                }
            }
        }

        let status = child.wait().await;
        bar.finish_and_clear();
        self.multi.remove(&bar);
        let status = status?;

        if !status.success() {
            return Err(FfmpegError::FfmpegFailure {
                status: status.code().unwrap_or(-1),
                log: self.log_path.clone(),
            });
        }

        Ok(())
    }

    /// Runs ffmpeg with stderr inherited; its own loglevel decides how
    /// chatty the console gets.
    async fn run_plain(&self, cmd: &str, args: &[String]) -> FfmpegResult<()> {
        let status = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .await?;

        if !status.success() {
            return Err(FfmpegError::FfmpegFailure {
                status: status.code().unwrap_or(-1),
                log: self.log_path.clone(),
            });
        }

        Ok(())
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len}s ({eta})")
        .expect("valid progress template")
}
