use crate::ffmpeg::error::{ProbeError, ProbeResult};
use log::debug;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Runs ffprobe on a source file and returns its total duration in seconds.
///
/// A source whose duration is absent or zero cannot be split and is
/// reported as unusable.
pub async fn probe_duration(path: &Path, cmd: &str) -> ProbeResult<f64> {
    let output = Command::new(cmd)
        .args([
            "-show_format",
            "-show_streams",
            "-of",
            "json",
            "-loglevel",
            "error",
            "-hide_banner",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .await?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();

    if !output.status.success() {
        return Err(ProbeError::ProbeFailure(if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr.to_string()
        }));
    }
    if !stderr.is_empty() {
        return Err(ProbeError::ProbeFailure(stderr.to_string()));
    }

    let parsed: ProbeOutput = serde_json::from_slice(&output.stdout)?;

    debug!("Probed {:?}: duration {:?}", path, parsed.format.duration);

    parsed
        .format
        .duration
        .and_then(|duration| duration.parse::<f64>().ok())
        .filter(|duration| *duration > 0.0)
        .ok_or_else(|| ProbeError::UnusableSource(path.to_path_buf()))
}
