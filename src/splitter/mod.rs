use crate::commands::split::{CollectionLayout, OverwritePolicy, ProgressMode, SplitCommand};
use crate::cue::CueParser;
use crate::cue::models::CueSheet;
use crate::ffmpeg::FfmpegRunner;
use crate::ffmpeg::probe::probe_duration;
use crate::splitter::error::{SplitterError, SplitterResult};
use crate::splitter::recipe::{Recipe, RecipeBuilder};
use crate::splitter::resolver::{ResolvedTrack, resolve_tracks};
use crate::util::fs::{
    collect_cue_files, is_cue_file, make_output_dirs, move_to_output_dir, remove_source_files,
};
use crate::util::sanitize;
use encoding_rs::Encoding;
use indicatif::MultiProgress;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

pub mod error;
pub mod recipe;
pub mod resolver;

/// Runs the split over every CUE sheet the command-line targets name.
/// A failing sheet is logged and skipped; the run as a whole fails when
/// nothing was found or any sheet failed.
pub async fn run(multi: MultiProgress, cmd: SplitCommand) -> anyhow::Result<()> {
    let files = collect_cue_files(&cmd.input, cmd.recursive).await?;

    for missing in &files.missing {
        warn!("No such file or directory: {missing:?}");
    }
    if files.found.is_empty() {
        anyhow::bail!("No CUE files found.");
    }

    let total = files.found.len();
    let mut failures = 0usize;

    for cue_path in &files.found {
        info!("Processing: {cue_path:?}");
        if let Err(err) = split_cue_sheet(&multi, &cmd, cue_path).await {
            error!("{err}");
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {total} CUE sheet(s) failed");
    }

    info!("Finished!");
    Ok(())
}

/// Splits one CUE sheet: parse, probe, resolve, then run one ffmpeg recipe
/// per track into a temporary directory and move the results over.
pub async fn split_cue_sheet(
    multi: &MultiProgress,
    cmd: &SplitCommand,
    cue_path: &Path,
) -> SplitterResult<()> {
    check_cue_file(cue_path)?;
    let cue_path = std::path::absolute(cue_path)?;
    let cue_dir = cue_path
        .parent()
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let encoding = cmd.characters_encoding.as_deref().and_then(|label| {
        let encoding = Encoding::for_label(label.as_bytes());
        if encoding.is_none() {
            warn!("Unknown character encoding label '{label}', using UTF-8");
        }
        encoding
    });

    let sheet = CueParser::from_file(&cue_path, encoding).await?.run()?;
    debug!(
        "Parsed {} file(s), {} track(s)",
        sheet.files.len(),
        sheet.track_count()
    );

    let durations = probe_sources(&sheet, &cue_dir, &cmd.ffprobe_cmd).await?;
    let tracks = resolve_tracks(&sheet, &cue_dir, &durations)?;

    let output_dir = resolve_output_dir(cmd, &cue_dir, &sheet)?;

    let builder = RecipeBuilder {
        ffmpeg_cmd: cmd.ffmpeg_cmd.clone(),
        loglevel: cmd.ffmpeg_loglevel.clone(),
        format: cmd.output_format.clone(),
        extra_params: cmd
            .ffmpeg_add_params
            .as_deref()
            .map(|params| params.split_whitespace().map(String::from).collect())
            .unwrap_or_default(),
        report_progress: cmd.progress_meter == ProgressMode::Bar,
    };

    if cmd.dry {
        for recipe in builder.build(&tracks, &output_dir)? {
            info!("{}", recipe.args.join(" "));
        }
        return Ok(());
    }

    let temp_dir = tempfile::Builder::new().prefix("cuesplit_").tempdir()?;
    let mut recipes = builder.build(&tracks, temp_dir.path())?;

    if !apply_overwrite_policy(&mut recipes, &output_dir, cmd.overwrite).await? {
        return Ok(());
    }
    if recipes.is_empty() {
        return Err(SplitterError::NoAudioTracks);
    }

    make_output_dirs(&output_dir).await?;

    let runner = FfmpegRunner::new(
        multi.clone(),
        cmd.progress_meter,
        ffmpeg_log_path(&cue_path, &output_dir),
    );
    runner.clear_log().await?;

    info!("Temporary target: {:?}", temp_dir.path());
    info!("Extracting audio tracks (type Ctrl+c to stop):");

    let total = recipes.len();
    for (idx, recipe) in recipes.iter().enumerate() {
        info!("TRACK {}/{} >> \"{}\" ...", idx + 1, total, recipe.output_name);
        runner.run(recipe).await?;
    }

    info!("...done extracting");
    info!("Move files to: {output_dir:?}");
    move_to_output_dir(temp_dir.path(), &output_dir).await?;

    if cmd.del_orig_files {
        let sources = distinct_sources(&tracks);
        if remove_source_files(&cue_path, &sources).await? {
            info!("Removed the CUE sheet and its source audio files");
        } else {
            warn!("Original files left in place, not all of them still exist");
        }
    }

    Ok(())
}

fn check_cue_file(path: &Path) -> SplitterResult<()> {
    if !is_cue_file(path) || !path.is_file() {
        return Err(SplitterError::InvalidCueFile(path.to_path_buf()));
    }
    Ok(())
}

/// Probes each referenced source file once. Missing files are logged and
/// left out of the map, which makes the resolver drop their tracks.
async fn probe_sources(
    sheet: &CueSheet,
    cue_dir: &Path,
    ffprobe_cmd: &str,
) -> SplitterResult<HashMap<PathBuf, f64>> {
    let mut durations = HashMap::new();

    for file in &sheet.files {
        let source = cue_dir.join(&file.path);
        if durations.contains_key(&source) {
            continue;
        }
        if !tokio::fs::try_exists(&source).await? {
            warn!("Not found: {source:?}");
            continue;
        }

        let total = probe_duration(&source, ffprobe_cmd).await?;
        durations.insert(source, total);
    }

    Ok(durations)
}

fn resolve_output_dir(
    cmd: &SplitCommand,
    cue_dir: &Path,
    sheet: &CueSheet,
) -> SplitterResult<PathBuf> {
    let mut output_dir = if cmd.output_dir == Path::new(".") {
        cue_dir.to_path_buf()
    } else {
        std::path::absolute(&cmd.output_dir)?
    };

    if let Some(layout) = cmd.collection {
        let author = collection_name(sheet.disc.performer.as_deref(), "Unknown Author");
        let album = collection_name(sheet.disc.album.as_deref(), "Unknown Album");
        output_dir = match layout {
            CollectionLayout::AuthorAlbum => output_dir.join(author).join(album),
            CollectionLayout::Author => output_dir.join(author),
            CollectionLayout::Album => output_dir.join(album),
        };
    }

    Ok(output_dir)
}

fn collection_name(value: Option<&str>, fallback: &str) -> String {
    let name = sanitize(value.unwrap_or_default());
    if name.is_empty() { fallback.to_string() } else { name }
}

fn ffmpeg_log_path(cue_path: &Path, output_dir: &Path) -> PathBuf {
    let stem = cue_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("cuesplit");
    output_dir.join(format!("{stem}.cuesplit.log"))
}

fn distinct_sources(tracks: &[ResolvedTrack]) -> Vec<PathBuf> {
    let mut sources = Vec::new();
    for track in tracks {
        if !sources.contains(&track.source) {
            sources.push(track.source.clone());
        }
    }
    sources
}

enum OverwriteChoice {
    Keep,
    Skip,
    Abort,
}

/// Applies the overwrite policy against the final output directory.
/// Returns `false` when the whole sheet should be skipped; with `ask`,
/// single tracks answered with `n` are dropped from the recipe list.
async fn apply_overwrite_policy(
    recipes: &mut Vec<Recipe>,
    output_dir: &Path,
    policy: OverwritePolicy,
) -> SplitterResult<bool> {
    match policy {
        OverwritePolicy::Always => {
            info!("Overwriting existing files as requested");
            Ok(true)
        }
        OverwritePolicy::Never => {
            for recipe in recipes.iter() {
                let target = output_dir.join(&recipe.output_name);
                if tokio::fs::try_exists(&target).await? {
                    info!("File already exists, skipping the sheet: {target:?}");
                    return Ok(false);
                }
            }
            Ok(true)
        }
        OverwritePolicy::Ask => {
            let mut keep = Vec::new();
            let mut always = false;
            let mut answers = BufReader::new(tokio::io::stdin()).lines();

            for recipe in recipes.drain(..) {
                let target = output_dir.join(&recipe.output_name);
                if always || !tokio::fs::try_exists(&target).await? {
                    keep.push(recipe);
                    continue;
                }

                warn!("File already exists: {target:?}");
                let choice = loop {
                    eprint!("Overwrite? [Y/n/always/never] > ");
                    let Some(answer) = answers.next_line().await? else {
                        break OverwriteChoice::Abort;
                    };
                    match answer.trim() {
                        "Y" | "y" | "" => break OverwriteChoice::Keep,
                        "n" | "N" => break OverwriteChoice::Skip,
                        "always" => {
                            always = true;
                            break OverwriteChoice::Keep;
                        }
                        "never" => break OverwriteChoice::Abort,
                        other => error!("Invalid option '{other}'"),
                    }
                };

                match choice {
                    OverwriteChoice::Keep => keep.push(recipe),
                    OverwriteChoice::Skip => {}
                    OverwriteChoice::Abort => {
                        info!("Not overwriting any files");
                        return Ok(false);
                    }
                }
            }

            *recipes = keep;
            Ok(true)
        }
    }
}
