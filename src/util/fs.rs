use async_recursion::async_recursion;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// CUE sheets collected from the command-line targets. Files passed
/// directly are taken as-is and validated later; targets that do not exist
/// are reported back for logging.
#[derive(Debug, Default)]
pub struct FoundCueFiles {
    pub found: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

pub fn is_cue_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cue"))
}

pub async fn collect_cue_files(targets: &[PathBuf], recursive: bool) -> io::Result<FoundCueFiles> {
    let mut result = FoundCueFiles::default();

    for target in targets {
        if !fs::try_exists(target).await? {
            result.missing.push(target.clone());
        } else if target.is_dir() {
            let files = if recursive {
                get_all_files(target).await?
            } else {
                list_files(target).await?
            };
            result
                .found
                .extend(files.into_iter().filter(|file| is_cue_file(file)));
        } else {
            result.found.push(target.clone());
        }
    }

    Ok(result)
}

#[async_recursion]
async fn get_all_files(dir_path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dir = fs::read_dir(dir_path).await?;
    let mut files = Vec::new();

    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();

        if path.is_dir() {
            files.append(&mut get_all_files(&path).await?);
        } else {
            files.push(path);
        }
    }

    Ok(files)
}

async fn list_files(dir_path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dir = fs::read_dir(dir_path).await?;
    let mut files = Vec::new();

    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    Ok(files)
}

pub async fn make_output_dirs(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir).await
}

/// Moves every produced track out of the temporary directory. Falls back to
/// copy + delete when the rename crosses filesystems.
pub async fn move_to_output_dir(temp_dir: &Path, output_dir: &Path) -> io::Result<()> {
    let mut dir = fs::read_dir(temp_dir).await?;

    while let Some(entry) = dir.next_entry().await? {
        let target = output_dir.join(entry.file_name());
        if fs::rename(entry.path(), &target).await.is_err() {
            fs::copy(entry.path(), &target).await?;
            fs::remove_file(entry.path()).await?;
        }
    }

    Ok(())
}

/// Deletes the CUE sheet and its source audio files after a successful
/// split. Nothing is deleted unless every named file still exists.
pub async fn remove_source_files(cue_path: &Path, sources: &[PathBuf]) -> io::Result<bool> {
    for path in std::iter::once(cue_path).chain(sources.iter().map(PathBuf::as_path)) {
        if !fs::try_exists(path).await? || !path.is_file() {
            return Ok(false);
        }
    }

    fs::remove_file(cue_path).await?;
    for path in sources {
        fs::remove_file(path).await?;
    }

    Ok(true)
}
