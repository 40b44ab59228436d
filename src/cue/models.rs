use crate::cue::context::Tags;
use std::path::PathBuf;

/// Finished parse tree of one CUE sheet: disc metadata plus the source
/// files and their tracks, all in sheet order. Write-once, read-only after
/// parsing completes.
#[derive(Debug, Clone)]
pub struct CueSheet {
    pub disc: Tags,
    pub files: Vec<SourceFile>,
}

impl CueSheet {
    pub fn track_count(&self) -> usize {
        self.files.iter().map(|file| file.tracks.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path as written in the sheet, usually relative to the sheet itself.
    pub path: PathBuf,
    pub file_type: String,
    pub tags: Tags,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone)]
pub struct Track {
    pub num: u32,
    pub track_type: String,
    /// Start position in frames (1/75 s each, 588 samples at 44.1 kHz).
    pub start: u64,
    pub tags: Tags,
}
