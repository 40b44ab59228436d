use crate::cue::error::CueError;
use crate::ffmpeg::error::{FfmpegError, ProbeError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitterError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CueError(#[from] CueError),

    #[error(transparent)]
    ProbeError(#[from] ProbeError),

    #[error(transparent)]
    FfmpegError(#[from] FfmpegError),

    #[error("Invalid CUE sheet file: {0:?}")]
    InvalidCueFile(PathBuf),

    #[error("No source audio file found: {0:?}")]
    NoSourceFound(PathBuf),

    #[error("Inconsistent track boundaries: {0}")]
    ResolutionError(String),

    #[error("Unsupported output format '{0}'")]
    ConfigurationError(String),

    #[error("No audio tracks to split")]
    NoAudioTracks,
}

pub type SplitterResult<T> = Result<T, SplitterError>;
