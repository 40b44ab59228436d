use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error("ffprobe: {0}")]
    ProbeFailure(String),

    #[error("Invalid or non-splittable source file: {0:?}")]
    UnusableSource(PathBuf),
}

pub type ProbeResult<T> = Result<T, ProbeError>;

#[derive(Debug, Error)]
pub enum FfmpegError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Empty ffmpeg invocation")]
    EmptyCommand,

    #[error("ffmpeg failed with status {status}, see log details: {log:?}")]
    FfmpegFailure { status: i32, log: PathBuf },
}

pub type FfmpegResult<T> = Result<T, FfmpegError>;
