use crate::cd::error::CdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    MalformedTimecode(#[from] CdError),

    #[error("Invalid CUE sheet: {0}")]
    ParseError(String),

    #[error(transparent)]
    ParseIntError(#[from] std::num::ParseIntError),
}

pub type CueResult<T> = Result<T, CueError>;
