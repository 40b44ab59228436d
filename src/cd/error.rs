use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdError {
    #[error("Malformed timecode: {0}")]
    MalformedTimecode(String),
}

pub type CdResult<T> = Result<T, CdError>;
