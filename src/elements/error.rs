use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum ElementsError {
    #[error("TLE directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("invalid tle format")]
    InvalidTleFormat,
    #[error("Invalid TLE format in {file}: {message}")]
    InvalidTle { file: String, message: String },
    #[error("invalid element set for {satellite}: {source}")]
    InvalidElements {
        satellite: String,
        #[source]
        source: ValidationError,
    },
    #[error("satellite not found: {0}")]
    NotFound(String),
    #[error("satellite already registered: {0}")]
    Duplicate(String),
    #[error("registry lock poisoned")]
    LockPoisoned,
}
