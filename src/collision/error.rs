use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollisionError {
    #[error("invalid collision query: {0}")]
    Validation(#[from] ValidationError),
    #[error("states are at different epochs ({first} vs {second})")]
    EpochMismatch { first: String, second: String },
}
