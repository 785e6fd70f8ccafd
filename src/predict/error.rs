use thiserror::Error;

use crate::abort::AbortReason;
use crate::propagation::PropagationError;
use crate::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("invalid pass query: {0}")]
    Validation(#[from] ValidationError),
    #[error("Propagation error: {0}")]
    Propagation(#[from] PropagationError),
    #[error("pass search cancelled")]
    Cancelled,
    #[error("pass search timed out")]
    TimedOut,
}

impl From<AbortReason> for PredictError {
    fn from(reason: AbortReason) -> Self {
        match reason {
            AbortReason::Cancelled => PredictError::Cancelled,
            AbortReason::TimedOut => PredictError::TimedOut,
        }
    }
}
