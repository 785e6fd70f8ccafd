use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManeuverError {
    #[error("invalid maneuver query: {0}")]
    Validation(#[from] ValidationError),
    /// The planner cannot model this maneuver and will not guess.
    #[error("unsupported maneuver: {reason}")]
    Unsupported { reason: String },
}
