use thiserror::Error;

use crate::collision::CollisionError;
use crate::elements::ElementsError;
use crate::maneuver::ManeuverError;
use crate::predict::PredictError;
use crate::propagation::PropagationError;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine already running")]
    AlreadyRunning,
    #[error(transparent)]
    Elements(#[from] ElementsError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("propagation of {satellite} failed: {source}")]
    Propagation {
        satellite: String,
        #[source]
        source: PropagationError,
    },
    #[error(transparent)]
    Predict(#[from] PredictError),
    #[error(transparent)]
    Maneuver(#[from] ManeuverError),
    #[error(transparent)]
    Collision(#[from] CollisionError),
    #[error("worker failed: {0}")]
    Worker(String),
    #[error("position cache lock poisoned")]
    LockPoisoned,
}
