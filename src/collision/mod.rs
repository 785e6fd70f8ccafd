mod assessor;
mod error;

pub use assessor::{assess, CollisionAssessment, CollisionSettings, RiskLevel};
pub use error::CollisionError;
