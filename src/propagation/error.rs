use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    #[error("invalid elements ({field}): {reason}")]
    InvalidElements { field: &'static str, reason: String },
    #[error("satellite has decayed: radius {radius_km:.1} km is below the Earth surface")]
    Decayed { radius_km: f64 },
    #[error("Kepler solver did not converge after {iterations} iterations (residual {residual:e})")]
    NonConvergent { iterations: u32, residual: f64 },
}
