mod error;
mod pass_finder;
mod types;

pub use error::PredictError;
pub use pass_finder::PassPredictor;
pub use types::{sort_passes, Pass, PassSearch, PassType, SearchSettings};
