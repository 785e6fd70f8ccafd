mod clock;
mod engine;
mod error;
mod queries;
mod refresh;
mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::Engine;
pub use error::EngineError;
pub use types::{
    CollisionQuery, CoverageQuery, EngineSettings, EngineStatus, PassQuery, Position,
    PositionCache, PropagationSettings,
};
