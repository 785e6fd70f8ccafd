pub mod abort;
pub mod collision;
pub mod config;
pub mod constants;
pub mod constellation;
pub mod coordinates;
pub mod elements;
pub mod engine;
pub mod maneuver;
pub mod predict;
pub mod propagation;
pub mod validation;
pub mod vector;

pub use config::Config;
pub use engine::{Engine, EngineError};
