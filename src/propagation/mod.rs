mod error;
mod kepler;
mod propagator;
mod sgp4_model;
mod state;
mod two_body;

pub use error::PropagationError;
pub use kepler::{
    solve_kepler, true_anomaly_from_eccentric, KEPLER_MAX_ITERATIONS, KEPLER_TOLERANCE_RAD,
};
pub use propagator::{Ephemeris, PropagationModel, PropagationStrategy, Propagator};
pub use state::SatelliteState;
pub use two_body::perifocal_to_inertial;
