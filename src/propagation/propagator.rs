use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::constants::EARTH_RADIUS_KM;
use crate::elements::OrbitalElements;
use crate::propagation::sgp4_model::Sgp4Ephemeris;
use crate::propagation::two_body::{KeplerEphemeris, SecularRates};
use crate::propagation::{PropagationError, SatelliteState};
use crate::vector::{norm, Vec3};

/// An element set prepared for repeated sampling.
pub trait Ephemeris: Send + Sync {
    fn elements(&self) -> &OrbitalElements;

    fn state_at(&self, timestamp: DateTime<Utc>) -> Result<SatelliteState, PropagationError>;
}

/// A propagation model. `prepare` runs once per element set, so the
/// expensive setup (SGP4 constants, secular rates) is not repeated per sample.
pub trait PropagationStrategy: Send + Sync {
    fn model(&self) -> PropagationModel;

    fn prepare(&self, elements: &OrbitalElements) -> Result<Box<dyn Ephemeris>, PropagationError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum PropagationModel {
    #[strum(serialize = "two_body")]
    TwoBody,
    #[strum(serialize = "j2")]
    J2,
    #[default]
    #[strum(serialize = "sgp4")]
    Sgp4,
}

impl PropagationStrategy for PropagationModel {
    fn model(&self) -> PropagationModel {
        *self
    }

    fn prepare(&self, elements: &OrbitalElements) -> Result<Box<dyn Ephemeris>, PropagationError> {
        check_elements(elements)?;
        let ephemeris: Box<dyn Ephemeris> = match self {
            PropagationModel::TwoBody => Box::new(KeplerEphemeris::new(
                elements.clone(),
                SecularRates::keplerian(elements),
            )),
            PropagationModel::J2 => {
                Box::new(KeplerEphemeris::new(elements.clone(), SecularRates::j2(elements)))
            }
            PropagationModel::Sgp4 => Box::new(Sgp4Ephemeris::new(elements.clone())?),
        };
        Ok(ephemeris)
    }
}

/// Entry point for state propagation; cheap to clone and share between workers.
#[derive(Clone)]
pub struct Propagator {
    strategy: Arc<dyn PropagationStrategy>,
}

impl Propagator {
    pub fn new(model: PropagationModel) -> Self {
        Self {
            strategy: Arc::new(model),
        }
    }

    pub fn with_strategy(strategy: Arc<dyn PropagationStrategy>) -> Self {
        Self { strategy }
    }

    pub fn model(&self) -> PropagationModel {
        self.strategy.model()
    }

    pub fn prepare(
        &self,
        elements: &OrbitalElements,
    ) -> Result<Box<dyn Ephemeris>, PropagationError> {
        self.strategy.prepare(elements)
    }

    /// State of `elements` at `timestamp`. Deterministic and side-effect free.
    pub fn propagate(
        &self,
        elements: &OrbitalElements,
        timestamp: DateTime<Utc>,
    ) -> Result<SatelliteState, PropagationError> {
        self.prepare(elements)?.state_at(timestamp)
    }
}

impl Default for Propagator {
    fn default() -> Self {
        Self::new(PropagationModel::default())
    }
}

fn check_elements(elements: &OrbitalElements) -> Result<(), PropagationError> {
    let a = elements.semi_major_axis_km;
    if !a.is_finite() || a <= 0.0 {
        return Err(PropagationError::InvalidElements {
            field: "semi_major_axis_km",
            reason: format!("{a} must be a positive finite number"),
        });
    }
    let e = elements.eccentricity;
    if !(0.0..1.0).contains(&e) {
        return Err(PropagationError::InvalidElements {
            field: "eccentricity",
            reason: format!("{e} is outside [0, 1)"),
        });
    }
    for (field, value) in [
        ("inclination_deg", elements.inclination_deg),
        ("raan_deg", elements.raan_deg),
        ("arg_perigee_deg", elements.arg_perigee_deg),
        ("mean_anomaly_deg", elements.mean_anomaly_deg),
    ] {
        if !value.is_finite() {
            return Err(PropagationError::InvalidElements {
                field,
                reason: "not a finite number".to_string(),
            });
        }
    }
    Ok(())
}

pub(crate) fn check_radius(position_km: Vec3) -> Result<(), PropagationError> {
    let radius_km = norm(position_km);
    if radius_km < EARTH_RADIUS_KM {
        return Err(PropagationError::Decayed { radius_km });
    }
    Ok(())
}

pub(crate) fn elapsed_seconds(epoch: DateTime<Utc>, timestamp: DateTime<Utc>) -> f64 {
    let delta = timestamp - epoch;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}
