use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::elements::{format_tle, OrbitalElements};
use crate::propagation::propagator::{check_radius, Ephemeris};
use crate::propagation::{PropagationError, SatelliteState};

/// SGP4/SDP4 ephemeris. Output is in TEME, which the rest of the crate treats as inertial.
pub(crate) struct Sgp4Ephemeris {
    source: OrbitalElements,
    elements: Elements,
    constants: Constants,
}

impl Sgp4Ephemeris {
    pub fn new(source: OrbitalElements) -> Result<Self, PropagationError> {
        // structured element sets go through their TLE rendering so SGP4 sees
        // exactly what a TLE consumer would
        let (line1, line2) = format_tle(&source);
        let elements = Elements::from_tle(None, line1.as_bytes(), line2.as_bytes()).map_err(|e| {
            PropagationError::InvalidElements {
                field: "tle",
                reason: e.to_string(),
            }
        })?;
        let constants =
            Constants::from_elements(&elements).map_err(|e| PropagationError::InvalidElements {
                field: "sgp4",
                reason: e.to_string(),
            })?;

        Ok(Self {
            source,
            elements,
            constants,
        })
    }
}

impl Ephemeris for Sgp4Ephemeris {
    fn elements(&self) -> &OrbitalElements {
        &self.source
    }

    fn state_at(&self, timestamp: DateTime<Utc>) -> Result<SatelliteState, PropagationError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
            .map_err(|e| PropagationError::InvalidElements {
                field: "epoch",
                reason: e.to_string(),
            })?;

        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(divergence_error)?;

        check_radius(prediction.position)?;

        Ok(SatelliteState {
            timestamp,
            position_km: prediction.position,
            velocity_km_s: prediction.velocity,
            elements: self.source.clone(),
        })
    }
}

/// SGP4 stops when drag collapses the orbit; everything else is a bad element set.
fn divergence_error(error: sgp4::Error) -> PropagationError {
    match error {
        // r = p / (1 + e·cos ν) has no positive solution left
        sgp4::Error::NegativeSemiLatusRectum { t } => {
            log::debug!("SGP4 semi-latus rectum went negative {:.1} min from epoch", t);
            PropagationError::Decayed { radius_km: 0.0 }
        }
        other => PropagationError::InvalidElements {
            field: "sgp4",
            reason: other.to_string(),
        },
    }
}
