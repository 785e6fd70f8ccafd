use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::elements::OrbitalElements;
use crate::vector::{norm, Vec3};

/// Inertial position/velocity of a satellite at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SatelliteState {
    pub timestamp: DateTime<Utc>,
    #[schema(value_type = Vec<f64>)]
    pub position_km: Vec3,
    #[schema(value_type = Vec<f64>)]
    pub velocity_km_s: Vec3,
    pub elements: OrbitalElements,
}

impl SatelliteState {
    pub fn radius_km(&self) -> f64 {
        norm(self.position_km)
    }

    pub fn speed_km_s(&self) -> f64 {
        norm(self.velocity_km_s)
    }
}
