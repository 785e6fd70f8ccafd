use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constellation::Target;
use crate::coordinates::{EarthModel, Geodetic, Observer};
use crate::propagation::PropagationModel;
use crate::vector::Vec3;

/// Position of one satellite, inertial and over the ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub satellite_id: String,
    pub satellite_name: String,
    pub timestamp: DateTime<Utc>,
    #[schema(value_type = Vec<f64>)]
    pub position_km: Vec3,
    #[schema(value_type = Vec<f64>)]
    pub velocity_km_s: Vec3,
    pub geodetic: Geodetic,
}

/// Latest snapshot written by the refresh task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionCache {
    pub refreshed_at: Option<DateTime<Utc>>,
    pub positions: HashMap<String, Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EngineStatus {
    pub running: bool,
    pub satellites: usize,
    pub cached_positions: usize,
    pub last_refresh: Option<DateTime<Utc>>,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassQuery {
    pub observer: Observer,
    /// Restrict the search to these satellites; all registered ones otherwise
    pub satellite_ids: Option<Vec<String>>,
    /// Defaults to the engine clock
    pub start: Option<DateTime<Utc>>,
    pub horizon: Duration,
    /// Defaults to the configured search minimum
    pub min_elevation_deg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionQuery {
    pub first: String,
    pub second: String,
    pub at: Option<DateTime<Utc>>,
    pub horizon: Option<Duration>,
    pub radius_first_km: Option<f64>,
    pub radius_second_km: Option<f64>,
}

impl CollisionQuery {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            at: None,
            horizon: None,
            radius_first_km: None,
            radius_second_km: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageQuery {
    pub targets: Vec<Target>,
    pub satellite_ids: Option<Vec<String>>,
    pub start: Option<DateTime<Utc>>,
    pub horizon: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    #[serde(with = "crate::config::duration")]
    pub refresh_interval: Duration,
    /// Concurrent pass searches on the blocking pool
    pub workers: usize,
    /// Wall-clock budget of one pass or coverage query
    #[serde(with = "crate::config::duration")]
    pub search_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::seconds(1),
            workers: 4,
            search_timeout: Duration::seconds(30),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationSettings {
    pub model: PropagationModel,
    pub earth: EarthModel,
}
