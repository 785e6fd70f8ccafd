use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use crate::coordinates::Observer;
use crate::predict::Pass;
use crate::validation::ValidationError;

/// A ground location to be covered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Target {
    pub id: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub altitude_km: f64,
}

impl Target {
    pub fn observer(&self) -> Result<Observer, ValidationError> {
        Observer::new(self.latitude_deg, self.longitude_deg, self.altitude_km)
    }
}

/// A merged interval during which at least one satellite is in view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoverageWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CoverageWindow {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 60_000.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Assignment {
    pub target_id: String,
    pub satellite_id: String,
}

/// Passes of every satellite over one target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPasses {
    pub target: Target,
    pub passes: Vec<Pass>,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TargetCoverage {
    pub target_id: String,
    pub windows: Vec<CoverageWindow>,
    pub covered_minutes: f64,
    pub coverage_percent: f64,
    pub below_floor: bool,
    pub assigned_satellite: String,
    /// First pass of the assigned satellite that climbs high enough for tasking
    pub next_pass: Option<Pass>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Recommendation {
    AddMoreSatellites,
    AdjustOrbitalParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConstellationReport {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub targets: Vec<TargetCoverage>,
    pub average_coverage_percent: f64,
    pub minimum_coverage_percent: f64,
    pub maximum_coverage_percent: f64,
    /// 0.7 · average + 0.3 · minimum
    pub optimization_score: f64,
    pub recommendations: Vec<Recommendation>,
    /// Some pass search was cut short, so coverage may be under-reported
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageSettings {
    /// Targets under this coverage percentage are flagged
    pub floor_percent: f64,
    /// Average coverage under this suggests reshaping the constellation
    pub adjust_below_percent: f64,
    pub min_elevation_deg: f64,
    /// Peak elevation the assigned satellite needs for its next pass to count
    pub assignment_min_elevation_deg: f64,
    #[serde(with = "crate::config::duration")]
    pub default_horizon: Duration,
}

impl Default for CoverageSettings {
    fn default() -> Self {
        Self {
            floor_percent: 50.0,
            adjust_below_percent: 70.0,
            min_elevation_deg: 10.0,
            assignment_min_elevation_deg: 30.0,
            default_horizon: Duration::hours(24),
        }
    }
}
