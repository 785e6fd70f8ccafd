use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BurnDirection {
    Prograde,
    Retrograde,
    /// Along the orbit normal (cross-track)
    Normal,
    AntiNormal,
    /// Along-track burn at perigee or apogee, sign depends on where it is applied
    Tangential,
}

/// One impulsive burn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Burn {
    pub label: String,
    pub delta_v_km_s: f64,
    pub direction: BurnDirection,
    /// Orbit radius at which the burn is performed
    pub radius_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ManeuverKind {
    /// Orbits already match within tolerance
    None,
    Hohmann,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ManeuverPlan {
    pub kind: ManeuverKind,
    pub origin_semi_major_axis_km: f64,
    pub target_semi_major_axis_km: f64,
    pub transfer_semi_major_axis_km: f64,
    pub transfer_eccentricity: f64,
    pub burns: Vec<Burn>,
    pub total_delta_v_km_s: f64,
    /// Time from the first to the last burn
    pub transfer_time_s: f64,
    pub transfer_period_s: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CorrectedElement {
    SemiMajorAxis,
    Inclination,
    Eccentricity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Correction {
    pub element: CorrectedElement,
    /// target - current, in the element's own unit (km, deg, unitless)
    pub deviation: f64,
    pub delta_v_km_s: f64,
    pub direction: BurnDirection,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StationKeepingPlan {
    pub corrections: Vec<Correction>,
    /// Sum over the required corrections
    pub total_delta_v_km_s: f64,
    pub required: bool,
}

/// Deviations at or below these need no correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationKeepingTolerances {
    pub semi_major_axis_km: f64,
    pub inclination_deg: f64,
    pub eccentricity: f64,
}

impl Default for StationKeepingTolerances {
    fn default() -> Self {
        Self {
            semi_major_axis_km: 0.1,
            inclination_deg: 0.1,
            eccentricity: 0.001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManeuverSettings {
    pub station_keeping: StationKeepingTolerances,
    /// Semi-major axis changes up to this size are not worth a transfer
    pub transfer_threshold_km: f64,
    /// Largest inclination/RAAN difference still treated as coplanar
    pub plane_tolerance_deg: f64,
    /// Largest eccentricity still treated as circular
    pub max_circular_eccentricity: f64,
}

impl Default for ManeuverSettings {
    fn default() -> Self {
        Self {
            station_keeping: StationKeepingTolerances::default(),
            transfer_threshold_km: 1.0,
            plane_tolerance_deg: 0.01,
            max_circular_eccentricity: 0.01,
        }
    }
}
