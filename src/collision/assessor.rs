use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use crate::collision::error::CollisionError;
use crate::propagation::SatelliteState;
use crate::validation::{in_range, ValidationError};
use crate::vector::{add, dot, norm, scale, sub};

/// Below this |Δv|² (km²/s²) the relative motion is treated as zero.
const STATIONARY_EPSILON: f64 = 1e-18;

/// Ratio of the separation to the threshold under which a miss is still `Medium`.
const MEDIUM_RISK_FACTOR: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CollisionAssessment {
    pub risk: bool,
    pub risk_level: RiskLevel,
    pub closest_approach_km: f64,
    /// Seconds from the common epoch to the closest approach
    pub time_to_closest_approach_s: f64,
    pub closest_approach_time: DateTime<Utc>,
    /// Sum of the two object radii
    pub min_separation_km: f64,
    pub relative_speed_km_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSettings {
    pub default_radius_km: f64,
    #[serde(with = "crate::config::duration")]
    pub default_horizon: Duration,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            default_radius_km: 0.01,
            default_horizon: Duration::hours(24),
        }
    }
}

/// Linear closest-approach screening of two states at a common epoch.
///
/// Both objects are extrapolated along their instantaneous velocity, so the
/// result is only meaningful for horizons that are short compared to the
/// orbital period. Curved relative motion over long horizons is missed.
pub fn assess(
    first: &SatelliteState,
    second: &SatelliteState,
    radius_first_km: f64,
    radius_second_km: f64,
    horizon: Duration,
) -> Result<CollisionAssessment, CollisionError> {
    if first.timestamp != second.timestamp {
        return Err(CollisionError::EpochMismatch {
            first: first.timestamp.to_rfc3339(),
            second: second.timestamp.to_rfc3339(),
        });
    }
    in_range("radius_first_km", radius_first_km, radius_first_km >= 0.0, ">= 0")?;
    in_range("radius_second_km", radius_second_km, radius_second_km >= 0.0, ">= 0")?;
    if horizon < Duration::zero() {
        return Err(ValidationError::Invalid {
            field: "horizon",
            message: "must not be negative".to_string(),
        }
        .into());
    }

    let dr = sub(second.position_km, first.position_km);
    let dv = sub(second.velocity_km_s, first.velocity_km_s);
    let dv2 = dot(dv, dv);
    let horizon_s = horizon.num_milliseconds() as f64 / 1e3;

    let t_ca = if dv2 < STATIONARY_EPSILON {
        0.0
    } else {
        (-dot(dr, dv) / dv2).clamp(0.0, horizon_s)
    };
    let separation = norm(add(dr, scale(dv, t_ca)));
    let threshold = radius_first_km + radius_second_km;

    let risk = separation < threshold;
    let risk_level = if risk {
        RiskLevel::High
    } else if separation < MEDIUM_RISK_FACTOR * threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let closest_approach_time = first
        .timestamp
        .checked_add_signed(Duration::microseconds((t_ca * 1e6).round() as i64))
        .ok_or_else(|| ValidationError::Invalid {
            field: "horizon",
            message: "closest approach falls past the supported date range".to_string(),
        })?;

    Ok(CollisionAssessment {
        risk,
        risk_level,
        closest_approach_km: separation,
        time_to_closest_approach_s: t_ca,
        closest_approach_time,
        min_separation_km: threshold,
        relative_speed_km_s: dv2.sqrt(),
    })
}
