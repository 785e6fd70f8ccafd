use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

/// Lighting at the observer when the pass starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PassType {
    Daylight,
    Night,
    Twilight,
}

impl PassType {
    pub fn from_sun_elevation(sun_elevation_deg: f64, twilight_threshold_deg: f64) -> Self {
        if sun_elevation_deg > 0.0 {
            PassType::Daylight
        } else if sun_elevation_deg < twilight_threshold_deg {
            PassType::Night
        } else {
            PassType::Twilight
        }
    }
}

/// A predicted satellite pass over one observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Pass {
    pub satellite_id: String,
    pub satellite_name: String,
    /// First instant at or above the minimum elevation
    pub start: DateTime<Utc>,
    /// Last instant at or above the minimum elevation
    pub end: DateTime<Utc>,
    pub max_elevation_time: DateTime<Utc>,
    pub duration_minutes: f64,
    pub max_elevation_deg: f64,
    /// Azimuth at maximum elevation
    pub azimuth_deg: f64,
    pub rise_azimuth_deg: f64,
    pub set_azimuth_deg: f64,
    pub pass_type: PassType,
}

impl Pass {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Result of a pass search. `truncated` is set when the sample budget or the
/// maximum horizon cut the search short; the passes found so far are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PassSearch {
    pub passes: Vec<Pass>,
    pub truncated: bool,
    pub samples_used: u64,
}

impl PassSearch {
    /// Folds per-satellite searches into one list ordered by start time.
    pub fn merge(searches: impl IntoIterator<Item = PassSearch>) -> PassSearch {
        let mut merged = PassSearch::default();
        for search in searches {
            merged.passes.extend(search.passes);
            merged.truncated |= search.truncated;
            merged.samples_used += search.samples_used;
        }
        sort_passes(&mut merged.passes);
        merged
    }
}

pub fn sort_passes(passes: &mut [Pass]) {
    passes.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.satellite_id.cmp(&b.satellite_id))
    });
}

/// Step sizes and budgets of the pass search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Step while the satellite is below the threshold
    #[serde(with = "crate::config::duration")]
    pub coarse_step: Duration,
    /// Step while tracking a pass
    #[serde(with = "crate::config::duration")]
    pub fine_step: Duration,
    /// Rise/set bisection stops at this interval
    #[serde(with = "crate::config::duration")]
    pub resolution: Duration,
    /// Skipped after each set
    #[serde(with = "crate::config::duration")]
    pub guard: Duration,
    #[serde(with = "crate::config::duration")]
    pub max_horizon: Duration,
    pub max_samples: u64,
    pub min_elevation_deg: f64,
    pub twilight_threshold_deg: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            coarse_step: Duration::seconds(60),
            fine_step: Duration::seconds(5),
            resolution: Duration::seconds(1),
            guard: Duration::minutes(5),
            max_horizon: Duration::days(30),
            max_samples: 250_000,
            min_elevation_deg: 10.0,
            twilight_threshold_deg: -6.0,
        }
    }
}
