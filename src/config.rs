use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::collision::CollisionSettings;
use crate::constellation::CoverageSettings;
use crate::elements::{ElementSource, ElementsError, InlineTles, Registry, TleDirectory};
use crate::engine::{EngineSettings, PropagationSettings};
use crate::maneuver::ManeuverSettings;
use crate::predict::SearchSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub elements: ElementsConfig,
    pub engine: EngineSettings,
    pub propagation: PropagationSettings,
    pub search: SearchSettings,
    pub maneuver: ManeuverSettings,
    pub collision: CollisionSettings,
    pub coverage: CoverageSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ElementsConfig {
    /// Folder of .tle/.txt files
    pub tle_dir: Option<PathBuf>,
    /// TLE text embedded in the config file
    pub inline: Option<String>,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.workers == 0 {
            return Err(ConfigError::Invalid("engine.workers must be at least 1".to_string()));
        }
        if self.engine.refresh_interval <= chrono::Duration::zero() {
            return Err(ConfigError::Invalid(
                "engine.refresh_interval must be positive".to_string(),
            ));
        }
        for (name, step) in [
            ("search.coarse_step", self.search.coarse_step),
            ("search.fine_step", self.search.fine_step),
            ("search.resolution", self.search.resolution),
        ] {
            if step <= chrono::Duration::zero() {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if let crate::coordinates::EarthModel::Spherical { radius_km } = self.propagation.earth {
            if !(radius_km.is_finite() && radius_km > 0.0) {
                return Err(ConfigError::Invalid(
                    "propagation.earth.radius_km must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn element_sources(&self) -> Vec<Box<dyn ElementSource>> {
        let mut sources: Vec<Box<dyn ElementSource>> = Vec::new();
        if let Some(dir) = &self.elements.tle_dir {
            sources.push(Box::new(TleDirectory::new(dir.clone())));
        }
        if let Some(text) = &self.elements.inline {
            sources.push(Box::new(InlineTles::new("config", text.clone())));
        }
        sources
    }

    /// Registry holding the records of every configured source.
    pub fn load_registry(&self) -> Result<Registry, ElementsError> {
        let mut records = Vec::new();
        for source in self.element_sources() {
            let loaded = source.load()?;
            log::info!("Loaded {} satellites from {}", loaded.len(), source.describe());
            records.extend(loaded);
        }
        Registry::from_records(records)
    }
}

/// `chrono::Duration` as a human-readable string ("90s", "5m", "1h 30m").
pub(crate) mod duration {
    use chrono::Duration;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let std = value
            .to_std()
            .map_err(|_| serde::ser::Error::custom("negative durations are not supported"))?;
        serializer.serialize_str(&humantime::format_duration(std).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(de::Error::custom)
    }

    pub fn parse(text: &str) -> Result<Duration, String> {
        humantime::parse_duration(text.trim())
            .map_err(|e| e.to_string())
            .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
    }
}

pub use duration::parse as parse_duration;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::EarthModel;
    use crate::propagation::PropagationModel;
    use chrono::Duration;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.engine.refresh_interval, Duration::seconds(1));
        assert_eq!(config.search.coarse_step, Duration::seconds(60));
        assert_eq!(config.search.guard, Duration::minutes(5));
        assert_eq!(config.coverage.floor_percent, 50.0);
        assert_eq!(config.propagation.model, PropagationModel::Sgp4);
        assert!(config.element_sources().is_empty());
    }

    #[test]
    fn sections_override_defaults() {
        let yaml = r#"
elements:
  tle_dir: /var/lib/tles
engine:
  workers: 8
  search_timeout: 2m
propagation:
  model: j2
  earth:
    kind: wgs84
search:
  coarse_step: 30s
  twilight_threshold_deg: -12
maneuver:
  station_keeping:
    semi_major_axis_km: 0.5
collision:
  default_horizon: 6h
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.engine.workers, 8);
        assert_eq!(config.engine.search_timeout, Duration::minutes(2));
        assert_eq!(config.propagation.model, PropagationModel::J2);
        assert_eq!(config.propagation.earth, EarthModel::Wgs84);
        assert_eq!(config.search.coarse_step, Duration::seconds(30));
        assert_eq!(config.search.fine_step, Duration::seconds(5));
        assert_eq!(config.search.twilight_threshold_deg, -12.0);
        assert_eq!(config.maneuver.station_keeping.semi_major_axis_km, 0.5);
        assert_eq!(config.maneuver.station_keeping.inclination_deg, 0.1);
        assert_eq!(config.collision.default_horizon, Duration::hours(6));
        assert_eq!(config.element_sources().len(), 1);
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(matches!(
            Config::from_yaml("engine:\n  workers: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn bad_duration_is_a_yaml_error() {
        assert!(matches!(
            Config::from_yaml("search:\n  coarse_step: soon\n"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
