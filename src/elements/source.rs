use std::fs;
use std::path::{Path, PathBuf};

use crate::elements::error::ElementsError;
use crate::elements::tle::records_from_tle_text;
use crate::elements::types::SatelliteRecord;

/// Where the registry gets its element sets from.
pub trait ElementSource: Send + Sync {
    fn describe(&self) -> String;

    fn load(&self) -> Result<Vec<SatelliteRecord>, ElementsError>;
}

/// A folder of `.tle` / `.txt` files, each holding one or more TLE records.
pub struct TleDirectory {
    tle_dir: PathBuf,
}

impl TleDirectory {
    pub fn new(tle_dir: PathBuf) -> Self {
        Self { tle_dir }
    }

    fn parse_tle_file(&self, path: &Path) -> Result<Vec<SatelliteRecord>, ElementsError> {
        let content = fs::read_to_string(path)?;
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        records_from_tle_text(&content, &filename)
    }
}

impl ElementSource for TleDirectory {
    fn describe(&self) -> String {
        self.tle_dir.display().to_string()
    }

    fn load(&self) -> Result<Vec<SatelliteRecord>, ElementsError> {
        if !self.tle_dir.exists() {
            return Err(ElementsError::DirectoryNotFound(
                self.tle_dir.display().to_string(),
            ));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.tle_dir)? {
            let path = entry?.path();
            let is_tle = path
                .extension()
                .map(|ext| ext == "tle" || ext == "txt")
                .unwrap_or(false);
            if path.is_file() && is_tle {
                paths.push(path);
            }
        }
        // later files win on duplicate ids, so keep the order stable
        paths.sort();

        let mut records = Vec::new();
        for path in paths {
            match self.parse_tle_file(&path) {
                Ok(parsed) => records.extend(parsed),
                Err(e) => {
                    log::warn!("Failed to parse TLE file {}: {}", path.display(), e);
                    // Continue with other files
                }
            }
        }

        Ok(records)
    }
}

/// TLE text held in memory (config file, API payload).
pub struct InlineTles {
    label: String,
    content: String,
}

impl InlineTles {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }
}

impl ElementSource for InlineTles {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn load(&self) -> Result<Vec<SatelliteRecord>, ElementsError> {
        records_from_tle_text(&self.content, &self.label)
    }
}

/// Element sets that are already structured, e.g. built by a caller.
impl ElementSource for Vec<SatelliteRecord> {
    fn describe(&self) -> String {
        format!("{} structured element sets", self.len())
    }

    fn load(&self) -> Result<Vec<SatelliteRecord>, ElementsError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATIONS: &str = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008
";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("orbit-o-mat-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_tle_files_and_skips_broken_ones() {
        let dir = scratch_dir("tle-dir");
        fs::write(dir.join("stations.tle"), STATIONS).unwrap();
        fs::write(
            dir.join("broken.txt"),
            "BAD\n1 25544U garbage\n2 25544 more garbage\n",
        )
        .unwrap();
        fs::write(dir.join("ignored.json"), "{}").unwrap();

        let records = TleDirectory::new(dir.clone()).load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].info.source, "stations.tle");

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let source = TleDirectory::new(PathBuf::from("/nonexistent/orbit-o-mat/tles"));
        assert!(matches!(
            source.load(),
            Err(ElementsError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn inline_source_uses_its_label() {
        let records = InlineTles::new("config", STATIONS).load().unwrap();
        assert_eq!(records[0].info.source, "config");
    }
}
