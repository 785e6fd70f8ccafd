mod error;
mod registry;
mod source;
mod tle;
mod types;

pub use error::ElementsError;
pub use registry::{Registry, Snapshot};
pub use source::{ElementSource, InlineTles, TleDirectory};
pub use tle::{
    elements_from_sgp4, format_tle, parse_multi_tle, parse_tle_lines, record_from_tle,
    records_from_tle_text, satellite_id, UNKNOWN_NORAD_ID,
};
pub use types::{semi_major_axis_from_mean_motion, OrbitalElements, SatelliteInfo, SatelliteRecord};
