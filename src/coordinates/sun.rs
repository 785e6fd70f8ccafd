use chrono::{DateTime, Utc};

use crate::constants::AU_KM;
use crate::vector::Vec3;

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const J2000_JD: f64 = 2_451_545.0;

/// Apparent solar position in the inertial (true-of-date equatorial) frame, km.
///
/// Low-precision almanac series, good to about 0.01 deg between 1950 and 2050,
/// which is plenty for classifying passes as daylight/twilight/night.
pub fn sun_position_km(timestamp: DateTime<Utc>) -> Vec3 {
    let unix_s =
        timestamp.timestamp() as f64 + f64::from(timestamp.timestamp_subsec_millis()) / 1e3;
    let n = unix_s / 86_400.0 + UNIX_EPOCH_JD - J2000_JD;

    let mean_longitude = (280.460 + 0.985_647_4 * n).rem_euclid(360.0);
    let mean_anomaly = (357.528 + 0.985_600_3 * n).rem_euclid(360.0).to_radians();
    let ecliptic_longitude = (mean_longitude
        + 1.915 * mean_anomaly.sin()
        + 0.020 * (2.0 * mean_anomaly).sin())
    .to_radians();
    let obliquity = (23.439 - 4.0e-7 * n).to_radians();
    let distance_au =
        1.000_14 - 0.016_71 * mean_anomaly.cos() - 0.000_14 * (2.0 * mean_anomaly).cos();

    let r = distance_au * AU_KM;
    let (sin_l, cos_l) = ecliptic_longitude.sin_cos();
    [
        r * cos_l,
        r * obliquity.cos() * sin_l,
        r * obliquity.sin() * sin_l,
    ]
}
