use chrono::{DateTime, Utc};

use crate::constants::EARTH_ROTATION_RAD_S;
use crate::vector::Vec3;

/// Greenwich mean sidereal angle (radians) at `timestamp`.
pub fn sidereal_angle(timestamp: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()))
}

pub fn inertial_to_fixed_position(pos: Vec3, gmst: f64) -> Vec3 {
    let (sin_gmst, cos_gmst) = gmst.sin_cos();
    [
        pos[0] * cos_gmst + pos[1] * sin_gmst,
        -pos[0] * sin_gmst + pos[1] * cos_gmst,
        pos[2],
    ]
}

pub fn fixed_to_inertial_position(pos: Vec3, gmst: f64) -> Vec3 {
    inertial_to_fixed_position(pos, -gmst)
}

/// Earth-fixed velocity, including the transport term of the rotating frame.
pub fn inertial_to_fixed_velocity(pos: Vec3, vel: Vec3, gmst: f64) -> Vec3 {
    let fixed_pos = inertial_to_fixed_position(pos, gmst);
    let rotated = inertial_to_fixed_position(vel, gmst);
    [
        rotated[0] + EARTH_ROTATION_RAD_S * fixed_pos[1],
        rotated[1] - EARTH_ROTATION_RAD_S * fixed_pos[0],
        rotated[2],
    ]
}

/// Earth-fixed offset to local east/north/up at the given geodetic latitude/longitude.
pub fn fixed_to_enu(dr: Vec3, lat_rad: f64, lon_rad: f64) -> Vec3 {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    [east, north, up]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    #[test]
    fn inertial_fixed_round_trip() {
        let gmst = sidereal_angle(Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap());
        let pos = [4000.0, -5000.0, 2500.0];
        let back = fixed_to_inertial_position(inertial_to_fixed_position(pos, gmst), gmst);
        for k in 0..3 {
            assert_relative_eq!(back[k], pos[k], max_relative = 1e-12);
        }
    }

    #[test]
    fn geostationary_point_is_still_in_the_fixed_frame() {
        let r = 42_164.0;
        let v = r * EARTH_ROTATION_RAD_S;
        let gmst = 1.0;
        let pos = fixed_to_inertial_position([r, 0.0, 0.0], gmst);
        let vel = fixed_to_inertial_position([0.0, v, 0.0], gmst);
        let fixed_vel = inertial_to_fixed_velocity(pos, vel, gmst);
        for component in fixed_vel {
            assert!(component.abs() < 1e-9, "{fixed_vel:?}");
        }
    }
}
