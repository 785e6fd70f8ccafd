use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::coordinates::frames::{
    fixed_to_enu, fixed_to_inertial_position, inertial_to_fixed_position,
    inertial_to_fixed_velocity, sidereal_angle,
};
use crate::coordinates::sun::sun_position_km;
use crate::coordinates::{EarthModel, Geodetic, Observer};
use crate::propagation::SatelliteState;
use crate::vector::{dot, norm, sub, Vec3};

/// Where a target sits in an observer's sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LookAngles {
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub range_km: f64,
    /// Positive when the target moves away from the observer
    pub range_rate_km_s: f64,
}

/// Conversions between the inertial frame and ground-based frames for one Earth model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoordinateTransform {
    earth: EarthModel,
}

impl CoordinateTransform {
    pub fn new(earth: EarthModel) -> Self {
        Self { earth }
    }

    pub fn earth(&self) -> EarthModel {
        self.earth
    }

    pub fn inertial_to_geodetic(&self, position_km: Vec3, timestamp: DateTime<Utc>) -> Geodetic {
        let fixed = inertial_to_fixed_position(position_km, sidereal_angle(timestamp));
        self.earth.fixed_to_geodetic(fixed)
    }

    pub fn geodetic_to_inertial(&self, geodetic: &Geodetic, timestamp: DateTime<Utc>) -> Vec3 {
        let fixed = self.earth.geodetic_to_fixed(geodetic);
        fixed_to_inertial_position(fixed, sidereal_angle(timestamp))
    }

    pub fn observer_inertial(&self, observer: &Observer, timestamp: DateTime<Utc>) -> Vec3 {
        self.geodetic_to_inertial(&observer.geodetic(), timestamp)
    }

    /// East/north/up components (km) of the vector from `observer` to an inertial position.
    pub fn topocentric(
        &self,
        observer: &Observer,
        position_km: Vec3,
        timestamp: DateTime<Utc>,
    ) -> Vec3 {
        let gmst = sidereal_angle(timestamp);
        let target = inertial_to_fixed_position(position_km, gmst);
        let station = self.earth.geodetic_to_fixed(&observer.geodetic());
        fixed_to_enu(sub(target, station), observer.lat_rad(), observer.lon_rad())
    }

    pub fn look_angles(&self, observer: &Observer, state: &SatelliteState) -> LookAngles {
        let gmst = sidereal_angle(state.timestamp);
        let sat_fixed = inertial_to_fixed_position(state.position_km, gmst);
        let sat_vel_fixed =
            inertial_to_fixed_velocity(state.position_km, state.velocity_km_s, gmst);
        let station = self.earth.geodetic_to_fixed(&observer.geodetic());

        let dr = sub(sat_fixed, station);
        let range_km = norm(dr);
        let [east, north, up] = fixed_to_enu(dr, observer.lat_rad(), observer.lon_rad());

        let (elevation_deg, range_rate_km_s) = if range_km > 0.0 {
            (
                (up / range_km).clamp(-1.0, 1.0).asin().to_degrees(),
                dot(sat_vel_fixed, dr) / range_km,
            )
        } else {
            (90.0, 0.0)
        };

        LookAngles {
            elevation_deg,
            azimuth_deg: east.atan2(north).to_degrees().rem_euclid(360.0),
            range_km,
            range_rate_km_s,
        }
    }

    /// Elevation of the Sun's centre above the observer's horizon (degrees).
    pub fn sun_elevation_deg(&self, observer: &Observer, timestamp: DateTime<Utc>) -> f64 {
        let enu = self.topocentric(observer, sun_position_km(timestamp), timestamp);
        (enu[2] / norm(enu)).clamp(-1.0, 1.0).asin().to_degrees()
    }
}
