use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::{EARTH_RADIUS_KM, WGS84_A_KM, WGS84_E2};
use crate::vector::Vec3;

/// Geodetic (or geocentric, for the spherical model) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Shape of the Earth used to go between Earth-fixed cartesian and geodetic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EarthModel {
    Spherical { radius_km: f64 },
    Wgs84,
}

impl Default for EarthModel {
    fn default() -> Self {
        EarthModel::Spherical {
            radius_km: EARTH_RADIUS_KM,
        }
    }
}

const WGS84_MAX_ITERATIONS: usize = 20;

impl EarthModel {
    pub fn mean_radius_km(&self) -> f64 {
        match self {
            EarthModel::Spherical { radius_km } => *radius_km,
            EarthModel::Wgs84 => WGS84_A_KM,
        }
    }

    pub fn geodetic_to_fixed(&self, geodetic: &Geodetic) -> Vec3 {
        let lat = geodetic.latitude_deg.to_radians();
        let lon = geodetic.longitude_deg.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        let h = geodetic.altitude_km;

        match self {
            EarthModel::Spherical { radius_km } => {
                let r = radius_km + h;
                [r * cos_lat * cos_lon, r * cos_lat * sin_lon, r * sin_lat]
            }
            EarthModel::Wgs84 => {
                let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
                [
                    (n + h) * cos_lat * cos_lon,
                    (n + h) * cos_lat * sin_lon,
                    (n * (1.0 - WGS84_E2) + h) * sin_lat,
                ]
            }
        }
    }

    pub fn fixed_to_geodetic(&self, position: Vec3) -> Geodetic {
        let [x, y, z] = position;
        let p = x.hypot(y);
        let longitude_deg = y.atan2(x).to_degrees();

        match self {
            EarthModel::Spherical { radius_km } => {
                let r = p.hypot(z);
                let latitude = if r > 0.0 { (z / r).asin() } else { 0.0 };
                Geodetic {
                    latitude_deg: latitude.to_degrees(),
                    longitude_deg,
                    altitude_km: r - radius_km,
                }
            }
            EarthModel::Wgs84 => {
                let mut lat = z.atan2(p * (1.0 - WGS84_E2));
                for _ in 0..WGS84_MAX_ITERATIONS {
                    let sin_lat = lat.sin();
                    let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
                    let next = (z + WGS84_E2 * n * sin_lat).atan2(p);
                    let done = (next - lat).abs() < 1e-14;
                    lat = next;
                    if done {
                        break;
                    }
                }
                let (sin_lat, cos_lat) = lat.sin_cos();
                let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
                // valid at every latitude, including the poles where p ~ 0
                let altitude_km = p * cos_lat + (z + WGS84_E2 * n * sin_lat) * sin_lat - n;
                Geodetic {
                    latitude_deg: lat.to_degrees(),
                    longitude_deg,
                    altitude_km,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(EarthModel::default())]
    #[case(EarthModel::Wgs84)]
    fn geodetic_round_trip(#[case] earth: EarthModel) {
        let points = [(40.7128, -74.006, 0.01), (-33.9, 151.2, 400.0), (78.2, 15.6, 0.5)];
        for (lat, lon, alt) in points {
            let g = Geodetic {
                latitude_deg: lat,
                longitude_deg: lon,
                altitude_km: alt,
            };
            let back = earth.fixed_to_geodetic(earth.geodetic_to_fixed(&g));
            assert_relative_eq!(back.latitude_deg, lat, max_relative = 1e-9);
            assert_relative_eq!(back.longitude_deg, lon, max_relative = 1e-9);
            assert_relative_eq!(back.altitude_km, alt, max_relative = 1e-6, epsilon = 1e-6);
        }
    }

    #[test]
    fn wgs84_equator_and_pole_radii() {
        let equator = EarthModel::Wgs84.geodetic_to_fixed(&Geodetic {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            altitude_km: 0.0,
        });
        assert_relative_eq!(equator[0], 6378.137, epsilon = 1e-9);

        let pole = EarthModel::Wgs84.fixed_to_geodetic([0.0, 0.0, 6356.752_314_2 + 10.0]);
        assert_relative_eq!(pole.latitude_deg, 90.0, epsilon = 1e-9);
        assert_relative_eq!(pole.altitude_km, 10.0, epsilon = 1e-6);
    }
}
