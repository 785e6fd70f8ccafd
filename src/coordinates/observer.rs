use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::EARTH_RADIUS_KM;
use crate::coordinates::Geodetic;
use crate::validation::{in_range, ValidationError};

/// A ground observer. Latitude is geodetic for the WGS84 model, geocentric for the spherical one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Observer {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

impl Observer {
    pub fn new(
        latitude_deg: f64,
        longitude_deg: f64,
        altitude_km: f64,
    ) -> Result<Self, ValidationError> {
        let observer = Self {
            latitude_deg,
            longitude_deg,
            altitude_km,
        };
        observer.validate()?;
        Ok(observer)
    }

    /// Parses "lat,lon" (degrees) with an optional altitude in metres.
    pub fn from_coordinates(
        coordinates: &str,
        altitude_m: Option<f64>,
    ) -> Result<Self, ValidationError> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return Err(ValidationError::Invalid {
                field: "coordinates",
                message: format!("expected \"lat,lon\", got {coordinates:?}"),
            });
        }
        let parse = |field: &'static str, text: &str| {
            text.parse::<f64>().map_err(|e| ValidationError::Invalid {
                field,
                message: e.to_string(),
            })
        };
        let lat = parse("latitude_deg", parts[0])?;
        let lon = parse("longitude_deg", parts[1])?;
        Self::new(lat, lon, altitude_m.unwrap_or(0.0) / 1000.0)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        in_range(
            "latitude_deg",
            self.latitude_deg,
            (-90.0..=90.0).contains(&self.latitude_deg),
            "[-90, 90]",
        )?;
        in_range(
            "longitude_deg",
            self.longitude_deg,
            (-180.0..=180.0).contains(&self.longitude_deg),
            "[-180, 180]",
        )?;
        in_range(
            "altitude_km",
            self.altitude_km,
            self.altitude_km > -EARTH_RADIUS_KM,
            "> -Earth radius",
        )?;
        Ok(())
    }

    pub fn geodetic(&self) -> Geodetic {
        Geodetic {
            latitude_deg: self.latitude_deg,
            longitude_deg: self.longitude_deg,
            altitude_km: self.altitude_km,
        }
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }
}
