use std::f64::consts::TAU;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::{EARTH_RADIUS_KM, MIN_PERIGEE_ALTITUDE_KM, MU_EARTH, SECONDS_PER_DAY};
use crate::validation::{finite, in_range, ValidationError};
use crate::vector::{cross, dot, norm, scale, sub, Vec3};

/// Below this eccentricity the orbit counts as circular and ω is fixed at 0.
const CIRCULAR_EPSILON: f64 = 1e-9;
/// Below this node-vector fraction of |h| the orbit counts as equatorial and Ω is fixed at 0.
const EQUATORIAL_EPSILON: f64 = 1e-11;

/// Keplerian element set of one satellite, valid at `epoch`.
///
/// Angles are in degrees. An element set is never edited in place: updates
/// build a new value and swap it into the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrbitalElements {
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    pub epoch: DateTime<Utc>,
    /// B* drag term (1/earth radii)
    #[serde(default)]
    pub drag_term: f64,
    #[serde(default)]
    pub mean_motion_dot: f64,
    #[serde(default)]
    pub mean_motion_ddot: f64,
    #[serde(default)]
    pub norad_id: Option<u64>,
}

impl OrbitalElements {
    /// Builds a validated element set. Ω, ω and M are wrapped into [0, 360).
    pub fn new(
        semi_major_axis_km: f64,
        eccentricity: f64,
        inclination_deg: f64,
        raan_deg: f64,
        arg_perigee_deg: f64,
        mean_anomaly_deg: f64,
        epoch: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let elements = Self {
            semi_major_axis_km,
            eccentricity,
            inclination_deg,
            raan_deg: wrap_degrees(finite("raan_deg", raan_deg)?),
            arg_perigee_deg: wrap_degrees(finite("arg_perigee_deg", arg_perigee_deg)?),
            mean_anomaly_deg: wrap_degrees(finite("mean_anomaly_deg", mean_anomaly_deg)?),
            epoch,
            drag_term: 0.0,
            mean_motion_dot: 0.0,
            mean_motion_ddot: 0.0,
            norad_id: None,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// Same as [`OrbitalElements::new`] with the orbit size given as mean motion (rev/day).
    pub fn from_mean_motion(
        mean_motion_rev_day: f64,
        eccentricity: f64,
        inclination_deg: f64,
        raan_deg: f64,
        arg_perigee_deg: f64,
        mean_anomaly_deg: f64,
        epoch: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let n = in_range(
            "mean_motion",
            mean_motion_rev_day,
            mean_motion_rev_day > 0.0,
            "> 0 rev/day",
        )?;
        Self::new(
            semi_major_axis_from_mean_motion(n),
            eccentricity,
            inclination_deg,
            raan_deg,
            arg_perigee_deg,
            mean_anomaly_deg,
            epoch,
        )
    }

    /// Osculating two-body elements of an inertial state (km, km/s) at `epoch`.
    ///
    /// Circular orbits take ω = 0 and measure the anomaly from the ascending
    /// node (argument of latitude). Equatorial orbits take Ω = 0 and measure
    /// from the x axis, so a circular equatorial orbit carries its true
    /// longitude in the mean anomaly.
    pub fn from_state(
        position_km: Vec3,
        velocity_km_s: Vec3,
        epoch: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        for (field, vector) in [("position_km", position_km), ("velocity_km_s", velocity_km_s)] {
            for component in vector {
                finite(field, component)?;
            }
        }
        let r = norm(position_km);
        let v = norm(velocity_km_s);
        if r == 0.0 {
            return Err(ValidationError::Invalid {
                field: "position_km",
                message: "state at the centre of the Earth".to_string(),
            });
        }

        let h = cross(position_km, velocity_km_s);
        let h_norm = norm(h);
        if h_norm == 0.0 {
            return Err(ValidationError::Invalid {
                field: "velocity_km_s",
                message: "radial or zero velocity has no orbital plane".to_string(),
            });
        }
        let h_unit = scale(h, 1.0 / h_norm);

        let energy = v * v / 2.0 - MU_EARTH / r;
        let e_vec = scale(
            sub(
                scale(position_km, v * v - MU_EARTH / r),
                scale(velocity_km_s, dot(position_km, velocity_km_s)),
            ),
            1.0 / MU_EARTH,
        );
        let e = norm(e_vec);
        if energy >= 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "eccentricity",
                value: e,
                expected: "[0, 1)",
            });
        }
        let a = -MU_EARTH / (2.0 * energy);
        let inc = (h[2] / h_norm).clamp(-1.0, 1.0).acos();

        // ascending node direction, z × h
        let node = [-h[1], h[0], 0.0];
        let equatorial = norm(node) < EQUATORIAL_EPSILON * h_norm;
        let circular = e < CIRCULAR_EPSILON;

        let reference = if equatorial { [1.0, 0.0, 0.0] } else { node };
        let raan = if equatorial { 0.0 } else { node[1].atan2(node[0]) };
        let angle = |from: Vec3, to: Vec3| dot(cross(from, to), h_unit).atan2(dot(from, to));
        let (arg_perigee, nu) = if circular {
            (0.0, angle(reference, position_km))
        } else {
            (angle(reference, e_vec), angle(e_vec, position_km))
        };

        let eccentric = ((1.0 - e * e).sqrt() * nu.sin()).atan2(e + nu.cos());
        let mean_anomaly = eccentric - e * eccentric.sin();

        Self::new(
            a,
            if circular { 0.0 } else { e },
            inc.to_degrees(),
            raan.to_degrees(),
            arg_perigee.to_degrees(),
            mean_anomaly.to_degrees(),
            epoch,
        )
    }

    pub fn with_drag_term(mut self, drag_term: f64) -> Self {
        self.drag_term = drag_term;
        self
    }

    pub fn with_norad_id(mut self, norad_id: u64) -> Self {
        self.norad_id = Some(norad_id);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        in_range(
            "semi_major_axis_km",
            self.semi_major_axis_km,
            self.semi_major_axis_km > EARTH_RADIUS_KM + MIN_PERIGEE_ALTITUDE_KM,
            "> Earth radius + minimum perigee altitude",
        )?;
        in_range(
            "eccentricity",
            self.eccentricity,
            (0.0..1.0).contains(&self.eccentricity),
            "[0, 1)",
        )?;
        in_range(
            "perigee_altitude_km",
            self.perigee_altitude_km(),
            self.perigee_altitude_km() > MIN_PERIGEE_ALTITUDE_KM,
            "> minimum perigee altitude",
        )?;
        in_range(
            "inclination_deg",
            self.inclination_deg,
            (0.0..=180.0).contains(&self.inclination_deg),
            "[0, 180]",
        )?;
        for (field, value) in [
            ("raan_deg", self.raan_deg),
            ("arg_perigee_deg", self.arg_perigee_deg),
            ("mean_anomaly_deg", self.mean_anomaly_deg),
        ] {
            in_range(field, value, (0.0..360.0).contains(&value), "[0, 360)")?;
        }
        finite("drag_term", self.drag_term)?;
        Ok(())
    }

    /// Mean motion in rad/s.
    pub fn mean_motion_rad_s(&self) -> f64 {
        (MU_EARTH / self.semi_major_axis_km.powi(3)).sqrt()
    }

    pub fn mean_motion_rev_day(&self) -> f64 {
        self.mean_motion_rad_s() * SECONDS_PER_DAY / TAU
    }

    /// Orbital period from Kepler's third law (seconds).
    pub fn period_s(&self) -> f64 {
        TAU / self.mean_motion_rad_s()
    }

    pub fn perigee_altitude_km(&self) -> f64 {
        self.semi_major_axis_km * (1.0 - self.eccentricity) - EARTH_RADIUS_KM
    }

    pub fn apogee_altitude_km(&self) -> f64 {
        self.semi_major_axis_km * (1.0 + self.eccentricity) - EARTH_RADIUS_KM
    }
}

/// a = (μ / n²)^(1/3) with n converted to rad/s.
pub fn semi_major_axis_from_mean_motion(mean_motion_rev_day: f64) -> f64 {
    let n = mean_motion_rev_day * TAU / SECONDS_PER_DAY;
    (MU_EARTH / (n * n)).cbrt()
}

pub(crate) fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Information about a single registered satellite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SatelliteInfo {
    pub id: String,
    pub name: String,
    pub norad_id: Option<u64>,
    /// Where the element set came from (file name, "inline", ...)
    pub source: String,
}

/// A satellite with its current element set, as held by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteRecord {
    pub info: SatelliteInfo,
    pub elements: OrbitalElements,
}

impl SatelliteRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, elements: OrbitalElements) -> Self {
        Self {
            info: SatelliteInfo {
                id: id.into(),
                name: name.into(),
                norad_id: elements.norad_id,
                source: "structured".to_string(),
            },
            elements,
        }
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }
}
