use chrono::{DateTime, Utc};

use crate::constants::{J2, MU_EARTH, WGS84_A_KM};
use crate::elements::OrbitalElements;
use crate::propagation::kepler::{solve_kepler, true_anomaly_from_eccentric};
use crate::propagation::propagator::{check_radius, elapsed_seconds, Ephemeris};
use crate::propagation::{PropagationError, SatelliteState};
use crate::vector::Vec3;

/// Secular rates applied on top of the Keplerian motion (rad/s).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct SecularRates {
    pub raan: f64,
    pub arg_perigee: f64,
    pub mean_motion: f64,
}

impl SecularRates {
    /// First-order J2 drift of Ω, ω and the mean motion.
    pub fn j2(elements: &OrbitalElements) -> Self {
        let a = elements.semi_major_axis_km;
        let e = elements.eccentricity;
        let n = elements.mean_motion_rad_s();
        let p = a * (1.0 - e * e);
        let k = J2 * (WGS84_A_KM / p).powi(2);
        let inc = elements.inclination_deg.to_radians();
        let (sin_i, cos_i) = inc.sin_cos();

        Self {
            raan: -1.5 * n * k * cos_i,
            arg_perigee: 0.75 * n * k * (5.0 * cos_i * cos_i - 1.0),
            mean_motion: n * (1.0 + 1.5 * k * (1.0 - e * e).sqrt() * (1.0 - 1.5 * sin_i * sin_i)),
        }
    }

    pub fn keplerian(elements: &OrbitalElements) -> Self {
        Self {
            mean_motion: elements.mean_motion_rad_s(),
            ..Self::default()
        }
    }
}

/// Analytic Keplerian ephemeris, optionally with secular drift.
pub(crate) struct KeplerEphemeris {
    elements: OrbitalElements,
    rates: SecularRates,
}

impl KeplerEphemeris {
    pub fn new(elements: OrbitalElements, rates: SecularRates) -> Self {
        Self { elements, rates }
    }
}

impl Ephemeris for KeplerEphemeris {
    fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    fn state_at(&self, timestamp: DateTime<Utc>) -> Result<SatelliteState, PropagationError> {
        let el = &self.elements;
        let dt = elapsed_seconds(el.epoch, timestamp);

        let a = el.semi_major_axis_km;
        let e = el.eccentricity;
        let m = el.mean_anomaly_deg.to_radians() + self.rates.mean_motion * dt;
        let raan = el.raan_deg.to_radians() + self.rates.raan * dt;
        let argp = el.arg_perigee_deg.to_radians() + self.rates.arg_perigee * dt;
        let inc = el.inclination_deg.to_radians();

        let big_e = solve_kepler(m, e)?;
        let nu = true_anomaly_from_eccentric(big_e, e);

        let p = a * (1.0 - e * e);
        let r = a * (1.0 - e * big_e.cos());
        let (sin_nu, cos_nu) = nu.sin_cos();
        let position_pf = [r * cos_nu, r * sin_nu, 0.0];
        let vscale = (MU_EARTH / p).sqrt();
        let velocity_pf = [-vscale * sin_nu, vscale * (e + cos_nu), 0.0];

        let position_km = perifocal_to_inertial(position_pf, raan, inc, argp);
        let velocity_km_s = perifocal_to_inertial(velocity_pf, raan, inc, argp);
        check_radius(position_km)?;

        Ok(SatelliteState {
            timestamp,
            position_km,
            velocity_km_s,
            elements: el.clone(),
        })
    }
}

/// Applies R = Rz(Ω)·Rx(i)·Rz(ω) to a perifocal vector.
pub fn perifocal_to_inertial(v: Vec3, raan: f64, inc: f64, argp: f64) -> Vec3 {
    let (so, co) = raan.sin_cos();
    let (si, ci) = inc.sin_cos();
    let (sw, cw) = argp.sin_cos();

    let r11 = co * cw - so * sw * ci;
    let r12 = -co * sw - so * cw * ci;
    let r21 = so * cw + co * sw * ci;
    let r22 = -so * sw + co * cw * ci;
    let r31 = sw * si;
    let r32 = cw * si;

    [
        r11 * v[0] + r12 * v[1],
        r21 * v[0] + r22 * v[1],
        r31 * v[0] + r32 * v[1],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{dot, norm};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use chrono::{Duration, TimeZone};

    fn elements(e: f64, i: f64) -> OrbitalElements {
        let epoch = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        OrbitalElements::new(7000.0, e, i, 40.0, 60.0, 10.0, epoch).unwrap()
    }

    #[test]
    fn circular_radius_is_semi_major_axis() {
        let el = elements(0.0, 45.0);
        let eph = KeplerEphemeris::new(el.clone(), SecularRates::keplerian(&el));
        for minutes in [0, 17, 45, 90, 600] {
            let state = eph.state_at(el.epoch + Duration::minutes(minutes)).unwrap();
            assert_relative_eq!(state.radius_km(), 7000.0, max_relative = 1e-9);
            assert_abs_diff_eq!(dot(state.position_km, state.velocity_km_s), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn energy_is_conserved_on_an_ellipse() {
        let el = elements(0.05, 63.4);
        let eph = KeplerEphemeris::new(el.clone(), SecularRates::keplerian(&el));
        let energy = |t| {
            let s = eph.state_at(t).unwrap();
            s.speed_km_s().powi(2) / 2.0 - MU_EARTH / s.radius_km()
        };
        let expected = -MU_EARTH / (2.0 * 7000.0);
        assert_relative_eq!(energy(el.epoch), expected, max_relative = 1e-9);
        assert_relative_eq!(
            energy(el.epoch + Duration::minutes(37)),
            expected,
            max_relative = 1e-9
        );
    }

    #[test]
    fn angular_momentum_matches_inclination() {
        let el = elements(0.05, 98.0);
        let eph = KeplerEphemeris::new(el.clone(), SecularRates::keplerian(&el));
        let s = eph.state_at(el.epoch).unwrap();
        let (r, v) = (s.position_km, s.velocity_km_s);
        let h = [
            r[1] * v[2] - r[2] * v[1],
            r[2] * v[0] - r[0] * v[2],
            r[0] * v[1] - r[1] * v[0],
        ];
        let inc = (h[2] / norm(h)).acos().to_degrees();
        assert_abs_diff_eq!(inc, 98.0, epsilon = 1e-9);
    }

    #[test]
    fn j2_regresses_node_of_prograde_orbit() {
        let el = elements(0.001, 51.6);
        let rates = SecularRates::j2(&el);
        // about -5 deg/day for an ISS-like orbit at 7000 km
        let deg_per_day = rates.raan.to_degrees() * 86_400.0;
        assert!(deg_per_day < -4.0 && deg_per_day > -6.0, "{deg_per_day}");

        let polar = SecularRates::j2(&elements(0.001, 90.0));
        assert_abs_diff_eq!(polar.raan, 0.0, epsilon = 1e-15);
    }
}
