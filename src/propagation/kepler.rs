use std::f64::consts::PI;

use crate::propagation::error::PropagationError;

/// Convergence tolerance on the eccentric anomaly (radians).
pub const KEPLER_TOLERANCE_RAD: f64 = 1e-12;
pub const KEPLER_MAX_ITERATIONS: u32 = 50;

/// Solves M = E - e·sin(E) for E by Newton-Raphson.
///
/// `mean_anomaly` is in radians and may be any finite value; the result lies
/// in the same revolution as the normalised input.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> Result<f64, PropagationError> {
    let m = mean_anomaly.rem_euclid(2.0 * PI);
    let mut e_anom = if eccentricity >= 0.8 { PI } else { m };

    let mut residual = f64::INFINITY;
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let f = e_anom - eccentricity * e_anom.sin() - m;
        let f_prime = 1.0 - eccentricity * e_anom.cos();
        let step = f / f_prime;
        e_anom -= step;
        residual = step.abs();
        if residual < KEPLER_TOLERANCE_RAD {
            return Ok(e_anom);
        }
    }

    Err(PropagationError::NonConvergent {
        iterations: KEPLER_MAX_ITERATIONS,
        residual,
    })
}

pub fn true_anomaly_from_eccentric(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half = eccentric_anomaly / 2.0;
    2.0 * ((1.0 + eccentricity).sqrt() * half.sin())
        .atan2((1.0 - eccentricity).sqrt() * half.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(1.0, 0.1)]
    #[case(3.0, 0.5)]
    #[case(0.2, 0.9)]
    #[case(5.5, 0.99)]
    fn solution_satisfies_keplers_equation(#[case] m: f64, #[case] e: f64) {
        let big_e = solve_kepler(m, e).unwrap();
        assert_abs_diff_eq!(big_e - e * big_e.sin(), m, epsilon = 1e-10);
    }

    #[test]
    fn circular_orbit_anomalies_coincide() {
        let big_e = solve_kepler(1.234, 0.0).unwrap();
        assert_abs_diff_eq!(big_e, 1.234, epsilon = 1e-12);
        assert_abs_diff_eq!(true_anomaly_from_eccentric(big_e, 0.0), 1.234, epsilon = 1e-12);
    }

    #[test]
    fn true_anomaly_is_ahead_of_eccentric_before_apoapsis() {
        let big_e = solve_kepler(1.0, 0.3).unwrap();
        assert!(true_anomaly_from_eccentric(big_e, 0.3) > big_e);
    }
}
