use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::rstest;

use orbit_o_mat::abort::AbortHandle;
use orbit_o_mat::coordinates::{CoordinateTransform, Observer};
use orbit_o_mat::elements::{OrbitalElements, SatelliteInfo};
use orbit_o_mat::maneuver::{hohmann_transfer, BurnDirection, ManeuverKind};
use orbit_o_mat::predict::{PassPredictor, SearchSettings};
use orbit_o_mat::propagation::{PropagationError, PropagationModel, Propagator};
use orbit_o_mat::vector::{norm, sub};

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap()
}

fn iss_like() -> OrbitalElements {
    OrbitalElements::new(6793.0, 0.0003, 51.6, 247.5, 130.5, 325.0, epoch()).unwrap()
}

#[test]
fn iss_like_orbit_period() {
    let elements = iss_like();
    assert_relative_eq!(elements.period_s() / 60.0, 92.7, max_relative = 0.005);
    assert_relative_eq!(elements.mean_motion_rev_day(), 15.5, max_relative = 0.01);
}

#[test]
fn two_body_orbit_closes_after_one_period() {
    let elements = iss_like();
    let propagator = Propagator::new(PropagationModel::TwoBody);
    let period = Duration::microseconds((elements.period_s() * 1e6).round() as i64);

    let start = propagator.propagate(&elements, epoch()).unwrap();
    let half = propagator.propagate(&elements, epoch() + period / 2).unwrap();
    let full = propagator.propagate(&elements, epoch() + period).unwrap();

    assert!(norm(sub(full.position_km, start.position_km)) < 1e-3);
    assert!(norm(sub(full.velocity_km_s, start.velocity_km_s)) < 1e-6);
    // Half an orbit later the satellite is on the other side of the Earth
    assert_relative_eq!(
        norm(sub(half.position_km, start.position_km)),
        2.0 * 6793.0,
        max_relative = 0.001
    );
}

#[test]
fn leo_to_geo_hohmann_transfer() {
    let plan = hohmann_transfer(7000.0, 42164.0).unwrap();

    assert_eq!(plan.kind, ManeuverKind::Hohmann);
    assert_eq!(plan.burns.len(), 2);
    assert_relative_eq!(plan.burns[0].delta_v_km_s, 2.337, max_relative = 0.005);
    assert_relative_eq!(plan.burns[1].delta_v_km_s, 1.434, max_relative = 0.005);
    assert_relative_eq!(plan.total_delta_v_km_s, 3.77, max_relative = 0.01);
    assert_relative_eq!(plan.transfer_time_s / 3600.0, 5.25, max_relative = 0.03);
    assert!(plan
        .burns
        .iter()
        .all(|burn| burn.direction == BurnDirection::Prograde));
}

#[rstest]
#[case(PropagationModel::TwoBody)]
#[case(PropagationModel::J2)]
fn iss_like_orbit_passes_over_new_york(#[case] model: PropagationModel) {
    let observer = Observer::new(40.7128, -74.0060, 0.0).unwrap();
    let satellite = SatelliteInfo {
        id: "iss_like".to_string(),
        name: "ISS-like".to_string(),
        norad_id: None,
        source: "test".to_string(),
    };
    let ephemeris = Propagator::new(model).prepare(&iss_like()).unwrap();
    let predictor = PassPredictor::new(CoordinateTransform::default(), SearchSettings::default());
    let start = epoch();
    let end = start + Duration::hours(24);

    let search = predictor
        .predict(
            ephemeris.as_ref(),
            &satellite,
            &observer,
            start,
            end,
            10.0,
            &AbortHandle::new(),
        )
        .unwrap();

    assert!(!search.truncated);
    assert!(!search.passes.is_empty());
    for pass in &search.passes {
        assert_eq!(pass.satellite_id, "iss_like");
        assert!(pass.max_elevation_deg >= 10.0);
        assert!(pass.duration_minutes > 0.0);
        // A 400 km orbit is never above the horizon for long
        assert!(pass.duration_minutes < 20.0);
        assert!(pass.start >= start && pass.end <= end);
        assert!(pass.start <= pass.max_elevation_time && pass.max_elevation_time <= pass.end);
    }
    for pair in search.passes.windows(2) {
        assert!(pair[0].end < pair[1].start);
    }
}

#[test]
fn hyperbolic_elements_do_not_propagate() {
    let mut elements = iss_like();
    elements.eccentricity = 1.2;

    for model in [PropagationModel::TwoBody, PropagationModel::J2, PropagationModel::Sgp4] {
        let err = Propagator::new(model)
            .propagate(&elements, epoch() + Duration::minutes(10))
            .unwrap_err();
        assert!(
            matches!(err, PropagationError::InvalidElements { field: "eccentricity", .. }),
            "{model}: {err}"
        );
    }
}
