use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use orbit_o_mat::constellation::{Recommendation, Target};
use orbit_o_mat::coordinates::Observer;
use orbit_o_mat::elements::{ElementsError, InlineTles, OrbitalElements, Registry, SatelliteRecord};
use orbit_o_mat::engine::{CollisionQuery, CoverageQuery, FixedClock, PassQuery};
use orbit_o_mat::predict::PredictError;
use orbit_o_mat::validation::ValidationError;
use orbit_o_mat::{Config, Engine, EngineError};

const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008
";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 7, 13, 0, 0, 0).unwrap()
}

fn chaser() -> SatelliteRecord {
    let elements =
        OrbitalElements::new(6790.0, 0.0005, 51.64, 221.3, 89.2, 281.5, now()).unwrap();
    SatelliteRecord::new("chaser", "Chaser", elements)
}

fn engine() -> Engine {
    engine_with(&Config::default())
}

fn engine_with(config: &Config) -> Engine {
    let registry = Registry::new();
    registry.load_from(&InlineTles::new("test", ISS_TLE)).unwrap();
    registry.add(chaser()).unwrap();
    Engine::new(config, Arc::new(registry), Arc::new(FixedClock(now())))
}

fn new_york() -> Observer {
    Observer::new(40.7128, -74.0060, 0.0).unwrap()
}

#[tokio::test]
async fn start_and_stop() {
    let engine = engine();
    assert!(!engine.is_running());

    engine.start().unwrap();
    assert!(engine.is_running());
    assert!(matches!(engine.start(), Err(EngineError::AlreadyRunning)));

    engine.stop().await;
    assert!(!engine.is_running());
    // Stopping twice is harmless and the engine can be restarted
    engine.stop().await;
    engine.start().unwrap();
    engine.stop().await;
}

#[tokio::test]
async fn running_engine_refreshes_on_its_own() {
    let mut config = Config::default();
    config.engine.refresh_interval = Duration::milliseconds(20);
    let engine = engine_with(&config);
    assert_eq!(engine.cached_positions().unwrap().refreshed_at, None);

    engine.start().unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let cache = engine.cached_positions().unwrap();
    assert_eq!(cache.refreshed_at, Some(now()));
    assert_eq!(cache.positions.len(), 2);
    assert!(engine.status().unwrap().running);
    engine.stop().await;
}

#[tokio::test]
async fn refresh_fills_the_position_cache() {
    let engine = engine();
    assert!(engine.cached_positions().unwrap().positions.is_empty());

    engine.refresh_now();

    let cache = engine.cached_positions().unwrap();
    assert_eq!(cache.refreshed_at, Some(now()));
    assert_eq!(cache.positions.len(), 2);
    let iss = &cache.positions["iss_zarya"];
    assert_eq!(iss.satellite_name, "ISS (ZARYA)");
    assert_eq!(iss.timestamp, now());

    let status = engine.status().unwrap();
    assert_eq!(status.satellites, 2);
    assert_eq!(status.cached_positions, 2);
    assert_eq!(status.model, "sgp4");
    assert!(!status.running);
}

#[test]
fn position_of_a_registered_satellite() {
    let engine = engine();
    let position = engine.position("iss_zarya", None).unwrap();

    assert_eq!(position.timestamp, now());
    let radius = orbit_o_mat::vector::norm(position.position_km);
    assert!((6650.0..6850.0).contains(&radius), "radius {radius}");
    assert!(position.geodetic.latitude_deg.abs() <= 52.0);
    assert!((300.0..500.0).contains(&position.geodetic.altitude_km));

    let later = engine
        .position("iss_zarya", Some(now() + Duration::minutes(10)))
        .unwrap();
    assert_eq!(later.timestamp, now() + Duration::minutes(10));
    assert_ne!(later.position_km, position.position_km);
}

#[test]
fn unknown_satellite_is_not_found() {
    let engine = engine();
    assert!(matches!(
        engine.position("hubble", None),
        Err(EngineError::Elements(ElementsError::NotFound(_)))
    ));
}

#[tokio::test]
async fn passes_over_new_york() {
    let engine = engine();
    let search = engine
        .predict_passes(PassQuery {
            observer: new_york(),
            satellite_ids: None,
            start: None,
            horizon: Duration::hours(24),
            min_elevation_deg: None,
        })
        .await
        .unwrap();

    assert!(!search.truncated);
    assert!(!search.passes.is_empty());
    for pass in &search.passes {
        assert!(pass.start >= now() && pass.end <= now() + Duration::hours(24));
        assert!(pass.max_elevation_deg >= 10.0);
        assert!(pass.duration_minutes > 0.0);
    }
    for pair in search.passes.windows(2) {
        assert!(pair[0].start <= pair[1].start);
    }

    let only_iss = engine
        .predict_passes(PassQuery {
            observer: new_york(),
            satellite_ids: Some(vec!["iss_zarya".to_string()]),
            start: Some(now()),
            horizon: Duration::hours(24),
            min_elevation_deg: Some(10.0),
        })
        .await
        .unwrap();
    assert!(!only_iss.passes.is_empty());
    assert!(only_iss.passes.iter().all(|p| p.satellite_id == "iss_zarya"));
    assert!(only_iss.passes.len() < search.passes.len());
}

#[tokio::test]
async fn pass_query_is_validated() {
    let engine = engine();
    let mut observer = new_york();
    observer.latitude_deg = 95.0;

    let result = engine
        .predict_passes(PassQuery {
            observer,
            satellite_ids: None,
            start: None,
            horizon: Duration::hours(1),
            min_elevation_deg: None,
        })
        .await;
    assert!(matches!(result, Err(EngineError::Validation(_))));

    let result = engine
        .predict_passes(PassQuery {
            observer: new_york(),
            satellite_ids: Some(vec!["hubble".to_string()]),
            start: None,
            horizon: Duration::hours(1),
            min_elevation_deg: None,
        })
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Elements(ElementsError::NotFound(_)))
    ));
}

#[tokio::test]
async fn over_long_horizon_is_clipped_and_flagged() {
    let engine = engine();
    let search = engine
        .predict_passes(PassQuery {
            observer: new_york(),
            satellite_ids: Some(vec!["iss_zarya".to_string()]),
            start: None,
            horizon: Duration::days(365 * 1_000_000),
            min_elevation_deg: None,
        })
        .await
        .unwrap();

    assert!(search.truncated);
    assert!(!search.passes.is_empty());
    let limit = now() + Duration::days(30);
    assert!(search.passes.iter().all(|p| p.end <= limit));

    let report = engine
        .coverage(CoverageQuery {
            targets: vec![Target {
                id: "nyc".to_string(),
                latitude_deg: 40.7128,
                longitude_deg: -74.0060,
                altitude_km: 0.0,
            }],
            satellite_ids: Some(vec!["chaser".to_string()]),
            start: None,
            horizon: Some(Duration::days(365 * 1_000_000)),
        })
        .await
        .unwrap();
    assert!(report.truncated);
    assert_eq!(report.window_end, limit);
}

#[tokio::test]
async fn window_past_the_calendar_is_rejected() {
    let engine = engine();
    let result = engine
        .predict_passes(PassQuery {
            observer: new_york(),
            satellite_ids: None,
            start: Some(DateTime::<Utc>::MAX_UTC - Duration::hours(1)),
            horizon: Duration::hours(2),
            min_elevation_deg: None,
        })
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Validation(ValidationError::Invalid { field: "horizon", .. }))
    ));
}

#[tokio::test]
async fn slow_search_times_out() {
    let mut config = Config::default();
    config.engine.search_timeout = Duration::milliseconds(1);
    let engine = engine_with(&config);

    let result = engine
        .predict_passes(PassQuery {
            observer: new_york(),
            satellite_ids: None,
            start: None,
            horizon: Duration::days(30),
            min_elevation_deg: None,
        })
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Predict(PredictError::TimedOut))
    ));
}

#[test]
fn collision_between_nearby_satellites() {
    let engine = engine();
    let separation = {
        let a = engine.position("iss_zarya", None).unwrap();
        let b = engine.position("chaser", None).unwrap();
        orbit_o_mat::vector::norm(orbit_o_mat::vector::sub(a.position_km, b.position_km))
    };

    let query = CollisionQuery {
        horizon: Some(Duration::minutes(10)),
        ..CollisionQuery::new("iss_zarya", "chaser")
    };
    let assessment = engine.assess_collision(&query).unwrap();

    assert!(assessment.closest_approach_km >= 0.0);
    assert!(assessment.closest_approach_km <= separation + 1e-6);
    assert!(assessment.time_to_closest_approach_s >= 0.0);
    assert!(assessment.time_to_closest_approach_s <= 600.0);
    assert!((assessment.min_separation_km - 0.02).abs() < 1e-12);
    assert_eq!(
        assessment.risk,
        assessment.closest_approach_km < assessment.min_separation_km
    );

    let missing = CollisionQuery::new("iss_zarya", "hubble");
    assert!(matches!(
        engine.assess_collision(&missing),
        Err(EngineError::Elements(ElementsError::NotFound(_)))
    ));
}

#[tokio::test]
async fn coverage_of_two_targets() {
    let engine = engine();
    let targets = vec![
        Target {
            id: "nyc".to_string(),
            latitude_deg: 40.7128,
            longitude_deg: -74.0060,
            altitude_km: 0.0,
        },
        Target {
            id: "madrid".to_string(),
            latitude_deg: 40.4168,
            longitude_deg: -3.7038,
            altitude_km: 0.65,
        },
    ];

    let report = engine
        .coverage(CoverageQuery {
            targets,
            satellite_ids: None,
            start: None,
            horizon: None,
        })
        .await
        .unwrap();

    assert_eq!(report.window_start, now());
    assert_eq!(report.window_end, now() + Duration::hours(24));
    assert_eq!(report.targets.len(), 2);
    // Satellites are taken in id order and dealt out round-robin
    assert_eq!(report.targets[0].assigned_satellite, "chaser");
    assert_eq!(report.targets[1].assigned_satellite, "iss_zarya");
    for target in &report.targets {
        assert!((0.0..=100.0).contains(&target.coverage_percent));
        assert!(target.covered_minutes > 0.0);
        for window in &target.windows {
            assert!(window.start < window.end);
        }
    }
    assert!(report.minimum_coverage_percent <= report.average_coverage_percent);
    assert!(report.average_coverage_percent <= report.maximum_coverage_percent);
    // Two LEO satellites cover a mid-latitude site for a few percent of a day
    assert!(report
        .recommendations
        .contains(&Recommendation::AddMoreSatellites));
}

#[tokio::test]
async fn coverage_without_targets_is_rejected() {
    let engine = engine();
    let result = engine
        .coverage(CoverageQuery {
            targets: Vec::new(),
            satellite_ids: None,
            start: None,
            horizon: None,
        })
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Validation(ValidationError::Invalid { field: "targets", .. }))
    ));
}

#[test]
fn upsert_and_remove() {
    let engine = engine();

    engine.remove("iss_zarya").unwrap();
    assert_eq!(engine.registry().len(), 1);
    assert!(matches!(
        engine.remove("iss_zarya"),
        Err(EngineError::Elements(ElementsError::NotFound(_)))
    ));

    let id = engine.upsert_tle(ISS_TLE).unwrap();
    assert_eq!(id, "iss_zarya");
    assert_eq!(engine.registry().len(), 2);

    let mut moved = chaser();
    moved.elements.semi_major_axis_km = 7000.0;
    engine.upsert(moved).unwrap();
    let stored = engine.registry().get("chaser").unwrap();
    assert_eq!(stored.elements.semi_major_axis_km, 7000.0);

    assert!(matches!(
        engine.upsert_tle("not a tle"),
        Err(EngineError::Elements(_))
    ));
}
