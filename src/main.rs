use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use orbit_o_mat::config::{parse_duration, Config};
use orbit_o_mat::constellation::Target;
use orbit_o_mat::coordinates::Observer;
use orbit_o_mat::elements::{ElementSource, OrbitalElements, Registry, TleDirectory};
use orbit_o_mat::engine::{CollisionQuery, CoverageQuery, Engine, PassQuery, SystemClock};

#[derive(Parser)]
#[command(name = "orbit-o-mat")]
#[command(about = "Satellite propagation, pass prediction and constellation analysis")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,
    /// Folder of TLE files, overrides the configured one
    #[arg(long, global = true)]
    tle_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate the configured element sets
    Validate,
    /// Position of one satellite
    Position {
        id: String,
        /// RFC 3339 timestamp, defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Passes over an observer
    Passes {
        /// "lat,lon" in degrees
        #[arg(long)]
        observer: String,
        #[arg(long, default_value_t = 0.0)]
        altitude_m: f64,
        /// Only these satellites (repeatable)
        #[arg(long = "satellite")]
        satellites: Vec<String>,
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long, default_value = "24h", value_parser = parse_duration)]
        horizon: Duration,
        #[arg(long)]
        min_elevation: Option<f64>,
    },
    /// Hohmann transfer between two circular orbit radii (km)
    Hohmann { r1_km: f64, r2_km: f64 },
    /// Transfer between two element sets (YAML or JSON files)
    Transfer { current: PathBuf, target: PathBuf },
    /// Station-keeping corrections between two element sets (YAML or JSON files)
    StationKeeping { current: PathBuf, target: PathBuf },
    /// Closest approach of two registered satellites
    Collision {
        first: String,
        second: String,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_duration)]
        horizon: Option<Duration>,
        #[arg(long)]
        radius_km: Option<f64>,
    },
    /// Coverage of ground targets by the constellation
    Coverage {
        /// "id:lat,lon" (repeatable)
        #[arg(long = "target", required = true, value_parser = parse_target)]
        targets: Vec<Target>,
        #[arg(long = "satellite")]
        satellites: Vec<String>,
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_duration)]
        horizon: Option<Duration>,
    },
    /// Run the position refresh for a while and print the final snapshot
    Run {
        #[arg(long, default_value = "10s", value_parser = parse_duration)]
        duration: Duration,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Commands::Hohmann { r1_km, r2_km } => {
            let engine = Engine::with_registry(Arc::new(Registry::new()));
            report(engine.hohmann(r1_km, r2_km))
        }
        Commands::Transfer { current, target } => {
            let engine = build_engine(&config, Registry::new());
            match read_elements(&current).and_then(|c| Ok((c, read_elements(&target)?))) {
                Ok((c, t)) => report(engine.plan_maneuver(&c, &t)),
                Err(e) => fail(e),
            }
        }
        Commands::StationKeeping { current, target } => {
            let engine = build_engine(&config, Registry::new());
            match read_elements(&current).and_then(|c| Ok((c, read_elements(&target)?))) {
                Ok((c, t)) => report(engine.station_keeping(&c, &t)),
                Err(e) => fail(e),
            }
        }
        command => {
            let registry = match load_registry(&config, cli.tle_dir) {
                Ok(r) => r,
                Err(e) => return fail(e),
            };
            let engine = build_engine(&config, registry);
            run_query(engine, command).await
        }
    }
}

async fn run_query(engine: Engine, command: Commands) -> ExitCode {
    match command {
        Commands::Validate => {
            let ids = match engine.registry().ids() {
                Ok(ids) => ids,
                Err(e) => return fail(e),
            };
            println!("{} valid element sets", ids.len());
            for id in ids {
                if let Ok(record) = engine.registry().get(&id) {
                    println!(
                        "  {}: {} (a = {:.1} km, e = {:.5}, i = {:.2} deg, epoch {})",
                        id,
                        record.info.name,
                        record.elements.semi_major_axis_km,
                        record.elements.eccentricity,
                        record.elements.inclination_deg,
                        record.elements.epoch
                    );
                }
            }
            ExitCode::SUCCESS
        }
        Commands::Position { id, at } => report(engine.position(&id, at)),
        Commands::Passes {
            observer,
            altitude_m,
            satellites,
            start,
            horizon,
            min_elevation,
        } => {
            let observer = match Observer::from_coordinates(&observer, Some(altitude_m)) {
                Ok(o) => o,
                Err(e) => return fail(e),
            };
            let query = PassQuery {
                observer,
                satellite_ids: (!satellites.is_empty()).then_some(satellites),
                start,
                horizon,
                min_elevation_deg: min_elevation,
            };
            report(engine.predict_passes(query).await)
        }
        Commands::Collision {
            first,
            second,
            at,
            horizon,
            radius_km,
        } => {
            let query = CollisionQuery {
                at,
                horizon,
                radius_first_km: radius_km,
                radius_second_km: radius_km,
                ..CollisionQuery::new(first, second)
            };
            report(engine.assess_collision(&query))
        }
        Commands::Coverage {
            targets,
            satellites,
            start,
            horizon,
        } => {
            let query = CoverageQuery {
                targets,
                satellite_ids: (!satellites.is_empty()).then_some(satellites),
                start,
                horizon,
            };
            report(engine.coverage(query).await)
        }
        Commands::Run { duration } => {
            if let Err(e) = engine.start() {
                return fail(e);
            }
            let wait = duration.to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;
            engine.stop().await;
            report(engine.cached_positions().as_deref())
        }
        Commands::Hohmann { .. } | Commands::Transfer { .. } | Commands::StationKeeping { .. } => {
            ExitCode::FAILURE
        }
    }
}

fn build_engine(config: &Config, registry: Registry) -> Engine {
    Engine::new(config, Arc::new(registry), Arc::new(SystemClock))
}

fn load_registry(
    config: &Config,
    tle_dir: Option<PathBuf>,
) -> Result<Registry, orbit_o_mat::elements::ElementsError> {
    match tle_dir {
        Some(dir) => Registry::from_records(TleDirectory::new(dir).load()?),
        None => config.load_registry(),
    }
}

fn read_elements(path: &PathBuf) -> Result<OrbitalElements, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
    // JSON is valid YAML
    let elements: OrbitalElements = serde_yaml::from_str(&content)
        .map_err(|e| format!("Error parsing {}: {}", path.display(), e))?;
    elements
        .validate()
        .map_err(|e| format!("Invalid element set in {}: {}", path.display(), e))?;
    Ok(elements)
}

fn parse_target(s: &str) -> Result<Target, String> {
    let (id, coordinates) = s
        .split_once(':')
        .ok_or_else(|| format!("expected \"id:lat,lon\", got {s:?}"))?;
    let observer = Observer::from_coordinates(coordinates, None).map_err(|e| e.to_string())?;
    Ok(Target {
        id: id.trim().to_string(),
        latitude_deg: observer.latitude_deg,
        longitude_deg: observer.longitude_deg,
        altitude_km: observer.altitude_km,
    })
}

fn report<T: Serialize, E: std::fmt::Display>(result: Result<T, E>) -> ExitCode {
    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => fail(e),
        },
        Err(e) => fail(e),
    }
}

fn fail(e: impl std::fmt::Display) -> ExitCode {
    eprintln!("Error: {}", e);
    ExitCode::FAILURE
}
