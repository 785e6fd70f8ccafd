use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::abort::AbortHandle;
use crate::collision::{assess, CollisionAssessment};
use crate::constellation::{ConstellationReport, TargetPasses};
use crate::coordinates::Observer;
use crate::elements::{
    parse_tle_lines, record_from_tle, ElementSource, ElementsError, OrbitalElements,
    SatelliteRecord, Snapshot,
};
use crate::engine::engine::Engine;
use crate::engine::error::EngineError;
use crate::engine::refresh::position_of;
use crate::engine::types::{CollisionQuery, CoverageQuery, PassQuery, Position};
use crate::maneuver::{ManeuverPlan, StationKeepingPlan};
use crate::predict::{PassSearch, PredictError};
use crate::validation::ValidationError;

/// One (satellite, observer) pass search handed to the worker pool.
struct SearchJob {
    tag: usize,
    record: Arc<SatelliteRecord>,
    observer: Observer,
}

impl Engine {
    /// Replaces the registry contents with everything `source` yields.
    pub fn load(&self, source: &dyn ElementSource) -> Result<usize, EngineError> {
        Ok(self.registry.load_from(source)?)
    }

    pub fn upsert(&self, record: SatelliteRecord) -> Result<(), EngineError> {
        log::info!("Updating element set of {}", record.id());
        Ok(self.registry.replace(record)?)
    }

    /// Inserts or replaces a satellite from two or three TLE lines; returns its id.
    pub fn upsert_tle(&self, tle: &str) -> Result<String, EngineError> {
        let (name, line1, line2) = parse_tle_lines(tle)?;
        let record = record_from_tle(name, &line1, &line2, "api")?;
        let id = record.id().to_string();
        self.upsert(record)?;
        Ok(id)
    }

    pub fn remove(&self, id: &str) -> Result<(), EngineError> {
        self.registry.remove(id)?;
        log::info!("Removed satellite {}", id);
        Ok(())
    }

    /// Position of one satellite at `at` (default: the engine clock). Never uses the cache.
    pub fn position(&self, id: &str, at: Option<DateTime<Utc>>) -> Result<Position, EngineError> {
        let record = self.registry.get(id)?;
        let at = at.unwrap_or_else(|| self.clock.now());
        position_of(&record, &self.propagator, &self.transform, at).map_err(|source| {
            EngineError::Propagation {
                satellite: id.to_string(),
                source,
            }
        })
    }

    /// Passes over one observer, all selected satellites, sorted by start time.
    ///
    /// Satellites whose element sets fail to propagate are logged and skipped.
    pub async fn predict_passes(&self, query: PassQuery) -> Result<PassSearch, EngineError> {
        query.observer.validate()?;
        let min_elevation = query
            .min_elevation_deg
            .unwrap_or(self.predictor.settings().min_elevation_deg);
        let start = query.start.unwrap_or_else(|| self.clock.now());
        let (end, clipped) = self.window_end(start, query.horizon)?;

        let snapshot = self.registry.snapshot()?;
        let jobs = select(&snapshot, query.satellite_ids.as_deref())?
            .into_iter()
            .enumerate()
            .map(|(tag, record)| SearchJob {
                tag,
                record,
                observer: query.observer,
            })
            .collect();

        let results = self.run_searches(jobs, start, end, min_elevation).await?;
        let mut merged = PassSearch::merge(results.into_iter().map(|(_, search)| search));
        merged.truncated |= clipped;
        log::info!(
            "Found {} passes between {} and {}{}",
            merged.passes.len(),
            start,
            end,
            if merged.truncated { " (truncated)" } else { "" }
        );
        Ok(merged)
    }

    pub fn plan_maneuver(
        &self,
        current: &OrbitalElements,
        target: &OrbitalElements,
    ) -> Result<ManeuverPlan, EngineError> {
        Ok(self.planner.plan(current, target)?)
    }

    pub fn hohmann(&self, r1_km: f64, r2_km: f64) -> Result<ManeuverPlan, EngineError> {
        Ok(self.planner.hohmann(r1_km, r2_km)?)
    }

    pub fn station_keeping(
        &self,
        current: &OrbitalElements,
        target: &OrbitalElements,
    ) -> Result<StationKeepingPlan, EngineError> {
        Ok(self.planner.station_keeping(current, target)?)
    }

    /// Closest approach of two registered satellites, both taken from one registry snapshot.
    pub fn assess_collision(
        &self,
        query: &CollisionQuery,
    ) -> Result<CollisionAssessment, EngineError> {
        let snapshot = self.registry.snapshot()?;
        let lookup = |id: &str| {
            snapshot
                .get(id)
                .cloned()
                .ok_or_else(|| ElementsError::NotFound(id.to_string()))
        };
        let first = lookup(&query.first)?;
        let second = lookup(&query.second)?;
        let at = query.at.unwrap_or_else(|| self.clock.now());

        let propagate = |record: &SatelliteRecord| {
            self.propagator
                .propagate(&record.elements, at)
                .map_err(|source| EngineError::Propagation {
                    satellite: record.id().to_string(),
                    source,
                })
        };
        let state_first = propagate(first.as_ref())?;
        let state_second = propagate(second.as_ref())?;

        let default_radius = self.collision.default_radius_km;
        let assessment = assess(
            &state_first,
            &state_second,
            query.radius_first_km.unwrap_or(default_radius),
            query.radius_second_km.unwrap_or(default_radius),
            query.horizon.unwrap_or(self.collision.default_horizon),
        )?;
        if assessment.risk {
            log::warn!(
                "Conjunction risk between {} and {}: {:.3} km at {}",
                query.first,
                query.second,
                assessment.closest_approach_km,
                assessment.closest_approach_time
            );
        }
        Ok(assessment)
    }

    /// Coverage of every target by the selected satellites, with round-robin tasking.
    pub async fn coverage(&self, query: CoverageQuery) -> Result<ConstellationReport, EngineError> {
        if query.targets.is_empty() {
            return Err(ValidationError::Invalid {
                field: "targets",
                message: "no targets to cover".to_string(),
            }
            .into());
        }
        let observers = query
            .targets
            .iter()
            .map(|t| t.observer())
            .collect::<Result<Vec<_>, _>>()?;

        let settings = self.coordinator.settings();
        let start = query.start.unwrap_or_else(|| self.clock.now());
        let (end, clipped) =
            self.window_end(start, query.horizon.unwrap_or(settings.default_horizon))?;

        let snapshot = self.registry.snapshot()?;
        let records = select(&snapshot, query.satellite_ids.as_deref())?;
        let satellite_ids: Vec<String> = records.iter().map(|r| r.id().to_string()).collect();
        let assignments = self.coordinator.assign(&satellite_ids, &query.targets)?;

        let mut jobs = Vec::with_capacity(observers.len() * records.len());
        for (tag, observer) in observers.iter().enumerate() {
            for record in &records {
                jobs.push(SearchJob {
                    tag,
                    record: Arc::clone(record),
                    observer: *observer,
                });
            }
        }

        let results = self
            .run_searches(jobs, start, end, settings.min_elevation_deg)
            .await?;

        let mut per_target: Vec<TargetPasses> = query
            .targets
            .iter()
            .map(|target| TargetPasses {
                target: target.clone(),
                passes: Vec::new(),
                truncated: false,
            })
            .collect();
        for (tag, search) in results {
            let entry = &mut per_target[tag];
            entry.passes.extend(search.passes);
            entry.truncated |= search.truncated;
        }

        let mut report = self.coordinator.report(&per_target, &assignments, start, end)?;
        report.truncated |= clipped;
        Ok(report)
    }

    /// End of a query window, clipped to the search's maximum horizon.
    /// The flag tells whether clipping happened.
    fn window_end(
        &self,
        start: DateTime<Utc>,
        horizon: Duration,
    ) -> Result<(DateTime<Utc>, bool), ValidationError> {
        let max_horizon = self.predictor.settings().max_horizon;
        let clipped = horizon > max_horizon;
        if clipped {
            log::info!(
                "Query horizon of {} days clipped to {} days",
                horizon.num_days(),
                max_horizon.num_days()
            );
        }
        let end = start
            .checked_add_signed(horizon.min(max_horizon))
            .ok_or_else(|| ValidationError::Invalid {
                field: "horizon",
                message: format!("window starting at {start} ends past the supported date range"),
            })?;
        Ok((end, clipped))
    }

    /// Runs pass searches on the blocking pool, at most `workers` at a time.
    ///
    /// The whole batch shares one abort handle carrying the search timeout;
    /// the async side enforces the same timeout and cancels the batch when it
    /// fires.
    async fn run_searches(
        &self,
        jobs: Vec<SearchJob>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_elevation_deg: f64,
    ) -> Result<Vec<(usize, PassSearch)>, EngineError> {
        let timeout = self
            .settings
            .search_timeout
            .to_std()
            .unwrap_or_else(|_| std::time::Duration::from_secs(30));
        let abort = AbortHandle::with_timeout(timeout);

        let batch = self.spawn_searches(jobs, start, end, min_elevation_deg, abort.clone());
        match tokio::time::timeout(timeout, batch).await {
            Ok(result) => result,
            Err(_) => {
                abort.cancel();
                Err(PredictError::TimedOut.into())
            }
        }
    }

    async fn spawn_searches(
        &self,
        jobs: Vec<SearchJob>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_elevation_deg: f64,
        abort: AbortHandle,
    ) -> Result<Vec<(usize, PassSearch)>, EngineError> {
        let mut handles = Vec::with_capacity(jobs.len());
        for job in jobs {
            let permit = Arc::clone(&self.workers)
                .acquire_owned()
                .await
                .map_err(|e| EngineError::Worker(e.to_string()))?;
            let propagator = self.propagator.clone();
            let predictor = self.predictor.clone();
            let abort = abort.clone();

            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let satellite = job.record.id().to_string();
                let result = propagator
                    .prepare(&job.record.elements)
                    .map_err(PredictError::from)
                    .and_then(|ephemeris| {
                        predictor.predict(
                            ephemeris.as_ref(),
                            &job.record.info,
                            &job.observer,
                            start,
                            end,
                            min_elevation_deg,
                            &abort,
                        )
                    });
                (job.tag, satellite, result)
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let (tag, satellite, result) = handle
                .await
                .map_err(|e| EngineError::Worker(e.to_string()))?;
            match result {
                Ok(search) => results.push((tag, search)),
                Err(PredictError::Propagation(e)) => {
                    log::warn!("Failed to predict passes for {}: {}", satellite, e);
                    // Continue with other satellites
                }
                Err(e) => {
                    abort.cancel();
                    return Err(e.into());
                }
            }
        }
        Ok(results)
    }
}

/// The requested records from `snapshot`, or all of them sorted by id.
fn select(
    snapshot: &Snapshot,
    ids: Option<&[String]>,
) -> Result<Vec<Arc<SatelliteRecord>>, EngineError> {
    match ids {
        Some(ids) => ids
            .iter()
            .map(|id| {
                snapshot
                    .get(id)
                    .cloned()
                    .ok_or_else(|| ElementsError::NotFound(id.clone()).into())
            })
            .collect(),
        None => {
            let mut records: Vec<_> = snapshot.values().cloned().collect();
            records.sort_by(|a, b| a.id().cmp(b.id()));
            Ok(records)
        }
    }
}
