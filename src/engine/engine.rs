use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::Semaphore;

use crate::collision::CollisionSettings;
use crate::config::Config;
use crate::constellation::ConstellationCoordinator;
use crate::coordinates::CoordinateTransform;
use crate::elements::Registry;
use crate::engine::clock::{Clock, SystemClock};
use crate::engine::error::EngineError;
use crate::engine::refresh::{
    refresh_once, spawn_refresh, RefreshContext, RefreshHandle, SharedCache,
};
use crate::engine::types::{EngineSettings, EngineStatus, PositionCache};
use crate::maneuver::ManeuverPlanner;
use crate::predict::PassPredictor;
use crate::propagation::Propagator;

/// The orbital engine: registry, position cache, worker pool and clock.
///
/// Built explicitly and shared by reference (usually behind an `Arc`).
/// [`Engine::start`] launches the periodic position refresh; queries work
/// whether or not it is running.
pub struct Engine {
    pub(crate) registry: Arc<Registry>,
    pub(crate) propagator: Propagator,
    pub(crate) transform: CoordinateTransform,
    pub(crate) predictor: PassPredictor,
    pub(crate) planner: ManeuverPlanner,
    pub(crate) coordinator: ConstellationCoordinator,
    pub(crate) collision: CollisionSettings,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) cache: SharedCache,
    pub(crate) workers: Arc<Semaphore>,
    pub(crate) settings: EngineSettings,
    refresh: Mutex<Option<RefreshHandle>>,
}

impl Engine {
    pub fn new(config: &Config, registry: Arc<Registry>, clock: Arc<dyn Clock>) -> Self {
        let transform = CoordinateTransform::new(config.propagation.earth);
        Self {
            registry,
            propagator: Propagator::new(config.propagation.model),
            transform,
            predictor: PassPredictor::new(transform, config.search.clone()),
            planner: ManeuverPlanner::new(config.maneuver.clone()),
            coordinator: ConstellationCoordinator::new(config.coverage.clone()),
            collision: config.collision.clone(),
            clock,
            cache: Arc::new(RwLock::new(Arc::new(PositionCache::default()))),
            workers: Arc::new(Semaphore::new(config.engine.workers.max(1))),
            settings: config.engine.clone(),
            refresh: Mutex::new(None),
        }
    }

    /// Engine over `registry` with default settings and the system clock.
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self::new(&Config::default(), registry, Arc::new(SystemClock))
    }

    /// Swaps the propagation strategy, e.g. for a custom model.
    pub fn with_propagator(mut self, propagator: Propagator) -> Self {
        self.propagator = propagator;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn propagator(&self) -> &Propagator {
        &self.propagator
    }

    /// Starts the periodic position refresh. Must be called inside a tokio runtime.
    pub fn start(&self) -> Result<(), EngineError> {
        let mut refresh = self.refresh.lock().map_err(|_| EngineError::LockPoisoned)?;
        if refresh.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        *refresh = Some(spawn_refresh(self.refresh_context(), self.settings.refresh_interval));
        log::info!(
            "Engine started: {} satellites, {} model, refresh every {} ms",
            self.registry.len(),
            self.propagator.model(),
            self.settings.refresh_interval.num_milliseconds()
        );
        Ok(())
    }

    /// Stops the refresh task and waits for it to finish. No-op when not running.
    pub async fn stop(&self) {
        let handle = match self.refresh.lock() {
            Ok(mut refresh) => refresh.take(),
            Err(_) => {
                log::warn!("Engine refresh lock poisoned on stop");
                None
            }
        };
        if let Some(handle) = handle {
            handle.stop().await;
            log::info!("Engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.refresh
            .lock()
            .map(|refresh| refresh.is_some())
            .unwrap_or(false)
    }

    /// Refreshes the position cache right now, outside the periodic task.
    pub fn refresh_now(&self) {
        refresh_once(&self.refresh_context());
    }

    pub fn cached_positions(&self) -> Result<Arc<PositionCache>, EngineError> {
        let cache = self.cache.read().map_err(|_| EngineError::LockPoisoned)?;
        Ok(Arc::clone(&cache))
    }

    pub fn status(&self) -> Result<EngineStatus, EngineError> {
        let cache = self.cached_positions()?;
        Ok(EngineStatus {
            running: self.is_running(),
            satellites: self.registry.len(),
            cached_positions: cache.positions.len(),
            last_refresh: cache.refreshed_at,
            model: self.propagator.model().to_string(),
        })
    }

    fn refresh_context(&self) -> RefreshContext {
        RefreshContext {
            registry: Arc::clone(&self.registry),
            propagator: self.propagator.clone(),
            transform: self.transform,
            clock: Arc::clone(&self.clock),
            cache: Arc::clone(&self.cache),
        }
    }
}
