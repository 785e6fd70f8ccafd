use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::coordinates::CoordinateTransform;
use crate::elements::{Registry, SatelliteRecord};
use crate::engine::clock::Clock;
use crate::engine::types::{Position, PositionCache};
use crate::propagation::{PropagationError, Propagator};

pub(crate) type SharedCache = Arc<RwLock<Arc<PositionCache>>>;

#[derive(Debug)]
pub(crate) struct RefreshHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl RefreshHandle {
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(e) = self.join.await {
            log::warn!("Position refresh task ended abnormally: {}", e);
        }
    }
}

/// Everything the refresh task needs, cloned out of the engine.
pub(crate) struct RefreshContext {
    pub registry: Arc<Registry>,
    pub propagator: Propagator,
    pub transform: CoordinateTransform,
    pub clock: Arc<dyn Clock>,
    pub cache: SharedCache,
}

pub(crate) fn spawn_refresh(context: RefreshContext, interval: Duration) -> RefreshHandle {
    let (stop_tx, stop_rx) = oneshot::channel();
    let period = interval
        .to_std()
        .unwrap_or_else(|_| std::time::Duration::from_secs(1));

    let join = tokio::spawn(run_refresh_loop(context, period, stop_rx));
    RefreshHandle { stop_tx, join }
}

async fn run_refresh_loop(
    context: RefreshContext,
    period: std::time::Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let should_stop = tokio::select! {
            _ = ticker.tick() => false,
            _ = &mut stop_rx => true,
        };
        if should_stop {
            log::debug!("Position refresh stopped");
            return;
        }

        refresh_once(&context);
    }
}

/// Recomputes every registered satellite's position and swaps the cache.
pub(crate) fn refresh_once(context: &RefreshContext) {
    let snapshot = match context.registry.snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::warn!("Skipping position refresh: {}", e);
            return;
        }
    };
    let now = context.clock.now();

    let mut positions = HashMap::with_capacity(snapshot.len());
    for record in snapshot.values() {
        match position_of(record, &context.propagator, &context.transform, now) {
            Ok(position) => {
                positions.insert(record.id().to_string(), position);
            }
            Err(e) => {
                log::warn!("Failed to propagate {}: {}", record.id(), e);
                // Continue with other satellites
            }
        }
    }

    let next = Arc::new(PositionCache {
        refreshed_at: Some(now),
        positions,
    });
    match context.cache.write() {
        Ok(mut cache) => *cache = next,
        Err(_) => log::warn!("Position cache lock poisoned, refresh dropped"),
    }
}

pub(crate) fn position_of(
    record: &SatelliteRecord,
    propagator: &Propagator,
    transform: &CoordinateTransform,
    at: chrono::DateTime<chrono::Utc>,
) -> Result<Position, PropagationError> {
    let state = propagator.propagate(&record.elements, at)?;
    Ok(Position {
        satellite_id: record.info.id.clone(),
        satellite_name: record.info.name.clone(),
        timestamp: at,
        geodetic: transform.inertial_to_geodetic(state.position_km, at),
        position_km: state.position_km,
        velocity_km_s: state.velocity_km_s,
    })
}
