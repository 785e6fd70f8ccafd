use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::elements::error::ElementsError;
use crate::elements::source::ElementSource;
use crate::elements::types::SatelliteRecord;

/// Immutable view of the registry at one instant.
pub type Snapshot = Arc<HashMap<String, Arc<SatelliteRecord>>>;

/// Satellite id -> current element set.
///
/// Readers clone the current [`Snapshot`] and never block on writers for
/// longer than an `Arc` clone. Writers are serialised by `write_lock`, build a
/// new map from the current one and swap it in, so a reader sees either the
/// whole update or none of it.
#[derive(Default)]
pub struct Registry {
    current: RwLock<Snapshot>,
    write_lock: Mutex<()>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from records; a later record replaces an earlier one with the same id.
    pub fn from_records(records: Vec<SatelliteRecord>) -> Result<Self, ElementsError> {
        let registry = Self::new();
        registry.replace_all(records)?;
        Ok(registry)
    }

    /// Loads every record of `source` and replaces the registry contents with them.
    pub fn load_from(&self, source: &dyn ElementSource) -> Result<usize, ElementsError> {
        let records = source.load()?;
        let count = self.replace_all(records)?;
        log::info!("Loaded {} satellites from {}", count, source.describe());
        Ok(count)
    }

    pub fn snapshot(&self) -> Result<Snapshot, ElementsError> {
        let guard = self.current.read().map_err(|_| ElementsError::LockPoisoned)?;
        Ok(Arc::clone(&guard))
    }

    pub fn get(&self, id: &str) -> Result<Arc<SatelliteRecord>, ElementsError> {
        self.snapshot()?
            .get(id)
            .cloned()
            .ok_or_else(|| ElementsError::NotFound(id.to_string()))
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Result<Vec<String>, ElementsError> {
        let mut ids: Vec<String> = self.snapshot()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    pub fn len(&self) -> usize {
        self.snapshot().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers a new satellite. Fails if the id is already taken.
    pub fn add(&self, record: SatelliteRecord) -> Result<(), ElementsError> {
        validate(&record)?;
        self.update(|map| {
            if map.contains_key(record.id()) {
                return Err(ElementsError::Duplicate(record.id().to_string()));
            }
            map.insert(record.id().to_string(), Arc::new(record));
            Ok(())
        })
    }

    /// Inserts or replaces the element set of one satellite.
    pub fn replace(&self, record: SatelliteRecord) -> Result<(), ElementsError> {
        validate(&record)?;
        self.update(|map| {
            map.insert(record.id().to_string(), Arc::new(record));
            Ok(())
        })
    }

    pub fn remove(&self, id: &str) -> Result<Arc<SatelliteRecord>, ElementsError> {
        self.update(|map| {
            map.remove(id)
                .ok_or_else(|| ElementsError::NotFound(id.to_string()))
        })
    }

    fn replace_all(&self, records: Vec<SatelliteRecord>) -> Result<usize, ElementsError> {
        let mut map = HashMap::with_capacity(records.len());
        for record in records {
            validate(&record)?;
            if map.contains_key(record.id()) {
                log::warn!("Duplicate satellite id {}, keeping the later element set", record.id());
            }
            map.insert(record.id().to_string(), Arc::new(record));
        }
        let count = map.len();

        let _writer = self.write_lock.lock().map_err(|_| ElementsError::LockPoisoned)?;
        let mut current = self.current.write().map_err(|_| ElementsError::LockPoisoned)?;
        *current = Arc::new(map);
        Ok(count)
    }

    fn update<T>(
        &self,
        change: impl FnOnce(&mut HashMap<String, Arc<SatelliteRecord>>) -> Result<T, ElementsError>,
    ) -> Result<T, ElementsError> {
        let _writer = self.write_lock.lock().map_err(|_| ElementsError::LockPoisoned)?;

        let mut next = HashMap::clone(&*self.snapshot()?);
        let out = change(&mut next)?;

        let mut current = self.current.write().map_err(|_| ElementsError::LockPoisoned)?;
        *current = Arc::new(next);
        Ok(out)
    }
}

fn validate(record: &SatelliteRecord) -> Result<(), ElementsError> {
    record
        .elements
        .validate()
        .map_err(|source| ElementsError::InvalidElements {
            satellite: record.id().to_string(),
            source,
        })
}
