use crate::domain::model::HabitatId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Registry = Arc<Mutex<HashMap<HabitatId, Arc<AsyncMutex<()>>>>>;

/// Per-habitat write serialization.
///
/// A capacity check and the write that follows it must run under the guard
/// for the target habitat, otherwise two concurrent writers can both observe
/// a free slot and overshoot the capacity. Entries live only while a guard
/// or a waiter holds them.
#[derive(Clone, Default)]
pub struct HabitatLocks {
    inner: Registry,
}

/// Held for the duration of a habitat-scoped write.
pub struct HabitatGuard {
    habitat_id: HabitatId,
    guard: Option<OwnedMutexGuard<()>>,
    registry: Registry,
}

impl Drop for HabitatGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut map = self
            .registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // The map's own reference is the last one: nobody holds or waits.
        if map
            .get(&self.habitat_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.habitat_id);
        }
    }
}

impl HabitatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, habitat_id: HabitatId) -> HabitatGuard {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            map.entry(habitat_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        HabitatGuard {
            habitat_id,
            guard: Some(lock.lock_owned().await),
            registry: Arc::clone(&self.inner),
        }
    }

    /// Acquires only when there is a habitat to protect.
    pub async fn acquire_opt(&self, habitat_id: Option<HabitatId>) -> Option<HabitatGuard> {
        match habitat_id {
            Some(id) => Some(self.acquire(id).await),
            None => None,
        }
    }

    /// Number of habitats currently locked or awaited.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
