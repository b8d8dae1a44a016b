//! In-memory de-duplication of identical model calls.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Shares one outstanding or completed result per key.
///
/// Concurrent callers with the same key await a single initialization.
/// Failed initializations are discarded, so the next caller retries.
#[derive(Debug, Default)]
pub struct InflightCache {
    slots: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl InflightCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> Arc<OnceCell<String>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.to_string()).or_default())
    }

    /// Returns the completed value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Stores a value computed elsewhere (e.g. by a streaming call).
    pub fn insert(&self, key: &str, value: String) {
        let _ = self.slot(key).set(value);
    }

    /// Returns the value for `key`, running `init` only if no other caller
    /// has produced or is producing it.
    pub async fn get_or_try_init<F, Fut, E>(&self, key: &str, init: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let cell = self.slot(key);
        let result = cell.get_or_try_init(init).await.cloned();
        if result.is_err() {
            self.discard_empty(key, &cell);
        }
        result
    }

    /// Drops a slot left empty by a failed call, unless another caller is
    /// still waiting on it.
    fn discard_empty(&self, key: &str, cell: &Arc<OnceCell<String>>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = slots.get(key)
            && Arc::ptr_eq(existing, cell)
            && !existing.initialized()
            && Arc::strong_count(existing) <= 2
        {
            slots.remove(key);
        }
    }

    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
