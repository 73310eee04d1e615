use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::Counters;

/// In-memory [`Counters`] sink that keeps a total per counter name.
///
/// Unlike a process-wide registry, each `CounterRegistry` is an ordinary
/// value: create one, share it through an `Arc` with the caches that should
/// report into it, and query it whenever needed.
///
/// # Thread Safety
///
/// Backed by a `DashMap`, so increments for different names rarely contend.
/// Increments for one name are a single atomic add.
///
/// # Examples
///
/// ```
/// use deferval_core::{CounterRegistry, TtlCache};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let registry = Arc::new(CounterRegistry::new());
/// let cache = TtlCache::builder("rates", || Ok::<_, String>(1.08))
///     .lifetime(Duration::from_secs(60))
///     .counters(registry.clone())
///     .build();
///
/// cache.get().unwrap();
/// cache.get().unwrap();
///
/// assert_eq!(registry.get("ttl_cache.cacheFetch.rates"), 1);
/// assert_eq!(registry.get("ttl_cache.cacheGet.rates"), 2);
/// ```
#[derive(Debug, Default)]
pub struct CounterRegistry {
    counters: DashMap<String, AtomicU64>,
}

impl CounterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current total for `name`; zero if it was never incremented.
    pub fn get(&self, name: &str) -> u64 {
        self.counters
            .get(name)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Names of every counter incremented so far.
    pub fn list(&self) -> Vec<String> {
        self.counters.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Point-in-time copy of all totals.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect()
    }

    /// Resets one counter to zero.
    ///
    /// # Returns
    ///
    /// * `true` - If the counter existed and was reset
    /// * `false` - If no counter with that name exists
    pub fn reset(&self, name: &str) -> bool {
        match self.counters.get(name) {
            Some(counter) => {
                counter.store(0, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Forgets every counter.
    pub fn clear(&self) {
        self.counters.clear();
    }
}

impl Counters for CounterRegistry {
    fn increment(&self, name: &str) {
        // Fast path avoids allocating the key once the counter exists
        if let Some(counter) = self.counters.get(name) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.counters
            .entry(name.to_owned())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }
}
