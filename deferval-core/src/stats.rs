use std::sync::atomic::{AtomicU64, Ordering};

/// Per-cache statistics for monitoring how often a [`TtlCache`](crate::TtlCache)
/// recomputes versus serves from its current snapshot.
///
/// These mirror the two counters a cache reports through
/// [`Counters`](crate::Counters), but are kept on the cache instance itself so
/// they can be inspected without any external sink.
///
/// # Thread Safety
///
/// All operations use atomics with `Relaxed` ordering; the numbers are
/// monitoring data and carry no synchronization meaning.
///
/// # Examples
///
/// ```
/// use deferval_core::CacheStats;
///
/// let stats = CacheStats::new();
///
/// stats.record_fetch();
/// stats.record_get();
/// stats.record_get();
/// stats.record_get();
///
/// assert_eq!(stats.fetches(), 1);
/// assert_eq!(stats.gets(), 3);
/// assert_eq!(stats.served_from_cache(), 2);
/// assert!((stats.hit_rate() - 0.6666).abs() < 0.001);
/// ```
#[derive(Debug)]
pub struct CacheStats {
    fetches: AtomicU64,
    gets: AtomicU64,
}

impl CacheStats {
    /// Creates a new `CacheStats` instance with zero counters.
    pub fn new() -> Self {
        Self {
            fetches: AtomicU64::new(0),
            gets: AtomicU64::new(0),
        }
    }

    /// Records that a fresh snapshot was installed.
    #[inline]
    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful `get()`.
    #[inline]
    pub fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn gets(&self) -> u64 {
        self.gets.load(Ordering::Relaxed)
    }

    /// Successful gets that did not start a computation of their own.
    ///
    /// A fetch whose computation failed has no matching get, so this
    /// saturates at zero instead of underflowing.
    #[inline]
    pub fn served_from_cache(&self) -> u64 {
        self.gets().saturating_sub(self.fetches())
    }

    /// Fraction of successful gets served from an existing snapshot
    /// (0.0 to 1.0). Returns 0.0 if there have been no gets.
    ///
    /// ```
    /// use deferval_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// assert_eq!(stats.hit_rate(), 0.0);
    ///
    /// stats.record_fetch();
    /// stats.record_get();
    /// assert_eq!(stats.hit_rate(), 0.0);
    ///
    /// stats.record_get();
    /// assert_eq!(stats.hit_rate(), 0.5);
    /// ```
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let gets = self.gets();
        if gets == 0 {
            0.0
        } else {
            self.served_from_cache() as f64 / gets as f64
        }
    }

    /// Resets all statistics counters to zero.
    pub fn reset(&self) {
        self.fetches.store(0, Ordering::Relaxed);
        self.gets.store(0, Ordering::Relaxed);
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CacheStats {
    fn clone(&self) -> Self {
        Self {
            fetches: AtomicU64::new(self.fetches()),
            gets: AtomicU64::new(self.gets()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats() {
        let stats = CacheStats::new();
        assert_eq!(stats.fetches(), 0);
        assert_eq!(stats.gets(), 0);
        assert_eq!(stats.served_from_cache(), 0);
    }

    #[test]
    fn test_served_from_cache_saturates() {
        let stats = CacheStats::new();
        stats.record_fetch();
        stats.record_fetch();
        stats.record_get();
        assert_eq!(stats.served_from_cache(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_reset() {
        let stats = CacheStats::new();
        stats.record_fetch();
        stats.record_get();
        stats.record_get();

        stats.reset();
        assert_eq!(stats.fetches(), 0);
        assert_eq!(stats.gets(), 0);
    }

    #[test]
    fn test_clone() {
        let stats = CacheStats::new();
        stats.record_fetch();
        stats.record_get();

        let cloned = stats.clone();
        assert_eq!(cloned.fetches(), 1);
        assert_eq!(cloned.gets(), 1);

        // Ensure they're independent
        stats.record_get();
        assert_eq!(stats.gets(), 2);
        assert_eq!(cloned.gets(), 1);
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let stats = Arc::new(CacheStats::new());
        let mut handles = vec![];

        // 10 threads, each recording 5 fetches and 100 gets
        for _ in 0..10 {
            let stats_clone = Arc::clone(&stats);
            let handle = thread::spawn(move || {
                for _ in 0..5 {
                    stats_clone.record_fetch();
                }
                for _ in 0..100 {
                    stats_clone.record_get();
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.fetches(), 50);
        assert_eq!(stats.gets(), 1000);
        assert_eq!(stats.served_from_cache(), 950);
        assert!((stats.hit_rate() - 0.95).abs() < 0.0001);
    }
}
