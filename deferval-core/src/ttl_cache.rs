use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::clock::duration_to_ticks;
use crate::snapshot::{Snapshot, SnapshotSlot};
use crate::value::impl_output_traits;
use crate::{
    qualified_name, Clock, CounterKind, Counters, MonotonicClock, NoopCounters, Producer,
    SingleFlightCell, Value, ValueError,
};
#[cfg(feature = "stats")]
use crate::CacheStats;

/// Component prefix of counter names unless overridden in the builder.
pub const DEFAULT_COMPONENT: &str = "ttl_cache";

/// Lifetime used by [`TtlCacheBuilder`] unless one is given.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(60);

/// A value recomputed at most once per time-to-live window.
///
/// The cache owns an immutable snapshot, a [`SingleFlightCell`] paired with an
/// expiry tick, held in a slot that is only ever replaced by compare-and-swap.
/// A `get()` works like this:
///
/// 1. Load the current snapshot.
/// 2. If the clock has reached its expiry, build a fresh snapshot
///    (`now + lifetime`) and try to swap it in. The winner records a fetch;
///    a loser drops its candidate, which was never evaluated, and starts over.
/// 3. Ask the snapshot's cell for its value. The first caller runs the
///    producer; everyone else on that snapshot waits for and shares its outcome.
/// 4. On success record a get and return the value.
///
/// Detecting staleness is cheap and contended; computing is expensive and
/// single-flighted per snapshot. Under heavy load one caller pays for a refresh
/// while the rest share the in-flight result.
///
/// A failed computation is stored like any other result: every `get()` returns
/// the same error until the snapshot expires. [`TtlCache::invalidate`] can be
/// used to give up on a failed snapshot early.
///
/// Expiry is compared through the signed difference of wrapping tick counts,
/// so a clock that rolls over `u64::MAX` is handled.
///
/// # Examples
///
/// ```
/// use deferval_core::{ManualClock, TtlCache, Value};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = Arc::new(ManualClock::new(0));
/// let next = Arc::new(AtomicU32::new(0));
/// let n = Arc::clone(&next);
///
/// let cache = TtlCache::builder("sequence", move || Ok::<_, String>(n.fetch_add(1, Ordering::SeqCst)))
///     .lifetime(Duration::from_millis(20))
///     .clock(clock.clone())
///     .build();
///
/// assert_eq!(cache.get(), Ok(0));
/// clock.advance(Duration::from_millis(25));
/// assert_eq!(cache.get(), Ok(1));
/// clock.advance(Duration::from_millis(5));
/// assert_eq!(cache.get(), Ok(1));
/// ```
pub struct TtlCache<T, E> {
    name: String,
    slot: SnapshotSlot<T, E>,
    lifetime: Duration,
    lifetime_ticks: u64,
    producer: Producer<T, E>,
    counters: Arc<dyn Counters>,
    clock: Arc<dyn Clock>,
    fetch_counter: String,
    get_counter: String,
    #[cfg(feature = "stats")]
    stats: CacheStats,
}

impl<T, E> TtlCache<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Creates a cache with default counters, clock and component name.
    pub fn new<F>(name: impl Into<String>, producer: F, lifetime: Duration) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self::builder(name, producer).lifetime(lifetime).build()
    }

    pub fn builder<F>(name: impl Into<String>, producer: F) -> TtlCacheBuilder<T, E>
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        TtlCacheBuilder::new(name, Arc::new(producer))
    }

    /// Returns the value of the current window, refreshing first if it expired.
    ///
    /// May block while another thread computes the value for the same
    /// snapshot. Errors are those stored in the snapshot's cell.
    pub fn get(&self) -> Result<T, ValueError<E>> {
        let mut snapshot = self.slot.load();
        loop {
            let now = self.clock.now_ticks();
            if !snapshot.is_stale(now) {
                break;
            }

            let candidate = Snapshot::new(
                SingleFlightCell::from_producer(&self.producer),
                now.wrapping_add(self.lifetime_ticks),
            );
            match self.slot.compare_and_swap(&snapshot, candidate) {
                Ok(installed) => {
                    debug!(cache = %self.name, expires_at = installed.expires_at, "installed fresh snapshot");
                    self.counters.increment(&self.fetch_counter);
                    #[cfg(feature = "stats")]
                    self.stats.record_fetch();
                    snapshot = installed;
                    break;
                }
                Err(current) => {
                    trace!(cache = %self.name, "lost snapshot swap, retrying");
                    snapshot = current;
                }
            }
        }

        match snapshot.cell.get() {
            Ok(value) => {
                self.counters.increment(&self.get_counter);
                #[cfg(feature = "stats")]
                self.stats.record_get();
                Ok(value)
            }
            Err(err) => {
                debug!(cache = %self.name, "serving cached producer failure");
                Err(err)
            }
        }
    }
}

impl<T, E> TtlCache<T, E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Returns `true` if the next `get()` would start a refresh.
    pub fn is_stale(&self) -> bool {
        self.slot.load().is_stale(self.clock.now_ticks())
    }

    /// Expires the current snapshot so that the next `get()` recomputes.
    ///
    /// Callers that already hold the old snapshot keep using it. Returns
    /// `false` if the snapshot was already stale or another thread replaced
    /// it concurrently. Does not count as a fetch.
    pub fn invalidate(&self) -> bool
    where
        T: 'static,
        E: 'static,
    {
        let current = self.slot.load();
        let now = self.clock.now_ticks();
        if current.is_stale(now) {
            return false;
        }
        let expired = Snapshot::new(SingleFlightCell::from_producer(&self.producer), now);
        let swapped = self.slot.compare_and_swap(&current, expired).is_ok();
        if swapped {
            debug!(cache = %self.name, "snapshot invalidated");
        }
        swapped
    }

    /// Statistics for this cache instance.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl<T, E> Value for TtlCache<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    type Output = Result<T, ValueError<E>>;

    fn get(&self) -> Self::Output {
        TtlCache::get(self)
    }
}

impl<T, E> Debug for TtlCache<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl_output_traits!(TtlCache<T, E>);

/// Builder for [`TtlCache`].
///
/// # Examples
///
/// ```
/// use deferval_core::{CounterRegistry, ManualClock, TtlCache};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let registry = Arc::new(CounterRegistry::new());
/// let cache = TtlCache::builder("config", || Ok::<_, String>("v1"))
///     .lifetime(Duration::from_secs(30))
///     .component("settings")
///     .counters(registry.clone())
///     .clock(Arc::new(ManualClock::new(0)))
///     .build();
///
/// assert_eq!(cache.get(), Ok("v1"));
/// assert_eq!(registry.get("settings.cacheFetch.config"), 1);
/// ```
pub struct TtlCacheBuilder<T, E> {
    name: String,
    producer: Producer<T, E>,
    lifetime: Duration,
    component: String,
    counters: Arc<dyn Counters>,
    clock: Arc<dyn Clock>,
}

impl<T, E> TtlCacheBuilder<T, E>
where
    T: 'static,
    E: 'static,
{
    pub fn new(name: impl Into<String>, producer: Producer<T, E>) -> Self {
        Self {
            name: name.into(),
            producer,
            lifetime: DEFAULT_LIFETIME,
            component: DEFAULT_COMPONENT.to_owned(),
            counters: Arc::new(NoopCounters),
            clock: Arc::new(MonotonicClock),
        }
    }

    /// How long a computed value is served before the next `get()` refreshes it.
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Prefix of the counter names this cache reports under.
    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    pub fn counters(mut self, counters: Arc<dyn Counters>) -> Self {
        self.counters = counters;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> TtlCache<T, E> {
        let lifetime_ticks = duration_to_ticks(self.lifetime);
        // Expires at birth, so the first get() installs the first real snapshot
        let initial = Snapshot::new(
            SingleFlightCell::from_producer(&self.producer),
            self.clock.now_ticks(),
        );

        TtlCache {
            fetch_counter: qualified_name(&self.component, CounterKind::CacheFetch, &self.name),
            get_counter: qualified_name(&self.component, CounterKind::CacheGet, &self.name),
            name: self.name,
            slot: SnapshotSlot::new(initial),
            lifetime: self.lifetime,
            lifetime_ticks,
            producer: self.producer,
            counters: self.counters,
            clock: self.clock,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        }
    }
}
