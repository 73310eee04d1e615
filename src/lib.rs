//! # Deferval
//!
//! Values that defer, memoize or periodically refresh a computed result, for
//! data that is expensive to compute or comes from somewhere slow.
//!
//! ## Features
//!
//! - **One contract**: every variant implements [`Value`]: produce on demand
//! - **Single-flight**: concurrent callers of a cold value share one computation
//! - **TTL refresh**: [`TtlCache`] recomputes at most once per lifetime window
//! - **Shared failures**: an error is computed once and replayed to every
//!   caller until the window expires
//! - **Injected metrics**: fetch and get events go to the [`Counters`] you supply
//!
//! ## Quick Start
//!
//! ```rust
//! use deferval::{ttl_cache, CounterRegistry};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let registry = Arc::new(CounterRegistry::new());
//! let rates = ttl_cache(
//!     "exchange_rates",
//!     || Ok::<_, String>(vec![("EUR", 1.0), ("USD", 1.08)]),
//!     Duration::from_secs(300),
//!     registry.clone(),
//! );
//!
//! // First call computes, second is served from the current snapshot
//! assert_eq!(rates.get().unwrap().len(), 2);
//! assert_eq!(rates.get().unwrap().len(), 2);
//!
//! assert_eq!(registry.get("ttl_cache.cacheFetch.exchange_rates"), 1);
//! assert_eq!(registry.get("ttl_cache.cacheGet.exchange_rates"), 2);
//! ```
//!
//! ## Other Values
//!
//! ```rust
//! use deferval::{ArrayString, Computed, Eager, Held, Value};
//!
//! let fixed = Held::new("eu-west-1");
//! let cpus = Computed::new(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1));
//! let at_startup = Eager::new(std::process::id);
//! let ids = ArrayString::new(vec![3, 5, 8]);
//!
//! assert_eq!(fixed.get(), "eu-west-1");
//! assert!(cpus.get() >= 1);
//! assert_eq!(at_startup.get(), std::process::id());
//! assert_eq!(ids.get(), "[3, 5, 8]");
//! ```
//!
//! ## Error Handling
//!
//! Producers return `Result<T, E>`. A failure is wrapped in
//! [`ValueError::Producer`] and served to every caller of the snapshot that
//! computed it. It is *not* retried until the snapshot expires; call
//! [`TtlCache::invalidate`] to recompute sooner.
//!
//! ```rust
//! use deferval::{TtlCache, ValueError};
//! use std::time::Duration;
//!
//! let cache = TtlCache::new("divide", || 10u32.checked_div(0).ok_or("division by zero"), Duration::from_secs(60));
//!
//! assert_eq!(cache.get(), Err(ValueError::Producer("division by zero")));
//! assert_eq!(cache.get(), Err(ValueError::Producer("division by zero")));
//! ```

pub use deferval_core::*;

use std::sync::Arc;
use std::time::Duration;

/// Create a [`TtlCache`] that reports to `counters`.
///
/// Counter names are `ttl_cache.cacheFetch.{name}` and
/// `ttl_cache.cacheGet.{name}`. Use [`TtlCache::builder`] to change the
/// component prefix or the clock.
///
/// # Arguments
///
/// * `name` - Identifies the cache in counter names and log fields
/// * `producer` - Computes the value; runs at most once per lifetime window
/// * `lifetime` - How long a computed value is served
/// * `counters` - Receives fetch and get increments
///
/// # Examples
///
/// ```rust
/// use deferval::{ttl_cache, NoopCounters};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let hostname = ttl_cache("hostname", || Ok::<_, String>("db-01".to_string()), Duration::from_secs(10), Arc::new(NoopCounters));
/// assert_eq!(hostname.get().as_deref(), Ok("db-01"));
/// ```
pub fn ttl_cache<T, E, F>(
    name: impl Into<String>,
    producer: F,
    lifetime: Duration,
    counters: Arc<dyn Counters>,
) -> TtlCache<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
{
    TtlCache::builder(name, producer)
        .lifetime(lifetime)
        .counters(counters)
        .build()
}
