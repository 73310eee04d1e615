//! # Counters
//!
//! The metrics seam of a [`TtlCache`](crate::TtlCache).
//!
//! A cache reports two events by name: a *fetch* when it installs a fresh
//! snapshot (and so starts a new computation) and a *get* when a `get()` call
//! returns successfully. What happens to those increments is up to the
//! [`Counters`] implementation handed to the cache; the cache itself keeps no
//! process-wide state.
//!
//! Counter names are `"{component}.{kind}.{name}"`, for example
//! `ttl_cache.cacheFetch.exchange_rates`.

use std::fmt;
use std::sync::Arc;

/// Sink for named counter increments.
///
/// # Examples
///
/// ```
/// use deferval_core::Counters;
/// use parking_lot::Mutex;
///
/// #[derive(Default)]
/// struct Recorder(Mutex<Vec<String>>);
///
/// impl Counters for Recorder {
///     fn increment(&self, name: &str) {
///         self.0.lock().push(name.to_string());
///     }
/// }
///
/// let recorder = Recorder::default();
/// recorder.increment("ttl_cache.cacheGet.rates");
/// assert_eq!(recorder.0.lock().len(), 1);
/// ```
pub trait Counters: Send + Sync {
    fn increment(&self, name: &str);
}

impl<C: Counters + ?Sized> Counters for &C {
    #[inline]
    fn increment(&self, name: &str) {
        (**self).increment(name)
    }
}

impl<C: Counters + ?Sized> Counters for Arc<C> {
    #[inline]
    fn increment(&self, name: &str) {
        (**self).increment(name)
    }
}

/// Discards every increment. The default for caches built without counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCounters;

impl Counters for NoopCounters {
    #[inline]
    fn increment(&self, _name: &str) {}
}

/// The two events a cache reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    /// A fresh snapshot was installed.
    CacheFetch,
    /// A `get()` returned successfully.
    CacheGet,
}

impl CounterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKind::CacheFetch => "cacheFetch",
            CounterKind::CacheGet => "cacheGet",
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the qualified counter name for one cache event.
///
/// ```
/// use deferval_core::{qualified_name, CounterKind};
///
/// assert_eq!(
///     qualified_name("ttl_cache", CounterKind::CacheFetch, "rates"),
///     "ttl_cache.cacheFetch.rates"
/// );
/// ```
pub fn qualified_name(component: &str, kind: CounterKind, name: &str) -> String {
    format!("{component}.{kind}.{name}")
}
