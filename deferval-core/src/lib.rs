//! # Deferval Core
//!
//! Core types for the Deferval library: values that defer, memoize or
//! periodically refresh a computed result.
//!
//! ## Features
//!
//! - **Value variants**: fixed ([`Held`]), recomputed on every call
//!   ([`Computed`]), computed at construction ([`Eager`]), forwarded
//!   ([`Indirect`]) and lazily formatted strings ([`Formatted`],
//!   [`ToStringValue`], [`ArrayString`])
//! - **Single-flight execution**: [`SingleFlightCell`] runs a producer at most
//!   once and shares the outcome, success or failure, with every caller
//! - **TTL refresh**: [`TtlCache`] swaps in a fresh snapshot by
//!   compare-and-swap once the current one expires
//! - **Injected metrics**: fetch/get events go to a [`Counters`]
//!   implementation handed to each cache
//! - **Statistics**: per-cache [`CacheStats`] and an in-memory
//!   [`CounterRegistry`] (`stats` feature, enabled by default)
//!
//! ## Module Organization
//!
//! - [`value`] - The [`Value`] trait and the plain variants
//! - [`formatted`] - Lazily rendered, memoized strings
//! - `cell` - Single-flight execution
//! - `ttl_cache` - Snapshot-swapping TTL cache and its builder
//! - [`counters`] - Counter sink trait and naming
//! - `clock` - Monotonic tick sources
//!
mod cell;
mod clock;
mod error;
mod snapshot;
mod ttl_cache;

pub mod counters;
pub mod formatted;
pub mod value;

#[cfg(feature = "stats")]
mod counter_registry;
#[cfg(feature = "stats")]
mod stats;

pub use cell::{CellState, Producer, SingleFlightCell};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use counters::{qualified_name, CounterKind, Counters, NoopCounters};
pub use error::ValueError;
pub use formatted::{ArrayString, Formatted, ToStringValue};
pub use ttl_cache::{TtlCache, TtlCacheBuilder, DEFAULT_COMPONENT, DEFAULT_LIFETIME};
pub use value::{Computed, Eager, Held, Indirect, Value};

#[cfg(feature = "stats")]
pub use counter_registry::CounterRegistry;
#[cfg(feature = "stats")]
pub use stats::CacheStats;
