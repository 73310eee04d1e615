use std::any::Any;
use std::sync::Arc;

/// Failure recorded by a [`SingleFlightCell`](crate::SingleFlightCell) and
/// replayed to every caller of that cell.
///
/// The error is captured exactly once, when the producer runs, and every
/// caller waiting on or later consulting the same cell receives a clone of it.
/// Nothing is retried: a [`TtlCache`](crate::TtlCache) keeps returning the same
/// error until its current snapshot expires.
///
/// # Examples
///
/// ```
/// use deferval_core::{SingleFlightCell, ValueError};
///
/// let cell = SingleFlightCell::new(|| Err::<u32, _>("backend down"));
///
/// assert_eq!(cell.get(), Err(ValueError::Producer("backend down")));
/// // Replayed, not recomputed
/// assert_eq!(cell.get(), Err(ValueError::Producer("backend down")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ValueError<E> {
    /// The producer returned an error.
    #[error("producer failed: {0}")]
    Producer(E),
    /// The producer panicked; the payload message is kept when it is a string.
    #[error("producer panicked: {0}")]
    Panicked(Arc<str>),
}

impl<E> ValueError<E> {
    /// Returns the producer's error, if this failure came from one.
    pub fn producer_error(&self) -> Option<&E> {
        match self {
            ValueError::Producer(err) => Some(err),
            ValueError::Panicked(_) => None,
        }
    }

    /// Returns `true` if the producer panicked instead of returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self, ValueError::Panicked(_))
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> Arc<str> {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        Arc::from(*s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        Arc::from(s.as_str())
    } else {
        Arc::from("non-string panic payload")
    }
}
