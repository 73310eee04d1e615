use parking_lot::{Condvar, Mutex, MutexGuard};
use std::fmt::{self, Debug};
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::panic_message;
use crate::value::impl_output_traits;
use crate::{Value, ValueError};

/// Shared, reusable producer of fallible values.
///
/// A [`TtlCache`](crate::TtlCache) keeps one of these and hands a clone to
/// every [`SingleFlightCell`] it creates.
pub type Producer<T, E> = Arc<dyn Fn() -> Result<T, E> + Send + Sync>;

type Thunk<T, E> = Box<dyn FnOnce() -> Result<T, E> + Send>;

/// Phase of a [`SingleFlightCell`], as reported by [`SingleFlightCell::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    NotStarted,
    InProgress,
    Completed,
}

enum State<T, E> {
    NotStarted(Thunk<T, E>),
    InProgress,
    Completed(Result<T, ValueError<E>>),
}

/// Runs a producer at most once and shares the outcome with every caller.
///
/// The first `get()` from any thread runs the producer on that thread. Callers
/// arriving while it runs block until it finishes. Every caller, concurrent or
/// later, receives a clone of the same `Ok` value or the same error; an error is
/// never retried. A panicking producer is recorded as
/// [`ValueError::Panicked`] so that waiters are released.
///
/// # Thread Safety
///
/// The execution record is guarded by a `parking_lot::Mutex` and completion is
/// signalled through a `parking_lot::Condvar`. The producer itself runs with
/// the mutex released.
///
/// # Examples
///
/// ```
/// use deferval_core::{CellState, SingleFlightCell};
/// use std::sync::Arc;
/// use std::thread;
///
/// let cell = Arc::new(SingleFlightCell::new(|| Ok::<_, String>(String::from("loaded"))));
/// assert_eq!(cell.state(), CellState::NotStarted);
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let cell = Arc::clone(&cell);
///         thread::spawn(move || cell.get())
///     })
///     .collect();
///
/// for handle in handles {
///     assert_eq!(handle.join().unwrap(), Ok(String::from("loaded")));
/// }
/// assert_eq!(cell.state(), CellState::Completed);
/// ```
pub struct SingleFlightCell<T, E> {
    state: Mutex<State<T, E>>,
    completed: Condvar,
}

impl<T, E> SingleFlightCell<T, E> {
    pub fn new<F>(producer: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        Self {
            state: Mutex::new(State::NotStarted(Box::new(producer))),
            completed: Condvar::new(),
        }
    }

    /// Creates a cell that will run a clone of a shared producer.
    pub fn from_producer(producer: &Producer<T, E>) -> Self
    where
        T: 'static,
        E: 'static,
    {
        let producer = Arc::clone(producer);
        Self::new(move || producer())
    }

    pub fn state(&self) -> CellState {
        match &*self.state.lock() {
            State::NotStarted(_) => CellState::NotStarted,
            State::InProgress => CellState::InProgress,
            State::Completed(_) => CellState::Completed,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state() == CellState::Completed
    }
}

impl<T: Clone, E: Clone> SingleFlightCell<T, E> {
    /// Returns the shared outcome, running the producer if nobody has yet.
    pub fn get(&self) -> Result<T, ValueError<E>> {
        let mut state = self.state.lock();
        loop {
            // Clone through the reference; the record must survive a panicking clone
            if let State::Completed(outcome) = &*state {
                return outcome.clone();
            }
            if matches!(*state, State::InProgress) {
                self.completed.wait(&mut state);
                continue;
            }
            if let State::NotStarted(thunk) = mem::replace(&mut *state, State::InProgress) {
                let outcome = MutexGuard::unlocked(&mut state, || run(thunk));
                *state = State::Completed(outcome);
                self.completed.notify_all();
            }
        }
    }
}

fn run<T, E>(thunk: Thunk<T, E>) -> Result<T, ValueError<E>> {
    match panic::catch_unwind(AssertUnwindSafe(thunk)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ValueError::Producer(err)),
        Err(payload) => {
            let message = panic_message(&*payload);
            tracing::warn!(%message, "single-flight producer panicked");
            Err(ValueError::Panicked(message))
        }
    }
}

impl<T: Clone, E: Clone> Value for SingleFlightCell<T, E> {
    type Output = Result<T, ValueError<E>>;

    fn get(&self) -> Self::Output {
        SingleFlightCell::get(self)
    }
}

impl<T, E> Debug for SingleFlightCell<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlightCell")
            .field("state", &self.state())
            .finish()
    }
}

impl_output_traits!(SingleFlightCell<T, E>);
