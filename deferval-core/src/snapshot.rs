use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::clock::is_at_or_after;
use crate::SingleFlightCell;

/// One generation of a TTL cache: a single-flight cell and the tick at which
/// it stops being served.
///
/// Immutable once built. A refresh never edits a snapshot; it installs a new one.
pub(crate) struct Snapshot<T, E> {
    pub(crate) cell: SingleFlightCell<T, E>,
    pub(crate) expires_at: u64,
}

impl<T, E> Snapshot<T, E> {
    pub(crate) fn new(cell: SingleFlightCell<T, E>, expires_at: u64) -> Self {
        Self { cell, expires_at }
    }

    #[inline]
    pub(crate) fn is_stale(&self, now: u64) -> bool {
        is_at_or_after(now, self.expires_at)
    }
}

/// Slot holding the current snapshot, replaced only by compare-and-swap on
/// pointer identity.
///
/// Backed by an `ArcSwap`: loads and swaps are atomic and never block, so
/// readers of a fresh snapshot never wait behind a refresh.
pub(crate) struct SnapshotSlot<T, E> {
    current: ArcSwap<Snapshot<T, E>>,
}

impl<T, E> SnapshotSlot<T, E> {
    pub(crate) fn new(initial: Snapshot<T, E>) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    #[inline]
    pub(crate) fn load(&self) -> Arc<Snapshot<T, E>> {
        self.current.load_full()
    }

    /// Installs `new` if the slot still holds `expected`.
    ///
    /// Returns the installed snapshot on success, or the snapshot that
    /// replaced `expected` on failure; `new` is dropped unevaluated then.
    pub(crate) fn compare_and_swap(
        &self,
        expected: &Arc<Snapshot<T, E>>,
        new: Snapshot<T, E>,
    ) -> Result<Arc<Snapshot<T, E>>, Arc<Snapshot<T, E>>> {
        let installed = Arc::new(new);
        let previous = self
            .current
            .compare_and_swap(expected, Arc::clone(&installed));
        if Arc::ptr_eq(&*previous, expected) {
            Ok(installed)
        } else {
            Err(Arc::clone(&*previous))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellState;
    use std::sync::Barrier;
    use std::thread;

    fn snapshot(value: u32, expires_at: u64) -> Snapshot<u32, ()> {
        Snapshot::new(SingleFlightCell::new(move || Ok(value)), expires_at)
    }

    #[test]
    fn test_staleness_is_inclusive() {
        let snap = snapshot(1, 100);
        assert!(!snap.is_stale(99));
        assert!(snap.is_stale(100));
        assert!(snap.is_stale(101));
    }

    #[test]
    fn test_cas_succeeds_against_current() {
        let slot = SnapshotSlot::new(snapshot(1, 10));
        let seen = slot.load();

        let installed = slot.compare_and_swap(&seen, snapshot(2, 20));
        let installed = installed.ok().unwrap();
        assert_eq!(installed.expires_at, 20);
        assert!(Arc::ptr_eq(&installed, &slot.load()));
    }

    #[test]
    fn test_cas_fails_against_retired_snapshot() {
        let slot = SnapshotSlot::new(snapshot(1, 10));
        let stale_view = slot.load();
        assert!(slot.compare_and_swap(&stale_view, snapshot(2, 20)).is_ok());

        let loser = snapshot(3, 30);
        let current = slot.compare_and_swap(&stale_view, loser).err().unwrap();
        assert_eq!(current.expires_at, 20);
        assert_eq!(current.cell.state(), CellState::NotStarted);
    }

    #[test]
    fn test_concurrent_cas_has_one_winner() {
        let slot = Arc::new(SnapshotSlot::new(snapshot(0, 0)));
        let seen = slot.load();
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (1..=8u32)
            .map(|i| {
                let slot = Arc::clone(&slot);
                let seen = Arc::clone(&seen);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    slot.compare_and_swap(&seen, snapshot(i, u64::from(i))).is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(!Arc::ptr_eq(&seen, &slot.load()));
    }

    #[test]
    fn test_retired_snapshot_still_usable() {
        let slot = SnapshotSlot::new(snapshot(7, 10));
        let held = slot.load();
        assert!(slot.compare_and_swap(&held, snapshot(8, 20)).is_ok());

        assert_eq!(held.cell.get(), Ok(7));
        assert_eq!(slot.load().cell.get(), Ok(8));
    }
}
