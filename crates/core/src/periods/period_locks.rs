use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::ids::PeriodId;

/// Per-period async locks.
///
/// Holding a period's guard serializes mutate-and-recompute cycles on that
/// period within this process. Locks are not reentrant. A period's mutex only
/// lives in the map while someone holds or waits for it.
#[derive(Default)]
pub struct PeriodLocks {
    locks: DashMap<PeriodId, Arc<Mutex<()>>>,
}

impl PeriodLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, period_id: PeriodId) -> PeriodGuard<'_> {
        let lock = self
            .locks
            .entry(period_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        PeriodGuard {
            locks: self,
            period_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Number of periods currently locked or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive hold on one period, released on drop.
pub struct PeriodGuard<'a> {
    locks: &'a PeriodLocks,
    period_id: PeriodId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PeriodGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // The map holds the last reference once no other task has cloned it.
        self.locks
            .locks
            .remove_if(&self.period_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
