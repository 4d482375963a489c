//! Per-goal async locks serializing read-modify-write cycles.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// One mutex per goal id. Mutations of different goals never wait on each
/// other; mutations of the same goal run one at a time.
///
/// Entries only live while someone holds or waits on them, so ids that were
/// never found (or were deleted) do not accumulate.
#[derive(Clone, Default)]
pub struct GoalLocks {
    locks: Arc<LockMap>,
}

/// Held lock on one goal. Dropping it releases the mutex and removes the map
/// entry when no other task is waiting.
pub struct GoalLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockMap>,
    goal_id: String,
}

impl Drop for GoalLockGuard {
    fn drop(&mut self) {
        // Release first so our own clone no longer counts
        self.guard.take();
        self.locks
            .remove_if(&self.goal_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl GoalLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, goal_id: &str) -> GoalLockGuard {
        let lock = self
            .locks
            .entry(goal_id.to_string())
            .or_default()
            .value()
            .clone();
        let guard = lock.lock_owned().await;
        GoalLockGuard {
            guard: Some(guard),
            locks: self.locks.clone(),
            goal_id: goal_id.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
