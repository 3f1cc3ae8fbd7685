//! Per-workspace write serialization within one process.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

type LockTable = DashMap<Uuid, Arc<Mutex<()>>>;

/// Table of async mutexes, one per workspace with a write in progress.
///
/// Entries are created on first use and removed when the last holder or
/// waiter lets go, so the table only holds workspaces being written.
#[derive(Debug, Default)]
pub struct WorkspaceLocks {
    locks: Arc<LockTable>,
}

/// Exclusive access to one workspace's tree. Dropping it releases the lock.
#[derive(Debug)]
pub struct WorkspaceGuard {
    guard: Option<OwnedMutexGuard<()>>,
    workspace_id: Uuid,
    locks: Arc<LockTable>,
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        // Release first so the table's reference is the only one left.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.workspace_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl WorkspaceLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a workspace's tree.
    pub async fn acquire(&self, workspace_id: Uuid) -> WorkspaceGuard {
        let lock = self
            .locks
            .entry(workspace_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        WorkspaceGuard {
            guard: Some(lock.lock_owned().await),
            workspace_id,
            locks: self.locks.clone(),
        }
    }

    /// Number of workspaces with a lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no workspace is locked or awaited.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_workspace_is_exclusive() {
        let locks = Arc::new(WorkspaceLocks::new());
        let ws = Uuid::new_v4();

        let guard = locks.acquire(ws).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire(ws).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());
        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_other_workspaces_do_not_block() {
        let locks = WorkspaceLocks::new();
        let _a = locks.acquire(Uuid::new_v4()).await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_entry_removed_after_last_guard() {
        let locks = WorkspaceLocks::new();
        let ws = Uuid::new_v4();
        for _ in 0..3 {
            let guard = locks.acquire(ws).await;
            assert_eq!(locks.len(), 1);
            drop(guard);
            assert!(locks.is_empty());
        }
    }

    #[tokio::test]
    async fn test_entry_kept_while_someone_waits() {
        let locks = Arc::new(WorkspaceLocks::new());
        let ws = Uuid::new_v4();

        let first = locks.acquire(ws).await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move { locks.acquire(ws).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        let second = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(locks.len(), 1);
        drop(second);
        assert!(locks.is_empty());
    }
}
