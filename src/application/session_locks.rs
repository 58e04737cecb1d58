//! Per-session async locks.
//!
//! Serialises the load-process-save cycle for one session id so two
//! concurrent requests cannot interleave their writes. A schema switch
//! takes the gate exclusively and waits for every in-flight cycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{
    Mutex as AsyncMutex, OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock,
};

use crate::domain::foundation::SessionId;

/// Registry of one async mutex per session id, behind a shared schema gate.
#[derive(Debug, Clone, Default)]
pub struct SessionLocks {
    locks: Arc<Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>>,
    schema_gate: Arc<RwLock<()>>,
}

/// Held for one session's load-process-save cycle.
#[derive(Debug)]
pub struct SessionGuard {
    // Field order is drop order: the session lock is released first.
    _session: OwnedMutexGuard<()>,
    _schema: OwnedRwLockReadGuard<()>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<SessionId, Arc<AsyncMutex<()>>>> {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Waits for exclusive access to `session_id`.
    ///
    /// Idle entries for other sessions are pruned on the way in.
    pub async fn acquire(&self, session_id: SessionId) -> SessionGuard {
        let schema = Arc::clone(&self.schema_gate).read_owned().await;
        let lock = {
            let mut registry = self.registry();
            // Only the registry holds an idle lock.
            registry.retain(|id, lock| *id == session_id || Arc::strong_count(lock) > 1);
            Arc::clone(registry.entry(session_id).or_default())
        };
        SessionGuard {
            _session: lock.lock_owned().await,
            _schema: schema,
        }
    }

    /// Waits until no session cycle is running and blocks new ones until
    /// the guard is dropped.
    pub async fn acquire_all(&self) -> OwnedRwLockWriteGuard<()> {
        Arc::clone(&self.schema_gate).write_owned().await
    }

    /// Number of tracked session ids.
    pub fn len(&self) -> usize {
        self.registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn serialises_same_session() {
        let locks = SessionLocks::new();
        let id = SessionId::new();

        let guard = locks.acquire(id).await;
        let second = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire(id).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!second.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), second)
            .await
            .expect("second acquire should complete")
            .unwrap();
    }

    #[tokio::test]
    async fn different_sessions_do_not_block() {
        let locks = SessionLocks::new();
        let _a = locks.acquire(SessionId::new()).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(SessionId::new())).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn acquire_all_waits_for_running_sessions() {
        let locks = SessionLocks::new();
        let session = locks.acquire(SessionId::new()).await;

        let all = tokio::time::timeout(Duration::from_millis(50), locks.acquire_all()).await;
        assert!(all.is_err());

        drop(session);
        let all = tokio::time::timeout(Duration::from_secs(1), locks.acquire_all())
            .await
            .expect("exclusive access once sessions are released");

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(SessionId::new())).await;
        assert!(blocked.is_err());
        drop(all);
        assert!(
            tokio::time::timeout(Duration::from_secs(1), locks.acquire(SessionId::new()))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn prunes_idle_entries() {
        let locks = SessionLocks::new();
        for _ in 0..5 {
            let _g = locks.acquire(SessionId::new()).await;
        }
        let _held = locks.acquire(SessionId::new()).await;
        assert_eq!(locks.len(), 1);
    }
}
