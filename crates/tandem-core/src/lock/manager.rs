//! Lock acquisition, release and bounded waiting.

use std::{path::Path, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};

use super::{
    queries::{is_stale, validate_resource_name},
    store::{FsLockStore, LockStore},
    types::{Acquisition, LockGuard, LockRecord, LockStatus},
};
use crate::{Config, Error, Result};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Acquires and releases named locks on top of a [`LockStore`].
pub struct LockManager<S: LockStore = FsLockStore> {
    store: S,
    stale_after: Duration,
    poll_interval: Duration,
    clock: Clock,
}

impl LockManager<FsLockStore> {
    /// Filesystem-backed manager rooted at `root` using the lock settings
    /// from `config`.
    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self::new(
            FsLockStore::new(config.lock_dir(root)),
            config.lock.stale_after(),
            config.lock.poll_interval(),
        )
    }
}

impl<S: LockStore> LockManager<S> {
    pub fn new(store: S, stale_after: Duration, poll_interval: Duration) -> Self {
        Self {
            store,
            stale_after,
            poll_interval,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock, for deterministic staleness tests.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub const fn stale_after(&self) -> Duration {
        self.stale_after
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Single acquisition attempt with full detail.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid resource names and store IO faults.
    /// Contention is `Ok(Acquisition::Held)`, never an error.
    pub fn try_acquire(&self, resource: &str, owner: &str) -> Result<Acquisition> {
        validate_resource_name(resource)?;

        self.store.exclusive(resource, || {
            let now = self.now();
            let record = LockRecord::new(resource, owner, now);

            let existing = match self.store.load(resource) {
                Ok(existing) => existing,
                Err(Error::Parse(reason)) => {
                    tracing::warn!(resource, %reason, "discarding unreadable lock record");
                    self.store.remove(resource)?;
                    None
                }
                Err(e) => return Err(e),
            };

            match existing {
                None => {
                    if self.store.create(&record)? {
                        tracing::debug!(resource, owner, "lock acquired");
                        Ok(Acquisition::Acquired(record))
                    } else {
                        // Lost a race with a writer outside the guard.
                        let held = self.store.load(resource)?.unwrap_or(record);
                        Ok(Acquisition::Held(held))
                    }
                }
                Some(previous) if is_stale(&previous, now, self.stale_after) => {
                    tracing::warn!(
                        resource,
                        previous_owner = %previous.owner,
                        age_secs = previous.age_secs(now),
                        "evicting stale lock"
                    );
                    self.store.remove(resource)?;
                    if self.store.create(&record)? {
                        Ok(Acquisition::Evicted { record, previous })
                    } else {
                        Ok(Acquisition::Held(previous))
                    }
                }
                Some(held) => {
                    tracing::debug!(resource, holder = %held.owner, "lock busy");
                    Ok(Acquisition::Held(held))
                }
            }
        })
    }

    /// Take the lock if it is free or stale. Faults count as "not acquired".
    pub fn acquire(&self, resource: &str, owner: &str) -> bool {
        match self.try_acquire(resource, owner) {
            Ok(acquisition) => acquisition.is_acquired(),
            Err(e) => {
                tracing::warn!(resource, owner, "lock acquisition failed: {e}");
                false
            }
        }
    }

    /// Remove the record for `resource`. Absent records are fine.
    ///
    /// Holder identity is not checked; callers are trusted to release only
    /// what they hold.
    pub fn release(&self, resource: &str, owner: &str) {
        match self.store.remove(resource) {
            Ok(()) => tracing::debug!(resource, owner, "lock released"),
            Err(e) => tracing::warn!(resource, owner, "lock release failed: {e}"),
        }
    }

    /// Poll [`LockManager::acquire`] until it succeeds or `max_wait` elapses.
    pub async fn wait_for_lock(&self, resource: &str, owner: &str, max_wait: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + max_wait;
        loop {
            if self.acquire(resource, owner) {
                return true;
            }
            let now = tokio::time::Instant::now();
            if now >= deadline {
                tracing::debug!(resource, owner, ?max_wait, "gave up waiting for lock");
                return false;
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// Wait for the lock and hand back a guard that releases on drop.
    pub async fn guard(
        &self,
        resource: &str,
        owner: &str,
        max_wait: Duration,
    ) -> Option<LockGuard<'_, S>> {
        if self.wait_for_lock(resource, owner, max_wait).await {
            Some(LockGuard {
                manager: self,
                resource: resource.to_string(),
                owner: owner.to_string(),
                released: false,
            })
        } else {
            None
        }
    }

    /// The live (non-stale) record for `resource`, if any.
    pub fn holder(&self, resource: &str) -> Result<Option<LockRecord>> {
        let now = self.now();
        Ok(self
            .store
            .load(resource)?
            .filter(|record| !is_stale(record, now, self.stale_after)))
    }

    /// All stored records with their staleness verdicts.
    pub fn records(&self) -> Result<Vec<LockStatus>> {
        let now = self.now();
        Ok(self
            .store
            .list()?
            .into_iter()
            .map(|record| LockStatus {
                age_secs: record.age_secs(now),
                stale: is_stale(&record, now, self.stale_after),
                record,
            })
            .collect())
    }
}

impl<S: LockStore> std::fmt::Debug for LockManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockManager")
            .field("stale_after", &self.stale_after)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::*;
    use crate::lock::MemoryLockStore;

    fn manager() -> LockManager<MemoryLockStore> {
        LockManager::new(
            MemoryLockStore::new(),
            Duration::from_secs(300),
            Duration::from_millis(10),
        )
    }

    #[test]
    fn test_second_owner_is_refused() {
        let locks = manager();
        assert!(locks.acquire("backlog", "antigravity"));
        assert!(!locks.acquire("backlog", "claude_code"));
    }

    #[test]
    fn test_same_owner_is_also_refused() {
        let locks = manager();
        assert!(locks.acquire("backlog", "antigravity"));
        assert!(!locks.acquire("backlog", "antigravity"));
    }

    #[test]
    fn test_release_then_reacquire() {
        let locks = manager();
        assert!(locks.acquire("backlog", "antigravity"));
        locks.release("backlog", "antigravity");
        assert!(locks.acquire("backlog", "claude_code"));
    }

    #[test]
    fn test_release_without_record_is_noop() -> Result<()> {
        let locks = manager();
        locks.release("backlog", "antigravity");
        assert!(locks.holder("backlog")?.is_none());
        Ok(())
    }

    #[test]
    fn test_stale_lock_is_evicted() -> Result<()> {
        let offset = Arc::new(AtomicI64::new(0));
        let clock_offset = Arc::clone(&offset);
        let base = Utc::now();
        let locks = manager().with_clock(move || {
            base + chrono::Duration::seconds(clock_offset.load(Ordering::SeqCst))
        });

        assert!(locks.acquire("backlog", "antigravity"));
        offset.store(299, Ordering::SeqCst);
        assert!(!locks.acquire("backlog", "claude_code"));

        offset.store(301, Ordering::SeqCst);
        match locks.try_acquire("backlog", "claude_code")? {
            Acquisition::Evicted { record, previous } => {
                assert_eq!(record.owner, "claude_code");
                assert_eq!(previous.owner, "antigravity");
            }
            other => return Err(Error::InvalidInput(format!("expected eviction, got {other:?}"))),
        }
        Ok(())
    }

    #[test]
    fn test_invalid_resource_is_not_acquired() {
        let locks = manager();
        assert!(!locks.acquire("../etc", "antigravity"));
        assert!(locks.try_acquire("", "antigravity").is_err());
    }

    #[tokio::test]
    async fn test_wait_for_lock_times_out() {
        let locks = manager();
        assert!(locks.acquire("backlog", "antigravity"));
        let acquired = locks
            .wait_for_lock("backlog", "claude_code", Duration::from_millis(50))
            .await;
        assert!(!acquired);
    }

    #[tokio::test]
    async fn test_guard_releases_on_drop() -> Result<()> {
        let locks = manager();
        {
            let guard = locks
                .guard("backlog", "antigravity", Duration::from_millis(50))
                .await;
            assert!(guard.is_some());
            assert_eq!(
                locks.holder("backlog")?.map(|r| r.owner),
                Some("antigravity".to_string())
            );
        }
        assert!(locks.holder("backlog")?.is_none());
        Ok(())
    }

    #[test]
    fn test_records_report_staleness() -> Result<()> {
        let base = Utc::now();
        let locks = manager().with_clock(move || base);
        locks.store().create(&LockRecord::new(
            "old",
            "antigravity",
            base - chrono::Duration::seconds(600),
        ))?;
        assert!(locks.acquire("backlog", "claude_code"));

        let statuses = locks.records()?;
        assert_eq!(statuses.len(), 2);
        assert!(!statuses[0].stale);
        assert_eq!(statuses[0].record.resource, "backlog");
        assert!(statuses[1].stale);
        assert_eq!(statuses[1].age_secs, 600);
        Ok(())
    }
}
