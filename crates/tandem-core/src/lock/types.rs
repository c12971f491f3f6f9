//! Type definitions for the lock system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{manager::LockManager, store::LockStore};

/// A lock on a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Resource being locked
    pub resource: String,
    /// Lock holder
    pub owner: String,
    /// When acquired
    pub acquired_at: DateTime<Utc>,
}

impl LockRecord {
    /// Create a new lock record
    #[must_use]
    pub fn new(resource: impl Into<String>, owner: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            resource: resource.into(),
            owner: owner.into(),
            acquired_at: at,
        }
    }

    /// Seconds since acquisition, clamped at zero
    #[must_use]
    pub fn age_secs(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.acquired_at).num_seconds()).unwrap_or(0)
    }
}

/// Result of a single acquisition attempt (discriminated union, no panic)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    /// No live record existed; ours is now stored
    Acquired(LockRecord),
    /// A stale record was evicted and replaced with ours
    Evicted {
        record: LockRecord,
        previous: LockRecord,
    },
    /// Another owner holds a live record
    Held(LockRecord),
}

impl Acquisition {
    #[must_use]
    pub const fn is_acquired(&self) -> bool {
        !matches!(self, Self::Held(_))
    }
}

/// A stored record together with its staleness verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockStatus {
    pub record: LockRecord,
    pub age_secs: u64,
    pub stale: bool,
}

/// Held lock that releases when dropped.
pub struct LockGuard<'a, S: LockStore> {
    pub(super) manager: &'a LockManager<S>,
    pub(super) resource: String,
    pub(super) owner: String,
    pub(super) released: bool,
}

impl<S: LockStore> LockGuard<'_, S> {
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Release now instead of at drop.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.manager.release(&self.resource, &self.owner);
        }
    }
}

impl<S: LockStore> std::fmt::Debug for LockGuard<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("resource", &self.resource)
            .field("owner", &self.owner)
            .field("released", &self.released)
            .finish()
    }
}

impl<S: LockStore> Drop for LockGuard<'_, S> {
    fn drop(&mut self) {
        self.release_once();
    }
}
