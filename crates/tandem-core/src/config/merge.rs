//! Configuration merging logic (Immutable functional pattern)
//!
//! Later configs override earlier ones (defaults → global → project → env).
//! A field equal to its built-in default counts as "not set" and keeps the
//! earlier value.

use super::{
    defaults::default_backlog_candidates,
    types::{Config, LockConfig, OwnershipConfig},
};

impl Config {
    /// Merge another config into this one (other takes precedence)
    pub fn merge(self, other: Self) -> Self {
        let defaults = Self::default();
        Self {
            state_dir: pick(self.state_dir, other.state_dir, &defaults.state_dir),
            logs_dir: pick(self.logs_dir, other.logs_dir, &defaults.logs_dir),
            backlog_candidates: if other.backlog_candidates == default_backlog_candidates() {
                self.backlog_candidates
            } else {
                other.backlog_candidates
            },
            default_agent: pick(
                self.default_agent,
                other.default_agent,
                &defaults.default_agent,
            ),
            lock: self.lock.merge(other.lock),
            ownership: self.ownership.merge(other.ownership),
        }
    }
}

impl LockConfig {
    fn merge(self, other: Self) -> Self {
        let defaults = Self::default();
        Self {
            stale_after_secs: pick(
                self.stale_after_secs,
                other.stale_after_secs,
                &defaults.stale_after_secs,
            ),
            poll_interval_ms: pick(
                self.poll_interval_ms,
                other.poll_interval_ms,
                &defaults.poll_interval_ms,
            ),
            max_wait_secs: pick(
                self.max_wait_secs,
                other.max_wait_secs,
                &defaults.max_wait_secs,
            ),
        }
    }
}

impl OwnershipConfig {
    fn merge(self, other: Self) -> Self {
        Self {
            policy: pick(self.policy, other.policy, &Self::default().policy),
        }
    }
}

fn pick<T: PartialEq>(current: T, incoming: T, default: &T) -> T {
    if &incoming == default {
        current
    } else {
        incoming
    }
}
