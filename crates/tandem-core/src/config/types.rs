//! Configuration type definitions

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::backlog::OwnershipPolicy;

/// Root configuration structure
///
/// Paths are relative to the working directory the command runs in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding lock records and the session state file
    pub state_dir: String,
    /// Root of the year-partitioned day logs
    pub logs_dir: String,
    /// Backlog locations, first existing one wins
    pub backlog_candidates: Vec<String>,
    /// Identity used when no environment signal is present
    pub default_agent: String,
    pub lock: LockConfig,
    pub ownership: OwnershipConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LockConfig {
    pub stale_after_secs: u64,
    pub poll_interval_ms: u64,
    pub max_wait_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OwnershipConfig {
    pub policy: OwnershipPolicy,
}

impl Config {
    /// Directory of lock records under `root`.
    pub fn lock_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.state_dir).join("locks")
    }

    /// Session state file under `root`.
    pub fn session_state_path(&self, root: &Path) -> PathBuf {
        root.join(&self.state_dir).join("session_state.json")
    }

    /// Day-log root under `root`.
    pub fn logs_path(&self, root: &Path) -> PathBuf {
        root.join(&self.logs_dir)
    }

    /// First backlog candidate that exists under `root`.
    pub fn find_backlog(&self, root: &Path) -> Option<PathBuf> {
        self.backlog_candidates
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.is_file())
    }
}

impl LockConfig {
    pub const fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub const fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
}
