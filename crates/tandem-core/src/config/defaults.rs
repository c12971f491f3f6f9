//! Default configuration values

use super::types::{Config, LockConfig, OwnershipConfig};
use crate::{agent::DEFAULT_AGENT, backlog::OwnershipPolicy};

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: ".agent".to_string(),
            logs_dir: "docs/session-logs".to_string(),
            backlog_candidates: default_backlog_candidates(),
            default_agent: DEFAULT_AGENT.to_string(),
            lock: LockConfig::default(),
            ownership: OwnershipConfig::default(),
        }
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: 300,
            poll_interval_ms: 500,
            max_wait_secs: 30,
        }
    }
}

impl Default for OwnershipConfig {
    fn default() -> Self {
        Self {
            policy: OwnershipPolicy::Soft,
        }
    }
}

pub(super) fn default_backlog_candidates() -> Vec<String> {
    vec![
        "docs/BACKLOG.md".to_string(),
        "BACKLOG.md".to_string(),
        "docs/planning/BACKLOG.md".to_string(),
    ]
}
