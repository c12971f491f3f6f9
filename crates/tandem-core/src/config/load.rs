//! Configuration loading from files and environment (Immutable functional pattern)
//!
//! All operations return new instances rather than mutating in place.

use std::path::{Path, PathBuf};

use super::types::Config;
use crate::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration for the current working directory
///
/// # Errors
///
/// Returns error if the working directory is unreadable, a config file is
/// malformed TOML, or the merged values fail validation.
pub fn load_config() -> Result<Config> {
    let root = std::env::current_dir()
        .map_err(|e| Error::Io(format!("Failed to get current directory: {e}")))?;
    load_config_from(&root)
}

/// Load configuration with `root` as the project directory
pub fn load_config_from(root: &Path) -> Result<Config> {
    let config = Config::default();

    let config = match global_config_path() {
        Some(path) if path.is_file() => config.merge(load_toml_file(&path)?),
        _ => config,
    };

    let project_path = project_config_path(root);
    let config = if project_path.is_file() {
        config.merge(load_toml_file(&project_path)?)
    } else {
        config
    };

    let config = config.apply_env_vars()?;
    config.validate()?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tandem")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Get path to project config file
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(".agent").join("tandem.toml")
}

/// Load a TOML file into a partial Config
///
/// # Errors
///
/// Returns error if the path is a directory, cannot be read, or is not
/// valid TOML.
pub fn load_toml_file(path: &Path) -> Result<Config> {
    if path.is_dir() {
        return Err(Error::InvalidConfig(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| Error::io_at(path, &e))?;

    toml::from_str(&content)
        .map_err(|e| Error::Parse(format!("Failed to parse config file {}: {e}", path.display())))
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES (Immutable pattern)
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Apply `TANDEM_*` environment overrides
    pub fn apply_env_vars(self) -> Result<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup("TANDEM_STATE_DIR") {
            self.state_dir = value;
        }

        if let Some(value) = lookup("TANDEM_LOGS_DIR") {
            self.logs_dir = value;
        }

        if let Some(value) = lookup("TANDEM_BACKLOG") {
            self.backlog_candidates = vec![value];
        }

        if let Some(value) = lookup("TANDEM_DEFAULT_AGENT") {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "TANDEM_DEFAULT_AGENT cannot be empty - unset the variable or provide a name"
                        .to_string(),
                ));
            }
            self.default_agent = value;
        }

        if let Some(value) = lookup("TANDEM_LOCK_STALE_AFTER_SECS") {
            self.lock.stale_after_secs = parse_env("TANDEM_LOCK_STALE_AFTER_SECS", &value)?;
        }

        if let Some(value) = lookup("TANDEM_LOCK_POLL_INTERVAL_MS") {
            self.lock.poll_interval_ms = parse_env("TANDEM_LOCK_POLL_INTERVAL_MS", &value)?;
        }

        if let Some(value) = lookup("TANDEM_LOCK_MAX_WAIT_SECS") {
            self.lock.max_wait_secs = parse_env("TANDEM_LOCK_MAX_WAIT_SECS", &value)?;
        }

        if let Some(value) = lookup("TANDEM_OWNERSHIP_POLICY") {
            self.ownership.policy = value.parse().map_err(|_| {
                Error::InvalidConfig(format!(
                    "Invalid TANDEM_OWNERSHIP_POLICY value '{value}' (expected soft or strict)"
                ))
            })?;
        }

        Ok(self)
    }

    /// Reject values that would make the lock or log layers misbehave
    pub fn validate(&self) -> Result<()> {
        if self.default_agent.trim().is_empty() {
            return Err(Error::InvalidConfig("default_agent cannot be empty".into()));
        }
        if self.logs_dir.trim().is_empty() || self.state_dir.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "logs_dir and state_dir cannot be empty".into(),
            ));
        }
        if self.lock.stale_after_secs == 0 {
            return Err(Error::InvalidConfig("lock.stale_after_secs must be > 0".into()));
        }
        if self.lock.max_wait_secs == 0 {
            return Err(Error::InvalidConfig("lock.max_wait_secs must be > 0".into()));
        }
        if self.lock.poll_interval() >= self.lock.max_wait() {
            return Err(Error::InvalidConfig(format!(
                "lock.poll_interval_ms ({}) must be < lock.max_wait_secs ({}s)",
                self.lock.poll_interval_ms, self.lock.max_wait_secs
            )));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::InvalidConfig(format!("Invalid {key} value: {e}")))
}
