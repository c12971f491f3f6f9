//! Command implementations
//!
//! Each command loads the [`Workspace`] for the current directory and drives
//! one `tandem_core` component. Output goes to stdout; diagnostics go through
//! `tracing` to stderr.

pub mod backlog;
pub mod locks;
pub mod report;
pub mod session;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tandem_core::{config::load_config_from, AgentId, Config};

/// Project directory plus its merged configuration.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: Config,
}

impl Workspace {
    /// Workspace rooted at the current directory.
    pub fn current() -> Result<Self> {
        let root = std::env::current_dir().context("Failed to get current directory")?;
        Self::at(root)
    }

    pub fn at(root: PathBuf) -> Result<Self> {
        let config = load_config_from(&root)?;
        Ok(Self { root, config })
    }

    /// Acting agent: `explicit` if given, else environment detection, else
    /// the configured default.
    pub fn agent(&self, explicit: Option<&str>) -> AgentId {
        AgentId::resolve(explicit, &self.config.default_agent)
    }

    pub fn logs_root(&self) -> PathBuf {
        self.config.logs_path(&self.root)
    }

    /// `explicit` relative to the root, else the first configured backlog
    /// candidate that exists.
    pub fn backlog_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(self.root.join(path));
        }
        self.config.find_backlog(&self.root).ok_or_else(|| {
            tandem_core::Error::NotFound(format!(
                "backlog file (looked for {})",
                self.config.backlog_candidates.join(", ")
            ))
            .into()
        })
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
