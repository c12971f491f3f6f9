//! # Tandem Core
//!
//! Coordination layer for agents that share one project checkout:
//!
//! - `lock`: cooperative, staleness-aware named locks on the filesystem
//! - `backlog`: backlog grammar, epic ownership checks, the mark-done mutator
//! - `session`: the single active work session per working directory
//! - `daylog`: parser/formatter for per-day session logs
//! - `aggregate`: read-only summaries over the log archive
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod aggregate;
pub mod backlog;
pub mod config;
pub mod daylog;
mod error;
pub mod lock;
pub mod session;

pub use agent::AgentId;
pub use config::{load_config, Config, LockConfig, OwnershipConfig};
pub use error::{Error, Result};
pub use lock::{Acquisition, FsLockStore, LockGuard, LockManager, LockRecord, LockStore};
