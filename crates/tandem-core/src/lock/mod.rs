//! Named cooperative locks for files shared between agent processes.
//!
//! # Guarantees
//!
//! - **Mutual Exclusion**: at most one live record per resource
//! - **Stale Lock Recovery**: a record older than the staleness threshold is
//!   evicted by the next acquirer, whoever wrote it
//! - **Bounded Waiting**: `wait_for_lock` polls and gives up after `max_wait`
//! - **Release on every path**: `LockGuard` releases on drop
//!
//! Recovery is time based, not liveness based: a crashed holder blocks others
//! until its record ages past the threshold.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use tandem_core::lock::{FsLockStore, LockManager};
//!
//! # async fn run() -> tandem_core::Result<()> {
//! let manager = LockManager::new(
//!     FsLockStore::new(".agent/locks"),
//!     Duration::from_secs(300),
//!     Duration::from_millis(500),
//! );
//!
//! if let Some(guard) = manager.guard("backlog", "claude_code", Duration::from_secs(30)).await {
//!     // edit the backlog; the record is removed when `guard` drops
//!     drop(guard);
//! }
//! # Ok(())
//! # }
//! ```

mod manager;
mod queries;
mod store;
mod types;

pub use manager::LockManager;
pub use queries::validate_resource_name;
pub use store::{FsLockStore, LockStore, MemoryLockStore};
pub use types::{Acquisition, LockGuard, LockRecord, LockStatus};

/// Resource name of the shared backlog file.
pub const BACKLOG_RESOURCE: &str = "backlog";
