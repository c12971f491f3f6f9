//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: ~/.config/tandem/config.toml
//! 3. Project config: .agent/tandem.toml
//! 4. Environment variables: TANDEM_*
//! 5. CLI flags (command-specific)
//!
//! # Merging
//!
//! A layer only overrides a field whose value differs from the built-in
//! default. Setting a field back to its default in a later file therefore
//! has no effect: a project file with `policy = "soft"` or
//! `stale_after_secs = 300` keeps a global `strict` or `600`. Use the
//! `TANDEM_*` variables for a one-off override, or remove the key from the
//! earlier file.
//!
//! # Example Config
//!
//! ```toml
//! logs_dir = "docs/session-logs"
//! default_agent = "antigravity"
//!
//! [lock]
//! stale_after_secs = 300
//! max_wait_secs = 30
//!
//! [ownership]
//! policy = "strict"
//! ```

mod defaults;
mod load;
mod merge;
mod types;

pub use load::{
    global_config_path, load_config, load_config_from, load_toml_file, project_config_path,
};
pub use types::{Config, LockConfig, OwnershipConfig};
