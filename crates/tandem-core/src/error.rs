//! Error types for tandem-core
//!
//! Every failure a command can hit maps onto one of these variants. The CLI
//! boundary turns them into a status line and an exit code:
//!
//! - **Validation** (exit 1): bad input, bad config, unparsable state
//! - **Coordination** (exit 3): lock contention, ownership conflicts
//! - **Lookup** (exit 4): missing task, session or file
//! - **System** (exit 2): IO faults

use std::path::Path;

use thiserror::Error;

/// Core error type for tandem operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Lock could not be obtained within the allowed wait
    #[error("'{resource}' is locked by another agent (waited {waited_secs}s), try again shortly")]
    Contention { resource: String, waited_secs: u64 },

    /// The epic belongs to another agent and force was not given
    #[error("Epic {epic} belongs to '{owner}'. Use --force to override.")]
    OwnershipConflict { epic: String, owner: String },

    /// Referenced task, session or file is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Expected text was not located while rewriting a file
    #[error("Could not locate expected text: {0}")]
    ParseMismatch(String),

    /// `start` while a session is already running
    #[error("A session is already active since {start_time} (agent: {agent})")]
    AlreadyActive { start_time: String, agent: String },

    /// `end` or `status` without a running session
    #[error("No active session")]
    NoActiveSession,

    /// Configuration values rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// User supplied value rejected by validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialized data could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Read or write failure
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Wrap an IO error with the path it concerned.
    pub fn io_at(path: &Path, err: &std::io::Error) -> Self {
        Self::Io(format!("{}: {err}", path.display()))
    }

    /// Whether retrying the same command later may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Contention { .. })
    }

    /// Process exit code for this error.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_)
            | Self::InvalidInput(_)
            | Self::Parse(_)
            | Self::AlreadyActive { .. }
            | Self::NoActiveSession => 1,
            Self::Io(_) => 2,
            Self::Contention { .. } | Self::OwnershipConflict { .. } => 3,
            Self::NotFound(_) | Self::ParseMismatch(_) => 4,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(format!("Failed to parse config: {err}"))
    }
}

/// Result type alias for tandem-core operations
pub type Result<T> = std::result::Result<T, Error>;
