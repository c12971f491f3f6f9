//! Pure checks for the lock system.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::types::LockRecord;
use crate::{Error, Result};

/// Reserved keywords that cannot be used as resource names
const RESERVED_KEYWORDS: &[&str] = &["null", "undefined", "true", "false", "none", "nil", "void"];

/// Validate a resource name
///
/// Names become file names in the lock directory, so separators and leading
/// dots are refused.
pub fn validate_resource_name(resource: &str) -> Result<()> {
    let trimmed = resource.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidInput(
            "Resource name cannot be empty or whitespace-only".into(),
        ));
    }

    let lower = trimmed.to_lowercase();
    if RESERVED_KEYWORDS.iter().any(|&keyword| keyword == lower) {
        return Err(Error::InvalidInput(format!(
            "Resource name '{trimmed}' is a reserved keyword"
        )));
    }

    if !trimmed.chars().any(char::is_alphanumeric) {
        return Err(Error::InvalidInput(
            "Resource name must contain at least one alphanumeric character".into(),
        ));
    }

    if trimmed != resource || trimmed.starts_with('.') || trimmed.contains(['/', '\\']) {
        return Err(Error::InvalidInput(format!(
            "Resource name '{resource}' must be a plain file name"
        )));
    }

    Ok(())
}

/// Whether `record` is older than `stale_after` at `now`.
pub(super) fn is_stale(record: &LockRecord, now: DateTime<Utc>, stale_after: Duration) -> bool {
    (now - record.acquired_at)
        .to_std()
        .map(|age| age > stale_after)
        .unwrap_or(false)
}
