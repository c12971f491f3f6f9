//! Per-day session logs.
//!
//! One markdown file per calendar day under `<logs_dir>/<YYYY>/`. Logs are
//! parsed into a [`DayLog`], edited structurally and rendered back; lines
//! that were not edited are written back unchanged.

mod document;
mod duration;
mod entry;

pub use document::{log_path, DayLog};
pub use duration::{elapsed_minutes, format_clock, format_duration, parse_clock, parse_duration};
pub use entry::{Entry, EntryStatus, NO_ACTIVITY};
