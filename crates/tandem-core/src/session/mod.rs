//! The active work session of a working directory.
//!
//! At most one session is active per directory. Its record lives in a JSON
//! file under the state directory; starting and ending it also appends and
//! completes an entry in the day log.

mod machine;
mod record;
mod store;

pub use machine::{parse_activities, ActiveSession, EndOutcome, SessionManager, StartOutcome};
pub use record::{SessionRecord, SessionStatus};
pub use store::SessionStore;
