//! Read-only summaries over the day-log archive.
//!
//! Nothing here writes to the logs; the only output is the report file
//! produced by the `summary` command.

mod archive;
mod report;
mod session;

pub use archive::LogArchive;
pub use report::{Metrics, ProjectTotals, Report, ReportPeriod};
pub use session::{sessions_from_log, AgentActivity, LoggedSession, NO_ACTIVITY_RECORDED, UNKNOWN_PROJECT};
