//! `summary`, `show` and `agents`: read-only views over the log archive

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tandem_core::{
    aggregate::{LogArchive, Report, ReportPeriod},
    daylog::format_duration,
    Error,
};

use super::{today, Workspace};

fn archive(workspace: &Workspace) -> Result<LogArchive> {
    let root = workspace.logs_root();
    if !root.is_dir() {
        return Err(Error::NotFound(format!("logs directory {}", root.display())).into());
    }
    Ok(LogArchive::new(root))
}

/// Build the report for `period`, print it and save it under the logs root.
///
/// # Errors
///
/// Fails when the logs directory is missing or the report cannot be written.
pub fn summary(workspace: &Workspace, period: ReportPeriod) -> Result<()> {
    let archive = archive(workspace)?;
    let today = today();
    let range = period.range(today);

    println!("Reading logs from {} to {}...", range.0, range.1);
    let sessions = archive.sessions_in_range(range.0, range.1)?;
    let report = Report::build(period, &sessions, range, Local::now().naive_local());
    let text = report.render();

    let path = period.report_path(archive.root(), today);
    std::fs::write(&path, &text)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    tracing::info!(path = %path.display(), sessions = report.session_count, "report saved");

    println!("{text}");
    println!("✓ Report saved to {}", path.display());
    Ok(())
}

/// Print the raw day log for `date` (today when absent).
///
/// # Errors
///
/// Fails on a malformed date or a missing log.
pub fn show(workspace: &Workspace, date: Option<&str>) -> Result<()> {
    let date = match date {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
            Error::InvalidInput(format!("'{text}' is not a date (expected YYYY-MM-DD)"))
        })?,
        None => today(),
    };
    let text = archive(workspace)?.day_log_text(date)?;
    print!("{text}");
    Ok(())
}

/// Print each agent's activity over the last `days` days.
///
/// # Errors
///
/// Fails when the logs directory is missing.
pub fn agents(workspace: &Workspace, days: u32) -> Result<()> {
    let stats = archive(workspace)?.per_agent_recent_activity(days, today())?;

    if stats.is_empty() {
        println!("No sessions in the last {days} days.");
        return Ok(());
    }

    println!("Agent activity, last {days} days");
    for (agent, activity) in &stats {
        println!();
        println!("{agent}");
        println!(
            "  Last session: {} {} ({})",
            activity.last_session.date,
            activity.last_session.start.format("%H:%M"),
            activity.last_session.project
        );
        println!("  Last activity: {}", activity.last_activity);
        println!(
            "  Total: {} over {} session(s)",
            format_duration(activity.total_minutes),
            activity.sessions_count
        );
    }
    Ok(())
}
