//! Argument extraction and routing from `ArgMatches` to `commands`

use std::path::PathBuf;

use anyhow::Result;
use clap::ArgMatches;
use tandem_core::aggregate::ReportPeriod;

use crate::commands::{
    self,
    backlog::FinishOptions,
    session::{EndOptions, StartOptions},
    Workspace,
};

/// Format an error for display, including its immediate cause when the
/// top-level message does not already carry it.
pub fn format_error(err: &anyhow::Error) -> String {
    let msg = err.to_string();
    if let Some(source) = err.source() {
        let source_msg = source.to_string();
        if !msg.contains(&source_msg) && !source_msg.is_empty() {
            return format!("{msg}\nCause: {source_msg}");
        }
    }
    msg
}

pub async fn dispatch(matches: &ArgMatches) -> Result<()> {
    let workspace = Workspace::current()?;

    match matches.subcommand() {
        Some(("start", sub_m)) => handle_start(&workspace, sub_m),
        Some(("end", sub_m)) => handle_end(&workspace, sub_m),
        Some(("status", _)) => commands::session::status(&workspace),
        Some(("finish-task", sub_m)) => handle_finish_task(&workspace, sub_m).await,
        Some(("summary", sub_m)) => handle_summary(&workspace, sub_m),
        Some(("show", sub_m)) => {
            commands::report::show(&workspace, sub_m.get_one::<String>("date").map(String::as_str))
        }
        Some(("agents", sub_m)) => {
            let days = sub_m.get_one::<u32>("days").copied().unwrap_or(7);
            commands::report::agents(&workspace, days)
        }
        Some(("progress", sub_m)) => {
            commands::backlog::progress(&workspace, backlog_arg(sub_m).as_deref())
        }
        Some(("locks", sub_m)) => handle_locks(&workspace, sub_m),
        _ => anyhow::bail!("Unknown command. Run 'tandem --help' for usage."),
    }
}

fn backlog_arg(sub_m: &ArgMatches) -> Option<PathBuf> {
    sub_m.get_one::<String>("backlog").map(PathBuf::from)
}

fn handle_start(workspace: &Workspace, sub_m: &ArgMatches) -> Result<()> {
    let options = StartOptions {
        agent: sub_m.get_one::<String>("agent").cloned(),
    };
    commands::session::start(workspace, &options)
}

fn handle_end(workspace: &Workspace, sub_m: &ArgMatches) -> Result<()> {
    let options = EndOptions {
        activities: sub_m.get_one::<String>("activities").cloned(),
        quick: sub_m.get_flag("quick"),
    };
    commands::session::end(workspace, &options)
}

async fn handle_finish_task(workspace: &Workspace, sub_m: &ArgMatches) -> Result<()> {
    let task_id = sub_m
        .get_one::<String>("task_id")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("TASK_ID is required"))?;
    let options = FinishOptions {
        task_id,
        force: sub_m.get_flag("force"),
        agent: sub_m.get_one::<String>("agent").cloned(),
        backlog: backlog_arg(sub_m),
    };
    commands::backlog::finish_task(workspace, &options).await
}

fn handle_summary(workspace: &Workspace, sub_m: &ArgMatches) -> Result<()> {
    let period = if sub_m.get_flag("month") {
        ReportPeriod::Monthly
    } else {
        ReportPeriod::Weekly
    };
    commands::report::summary(workspace, period)
}

fn handle_locks(workspace: &Workspace, sub_m: &ArgMatches) -> Result<()> {
    match sub_m.subcommand() {
        Some(("release", release_m)) => {
            let resource = release_m
                .get_one::<String>("resource")
                .ok_or_else(|| anyhow::anyhow!("RESOURCE is required"))?;
            commands::locks::release(workspace, resource)
        }
        _ => commands::locks::list(workspace),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_adds_cause() {
        let err = anyhow::Error::new(std::io::Error::other("disk full")).context("Failed to write report");
        assert_eq!(format_error(&err), "Failed to write report\nCause: disk full");
    }

    #[test]
    fn test_format_error_plain() {
        let err = anyhow::Error::new(tandem_core::Error::NoActiveSession);
        assert_eq!(format_error(&err), "No active session");
    }
}
