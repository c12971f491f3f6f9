//! CLI command definitions using `clap`

pub mod handlers;

use clap::{Arg, ArgAction, ArgGroup, Command};

pub fn build_cli() -> Command {
    Command::new("tandem")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Session logs and backlog coordination for agents sharing a checkout")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd_start())
        .subcommand(cmd_end())
        .subcommand(cmd_status())
        .subcommand(cmd_finish_task())
        .subcommand(cmd_summary())
        .subcommand(cmd_show())
        .subcommand(cmd_agents())
        .subcommand(cmd_progress())
        .subcommand(cmd_locks())
}

pub fn after_help_text(examples: &[&str]) -> String {
    let mut text = String::from("EXAMPLES:\n");
    for example in examples {
        text.push_str("  ");
        text.push_str(example);
        text.push('\n');
    }
    text
}

fn backlog_arg() -> Arg {
    Arg::new("backlog")
        .long("backlog")
        .value_name("PATH")
        .help("Backlog file (default: first configured candidate that exists)")
}

fn cmd_start() -> Command {
    Command::new("start")
        .about("Start a work session")
        .arg(
            Arg::new("agent")
                .long("agent")
                .value_name("NAME")
                .help("Agent identity (default: detected from the environment)"),
        )
        .after_help(after_help_text(&[
            "tandem start                    Start a session as the detected agent",
            "tandem start --agent claude_code",
        ]))
}

fn cmd_end() -> Command {
    Command::new("end")
        .about("End the active session and record it in the day log")
        .arg(
            Arg::new("activities")
                .long("activities")
                .short('a')
                .value_name("LIST")
                .help("Semicolon-separated activities"),
        )
        .arg(
            Arg::new("quick")
                .long("quick")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Do not record a placeholder when no activities are given"),
        )
        .after_help(after_help_text(&[
            "tandem end --activities \"Story 3.1 done; fixed parser\"",
            "tandem end --quick",
        ]))
}

fn cmd_status() -> Command {
    Command::new("status").about("Show the active session")
}

fn cmd_finish_task() -> Command {
    Command::new("finish-task")
        .about("Mark a backlog task as complete")
        .arg(
            Arg::new("task_id")
                .required(true)
                .value_name("TASK_ID")
                .help("Task identifier, e.g. 3.1 or \"Story 3.1\""),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Proceed even if the epic belongs to another agent"),
        )
        .arg(
            Arg::new("agent")
                .long("agent")
                .value_name("NAME")
                .help("Agent identity (default: detected from the environment)"),
        )
        .arg(backlog_arg())
        .after_help(after_help_text(&[
            "tandem finish-task 3.1",
            "tandem finish-task \"Story 4.2\" --force",
        ]))
}

fn cmd_summary() -> Command {
    Command::new("summary")
        .about("Build, print and save an activity report")
        .arg(
            Arg::new("week")
                .long("week")
                .action(ArgAction::SetTrue)
                .help("Current week, Monday to today (default)"),
        )
        .arg(
            Arg::new("month")
                .long("month")
                .action(ArgAction::SetTrue)
                .help("Current month, 1st to today"),
        )
        .group(ArgGroup::new("period").args(["week", "month"]))
}

fn cmd_show() -> Command {
    Command::new("show").about("Print a day log").arg(
        Arg::new("date")
            .value_name("DATE")
            .help("Day to show as YYYY-MM-DD (default: today)"),
    )
}

fn cmd_agents() -> Command {
    Command::new("agents")
        .about("Show recent activity per agent")
        .arg(
            Arg::new("days")
                .long("days")
                .value_name("N")
                .value_parser(clap::value_parser!(u32).range(1..=36_500))
                .default_value("7")
                .help("How many days to look back (1 to 36500)"),
        )
}

fn cmd_progress() -> Command {
    Command::new("progress")
        .about("Show completion per epic")
        .arg(backlog_arg())
}

fn cmd_locks() -> Command {
    Command::new("locks")
        .about("Inspect coordination locks")
        .subcommand(
            Command::new("release")
                .about("Remove a lock record regardless of holder")
                .arg(
                    Arg::new("resource")
                        .required(true)
                        .value_name("RESOURCE")
                        .help("Resource name, e.g. backlog"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_week_and_month_conflict() {
        let result = build_cli().try_get_matches_from(["tandem", "summary", "--week", "--month"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_finish_task_requires_id() {
        let result = build_cli().try_get_matches_from(["tandem", "finish-task"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_agents_days_default() -> Result<(), clap::Error> {
        let matches = build_cli().try_get_matches_from(["tandem", "agents"])?;
        let days = matches
            .subcommand_matches("agents")
            .and_then(|sub| sub.get_one::<u32>("days"))
            .copied();
        assert_eq!(days, Some(7));
        Ok(())
    }

    #[test]
    fn test_agents_days_is_bounded() {
        for days in ["0", "36501", "4000000000"] {
            let result = build_cli().try_get_matches_from(["tandem", "agents", "--days", days]);
            assert!(result.is_err(), "{days}");
        }
        assert!(build_cli()
            .try_get_matches_from(["tandem", "agents", "--days", "36500"])
            .is_ok());
    }
}
