//! End-to-end: sessions written through the state machine and read back by
//! the aggregator.

#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use chrono::{NaiveDate, NaiveDateTime};
use serial_test::serial;
use tandem_core::{
    aggregate::{LogArchive, Report, ReportPeriod},
    backlog::OwnershipPolicy,
    config::load_config_from,
    daylog::{format_duration, log_path, DayLog, EntryStatus},
    session::{SessionManager, SessionStore},
    AgentId, Error, Result,
};

fn at(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M").map_err(|e| Error::Parse(e.to_string()))
}

fn day(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| Error::Parse(e.to_string()))
}

struct Project {
    now: Arc<Mutex<NaiveDateTime>>,
    manager: SessionManager,
}

impl Project {
    fn new(root: &Path) -> Result<Self> {
        let now = Arc::new(Mutex::new(at("2026-10-13 09:00")?));
        let clock = Arc::clone(&now);
        let manager = SessionManager::new(
            SessionStore::new(root.join(".agent/session_state.json")),
            root.join("logs"),
            "tandem",
        )
        .with_clock(move || clock.lock().map(|now| *now).unwrap_or_default());
        Ok(Self { now, manager })
    }

    fn set_time(&self, text: &str) -> Result<()> {
        let value = at(text)?;
        self.now
            .lock()
            .map(|mut now| *now = value)
            .map_err(|_| Error::Io("clock mutex poisoned".into()))
    }

    fn session(&self, agent: &str, from: &str, to: &str, activities: &str) -> Result<u32> {
        self.set_time(from)?;
        self.manager.start(AgentId::new(agent))?;
        self.set_time(to)?;
        Ok(self.manager.end(Some(activities), false)?.duration_minutes)
    }
}

#[test]
fn two_and_a_half_hours_is_logged_as_02_30() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let project = Project::new(dir.path())?;

    let minutes = project.session("claude_code", "2026-10-13 09:00", "2026-10-13 11:30", "pairing")?;
    assert_eq!(minutes, 150);
    assert_eq!(format_duration(minutes), "02:30");

    let text = std::fs::read_to_string(log_path(&dir.path().join("logs"), day("2026-10-13")?))?;
    assert!(text.contains("1. 09:00 — 11:30 (02:30) [claude_code]"));
    assert!(text.contains("*Last updated: 2026-10-13 11:30*"));
    assert_eq!(text.matches("*Last updated:").count(), 1);
    Ok(())
}

#[test]
fn sessions_are_aggregated_into_the_weekly_report() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let project = Project::new(dir.path())?;

    project.session("antigravity", "2026-10-13 09:00", "2026-10-13 10:00", "Story 4.1 started")?;
    project.session(
        "antigravity",
        "2026-10-14 14:00",
        "2026-10-14 15:30",
        "Story 4.1 done; Epic 4 DONE; Progress: 40%",
    )?;

    let archive = LogArchive::new(dir.path().join("logs"));
    let range = ReportPeriod::Weekly.range(day("2026-10-18")?);
    assert_eq!(range, (day("2026-10-12")?, day("2026-10-18")?));

    let sessions = archive.sessions_in_range(range.0, range.1)?;
    let report = Report::build(ReportPeriod::Weekly, &sessions, range, at("2026-10-18 18:00")?);

    assert_eq!(report.total_minutes, 150);
    assert_eq!(report.session_count, 2);
    assert_eq!(report.per_day.get(&day("2026-10-13")?), Some(&60));
    assert_eq!(report.per_day.get(&day("2026-10-14")?), Some(&90));
    assert_eq!(report.per_project.get("tandem").map(|t| t.minutes), Some(150));
    assert_eq!(report.metrics.latest_progress.as_deref(), Some("40%"));

    let text = report.render();
    assert!(text.contains("- **Total time worked:** 02:30"));
    assert!(text.contains("- **Sessions:** 2"));
    assert!(text.contains("- **2026-10-14 (Wednesday):** 01:30"));
    assert!(text.contains("Epic 4 DONE"));
    Ok(())
}

#[test]
fn range_filter_excludes_other_weeks() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let project = Project::new(dir.path())?;

    project.session("antigravity", "2026-10-09 09:00", "2026-10-09 10:00", "last week")?;
    project.session("antigravity", "2026-10-13 09:00", "2026-10-13 09:45", "this week")?;

    let archive = LogArchive::new(dir.path().join("logs"));
    let sessions = archive.sessions_in_range(day("2026-10-12")?, day("2026-10-18")?)?;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].activities, vec!["this week".to_string()]);
    Ok(())
}

#[test]
fn per_agent_activity_spans_days() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let project = Project::new(dir.path())?;

    project.session("claude_code", "2026-10-16 09:00", "2026-10-16 10:00", "parser")?;
    project.session("antigravity", "2026-10-17 09:00", "2026-10-17 09:30", "docs")?;
    project.session("claude_code", "2026-10-18 09:00", "2026-10-18 10:30", "tests")?;

    let stats = LogArchive::new(dir.path().join("logs")).per_agent_recent_activity(7, day("2026-10-18")?)?;
    let claude = stats.get(&AgentId::new("claude_code"));
    assert_eq!(claude.map(|a| (a.total_minutes, a.sessions_count)), Some((150, 2)));
    assert_eq!(claude.map(|a| a.last_activity.as_str()), Some("tests"));
    assert_eq!(stats.len(), 2);
    Ok(())
}

#[test]
fn interleaved_agents_close_their_own_entries() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let logs = dir.path().join("logs");

    // Two checkouts writing to one shared log directory.
    let first = SessionManager::new(SessionStore::new(dir.path().join("a.json")), &logs, "tandem")
        .with_clock(|| at("2026-10-13 09:00").unwrap_or_default());
    first.start(AgentId::new("claude_code"))?;

    let second = SessionManager::new(SessionStore::new(dir.path().join("b.json")), &logs, "tandem")
        .with_clock(|| at("2026-10-13 09:30").unwrap_or_default());
    second.start(AgentId::new("antigravity"))?;

    let first = first.with_clock(|| at("2026-10-13 10:00").unwrap_or_default());
    let ended = first.end(Some("first"), false)?;
    assert!(ended.log_updated);

    let log = DayLog::load(&log_path(&logs, day("2026-10-13")?))?.ok_or(Error::NotFound("log".into()))?;
    let statuses: Vec<bool> = log
        .entries()
        .map(|entry| matches!(entry.status, EntryStatus::InProgress))
        .collect();
    assert_eq!(statuses, vec![false, true]);
    Ok(())
}

#[test]
#[serial]
fn environment_overrides_project_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join(".agent"))?;
    std::fs::write(
        dir.path().join(".agent/tandem.toml"),
        "logs_dir = \"journal\"\n\n[lock]\nmax_wait_secs = 10\n",
    )?;

    std::env::set_var("TANDEM_OWNERSHIP_POLICY", "strict");
    std::env::set_var("TANDEM_LOCK_MAX_WAIT_SECS", "5");
    let config = load_config_from(dir.path());
    std::env::remove_var("TANDEM_OWNERSHIP_POLICY");
    std::env::remove_var("TANDEM_LOCK_MAX_WAIT_SECS");

    let config = config?;
    assert_eq!(config.logs_dir, "journal");
    assert_eq!(config.lock.max_wait_secs, 5);
    assert_eq!(config.ownership.policy, OwnershipPolicy::Strict);
    Ok(())
}

#[test]
#[serial]
fn agent_source_names_the_agent() {
    std::env::remove_var("CLAUDE_CODE_SESSION");
    std::env::remove_var("GEMINI_SESSION");
    std::env::set_var("AGENT_SOURCE", "cursor");
    let resolved = AgentId::resolve(None, "antigravity");
    let explicit = AgentId::resolve(Some("claude_code"), "antigravity");
    std::env::remove_var("AGENT_SOURCE");

    assert_eq!(resolved, AgentId::new("cursor"));
    assert_eq!(explicit, AgentId::new("claude_code"));
}
