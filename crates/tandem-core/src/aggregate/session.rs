//! Completed sessions as read back from day logs.

use chrono::{NaiveDate, NaiveTime};

use crate::{
    agent::DEFAULT_AGENT,
    daylog::{DayLog, EntryStatus},
    AgentId,
};

/// Shown for agents whose latest session lists no activities.
pub const NO_ACTIVITY_RECORDED: &str = "No activity recorded";

/// Project name used when a log has no `Project:` line.
pub const UNKNOWN_PROJECT: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedSession {
    pub date: NaiveDate,
    pub project: String,
    pub number: u32,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub duration_minutes: u32,
    pub activities: Vec<String>,
    pub agent: AgentId,
}

/// Completed entries of `log`. `file_date` stands in when the header has
/// no date.
pub fn sessions_from_log(log: &DayLog, file_date: NaiveDate) -> Vec<LoggedSession> {
    let date = log.date().unwrap_or(file_date);
    let project = log.project().unwrap_or_else(|| UNKNOWN_PROJECT.to_string());

    log.entries()
        .filter_map(|entry| match entry.status {
            EntryStatus::Completed {
                end,
                duration_minutes,
            } => Some(LoggedSession {
                date,
                project: project.clone(),
                number: entry.number,
                start: entry.start,
                end,
                duration_minutes,
                activities: entry.activities.clone(),
                agent: entry
                    .agent
                    .clone()
                    .unwrap_or_else(|| AgentId::new(DEFAULT_AGENT)),
            }),
            EntryStatus::InProgress => None,
        })
        .collect()
}

/// One agent's recent work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentActivity {
    pub last_session: LoggedSession,
    pub last_activity: String,
    pub total_minutes: u32,
    pub sessions_count: usize,
}

impl AgentActivity {
    pub(super) fn first(session: LoggedSession) -> Self {
        Self {
            last_activity: last_activity_of(&session),
            total_minutes: session.duration_minutes,
            sessions_count: 1,
            last_session: session,
        }
    }

    /// Fold another session in; the latest by (date, start) becomes the
    /// last session.
    pub(super) fn record(&mut self, session: LoggedSession) {
        self.total_minutes += session.duration_minutes;
        self.sessions_count += 1;
        if (session.date, session.start) > (self.last_session.date, self.last_session.start) {
            self.last_activity = last_activity_of(&session);
            self.last_session = session;
        }
    }
}

fn last_activity_of(session: &LoggedSession) -> String {
    session
        .activities
        .last()
        .cloned()
        .unwrap_or_else(|| NO_ACTIVITY_RECORDED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_skip_in_progress() -> Result<(), &'static str> {
        let log = DayLog::parse(
            "# DAILY LOG — 2026-10-18\n\
             - **Project:** tandem\n\
             1. 09:00 — 10:00 (01:00) [claude_code]\n\
             \x20  - Activities:\n\
             \x20    - Epic 2 DONE\n\
             2. 14:00 — *(in progress)* [antigravity]\n",
        );
        let fallback = NaiveDate::from_ymd_opt(2000, 1, 1).ok_or("bad date")?;
        let sessions = sessions_from_log(&log, fallback);

        assert_eq!(sessions.len(), 1);
        assert_eq!(Some(sessions[0].date), NaiveDate::from_ymd_opt(2026, 10, 18));
        assert_eq!(sessions[0].project, "tandem");
        assert_eq!(sessions[0].activities, vec!["Epic 2 DONE".to_string()]);
        Ok(())
    }

    #[test]
    fn test_defaults_for_bare_logs() -> Result<(), &'static str> {
        let log = DayLog::parse("1. 09:00 - 09:45 (00:45)\n");
        let file_date = NaiveDate::from_ymd_opt(2026, 3, 4).ok_or("bad date")?;
        let sessions = sessions_from_log(&log, file_date);

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].date, file_date);
        assert_eq!(sessions[0].project, UNKNOWN_PROJECT);
        assert_eq!(sessions[0].agent, AgentId::new(DEFAULT_AGENT));
        assert_eq!(sessions[0].duration_minutes, 45);
        Ok(())
    }
}
