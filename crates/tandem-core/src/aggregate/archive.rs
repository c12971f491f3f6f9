//! Read-only access to the year-partitioned day-log archive.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};

use chrono::{Days, NaiveDate};
use walkdir::WalkDir;

use super::session::{sessions_from_log, AgentActivity, LoggedSession};
use crate::{
    daylog::{log_path, DayLog},
    AgentId, Error, Result,
};

#[derive(Debug, Clone)]
pub struct LogArchive {
    root: PathBuf,
}

impl LogArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Day files whose name date lies in `start..=end`, in date order.
    fn day_files(&self, start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, PathBuf)> {
        let mut files: Vec<(NaiveDate, PathBuf)> = WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "md"))
            .filter_map(|entry| {
                let stem = entry.path().file_stem()?.to_str()?;
                let date = NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()?;
                Some((date, entry.into_path()))
            })
            .filter(|(date, _)| (start..=end).contains(date))
            .collect();
        files.sort();
        files
    }

    /// Completed sessions logged between `start` and `end` inclusive, sorted
    /// by date then start time.
    ///
    /// Unreadable files are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `start` is after `end`.
    pub fn sessions_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<LoggedSession>> {
        if start > end {
            return Err(Error::InvalidInput(format!(
                "range start {start} is after end {end}"
            )));
        }

        let mut sessions: Vec<LoggedSession> = self
            .day_files(start, end)
            .into_iter()
            .filter_map(|(date, path)| match std::fs::read_to_string(&path) {
                Ok(text) => Some(sessions_from_log(&DayLog::parse(&text), date)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "skipping unreadable day log: {e}");
                    None
                }
            })
            .flatten()
            .collect();

        sessions.sort_by(|a, b| (a.date, a.start).cmp(&(b.date, b.start)));
        tracing::debug!(%start, %end, count = sessions.len(), "sessions loaded");
        Ok(sessions)
    }

    /// Per-agent activity over the `days_back` days up to `today`.
    ///
    /// A window reaching past the earliest representable date starts there.
    ///
    /// # Errors
    ///
    /// Propagates [`LogArchive::sessions_in_range`] failures.
    pub fn per_agent_recent_activity(
        &self,
        days_back: u32,
        today: NaiveDate,
    ) -> Result<BTreeMap<AgentId, AgentActivity>> {
        let start = today
            .checked_sub_days(Days::new(u64::from(days_back)))
            .unwrap_or(NaiveDate::MIN);
        let sessions = self.sessions_in_range(start, today)?;

        let mut stats: BTreeMap<AgentId, AgentActivity> = BTreeMap::new();
        for session in sessions {
            match stats.get_mut(&session.agent) {
                Some(activity) => activity.record(session),
                None => {
                    stats.insert(session.agent.clone(), AgentActivity::first(session));
                }
            }
        }
        Ok(stats)
    }

    /// Raw text of the log for `date`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if there is no log for that day.
    pub fn day_log_text(&self, date: NaiveDate) -> Result<String> {
        let path = log_path(&self.root, date);
        std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::NotFound(format!("day log {}", path.display()))
            } else {
                Error::io_at(&path, &e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::NO_ACTIVITY_RECORDED;

    fn date(text: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| Error::Parse(e.to_string()))
    }

    fn write_log(root: &Path, day: &str, body: &str) -> Result<()> {
        let path = log_path(root, date(day)?);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, format!("# DAILY LOG — {day}\n\n- **Project:** tandem\n\n## Sessions\n\n{body}"))?;
        Ok(())
    }

    #[test]
    fn test_range_is_inclusive_and_sorted() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_log(dir.path(), "2026-10-12", "1. 09:00 — 10:00 (01:00) [antigravity]\n")?;
        write_log(dir.path(), "2026-10-18", "1. 14:00 — 14:30 (00:30) [claude_code]\n2. 08:00 — 09:00 (01:00) [claude_code]\n")?;
        write_log(dir.path(), "2026-10-19", "1. 09:00 — 10:00 (01:00) [antigravity]\n")?;
        std::fs::write(dir.path().join("report-weekly-2026-10-18.md"), "ignored")?;

        let archive = LogArchive::new(dir.path());
        let sessions = archive.sessions_in_range(date("2026-10-12")?, date("2026-10-18")?)?;

        let keys: Vec<(String, String)> = sessions
            .iter()
            .map(|s| (s.date.to_string(), s.start.format("%H:%M").to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2026-10-12".to_string(), "09:00".to_string()),
                ("2026-10-18".to_string(), "08:00".to_string()),
                ("2026-10-18".to_string(), "14:00".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_spans_year_directories() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_log(dir.path(), "2025-12-31", "1. 09:00 — 10:00 (01:00)\n")?;
        write_log(dir.path(), "2026-01-01", "1. 09:00 — 10:00 (01:00)\n")?;

        let archive = LogArchive::new(dir.path());
        let sessions = archive.sessions_in_range(date("2025-12-30")?, date("2026-01-02")?)?;
        assert_eq!(sessions.len(), 2);
        Ok(())
    }

    #[test]
    fn test_missing_root_is_empty() -> Result<()> {
        let archive = LogArchive::new("/nonexistent/tandem-logs");
        assert!(archive.sessions_in_range(date("2026-01-01")?, date("2026-12-31")?)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_reversed_range_is_rejected() -> Result<()> {
        let archive = LogArchive::new("logs");
        let result = archive.sessions_in_range(date("2026-02-01")?, date("2026-01-01")?);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        Ok(())
    }

    #[test]
    fn test_per_agent_totals() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_log(
            dir.path(),
            "2026-10-17",
            "1. 09:00 — 10:00 (01:00) [claude_code]\n   - Activities:\n     - Story 3.1 started\n",
        )?;
        write_log(
            dir.path(),
            "2026-10-18",
            "1. 09:00 — 10:30 (01:30) [claude_code]\n   - Activities:\n     - Story 3.1 done\n2. 11:00 — 11:15 (00:15) [antigravity]\n",
        )?;

        let archive = LogArchive::new(dir.path());
        let stats = archive.per_agent_recent_activity(7, date("2026-10-18")?)?;

        let claude = stats.get(&AgentId::new("claude_code"));
        assert_eq!(claude.map(|a| (a.total_minutes, a.sessions_count)), Some((150, 2)));
        assert_eq!(claude.map(|a| a.last_activity.as_str()), Some("Story 3.1 done"));

        let gravity = stats.get(&AgentId::new("antigravity"));
        assert_eq!(
            gravity.map(|a| a.last_activity.as_str()),
            Some(NO_ACTIVITY_RECORDED)
        );
        Ok(())
    }

    #[test]
    fn test_huge_window_is_clamped() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_log(dir.path(), "2026-10-18", "1. 09:00 — 10:00 (01:00) [claude_code]\n")?;

        let archive = LogArchive::new(dir.path());
        let stats = archive.per_agent_recent_activity(u32::MAX, date("2026-10-18")?)?;
        assert_eq!(
            stats.get(&AgentId::new("claude_code")).map(|a| a.total_minutes),
            Some(60)
        );
        Ok(())
    }

    #[test]
    fn test_day_log_text_missing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let archive = LogArchive::new(dir.path());
        assert!(matches!(
            archive.day_log_text(date("2026-10-18")?),
            Err(Error::NotFound(_))
        ));
        Ok(())
    }
}
