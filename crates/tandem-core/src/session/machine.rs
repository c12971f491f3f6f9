//! Session lifecycle: `NoSession → Active → NoSession`.
//!
//! - **Data**: [`SessionRecord`], [`StartOutcome`], [`EndOutcome`]
//! - **Calculations**: activity parsing, duration
//! - **Actions**: state file and day-log writes

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{Local, NaiveDateTime};

use super::{
    record::{SessionRecord, SessionStatus},
    store::SessionStore,
};
use crate::{
    daylog::{elapsed_minutes, format_clock, format_duration, log_path, DayLog, NO_ACTIVITY},
    AgentId, Config, Error, Result,
};

type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

// ═══════════════════════════════════════════════════════════════════════════
// DATA
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    pub record: SessionRecord,
    pub entry_number: u32,
    pub log_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOutcome {
    pub record: SessionRecord,
    pub duration_minutes: u32,
    pub log_updated: bool,
    /// Why the day log was left alone, when it was
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub record: SessionRecord,
    pub elapsed_minutes: u32,
}

// ═══════════════════════════════════════════════════════════════════════════
// CALCULATIONS
// ═══════════════════════════════════════════════════════════════════════════

/// Activities separated by `;` or line breaks, trimmed, blanks dropped.
///
/// Other control characters become spaces so every activity stays on one
/// log line. With nothing given, non-quick ends record a placeholder.
pub fn parse_activities(raw: Option<&str>, quick: bool) -> Vec<String> {
    let given: Vec<String> = raw
        .map(|raw| {
            raw.split([';', '\n', '\r'])
                .map(|item| item.replace(char::is_control, " ").trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if given.is_empty() && !quick {
        vec![NO_ACTIVITY.to_string()]
    } else {
        given
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ACTIONS
// ═══════════════════════════════════════════════════════════════════════════

/// Drives the session record and the day log together.
pub struct SessionManager {
    store: SessionStore,
    logs_root: PathBuf,
    project: String,
    clock: Clock,
}

impl SessionManager {
    pub fn new(store: SessionStore, logs_root: impl Into<PathBuf>, project: impl Into<String>) -> Self {
        Self {
            store,
            logs_root: logs_root.into(),
            project: project.into(),
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Manager for the working directory `root`; the project name is the
    /// directory name.
    pub fn from_config(config: &Config, root: &Path) -> Self {
        let project = root
            .file_name()
            .map_or_else(|| "unknown".to_string(), |name| name.to_string_lossy().into_owned());
        Self::new(
            SessionStore::new(config.session_state_path(root)),
            config.logs_path(root),
            project,
        )
    }

    /// Replace the local wall clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn logs_root(&self) -> &Path {
        &self.logs_root
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    /// Start a session for `agent`.
    ///
    /// # Errors
    ///
    /// - `Error::AlreadyActive` if a session is running
    /// - `Error::Io` if the state file or day log cannot be written; no
    ///   session is left active in that case
    pub fn start(&self, agent: AgentId) -> Result<StartOutcome> {
        if let Some(existing) = self.store.load()?.filter(SessionRecord::is_active) {
            return Err(Error::AlreadyActive {
                start_time: existing.start_time,
                agent: existing.agent.to_string(),
            });
        }

        let now = self.now();
        let record = SessionRecord::start(agent, self.project.clone(), now);
        self.store.save(&record)?;

        let path = log_path(&self.logs_root, record.date);
        let entry_number = match open_log_entry(&path, &record, now) {
            Ok(number) => number,
            Err(e) => {
                if let Err(clear_err) = self.store.clear() {
                    tracing::warn!(agent = %record.agent, "session record not rolled back: {clear_err}");
                }
                return Err(e);
            }
        };

        tracing::info!(
            agent = %record.agent,
            start = %record.start_time,
            entry = entry_number,
            "session started"
        );
        Ok(StartOutcome {
            record,
            entry_number,
            log_path: path,
        })
    }

    /// End the active session.
    ///
    /// A missing log or entry leaves the log untouched and is reported in
    /// [`EndOutcome::warning`]; the record is cleared either way.
    ///
    /// # Errors
    ///
    /// - `Error::NoActiveSession` if nothing is running
    /// - `Error::Io` if the state file cannot be removed
    pub fn end(&self, activities: Option<&str>, quick: bool) -> Result<EndOutcome> {
        let mut record = self
            .store
            .load()?
            .filter(SessionRecord::is_active)
            .ok_or(Error::NoActiveSession)?;

        let now = self.now();
        let minutes = elapsed_minutes(record.started_at, now);
        record.status = SessionStatus::Ended;
        record.end_time = Some(format_clock(now.time()));
        record.ended_at = Some(now);
        record.duration = Some(format_duration(minutes));
        record.activities = parse_activities(activities, quick);

        let logged = self.complete_log_entry(&record, now, minutes);
        self.store.clear()?;

        let (log_updated, warning) = match logged {
            Ok(()) => (true, None),
            Err(e) => {
                tracing::warn!(agent = %record.agent, "day log not updated: {e}");
                (false, Some(e.to_string()))
            }
        };

        tracing::info!(
            agent = %record.agent,
            duration = %format_duration(minutes),
            log_updated,
            "session ended"
        );
        Ok(EndOutcome {
            record,
            duration_minutes: minutes,
            log_updated,
            warning,
        })
    }

    fn complete_log_entry(&self, record: &SessionRecord, now: NaiveDateTime, minutes: u32) -> Result<()> {
        let path = log_path(&self.logs_root, record.date);
        let mut log = DayLog::load(&path)?
            .ok_or_else(|| Error::NotFound(format!("day log {}", path.display())))?;

        log.complete_session(
            record.start_clock(),
            &record.agent,
            now.time(),
            minutes,
            record.activities.clone(),
        )?;
        log.touch_footer(now);
        log.save(&path)
    }

    /// The running session with its elapsed time, if any.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the state file cannot be read.
    pub fn status(&self) -> Result<Option<ActiveSession>> {
        let now = self.now();
        Ok(self
            .store
            .load()?
            .filter(SessionRecord::is_active)
            .map(|record| ActiveSession {
                elapsed_minutes: elapsed_minutes(record.started_at, now),
                record,
            }))
    }
}

fn open_log_entry(path: &Path, record: &SessionRecord, now: NaiveDateTime) -> Result<u32> {
    let mut log = DayLog::load(path)?.unwrap_or_else(|| DayLog::new(record.date, &record.project));
    let entry_number = log.start_session(record.start_clock(), record.agent.clone());
    log.touch_footer(now);
    log.save(path)?;
    Ok(entry_number)
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store)
            .field("logs_root", &self.logs_root)
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}
