//! Persisted session record.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    daylog::{format_clock, parse_clock},
    AgentId,
};

/// Lifecycle tag stored with the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Ended,
}

/// The one session of a working directory.
///
/// Times are local wall-clock times; `start_time`/`end_time` are the
/// `HH:MM` forms written to the day log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub status: SessionStatus,
    pub date: NaiveDate,
    pub start_time: String,
    pub started_at: NaiveDateTime,
    pub agent: AgentId,
    pub project: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl SessionRecord {
    /// Fresh active record stamped at `now`.
    pub fn start(agent: AgentId, project: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            status: SessionStatus::Active,
            date: now.date(),
            start_time: format_clock(now.time()),
            started_at: now,
            agent,
            project: project.into(),
            activities: Vec::new(),
            end_time: None,
            ended_at: None,
            duration: None,
        }
    }

    pub const fn is_active(&self) -> bool {
        matches!(self.status, SessionStatus::Active)
    }

    /// Start time truncated to the minute, as logged.
    pub fn start_clock(&self) -> chrono::NaiveTime {
        parse_clock(&self.start_time).unwrap_or_else(|| self.started_at.time())
    }
}
