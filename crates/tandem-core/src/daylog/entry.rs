//! Numbered session entries inside a day log.
//!
//! ```text
//! 1. 09:00 — 11:30 (02:30) [antigravity]
//!    - Activities:
//!      - Reviewed epic 3
//! 2. 14:00 — *(in progress)* [claude_code]
//!    - Activities:
//!      - *(session active)*
//! ```

use std::sync::OnceLock;

use chrono::NaiveTime;
use regex::Regex;

use super::duration::{format_clock, format_duration, parse_clock, parse_duration};
use crate::AgentId;

pub(super) const ACTIVE_MARKER: &str = "*(session active)*";
pub(super) const ACTIVITIES_LABEL: &str = "Activities:";
/// Activity written when a session ends without any.
pub const NO_ACTIVITY: &str = "No specific activity recorded";

static COMPLETED_RE: OnceLock<Option<Regex>> = OnceLock::new();
static IN_PROGRESS_RE: OnceLock<Option<Regex>> = OnceLock::new();
static NUMBERED_RE: OnceLock<Option<Regex>> = OnceLock::new();
static BULLET_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn completed_re() -> Option<&'static Regex> {
    COMPLETED_RE
        .get_or_init(|| {
            Regex::new(
                r"^(\d+)\.\s+(\d{1,2}:\d{2})\s*[—–-]\s*(\d{1,2}:\d{2})\s*\((\d{1,2}:\d{2})\)\s*(?:\[([^\]]*)\])?",
            )
            .ok()
        })
        .as_ref()
}

fn in_progress_re() -> Option<&'static Regex> {
    IN_PROGRESS_RE
        .get_or_init(|| {
            Regex::new(
                r"(?i)^(\d+)\.\s+(\d{1,2}:\d{2})\s*[—–-]\s*\*\(in progress\)\*\s*(?:\[([^\]]*)\])?",
            )
            .ok()
        })
        .as_ref()
}

fn numbered_re() -> Option<&'static Regex> {
    NUMBERED_RE
        .get_or_init(|| Regex::new(r"^(\d+)\.\s+\d{1,2}:\d{2}").ok())
        .as_ref()
}

fn bullet_re() -> Option<&'static Regex> {
    BULLET_RE
        .get_or_init(|| Regex::new(r"^\s+-\s+(.+?)\s*$").ok())
        .as_ref()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    InProgress,
    Completed { end: NaiveTime, duration_minutes: u32 },
}

/// One numbered session entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub number: u32,
    pub start: NaiveTime,
    pub status: EntryStatus,
    pub agent: Option<AgentId>,
    pub activities: Vec<String>,
    /// Lines as read, line endings included; `None` once edited
    raw: Option<Vec<String>>,
}

impl Entry {
    pub fn in_progress(number: u32, start: NaiveTime, agent: AgentId) -> Self {
        Self {
            number,
            start,
            status: EntryStatus::InProgress,
            agent: Some(agent),
            activities: Vec::new(),
            raw: None,
        }
    }

    pub const fn is_in_progress(&self) -> bool {
        matches!(self.status, EntryStatus::InProgress)
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        match self.status {
            EntryStatus::Completed {
                duration_minutes, ..
            } => Some(duration_minutes),
            EntryStatus::InProgress => None,
        }
    }

    /// Turn an in-progress entry into a completed one.
    ///
    /// Each activity is kept to a single line; blank ones are dropped.
    pub fn complete(&mut self, end: NaiveTime, duration_minutes: u32, activities: Vec<String>) {
        self.status = EntryStatus::Completed {
            end,
            duration_minutes,
        };
        self.activities = activities
            .iter()
            .map(String::as_str)
            .map(single_line)
            .filter(|activity| !activity.is_empty())
            .collect();
        self.raw = None;
    }

    /// Parse an entry header line. Body lines are attached with
    /// [`Entry::push_body_line`].
    pub(super) fn parse_header(line: &str) -> Option<Self> {
        let content = line.trim_end_matches(['\n', '\r']);

        if let Some(caps) = completed_re().and_then(|re| re.captures(content)) {
            return Some(Self {
                number: caps[1].parse().ok()?,
                start: parse_clock(&caps[2])?,
                status: EntryStatus::Completed {
                    end: parse_clock(&caps[3])?,
                    duration_minutes: parse_duration(&caps[4])?,
                },
                agent: caps.get(5).and_then(|tag| agent_from_tag(tag.as_str())),
                activities: Vec::new(),
                raw: Some(vec![line.to_string()]),
            });
        }

        let caps = in_progress_re()?.captures(content)?;
        Some(Self {
            number: caps[1].parse().ok()?,
            start: parse_clock(&caps[2])?,
            status: EntryStatus::InProgress,
            agent: caps.get(3).and_then(|tag| agent_from_tag(tag.as_str())),
            activities: Vec::new(),
            raw: Some(vec![line.to_string()]),
        })
    }

    pub(super) fn ensure_trailing_newline(&mut self) {
        if let Some(last) = self.raw.as_mut().and_then(|raw| raw.last_mut()) {
            if !last.ends_with('\n') {
                last.push('\n');
            }
        }
    }

    pub(super) fn push_body_line(&mut self, line: &str) {
        let content = line.trim_end_matches(['\n', '\r']);
        if let Some(item) = bullet_re()
            .and_then(|re| re.captures(content))
            .map(|caps| caps[1].to_string())
            .filter(|item| !is_placeholder(item))
        {
            self.activities.push(item);
        }
        if let Some(raw) = self.raw.as_mut() {
            raw.push(line.to_string());
        }
    }

    /// Serialized lines; untouched entries come back exactly as read.
    pub(super) fn render(&self) -> String {
        if let Some(raw) = &self.raw {
            return raw.concat();
        }

        let tag = self
            .agent
            .as_ref()
            .map(|agent| format!(" [{agent}]"))
            .unwrap_or_default();
        let start = format_clock(self.start);

        let mut out = match self.status {
            EntryStatus::InProgress => {
                format!("{}. {start} — *(in progress)*{tag}\n", self.number)
            }
            EntryStatus::Completed {
                end,
                duration_minutes,
            } => format!(
                "{}. {start} — {} ({}){tag}\n",
                self.number,
                format_clock(end),
                format_duration(duration_minutes)
            ),
        };

        out.push_str(&format!("   - {ACTIVITIES_LABEL}\n"));
        if self.is_in_progress() {
            out.push_str(&format!("     - {ACTIVE_MARKER}\n"));
        } else {
            for activity in &self.activities {
                out.push_str(&format!("     - {activity}\n"));
            }
        }
        out
    }
}

/// Entry number of any `N. HH:MM` line, recognized or not.
pub(super) fn numbered_line(line: &str) -> Option<u32> {
    numbered_re()?.captures(line)?[1].parse().ok()
}

/// Whether `line` belongs to the body of the entry above it.
pub(super) fn is_body_line(line: &str) -> bool {
    let content = line.trim_end_matches(['\n', '\r']);
    !content.trim().is_empty() && content.starts_with(char::is_whitespace)
}

/// The agent in a tag such as `[antigravity]` or `[🤖 antigravity]`.
fn agent_from_tag(tag: &str) -> Option<AgentId> {
    tag.split_whitespace().last().map(AgentId::new)
}

fn single_line(text: &str) -> String {
    text.replace(char::is_control, " ").trim().to_string()
}

fn is_placeholder(item: &str) -> bool {
    item == ACTIVITIES_LABEL || item == ACTIVE_MARKER || item == NO_ACTIVITY
}
