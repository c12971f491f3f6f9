//! Weekly and monthly activity reports.
//!
//! The metrics section is text mining over free-form activity lines. It is
//! best-effort and lossy: wording that does not match the patterns below is
//! simply not counted.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use regex::Regex;
use strum::{Display, EnumString};

use super::session::LoggedSession;
use crate::daylog::format_duration;

static PROGRESS_RE: OnceLock<Option<Regex>> = OnceLock::new();
static EPIC_DONE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static MENTION_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn progress_re() -> Option<&'static Regex> {
    PROGRESS_RE
        .get_or_init(|| Regex::new(r"(?i)Progress.*?:.*?(\d+%)").ok())
        .as_ref()
}

fn epic_done_re() -> Option<&'static Regex> {
    EPIC_DONE_RE
        .get_or_init(|| Regex::new(r"(?i)Epic\s+\d+.*?(?:DONE|Completed|Marked as DONE)").ok())
        .as_ref()
}

fn mention_re() -> Option<&'static Regex> {
    MENTION_RE
        .get_or_init(|| Regex::new(r"(?i)Epic\s*\d+|Story\s*\d+\.\d+").ok())
        .as_ref()
}

/// Reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    Weekly,
    Monthly,
}

impl ReportPeriod {
    /// Monday of the current week, or the first of the month, through `today`.
    pub fn range(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = match self {
            Self::Weekly => today
                .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
                .unwrap_or(NaiveDate::MIN),
            Self::Monthly => today.with_day(1).unwrap_or(today),
        };
        (start, today)
    }

    /// `<logs_root>/report-<period>-<today>.md`
    pub fn report_path(self, logs_root: &Path, today: NaiveDate) -> PathBuf {
        logs_root.join(format!("report-{self}-{}.md", today.format("%Y-%m-%d")))
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Weekly => "Weekly Activity Report",
            Self::Monthly => "Monthly Activity Report",
        }
    }
}

/// Heuristic signals mined from activity lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metrics {
    /// Activity lines announcing an epic as done, markdown stripped
    pub epics_done: BTreeSet<String>,
    /// Last `Progress…: N%` seen, in session order
    pub latest_progress: Option<String>,
    /// `Epic N` / `Story N.N` mentions as written
    pub mentions: BTreeSet<String>,
}

impl Metrics {
    pub fn extract(sessions: &[LoggedSession]) -> Self {
        let mut metrics = Self::default();

        for activity in sessions.iter().flat_map(|session| &session.activities) {
            if epic_done_re().is_some_and(|re| re.is_match(activity)) {
                let cleaned: String = activity.chars().filter(|c| !matches!(c, '*' | '-')).collect();
                metrics.epics_done.insert(cleaned.trim().to_string());
            }
            if let Some(caps) = progress_re().and_then(|re| re.captures(activity)) {
                metrics.latest_progress = Some(caps[1].to_string());
            }
            if let Some(re) = mention_re() {
                metrics
                    .mentions
                    .extend(re.find_iter(activity).map(|m| m.as_str().to_string()));
            }
        }
        metrics
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectTotals {
    pub sessions: usize,
    pub minutes: u32,
}

/// Aggregated view over a set of sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub period: ReportPeriod,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_minutes: u32,
    pub per_day: BTreeMap<NaiveDate, u32>,
    pub per_project: BTreeMap<String, ProjectTotals>,
    pub metrics: Metrics,
    pub session_count: usize,
    pub generated_at: NaiveDateTime,
}

impl Report {
    pub fn build(
        period: ReportPeriod,
        sessions: &[LoggedSession],
        (start, end): (NaiveDate, NaiveDate),
        generated_at: NaiveDateTime,
    ) -> Self {
        let per_day: BTreeMap<NaiveDate, u32> = sessions
            .iter()
            .map(|session| (session.date, session.duration_minutes))
            .into_grouping_map()
            .sum()
            .into_iter()
            .collect();

        let per_project = sessions.iter().fold(
            BTreeMap::new(),
            |mut acc: BTreeMap<String, ProjectTotals>, session| {
                let totals = acc.entry(session.project.clone()).or_default();
                totals.sessions += 1;
                totals.minutes += session.duration_minutes;
                acc
            },
        );

        Self {
            period,
            start,
            end,
            total_minutes: sessions.iter().map(|session| session.duration_minutes).sum(),
            per_day,
            per_project,
            metrics: Metrics::extract(sessions),
            session_count: sessions.len(),
            generated_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.session_count == 0
    }

    /// Markdown rendering.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return format!(
                "No sessions found between {} and {}.\n",
                self.start.format("%d/%m/%Y"),
                self.end.format("%d/%m/%Y")
            );
        }

        let mut lines = vec![
            format!("# {}", self.period.title()),
            String::new(),
            format!(
                "**Period:** {} to {}",
                self.start.format("%d/%m/%Y"),
                self.end.format("%d/%m/%Y")
            ),
            String::new(),
            "## Overview".to_string(),
            format!("- **Total time worked:** {}", format_duration(self.total_minutes)),
            format!("- **Sessions:** {}", self.session_count),
            format!(
                "- **Project progress:** {}",
                self.metrics.latest_progress.as_deref().unwrap_or("N/A")
            ),
            String::new(),
            "## Days Worked".to_string(),
        ];

        lines.extend(self.per_day.iter().map(|(date, minutes)| {
            format!(
                "- **{} ({}):** {}",
                date.format("%Y-%m-%d"),
                date.format("%A"),
                format_duration(*minutes)
            )
        }));

        lines.push(String::new());
        lines.push("## Projects".to_string());
        for (project, totals) in &self.per_project {
            lines.push(format!("- **{project}**"));
            lines.push(format!("  - Sessions: {}", totals.sessions));
            lines.push(format!("  - Total time: {}", format_duration(totals.minutes)));
        }

        lines.push(String::new());
        lines.push("## Deliverables".to_string());

        if !self.metrics.mentions.is_empty() {
            let (epics, stories): (Vec<&str>, Vec<&str>) = self
                .metrics
                .mentions
                .iter()
                .map(String::as_str)
                .partition(|mention| mention.to_lowercase().starts_with("epic"));
            lines.push("### Items Worked On (detected)".to_string());
            lines.push("The following items were mentioned in the logs:".to_string());
            if !epics.is_empty() {
                lines.push(format!("- **Epics:** {}", epics.iter().join(", ")));
            }
            if !stories.is_empty() {
                lines.push(format!("- **Stories:** {}", stories.iter().join(", ")));
            }
            lines.push(String::new());
        }

        lines.push("### Epics Completed".to_string());
        if self.metrics.epics_done.is_empty() {
            lines.push("- No epic explicitly marked as done in this period.".to_string());
        } else {
            lines.extend(self.metrics.epics_done.iter().map(|epic| format!("- {epic}")));
        }

        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(format!(
            "*Generated {}*",
            self.generated_at.format("%Y-%m-%d %H:%M")
        ));

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}
