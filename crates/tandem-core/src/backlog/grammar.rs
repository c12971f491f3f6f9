//! Backlog grammar: epic headers and checkbox task lines.
//!
//! ```text
//! ## Epic 3: Billing [OWNER: claude_code] ⏳
//! - [ ] **Story 3.1:** Invoice export
//! - [x] **3.2:** Refund flow
//! ```
//!
//! The document is kept as its original lines (line endings included), so
//! serializing an unedited `Backlog` reproduces the input byte for byte.

use std::{ops::Range, sync::OnceLock};

use regex::Regex;

use crate::AgentId;

static EPIC_RE: OnceLock<Option<Regex>> = OnceLock::new();
static TASK_RE: OnceLock<Option<Regex>> = OnceLock::new();
static CHECKBOX_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn epic_re() -> Option<&'static Regex> {
    EPIC_RE
        .get_or_init(|| {
            Regex::new(
                r"^##\s+Epic\s+(\d+):\s+(.+?)\s*(?:\[OWNER:\s*(.+?)\])?\s*(?:[✅🔴⏳].*)?$",
            )
            .ok()
        })
        .as_ref()
}

fn task_re() -> Option<&'static Regex> {
    TASK_RE
        .get_or_init(|| {
            Regex::new(r"(?i)^\s*-\s*\[(\s*|x)\]\s*\*\*(?:(story|epic)\s+)?([^:*\s][^:*]*?)\s*:")
                .ok()
        })
        .as_ref()
}

fn checkbox_re() -> Option<&'static Regex> {
    CHECKBOX_RE
        .get_or_init(|| Regex::new(r"(?i)^\s*-\s*\[(\s|x)\]").ok())
        .as_ref()
}

/// `## Epic N: name [OWNER: agent]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicHeader {
    pub line: usize,
    pub number: String,
    pub name: String,
    pub owner: Option<AgentId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Story,
    Epic,
}

/// A checkbox line carrying a bold `**id:**` label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLine {
    pub line: usize,
    pub checked: bool,
    pub kind: Option<TaskKind>,
    pub id: String,
    /// Byte range of the checkbox interior within the line
    mark: Range<usize>,
}

impl TaskLine {
    /// Whether this line is the task `task_id` refers to.
    pub fn matches(&self, task_id: &str) -> bool {
        self.id.to_lowercase() == normalize_task_id(task_id)
    }
}

/// Per-epic completion counts
#[derive(Debug, Clone, PartialEq)]
pub struct EpicProgress {
    pub number: String,
    pub name: String,
    pub owner: Option<AgentId>,
    pub done: usize,
    pub total: usize,
}

impl EpicProgress {
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64 * 100.0
        }
    }
}

/// Parsed backlog document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backlog {
    lines: Vec<String>,
}

impl Backlog {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    /// Serialize back to text.
    pub fn render(&self) -> String {
        self.lines.concat()
    }

    fn content_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(index, line)| (index, line.trim_end_matches(['\n', '\r'])))
    }

    pub fn epics(&self) -> Vec<EpicHeader> {
        let Some(re) = epic_re() else {
            return Vec::new();
        };
        self.content_lines()
            .filter_map(|(index, line)| {
                re.captures(line).map(|caps| EpicHeader {
                    line: index,
                    number: caps[1].to_string(),
                    name: caps[2].trim().to_string(),
                    owner: caps
                        .get(3)
                        .map(|owner| owner.as_str().trim())
                        .filter(|owner| !owner.is_empty())
                        .map(AgentId::new),
                })
            })
            .collect()
    }

    /// The header of epic `number`, if present.
    pub fn epic(&self, number: &str) -> Option<EpicHeader> {
        self.epics().into_iter().find(|epic| epic.number == number)
    }

    pub fn tasks(&self) -> Vec<TaskLine> {
        let Some(re) = task_re() else {
            return Vec::new();
        };
        self.content_lines()
            .filter_map(|(index, line)| {
                let caps = re.captures(line)?;
                let mark = caps.get(1)?;
                let kind = caps.get(2).map(|kind| {
                    if kind.as_str().eq_ignore_ascii_case("epic") {
                        TaskKind::Epic
                    } else {
                        TaskKind::Story
                    }
                });
                Some(TaskLine {
                    line: index,
                    checked: mark.as_str().eq_ignore_ascii_case("x"),
                    kind,
                    id: caps[3].trim().to_string(),
                    mark: mark.range(),
                })
            })
            .collect()
    }

    /// The pending task `task_id` refers to.
    ///
    /// Labels with a `Story`/`Epic` prefix are preferred over bare ids.
    pub fn find_pending(&self, task_id: &str) -> Option<TaskLine> {
        let candidates: Vec<TaskLine> = self
            .tasks()
            .into_iter()
            .filter(|task| !task.checked && task.matches(task_id))
            .collect();

        let prefixed = candidates.iter().find(|task| task.kind.is_some()).cloned();
        if candidates.len() > 1 {
            tracing::warn!(task_id, matches = candidates.len(), "task id is not unique");
        }
        prefixed.or_else(|| candidates.into_iter().next())
    }

    /// Flip `task` to complete. Returns `false` if it already was.
    pub fn complete(&mut self, task: &TaskLine) -> bool {
        if task.checked {
            return false;
        }
        match self.lines.get_mut(task.line) {
            Some(line) if line.get(task.mark.clone()).is_some() => {
                line.replace_range(task.mark.clone(), "x");
                true
            }
            _ => false,
        }
    }

    /// Completion counts per epic section, skipping epics with no tasks.
    pub fn progress(&self) -> Vec<EpicProgress> {
        let epics = self.epics();
        let Some(checkbox) = checkbox_re() else {
            return Vec::new();
        };

        epics
            .iter()
            .enumerate()
            .filter_map(|(index, epic)| {
                let end = epics.get(index + 1).map_or(self.lines.len(), |next| next.line);
                let (done, total) = self
                    .content_lines()
                    .skip(epic.line + 1)
                    .take(end.saturating_sub(epic.line + 1))
                    .filter_map(|(_, line)| checkbox.captures(line))
                    .fold((0, 0), |(done, total), caps| {
                        let checked = caps[1].eq_ignore_ascii_case("x");
                        (done + usize::from(checked), total + 1)
                    });
                (total > 0).then(|| EpicProgress {
                    number: epic.number.clone(),
                    name: epic.name.clone(),
                    owner: epic.owner.clone(),
                    done,
                    total,
                })
            })
            .collect()
    }
}

/// Lowercase `task_id` with any `story`/`epic` words removed.
pub fn normalize_task_id(task_id: &str) -> String {
    task_id
        .to_lowercase()
        .replace("story", "")
        .replace("epic", "")
        .trim()
        .to_string()
}

/// Leading numeric component of a task id: `"Story 3.1"` → `"3"`.
pub fn epic_number(task_id: &str) -> Option<String> {
    let digits: String = normalize_task_id(task_id)
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    (!digits.is_empty()).then_some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKLOG: &str = "# Backlog\n\
\n\
## Epic 1: Foundations [OWNER: antigravity] ✅\n\
- [x] **Story 1.1:** Repo layout\n\
- [x] **Story 1.2:** CI\n\
\n\
## Epic 2: Billing\n\
- [ ] **Story 2.1:** Invoices\n\
  - [ ] subtask without id\n\
- [ ] **2.2:** Refunds\n\
\n\
## Epic 3: Reports [OWNER: claude_code]\n\
- [ ] **Story 3.1:** Weekly summary\n";

    #[test]
    fn test_epic_headers_with_optional_owner() {
        let epics = Backlog::parse(BACKLOG).epics();
        assert_eq!(epics.len(), 3);
        assert_eq!(epics[0].name, "Foundations");
        assert_eq!(epics[0].owner, Some(AgentId::new("antigravity")));
        assert_eq!(epics[1].name, "Billing");
        assert_eq!(epics[1].owner, None);
        assert_eq!(epics[2].owner, Some(AgentId::new("claude_code")));
    }

    #[test]
    fn test_task_lines() {
        let tasks = Backlog::parse(BACKLOG).tasks();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1.1", "1.2", "2.1", "2.2", "3.1"]);
        assert!(tasks[0].checked);
        assert_eq!(tasks[2].kind, Some(TaskKind::Story));
        assert_eq!(tasks[3].kind, None);
    }

    #[test]
    fn test_render_is_identity() {
        let text = "line one\r\nline two\n\nno trailing newline";
        assert_eq!(Backlog::parse(text).render(), text);
    }

    #[test]
    fn test_find_pending_accepts_prefixes() {
        let backlog = Backlog::parse(BACKLOG);
        assert_eq!(backlog.find_pending("2.1").map(|t| t.line), Some(7));
        assert_eq!(backlog.find_pending("Story 2.1").map(|t| t.line), Some(7));
        assert_eq!(backlog.find_pending("story 2.2").map(|t| t.line), Some(9));
        assert!(backlog.find_pending("1.1").is_none());
        assert!(backlog.find_pending("9.9").is_none());
    }

    #[test]
    fn test_complete_touches_only_the_mark() {
        let mut backlog = Backlog::parse(BACKLOG);
        let task = backlog.find_pending("3.1");
        assert!(task.as_ref().is_some_and(|t| backlog.complete(t)));
        let expected = BACKLOG.replace(
            "- [ ] **Story 3.1:** Weekly summary",
            "- [x] **Story 3.1:** Weekly summary",
        );
        assert_eq!(backlog.render(), expected);
    }

    #[test]
    fn test_progress_counts_subtasks() {
        let progress = Backlog::parse(BACKLOG).progress();
        assert_eq!(progress.len(), 3);
        assert_eq!((progress[0].done, progress[0].total), (2, 2));
        assert_eq!((progress[1].done, progress[1].total), (0, 3));
        assert!((progress[0].percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_epic_number() {
        assert_eq!(epic_number("3.1"), Some("3".to_string()));
        assert_eq!(epic_number("Story 12.4"), Some("12".to_string()));
        assert_eq!(epic_number("EPIC 2"), Some("2".to_string()));
        assert_eq!(epic_number("misc"), None);
    }
}
