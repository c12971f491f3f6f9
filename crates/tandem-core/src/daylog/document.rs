//! Day-log document: header, numbered entries and footer.

use std::{
    io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use super::entry::{is_body_line, numbered_line, Entry};
use crate::{AgentId, Error, Result};

static DATE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PROJECT_RE: OnceLock<Option<Regex>> = OnceLock::new();
static FOOTER_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn date_re() -> Option<&'static Regex> {
    DATE_RE
        .get_or_init(|| Regex::new(r"DAILY LOG\s*[—–-]\s*(\d{4}-\d{2}-\d{2})").ok())
        .as_ref()
}

fn project_re() -> Option<&'static Regex> {
    PROJECT_RE
        .get_or_init(|| Regex::new(r"^-\s*(?:\*\*)?Project:(?:\*\*)?\s*(.+?)\s*$").ok())
        .as_ref()
}

fn footer_re() -> Option<&'static Regex> {
    FOOTER_RE
        .get_or_init(|| Regex::new(r"^\*Last updated:.*\*\s*$").ok())
        .as_ref()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Line(String),
    Entry(Entry),
}

impl Block {
    fn text(&self) -> Option<&str> {
        match self {
            Self::Line(line) => Some(line.trim_end_matches(['\n', '\r'])),
            Self::Entry(_) => None,
        }
    }

    fn is_blank(&self) -> bool {
        self.text().is_some_and(|text| text.trim().is_empty())
    }
}

/// A parsed day log. Unedited parts render back exactly as read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DayLog {
    blocks: Vec<Block>,
}

impl DayLog {
    pub fn parse(text: &str) -> Self {
        let mut blocks = Vec::new();
        let mut current: Option<Entry> = None;

        for line in text.split_inclusive('\n') {
            if let Some(entry) = current.as_mut() {
                if is_body_line(line) {
                    entry.push_body_line(line);
                    continue;
                }
            }
            if let Some(done) = current.take() {
                blocks.push(Block::Entry(done));
            }
            match Entry::parse_header(line) {
                Some(entry) => current = Some(entry),
                None => blocks.push(Block::Line(line.to_string())),
            }
        }
        if let Some(done) = current {
            blocks.push(Block::Entry(done));
        }

        Self { blocks }
    }

    /// Header of a fresh log, with an empty sessions section.
    pub fn new(date: NaiveDate, project: &str) -> Self {
        let header = format!(
            "# DAILY LOG — {}\n\n- **Date:** {}\n- **Project:** {project}\n\n---\n\n## Sessions\n\n",
            date.format("%Y-%m-%d"),
            date.format("%d/%m/%Y"),
        );
        Self::parse(&header)
    }

    pub fn render(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Line(line) => line.clone(),
                Block::Entry(entry) => entry.render(),
            })
            .collect()
    }

    /// Date from the `# DAILY LOG — YYYY-MM-DD` header.
    pub fn date(&self) -> Option<NaiveDate> {
        let re = date_re()?;
        self.blocks
            .iter()
            .filter_map(Block::text)
            .find_map(|line| re.captures(line))
            .and_then(|caps| NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok())
    }

    /// Project from the `- **Project:**` line.
    pub fn project(&self) -> Option<String> {
        let re = project_re()?;
        self.blocks
            .iter()
            .filter_map(Block::text)
            .find_map(|line| re.captures(line))
            .map(|caps| caps[1].to_string())
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Entry(entry) => Some(entry),
            Block::Line(_) => None,
        })
    }

    /// One past the highest `N. HH:MM` number in the log.
    pub fn next_number(&self) -> u32 {
        let from_entries = self.entries().map(|entry| entry.number);
        let from_lines = self
            .blocks
            .iter()
            .filter_map(Block::text)
            .filter_map(numbered_line);
        from_entries.chain(from_lines).max().unwrap_or(0) + 1
    }

    /// Append an in-progress entry for `agent` and return its number.
    ///
    /// Any footer is removed; call [`DayLog::touch_footer`] afterwards.
    pub fn start_session(&mut self, start: NaiveTime, agent: AgentId) -> u32 {
        let number = self.next_number();
        self.remove_footer();
        while self.blocks.last().is_some_and(Block::is_blank) {
            self.blocks.pop();
        }
        self.ensure_trailing_newline();
        if !self.blocks.is_empty() {
            self.blocks.push(Block::Line("\n".to_string()));
        }
        self.blocks
            .push(Block::Entry(Entry::in_progress(number, start, agent)));
        number
    }

    /// Rewrite the in-progress entry started at `start` by `agent` as
    /// completed.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseMismatch` when no such entry exists.
    pub fn complete_session(
        &mut self,
        start: NaiveTime,
        agent: &AgentId,
        end: NaiveTime,
        duration_minutes: u32,
        activities: Vec<String>,
    ) -> Result<u32> {
        let entry = self
            .blocks
            .iter_mut()
            .rev()
            .find_map(|block| match block {
                Block::Entry(entry)
                    if entry.is_in_progress()
                        && entry.start == start
                        && entry.agent.as_ref() == Some(agent) =>
                {
                    Some(entry)
                }
                _ => None,
            })
            .ok_or_else(|| {
                Error::ParseMismatch(format!(
                    "in-progress entry started at {} by {agent}",
                    start.format("%H:%M")
                ))
            })?;

        entry.complete(end, duration_minutes, activities);
        Ok(entry.number)
    }

    /// Set the `*Last updated: …*` footer to `now`, appending it if absent.
    pub fn touch_footer(&mut self, now: NaiveDateTime) {
        let stamp = format!("*Last updated: {}*", now.format("%Y-%m-%d %H:%M"));
        let existing = footer_re().and_then(|re| {
            self.blocks
                .iter()
                .rposition(|block| block.text().is_some_and(|text| re.is_match(text)))
        });

        if let Some(index) = existing {
            if let Some(Block::Line(line)) = self.blocks.get_mut(index) {
                let ending = line[line.trim_end_matches(['\n', '\r']).len()..].to_string();
                *line = format!("{stamp}{ending}");
            }
            return;
        }

        self.ensure_trailing_newline();
        self.blocks.push(Block::Line("\n".to_string()));
        self.blocks.push(Block::Line("---\n".to_string()));
        self.blocks.push(Block::Line(format!("{stamp}\n")));
    }

    fn remove_footer(&mut self) {
        let Some(re) = footer_re() else {
            return;
        };
        let Some(index) = self
            .blocks
            .iter()
            .rposition(|block| block.text().is_some_and(|text| re.is_match(text)))
        else {
            return;
        };
        self.blocks.remove(index);
        if index > 0 && self.blocks.get(index - 1).and_then(Block::text) == Some("---") {
            self.blocks.remove(index - 1);
        }
    }

    fn ensure_trailing_newline(&mut self) {
        match self.blocks.last_mut() {
            Some(Block::Line(line)) if !line.ends_with('\n') => line.push('\n'),
            Some(Block::Entry(entry)) => entry.ensure_trailing_newline(),
            _ => {}
        }
    }

    /// Read the log at `path`; `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` for any other read failure.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(Self::parse(&text))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io_at(path, &e)),
        }
    }

    /// Write the log to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io_at(parent, &e))?;
        }
        std::fs::write(path, self.render()).map_err(|e| Error::io_at(path, &e))
    }
}

/// `<logs_root>/<YYYY>/<YYYY-MM-DD>.md`
pub fn log_path(logs_root: &Path, date: NaiveDate) -> PathBuf {
    logs_root
        .join(date.format("%Y").to_string())
        .join(format!("{}.md", date.format("%Y-%m-%d")))
}
