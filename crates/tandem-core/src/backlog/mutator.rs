//! Marking backlog tasks complete.
//!
//! [`complete_task`] is the pure text transformation; [`TaskMutator`] wraps
//! it in the backlog lock and the file read/write.

use std::{path::Path, time::Duration};

use super::{
    grammar::Backlog,
    ownership::{resolve, OwnershipPolicy},
};
use crate::{
    lock::{LockManager, LockStore, BACKLOG_RESOURCE},
    AgentId, Error, Result,
};

/// A successful completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub new_text: String,
    /// Zero-based line index of the flipped checkbox
    pub line: usize,
    /// Ownership warning when a foreign epic was forced
    pub warning: Option<String>,
}

/// Outcome of [`TaskMutator::mark_done`] in reporting form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkDone {
    pub ok: bool,
    pub message: String,
    pub new_text: Option<String>,
}

/// Flip the first pending checkbox matching `task_id`.
///
/// # Errors
///
/// - `Error::OwnershipConflict` if the policy denies `agent`
/// - `Error::NotFound` if no pending line matches
pub fn complete_task(
    content: &str,
    task_id: &str,
    agent: &AgentId,
    force: bool,
    policy: OwnershipPolicy,
) -> Result<Completion> {
    let mut backlog = Backlog::parse(content);
    let warning = policy.enforce(&resolve(&backlog, task_id, agent), force)?;

    let task = backlog
        .find_pending(task_id)
        .ok_or_else(|| Error::NotFound(format!("task '{task_id}' (or it is already complete)")))?;

    if !backlog.complete(&task) {
        return Err(Error::ParseMismatch(format!(
            "checkbox of task '{task_id}' on line {}",
            task.line + 1
        )));
    }

    Ok(Completion {
        new_text: backlog.render(),
        line: task.line,
        warning,
    })
}

/// Lock-protected backlog edits.
#[derive(Debug)]
pub struct TaskMutator<'a, S: LockStore> {
    locks: &'a LockManager<S>,
    policy: OwnershipPolicy,
    max_wait: Duration,
}

impl<'a, S: LockStore> TaskMutator<'a, S> {
    pub const fn new(locks: &'a LockManager<S>, policy: OwnershipPolicy, max_wait: Duration) -> Self {
        Self {
            locks,
            policy,
            max_wait,
        }
    }

    /// Complete `task_id` in the backlog at `path`, holding the backlog lock
    /// for the whole read-modify-write.
    ///
    /// # Errors
    ///
    /// - `Error::Contention` if the lock is not obtained within `max_wait`
    /// - `Error::Io` if the backlog cannot be read or written
    /// - anything [`complete_task`] returns
    pub async fn try_mark_done(
        &self,
        path: &Path,
        task_id: &str,
        agent: &AgentId,
        force: bool,
    ) -> Result<Completion> {
        let Some(guard) = self
            .locks
            .guard(BACKLOG_RESOURCE, agent.as_str(), self.max_wait)
            .await
        else {
            return Err(Error::Contention {
                resource: BACKLOG_RESOURCE.to_string(),
                waited_secs: self.max_wait.as_secs(),
            });
        };

        let content = std::fs::read_to_string(path).map_err(|e| Error::io_at(path, &e))?;
        let completion = complete_task(&content, task_id, agent, force, self.policy)?;
        std::fs::write(path, &completion.new_text).map_err(|e| Error::io_at(path, &e))?;

        tracing::info!(task_id, %agent, line = completion.line + 1, "task marked done");
        guard.release();
        Ok(completion)
    }

    /// [`TaskMutator::try_mark_done`] flattened into `{ok, message, new_text}`.
    pub async fn mark_done(
        &self,
        path: &Path,
        task_id: &str,
        agent: &AgentId,
        force: bool,
    ) -> MarkDone {
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());

        match self.try_mark_done(path, task_id, agent, force).await {
            Ok(completion) => {
                let done = format!("Task '{task_id}' marked as complete in {file_name}.");
                let message = match completion.warning {
                    Some(warning) => format!("{warning}\n{done}"),
                    None => done,
                };
                MarkDone {
                    ok: true,
                    message,
                    new_text: Some(completion.new_text),
                }
            }
            Err(Error::NotFound(_)) => MarkDone {
                ok: false,
                message: format!("Task '{task_id}' not found or already complete."),
                new_text: None,
            },
            Err(e) => MarkDone {
                ok: false,
                message: e.to_string(),
                new_text: None,
            },
        }
    }
}
