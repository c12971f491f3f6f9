//! `finish-task` and `progress`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tandem_core::{
    backlog::{Backlog, EpicProgress, TaskMutator},
    LockManager,
};

use super::Workspace;

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct FinishOptions {
    pub task_id: String,
    pub force: bool,
    pub agent: Option<String>,
    pub backlog: Option<PathBuf>,
}

/// Mark a task complete under the backlog lock.
///
/// # Errors
///
/// Fails when the backlog is missing, the lock stays busy, the epic belongs
/// to another agent, or the task is not pending.
pub async fn finish_task(workspace: &Workspace, options: &FinishOptions) -> Result<()> {
    let path = workspace.backlog_path(options.backlog.as_deref())?;
    let agent = workspace.agent(options.agent.as_deref());
    let locks = LockManager::from_config(&workspace.config, &workspace.root);
    let mutator = TaskMutator::new(
        &locks,
        workspace.config.ownership.policy,
        workspace.config.lock.max_wait(),
    );

    let completion = mutator
        .try_mark_done(&path, &options.task_id, &agent, options.force)
        .await?;

    if let Some(warning) = completion.warning {
        println!("⚠ {warning}");
    }
    println!(
        "✓ Task '{}' marked as complete in {} (line {}).",
        options.task_id,
        path.display(),
        completion.line + 1
    );
    Ok(())
}

/// Print per-epic completion.
///
/// # Errors
///
/// Fails when the backlog cannot be found or read.
pub fn progress(workspace: &Workspace, backlog: Option<&Path>) -> Result<()> {
    let path = workspace.backlog_path(backlog)?;
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read backlog {}", path.display()))?;
    let epics = Backlog::parse(&text).progress();

    println!("Reading: {}", path.display());
    if epics.is_empty() {
        println!("No epics found (expected headings like '## Epic 1: Name').");
        return Ok(());
    }

    let done: usize = epics.iter().map(|epic| epic.done).sum();
    let total: usize = epics.iter().map(|epic| epic.total).sum();
    let percent = overall_percent(done, total);

    println!();
    println!("{} {percent:.1}%", progress_bar(percent));
    println!("Completed: {done}/{total}");
    println!();
    println!("By epic:");
    for epic in &epics {
        println!("  {}", epic_line(epic));
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn overall_percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).floor() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn epic_line(epic: &EpicProgress) -> String {
    let mark = if epic.total > 0 && epic.done == epic.total {
        "✓"
    } else {
        "…"
    };
    let owner = epic
        .owner
        .as_ref()
        .map(|owner| format!(" [{owner}]"))
        .unwrap_or_default();
    format!(
        "{mark} Epic {}: {}{owner}: {:.0}% ({}/{})",
        epic.number,
        epic.name,
        epic.percent(),
        epic.done,
        epic.total
    )
}
