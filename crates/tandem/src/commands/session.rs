//! `start`, `end` and `status`

use anyhow::Result;
use tandem_core::{daylog::format_duration, session::SessionManager};

use super::Workspace;

#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    pub agent: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EndOptions {
    pub activities: Option<String>,
    pub quick: bool,
}

fn manager(workspace: &Workspace) -> SessionManager {
    SessionManager::from_config(&workspace.config, &workspace.root)
}

/// Start a session for the resolved agent.
///
/// # Errors
///
/// Fails with `AlreadyActive` when a session is running, or on IO faults.
pub fn start(workspace: &Workspace, options: &StartOptions) -> Result<()> {
    let agent = workspace.agent(options.agent.as_deref());
    let outcome = manager(workspace).start(agent)?;

    println!("✓ Session started at {}", outcome.record.start_time);
    println!("  Agent:   {}", outcome.record.agent);
    println!("  Project: {}", outcome.record.project);
    println!("  Log:     {} (entry {})", outcome.log_path.display(), outcome.entry_number);
    Ok(())
}

/// End the active session.
///
/// # Errors
///
/// Fails with `NoActiveSession` when nothing is running.
pub fn end(workspace: &Workspace, options: &EndOptions) -> Result<()> {
    let outcome = manager(workspace).end(options.activities.as_deref(), options.quick)?;

    if let Some(warning) = &outcome.warning {
        println!("⚠ Day log not updated: {warning}");
    }
    println!(
        "✓ Session ended at {}",
        outcome.record.end_time.as_deref().unwrap_or("--:--")
    );
    println!("  Agent:    {}", outcome.record.agent);
    println!("  Duration: {}", format_duration(outcome.duration_minutes));
    if !outcome.record.activities.is_empty() {
        println!("  Activities recorded: {}", outcome.record.activities.len());
    }
    Ok(())
}

/// Print the active session, if any.
///
/// # Errors
///
/// Fails when the state file cannot be read.
pub fn status(workspace: &Workspace) -> Result<()> {
    match manager(workspace).status()? {
        Some(active) => {
            println!("Active session");
            println!("  Agent:   {}", active.record.agent);
            println!("  Project: {}", active.record.project);
            println!("  Started: {}", active.record.start_time);
            println!("  Elapsed: {}", format_duration(active.elapsed_minutes));
        }
        None => {
            println!("No active session.");
            println!("Start one with: tandem start");
        }
    }
    Ok(())
}
