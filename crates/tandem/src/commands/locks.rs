//! `locks` and `locks release`

use anyhow::Result;
use tandem_core::{lock::validate_resource_name, LockManager, LockStore};

use super::Workspace;

/// List lock records with age and staleness.
///
/// # Errors
///
/// Fails when the lock directory cannot be read.
pub fn list(workspace: &Workspace) -> Result<()> {
    let manager = LockManager::from_config(&workspace.config, &workspace.root);
    let records = manager.records()?;

    if records.is_empty() {
        println!("No locks held.");
        return Ok(());
    }

    for status in &records {
        let state = if status.stale { "stale" } else { "held" };
        println!(
            "{:<16} {:<16} {:>6}s  {state}",
            status.record.resource, status.record.owner, status.age_secs
        );
    }
    Ok(())
}

/// Remove the record for `resource` whoever holds it.
///
/// # Errors
///
/// Fails on an invalid resource name.
pub fn release(workspace: &Workspace, resource: &str) -> Result<()> {
    validate_resource_name(resource)?;
    let manager = LockManager::from_config(&workspace.config, &workspace.root);
    let agent = workspace.agent(None);

    match manager.store().load(resource)? {
        Some(record) => {
            manager.release(resource, agent.as_str());
            println!("✓ Released '{resource}' (held by {})", record.owner);
        }
        None => println!("'{resource}' is not locked."),
    }
    Ok(())
}
