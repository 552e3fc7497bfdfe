use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::{
    domain::{model::AddonSnapshot, service::AddonState, validate::is_local_identifier},
    runtime::Runtime,
};

/// How one installed addon looks right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonStatus {
    pub identifier: String,
    pub local: bool,
    pub locked: bool,
    /// Local checkout whose directory is gone.
    pub missing: bool,
}

impl AddonStatus {
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags = Vec::new();
        if self.local {
            tags.push("local");
        }
        if self.locked {
            tags.push("locked");
        }
        if self.missing {
            tags.push("missing");
        }
        tags
    }
}

/// Status for every installed addon, in state file order.
pub fn collect_status<R: Runtime>(runtime: &R, snapshot: &AddonSnapshot) -> Vec<AddonStatus> {
    let locked = snapshot.effective_locked();
    snapshot
        .installed
        .iter()
        .map(|identifier| {
            let local = is_local_identifier(identifier);
            AddonStatus {
                identifier: identifier.clone(),
                local,
                locked: locked.contains(identifier),
                missing: local && !runtime.is_dir(Path::new(identifier)),
            }
        })
        .collect()
}

/// Print the installed addons with their local/locked tags.
#[tracing::instrument(skip(runtime, state))]
pub fn status<R: Runtime>(runtime: &R, state: &AddonState<R>) -> Result<()> {
    debug!("Reading state from {:?}", state.installed_path());
    let snapshot = state.snapshot();

    let statuses = collect_status(runtime, &snapshot);
    if statuses.is_empty() {
        println!("No addons installed.");
        return Ok(());
    }

    for status in statuses {
        let tags = status.tags();
        if tags.is_empty() {
            println!("{}", status.identifier);
        } else {
            println!("{} ({})", status.identifier, tags.join(", "));
        }
    }
    Ok(())
}
