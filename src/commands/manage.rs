use anyhow::Result;
use log::debug;

use crate::{
    application::LifecycleManager,
    domain::{
        model::{Action, AddonRequest},
        service::CommandRunner,
    },
    runtime::Runtime,
};

/// Run one lifecycle action and report the outcome.
///
/// A successful result prints its message; a failed one becomes an error
/// carrying the message.
#[tracing::instrument(skip(manager))]
pub async fn manage<R: Runtime, C: CommandRunner>(
    manager: &LifecycleManager<R, C>,
    action: Action,
    identifier: &str,
    version: Option<&str>,
) -> Result<()> {
    let request = AddonRequest::new(action, identifier, version.unwrap_or_default());
    debug!("Performing {:?}", request);

    let result = manager.perform(&request).await;
    let message = result.message().trim_end();

    if !result.success {
        anyhow::bail!("{}", message);
    }

    if message.is_empty() {
        println!("Done.");
    } else {
        println!("{}", message);
    }
    Ok(())
}
