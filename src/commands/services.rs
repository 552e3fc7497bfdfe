//! Service construction.
//!
//! The state reader, command runner and lifecycle manager are built once
//! here and handed to whatever drives them.

use std::sync::Arc;

use anyhow::Result;
use log::debug;

use crate::{
    application::LifecycleManager,
    domain::service::{AddonState, ProcessRunner},
    runtime::Runtime,
};

use super::config::Config;

/// Build the state reader for the configured host.
pub fn build_state<R: Runtime>(runtime: Arc<R>, config: &Config) -> AddonState<R> {
    AddonState::new(runtime, config.installed_path(), config.locked_path())
}

/// Build a process runner honouring the configured timeout.
pub fn build_runner(config: &Config) -> ProcessRunner {
    ProcessRunner::new().with_timeout(config.timeout)
}

/// Build the lifecycle manager for the configured host.
///
/// Fails if the host root is not an existing directory.
pub fn build_manager<R: Runtime>(
    runtime: Arc<R>,
    config: &Config,
) -> Result<LifecycleManager<R, ProcessRunner>> {
    if !runtime.is_dir(&config.host_root) {
        anyhow::bail!(
            "Host root {} does not exist or is not a directory.",
            config.host_root.display()
        );
    }
    debug!("Using host root: {:?}", config.host_root);

    let state = build_state(runtime, config);
    let runner = Arc::new(build_runner(config));
    Ok(LifecycleManager::new(state, runner, config.command_settings()).with_policy(config.policy))
}
