use std::path::PathBuf;
use std::time::Duration;

use crate::application::{CommandSettings, FailurePolicy};
use crate::domain::service::{DEFAULT_INSTALLED_FILE, DEFAULT_LOCKED_FILE};

/// Everything needed to build the lifecycle services for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host application root; package manager and host CLI run here and the
    /// state files live here.
    pub host_root: PathBuf,
    pub installed_file: String,
    pub locked_file: String,
    pub package_manager: String,
    pub host_cli: String,
    pub vcs: String,
    pub git_remote: String,
    pub git_branch: String,
    pub policy: FailurePolicy,
    /// Per-command limit. `None` waits for the command however long it takes.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Defaults for a host installed at `host_root`.
    pub fn new(host_root: impl Into<PathBuf>) -> Self {
        let settings = CommandSettings::new(host_root);
        Self {
            host_root: settings.host_root,
            installed_file: DEFAULT_INSTALLED_FILE.to_string(),
            locked_file: DEFAULT_LOCKED_FILE.to_string(),
            package_manager: settings.package_manager,
            host_cli: settings.host_cli,
            vcs: settings.vcs,
            git_remote: settings.git_remote,
            git_branch: settings.git_branch,
            policy: FailurePolicy::default(),
            timeout: None,
        }
    }

    pub fn installed_path(&self) -> PathBuf {
        self.host_root.join(&self.installed_file)
    }

    pub fn locked_path(&self) -> PathBuf {
        self.host_root.join(&self.locked_file)
    }

    pub fn command_settings(&self) -> CommandSettings {
        CommandSettings {
            host_root: self.host_root.clone(),
            package_manager: self.package_manager.clone(),
            host_cli: self.host_cli.clone(),
            vcs: self.vcs.clone(),
            git_remote: self.git_remote.clone(),
            git_branch: self.git_branch.clone(),
        }
    }
}
