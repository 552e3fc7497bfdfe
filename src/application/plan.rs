//! Translating a validated request into external commands.

use std::fmt;
use std::path::PathBuf;

use crate::domain::model::{Action, AddonTarget, OperationError};

/// What to do when the first command of a two-step action fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop and report the failing step.
    #[default]
    Abort,
    /// Run the remaining steps anyway and report the last one.
    Continue,
}

/// Names and locations of the tools the lifecycle manager drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSettings {
    /// Working directory for package manager and host CLI commands.
    pub host_root: PathBuf,
    pub package_manager: String,
    pub host_cli: String,
    pub vcs: String,
    pub git_remote: String,
    pub git_branch: String,
}

impl CommandSettings {
    pub fn new(host_root: impl Into<PathBuf>) -> Self {
        Self {
            host_root: host_root.into(),
            package_manager: "yarn".to_string(),
            host_cli: "hydrooj".to_string(),
            vcs: "git".to_string(),
            git_remote: "origin".to_string(),
            git_branch: "main".to_string(),
        }
    }

    /// Commands for `action` on `target`, in execution order.
    ///
    /// Expects a request that already passed [`check`](crate::application::check):
    /// remote names and versions are not validated again. Add and delete on
    /// a local target still come back as [`OperationError::LocalNotUpdatable`]
    /// so a caller skipping the check gets no commands. A pinned version is
    /// passed on without surrounding whitespace.
    pub fn steps(&self, action: Action, target: &AddonTarget) -> Result<Vec<Step>, OperationError> {
        let steps = match target {
            AddonTarget::Local { path } => match action {
                Action::Update => vec![Step::new(
                    &self.vcs,
                    ["pull", self.git_remote.as_str(), self.git_branch.as_str()],
                    path.clone(),
                )],
                Action::Add | Action::Delete => return Err(OperationError::LocalNotUpdatable),
            },
            AddonTarget::Remote { name, version } => {
                let spec = match version {
                    Some(version) => format!("{}@{}", name, version.trim()),
                    None => name.clone(),
                };
                match action {
                    Action::Add => vec![
                        self.host_step(&self.package_manager, ["global", "add", spec.as_str()]),
                        self.host_step(&self.host_cli, ["addon", "add", name.as_str()]),
                    ],
                    Action::Update => vec![self.host_step(
                        &self.package_manager,
                        ["global", "upgrade", spec.as_str(), "--latest"],
                    )],
                    Action::Delete => vec![
                        self.host_step(&self.package_manager, ["global", "remove", name.as_str()]),
                        self.host_step(&self.host_cli, ["addon", "remove", name.as_str()]),
                    ],
                }
            }
        };
        Ok(steps)
    }

    fn host_step<const N: usize>(&self, program: &str, args: [&str; N]) -> Step {
        Step::new(program, args, self.host_root.clone())
    }
}

/// One external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Step {
    pub fn new<'a>(
        program: &str,
        args: impl IntoIterator<Item = &'a str>,
        cwd: PathBuf,
    ) -> Self {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(str::to_string).collect(),
            cwd,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
