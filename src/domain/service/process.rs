//! External command execution.

use async_trait::async_trait;
use log::{debug, warn};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::domain::model::{CommandResult, OperationError};

/// Runs one external program and reports how it went.
///
/// Implementations never return an error: spawn failures, non-zero exits and
/// timeouts are all encoded in the returned [`CommandResult`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> CommandResult;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the child and fail if it runs longer than `timeout`.
    /// `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    #[tracing::instrument(skip(self))]
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> CommandResult {
        debug!("Running {} {} in {:?}", program, args.join(" "), cwd);

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to start {}: {}", program, e);
                return OperationError::Spawn(e.to_string()).into();
            }
        };

        // Dropping the wait future on timeout drops the child, which kills it.
        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(waited) => waited,
                Err(_) => {
                    warn!("{} timed out after {:?}", program, limit);
                    return OperationError::TimedOut(limit.as_secs()).into();
                }
            },
            None => child.wait_with_output().await,
        };

        let output = match waited {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to collect output of {}: {}", program, e);
                return OperationError::Spawn(e.to_string()).into();
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("{} exited with {:?}", program, output.status.code());

        interpret(output.status.code(), &stdout, &stderr)
    }
}

/// Map an exit code and captured output to a result.
///
/// Success returns stdout whenever it is non-empty, otherwise stderr. Failure
/// prefers stderr and skips whitespace-only output so the message always says
/// something. `code` is `None` when the process was killed by a signal.
pub fn interpret(code: Option<i32>, stdout: &str, stderr: &str) -> CommandResult {
    let first_non_blank = |candidates: [&str; 2]| {
        candidates
            .into_iter()
            .find(|text| !text.trim().is_empty())
            .map(str::to_string)
    };

    match code {
        Some(0) if stdout.is_empty() => CommandResult::success(stderr),
        Some(0) => CommandResult::success(stdout),
        Some(code) => CommandResult::failure(
            first_non_blank([stderr, stdout])
                .unwrap_or_else(|| OperationError::ExitCode(code).to_string()),
        ),
        None => CommandResult::failure(
            first_non_blank([stderr, stdout])
                .unwrap_or_else(|| OperationError::Terminated.to_string()),
        ),
    }
}
