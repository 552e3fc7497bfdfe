use thiserror::Error;

use super::CommandResult;

/// Reasons a lifecycle operation is refused or fails.
///
/// Validation and conflict errors are raised before any process is spawned.
/// Every variant collapses into a failed [`CommandResult`] whose message is
/// the `Display` text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("Invalid package name: {0}")]
    InvalidName(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Local packages can only be updated")]
    LocalNotUpdatable,

    #[error("Package is already installed")]
    AlreadyInstalled,

    #[error("Package is not installed")]
    NotInstalled,

    #[error("This package is locked and cannot be removed")]
    Locked,

    /// The process could not be started; carries the OS error text.
    #[error("{0}")]
    Spawn(String),

    #[error("Exit code {0}")]
    ExitCode(i32),

    #[error("Terminated by signal")]
    Terminated,

    #[error("Timed out after {0}s")]
    TimedOut(u64),
}

impl From<OperationError> for CommandResult {
    fn from(err: OperationError) -> Self {
        CommandResult::failure(err.to_string())
    }
}
