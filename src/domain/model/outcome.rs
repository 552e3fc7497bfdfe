use serde::{Deserialize, Serialize};

/// Fallback text for a failure that carried no diagnostic output.
const UNKNOWN_FAILURE: &str = "Operation failed";

/// Uniform outcome of an external command or of a whole lifecycle operation.
///
/// `message` carries stdout on success and stderr (or an exit description)
/// on failure. A failure always has a non-empty message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: true,
            message: (!message.is_empty()).then_some(message),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            UNKNOWN_FAILURE.to_string()
        } else {
            message
        };
        Self {
            success: false,
            message: Some(message),
        }
    }

    /// Message text, or an empty string when none was captured.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}
