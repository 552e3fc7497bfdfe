use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::Action;
use crate::domain::validate::is_local_identifier;

/// A lifecycle request as received from the caller.
///
/// `version` is empty when the caller did not pin one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonRequest {
    pub identifier: String,
    #[serde(default)]
    pub version: String,
    pub action: Action,
}

impl AddonRequest {
    pub fn new(action: Action, identifier: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            version: version.into(),
            action,
        }
    }

    /// Classify the identifier once; callers match on the result instead of
    /// re-inspecting the string.
    pub fn target(&self) -> AddonTarget {
        AddonTarget::classify(&self.identifier, &self.version)
    }
}

/// Where an addon comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddonTarget {
    /// Published to the package registry. `version` is `None` for "latest".
    Remote { name: String, version: Option<String> },
    /// A checkout on the host filesystem, synced with version control.
    Local { path: PathBuf },
}

impl AddonTarget {
    /// Decide local vs remote from the identifier's shape.
    ///
    /// Nothing is validated here beyond the shape; remote names and versions
    /// are checked by the lifecycle manager before anything runs. A version
    /// given with a local identifier is dropped.
    pub fn classify(identifier: &str, version: &str) -> Self {
        if is_local_identifier(identifier) {
            AddonTarget::Local {
                path: PathBuf::from(identifier),
            }
        } else {
            AddonTarget::Remote {
                name: identifier.to_string(),
                version: (!version.is_empty()).then(|| version.to_string()),
            }
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, AddonTarget::Local { .. })
    }
}

impl fmt::Display for AddonTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddonTarget::Remote {
                name,
                version: Some(version),
            } => write!(f, "{}@{}", name, version),
            AddonTarget::Remote { name, version: None } => f.write_str(name),
            AddonTarget::Local { path } => write!(f, "{}", path.display()),
        }
    }
}
