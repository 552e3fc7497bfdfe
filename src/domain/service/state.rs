//! Persisted addon state.
//!
//! The host keeps two JSON arrays next to its installation: the active addons
//! and the addons that must not be removed. Both are written by the package
//! manager and host tooling; this module only reads them.

use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::model::AddonSnapshot;
use crate::runtime::Runtime;

pub const DEFAULT_INSTALLED_FILE: &str = "addon.json";
pub const DEFAULT_LOCKED_FILE: &str = "addon-locked.json";

/// Best-effort reader for the installed and locked lists.
///
/// A missing or malformed file reads as an empty list. Nothing is cached:
/// every call goes back to disk.
pub struct AddonState<R: Runtime> {
    runtime: Arc<R>,
    installed_path: PathBuf,
    locked_path: PathBuf,
}

impl<R: Runtime> AddonState<R> {
    pub fn new(runtime: Arc<R>, installed_path: PathBuf, locked_path: PathBuf) -> Self {
        Self {
            runtime,
            installed_path,
            locked_path,
        }
    }

    /// Reader for the default file names under `host_root`.
    pub fn under(runtime: Arc<R>, host_root: &Path) -> Self {
        Self::new(
            runtime,
            host_root.join(DEFAULT_INSTALLED_FILE),
            host_root.join(DEFAULT_LOCKED_FILE),
        )
    }

    pub fn installed_path(&self) -> &Path {
        &self.installed_path
    }

    pub fn locked_path(&self) -> &Path {
        &self.locked_path
    }

    pub fn installed_packages(&self) -> Vec<String> {
        self.read_list(&self.installed_path)
    }

    pub fn locked_packages(&self) -> Vec<String> {
        self.read_list(&self.locked_path)
    }

    pub fn snapshot(&self) -> AddonSnapshot {
        AddonSnapshot::new(self.installed_packages(), self.locked_packages())
    }

    #[tracing::instrument(skip(self))]
    fn read_list(&self, path: &Path) -> Vec<String> {
        let content = match self.runtime.read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("Treating {:?} as empty: {:#}", path, e);
                return vec![];
            }
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(list) => list,
            Err(e) => {
                warn!("Ignoring malformed state file {:?}: {}", path, e);
                vec![]
            }
        }
    }
}
