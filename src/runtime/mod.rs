//! Runtime abstraction for filesystem access.
//!
//! The state reader and status report only ever look at the host's disk
//! through this trait, so tests can swap in `MockRuntime` and never touch
//! real files.
//!
//! # Structure
//!
//! - `fs` - File system queries (read, is_dir)

mod fs;

use anyhow::Result;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn is_dir(&self, path: &Path) -> bool;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }
}
