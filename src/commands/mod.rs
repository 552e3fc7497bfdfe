//! Command layer - what the `addonman` binary runs for each subcommand.

pub mod config;
mod manage;
pub mod services;
mod status;

pub use config::Config;
pub use manage::manage;
pub use services::{build_manager, build_runner, build_state};
pub use status::{AddonStatus, collect_status, status};
