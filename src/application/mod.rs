//! Application layer - the lifecycle use case and the pieces it coordinates.
//!
//! This layer turns a caller's request into validated, ordered commands and
//! runs them through the domain services.

pub mod lease;
mod lifecycle;
mod plan;

pub use lifecycle::{LifecycleManager, check};
pub use plan::{CommandSettings, FailurePolicy, Step};
