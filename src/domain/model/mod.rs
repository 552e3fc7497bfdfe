pub mod action;
pub mod error;
pub mod outcome;
pub mod snapshot;
pub mod target;

pub use action::*;
pub use error::*;
pub use outcome::*;
pub use snapshot::*;
pub use target::*;
