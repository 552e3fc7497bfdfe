pub mod process;
pub use process::*;

pub mod state;
pub use state::*;
