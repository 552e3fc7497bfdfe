//! Domain layer - addon model, validation rules and the services that touch
//! the outside world (processes and persisted state).

pub mod model;
pub mod service;
pub mod validate;
