// Domain layer module exports
// Pure data model with validated state transitions
// Domain is independent of the coordination runtime and storage adapters

pub mod repositories;
pub mod role;
pub mod task;
pub mod workflow;
