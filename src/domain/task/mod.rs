// Task domain module
// Contains the task entity and its status/priority value objects

#![allow(clippy::module_inception)]

pub mod task;
pub mod value_objects;

// Re-export main types for convenience
pub use task::Task;
pub use value_objects::{Priority, TaskStatus};
