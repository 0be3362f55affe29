// Workflow domain module
// Contains workflow definitions, stages and the workflow status machine

pub mod definition;
pub mod value_objects;

pub use definition::{WorkflowDefinition, WorkflowStage};
pub use value_objects::WorkflowStatus;
