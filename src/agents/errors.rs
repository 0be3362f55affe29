use thiserror::Error;

use crate::domain::role::Role;

/// Errors that can occur in the coordination layer
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("No worker registered for role {0}")]
    AgentNotRegistered(Role),

    #[error("Worker execution failed: {0}")]
    WorkerExecutionFailure(String),

    #[error("No workflow defined")]
    NoWorkflowDefined,

    #[error("Execution cancelled")]
    Cancelled,

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AgentError {
    /// Shorthand for a worker-side failure
    pub fn execution(message: impl Into<String>) -> Self {
        AgentError::WorkerExecutionFailure(message.into())
    }

    /// Text recorded in a synthesized response's error list
    ///
    /// Worker failures keep just the worker's own message.
    pub fn describe(&self) -> String {
        match self {
            AgentError::WorkerExecutionFailure(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
