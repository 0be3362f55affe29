use serde::{Deserialize, Serialize};

/// Lifecycle status of the workflow held by a sequencer
///
/// # Status Transitions
/// ```text
/// NotStarted -> Running -> Completed
///     |            ├-----> Failed
///     |            └-----> Cancelled
///     └------------------> Failed (executed with nothing defined)
/// ```
/// Defining a new workflow resets any status back to `NotStarted`. A
/// finished or interrupted workflow may be executed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    NotStarted,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl WorkflowStatus {
    /// Checks if a transition from current status to next status is valid
    pub fn can_transition_to(&self, next: WorkflowStatus) -> bool {
        use WorkflowStatus::*;
        matches!(
            (self, next),
            (NotStarted, Running)
                | (NotStarted, Failed)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Cancelled)
                // a finished workflow may be executed again
                | (Completed, Running)
                | (Failed, Running)
                | (Cancelled, Running)
                // a run whose future was dropped never reached a final status
                | (Running, Running)
        )
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStatus::NotStarted => write!(f, "not_started"),
            WorkflowStatus::Running => write!(f, "running"),
            WorkflowStatus::Completed => write!(f, "completed"),
            WorkflowStatus::Failed => write!(f, "failed"),
            WorkflowStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}
