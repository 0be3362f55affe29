use serde::{Deserialize, Serialize};

/// Represents the lifecycle status of a task
///
/// # Status Transitions
/// ```text
/// Pending -> InProgress -> Completed
///               |  └-----> Failed
///               └--------> Pending (cancelled before completion)
/// Pending -> Blocked -> Pending
/// ```
///
/// The dispatcher only ever walks `Pending -> InProgress -> Completed`
/// (and back to `Pending` on cancellation). `Failed` and `Blocked` are
/// part of the model but no dispatch path produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been created but not dispatched
    Pending,
    /// Task is being dispatched to its assigned workers
    InProgress,
    /// Dispatch ran to completion
    Completed,
    /// Task failed (declared, not produced by dispatch)
    Failed,
    /// Task is waiting on something external (declared, not produced by dispatch)
    Blocked,
}

impl TaskStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// # Example
    /// ```
    /// use crew_coordinator::domain::task::value_objects::TaskStatus;
    ///
    /// assert!(TaskStatus::Pending.can_transition_to(TaskStatus::InProgress));
    /// assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Pending));
    /// ```
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (Pending, Blocked)
                | (Blocked, Pending)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (InProgress, Pending)
                // re-dispatching a completed task is allowed; it stays completed
                | (Completed, InProgress)
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Blocked => write!(f, "blocked"),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("Unknown priority: {}", other)),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}
