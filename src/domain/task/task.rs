use super::value_objects::{Priority, TaskStatus};
use crate::domain::role::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of work assigned to one or more roles
///
/// # Invariants
/// - Status transitions must follow [`TaskStatus::can_transition_to`]
/// - `completed_at` is set exactly when the task reaches `Completed`
/// - Assigned roles keep their declaration order; dispatch visits them in that order
///
/// `dependencies` is carried as data only. Nothing checks that the
/// referenced tasks have completed before this one is dispatched.
///
/// # Example
/// ```
/// use crew_coordinator::domain::role::Role;
/// use crew_coordinator::domain::task::{Priority, Task, TaskStatus};
///
/// let task = Task::new("Plan", "Draft the plan", vec![Role::Planner], Priority::High);
///
/// assert_eq!(task.title(), "Plan");
/// assert_eq!(task.status(), TaskStatus::Pending);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: Uuid,
    title: String,
    description: String,
    assigned_roles: Vec<Role>,
    status: TaskStatus,
    priority: Priority,
    dependencies: Vec<Uuid>,
    output: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new task in `Pending` status with a fresh id
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        assigned_roles: Vec<Role>,
        priority: Priority,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            assigned_roles,
            status: TaskStatus::Pending,
            priority,
            dependencies: Vec::new(),
            output: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Declares the tasks this one depends on
    pub fn with_dependencies(mut self, dependencies: Vec<Uuid>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Moves the task into `InProgress`
    pub fn start(&mut self) -> Result<(), String> {
        self.transition(TaskStatus::InProgress)
    }

    /// Marks dispatch as finished and records its output
    pub fn complete(&mut self, output: serde_json::Value) -> Result<(), String> {
        self.transition(TaskStatus::Completed)?;
        self.output = Some(output);
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Returns an interrupted task to `Pending`
    pub fn revert_to_pending(&mut self) -> Result<(), String> {
        self.transition(TaskStatus::Pending)
    }

    fn transition(&mut self, next: TaskStatus) -> Result<(), String> {
        if !self.status.can_transition_to(next) {
            return Err(format!(
                "Cannot move task {} from {} to {}",
                self.id, self.status, next
            ));
        }
        self.status = next;
        Ok(())
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Roles in the order they will be dispatched
    pub fn assigned_roles(&self) -> &[Role] {
        &self.assigned_roles
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn dependencies(&self) -> &[Uuid] {
        &self.dependencies
    }

    /// Serialized responses recorded at completion
    pub fn output(&self) -> Option<&serde_json::Value> {
        self.output.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}
