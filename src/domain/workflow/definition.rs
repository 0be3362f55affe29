use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::role::Role;
use crate::domain::task::Task;

/// An ordered group of tasks plus the criteria used to judge it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStage {
    pub id: String,
    pub name: String,
    pub primary_role: Role,
    /// Advisory only; dispatch follows each task's own assigned roles
    pub supporting_roles: Vec<Role>,
    pub tasks: Vec<Task>,
    pub success_criteria: Vec<String>,
}

impl WorkflowStage {
    /// Builds a stage without touching any coordinator state
    ///
    /// # Example
    /// ```
    /// use crew_coordinator::domain::role::Role;
    /// use crew_coordinator::domain::workflow::WorkflowStage;
    ///
    /// let stage = WorkflowStage::new(
    ///     "design",
    ///     "Design",
    ///     Role::Architect,
    ///     vec![],
    ///     vec!["Architecture documented".to_string()],
    /// )
    /// .with_supporting_roles(vec![Role::SecuritySpecialist]);
    ///
    /// assert_eq!(stage.supporting_roles, vec![Role::SecuritySpecialist]);
    /// ```
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        primary_role: Role,
        tasks: Vec<Task>,
        success_criteria: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            primary_role,
            supporting_roles: Vec::new(),
            tasks,
            success_criteria,
        }
    }

    pub fn with_supporting_roles(mut self, roles: Vec<Role>) -> Self {
        self.supporting_roles = roles;
        self
    }

    /// Shared-context key the stage's aggregated responses are written under
    pub fn results_key(&self) -> String {
        format!("stage:{}:results", self.id)
    }
}

/// An ordered sequence of stages executed end to end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub initial_prompt: String,
    pub stages: Vec<WorkflowStage>,
    pub created_at: DateTime<Utc>,
}

impl WorkflowDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        initial_prompt: impl Into<String>,
        stages: Vec<WorkflowStage>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            initial_prompt: initial_prompt.into(),
            stages,
            created_at: Utc::now(),
        }
    }

    pub fn stage(&self, stage_id: &str) -> Option<&WorkflowStage> {
        self.stages.iter().find(|stage| stage.id == stage_id)
    }
}
