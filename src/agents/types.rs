use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::domain::role::Role;

/// Identity of a worker, as reported by `Worker::identify`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub id: Uuid,
    pub display_name: String,
    pub role: Role,
    /// Advisory metadata; nothing routes or dispatches on it
    pub capabilities: Vec<String>,
}

impl WorkerProfile {
    pub fn new(display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            role,
            capabilities: Vec::new(),
        }
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }
}

/// What a worker returns for one (task, role) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub worker_id: Uuid,
    pub role: Role,
    pub task_id: Option<Uuid>,
    pub response: String,
    /// Within `[0, 1]` for every response the dispatcher returns or stores
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl AgentResponse {
    pub fn new(worker_id: Uuid, role: Role, response: impl Into<String>, confidence: f64) -> Self {
        Self {
            worker_id,
            role,
            task_id: None,
            response: response.into(),
            confidence: clamp_confidence(confidence),
            next_actions: None,
            errors: None,
        }
    }

    /// Response synthesized when a worker's `execute` fails
    pub fn failed(worker_id: Uuid, role: Role, task_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            worker_id,
            role,
            task_id: Some(task_id),
            response: String::new(),
            confidence: 0.0,
            next_actions: None,
            errors: Some(vec![error.into()]),
        }
    }

    /// Pin a worker's reply to the role it was dispatched for and to the task
    ///
    /// Confidence is clamped to `[0, 1]` (NaN becomes 0) and a missing
    /// `task_id` is filled in.
    pub(crate) fn normalized(mut self, role: Role, task_id: Uuid) -> Self {
        self.role = role;
        self.confidence = clamp_confidence(self.confidence);
        self.task_id.get_or_insert(task_id);
        self
    }

    pub fn for_task(mut self, task_id: Uuid) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn with_next_actions(mut self, actions: Vec<String>) -> Self {
        self.next_actions = Some(actions);
        self
    }

    pub fn is_failure(&self) -> bool {
        self.errors.as_ref().is_some_and(|errors| !errors.is_empty())
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
