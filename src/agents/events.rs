// Coordination events
//
// Every notable step of registration, dispatch, routing and sequencing is
// published on a broadcast channel. Publishing with no subscribers is fine;
// slow subscribers lag and lose the oldest events.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::types::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoordinatorEvent {
    WorkerRegistered { worker_id: Uuid, role: Role, replaced: bool },
    TaskCreated { task_id: Uuid, title: String },
    TaskCompleted { task_id: Uuid, responses: usize, failures: usize },
    MessageRouted { message_id: Uuid, delivered: Vec<Role> },
    WorkflowStarted { workflow_id: Uuid, stages: usize },
    StageCompleted { workflow_id: Uuid, stage_id: String, success: bool },
    WorkflowCompleted { workflow_id: Uuid },
    WorkflowFailed { workflow_id: Option<Uuid>, reason: String },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoordinatorEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: CoordinatorEvent) {
        // no receivers is not an error
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.sender.subscribe()
    }
}
