// Aggregate coordinator state
//
// A point-in-time snapshot of everything the coordinator owns, plus the
// human-readable status report rendered from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use uuid::Uuid;

use super::messages::Message;
use super::types::WorkerProfile;
use crate::domain::task::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorState {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub workers: Vec<WorkerProfile>,
    pub completed_tasks: Vec<Task>,
    pub pending_tasks: Vec<Task>,
    pub message_history: Vec<Message>,
    pub artifacts: BTreeMap<String, serde_json::Value>,
}

impl CoordinatorState {
    /// Renders a multi-line summary for humans
    pub fn status_report(&self) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "Coordinator: {} ({})", self.name, self.id);
        let _ = writeln!(report, "Created: {}", self.created_at.to_rfc3339());

        let _ = writeln!(report, "Workers ({}):", self.workers.len());
        for worker in &self.workers {
            let _ = writeln!(
                report,
                "  - {} [{}] {}",
                worker.role,
                worker.display_name,
                worker.capabilities.join(", ")
            );
        }

        let _ = writeln!(
            report,
            "Tasks: {} pending, {} completed",
            self.pending_tasks.len(),
            self.completed_tasks.len()
        );
        for task in &self.pending_tasks {
            let _ = writeln!(report, "  [{}] {} ({})", task.status(), task.title(), task.priority());
        }
        for task in &self.completed_tasks {
            let _ = writeln!(report, "  [{}] {} ({})", task.status(), task.title(), task.priority());
        }

        let _ = writeln!(report, "Messages: {}", self.message_history.len());

        if self.artifacts.is_empty() {
            let _ = write!(report, "Artifacts: none");
        } else {
            let names: Vec<_> = self.artifacts.keys().map(String::as_str).collect();
            let _ = write!(report, "Artifacts: {}", names.join(", "));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::Role;
    use crate::domain::task::Priority;
    use serde_json::json;

    fn state() -> CoordinatorState {
        CoordinatorState {
            id: Uuid::new_v4(),
            name: "build-crew".to_string(),
            created_at: Utc::now(),
            workers: vec![WorkerProfile::new("Pat", Role::Planner).with_capabilities(["planning"])],
            completed_tasks: vec![],
            pending_tasks: vec![Task::new("Plan", "", vec![Role::Planner], Priority::High)],
            message_history: vec![],
            artifacts: BTreeMap::new(),
        }
    }

    #[test]
    fn report_lists_workers_and_tasks() {
        let report = state().status_report();

        assert!(report.contains("Coordinator: build-crew"));
        assert!(report.contains("Planner [Pat] planning"));
        assert!(report.contains("Tasks: 1 pending, 0 completed"));
        assert!(report.contains("[pending] Plan (high)"));
        assert!(report.ends_with("Artifacts: none"));
    }

    #[test]
    fn report_lists_artifact_names() {
        let mut state = state();
        state.artifacts.insert("design".to_string(), json!({}));
        state.artifacts.insert("api".to_string(), json!({}));

        assert!(state.status_report().ends_with("Artifacts: api, design"));
    }
}
