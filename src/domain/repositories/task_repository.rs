use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::task::Task;

/// Repository trait for the coordinator's task collections
///
/// A task lives in exactly one of two collections, pending or completed.
/// Implementations must make [`TaskRepository::complete`] a single atomic
/// move so the two collections never both hold the same id.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Append a task to the pending collection (or replace it if already pending)
    async fn add_pending(&self, task: &Task) -> Result<(), String>;

    /// Update a pending task in place; a task not in pending is left alone
    async fn update_pending(&self, task: &Task) -> Result<(), String>;

    /// Remove the task from pending (if present) and upsert it into completed
    async fn complete(&self, task: &Task) -> Result<(), String>;

    /// Find a task by id in either collection
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, String>;

    /// Pending tasks in creation order
    async fn pending(&self) -> Result<Vec<Task>, String>;

    /// Completed tasks in completion order
    async fn completed(&self) -> Result<Vec<Task>, String>;
}
