use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::repositories::TaskRepository;
use crate::domain::task::Task;

#[derive(Debug, Default)]
struct TaskBook {
    pending: Vec<Task>,
    completed: Vec<Task>,
}

/// In-memory implementation of TaskRepository
///
/// Both collections sit behind one lock, so moving a task from pending
/// to completed is a single critical section.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    book: RwLock<TaskBook>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn add_pending(&self, task: &Task) -> Result<(), String> {
        let mut book = self.book.write().await;
        if book.completed.iter().any(|t| t.id() == task.id()) {
            return Err(format!("Task {} is already completed", task.id()));
        }
        match book.pending.iter_mut().find(|t| t.id() == task.id()) {
            Some(existing) => *existing = task.clone(),
            None => book.pending.push(task.clone()),
        }
        Ok(())
    }

    async fn update_pending(&self, task: &Task) -> Result<(), String> {
        let mut book = self.book.write().await;
        if let Some(existing) = book.pending.iter_mut().find(|t| t.id() == task.id()) {
            *existing = task.clone();
        }
        Ok(())
    }

    async fn complete(&self, task: &Task) -> Result<(), String> {
        let mut book = self.book.write().await;
        book.pending.retain(|t| t.id() != task.id());
        match book.completed.iter_mut().find(|t| t.id() == task.id()) {
            Some(existing) => *existing = task.clone(),
            None => book.completed.push(task.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, String> {
        let book = self.book.read().await;
        Ok(book
            .pending
            .iter()
            .chain(book.completed.iter())
            .find(|t| t.id() == id)
            .cloned())
    }

    async fn pending(&self) -> Result<Vec<Task>, String> {
        Ok(self.book.read().await.pending.clone())
    }

    async fn completed(&self) -> Result<Vec<Task>, String> {
        Ok(self.book.read().await.completed.clone())
    }
}
