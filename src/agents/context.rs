// Shared context store
//
// A single key -> value blackboard owned by the coordinator. Workers get a
// read-only view that points at the same map, so they observe every write,
// including writes made before they were registered.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Entries = Arc<RwLock<HashMap<String, Value>>>;

/// Key under which a worker's response to a task is recorded
pub fn task_response_key(task_id: uuid::Uuid, role: crate::domain::role::Role) -> String {
    format!("task:{}:{}", task_id, role.as_key())
}

/// Writable handle to the shared context, held by the coordinator
#[derive(Debug, Clone, Default)]
pub struct SharedContext {
    entries: Entries,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the value at `key`
    pub async fn update(&self, key: impl Into<String>, value: Value) {
        self.entries.write().await.insert(key.into(), value);
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// A read-only handle over the same entries
    pub fn view(&self) -> ContextView {
        ContextView {
            entries: Arc::clone(&self.entries),
        }
    }
}

/// Read-only handle to the shared context given to workers
#[derive(Debug, Clone)]
pub struct ContextView {
    entries: Entries,
}

impl ContextView {
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    /// Reads and deserializes a value; `None` if absent or of the wrong shape
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        serde_json::from_value(value).ok()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    /// All keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::Role;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn update_and_get() {
        let ctx = SharedContext::new();
        ctx.update("requirements", json!(["auth", "search"])).await;

        assert_eq!(ctx.get("requirements").await, Some(json!(["auth", "search"])));
        assert_eq!(ctx.get("missing").await, None);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let ctx = SharedContext::new();
        ctx.update("k", json!(1)).await;
        ctx.update("k", json!(2)).await;

        assert_eq!(ctx.get("k").await, Some(json!(2)));
        assert_eq!(ctx.len().await, 1);
    }

    #[tokio::test]
    async fn view_sees_writes_made_before_and_after_it_was_taken() {
        let ctx = SharedContext::new();
        ctx.update("before", json!("a")).await;

        let view = ctx.view();
        ctx.update("after", json!("b")).await;

        assert_eq!(view.get("before").await, Some(json!("a")));
        assert_eq!(view.get("after").await, Some(json!("b")));
        assert_eq!(view.keys().await, vec!["after", "before"]);
    }

    #[tokio::test]
    async fn get_as_deserializes() {
        let ctx = SharedContext::new();
        ctx.update("count", json!(3)).await;
        let view = ctx.view();

        assert_eq!(view.get_as::<u32>("count").await, Some(3));
        assert_eq!(view.get_as::<String>("count").await, None);
    }

    #[test]
    fn task_response_key_format() {
        let id = Uuid::nil();
        assert_eq!(
            task_response_key(id, Role::Planner),
            "task:00000000-0000-0000-0000-000000000000:planner"
        );
    }
}
