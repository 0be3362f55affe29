use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::repositories::ArtifactRepository;

/// In-memory implementation of ArtifactRepository
#[derive(Debug, Default)]
pub struct InMemoryArtifactRepository {
    artifacts: RwLock<BTreeMap<String, Value>>,
}

impl InMemoryArtifactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactRepository for InMemoryArtifactRepository {
    async fn store(&self, name: &str, content: Value) -> Result<(), String> {
        self.artifacts.write().await.insert(name.to_string(), content);
        Ok(())
    }

    async fn retrieve(&self, name: &str) -> Result<Option<Value>, String> {
        Ok(self.artifacts.read().await.get(name).cloned())
    }

    async fn all(&self) -> Result<BTreeMap<String, Value>, String> {
        Ok(self.artifacts.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn store_and_retrieve() {
        let repo = InMemoryArtifactRepository::new();
        repo.store("design", json!({"sections": 3})).await.unwrap();

        assert_eq!(
            repo.retrieve("design").await.unwrap(),
            Some(json!({"sections": 3}))
        );
    }

    #[tokio::test]
    async fn retrieve_missing_returns_none() {
        let repo = InMemoryArtifactRepository::new();
        assert_eq!(repo.retrieve("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let repo = InMemoryArtifactRepository::new();
        repo.store("x", json!(1)).await.unwrap();
        repo.store("x", json!(2)).await.unwrap();

        assert_eq!(repo.retrieve("x").await.unwrap(), Some(json!(2)));
        assert_eq!(repo.all().await.unwrap().len(), 1);
    }
}
