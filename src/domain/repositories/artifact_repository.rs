use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// Repository trait for named deliverables
///
/// Last write wins. There is no versioning and no delete.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Store content under a name, replacing whatever was there
    async fn store(&self, name: &str, content: Value) -> Result<(), String>;

    /// Retrieve content by name
    async fn retrieve(&self, name: &str) -> Result<Option<Value>, String>;

    /// All artifacts keyed by name
    async fn all(&self) -> Result<BTreeMap<String, Value>, String>;
}
