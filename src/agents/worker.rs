use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::context::ContextView;
use super::errors::AgentResult;
use super::messages::Mailbox;
use super::types::{AgentResponse, WorkerProfile};
use crate::domain::task::Task;

/// A role-bound worker
///
/// The coordinator only ever asks a worker who it is and to execute a task.
/// What the worker produces is entirely up to the implementation.
#[async_trait]
pub trait Worker: Send + Sync {
    fn identify(&self) -> &WorkerProfile;

    /// Execute a task. Errors are turned into a zero-confidence response by
    /// the dispatcher and never stop the remaining roles from running.
    async fn execute(&self, task: &Task, env: &WorkerEnv) -> AgentResult<AgentResponse>;
}

/// Private key-value memory belonging to one registry slot
#[derive(Debug, Clone, Default)]
pub struct WorkerMemory {
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl WorkerMemory {
    pub async fn remember(&self, key: impl Into<String>, value: Value) {
        self.entries.lock().await.insert(key.into(), value);
    }

    pub async fn recall(&self, key: &str) -> Option<Value> {
        self.entries.lock().await.get(key).cloned()
    }

    pub async fn forget(&self, key: &str) -> Option<Value> {
        self.entries.lock().await.remove(key)
    }
}

/// Everything a worker can see, created when it is registered
///
/// Re-registering a role creates a fresh environment: new mailbox, new memory.
#[derive(Debug, Clone)]
pub struct WorkerEnv {
    pub context: ContextView,
    pub mailbox: Mailbox,
    pub memory: WorkerMemory,
}

impl WorkerEnv {
    pub fn new(context: ContextView) -> Self {
        Self {
            context,
            mailbox: Mailbox::new(),
            memory: WorkerMemory::default(),
        }
    }
}

type ExecuteFn = dyn Fn(&WorkerProfile, &Task) -> AgentResult<AgentResponse> + Send + Sync;

/// Worker backed by a plain closure
///
/// # Example
/// ```
/// use crew_coordinator::agents::types::{AgentResponse, Role, WorkerProfile};
/// use crew_coordinator::agents::worker::{FnWorker, Worker};
///
/// let worker = FnWorker::new(WorkerProfile::new("Pat", Role::Planner), |profile, task| {
///     Ok(AgentResponse::new(profile.id, profile.role, format!("plan for {}", task.title()), 0.8))
/// });
///
/// assert_eq!(worker.identify().role, Role::Planner);
/// ```
pub struct FnWorker {
    profile: WorkerProfile,
    execute: Box<ExecuteFn>,
}

impl FnWorker {
    pub fn new<F>(profile: WorkerProfile, execute: F) -> Self
    where
        F: Fn(&WorkerProfile, &Task) -> AgentResult<AgentResponse> + Send + Sync + 'static,
    {
        Self {
            profile,
            execute: Box::new(execute),
        }
    }
}

impl std::fmt::Debug for FnWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnWorker")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Worker for FnWorker {
    fn identify(&self) -> &WorkerProfile {
        &self.profile
    }

    async fn execute(&self, task: &Task, _env: &WorkerEnv) -> AgentResult<AgentResponse> {
        (self.execute)(&self.profile, task)
    }
}
