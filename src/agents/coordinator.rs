use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::cancel::CancelSignal;
use super::context::{task_response_key, ContextView, SharedContext};
use super::errors::{AgentError, AgentResult};
use super::events::{CoordinatorEvent, EventBus};
use super::messages::{Mailbox, Message, MessageRouter};
use super::registry::WorkerRegistry;
use super::state::CoordinatorState;
use super::types::{AgentResponse, Role, WorkerProfile};
use super::worker::{Worker, WorkerEnv};
use crate::config::CoordinatorConfig;
use crate::domain::repositories::{ArtifactRepository, TaskRepository};
use crate::domain::task::{Priority, Task, TaskStatus};
use crate::infrastructure::repositories::{InMemoryArtifactRepository, InMemoryTaskRepository};

/// Owns the worker registry, task collections, message router, shared
/// context and artifact store, and dispatches tasks to workers
///
/// Every piece of state is mutated only through these methods. Workers get
/// a read-only view of the shared context and contribute only through the
/// responses they return.
pub struct Coordinator {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    registry: WorkerRegistry,
    router: MessageRouter,
    context: SharedContext,
    tasks: Arc<dyn TaskRepository>,
    artifacts: Arc<dyn ArtifactRepository>,
    events: EventBus,
}

impl Coordinator {
    /// Create a coordinator backed by in-memory repositories
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_repositories(
            config,
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(InMemoryArtifactRepository::new()),
        )
    }

    pub fn with_repositories(
        config: CoordinatorConfig,
        tasks: Arc<dyn TaskRepository>,
        artifacts: Arc<dyn ArtifactRepository>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: config.name,
            created_at: Utc::now(),
            registry: WorkerRegistry::new(),
            router: MessageRouter::new(),
            context: SharedContext::new(),
            tasks,
            artifacts,
            events: EventBus::new(config.event_capacity),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.events.subscribe()
    }

    pub(crate) fn publish(&self, event: CoordinatorEvent) {
        self.events.publish(event);
    }

    // ===== Worker registry =====

    /// Register a worker under its declared role
    ///
    /// An existing worker for the same role is replaced without error and
    /// returned. The new worker gets a fresh mailbox and memory.
    pub async fn register_worker(&self, worker: Arc<dyn Worker>) -> Option<Arc<dyn Worker>> {
        let profile = worker.identify().clone();
        let env = WorkerEnv::new(self.context.view());
        let replaced = self.registry.register(worker, env).await;

        match &replaced {
            Some(previous) => warn!(
                role = %profile.role,
                previous = %previous.identify().id,
                worker_id = %profile.id,
                "Replacing registered worker"
            ),
            None => info!(
                role = %profile.role,
                worker_id = %profile.id,
                name = %profile.display_name,
                "Worker registered"
            ),
        }

        self.publish(CoordinatorEvent::WorkerRegistered {
            worker_id: profile.id,
            role: profile.role,
            replaced: replaced.is_some(),
        });

        replaced
    }

    pub async fn get_worker(&self, role: Role) -> Option<Arc<dyn Worker>> {
        self.registry.lookup(role).await
    }

    /// Like [`Coordinator::get_worker`], but absence is an error
    pub async fn require_worker(&self, role: Role) -> AgentResult<Arc<dyn Worker>> {
        self.get_worker(role)
            .await
            .ok_or(AgentError::AgentNotRegistered(role))
    }

    /// Profiles of all registered workers, in registration order
    pub async fn list_workers(&self) -> Vec<WorkerProfile> {
        self.registry.profiles().await
    }

    pub async fn mailbox(&self, role: Role) -> Option<Mailbox> {
        self.registry.mailbox(role).await
    }

    // ===== Task dispatch =====

    /// Create a pending task and add it to the pending collection
    pub async fn create_task(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        roles: Vec<Role>,
        priority: Priority,
    ) -> AgentResult<Task> {
        let task = Task::new(title, description, roles, priority);
        self.tasks
            .add_pending(&task)
            .await
            .map_err(AgentError::Repository)?;

        info!(task_id = %task.id(), title = %task.title(), "Task created");
        self.publish(CoordinatorEvent::TaskCreated {
            task_id: task.id(),
            title: task.title().to_string(),
        });

        Ok(task)
    }

    /// Dispatch a task to each assigned role in order
    ///
    /// Worker failures become zero-confidence responses and never abort the
    /// remaining roles. Unregistered roles produce no response. The task ends
    /// up `Completed` regardless of how many workers failed.
    pub async fn execute_task(&self, task: &mut Task) -> AgentResult<Vec<AgentResponse>> {
        self.execute_task_with_cancel(task, &CancelSignal::new()).await
    }

    /// [`Coordinator::execute_task`] that checks `cancel` before each role
    ///
    /// On cancellation the task returns to the status it had before the call,
    /// the partial responses are dropped, and context writes already made stay.
    pub async fn execute_task_with_cancel(
        &self,
        task: &mut Task,
        cancel: &CancelSignal,
    ) -> AgentResult<Vec<AgentResponse>> {
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        let snapshot = task.clone();
        let from = task.status();
        task.start()
            .map_err(|_| invalid_transition(from, TaskStatus::InProgress))?;
        self.tasks
            .update_pending(task)
            .await
            .map_err(AgentError::Repository)?;

        debug!(task_id = %task.id(), roles = task.assigned_roles().len(), "Dispatching task");

        let roles = task.assigned_roles().to_vec();
        let mut responses = Vec::with_capacity(roles.len());

        for role in roles {
            if cancel.is_cancelled() {
                self.abandon(task, snapshot).await?;
                return Err(AgentError::Cancelled);
            }

            let Some((worker, env)) = self.registry.entry(role).await else {
                warn!(task_id = %task.id(), role = %role, "AgentNotRegistered: skipping role");
                continue;
            };

            debug!(task_id = %task.id(), role = %role, worker_id = %worker.identify().id, "Invoking worker");

            match worker.execute(task, &env).await {
                Ok(response) => {
                    if response.role != role {
                        warn!(
                            task_id = %task.id(),
                            role = %role,
                            reported = %response.role,
                            "Worker reported a different role, keeping the dispatched one"
                        );
                    }
                    let response = response.normalized(role, task.id());
                    self.context
                        .update(task_response_key(task.id(), role), serde_json::to_value(&response)?)
                        .await;
                    responses.push(response);
                }
                Err(err) => {
                    warn!(
                        task_id = %task.id(),
                        role = %role,
                        error = %err,
                        "Worker execution failed"
                    );
                    responses.push(AgentResponse::failed(
                        worker.identify().id,
                        role,
                        task.id(),
                        err.describe(),
                    ));
                }
            }
        }

        task.complete(serde_json::to_value(&responses)?)
            .map_err(|_| invalid_transition(TaskStatus::InProgress, TaskStatus::Completed))?;
        self.tasks
            .complete(task)
            .await
            .map_err(AgentError::Repository)?;

        let failures = responses.iter().filter(|r| r.is_failure()).count();
        info!(
            task_id = %task.id(),
            responses = responses.len(),
            failures,
            "Task completed"
        );
        self.publish(CoordinatorEvent::TaskCompleted {
            task_id: task.id(),
            responses: responses.len(),
            failures,
        });

        Ok(responses)
    }

    async fn abandon(&self, task: &mut Task, snapshot: Task) -> AgentResult<()> {
        if snapshot.status() == TaskStatus::Completed {
            *task = snapshot;
        } else {
            task.revert_to_pending()
                .map_err(|_| invalid_transition(TaskStatus::InProgress, TaskStatus::Pending))?;
            self.tasks
                .update_pending(task)
                .await
                .map_err(AgentError::Repository)?;
        }
        info!(task_id = %task.id(), status = %task.status(), "Task dispatch cancelled");
        Ok(())
    }

    pub async fn pending_tasks(&self) -> AgentResult<Vec<Task>> {
        self.tasks.pending().await.map_err(AgentError::Repository)
    }

    pub async fn completed_tasks(&self) -> AgentResult<Vec<Task>> {
        self.tasks.completed().await.map_err(AgentError::Repository)
    }

    pub async fn find_task(&self, id: Uuid) -> AgentResult<Option<Task>> {
        self.tasks.find_by_id(id).await.map_err(AgentError::Repository)
    }

    // ===== Messaging =====

    /// Record a message and deliver it to every registered recipient
    ///
    /// Returns the roles that received it.
    pub async fn route_message(&self, message: Message) -> Vec<Role> {
        let message_id = message.id;
        let delivered = self.router.route(message, &self.registry).await;
        self.publish(CoordinatorEvent::MessageRouted {
            message_id,
            delivered: delivered.clone(),
        });
        delivered
    }

    pub async fn message_history(&self) -> Vec<Message> {
        self.router.history().await
    }

    // ===== Shared context =====

    pub async fn update_shared_context(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        debug!(key = %key, "Shared context updated");
        self.context.update(key, value).await;
    }

    pub async fn get_shared_context_value(&self, key: &str) -> Option<Value> {
        self.context.get(key).await
    }

    /// Read-only view of the shared context
    pub fn shared_context(&self) -> ContextView {
        self.context.view()
    }

    // ===== Artifacts =====

    pub async fn store_artifact(&self, name: &str, content: Value) -> AgentResult<()> {
        self.artifacts
            .store(name, content)
            .await
            .map_err(AgentError::Repository)?;
        info!(artifact = %name, "Artifact stored");
        Ok(())
    }

    pub async fn get_artifact(&self, name: &str) -> AgentResult<Option<Value>> {
        self.artifacts
            .retrieve(name)
            .await
            .map_err(AgentError::Repository)
    }

    // ===== Reporting =====

    pub async fn get_aggregate_state(&self) -> AgentResult<CoordinatorState> {
        Ok(CoordinatorState {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at,
            workers: self.list_workers().await,
            completed_tasks: self.completed_tasks().await?,
            pending_tasks: self.pending_tasks().await?,
            message_history: self.message_history().await,
            artifacts: self.artifacts.all().await.map_err(AgentError::Repository)?,
        })
    }

    pub async fn generate_status_report(&self) -> AgentResult<String> {
        Ok(self.get_aggregate_state().await?.status_report())
    }
}

fn invalid_transition(from: TaskStatus, to: TaskStatus) -> AgentError {
    AgentError::InvalidStateTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}
