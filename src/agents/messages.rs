// Agent message passing
//
// Messages are addressed by role. The router appends each message to a
// global history and drops a copy into the mailbox of every registered
// recipient. Delivery is synchronous, unacknowledged and never retried.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use super::registry::WorkerRegistry;
use super::types::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Role,
    pub recipients: Vec<Role>,
    pub subject: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Message {
    /// Creates a message; duplicate recipients are collapsed, first occurrence kept
    pub fn new(
        sender: Role,
        recipients: Vec<Role>,
        subject: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            recipients: unique_roles(recipients),
            subject: subject.into(),
            content: content.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

fn unique_roles(roles: Vec<Role>) -> Vec<Role> {
    let mut unique = Vec::with_capacity(roles.len());
    for role in roles {
        if !unique.contains(&role) {
            unique.push(role);
        }
    }
    unique
}

/// A worker's FIFO inbound queue
///
/// Cloning yields another handle to the same queue.
#[derive(Debug, Clone, Default)]
pub struct Mailbox {
    queue: Arc<Mutex<VecDeque<Message>>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn deliver(&self, message: Message) {
        self.queue.lock().await.push_back(message);
    }

    /// Removes and returns every queued message, oldest first
    pub async fn drain(&self) -> Vec<Message> {
        self.queue.lock().await.drain(..).collect()
    }

    /// Copies of the queued messages without consuming them
    pub async fn peek(&self) -> Vec<Message> {
        self.queue.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.lock().await.is_empty()
    }
}

/// Routes messages to worker mailboxes and keeps the global history
#[derive(Debug, Default)]
pub struct MessageRouter {
    history: RwLock<Vec<Message>>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the message and delivers it to every registered recipient
    ///
    /// Returns the roles that actually received it. The history lock is held
    /// for the whole call, so history order and per-mailbox order agree.
    /// Repeated recipients are collapsed before recording, however the
    /// message was built.
    pub async fn route(&self, mut message: Message, registry: &WorkerRegistry) -> Vec<Role> {
        message.recipients = unique_roles(std::mem::take(&mut message.recipients));

        let mut history = self.history.write().await;
        history.push(message.clone());

        let mut delivered = Vec::with_capacity(message.recipients.len());
        for role in &message.recipients {
            match registry.mailbox(*role).await {
                Some(mailbox) => {
                    mailbox.deliver(message.clone()).await;
                    delivered.push(*role);
                }
                None => {
                    warn!(
                        message_id = %message.id,
                        recipient = %role,
                        "No worker registered for recipient, skipping delivery"
                    );
                }
            }
        }

        debug!(
            message_id = %message.id,
            sender = %message.sender,
            subject = %message.subject,
            delivered = delivered.len(),
            "Message routed"
        );

        delivered
    }

    /// Every routed message in send order
    pub async fn history(&self) -> Vec<Message> {
        self.history.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.history.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_recipients_are_collapsed() {
        let message = Message::new(
            Role::Planner,
            vec![Role::Verifier, Role::Architect, Role::Verifier],
            "s",
            "c",
        );

        assert_eq!(message.recipients, vec![Role::Verifier, Role::Architect]);
    }

    #[tokio::test]
    async fn mailbox_is_fifo_and_drain_clears() {
        let mailbox = Mailbox::new();
        let first = Message::new(Role::Planner, vec![Role::Verifier], "1", "");
        let second = Message::new(Role::Planner, vec![Role::Verifier], "2", "");
        mailbox.deliver(first.clone()).await;
        mailbox.deliver(second.clone()).await;

        assert_eq!(mailbox.peek().await.len(), 2);
        assert_eq!(mailbox.drain().await, vec![first, second]);
        assert!(mailbox.is_empty().await);
    }

    #[tokio::test]
    async fn cloned_mailbox_shares_queue() {
        let mailbox = Mailbox::new();
        let handle = mailbox.clone();
        mailbox
            .deliver(Message::new(Role::Planner, vec![], "s", ""))
            .await;

        assert_eq!(handle.len().await, 1);
    }

    #[tokio::test]
    async fn unregistered_recipients_still_recorded_in_history() {
        let router = MessageRouter::new();
        let registry = WorkerRegistry::new();
        let message = Message::new(Role::Planner, vec![Role::Verifier], "s", "c");

        let delivered = router.route(message.clone(), &registry).await;

        assert!(delivered.is_empty());
        assert_eq!(router.history().await, vec![message]);
    }

    #[tokio::test]
    async fn route_collapses_recipients_of_literal_messages() {
        use crate::agents::context::SharedContext;
        use crate::agents::types::{AgentResponse, WorkerProfile};
        use crate::agents::worker::{FnWorker, WorkerEnv};

        let router = MessageRouter::new();
        let registry = WorkerRegistry::new();
        let env = WorkerEnv::new(SharedContext::new().view());
        let inbox = env.mailbox.clone();
        registry
            .register(
                std::sync::Arc::new(FnWorker::new(
                    WorkerProfile::new("Vic", Role::Verifier),
                    |p, t| Ok(AgentResponse::new(p.id, p.role, t.title(), 0.5)),
                )),
                env,
            )
            .await;

        let mut message = Message::new(Role::Planner, vec![Role::Verifier], "s", "c");
        message.recipients = vec![Role::Verifier, Role::Verifier];

        let delivered = router.route(message, &registry).await;

        assert_eq!(delivered, vec![Role::Verifier]);
        assert_eq!(inbox.len().await, 1);
        assert_eq!(router.history().await[0].recipients, vec![Role::Verifier]);
    }
}
