use std::sync::Arc;
use tokio::sync::RwLock;

use super::messages::Mailbox;
use super::types::{Role, WorkerProfile};
use super::worker::{Worker, WorkerEnv};

struct Slot {
    role: Role,
    worker: Arc<dyn Worker>,
    env: WorkerEnv,
}

/// Maps each role to the one worker currently serving it
///
/// Slots are kept in registration order. Registering a worker for an
/// occupied role replaces the occupant in place (last write wins).
#[derive(Default)]
pub struct WorkerRegistry {
    slots: RwLock<Vec<Slot>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the worker under its declared role, returning the worker it replaced
    pub async fn register(&self, worker: Arc<dyn Worker>, env: WorkerEnv) -> Option<Arc<dyn Worker>> {
        let role = worker.identify().role;
        let mut slots = self.slots.write().await;

        match slots.iter_mut().find(|slot| slot.role == role) {
            Some(slot) => {
                let previous = std::mem::replace(&mut slot.worker, worker);
                slot.env = env;
                Some(previous)
            }
            None => {
                slots.push(Slot { role, worker, env });
                None
            }
        }
    }

    pub async fn lookup(&self, role: Role) -> Option<Arc<dyn Worker>> {
        self.slots
            .read()
            .await
            .iter()
            .find(|slot| slot.role == role)
            .map(|slot| Arc::clone(&slot.worker))
    }

    /// Worker and its environment, cloned out so no lock outlives the call
    pub async fn entry(&self, role: Role) -> Option<(Arc<dyn Worker>, WorkerEnv)> {
        self.slots
            .read()
            .await
            .iter()
            .find(|slot| slot.role == role)
            .map(|slot| (Arc::clone(&slot.worker), slot.env.clone()))
    }

    pub async fn mailbox(&self, role: Role) -> Option<Mailbox> {
        self.slots
            .read()
            .await
            .iter()
            .find(|slot| slot.role == role)
            .map(|slot| slot.env.mailbox.clone())
    }

    /// Every registered worker, in registration order
    pub async fn list_all(&self) -> Vec<Arc<dyn Worker>> {
        self.slots
            .read()
            .await
            .iter()
            .map(|slot| Arc::clone(&slot.worker))
            .collect()
    }

    pub async fn profiles(&self) -> Vec<WorkerProfile> {
        self.slots
            .read()
            .await
            .iter()
            .map(|slot| slot.worker.identify().clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}
