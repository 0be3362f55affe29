//! Coordinator configuration
//!
//! Values come from the process environment (optionally seeded from a
//! `.env` file by the binary).

use crate::agents::errors::{AgentError, AgentResult};

pub const DEFAULT_NAME: &str = "coordinator";
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Display name of the coordinator instance
    pub name: String,
    /// Buffer size of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl CoordinatorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Reads `COORDINATOR_NAME` and `COORDINATOR_EVENT_CAPACITY`
    pub fn from_env() -> AgentResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = lookup("COORDINATOR_NAME")
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| {
                tracing::debug!("COORDINATOR_NAME not set, using default");
                DEFAULT_NAME.to_string()
            });

        let event_capacity = match lookup("COORDINATOR_EVENT_CAPACITY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    return Err(AgentError::ConfigError(format!(
                        "COORDINATOR_EVENT_CAPACITY must be a positive integer, got {:?}",
                        raw
                    )))
                }
            },
            None => DEFAULT_EVENT_CAPACITY,
        };

        Ok(Self {
            name,
            event_capacity,
        })
    }
}
