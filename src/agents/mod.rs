// Agent coordination modules
//
// Worker registry, task dispatch, message routing, the shared context
// blackboard and the workflow sequencer that drives them.

pub mod cancel;
pub mod context;
pub mod coordinator;
pub mod errors;
pub mod events;
pub mod messages;
pub mod registry;
pub mod sequencer;
pub mod state;
pub mod types;
pub mod worker;

// Re-export main types
pub use cancel::CancelSignal;
pub use coordinator::Coordinator;
pub use errors::{AgentError, AgentResult};
pub use messages::{Mailbox, Message};
pub use sequencer::{CriteriaDeclared, Sequencer, StageVerdict, StageVerifier, WorkflowResults};
pub use types::{AgentResponse, Role, WorkerProfile};
pub use worker::{FnWorker, Worker, WorkerEnv};
