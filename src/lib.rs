//! Crew Coordinator Library
//!
//! Coordinates a fixed pool of role-bound workers through a multi-stage
//! pipeline: worker registry, task dispatch, message routing, a shared
//! context blackboard, an artifact store and a workflow sequencer.

pub mod agents;
pub mod config;
pub mod domain;
pub mod infrastructure;
