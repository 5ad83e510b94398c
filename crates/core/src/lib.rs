//! `orderflow-core`: shared workflow primitives.
//!
//! This crate contains **pure domain** types (no IO, no configuration loading):
//! identifiers and the error taxonomy every workflow collaborator shares.

pub mod error;
pub mod id;

pub use error::{ErrorKind, StatusError, WorkflowError, WorkflowResult};
pub use id::{ActorId, StatusId};
