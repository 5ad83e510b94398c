//! `orderflow-workflow`: purchase order lifecycle engine.
//!
//! Validates status changes against a fixed transition graph and per-status
//! requirement predicates, classifies them, and builds the transition and
//! history records callers persist. Pure domain logic: no storage, no HTTP.

pub mod config;
pub mod definition;
pub mod manager;
pub mod purchase_order;
pub mod query;
pub mod requirement;
pub mod service;

pub use config::{RequirementConfig, StatusConfig, WorkflowConfig, load_from_env};
pub use definition::{
    DefinitionError, Status, StatusBuilder, StatusMetadata, WorkflowBuilder, WorkflowDefinition,
};
pub use manager::{
    HistoryEntry, Transition, TransitionManager, TransitionOptions, TransitionResult,
    TransitionType, ValidationMetadata, ValidationResult,
};
pub use query::StatusQuery;
pub use requirement::{
    FnRequirement, NamedRequirement, Requirement, RequirementFault, RequirementSet, Rule,
};
pub use service::StatusService;
