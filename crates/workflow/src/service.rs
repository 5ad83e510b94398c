//! Single entry point for collaborators (transport, persistence).

use std::sync::Arc;

use serde_json::Value;

use orderflow_core::{StatusId, WorkflowResult};

use crate::definition::{Status, StatusMetadata, WorkflowDefinition};
use crate::manager::{
    TransitionManager, TransitionOptions, TransitionResult, TransitionType, ValidationResult,
};
use crate::query::StatusQuery;
use crate::requirement::RequirementSet;

/// Composes [`StatusQuery`] and [`TransitionManager`] over one shared
/// definition. Cloning is cheap; clones share the definition.
#[derive(Debug, Clone)]
pub struct StatusService {
    query: StatusQuery,
    manager: TransitionManager,
}

impl StatusService {
    pub fn new(definition: Arc<WorkflowDefinition>) -> Self {
        Self {
            query: StatusQuery::new(Arc::clone(&definition)),
            manager: TransitionManager::new(definition),
        }
    }

    pub fn from_definition(definition: WorkflowDefinition) -> Self {
        Self::new(Arc::new(definition))
    }

    pub fn query(&self) -> &StatusQuery {
        &self.query
    }

    pub fn manager(&self) -> &TransitionManager {
        &self.manager
    }

    pub fn get_statuses(&self) -> &[Status] {
        self.query.get_statuses()
    }

    pub fn get_status(&self, id: &str) -> Option<&Status> {
        self.query.get_status(id)
    }

    pub fn get_initial_status(&self) -> &StatusId {
        self.query.get_initial_status()
    }

    pub fn is_valid_status(&self, id: &str) -> bool {
        self.query.is_valid_status(id)
    }

    pub fn get_available_transitions(&self, id: &str) -> &[StatusId] {
        self.query.get_available_transitions(id)
    }

    pub fn get_status_metadata(&self, id: &str) -> Option<&StatusMetadata> {
        self.query.get_status_metadata(id)
    }

    pub fn is_terminal_status(&self, id: &str) -> bool {
        self.query.is_terminal_status(id)
    }

    pub fn requires_notes(&self, id: &str) -> bool {
        self.query.requires_notes(id)
    }

    pub fn is_editable(&self, id: &str) -> bool {
        self.query.is_editable(id)
    }

    pub fn get_status_color(&self, id: &str) -> &str {
        self.query.get_status_color(id)
    }

    pub fn get_status_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.query.get_status_label(id)
    }

    pub fn get_status_description(&self, id: &str) -> &str {
        self.query.get_status_description(id)
    }

    pub fn get_status_requirements(&self, id: &str) -> &RequirementSet {
        self.query.get_status_requirements(id)
    }

    pub fn validate_transition(&self, from: &str, to: &str, data: &Value) -> ValidationResult {
        self.manager.validate_transition(from, to, data)
    }

    pub fn transition(
        &self,
        from: &str,
        to: &str,
        options: TransitionOptions,
    ) -> WorkflowResult<TransitionResult> {
        self.manager.transition(from, to, options)
    }

    pub fn get_transition_type(&self, from: &str, to: &str) -> WorkflowResult<TransitionType> {
        self.manager.get_transition_type(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> StatusService {
        let definition = WorkflowDefinition::builder("NEW")
            .status(Status::builder("NEW").label("New").transitions(["DONE", "CANCELLED"]))
            .status(Status::builder("DONE").terminal(true).color("green"))
            .status(Status::builder("CANCELLED").terminal(true))
            .build()
            .unwrap();
        StatusService::from_definition(definition)
    }

    #[test]
    fn delegates_queries() {
        let s = service();
        assert_eq!(s.get_statuses().len(), 3);
        assert_eq!(s.get_initial_status(), "NEW");
        assert_eq!(s.get_status_label("NEW"), "New");
        assert_eq!(s.get_status_color("DONE"), "green");
        assert!(s.is_terminal_status("DONE"));
        assert!(!s.is_editable("DONE"));
        assert_eq!(s.get_available_transitions("NEW").len(), 2);
    }

    #[test]
    fn delegates_transitions() {
        let s = service();
        assert!(s.validate_transition("NEW", "DONE", &json!({})).valid);
        assert_eq!(s.get_transition_type("NEW", "DONE").unwrap(), TransitionType::Forward);

        let result = s.transition("NEW", "CANCELLED", TransitionOptions::default()).unwrap();
        assert_eq!(result.kind, TransitionType::Reset);
    }

    #[test]
    fn clones_share_the_definition() {
        let s = service();
        let clone = s.clone();
        assert!(std::ptr::eq(s.query().definition(), clone.manager().definition()));
    }
}
