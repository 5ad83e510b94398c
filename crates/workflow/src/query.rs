//! Read-only lookups over a workflow definition.
//!
//! None of these fail: unknown ids yield a neutral default (empty, `false`,
//! or a fallback string) so rendering code can degrade gracefully.

use std::sync::Arc;

use orderflow_core::StatusId;

use crate::definition::{DEFAULT_COLOR, Status, StatusMetadata, WorkflowDefinition};
use crate::requirement::RequirementSet;

static NO_REQUIREMENTS: RequirementSet = RequirementSet::new();

#[derive(Debug, Clone)]
pub struct StatusQuery {
    definition: Arc<WorkflowDefinition>,
}

impl StatusQuery {
    pub fn new(definition: Arc<WorkflowDefinition>) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    /// All statuses, in declaration order.
    pub fn get_statuses(&self) -> &[Status] {
        self.definition.statuses()
    }

    pub fn get_status(&self, id: &str) -> Option<&Status> {
        self.definition.status(id)
    }

    pub fn get_initial_status(&self) -> &StatusId {
        self.definition.initial()
    }

    pub fn is_valid_status(&self, id: &str) -> bool {
        self.definition.contains(id)
    }

    /// Statuses reachable in one step; empty for unknown or terminal statuses.
    pub fn get_available_transitions(&self, id: &str) -> &[StatusId] {
        match self.definition.status(id) {
            Some(status) if !status.metadata().is_terminal => status.allowed_transitions(),
            _ => &[],
        }
    }

    pub fn get_status_metadata(&self, id: &str) -> Option<&StatusMetadata> {
        self.definition.status(id).map(Status::metadata)
    }

    pub fn is_terminal_status(&self, id: &str) -> bool {
        self.get_status_metadata(id).is_some_and(|m| m.is_terminal)
    }

    pub fn requires_notes(&self, id: &str) -> bool {
        self.get_status_metadata(id).is_some_and(|m| m.requires_notes)
    }

    pub fn is_editable(&self, id: &str) -> bool {
        self.get_status_metadata(id).is_some_and(|m| m.editable)
    }

    pub fn get_status_color(&self, id: &str) -> &str {
        self.definition
            .status(id)
            .map_or(DEFAULT_COLOR, Status::color)
    }

    /// Display label, falling back to the raw id.
    pub fn get_status_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.definition.status(id).map_or(id, Status::label)
    }

    pub fn get_status_description(&self, id: &str) -> &str {
        self.definition.status(id).map_or("", Status::description)
    }

    pub fn get_status_requirements(&self, id: &str) -> &RequirementSet {
        self.definition
            .status(id)
            .map_or(&NO_REQUIREMENTS, Status::requirements)
    }
}
