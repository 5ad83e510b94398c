//! Declarative workflow configuration.
//!
//! Workflows are described as JSON documents:
//!
//! ```json
//! {
//!   "initial": "UPLOADED",
//!   "statuses": [
//!     { "id": "UPLOADED", "label": "Uploaded", "editable": true,
//!       "allowedTransitions": ["CONFIRMED", "CANCELLED"] },
//!     { "id": "CONFIRMED",
//!       "requirements": [
//!         { "name": "poNumber", "rule": "present", "field": "poNumber",
//!           "message": "PO number is required" }
//!       ] }
//!   ]
//! }
//! ```
//!
//! Declaration order of `statuses` is significant: it is the ordinal order
//! used to classify transitions.

use std::path::Path;

use serde::{Deserialize, Serialize};

use orderflow_core::{StatusId, WorkflowError, WorkflowResult};

use crate::definition::{DEFAULT_CANCELLED, Status, StatusBuilder, WorkflowDefinition};
use crate::requirement::Rule;

/// Environment variable naming the workflow file to load.
pub const WORKFLOW_PATH_ENV: &str = "ORDERFLOW_WORKFLOW";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    pub initial: String,

    #[serde(default = "default_cancelled")]
    pub cancelled: String,

    pub statuses: Vec<StatusConfig>,
}

fn default_cancelled() -> String {
    DEFAULT_CANCELLED.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusConfig {
    pub id: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub is_terminal: bool,

    #[serde(default)]
    pub requires_notes: bool,

    #[serde(default)]
    pub editable: bool,

    #[serde(default)]
    pub allowed_transitions: Vec<String>,

    #[serde(default)]
    pub requirements: Vec<RequirementConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementConfig {
    pub name: String,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(flatten)]
    pub rule: Rule,
}

impl WorkflowConfig {
    pub fn from_json_str(json: &str) -> WorkflowResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| WorkflowError::config(format!("invalid workflow document: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> WorkflowResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WorkflowError::config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&contents)
    }

    /// Build and check the definition this configuration describes.
    pub fn into_definition(self) -> WorkflowResult<WorkflowDefinition> {
        let mut builder = WorkflowDefinition::builder(self.initial).cancelled(self.cancelled);
        for status in self.statuses {
            builder = builder.status(status.into_builder());
        }
        Ok(builder.build()?)
    }
}

impl StatusConfig {
    fn into_builder(self) -> StatusBuilder {
        let mut builder = Status::builder(StatusId::from(self.id))
            .description(self.description)
            .terminal(self.is_terminal)
            .requires_notes(self.requires_notes)
            .editable(self.editable)
            .transitions(self.allowed_transitions);

        if let Some(label) = self.label {
            builder = builder.label(label);
        }
        if let Some(color) = self.color {
            builder = builder.color(color);
        }
        for requirement in self.requirements {
            builder = builder.rule(requirement.name, requirement.message, requirement.rule);
        }
        builder
    }
}

/// Load the workflow named by `ORDERFLOW_WORKFLOW`, or the built-in purchase
/// order workflow when the variable is unset.
pub fn load_from_env() -> WorkflowResult<WorkflowDefinition> {
    match std::env::var(WORKFLOW_PATH_ENV) {
        Ok(path) if !path.is_empty() => {
            tracing::info!(%path, "loading workflow definition");
            WorkflowConfig::from_path(&path)?.into_definition()
        }
        _ => {
            tracing::warn!("{WORKFLOW_PATH_ENV} not set; using built-in purchase order workflow");
            crate::purchase_order::definition()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MINIMAL: &str = r#"{
        "initial": "OPEN",
        "statuses": [
            { "id": "OPEN", "allowedTransitions": ["CLOSED", "CANCELLED"] },
            { "id": "CLOSED", "isTerminal": true,
              "requirements": [
                  { "name": "closer", "rule": "non_empty", "field": "closer" },
                  { "name": "score", "rule": "min_number", "field": "review.score", "min": 3,
                    "message": "score too low" }
              ] },
            { "id": "CANCELLED", "isTerminal": true, "requiresNotes": true, "color": "red" }
        ]
    }"#;

    #[test]
    fn parses_with_defaults() {
        let config = WorkflowConfig::from_json_str(MINIMAL).unwrap();
        assert_eq!(config.cancelled, "CANCELLED");
        assert_eq!(config.statuses[0].label, None);
        assert!(!config.statuses[0].editable);
        assert_eq!(
            config.statuses[1].requirements[1].rule,
            Rule::MinNumber {
                field: "review.score".into(),
                min: 3.0
            }
        );
    }

    #[test]
    fn builds_definition_in_declaration_order() {
        let def = WorkflowConfig::from_json_str(MINIMAL)
            .unwrap()
            .into_definition()
            .unwrap();

        let ids: Vec<_> = def.statuses().iter().map(|s| s.id().as_str()).collect();
        assert_eq!(ids, vec!["OPEN", "CLOSED", "CANCELLED"]);

        let closed = def.status("CLOSED").unwrap();
        assert_eq!(closed.label(), "CLOSED");
        assert_eq!(closed.requirements().names(), vec!["closer".to_string(), "score".to_string()]);
        assert_eq!(closed.requirements().get("score").unwrap().message(), "score too low");
        assert_eq!(def.status("CANCELLED").unwrap().color(), "red");
    }

    #[test]
    fn custom_cancellation_id() {
        let config: WorkflowConfig = serde_json::from_value(json!({
            "initial": "A",
            "cancelled": "ABORTED",
            "statuses": [
                { "id": "A", "allowedTransitions": ["ABORTED"] },
                { "id": "ABORTED", "isTerminal": true }
            ]
        }))
        .unwrap();
        let def = config.into_definition().unwrap();
        assert!(def.is_reset_target("ABORTED"));
        assert!(!def.is_reset_target("CANCELLED"));
    }

    #[test]
    fn malformed_documents_are_config_errors() {
        let err = WorkflowConfig::from_json_str("{ \"initial\": 1 }").unwrap_err();
        assert!(matches!(err, WorkflowError::Config(_)));

        let err = WorkflowConfig::from_json_str(
            r#"{ "initial": "A", "statuses": [
                { "id": "A", "requirements": [ { "name": "x", "rule": "telepathy", "field": "x" } ] }
            ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Config(_)));
    }

    #[test]
    fn inconsistent_workflows_are_definition_errors() {
        let err = WorkflowConfig::from_json_str(
            r#"{ "initial": "A", "statuses": [ { "id": "A", "allowedTransitions": ["B"] } ] }"#,
        )
        .unwrap()
        .into_definition()
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Definition(msg) if msg.contains("undeclared status B")));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = WorkflowConfig::from_path("/nonexistent/orderflow/workflow.json").unwrap_err();
        assert!(matches!(err, WorkflowError::Config(msg) if msg.contains("workflow.json")));
    }
}
