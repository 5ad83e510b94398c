//! Transition validation, classification and record construction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use orderflow_core::{ActorId, StatusError, StatusId, WorkflowError, WorkflowResult};

use crate::definition::{StatusMetadata, WorkflowDefinition};
use crate::query::StatusQuery;

/// Outcome of checking whether a transition is currently legal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<StatusError>,
    pub metadata: ValidationMetadata,
}

/// Hints returned alongside a validation, on success as well as failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMetadata {
    /// Transitions allowed from the source status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_transitions: Option<Vec<StatusId>>,

    /// Names of the requirements evaluated for the target status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<String>>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<StatusError>, metadata: ValidationMetadata) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            metadata,
        }
    }
}

/// Direction of a transition relative to declaration order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionType {
    Forward,
    Backward,
    /// Move to the initial or cancellation status.
    Reset,
}

/// Caller-supplied options for [`TransitionManager::transition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransitionOptions {
    pub reason: String,
    pub data: Value,
    pub user_id: ActorId,
    /// Skip validation for trusted callers that already validated.
    pub skip_validation: bool,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            reason: String::new(),
            data: Value::Object(Map::new()),
            user_id: ActorId::default(),
            skip_validation: false,
        }
    }
}

impl TransitionOptions {
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_user(mut self, user_id: impl Into<ActorId>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn skip_validation(mut self) -> Self {
        self.skip_validation = true;
        self
    }
}

/// A performed move, handed to the caller to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub from: StatusId,
    pub to: StatusId,
    pub reason: String,
    pub data: Value,
    pub user_id: ActorId,
    pub timestamp: DateTime<Utc>,
}

/// Audit record to append to the document's history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub to: StatusId,
    pub reason: String,
    pub data: Value,
    pub user_id: ActorId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResult {
    pub success: bool,
    pub transition: Transition,
    pub history_entry: HistoryEntry,
    #[serde(rename = "type")]
    pub kind: TransitionType,
    pub timestamp: DateTime<Utc>,
}

/// Validates and computes status transitions over an immutable definition.
///
/// Pure: no IO, no shared mutable state. Persisting the returned records is
/// the caller's job, as is serializing concurrent transitions of the same
/// document.
#[derive(Debug, Clone)]
pub struct TransitionManager {
    query: StatusQuery,
}

impl TransitionManager {
    pub fn new(definition: Arc<WorkflowDefinition>) -> Self {
        Self {
            query: StatusQuery::new(definition),
        }
    }

    pub fn definition(&self) -> &WorkflowDefinition {
        self.query.definition()
    }

    /// Check whether moving from `from` to `to` with `data` is legal.
    ///
    /// Unknown statuses and moves outside the transition graph short-circuit
    /// with a single error. Otherwise every requirement of `to` is evaluated
    /// and all failures are reported together.
    pub fn validate_transition(&self, from: &str, to: &str, data: &Value) -> ValidationResult {
        tracing::debug!(%from, %to, "validating transition");
        let definition = self.definition();

        let Some(source) = definition.status(from) else {
            return ValidationResult::from_errors(
                vec![StatusError::invalid_status(&StatusId::new(from.to_owned()))],
                ValidationMetadata::default(),
            );
        };
        let Some(target) = definition.status(to) else {
            return ValidationResult::from_errors(
                vec![StatusError::invalid_status(&StatusId::new(to.to_owned()))],
                ValidationMetadata::default(),
            );
        };

        let allowed = self.query.get_available_transitions(from).to_vec();
        if !allowed.iter().any(|id| id == to) {
            return ValidationResult::from_errors(
                vec![StatusError::invalid_transition(source.id(), target.id())],
                ValidationMetadata {
                    allowed_transitions: Some(allowed),
                    requirements: None,
                },
            );
        }

        let requirements = target.requirements();
        let mut errors = Vec::new();
        for requirement in requirements.iter() {
            match requirement.validate(data) {
                Ok(true) => {}
                Ok(false) => errors.push(StatusError::requirements_not_met(
                    target.id(),
                    requirement.name(),
                    requirement.message(),
                )),
                Err(fault) => {
                    tracing::warn!(
                        %to,
                        requirement = requirement.name(),
                        error = %fault,
                        "requirement evaluation failed"
                    );
                    errors.push(StatusError::validation_failed(
                        target.id(),
                        requirement.name(),
                        fault.message(),
                    ));
                }
            }
        }

        ValidationResult::from_errors(
            errors,
            ValidationMetadata {
                allowed_transitions: Some(allowed),
                requirements: Some(requirements.names()),
            },
        )
    }

    /// Perform a transition, stamping records with the current time.
    pub fn transition(
        &self,
        from: &str,
        to: &str,
        options: TransitionOptions,
    ) -> WorkflowResult<TransitionResult> {
        self.transition_at(from, to, options, Utc::now())
    }

    /// Perform a transition at an explicit point in time.
    ///
    /// Unless `skip_validation` is set, a failed validation is returned as a
    /// single [`WorkflowError::TransitionRejected`] joining every message.
    pub fn transition_at(
        &self,
        from: &str,
        to: &str,
        options: TransitionOptions,
        now: DateTime<Utc>,
    ) -> WorkflowResult<TransitionResult> {
        if !options.skip_validation {
            let validation = self.validate_transition(from, to, &options.data);
            if !validation.valid {
                let err = WorkflowError::rejected(validation.errors);
                tracing::warn!(%from, %to, user_id = %options.user_id, error = %err, "transition rejected");
                return Err(err);
            }
        }

        let kind = self.get_transition_type(from, to)?;
        let from = StatusId::new(from.to_owned());
        let to = StatusId::new(to.to_owned());

        tracing::info!(
            %from,
            %to,
            user_id = %options.user_id,
            kind = ?kind,
            "transition computed"
        );

        let history_entry = HistoryEntry {
            to: to.clone(),
            reason: options.reason.clone(),
            data: options.data.clone(),
            user_id: options.user_id.clone(),
            timestamp: now,
        };
        let transition = Transition {
            from,
            to,
            reason: options.reason,
            data: options.data,
            user_id: options.user_id,
            timestamp: now,
        };

        Ok(TransitionResult {
            success: true,
            transition,
            history_entry,
            kind,
            timestamp: now,
        })
    }

    /// Classify a transition.
    ///
    /// Moves to the initial or cancellation status are always `Reset`.
    /// Anything else compares declaration positions: later is `Forward`,
    /// otherwise `Backward`. The graph is not consulted, so two statuses
    /// without a direct edge still classify.
    pub fn get_transition_type(&self, from: &str, to: &str) -> WorkflowResult<TransitionType> {
        let definition = self.definition();
        if definition.is_reset_target(to) {
            return Ok(TransitionType::Reset);
        }

        let from_ordinal = definition
            .ordinal(from)
            .ok_or_else(|| WorkflowError::InvalidStatus(StatusId::new(from.to_owned())))?;
        let to_ordinal = definition
            .ordinal(to)
            .ok_or_else(|| WorkflowError::InvalidStatus(StatusId::new(to.to_owned())))?;

        if to_ordinal > from_ordinal {
            Ok(TransitionType::Forward)
        } else {
            Ok(TransitionType::Backward)
        }
    }

    pub fn get_available_transitions(&self, id: &str) -> &[StatusId] {
        self.query.get_available_transitions(id)
    }

    pub fn is_valid_status(&self, id: &str) -> bool {
        self.query.is_valid_status(id)
    }

    pub fn get_status_metadata(&self, id: &str) -> Option<&StatusMetadata> {
        self.query.get_status_metadata(id)
    }
}
