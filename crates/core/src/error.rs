//! Workflow error model.
//!
//! Two layers live here:
//!
//! - [`ErrorKind`] / [`StatusError`]: the shared taxonomy carried inside
//!   validation results. Transports serialize these verbatim so callers can
//!   branch on `errors[].type`.
//! - [`WorkflowError`]: failures raised by a call itself (malformed input,
//!   rejected transitions, broken configuration).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::StatusId;

/// Result type used across the workflow layer.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Kind of a workflow-related failure.
///
/// The engine emits the first four. The remaining kinds are reserved for
/// transport and persistence collaborators so every workflow failure shares
/// one vocabulary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidStatus,
    InvalidTransition,
    RequirementsNotMet,
    ValidationFailed,
    MissingRequiredData,
    PermissionDenied,
    SystemError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidStatus => "INVALID_STATUS",
            ErrorKind::InvalidTransition => "INVALID_TRANSITION",
            ErrorKind::RequirementsNotMet => "REQUIREMENTS_NOT_MET",
            ErrorKind::ValidationFailed => "VALIDATION_FAILED",
            ErrorKind::MissingRequiredData => "MISSING_REQUIRED_DATA",
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::SystemError => "SYSTEM_ERROR",
        }
    }

    /// Structural kinds short-circuit validation; requirement kinds accumulate.
    pub fn is_structural(self) -> bool {
        matches!(self, ErrorKind::InvalidStatus | ErrorKind::InvalidTransition)
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of `ValidationResult.errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,

    /// Status the error refers to, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusId>,

    /// Requirement that produced the error, for requirement kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
}

impl StatusError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            requirement: None,
        }
    }

    pub fn invalid_status(id: &StatusId) -> Self {
        Self::new(ErrorKind::InvalidStatus, format!("invalid status: {id}"))
            .with_status(id.clone())
    }

    pub fn invalid_transition(from: &StatusId, to: &StatusId) -> Self {
        Self::new(
            ErrorKind::InvalidTransition,
            format!("cannot transition from {from} to {to}"),
        )
        .with_status(to.clone())
    }

    pub fn requirements_not_met(
        status: &StatusId,
        requirement: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::RequirementsNotMet, message)
            .with_status(status.clone())
            .with_requirement(requirement)
    }

    pub fn validation_failed(
        status: &StatusId,
        requirement: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::ValidationFailed, message)
            .with_status(status.clone())
            .with_requirement(requirement)
    }

    pub fn with_status(mut self, status: StatusId) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirement = Some(requirement.into());
        self
    }
}

impl core::fmt::Display for StatusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Failure raised by a workflow call.
///
/// A transition that is merely not allowed is *not* an error at the
/// validation layer; it is reported through `ValidationResult`. These
/// variants cover malformed calls and the aggregate failure of `transition`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// An operation was given a status id the workflow does not define.
    #[error("invalid status: {0}")]
    InvalidStatus(StatusId),

    /// `transition` was called for a move that failed validation.
    ///
    /// `message` joins every error message; `errors` keeps the structured list.
    #[error("transition rejected: {message}")]
    TransitionRejected {
        message: String,
        errors: Vec<StatusError>,
    },

    /// The workflow definition is inconsistent.
    #[error("invalid workflow definition: {0}")]
    Definition(String),

    /// The workflow configuration could not be read or parsed.
    #[error("workflow configuration error: {0}")]
    Config(String),
}

impl WorkflowError {
    /// Build the aggregate rejection from a list of validation errors.
    pub fn rejected(errors: Vec<StatusError>) -> Self {
        let message = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Self::TransitionRejected { message, errors }
    }

    pub fn definition(msg: impl Into<String>) -> Self {
        Self::Definition(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Kind to report when a collaborator needs to surface this error in the
    /// shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::InvalidStatus(_) => ErrorKind::InvalidStatus,
            WorkflowError::TransitionRejected { errors, .. } => errors
                .first()
                .map(|e| e.kind)
                .unwrap_or(ErrorKind::ValidationFailed),
            WorkflowError::Definition(_) | WorkflowError::Config(_) => ErrorKind::SystemError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorKind::RequirementsNotMet).unwrap();
        assert_eq!(json, "\"REQUIREMENTS_NOT_MET\"");
        assert_eq!(ErrorKind::MissingRequiredData.to_string(), "MISSING_REQUIRED_DATA");
    }

    #[test]
    fn status_error_uses_type_field() {
        let err = StatusError::invalid_status(&StatusId::from("NOPE"));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["type"], "INVALID_STATUS");
        assert_eq!(value["message"], "invalid status: NOPE");
        assert!(value.get("requirement").is_none());
    }

    #[test]
    fn rejected_joins_messages() {
        let status = StatusId::from("CONFIRMED");
        let err = WorkflowError::rejected(vec![
            StatusError::requirements_not_met(&status, "poNumber", "PO number is required"),
            StatusError::validation_failed(&status, "amount", "amount must be a number"),
        ]);

        assert_eq!(
            err.to_string(),
            "transition rejected: PO number is required; amount must be a number"
        );
        assert_eq!(err.kind(), ErrorKind::RequirementsNotMet);
    }

    #[test]
    fn structural_kinds() {
        assert!(ErrorKind::InvalidStatus.is_structural());
        assert!(ErrorKind::InvalidTransition.is_structural());
        assert!(!ErrorKind::ValidationFailed.is_structural());
    }
}
