//! Workflow definition: statuses, their metadata and the transition graph.
//!
//! A [`WorkflowDefinition`] is built once (from configuration or the builder)
//! and never mutated afterwards. Construction checks the structural
//! invariants so inconsistent workflows fail at startup, not per request.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use orderflow_core::{StatusId, WorkflowError};

use crate::requirement::{NamedRequirement, Requirement, RequirementSet, Rule};

/// Identifier reserved for cancellation unless a definition overrides it.
pub const DEFAULT_CANCELLED: &str = "CANCELLED";

/// Display color used when a status does not configure one.
pub const DEFAULT_COLOR: &str = "gray";

/// Structural problem detected while building a workflow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("workflow declares no statuses")]
    Empty,

    #[error("status {0} is declared more than once")]
    DuplicateStatus(StatusId),

    #[error("initial status {0} is not declared")]
    UnknownInitial(StatusId),

    #[error("status {from} allows a transition to undeclared status {to}")]
    DanglingTransition { from: StatusId, to: StatusId },

    #[error("terminal status {0} declares outgoing transitions")]
    TerminalWithTransitions(StatusId),

    #[error("status {0} is not reachable from the initial status")]
    Unreachable(StatusId),

    #[error("status {status} registers requirement {name} more than once")]
    DuplicateRequirement { status: StatusId, name: String },
}

impl From<DefinitionError> for WorkflowError {
    fn from(value: DefinitionError) -> Self {
        WorkflowError::definition(value.to_string())
    }
}

/// Behavioural flags of a status.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMetadata {
    pub is_terminal: bool,
    pub requires_notes: bool,
    pub editable: bool,
}

/// A named state in the order lifecycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    id: StatusId,
    label: String,
    description: String,
    color: String,
    metadata: StatusMetadata,
    requirements: RequirementSet,
    allowed_transitions: Vec<StatusId>,
}

impl Status {
    pub fn builder(id: impl Into<StatusId>) -> StatusBuilder {
        StatusBuilder::new(id)
    }

    pub fn id(&self) -> &StatusId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn metadata(&self) -> &StatusMetadata {
        &self.metadata
    }

    pub fn requirements(&self) -> &RequirementSet {
        &self.requirements
    }

    pub fn allowed_transitions(&self) -> &[StatusId] {
        &self.allowed_transitions
    }

    pub fn allows(&self, to: &str) -> bool {
        self.allowed_transitions.iter().any(|t| t == to)
    }
}

/// Builder for a single [`Status`].
#[derive(Debug)]
pub struct StatusBuilder {
    id: StatusId,
    label: Option<String>,
    description: String,
    color: Option<String>,
    metadata: StatusMetadata,
    requirements: Vec<NamedRequirement>,
    allowed_transitions: Vec<StatusId>,
}

impl StatusBuilder {
    pub fn new(id: impl Into<StatusId>) -> Self {
        Self {
            id: id.into(),
            label: None,
            description: String::new(),
            color: None,
            metadata: StatusMetadata::default(),
            requirements: Vec::new(),
            allowed_transitions: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn terminal(mut self, is_terminal: bool) -> Self {
        self.metadata.is_terminal = is_terminal;
        self
    }

    pub fn requires_notes(mut self, requires_notes: bool) -> Self {
        self.metadata.requires_notes = requires_notes;
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.metadata.editable = editable;
        self
    }

    pub fn transition(mut self, to: impl Into<StatusId>) -> Self {
        self.allowed_transitions.push(to.into());
        self
    }

    pub fn transitions<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<StatusId>,
    {
        self.allowed_transitions
            .extend(targets.into_iter().map(Into::into));
        self
    }

    /// Register a predicate gating entry into this status.
    pub fn requirement(
        mut self,
        name: impl Into<String>,
        message: Option<String>,
        predicate: impl Requirement + 'static,
    ) -> Self {
        self.requirements
            .push(NamedRequirement::new(name, message, Arc::new(predicate)));
        self
    }

    /// Register a declarative rule gating entry into this status.
    pub fn rule(self, name: impl Into<String>, message: Option<String>, rule: Rule) -> Self {
        self.requirement(name, message, rule)
    }

    pub fn build(self) -> Result<Status, DefinitionError> {
        let mut requirements = RequirementSet::new();
        for requirement in self.requirements {
            let name = requirement.name().to_string();
            if !requirements.insert(requirement) {
                return Err(DefinitionError::DuplicateRequirement {
                    status: self.id,
                    name,
                });
            }
        }

        let mut allowed_transitions: Vec<StatusId> = Vec::with_capacity(self.allowed_transitions.len());
        for target in self.allowed_transitions {
            if !allowed_transitions.contains(&target) {
                allowed_transitions.push(target);
            }
        }

        Ok(Status {
            label: self.label.unwrap_or_else(|| self.id.to_string()),
            id: self.id,
            description: self.description,
            color: self.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            metadata: self.metadata,
            requirements,
            allowed_transitions,
        })
    }
}

/// The full workflow: statuses in declaration order, the initial status and
/// the cancellation status.
///
/// Declaration order is the total order used to classify transitions as
/// forward or backward. It is independent of the transition graph.
#[derive(Debug, Clone)]
pub struct WorkflowDefinition {
    initial: StatusId,
    cancelled: StatusId,
    statuses: Vec<Status>,
    index: HashMap<StatusId, usize>,
}

impl WorkflowDefinition {
    pub fn builder(initial: impl Into<StatusId>) -> WorkflowBuilder {
        WorkflowBuilder::new(initial)
    }

    /// Assemble and check a workflow.
    ///
    /// Fails when `initial` is undeclared, a status is declared twice, a
    /// transition targets an undeclared status, a terminal status has
    /// outgoing transitions, or a non-terminal status other than the
    /// cancellation status cannot be reached from `initial`.
    pub fn new(
        initial: StatusId,
        cancelled: StatusId,
        statuses: Vec<Status>,
    ) -> Result<Self, DefinitionError> {
        if statuses.is_empty() {
            return Err(DefinitionError::Empty);
        }

        let mut index = HashMap::with_capacity(statuses.len());
        for (ordinal, status) in statuses.iter().enumerate() {
            if index.insert(status.id.clone(), ordinal).is_some() {
                return Err(DefinitionError::DuplicateStatus(status.id.clone()));
            }
        }

        if !index.contains_key(&initial) {
            return Err(DefinitionError::UnknownInitial(initial));
        }

        for status in &statuses {
            if status.metadata.is_terminal && !status.allowed_transitions.is_empty() {
                return Err(DefinitionError::TerminalWithTransitions(status.id.clone()));
            }
            if let Some(to) = status
                .allowed_transitions
                .iter()
                .find(|to| !index.contains_key(*to))
            {
                return Err(DefinitionError::DanglingTransition {
                    from: status.id.clone(),
                    to: to.clone(),
                });
            }
        }

        let reachable = reachable_from(&statuses, &index, &initial);
        if let Some(status) = statuses.iter().find(|s| {
            let sink = s.metadata.is_terminal
                || (s.id == cancelled && s.allowed_transitions.is_empty());
            !reachable.contains(&s.id) && !sink
        }) {
            return Err(DefinitionError::Unreachable(status.id.clone()));
        }

        Ok(Self {
            initial,
            cancelled,
            statuses,
            index,
        })
    }

    pub fn initial(&self) -> &StatusId {
        &self.initial
    }

    /// Identifier treated as the cancellation reset target.
    pub fn cancelled(&self) -> &StatusId {
        &self.cancelled
    }

    /// Statuses in declaration order.
    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    pub fn status(&self, id: &str) -> Option<&Status> {
        self.index.get(id).map(|&i| &self.statuses[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Position of `id` in declaration order.
    pub fn ordinal(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Whether `id` is a reset target (initial or cancellation status).
    pub fn is_reset_target(&self, id: &str) -> bool {
        self.initial == id || self.cancelled == id
    }
}

fn reachable_from<'a>(
    statuses: &'a [Status],
    index: &HashMap<StatusId, usize>,
    initial: &'a StatusId,
) -> HashSet<&'a StatusId> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([initial]);

    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(&i) = index.get(id) {
            queue.extend(statuses[i].allowed_transitions.iter());
        }
    }
    seen
}

/// Builder for a [`WorkflowDefinition`].
#[derive(Debug)]
pub struct WorkflowBuilder {
    initial: StatusId,
    cancelled: StatusId,
    statuses: Vec<StatusBuilder>,
}

impl WorkflowBuilder {
    pub fn new(initial: impl Into<StatusId>) -> Self {
        Self {
            initial: initial.into(),
            cancelled: StatusId::from_static(DEFAULT_CANCELLED),
            statuses: Vec::new(),
        }
    }

    pub fn cancelled(mut self, id: impl Into<StatusId>) -> Self {
        self.cancelled = id.into();
        self
    }

    /// Declare a status. Declaration order defines the ordinal order.
    pub fn status(mut self, status: StatusBuilder) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn build(self) -> Result<WorkflowDefinition, DefinitionError> {
        let statuses = self
            .statuses
            .into_iter()
            .map(StatusBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;

        let definition = WorkflowDefinition::new(self.initial, self.cancelled, statuses)?;
        tracing::info!(
            initial = %definition.initial(),
            statuses = definition.statuses().len(),
            "workflow definition loaded"
        );
        Ok(definition)
    }
}
