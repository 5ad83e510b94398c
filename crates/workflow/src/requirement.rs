//! Requirement predicates gating entry into a status.
//!
//! Each status owns a [`RequirementSet`]: an ordered registry of named
//! predicates. Predicates are either declarative [`Rule`]s loaded from
//! configuration or arbitrary code registered through [`FnRequirement`].

use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Internal fault raised while evaluating a predicate.
///
/// A fault is reported as a `VALIDATION_FAILED` error and never aborts the
/// evaluation of the remaining requirements.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RequirementFault {
    message: String,
}

impl RequirementFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A predicate over transition input data.
///
/// Implementations must be cheap, synchronous and free of side effects: the
/// same definition is evaluated concurrently from any number of threads.
/// A predicate whose outcome depends on wall-clock time or other ambient
/// state makes validation results non-repeatable.
pub trait Requirement: Send + Sync + core::fmt::Debug {
    fn validate(&self, data: &Value) -> Result<bool, RequirementFault>;
}

/// Requirement backed by a closure.
pub struct FnRequirement<F> {
    f: F,
}

impl<F> FnRequirement<F>
where
    F: Fn(&Value) -> Result<bool, RequirementFault> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> core::fmt::Debug for FnRequirement<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FnRequirement")
    }
}

impl<F> Requirement for FnRequirement<F>
where
    F: Fn(&Value) -> Result<bool, RequirementFault> + Send + Sync,
{
    fn validate(&self, data: &Value) -> Result<bool, RequirementFault> {
        (self.f)(data)
    }
}

/// Declarative predicate over a field of the transition data.
///
/// `field` is a dotted path (`"shipment.trackingNumber"`) resolved against
/// the data object. Rules fault when the data is not an object, or when a
/// present value has a type the rule cannot compare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Field exists and is not `null`.
    Present { field: String },
    /// Field is a non-blank string, a non-empty array/object, or any other
    /// non-null scalar.
    NonEmpty { field: String },
    /// Field equals `value`.
    Equals { field: String, value: Value },
    /// Field equals one of `values`.
    OneOf { field: String, values: Vec<Value> },
    /// Field is a number greater than or equal to `min`.
    MinNumber { field: String, min: f64 },
}

impl Rule {
    pub fn present(field: impl Into<String>) -> Self {
        Rule::Present {
            field: field.into(),
        }
    }

    pub fn non_empty(field: impl Into<String>) -> Self {
        Rule::NonEmpty {
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Rule::Present { field }
            | Rule::NonEmpty { field }
            | Rule::Equals { field, .. }
            | Rule::OneOf { field, .. }
            | Rule::MinNumber { field, .. } => field,
        }
    }
}

fn lookup<'a>(data: &'a Value, path: &str) -> Result<Option<&'a Value>, RequirementFault> {
    if !data.is_object() {
        return Err(RequirementFault::new("transition data must be an object"));
    }

    let mut current = data;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

impl Requirement for Rule {
    fn validate(&self, data: &Value) -> Result<bool, RequirementFault> {
        let value = lookup(data, self.field())?;

        match self {
            Rule::Present { .. } => Ok(value.is_some_and(|v| !v.is_null())),
            Rule::NonEmpty { .. } => Ok(match value {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(Value::Array(items)) => !items.is_empty(),
                Some(Value::Object(map)) => !map.is_empty(),
                Some(_) => true,
            }),
            Rule::Equals { value: expected, .. } => Ok(value == Some(expected)),
            Rule::OneOf { values, .. } => Ok(value.is_some_and(|v| values.contains(v))),
            Rule::MinNumber { field, min } => match value {
                None | Some(Value::Null) => Ok(false),
                Some(v) => {
                    let n = v.as_f64().ok_or_else(|| {
                        RequirementFault::new(format!("field '{field}' must be a number"))
                    })?;
                    Ok(n >= *min)
                }
            },
        }
    }
}

/// A requirement registered under a name, with its failure message.
#[derive(Debug, Clone)]
pub struct NamedRequirement {
    name: String,
    message: Option<String>,
    predicate: Arc<dyn Requirement>,
}

impl NamedRequirement {
    pub fn new(
        name: impl Into<String>,
        message: Option<String>,
        predicate: Arc<dyn Requirement>,
    ) -> Self {
        Self {
            name: name.into(),
            message,
            predicate,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured failure message, or a default naming the requirement.
    pub fn message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("requirement '{}' is not met", self.name))
    }

    pub fn validate(&self, data: &Value) -> Result<bool, RequirementFault> {
        self.predicate.validate(data)
    }
}

/// Ordered registry of the requirements of one status.
///
/// Names are unique within a set; evaluation follows registration order.
#[derive(Debug, Clone, Default)]
pub struct RequirementSet {
    entries: Vec<NamedRequirement>,
}

impl RequirementSet {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a requirement. Returns `false` if the name is already taken.
    pub fn insert(&mut self, requirement: NamedRequirement) -> bool {
        if self.contains(requirement.name()) {
            return false;
        }
        self.entries.push(requirement);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|r| r.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&NamedRequirement> {
        self.entries.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedRequirement> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|r| r.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serialized as `{ name: { "message": ... } }`; predicates are not data.
impl Serialize for RequirementSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry {
            message: String,
        }

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(
                entry.name(),
                &Entry {
                    message: entry.message(),
                },
            )?;
        }
        map.end()
    }
}
