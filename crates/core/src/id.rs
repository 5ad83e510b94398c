//! Identifiers used across the workflow domain.
//!
//! Statuses and actors are identified by opaque strings supplied by
//! configuration and callers, so both are string newtypes rather than UUIDs.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Identifier of a workflow status (e.g. `"CONFIRMED"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(Cow<'static, str>);

/// Identifier of the actor performing a transition.
///
/// Defaults to [`ActorId::SYSTEM`] when a caller does not supply one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(Cow<'static, str>);

macro_rules! impl_string_newtype {
    ($t:ty) => {
        impl $t {
            pub fn new(value: impl Into<Cow<'static, str>>) -> Self {
                Self(value.into())
            }

            /// Build an identifier from a `'static` literal without allocating.
            pub const fn from_static(value: &'static str) -> Self {
                Self(Cow::Borrowed(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&'static str> for $t {
            fn from(value: &'static str) -> Self {
                Self(Cow::Borrowed(value))
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(Cow::Owned(value))
            }
        }

        impl core::borrow::Borrow<str> for $t {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $t {
            fn eq(&self, other: &str) -> bool {
                self.as_str() == other
            }
        }

        impl PartialEq<&str> for $t {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

impl_string_newtype!(StatusId);
impl_string_newtype!(ActorId);

impl ActorId {
    /// Actor recorded when no user is attached to a transition.
    pub const SYSTEM: ActorId = ActorId::from_static("system");
}

impl Default for ActorId {
    fn default() -> Self {
        Self::SYSTEM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_id_compares_with_str() {
        let id = StatusId::from("CONFIRMED");
        assert_eq!(id, "CONFIRMED");
        assert_eq!(id.to_string(), "CONFIRMED");
        assert_eq!(id, StatusId::new(String::from("CONFIRMED")));
    }

    #[test]
    fn actor_defaults_to_system() {
        assert_eq!(ActorId::default().as_str(), "system");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&StatusId::from("SHIPPED")).unwrap();
        assert_eq!(json, "\"SHIPPED\"");

        let actor: ActorId = serde_json::from_str("\"u1\"").unwrap();
        assert_eq!(actor.as_str(), "u1");
    }
}
