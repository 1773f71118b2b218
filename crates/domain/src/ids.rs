use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

/// Authored content is addressed by stable string keys rather than UUIDs so that
/// catalogue files and save tables stay human-readable.
macro_rules! define_key {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

// Pending choice handles
define_id!(ChoiceTicketId);

// Authored content keys
define_key!(EventId);
define_key!(ItemId);
define_key!(FlagId);
define_key!(ObjectiveId);
define_key!(QuestChainId);

// Roster keys
define_key!(MemberId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_serialize_as_plain_strings() {
        let id = EventId::new("radio_signal");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"radio_signal\"");
        let back: EventId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn blank_keys_are_empty() {
        assert!(FlagId::new("  ").is_empty());
        assert!(!FlagId::new("radio").is_empty());
    }

    #[test]
    fn tickets_are_unique() {
        assert_ne!(ChoiceTicketId::new(), ChoiceTicketId::new());
    }
}
