//! Effects applied to collaborator systems when an event resolves.
//!
//! Each variant carries only the fields it needs. Catalogues written against a
//! newer schema may contain variants this build does not know; those load as
//! [`EventEffect::Unsupported`] and are skipped at runtime.

use serde::{Deserialize, Serialize};

use super::ResourceKind;
use crate::ids::FlagId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EventEffect {
    /// Add to (positive) or draw from (negative) a stockpile
    ModifyResource { kind: ResourceKind, delta: i32 },

    /// Change member health. Illness toggles are applied after the delta.
    ModifyHealth {
        #[serde(default)]
        affects_all: bool,
        #[serde(default)]
        health_delta: i32,
        #[serde(default)]
        cure_illness: bool,
        #[serde(default)]
        cause_illness: bool,
    },

    /// Write a journal entry
    AddLogEntry { message: String },

    /// Unlock a piece of content (recipe, location, dialogue...)
    UnlockContent { target_id: FlagId },

    /// Variant not recognised by this build
    #[serde(other)]
    Unsupported,
}

impl EventEffect {
    pub fn kind_name(&self) -> &'static str {
        match self {
            EventEffect::ModifyResource { .. } => "modifyResource",
            EventEffect::ModifyHealth { .. } => "modifyHealth",
            EventEffect::AddLogEntry { .. } => "addLogEntry",
            EventEffect::UnlockContent { .. } => "unlockContent",
            EventEffect::Unsupported => "unsupported",
        }
    }

    /// Short human-readable summary for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            EventEffect::ModifyResource { kind, delta } => format!("{:+} {}", delta, kind),
            EventEffect::ModifyHealth {
                affects_all,
                health_delta,
                cure_illness,
                cause_illness,
            } => {
                let target = if *affects_all { "all members" } else { "one member" };
                let mut text = format!("{:+} health to {}", health_delta, target);
                if *cure_illness {
                    text.push_str(", cure illness");
                }
                if *cause_illness {
                    text.push_str(", cause illness");
                }
                text
            }
            EventEffect::AddLogEntry { message } => format!("Log: {}", message),
            EventEffect::UnlockContent { target_id } => format!("Unlock {}", target_id),
            EventEffect::Unsupported => "Unsupported effect".to_string(),
        }
    }
}
