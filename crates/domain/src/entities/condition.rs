use serde::{Deserialize, Serialize};

use super::ResourceKind;
use crate::game_time::GameDay;
use crate::ids::{FlagId, ItemId};

/// A predicate over external game state. All conditions attached to a
/// definition must hold for it to be eligible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TriggerCondition {
    HasItem {
        item_id: ItemId,
        #[serde(default = "one")]
        amount: u32,
    },
    ResourceMinimum {
        kind: ResourceKind,
        amount: u32,
    },
    /// Holds when any living member is below `threshold` health
    MemberHealthBelow {
        threshold: i32,
    },
    SpecialFlagSet {
        flag_id: FlagId,
    },
    DayExact {
        day: GameDay,
    },
    /// Constant authored by scripting tools
    Custom {
        value: bool,
    },
    /// Variant not recognised by this build; never satisfied
    #[serde(other)]
    Unsupported,
}

fn one() -> u32 {
    1
}

impl TriggerCondition {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TriggerCondition::HasItem { .. } => "hasItem",
            TriggerCondition::ResourceMinimum { .. } => "resourceMinimum",
            TriggerCondition::MemberHealthBelow { .. } => "memberHealthBelow",
            TriggerCondition::SpecialFlagSet { .. } => "specialFlagSet",
            TriggerCondition::DayExact { .. } => "dayExact",
            TriggerCondition::Custom { .. } => "custom",
            TriggerCondition::Unsupported => "unsupported",
        }
    }
}
