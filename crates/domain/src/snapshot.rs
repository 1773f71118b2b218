//! Persisted engine tables.
//!
//! The engine defines the shape; storing it is the save system's job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::QuestRecord;
use crate::game_time::GameDay;
use crate::ids::EventId;

/// A follow-up waiting for its target day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEvent {
    pub event_id: EventId,
    pub target_day: GameDay,
}

/// Everything needed to reproduce the engine's decisions after a reload.
///
/// A choice that was pending when the snapshot was taken is deliberately
/// absent; on restore it counts as abandoned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    /// Last day the engine evaluated, if any
    #[serde(default)]
    pub day: Option<GameDay>,
    #[serde(default)]
    pub triggered: BTreeMap<EventId, bool>,
    #[serde(default)]
    pub quests: BTreeMap<EventId, QuestRecord>,
    #[serde(default)]
    pub scheduled: Vec<ScheduledEvent>,
}

impl EngineSnapshot {
    pub fn was_triggered(&self, id: &EventId) -> bool {
        self.triggered.get(id).copied().unwrap_or(false)
    }
}
