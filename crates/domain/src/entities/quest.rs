//! Quest objectives and per-quest runtime state.
//!
//! A quest is an [`EventDefinition`](super::EventDefinition) carrying a
//! [`QuestSpec`]. The authored spec is immutable; progress lives in a
//! [`QuestRecord`] owned by the quest tracker and persisted in save tables.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ObjectiveId, QuestChainId};
use super::EventEffect;

/// Kind of gameplay signal an objective listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectiveType {
    CollectItem,
    KillEnemies,
    ExploreArea,
    SurviveDays,
    Custom,
}

/// Authored sub-goal of a quest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestObjective {
    pub id: ObjectiveId,
    #[serde(default)]
    pub description: String,
    pub objective_type: ObjectiveType,
    /// Item, enemy or area key matched against progress signals.
    /// Ignored for `SurviveDays`.
    #[serde(default)]
    pub target_id: String,
    pub target_amount: u32,
}

impl QuestObjective {
    pub fn new(
        id: impl Into<ObjectiveId>,
        objective_type: ObjectiveType,
        target_id: impl Into<String>,
        target_amount: u32,
    ) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            objective_type,
            target_id: target_id.into(),
            target_amount,
        }
    }

    /// Whether a progress signal applies to this objective.
    pub fn matches(&self, objective_type: ObjectiveType, target_id: &str) -> bool {
        self.objective_type == objective_type
            && (objective_type == ObjectiveType::SurviveDays || self.target_id == target_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestKind {
    Main,
    Side,
}

/// Position of a quest within a chain. Lower orders must complete first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestChainLink {
    pub chain_id: QuestChainId,
    pub order: u32,
}

/// Quest-specific part of an event definition.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestSpec {
    pub kind: QuestKind,
    pub chain: Option<QuestChainLink>,
    pub objectives: Vec<QuestObjective>,
    /// Applied once when the quest completes
    pub rewards: Vec<EventEffect>,
}

// =============================================================================
// Runtime state
// =============================================================================

/// Lifecycle: NotStarted → Available → InProgress → {Completed | Failed}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestStatus {
    #[default]
    NotStarted,
    Available,
    InProgress,
    Completed,
    Failed,
}

impl QuestStatus {
    /// Completed and Failed quests never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuestStatus::Completed | QuestStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveProgress {
    pub objective_id: ObjectiveId,
    pub progress: u32,
    pub completed: bool,
}

/// Status plus per-objective progress for one quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRecord {
    pub status: QuestStatus,
    pub objectives: Vec<ObjectiveProgress>,
}

impl QuestRecord {
    pub fn new(spec: &QuestSpec) -> Self {
        Self {
            status: QuestStatus::NotStarted,
            objectives: spec
                .objectives
                .iter()
                .map(|objective| ObjectiveProgress {
                    objective_id: objective.id.clone(),
                    progress: 0,
                    completed: objective.target_amount == 0,
                })
                .collect(),
        }
    }

    /// NotStarted → Available. Returns whether the status changed.
    pub fn make_available(&mut self) -> bool {
        if self.status == QuestStatus::NotStarted {
            self.status = QuestStatus::Available;
            return true;
        }
        false
    }

    /// NotStarted/Available → InProgress.
    pub fn start(&mut self) -> Result<(), DomainError> {
        match self.status {
            QuestStatus::NotStarted | QuestStatus::Available => {
                self.status = QuestStatus::InProgress;
                Ok(())
            }
            other => Err(DomainError::invalid_state_transition(format!(
                "cannot start a quest that is {:?}",
                other
            ))),
        }
    }

    /// InProgress → Completed.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        if self.status != QuestStatus::InProgress {
            return Err(DomainError::invalid_state_transition(format!(
                "cannot complete a quest that is {:?}",
                self.status
            )));
        }
        self.status = QuestStatus::Completed;
        Ok(())
    }

    /// Any non-terminal status → Failed.
    pub fn fail(&mut self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_state_transition(format!(
                "cannot fail a quest that is {:?}",
                self.status
            )));
        }
        self.status = QuestStatus::Failed;
        Ok(())
    }

    /// Apply a progress signal to every matching objective.
    ///
    /// Returns the number of objectives whose progress changed. Completed
    /// objectives ignore further signals.
    pub fn record_progress(
        &mut self,
        spec: &QuestSpec,
        objective_type: ObjectiveType,
        target_id: &str,
        amount: u32,
    ) -> usize {
        if self.status != QuestStatus::InProgress || amount == 0 {
            return 0;
        }
        let mut changed = 0;
        for (objective, progress) in spec.objectives.iter().zip(self.objectives.iter_mut()) {
            if progress.completed || !objective.matches(objective_type, target_id) {
                continue;
            }
            progress.progress = progress.progress.saturating_add(amount);
            if progress.progress >= objective.target_amount {
                progress.completed = true;
            }
            changed += 1;
        }
        changed
    }

    pub fn all_objectives_complete(&self) -> bool {
        self.objectives.iter().all(|o| o.completed)
    }

    pub fn objective(&self, id: &ObjectiveId) -> Option<&ObjectiveProgress> {
        self.objectives.iter().find(|o| &o.objective_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> QuestSpec {
        QuestSpec {
            kind: QuestKind::Main,
            chain: None,
            objectives: vec![
                QuestObjective::new("a", ObjectiveType::CollectItem, "A", 3),
                QuestObjective::new("b", ObjectiveType::KillEnemies, "B", 1),
            ],
            rewards: Vec::new(),
        }
    }

    #[test]
    fn lifecycle_transitions() {
        let mut record = QuestRecord::new(&spec());
        assert_eq!(record.status, QuestStatus::NotStarted);
        assert!(record.make_available());
        assert!(!record.make_available());
        record.start().unwrap();
        assert_eq!(record.status, QuestStatus::InProgress);
        assert!(record.start().is_err());
        record.complete().unwrap();
        assert!(record.fail().is_err());
        assert!(record.complete().is_err());
    }

    #[test]
    fn progress_only_counts_while_in_progress() {
        let spec = spec();
        let mut record = QuestRecord::new(&spec);
        assert_eq!(record.record_progress(&spec, ObjectiveType::CollectItem, "A", 3), 0);

        record.start().unwrap();
        assert_eq!(record.record_progress(&spec, ObjectiveType::CollectItem, "A", 2), 1);
        assert!(!record.objectives[0].completed);
        record.record_progress(&spec, ObjectiveType::CollectItem, "A", 1);
        assert!(record.objectives[0].completed);
        assert!(!record.all_objectives_complete());

        record.record_progress(&spec, ObjectiveType::KillEnemies, "B", 1);
        assert!(record.all_objectives_complete());
    }

    #[test]
    fn mismatched_signals_are_ignored() {
        let spec = spec();
        let mut record = QuestRecord::new(&spec);
        record.start().unwrap();
        assert_eq!(record.record_progress(&spec, ObjectiveType::KillEnemies, "A", 5), 0);
        assert_eq!(record.record_progress(&spec, ObjectiveType::CollectItem, "Z", 5), 0);
        assert_eq!(record.objectives[0].progress, 0);
    }

    #[test]
    fn survive_days_ignores_target_id() {
        let objective = QuestObjective::new("hold", ObjectiveType::SurviveDays, "", 3);
        assert!(objective.matches(ObjectiveType::SurviveDays, "anything"));
    }
}
