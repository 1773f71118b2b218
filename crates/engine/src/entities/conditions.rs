//! Condition evaluator - stateless eligibility checks against world state.
//!
//! Every lookup fails closed: a missing collaborator or a collaborator error
//! makes the condition unmet rather than surfacing an error.

use lastlight_domain::{EventDefinition, GameDay, TriggerCondition};

use crate::infrastructure::ports::{CollaboratorError, Collaborators};

pub struct ConditionEvaluator {
    world: Collaborators,
}

impl ConditionEvaluator {
    pub fn new(world: Collaborators) -> Self {
        Self { world }
    }

    /// True iff `day` is inside the definition's window and every condition holds.
    pub fn is_eligible(&self, definition: &EventDefinition, day: GameDay) -> bool {
        definition.window().contains(day) && self.conditions_hold(definition, day)
    }

    /// Condition check alone, ignoring the trigger window (used for follow-ups).
    pub fn conditions_hold(&self, definition: &EventDefinition, day: GameDay) -> bool {
        definition.conditions().iter().all(|condition| {
            let met = self.evaluate(condition, day);
            if !met {
                tracing::trace!(
                    event_id = %definition.id(),
                    condition = condition.kind_name(),
                    "Condition unmet"
                );
            }
            met
        })
    }

    pub fn evaluate(&self, condition: &TriggerCondition, day: GameDay) -> bool {
        match self.try_evaluate(condition, day) {
            Ok(met) => met,
            Err(error) => {
                tracing::debug!(
                    condition = condition.kind_name(),
                    error = %error,
                    "Condition failed closed"
                );
                false
            }
        }
    }

    fn try_evaluate(
        &self,
        condition: &TriggerCondition,
        day: GameDay,
    ) -> Result<bool, CollaboratorError> {
        match condition {
            TriggerCondition::HasItem { item_id, amount } => {
                self.world.inventory()?.has_item(item_id, *amount)
            }
            TriggerCondition::ResourceMinimum { kind, amount } => {
                Ok(self.world.resources()?.amount(*kind)? >= *amount)
            }
            TriggerCondition::MemberHealthBelow { threshold } => {
                let members = self.world.members()?;
                for member in members.living_members()? {
                    if members.health(&member)?.is_some_and(|h| h < *threshold) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            TriggerCondition::SpecialFlagSet { flag_id } => self.world.flags()?.is_set(flag_id),
            TriggerCondition::DayExact { day: wanted } => Ok(day == *wanted),
            TriggerCondition::Custom { value } => Ok(*value),
            TriggerCondition::Unsupported => {
                tracing::warn!("Unsupported trigger condition never holds");
                Ok(false)
            }
        }
    }
}
