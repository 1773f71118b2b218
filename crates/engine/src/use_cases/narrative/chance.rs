//! Effective trigger chance = base probability × modifier factors, clamped to [0, 1].
//!
//! Modifiers are pluggable; every evaluation keeps a trace of which factors
//! applied so a day's decisions can be explained after the fact.

use lastlight_domain::{EventDefinition, EventId, EventPriority, GameDay, TriggerCondition};

use crate::entities::ConditionEvaluator;

/// What a modifier may look at when computing its factor.
pub struct ChanceContext<'a> {
    pub day: GameDay,
    pub conditions: &'a ConditionEvaluator,
}

pub trait TriggerChanceModifier: Send + Sync {
    fn label(&self) -> &str;

    /// Multiplier for this definition; 1.0 means no effect.
    fn factor(&self, definition: &EventDefinition, context: &ChanceContext<'_>) -> f32;
}

/// Global difficulty scaling of every non-critical roll.
#[derive(Debug, Clone)]
pub struct DifficultyModifier {
    multiplier: f32,
}

impl DifficultyModifier {
    pub fn new(multiplier: f32) -> Self {
        Self { multiplier }
    }
}

impl TriggerChanceModifier for DifficultyModifier {
    fn label(&self) -> &str {
        "difficulty"
    }

    fn factor(&self, _definition: &EventDefinition, _context: &ChanceContext<'_>) -> f32 {
        self.multiplier
    }
}

/// Applies `factor` while a world condition holds, optionally only to one
/// priority band.
#[derive(Debug, Clone)]
pub struct ConditionalModifier {
    pub label: String,
    pub condition: TriggerCondition,
    pub factor: f32,
    pub priority: Option<EventPriority>,
}

impl TriggerChanceModifier for ConditionalModifier {
    fn label(&self) -> &str {
        &self.label
    }

    fn factor(&self, definition: &EventDefinition, context: &ChanceContext<'_>) -> f32 {
        if self.priority.is_some_and(|p| p != definition.priority()) {
            return 1.0;
        }
        if context.conditions.evaluate(&self.condition, context.day) {
            self.factor
        } else {
            1.0
        }
    }
}

/// One multiplier that contributed to an effective chance.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightFactor {
    pub label: String,
    pub value: f32,
}

/// Record of a single probability roll.
#[derive(Debug, Clone, PartialEq)]
pub struct ChanceTrace {
    pub event_id: EventId,
    pub base: f32,
    pub factors: Vec<WeightFactor>,
    pub effective: f32,
    pub roll: f32,
    pub fired: bool,
}

#[derive(Default)]
pub struct TriggerChance {
    modifiers: Vec<Box<dyn TriggerChanceModifier>>,
}

impl TriggerChance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_modifier(mut self, modifier: impl TriggerChanceModifier + 'static) -> Self {
        self.modifiers.push(Box::new(modifier));
        self
    }

    /// Effective chance and the non-neutral factors that produced it.
    pub fn effective(
        &self,
        definition: &EventDefinition,
        context: &ChanceContext<'_>,
    ) -> (f32, Vec<WeightFactor>) {
        let mut chance = definition.base_probability();
        let mut factors = Vec::new();
        for modifier in &self.modifiers {
            let value = modifier.factor(definition, context);
            let value = if value.is_finite() && value >= 0.0 { value } else { 1.0 };
            if (value - 1.0).abs() > f32::EPSILON {
                factors.push(WeightFactor {
                    label: modifier.label().to_string(),
                    value,
                });
            }
            chance *= value;
        }
        (chance.clamp(0.0, 1.0), factors)
    }

    /// Roll against the effective chance. A roll succeeds when it is strictly
    /// below the chance, so 0.0 never fires and 1.0 always does.
    pub fn roll(
        &self,
        definition: &EventDefinition,
        context: &ChanceContext<'_>,
        roll: f32,
    ) -> ChanceTrace {
        let (effective, factors) = self.effective(definition, context);
        ChanceTrace {
            event_id: definition.id().clone(),
            base: definition.base_probability(),
            factors,
            effective,
            roll,
            fired: roll < effective,
        }
    }
}

#[cfg(test)]
mod tests {
    use lastlight_domain::{EventDefinitionRecord, FlagId};

    use super::*;
    use crate::infrastructure::memory::InMemoryFlags;
    use crate::infrastructure::ports::Collaborators;
    use std::sync::Arc;

    fn definition(probability: f32, priority: EventPriority) -> EventDefinition {
        let mut record = EventDefinitionRecord::new("raid");
        record.base_probability = probability;
        record.priority = priority;
        EventDefinition::try_from(record).unwrap()
    }

    #[test]
    fn no_modifiers_means_base_probability() {
        let evaluator = ConditionEvaluator::new(Collaborators::new());
        let context = ChanceContext {
            day: 1,
            conditions: &evaluator,
        };
        let chance = TriggerChance::new();
        let trace = chance.roll(&definition(0.4, EventPriority::Normal), &context, 0.39);
        assert!(trace.fired);
        assert!(trace.factors.is_empty());
        assert_eq!(trace.effective, 0.4);
        assert!(!chance.roll(&definition(0.4, EventPriority::Normal), &context, 0.4).fired);
    }

    #[test]
    fn modifiers_multiply_and_clamp() {
        let evaluator = ConditionEvaluator::new(Collaborators::new());
        let context = ChanceContext {
            day: 1,
            conditions: &evaluator,
        };
        let chance = TriggerChance::new()
            .with_modifier(DifficultyModifier::new(2.0))
            .with_modifier(DifficultyModifier::new(1.5));
        let (effective, factors) = chance.effective(&definition(0.25, EventPriority::Low), &context);
        assert!((effective - 0.75).abs() < 1e-6);
        assert_eq!(factors.len(), 2);

        let (capped, _) = chance.effective(&definition(0.9, EventPriority::Low), &context);
        assert_eq!(capped, 1.0);
    }

    #[test]
    fn conditional_modifier_applies_only_when_condition_holds() {
        let flags = Arc::new(InMemoryFlags::new().with_flag("night"));
        let evaluator = ConditionEvaluator::new(Collaborators::new().with_flags(flags));
        let context = ChanceContext {
            day: 1,
            conditions: &evaluator,
        };
        let night_raids = ConditionalModifier {
            label: "night".into(),
            condition: TriggerCondition::SpecialFlagSet {
                flag_id: FlagId::new("night"),
            },
            factor: 2.0,
            priority: Some(EventPriority::High),
        };
        let chance = TriggerChance::new().with_modifier(night_raids);

        let (high, factors) = chance.effective(&definition(0.3, EventPriority::High), &context);
        assert!((high - 0.6).abs() < 1e-6);
        assert_eq!(factors[0].label, "night");

        let (normal, _) = chance.effective(&definition(0.3, EventPriority::Normal), &context);
        assert!((normal - 0.3).abs() < 1e-6);
    }

    #[test]
    fn zero_probability_never_fires() {
        let evaluator = ConditionEvaluator::new(Collaborators::new());
        let context = ChanceContext {
            day: 1,
            conditions: &evaluator,
        };
        let trace = TriggerChance::new().roll(&definition(0.0, EventPriority::High), &context, 0.0);
        assert!(!trace.fired);
    }
}
