use serde::{Deserialize, Serialize};

use super::{EventEffect, ResourceRequirement};

/// One option offered to the player when an event requires a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventChoice {
    /// Button text shown in the choice dialog
    pub text: String,
    /// Narrative shown once the choice resolves
    #[serde(default)]
    pub result_text: String,
    /// Costs debited atomically when the choice is committed
    #[serde(default)]
    pub requirements: Vec<ResourceRequirement>,
    #[serde(default)]
    pub effects: Vec<EventEffect>,
    /// Hint for the UI (and the auto presenter)
    #[serde(default)]
    pub recommended: bool,
}

impl EventChoice {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            result_text: String::new(),
            requirements: Vec::new(),
            effects: Vec::new(),
            recommended: false,
        }
    }

    pub fn with_result_text(mut self, result_text: impl Into<String>) -> Self {
        self.result_text = result_text.into();
        self
    }

    pub fn with_requirement(mut self, requirement: ResourceRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn with_effect(mut self, effect: EventEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn recommended(mut self) -> Self {
        self.recommended = true;
        self
    }
}
