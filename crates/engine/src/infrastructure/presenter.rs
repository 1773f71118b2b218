//! Headless presenter for runs without a UI.

use async_trait::async_trait;

use lastlight_domain::{ChoiceTicketId, EventId};

use crate::infrastructure::ports::{ChoiceOption, ChoiceResponse, PresentationPort};

/// Picks the recommended affordable option, else the first affordable one.
/// Cancels when nothing is affordable.
#[derive(Debug, Default)]
pub struct AutoPresenter;

impl AutoPresenter {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(options: &[ChoiceOption]) -> ChoiceResponse {
        options
            .iter()
            .find(|o| o.affordable && o.recommended)
            .or_else(|| options.iter().find(|o| o.affordable))
            .map(|o| ChoiceResponse::Selected(o.index))
            .unwrap_or(ChoiceResponse::Cancelled)
    }
}

#[async_trait]
impl PresentationPort for AutoPresenter {
    async fn present_choices(
        &self,
        event_id: &EventId,
        ticket: ChoiceTicketId,
        options: &[ChoiceOption],
    ) -> ChoiceResponse {
        let response = Self::decide(options);
        tracing::debug!(
            event_id = %event_id,
            ticket = %ticket,
            options = options.len(),
            response = ?response,
            "Auto presenter answered choice"
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(index: usize, affordable: bool, recommended: bool) -> ChoiceOption {
        ChoiceOption {
            index,
            text: format!("option {}", index),
            affordable,
            recommended,
        }
    }

    #[test]
    fn prefers_recommended_affordable_option() {
        let options = [option(0, true, false), option(1, true, true)];
        assert_eq!(AutoPresenter::decide(&options), ChoiceResponse::Selected(1));
    }

    #[test]
    fn skips_unaffordable_recommendation() {
        let options = [option(0, false, true), option(1, true, false)];
        assert_eq!(AutoPresenter::decide(&options), ChoiceResponse::Selected(1));
    }

    #[test]
    fn cancels_when_nothing_is_affordable() {
        let options = [option(0, false, true)];
        assert_eq!(AutoPresenter::decide(&options), ChoiceResponse::Cancelled);
    }
}
