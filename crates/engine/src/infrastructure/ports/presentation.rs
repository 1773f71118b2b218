//! The choice dialog boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lastlight_domain::{ChoiceTicketId, EventId};

/// One row of the choice dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub index: usize,
    pub text: String,
    /// False when the pool cannot cover the choice's requirements
    pub affordable: bool,
    pub recommended: bool,
}

/// What the host returns once the player acts (or gives up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChoiceResponse {
    Selected(usize),
    /// Closed, timed out or otherwise dismissed by the host
    Cancelled,
}

/// Renders a choice dialog and waits for the player's answer.
///
/// Timeouts are the host's concern; a host that gives up returns
/// [`ChoiceResponse::Cancelled`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresentationPort: Send + Sync {
    async fn present_choices(
        &self,
        event_id: &EventId,
        ticket: ChoiceTicketId,
        options: &[ChoiceOption],
    ) -> ChoiceResponse;
}
