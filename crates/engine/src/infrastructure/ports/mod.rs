//! Port traits for collaborator boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - World state owned by other systems (resources, roster, inventory, flags, journal)
//! - The choice dialog (async, the only suspension point)
//! - Day clock/Random (for testing)

mod error;
mod presentation;
mod testing;
mod world;

pub use error::CollaboratorError;

// =============================================================================
// World State Ports
// =============================================================================
pub use world::{
    Collaborators, FlagPort, InventoryPort, JournalPort, MemberHealthPort, ResourcePoolPort,
};

// =============================================================================
// Presentation Port
// =============================================================================
pub use presentation::{ChoiceOption, ChoiceResponse, PresentationPort};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{DayClockPort, RandomPort};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use presentation::MockPresentationPort;

#[cfg(test)]
pub use world::{MockFlagPort, MockInventoryPort, MockMemberHealthPort, MockResourcePoolPort};
