//! Test fixtures for engine tests: in-memory worlds, scripted rolls and
//! catalogue helpers.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{engine_with, TestWorld};
//!
//! let world = TestWorld::new().with_food(10);
//! let mut engine = engine_with(vec![record], &world, ScriptedRandom::always(0.0));
//! ```

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use lastlight_domain::{EventDefinitionRecord, ResourceKind};

use crate::entities::{EffectExecutor, EventCatalogue};
use crate::infrastructure::memory::{
    InMemoryFlags, InMemoryInventory, InMemoryJournal, InMemoryResourcePool, InMemoryRoster,
};
use crate::infrastructure::ports::{Collaborators, RandomPort, ResourcePoolPort};
use crate::use_cases::narrative::EventEngine;

// =============================================================================
// Fixture Loading
// =============================================================================

/// Load the bundled sample catalogue.
///
/// # Panics
///
/// Panics if the file cannot be read or parsed.
pub fn sample_catalogue() -> EventCatalogue {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("sample_catalogue.json");
    EventCatalogue::load_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load '{}': {}", path.display(), e))
}

// =============================================================================
// World
// =============================================================================

/// In-memory world with handles kept for assertions.
#[derive(Clone)]
pub struct TestWorld {
    pub resources: Arc<InMemoryResourcePool>,
    pub roster: Arc<InMemoryRoster>,
    pub inventory: Arc<InMemoryInventory>,
    pub flags: Arc<InMemoryFlags>,
    pub journal: Arc<InMemoryJournal>,
}

impl TestWorld {
    /// Two healthy members and empty stockpiles.
    pub fn new() -> Self {
        Self {
            resources: Arc::new(InMemoryResourcePool::new()),
            roster: Arc::new(
                InMemoryRoster::new()
                    .with_member("mara", 100)
                    .with_member("ilya", 100),
            ),
            inventory: Arc::new(InMemoryInventory::new()),
            flags: Arc::new(InMemoryFlags::new()),
            journal: Arc::new(InMemoryJournal::new()),
        }
    }

    pub fn with_food(self, amount: u32) -> Self {
        self.with_resource(ResourceKind::Food, amount)
    }

    pub fn with_resource(self, kind: ResourceKind, amount: u32) -> Self {
        let resources = self.resources.clone();
        let current = resources.amount(kind).unwrap_or(0);
        if amount > current {
            let _ = resources.credit(kind, amount - current);
        } else {
            let _ = resources.debit_clamped(kind, current - amount);
        }
        self
    }

    pub fn amount(&self, kind: ResourceKind) -> u32 {
        self.resources.amount(kind).unwrap_or(0)
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new()
            .with_resources(self.resources.clone())
            .with_members(self.roster.clone())
            .with_inventory(self.inventory.clone())
            .with_flags(self.flags.clone())
            .with_journal(self.journal.clone())
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Randomness
// =============================================================================

/// Returns queued rolls in order, then `fallback` forever.
pub struct ScriptedRandom {
    rolls: Mutex<VecDeque<f32>>,
    fallback: f32,
}

impl ScriptedRandom {
    pub fn new(rolls: impl IntoIterator<Item = f32>, fallback: f32) -> Self {
        Self {
            rolls: Mutex::new(rolls.into_iter().collect()),
            fallback,
        }
    }

    pub fn always(roll: f32) -> Self {
        Self::new([], roll)
    }
}

impl RandomPort for ScriptedRandom {
    fn roll(&self) -> f32 {
        self.rolls
            .lock()
            .ok()
            .and_then(|mut rolls| rolls.pop_front())
            .unwrap_or(self.fallback)
    }
}

// =============================================================================
// Engine
// =============================================================================

pub fn catalogue(records: Vec<EventDefinitionRecord>) -> Arc<EventCatalogue> {
    let catalogue = EventCatalogue::load(records);
    assert!(
        catalogue.rejected().is_empty(),
        "fixture records rejected: {:?}",
        catalogue.rejected()
    );
    Arc::new(catalogue)
}

pub fn engine_with(
    records: Vec<EventDefinitionRecord>,
    world: &TestWorld,
    random: impl RandomPort + 'static,
) -> EventEngine {
    engine_from(catalogue(records), world, Arc::new(random))
}

pub fn engine_from(
    catalogue: Arc<EventCatalogue>,
    world: &TestWorld,
    random: Arc<dyn RandomPort>,
) -> EventEngine {
    let collaborators = world.collaborators();
    let executor = Arc::new(EffectExecutor::new(collaborators.clone(), random.clone()));
    EventEngine::new(catalogue, collaborators, executor, random)
}
