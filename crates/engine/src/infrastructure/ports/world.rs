//! World-state collaborators consumed by the event engine.
//!
//! The engine only requests mutations; each collaborator owns its own locking
//! and floor/ceiling rules.

use std::sync::Arc;

use lastlight_domain::{FlagId, ItemId, MemberId, ResourceKind};

use super::CollaboratorError;

#[cfg_attr(test, mockall::automock)]
pub trait ResourcePoolPort: Send + Sync {
    fn amount(&self, kind: ResourceKind) -> Result<u32, CollaboratorError>;

    /// Remove `amount` only if the pool holds at least that much.
    fn try_debit(&self, kind: ResourceKind, amount: u32) -> Result<bool, CollaboratorError>;

    fn credit(&self, kind: ResourceKind, amount: u32) -> Result<(), CollaboratorError>;

    /// Remove up to `amount`, stopping at the pool's floor. Returns what was removed.
    fn debit_clamped(&self, kind: ResourceKind, amount: u32) -> Result<u32, CollaboratorError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait MemberHealthPort: Send + Sync {
    fn living_members(&self) -> Result<Vec<MemberId>, CollaboratorError>;

    fn health(&self, member: &MemberId) -> Result<Option<i32>, CollaboratorError>;

    /// Positive heals, negative harms.
    fn heal(&self, member: &MemberId, delta: i32) -> Result<(), CollaboratorError>;

    fn set_illness(&self, member: &MemberId, ill: bool) -> Result<(), CollaboratorError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait InventoryPort: Send + Sync {
    fn has_item(&self, item: &ItemId, amount: u32) -> Result<bool, CollaboratorError>;
}

/// Story flags ("found the distress radio") and unlocked content share one store.
#[cfg_attr(test, mockall::automock)]
pub trait FlagPort: Send + Sync {
    fn is_set(&self, flag: &FlagId) -> Result<bool, CollaboratorError>;

    fn set(&self, flag: &FlagId) -> Result<(), CollaboratorError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait JournalPort: Send + Sync {
    fn append(&self, title: &str, text: &str) -> Result<(), CollaboratorError>;
}

/// The set of world-state collaborators handed to the engine at startup.
///
/// A `None` slot is treated as an unavailable collaborator.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub resources: Option<Arc<dyn ResourcePoolPort>>,
    pub members: Option<Arc<dyn MemberHealthPort>>,
    pub inventory: Option<Arc<dyn InventoryPort>>,
    pub flags: Option<Arc<dyn FlagPort>>,
    pub journal: Option<Arc<dyn JournalPort>>,
}

impl Collaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resources(mut self, resources: Arc<dyn ResourcePoolPort>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn with_members(mut self, members: Arc<dyn MemberHealthPort>) -> Self {
        self.members = Some(members);
        self
    }

    pub fn with_inventory(mut self, inventory: Arc<dyn InventoryPort>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn with_flags(mut self, flags: Arc<dyn FlagPort>) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn with_journal(mut self, journal: Arc<dyn JournalPort>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn resources(&self) -> Result<&dyn ResourcePoolPort, CollaboratorError> {
        self.resources
            .as_deref()
            .ok_or(CollaboratorError::Unavailable("resource pool"))
    }

    pub fn members(&self) -> Result<&dyn MemberHealthPort, CollaboratorError> {
        self.members
            .as_deref()
            .ok_or(CollaboratorError::Unavailable("member health store"))
    }

    pub fn inventory(&self) -> Result<&dyn InventoryPort, CollaboratorError> {
        self.inventory
            .as_deref()
            .ok_or(CollaboratorError::Unavailable("inventory"))
    }

    pub fn flags(&self) -> Result<&dyn FlagPort, CollaboratorError> {
        self.flags
            .as_deref()
            .ok_or(CollaboratorError::Unavailable("special flags"))
    }

    pub fn journal(&self) -> Result<&dyn JournalPort, CollaboratorError> {
        self.journal
            .as_deref()
            .ok_or(CollaboratorError::Unavailable("journal"))
    }
}
