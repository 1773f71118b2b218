//! In-memory world-state collaborators.
//!
//! Used by the demo runner and tests. A real game plugs its own simulation
//! behind the same ports.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use lastlight_domain::{FlagId, ItemId, MemberId, ResourceKind};

use crate::infrastructure::ports::{
    CollaboratorError, FlagPort, InventoryPort, JournalPort, MemberHealthPort, ResourcePoolPort,
};

pub const MAX_HEALTH: i32 = 100;

fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    name: &'static str,
) -> Result<MutexGuard<'a, T>, CollaboratorError> {
    mutex.lock().map_err(|_| CollaboratorError::Poisoned(name))
}

// =============================================================================
// Resource pool
// =============================================================================

/// Stockpiles with a floor of zero.
#[derive(Default)]
pub struct InMemoryResourcePool {
    amounts: Mutex<BTreeMap<ResourceKind, u32>>,
}

impl InMemoryResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_amount(self, kind: ResourceKind, amount: u32) -> Self {
        if let Ok(mut amounts) = self.amounts.lock() {
            amounts.insert(kind, amount);
        }
        self
    }
}

impl ResourcePoolPort for InMemoryResourcePool {
    fn amount(&self, kind: ResourceKind) -> Result<u32, CollaboratorError> {
        let amounts = lock(&self.amounts, "resource pool")?;
        Ok(amounts.get(&kind).copied().unwrap_or(0))
    }

    fn try_debit(&self, kind: ResourceKind, amount: u32) -> Result<bool, CollaboratorError> {
        let mut amounts = lock(&self.amounts, "resource pool")?;
        let current = amounts.entry(kind).or_insert(0);
        if *current < amount {
            return Ok(false);
        }
        *current -= amount;
        Ok(true)
    }

    fn credit(&self, kind: ResourceKind, amount: u32) -> Result<(), CollaboratorError> {
        let mut amounts = lock(&self.amounts, "resource pool")?;
        let current = amounts.entry(kind).or_insert(0);
        *current = current.saturating_add(amount);
        Ok(())
    }

    fn debit_clamped(&self, kind: ResourceKind, amount: u32) -> Result<u32, CollaboratorError> {
        let mut amounts = lock(&self.amounts, "resource pool")?;
        let current = amounts.entry(kind).or_insert(0);
        let removed = amount.min(*current);
        *current -= removed;
        Ok(removed)
    }
}

// =============================================================================
// Roster
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberState {
    pub health: i32,
    pub ill: bool,
    pub alive: bool,
}

/// Survivor roster. Health is clamped to `0..=MAX_HEALTH`; a member at zero dies.
#[derive(Default)]
pub struct InMemoryRoster {
    members: Mutex<BTreeMap<MemberId, MemberState>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(self, id: impl Into<MemberId>, health: i32) -> Self {
        if let Ok(mut members) = self.members.lock() {
            members.insert(
                id.into(),
                MemberState {
                    health: health.clamp(0, MAX_HEALTH),
                    ill: false,
                    alive: health > 0,
                },
            );
        }
        self
    }

    pub fn member(&self, id: &MemberId) -> Option<MemberState> {
        self.members.lock().ok()?.get(id).cloned()
    }
}

impl MemberHealthPort for InMemoryRoster {
    fn living_members(&self) -> Result<Vec<MemberId>, CollaboratorError> {
        let members = lock(&self.members, "roster")?;
        Ok(members
            .iter()
            .filter(|(_, state)| state.alive)
            .map(|(id, _)| id.clone())
            .collect())
    }

    fn health(&self, member: &MemberId) -> Result<Option<i32>, CollaboratorError> {
        let members = lock(&self.members, "roster")?;
        Ok(members.get(member).map(|state| state.health))
    }

    fn heal(&self, member: &MemberId, delta: i32) -> Result<(), CollaboratorError> {
        let mut members = lock(&self.members, "roster")?;
        let state = members
            .get_mut(member)
            .ok_or_else(|| CollaboratorError::rejected("roster", format!("unknown member {}", member)))?;
        if !state.alive {
            return Ok(());
        }
        state.health = state.health.saturating_add(delta).clamp(0, MAX_HEALTH);
        if state.health == 0 {
            state.alive = false;
        }
        Ok(())
    }

    fn set_illness(&self, member: &MemberId, ill: bool) -> Result<(), CollaboratorError> {
        let mut members = lock(&self.members, "roster")?;
        let state = members
            .get_mut(member)
            .ok_or_else(|| CollaboratorError::rejected("roster", format!("unknown member {}", member)))?;
        state.ill = ill;
        Ok(())
    }
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Default)]
pub struct InMemoryInventory {
    items: Mutex<HashMap<ItemId, u32>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, item: impl Into<ItemId>, amount: u32) -> Self {
        self.add(item.into(), amount);
        self
    }

    pub fn add(&self, item: ItemId, amount: u32) {
        if let Ok(mut items) = self.items.lock() {
            let count = items.entry(item).or_insert(0);
            *count = count.saturating_add(amount);
        }
    }
}

impl InventoryPort for InMemoryInventory {
    fn has_item(&self, item: &ItemId, amount: u32) -> Result<bool, CollaboratorError> {
        let items = lock(&self.items, "inventory")?;
        Ok(items.get(item).copied().unwrap_or(0) >= amount)
    }
}

// =============================================================================
// Flags
// =============================================================================

#[derive(Default)]
pub struct InMemoryFlags {
    flags: Mutex<BTreeSet<FlagId>>,
}

impl InMemoryFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(self, flag: impl Into<FlagId>) -> Self {
        if let Ok(mut flags) = self.flags.lock() {
            flags.insert(flag.into());
        }
        self
    }
}

impl FlagPort for InMemoryFlags {
    fn is_set(&self, flag: &FlagId) -> Result<bool, CollaboratorError> {
        Ok(lock(&self.flags, "flags")?.contains(flag))
    }

    fn set(&self, flag: &FlagId) -> Result<(), CollaboratorError> {
        lock(&self.flags, "flags")?.insert(flag.clone());
        Ok(())
    }
}

// =============================================================================
// Journal
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub title: String,
    pub text: String,
}

#[derive(Default)]
pub struct InMemoryJournal {
    entries: Mutex<Vec<JournalEntry>>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl JournalPort for InMemoryJournal {
    fn append(&self, title: &str, text: &str) -> Result<(), CollaboratorError> {
        lock(&self.entries, "journal")?.push(JournalEntry {
            title: title.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_debits_are_all_or_nothing_per_kind() {
        let pool = InMemoryResourcePool::new().with_amount(ResourceKind::Food, 3);
        assert!(!pool.try_debit(ResourceKind::Food, 4).unwrap());
        assert_eq!(pool.amount(ResourceKind::Food).unwrap(), 3);
        assert!(pool.try_debit(ResourceKind::Food, 3).unwrap());
        assert_eq!(pool.amount(ResourceKind::Food).unwrap(), 0);
    }

    #[test]
    fn clamped_debit_stops_at_zero() {
        let pool = InMemoryResourcePool::new().with_amount(ResourceKind::Water, 2);
        assert_eq!(pool.debit_clamped(ResourceKind::Water, 5).unwrap(), 2);
        assert_eq!(pool.amount(ResourceKind::Water).unwrap(), 0);
    }

    #[test]
    fn roster_kills_members_at_zero_health() {
        let roster = InMemoryRoster::new().with_member("ana", 10).with_member("ben", 50);
        roster.heal(&MemberId::new("ana"), -15).unwrap();
        assert_eq!(roster.living_members().unwrap(), vec![MemberId::new("ben")]);
        assert!(!roster.member(&MemberId::new("ana")).unwrap().alive);
    }

    #[test]
    fn roster_caps_health() {
        let roster = InMemoryRoster::new().with_member("ana", 90);
        roster.heal(&MemberId::new("ana"), 30).unwrap();
        assert_eq!(roster.health(&MemberId::new("ana")).unwrap(), Some(MAX_HEALTH));
    }

    #[test]
    fn unknown_member_is_rejected() {
        let roster = InMemoryRoster::new();
        let err = roster.heal(&MemberId::new("ghost"), 5).unwrap_err();
        assert!(matches!(err, CollaboratorError::Rejected { .. }));
    }

    #[test]
    fn inventory_counts_items() {
        let inventory = InMemoryInventory::new().with_item("radio", 1);
        assert!(inventory.has_item(&ItemId::new("radio"), 1).unwrap());
        assert!(!inventory.has_item(&ItemId::new("radio"), 2).unwrap());
        assert!(!inventory.has_item(&ItemId::new("map"), 1).unwrap());
    }
}
