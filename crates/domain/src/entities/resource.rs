use std::fmt;

use serde::{Deserialize, Serialize};

/// Consumable stockpiles tracked by the resource pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Food,
    Water,
    Medicine,
    Fuel,
    Ammunition,
    Materials,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Food => "food",
            ResourceKind::Water => "water",
            ResourceKind::Medicine => "medicine",
            ResourceKind::Fuel => "fuel",
            ResourceKind::Ammunition => "ammunition",
            ResourceKind::Materials => "materials",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cost attached to a choice. The choice is selectable only while the pool
/// holds at least `amount` of `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirement {
    pub kind: ResourceKind,
    pub amount: u32,
}

impl ResourceRequirement {
    pub fn new(kind: ResourceKind, amount: u32) -> Self {
        Self { kind, amount }
    }
}
