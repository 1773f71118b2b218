//! Requirement checker - gates choices on resource costs and debits them.

use std::collections::BTreeMap;

use lastlight_domain::{EventChoice, ResourceKind, ResourceRequirement};

use crate::infrastructure::ports::{CollaboratorError, Collaborators, ResourcePoolPort};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequirementError {
    /// Names the first requirement the pool cannot cover.
    #[error("Insufficient {kind}: need {required}, have {available}")]
    InsufficientResources {
        kind: ResourceKind,
        required: u32,
        available: u32,
    },

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

pub struct RequirementChecker {
    world: Collaborators,
}

impl RequirementChecker {
    pub fn new(world: Collaborators) -> Self {
        Self { world }
    }

    /// Read-only: can the pool cover every requirement of this choice?
    pub fn can_afford(&self, choice: &EventChoice) -> bool {
        match self.first_shortfall(&choice.requirements) {
            Ok(shortfall) => shortfall.is_none(),
            Err(error) => {
                tracing::debug!(error = %error, "Treating choice as unaffordable");
                false
            }
        }
    }

    /// Debit every requirement, or none of them.
    ///
    /// The pool is re-read first so a stale dialog cannot overspend. If a debit
    /// still fails part-way, earlier debits are credited back.
    pub fn commit(&self, choice: &EventChoice) -> Result<(), RequirementError> {
        let costs: Vec<ResourceRequirement> = choice
            .requirements
            .iter()
            .filter(|r| r.amount > 0)
            .copied()
            .collect();
        if costs.is_empty() {
            return Ok(());
        }

        if let Some(shortfall) = self.first_shortfall(&costs)? {
            return Err(shortfall);
        }

        let pool = self.world.resources()?;
        let mut debited: Vec<ResourceRequirement> = Vec::with_capacity(costs.len());
        for cost in &costs {
            let outcome = pool.try_debit(cost.kind, cost.amount);
            match outcome {
                Ok(true) => debited.push(*cost),
                Ok(false) => {
                    let available = pool.amount(cost.kind).unwrap_or(0);
                    rollback(pool, &debited);
                    return Err(RequirementError::InsufficientResources {
                        kind: cost.kind,
                        required: cost.amount,
                        available,
                    });
                }
                Err(error) => {
                    rollback(pool, &debited);
                    return Err(error.into());
                }
            }
        }

        tracing::debug!(debits = debited.len(), "Committed choice requirements");
        Ok(())
    }

    /// Requirements of the same kind accumulate: two "3 food" costs need 6.
    fn first_shortfall(
        &self,
        requirements: &[ResourceRequirement],
    ) -> Result<Option<RequirementError>, CollaboratorError> {
        if requirements.iter().all(|r| r.amount == 0) {
            return Ok(None);
        }
        let pool = self.world.resources()?;
        let mut needed: BTreeMap<ResourceKind, u32> = BTreeMap::new();
        for requirement in requirements {
            let total = needed.entry(requirement.kind).or_insert(0);
            *total = total.saturating_add(requirement.amount);
            let available = pool.amount(requirement.kind)?;
            if available < *total {
                return Ok(Some(RequirementError::InsufficientResources {
                    kind: requirement.kind,
                    required: *total,
                    available,
                }));
            }
        }
        Ok(None)
    }
}

fn rollback(pool: &dyn ResourcePoolPort, debited: &[ResourceRequirement]) {
    for cost in debited.iter().rev() {
        if let Err(error) = pool.credit(cost.kind, cost.amount) {
            tracing::warn!(
                kind = %cost.kind,
                amount = cost.amount,
                error = %error,
                "Failed to roll back requirement debit"
            );
        }
    }
}
