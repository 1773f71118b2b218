//! Effect executor - applies event effects to collaborator systems.
//!
//! Effects are independent: a failure is recorded and logged, and the
//! remaining effects of the same outcome still run.

use std::sync::Arc;

use lastlight_domain::{EventEffect, EventId, FlagId, MemberId, ResourceKind};

use crate::infrastructure::ports::{CollaboratorError, Collaborators, RandomPort};

/// Result of executing a single effect.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectExecutionResult {
    /// Description of what was done
    pub description: String,
    /// Whether the effect was successfully executed
    pub success: bool,
    /// Error message if execution failed
    pub error: Option<String>,
    /// Nothing was attempted (unsupported variant or absent collaborator)
    pub skipped: bool,
}

impl EffectExecutionResult {
    fn ok(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            success: true,
            error: None,
            skipped: false,
        }
    }

    fn failed(description: impl Into<String>, error: &CollaboratorError) -> Self {
        Self {
            description: description.into(),
            success: false,
            error: Some(error.to_string()),
            skipped: error.is_unavailable(),
        }
    }

    fn skipped(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            success: false,
            error: None,
            skipped: true,
        }
    }
}

/// Summary of executing all effects for an event outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectExecutionSummary {
    /// The event whose effects ran
    pub event_id: EventId,
    /// Which outcome produced them ("automatic", a choice's text, "quest rewards")
    pub outcome: String,
    /// Results for each effect
    pub results: Vec<EffectExecutionResult>,
    /// Count of successfully executed effects
    pub success_count: usize,
    /// Count of failed effects (excluding skipped ones)
    pub failure_count: usize,
    /// Count of effects skipped without an attempt
    pub skipped_count: usize,
}

/// Executes event effects when events resolve or quests pay out.
///
/// Dispatches by effect variant:
/// - ModifyResource via the resource pool (the pool owns its floor)
/// - ModifyHealth via the member health store
/// - AddLogEntry via the journal
/// - UnlockContent via the flag store
pub struct EffectExecutor {
    world: Collaborators,
    random: Arc<dyn RandomPort>,
}

impl EffectExecutor {
    pub fn new(world: Collaborators, random: Arc<dyn RandomPort>) -> Self {
        Self { world, random }
    }

    /// Execute all effects from one outcome.
    ///
    /// # Arguments
    /// * `event_id` - The event being resolved
    /// * `title` - Event name, used as the journal title
    /// * `outcome` - Label for the outcome the effects came from
    /// * `effects` - List of effects to execute
    pub fn execute(
        &self,
        event_id: &EventId,
        title: &str,
        outcome: &str,
        effects: &[EventEffect],
    ) -> EffectExecutionSummary {
        let results: Vec<EffectExecutionResult> = effects
            .iter()
            .map(|effect| self.apply(title, effect))
            .collect();

        let success_count = results.iter().filter(|r| r.success).count();
        let skipped_count = results.iter().filter(|r| r.skipped).count();
        let failure_count = results.iter().filter(|r| !r.success && !r.skipped).count();

        for result in results.iter().filter(|r| !r.success) {
            tracing::warn!(
                event_id = %event_id,
                effect = %result.description,
                error = result.error.as_deref().unwrap_or("skipped"),
                "Effect not applied"
            );
        }

        tracing::info!(
            event_id = %event_id,
            outcome = %outcome,
            total_effects = results.len(),
            success_count = success_count,
            failure_count = failure_count,
            skipped_count = skipped_count,
            "Executed event effects"
        );

        EffectExecutionSummary {
            event_id: event_id.clone(),
            outcome: outcome.to_string(),
            results,
            success_count,
            failure_count,
            skipped_count,
        }
    }

    /// Execute a single effect.
    pub fn apply(&self, title: &str, effect: &EventEffect) -> EffectExecutionResult {
        let description = effect.describe();
        let outcome = match effect {
            EventEffect::ModifyResource { kind, delta } => self.modify_resource(*kind, *delta),
            EventEffect::ModifyHealth {
                affects_all,
                health_delta,
                cure_illness,
                cause_illness,
            } => self.modify_health(*affects_all, *health_delta, *cure_illness, *cause_illness),
            EventEffect::AddLogEntry { message } => self.add_log_entry(title, message),
            EventEffect::UnlockContent { target_id } => self.unlock_content(target_id),
            EventEffect::Unsupported => {
                return EffectExecutionResult::skipped(description);
            }
        };

        match outcome {
            Ok(Some(note)) => EffectExecutionResult::ok(format!("{} ({})", description, note)),
            Ok(None) => EffectExecutionResult::ok(description),
            Err(error) => EffectExecutionResult::failed(description, &error),
        }
    }

    // =========================================================================
    // Individual effect implementations
    // =========================================================================

    fn modify_resource(
        &self,
        kind: ResourceKind,
        delta: i32,
    ) -> Result<Option<String>, CollaboratorError> {
        let pool = self.world.resources()?;
        if delta >= 0 {
            pool.credit(kind, delta.unsigned_abs())?;
            return Ok(None);
        }
        let wanted = delta.unsigned_abs();
        let removed = pool.debit_clamped(kind, wanted)?;
        if removed < wanted {
            return Ok(Some(format!("clamped to {}", removed)));
        }
        Ok(None)
    }

    fn modify_health(
        &self,
        affects_all: bool,
        health_delta: i32,
        cure_illness: bool,
        cause_illness: bool,
    ) -> Result<Option<String>, CollaboratorError> {
        let members = self.world.members()?;
        let living = members.living_members()?;
        if living.is_empty() {
            return Ok(Some("no living members".to_string()));
        }

        let targets: Vec<MemberId> = if affects_all {
            living
        } else {
            let index = pick_index(self.random.as_ref(), living.len());
            living.into_iter().skip(index).take(1).collect()
        };

        let apply_to = |member: &MemberId| -> Result<(), CollaboratorError> {
            if health_delta != 0 {
                members.heal(member, health_delta)?;
            }
            if cure_illness {
                members.set_illness(member, false)?;
            }
            if cause_illness {
                members.set_illness(member, true)?;
            }
            Ok(())
        };

        // A failing member does not stop the rest; the first error is reported.
        let mut first_error = None;
        for member in &targets {
            if let Err(error) = apply_to(member) {
                tracing::warn!(
                    member = %member,
                    error = %error,
                    "Health change failed for member"
                );
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }
        if let Some(error) = first_error {
            return Err(error);
        }

        if affects_all {
            Ok(Some(format!("{} members", targets.len())))
        } else {
            Ok(targets.first().map(|m| m.to_string()))
        }
    }

    fn add_log_entry(&self, title: &str, message: &str) -> Result<Option<String>, CollaboratorError> {
        self.world.journal()?.append(title, message)?;
        Ok(None)
    }

    fn unlock_content(&self, target_id: &FlagId) -> Result<Option<String>, CollaboratorError> {
        let flags = self.world.flags()?;
        if flags.is_set(target_id)? {
            return Ok(Some("already unlocked".to_string()));
        }
        flags.set(target_id)?;
        Ok(None)
    }
}

/// Uniform index in `0..len` drawn from the random port.
fn pick_index(random: &dyn RandomPort, len: usize) -> usize {
    let index = (random.roll().clamp(0.0, 1.0) * len as f32) as usize;
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::infrastructure::clock::FixedRandom;
    use crate::infrastructure::memory::{InMemoryFlags, InMemoryJournal, InMemoryResourcePool, InMemoryRoster};
    use crate::infrastructure::ports::{FlagPort, MockFlagPort, MockMemberHealthPort, ResourcePoolPort};

    fn executor(world: Collaborators) -> EffectExecutor {
        EffectExecutor::new(world, Arc::new(FixedRandom(0.0)))
    }

    fn id() -> EventId {
        EventId::new("night_watch")
    }

    #[test]
    fn modify_resource_credits_and_clamps() {
        let pool = Arc::new(InMemoryResourcePool::new().with_amount(ResourceKind::Food, 10));
        let executor = executor(Collaborators::new().with_resources(pool.clone()));

        let summary = executor.execute(
            &id(),
            "Night Watch",
            "automatic",
            &[
                EventEffect::ModifyResource {
                    kind: ResourceKind::Food,
                    delta: 5,
                },
                EventEffect::ModifyResource {
                    kind: ResourceKind::Food,
                    delta: -40,
                },
            ],
        );
        assert_eq!(summary.success_count, 2);
        assert_eq!(pool.amount(ResourceKind::Food).unwrap(), 0);
        assert!(summary.results[1].description.contains("clamped to 15"));
    }

    #[test]
    fn modify_health_all_members_applies_delta_then_illness() {
        let roster = Arc::new(
            InMemoryRoster::new()
                .with_member("ana", 50)
                .with_member("ben", 60),
        );
        let executor = executor(Collaborators::new().with_members(roster.clone()));
        let result = executor.apply(
            "Fever",
            &EventEffect::ModifyHealth {
                affects_all: true,
                health_delta: -10,
                cure_illness: false,
                cause_illness: true,
            },
        );
        assert!(result.success);
        let ana = roster.member(&MemberId::new("ana")).unwrap();
        let ben = roster.member(&MemberId::new("ben")).unwrap();
        assert_eq!((ana.health, ana.ill), (40, true));
        assert_eq!((ben.health, ben.ill), (50, true));
    }

    #[test]
    fn modify_health_single_member_uses_random_pick() {
        let roster = Arc::new(
            InMemoryRoster::new()
                .with_member("ana", 50)
                .with_member("ben", 50),
        );
        let executor = EffectExecutor::new(
            Collaborators::new().with_members(roster.clone()),
            Arc::new(FixedRandom(0.99)),
        );
        executor.apply(
            "Bandage",
            &EventEffect::ModifyHealth {
                affects_all: false,
                health_delta: 20,
                cure_illness: true,
                cause_illness: false,
            },
        );
        assert_eq!(roster.member(&MemberId::new("ana")).unwrap().health, 50);
        assert_eq!(roster.member(&MemberId::new("ben")).unwrap().health, 70);
    }

    #[test]
    fn cure_only_skips_heal_call() {
        let mut members = MockMemberHealthPort::new();
        members
            .expect_living_members()
            .returning(|| Ok(vec![MemberId::new("ana")]));
        members.expect_heal().never();
        members
            .expect_set_illness()
            .with(eq(MemberId::new("ana")), eq(false))
            .times(1)
            .returning(|_, _| Ok(()));
        let executor = executor(Collaborators::new().with_members(Arc::new(members)));
        let result = executor.apply(
            "Antibiotics",
            &EventEffect::ModifyHealth {
                affects_all: true,
                health_delta: 0,
                cure_illness: true,
                cause_illness: false,
            },
        );
        assert!(result.success);
    }

    #[test]
    fn failing_member_does_not_skip_the_rest() {
        let mut members = MockMemberHealthPort::new();
        members
            .expect_living_members()
            .returning(|| Ok(vec![MemberId::new("ana"), MemberId::new("ben")]));
        members
            .expect_heal()
            .with(eq(MemberId::new("ana")), eq(10))
            .times(1)
            .returning(|_, _| Err(CollaboratorError::rejected("roster", "ana is away")));
        members
            .expect_heal()
            .with(eq(MemberId::new("ben")), eq(10))
            .times(1)
            .returning(|_, _| Ok(()));
        let executor = executor(Collaborators::new().with_members(Arc::new(members)));

        let result = executor.apply(
            "Field Medic",
            &EventEffect::ModifyHealth {
                affects_all: true,
                health_delta: 10,
                cure_illness: false,
                cause_illness: false,
            },
        );
        assert!(!result.success);
        assert!(!result.skipped);
        assert!(result.error.as_deref().unwrap().contains("ana is away"));
    }

    #[test]
    fn log_entry_goes_to_journal_with_event_title() {
        let journal = Arc::new(InMemoryJournal::new());
        let executor = executor(Collaborators::new().with_journal(journal.clone()));
        executor.apply(
            "Distress Call",
            &EventEffect::AddLogEntry {
                message: "Static, then a voice.".into(),
            },
        );
        let entries = journal.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Distress Call");
        assert_eq!(entries[0].text, "Static, then a voice.");
    }

    #[test]
    fn unlock_is_idempotent() {
        let flags = Arc::new(InMemoryFlags::new());
        let executor = executor(Collaborators::new().with_flags(flags.clone()));
        let unlock = EventEffect::UnlockContent {
            target_id: FlagId::new("water_filter_recipe"),
        };
        assert!(executor.apply("Manual", &unlock).success);
        let again = executor.apply("Manual", &unlock);
        assert!(again.success);
        assert!(again.description.contains("already unlocked"));
        assert!(flags.is_set(&FlagId::new("water_filter_recipe")).unwrap());
    }

    #[test]
    fn unlock_of_set_flag_never_writes() {
        let mut flags = MockFlagPort::new();
        flags.expect_is_set().returning(|_| Ok(true));
        flags.expect_set().never();
        let executor = executor(Collaborators::new().with_flags(Arc::new(flags)));
        let result = executor.apply(
            "Manual",
            &EventEffect::UnlockContent {
                target_id: FlagId::new("recipe"),
            },
        );
        assert!(result.success);
    }

    #[test]
    fn failures_do_not_stop_remaining_effects() {
        let pool = Arc::new(InMemoryResourcePool::new());
        // No journal and no roster wired in.
        let executor = executor(Collaborators::new().with_resources(pool.clone()));
        let summary = executor.execute(
            &id(),
            "Night Watch",
            "automatic",
            &[
                EventEffect::AddLogEntry {
                    message: "lost".into(),
                },
                EventEffect::Unsupported,
                EventEffect::ModifyResource {
                    kind: ResourceKind::Water,
                    delta: 3,
                },
            ],
        );
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.skipped_count, 2);
        assert_eq!(summary.failure_count, 0);
        assert_eq!(pool.amount(ResourceKind::Water).unwrap(), 3);
    }

    #[test]
    fn rejected_collaborator_counts_as_failure() {
        let mut members = MockMemberHealthPort::new();
        members
            .expect_living_members()
            .returning(|| Err(CollaboratorError::rejected("roster", "offline")));
        let executor = executor(Collaborators::new().with_members(Arc::new(members)));
        let summary = executor.execute(
            &id(),
            "Night Watch",
            "automatic",
            &[EventEffect::ModifyHealth {
                affects_all: true,
                health_delta: 5,
                cure_illness: false,
                cause_illness: false,
            }],
        );
        assert_eq!(summary.failure_count, 1);
        assert!(summary.results[0].error.as_deref().unwrap().contains("offline"));
    }

    #[test]
    fn pick_index_stays_in_bounds() {
        assert_eq!(pick_index(&FixedRandom(0.0), 3), 0);
        assert_eq!(pick_index(&FixedRandom(0.5), 3), 1);
        assert_eq!(pick_index(&FixedRandom(0.9999), 3), 2);
        assert_eq!(pick_index(&FixedRandom(1.0), 3), 2);
    }
}
