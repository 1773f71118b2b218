//! Application composition.

use std::sync::Arc;

use crate::entities::{EffectExecutor, EventCatalogue};
use crate::infrastructure::{
    clock::SeededRandom,
    ports::{Collaborators, DayClockPort, PresentationPort, RandomPort},
    settings::EngineSettings,
};
use crate::use_cases::narrative::{
    DayReport, DifficultyModifier, EngineError, EventEngine, TriggerChance,
};

/// Main application state.
///
/// Wires the catalogue, the world collaborators and the random source into an
/// [`EventEngine`] driven by the host's day clock.
pub struct App {
    pub settings: EngineSettings,
    pub engine: EventEngine,
    clock: Arc<dyn DayClockPort>,
    random: Arc<SeededRandom>,
}

impl App {
    pub fn new(
        settings: EngineSettings,
        catalogue: EventCatalogue,
        world: Collaborators,
        clock: Arc<dyn DayClockPort>,
    ) -> Self {
        let random = Arc::new(match settings.rng_seed {
            Some(seed) => SeededRandom::new(seed),
            None => SeededRandom::from_entropy(),
        });
        let random_port: Arc<dyn RandomPort> = random.clone();

        let catalogue = Arc::new(catalogue);
        let executor = Arc::new(EffectExecutor::new(world.clone(), random_port.clone()));
        let chance = TriggerChance::new()
            .with_modifier(DifficultyModifier::new(settings.trigger_chance_multiplier));

        let engine = EventEngine::new(catalogue, world, executor, random_port)
            .with_trigger_chance(chance);

        tracing::info!(
            seeded = settings.rng_seed.is_some(),
            multiplier = settings.trigger_chance_multiplier,
            "Event engine ready"
        );

        Self {
            settings,
            engine,
            clock,
            random,
        }
    }

    #[inline]
    pub fn clock(&self) -> &dyn DayClockPort {
        self.clock.as_ref()
    }

    /// Reseed the random source, e.g. after restoring a save.
    pub fn reseed(&self, seed: u64) {
        self.random.reseed(seed);
    }

    /// Run the day the clock currently reports.
    pub async fn run_current_day(
        &mut self,
        presenter: &dyn PresentationPort,
    ) -> Result<DayReport, EngineError> {
        let day = self.clock.current_day();
        self.engine.run_day(day, presenter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ManualDayClock;
    use crate::infrastructure::presenter::AutoPresenter;
    use crate::test_fixtures::{sample_catalogue, TestWorld};
    use lastlight_domain::ResourceKind;

    #[tokio::test]
    async fn test_sample_catalogue_runs_through_demo_days() {
        let catalogue = sample_catalogue();
        assert!(catalogue.rejected().is_empty());

        let world = TestWorld::new()
            .with_food(10)
            .with_resource(ResourceKind::Fuel, 4);
        let clock = Arc::new(ManualDayClock::new(1));
        let settings = EngineSettings {
            rng_seed: Some(7),
            ..EngineSettings::default()
        };
        let mut app = App::new(settings, catalogue, world.collaborators(), clock.clone());
        let presenter = AutoPresenter::new();

        let mut storm_day = None;
        for _ in 0..10 {
            let report = app.run_current_day(&presenter).await.expect("day runs");
            if report.fired().any(|id| id.as_str() == "dust_storm") {
                storm_day = Some(report.day);
            }
            clock.advance();
        }

        assert_eq!(storm_day, Some(7));
        assert_eq!(world.amount(ResourceKind::Fuel), 2);
        assert_eq!(app.clock().current_day(), 11);
    }
}
