//! Last Light Engine - demo runner.
//!
//! Simulates a handful of days against in-memory world state and the
//! auto presenter, logging each day report.

use std::sync::Arc;

use lastlight_domain::{ObjectiveType, ResourceKind};
use lastlight_engine::entities::EventCatalogue;
use lastlight_engine::infrastructure::{
    clock::ManualDayClock,
    memory::{InMemoryFlags, InMemoryInventory, InMemoryJournal, InMemoryResourcePool, InMemoryRoster},
    ports::Collaborators,
    presenter::AutoPresenter,
    settings::EngineSettings,
};
use lastlight_engine::App;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SAMPLE_CATALOGUE: &str = include_str!("../data/sample_catalogue.json");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lastlight_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Last Light Engine");

    let settings = EngineSettings::from_env();
    let catalogue = match &settings.catalogue_path {
        Some(path) => EventCatalogue::load_file(path)?,
        None => EventCatalogue::from_json_str(SAMPLE_CATALOGUE)?,
    };
    for rejected in catalogue.rejected() {
        tracing::warn!(
            event_id = ?rejected.event_id,
            error = %rejected.error,
            "Event definition rejected"
        );
    }

    let resources = Arc::new(
        InMemoryResourcePool::new()
            .with_amount(ResourceKind::Food, 10)
            .with_amount(ResourceKind::Water, 8)
            .with_amount(ResourceKind::Fuel, 4),
    );
    let journal = Arc::new(InMemoryJournal::new());
    let inventory = Arc::new(InMemoryInventory::new());
    let world = Collaborators::new()
        .with_resources(resources)
        .with_members(Arc::new(
            InMemoryRoster::new()
                .with_member("mara", 90)
                .with_member("ilya", 70)
                .with_member("june", 55),
        ))
        .with_inventory(inventory.clone())
        .with_flags(Arc::new(InMemoryFlags::new()))
        .with_journal(journal.clone());

    let clock = Arc::new(ManualDayClock::new(1));
    let days = settings.demo_days;
    let mut app = App::new(settings, catalogue, world, clock.clone());
    let presenter = AutoPresenter::new();

    for _ in 0..days {
        let report = app.run_current_day(&presenter).await?;
        tracing::info!(
            day = report.day,
            fired = ?report.fired().collect::<Vec<_>>(),
            scheduled = report.scheduled.len(),
            quest_updates = report.quest_transitions.len(),
            "Day finished"
        );

        // Scavengers bring back a battery every third day.
        if report.day % 3 == 0 {
            inventory.add("battery".into(), 1);
            app.engine
                .record_progress(ObjectiveType::CollectItem, "battery", 1);
        }
        clock.advance();
    }

    for entry in journal.entries() {
        tracing::info!(title = %entry.title, "{}", entry.text);
    }
    tracing::info!(snapshot = %app.engine.snapshot_json()?, "Final engine state");

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
