//! Last Light Engine library.
//!
//! Day-driven narrative event engine for a survival game.
//!
//! ## Structure
//!
//! - `entities/` - Catalogue, conditions, requirements, effects and quests
//! - `use_cases/` - The event engine day cycle
//! - `infrastructure/` - Ports and their in-memory/headless implementations
//! - `app` - Application composition

pub mod app;
pub mod entities;
pub mod infrastructure;
pub mod use_cases;

/// Test fixtures shared across engine tests.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
