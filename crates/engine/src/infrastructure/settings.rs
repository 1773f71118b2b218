//! Engine settings loaded from the environment.
//!
//! All variables are prefixed with `LASTLIGHT_`. Missing or unparseable values
//! fall back to defaults.
//!
//! - `LASTLIGHT_RNG_SEED` - Seed for deterministic runs (default: entropy)
//! - `LASTLIGHT_TRIGGER_CHANCE_MULTIPLIER` - Difficulty factor on trigger chances (default: 1.0)
//! - `LASTLIGHT_CATALOGUE_PATH` - JSON catalogue for the demo runner (default: built-in sample)
//! - `LASTLIGHT_DEMO_DAYS` - Days simulated by the demo runner (default: 10)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    pub rng_seed: Option<u64>,
    pub trigger_chance_multiplier: f32,
    pub catalogue_path: Option<PathBuf>,
    pub demo_days: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            rng_seed: None,
            trigger_chance_multiplier: 1.0,
            catalogue_path: None,
            demo_days: 10,
        }
    }
}

impl EngineSettings {
    /// Load from environment variables, using defaults for missing values
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            rng_seed: std::env::var("LASTLIGHT_RNG_SEED")
                .ok()
                .and_then(|v| v.parse().ok()),
            trigger_chance_multiplier: env_or(
                "LASTLIGHT_TRIGGER_CHANCE_MULTIPLIER",
                defaults.trigger_chance_multiplier,
            ),
            catalogue_path: std::env::var("LASTLIGHT_CATALOGUE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            demo_days: env_or("LASTLIGHT_DEMO_DAYS", defaults.demo_days),
        }
        .sanitized()
    }

    /// Replace out-of-range values with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.trigger_chance_multiplier.is_finite() || self.trigger_chance_multiplier < 0.0 {
            tracing::warn!(
                value = self.trigger_chance_multiplier,
                "Ignoring invalid trigger chance multiplier"
            );
            self.trigger_chance_multiplier = defaults.trigger_chance_multiplier;
        }
        self
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
