//! Testability ports for injecting the current day and randomness.

use lastlight_domain::GameDay;

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait DayClockPort: Send + Sync {
    fn current_day(&self) -> GameDay;
}

#[cfg_attr(test, mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// Uniform sample in `[0, 1)`.
    fn roll(&self) -> f32;
}
