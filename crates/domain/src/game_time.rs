//! Day arithmetic for trigger windows and delayed follow-ups.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One in-game day. Day numbering is owned by the host's day clock.
pub type GameDay = u32;

/// Inclusive range of days during which an event may trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayWindow {
    min_day: GameDay,
    max_day: GameDay,
}

impl DayWindow {
    pub fn new(min_day: GameDay, max_day: GameDay) -> Result<Self, DomainError> {
        if min_day > max_day {
            return Err(DomainError::validation(format!(
                "minDay {} is after maxDay {}",
                min_day, max_day
            )));
        }
        Ok(Self { min_day, max_day })
    }

    /// A window that spans the entire run.
    pub fn always() -> Self {
        Self {
            min_day: 0,
            max_day: GameDay::MAX,
        }
    }

    /// A window covering exactly one day.
    pub fn single(day: GameDay) -> Self {
        Self {
            min_day: day,
            max_day: day,
        }
    }

    pub fn min_day(&self) -> GameDay {
        self.min_day
    }

    pub fn max_day(&self) -> GameDay {
        self.max_day
    }

    pub fn contains(&self, day: GameDay) -> bool {
        self.min_day <= day && day <= self.max_day
    }
}

/// Convert an authored (possibly fractional) delay into whole days.
///
/// Fractions round to the nearest day, halves away from zero. Negative or
/// non-finite delays are rejected.
pub fn delay_in_days(delay_days: f32) -> Result<u32, DomainError> {
    if !delay_days.is_finite() || delay_days < 0.0 {
        return Err(DomainError::validation(format!(
            "follow-up delay must be a non-negative number of days, got {}",
            delay_days
        )));
    }
    let rounded = delay_days.round();
    if rounded > u32::MAX as f32 {
        return Err(DomainError::validation("follow-up delay is too large"));
    }
    Ok(rounded as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_inclusive() {
        let window = DayWindow::new(3, 5).unwrap();
        assert!(!window.contains(2));
        assert!(window.contains(3));
        assert!(window.contains(5));
        assert!(!window.contains(6));
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert!(DayWindow::new(5, 3).is_err());
    }

    #[test]
    fn single_day_window() {
        let window = DayWindow::single(3);
        assert!(window.contains(3));
        assert!(!window.contains(4));
    }

    #[test]
    fn delays_round_to_nearest_day() {
        assert_eq!(delay_in_days(2.0).unwrap(), 2);
        assert_eq!(delay_in_days(1.4).unwrap(), 1);
        assert_eq!(delay_in_days(1.5).unwrap(), 2);
        assert_eq!(delay_in_days(0.2).unwrap(), 0);
    }

    #[test]
    fn negative_and_nan_delays_are_rejected() {
        assert!(delay_in_days(-1.0).is_err());
        assert!(delay_in_days(f32::NAN).is_err());
        assert!(delay_in_days(f32::INFINITY).is_err());
    }
}
