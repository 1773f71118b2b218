//! Day clock and random implementations.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use lastlight_domain::GameDay;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::infrastructure::ports::{DayClockPort, RandomPort};

/// Day clock advanced explicitly by the host loop.
pub struct ManualDayClock {
    day: AtomicU32,
}

impl ManualDayClock {
    pub fn new(start_day: GameDay) -> Self {
        Self {
            day: AtomicU32::new(start_day),
        }
    }

    /// Move to the next day and return it.
    pub fn advance(&self) -> GameDay {
        self.day.fetch_add(1, Ordering::SeqCst).saturating_add(1)
    }

    pub fn set(&self, day: GameDay) {
        self.day.store(day, Ordering::SeqCst);
    }
}

impl DayClockPort for ManualDayClock {
    fn current_day(&self) -> GameDay {
        self.day.load(Ordering::SeqCst)
    }
}

/// Seedable random source. Same seed, same rolls.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Restart the sequence, e.g. when replaying from a snapshot.
    pub fn reseed(&self, seed: u64) {
        match self.rng.lock() {
            Ok(mut rng) => *rng = StdRng::seed_from_u64(seed),
            Err(poisoned) => *poisoned.into_inner() = StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomPort for SeededRandom {
    fn roll(&self) -> f32 {
        let mut rng = match self.rng.lock() {
            Ok(rng) => rng,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.gen::<f32>()
    }
}

/// Fixed random for testing.
#[cfg(test)]
pub struct FixedRandom(pub f32);

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn roll(&self) -> f32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_one_day_at_a_time() {
        let clock = ManualDayClock::new(1);
        assert_eq!(clock.current_day(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.current_day(), 2);
        clock.set(10);
        assert_eq!(clock.current_day(), 10);
    }

    #[test]
    fn same_seed_same_rolls() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        let rolls_a: Vec<f32> = (0..8).map(|_| a.roll()).collect();
        let rolls_b: Vec<f32> = (0..8).map(|_| b.roll()).collect();
        assert_eq!(rolls_a, rolls_b);
        assert!(rolls_a.iter().all(|r| (0.0..1.0).contains(r)));
    }

    #[test]
    fn reseed_restarts_the_sequence() {
        let random = SeededRandom::new(7);
        let first: Vec<f32> = (0..4).map(|_| random.roll()).collect();
        random.reseed(7);
        let again: Vec<f32> = (0..4).map(|_| random.roll()).collect();
        assert_eq!(first, again);
    }
}
