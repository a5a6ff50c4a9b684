//! Survival countdown
//!
//! Ticked once per simulated second. Reaching zero reports expiry exactly once.

use serde::{Deserialize, Serialize};

/// Result of one clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// Still counting down
    Running { remaining_secs: u32 },
    /// This tick reached zero; fires once per clock
    Expired,
    /// Already expired earlier
    Idle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalClock {
    total_secs: u32,
    remaining_secs: u32,
    expired: bool,
}

impl SurvivalClock {
    pub fn new(total_secs: u32) -> Self {
        Self {
            total_secs,
            remaining_secs: total_secs,
            expired: false,
        }
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Remaining / total in `[0, 1]`, for the HUD bar
    pub fn progress(&self) -> f32 {
        if self.total_secs == 0 {
            return 0.0;
        }
        self.remaining_secs as f32 / self.total_secs as f32
    }

    pub fn tick(&mut self) -> ClockTick {
        if self.expired {
            return ClockTick::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.expired = true;
            return ClockTick::Expired;
        }
        ClockTick::Running {
            remaining_secs: self.remaining_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_exactly_once() {
        let mut clock = SurvivalClock::new(40);
        let mut expirations = 0;
        for _ in 0..40 {
            if clock.tick() == ClockTick::Expired {
                expirations += 1;
            }
        }
        assert_eq!(expirations, 1);
        assert_eq!(clock.remaining_secs(), 0);
        assert_eq!(clock.tick(), ClockTick::Idle);
        assert_eq!(clock.tick(), ClockTick::Idle);
        assert_eq!(clock.remaining_secs(), 0);
    }

    #[test]
    fn test_progress() {
        let mut clock = SurvivalClock::new(4);
        assert_eq!(clock.progress(), 1.0);
        clock.tick();
        assert_eq!(clock.progress(), 0.75);
        assert_eq!(clock.tick(), ClockTick::Running { remaining_secs: 2 });
    }

    #[test]
    fn test_zero_length_clock() {
        let mut clock = SurvivalClock::new(0);
        assert_eq!(clock.progress(), 0.0);
        assert_eq!(clock.tick(), ClockTick::Expired);
    }
}
