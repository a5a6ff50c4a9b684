//! Periodic processes
//!
//! A `PeriodicTimer` fires on a fixed cadence driven by simulation time. It is
//! owned by the level and advanced from the frame update, so pausing is just
//! not advancing: the elapsed offset is preserved and nothing fires while
//! paused. A single advance fires at most once; whole periods missed during a
//! long frame are dropped so it never produces a burst.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicTimer {
    period_ms: f32,
    elapsed_ms: f32,
    paused: bool,
    cancelled: bool,
    fired: u64,
}

impl PeriodicTimer {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms: period_ms.max(1) as f32,
            elapsed_ms: 0.0,
            paused: false,
            cancelled: false,
            fired: 0,
        }
    }

    pub fn period_ms(&self) -> f32 {
        self.period_ms
    }

    /// Time left until the next firing
    pub fn remaining_ms(&self) -> f32 {
        (self.period_ms - self.elapsed_ms).max(0.0)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Number of times this timer has fired
    pub fn fire_count(&self) -> u64 {
        self.fired
    }

    /// Advance by `dt_ms`; returns true if the timer fired
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        if self.paused || self.cancelled {
            return false;
        }
        self.elapsed_ms += dt_ms.max(0.0);
        if self.elapsed_ms < self.period_ms {
            return false;
        }

        self.elapsed_ms %= self.period_ms;
        self.fired += 1;
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Cancel the current cadence and start a new one from zero
    pub fn reschedule(&mut self, period_ms: u32) {
        self.period_ms = period_ms.max(1) as f32;
        self.elapsed_ms = 0.0;
        self.cancelled = false;
    }

    /// Stop for good; a cancelled timer never fires until rescheduled
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_on_period() {
        let mut timer = PeriodicTimer::new(1000);
        assert!(!timer.advance(500.0));
        assert!(!timer.advance(499.0));
        assert!(timer.advance(1.0));
        assert_eq!(timer.fire_count(), 1);
        assert!(!timer.advance(999.0));
        assert!(timer.advance(1.0));
    }

    #[test]
    fn test_no_catch_up_burst() {
        let mut timer = PeriodicTimer::new(100);
        // A huge frame fires once, not ten times
        assert!(timer.advance(1000.0));
        assert_eq!(timer.fire_count(), 1);
        // And does not leave any periods banked
        assert!(!timer.advance(1.0));
        assert!(timer.advance(99.0));
    }

    #[test]
    fn test_pause_preserves_offset() {
        let mut timer = PeriodicTimer::new(1000);
        timer.advance(700.0);
        timer.pause();
        assert!(!timer.advance(5000.0));
        assert_eq!(timer.remaining_ms(), 300.0);
        timer.resume();
        assert!(!timer.advance(299.0));
        assert!(timer.advance(1.0));
    }

    #[test]
    fn test_reschedule_restarts_cadence() {
        let mut timer = PeriodicTimer::new(2000);
        timer.advance(1900.0);
        timer.reschedule(500);
        // The old cadence would have fired after 100 ms
        assert!(!timer.advance(100.0));
        assert!(timer.advance(400.0));
        assert_eq!(timer.period_ms(), 500.0);
    }

    #[test]
    fn test_cancel() {
        let mut timer = PeriodicTimer::new(10);
        timer.cancel();
        assert!(!timer.advance(100.0));
        assert!(timer.is_cancelled());
        assert_eq!(timer.fire_count(), 0);
    }
}
