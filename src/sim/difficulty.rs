//! Difficulty curve
//!
//! Pursuer speed and spawn interval are piecewise-constant step functions of
//! score (elapsed survival seconds), each clamped independently. Recomputation
//! is throttled to once per `update_interval_score` units of score.

use serde::{Deserialize, Serialize};

use crate::config::DifficultyParams;

/// Current output of the curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyState {
    /// Pursuer speed (px/s)
    pub pursuer_speed: f32,
    pub spawn_interval_ms: u32,
    /// Score at the last recompute
    pub last_recompute_score: f32,
}

/// What a recompute changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DifficultyChange {
    pub speed: bool,
    pub interval: bool,
}

impl DifficultyChange {
    pub fn any(&self) -> bool {
        self.speed || self.interval
    }
}

#[derive(Debug, Clone)]
pub struct DifficultyCurve {
    params: DifficultyParams,
    state: DifficultyState,
}

impl DifficultyCurve {
    pub fn new(params: DifficultyParams) -> Self {
        Self {
            state: DifficultyState {
                pursuer_speed: params.initial_speed,
                spawn_interval_ms: params.initial_interval_ms,
                last_recompute_score: 0.0,
            },
            params,
        }
    }

    pub fn params(&self) -> &DifficultyParams {
        &self.params
    }

    pub fn state(&self) -> &DifficultyState {
        &self.state
    }

    #[inline]
    pub fn pursuer_speed(&self) -> f32 {
        self.state.pursuer_speed
    }

    #[inline]
    pub fn spawn_interval_ms(&self) -> u32 {
        self.state.spawn_interval_ms
    }

    /// Speed at `score`: `min(initial + floor(score / interval) * step, max)`
    pub fn speed_at(&self, score: f32) -> f32 {
        let p = &self.params;
        let steps = (score.max(0.0) / p.speed_step_score_interval).floor();
        (p.initial_speed + steps * p.speed_step).min(p.max_speed)
    }

    /// Interval at `score`: `max(initial - floor(score / interval) * step, min)`
    pub fn interval_at(&self, score: f32) -> u32 {
        let p = &self.params;
        let steps = (score.max(0.0) / p.interval_step_score_interval).floor() as u64;
        let reduction = steps.saturating_mul(p.interval_step_ms as u64);
        let interval = (p.initial_interval_ms as u64).saturating_sub(reduction);
        interval.max(p.min_interval_ms as u64) as u32
    }

    /// Recompute from `score` unless it moved less than `update_interval_score`
    /// since the last recompute
    pub fn update(&mut self, score: f32) -> DifficultyChange {
        if score - self.state.last_recompute_score < self.params.update_interval_score {
            return DifficultyChange::default();
        }
        self.state.last_recompute_score = score;

        let speed = self.speed_at(score);
        let interval = self.interval_at(score);
        let change = DifficultyChange {
            speed: speed != self.state.pursuer_speed,
            interval: interval != self.state.spawn_interval_ms,
        };

        if change.any() {
            self.state.pursuer_speed = speed;
            self.state.spawn_interval_ms = interval;
            log::info!(
                "Difficulty at score {:.1}: speed {:.0} px/s, spawn every {} ms",
                score,
                speed,
                interval
            );
        }
        change
    }
}
