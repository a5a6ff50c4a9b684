//! Level state and core simulation types
//!
//! Everything the presentation layer reads (positions, phase, events) lives
//! here; only the simulation mutates it.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::layout::ChunkCoord;
use crate::{Rect, clamp_to_bounds, distance_to_ray};

/// How a level ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelOutcome {
    /// Survived until the clock ran out
    Won,
    /// Caught by a pursuer
    Lost,
}

/// Current lifecycle phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    /// World and player being built
    Initializing,
    /// Active gameplay
    Running,
    /// Suspended by the host; no periodic process advances
    Paused,
    /// Run ended
    Ended(LevelOutcome),
    /// Construction failed; the level never ran or was halted
    Failed,
}

impl LevelPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelPhase::Initializing => "initializing",
            LevelPhase::Running => "running",
            LevelPhase::Paused => "paused",
            LevelPhase::Ended(LevelOutcome::Won) => "won",
            LevelPhase::Ended(LevelOutcome::Lost) => "lost",
            LevelPhase::Failed => "failed",
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self, LevelPhase::Ended(_) | LevelPhase::Failed)
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    /// Movement speed (px/s)
    pub speed: f32,
}

impl Player {
    pub fn new(pos: Vec2, radius: f32, speed: f32) -> Self {
        Self { pos, radius, speed }
    }

    /// Move by an input intent, axis by axis, refusing steps into blocked
    /// positions and staying inside `bounds`.
    ///
    /// The intent is clamped to unit length so diagonals are not faster.
    pub fn step<F>(&mut self, intent: Vec2, dt: f32, bounds: Vec2, blocked: F)
    where
        F: Fn(Vec2) -> bool,
    {
        let delta = intent.clamp_length_max(1.0) * self.speed * dt;
        if delta == Vec2::ZERO {
            return;
        }

        let try_x = clamp_to_bounds(Vec2::new(self.pos.x + delta.x, self.pos.y), bounds);
        if !blocked(try_x) {
            self.pos = try_x;
        }
        let try_y = clamp_to_bounds(Vec2::new(self.pos.x, self.pos.y + delta.y), bounds);
        if !blocked(try_y) {
            self.pos = try_y;
        }
    }
}

/// A homing enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pursuer {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Player position at the last retarget
    pub target: Vec2,
}

impl Pursuer {
    pub fn new(id: u32, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            target: pos,
        }
    }

    /// Head straight for `target` at `speed`
    pub fn home_toward(&mut self, target: Vec2, speed: f32) {
        self.target = target;
        self.vel = (target - self.pos).normalize_or_zero() * speed;
    }

    /// Stationary, or the player is more than `threshold` off our line of
    /// travel (including having overshot them)
    pub fn needs_retarget(&self, player: Vec2, threshold: f32) -> bool {
        self.vel == Vec2::ZERO || distance_to_ray(player, self.pos, self.vel) > threshold
    }

    pub fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }
}

/// Notifications for the presentation layer, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelEvent {
    Started,
    ChunkMaterialized { coord: ChunkCoord },
    PursuerSpawned { id: u32, pos: Vec2 },
    PursuerReplaced { old_id: u32, new_id: Option<u32> },
    DifficultyChanged { speed: f32, spawn_interval_ms: u32 },
    ClockTicked { remaining_secs: u32, progress: f32 },
    Paused,
    Resumed,
    Ended { outcome: LevelOutcome, score: f32 },
    Failed { reason: String },
}

/// What the HUD shows each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub remaining_secs: u32,
    /// Remaining / total, 1.0 at start
    pub progress: f32,
    pub score: f32,
    pub live_pursuers: usize,
    pub viewport: Rect,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream.wrapping_mul(2).wrapping_add(1))
    }
}

/// Rectangle of `size` centered on `focus`, pushed back inside the world.
///
/// Pinned at the origin on any axis where the world is smaller than the view.
pub fn viewport_around(focus: Vec2, size: Vec2, world: Vec2) -> Rect {
    let half = size * 0.5;
    let max_center = (world - half).max(half);
    let center = focus.clamp(half, max_center);
    Rect::from_center(center, size)
}
