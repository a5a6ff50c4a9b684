//! Room Runner - A top-down survival arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world streaming, difficulty, spawning, level lifecycle)
//! - `config`: Data-driven level setup and balance
//! - `highscores`: Best survival times per level
//! - `error`: Error taxonomy shared by the modules above

pub mod config;
pub mod error;
pub mod highscores;
pub mod sim;

pub use config::{LevelConfig, WorldSourceKind};
pub use error::{ConfigError, LayoutError, LevelError, StoreError};
pub use highscores::HighScores;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World geometry
    pub const TILE_SIZE: u32 = 32;
    pub const CHUNK_SIZE: usize = 16;
    pub const WORLD_CHUNKS_X: i32 = 8;
    pub const WORLD_CHUNKS_Y: i32 = 8;
    /// Extra ring of chunks materialized beyond the viewport
    pub const CHUNK_PADDING: i32 = 1;

    /// Viewport defaults
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 200.0;
    pub const PLAYER_RADIUS: f32 = 12.0;

    /// Pursuer defaults
    pub const MAX_PURSUERS: usize = 20;
    pub const PURSUER_RADIUS: f32 = 12.0;
    /// Distance beyond the viewport edge where pursuers appear
    pub const SPAWN_EDGE_PADDING: f32 = 50.0;
    /// Pursuers farther than viewport height * this are replaced
    pub const REPLACE_DISTANCE_FACTOR: f32 = 1.5;
    /// Off-line drift (px) before a pursuer re-acquires the player
    pub const REACQUIRE_THRESHOLD: f32 = 32.0;

    /// Difficulty curve defaults
    pub const INITIAL_PURSUER_SPEED: f32 = 100.0;
    pub const MAX_PURSUER_SPEED: f32 = 300.0;
    pub const PURSUER_SPEED_STEP: f32 = 20.0;
    pub const SPEED_STEP_SCORE_INTERVAL: f32 = 10.0;
    pub const INITIAL_SPAWN_INTERVAL_MS: u32 = 2000;
    pub const MIN_SPAWN_INTERVAL_MS: u32 = 500;
    pub const SPAWN_INTERVAL_STEP_MS: u32 = 150;
    pub const INTERVAL_STEP_SCORE_INTERVAL: f32 = 10.0;
    pub const DIFFICULTY_UPDATE_INTERVAL_SCORE: f32 = 1.0;

    /// Survival clock
    pub const TIME_TO_SURVIVE_SECS: u32 = 120;
    pub const CLOCK_PERIOD_MS: u32 = 1000;
}

/// Axis-aligned rectangle in world pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle of `size` centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Clamp a point into `[0, bounds.x] x [0, bounds.y]`
#[inline]
pub fn clamp_to_bounds(point: Vec2, bounds: Vec2) -> Vec2 {
    point.clamp(Vec2::ZERO, bounds.max(Vec2::ZERO))
}

/// Shortest distance from `point` to the ray starting at `origin` along `dir`.
///
/// Points behind the origin measure to the origin itself; a zero direction
/// degenerates to the distance between the two points.
#[inline]
pub fn distance_to_ray(point: Vec2, origin: Vec2, dir: Vec2) -> f32 {
    let to_point = point - origin;
    let dir = dir.normalize_or_zero();
    if dir == Vec2::ZERO || to_point.dot(dir) < 0.0 {
        return to_point.length();
    }
    to_point.perp_dot(dir).abs()
}
