//! Level configuration
//!
//! One `LevelConfig` value fully describes a level: which world source it
//! streams from, its geometry, timing and difficulty constants, and asset keys.
//! Loaded from JSON or taken from a preset.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::RoomType;

/// Which world source a level streams chunks from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorldSourceKind {
    /// Hand-authored room templates laid out on the chunk grid
    #[default]
    Dungeon,
    /// Per-cell categorical noise
    Procedural,
}

impl WorldSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorldSourceKind::Dungeon => "dungeon",
            WorldSourceKind::Procedural => "procedural",
        }
    }
}

/// Difficulty curve parameters (score is elapsed survival seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyParams {
    /// Pursuer speed at score 0 (px/s)
    pub initial_speed: f32,
    /// Pursuer speed ceiling (px/s)
    pub max_speed: f32,
    /// Speed gained per completed speed step
    pub speed_step: f32,
    /// Score per speed step
    pub speed_step_score_interval: f32,
    /// Spawn interval at score 0
    pub initial_interval_ms: u32,
    /// Spawn interval floor
    pub min_interval_ms: u32,
    /// Interval lost per completed interval step
    pub interval_step_ms: u32,
    /// Score per interval step
    pub interval_step_score_interval: f32,
    /// Minimum score delta between recomputes
    pub update_interval_score: f32,
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self {
            initial_speed: INITIAL_PURSUER_SPEED,
            max_speed: MAX_PURSUER_SPEED,
            speed_step: PURSUER_SPEED_STEP,
            speed_step_score_interval: SPEED_STEP_SCORE_INTERVAL,
            initial_interval_ms: INITIAL_SPAWN_INTERVAL_MS,
            min_interval_ms: MIN_SPAWN_INTERVAL_MS,
            interval_step_ms: SPAWN_INTERVAL_STEP_MS,
            interval_step_score_interval: INTERVAL_STEP_SCORE_INTERVAL,
            update_interval_score: DIFFICULTY_UPDATE_INTERVAL_SCORE,
        }
    }
}

/// Pursuer population and placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnParams {
    pub max_pursuers: usize,
    /// Distance outside the viewport edge where pursuers appear (px)
    pub edge_padding: f32,
    /// Replacement distance as a multiple of viewport height
    pub replace_distance_factor: f32,
    /// Off-line drift before re-targeting (px)
    pub reacquire_threshold: f32,
    pub pursuer_radius: f32,
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            max_pursuers: MAX_PURSUERS,
            edge_padding: SPAWN_EDGE_PADDING,
            replace_distance_factor: REPLACE_DISTANCE_FACTOR,
            reacquire_threshold: REACQUIRE_THRESHOLD,
            pursuer_radius: PURSUER_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerParams {
    pub speed: f32,
    pub radius: f32,
}

impl Default for PlayerParams {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            radius: PLAYER_RADIUS,
        }
    }
}

/// Tileset the chunk layers are built against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilesetConfig {
    /// Asset key handed to the renderer
    pub key: String,
    /// Number of tiles in the tileset (0 = missing)
    pub tile_count: u16,
}

impl Default for TilesetConfig {
    fn default() -> Self {
        Self {
            key: "dungeon_tiles".to_string(),
            tile_count: 16,
        }
    }
}

/// Categorical distribution for procedural chunks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProceduralTiles {
    pub base_tile: u16,
    pub secondary_tile: u16,
    pub path_tile: u16,
    pub path_chance: f32,
    pub secondary_chance: f32,
}

impl Default for ProceduralTiles {
    fn default() -> Self {
        Self {
            base_tile: 5,
            secondary_tile: 6,
            path_tile: 7,
            path_chance: 0.1,
            secondary_chance: 0.2,
        }
    }
}

/// Explicit room assignment for one chunk of a dungeon level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPlacement {
    pub x: i32,
    pub y: i32,
    pub room: RoomType,
}

/// Complete description of one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Level key (also the high score table key)
    pub key: String,
    pub world_source: WorldSourceKind,
    pub seed: u64,
    /// Tile edge length (px)
    pub tile_size: u32,
    /// Chunk edge length (tiles)
    pub chunk_size: usize,
    /// World extent in chunks
    pub world_chunks_x: i32,
    pub world_chunks_y: i32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Chunks materialized beyond the viewport on each side
    pub chunk_padding: i32,
    pub time_to_survive_secs: u32,
    pub difficulty: DifficultyParams,
    pub spawn: SpawnParams,
    pub player: PlayerParams,
    pub tileset: TilesetConfig,
    pub procedural: ProceduralTiles,
    /// Tile indices the player cannot walk through
    pub solid_tiles: Vec<u16>,
    /// Explicit dungeon room assignments (override the default layout)
    pub rooms: Vec<RoomPlacement>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::dungeon()
    }
}

impl LevelConfig {
    /// Hand-authored room level
    pub fn dungeon() -> Self {
        Self {
            key: "dungeon".to_string(),
            world_source: WorldSourceKind::Dungeon,
            seed: 0x5eed,
            tile_size: TILE_SIZE,
            chunk_size: CHUNK_SIZE,
            world_chunks_x: WORLD_CHUNKS_X,
            world_chunks_y: WORLD_CHUNKS_Y,
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            chunk_padding: CHUNK_PADDING,
            time_to_survive_secs: TIME_TO_SURVIVE_SECS,
            difficulty: DifficultyParams::default(),
            spawn: SpawnParams::default(),
            player: PlayerParams::default(),
            tileset: TilesetConfig::default(),
            procedural: ProceduralTiles::default(),
            solid_tiles: vec![crate::sim::rooms::TILE_WALL, crate::sim::rooms::TILE_PILLAR],
            rooms: Vec::new(),
        }
    }

    /// Open-world procedural level
    pub fn open_world() -> Self {
        Self {
            key: "open_world".to_string(),
            world_source: WorldSourceKind::Procedural,
            tileset: TilesetConfig {
                key: "overworld_tiles".to_string(),
                tile_count: 16,
            },
            solid_tiles: Vec::new(),
            ..Self::dungeon()
        }
    }

    /// Parse and validate a JSON level config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: LevelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Chunk edge length in pixels
    #[inline]
    pub fn chunk_pixels(&self) -> f32 {
        self.chunk_size as f32 * self.tile_size as f32
    }

    /// Reject configurations the simulation cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.tile_size == 0 || self.chunk_size == 0 {
            return invalid("tile_size and chunk_size must be non-zero");
        }
        if self.world_chunks_x <= 0 || self.world_chunks_y <= 0 {
            return invalid("world extent must be at least one chunk on each axis");
        }
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return invalid("viewport must have a positive size");
        }
        if self.chunk_padding < 0 {
            return invalid("chunk_padding must not be negative");
        }

        let d = &self.difficulty;
        if d.max_speed < d.initial_speed {
            return invalid("difficulty.max_speed is below initial_speed");
        }
        if d.min_interval_ms > d.initial_interval_ms {
            return invalid("difficulty.min_interval_ms is above initial_interval_ms");
        }
        if d.min_interval_ms == 0 {
            return invalid("difficulty.min_interval_ms must be non-zero");
        }
        if d.speed_step_score_interval <= 0.0 || d.interval_step_score_interval <= 0.0 {
            return invalid("difficulty step score intervals must be positive");
        }
        if d.speed_step < 0.0 || d.update_interval_score < 0.0 {
            return invalid("difficulty steps must not be negative");
        }

        if self.spawn.max_pursuers == 0 {
            return invalid("spawn.max_pursuers must be non-zero");
        }
        if self.spawn.replace_distance_factor <= 0.0 {
            return invalid("spawn.replace_distance_factor must be positive");
        }

        let p = &self.procedural;
        if p.path_chance < 0.0
            || p.secondary_chance < 0.0
            || p.path_chance + p.secondary_chance > 1.0
        {
            return invalid("procedural tile chances must be non-negative and sum to at most 1");
        }

        Ok(())
    }
}
