//! Error types
//!
//! Configuration defects inside the room catalog are not errors; they are
//! logged and healed where they occur. Everything here is either fatal to a
//! level or reported back to the host.

use thiserror::Error;

use crate::sim::ChunkCoord;

/// Failure to build a chunk's renderable layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("tileset '{key}' is missing or empty")]
    MissingTileset { key: String },
    #[error(
        "tile index {tile} at ({x}, {y}) of chunk {coord:?} is outside tileset '{key}' \
         ({tile_count} tiles)"
    )]
    TileOutOfRange {
        coord: ChunkCoord,
        x: usize,
        y: usize,
        tile: u16,
        key: String,
        tile_count: u16,
    },
}

/// Invalid level configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse level config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid level config: {0}")]
    Invalid(String),
}

/// Level lifecycle failures
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level construction failed: {0}")]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot {action} while level is {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: &'static str,
    },
}

/// High score storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("high score file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("high score file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
