//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (per-chunk seeds for procedural terrain)
//! - Stable iteration order (by chunk coordinate and pursuer ID)
//! - No rendering or platform dependencies

pub mod chunks;
pub mod clock;
pub mod collision;
pub mod difficulty;
pub mod layout;
pub mod level;
pub mod rooms;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timer;

pub use chunks::{ChunkStreamingManager, ChunkWindow};
pub use clock::{ClockTick, SurvivalClock};
pub use collision::{Body, CircleOverlap, CollisionBackend, CollisionResult};
pub use difficulty::{DifficultyChange, DifficultyCurve, DifficultyState};
pub use layout::{
    Chunk, ChunkCoord, ChunkLayoutGenerator, RoomLayout, TileGrid, TileLayer, WorldSource,
};
pub use level::{Level, LevelReport, LevelServices, OutcomeTarget};
pub use rooms::{EntityTag, RoomCatalog, RoomTemplate, RoomType};
pub use spawn::{Replacement, SpawnController, SpawnEdge};
pub use state::{HudSnapshot, LevelEvent, LevelOutcome, LevelPhase, Player, Pursuer};
pub use tick::{TickInput, tick};
pub use timer::PeriodicTimer;
