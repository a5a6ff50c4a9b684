//! Chunk layout generation
//!
//! Composes the tile grid for one chunk, either from a room template with its
//! obstacle overlay applied, or from per-cell categorical noise. The composed
//! grid is then validated against the tileset into a renderable layer.

use std::collections::HashMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rooms::{EntityTag, RoomCatalog, RoomType};
use crate::config::{LevelConfig, ProceduralTiles, TilesetConfig, WorldSourceKind};
use crate::error::LayoutError;

/// Integer chunk coordinates in world-chunk space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk containing a world-pixel position
    pub fn containing(pos: Vec2, chunk_pixels: f32) -> Self {
        Self {
            x: (pos.x / chunk_pixels).floor() as i32,
            y: (pos.y / chunk_pixels).floor() as i32,
        }
    }

    /// Top-left corner of this chunk in world pixels
    #[inline]
    pub fn origin(&self, chunk_pixels: f32) -> Vec2 {
        Vec2::new(self.x as f32 * chunk_pixels, self.y as f32 * chunk_pixels)
    }
}

/// Square grid of tile indices, indexed `[y][x]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    rows: Vec<Vec<u16>>,
}

impl TileGrid {
    pub fn filled(size: usize, tile: u16) -> Self {
        Self {
            rows: vec![vec![tile; size]; size],
        }
    }

    pub fn from_rows(rows: Vec<Vec<u16>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<u16>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u16> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Write a tile; returns false if `(x, y)` is outside the grid
    pub fn set(&mut self, x: usize, y: usize, tile: u16) -> bool {
        match self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            Some(cell) => {
                *cell = tile;
                true
            }
            None => false,
        }
    }

    /// Iterate `(x, y, tile)` in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u16)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, &t)| (x, y, t)))
    }
}

/// Handle for a chunk's renderable tile layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub tileset_key: String,
    pub coord: ChunkCoord,
}

impl TileLayer {
    /// Validate `grid` against `tileset`; never yields a partial layer
    pub fn build(
        coord: ChunkCoord,
        grid: &TileGrid,
        tileset: &TilesetConfig,
    ) -> Result<Self, LayoutError> {
        if tileset.key.is_empty() || tileset.tile_count == 0 {
            return Err(LayoutError::MissingTileset {
                key: tileset.key.clone(),
            });
        }
        if let Some((x, y, tile)) = grid.cells().find(|&(_, _, t)| t >= tileset.tile_count) {
            return Err(LayoutError::TileOutOfRange {
                coord,
                x,
                y,
                tile,
                key: tileset.key.clone(),
                tile_count: tileset.tile_count,
            });
        }
        Ok(Self {
            tileset_key: tileset.key.clone(),
            coord,
        })
    }
}

/// An authored entity resolved to world pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedEntity {
    pub tag: EntityTag,
    pub pos: Vec2,
}

/// A materialized chunk
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub coord: ChunkCoord,
    /// Room this chunk was built from (None for procedural chunks)
    pub room: Option<RoomType>,
    pub grid: TileGrid,
    /// Top-left corner in world pixels
    pub origin: Vec2,
    pub layer: TileLayer,
    pub entities: Vec<PlacedEntity>,
}

/// Template grid with obstacles overlaid
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLayout {
    pub grid: TileGrid,
    pub origin: Vec2,
    pub entities: Vec<PlacedEntity>,
}

/// Compose a chunk grid from a room template.
///
/// The catalog entry is cloned, never mutated. Out-of-range obstacle and
/// entity placements are logged and skipped.
pub fn generate_from_template(
    catalog: &RoomCatalog,
    room: RoomType,
    coord: ChunkCoord,
    tile_size: f32,
) -> TemplateLayout {
    let template = catalog.lookup(room);
    let chunk_pixels = catalog.chunk_size() as f32 * tile_size;
    let origin = coord.origin(chunk_pixels);

    let mut grid = TileGrid::from_rows(template.grid.clone());
    for obstacle in &template.obstacles {
        if !grid.set(obstacle.x, obstacle.y, obstacle.tile) {
            log::warn!(
                "{:?} obstacle at ({}, {}) is outside the room, skipped",
                room,
                obstacle.x,
                obstacle.y
            );
        }
    }

    let mut entities = Vec::with_capacity(template.entities.len());
    for placement in &template.entities {
        if grid.get(placement.x, placement.y).is_none() {
            log::warn!(
                "{:?} {:?} spawn at ({}, {}) is outside the room, skipped",
                room,
                placement.tag,
                placement.x,
                placement.y
            );
            continue;
        }
        let local = Vec2::new(placement.x as f32 + 0.5, placement.y as f32 + 0.5) * tile_size;
        entities.push(PlacedEntity {
            tag: placement.tag,
            pos: origin + local,
        });
    }

    TemplateLayout { grid, origin, entities }
}

/// Roll every cell independently from the categorical distribution in `tiles`
pub fn generate_procedural<R: Rng>(
    rng: &mut R,
    tiles: &ProceduralTiles,
    chunk_size: usize,
) -> TileGrid {
    let mut grid = TileGrid::filled(chunk_size, tiles.base_tile);
    for y in 0..chunk_size {
        for x in 0..chunk_size {
            let roll: f32 = rng.random();
            let tile = if roll < tiles.path_chance {
                tiles.path_tile
            } else if roll < tiles.path_chance + tiles.secondary_chance {
                tiles.secondary_tile
            } else {
                tiles.base_tile
            };
            grid.set(x, y, tile);
        }
    }
    grid
}

/// Per-chunk seed so a level seed always yields the same world
pub fn chunk_seed(seed: u64, coord: ChunkCoord) -> u64 {
    seed ^ (coord.x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (coord.y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
}

/// Room type assignment for every chunk of a dungeon level
#[derive(Debug, Clone)]
pub struct RoomLayout {
    seed: u64,
    chunks_x: i32,
    chunks_y: i32,
    explicit: HashMap<ChunkCoord, RoomType>,
}

impl RoomLayout {
    pub fn new(config: &LevelConfig) -> Self {
        let explicit = config
            .rooms
            .iter()
            .map(|p| (ChunkCoord::new(p.x, p.y), p.room))
            .collect();
        Self {
            seed: config.seed,
            chunks_x: config.world_chunks_x,
            chunks_y: config.world_chunks_y,
            explicit,
        }
    }

    /// Chunk the player starts in
    pub fn start(&self) -> ChunkCoord {
        ChunkCoord::new(self.chunks_x / 2, self.chunks_y / 2)
    }

    /// Chunk holding the exit room
    pub fn end(&self) -> ChunkCoord {
        ChunkCoord::new(self.chunks_x - 1, self.chunks_y / 2)
    }

    pub fn room_at(&self, coord: ChunkCoord) -> RoomType {
        if let Some(&room) = self.explicit.get(&coord) {
            return room;
        }
        if coord == self.start() {
            return RoomType::Start;
        }
        if coord == self.end() {
            return RoomType::End;
        }

        let (last_x, last_y) = (self.chunks_x - 1, self.chunks_y - 1);
        let left = coord.x == 0;
        let right = coord.x == last_x;
        let top = coord.y == 0;
        let bottom = coord.y == last_y;

        match (left, right, top, bottom) {
            (true, _, true, _) => RoomType::CornerTopLeft,
            (_, true, true, _) => RoomType::CornerTopRight,
            (true, _, _, true) => RoomType::CornerBottomLeft,
            (_, true, _, true) => RoomType::CornerBottomRight,
            (_, _, true, _) | (_, _, _, true) => RoomType::CorridorHorizontal,
            (true, _, _, _) | (_, true, _, _) => RoomType::CorridorVertical,
            _ => {
                let mut rng = Pcg32::seed_from_u64(chunk_seed(self.seed, coord));
                RoomType::INTERIOR[rng.random_range(0..RoomType::INTERIOR.len())]
            }
        }
    }
}

/// Where a level's chunks come from
#[derive(Debug, Clone)]
pub enum WorldSource {
    Tilemap { catalog: RoomCatalog, layout: RoomLayout },
    Procedural { tiles: ProceduralTiles, seed: u64 },
}

impl WorldSource {
    pub fn from_config(config: &LevelConfig) -> Self {
        match config.world_source {
            WorldSourceKind::Dungeon => WorldSource::Tilemap {
                catalog: RoomCatalog::standard(config.chunk_size),
                layout: RoomLayout::new(config),
            },
            WorldSourceKind::Procedural => WorldSource::Procedural {
                tiles: config.procedural,
                seed: config.seed,
            },
        }
    }
}

/// Builds complete chunks from a world source
#[derive(Debug, Clone)]
pub struct ChunkLayoutGenerator {
    source: WorldSource,
    chunk_size: usize,
    tile_size: f32,
    tileset: TilesetConfig,
}

impl ChunkLayoutGenerator {
    pub fn new(config: &LevelConfig) -> Self {
        Self::with_source(WorldSource::from_config(config), config)
    }

    pub fn with_source(source: WorldSource, config: &LevelConfig) -> Self {
        Self {
            source,
            chunk_size: config.chunk_size,
            tile_size: config.tile_size as f32,
            tileset: config.tileset.clone(),
        }
    }

    pub fn source(&self) -> &WorldSource {
        &self.source
    }

    #[inline]
    pub fn chunk_pixels(&self) -> f32 {
        self.chunk_size as f32 * self.tile_size
    }

    /// Compose and validate one chunk
    pub fn generate(&self, coord: ChunkCoord) -> Result<Chunk, LayoutError> {
        let (room, grid, origin, entities) = match &self.source {
            WorldSource::Tilemap { catalog, layout } => {
                let room = layout.room_at(coord);
                let composed = generate_from_template(catalog, room, coord, self.tile_size);
                (Some(room), composed.grid, composed.origin, composed.entities)
            }
            WorldSource::Procedural { tiles, seed } => {
                let mut rng = Pcg32::seed_from_u64(chunk_seed(*seed, coord));
                let grid = generate_procedural(&mut rng, tiles, self.chunk_size);
                (None, grid, coord.origin(self.chunk_pixels()), Vec::new())
            }
        };

        let layer = TileLayer::build(coord, &grid, &self.tileset)?;
        log::debug!("Composed chunk ({}, {}) room={:?}", coord.x, coord.y, room);

        Ok(Chunk {
            coord,
            room,
            grid,
            origin,
            layer,
            entities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rooms::{ObstaclePlacement, RoomTemplate, TILE_FLOOR, TILE_PILLAR};

    fn pillar_catalog(obstacles: Vec<ObstaclePlacement>) -> RoomCatalog {
        let mut template = RoomTemplate::open(4);
        template.grid[0][0] = 9;
        template.obstacles = obstacles;
        RoomCatalog::empty(4).with_template(RoomType::Combat, template)
    }

    #[test]
    fn test_obstacle_overlay_matches_base_except_target() {
        let catalog = pillar_catalog(vec![ObstaclePlacement {
            x: 2,
            y: 1,
            tile: TILE_PILLAR,
        }]);
        let base = catalog.lookup(RoomType::Combat).grid.clone();
        let out = generate_from_template(&catalog, RoomType::Combat, ChunkCoord::new(0, 0), 32.0);

        for (y, row) in base.iter().enumerate() {
            for (x, &tile) in row.iter().enumerate() {
                let expected = if (x, y) == (2, 1) { TILE_PILLAR } else { tile };
                assert_eq!(out.grid.get(x, y), Some(expected));
            }
        }
        // Catalog entry untouched
        assert_eq!(catalog.lookup(RoomType::Combat).grid[1][2], TILE_FLOOR);
    }

    #[test]
    fn test_out_of_range_obstacle_is_skipped() {
        let catalog = pillar_catalog(vec![
            ObstaclePlacement { x: 4, y: 0, tile: TILE_PILLAR },
            ObstaclePlacement { x: 1, y: 1, tile: TILE_PILLAR },
        ]);
        let base = TileGrid::from_rows(catalog.lookup(RoomType::Combat).grid.clone());
        let out = generate_from_template(&catalog, RoomType::Combat, ChunkCoord::new(0, 0), 32.0);

        assert_eq!(out.grid.get(1, 1), Some(TILE_PILLAR));
        let changed = out.grid.cells().zip(base.cells()).filter(|(a, b)| a != b).count();
        assert_eq!(changed, 1);
    }

    #[test]
    fn test_origin_and_entities_in_world_space() {
        let catalog = RoomCatalog::standard(16);
        let out = generate_from_template(&catalog, RoomType::Start, ChunkCoord::new(2, 3), 32.0);
        assert_eq!(out.origin, Vec2::new(2.0 * 512.0, 3.0 * 512.0));
        let spawn = out.entities.iter().find(|e| e.tag == EntityTag::PlayerStart).unwrap();
        assert_eq!(spawn.pos, Vec2::new(1024.0 + 8.5 * 32.0, 1536.0 + 8.5 * 32.0));
    }

    #[test]
    fn test_procedural_distribution() {
        let tiles = ProceduralTiles::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let grid = generate_procedural(&mut rng, &tiles, 100);

        let total = 100.0 * 100.0;
        let count = |t: u16| grid.cells().filter(|&(_, _, c)| c == t).count() as f32 / total;
        assert!((count(tiles.path_tile) - 0.1).abs() < 0.02);
        assert!((count(tiles.secondary_tile) - 0.2).abs() < 0.02);
        assert!((count(tiles.base_tile) - 0.7).abs() < 0.03);
    }

    #[test]
    fn test_procedural_chunks_are_deterministic() {
        let config = LevelConfig::open_world();
        let a = ChunkLayoutGenerator::new(&config).generate(ChunkCoord::new(3, 1)).unwrap();
        let b = ChunkLayoutGenerator::new(&config).generate(ChunkCoord::new(3, 1)).unwrap();
        let c = ChunkLayoutGenerator::new(&config).generate(ChunkCoord::new(1, 3)).unwrap();
        assert_eq!(a.grid, b.grid);
        assert_ne!(a.grid, c.grid);
    }

    #[test]
    fn test_missing_tileset_fails() {
        let mut config = LevelConfig::dungeon();
        config.tileset.tile_count = 0;
        let result = ChunkLayoutGenerator::new(&config).generate(ChunkCoord::new(0, 0));
        assert!(matches!(result, Err(LayoutError::MissingTileset { .. })));
    }

    #[test]
    fn test_tile_outside_tileset_fails() {
        let mut config = LevelConfig::open_world();
        config.procedural.base_tile = 40;
        let result = ChunkLayoutGenerator::new(&config).generate(ChunkCoord::new(0, 0));
        assert!(matches!(result, Err(LayoutError::TileOutOfRange { tile: 40, .. })));
    }

    #[test]
    fn test_default_room_layout() {
        let config = LevelConfig::dungeon();
        let layout = RoomLayout::new(&config);
        assert_eq!(layout.room_at(ChunkCoord::new(4, 4)), RoomType::Start);
        assert_eq!(layout.room_at(ChunkCoord::new(7, 4)), RoomType::End);
        assert_eq!(layout.room_at(ChunkCoord::new(0, 0)), RoomType::CornerTopLeft);
        assert_eq!(layout.room_at(ChunkCoord::new(7, 0)), RoomType::CornerTopRight);
        assert_eq!(layout.room_at(ChunkCoord::new(0, 7)), RoomType::CornerBottomLeft);
        assert_eq!(layout.room_at(ChunkCoord::new(7, 7)), RoomType::CornerBottomRight);
        assert_eq!(layout.room_at(ChunkCoord::new(3, 0)), RoomType::CorridorHorizontal);
        assert_eq!(layout.room_at(ChunkCoord::new(0, 3)), RoomType::CorridorVertical);
        assert!(RoomType::INTERIOR.contains(&layout.room_at(ChunkCoord::new(2, 2))));
    }

    #[test]
    fn test_explicit_room_overrides_default() {
        let mut config = LevelConfig::dungeon();
        config.rooms.push(crate::config::RoomPlacement {
            x: 0,
            y: 0,
            room: RoomType::Shop,
        });
        let layout = RoomLayout::new(&config);
        assert_eq!(layout.room_at(ChunkCoord::new(0, 0)), RoomType::Shop);
    }

    #[test]
    fn test_chunk_containing() {
        assert_eq!(ChunkCoord::containing(Vec2::new(0.0, 0.0), 512.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::containing(Vec2::new(513.0, 1100.0), 512.0), ChunkCoord::new(1, 2));
        assert_eq!(ChunkCoord::containing(Vec2::new(-1.0, 0.0), 512.0), ChunkCoord::new(-1, 0));
    }
}
