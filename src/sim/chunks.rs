//! Chunk streaming
//!
//! Keeps the set of materialized chunks around the player. Chunks are created
//! lazily the first time they fall inside the needed window and are kept until
//! the level tears down; the set only grows, bounded by the world extent.

use std::collections::HashMap;

use glam::Vec2;

use super::layout::{Chunk, ChunkCoord, ChunkLayoutGenerator};
use crate::error::LayoutError;

/// Inclusive rectangle of chunk coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkWindow {
    pub min: ChunkCoord,
    pub max: ChunkCoord,
}

impl ChunkWindow {
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
    }

    /// Row-major iteration over every coordinate in the window
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        (self.min.y..=self.max.y)
            .flat_map(move |y| (self.min.x..=self.max.x).map(move |x| ChunkCoord::new(x, y)))
    }
}

/// Owns every materialized chunk of a level
#[derive(Debug)]
pub struct ChunkStreamingManager {
    generator: ChunkLayoutGenerator,
    chunks: HashMap<ChunkCoord, Chunk>,
    max_chunks_x: i32,
    max_chunks_y: i32,
    /// Extra chunks kept ready beyond the viewport on each side
    padding: i32,
    /// Published world extent in pixels
    world_bounds: Vec2,
}

impl ChunkStreamingManager {
    pub fn new(
        generator: ChunkLayoutGenerator,
        max_chunks_x: i32,
        max_chunks_y: i32,
        padding: i32,
    ) -> Self {
        Self {
            generator,
            chunks: HashMap::new(),
            max_chunks_x,
            max_chunks_y,
            padding,
            world_bounds: Vec2::ZERO,
        }
    }

    pub fn generator(&self) -> &ChunkLayoutGenerator {
        &self.generator
    }

    #[inline]
    pub fn chunk_pixels(&self) -> f32 {
        self.generator.chunk_pixels()
    }

    /// World extent in pixels as of the last `ensure_surrounding`
    pub fn world_bounds(&self) -> Vec2 {
        self.world_bounds
    }

    /// Full world extent in pixels
    pub fn world_extent(&self) -> Vec2 {
        Vec2::new(self.max_chunks_x as f32, self.max_chunks_y as f32) * self.chunk_pixels()
    }

    /// Chunks needed to cover a viewport centered on `center` plus padding,
    /// clamped to the world
    pub fn window_for(&self, center: ChunkCoord, viewport: Vec2) -> ChunkWindow {
        let chunk_pixels = self.chunk_pixels();
        let half_x = (viewport.x * 0.5 / chunk_pixels).ceil() as i32 + self.padding;
        let half_y = (viewport.y * 0.5 / chunk_pixels).ceil() as i32 + self.padding;

        ChunkWindow {
            min: ChunkCoord::new((center.x - half_x).max(0), (center.y - half_y).max(0)),
            max: ChunkCoord::new(
                (center.x + half_x).min(self.max_chunks_x - 1),
                (center.y + half_y).min(self.max_chunks_y - 1),
            ),
        }
    }

    /// Materialize every missing chunk around `center`.
    ///
    /// Returns the coordinates created by this call. Existing chunks are never
    /// regenerated. A construction failure stops the pass and is returned; the
    /// chunks built before it stay cached.
    pub fn ensure_surrounding(
        &mut self,
        center: ChunkCoord,
        viewport: Vec2,
    ) -> Result<Vec<ChunkCoord>, LayoutError> {
        let window = self.window_for(center, viewport);
        let mut created = Vec::new();

        if !window.is_empty() {
            for coord in window.coords() {
                if self.chunks.contains_key(&coord) {
                    continue;
                }
                let chunk = self.generator.generate(coord)?;
                self.chunks.insert(coord, chunk);
                created.push(coord);
            }
        }

        self.world_bounds = self.world_extent();

        if !created.is_empty() {
            log::info!(
                "Materialized {} chunks around ({}, {}), {} cached",
                created.len(),
                center.x,
                center.y,
                self.chunks.len()
            );
        }
        Ok(created)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Materialized chunks sorted by coordinate
    pub fn chunks(&self) -> Vec<&Chunk> {
        let mut chunks: Vec<&Chunk> = self.chunks.values().collect();
        chunks.sort_by_key(|c| (c.coord.y, c.coord.x));
        chunks
    }

    /// Tile under a world-pixel position, if its chunk is materialized
    pub fn tile_at(&self, pos: Vec2) -> Option<u16> {
        let chunk_pixels = self.chunk_pixels();
        let coord = ChunkCoord::containing(pos, chunk_pixels);
        let chunk = self.chunks.get(&coord)?;
        let local = (pos - chunk.origin) / (chunk_pixels / chunk.grid.height().max(1) as f32);
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        chunk.grid.get(local.x as usize, local.y as usize)
    }

    /// Drop every chunk; called once when the level shuts down
    pub fn teardown(&mut self) {
        let count = self.chunks.len();
        self.chunks.clear();
        self.world_bounds = Vec2::ZERO;
        log::info!("Disposed {} chunks", count);
    }
}
