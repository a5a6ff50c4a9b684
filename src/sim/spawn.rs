//! Pursuer spawning and homing
//!
//! Pursuers appear just outside the viewport on a random edge and home in a
//! straight line on the player. Ones that fall too far behind are replaced
//! rather than removed, so the population never drops.

use glam::Vec2;
use rand::Rng;

use super::state::Pursuer;
use crate::config::SpawnParams;
use crate::{Rect, clamp_to_bounds};

/// Viewport edge a pursuer enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl SpawnEdge {
    pub const ALL: [SpawnEdge; 4] = [
        SpawnEdge::Top,
        SpawnEdge::Bottom,
        SpawnEdge::Left,
        SpawnEdge::Right,
    ];
}

/// Point `padding` outside `edge` of the viewport, uniform along the edge,
/// clamped into the world
pub fn edge_position<R: Rng>(
    rng: &mut R,
    edge: SpawnEdge,
    viewport: Rect,
    world: Vec2,
    padding: f32,
) -> Vec2 {
    let along_x = rng.random_range(viewport.min.x..=viewport.max.x);
    let along_y = rng.random_range(viewport.min.y..=viewport.max.y);
    let pos = match edge {
        SpawnEdge::Top => Vec2::new(along_x, viewport.min.y - padding),
        SpawnEdge::Bottom => Vec2::new(along_x, viewport.max.y + padding),
        SpawnEdge::Left => Vec2::new(viewport.min.x - padding, along_y),
        SpawnEdge::Right => Vec2::new(viewport.max.x + padding, along_y),
    };
    clamp_to_bounds(pos, world)
}

/// A replaced pursuer and its successor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacement {
    pub old_id: u32,
    pub new_id: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SpawnController {
    params: SpawnParams,
    /// Live pursuers, sorted by id
    pursuers: Vec<Pursuer>,
    next_id: u32,
    active: bool,
}

impl SpawnController {
    pub fn new(params: SpawnParams) -> Self {
        Self {
            params,
            pursuers: Vec::new(),
            next_id: 1,
            active: true,
        }
    }

    pub fn params(&self) -> &SpawnParams {
        &self.params
    }

    pub fn live_count(&self) -> usize {
        self.pursuers.len()
    }

    pub fn pursuers(&self) -> &[Pursuer] {
        &self.pursuers
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Inactive controllers refuse to spawn (paused or ended level)
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn one pursuer outside the viewport, homing on `player` at `speed`.
    ///
    /// No-op when inactive or at the population cap.
    pub fn try_spawn<R: Rng>(
        &mut self,
        rng: &mut R,
        viewport: Rect,
        world: Vec2,
        player: Vec2,
        speed: f32,
    ) -> Option<&Pursuer> {
        if !self.active || self.pursuers.len() >= self.params.max_pursuers {
            return None;
        }

        let edge = SpawnEdge::ALL[rng.random_range(0..SpawnEdge::ALL.len())];
        let pos = edge_position(rng, edge, viewport, world, self.params.edge_padding);

        let id = self.allocate_id();
        let mut pursuer = Pursuer::new(id, pos, self.params.pursuer_radius);
        pursuer.home_toward(player, speed);
        log::debug!("Spawned pursuer {} at ({:.0}, {:.0}) from {:?}", id, pos.x, pos.y, edge);

        self.pursuers.push(pursuer);
        self.pursuers.last()
    }

    /// Point every live pursuer at the player (speed change)
    pub fn retarget_all(&mut self, player: Vec2, speed: f32) {
        for pursuer in &mut self.pursuers {
            pursuer.home_toward(player, speed);
        }
    }

    /// Distance from the viewport center beyond which a pursuer is replaced
    pub fn replace_distance(&self, viewport: Rect) -> f32 {
        viewport.size().y * self.params.replace_distance_factor
    }

    /// Per-frame pass: replace stragglers, re-acquire drifting pursuers, move.
    ///
    /// Stragglers are measured from the camera, not the player, so a view
    /// pinned against the world edge never replaces fresh edge spawns.
    pub fn update<R: Rng>(
        &mut self,
        rng: &mut R,
        viewport: Rect,
        world: Vec2,
        player: Vec2,
        speed: f32,
        dt: f32,
    ) -> Vec<Replacement> {
        let max_distance = self.replace_distance(viewport);
        let camera = viewport.center();
        let stragglers: Vec<u32> = self
            .pursuers
            .iter()
            .filter(|p| p.pos.distance(camera) > max_distance)
            .map(|p| p.id)
            .collect();

        let mut replacements = Vec::with_capacity(stragglers.len());
        for old_id in stragglers {
            self.pursuers.retain(|p| p.id != old_id);
            let new_id = self.try_spawn(rng, viewport, world, player, speed).map(|p| p.id);
            log::debug!("Replaced straggling pursuer {} with {:?}", old_id, new_id);
            replacements.push(Replacement { old_id, new_id });
        }

        let threshold = self.params.reacquire_threshold;
        for pursuer in &mut self.pursuers {
            if pursuer.needs_retarget(player, threshold) {
                pursuer.home_toward(player, speed);
            }
            pursuer.advance(dt);
        }

        replacements
    }

    /// Drop every pursuer (level teardown)
    pub fn clear(&mut self) {
        self.pursuers.clear();
    }
}
