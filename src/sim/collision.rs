//! Player/pursuer overlap detection
//!
//! The level hands the backend the player body and every active pursuer body
//! once per frame and only consumes the boolean answer, so a host can swap in
//! its own physics.

use glam::Vec2;

/// A circular body as seen by the collision backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub radius: f32,
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Index of the first overlapping body (if hit)
    pub index: Option<usize>,
    /// Penetration depth of that overlap
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            index: None,
            penetration: 0.0,
        }
    }
}

/// Overlap test between two circles; positive penetration means overlap
#[inline]
pub fn circle_penetration(a: Body, b: Body) -> f32 {
    a.radius + b.radius - a.pos.distance(b.pos)
}

/// First body in `others` overlapping `player`
pub fn first_overlap(player: Body, others: &[Body]) -> CollisionResult {
    for (index, &other) in others.iter().enumerate() {
        let penetration = circle_penetration(player, other);
        if penetration > 0.0 {
            return CollisionResult {
                hit: true,
                index: Some(index),
                penetration,
            };
        }
    }
    CollisionResult::miss()
}

/// Answers "did the player overlap a pursuer this frame"
pub trait CollisionBackend {
    fn player_hit(&mut self, player: Body, pursuers: &[Body]) -> bool;
}

/// Default backend: circle-circle overlap
#[derive(Debug, Clone, Copy, Default)]
pub struct CircleOverlap;

impl CollisionBackend for CircleOverlap {
    fn player_hit(&mut self, player: Body, pursuers: &[Body]) -> bool {
        first_overlap(player, pursuers).hit
    }
}
