//! Per-frame simulation update
//!
//! Order within a frame: player movement, chunk streaming (only when the
//! player crosses into a new chunk), difficulty recompute and propagation,
//! survival clock, spawn cadence, pursuer replacement/homing, collision.

use glam::Vec2;

use super::clock::ClockTick;
use super::collision::Body;
use super::layout::ChunkCoord;
use super::level::Level;
use super::state::{LevelEvent, LevelPhase, viewport_around};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent; clamped to unit length
    pub movement: Vec2,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the level by `dt` seconds
pub fn tick(level: &mut Level, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match level.phase {
            LevelPhase::Running => {
                level.pause();
                return;
            }
            LevelPhase::Paused => {
                level.resume();
            }
            _ => {}
        }
    }

    // Only a running level advances
    if level.phase != LevelPhase::Running || level.is_torn_down() {
        return;
    }

    let dt_ms = dt * 1000.0;
    level.score += dt;

    // Player movement, blocked by solid tiles
    let bounds = level.world.world_bounds();
    {
        let world = &level.world;
        let solid = &level.config.solid_tiles;
        level.player.step(input.movement, dt, bounds, |pos| {
            world.tile_at(pos).is_some_and(|tile| solid.contains(&tile))
        });
    }
    let player_pos = level.player.pos;

    // Stream chunks on chunk-boundary crossings only
    let current_chunk = ChunkCoord::containing(player_pos, level.world.chunk_pixels());
    if level.last_player_chunk != Some(current_chunk) {
        level.last_player_chunk = Some(current_chunk);
        let viewport_size = level.viewport_size();
        match level.world.ensure_surrounding(current_chunk, viewport_size) {
            Ok(created) => level
                .events
                .extend(created.into_iter().map(|coord| LevelEvent::ChunkMaterialized { coord })),
            Err(err) => {
                level.fail(err.to_string());
                return;
            }
        }
    }
    let bounds = level.world.world_bounds();
    level.viewport = viewport_around(player_pos, level.viewport_size(), bounds);

    // Difficulty before anything that reads speed or interval
    let change = level.difficulty.update(level.score);
    if change.any() {
        let speed = level.difficulty.pursuer_speed();
        let interval = level.difficulty.spawn_interval_ms();
        if change.speed {
            level.spawner.retarget_all(player_pos, speed);
        }
        if change.interval {
            level.spawn_timer.reschedule(interval);
        }
        level.events.push(LevelEvent::DifficultyChanged {
            speed,
            spawn_interval_ms: interval,
        });
    }

    // Survival clock
    if level.clock_timer.advance(dt_ms) {
        match level.clock.tick() {
            ClockTick::Running { remaining_secs } => {
                level.events.push(LevelEvent::ClockTicked {
                    remaining_secs,
                    progress: level.clock.progress(),
                });
            }
            ClockTick::Expired => {
                level.events.push(LevelEvent::ClockTicked {
                    remaining_secs: 0,
                    progress: 0.0,
                });
                level.trigger_win();
                return;
            }
            ClockTick::Idle => {}
        }
    }

    let speed = level.difficulty.pursuer_speed();

    // Spawn cadence
    if level.spawn_timer.advance(dt_ms) {
        let viewport = level.viewport;
        let spawned = level
            .spawner
            .try_spawn(&mut level.rng, viewport, bounds, player_pos, speed);
        if let Some(pursuer) = spawned {
            level.events.push(LevelEvent::PursuerSpawned {
                id: pursuer.id,
                pos: pursuer.pos,
            });
        }
    }

    // Replace stragglers, keep everyone homing, move
    let viewport = level.viewport;
    let replacements = level
        .spawner
        .update(&mut level.rng, viewport, bounds, player_pos, speed, dt);
    level.events.extend(replacements.into_iter().map(|r| LevelEvent::PursuerReplaced {
        old_id: r.old_id,
        new_id: r.new_id,
    }));

    // Player caught?
    let player_body = Body {
        pos: player_pos,
        radius: level.player.radius,
    };
    let bodies: Vec<Body> = level
        .spawner
        .pursuers()
        .iter()
        .map(|p| Body {
            pos: p.pos,
            radius: p.radius,
        })
        .collect();
    if level.services.collision.player_hit(player_body, &bodies) {
        level.trigger_loss();
    }
}
