//! Level orchestration
//!
//! A `Level` owns every piece of simulation state for one run: streamed world,
//! difficulty curve, spawner, survival clock and the two periodic processes
//! that drive them. Collaborators (score store, end screen, collision) are
//! injected through `LevelServices`.
//!
//! Lifecycle: `Initializing -> Running <-> Paused -> Ended(Won | Lost)`, or
//! `Failed` if the world cannot be built. Terminal transitions are guarded so
//! they happen at most once.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::chunks::ChunkStreamingManager;
use super::clock::SurvivalClock;
use super::collision::{CircleOverlap, CollisionBackend};
use super::difficulty::DifficultyCurve;
use super::layout::{Chunk, ChunkCoord, ChunkLayoutGenerator, WorldSource};
use super::rooms::EntityTag;
use super::spawn::SpawnController;
use super::state::{
    HudSnapshot, LevelEvent, LevelOutcome, LevelPhase, Player, Pursuer, RngState, viewport_around,
};
use super::timer::PeriodicTimer;
use crate::Rect;
use crate::config::LevelConfig;
use crate::consts::CLOCK_PERIOD_MS;
use crate::error::LevelError;
use crate::highscores::ScoreStore;

/// Final result handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelReport {
    pub level: String,
    pub outcome: LevelOutcome,
    /// Seconds survived
    pub score: f32,
    /// Best score before this run
    pub previous_best: Option<f32>,
    pub new_record: bool,
    /// Leaderboard rank achieved, if any
    pub rank: Option<usize>,
}

/// Win/loss screen the level hands its report to
pub trait OutcomeTarget {
    fn present(&mut self, report: &LevelReport);
}

/// Collaborators injected into a level
pub struct LevelServices {
    pub scores: Box<dyn ScoreStore>,
    pub outcome_target: Option<Box<dyn OutcomeTarget>>,
    pub collision: Box<dyn CollisionBackend>,
}

impl LevelServices {
    pub fn new(scores: Box<dyn ScoreStore>) -> Self {
        Self {
            scores,
            outcome_target: None,
            collision: Box::new(CircleOverlap),
        }
    }

    pub fn with_outcome_target(mut self, target: Box<dyn OutcomeTarget>) -> Self {
        self.outcome_target = Some(target);
        self
    }

    pub fn with_collision(mut self, collision: Box<dyn CollisionBackend>) -> Self {
        self.collision = collision;
        self
    }
}

pub struct Level {
    pub(super) config: LevelConfig,
    pub(super) phase: LevelPhase,
    pub(super) rng: Pcg32,
    pub(super) world: ChunkStreamingManager,
    pub(super) difficulty: DifficultyCurve,
    pub(super) spawner: SpawnController,
    pub(super) clock: SurvivalClock,
    pub(super) spawn_timer: PeriodicTimer,
    pub(super) clock_timer: PeriodicTimer,
    pub(super) player: Player,
    /// Elapsed survival seconds
    pub(super) score: f32,
    pub(super) last_player_chunk: Option<ChunkCoord>,
    pub(super) viewport: Rect,
    pub(super) events: Vec<LevelEvent>,
    report: Option<LevelReport>,
    torn_down: bool,
    pub(super) services: LevelServices,
}

impl Level {
    /// Build a level in the `Initializing` phase
    pub fn new(config: LevelConfig, services: LevelServices) -> Result<Self, LevelError> {
        config.validate()?;
        let generator = ChunkLayoutGenerator::new(&config);
        Ok(Self::assemble(config, generator, services))
    }

    /// Build a level streaming from an explicit world source
    pub fn with_source(
        config: LevelConfig,
        source: WorldSource,
        services: LevelServices,
    ) -> Result<Self, LevelError> {
        config.validate()?;
        let generator = ChunkLayoutGenerator::with_source(source, &config);
        Ok(Self::assemble(config, generator, services))
    }

    fn assemble(
        config: LevelConfig,
        generator: ChunkLayoutGenerator,
        services: LevelServices,
    ) -> Self {
        let world = ChunkStreamingManager::new(
            generator,
            config.world_chunks_x,
            config.world_chunks_y,
            config.chunk_padding,
        );
        let difficulty = DifficultyCurve::new(config.difficulty);
        let mut spawner = SpawnController::new(config.spawn);
        spawner.set_active(false);

        Self {
            rng: RngState::new(config.seed).to_rng(),
            phase: LevelPhase::Initializing,
            spawn_timer: PeriodicTimer::new(difficulty.spawn_interval_ms()),
            clock_timer: PeriodicTimer::new(CLOCK_PERIOD_MS),
            clock: SurvivalClock::new(config.time_to_survive_secs),
            player: Player::new(Vec2::ZERO, config.player.radius, config.player.speed),
            score: 0.0,
            last_player_chunk: None,
            viewport: Rect::default(),
            events: Vec::new(),
            report: None,
            torn_down: false,
            difficulty,
            spawner,
            world,
            config,
            services,
        }
    }

    /// Build the world around the player's spawn and enter `Running`.
    ///
    /// Any construction failure leaves the level in `Failed` and it never runs.
    pub fn start(&mut self) -> Result<(), LevelError> {
        if self.phase != LevelPhase::Initializing {
            return Err(LevelError::InvalidPhase {
                action: "start",
                phase: self.phase.as_str(),
            });
        }

        let start_chunk = match self.world.generator().source() {
            WorldSource::Tilemap { layout, .. } => layout.start(),
            WorldSource::Procedural { .. } => {
                ChunkCoord::containing(self.world.world_extent() * 0.5, self.world.chunk_pixels())
            }
        };

        let created = match self.world.ensure_surrounding(start_chunk, self.viewport_size()) {
            Ok(created) => created,
            Err(err) => {
                log::error!("Level '{}' failed to build: {}", self.config.key, err);
                self.phase = LevelPhase::Failed;
                self.events.push(LevelEvent::Failed {
                    reason: err.to_string(),
                });
                self.teardown();
                return Err(err.into());
            }
        };
        self.events
            .extend(created.into_iter().map(|coord| LevelEvent::ChunkMaterialized { coord }));

        let spawn = self
            .world
            .get(start_chunk)
            .and_then(|chunk| chunk.entities.iter().find(|e| e.tag == EntityTag::PlayerStart))
            .map(|e| e.pos)
            .unwrap_or_else(|| self.world.world_extent() * 0.5);
        self.player.pos = spawn;
        self.last_player_chunk = Some(ChunkCoord::containing(spawn, self.world.chunk_pixels()));
        self.viewport = viewport_around(spawn, self.viewport_size(), self.world.world_bounds());

        self.spawner.set_active(true);
        self.phase = LevelPhase::Running;
        self.events.push(LevelEvent::Started);
        log::info!(
            "Level '{}' ({}) running: survive {} s, {} chunks ready",
            self.config.key,
            self.config.world_source.as_str(),
            self.config.time_to_survive_secs,
            self.world.len()
        );
        Ok(())
    }

    /// Suspend both periodic processes; returns false if not running
    pub fn pause(&mut self) -> bool {
        if self.phase != LevelPhase::Running {
            return false;
        }
        self.spawn_timer.pause();
        self.clock_timer.pause();
        self.spawner.set_active(false);
        self.phase = LevelPhase::Paused;
        self.events.push(LevelEvent::Paused);
        log::info!("Level '{}' paused at {:.1} s", self.config.key, self.score);
        true
    }

    /// Resume from pause with the timers' offsets intact
    pub fn resume(&mut self) -> bool {
        if self.phase != LevelPhase::Paused {
            return false;
        }
        self.spawn_timer.resume();
        self.clock_timer.resume();
        self.spawner.set_active(true);
        self.phase = LevelPhase::Running;
        self.events.push(LevelEvent::Resumed);
        log::info!("Level '{}' resumed", self.config.key);
        true
    }

    /// Player was caught; returns false if the level had already ended
    pub fn trigger_loss(&mut self) -> bool {
        self.finish(LevelOutcome::Lost)
    }

    /// Clock ran out; returns false if the level had already ended
    pub fn trigger_win(&mut self) -> bool {
        self.finish(LevelOutcome::Won)
    }

    fn finish(&mut self, outcome: LevelOutcome) -> bool {
        if !matches!(self.phase, LevelPhase::Running | LevelPhase::Paused) {
            return false;
        }
        self.phase = LevelPhase::Ended(outcome);
        self.spawn_timer.cancel();
        self.clock_timer.cancel();
        self.spawner.set_active(false);

        let key = self.config.key.as_str();
        let previous_best = self.services.scores.best(key);
        let rank = self
            .services
            .scores
            .submit(key, self.score, outcome == LevelOutcome::Won);
        let new_record = self.score > 0.0 && previous_best.is_none_or(|best| self.score > best);

        let report = LevelReport {
            level: self.config.key.clone(),
            outcome,
            score: self.score,
            previous_best,
            new_record,
            rank,
        };
        log::info!(
            "Level '{}' ended ({:?}) after {:.1} s{}",
            report.level,
            outcome,
            report.score,
            if new_record { ", new record" } else { "" }
        );

        self.events.push(LevelEvent::Ended {
            outcome,
            score: self.score,
        });
        match self.services.outcome_target.as_mut() {
            Some(target) => target.present(&report),
            None => log::error!(
                "No outcome screen registered for level '{}'; halting",
                report.level
            ),
        }
        self.report = Some(report);

        self.teardown();
        true
    }

    /// Halt after a mid-run construction failure
    pub(super) fn fail(&mut self, reason: String) {
        if self.phase.is_over() {
            return;
        }
        log::error!("Level '{}' halted: {}", self.config.key, reason);
        self.phase = LevelPhase::Failed;
        self.spawn_timer.cancel();
        self.clock_timer.cancel();
        self.spawner.set_active(false);
        self.events.push(LevelEvent::Failed { reason });
        self.teardown();
    }

    /// Dispose of world and pursuers; only the first call does anything.
    ///
    /// Tearing down a level that has not ended halts it in `Failed`.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if !self.phase.is_over() {
            log::warn!(
                "Level '{}' torn down while {}; halting",
                self.config.key,
                self.phase.as_str()
            );
            self.phase = LevelPhase::Failed;
            self.events.push(LevelEvent::Failed {
                reason: "torn down before the level ended".to_string(),
            });
        }
        self.spawn_timer.cancel();
        self.clock_timer.cancel();
        self.spawner.set_active(false);
        self.spawner.clear();
        self.world.teardown();
    }

    pub fn viewport_size(&self) -> Vec2 {
        Vec2::new(self.config.viewport_width, self.config.viewport_height)
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn pursuers(&self) -> &[Pursuer] {
        self.spawner.pursuers()
    }

    pub fn spawner(&self) -> &SpawnController {
        &self.spawner
    }

    pub fn difficulty(&self) -> &DifficultyCurve {
        &self.difficulty
    }

    pub fn clock(&self) -> &SurvivalClock {
        &self.clock
    }

    pub fn spawn_timer(&self) -> &PeriodicTimer {
        &self.spawn_timer
    }

    pub fn world(&self) -> &ChunkStreamingManager {
        &self.world
    }

    /// Materialized chunks for layer construction
    pub fn chunks(&self) -> Vec<&Chunk> {
        self.world.chunks()
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn report(&self) -> Option<&LevelReport> {
        self.report.as_ref()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            remaining_secs: self.clock.remaining_secs(),
            progress: self.clock.progress(),
            score: self.score,
            live_pursuers: self.spawner.live_count(),
            viewport: self.viewport,
        }
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::highscores::HighScores;
    use crate::sim::collision::Body;
    use crate::sim::tick::{TickInput, tick};

    /// Score store that records every submission
    #[derive(Clone, Default)]
    struct Recorder {
        submitted: Rc<RefCell<Vec<(f32, bool)>>>,
        best: Option<f32>,
    }

    impl ScoreStore for Recorder {
        fn best(&self, _level: &str) -> Option<f32> {
            self.best
        }
        fn submit(&mut self, _level: &str, seconds: f32, won: bool) -> Option<usize> {
            self.submitted.borrow_mut().push((seconds, won));
            Some(1)
        }
    }

    #[derive(Clone, Default)]
    struct Screen {
        shown: Rc<RefCell<Vec<LevelReport>>>,
    }

    impl OutcomeTarget for Screen {
        fn present(&mut self, report: &LevelReport) {
            self.shown.borrow_mut().push(report.clone());
        }
    }

    struct NeverHit;

    impl CollisionBackend for NeverHit {
        fn player_hit(&mut self, _player: Body, _pursuers: &[Body]) -> bool {
            false
        }
    }

    fn running_level(config: LevelConfig, recorder: &Recorder, screen: &Screen) -> Level {
        let services = LevelServices::new(Box::new(recorder.clone()))
            .with_outcome_target(Box::new(screen.clone()))
            .with_collision(Box::new(NeverHit));
        let mut level = Level::new(config, services).unwrap();
        level.start().unwrap();
        level
    }

    #[test]
    fn test_start_enters_running_at_player_start() {
        let recorder = Recorder::default();
        let screen = Screen::default();
        let level = running_level(LevelConfig::dungeon(), &recorder, &screen);

        assert_eq!(level.phase(), LevelPhase::Running);
        // Center of the start room at chunk (4, 4)
        assert_eq!(level.player().pos, Vec2::new(4.0 * 512.0 + 272.0, 4.0 * 512.0 + 272.0));
        assert_eq!(level.world().len(), 25);
        assert!(level.viewport().contains(level.player().pos));
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let recorder = Recorder::default();
        let screen = Screen::default();
        let mut level = running_level(LevelConfig::dungeon(), &recorder, &screen);
        assert!(matches!(level.start(), Err(LevelError::InvalidPhase { .. })));
        assert_eq!(level.phase(), LevelPhase::Running);
    }

    #[test]
    fn test_construction_failure_never_runs() {
        let mut config = LevelConfig::dungeon();
        config.tileset.tile_count = 0;
        let services = LevelServices::new(Box::new(HighScores::new()));
        let mut level = Level::new(config, services).unwrap();

        let result = level.start();
        assert!(matches!(result, Err(LevelError::Layout(_))));
        assert_eq!(level.phase(), LevelPhase::Failed);
        assert!(level.is_torn_down());
        assert!(level.drain_events().iter().any(|e| matches!(e, LevelEvent::Failed { .. })));

        // Ticking a failed level does nothing
        tick(&mut level, &TickInput::default(), 1.0);
        assert_eq!(level.score(), 0.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = LevelConfig::dungeon();
        config.world_chunks_x = 0;
        let result = Level::new(config, LevelServices::new(Box::new(HighScores::new())));
        assert!(matches!(result, Err(LevelError::Config(_))));
    }

    #[test]
    fn test_loss_is_idempotent() {
        let recorder = Recorder::default();
        let screen = Screen::default();
        let mut level = running_level(LevelConfig::dungeon(), &recorder, &screen);
        tick(&mut level, &TickInput::default(), 0.5);

        assert!(level.trigger_loss());
        assert!(!level.trigger_loss());
        assert!(!level.trigger_win());

        assert_eq!(level.phase(), LevelPhase::Ended(LevelOutcome::Lost));
        assert_eq!(recorder.submitted.borrow().len(), 1);
        assert_eq!(screen.shown.borrow().len(), 1);
        let ended = level
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, LevelEvent::Ended { .. }))
            .count();
        assert_eq!(ended, 1);
        assert!(level.is_torn_down());
        assert!(level.world().is_empty());
        assert!(level.pursuers().is_empty());
    }

    #[test]
    fn test_report_compares_previous_best() {
        let recorder = Recorder {
            best: Some(0.25),
            ..Recorder::default()
        };
        let screen = Screen::default();
        let mut level = running_level(LevelConfig::dungeon(), &recorder, &screen);
        tick(&mut level, &TickInput::default(), 0.5);
        level.trigger_loss();

        let report = level.report().unwrap();
        assert_eq!(report.outcome, LevelOutcome::Lost);
        assert_eq!(report.score, 0.5);
        assert_eq!(report.previous_best, Some(0.25));
        assert!(report.new_record);
        assert_eq!(screen.shown.borrow()[0], *report);
    }

    #[test]
    fn test_missing_outcome_target_still_halts() {
        let services =
            LevelServices::new(Box::new(HighScores::new())).with_collision(Box::new(NeverHit));
        let mut level = Level::new(LevelConfig::dungeon(), services).unwrap();
        level.start().unwrap();
        assert!(level.trigger_win());
        assert_eq!(level.phase(), LevelPhase::Ended(LevelOutcome::Won));
        assert!(level.is_torn_down());
    }

    #[test]
    fn test_pause_and_resume_transitions() {
        let recorder = Recorder::default();
        let screen = Screen::default();
        let mut level = running_level(LevelConfig::dungeon(), &recorder, &screen);

        assert!(level.pause());
        assert!(!level.pause());
        assert_eq!(level.phase(), LevelPhase::Paused);
        assert!(level.spawn_timer().is_paused());
        assert!(level.resume());
        assert!(!level.resume());
        assert_eq!(level.phase(), LevelPhase::Running);
    }

    #[test]
    fn test_teardown_while_running_halts() {
        let recorder = Recorder::default();
        let screen = Screen::default();
        let mut level = running_level(LevelConfig::dungeon(), &recorder, &screen);
        let before = level.player().pos;
        level.drain_events();

        level.teardown();
        assert_eq!(level.phase(), LevelPhase::Failed);
        assert!(level.drain_events().iter().any(|e| matches!(e, LevelEvent::Failed { .. })));

        let input = TickInput {
            movement: Vec2::X,
            ..Default::default()
        };
        tick(&mut level, &input, 0.1);
        assert_eq!(level.player().pos, before);
        assert!(level.world().is_empty());
        assert_eq!(level.score(), 0.0);
        assert!(recorder.submitted.borrow().is_empty());
        assert!(matches!(level.start(), Err(LevelError::InvalidPhase { .. })));
    }

    #[test]
    fn test_chunk_failure_mid_run_halts() {
        use crate::sim::layout::RoomLayout;
        use crate::sim::rooms::{RoomCatalog, RoomTemplate, RoomType};

        // The exit room at (7, 4) sits outside the starting window and holds
        // a tile the tileset does not have
        let config = LevelConfig::dungeon();
        let mut broken = RoomTemplate::open(config.chunk_size);
        broken.grid[0][0] = config.tileset.tile_count + 3;
        let source = WorldSource::Tilemap {
            catalog: RoomCatalog::standard(config.chunk_size).with_template(RoomType::End, broken),
            layout: RoomLayout::new(&config),
        };

        let recorder = Recorder::default();
        let services =
            LevelServices::new(Box::new(recorder.clone())).with_collision(Box::new(NeverHit));
        let mut level = Level::with_source(config, source, services).unwrap();
        level.start().unwrap();
        assert!(level.world().get(ChunkCoord::new(7, 4)).is_none());
        level.drain_events();

        // East through the start room's door into chunk (5, 4)
        let input = TickInput {
            movement: Vec2::X,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut level, &input, 0.25);
        }

        assert_eq!(level.phase(), LevelPhase::Failed);
        assert!(level.is_torn_down());
        assert!(level.world().is_empty());
        assert!(level.pursuers().is_empty());
        assert!(recorder.submitted.borrow().is_empty());
        let failures: Vec<LevelEvent> = level
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, LevelEvent::Failed { .. }))
            .collect();
        assert_eq!(failures.len(), 1);
        // Halted on the frame the player crossed x = 5 * 512
        assert_eq!(level.score(), 1.25);
    }

    #[test]
    fn test_teardown_runs_once() {
        let recorder = Recorder::default();
        let screen = Screen::default();
        let mut level = running_level(LevelConfig::dungeon(), &recorder, &screen);
        level.teardown();
        level.teardown();
        assert!(level.world().is_empty());
        assert!(level.is_torn_down());
    }
}
