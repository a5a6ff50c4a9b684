//! Room Runner entry point
//!
//! Headless native host: loads a level config, runs the fixed-timestep loop
//! with a scripted flee input, and persists high scores.
//!
//! Usage: `room-runner [config.json]`. `ROOM_RUNNER_SCORES` overrides the
//! high score file location.

#[cfg(not(target_arch = "wasm32"))]
mod host {
    use std::error::Error;
    use std::path::{Path, PathBuf};

    use glam::Vec2;
    use room_runner::consts::{MAX_SUBSTEPS, SIM_DT};
    use room_runner::highscores::ScoreStore;
    use room_runner::sim::{
        Level, LevelEvent, LevelReport, LevelServices, OutcomeTarget, TickInput, tick,
    };
    use room_runner::{HighScores, LevelConfig};

    const DEFAULT_SCORES_PATH: &str = "room_runner_scores.json";
    /// Host frame length; deliberately not a multiple of SIM_DT
    const FRAME_DT: f32 = 1.0 / 45.0;

    /// High scores that write through to disk on every submission
    struct FileScores {
        scores: HighScores,
        path: PathBuf,
    }

    impl ScoreStore for FileScores {
        fn best(&self, level: &str) -> Option<f32> {
            self.scores.best(level)
        }

        fn submit(&mut self, level: &str, seconds: f32, won: bool) -> Option<usize> {
            let rank = self.scores.submit(level, seconds, won);
            if let Err(err) = self.scores.save(&self.path) {
                log::error!("Failed to save high scores to {}: {}", self.path.display(), err);
            }
            rank
        }
    }

    /// Prints the final report
    struct ConsoleScreen;

    impl OutcomeTarget for ConsoleScreen {
        fn present(&mut self, report: &LevelReport) {
            println!("\n=== {} ===", report.level);
            println!("Outcome:   {:?}", report.outcome);
            println!("Survived:  {:.1}s", report.score);
            match report.previous_best {
                Some(best) => println!("Best:      {:.1}s", best),
                None => println!("Best:      -"),
            }
            if report.new_record {
                println!("New record!");
            }
            if let Some(rank) = report.rank {
                println!("Rank:      #{}", rank);
            }
        }
    }

    /// Steer directly away from the nearest pursuer
    fn flee_input(level: &Level) -> TickInput {
        let player = level.player().pos;
        let nearest = level.pursuers().iter().min_by(|a, b| {
            a.pos
                .distance_squared(player)
                .total_cmp(&b.pos.distance_squared(player))
        });
        let movement = nearest.map_or(Vec2::ZERO, |p| (player - p.pos).normalize_or_zero());
        TickInput {
            movement,
            ..Default::default()
        }
    }

    fn load_config(path: Option<&Path>) -> Result<LevelConfig, Box<dyn Error>> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                let config = LevelConfig::from_json(&json)?;
                log::info!("Loaded level config '{}' from {}", config.key, path.display());
                Ok(config)
            }
            None => Ok(LevelConfig::dungeon()),
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let config_path = std::env::args().nth(1).map(PathBuf::from);
        let config = load_config(config_path.as_deref())?;

        let scores_path = std::env::var("ROOM_RUNNER_SCORES")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SCORES_PATH));
        let scores = HighScores::load(&scores_path)?;

        let services = LevelServices::new(Box::new(FileScores {
            scores,
            path: scores_path,
        }))
        .with_outcome_target(Box::new(ConsoleScreen));

        // Hard stop well past the survival clock in case nothing ends the run
        let max_frames = ((config.time_to_survive_secs as f32 + 10.0) / FRAME_DT) as u64;

        let mut level = Level::new(config, services)?;
        level.start()?;

        let mut accumulator = 0.0;
        for _ in 0..max_frames {
            accumulator += FRAME_DT;

            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = flee_input(&level);
                tick(&mut level, &input, SIM_DT);
                accumulator -= SIM_DT;
                substeps += 1;
            }

            for event in level.drain_events() {
                match event {
                    LevelEvent::ClockTicked { remaining_secs, .. } if remaining_secs % 10 == 0 => {
                        let hud = level.hud();
                        println!("{:>4}s left, {} pursuers", remaining_secs, hud.live_pursuers);
                    }
                    LevelEvent::DifficultyChanged {
                        speed,
                        spawn_interval_ms,
                    } => log::info!(
                        "Difficulty: speed {:.0}, spawn every {} ms",
                        speed,
                        spawn_interval_ms
                    ),
                    LevelEvent::Failed { reason } => log::error!("Level failed: {}", reason),
                    _ => {}
                }
            }

            if level.phase().is_over() {
                break;
            }
        }

        if !level.phase().is_over() {
            log::warn!("Run stopped before the level ended ({})", level.phase().as_str());
        }
        level.teardown();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Room Runner (headless) starting...");

    if let Err(err) = host::run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless host on wasm32; embed the library instead
}
