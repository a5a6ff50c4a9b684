//! Best survival times
//!
//! Tracks the top 10 runs per level, persisted as JSON on native targets.
//! The level only ever reads the previous best and submits a final score.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Maximum number of high scores to keep per level
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Level key
    pub level: String,
    /// Seconds survived
    pub seconds: f32,
    /// Whether the run reached the end of the clock
    pub won: bool,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Persistence boundary for final scores
pub trait ScoreStore {
    /// Previous best for `level`, read before the new score is submitted
    fn best(&self, level: &str) -> Option<f32>;
    /// Record a finished run; returns the rank achieved (1-indexed)
    fn submit(&mut self, level: &str, seconds: f32, won: bool) -> Option<usize>;
}

/// High score leaderboard, sorted descending by seconds within each level
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Entries for one level, best first
    pub fn for_level<'a>(
        &'a self,
        level: &'a str,
    ) -> impl Iterator<Item = &'a HighScoreEntry> + 'a {
        self.entries.iter().filter(move |e| e.level == level)
    }

    /// Check if a score qualifies for the level's leaderboard
    pub fn qualifies(&self, level: &str, seconds: f32) -> bool {
        if seconds <= 0.0 {
            return false;
        }
        let count = self.for_level(level).count();
        if count < MAX_HIGH_SCORES {
            return true;
        }
        self.for_level(level).last().map(|e| seconds > e.seconds).unwrap_or(true)
    }

    /// Add a new score (if it qualifies); returns the rank achieved
    pub fn add_score(
        &mut self,
        level: &str,
        seconds: f32,
        won: bool,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.qualifies(level, seconds) {
            return None;
        }

        let rank = self.for_level(level).take_while(|e| e.seconds >= seconds).count() + 1;
        let entry = HighScoreEntry {
            level: level.to_string(),
            seconds,
            won,
            timestamp,
        };
        let pos = self
            .entries
            .iter()
            .position(|e| e.level == level && seconds > e.seconds)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);

        // Trim this level to max size
        let mut kept = 0;
        self.entries.retain(|e| {
            if e.level != level {
                return true;
            }
            kept += 1;
            kept <= MAX_HIGH_SCORES
        });

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load from a JSON file; a missing file is an empty leaderboard
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            log::info!("No high scores at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let scores: HighScores = serde_json::from_str(&json)?;
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

impl ScoreStore for HighScores {
    fn best(&self, level: &str) -> Option<f32> {
        self.for_level(level).next().map(|e| e.seconds)
    }

    fn submit(&mut self, level: &str, seconds: f32, won: bool) -> Option<usize> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0);
        self.add_score(level, seconds, won, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_and_best() {
        let mut scores = HighScores::new();
        assert_eq!(scores.best("a"), None);
        assert_eq!(scores.add_score("a", 30.0, false, 0.0), Some(1));
        assert_eq!(scores.add_score("a", 50.0, false, 0.0), Some(1));
        assert_eq!(scores.add_score("a", 40.0, false, 0.0), Some(2));
        assert_eq!(scores.add_score("b", 10.0, true, 0.0), Some(1));
        assert_eq!(scores.best("a"), Some(50.0));
        assert_eq!(scores.best("b"), Some(10.0));
        let a: Vec<f32> = scores.for_level("a").map(|e| e.seconds).collect();
        assert_eq!(a, vec![50.0, 40.0, 30.0]);
    }

    #[test]
    fn test_trimmed_per_level() {
        let mut scores = HighScores::new();
        for i in 1..=12 {
            scores.add_score("a", i as f32, false, 0.0);
        }
        scores.add_score("b", 1.0, false, 0.0);
        assert_eq!(scores.for_level("a").count(), MAX_HIGH_SCORES);
        assert_eq!(scores.for_level("a").last().map(|e| e.seconds), Some(3.0));
        assert!(!scores.qualifies("a", 2.0));
        assert_eq!(scores.for_level("b").count(), 1);
    }

    #[test]
    fn test_zero_score_does_not_qualify() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score("a", 0.0, false, 0.0), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let path =
            std::env::temp_dir().join(format!("room_runner_scores_{}.json", std::process::id()));
        let mut scores = HighScores::new();
        scores.submit("a", 12.5, true);
        scores.save(&path).unwrap();

        let loaded = HighScores::load(&path).unwrap();
        assert_eq!(loaded.best("a"), Some(12.5));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let path = std::env::temp_dir().join("room_runner_scores_missing_file.json");
        let loaded = HighScores::load(&path).unwrap();
        assert!(loaded.is_empty());
    }
}
