//! High score leaderboard system
//!
//! Persisted as JSON through a `KeyValueStore`, tracks the top 10 scores.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, load_json, save_json};
use crate::sim::Difficulty;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Read once per round to size volleys, written after every round that places
pub trait ScoreStore {
    /// Best score so far (0 when nothing is recorded)
    fn high_score(&self) -> u64;
    /// Record a finished round's score; returns its leaderboard rank
    /// (1-indexed) or `None` when it didn't place
    fn set_high_score(&mut self, score: u64, difficulty: Difficulty) -> Option<usize>;
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    /// Difficulty the round was played on
    pub difficulty: Difficulty,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Storage key for the leaderboard
    const STORAGE_KEY: &'static str = "asteroid_blaster_highscores";
    /// Older builds stored just the best score, as a bare integer
    const LEGACY_KEY: &'static str = "asteroidBlasterHighScore";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u64, difficulty: Difficulty, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            difficulty,
            timestamp,
        };

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the leaderboard (missing or corrupt data starts fresh)
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let scores: HighScores = load_json(store, Self::STORAGE_KEY);
        log::info!("Loaded {} high scores", scores.entries.len());
        scores
    }

    /// Move a legacy single-value high score into the leaderboard
    ///
    /// Runs once: the legacy key is removed after a successful import.
    pub fn migrate_legacy(store: &mut dyn KeyValueStore) {
        let Some(raw) = store.get(Self::LEGACY_KEY) else {
            return;
        };
        if store.get(Self::STORAGE_KEY).is_none() {
            let mut scores = Self::load(store);
            match raw.trim().parse::<u64>() {
                Ok(score) => {
                    log::info!("Imported legacy high score {}", score);
                    scores.add_score(score, Difficulty::default(), 0.0);
                }
                Err(e) => log::warn!("Discarding unreadable legacy high score: {}", e),
            }
            if let Err(e) = save_json(store, Self::STORAGE_KEY, &scores) {
                log::warn!("Failed to migrate legacy high score: {}", e);
                return;
            }
        }
        if let Err(e) = store.remove(Self::LEGACY_KEY) {
            log::warn!("Failed to remove legacy high score: {}", e);
        }
    }

    /// Save the leaderboard. Failures are logged, never fatal.
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match save_json(store, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Failed to save high scores: {}", e),
        }
    }
}

impl ScoreStore for HighScores {
    fn high_score(&self) -> u64 {
        self.top_score().unwrap_or(0)
    }

    fn set_high_score(&mut self, score: u64, difficulty: Difficulty) -> Option<usize> {
        self.add_score(score, difficulty, crate::platform::now_ms())
    }
}

/// Format a timestamp as a relative date string
pub fn format_date(timestamp: f64, now: f64) -> String {
    // Imported entries carry no date
    if timestamp <= 0.0 {
        return "Earlier".to_string();
    }
    let diff_mins = (now - timestamp) / 1000.0 / 60.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        if days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}
