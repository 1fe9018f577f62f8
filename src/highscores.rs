//! Local best-run table
//!
//! Top 10 runs ranked by score, ties broken by distance. Persisted to
//! LocalStorage on wasm; native builds keep it in memory only.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::ShipId;

/// Maximum number of runs kept
pub const MAX_HIGH_SCORES: usize = 10;

/// One finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Forward distance covered
    pub distance: f32,
    pub ship: ShipId,
    /// Unix timestamp (ms) when the run ended
    pub timestamp: f64,
}

impl HighScoreEntry {
    /// True when `self` ranks strictly above `other`
    fn beats(&self, other: &HighScoreEntry) -> bool {
        match self.score.cmp(&other.score) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.distance > other.distance,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "star_racer_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Rank (1-indexed) a run would take, or None if it would not make the table
    pub fn potential_rank(&self, entry: &HighScoreEntry) -> Option<usize> {
        if entry.score == 0 {
            return None;
        }
        let pos = self
            .entries
            .iter()
            .position(|e| entry.beats(e))
            .unwrap_or(self.entries.len());
        (pos < MAX_HIGH_SCORES).then_some(pos + 1)
    }

    /// Insert a finished run; returns its rank or None if it did not qualify
    pub fn record(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let rank = self.potential_rank(&entry)?;
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&HighScoreEntry> {
        self.entries.first()
    }

    /// Load the table from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<HighScores>(&json) {
                    Ok(scores) => {
                        log::info!("Loaded {} high scores", scores.entries.len());
                        return scores;
                    }
                    Err(e) => log::warn!("Discarding unreadable high scores: {}", e),
                }
            }
        }

        Self::new()
    }

    /// Save the table to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match serde_json::to_string(self) {
                Ok(json) => {
                    if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                        log::warn!("Failed to write high scores");
                    }
                }
                Err(e) => log::warn!("Failed to serialize high scores: {}", e),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}

/// Describe how long ago `timestamp` was, relative to `now` (both ms)
pub fn format_age(now: f64, timestamp: f64) -> String {
    let mins = ((now - timestamp) / 60_000.0).max(0.0).floor() as u64;
    let hours = mins / 60;
    let days = hours / 24;

    match (days, hours, mins) {
        (0, 0, 0) => "Just now".to_string(),
        (0, 0, 1) => "1 min ago".to_string(),
        (0, 0, m) => format!("{} mins ago", m),
        (0, 1, _) => "1 hour ago".to_string(),
        (0, h, _) => format!("{} hours ago", h),
        (1, _, _) => "Yesterday".to_string(),
        (d, _, _) => format!("{} days ago", d),
    }
}
