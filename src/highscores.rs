//! Local best-distance table
//!
//! Persisted to LocalStorage. Supplies each player's baseline to the session
//! and receives the distances it reports; keeps the top 10 runs overall.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::sim::{GameSession, Lifecycle, Phase};

/// Maximum number of runs to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player label, `None` for guests
    pub user: Option<String>,
    /// Metres travelled
    pub distance: f64,
    /// Phase the run ended in
    pub phase: Phase,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Best runs, sorted by distance descending, plus every player's own best
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
    /// Personal bests by player label; survives being pushed off the top 10
    #[serde(default)]
    bests: HashMap<String, f64>,
    #[serde(default)]
    guest_best: f64,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "ninja_ascent_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a distance makes the table
    pub fn qualifies(&self, distance: f64) -> bool {
        if !distance.is_finite() || distance <= 0.0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| distance > e.distance)
    }

    /// Best distance for `user` (0 when they have never finished a run)
    pub fn best_for(&self, user: Option<&str>) -> f64 {
        let stored = match user {
            Some(name) => self.bests.get(name).copied().unwrap_or(0.0),
            None => self.guest_best,
        };
        // Tables saved before personal bests were tracked only have entries
        self.entries
            .iter()
            .filter(|e| e.user.as_deref() == user)
            .map(|e| e.distance)
            .fold(stored, f64::max)
    }

    /// Raise `user`'s personal best; true if it changed
    fn record_best(&mut self, user: Option<&str>, distance: f64) -> bool {
        if !distance.is_finite() || distance <= self.best_for(user) {
            return false;
        }
        match user {
            Some(name) => {
                self.bests.insert(name.to_owned(), distance);
            }
            None => self.guest_best = distance,
        }
        true
    }

    /// Add a finished run; returns the rank achieved (1-indexed) or None if
    /// it didn't make the top 10. The player's personal best is updated either way.
    pub fn add_run(
        &mut self,
        user: Option<&str>,
        distance: f64,
        phase: Phase,
        timestamp: f64,
    ) -> Option<usize> {
        if self.record_best(user, distance) {
            log::info!("Personal best for {}: {:.1} m", user.unwrap_or("guest"), distance);
        }
        if !self.qualifies(distance) {
            return None;
        }

        let entry = HighScoreEntry {
            user: user.map(str::to_owned),
            distance,
            phase,
            timestamp,
        };

        let pos = self.entries.iter().position(|e| distance > e.distance);
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

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Record `session` if its run is over; a run still in progress is ignored
    pub fn record_session(&mut self, session: &GameSession, timestamp: f64) -> Option<usize> {
        if session.lifecycle() != Lifecycle::GameOver {
            return None;
        }
        self.add_run(session.user_id(), session.distance(), session.phase(), timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest run overall (if any)
    pub fn top_distance(&self) -> Option<f64> {
        self.entries.first().map(|e| e.distance)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
            && let Ok(scores) = serde_json::from_str::<HighScores>(&json)
        {
            log::info!("Loaded {} high scores", scores.entries.len());
            return scores;
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("High scores saved ({} entries)", self.entries.len());
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Format a timestamp as a relative date string
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    let now = js_sys::Date::now();
    let diff_mins = (now - timestamp) / 60_000.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i32;
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
            format!(
                "{}/{}/{}",
                date.get_month() + 1,
                date.get_date(),
                date.get_full_year() % 100
            )
        }
    } else if diff_hours >= 1.0 {
        format!("{}h ago", diff_hours.floor() as i32)
    } else if diff_mins >= 1.0 {
        format!("{}m ago", diff_mins.floor() as i32)
    } else {
        "Just now".to_string()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(_timestamp: f64) -> String {
    "N/A".to_string()
}
