//! Tunables for a tracking session.
//!
//! Loaded from JSON posted by the page shell (`POST /api/config`); every field
//! falls back to its default when absent.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    /// Maximum number of undo entries kept; the oldest is evicted first.
    pub undo_capacity: usize,
    /// Minimum gap between two executed undos. Faster repeats are dropped.
    pub undo_debounce_ms: i64,
    /// Prefix for every key written to the durable store.
    pub storage_prefix: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            undo_capacity: 20,
            undo_debounce_ms: 100,
            storage_prefix: "cardCounter_".to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid config JSON: {}", e))
    }

    pub fn games_key(&self) -> String {
        format!("{}games", self.storage_prefix)
    }

    pub fn game_key(&self, id: &str) -> String {
        format!("{}game_{}", self.storage_prefix, id)
    }

    pub fn current_game_key(&self) -> String {
        format!("{}currentGame", self.storage_prefix)
    }
}
