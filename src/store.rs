//! Durable key-value store bridge.
//!
//! The worker cannot reach `localStorage` directly, so the WASM side keeps a
//! mirror: the page shell hydrates it once at startup
//! (`POST /api/store/hydrate`) and drains the write journal after each
//! request (`GET /api/store/flush`), applying the ops on the main thread.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A write waiting to be applied to browser storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum StoreOp {
    Set { key: String, value: String },
    Remove { key: String },
}

pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);

    /// Seed values already present in browser storage.
    fn hydrate(&mut self, entries: HashMap<String, String>) {
        for (key, value) in entries {
            self.set(&key, value);
        }
    }

    /// Take the writes made since the last drain.
    fn drain_pending(&mut self) -> Vec<StoreOp> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    journal: Vec<StoreOp>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value.clone());
        self.journal.push(StoreOp::Set {
            key: key.to_string(),
            value,
        });
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
        self.journal.push(StoreOp::Remove {
            key: key.to_string(),
        });
    }

    /// Mirrors existing storage, so nothing is journaled.
    fn hydrate(&mut self, entries: HashMap<String, String>) {
        self.values.extend(entries);
    }

    fn drain_pending(&mut self) -> Vec<StoreOp> {
        std::mem::take(&mut self.journal)
    }
}

/// Parse a `localStorage` dump posted by the page shell.
pub fn parse_dump(json: &str) -> Result<HashMap<String, String>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid store JSON: {}", e))
}
