//! Persisted game records and the games index.
//!
//! ## Store layout
//!
//! ```text
//! <prefix>games          → [{ "id", "displayName" }, ...]
//! <prefix>game_<id>      → GameRecord (JSON)
//! <prefix>currentGame    → "<id>"   (absent when no game is selected)
//! ```
//!
//! A malformed index reads back as empty and is logged. A malformed game
//! record is an error, so it is never mistaken for a fresh game and
//! overwritten.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::Side;
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::game::location::HandLocation;
use crate::game::snapshot::{self, CardPositions};
use crate::store::KvStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameIndexEntry {
    pub id: String,
    #[serde(alias = "name")]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "title")]
    pub display_name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub player_side: Option<Side>,
    #[serde(default)]
    pub mid_war_added: bool,
    #[serde(default)]
    pub late_war_added: bool,
    #[serde(default)]
    pub selected_hand_location: HandLocation,
    #[serde(default, deserialize_with = "snapshot::deserialize_positions")]
    pub card_positions: Option<CardPositions>,
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// Export file body: the stored record plus when it was exported.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedGame {
    #[serde(flatten)]
    pub record: GameRecord,
    pub exported_at: String,
}

/// Import file body. Every field is optional; the display name falls back
/// through `displayName`, `name`, then `title`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedGame {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    player_side: Option<Side>,
    #[serde(default)]
    mid_war_added: bool,
    #[serde(default)]
    late_war_added: bool,
    #[serde(default)]
    selected_hand_location: HandLocation,
    #[serde(default, deserialize_with = "snapshot::deserialize_positions")]
    card_positions: Option<CardPositions>,
}

/// Validate an import file and turn it into a record without an id. Nothing
/// is written here, so a rejected file leaves the store untouched.
pub fn parse_import(json: &str) -> Result<GameRecord> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| TrackerError::ImportRejected(e.to_string()))?;
    if !value.is_object() {
        return Err(TrackerError::ImportRejected(
            "expected a game object".to_string(),
        ));
    }
    if value.get("cardPositions").is_none_or(|v| !v.is_object()) {
        return Err(TrackerError::ImportRejected(
            "missing cardPositions".to_string(),
        ));
    }
    let doc: ImportedGame =
        serde_json::from_value(value).map_err(|e| TrackerError::ImportRejected(e.to_string()))?;
    let display_name = [doc.display_name, doc.name, doc.title]
        .into_iter()
        .flatten()
        .find(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Imported Game".to_string());
    Ok(GameRecord {
        id: String::new(),
        display_name,
        notes: doc.notes,
        player_side: doc.player_side,
        mid_war_added: doc.mid_war_added,
        late_war_added: doc.late_war_added,
        selected_hand_location: doc.selected_hand_location,
        card_positions: Some(doc.card_positions.unwrap_or_default()),
        last_modified: None,
    })
}

/// Typed access to the store keys of one configuration.
pub struct Library<'a> {
    store: &'a mut dyn KvStore,
    config: &'a TrackerConfig,
}

impl<'a> Library<'a> {
    pub fn new(store: &'a mut dyn KvStore, config: &'a TrackerConfig) -> Self {
        Self { store, config }
    }

    pub fn index(&self) -> Vec<GameIndexEntry> {
        let Some(raw) = self.store.get(&self.config.games_key()) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "games index is malformed; treating as empty");
            Vec::new()
        })
    }

    pub fn write_index(&mut self, games: &[GameIndexEntry]) -> Result<()> {
        let json = serde_json::to_string(games)?;
        self.store.set(&self.config.games_key(), json);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index().iter().any(|g| g.id == id)
    }

    /// The stored record, `None` when the key is absent.
    pub fn record(&self, id: &str) -> Result<Option<GameRecord>> {
        let Some(raw) = self.store.get(&self.config.game_key(id)) else {
            return Ok(None);
        };
        serde_json::from_str::<GameRecord>(&raw).map(Some).map_err(|e| {
            warn!(game = id, error = %e, "stored game record is malformed");
            TrackerError::CorruptRecord {
                id: id.to_string(),
                reason: e.to_string(),
            }
        })
    }

    pub fn has_record(&self, id: &str) -> bool {
        self.store.get(&self.config.game_key(id)).is_some()
    }

    pub fn write_record(&mut self, record: &GameRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.store.set(&self.config.game_key(&record.id), json);
        Ok(())
    }

    pub fn remove_record(&mut self, id: &str) {
        self.store.remove(&self.config.game_key(id));
    }

    pub fn current_id(&self) -> Option<String> {
        self.store
            .get(&self.config.current_game_key())
            .filter(|id| !id.is_empty())
    }

    pub fn set_current_id(&mut self, id: Option<&str>) {
        let key = self.config.current_game_key();
        match id {
            Some(id) => self.store.set(&key, id.to_string()),
            None => self.store.remove(&key),
        }
    }

    pub fn rename(&mut self, id: &str, display_name: &str) -> Result<()> {
        let mut games = self.index();
        if let Some(entry) = games.iter_mut().find(|g| g.id == id) {
            if entry.display_name != display_name {
                entry.display_name = display_name.to_string();
                self.write_index(&games)?;
            }
        }
        Ok(())
    }
}

/// Display name built from the new-game form.
pub fn display_name_for(opponent: &str, side: Option<Side>, external_id: &str) -> String {
    let opponent = opponent.trim();
    let mut name = if opponent.is_empty() {
        "New Game".to_string()
    } else {
        format!("vs {}", opponent)
    };
    if let Some(side) = side {
        name.push_str(&format!(" as {}", side));
    }
    let external_id = external_id.trim();
    if !external_id.is_empty() {
        name.push_str(&format!(" #{}", external_id));
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::location::Location;
    use crate::store::MemoryStore;

    #[test]
    fn index_roundtrip_and_rename() {
        let mut store = MemoryStore::new();
        let config = TrackerConfig::default();
        let mut lib = Library::new(&mut store, &config);
        lib.write_index(&[GameIndexEntry {
            id: "game_1".to_string(),
            display_name: "First".to_string(),
        }])
        .unwrap();
        lib.rename("game_1", "Renamed").unwrap();
        assert_eq!(lib.index()[0].display_name, "Renamed");
        assert!(lib.contains("game_1"));
    }

    #[test]
    fn legacy_index_uses_name_field() {
        let mut store = MemoryStore::new();
        store.set("cardCounter_games", r#"[{"id":"game_9","name":"Old"}]"#.to_string());
        let config = TrackerConfig::default();
        let lib = Library::new(&mut store, &config);
        assert_eq!(lib.index()[0].display_name, "Old");
    }

    #[test]
    fn malformed_index_reads_empty() {
        let mut store = MemoryStore::new();
        store.set("cardCounter_games", "{oops".to_string());
        let config = TrackerConfig::default();
        let lib = Library::new(&mut store, &config);
        assert!(lib.index().is_empty());
    }

    #[test]
    fn current_pointer_set_and_cleared() {
        let mut store = MemoryStore::new();
        let config = TrackerConfig::default();
        let mut lib = Library::new(&mut store, &config);
        lib.set_current_id(Some("game_2"));
        assert_eq!(lib.current_id().as_deref(), Some("game_2"));
        lib.set_current_id(None);
        assert_eq!(lib.current_id(), None);
    }

    #[test]
    fn legacy_record_reads_title() {
        let record: GameRecord =
            serde_json::from_str(r#"{"id":"game_3","title":"Tournament","notes":"n"}"#).unwrap();
        assert_eq!(record.display_name, "Tournament");
        assert!(record.card_positions.is_none());
        assert!(!record.mid_war_added);
    }

    #[test]
    fn import_accepts_legacy_export() {
        let record = parse_import(
            r#"{"id":"game_1","title":"t","name":"Listed","notes":"","cardPositions":{"your-hand":[]},
                "lastModified":"x","exportedAt":"y"}"#,
        )
        .unwrap();
        assert_eq!(record.display_name, "Listed");
        assert!(record.id.is_empty());
        assert!(record.card_positions.is_some());
    }

    #[test]
    fn import_rejects_bad_shapes() {
        assert!(matches!(parse_import("nope"), Err(TrackerError::ImportRejected(_))));
        assert!(matches!(parse_import("[1,2]"), Err(TrackerError::ImportRejected(_))));
        assert!(matches!(
            parse_import(r#"{"displayName":"x"}"#),
            Err(TrackerError::ImportRejected(_))
        ));
    }

    #[test]
    fn import_skips_unknown_locations() {
        let record = parse_import(
            r#"{"name":"X","cardPositions":{"discard":[{"name":"Fidel","opsValue":2}],"deck":null,"graveyard":[]}}"#,
        )
        .unwrap();
        let positions = record.card_positions.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[&Location::Discard][0].name, "Fidel");
    }

    #[test]
    fn import_treats_null_lists_as_empty() {
        let record = parse_import(r#"{"cardPositions":{"discard":null,"your-hand":[]}}"#).unwrap();
        let positions = record.card_positions.unwrap();
        assert!(positions[&Location::Discard].is_empty());
        assert!(positions[&Location::YourHand].is_empty());
    }

    #[test]
    fn malformed_record_is_an_error_not_missing() {
        let mut store = MemoryStore::new();
        store.set("cardCounter_game_game_4", r#"{"cardPositions":5}"#.to_string());
        let config = TrackerConfig::default();
        let lib = Library::new(&mut store, &config);
        assert!(matches!(
            lib.record("game_4"),
            Err(TrackerError::CorruptRecord { .. })
        ));
        assert!(lib.has_record("game_4"));
        assert!(matches!(lib.record("game_5"), Ok(None)));
    }

    #[test]
    fn import_defaults_name() {
        let record = parse_import(r#"{"cardPositions":{}}"#).unwrap();
        assert_eq!(record.display_name, "Imported Game");
    }

    #[test]
    fn form_display_name() {
        assert_eq!(display_name_for("Alice", Some(Side::Us), "42"), "vs Alice as US #42");
        assert_eq!(display_name_for("", None, ""), "New Game");
    }
}
