//! Plain-record snapshots of the board, shared by undo and persistence.
//!
//! A snapshot stores each location's cards as `{name, opsValue, side,
//! removable, era, isUnknown}` records. Restoring rebuilds fresh instances and
//! re-merges catalog data by name; `opsValue` always comes from the record.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::catalog::{Catalog, Era, Side};
use crate::game::board::{Board, CardInstance, UNKNOWN_CARD_NAME};
use crate::game::location::{HandLocation, Location};
use crate::game::stats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub name: String,
    #[serde(default, alias = "ops")]
    pub ops_value: f64,
    #[serde(default, alias = "eventType")]
    pub side: Side,
    #[serde(default = "default_removable", alias = "canBeRemoved")]
    pub removable: bool,
    #[serde(default, alias = "war")]
    pub era: Era,
    #[serde(default)]
    pub is_unknown: bool,
}

fn default_removable() -> bool {
    true
}

impl CardRecord {
    /// Placeholders are written with the deck average they displayed.
    pub fn from_instance(card: &CardInstance, deck_average: f64) -> Self {
        Self {
            name: if card.placeholder {
                UNKNOWN_CARD_NAME.to_string()
            } else {
                card.name.clone()
            },
            ops_value: card.effective_ops(deck_average),
            side: card.side,
            removable: card.removable,
            era: card.era,
            is_unknown: card.placeholder,
        }
    }

    fn is_placeholder(&self) -> bool {
        self.is_unknown || self.name == UNKNOWN_CARD_NAME
    }
}

/// Ordered records per location, keyed by location name in JSON.
pub type CardPositions = BTreeMap<Location, Vec<CardRecord>>;

/// Reads a stored or imported `cardPositions` object. Unknown location keys
/// are skipped and a `null` card list counts as empty.
pub fn deserialize_positions<'de, D>(deserializer: D) -> Result<Option<CardPositions>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<Vec<CardRecord>>>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|raw| {
        raw.into_iter()
            .filter_map(|(key, records)| match key.parse::<Location>() {
                Ok(loc) => Some((loc, records.unwrap_or_default())),
                Err(_) => {
                    warn!(location = %key, "skipping unknown location in saved positions");
                    None
                }
            })
            .collect()
    }))
}

/// One-shot release state of the mid and late war boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseState {
    #[default]
    NotReleased,
    Released,
}

impl ReleaseState {
    pub fn is_released(self) -> bool {
        self == ReleaseState::Released
    }
}

impl From<bool> for ReleaseState {
    fn from(value: bool) -> Self {
        if value {
            ReleaseState::Released
        } else {
            ReleaseState::NotReleased
        }
    }
}

/// Full session state captured before a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub positions: CardPositions,
    pub selected_hand: HandLocation,
    pub mid_war: ReleaseState,
    pub late_war: ReleaseState,
}

pub fn capture_positions(board: &Board) -> CardPositions {
    let deck_average = stats::deck_average(board);
    Location::ALL
        .into_iter()
        .map(|loc| {
            (
                loc,
                board
                    .cards(loc)
                    .iter()
                    .map(|card| CardRecord::from_instance(card, deck_average))
                    .collect(),
            )
        })
        .collect()
}

/// Clear the board and rebuild it from records, in record order. Named
/// records missing from the catalog keep their literal fields.
pub fn restore_positions(board: &mut Board, positions: &CardPositions, catalog: &Catalog) {
    board.clear();
    for (&loc, records) in positions {
        for record in records {
            let id = board.mint_id();
            let card = if record.is_placeholder() {
                CardInstance::placeholder(id)
            } else {
                enrich(id, record, catalog)
            };
            board.push(loc, card);
        }
    }
}

fn enrich(id: crate::game::board::InstanceId, record: &CardRecord, catalog: &Catalog) -> CardInstance {
    match catalog.find(&record.name) {
        Some(entry) => {
            let mut card = CardInstance::from_card(id, entry);
            card.ops_value = record.ops_value;
            card
        }
        None => CardInstance {
            id,
            name: record.name.clone(),
            short_name: String::new(),
            ops_value: record.ops_value,
            side: record.side,
            era: record.era,
            types: Vec::new(),
            regions: Vec::new(),
            removable: record.removable,
            placeholder: false,
        },
    }
}
