//! Card catalog: static reference data fetched once per session.
//!
//! The page shell fetches `cards.json` and posts it to `/api/catalog`. Records
//! accept both the canonical field names (`opsValue`, `side`, `era`,
//! `removable`) and the legacy spellings found in older card files
//! (`ops`, `eventType`, `war`, `canBeRemoved`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, TrackerError};

/// Event type of a card. Unrecognized values read as `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Side {
    Us,
    #[default]
    Neutral,
    Ussr,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Us => "us",
            Side::Neutral => "neutral",
            Side::Ussr => "ussr",
        }
    }

    /// Bucket used by the discard / removed sort: US < Neutral < USSR.
    pub fn sort_rank(self) -> u8 {
        match self {
            Side::Us => 0,
            Side::Neutral => 1,
            Side::Ussr => 2,
        }
    }

    /// Strict parse used by form input, where "neutral" is not a valid player side.
    pub fn parse_player(value: &str) -> Option<Side> {
        match value.trim().to_ascii_lowercase().as_str() {
            "us" => Some(Side::Us),
            "ussr" => Some(Side::Ussr),
            _ => None,
        }
    }
}

impl From<String> for Side {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "us" => Side::Us,
            "ussr" => Side::Ussr,
            _ => Side::Neutral,
        }
    }
}

impl From<Side> for &'static str {
    fn from(value: Side) -> Self {
        value.as_str()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Us => f.write_str("US"),
            Side::Neutral => f.write_str("Neutral"),
            Side::Ussr => f.write_str("USSR"),
        }
    }
}

/// War period. Early cards start in the deck, mid and late cards in the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Era {
    #[default]
    Early,
    Mid,
    Late,
}

impl Era {
    pub fn as_str(self) -> &'static str {
        match self {
            Era::Early => "early",
            Era::Mid => "mid",
            Era::Late => "late",
        }
    }
}

impl From<String> for Era {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "mid" => Era::Mid,
            "late" => Era::Late,
            _ => Era::Early,
        }
    }
}

impl From<Era> for &'static str {
    fn from(value: Era) -> Self {
        value.as_str()
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(alias = "ops")]
    pub ops_value: f64,
    #[serde(default, alias = "eventType")]
    pub side: Side,
    #[serde(default, alias = "war")]
    pub era: Era,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default, alias = "canBeRemoved")]
    pub removable: bool,
}

/// Ordered card list with a name index. Names are not guaranteed unique; the
/// index resolves a name to its first occurrence.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: Vec<Card>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(cards: Vec<Card>) -> Self {
        let mut by_name = HashMap::with_capacity(cards.len());
        for (idx, card) in cards.iter().enumerate() {
            by_name.entry(card.name.clone()).or_insert(idx);
        }
        Self { cards, by_name }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let cards: Vec<Card> =
            serde_json::from_str(json).map_err(|e| TrackerError::CatalogParse(e.to_string()))?;
        if cards.iter().any(|c| !c.ops_value.is_finite() || c.ops_value < 0.0) {
            return Err(TrackerError::CatalogParse(
                "ops values must be non-negative numbers".to_string(),
            ));
        }
        Ok(Self::new(cards))
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn find(&self, name: &str) -> Option<&Card> {
        self.by_name.get(name).map(|&idx| &self.cards[idx])
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Distinct type tags in catalog order, for the filter selector.
    pub fn type_tags(&self) -> Vec<&str> {
        distinct(self.cards.iter().flat_map(|c| c.types.iter()))
    }

    /// Distinct region tags in catalog order, for the filter selector.
    pub fn region_tags(&self) -> Vec<&str> {
        distinct(self.cards.iter().flat_map(|c| c.regions.iter()))
    }
}

fn distinct<'a>(tags: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for tag in tags {
        if !out.contains(&tag.as_str()) {
            out.push(tag);
        }
    }
    out
}
