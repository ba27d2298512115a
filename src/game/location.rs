//! The eight fixed card locations and the `deck` alias.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::Side;
use crate::error::TrackerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Location {
    YourHand,
    OpponentHand,
    DeckUs,
    DeckNeutral,
    DeckUssr,
    Discard,
    Removed,
    Box,
}

impl Location {
    pub const ALL: [Location; 8] = [
        Location::YourHand,
        Location::OpponentHand,
        Location::DeckUs,
        Location::DeckNeutral,
        Location::DeckUssr,
        Location::Discard,
        Location::Removed,
        Location::Box,
    ];

    pub const DECK: [Location; 3] = [Location::DeckUs, Location::DeckNeutral, Location::DeckUssr];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Location::YourHand => "your-hand",
            Location::OpponentHand => "opponent-hand",
            Location::DeckUs => "deck-us",
            Location::DeckNeutral => "deck-neutral",
            Location::DeckUssr => "deck-ussr",
            Location::Discard => "discard",
            Location::Removed => "removed",
            Location::Box => "box",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Location::YourHand => "Your Hand",
            Location::OpponentHand => "Opponent's Hand",
            Location::DeckUs => "US",
            Location::DeckNeutral => "Neutral",
            Location::DeckUssr => "USSR",
            Location::Discard => "Discard",
            Location::Removed => "Removed",
            Location::Box => "Box",
        }
    }

    /// Deck subsection holding cards of the given side.
    pub fn deck_for(side: Side) -> Location {
        match side {
            Side::Us => Location::DeckUs,
            Side::Neutral => Location::DeckNeutral,
            Side::Ussr => Location::DeckUssr,
        }
    }

    pub fn is_hand(self) -> bool {
        matches!(self, Location::YourHand | Location::OpponentHand)
    }

    pub fn is_deck(self) -> bool {
        matches!(self, Location::DeckUs | Location::DeckNeutral | Location::DeckUssr)
    }

    /// Every location except the two hands is kept sorted.
    pub fn is_sorted(self) -> bool {
        !self.is_hand()
    }

    /// Discard and removed sort by side bucket before ops.
    pub fn sorts_by_side(self) -> bool {
        matches!(self, Location::Discard | Location::Removed)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::ALL
            .into_iter()
            .find(|loc| loc.as_str() == s)
            .ok_or_else(|| TrackerError::UnknownLocation(s.to_string()))
    }
}

/// Destination of a move: a concrete location, or `deck`, which resolves to
/// a subsection by the moved card's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    At(Location),
    Deck,
}

impl MoveTarget {
    pub fn resolve(self, side: Side) -> Location {
        match self {
            MoveTarget::At(loc) => loc,
            MoveTarget::Deck => Location::deck_for(side),
        }
    }
}

impl From<Location> for MoveTarget {
    fn from(value: Location) -> Self {
        MoveTarget::At(value)
    }
}

impl FromStr for MoveTarget {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "deck" {
            Ok(MoveTarget::Deck)
        } else {
            s.parse().map(MoveTarget::At)
        }
    }
}

/// The hand that receives cards clicked out of the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandLocation {
    #[default]
    YourHand,
    OpponentHand,
}

impl HandLocation {
    pub fn location(self) -> Location {
        match self {
            HandLocation::YourHand => Location::YourHand,
            HandLocation::OpponentHand => Location::OpponentHand,
        }
    }
}

impl FromStr for HandLocation {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "your-hand" => Ok(HandLocation::YourHand),
            "opponent-hand" => Ok(HandLocation::OpponentHand),
            other => Err(TrackerError::UnknownLocation(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for loc in Location::ALL {
            assert_eq!(loc.as_str().parse::<Location>().unwrap(), loc);
        }
        assert!("deck".parse::<Location>().is_err());
    }

    #[test]
    fn index_matches_all_order() {
        for (i, loc) in Location::ALL.iter().enumerate() {
            assert_eq!(loc.index(), i);
        }
    }

    #[test]
    fn deck_alias_routes_by_side() {
        let target: MoveTarget = "deck".parse().unwrap();
        assert_eq!(target.resolve(Side::Us), Location::DeckUs);
        assert_eq!(target.resolve(Side::Ussr), Location::DeckUssr);
        assert_eq!(target.resolve(Side::Neutral), Location::DeckNeutral);
        let fixed: MoveTarget = "discard".parse().unwrap();
        assert_eq!(fixed.resolve(Side::Us), Location::Discard);
    }

    #[test]
    fn serde_uses_kebab_names() {
        assert_eq!(
            serde_json::to_string(&Location::OpponentHand).unwrap(),
            r#""opponent-hand""#
        );
        let hand: HandLocation = serde_json::from_str(r#""opponent-hand""#).unwrap();
        assert_eq!(hand.location(), Location::OpponentHand);
    }

    #[test]
    fn only_hands_are_unsorted() {
        assert!(!Location::YourHand.is_sorted());
        assert!(!Location::OpponentHand.is_sorted());
        assert!(Location::Box.is_sorted());
        assert!(Location::Discard.sorts_by_side());
        assert!(!Location::DeckUs.sorts_by_side());
    }
}
