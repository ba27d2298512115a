//! Location store, the single source of truth for where every card is.
//!
//! Each of the eight locations holds an ordered `Vec<CardInstance>`. A card
//! instance lives in exactly one vector; moves take it out of one and push it
//! onto another. Non-hand locations are fully re-sorted after every change;
//! hand order belongs to the user.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::catalog::{Card, Era, Side};
use crate::error::{Result, TrackerError};
use crate::game::location::{Location, MoveTarget};
use crate::game::stats;

/// Name persisted for placeholder cards.
pub const UNKNOWN_CARD_NAME: &str = "Unknown Card";

/// Session-unique handle for one placed card. Duplicate catalog names still
/// get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for InstanceId {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse()
            .map(InstanceId)
            .map_err(|_| TrackerError::InvalidId(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardInstance {
    pub id: InstanceId,
    pub name: String,
    pub short_name: String,
    /// Stored ops. Placeholders keep 0 here and report the live deck average.
    pub ops_value: f64,
    pub side: Side,
    pub era: Era,
    pub types: Vec<String>,
    pub regions: Vec<String>,
    /// Copied from the catalog when the instance was created.
    pub removable: bool,
    pub placeholder: bool,
}

impl CardInstance {
    pub fn from_card(id: InstanceId, card: &Card) -> Self {
        Self {
            id,
            name: card.name.clone(),
            short_name: card.short_name.clone(),
            ops_value: card.ops_value,
            side: card.side,
            era: card.era,
            types: card.types.clone(),
            regions: card.regions.clone(),
            removable: card.removable,
            placeholder: false,
        }
    }

    pub fn placeholder(id: InstanceId) -> Self {
        Self {
            id,
            name: UNKNOWN_CARD_NAME.to_string(),
            short_name: String::new(),
            ops_value: 0.0,
            side: Side::Neutral,
            era: Era::Early,
            types: Vec::new(),
            regions: Vec::new(),
            removable: false,
            placeholder: true,
        }
    }

    /// Ops used for statistics and sorting. `deck_average` must be the
    /// current deck average; it is only read for placeholders.
    pub fn effective_ops(&self, deck_average: f64) -> f64 {
        if self.placeholder {
            deck_average
        } else {
            self.ops_value
        }
    }

    pub fn label(&self, short: bool) -> &str {
        if short && !self.short_name.is_empty() {
            &self.short_name
        } else {
            &self.name
        }
    }

    /// Whether the "move to discard" affordance shows at `loc`.
    pub fn can_discard(&self, loc: Location) -> bool {
        !self.placeholder && loc != Location::Discard
    }

    /// Whether the "move to removed" affordance shows at `loc`.
    pub fn can_remove(&self, loc: Location) -> bool {
        !self.placeholder && self.removable && loc != Location::Removed
    }
}

/// Ordering for sorted locations: side bucket (discard/removed only), then
/// ascending ops, then name.
pub fn compare_cards(a: &CardInstance, b: &CardInstance, by_side: bool, deck_average: f64) -> Ordering {
    let side = if by_side {
        a.side.sort_rank().cmp(&b.side.sort_rank())
    } else {
        Ordering::Equal
    };
    side.then_with(|| {
        a.effective_ops(deck_average)
            .total_cmp(&b.effective_ops(deck_average))
    })
    .then_with(|| a.name.cmp(&b.name))
}

#[derive(Debug, Clone, Default)]
pub struct Board {
    slots: [Vec<CardInstance>; 8],
    next_id: u64,
}

impl Board {
    pub fn cards(&self, loc: Location) -> &[CardInstance] {
        &self.slots[loc.index()]
    }

    pub fn len(&self, loc: Location) -> usize {
        self.slots[loc.index()].len()
    }

    pub fn total(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    /// Locations and positions of every card, in location order.
    pub fn iter(&self) -> impl Iterator<Item = (Location, &CardInstance)> {
        Location::ALL
            .into_iter()
            .flat_map(move |loc| self.cards(loc).iter().map(move |c| (loc, c)))
    }

    pub fn locate(&self, id: InstanceId) -> Option<(Location, usize)> {
        Location::ALL.into_iter().find_map(|loc| {
            self.cards(loc)
                .iter()
                .position(|c| c.id == id)
                .map(|pos| (loc, pos))
        })
    }

    pub fn get(&self, id: InstanceId) -> Option<&CardInstance> {
        self.locate(id).map(|(loc, pos)| &self.slots[loc.index()][pos])
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
    }

    pub fn mint_id(&mut self) -> InstanceId {
        self.next_id += 1;
        InstanceId(self.next_id)
    }

    /// Append without sorting. Callers finish with `sort` / `sort_all`.
    pub fn push(&mut self, loc: Location, card: CardInstance) {
        self.slots[loc.index()].push(card);
    }

    pub fn place_card(&mut self, loc: Location, card: &Card) -> InstanceId {
        let id = self.mint_id();
        self.push(loc, CardInstance::from_card(id, card));
        id
    }

    pub fn place_placeholder(&mut self, loc: Location) -> InstanceId {
        let id = self.mint_id();
        self.push(loc, CardInstance::placeholder(id));
        id
    }

    /// Remove a card from the board entirely.
    pub fn take(&mut self, id: InstanceId) -> Result<(Location, CardInstance)> {
        let (loc, pos) = self.locate(id).ok_or(TrackerError::UnknownInstance(id))?;
        Ok((loc, self.slots[loc.index()].remove(pos)))
    }

    /// Move one card and re-sort the destination when it is a sorted location.
    /// Returns the concrete destination.
    pub fn move_card(&mut self, id: InstanceId, target: MoveTarget) -> Result<Location> {
        let (_, card) = self.take(id)?;
        let dest = target.resolve(card.side);
        self.push(dest, card);
        if dest.is_sorted() {
            self.sort(dest);
        }
        Ok(dest)
    }

    /// Move a hand card to `new_index` within the same hand, clamped to the end.
    pub fn reorder(&mut self, id: InstanceId, new_index: usize) -> Result<()> {
        let (loc, pos) = self.locate(id).ok_or(TrackerError::UnknownInstance(id))?;
        if !loc.is_hand() {
            return Err(TrackerError::NotInHand(id));
        }
        let slot = &mut self.slots[loc.index()];
        let card = slot.remove(pos);
        let idx = new_index.min(slot.len());
        slot.insert(idx, card);
        Ok(())
    }

    /// Remove and return every card at `loc` matching `pred`, keeping order.
    pub fn drain_where<F>(&mut self, loc: Location, mut pred: F) -> Vec<CardInstance>
    where
        F: FnMut(&CardInstance) -> bool,
    {
        let slot = std::mem::take(&mut self.slots[loc.index()]);
        let (taken, kept): (Vec<_>, Vec<_>) = slot.into_iter().partition(|c| pred(c));
        self.slots[loc.index()] = kept;
        taken
    }

    /// Stable full re-sort of one location (hands included when asked).
    pub fn sort(&mut self, loc: Location) {
        let deck_average = stats::deck_average(self);
        let by_side = loc.sorts_by_side();
        self.slots[loc.index()].sort_by(|a, b| compare_cards(a, b, by_side, deck_average));
    }

    /// Re-sort every location that is kept sorted.
    pub fn sort_all(&mut self) {
        for loc in Location::ALL.into_iter().filter(|l| l.is_sorted()) {
            self.sort(loc);
        }
    }
}
