//! Derived statistics. Nothing here is stored: every call recomputes from the
//! board, so placeholder cards always reflect the current deck average.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::game::board::{Board, CardInstance};
use crate::game::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Stats {
    pub count: usize,
    pub sum: f64,
    pub average: f64,
}

impl Stats {
    fn from_parts(count: usize, sum: f64) -> Self {
        let average = if count == 0 { 0.0 } else { sum / count as f64 };
        Self {
            count,
            sum,
            average,
        }
    }

    /// Header text: `(avg: 2.5)`, or empty for an empty location.
    pub fn avg_label(&self) -> String {
        if self.count == 0 {
            String::new()
        } else {
            format!("(avg: {:.1})", self.average)
        }
    }
}

/// Average ops of the real cards across the three deck subsections. This is
/// the value every placeholder card stands for.
pub fn deck_average(board: &Board) -> f64 {
    let (count, sum) = Location::DECK
        .iter()
        .flat_map(|&loc| board.cards(loc))
        .filter(|c| !c.placeholder)
        .fold((0usize, 0.0f64), |(n, s), c| (n + 1, s + c.ops_value));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

fn summarize<'a>(cards: impl Iterator<Item = &'a CardInstance>, deck_avg: f64) -> Stats {
    let (count, sum) = cards.fold((0usize, 0.0f64), |(n, s), c| {
        (n + 1, s + c.effective_ops(deck_avg))
    });
    Stats::from_parts(count, sum)
}

pub fn location_stats(board: &Board, loc: Location) -> Stats {
    summarize(board.cards(loc).iter(), deck_average(board))
}

/// The three deck subsections as one pool.
pub fn deck_stats(board: &Board) -> Stats {
    let avg = deck_average(board);
    summarize(Location::DECK.iter().flat_map(|&loc| board.cards(loc)), avg)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub locations: BTreeMap<Location, Stats>,
    pub deck: Stats,
    pub deck_average: f64,
}

pub fn report(board: &Board) -> StatsReport {
    StatsReport {
        locations: Location::ALL
            .into_iter()
            .map(|loc| (loc, location_stats(board, loc)))
            .collect(),
        deck: deck_stats(board),
        deck_average: deck_average(board),
    }
}
