//! Undo history: a bounded ring of before/after snapshots.
//!
//! Entries are pushed before a mutation runs and stamped with the resulting
//! state afterwards; only `before` is used to restore. Undo is debounced so a
//! doubled key event cannot pop two entries, and restoring never records a
//! new entry (there is no redo).

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::game::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    MoveCard,
    ReorderHand,
    AddPlaceholder,
    RemovePlaceholder,
    CycleDiscards,
    ReleaseMidWar,
    ReleaseLateWar,
}

impl ActionKind {
    /// Bulk moves ask for confirmation before they are undone.
    pub fn is_bulk(self) -> bool {
        matches!(
            self,
            ActionKind::CycleDiscards | ActionKind::ReleaseMidWar | ActionKind::ReleaseLateWar
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionKind::MoveCard => "move card",
            ActionKind::ReorderHand => "reorder hand",
            ActionKind::AddPlaceholder => "add unknown card",
            ActionKind::RemovePlaceholder => "remove unknown card",
            ActionKind::CycleDiscards => "add discards",
            ActionKind::ReleaseMidWar => "add mid war",
            ActionKind::ReleaseLateWar => "add late war",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub kind: ActionKind,
    pub timestamp: DateTime<Utc>,
    pub before: Snapshot,
    pub after: Option<Snapshot>,
    /// Free-form description, e.g. "Duck and Cover -> discard".
    pub detail: String,
}

/// Result of an undo request. Only `Restored` changed anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    Restored(ActionKind),
    Empty,
    Debounced,
    Declined(ActionKind),
}

impl UndoOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UndoOutcome::Restored(_))
    }
}

#[derive(Debug, Clone)]
pub struct UndoHistory {
    entries: VecDeque<UndoEntry>,
    capacity: usize,
    debounce_ms: i64,
    last_undo: Option<DateTime<Utc>>,
    suppressed: bool,
}

impl UndoHistory {
    pub fn new(capacity: usize, debounce_ms: i64) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            debounce_ms,
            last_undo: None,
            suppressed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&UndoEntry> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_undo = None;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Disable recording while a restore is running.
    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    /// Push an entry for a mutation about to run. Returns false, recording
    /// nothing, while suppressed.
    pub fn record(&mut self, kind: ActionKind, before: Snapshot, detail: String, now: DateTime<Utc>) -> bool {
        if self.suppressed || self.capacity == 0 {
            return false;
        }
        self.entries.push_back(UndoEntry {
            kind,
            timestamp: now,
            before,
            after: None,
            detail,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    /// Stamp the newest entry with the post-mutation state.
    pub fn finalize(&mut self, after: Snapshot) {
        if let Some(entry) = self.entries.back_mut() {
            entry.after = Some(after);
        }
    }

    /// Drop the newest entry when its mutation failed its precondition.
    pub fn discard_latest(&mut self) {
        self.entries.pop_back();
    }

    /// Pop the newest entry for restoring, or report why nothing happened.
    /// `confirm` is consulted for bulk entries; a rejected entry is pushed back.
    pub fn pop_for_undo<F>(&mut self, now: DateTime<Utc>, confirm: F) -> Result<UndoEntry, UndoOutcome>
    where
        F: FnOnce(&UndoEntry) -> bool,
    {
        if self.entries.is_empty() {
            return Err(UndoOutcome::Empty);
        }
        if let Some(last) = self.last_undo {
            if (now - last).num_milliseconds() < self.debounce_ms {
                return Err(UndoOutcome::Debounced);
            }
        }
        let Some(entry) = self.entries.pop_back() else {
            return Err(UndoOutcome::Empty);
        };
        if entry.kind.is_bulk() && !confirm(&entry) {
            let kind = entry.kind;
            self.entries.push_back(entry);
            return Err(UndoOutcome::Declined(kind));
        }
        self.last_undo = Some(now);
        Ok(entry)
    }
}
