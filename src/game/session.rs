//! Tracking session: the explicit context every operation runs against.
//!
//! Holds the catalog, the board, one-shot war flags, the selected hand, view
//! options, the undo history, and the store bridge. Every mutation follows the
//! same protocol:
//!
//! 1. validate its preconditions (failure changes nothing),
//! 2. push an undo entry holding the pre-mutation snapshot,
//! 3. mutate the board,
//! 4. stamp the entry with the post-mutation snapshot,
//! 5. auto-save when a game is selected and no load or undo is in progress.
//!
//! Statistics and highlighting are derived on demand, so there is nothing to
//! refresh between steps.

use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Era, Side};
use crate::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::game::board::{Board, CardInstance, InstanceId};
use crate::game::filter::{FilterState, matches_filter};
use crate::game::location::{HandLocation, Location, MoveTarget};
use crate::game::persistence::{self, ExportedGame, GameIndexEntry, GameRecord, Library};
use crate::game::snapshot::{self, ReleaseState, Snapshot};
use crate::game::stats::{self, Stats};
use crate::game::undo::{ActionKind, UndoEntry, UndoHistory, UndoOutcome};
use crate::store::{KvStore, MemoryStore};

/// Editable details of the current game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameDetails {
    pub display_name: String,
    pub notes: String,
    pub player_side: Option<Side>,
}

pub struct Session {
    config: TrackerConfig,
    catalog: Option<Catalog>,
    catalog_error: Option<String>,
    board: Board,
    selected_hand: HandLocation,
    mid_war: ReleaseState,
    late_war: ReleaseState,
    filter: FilterState,
    short_names: bool,
    undo: UndoHistory,
    store: Box<dyn KvStore>,
    clock: Box<dyn Clock>,
    current_game: Option<String>,
    details: GameDetails,
    loading: bool,
    restoring: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::with_config(TrackerConfig::default())
    }
}

impl Session {
    pub fn new(config: TrackerConfig, store: Box<dyn KvStore>, clock: Box<dyn Clock>) -> Self {
        let undo = UndoHistory::new(config.undo_capacity, config.undo_debounce_ms);
        Self {
            config,
            catalog: None,
            catalog_error: None,
            board: Board::default(),
            selected_hand: HandLocation::default(),
            mid_war: ReleaseState::NotReleased,
            late_war: ReleaseState::NotReleased,
            filter: FilterState::default(),
            short_names: false,
            undo,
            store,
            clock,
            current_game: None,
            details: GameDetails::default(),
            loading: false,
            restoring: false,
        }
    }

    /// In-memory store and wall clock with the given configuration.
    pub fn with_config(config: TrackerConfig) -> Self {
        Self::new(config, Box::new(MemoryStore::new()), Box::new(SystemClock))
    }

    /// Replace the configuration. Resets the undo history.
    pub fn set_config(&mut self, config: TrackerConfig) {
        self.undo = UndoHistory::new(config.undo_capacity, config.undo_debounce_ms);
        self.config = config;
    }

    // ── Read access ────────────────────────────────────────────────

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn catalog_error(&self) -> Option<&str> {
        self.catalog_error.as_deref()
    }

    pub fn selected_hand(&self) -> HandLocation {
        self.selected_hand
    }

    pub fn mid_war(&self) -> ReleaseState {
        self.mid_war
    }

    pub fn late_war(&self) -> ReleaseState {
        self.late_war
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn short_names(&self) -> bool {
        self.short_names
    }

    pub fn current_game(&self) -> Option<&str> {
        self.current_game.as_deref()
    }

    pub fn details(&self) -> &GameDetails {
        &self.details
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn latest_undo(&self) -> Option<&UndoEntry> {
        self.undo.latest()
    }

    pub fn location_stats(&self, loc: Location) -> Stats {
        stats::location_stats(&self.board, loc)
    }

    pub fn deck_stats(&self) -> Stats {
        stats::deck_stats(&self.board)
    }

    pub fn is_highlighted(&self, card: &CardInstance) -> bool {
        matches_filter(card, &self.filter)
    }

    pub fn games(&mut self) -> Vec<GameIndexEntry> {
        self.library().index()
    }

    pub fn store_mut(&mut self) -> &mut dyn KvStore {
        self.store.as_mut()
    }

    fn library(&mut self) -> Library<'_> {
        Library::new(self.store.as_mut(), &self.config)
    }

    // ── Startup ────────────────────────────────────────────────────

    /// Install the catalog feed and show the starting layout. A malformed feed
    /// leaves the board empty and records an error for the renderer.
    pub fn load_catalog(&mut self, json: &str) -> Result<usize> {
        let catalog = match Catalog::from_json(json) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, "card catalog failed to load");
                self.catalog_error = Some(e.to_string());
                return Err(e);
            }
        };
        let n = catalog.len();
        info!(cards = n, "card catalog loaded");
        self.catalog = Some(catalog);
        self.catalog_error = None;
        self.boot()?;
        Ok(n)
    }

    /// Resume the last selected game, or lay out the catalog defaults with no
    /// game selected.
    pub fn boot(&mut self) -> Result<()> {
        let current = self.library().current_id();
        match current {
            Some(id) if self.library().contains(&id) => match self.load_game(&id) {
                Ok(()) => Ok(()),
                Err(e) => {
                    // Keep the pointer and the stored record so nothing is overwritten.
                    warn!(game = %id, error = %e, "current game could not be loaded");
                    self.current_game = None;
                    self.populate_defaults()
                }
            },
            Some(id) => {
                warn!(game = %id, "current game is not in the index; starting fresh");
                self.library().set_current_id(None);
                self.current_game = None;
                self.populate_defaults()
            }
            None => {
                self.current_game = None;
                self.populate_defaults()
            }
        }
    }

    /// Early-war cards into their deck subsection, mid and late into the box.
    fn populate_defaults(&mut self) -> Result<()> {
        let catalog = self.catalog.as_ref().ok_or(TrackerError::CatalogMissing)?;
        self.board.clear();
        for card in catalog.cards() {
            let loc = match card.era {
                Era::Early => Location::deck_for(card.side),
                Era::Mid | Era::Late => Location::Box,
            };
            self.board.place_card(loc, card);
        }
        self.board.sort_all();
        self.mid_war = ReleaseState::NotReleased;
        self.late_war = ReleaseState::NotReleased;
        self.selected_hand = HandLocation::default();
        Ok(())
    }

    // ── Snapshots ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            positions: snapshot::capture_positions(&self.board),
            selected_hand: self.selected_hand,
            mid_war: self.mid_war,
            late_war: self.late_war,
        }
    }

    fn apply_snapshot(&mut self, snap: &Snapshot) {
        let empty = Catalog::default();
        let catalog = self.catalog.as_ref().unwrap_or(&empty);
        snapshot::restore_positions(&mut self.board, &snap.positions, catalog);
        self.selected_hand = snap.selected_hand;
        self.mid_war = snap.mid_war;
        self.late_war = snap.late_war;
    }

    fn begin(&mut self, kind: ActionKind, detail: String) -> bool {
        if self.undo.is_suppressed() {
            return false;
        }
        let before = self.snapshot();
        let now = self.clock.now();
        self.undo.record(kind, before, detail, now)
    }

    fn commit(&mut self, recorded: bool) {
        // Placeholder ops follow the deck average, so sorted locations drift.
        self.board.sort_all();
        if recorded {
            let after = self.snapshot();
            self.undo.finalize(after);
        }
        self.auto_save();
    }

    fn card(&self, id: InstanceId) -> Result<&CardInstance> {
        self.board.get(id).ok_or(TrackerError::UnknownInstance(id))
    }

    // ── Mutations ──────────────────────────────────────────────────

    /// Move one card. `MoveTarget::Deck` routes by the card's side.
    pub fn move_card(&mut self, id: InstanceId, target: MoveTarget) -> Result<Location> {
        let card = self.card(id)?;
        let dest = target.resolve(card.side);
        let detail = format!("{} -> {}", card.name, dest);
        let recorded = self.begin(ActionKind::MoveCard, detail);
        let dest = match self.board.move_card(id, target) {
            Ok(dest) => dest,
            Err(e) => {
                if recorded {
                    self.undo.discard_latest();
                }
                return Err(e);
            }
        };
        self.commit(recorded);
        Ok(dest)
    }

    /// Click on a card: out of the deck into the selected hand, from anywhere
    /// else back into the deck.
    pub fn click_card(&mut self, id: InstanceId) -> Result<Location> {
        let (loc, _) = self.board.locate(id).ok_or(TrackerError::UnknownInstance(id))?;
        let target = if loc.is_deck() {
            MoveTarget::At(self.selected_hand.location())
        } else {
            MoveTarget::Deck
        };
        self.move_card(id, target)
    }

    pub fn reorder_hand(&mut self, id: InstanceId, new_index: usize) -> Result<()> {
        let (loc, _) = self.board.locate(id).ok_or(TrackerError::UnknownInstance(id))?;
        if !loc.is_hand() {
            return Err(TrackerError::NotInHand(id));
        }
        let detail = format!("{} -> {}[{}]", self.card(id)?.name, loc, new_index);
        let recorded = self.begin(ActionKind::ReorderHand, detail);
        if let Err(e) = self.board.reorder(id, new_index) {
            if recorded {
                self.undo.discard_latest();
            }
            return Err(e);
        }
        self.commit(recorded);
        Ok(())
    }

    /// Add an unknown card to the opponent's hand.
    pub fn add_placeholder(&mut self) -> InstanceId {
        let recorded = self.begin(ActionKind::AddPlaceholder, String::new());
        let id = self.board.place_placeholder(Location::OpponentHand);
        self.board.sort(Location::OpponentHand);
        self.commit(recorded);
        id
    }

    /// Delete an unknown card outright.
    pub fn remove_placeholder(&mut self, id: InstanceId) -> Result<()> {
        if !self.card(id)?.placeholder {
            return Err(TrackerError::NotPlaceholder(id));
        }
        let recorded = self.begin(ActionKind::RemovePlaceholder, id.to_string());
        self.board.take(id)?;
        self.commit(recorded);
        Ok(())
    }

    /// Deck into the opponent's hand, then discards back into the deck.
    /// Returns how many cards moved.
    pub fn cycle_discards(&mut self) -> usize {
        let recorded = self.begin(ActionKind::CycleDiscards, String::new());
        let mut moved = 0;
        for loc in Location::DECK {
            for card in self.board.drain_where(loc, |_| true) {
                self.board.push(Location::OpponentHand, card);
                moved += 1;
            }
        }
        self.board.sort(Location::OpponentHand);
        for card in self.board.drain_where(Location::Discard, |_| true) {
            self.board.push(Location::deck_for(card.side), card);
            moved += 1;
        }
        debug!(moved, "discards cycled into the deck");
        self.commit(recorded);
        moved
    }

    pub fn release_mid_war(&mut self) -> usize {
        self.release_era(Era::Mid)
    }

    pub fn release_late_war(&mut self) -> usize {
        self.release_era(Era::Late)
    }

    /// Box cards of `era` into their deck subsection. One-shot per game; a
    /// repeated release is a no-op that records nothing.
    fn release_era(&mut self, era: Era) -> usize {
        let (state, kind) = match era {
            Era::Mid => (self.mid_war, ActionKind::ReleaseMidWar),
            Era::Late => (self.late_war, ActionKind::ReleaseLateWar),
            Era::Early => return 0,
        };
        if state.is_released() {
            debug!(era = era.as_str(), "war cards already released");
            return 0;
        }
        let recorded = self.begin(kind, String::new());
        let cards = self.board.drain_where(Location::Box, |c| c.era == era);
        let moved = cards.len();
        for card in cards {
            self.board.push(Location::deck_for(card.side), card);
        }
        match era {
            Era::Mid => self.mid_war = ReleaseState::Released,
            _ => self.late_war = ReleaseState::Released,
        }
        self.commit(recorded);
        moved
    }

    pub fn select_hand(&mut self, hand: HandLocation) {
        self.selected_hand = hand;
    }

    pub fn toggle_short_names(&mut self) -> bool {
        self.short_names = !self.short_names;
        self.short_names
    }

    pub fn set_type_filter(&mut self, tag: Option<String>) {
        self.filter.type_tag = tag;
    }

    pub fn set_region_filter(&mut self, tag: Option<String>) {
        self.filter.region_tag = tag;
    }

    // ── Undo ───────────────────────────────────────────────────────

    /// Undo the latest mutation. `confirm` is asked before undoing a bulk
    /// operation. The restore itself records no entry and saves only once it
    /// has fully settled.
    pub fn undo<F>(&mut self, confirm: F) -> UndoOutcome
    where
        F: FnOnce(&UndoEntry) -> bool,
    {
        let now = self.clock.now();
        let entry = match self.undo.pop_for_undo(now, confirm) {
            Ok(entry) => entry,
            Err(outcome) => {
                debug!(?outcome, "undo skipped");
                return outcome;
            }
        };
        self.restoring = true;
        self.undo.set_suppressed(true);
        self.apply_snapshot(&entry.before);
        self.undo.set_suppressed(false);
        self.restoring = false;
        debug!(action = entry.kind.label(), "undo restored snapshot");
        self.auto_save();
        UndoOutcome::Restored(entry.kind)
    }

    // ── Persistence ────────────────────────────────────────────────

    fn auto_save(&mut self) {
        if self.loading || self.restoring || self.current_game.is_none() {
            return;
        }
        if let Err(e) = self.save_current_game() {
            warn!(error = %e, "auto-save failed");
        }
    }

    fn current_record(&self, id: &str) -> GameRecord {
        GameRecord {
            id: id.to_string(),
            display_name: self.details.display_name.clone(),
            notes: self.details.notes.clone(),
            player_side: self.details.player_side,
            mid_war_added: self.mid_war.is_released(),
            late_war_added: self.late_war.is_released(),
            selected_hand_location: self.selected_hand,
            card_positions: Some(snapshot::capture_positions(&self.board)),
            last_modified: Some(self.clock.now().to_rfc3339()),
        }
    }

    /// Write the current game. Returns false when no game is selected.
    pub fn save_current_game(&mut self) -> Result<bool> {
        let Some(id) = self.current_game.clone() else {
            return Ok(false);
        };
        let record = self.current_record(&id);
        self.library().write_record(&record)?;
        debug!(game = %id, "game saved");
        Ok(true)
    }

    fn mint_game_id(&mut self) -> String {
        let mut millis = self.clock.now().timestamp_millis();
        loop {
            let id = format!("game_{}", millis);
            let lib = self.library();
            if !lib.contains(&id) && !lib.has_record(&id) {
                return id;
            }
            millis += 1;
        }
    }

    /// Create a game from the new-game form and switch to it.
    pub fn create_game(&mut self, opponent: &str, side: Option<Side>, external_id: &str) -> Result<String> {
        if self.catalog.is_none() {
            return Err(TrackerError::CatalogMissing);
        }
        let display_name = persistence::display_name_for(opponent, side, external_id);
        let id = self.mint_game_id();
        if self.current_game.is_some() {
            self.save_current_game()?;
        }

        let mut games = self.library().index();
        games.push(GameIndexEntry {
            id: id.clone(),
            display_name: display_name.clone(),
        });
        self.library().write_index(&games)?;

        self.loading = true;
        self.undo.clear();
        self.library().set_current_id(Some(&id));
        self.current_game = Some(id.clone());
        self.details = GameDetails {
            display_name,
            notes: String::new(),
            player_side: side,
        };
        let populated = self.populate_defaults();
        self.loading = false;
        populated?;
        self.save_current_game()?;
        info!(game = %id, "game created");
        Ok(id)
    }

    /// Switch to a stored game, saving the outgoing one first. An unreadable
    /// record fails before anything changes.
    pub fn load_game(&mut self, id: &str) -> Result<()> {
        let record = self.library().record(id)?;
        if record.is_none() && !self.library().contains(id) {
            return Err(TrackerError::GameNotFound(id.to_string()));
        }
        if let Some(current) = self.current_game.clone() {
            if current != id {
                self.save_current_game()?;
            }
        }

        self.loading = true;
        self.undo.clear();
        self.library().set_current_id(Some(id));
        self.current_game = Some(id.to_string());

        let listed_name = self
            .library()
            .index()
            .into_iter()
            .find(|g| g.id == id)
            .map(|g| g.display_name);
        let record = record.unwrap_or_default();
        self.details = GameDetails {
            display_name: if record.display_name.is_empty() {
                listed_name.unwrap_or_default()
            } else {
                record.display_name.clone()
            },
            notes: record.notes.clone(),
            player_side: record.player_side,
        };

        let fresh = match &record.card_positions {
            Some(positions) => {
                let empty = Catalog::default();
                let catalog = self.catalog.as_ref().unwrap_or(&empty);
                snapshot::restore_positions(&mut self.board, positions, catalog);
                self.selected_hand = record.selected_hand_location;
                self.mid_war = record.mid_war_added.into();
                self.late_war = record.late_war_added.into();
                false
            }
            None => true,
        };
        let populated = if fresh { self.populate_defaults() } else { Ok(()) };
        self.loading = false;
        populated?;
        if fresh {
            self.save_current_game()?;
        }
        info!(game = %id, fresh, "game loaded");
        Ok(())
    }

    /// Delete a stored game. The caller must pass the user's confirmation.
    pub fn delete_game(&mut self, id: &str, confirmed: bool) -> Result<()> {
        let mut games = self.library().index();
        let Some(pos) = games.iter().position(|g| g.id == id) else {
            return Err(TrackerError::GameNotFound(id.to_string()));
        };
        if !confirmed {
            return Err(TrackerError::NotConfirmed(games[pos].display_name.clone()));
        }
        games.remove(pos);
        let mut lib = self.library();
        lib.write_index(&games)?;
        lib.remove_record(id);
        self.undo.clear();
        if self.current_game.as_deref() == Some(id) {
            self.library().set_current_id(None);
            self.current_game = None;
            self.details = GameDetails::default();
            self.board.clear();
        }
        info!(game = %id, "game deleted");
        Ok(())
    }

    /// Update the title and notes of the current game. Ignored while loading.
    pub fn set_details(&mut self, display_name: &str, notes: &str) -> Result<()> {
        if self.loading {
            return Ok(());
        }
        let Some(id) = self.current_game.clone() else {
            return Err(TrackerError::NoCurrentGame);
        };
        self.details.display_name = display_name.to_string();
        self.details.notes = notes.to_string();
        self.library().rename(&id, display_name)?;
        self.save_current_game()?;
        Ok(())
    }

    /// Pretty JSON export of the current game, saved first.
    pub fn export_current_game(&mut self) -> Result<String> {
        let id = self.current_game.clone().ok_or(TrackerError::NoCurrentGame)?;
        self.save_current_game()?;
        let record = self
            .library()
            .record(&id)?
            .ok_or_else(|| TrackerError::GameNotFound(id.clone()))?;
        let exported = ExportedGame {
            record,
            exported_at: self.clock.now().to_rfc3339(),
        };
        Ok(serde_json::to_string_pretty(&exported)?)
    }

    /// Store an exported game under a freshly minted id and switch to it.
    pub fn import_game(&mut self, json: &str) -> Result<String> {
        let mut record = match persistence::parse_import(json) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "import rejected");
                return Err(e);
            }
        };
        let id = self.mint_game_id();
        record.id = id.clone();
        record.last_modified = Some(self.clock.now().to_rfc3339());

        self.library().write_record(&record)?;
        let mut games = self.library().index();
        games.push(GameIndexEntry {
            id: id.clone(),
            display_name: record.display_name.clone(),
        });
        self.library().write_index(&games)?;
        self.load_game(&id)?;
        info!(game = %id, "game imported");
        Ok(id)
    }
}
