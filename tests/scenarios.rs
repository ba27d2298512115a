//! End-to-end walks through a tracking session using the public API.

use card_counter::catalog::Side;
use card_counter::clock::ManualClock;
use card_counter::config::TrackerConfig;
use card_counter::game::board::InstanceId;
use card_counter::game::location::{HandLocation, Location, MoveTarget};
use card_counter::game::session::Session;
use card_counter::game::stats::Stats;
use card_counter::game::undo::UndoOutcome;
use card_counter::store::{KvStore, MemoryStore, StoreOp};
use pretty_assertions::assert_eq;

const TWO_CARDS: &str = r#"[
    {"name":"Duck and Cover","opsValue":3,"side":"US","era":"early","types":[],"regions":[],"removable":false},
    {"name":"Asia Scoring","opsValue":3,"side":"Neutral","era":"early","types":["scoring"],"regions":["Asia"],"removable":false},
    {"name":"Arms Race","opsValue":1,"side":"Neutral","era":"mid","types":[],"regions":[],"removable":false}
]"#;

fn session_with(catalog: &str) -> (Session, ManualClock) {
    let clock = ManualClock::new(1_600_000_000_000);
    let mut session = Session::new(
        TrackerConfig::default(),
        Box::new(MemoryStore::new()),
        Box::new(clock.clone()),
    );
    session.load_catalog(catalog).unwrap();
    (session, clock)
}

fn id_of(session: &Session, name: &str) -> InstanceId {
    session
        .board()
        .iter()
        .find(|(_, c)| c.name == name)
        .map(|(_, c)| c.id)
        .unwrap()
}

fn names(session: &Session, loc: Location) -> Vec<&str> {
    session
        .board()
        .cards(loc)
        .iter()
        .map(|c| c.name.as_str())
        .collect()
}

fn stats(count: usize, sum: f64, average: f64) -> Stats {
    Stats {
        count,
        sum,
        average,
    }
}

#[test]
fn initial_layout_and_deck_stats() {
    let (session, _) = session_with(TWO_CARDS);
    assert_eq!(names(&session, Location::DeckUs), vec!["Duck and Cover"]);
    assert_eq!(names(&session, Location::DeckNeutral), vec!["Asia Scoring"]);
    assert_eq!(session.deck_stats(), stats(2, 6.0, 3.0));
    assert_eq!(session.location_stats(Location::Discard), stats(0, 0.0, 0.0));
}

#[test]
fn moving_to_hand_updates_both_stats() {
    let (mut session, _) = session_with(TWO_CARDS);
    let dc = id_of(&session, "Duck and Cover");
    session.move_card(dc, Location::YourHand.into()).unwrap();
    assert_eq!(session.location_stats(Location::YourHand), stats(1, 3.0, 3.0));
    assert_eq!(session.deck_stats(), stats(1, 3.0, 3.0));
}

#[test]
fn placeholder_tracks_live_deck_average() {
    let (mut session, _) = session_with(TWO_CARDS);
    session.add_placeholder();
    assert_eq!(session.location_stats(Location::OpponentHand), stats(1, 3.0, 3.0));

    let arms_race = id_of(&session, "Arms Race");
    session.move_card(arms_race, MoveTarget::Deck).unwrap();
    let expected = 7.0 / 3.0;
    let opp = session.location_stats(Location::OpponentHand);
    assert!((opp.sum - expected).abs() < 1e-9);
    assert!((session.deck_stats().average - expected).abs() < 1e-9);
}

#[test]
fn every_card_lives_in_exactly_one_location() {
    let (mut session, clock) = session_with(TWO_CARDS);
    let dc = id_of(&session, "Duck and Cover");
    session.move_card(dc, Location::Discard.into()).unwrap();
    session.add_placeholder();
    session.cycle_discards();
    session.release_mid_war();
    clock.advance_ms(500);
    session.undo(|_| true);

    let mut ids: Vec<InstanceId> = session.board().iter().map(|(_, c)| c.id).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
    for id in ids {
        assert!(session.board().locate(id).is_some());
    }
}

#[test]
fn bounded_history_exhausts() {
    let (mut session, clock) = session_with(TWO_CARDS);
    for _ in 0..25 {
        session.add_placeholder();
    }
    let mut results = Vec::new();
    for _ in 0..21 {
        clock.advance_ms(100);
        results.push(session.undo(|_| true));
    }
    assert!(results[..20].iter().all(UndoOutcome::is_success));
    assert_eq!(results[20], UndoOutcome::Empty);
    // The five oldest placeholders predate the history and stay.
    assert_eq!(session.board().len(Location::OpponentHand), 5);
}

#[test]
fn undo_is_rate_limited_by_clock() {
    let (mut session, clock) = session_with(TWO_CARDS);
    session.add_placeholder();
    session.add_placeholder();
    assert!(session.undo(|_| true).is_success());
    clock.advance_ms(99);
    assert_eq!(session.undo(|_| true), UndoOutcome::Debounced);
    assert_eq!(session.board().len(Location::OpponentHand), 1);
    clock.advance_ms(1);
    assert!(session.undo(|_| true).is_success());
    assert_eq!(session.board().len(Location::OpponentHand), 0);
}

#[test]
fn mid_war_release_is_one_shot_across_reload() {
    let (mut session, _) = session_with(TWO_CARDS);
    let id = session.create_game("Boris", Some(Side::Us), "").unwrap();
    assert_eq!(session.release_mid_war(), 1);
    assert_eq!(names(&session, Location::DeckNeutral), vec!["Arms Race", "Asia Scoring"]);
    assert_eq!(session.release_mid_war(), 0);

    session.create_game("Other", None, "").unwrap();
    session.load_game(&id).unwrap();
    assert!(session.mid_war().is_released());
    assert_eq!(session.release_mid_war(), 0);
    assert!(session.board().cards(Location::Box).is_empty());
}

#[test]
fn undo_restores_selected_hand_and_flags() {
    let (mut session, clock) = session_with(TWO_CARDS);
    session.select_hand(HandLocation::OpponentHand);
    let asia = id_of(&session, "Asia Scoring");
    session.click_card(asia).unwrap();
    assert_eq!(names(&session, Location::OpponentHand), vec!["Asia Scoring"]);

    session.release_mid_war();
    session.select_hand(HandLocation::YourHand);
    clock.advance_ms(200);
    assert!(session.undo(|_| true).is_success());
    assert!(!session.mid_war().is_released());
    assert_eq!(session.selected_hand(), HandLocation::OpponentHand);
}

#[test]
fn store_sees_one_write_per_mutation() {
    let (mut session, _) = session_with(TWO_CARDS);
    let id = session.create_game("", None, "").unwrap();
    session.store_mut().drain_pending();

    session.add_placeholder();
    let ops = session.store_mut().drain_pending();
    assert_eq!(ops.len(), 1);
    match &ops[0] {
        StoreOp::Set { key, value } => {
            assert_eq!(key, &format!("cardCounter_game_{}", id));
            assert!(value.contains("\"isUnknown\":true"));
            assert!(value.contains("\"lastModified\""));
        }
        other => panic!("unexpected op {:?}", other),
    }
}
