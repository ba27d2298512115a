//! Board routes: card moves, bulk operations, view options, undo.
//!
//! Every mutating handler answers with the re-rendered `#board`, or an inline
//! error span when the request was rejected (in which case nothing changed).

use tracing::debug;

use crate::error::Result;
use crate::game::board::InstanceId;
use crate::game::filter::parse_tag;
use crate::game::location::{HandLocation, MoveTarget};
use crate::game::render;
use crate::game::state::{with_session, with_session_mut};
use crate::game::stats;
use crate::routes::util::{error_span, get_flag, get_param, get_parsed, parse_form_body};

fn board_or_error<T>(result: Result<T>) -> String {
    match result {
        Ok(_) => with_session(render::render_board),
        Err(e) => error_span(&e.to_string()),
    }
}

fn id_param(params: &[(String, String)]) -> Result<InstanceId> {
    get_param(params, "id").unwrap_or("").parse()
}

// ── GET /api/board ─────────────────────────────────────────────────

pub fn handle_board_get(_query: &str) -> String {
    with_session(render::render_board)
}

// ── GET /api/stats ─────────────────────────────────────────────────

/// Per-location and deck-pool statistics as JSON.
pub fn handle_stats_get(_query: &str) -> String {
    with_session(|s| {
        serde_json::to_string(&stats::report(s.board())).unwrap_or_else(|_| "{}".to_string())
    })
}

// ── POST /api/card/move ────────────────────────────────────────────

/// Body: `id={instance}&to={location|deck}`.
pub fn handle_move_post(body: &str) -> String {
    let params = parse_form_body(body);
    board_or_error(id_param(&params).and_then(|id| {
        let target: MoveTarget = get_param(&params, "to").unwrap_or("").parse()?;
        with_session_mut(|s| s.move_card(id, target))
    }))
}

// ── POST /api/card/click ───────────────────────────────────────────

/// Body: `id={instance}`. Deck cards go to the selected hand, others to the deck.
pub fn handle_click_post(body: &str) -> String {
    let params = parse_form_body(body);
    board_or_error(id_param(&params).and_then(|id| with_session_mut(|s| s.click_card(id))))
}

// ── POST /api/card/reorder ─────────────────────────────────────────

/// Body: `id={instance}&index={n}`. Drag-reorder within a hand.
pub fn handle_reorder_post(body: &str) -> String {
    let params = parse_form_body(body);
    let Some(index) = get_parsed::<usize>(&params, "index") else {
        return error_span("missing index");
    };
    board_or_error(
        id_param(&params).and_then(|id| with_session_mut(|s| s.reorder_hand(id, index))),
    )
}

// ── POST /api/card/placeholder ─────────────────────────────────────

pub fn handle_placeholder_add_post(_body: &str) -> String {
    with_session_mut(|s| {
        s.add_placeholder();
        render::render_board(s)
    })
}

// ── POST /api/card/placeholder/remove ──────────────────────────────

pub fn handle_placeholder_remove_post(body: &str) -> String {
    let params = parse_form_body(body);
    board_or_error(id_param(&params).and_then(|id| with_session_mut(|s| s.remove_placeholder(id))))
}

// ── POST /api/bulk/* ───────────────────────────────────────────────

pub fn handle_discards_post(_body: &str) -> String {
    with_session_mut(|s| {
        s.cycle_discards();
        render::render_board(s)
    })
}

pub fn handle_mid_war_post(_body: &str) -> String {
    with_session_mut(|s| {
        s.release_mid_war();
        render::render_board(s)
    })
}

pub fn handle_late_war_post(_body: &str) -> String {
    with_session_mut(|s| {
        s.release_late_war();
        render::render_board(s)
    })
}

// ── POST /api/hand/select ──────────────────────────────────────────

/// Body: `hand=your-hand|opponent-hand`.
pub fn handle_select_hand_post(body: &str) -> String {
    let params = parse_form_body(body);
    let hand = get_param(&params, "hand").unwrap_or("").parse::<HandLocation>();
    board_or_error(hand.map(|hand| with_session_mut(|s| s.select_hand(hand))))
}

// ── POST /api/view/short-names ─────────────────────────────────────

pub fn handle_short_names_post(_body: &str) -> String {
    with_session_mut(|s| {
        s.toggle_short_names();
        render::render_board(s)
    })
}

// ── POST /api/view/filter ──────────────────────────────────────────

/// Body: `type={tag|none}&region={tag|none}`. Absent keys leave that filter as is.
pub fn handle_filter_post(body: &str) -> String {
    let params = parse_form_body(body);
    with_session_mut(|s| {
        if let Some(tag) = get_param(&params, "type") {
            s.set_type_filter(parse_tag(tag));
        }
        if let Some(tag) = get_param(&params, "region") {
            s.set_region_filter(parse_tag(tag));
        }
        render::render_board(s)
    })
}

// ── POST /api/undo ─────────────────────────────────────────────────

/// Body: `confirm=true` once the user has agreed to undo a bulk move.
/// A skipped undo still answers with the (unchanged) board.
pub fn handle_undo_post(body: &str) -> String {
    let params = parse_form_body(body);
    let confirmed = get_flag(&params, "confirm");
    with_session_mut(|s| {
        let outcome = s.undo(|_| confirmed);
        debug!(?outcome, "undo request");
        render::render_board(s)
    })
}
