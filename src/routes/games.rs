//! `/api/games/*` routes for the saved-games library.
//!
//! Selector-level handlers answer with the re-rendered `#games` fragment; the
//! page re-fetches `/api/board` afterwards since switching games replaces the
//! whole layout.

use crate::catalog::Side;
use crate::game::render;
use crate::game::session::Session;
use crate::game::state::with_session_mut;
use crate::routes::util::{error_span, get_flag, get_param, parse_form_body};

fn games_fragment(s: &mut Session) -> String {
    let games = s.games();
    render::render_games(s, &games)
}

// ── GET /api/games ─────────────────────────────────────────────────

pub fn handle_list_get(_query: &str) -> String {
    with_session_mut(games_fragment)
}

// ── POST /api/games/select ─────────────────────────────────────────

/// Body: `id={game id}`.
pub fn handle_select_post(body: &str) -> String {
    let params = parse_form_body(body);
    let id = get_param(&params, "id").unwrap_or("");
    if id.is_empty() {
        return error_span("Missing game id");
    }
    with_session_mut(|s| match s.load_game(id) {
        Ok(()) => games_fragment(s),
        Err(e) => error_span(&e.to_string()),
    })
}

// ── POST /api/games/create ─────────────────────────────────────────

/// Body: `opponent={name}&side={us|ussr}&external_id={id}`. All optional.
pub fn handle_create_post(body: &str) -> String {
    let params = parse_form_body(body);
    let opponent = get_param(&params, "opponent").unwrap_or("");
    let side = get_param(&params, "side").and_then(Side::parse_player);
    let external_id = get_param(&params, "external_id").unwrap_or("");
    with_session_mut(|s| match s.create_game(opponent, side, external_id) {
        Ok(_) => games_fragment(s),
        Err(e) => error_span(&e.to_string()),
    })
}

// ── POST /api/games/delete ─────────────────────────────────────────

/// Body: `id={game id}&confirm=true`. Without the confirmation nothing is
/// deleted.
pub fn handle_delete_post(body: &str) -> String {
    let params = parse_form_body(body);
    let id = get_param(&params, "id").unwrap_or("");
    let confirmed = get_flag(&params, "confirm");
    with_session_mut(|s| match s.delete_game(id, confirmed) {
        Ok(()) => games_fragment(s),
        Err(e) => error_span(&e.to_string()),
    })
}

// ── POST /api/games/details ────────────────────────────────────────

/// Body: `title={display name}&notes={text}`.
pub fn handle_details_post(body: &str) -> String {
    let params = parse_form_body(body);
    let title = get_param(&params, "title").unwrap_or("");
    let notes = get_param(&params, "notes").unwrap_or("");
    with_session_mut(|s| match s.set_details(title, notes) {
        Ok(()) => games_fragment(s),
        Err(e) => error_span(&e.to_string()),
    })
}

// ── GET /api/games/export ──────────────────────────────────────────

/// Pretty JSON of the current game, for the page to offer as a download.
pub fn handle_export_get(_query: &str) -> String {
    with_session_mut(|s| match s.export_current_game() {
        Ok(json) => json,
        Err(e) => error_span(&e.to_string()),
    })
}

// ── POST /api/games/import ─────────────────────────────────────────

/// Body: the raw JSON text of an exported game.
pub fn handle_import_post(body: &str) -> String {
    with_session_mut(|s| match s.import_game(body) {
        Ok(_) => games_fragment(s),
        Err(e) => error_span(&e.to_string()),
    })
}
