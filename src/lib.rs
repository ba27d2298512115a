//! Card counter in-browser WASM server.
//!
//! Exports `handle_request(method, path, query, body)` for the Web Worker
//! bridge to call. Uses `matchit` for URL routing, the same router engine
//! that powers Axum.
//!
//! The page shell forwards UI events (clicks, drops, form changes) as
//! requests and swaps the returned HTML fragments into the DOM. Durable
//! storage stays on the main thread; see [`store`] for the hydrate/flush
//! bridge.

use wasm_bindgen::prelude::*;

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod routes;
pub mod store;

/// Process an HTTP-like request and return an HTML (or JSON) fragment.
///
/// Called from JavaScript (Web Worker) via wasm-bindgen.
///
/// # Arguments
/// * `method`: HTTP method (e.g., "GET", "POST")
/// * `path`: URL path (e.g., "/api/card/move")
/// * `query`: query string, may be empty
/// * `body`: request body (form data or JSON). Empty string for GET requests.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    // Build the router. matchit compiles route patterns into a radix tree.
    let mut router = matchit::Router::new();

    // Startup and storage bridge
    router.insert("/api/config", "config").ok();
    router.insert("/api/catalog", "catalog").ok();
    router.insert("/api/store/hydrate", "store_hydrate").ok();
    router.insert("/api/store/flush", "store_flush").ok();

    // Board
    router.insert("/api/board", "board").ok();
    router.insert("/api/stats", "stats").ok();
    router.insert("/api/card/move", "card_move").ok();
    router.insert("/api/card/click", "card_click").ok();
    router.insert("/api/card/reorder", "card_reorder").ok();
    router.insert("/api/card/placeholder", "placeholder_add").ok();
    router.insert("/api/card/placeholder/remove", "placeholder_remove").ok();
    router.insert("/api/bulk/discards", "bulk_discards").ok();
    router.insert("/api/bulk/mid-war", "bulk_mid_war").ok();
    router.insert("/api/bulk/late-war", "bulk_late_war").ok();
    router.insert("/api/hand/select", "hand_select").ok();
    router.insert("/api/view/short-names", "view_short_names").ok();
    router.insert("/api/view/filter", "view_filter").ok();
    router.insert("/api/undo", "undo").ok();

    // Saved games
    router.insert("/api/games", "games").ok();
    router.insert("/api/games/select", "games_select").ok();
    router.insert("/api/games/create", "games_create").ok();
    router.insert("/api/games/delete", "games_delete").ok();
    router.insert("/api/games/details", "games_details").ok();
    router.insert("/api/games/export", "games_export").ok();
    router.insert("/api/games/import", "games_import").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            ("config", "POST") => routes::store::handle_config_post(body),
            ("catalog", "POST") => routes::store::handle_catalog_post(body),
            ("store_hydrate", "POST") => routes::store::handle_hydrate_post(body),
            ("store_flush", "GET") => routes::store::handle_flush_get(query),

            ("board", "GET") => routes::board::handle_board_get(query),
            ("stats", "GET") => routes::board::handle_stats_get(query),
            ("card_move", "POST") => routes::board::handle_move_post(body),
            ("card_click", "POST") => routes::board::handle_click_post(body),
            ("card_reorder", "POST") => routes::board::handle_reorder_post(body),
            ("placeholder_add", "POST") => routes::board::handle_placeholder_add_post(body),
            ("placeholder_remove", "POST") => routes::board::handle_placeholder_remove_post(body),
            ("bulk_discards", "POST") => routes::board::handle_discards_post(body),
            ("bulk_mid_war", "POST") => routes::board::handle_mid_war_post(body),
            ("bulk_late_war", "POST") => routes::board::handle_late_war_post(body),
            ("hand_select", "POST") => routes::board::handle_select_hand_post(body),
            ("view_short_names", "POST") => routes::board::handle_short_names_post(body),
            ("view_filter", "POST") => routes::board::handle_filter_post(body),
            ("undo", "POST") => routes::board::handle_undo_post(body),

            ("games", "GET") => routes::games::handle_list_get(query),
            ("games_select", "POST") => routes::games::handle_select_post(body),
            ("games_create", "POST") => routes::games::handle_create_post(body),
            ("games_delete", "POST") => routes::games::handle_delete_post(body),
            ("games_details", "POST") => routes::games::handle_details_post(body),
            ("games_export", "GET") => routes::games::handle_export_get(query),
            ("games_import", "POST") => routes::games::handle_import_post(body),

            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

fn not_found() -> String {
    r#"<span class="text-red">404 — route not found</span>"#.to_string()
}

fn method_not_allowed() -> String {
    r#"<span class="text-red">405 — method not allowed</span>"#.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::session::Session;
    use crate::game::state::{replace_session, with_session};

    const CATALOG: &str = r#"[
        {"name":"Duck and Cover","opsValue":3,"side":"US","era":"early","types":[],"regions":[],"removable":false},
        {"name":"Fidel","opsValue":2,"side":"USSR","era":"early","types":[],"regions":[],"removable":true},
        {"name":"Brush War","opsValue":3,"side":"Neutral","era":"mid","types":[],"regions":[],"removable":false}
    ]"#;

    fn boot() {
        replace_session(Session::default());
        handle_request("POST", "/api/catalog", "", CATALOG);
    }

    fn id_of(name: &str) -> String {
        with_session(|s| {
            s.board()
                .iter()
                .find(|(_, c)| c.name == name)
                .map(|(_, c)| c.id.to_string())
                .unwrap()
        })
    }

    #[test]
    fn returns_404_for_unknown_route() {
        let html = handle_request("GET", "/api/nonexistent", "", "");
        assert!(html.contains("404"));
    }

    #[test]
    fn returns_405_for_wrong_method() {
        let html = handle_request("GET", "/api/card/move", "", "");
        assert!(html.contains("405"));
    }

    #[test]
    fn catalog_boot_renders_board() {
        replace_session(Session::default());
        let html = handle_request("POST", "/api/catalog", "", CATALOG);
        assert!(html.contains(r#"<div id="board">"#));
        assert!(html.contains("3 - Duck and Cover"));
        replace_session(Session::default());
    }

    #[test]
    fn bad_catalog_renders_error() {
        replace_session(Session::default());
        let html = handle_request("POST", "/api/catalog", "", "oops");
        assert!(html.contains("text-red"));
        assert!(html.contains("error loading cards"));
        replace_session(Session::default());
    }

    #[test]
    fn move_and_undo_via_routes() {
        boot();
        let fidel = id_of("Fidel");
        let html = handle_request("POST", "/api/card/move", "", &format!("id={}&to=discard", fidel));
        assert!(html.contains(r#"<div class="cards" id="discard"><div class="card ussr""#));

        let html = handle_request("POST", "/api/undo", "", "");
        assert!(html.contains(r#"<div class="cards" id="discard"></div>"#));
        replace_session(Session::default());
    }

    #[test]
    fn move_rejects_bad_params() {
        boot();
        let html = handle_request("POST", "/api/card/move", "", "id=abc&to=discard");
        assert!(html.contains("invalid card id"));
        let fidel = id_of("Fidel");
        let html = handle_request("POST", "/api/card/move", "", &format!("id={}&to=moon", fidel));
        assert!(html.contains("unknown location"));
        with_session(|s| assert_eq!(s.undo_len(), 0));
        replace_session(Session::default());
    }

    #[test]
    fn reorder_requires_an_index() {
        boot();
        let fidel = id_of("Fidel");
        handle_request("POST", "/api/card/click", "", &format!("id={}", fidel));
        let before = with_session(|s| s.undo_len());
        let fidel = id_of("Fidel");
        for body in [format!("id={}", fidel), format!("id={}&index=last", fidel)] {
            let html = handle_request("POST", "/api/card/reorder", "", &body);
            assert!(html.contains("missing index"));
        }
        with_session(|s| assert_eq!(s.undo_len(), before));
        replace_session(Session::default());
    }

    #[test]
    fn bulk_undo_needs_confirmation() {
        boot();
        handle_request("POST", "/api/bulk/mid-war", "", "");
        with_session(|s| assert!(s.mid_war().is_released()));

        handle_request("POST", "/api/undo", "", "");
        with_session(|s| assert!(s.mid_war().is_released()));

        handle_request("POST", "/api/undo", "", "confirm=true");
        with_session(|s| assert!(!s.mid_war().is_released()));
        replace_session(Session::default());
    }

    #[test]
    fn stats_route_returns_json() {
        boot();
        let json = handle_request("GET", "/api/stats", "", "");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["deck"]["count"], 2);
        assert_eq!(value["deckAverage"], 2.5);
        assert_eq!(value["locations"]["box"]["count"], 1);
        replace_session(Session::default());
    }

    #[test]
    fn game_lifecycle_and_flush() {
        boot();
        handle_request("GET", "/api/store/flush", "", "");

        let html = handle_request("POST", "/api/games/create", "", "opponent=Zed&side=ussr");
        assert!(html.contains("vs Zed as USSR"));

        let ops = handle_request("GET", "/api/store/flush", "", "");
        assert!(ops.contains(r#""op":"set""#));
        assert!(ops.contains("cardCounter_currentGame"));

        let exported = handle_request("GET", "/api/games/export", "", "");
        assert!(exported.contains("\"exportedAt\""));

        let html = handle_request("POST", "/api/games/import", "", &exported);
        assert_eq!(html.matches("vs Zed as USSR").count(), 3);

        let html = handle_request("POST", "/api/games/import", "", "{\"bad\":true}");
        assert!(html.contains("invalid file format"));
        replace_session(Session::default());
    }

    #[test]
    fn delete_without_confirm_keeps_game() {
        boot();
        handle_request("POST", "/api/games/create", "", "opponent=Yan");
        let id = with_session(|s| s.current_game().map(str::to_string)).unwrap();
        let html = handle_request("POST", "/api/games/delete", "", &format!("id={}", id));
        assert!(html.contains("not confirmed"));
        let html = handle_request("POST", "/api/games/delete", "", &format!("id={}&confirm=true", id));
        assert!(!html.contains("vs Yan"));
        replace_session(Session::default());
    }

    #[test]
    fn hydrate_then_catalog_resumes_game() {
        replace_session(Session::default());
        let dump = serde_json::json!({
            "cardCounter_games": r#"[{"id":"game_7","displayName":"Stored"}]"#,
            "cardCounter_game_game_7": r#"{"id":"game_7","displayName":"Stored","midWarAdded":true,"cardPositions":{"discard":[{"name":"Fidel","opsValue":2,"side":"ussr","removable":true,"era":"early","isUnknown":false}]}}"#,
            "cardCounter_currentGame": "game_7"
        })
        .to_string();
        handle_request("POST", "/api/store/hydrate", "", &dump);
        let html = handle_request("POST", "/api/catalog", "", CATALOG);
        assert!(html.contains("2 - Fidel"));
        assert!(!html.contains("Duck and Cover"));
        with_session(|s| {
            assert_eq!(s.current_game(), Some("game_7"));
            assert!(s.mid_war().is_released());
        });
        let games = handle_request("GET", "/api/games", "", "");
        assert!(games.contains(r#"<option value="game_7" selected>Stored</option>"#));
        replace_session(Session::default());
    }
}
