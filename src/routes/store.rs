//! Startup and storage bridge routes.
//!
//! Startup order from the page shell:
//!
//! ```text
//! POST /api/config         (optional) tracker configuration JSON
//! POST /api/store/hydrate  localStorage dump { key: value, ... }
//! POST /api/catalog        card catalog JSON → boots and returns #board
//! ```
//!
//! After every request the shell calls `GET /api/store/flush` and applies the
//! returned ops to `localStorage`.

use tracing::warn;

use crate::game::render;
use crate::game::state::{self, with_session, with_session_mut};
use crate::routes::util::error_span;

// ── POST /api/config ───────────────────────────────────────────────

pub fn handle_config_post(body: &str) -> String {
    match state::configure_json(body) {
        Ok(()) => r#"<span class="text-green">Configuration applied.</span>"#.to_string(),
        Err(e) => error_span(&e),
    }
}

// ── POST /api/store/hydrate ────────────────────────────────────────

pub fn handle_hydrate_post(body: &str) -> String {
    match state::hydrate_store_json(body) {
        Ok(n) => format!(r#"<span class="text-green">{} stored entries loaded.</span>"#, n),
        Err(e) => {
            warn!(error = %e, "store hydration failed");
            error_span(&e)
        }
    }
}

// ── GET /api/store/flush ───────────────────────────────────────────

/// JSON array of pending `{op, key, value?}` writes.
pub fn handle_flush_get(_query: &str) -> String {
    state::flush_store_json()
}

// ── POST /api/catalog ──────────────────────────────────────────────

/// Body: the card catalog JSON. A malformed catalog renders the inline error
/// state instead of a board.
pub fn handle_catalog_post(body: &str) -> String {
    with_session_mut(|s| {
        if let Err(e) = s.load_catalog(body) {
            warn!(error = %e, "startup failed");
        }
    });
    with_session(render::render_board)
}
