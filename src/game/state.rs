//! Global session container.
//!
//! Uses `thread_local!` + `RefCell` for safe mutable access in single-threaded
//! WASM. The Web Worker keeps the WASM module alive, so the session persists
//! across `handle_request` calls for the lifetime of the page.

use std::cell::RefCell;

use crate::config::TrackerConfig;
use crate::game::session::Session;
use crate::store;

thread_local! {
    static SESSION: RefCell<Session> = RefCell::new(Session::default());
}

/// Execute a closure with read access to the session.
pub fn with_session<F, R>(f: F) -> R
where
    F: FnOnce(&Session) -> R,
{
    SESSION.with(|s| f(&s.borrow()))
}

/// Execute a closure with mutable access to the session.
pub fn with_session_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut Session) -> R,
{
    SESSION.with(|s| f(&mut s.borrow_mut()))
}

/// Replace the entire session (tests, and a full reset from the page).
pub fn replace_session(new_session: Session) {
    SESSION.with(|s| {
        *s.borrow_mut() = new_session;
    });
}

/// Apply a configuration document posted by the page shell.
pub fn configure_json(json: &str) -> Result<(), String> {
    let config = TrackerConfig::from_json(json)?;
    with_session_mut(|s| s.set_config(config));
    Ok(())
}

/// Seed the store mirror from a `localStorage` dump. Returns the entry count.
/// When the catalog is already loaded the stored current game is resumed.
pub fn hydrate_store_json(json: &str) -> Result<usize, String> {
    let entries = store::parse_dump(json)?;
    let n = entries.len();
    with_session_mut(|s| {
        s.store_mut().hydrate(entries);
        if s.catalog().is_some() {
            s.boot().map_err(|e| e.to_string())?;
        }
        Ok(n)
    })
}

/// Drain pending store writes as a JSON array of ops.
pub fn flush_store_json() -> String {
    with_session_mut(|s| {
        let ops = s.store_mut().drain_pending();
        serde_json::to_string(&ops).unwrap_or_else(|_| "[]".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_empty() {
        replace_session(Session::default());
        with_session(|s| {
            assert!(s.catalog().is_none());
            assert_eq!(s.board().total(), 0);
            assert_eq!(s.current_game(), None);
        });
    }

    #[test]
    fn hydrate_then_flush_roundtrip() {
        replace_session(Session::default());
        let n = hydrate_store_json(r#"{"cardCounter_currentGame":"game_1"}"#).unwrap();
        assert_eq!(n, 1);
        // Hydration mirrors existing storage and queues nothing.
        assert_eq!(flush_store_json(), "[]");
        with_session(|s| assert!(s.catalog().is_none()));
        replace_session(Session::default());
    }

    #[test]
    fn hydrate_invalid_json_returns_error() {
        assert!(hydrate_store_json("not valid json {{{").is_err());
    }

    #[test]
    fn configure_changes_storage_prefix() {
        replace_session(Session::default());
        configure_json(r#"{"storagePrefix":"tt_"}"#).unwrap();
        with_session(|s| assert_eq!(s.config().games_key(), "tt_games"));
        replace_session(Session::default());
    }
}
