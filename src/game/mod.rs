//! Card tracking state: the board of card instances, derived statistics,
//! undo snapshots, and persisted games. State lives in WASM memory
//! (thread_local) for the lifetime of the Web Worker.

pub mod board;
pub mod filter;
pub mod location;
pub mod persistence;
pub mod render;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod undo;
