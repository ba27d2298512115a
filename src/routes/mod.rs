pub mod board;
pub mod games;
pub mod store;
pub mod util;
