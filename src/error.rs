//! Error type shared by the catalog, board, and persistence layers.

use thiserror::Error;

use crate::game::board::InstanceId;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("error loading cards: {0}")]
    CatalogParse(String),
    #[error("card catalog has not been loaded")]
    CatalogMissing,
    #[error("no card with id {0}")]
    UnknownInstance(InstanceId),
    #[error("invalid card id: {0}")]
    InvalidId(String),
    #[error("unknown location: {0}")]
    UnknownLocation(String),
    #[error("card {0} is not an unknown card")]
    NotPlaceholder(InstanceId),
    #[error("card {0} is not in a hand")]
    NotInHand(InstanceId),
    #[error("invalid file format: {0}")]
    ImportRejected(String),
    #[error("saved game {id} could not be read: {reason}")]
    CorruptRecord { id: String, reason: String },
    #[error("game not found: {0}")]
    GameNotFound(String),
    #[error("no game selected")]
    NoCurrentGame,
    #[error("deletion of {0} was not confirmed")]
    NotConfirmed(String),
    #[error("serialize error: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for TrackerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
