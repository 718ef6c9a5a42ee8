use std::path::PathBuf;

use crate::game::{GameError, StateViolation};
use crate::store::GameId;

/// Errors raised by a [`GameStore`](crate::store::GameStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a user with the name {0} already exists")]
    PlayerExists(String),

    #[error("no user exists with the name {0}")]
    PlayerNotFound(String),

    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("game {id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict { id: GameId, expected: u64, actual: u64 },

    #[error("stored game {path} is inconsistent: {source}")]
    Corrupt {
        path: PathBuf,
        source: StateViolation,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by [`GameService`](crate::service::GameService).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid user name {0:?}")]
    InvalidName(String),

    #[error("quantity of scores must be a positive integer, got {0}")]
    InvalidLimit(usize),
}

impl ServiceError {
    /// True if the request lost a race with another write and may be retried.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Store(StoreError::Conflict { .. }))
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
