//! Persistence port for games and players, plus two adapters.
//!
//! Stored games carry a version number. Writers pass the version they
//! loaded; a store refuses the write with [`StoreError::Conflict`] if
//! someone else got there first.

mod file;
mod memory;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::game::{GameState, Player, Score};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Opaque key of a stored game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    pub fn new() -> Self {
        GameId(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(GameId)
    }
}

/// A stored value and the version it was stored at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// Storage the game service reads from and writes to.
pub trait GameStore: Send + Sync {
    /// Register a new player. Names are unique.
    fn create_player(&self, player: Player) -> Result<(), StoreError>;

    fn load_player(&self, name: &str) -> Result<Player, StoreError>;

    /// Store a brand-new game at version 1.
    fn insert_game(&self, game: GameState) -> Result<GameId, StoreError>;

    fn load_game(&self, id: GameId) -> Result<Versioned<GameState>, StoreError>;

    /// Overwrite a game if it is still at `expected_version`. Returns the new
    /// version.
    fn save_game(
        &self,
        id: GameId,
        game: &GameState,
        expected_version: u64,
    ) -> Result<u64, StoreError>;

    /// Remove a game if it is still at `expected_version`.
    fn delete_game(&self, id: GameId, expected_version: u64) -> Result<(), StoreError>;

    /// In-progress games the player takes part in.
    fn list_active_games(&self, player: &str) -> Result<Vec<(GameId, GameState)>, StoreError>;

    /// Every won or drawn game.
    fn list_all_completed_games(&self) -> Result<Vec<GameState>, StoreError>;

    /// Scores of completed games ordered by `holes_remaining`, highest first.
    /// Equal scores keep the order the games are listed in.
    ///
    /// Scores are read off the stored games, so a finished game and its score
    /// are always written together.
    fn list_scores(&self, limit: Option<usize>) -> Result<Vec<Score>, StoreError> {
        let scores = self
            .list_all_completed_games()?
            .iter()
            .filter_map(GameState::score)
            .collect();
        Ok(rank_scores(scores, limit))
    }
}

/// Orders scores for [`GameStore::list_scores`].
fn rank_scores(mut scores: Vec<Score>, limit: Option<usize>) -> Vec<Score> {
    scores.sort_by(|a, b| b.holes_remaining.cmp(&a.holes_remaining));
    if let Some(limit) = limit {
        scores.truncate(limit);
    }
    scores
}

fn check_version(id: GameId, expected: u64, actual: u64) -> Result<(), StoreError> {
    if expected != actual {
        return Err(StoreError::Conflict {
            id,
            expected,
            actual,
        });
    }
    Ok(())
}
