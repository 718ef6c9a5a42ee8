//! Game service: resolves players and games through a [`GameStore`] and runs
//! the game rules on them.
//!
//! Every write of an existing game is version-checked, so two requests racing
//! on the same game cannot both land. The loser gets
//! [`StoreError::Conflict`] and may retry.

use tracing::{debug, info, instrument};

use crate::error::{ServiceError, StoreError};
use crate::game::{GameError, GameState, HistoryEntry, MoveOutcome, Player, Score};
use crate::ranking::{compute_rankings, RankRecord};
use crate::store::{GameId, GameStore};

/// What a move request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub outcome: MoveOutcome,
    /// The game after the move (unchanged for a full column).
    pub game: GameState,
}

pub struct GameService<S> {
    store: S,
    default_score_limit: Option<usize>,
}

impl<S: GameStore> GameService<S> {
    pub fn new(store: S) -> Self {
        GameService {
            store,
            default_score_limit: None,
        }
    }

    /// Limit applied by [`high_scores`](Self::high_scores) when the caller
    /// gives none.
    pub fn with_default_score_limit(mut self, limit: Option<usize>) -> Self {
        self.default_score_limit = limit;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a user. Names are trimmed and must be unique.
    #[instrument(skip(self, email))]
    pub fn create_user(&self, name: &str, email: &str) -> Result<Player, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidName(name.to_string()));
        }
        let player = Player::new(name, email.trim());
        self.store.create_player(player.clone())?;
        info!(user = name, "user created");
        Ok(player)
    }

    /// Start a game between two registered users. `player1` moves first.
    #[instrument(skip(self))]
    pub fn new_game(
        &self,
        player1: &str,
        player2: &str,
    ) -> Result<(GameId, GameState), ServiceError> {
        let p1 = self.resolve_player(player1)?;
        let p2 = self.resolve_player(player2)?;
        let game = GameState::new_game(&p1, &p2)?;
        let id = self.store.insert_game(game.clone())?;
        info!(%id, player1, player2, "game started");
        Ok((id, game))
    }

    pub fn get_game(&self, id: GameId) -> Result<GameState, ServiceError> {
        Ok(self.store.load_game(id)?.value)
    }

    /// Play `column` for `player`. A full column is reported in the outcome
    /// and writes nothing.
    ///
    /// The game is the only thing written. A finishing move's score lives on
    /// the saved game, so if the save fails nothing is recorded and the same
    /// move can be played again.
    #[instrument(skip(self))]
    pub fn make_move(
        &self,
        id: GameId,
        player: &str,
        column: usize,
    ) -> Result<MoveReport, ServiceError> {
        let stored = self.store.load_game(id)?;
        let mut game = stored.value;
        let outcome = game.make_move(player, column)?;

        if !outcome.applied() {
            debug!(%id, column, "column full");
            return Ok(MoveReport { outcome, game });
        }

        let version = self.store.save_game(id, &game, stored.version)?;
        debug!(%id, version, "move saved");

        if let Some(score) = outcome.score() {
            info!(%id, winner = ?score.winner, holes = score.holes_remaining, "game finished");
        }

        Ok(MoveReport { outcome, game })
    }

    /// A user's in-progress games.
    pub fn user_games(&self, name: &str) -> Result<Vec<(GameId, GameState)>, ServiceError> {
        self.store.load_player(name)?;
        Ok(self.store.list_active_games(name)?)
    }

    /// Cancel and delete an unfinished game on behalf of one of its players.
    #[instrument(skip(self))]
    pub fn cancel_game(&self, id: GameId, requested_by: &str) -> Result<(), ServiceError> {
        let stored = self.store.load_game(id)?;
        let mut game = stored.value;
        game.cancel(requested_by)?;
        self.store.delete_game(id, stored.version)?;
        info!(%id, requested_by, "game cancelled");
        Ok(())
    }

    /// Every move played so far, oldest first.
    pub fn game_history(&self, id: GameId) -> Result<Vec<HistoryEntry>, ServiceError> {
        let game = self.store.load_game(id)?.value;
        Ok(game.history().entries().to_vec())
    }

    /// Scores with the most holes left first. `None` falls back to the
    /// configured default limit, and with no default lists every score.
    pub fn high_scores(&self, limit: Option<usize>) -> Result<Vec<Score>, ServiceError> {
        if limit == Some(0) {
            return Err(ServiceError::InvalidLimit(0));
        }
        Ok(self.store.list_scores(limit.or(self.default_score_limit))?)
    }

    pub fn rankings(&self) -> Result<Vec<RankRecord>, ServiceError> {
        let games = self.store.list_all_completed_games()?;
        Ok(compute_rankings(&games))
    }

    /// Unknown names count as invalid players rather than a missing record.
    fn resolve_player(&self, name: &str) -> Result<Player, ServiceError> {
        match self.store.load_player(name) {
            Ok(player) => Ok(player),
            Err(StoreError::PlayerNotFound(_)) => Err(GameError::InvalidPlayers.into()),
            Err(e) => Err(e.into()),
        }
    }
}
