use serde::{Deserialize, Serialize};

use super::board::{Board, Colour, DropError, CELLS, COLS};
use super::history::HistoryLog;
use super::player::{Player, Turn};
use super::win;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won(String),
    Draw,
    Cancelled,
}

/// Rejected game operations. Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("a game needs two distinct, registered players")]
    InvalidPlayers,

    #[error("column must be a number between 1 and 7, got {0}")]
    InvalidColumn(usize),

    #[error("{0} is not part of this game")]
    NotAParticipant(String),

    #[error("it's not your turn, it's {expected}'s")]
    NotYourTurn { expected: String },

    #[error("illegal action: game is already over")]
    GameOver,

    #[error("this game has ended and cannot be cancelled")]
    CannotCancelFinished,
}

/// Final record of a won or drawn game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// `None` for a draw.
    pub winner: Option<String>,
    pub player1: String,
    pub player2: String,
    pub holes_remaining: usize,
}

/// Result of an accepted `make_move` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Token placed, game continues with `next` to move.
    Placed { row: usize, next: String },
    /// The column had no room. Nothing changed and the same player is still to move.
    ColumnFull { column: usize },
    Won { winner: String, score: Score },
    Draw { score: Score },
}

impl MoveOutcome {
    /// True if the move changed the game.
    pub fn applied(&self) -> bool {
        !matches!(self, MoveOutcome::ColumnFull { .. })
    }

    pub fn score(&self) -> Option<&Score> {
        match self {
            MoveOutcome::Won { score, .. } | MoveOutcome::Draw { score } => Some(score),
            _ => None,
        }
    }
}

/// A stored game that breaks one of the state invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateViolation {
    #[error("a token is floating above an empty cell")]
    Gravity,

    #[error("holes_remaining is {holes} but {tokens} tokens are on the board")]
    HolesMismatch { holes: usize, tokens: usize },

    #[error("history has {entries} entries but {tokens} tokens are on the board")]
    HistoryMismatch { entries: usize, tokens: usize },

    #[error("token counts do not alternate (red {red}, yellow {yellow})")]
    ColourCount { red: usize, yellow: usize },

    #[error("turn does not match the number of moves played")]
    TurnParity,

    #[error("status {0:?} does not match the board")]
    StatusMismatch(GameStatus),

    #[error("both seats are held by {0}")]
    SamePlayer(String),
}

/// One game of Connect Four between two named players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    player1: String,
    player2: String,
    turn: Turn,
    holes_remaining: usize,
    status: GameStatus,
    history: HistoryLog,
}

impl GameState {
    /// Start a game. Player1 plays Red and always moves first.
    pub fn new_game(player1: &Player, player2: &Player) -> Result<Self, GameError> {
        if player1.name.is_empty() || player2.name.is_empty() || player1.name == player2.name {
            return Err(GameError::InvalidPlayers);
        }

        Ok(GameState {
            board: Board::new(),
            player1: player1.name.clone(),
            player2: player2.name.clone(),
            turn: Turn::Player1ToMove,
            holes_remaining: CELLS,
            status: GameStatus::InProgress,
            history: HistoryLog::new(),
        })
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player1(&self) -> &str {
        &self.player1
    }

    pub fn player2(&self) -> &str {
        &self.player2
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// Name of the player to move. Still answers after the game ends: for a
    /// won game it is the winner, who made the last move.
    pub fn whose_turn(&self) -> &str {
        match self.turn {
            Turn::Player1ToMove => &self.player1,
            Turn::Player2ToMove => &self.player2,
        }
    }

    pub fn holes_remaining(&self) -> usize {
        self.holes_remaining
    }

    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.status != GameStatus::InProgress
    }

    pub fn is_participant(&self, name: &str) -> bool {
        self.player1 == name || self.player2 == name
    }

    /// Token colour of a participant.
    pub fn colour_of(&self, name: &str) -> Option<Colour> {
        if name == self.player1 {
            Some(Colour::Red)
        } else if name == self.player2 {
            Some(Colour::Yellow)
        } else {
            None
        }
    }

    /// The game's score, once it has been won or drawn.
    pub fn score(&self) -> Option<Score> {
        match &self.status {
            GameStatus::Won(winner) => Some(self.score_for(Some(winner.clone()))),
            GameStatus::Draw => Some(self.score_for(None)),
            GameStatus::InProgress | GameStatus::Cancelled => None,
        }
    }

    /// Apply a move for `player` in the 1-based `column`.
    ///
    /// Checks run in a fixed order: game over, column range, participation,
    /// turn. A full column is not an error; it comes back as
    /// [`MoveOutcome::ColumnFull`] with the game untouched.
    pub fn make_move(&mut self, player: &str, column: usize) -> Result<MoveOutcome, GameError> {
        if self.is_terminal() {
            return Err(GameError::GameOver);
        }
        if !(1..=COLS).contains(&column) {
            return Err(GameError::InvalidColumn(column));
        }
        let colour = self
            .colour_of(player)
            .ok_or_else(|| GameError::NotAParticipant(player.to_string()))?;
        if self.whose_turn() != player {
            return Err(GameError::NotYourTurn {
                expected: self.whose_turn().to_string(),
            });
        }

        let row = match self.board.drop_piece(column, colour) {
            Ok(row) => row,
            Err(DropError::ColumnFull) => return Ok(MoveOutcome::ColumnFull { column }),
            Err(DropError::InvalidColumn) => return Err(GameError::InvalidColumn(column)),
        };

        self.holes_remaining -= 1;
        self.history.append(player, column, row, self.board);

        if win::is_won(&self.board, column, row) {
            self.status = GameStatus::Won(player.to_string());
            return Ok(MoveOutcome::Won {
                winner: player.to_string(),
                score: self.score_for(Some(player.to_string())),
            });
        }

        if self.holes_remaining == 0 {
            self.status = GameStatus::Draw;
            return Ok(MoveOutcome::Draw {
                score: self.score_for(None),
            });
        }

        self.turn = self.turn.other();
        Ok(MoveOutcome::Placed {
            row,
            next: self.whose_turn().to_string(),
        })
    }

    /// Cancel an unfinished game on behalf of one of its players.
    pub fn cancel(&mut self, requested_by: &str) -> Result<(), GameError> {
        if !self.is_participant(requested_by) {
            return Err(GameError::NotAParticipant(requested_by.to_string()));
        }
        if self.is_terminal() {
            return Err(GameError::CannotCancelFinished);
        }
        self.status = GameStatus::Cancelled;
        Ok(())
    }

    /// Check the state invariants of a game that came from outside, such as
    /// a file on disk.
    pub fn verify(&self) -> Result<(), StateViolation> {
        if self.player1 == self.player2 {
            return Err(StateViolation::SamePlayer(self.player1.clone()));
        }
        if !self.board.obeys_gravity() {
            return Err(StateViolation::Gravity);
        }

        let tokens = self.board.tokens_placed();
        if self.holes_remaining + tokens != CELLS {
            return Err(StateViolation::HolesMismatch {
                holes: self.holes_remaining,
                tokens,
            });
        }
        if self.history.len() != tokens {
            return Err(StateViolation::HistoryMismatch {
                entries: self.history.len(),
                tokens,
            });
        }

        let red = self.board.count(Colour::Red);
        let yellow = self.board.count(Colour::Yellow);
        if red != yellow && red != yellow + 1 {
            return Err(StateViolation::ColourCount { red, yellow });
        }

        let winner = win::find_winner(&self.board);
        match &self.status {
            GameStatus::InProgress | GameStatus::Cancelled => {
                let expected = if red == yellow {
                    Turn::Player1ToMove
                } else {
                    Turn::Player2ToMove
                };
                if self.turn != expected {
                    return Err(StateViolation::TurnParity);
                }
                if winner.is_some() || self.holes_remaining == 0 {
                    return Err(StateViolation::StatusMismatch(self.status.clone()));
                }
            }
            GameStatus::Won(name) => {
                if winner.is_none() || winner != self.colour_of(name) || self.whose_turn() != name {
                    return Err(StateViolation::StatusMismatch(self.status.clone()));
                }
            }
            GameStatus::Draw => {
                if winner.is_some() || self.holes_remaining != 0 {
                    return Err(StateViolation::StatusMismatch(self.status.clone()));
                }
            }
        }

        Ok(())
    }

    fn score_for(&self, winner: Option<String>) -> Score {
        Score {
            winner,
            player1: self.player1.clone(),
            player2: self.player2.clone(),
            holes_remaining: self.holes_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testing::{drawing_sequence, play};
    use crate::game::{Cell, ROWS};

    fn alice() -> Player {
        Player::new("alice", "alice@example.com")
    }

    fn bob() -> Player {
        Player::new("bob", "bob@example.com")
    }

    fn new_game() -> GameState {
        GameState::new_game(&alice(), &bob()).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = new_game();
        assert_eq!(state.whose_turn(), "alice");
        assert_eq!(state.turn(), Turn::Player1ToMove);
        assert_eq!(state.status(), &GameStatus::InProgress);
        assert_eq!(state.holes_remaining(), CELLS);
        assert!(state.history().is_empty());
        assert_eq!(state.colour_of("alice"), Some(Colour::Red));
        assert_eq!(state.colour_of("bob"), Some(Colour::Yellow));
        assert!(state.verify().is_ok());
    }

    #[test]
    fn test_new_game_rejects_same_player() {
        assert_eq!(
            GameState::new_game(&alice(), &alice()),
            Err(GameError::InvalidPlayers)
        );
        assert_eq!(
            GameState::new_game(&alice(), &Player::new("", "")),
            Err(GameError::InvalidPlayers)
        );
    }

    #[test]
    fn test_apply_move() {
        let mut state = new_game();
        let outcome = state.make_move("alice", 4).unwrap();

        assert_eq!(
            outcome,
            MoveOutcome::Placed {
                row: 1,
                next: "bob".to_string()
            }
        );
        assert_eq!(state.board().cell_at(4, 1), Cell::Red);
        assert_eq!(state.whose_turn(), "bob");
        assert_eq!(state.holes_remaining(), CELLS - 1);
        assert_eq!(state.history().len(), 1);

        let before = state.clone();
        assert_eq!(
            state.make_move("alice", 4),
            Err(GameError::NotYourTurn {
                expected: "bob".to_string()
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_validation_order() {
        let mut state = new_game();
        // Column is checked before participation and turn.
        assert_eq!(state.make_move("carol", 9), Err(GameError::InvalidColumn(9)));
        assert_eq!(state.make_move("bob", 0), Err(GameError::InvalidColumn(0)));
        assert_eq!(
            state.make_move("carol", 1),
            Err(GameError::NotAParticipant("carol".to_string()))
        );
        assert_eq!(
            state.make_move("bob", 1),
            Err(GameError::NotYourTurn {
                expected: "alice".to_string()
            })
        );
        assert_eq!(state, new_game());
    }

    #[test]
    fn test_column_full_is_not_recorded() {
        let mut state = new_game();
        play(&mut state, &[1, 1, 1, 1, 1, 1]);
        let before = state.clone();

        let outcome = state.make_move("alice", 1).unwrap();
        assert_eq!(outcome, MoveOutcome::ColumnFull { column: 1 });
        assert!(!outcome.applied());
        assert_eq!(state, before);
        assert_eq!(state.whose_turn(), "alice");
        assert_eq!(state.history().len(), ROWS);
    }

    #[test]
    fn test_win_detection() {
        let mut state = new_game();

        // alice wins with a horizontal line, bob stacks on top
        let outcome = play(&mut state, &[1, 1, 2, 2, 3, 3, 4]);

        let score = Score {
            winner: Some("alice".to_string()),
            player1: "alice".to_string(),
            player2: "bob".to_string(),
            holes_remaining: CELLS - 7,
        };
        assert_eq!(
            outcome,
            MoveOutcome::Won {
                winner: "alice".to_string(),
                score: score.clone()
            }
        );
        assert!(state.is_terminal());
        assert_eq!(state.status(), &GameStatus::Won("alice".to_string()));
        assert_eq!(state.score(), Some(score));
        assert_eq!(state.whose_turn(), "alice");
        assert!(state.verify().is_ok());
    }

    #[test]
    fn test_moves_after_win_are_rejected() {
        let mut state = new_game();
        play(&mut state, &[1, 1, 2, 2, 3, 3, 4]);
        assert_eq!(state.make_move("bob", 5), Err(GameError::GameOver));
        // Game over wins over every other check.
        assert_eq!(state.make_move("carol", 42), Err(GameError::GameOver));
    }

    #[test]
    fn test_draw() {
        let mut state = new_game();
        let moves = drawing_sequence();
        assert_eq!(moves.len(), CELLS);

        let outcome = play(&mut state, &moves);

        assert_eq!(
            outcome,
            MoveOutcome::Draw {
                score: Score {
                    winner: None,
                    player1: "alice".to_string(),
                    player2: "bob".to_string(),
                    holes_remaining: 0,
                }
            }
        );
        assert_eq!(state.status(), &GameStatus::Draw);
        assert_eq!(state.history().len(), CELLS);
        assert!(state.board().is_full());
        assert!(state.verify().is_ok());
        assert_eq!(state.make_move("alice", 1), Err(GameError::GameOver));
    }

    #[test]
    fn test_history_tracks_moves() {
        let mut state = new_game();
        play(&mut state, &[4, 5, 4]);
        let entries = state.history().entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].player, "alice");
        assert_eq!(entries[1].player, "bob");
        assert_eq!((entries[2].column, entries[2].row), (4, 2));
        assert_eq!(entries[2].board_after, *state.board());
        assert_eq!(entries[0].board_after.tokens_placed(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut state = new_game();
        state.make_move("alice", 3).unwrap();
        assert_eq!(
            state.cancel("carol"),
            Err(GameError::NotAParticipant("carol".to_string()))
        );
        state.cancel("bob").unwrap();
        assert_eq!(state.status(), &GameStatus::Cancelled);
        assert_eq!(state.make_move("bob", 3), Err(GameError::GameOver));
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_cancel_finished_game_is_rejected() {
        let mut won = new_game();
        play(&mut won, &[1, 1, 2, 2, 3, 3, 4]);
        assert_eq!(won.cancel("alice"), Err(GameError::CannotCancelFinished));

        let mut drawn = new_game();
        play(&mut drawn, &drawing_sequence());
        assert_eq!(drawn.cancel("bob"), Err(GameError::CannotCancelFinished));
    }

    #[test]
    fn test_verify_detects_tampering() {
        let mut state = new_game();
        play(&mut state, &[4, 4]);
        state.holes_remaining = CELLS;
        assert!(matches!(
            state.verify(),
            Err(StateViolation::HolesMismatch { .. })
        ));

        let mut state = new_game();
        play(&mut state, &[4]);
        state.turn = Turn::Player1ToMove;
        assert_eq!(state.verify(), Err(StateViolation::TurnParity));

        let mut state = new_game();
        play(&mut state, &[4]);
        state.status = GameStatus::Won("alice".to_string());
        assert!(matches!(state.verify(), Err(StateViolation::StatusMismatch(_))));
    }

    #[test]
    fn test_score_only_for_finished_games() {
        let mut state = new_game();
        assert_eq!(state.score(), None);
        state.cancel("alice").unwrap();
        assert_eq!(state.score(), None);
    }
}
