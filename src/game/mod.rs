//! Core Connect Four game logic: board, win detection, move history and the
//! turn-based game state machine. Nothing in here performs I/O.

mod board;
mod history;
mod player;
mod state;
pub mod win;

#[cfg(test)]
pub(crate) mod testing;

pub use board::{Board, Cell, Colour, DropError, CELLS, COLS, ROWS};
pub use history::{HistoryEntry, HistoryLog};
pub use player::{Player, Turn};
pub use state::{GameError, GameState, GameStatus, MoveOutcome, Score, StateViolation};
