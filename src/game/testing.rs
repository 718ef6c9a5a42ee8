//! Shared helpers for game tests.

use super::{GameState, MoveOutcome};

/// Plays `columns` in order, each move by whoever is to move.
pub(crate) fn play(state: &mut GameState, columns: &[usize]) -> MoveOutcome {
    let mut last = None;
    for &col in columns {
        let player = state.whose_turn().to_string();
        last = Some(state.make_move(&player, col).unwrap());
    }
    last.expect("at least one move")
}

/// 42 alternating moves that fill the board without four in a row.
pub(crate) fn drawing_sequence() -> Vec<usize> {
    vec![
        6, 4, 3, 4, 2, 6, 4, 2, 1, 2, 5, 2, 3, 6, 1, 6, 7, 7, 3, 1, 7, 1, 5, 3, 4, 1, 4, 5, 3,
        4, 3, 7, 2, 2, 6, 5, 7, 7, 1, 5, 5, 6,
    ]
}
