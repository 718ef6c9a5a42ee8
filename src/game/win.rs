//! Four-in-a-row detection.

use super::board::{Board, Cell, Colour, COLS, ROWS};

const CONNECT: usize = 4;

/// (column step, row step) for horizontal, vertical, `/` and `\`.
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Check if the token at the 1-based (column, row) is part of four in a row.
pub fn is_won(board: &Board, column: usize, row: usize) -> bool {
    let cell = board.cell_at(column, row);
    if cell == Cell::Empty {
        return false;
    }

    DIRECTIONS.iter().any(|&(dc, dr)| {
        let count = 1
            + run_length(board, column, row, dc, dr, cell)
            + run_length(board, column, row, -dc, -dr, cell);
        count >= CONNECT
    })
}

/// Scan the whole board for any four in a row.
pub fn find_winner(board: &Board) -> Option<Colour> {
    for column in 1..=COLS {
        for row in 1..=ROWS {
            if is_won(board, column, row) {
                return board.cell_at(column, row).colour();
            }
        }
    }
    None
}

/// Count matching cells walking away from (column, row), not including it.
fn run_length(board: &Board, column: usize, row: usize, dc: isize, dr: isize, cell: Cell) -> usize {
    let mut count = 0;
    let mut c = column;
    let mut r = row;
    loop {
        match (c.checked_add_signed(dc), r.checked_add_signed(dr)) {
            (Some(nc), Some(nr)) if board.cell_at(nc, nr) == cell => {
                count += 1;
                c = nc;
                r = nr;
            }
            _ => return count,
        }
    }
}
