use std::fmt;

use serde::{Deserialize, Serialize};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
pub const CELLS: usize = ROWS * COLS;

/// Token colour. Player1 always plays Red, Player2 always Yellow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Colour {
    Red,
    Yellow,
}

impl Colour {
    /// Convert colour to cell type
    pub fn to_cell(self) -> Cell {
        match self {
            Colour::Red => Cell::Red,
            Colour::Yellow => Cell::Yellow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Red,
    Yellow,
}

impl Cell {
    pub fn colour(self) -> Option<Colour> {
        match self {
            Cell::Empty => None,
            Cell::Red => Some(Colour::Red),
            Cell::Yellow => Some(Colour::Yellow),
        }
    }

    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Red => 'R',
            Cell::Yellow => 'Y',
        }
    }
}

/// Why a token could not be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropError {
    InvalidColumn,
    ColumnFull,
}

/// The 7x6 grid.
///
/// Columns and rows are 1-based at the public surface, row 1 being the
/// bottom row. Internally `cells[0]` is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Get the cell at a 1-based (column, row). Anything off the board reads
    /// as empty.
    pub fn cell_at(&self, column: usize, row: usize) -> Cell {
        if !(1..=COLS).contains(&column) || !(1..=ROWS).contains(&row) {
            return Cell::Empty;
        }
        self.cells[row - 1][column - 1]
    }

    /// Number of tokens stacked in a 1-based column.
    pub fn column_height(&self, column: usize) -> usize {
        if !(1..=COLS).contains(&column) {
            return 0;
        }
        (0..ROWS)
            .take_while(|&r| self.cells[r][column - 1] != Cell::Empty)
            .count()
    }

    /// Check if a column is full. Columns off the board count as full.
    pub fn is_column_full(&self, column: usize) -> bool {
        self.column_height(column) == ROWS || !(1..=COLS).contains(&column)
    }

    /// Drop a token in a column, returns the 1-based row where it landed.
    pub fn drop_piece(&mut self, column: usize, colour: Colour) -> Result<usize, DropError> {
        if !(1..=COLS).contains(&column) {
            return Err(DropError::InvalidColumn);
        }

        let height = self.column_height(column);
        if height == ROWS {
            return Err(DropError::ColumnFull);
        }

        self.cells[height][column - 1] = colour.to_cell();
        Ok(height + 1)
    }

    /// Place `colour` in the lowest empty row of `column`. Returns false and
    /// leaves the board untouched if the column is off the board or full.
    pub fn update(&mut self, column: usize, colour: Colour) -> bool {
        self.drop_piece(column, colour).is_ok()
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (1..=COLS).all(|col| self.is_column_full(col))
    }

    pub fn tokens_placed(&self) -> usize {
        (1..=COLS).map(|col| self.column_height(col)).sum()
    }

    /// True if every token rests on the bottom row or on another token.
    pub fn obeys_gravity(&self) -> bool {
        (0..COLS).all(|c| {
            let height = (0..ROWS)
                .take_while(|&r| self.cells[r][c] != Cell::Empty)
                .count();
            (height..ROWS).all(|r| self.cells[r][c] == Cell::Empty)
        })
    }

    pub fn count(&self, colour: Colour) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell == colour.to_cell())
            .count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            let line: String = self.cells[row].iter().map(|c| c.symbol()).collect();
            writeln!(f, "{line}")?;
        }
        let footer: String = (1..=COLS).map(|c| char::from(b'0' + c as u8)).collect();
        write!(f, "{footer}")
    }
}
