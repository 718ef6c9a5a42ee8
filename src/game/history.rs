use serde::{Deserialize, Serialize};

use super::board::Board;

/// One applied move and the board right after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 1-based position in the game.
    pub sequence: usize,
    pub player: String,
    pub column: usize,
    pub row: usize,
    pub board_after: Board,
}

/// Append-only, time-ordered move record. Only successful moves land here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        HistoryLog {
            entries: Vec::new(),
        }
    }

    /// Record a move. Sequence numbers are assigned here.
    pub(crate) fn append(&mut self, player: &str, column: usize, row: usize, board_after: Board) {
        let sequence = self.entries.len() + 1;
        self.entries.push(HistoryEntry {
            sequence,
            player: player.to_string(),
            column,
            row,
            board_after,
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
