use serde::{Deserialize, Serialize};

/// A registered player. The name is the player's identity; the email is
/// carried for the store and never read by the game logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub email: String,
}

impl Player {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Player {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Whose move it is. Player1 always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    Player1ToMove,
    Player2ToMove,
}

impl Turn {
    /// Get the other side
    pub fn other(self) -> Turn {
        match self {
            Turn::Player1ToMove => Turn::Player2ToMove,
            Turn::Player2ToMove => Turn::Player1ToMove,
        }
    }
}
