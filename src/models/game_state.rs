use serde::Serialize;
use uuid::Uuid;

use crate::game::{Color, Reason};

/// One side of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    pub color: Color,
}

/// Durable summary of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub game_id: Uuid,
    pub players: Vec<PlayerRecord>,
    pub winner: Color,
    pub reason: Reason,
}

impl GameRecord {
    /// The winning player, if the game was decided.
    pub fn winning_player(&self) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.color == self.winner)
    }
}
