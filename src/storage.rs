use log::info;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::models::GameRecord;

/// Persistence sink for finished games.
pub trait GameStore: Send + Sync {
    fn insert_game(&self, record: GameRecord) -> Result<(), StorageError>;
}

/// Keeps finished games in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: Mutex<Vec<GameRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn games(&self) -> Vec<GameRecord> {
        match self.games.lock() {
            Ok(games) => games.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl GameStore for MemoryStore {
    fn insert_game(&self, record: GameRecord) -> Result<(), StorageError> {
        if record.players.len() != 2 {
            return Err(StorageError::InvalidPlayers);
        }
        let winner = record
            .winning_player()
            .map(|p| format!("{} ({})", p.name, p.id))
            .unwrap_or_else(|| "nobody".to_string());
        info!(
            "Storing game {} ({}, winner {})",
            record.game_id, record.reason, winner
        );
        let mut games = match self.games.lock() {
            Ok(games) => games,
            Err(poisoned) => poisoned.into_inner(),
        };
        games.push(record);
        Ok(())
    }
}
