use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;
use tracing::debug;

use super::{check_version, GameId, GameStore, Versioned};
use crate::error::StoreError;
use crate::game::{GameState, GameStatus, Player};

/// In-memory store. Each call holds the lock for a single map operation.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    players: HashMap<String, Player>,
    games: BTreeMap<GameId, Versioned<GameState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStore for MemoryStore {
    fn create_player(&self, player: Player) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.players.contains_key(&player.name) {
            return Err(StoreError::PlayerExists(player.name));
        }
        inner.players.insert(player.name.clone(), player);
        Ok(())
    }

    fn load_player(&self, name: &str) -> Result<Player, StoreError> {
        self.inner
            .lock()
            .players
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::PlayerNotFound(name.to_string()))
    }

    fn insert_game(&self, game: GameState) -> Result<GameId, StoreError> {
        let id = GameId::new();
        self.inner.lock().games.insert(
            id,
            Versioned {
                version: 1,
                value: game,
            },
        );
        debug!(%id, "inserted game");
        Ok(id)
    }

    fn load_game(&self, id: GameId) -> Result<Versioned<GameState>, StoreError> {
        self.inner
            .lock()
            .games
            .get(&id)
            .cloned()
            .ok_or(StoreError::GameNotFound(id))
    }

    fn save_game(
        &self,
        id: GameId,
        game: &GameState,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock();
        let stored = inner
            .games
            .get_mut(&id)
            .ok_or(StoreError::GameNotFound(id))?;
        check_version(id, expected_version, stored.version)?;
        stored.version += 1;
        stored.value = game.clone();
        debug!(%id, version = stored.version, "saved game");
        Ok(stored.version)
    }

    fn delete_game(&self, id: GameId, expected_version: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let stored = inner.games.get(&id).ok_or(StoreError::GameNotFound(id))?;
        check_version(id, expected_version, stored.version)?;
        inner.games.remove(&id);
        debug!(%id, "deleted game");
        Ok(())
    }

    fn list_active_games(&self, player: &str) -> Result<Vec<(GameId, GameState)>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .games
            .iter()
            .filter(|(_, g)| !g.value.is_terminal() && g.value.is_participant(player))
            .map(|(id, g)| (*id, g.value.clone()))
            .collect())
    }

    fn list_all_completed_games(&self) -> Result<Vec<GameState>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .games
            .values()
            .filter(|g| matches!(g.value.status(), GameStatus::Won(_) | GameStatus::Draw))
            .map(|g| g.value.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> GameState {
        GameState::new_game(&Player::new("a", ""), &Player::new("b", "")).unwrap()
    }

    #[test]
    fn test_players() {
        let store = MemoryStore::new();
        store.create_player(Player::new("a", "a@x")).unwrap();
        assert!(matches!(
            store.create_player(Player::new("a", "other@x")),
            Err(StoreError::PlayerExists(_))
        ));
        assert_eq!(store.load_player("a").unwrap().email, "a@x");
        assert!(matches!(
            store.load_player("b"),
            Err(StoreError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn test_versioned_save() {
        let store = MemoryStore::new();
        let id = store.insert_game(game()).unwrap();
        let loaded = store.load_game(id).unwrap();
        assert_eq!(loaded.version, 1);

        let mut state = loaded.value;
        state.make_move("a", 4).unwrap();
        assert_eq!(store.save_game(id, &state, 1).unwrap(), 2);

        // A second writer still holding version 1 loses.
        let err = store.save_game(id, &game(), 1).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict {
                expected: 1,
                actual: 2,
                ..
            }
        ));
        assert_eq!(store.load_game(id).unwrap().value, state);
    }

    #[test]
    fn test_delete_checks_version() {
        let store = MemoryStore::new();
        let id = store.insert_game(game()).unwrap();
        assert!(matches!(
            store.delete_game(id, 7),
            Err(StoreError::Conflict { .. })
        ));
        store.delete_game(id, 1).unwrap();
        assert!(matches!(
            store.load_game(id),
            Err(StoreError::GameNotFound(_))
        ));
    }

    #[test]
    fn test_active_and_completed_games() {
        let store = MemoryStore::new();
        let running = store.insert_game(game()).unwrap();

        let mut finished = game();
        for col in [1, 1, 2, 2, 3, 3, 4] {
            let player = finished.whose_turn().to_string();
            finished.make_move(&player, col).unwrap();
        }
        store.insert_game(finished).unwrap();

        let active = store.list_active_games("a").unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].0, running);
        assert!(store.list_active_games("zed").unwrap().is_empty());

        let completed = store.list_all_completed_games().unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].status(), &GameStatus::Won("a".to_string()));
    }
}
