use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, MutexGuard};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{check_version, GameId, GameStore, Versioned};
use crate::error::StoreError;
use crate::game::{GameState, GameStatus, Player};

/// JSON files under a data directory:
///
/// ```text
/// <root>/players.json        name -> player
/// <root>/games/<id>.json     one versioned game per file
/// <root>/store.lock          held exclusively for every operation
/// ```
///
/// Every write goes to a `.tmp` sibling first and is then renamed into
/// place. Each operation takes the in-process mutex and then an advisory
/// lock on `store.lock`, so processes sharing a directory see version checks
/// and writes as one step.
pub struct FileStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(root.join("games"))?;
        Ok(FileStore {
            root,
            lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn players_path(&self) -> PathBuf {
        self.root.join("players.json")
    }

    /// Exclusive access to the directory until the guard drops.
    fn guard(&self) -> Result<StoreGuard<'_>, StoreError> {
        let local = self.lock.lock();
        let file = File::options()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.root.join("store.lock"))?;
        file.lock()?;
        Ok(StoreGuard {
            _file: file,
            _local: local,
        })
    }

    fn game_path(&self, id: GameId) -> PathBuf {
        self.root.join("games").join(format!("{id}.json"))
    }

    fn load_players(&self) -> Result<BTreeMap<String, Player>, StoreError> {
        read_json_or_default(&self.players_path())
    }

    fn read_game(&self, id: GameId) -> Result<Versioned<GameState>, StoreError> {
        let path = self.game_path(id);
        if !path.exists() {
            return Err(StoreError::GameNotFound(id));
        }
        read_game_file(&path)
    }

    /// All parseable games. Unreadable files are skipped with a warning so one
    /// bad file does not hide every other game.
    fn read_all_games(&self) -> Result<Vec<(GameId, GameState)>, StoreError> {
        let mut games = Vec::new();
        for entry in fs::read_dir(self.root.join("games"))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<GameId>().ok())
            else {
                continue;
            };
            match read_game_file(&path) {
                Ok(stored) => games.push((id, stored.value)),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable game"),
            }
        }
        games.sort_by_key(|(id, _)| *id);
        Ok(games)
    }
}

impl GameStore for FileStore {
    fn create_player(&self, player: Player) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        let mut players = self.load_players()?;
        if players.contains_key(&player.name) {
            return Err(StoreError::PlayerExists(player.name));
        }
        players.insert(player.name.clone(), player);
        write_json(&self.players_path(), &players)
    }

    fn load_player(&self, name: &str) -> Result<Player, StoreError> {
        let _guard = self.guard()?;
        self.load_players()?
            .remove(name)
            .ok_or_else(|| StoreError::PlayerNotFound(name.to_string()))
    }

    fn insert_game(&self, game: GameState) -> Result<GameId, StoreError> {
        let _guard = self.guard()?;
        let id = GameId::new();
        write_json(
            &self.game_path(id),
            &Versioned {
                version: 1,
                value: game,
            },
        )?;
        debug!(%id, "inserted game");
        Ok(id)
    }

    fn load_game(&self, id: GameId) -> Result<Versioned<GameState>, StoreError> {
        let _guard = self.guard()?;
        self.read_game(id)
    }

    fn save_game(
        &self,
        id: GameId,
        game: &GameState,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let _guard = self.guard()?;
        let stored = self.read_game(id)?;
        check_version(id, expected_version, stored.version)?;
        let version = stored.version + 1;
        write_json(
            &self.game_path(id),
            &Versioned {
                version,
                value: game,
            },
        )?;
        debug!(%id, version, "saved game");
        Ok(version)
    }

    fn delete_game(&self, id: GameId, expected_version: u64) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        let stored = self.read_game(id)?;
        check_version(id, expected_version, stored.version)?;
        fs::remove_file(self.game_path(id))?;
        debug!(%id, "deleted game");
        Ok(())
    }

    fn list_active_games(&self, player: &str) -> Result<Vec<(GameId, GameState)>, StoreError> {
        let _guard = self.guard()?;
        Ok(self
            .read_all_games()?
            .into_iter()
            .filter(|(_, g)| !g.is_terminal() && g.is_participant(player))
            .collect())
    }

    fn list_all_completed_games(&self) -> Result<Vec<GameState>, StoreError> {
        let _guard = self.guard()?;
        Ok(self
            .read_all_games()?
            .into_iter()
            .map(|(_, g)| g)
            .filter(|g| matches!(g.status(), GameStatus::Won(_) | GameStatus::Draw))
            .collect())
    }
}

/// Field order matters: the file lock is released before the mutex.
struct StoreGuard<'a> {
    _file: File,
    _local: MutexGuard<'a, ()>,
}

fn read_game_file(path: &Path) -> Result<Versioned<GameState>, StoreError> {
    let stored: Versioned<GameState> = read_json(path)?;
    stored.value.verify().map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(stored)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let json = fs::read_to_string(path).map_err(|e| StoreError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&json).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    if path.exists() {
        read_json(path)
    } else {
        Ok(T::default())
    }
}

/// Write to `<path>.tmp`, then rename over `path`.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
