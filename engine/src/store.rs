//! Per-game event persistence: a whole-file JSON rewrite per append,
//! and full replay on load.

use crate::{
    error::{EngineError, EngineResult},
    event::Event,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Reads and writes the `<dir>/<game_id>_events.json` files backing
/// each game's event log.
#[derive(Debug, Clone)]
pub struct EventStore {
    directory: PathBuf,
}
impl EventStore {
    /// Creates a store rooted at `directory`, creating it if missing.
    pub fn new(directory: impl Into<PathBuf>) -> EngineResult<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    /// The path of the event file for `game_id`, whether or not it exists.
    pub fn path_for(&self, game_id: u64) -> PathBuf {
        self.directory.join(format!("{game_id}_events.json"))
    }

    /// Whether a persisted event log exists for `game_id`.
    pub fn exists(&self, game_id: u64) -> bool {
        self.path_for(game_id).exists()
    }

    /// Rewrites the full event log for `game_id` to disk.
    pub fn save(&self, game_id: u64, events: &[Event]) -> EngineResult<()> {
        let path = self.path_for(game_id);
        let file = fs::File::create(&path)?;
        serde_json::to_writer(file, events)?;
        Ok(())
    }

    /// Loads the full, ordered event log for `game_id`.
    /// Fails with [`EngineError::GameNotFound`] if no file exists.
    pub fn load(&self, game_id: u64) -> EngineResult<Vec<Event>> {
        let path = self.path_for(game_id);
        if !path.exists() {
            return Err(EngineError::GameNotFound);
        }
        let file = fs::File::open(&path)?;
        let events: Vec<Event> = serde_json::from_reader(file)?;
        Ok(events)
    }

    /// The store's backing directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}
