use super::PersistenceError;
use quiz::HistoryEntry;
use std::path::{Path, PathBuf};

/// The store keeps at most this many entries; the oldest go first.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded append log of past attempts, most-recent-last, backed by a single
/// JSON file.
pub struct HistoryStore {
    path: PathBuf,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self::with_capacity(path, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(path: PathBuf, capacity: usize) -> Self {
        Self { path, capacity }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, evicting from the front past capacity.
    pub fn append(&self, entry: &HistoryEntry) -> Result<(), PersistenceError> {
        let mut entries = self.load()?;
        entries.push(entry.clone());
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }
        self.write(&entries)
    }

    /// All retained entries, insertion order (most-recent-last).
    pub fn list(&self) -> Result<Vec<HistoryEntry>, PersistenceError> {
        self.load()
    }

    pub fn clear(&self) -> Result<(), PersistenceError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<Vec<HistoryEntry>, PersistenceError> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!("Unreadable history file {:?}, starting over: {}", self.path, e);
                Ok(vec![])
            }
        }
    }

    fn write(&self, entries: &[HistoryEntry]) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
