//! Persistence of remembered menu selections.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::menu::SelectionMemory;

/// File name used when no explicit path is configured.
pub const DEFAULT_STATE_FILE: &str = "selection.json";

/// Serialized form of the selection file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSelection {
    /// When the file was written.
    pub saved_at: DateTime<Utc>,
    /// Remembered choices.
    #[serde(default)]
    pub memory: SelectionMemory,
}

/// Reads and writes [`SelectionMemory`] as JSON.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored envelope, or `None` when nothing was saved yet.
    pub fn load_stored(&self) -> Result<Option<StoredSelection>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read selections {}", self.path.display()))?;
        let stored = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse selections {}", self.path.display()))?;
        Ok(Some(stored))
    }

    /// Load the remembered selections; a missing file yields empty memory.
    pub fn load(&self) -> Result<SelectionMemory> {
        Ok(self
            .load_stored()?
            .map(|stored| stored.memory)
            .unwrap_or_default())
    }

    /// Write `memory`, creating parent directories if needed.
    pub fn persist(&self, memory: &SelectionMemory) -> Result<StoredSelection> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create selection directory {}", parent.display())
            })?;
        }

        let stored = StoredSelection {
            saved_at: Utc::now(),
            memory: memory.clone(),
        };
        let serialized =
            serde_json::to_string_pretty(&stored).context("failed to serialize selections")?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write selections {}", self.path.display()))?;
        debug!("Saved selections to {}", self.path.display());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        menu::Selection,
        models::{EngineCategory, PlayMode},
    };
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_empty_memory() -> Result<()> {
        let temp = tempdir()?;
        let store = SelectionStore::new(temp.path().join("selection.json"));
        assert!(store.load_stored()?.is_none());
        assert_eq!(store.load()?, SelectionMemory::default());
        Ok(())
    }

    #[test]
    fn persist_round_trip() -> Result<()> {
        let temp = tempdir()?;
        let store = SelectionStore::new(temp.path().join("nested").join("selection.json"));

        let mut memory = SelectionMemory::default();
        memory.record(&Selection::Engine {
            category: EngineCategory::Retro,
            file: "engines/mame/mephisto_milano".to_string(),
            level: Some("Level 10 - 60m game".to_string()),
        });
        memory.record(&Selection::Mode {
            mode: PlayMode::Analysis,
        });

        let written = store.persist(&memory)?;
        let stored = store.load_stored()?.expect("selection file present");
        assert_eq!(stored.saved_at, written.saved_at);
        assert_eq!(stored.memory, memory);
        assert_eq!(store.load()?, memory);
        Ok(())
    }

    #[test]
    fn corrupt_file_reports_path() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("selection.json");
        fs::write(&path, "{ not json")?;

        let err = SelectionStore::new(&path).load().unwrap_err();
        assert!(format!("{err}").contains("selection.json"));
        Ok(())
    }
}
