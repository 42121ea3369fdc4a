//! Local persisted key-value state.
//!
//! Small JSON-backed store covering the two locally persisted concerns: the
//! default notification display duration and the autosave snapshot of
//! in-progress variation form state. Values survive restarts and are
//! explicitly removable.

use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;

/// Local state persistence errors.
#[derive(Error, Debug)]
pub enum LocalStateError {
    #[error("failed to persist local state: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode local state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// File-backed key-value store for locally persisted state.
///
/// The whole map is rewritten on every mutation; the values stored here are
/// tiny (an integer and one form snapshot), so durability wins over write
/// granularity.
pub struct LocalStateStore {
    path: PathBuf,
    state: Mutex<HashMap<String, Value>>,
}

impl LocalStateStore {
    /// Open the store at `path`, loading any previously persisted state.
    ///
    /// A missing file starts empty. An unreadable or corrupt file also
    /// starts empty: losing a toast duration or a form draft must never
    /// block startup.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!("local state file {} is corrupt, starting empty: {e}", path.display());
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            state: Mutex::new(state),
        }
    }

    /// Read a value by key.
    pub fn get(&self, key: &str) -> Option<Value> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.get(key).cloned()
    }

    /// Store a value under a key and persist.
    pub fn set(&self, key: &str, value: Value) -> Result<(), LocalStateError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.insert(key.to_string(), value);
        self.persist(&state)
    }

    /// Remove a key and persist. Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) -> Result<(), LocalStateError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.remove(key).is_some() {
            self.persist(&state)?;
        }
        Ok(())
    }

    fn persist(&self, state: &HashMap<String, Value>) -> Result<(), LocalStateError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
