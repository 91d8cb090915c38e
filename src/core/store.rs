//! # Slot Store
//!
//! Keyed persistence for serializable records, used by screens (never by the
//! router or the timer engine).
//!
//! Each record lives in its own JSON file:
//! `<root>/saves/<name>/<name><slot>.json`. Writes use atomic rename
//! (write `.tmp`, then `rename()`) for crash safety.
//!
//! A file that no longer deserializes is treated as corrupt: every slot of
//! that store is deleted, the error is logged, and `load` reports nothing.

use std::fmt;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const DEFAULT_SLOT: usize = 0;
pub const MAX_SLOTS: usize = 10;

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Serialize(serde_json::Error),
    SlotOutOfRange(usize),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "store I/O error: {e}"),
            StoreError::Serialize(e) => write!(f, "store serialize error: {e}"),
            StoreError::SlotOutOfRange(slot) => {
                write!(f, "slot {slot} is out of range (max {})", MAX_SLOTS - 1)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

pub trait SlotStore<T> {
    /// Returns the record in `slot`, or None if absent or unreadable.
    fn load(&self, slot: usize) -> Option<T>;

    fn save(&self, slot: usize, record: &T) -> Result<(), StoreError>;

    /// Deletes every slot.
    fn reset(&self);
}

pub struct JsonSlotStore<T> {
    dir: PathBuf,
    name: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonSlotStore<T> {
    /// A store named `name` under `<root>/saves/<name>/`.
    pub fn new(root: &Path, name: &str) -> Self {
        Self {
            dir: root.join("saves").join(name),
            name: name.to_string(),
            _record: PhantomData,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, slot: usize) -> PathBuf {
        self.dir.join(format!("{}{}.json", self.name, slot))
    }

    pub fn exists(&self, slot: usize) -> bool {
        self.path(slot).exists()
    }
}

impl<T: Serialize + DeserializeOwned> SlotStore<T> for JsonSlotStore<T> {
    fn load(&self, slot: usize) -> Option<T> {
        let path = self.path(slot);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(record) => {
                debug!("Loaded {}", path.display());
                Some(record)
            }
            Err(e) => {
                error!("Unable to load {}{}: {}. Resetting...", self.name, slot, e);
                self.reset();
                None
            }
        }
    }

    fn save(&self, slot: usize, record: &T) -> Result<(), StoreError> {
        if slot >= MAX_SLOTS {
            return Err(StoreError::SlotOutOfRange(slot));
        }
        fs::create_dir_all(&self.dir)?;
        atomic_write_json(&self.path(slot), record)?;
        debug!("Saved {}{}", self.name, slot);
        Ok(())
    }

    fn reset(&self) {
        for slot in 0..MAX_SLOTS {
            let path = self.path(slot);
            if !path.exists() {
                continue;
            }
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to delete {}: {}", path.display(), e);
            }
        }
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data).map_err(StoreError::Serialize)?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
