//! Persisted timer slots.
//!
//! One record holds every slot, keyed by slot index. It is stored in slot
//! [`DEFAULT_SLOT`](crate::core::store::DEFAULT_SLOT) of the `Timers` store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store name, and the prefix of every file it writes.
pub const SAVE_NAME: &str = "Timers";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSaveData {
    /// Seconds left on the slot's countdown.
    pub left_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimersSaveData {
    pub timers: BTreeMap<usize, TimerSaveData>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TimersSaveData {
    /// `count` slots numbered from zero, each holding `duration` seconds.
    pub fn with_defaults(count: usize, duration: f64) -> Self {
        let timers = (0..count)
            .map(|slot| (slot, TimerSaveData { left_time: duration }))
            .collect();
        Self {
            timers,
            updated_at: None,
        }
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn slots(&self) -> Vec<usize> {
        self.timers.keys().copied().collect()
    }

    pub fn left_time(&self, slot: usize) -> Option<f64> {
        self.timers.get(&slot).map(|t| t.left_time)
    }

    /// Stamp the record just before writing it.
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
