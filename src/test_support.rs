//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::core::clock::{Clock, ClockMode, ManualClock};
use crate::core::config::{CliOverrides, TickrConfig, resolve};
use crate::core::screen::{Screen, ScreenError, ScreenId, ScreenPayload};
use crate::core::state::App;
use crate::core::store::{SlotStore, StoreError};
use crate::screens::TimersSaveData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Show,
    Hide,
}

/// A screen that records every lifecycle call it receives.
pub struct RecordingScreen {
    id: ScreenId,
    pub log: Vec<Lifecycle>,
    pub payloads: Vec<ScreenPayload>,
    /// When set, every `on_show` is rejected after being recorded.
    pub reject_payloads: bool,
}

impl RecordingScreen {
    pub fn shared(id: ScreenId) -> Rc<RefCell<RecordingScreen>> {
        Rc::new(RefCell::new(Self {
            id,
            log: Vec::new(),
            payloads: Vec::new(),
            reject_payloads: false,
        }))
    }

    pub fn shows(&self) -> usize {
        self.log.iter().filter(|l| **l == Lifecycle::Show).count()
    }

    pub fn hides(&self) -> usize {
        self.log.iter().filter(|l| **l == Lifecycle::Hide).count()
    }
}

impl Screen for RecordingScreen {
    fn id(&self) -> ScreenId {
        self.id
    }

    fn on_show(&mut self, payload: &ScreenPayload) -> Result<(), ScreenError> {
        self.log.push(Lifecycle::Show);
        self.payloads.push(payload.clone());
        if self.reject_payloads {
            return Err(ScreenError::UnexpectedPayload {
                screen: self.id,
                payload: payload.clone(),
            });
        }
        Ok(())
    }

    fn on_hide(&mut self) {
        self.log.push(Lifecycle::Hide);
    }
}

/// In-memory slot store that counts successful saves.
pub struct MemoryStore<T> {
    slots: RefCell<HashMap<usize, T>>,
    saves: Cell<usize>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
            saves: Cell::new(0),
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.get()
    }
}

impl<T: Clone> SlotStore<T> for MemoryStore<T> {
    fn load(&self, slot: usize) -> Option<T> {
        self.slots.borrow().get(&slot).cloned()
    }

    fn save(&self, slot: usize, record: &T) -> Result<(), StoreError> {
        self.slots.borrow_mut().insert(slot, record.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn reset(&self) {
        self.slots.borrow_mut().clear();
    }
}

/// Creates a test App on a manual logical clock and an in-memory store.
pub fn test_app() -> (App, Rc<ManualClock>) {
    let cli = CliOverrides {
        tick_ms: Some(100),
        clock: Some(ClockMode::Logical),
        log_level: Some("debug".to_string()),
        data_dir: Some(PathBuf::from("unused")),
    };
    let config = resolve(&TickrConfig::default(), &cli);

    let clock = Rc::new(ManualClock::new());
    let shared: Rc<dyn Clock> = clock.clone();
    let store: Rc<dyn SlotStore<TimersSaveData>> = Rc::new(MemoryStore::new());
    (App::new(config, shared, store), clock)
}
