//! # Main Screen
//!
//! The root screen: a list of timer slots.
//!
//! Slots are read from the store every time the screen is shown (a default
//! set is written on first run). Adding and removing slots writes straight
//! back. Removing a slot tells the rest of the app through
//! `BusEvent::TimerSlotDeleted`; finished countdowns arrive through
//! `BusEvent::TimerCompleted` and flag their slot until it is opened again.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use log::{error, info};

use crate::core::bus::{BusEvent, EventBus, SubscriptionId, Topic};
use crate::core::config::SlotLimits;
use crate::core::screen::{Screen, ScreenError, ScreenId, ScreenPayload};
use crate::core::store::{DEFAULT_SLOT, SlotStore};
use crate::screens::save_data::{TimerSaveData, TimersSaveData};

pub struct MainScreen {
    store: Rc<dyn SlotStore<TimersSaveData>>,
    bus: Rc<EventBus>,
    limits: SlotLimits,
    data: TimersSaveData,
    // Shared with the bus subscription, which must not borrow the screen itself.
    completed: Rc<RefCell<BTreeSet<usize>>>,
    selected: usize,
    visible: bool,
    subscription: SubscriptionId,
}

impl MainScreen {
    pub fn new(store: Rc<dyn SlotStore<TimersSaveData>>, bus: Rc<EventBus>, limits: SlotLimits) -> Self {
        let completed = Rc::new(RefCell::new(BTreeSet::new()));
        let sink = Rc::clone(&completed);
        let subscription = bus.subscribe(Topic::TimerCompleted, move |event| {
            if let BusEvent::TimerCompleted { slot } = event {
                sink.borrow_mut().insert(*slot);
            }
        });

        Self {
            store,
            bus,
            limits,
            data: TimersSaveData::default(),
            completed,
            selected: 0,
            visible: false,
            subscription,
        }
    }

    fn load(&mut self) {
        match self.store.load(DEFAULT_SLOT) {
            Some(data) => self.data = data,
            None => {
                info!("No saved timers, creating {} default slot(s)", self.limits.default_count);
                self.data = TimersSaveData::with_defaults(
                    self.limits.default_count,
                    self.limits.default_duration,
                );
                self.save();
            }
        }
        self.clamp_selection();
    }

    fn save(&mut self) {
        self.data.touch();
        if let Err(e) = self.store.save(DEFAULT_SLOT, &self.data) {
            error!("Failed to save timer slots: {}", e);
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.data.len().saturating_sub(1));
    }

    // ------------------------------------------------------------------
    // Slot management
    // ------------------------------------------------------------------

    pub fn can_add(&self) -> bool {
        self.data.len() < self.limits.max_count
    }

    pub fn can_remove(&self) -> bool {
        self.data.len() > self.limits.min_count
    }

    /// Appends a slot holding the default duration. Returns its index.
    pub fn add_slot(&mut self) -> Option<usize> {
        if !self.can_add() {
            return None;
        }
        let slot = self.data.timers.keys().next_back().map_or(0, |last| last + 1);
        self.data.timers.insert(
            slot,
            TimerSaveData {
                left_time: self.limits.default_duration,
            },
        );
        self.save();
        info!("Added timer slot {slot}");
        Some(slot)
    }

    /// Removes the last slot and announces it on the bus. Returns its index.
    pub fn remove_slot(&mut self) -> Option<usize> {
        if !self.can_remove() {
            return None;
        }
        let (slot, _) = self.data.timers.pop_last()?;
        self.completed.borrow_mut().remove(&slot);
        self.save();
        self.clamp_selection();
        info!("Removed timer slot {slot}");

        self.bus.publish(BusEvent::TimerSlotDeleted { slot });
        Some(slot)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.data.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_slot(&self) -> Option<usize> {
        self.data.slots().get(self.selected).copied()
    }

    /// Payload that opens the selected slot, clearing its "finished" flag.
    pub fn open_selected(&mut self) -> Option<ScreenPayload> {
        let slot = self.selected_slot()?;
        self.completed.borrow_mut().remove(&slot);
        Some(ScreenPayload::Timer { slot })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn data(&self) -> &TimersSaveData {
        &self.data
    }

    pub fn is_completed(&self, slot: usize) -> bool {
        self.completed.borrow().contains(&slot)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Screen for MainScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Main
    }

    fn on_show(&mut self, _payload: &ScreenPayload) -> Result<(), ScreenError> {
        self.load();
        self.visible = true;
        Ok(())
    }

    fn on_hide(&mut self) {
        self.visible = false;
    }
}

impl Drop for MainScreen {
    fn drop(&mut self) {
        self.bus.unsubscribe(Topic::TimerCompleted, self.subscription);
    }
}
