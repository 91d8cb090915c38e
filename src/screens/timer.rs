//! # Timer Screen
//!
//! Shows one slot's countdown and lets the user set and start it.
//!
//! ```text
//!   Main ──Timer{slot}──► Timer screen ──start──► back to Main
//!                              │
//!                              └─ slot timer keeps running in the registry
//! ```
//!
//! Each slot owns at most one registry timer, created on first start and
//! kept until it finishes or its slot is deleted. The duration can only be
//! changed while that timer is not running. Remaining times are written back
//! to the store by [`TimerScreen::save_current_data`], normally on quit.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use log::{debug, info};

use crate::core::bus::{BusEvent, EventBus, SubscriptionId, Topic};
use crate::core::clock::ClockMode;
use crate::core::config::SlotLimits;
use crate::core::registry::TimerRegistry;
use crate::core::screen::{Screen, ScreenError, ScreenId, ScreenPayload};
use crate::core::store::{DEFAULT_SLOT, SlotStore, StoreError};
use crate::core::timer::{Timer, TimerEvent, TimerSpec};
use crate::screens::save_data::TimersSaveData;

pub struct TimerScreen {
    store: Rc<dyn SlotStore<TimersSaveData>>,
    registry: Rc<RefCell<TimerRegistry>>,
    bus: Rc<EventBus>,
    limits: SlotLimits,
    clock: ClockMode,
    // Shared with the slot-deleted subscription.
    timers: Rc<RefCell<BTreeMap<usize, Timer>>>,
    current_slot: Option<usize>,
    draft_duration: f64,
    visible: bool,
    subscription: SubscriptionId,
}

impl TimerScreen {
    pub fn new(
        store: Rc<dyn SlotStore<TimersSaveData>>,
        registry: Rc<RefCell<TimerRegistry>>,
        bus: Rc<EventBus>,
        limits: SlotLimits,
        clock: ClockMode,
    ) -> Self {
        let timers: Rc<RefCell<BTreeMap<usize, Timer>>> = Rc::new(RefCell::new(BTreeMap::new()));
        let owned = Rc::clone(&timers);
        let subscription = bus.subscribe(Topic::TimerSlotDeleted, move |event| {
            if let BusEvent::TimerSlotDeleted { slot } = event
                && let Some(timer) = owned.borrow_mut().remove(slot)
            {
                timer.stop();
                info!("Slot {slot} deleted, stopped {}", timer.id());
            }
        });

        Self {
            store,
            registry,
            bus,
            limits,
            clock,
            timers,
            current_slot: None,
            draft_duration: limits.default_duration,
            visible: false,
            subscription,
        }
    }

    fn current_timer(&self) -> Option<Timer> {
        let slot = self.current_slot?;
        self.timers.borrow().get(&slot).cloned()
    }

    /// True while the shown slot's countdown is started and not finished.
    pub fn is_running(&self) -> bool {
        self.current_timer().is_some_and(|t| t.is_started() && !t.is_done())
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Moves the duration by `delta` seconds within `[0, max_duration]`.
    /// Ignored while the countdown runs.
    pub fn adjust(&mut self, delta: f64) {
        if self.current_slot.is_none() || self.is_running() {
            return;
        }
        self.draft_duration = (self.draft_duration + delta).clamp(0.0, self.limits.max_duration);
        if let Some(timer) = self.current_timer() {
            timer.set_duration(self.draft_duration);
        }
    }

    pub fn increase(&mut self) {
        self.adjust(self.limits.step);
    }

    pub fn decrease(&mut self) {
        self.adjust(-self.limits.step);
    }

    /// Starts the shown slot's countdown from the current duration. Returns
    /// false when there is no slot or it is already running.
    pub fn start(&mut self) -> bool {
        let Some(slot) = self.current_slot else {
            return false;
        };
        if self.is_running() {
            return false;
        }

        let timer = match self.current_timer() {
            Some(timer) => {
                if timer.is_done() {
                    timer.reset();
                }
                timer.set_duration(self.draft_duration);
                timer
            }
            None => {
                let spec = TimerSpec::new(self.draft_duration).clock(self.clock);
                let timer = self.registry.borrow_mut().create(spec);
                self.timers.borrow_mut().insert(slot, timer.clone());
                timer
            }
        };
        timer.start();
        info!("Slot {slot} started {} for {:.1}s", timer.id(), self.draft_duration);
        true
    }

    // ------------------------------------------------------------------
    // Registry events
    // ------------------------------------------------------------------

    /// Publishes `TimerCompleted` for every slot whose timer finished in
    /// `events`, and forgets that timer. Returns the finished slots.
    pub fn handle_timer_events(&mut self, events: &[TimerEvent]) -> Vec<usize> {
        let mut finished = Vec::new();
        {
            let mut timers = self.timers.borrow_mut();
            for event in events {
                let TimerEvent::Completed { id } = event else {
                    continue;
                };
                let slot = timers.iter().find(|(_, t)| t.id() == *id).map(|(slot, _)| *slot);
                if let Some(slot) = slot {
                    timers.remove(&slot);
                    finished.push(slot);
                }
            }
        }

        for &slot in &finished {
            if self.current_slot == Some(slot) {
                self.draft_duration = 0.0;
            }
            debug!("Slot {slot} finished");
            self.bus.publish(BusEvent::TimerCompleted { slot });
        }
        finished
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Writes each live slot timer's remaining time into the stored record.
    /// Does nothing if no record was ever saved.
    pub fn save_current_data(&self) -> Result<(), StoreError> {
        let Some(mut data) = self.store.load(DEFAULT_SLOT) else {
            return Ok(());
        };
        for (slot, timer) in self.timers.borrow().iter() {
            if let Some(entry) = data.timers.get_mut(slot) {
                entry.left_time = timer.remaining();
            }
        }
        data.touch();
        self.store.save(DEFAULT_SLOT, &data)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn current_slot(&self) -> Option<usize> {
        self.current_slot
    }

    /// Seconds to display: the live countdown while started, else the draft.
    pub fn display_remaining(&self) -> f64 {
        match self.current_timer() {
            Some(timer) if timer.is_started() => timer.remaining(),
            _ => self.draft_duration,
        }
    }

    /// Remaining seconds of `slot`'s countdown, if one is started.
    pub fn remaining(&self, slot: usize) -> Option<f64> {
        self.timers
            .borrow()
            .get(&slot)
            .filter(|t| t.is_started())
            .map(Timer::remaining)
    }

    pub fn has_timer(&self, slot: usize) -> bool {
        self.timers.borrow().contains_key(&slot)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Screen for TimerScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Timer
    }

    fn on_show(&mut self, payload: &ScreenPayload) -> Result<(), ScreenError> {
        let rejected = || ScreenError::UnexpectedPayload {
            screen: ScreenId::Timer,
            payload: payload.clone(),
        };
        let ScreenPayload::Timer { slot } = *payload else {
            return Err(rejected());
        };
        // Only slots present in the stored record can be opened.
        let Some(saved) = self.store.load(DEFAULT_SLOT).and_then(|data| data.left_time(slot)) else {
            return Err(rejected());
        };

        self.current_slot = Some(slot);
        self.draft_duration = match self.current_timer() {
            Some(timer) if timer.is_started() => timer.remaining(),
            Some(timer) => timer.duration(),
            None => saved,
        };
        self.visible = true;
        debug!("Timer screen showing slot {slot} ({:.1}s)", self.draft_duration);
        Ok(())
    }

    fn on_hide(&mut self) {
        self.visible = false;
    }
}

impl Drop for TimerScreen {
    fn drop(&mut self) {
        self.bus.unsubscribe(Topic::TimerSlotDeleted, self.subscription);
    }
}
