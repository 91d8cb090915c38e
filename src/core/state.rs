//! # Application State
//!
//! The composition root. Builds every shared piece once and wires them
//! together; nothing here knows about terminals.
//!
//! ```text
//! App
//! ├── config: ResolvedConfig                 // tick, clock mode, slot limits
//! ├── clock: Rc<dyn Clock>                   // shared by every timer
//! ├── router: ScreenRouter                   // navigation stack + deferred requests
//! ├── bus: Rc<EventBus>                      // screen-to-screen news
//! ├── timers: Rc<RefCell<TimerRegistry>>     // live countdowns
//! ├── main_screen / timer_screen / help_screen
//! └── status_message: String                 // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info, warn};

use crate::core::bus::{BusEvent, EventBus};
use crate::core::clock::Clock;
use crate::core::config::ResolvedConfig;
use crate::core::registry::TimerRegistry;
use crate::core::router::ScreenRouter;
use crate::core::screen::{ScreenId, ScreenPayload, ScreenRegistration, SharedScreen, SwitchMode};
use crate::core::store::SlotStore;
use crate::screens::{HelpScreen, MainScreen, TimerScreen, TimersSaveData};

pub struct App {
    pub config: ResolvedConfig,
    pub clock: Rc<dyn Clock>,
    pub router: ScreenRouter,
    pub bus: Rc<EventBus>,
    pub timers: Rc<RefCell<TimerRegistry>>,
    pub main_screen: Rc<RefCell<MainScreen>>,
    pub timer_screen: Rc<RefCell<TimerScreen>>,
    pub help_screen: Rc<RefCell<HelpScreen>>,
    pub status_message: String,
}

impl App {
    pub fn new(
        config: ResolvedConfig,
        clock: Rc<dyn Clock>,
        store: Rc<dyn SlotStore<TimersSaveData>>,
    ) -> Self {
        let bus = Rc::new(EventBus::new());
        let timers = Rc::new(RefCell::new(TimerRegistry::new(Rc::clone(&clock))));

        let main_screen = Rc::new(RefCell::new(MainScreen::new(
            Rc::clone(&store),
            Rc::clone(&bus),
            config.limits,
        )));
        let timer_screen = Rc::new(RefCell::new(TimerScreen::new(
            store,
            Rc::clone(&timers),
            Rc::clone(&bus),
            config.limits,
            config.clock,
        )));
        let help_screen = Rc::new(RefCell::new(HelpScreen::new()));

        let mut router = ScreenRouter::new(ScreenId::Main);
        let handlers: [SharedScreen; 3] = [
            main_screen.clone(),
            timer_screen.clone(),
            help_screen.clone(),
        ];
        for handler in &handlers {
            if let Err(e) = handler.register(&mut router) {
                warn!("{e}");
            }
        }

        let changes = Rc::clone(&bus);
        router.on_screen_changed(move |screen| changes.publish(BusEvent::ScreenChanged { screen }));

        Self {
            config,
            clock,
            router,
            bus,
            timers,
            main_screen,
            timer_screen,
            help_screen,
            status_message: String::from("Welcome to tickr! Press ? for help."),
        }
    }

    /// Shows the root screen. With `open_slot`, that slot's timer screen is
    /// queued to open as soon as the root is current.
    pub fn start(&mut self, open_slot: Option<usize>) {
        if let Some(slot) = open_slot
            && let Err(e) = self.router.request_after(
                ScreenPayload::Timer { slot },
                ScreenId::Main,
                SwitchMode::Replacing,
            )
        {
            warn!("Can't open slot {slot} on start: {e}");
        }

        if let Err(e) = self.router.switch_to(ScreenId::Main, SwitchMode::Replacing, true) {
            error!("Failed to show main screen: {e}");
        }
        info!("App started on {:?}", self.router.current());
    }

    /// One pass of the timer engine. Returns the slots that finished.
    pub fn tick(&mut self) -> Vec<usize> {
        let events = self.timers.borrow_mut().advance_all();
        if events.is_empty() {
            return Vec::new();
        }
        let finished = self.timer_screen.borrow_mut().handle_timer_events(&events);
        if let Some(slot) = finished.last() {
            self.status_message = format!("Timer {} finished!", slot + 1);
        }
        finished
    }

    /// App lost focus: logical time stops.
    pub fn suspend(&mut self) {
        if !self.clock.is_suspended() {
            self.clock.suspend();
            info!("Suspended ({} clock)", self.config.clock.label());
        }
    }

    pub fn resume(&mut self) {
        if self.clock.is_suspended() {
            self.clock.resume();
            info!("Resumed");
        }
    }

    /// Writes every slot's remaining time back to the store.
    pub fn save(&self) {
        match self.timer_screen.borrow().save_current_data() {
            Ok(()) => info!("Timer slots saved"),
            Err(e) => error!("Failed to save timer slots: {e}"),
        }
    }
}
