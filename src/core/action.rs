//! # Actions
//!
//! Everything that can happen in tickr becomes an `Action`.
//! User presses Enter on a slot? That's `Action::OpenSelected`.
//! The tick interval elapses? That's `Action::Tick`.
//!
//! The `update()` function applies an action to the app and tells the caller
//! whether to keep going. Screens never navigate on their own: when a screen
//! operation implies a transition (open a slot, start a timer), `update()`
//! performs it on the router afterwards.
//!
//! ```text
//! App + Action  →  update()  →  App' + Effect
//! ```
//!
//! Actions that belong to a screen are ignored unless that screen is current.

use log::{debug, warn};

use crate::core::router::RouterError;
use crate::core::screen::{ScreenId, SwitchMode};
use crate::core::state::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Tick,
    // Main screen
    SelectNext,
    SelectPrevious,
    OpenSelected,
    AddSlot,
    RemoveSlot,
    // Timer screen
    IncreaseDuration,
    DecreaseDuration,
    StartTimer,
    // Anywhere
    Back,
    ToggleHelp,
    Suspend,
    Resume,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    if action != Action::Tick {
        debug!("Action: {:?} on {:?}", action, app.router.current());
    }
    let current = app.router.current();

    match action {
        Action::Tick => {
            app.tick();
        }
        Action::SelectNext if current == Some(ScreenId::Main) => {
            app.main_screen.borrow_mut().select_next();
        }
        Action::SelectPrevious if current == Some(ScreenId::Main) => {
            app.main_screen.borrow_mut().select_previous();
        }
        Action::OpenSelected if current == Some(ScreenId::Main) => {
            let payload = app.main_screen.borrow_mut().open_selected();
            if let Some(payload) = payload {
                let result = app.router.switch_to(payload, SwitchMode::Replacing, false);
                report(app, result);
            }
        }
        Action::AddSlot if current == Some(ScreenId::Main) => {
            let added = app.main_screen.borrow_mut().add_slot();
            app.status_message = match added {
                Some(slot) => format!("Added Timer {}", slot + 1),
                None => format!("At most {} timers", app.config.limits.max_count),
            };
        }
        Action::RemoveSlot if current == Some(ScreenId::Main) => {
            let removed = app.main_screen.borrow_mut().remove_slot();
            app.status_message = match removed {
                Some(slot) => format!("Removed Timer {}", slot + 1),
                None => format!("At least {} timers", app.config.limits.min_count),
            };
        }
        Action::IncreaseDuration if current == Some(ScreenId::Timer) => {
            app.timer_screen.borrow_mut().increase();
        }
        Action::DecreaseDuration if current == Some(ScreenId::Timer) => {
            app.timer_screen.borrow_mut().decrease();
        }
        Action::StartTimer if current == Some(ScreenId::Timer) => {
            let started = app.timer_screen.borrow_mut().start();
            if started {
                let result = app.router.go_back();
                report(app, result);
            } else {
                app.status_message = String::from("Timer is already running");
            }
        }
        Action::Back => {
            if current == Some(app.router.root()) {
                return Effect::Quit;
            }
            let result = app.router.go_back();
            report(app, result);
        }
        Action::ToggleHelp => {
            let result = if current == Some(ScreenId::Help) {
                app.router.go_back()
            } else {
                app.router.switch_to(ScreenId::Help, SwitchMode::Additive, false)
            };
            report(app, result);
        }
        Action::Suspend => app.suspend(),
        Action::Resume => app.resume(),
        Action::Quit => return Effect::Quit,
        _ => debug!("{:?} ignored on {:?}", action, current),
    }
    Effect::None
}

fn report(app: &mut App, result: Result<(), RouterError>) {
    if let Err(e) = result {
        warn!("Navigation failed: {e}");
        app.status_message = format!("Error: {e}");
    }
}
