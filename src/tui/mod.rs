//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Loop
//!
//! Every iteration draws once, then waits for input no longer than what is
//! left of the current tick interval. All queued input is drained before the
//! next draw. When the interval has elapsed, `Action::Tick` advances the
//! timer registry.
//!
//! Focus reporting is enabled so that losing focus suspends the clock
//! (logical timers freeze) and regaining it resumes.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, error, info};
use std::io::stdout;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{DisableFocusChange, EnableFocusChange};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::core::action::{Action, Effect, update};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::ResolvedConfig;
use crate::core::screen::ScreenId;
use crate::core::state::App;
use crate::core::store::{JsonSlotStore, SlotStore};
use crate::screens::{SAVE_NAME, TimersSaveData};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableFocusChange)?;
        info!("Terminal modes enabled (focus change)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableFocusChange);
    }
}

/// Maps an input event to an action, given the current screen.
pub fn map_event(current: Option<ScreenId>, event: TuiEvent) -> Option<Action> {
    // Anywhere
    match event {
        TuiEvent::ForceQuit | TuiEvent::Char('q') => return Some(Action::Quit),
        TuiEvent::Escape => return Some(Action::Back),
        TuiEvent::Char('?') => return Some(Action::ToggleHelp),
        TuiEvent::FocusLost => return Some(Action::Suspend),
        TuiEvent::FocusGained => return Some(Action::Resume),
        TuiEvent::Resize => return None,
        _ => {}
    }

    match current? {
        ScreenId::Main => match event {
            TuiEvent::Up | TuiEvent::Char('k') => Some(Action::SelectPrevious),
            TuiEvent::Down | TuiEvent::Char('j') => Some(Action::SelectNext),
            TuiEvent::Enter => Some(Action::OpenSelected),
            TuiEvent::Char('+') | TuiEvent::Char('a') => Some(Action::AddSlot),
            TuiEvent::Char('-') | TuiEvent::Char('d') => Some(Action::RemoveSlot),
            _ => None,
        },
        ScreenId::Timer => match event {
            TuiEvent::Up | TuiEvent::Right | TuiEvent::Char('+') => Some(Action::IncreaseDuration),
            TuiEvent::Down | TuiEvent::Left | TuiEvent::Char('-') => Some(Action::DecreaseDuration),
            TuiEvent::Enter | TuiEvent::Char('s') => Some(Action::StartTimer),
            _ => None,
        },
        ScreenId::Help => None,
    }
}

pub fn run(config: ResolvedConfig, open_slot: Option<usize>) -> std::io::Result<()> {
    let clock: Rc<dyn Clock> = Rc::new(SystemClock::new());
    let store: Rc<dyn SlotStore<TimersSaveData>> =
        Rc::new(JsonSlotStore::new(&config.data_dir, SAVE_NAME));
    let tick = Duration::from_millis(config.tick_ms);

    let mut app = App::new(config, clock, store);
    app.start(open_slot);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let loop_result = event_loop(&mut terminal, &mut app, tick);
    let result = shutdown(&app, loop_result);

    ratatui::restore();
    result
}

/// Saves the slots however the loop ended, then hands back its result.
fn shutdown(app: &App, result: std::io::Result<()>) -> std::io::Result<()> {
    if let Err(e) = &result {
        error!("Terminal error, shutting down: {e}");
    }
    app.save();
    result
}

/// Draws and dispatches until a quit action or a terminal error.
fn event_loop(terminal: &mut DefaultTerminal, app: &mut App, tick: Duration) -> std::io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw_ui(f, app))?;

        let timeout = tick.saturating_sub(last_tick.elapsed());
        let first_event = poll_event_timeout(timeout);

        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let Some(action) = map_event(app.router.current(), event) else {
                continue;
            };
            if update(app, action) == Effect::Quit {
                debug!("Quit requested by {:?}", action);
                return Ok(());
            }
        }

        if last_tick.elapsed() >= tick {
            update(app, Action::Tick);
            last_tick = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_keys_work_everywhere() {
        for current in [None, Some(ScreenId::Main), Some(ScreenId::Timer), Some(ScreenId::Help)] {
            assert_eq!(map_event(current, TuiEvent::Escape), Some(Action::Back));
            assert_eq!(map_event(current, TuiEvent::Char('?')), Some(Action::ToggleHelp));
            assert_eq!(map_event(current, TuiEvent::ForceQuit), Some(Action::Quit));
            assert_eq!(map_event(current, TuiEvent::FocusLost), Some(Action::Suspend));
            assert_eq!(map_event(current, TuiEvent::Resize), None);
        }
    }

    #[test]
    fn test_arrows_depend_on_screen() {
        assert_eq!(map_event(Some(ScreenId::Main), TuiEvent::Up), Some(Action::SelectPrevious));
        assert_eq!(map_event(Some(ScreenId::Timer), TuiEvent::Up), Some(Action::IncreaseDuration));
        assert_eq!(map_event(Some(ScreenId::Help), TuiEvent::Up), None);
        assert_eq!(map_event(None, TuiEvent::Enter), None);
    }

    #[test]
    fn test_shutdown_saves_even_after_terminal_error() {
        use crate::core::screen::{Screen, ScreenPayload};
        use crate::test_support::test_app;

        let (mut app, clock) = test_app();
        app.start(Some(0));
        update(&mut app, Action::StartTimer);
        clock.advance(2.0);
        update(&mut app, Action::Tick);

        let failed = Err(std::io::Error::other("draw failed"));
        let result = shutdown(&app, failed);
        assert_eq!(result.unwrap_err().to_string(), "draw failed");

        // Main reloads the record from the store when shown.
        let mut main = app.main_screen.borrow_mut();
        main.on_show(&ScreenPayload::Empty(ScreenId::Main)).unwrap();
        assert_eq!(main.data().left_time(0), Some(3.0));
    }

    #[test]
    fn test_enter_opens_or_starts() {
        assert_eq!(map_event(Some(ScreenId::Main), TuiEvent::Enter), Some(Action::OpenSelected));
        assert_eq!(map_event(Some(ScreenId::Timer), TuiEvent::Enter), Some(Action::StartTimer));
    }
}
