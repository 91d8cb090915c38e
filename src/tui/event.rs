use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use log::warn;

/// TUI-specific input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiEvent {
    ForceQuit, // Ctrl+C
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Char(char),
    FocusLost,
    FocusGained,
    Resize,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(std::time::Duration::ZERO)
}

pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("Event poll failed: {}", e);
            return None;
        }
    }
    match event::read() {
        Ok(event) => translate(event),
        Err(e) => {
            warn!("Event read failed: {}", e);
            None
        }
    }
}

fn translate(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key_event) => {
            // Key release events arrive on terminals with enhanced reporting
            if key_event.kind == KeyEventKind::Release {
                return None;
            }
            log::debug!("Key event: {:?} with modifiers {:?}", key_event.code, key_event.modifiers);
            match (key_event.modifiers, key_event.code) {
                (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::ForceQuit),
                (_, KeyCode::Char(c)) => Some(TuiEvent::Char(c)),
                (_, KeyCode::Up) => Some(TuiEvent::Up),
                (_, KeyCode::Down) => Some(TuiEvent::Down),
                (_, KeyCode::Left) => Some(TuiEvent::Left),
                (_, KeyCode::Right) => Some(TuiEvent::Right),
                (_, KeyCode::Enter) => Some(TuiEvent::Enter),
                (_, KeyCode::Esc) => Some(TuiEvent::Escape),
                _ => None,
            }
        }
        Event::FocusLost => Some(TuiEvent::FocusLost),
        Event::FocusGained => Some(TuiEvent::FocusGained),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}
