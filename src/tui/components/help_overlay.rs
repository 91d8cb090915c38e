//! # HelpOverlay Component
//!
//! Centered popup listing the key bindings. Drawn last, over whatever the
//! help frame was opened on top of, so it clears its own area first.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

const BINDINGS: [(&str, &str); 9] = [
    ("↑ ↓", "select slot / change duration"),
    ("Enter", "open slot / start timer"),
    ("+ -", "add / remove slot"),
    ("← →", "change duration"),
    ("?", "toggle this help"),
    ("Esc", "back (quit on the main screen)"),
    ("q", "quit"),
    ("Ctrl+C", "force quit"),
    ("", "Timers keep running in the background."),
];

pub struct HelpOverlay;

/// A `width` x `height` rect centered in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

impl Component for HelpOverlay {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = BINDINGS
            .iter()
            .map(|(key, what)| {
                Line::from(vec![
                    Span::styled(format!("{key:>8}  "), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(*what),
                ])
            })
            .collect();

        let popup = centered(area, 52, lines.len() as u16 + 2);
        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(Block::bordered().title(" Help ")), popup);
    }
}
