//! # Countdown Component
//!
//! The timer screen's body: one slot's remaining time, large and centered,
//! plus the keys that apply right now.
//!
//! While the countdown runs the duration keys are hidden, since the screen
//! ignores them until the timer finishes.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

pub struct Countdown {
    pub slot: usize,
    pub remaining: f64,
    pub running: bool,
}

/// Formats seconds as `HH:MM:SS.t`, dropping the hours when zero.
pub fn format_seconds(secs: f64) -> String {
    let tenths = (secs.max(0.0) * 10.0).round() as u64;
    let (whole, tenth) = (tenths / 10, tenths % 10);
    let (hours, minutes, seconds) = (whole / 3600, (whole / 60) % 60, whole % 60);
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{tenth}")
    } else {
        format!("{minutes:02}:{seconds:02}.{tenth}")
    }
}

impl Component for Countdown {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered().title(format!(" Timer {} ", self.slot + 1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [_, time_area, state_area, _, hint_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let time_style = if self.running {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        frame.render_widget(
            Paragraph::new(Line::styled(format_seconds(self.remaining), time_style))
                .alignment(Alignment::Center),
            time_area,
        );

        let state = if self.running { "running" } else { "stopped" };
        frame.render_widget(
            Paragraph::new(Line::styled(state, Style::default().add_modifier(Modifier::DIM)))
                .alignment(Alignment::Center),
            state_area,
        );

        let hint = if self.running {
            "Esc back"
        } else {
            "↑/+ more  ↓/- less  Enter start  Esc back"
        };
        frame.render_widget(
            Paragraph::new(hint)
                .style(Style::default().add_modifier(Modifier::DIM))
                .alignment(Alignment::Center),
            hint_area,
        );
    }
}
