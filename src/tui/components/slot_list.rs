//! # SlotList Component
//!
//! The main screen's body: one row per timer slot, with the selected row
//! highlighted.
//!
//! ```text
//! ┌ Timers ──────────────────────────┐
//! │▶ Timer 1   00:05.0               │
//! │  Timer 2   00:03.2  running      │
//! │  Timer 3   00:05.0  done!        │
//! └──────────────────────────────────┘
//! ```

use crate::tui::component::Component;
use crate::tui::components::countdown::format_seconds;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, List, ListItem, ListState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Idle,
    Running,
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotRow {
    pub slot: usize,
    pub seconds: f64,
    pub status: SlotStatus,
}

pub struct SlotList {
    pub rows: Vec<SlotRow>,
    pub selected: usize,
    pub can_add: bool,
    pub can_remove: bool,
}

impl SlotList {
    fn item(row: &SlotRow) -> ListItem<'static> {
        let (tag, style) = match row.status {
            SlotStatus::Idle => ("", Style::default()),
            SlotStatus::Running => ("running", Style::default().fg(Color::Green)),
            SlotStatus::Done => (
                "done!",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        };
        ListItem::new(Line::from(vec![
            Span::raw(format!("Timer {:<3} ", row.slot + 1)),
            Span::raw(format!("{}  ", format_seconds(row.seconds))),
            Span::styled(tag, style),
        ]))
    }

    fn footer(&self) -> String {
        let mut keys = vec!["Enter open"];
        if self.can_add {
            keys.push("+ add");
        }
        if self.can_remove {
            keys.push("- remove");
        }
        keys.push("? help");
        keys.push("Esc quit");
        format!(" {} ", keys.join("  "))
    }
}

impl Component for SlotList {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self.rows.iter().map(Self::item).collect();
        let list = List::new(items)
            .block(
                Block::bordered()
                    .title(" Timers ")
                    .title_bottom(Line::from(self.footer()).style(Style::default().add_modifier(Modifier::DIM))),
            )
            .highlight_symbol("▶ ")
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        if !self.rows.is_empty() {
            state.select(Some(self.selected.min(self.rows.len() - 1)));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rows() -> Vec<SlotRow> {
        vec![
            SlotRow { slot: 0, seconds: 5.0, status: SlotStatus::Idle },
            SlotRow { slot: 1, seconds: 3.2, status: SlotStatus::Running },
            SlotRow { slot: 2, seconds: 0.0, status: SlotStatus::Done },
        ]
    }

    fn rendered(list: &mut SlotList) -> Vec<String> {
        let backend = TestBackend::new(50, 7);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                list.render(f, area);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn test_rows_and_selection() {
        let mut list = SlotList { rows: rows(), selected: 1, can_add: true, can_remove: false };
        let lines = rendered(&mut list);

        assert!(lines[1].contains("Timer 1") && lines[1].contains("00:05.0"));
        assert!(lines[2].contains("▶") && lines[2].contains("running"));
        assert!(lines[3].contains("done!"));
        assert!(!lines[1].contains("▶"));
    }

    #[test]
    fn test_footer_follows_limits() {
        let mut list = SlotList { rows: rows(), selected: 0, can_add: false, can_remove: true };
        let lines = rendered(&mut list);
        let footer = lines.last().unwrap();

        assert!(footer.contains("- remove"));
        assert!(!footer.contains("+ add"));
    }

    #[test]
    fn test_empty_list_renders() {
        let mut list = SlotList { rows: Vec::new(), selected: 3, can_add: true, can_remove: true };
        let lines = rendered(&mut list);
        assert!(lines[0].contains("Timers"));
    }
}
