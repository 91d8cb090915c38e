//! # TitleBar Component
//!
//! Top status bar showing where the user is and what just happened.
//!
//! ## Responsibilities
//!
//! - Display the current screen
//! - Display the clock mode, with a marker while the clock is suspended
//! - Display status messages (e.g., "Timer 2 finished!")
//!
//! ## Design Decisions
//!
//! ### Stateless Component
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar {
//!     screen: "Main".to_string(),
//!     clock: "logical".to_string(),
//!     suspended: false,
//!     status_message: "Added Timer 4".to_string(),
//! };
//! title_bar.render(frame, area);
//! ```
//!
//! ### Truncation
//!
//! The bar is one line. When the text is wider than the area, the status
//! message is cut at a character boundary by display width, so wide glyphs
//! never straddle the edge.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub struct TitleBar {
    /// Label of the current screen (e.g., "Main")
    pub screen: String,
    /// Clock mode label (e.g., "logical")
    pub clock: String,
    /// Whether logical time is frozen
    pub suspended: bool,
    /// Status message (e.g., "Timer 2 finished!")
    pub status_message: String,
}

impl TitleBar {
    pub fn new(screen: String, clock: String, suspended: bool, status_message: String) -> Self {
        Self {
            screen,
            clock,
            suspended,
            status_message,
        }
    }

    fn text(&self) -> String {
        let clock = if self.suspended {
            format!("{} ⏸", self.clock)
        } else {
            self.clock.clone()
        };
        if self.status_message.is_empty() {
            format!("tickr [{}] (clock: {})", self.screen, clock)
        } else {
            format!("tickr [{}] (clock: {}) | {}", self.screen, clock, self.status_message)
        }
    }
}

/// Cuts `text` to at most `max_width` display columns.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        out.push(c);
    }
    out
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let text = truncate_to_width(&self.text(), area.width as usize);
        frame.render_widget(
            Span::styled(text, Style::default().add_modifier(Modifier::BOLD)),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(title_bar: &mut TitleBar, width: u16) -> String {
        let backend = TestBackend::new(width, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_title_bar_with_status_message() {
        let mut title_bar = TitleBar::new(
            "Timer".to_string(),
            "logical".to_string(),
            false,
            "Timer 2 finished!".to_string(),
        );
        let text = rendered(&mut title_bar, 80);

        assert!(text.contains("tickr [Timer]"));
        assert!(text.contains("clock: logical"));
        assert!(text.contains("| Timer 2 finished!"));
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar = TitleBar::new("Main".to_string(), "real".to_string(), false, String::new());
        let text = rendered(&mut title_bar, 80);

        assert!(text.contains("tickr [Main]"));
        assert!(!text.contains('|'));
        assert!(!text.contains('⏸'));
    }

    #[test]
    fn test_title_bar_shows_suspension() {
        let mut title_bar = TitleBar::new("Main".to_string(), "logical".to_string(), true, String::new());
        let text = rendered(&mut title_bar, 80);
        assert!(text.contains('⏸'));
    }

    #[test]
    fn test_truncate_to_width_respects_wide_chars() {
        assert_eq!(truncate_to_width("abc", 10), "abc");
        assert_eq!(truncate_to_width("abcdef", 4), "abcd");
        assert_eq!(truncate_to_width("日本語", 5), "日本");
        assert_eq!(truncate_to_width("", 0), "");
    }
}
