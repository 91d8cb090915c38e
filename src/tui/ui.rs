use crate::core::screen::ScreenId;
use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{Countdown, HelpOverlay, SlotList, SlotRow, SlotStatus, TitleBar};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

/// Draws the title bar, then every visible screen bottom to top, so an
/// additive frame lands over the screen it was opened on.
pub fn draw_ui(frame: &mut Frame, app: &App) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0)]);
    let [title_area, body_area] = layout.areas(frame.area());

    let screen = app.router.current().map_or("-", |id| id.label());
    let mut title_bar = TitleBar::new(
        screen.to_string(),
        app.config.clock.label().to_string(),
        app.clock.is_suspended(),
        app.status_message.clone(),
    );
    title_bar.render(frame, title_area);

    for id in app.router.visible() {
        match id {
            ScreenId::Main => draw_main(frame, body_area, app),
            ScreenId::Timer => draw_timer(frame, body_area, app),
            ScreenId::Help => HelpOverlay.render(frame, body_area),
        }
    }
}

fn draw_main(frame: &mut Frame, area: Rect, app: &App) {
    let main = app.main_screen.borrow();
    let timers = app.timer_screen.borrow();

    let rows = main
        .data()
        .timers
        .iter()
        .map(|(&slot, saved)| {
            let (seconds, status) = match timers.remaining(slot) {
                Some(left) => (left, SlotStatus::Running),
                None if main.is_completed(slot) => (0.0, SlotStatus::Done),
                None => (saved.left_time, SlotStatus::Idle),
            };
            SlotRow { slot, seconds, status }
        })
        .collect();

    let mut list = SlotList {
        rows,
        selected: main.selected(),
        can_add: main.can_add(),
        can_remove: main.can_remove(),
    };
    list.render(frame, area);
}

fn draw_timer(frame: &mut Frame, area: Rect, app: &App) {
    let timers = app.timer_screen.borrow();
    let Some(slot) = timers.current_slot() else {
        return;
    };
    let mut countdown = Countdown {
        slot,
        remaining: timers.display_remaining(),
        running: timers.is_running(),
    };
    countdown.render(frame, area);
}
