//! Key binding overlay. Opened additively, so the screen underneath stays
//! shown while it is up.

use log::debug;

use crate::core::screen::{Screen, ScreenError, ScreenId, ScreenPayload};

#[derive(Debug, Default)]
pub struct HelpScreen {
    visible: bool,
    shown: usize,
}

impl HelpScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// How many times the overlay has been opened.
    pub fn times_shown(&self) -> usize {
        self.shown
    }
}

impl Screen for HelpScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Help
    }

    fn on_show(&mut self, _payload: &ScreenPayload) -> Result<(), ScreenError> {
        self.visible = true;
        self.shown += 1;
        debug!("Help shown");
        Ok(())
    }

    fn on_hide(&mut self) {
        self.visible = false;
    }
}
