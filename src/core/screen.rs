//! # Screens
//!
//! Types shared by the router and the screen handlers it drives.
//!
//! A screen handler is anything implementing [`Screen`]. The router only ever
//! holds handlers through a `ScreenId → SharedScreen` table; what a screen
//! displays is its own business.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::core::router::{RouterError, ScreenRouter};

/// Stable identifier naming a screen variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScreenId {
    Main,
    Timer,
    Help,
}

impl ScreenId {
    pub const ALL: [ScreenId; 3] = [ScreenId::Main, ScreenId::Timer, ScreenId::Help];

    pub fn label(&self) -> &'static str {
        match self {
            ScreenId::Main => "Main",
            ScreenId::Timer => "Timer",
            ScreenId::Help => "Help",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Data handed to a screen when it is shown. The payload names its target.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenPayload {
    /// No data beyond the target itself.
    Empty(ScreenId),
    /// Open the timer screen on one slot.
    Timer { slot: usize },
}

impl ScreenPayload {
    pub fn target(&self) -> ScreenId {
        match self {
            ScreenPayload::Empty(id) => *id,
            ScreenPayload::Timer { .. } => ScreenId::Timer,
        }
    }
}

impl From<ScreenId> for ScreenPayload {
    fn from(id: ScreenId) -> Self {
        ScreenPayload::Empty(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchMode {
    /// Hide the current screen before showing the new one.
    #[default]
    Replacing,
    /// Show the new screen on top; the current one stays visible.
    Additive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenError {
    UnexpectedPayload {
        screen: ScreenId,
        payload: ScreenPayload,
    },
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenError::UnexpectedPayload { screen, payload } => {
                write!(f, "{screen} screen cannot show payload {payload:?}")
            }
        }
    }
}

impl std::error::Error for ScreenError {}

pub trait Screen {
    fn id(&self) -> ScreenId;

    /// Called after the screen's frame is pushed. Returning an error rejects
    /// the payload; the router then navigates back.
    fn on_show(&mut self, payload: &ScreenPayload) -> Result<(), ScreenError>;

    fn on_hide(&mut self);
}

pub type SharedScreen = Rc<RefCell<dyn Screen>>;

/// Self-registration for shared handlers.
pub trait ScreenRegistration {
    fn register(&self, router: &mut ScreenRouter) -> Result<(), RouterError>;
    fn unregister(&self, router: &mut ScreenRouter) -> Result<(), RouterError>;
}

impl ScreenRegistration for SharedScreen {
    fn register(&self, router: &mut ScreenRouter) -> Result<(), RouterError> {
        let id = self.borrow().id();
        router.register_handler(id, Rc::clone(self))
    }

    fn unregister(&self, router: &mut ScreenRouter) -> Result<(), RouterError> {
        let id = self.borrow().id();
        router.unregister_handler(id, self)
    }
}
