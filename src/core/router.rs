//! # Screen Router
//!
//! The navigation state machine. Keeps the history of open screens as a stack
//! of frames plus, per screen, a FIFO of switch requests deferred until that
//! screen becomes current.
//!
//! ```text
//!   stack (bottom = root)          deferred
//!   ┌──────────────────────┐       Main  → [Timer{slot: 2}]
//!   │ Help   (Additive)    │ ◄─ current
//!   │ Timer  (Replacing)   │       Timer → []
//!   │ Main   (Replacing)   │
//!   └──────────────────────┘
//! ```
//!
//! Every failure (unknown screen, duplicate registration, mismatched
//! unregister) is logged and leaves the router untouched. The returned
//! `Result` only tells the caller what happened; ignoring it is always safe.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::core::screen::{ScreenError, ScreenId, ScreenPayload, SharedScreen, SwitchMode};

#[derive(Debug, Clone, PartialEq)]
pub enum RouterError {
    UnknownScreen(ScreenId),
    AlreadyRegistered(ScreenId),
    NotRegistered(ScreenId),
    /// The screen was shown but refused its payload; its frame was discarded.
    Rejected(ScreenError),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::UnknownScreen(id) => write!(f, "no screen registered as {id}"),
            RouterError::AlreadyRegistered(id) => write!(f, "screen {id} is already registered"),
            RouterError::NotRegistered(id) => {
                write!(f, "screen {id} is not registered to this handler")
            }
            RouterError::Rejected(e) => write!(f, "screen rejected payload: {e}"),
        }
    }
}

impl std::error::Error for RouterError {}

/// One entry of the navigation history.
struct Frame {
    screen: ScreenId,
    handler: SharedScreen,
    mode: SwitchMode,
    // Replayed when the frame is re-shown after a Replacing frame above it pops.
    payload: ScreenPayload,
}

struct DeferredRequest {
    payload: ScreenPayload,
    handler: SharedScreen,
    mode: SwitchMode,
}

type ChangeListener = Box<dyn FnMut(ScreenId)>;

pub struct ScreenRouter {
    root: ScreenId,
    handlers: HashMap<ScreenId, SharedScreen>,
    stack: Vec<Frame>,
    deferred: HashMap<ScreenId, VecDeque<DeferredRequest>>,
    listeners: Vec<ChangeListener>,
}

impl ScreenRouter {
    /// `root` is where `go_back` lands when there is nothing to go back to.
    pub fn new(root: ScreenId) -> Self {
        Self {
            root,
            handlers: HashMap::new(),
            stack: Vec::new(),
            deferred: HashMap::new(),
            listeners: Vec::new(),
        }
    }

    pub fn root(&self) -> ScreenId {
        self.root
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Registers `handler` as `id`. A second registration never replaces the first.
    pub fn register_handler(&mut self, id: ScreenId, handler: SharedScreen) -> Result<(), RouterError> {
        if self.handlers.contains_key(&id) {
            warn!("Screen {id} already registered, ignoring");
            return Err(RouterError::AlreadyRegistered(id));
        }
        self.handlers.insert(id, handler);
        debug!("Registered screen {id}");
        Ok(())
    }

    /// Removes `id` only if it is registered to this exact handler.
    pub fn unregister_handler(&mut self, id: ScreenId, handler: &SharedScreen) -> Result<(), RouterError> {
        match self.handlers.get(&id) {
            Some(existing) if Rc::ptr_eq(existing, handler) => {
                self.handlers.remove(&id);
                debug!("Unregistered screen {id}");
                Ok(())
            }
            _ => {
                warn!("Screen {id} is not registered to this handler, ignoring");
                Err(RouterError::NotRegistered(id))
            }
        }
    }

    pub fn is_registered(&self, id: ScreenId) -> bool {
        self.handlers.contains_key(&id)
    }

    /// Subscribe to "current screen changed". Fires once per successful switch or back.
    pub fn on_screen_changed(&mut self, listener: impl FnMut(ScreenId) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Switches to the screen named by `payload`.
    ///
    /// With `reset_history` the stack is cleared first, but the screen that
    /// was current is still hidden when `mode` is Replacing.
    pub fn switch_to(
        &mut self,
        payload: impl Into<ScreenPayload>,
        mode: SwitchMode,
        reset_history: bool,
    ) -> Result<(), RouterError> {
        let payload = payload.into();
        let target = payload.target();
        let Some(handler) = self.handlers.get(&target).cloned() else {
            warn!("Can't switch to {target}: no screen registered");
            return Err(RouterError::UnknownScreen(target));
        };
        self.apply_switch(handler, payload, mode, reset_history)
    }

    fn apply_switch(
        &mut self,
        handler: SharedScreen,
        payload: ScreenPayload,
        mode: SwitchMode,
        reset_history: bool,
    ) -> Result<(), RouterError> {
        let target = payload.target();
        let previous = self.stack.last().map(|f| (f.screen, Rc::clone(&f.handler)));

        if reset_history {
            self.stack.clear();
        }

        if let Some((_, current)) = &previous
            && mode == SwitchMode::Replacing
        {
            current.borrow_mut().on_hide();
        }

        self.stack.push(Frame {
            screen: target,
            handler: Rc::clone(&handler),
            mode,
            payload: payload.clone(),
        });

        let shown = handler.borrow_mut().on_show(&payload);

        let from = previous.map_or("<root>", |(id, _)| id.label());
        info!("Screen switched from {from} to {target} ({mode:?})");
        self.notify(target);

        if let Err(e) = shown {
            warn!("{e}");
            if target != self.root {
                self.discard_rejected();
            }
            return Err(RouterError::Rejected(e));
        }

        self.drain(target);
        Ok(())
    }

    /// Pops the frame whose screen just refused its payload, so it can never
    /// resurface from the history. Lands on the frame below, or on the root
    /// when nothing is left.
    fn discard_rejected(&mut self) {
        let Some(rejected) = self.stack.pop() else {
            return;
        };
        rejected.handler.borrow_mut().on_hide();

        let Some(top) = self.stack.last() else {
            warn!("{} rejected with no history, returning to {}", rejected.screen, self.root);
            let _ = self.switch_to(self.root, SwitchMode::Replacing, false);
            return;
        };
        let (target, handler, payload) = (top.screen, Rc::clone(&top.handler), top.payload.clone());

        if rejected.mode == SwitchMode::Replacing
            && let Err(e) = handler.borrow_mut().on_show(&payload)
        {
            warn!("{e} on re-show");
        }

        info!("Screen {} rejected, back on {target}", rejected.screen);
        self.notify(target);
        self.drain(target);
    }

    /// Pops the current frame. With one frame or none, switches to the root instead.
    pub fn go_back(&mut self) -> Result<(), RouterError> {
        if self.stack.len() <= 1 {
            warn!("Nothing to go back to, returning to {}", self.root);
            return self.switch_to(self.root, SwitchMode::Replacing, false);
        }

        let Some(popped) = self.stack.pop() else {
            return Ok(());
        };
        popped.handler.borrow_mut().on_hide();

        let Some(top) = self.stack.last() else {
            return Ok(());
        };
        let (target, handler, payload) = (top.screen, Rc::clone(&top.handler), top.payload.clone());

        // An Additive frame never hid the one below it.
        if popped.mode == SwitchMode::Replacing
            && let Err(e) = handler.borrow_mut().on_show(&payload)
        {
            warn!("{e} on re-show");
        }

        info!("Screen switched back from {} to {target}", popped.screen);
        self.notify(target);
        self.drain(target);
        Ok(())
    }

    /// Clears the navigation history. Deferred requests are kept.
    pub fn reset(&mut self) {
        self.stack.clear();
    }

    // ------------------------------------------------------------------
    // Deferred requests
    // ------------------------------------------------------------------

    /// Queues a switch to `payload`'s screen for when `after` becomes current.
    /// Applied immediately if `after` is already current.
    pub fn request_after(
        &mut self,
        payload: impl Into<ScreenPayload>,
        after: ScreenId,
        mode: SwitchMode,
    ) -> Result<(), RouterError> {
        let payload = payload.into();
        let target = payload.target();
        let Some(handler) = self.handlers.get(&target).cloned() else {
            warn!("Can't request {target}: no screen registered");
            return Err(RouterError::UnknownScreen(target));
        };

        self.deferred.entry(after).or_default().push_back(DeferredRequest {
            payload,
            handler,
            mode,
        });
        debug!("Screen {target} queued after {after}");

        self.drain(after);
        Ok(())
    }

    /// Applies the oldest request queued against `id` if `id` is current.
    /// Returns whether a request was applied.
    pub fn drain(&mut self, id: ScreenId) -> bool {
        if self.current() != Some(id) {
            return false;
        }

        while let Some(request) = self.deferred.get_mut(&id).and_then(VecDeque::pop_front) {
            let target = request.payload.target();
            let still_registered = self
                .handlers
                .get(&target)
                .is_some_and(|h| Rc::ptr_eq(h, &request.handler));
            if !still_registered {
                warn!("Dropping request for {target} queued after {id}: screen was unregistered");
                continue;
            }

            info!("Applying request for {target} queued after {id}");
            let _ = self.apply_switch(request.handler, request.payload, request.mode, false);
            return true;
        }
        false
    }

    pub fn has_pending_after(&self, id: ScreenId) -> bool {
        self.deferred.get(&id).is_some_and(|q| !q.is_empty())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn current(&self) -> Option<ScreenId> {
        self.stack.last().map(|f| f.screen)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Screen ids from bottom (root) to top.
    pub fn history(&self) -> Vec<ScreenId> {
        self.stack.iter().map(|f| f.screen).collect()
    }

    /// Screens currently on display, bottom to top: the current screen plus
    /// everything beneath it reachable through Additive frames.
    pub fn visible(&self) -> Vec<ScreenId> {
        let mut visible = Vec::new();
        for frame in self.stack.iter().rev() {
            visible.push(frame.screen);
            if frame.mode == SwitchMode::Replacing {
                break;
            }
        }
        visible.reverse();
        visible
    }

    fn notify(&mut self, id: ScreenId) {
        for listener in &mut self.listeners {
            listener(id);
        }
    }
}
