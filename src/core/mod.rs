//! # Core
//!
//! Navigation and time accounting, plus the app state that ties them
//! together. Knows nothing about terminals or input devices.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • ScreenRouter         │
//!                    │  • TimerRegistry/Timer  │
//!                    │  • EventBus             │
//!                    │  • Clock                │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │  Screens   │      │    TUI     │      │   Tests    │
//!     │ (screens/) │      │  (tui/)    │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`clock`]: real and logical time sources
//! - [`timer`]: one countdown state machine
//! - [`registry`]: owns live timers, advances them per tick
//! - [`bus`]: topic-keyed publish/subscribe
//! - [`screen`]: screen ids, payloads and the `Screen` trait
//! - [`router`]: navigation stack and deferred requests
//! - [`realtime`]: tokio-backed countdown adapter
//! - [`config`]: settings file and override resolution
//! - [`store`]: JSON slot persistence used by screens
//! - [`state`]: the `App` composition root wiring the above to the screens
//! - [`action`]: `Action` values and the `update()` reducer

pub mod action;
pub mod bus;
pub mod clock;
pub mod config;
pub mod realtime;
pub mod registry;
pub mod router;
pub mod screen;
pub mod state;
pub mod store;
pub mod timer;
