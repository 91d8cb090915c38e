//! # Screens
//!
//! The handlers the router drives. Each owns its own view state; none of
//! them ever calls back into the router. Navigation they want to cause is
//! returned to the caller (see `core::action::update`), and news for other
//! screens goes out on the event bus.
//!
//! ```text
//! screens/
//! ├── main.rs       (slot list, root screen)
//! ├── timer.rs      (one slot's countdown)
//! ├── help.rs       (key binding overlay)
//! └── save_data.rs  (persisted slot record)
//! ```

pub mod help;
pub mod main;
pub mod save_data;
pub mod timer;

pub use help::HelpScreen;
pub use main::MainScreen;
pub use save_data::{SAVE_NAME, TimerSaveData, TimersSaveData};
pub use timer::TimerScreen;
