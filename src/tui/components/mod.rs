//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! Every component here is stateless: it receives all data as props (struct
//! fields) built fresh each frame from the screens' own state, and renders
//! into the `Rect` it is given.
//!
//! - `TitleBar`: top status bar showing screen, clock and status
//! - `SlotList`: the main screen's slot rows
//! - `Countdown`: the timer screen's remaining time
//! - `HelpOverlay`: key bindings popup
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status bar)
//! ├── slot_list.rs     (Main screen body)
//! ├── countdown.rs     (Timer screen body)
//! └── help_overlay.rs  (Help popup)
//! ```

mod countdown;
mod help_overlay;
mod slot_list;
mod title_bar;

pub use countdown::Countdown;
pub use help_overlay::HelpOverlay;
pub use slot_list::{SlotList, SlotRow, SlotStatus};
pub use title_bar::TitleBar;
