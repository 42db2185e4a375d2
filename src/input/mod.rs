pub mod hotkeys;
pub mod keyboard;

pub use hotkeys::{DEFAULT_BINDINGS, HotkeyAction, action_for};
#[cfg(windows)]
pub use hotkeys::ThreadHotkeys;
pub use keyboard::{InputSnapshot, InputSource};
#[cfg(windows)]
pub use keyboard::AsyncKeyStateSource;
