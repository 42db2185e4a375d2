//! Global keyboard and mouse sampling
//!
//! The hardware only reports "this key is down right now". This module
//! captures that level-triggered state once per tick as an [`InputSnapshot`];
//! turning it into edge-triggered gestures is the job of
//! [`GestureState`](crate::app::state::GestureState).

/// Virtual key codes polled every tick
pub mod vk {
    pub const LBUTTON: i32 = 0x01;
    pub const MENU: i32 = 0x12; // Alt
    pub const LEFT: i32 = 0x25;
    pub const UP: i32 = 0x26;
    pub const RIGHT: i32 = 0x27;
    pub const DOWN: i32 = 0x28;
}

/// Level-triggered input state for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    pub alt: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub primary_button: bool,
}

impl InputSnapshot {
    /// Returns true if any of the four arrow keys is down
    pub fn any_arrow(&self) -> bool {
        self.left || self.right || self.up || self.down
    }

    /// Column/row delta requested by the arrow keys held this tick
    ///
    /// Opposite keys cancel out; perpendicular keys combine diagonally.
    pub fn arrow_delta(&self) -> (i32, i32) {
        let dx = i32::from(self.right) - i32::from(self.left);
        let dy = i32::from(self.down) - i32::from(self.up);
        (dx, dy)
    }
}

/// Something that can sample the current global input state
pub trait InputSource {
    fn sample(&mut self) -> InputSnapshot;
}

#[cfg(windows)]
pub use self::win32::AsyncKeyStateSource;

#[cfg(windows)]
mod win32 {
    use super::{InputSnapshot, InputSource, vk};
    use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

    /// Samples input through `GetAsyncKeyState`
    ///
    /// No hook is installed; the state is read on demand from the UI thread.
    #[derive(Debug, Default)]
    pub struct AsyncKeyStateSource;

    impl AsyncKeyStateSource {
        pub fn new() -> Self {
            Self
        }

        fn is_down(key: i32) -> bool {
            // High bit set means the key is down right now
            let state = unsafe { GetAsyncKeyState(key) };
            (state as u16 & 0x8000) != 0
        }
    }

    impl InputSource for AsyncKeyStateSource {
        fn sample(&mut self) -> InputSnapshot {
            InputSnapshot {
                alt: Self::is_down(vk::MENU),
                left: Self::is_down(vk::LEFT),
                right: Self::is_down(vk::RIGHT),
                up: Self::is_down(vk::UP),
                down: Self::is_down(vk::DOWN),
                primary_button: Self::is_down(vk::LBUTTON),
            }
        }
    }
}
