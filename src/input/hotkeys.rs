//! Global hotkey registration and handling
//!
//! Hotkeys are registered against the UI thread itself (no window), so
//! `WM_HOTKEY` arrives in the same message loop that drives the snap
//! timer. Registration follows RAII: dropping [`ThreadHotkeys`]
//! unregisters everything it registered.

/// Modifier keys for hotkey combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyModifier {
    Alt = 1,
    Control = 2,
    Shift = 4,
    Windows = 8,
}

/// Things a global hotkey can ask the application to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    /// Show or hide every grid overlay
    ToggleGrid,
    /// Re-read the settings file and re-apply it
    ReloadSettings,
    /// Save settings and leave the message loop
    Quit,
}

/// A hotkey combination bound to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub id: i32,
    pub modifiers: &'static [HotkeyModifier],
    pub key: u32,
    pub action: HotkeyAction,
}

impl HotkeyBinding {
    /// Combined `MOD_*` mask for registration
    pub fn modifier_mask(&self) -> u32 {
        self.modifiers
            .iter()
            .fold(0u32, |acc, &modifier| acc | modifier as u32)
    }
}

/// Bindings registered at startup
pub const DEFAULT_BINDINGS: &[HotkeyBinding] = &[
    HotkeyBinding {
        id: 1,
        modifiers: &[HotkeyModifier::Control, HotkeyModifier::Alt],
        key: 0x47, // G
        action: HotkeyAction::ToggleGrid,
    },
    HotkeyBinding {
        id: 2,
        modifiers: &[HotkeyModifier::Control, HotkeyModifier::Alt],
        key: 0x52, // R
        action: HotkeyAction::ReloadSettings,
    },
    HotkeyBinding {
        id: 3,
        modifiers: &[HotkeyModifier::Control, HotkeyModifier::Alt],
        key: 0x51, // Q
        action: HotkeyAction::Quit,
    },
];

/// Resolves a `WM_HOTKEY` id to its action
pub fn action_for(bindings: &[HotkeyBinding], id: i32) -> Option<HotkeyAction> {
    bindings.iter().find(|b| b.id == id).map(|b| b.action)
}

/// Hotkey registration errors
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("Failed to register hotkey {id}: {reason}")]
    RegistrationFailed { id: i32, reason: String },
}

#[cfg(windows)]
pub use self::win32::ThreadHotkeys;

#[cfg(windows)]
mod win32 {
    use super::{HotkeyBinding, HotkeyError};
    use log::{debug, warn};
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        HOT_KEY_MODIFIERS, MOD_NOREPEAT, RegisterHotKey, UnregisterHotKey,
    };

    /// Hotkeys registered against the calling thread's message queue
    pub struct ThreadHotkeys {
        registered: Vec<i32>,
    }

    impl ThreadHotkeys {
        /// Registers every binding it can
        ///
        /// A combination already taken by another program is logged and
        /// skipped; the remaining bindings still work.
        pub fn register(bindings: &[HotkeyBinding]) -> Self {
            let mut registered = Vec::with_capacity(bindings.len());

            for binding in bindings {
                match Self::register_one(binding) {
                    Ok(()) => {
                        debug!("Registered hotkey {} for {:?}", binding.id, binding.action);
                        registered.push(binding.id);
                    }
                    Err(e) => warn!("{e}"),
                }
            }

            Self { registered }
        }

        fn register_one(binding: &HotkeyBinding) -> Result<(), HotkeyError> {
            let modifiers = HOT_KEY_MODIFIERS(binding.modifier_mask()) | MOD_NOREPEAT;
            unsafe { RegisterHotKey(HWND(0), binding.id, modifiers, binding.key) }.map_err(|e| {
                HotkeyError::RegistrationFailed {
                    id: binding.id,
                    reason: e.message().to_string(),
                }
            })
        }

        /// Number of bindings that were registered successfully
        pub fn count(&self) -> usize {
            self.registered.len()
        }
    }

    impl Drop for ThreadHotkeys {
        fn drop(&mut self) {
            for id in self.registered.drain(..) {
                unsafe {
                    let _ = UnregisterHotKey(HWND(0), id);
                }
            }
        }
    }
}
