//! Single-instance guard
//!
//! Two snappers polling the same desktop would fight over every icon, so
//! a named mutex marks the running instance for the whole session.

use windows::Win32::Foundation::{CloseHandle, ERROR_ALREADY_EXISTS, GetLastError, HANDLE};
use windows::Win32::System::Threading::CreateMutexW;
use windows::core::w;

/// Held for as long as this process is the running instance
pub struct SingleInstance {
    handle: HANDLE,
}

impl SingleInstance {
    /// Claims the instance mutex; `Ok(None)` if another instance holds it
    pub fn acquire() -> windows::core::Result<Option<Self>> {
        let handle = unsafe { CreateMutexW(None, true, w!("Local\\DesktopGridSnapper.Instance"))? };

        if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
            unsafe {
                CloseHandle(handle).ok();
            }
            return Ok(None);
        }

        Ok(Some(Self { handle }))
    }
}

impl Drop for SingleInstance {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.handle).ok();
        }
    }
}
