//! Icon positions inside the shell's list control
//!
//! The desktop list control lives in the shell process. Messages that
//! carry a pointer must point into that process, so every position read or
//! write borrows a small scratch buffer there:
//!
//! 1. open the owning process with VM rights
//! 2. allocate the buffer
//! 3. send the list-view message with the buffer address
//! 4. copy the result across
//!
//! Process handle and buffer are RAII guards scoped to a single call, so
//! every exit path releases both. Nothing is cached: the shell may restart
//! between two calls.

use std::ffi::c_void;
use std::mem::size_of;

use log::trace;
use windows::Win32::Foundation::{CloseHandle, HANDLE, HWND, LPARAM, POINT, WPARAM};
use windows::Win32::System::Diagnostics::Debug::{ReadProcessMemory, WriteProcessMemory};
use windows::Win32::System::Memory::{MEM_COMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_READWRITE, VirtualAllocEx, VirtualFreeEx};
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_ACCESS_RIGHTS, PROCESS_VM_OPERATION, PROCESS_VM_READ, PROCESS_VM_WRITE,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetWindowThreadProcessId, SMTO_ABORTIFHUNG, SMTO_BLOCK, SendMessageTimeoutW,
};

use crate::domain::core::Point;
use crate::domain::icons::{IconHandle, IconPositionAccessor};

const LVM_FIRST: u32 = 0x1000;
const LVM_GETNEXTITEM: u32 = LVM_FIRST + 12;
const LVM_GETITEMPOSITION: u32 = LVM_FIRST + 16;
const LVM_SETITEMPOSITION32: u32 = LVM_FIRST + 49;

const LVNI_FOCUSED: isize = 0x0001;
const LVNI_SELECTED: isize = 0x0002;

/// Upper bound for one list-view message; a hung shell must not stall the tick
pub const MESSAGE_TIMEOUT_MS: u32 = 200;

/// Failure of a single cross-process icon operation
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("icon list window has no owning process")]
    NoOwningProcess,
    #[error("cannot open shell process {pid}: {source}")]
    OpenProcess {
        pid: u32,
        #[source]
        source: windows::core::Error,
    },
    #[error("cannot allocate {size} bytes in shell process {pid}")]
    Allocate { pid: u32, size: usize },
    #[error("cross-process copy failed: {0}")]
    Transfer(#[source] windows::core::Error),
    #[error("icon list did not answer message {msg:#06x}")]
    MessageFailed { msg: u32 },
}

/// Open handle to the process owning a window; closed on drop
struct ForeignProcess {
    handle: HANDLE,
    pid: u32,
}

impl ForeignProcess {
    fn open_owner(window: HWND, access: PROCESS_ACCESS_RIGHTS) -> Result<Self, RemoteError> {
        let mut pid = 0u32;
        unsafe { GetWindowThreadProcessId(window, Some(&mut pid)) };
        if pid == 0 {
            return Err(RemoteError::NoOwningProcess);
        }

        let handle =
            unsafe { OpenProcess(access, false, pid) }.map_err(|source| RemoteError::OpenProcess { pid, source })?;
        Ok(Self { handle, pid })
    }

    fn allocate(&self, size: usize) -> Result<RemoteBuffer<'_>, RemoteError> {
        let address = unsafe { VirtualAllocEx(self.handle, None, size, MEM_COMMIT | MEM_RESERVE, PAGE_READWRITE) };
        if address.is_null() {
            return Err(RemoteError::Allocate { pid: self.pid, size });
        }
        Ok(RemoteBuffer {
            process: self,
            address,
            size,
        })
    }
}

impl Drop for ForeignProcess {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.handle).ok();
        }
    }
}

/// Scratch allocation inside a foreign process; released on drop
struct RemoteBuffer<'a> {
    process: &'a ForeignProcess,
    address: *mut c_void,
    size: usize,
}

impl RemoteBuffer<'_> {
    fn lparam(&self) -> LPARAM {
        LPARAM(self.address as isize)
    }

    fn read_point(&self) -> Result<POINT, RemoteError> {
        let mut point = POINT::default();
        unsafe {
            ReadProcessMemory(
                self.process.handle,
                self.address,
                &mut point as *mut POINT as *mut c_void,
                size_of::<POINT>().min(self.size),
                None,
            )
        }
        .map_err(RemoteError::Transfer)?;
        Ok(point)
    }

    fn write_point(&self, point: POINT) -> Result<(), RemoteError> {
        unsafe {
            WriteProcessMemory(
                self.process.handle,
                self.address,
                &point as *const POINT as *const c_void,
                size_of::<POINT>().min(self.size),
                None,
            )
        }
        .map_err(RemoteError::Transfer)
    }
}

impl Drop for RemoteBuffer<'_> {
    fn drop(&mut self) {
        unsafe {
            VirtualFreeEx(self.process.handle, self.address, 0, MEM_RELEASE).ok();
        }
    }
}

/// The shell's desktop icon list, addressed from outside its process
#[derive(Debug, Clone, Copy)]
pub struct RemoteIconList {
    hwnd: HWND,
    timeout_ms: u32,
}

impl RemoteIconList {
    pub fn new(hwnd: HWND) -> Self {
        Self {
            hwnd,
            timeout_ms: MESSAGE_TIMEOUT_MS,
        }
    }

    fn send(&self, msg: u32, wparam: usize, lparam: LPARAM) -> Result<isize, RemoteError> {
        let mut result = 0usize;
        let ok = unsafe {
            SendMessageTimeoutW(
                self.hwnd,
                msg,
                WPARAM(wparam),
                lparam,
                SMTO_ABORTIFHUNG | SMTO_BLOCK,
                self.timeout_ms,
                Some(&mut result),
            )
        };
        if ok.0 == 0 {
            return Err(RemoteError::MessageFailed { msg });
        }
        Ok(result as isize)
    }

    /// `LVM_GETNEXTITEM` starting after `start` (or from the top)
    fn next_item(&self, start: Option<IconHandle>, flags: isize) -> Option<IconHandle> {
        let start = start.map_or(-1, |icon| icon.index() as isize);
        match self.send(LVM_GETNEXTITEM, start as usize, LPARAM(flags)) {
            Ok(index) if index >= 0 => i32::try_from(index).ok().map(IconHandle),
            Ok(_) => None,
            Err(e) => {
                trace!("{e}");
                None
            }
        }
    }
}

impl IconPositionAccessor for RemoteIconList {
    type Error = RemoteError;

    fn position(&self, icon: IconHandle) -> Result<Point, RemoteError> {
        let process = ForeignProcess::open_owner(self.hwnd, PROCESS_VM_OPERATION | PROCESS_VM_READ | PROCESS_VM_WRITE)?;
        let buffer = process.allocate(size_of::<POINT>())?;

        if self.send(LVM_GETITEMPOSITION, icon.index() as usize, buffer.lparam())? == 0 {
            return Err(RemoteError::MessageFailed {
                msg: LVM_GETITEMPOSITION,
            });
        }

        Ok(buffer.read_point()?.into())
    }

    fn set_position(&self, icon: IconHandle, position: Point) -> Result<(), RemoteError> {
        let process = ForeignProcess::open_owner(self.hwnd, PROCESS_VM_OPERATION | PROCESS_VM_WRITE)?;
        let buffer = process.allocate(size_of::<POINT>())?;

        buffer.write_point(position.into())?;
        self.send(LVM_SETITEMPOSITION32, icon.index() as usize, buffer.lparam())?;
        Ok(())
    }

    fn next_selected(&self, after: Option<IconHandle>) -> Option<IconHandle> {
        self.next_item(after, LVNI_SELECTED)
    }

    fn focused(&self) -> Option<IconHandle> {
        self.next_item(None, LVNI_FOCUSED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_match_commctrl() {
        assert_eq!(LVM_GETNEXTITEM, 0x100C);
        assert_eq!(LVM_GETITEMPOSITION, 0x1010);
        assert_eq!(LVM_SETITEMPOSITION32, 0x1031);
    }

    #[test]
    fn null_window_has_no_owner() {
        let list = RemoteIconList::new(HWND(0));
        assert!(matches!(
            list.position(IconHandle(0)),
            Err(RemoteError::NoOwningProcess)
        ));
        assert_eq!(list.next_selected(None), None);
        assert_eq!(list.focused(), None);
    }
}
