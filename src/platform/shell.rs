//! Locating the desktop icon list
//!
//! The desktop icons are drawn by a `SysListView32` inside the shell's
//! `SHELLDLL_DefView`, which is parented either to `Progman` or, once a
//! wallpaper transition has run, to one of the `WorkerW` windows. The
//! hierarchy is walked from scratch on every call because Explorer can be
//! restarted at any time.

use log::trace;
use windows::Win32::Foundation::{BOOL, FALSE, HWND, LPARAM, TRUE};
use windows::Win32::UI::WindowsAndMessaging::{EnumWindows, FindWindowExW, GetClassNameW};
use windows::core::{PCWSTR, w};

use crate::domain::icons::IconListLocator;
use crate::platform::remote::RemoteIconList;
use crate::platform::windows::wide_to_string;

/// Top-level shell windows that can host the desktop view
const SHELL_HOST_CLASSES: [&str; 2] = ["WorkerW", "Progman"];

fn is_shell_host(class_name: &str) -> bool {
    SHELL_HOST_CLASSES.contains(&class_name)
}

fn class_name(hwnd: HWND) -> String {
    let mut buffer = [0u16; 256];
    let len = unsafe { GetClassNameW(hwnd, &mut buffer) };
    wide_to_string(&buffer[..len.max(0) as usize])
}

unsafe extern "system" fn find_default_view(hwnd: HWND, lparam: LPARAM) -> BOOL {
    unsafe {
        let found = &mut *(lparam.0 as *mut HWND);

        if !is_shell_host(&class_name(hwnd)) {
            return TRUE;
        }

        let def_view = FindWindowExW(hwnd, HWND(0), w!("SHELLDLL_DefView"), PCWSTR::null());
        if def_view.0 == 0 {
            return TRUE;
        }

        *found = def_view;
        FALSE
    }
}

/// Finds the desktop icon list of the running shell
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellWindowLocator;

impl ShellWindowLocator {
    pub fn new() -> Self {
        Self
    }

    /// Handle of the current desktop list control, if the shell is up
    pub fn find_list_view(&self) -> Option<HWND> {
        let mut def_view = HWND(0);
        // Reports an error when the callback stops early; the out value decides
        let _ = unsafe { EnumWindows(Some(find_default_view), LPARAM(&mut def_view as *mut HWND as isize)) };

        if def_view.0 == 0 {
            trace!("SHELLDLL_DefView not found");
            return None;
        }

        let list = unsafe {
            let named = FindWindowExW(def_view, HWND(0), w!("SysListView32"), w!("FolderView"));
            if named.0 != 0 {
                named
            } else {
                FindWindowExW(def_view, HWND(0), w!("SysListView32"), PCWSTR::null())
            }
        };

        if list.0 == 0 {
            trace!("SysListView32 missing under {:?}", def_view);
            return None;
        }
        Some(list)
    }
}

impl IconListLocator for ShellWindowLocator {
    type List = RemoteIconList;

    fn locate(&self) -> Option<RemoteIconList> {
        self.find_list_view().map(RemoteIconList::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_hosts_are_matched_exactly() {
        assert!(is_shell_host("WorkerW"));
        assert!(is_shell_host("Progman"));
        assert!(!is_shell_host("workerw"));
        assert!(!is_shell_host("Shell_TrayWnd"));
        assert!(!is_shell_host(""));
    }

    #[test]
    fn located_list_is_a_real_window() {
        // No shell on a service session; either outcome is fine
        if let Some(hwnd) = ShellWindowLocator::new().find_list_view() {
            assert_ne!(hwnd.0, 0);
            assert_eq!(class_name(hwnd), "SysListView32");
        }
    }
}
