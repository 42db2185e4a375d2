//! Monitor enumeration and DPI information
//!
//! Monitors are identified by their GDI device name (`\\.\DISPLAY1`), which
//! stays stable while the display stays connected. Secondary monitors can
//! have negative coordinates in the virtual desktop; nothing here assumes
//! the primary monitor sits at the origin.

use log::{debug, trace};
use windows::Win32::Foundation::{BOOL, FALSE, LPARAM, RECT, TRUE};
use windows::Win32::Graphics::Gdi::{EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOEXW};
use windows::Win32::UI::HiDpi::{GetDpiForMonitor, MDT_EFFECTIVE_DPI};

use crate::app::registry::{MonitorArea, MonitorId};
use crate::domain::core::Rect;
use crate::platform::windows::wide_to_string;

const MONITORINFOF_PRIMARY: u32 = 1;

/// A connected monitor
#[derive(Debug, Clone)]
pub struct Monitor {
    /// GDI device name, e.g. `\\.\DISPLAY2`
    pub device_name: String,
    /// Full monitor rectangle in virtual-desktop pixels
    pub bounds: Rect,
    /// Work area in virtual-desktop pixels (excluding taskbar)
    pub work_area: Rect,
    /// DPI scale factor (1.0 = 96 DPI, 1.25 = 120 DPI, etc.)
    pub dpi_scale: f32,
    pub is_primary: bool,
}

impl Monitor {
    pub fn area(&self) -> MonitorArea {
        MonitorArea {
            id: MonitorId(self.device_name.clone()),
            work_area: self.work_area,
            dpi_scale: self.dpi_scale,
        }
    }
}

/// Error types for monitor operations
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Failed to enumerate monitors")]
    EnumerationFailed,
    #[error("No monitors found during enumeration")]
    NoMonitors,
}

/// Callback for monitor enumeration
///
/// A monitor whose info cannot be read is skipped; the rest are still
/// reported.
unsafe extern "system" fn enum_monitor_proc(hmonitor: HMONITOR, _hdc: HDC, _rect: *mut RECT, lparam: LPARAM) -> BOOL {
    unsafe {
        let monitors = &mut *(lparam.0 as *mut Vec<Monitor>);

        let mut info = MONITORINFOEXW {
            monitorInfo: MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFOEXW>() as u32,
                ..Default::default()
            },
            ..Default::default()
        };

        if GetMonitorInfoW(hmonitor, &mut info as *mut MONITORINFOEXW as *mut MONITORINFO) == FALSE {
            trace!("GetMonitorInfoW failed for {:?}", hmonitor);
            return TRUE;
        }

        let mut dpi_x: u32 = 96;
        let mut dpi_y: u32 = 96;
        if GetDpiForMonitor(hmonitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y).is_err() {
            dpi_x = 96;
        }

        monitors.push(Monitor {
            device_name: wide_to_string(&info.szDevice),
            bounds: info.monitorInfo.rcMonitor.into(),
            work_area: info.monitorInfo.rcWork.into(),
            dpi_scale: dpi_x as f32 / 96.0,
            is_primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
        });

        TRUE
    }
}

/// Enumerates all monitors in system order
pub fn enumerate_monitors() -> Result<Vec<Monitor>, MonitorError> {
    let mut monitors: Vec<Monitor> = Vec::new();

    let ok = unsafe {
        EnumDisplayMonitors(
            None,
            None,
            Some(enum_monitor_proc),
            LPARAM(&mut monitors as *mut _ as isize),
        )
    };
    if ok == FALSE {
        return Err(MonitorError::EnumerationFailed);
    }
    if monitors.is_empty() {
        return Err(MonitorError::NoMonitors);
    }

    for m in &monitors {
        debug!(
            "Monitor {} {}x{} at {},{}, work area {}x{} at {},{} scale {:.2}{}",
            m.device_name,
            m.bounds.w,
            m.bounds.h,
            m.bounds.x,
            m.bounds.y,
            m.work_area.w,
            m.work_area.h,
            m.work_area.x,
            m.work_area.y,
            m.dpi_scale,
            if m.is_primary { " (primary)" } else { "" }
        );
    }

    Ok(monitors)
}

/// Working areas of every present monitor, ready for the overlay registry
pub fn monitor_areas() -> Result<Vec<MonitorArea>, MonitorError> {
    Ok(enumerate_monitors()?.iter().map(Monitor::area).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_enumerate_monitors() {
        // Headless sessions have no display at all
        let Ok(monitors) = enumerate_monitors() else {
            return;
        };
        assert!(!monitors.is_empty());
        assert!(monitors.iter().any(|m| m.is_primary));
        assert!(monitors.iter().all(|m| m.device_name.starts_with("\\\\.\\")));
    }

    #[test]
    fn area_uses_device_name_as_id() {
        let monitor = Monitor {
            device_name: "\\\\.\\DISPLAY2".into(),
            bounds: Rect::new(-1280, 0, 1280, 1024),
            work_area: Rect::new(-1280, 0, 1280, 984),
            dpi_scale: 1.25,
            is_primary: false,
        };

        let area = monitor.area();
        assert_eq!(area.id, MonitorId("\\\\.\\DISPLAY2".into()));
        assert_eq!(area.work_area, Rect::new(-1280, 0, 1280, 984));
        assert_eq!(area.dpi_scale, 1.25);
    }
}
