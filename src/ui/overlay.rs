//! Overlay window for grid display
//!
//! One borderless layered window per monitor, covering the monitor's
//! working area. The window is click-through and never takes focus; the
//! desktop and its icons stay fully usable underneath it. Content is
//! rendered with tiny-skia and presented through `UpdateLayeredWindow`,
//! so there is no `WM_PAINT` handling.

use std::ffi::c_void;

use log::{debug, warn};
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, POINT, SIZE, WPARAM};
use windows::Win32::Graphics::Gdi::{
    AC_SRC_ALPHA, AC_SRC_OVER, BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BLENDFUNCTION, CreateCompatibleDC,
    CreateDIBSection, CreatedHDC, DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC, HDC, HGDIOBJ, ReleaseDC,
    SelectObject,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, RegisterClassW, SW_HIDE, SW_SHOWNOACTIVATE, ShowWindow,
    ULW_ALPHA, UpdateLayeredWindow, WNDCLASSW, WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW,
    WS_EX_TRANSPARENT, WS_POPUP,
};
use windows::core::w;

use crate::app::registry::{MonitorArea, OverlaySurface};
use crate::config::GridStyle;
use crate::domain::core::Rect;
use crate::domain::grid::GridGeometry;
use crate::ui::renderer::{GridLayout, GridRenderer, RendererError};

/// Errors creating or redrawing an overlay
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("no module handle: {0}")]
    ModuleHandle(#[source] windows::core::Error),

    #[error("cannot create overlay window on {monitor}")]
    WindowCreationFailed { monitor: String },

    #[error("screen device context unavailable")]
    DeviceContextFailed,

    #[error("cannot create memory device context")]
    MemoryDeviceContextFailed,

    #[error("cannot create overlay frame bitmap")]
    DibSectionCreationFailed,

    #[error("cannot select overlay frame into memory context")]
    BitmapSelectionFailed,

    #[error("UpdateLayeredWindow failed")]
    LayerUpdateFailed,

    #[error("grid rendering failed: {0}")]
    RenderingError(#[from] RendererError),
}

unsafe extern "system" fn overlay_window_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

/// Grid overlay covering one monitor's working area
#[derive(Debug)]
pub struct OverlayWindow {
    hwnd: HWND,
    area: Rect,
    dpi_scale: f32,
    visible: bool,
    renderer: GridRenderer,
}

impl OverlayWindow {
    /// Create a hidden overlay window for the monitor
    pub fn create(monitor: &MonitorArea) -> Result<Self, OverlayError> {
        let class_name = w!("DesktopGridSnapperOverlay");
        let hinstance = unsafe { GetModuleHandleW(None) }.map_err(OverlayError::ModuleHandle)?;

        let wc = WNDCLASSW {
            lpfnWndProc: Some(overlay_window_proc),
            hInstance: hinstance.into(),
            lpszClassName: class_name,
            ..Default::default()
        };
        // Fails harmlessly once the class exists
        unsafe { RegisterClassW(&wc) };

        let area = monitor.work_area;
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_LAYERED | WS_EX_TRANSPARENT | WS_EX_NOACTIVATE | WS_EX_TOOLWINDOW,
                class_name,
                w!("Desktop Grid"),
                WS_POPUP,
                area.x,
                area.y,
                area.w,
                area.h,
                None,
                None,
                hinstance,
                None,
            )
        };

        if hwnd.0 == 0 {
            return Err(OverlayError::WindowCreationFailed {
                monitor: monitor.id.to_string(),
            });
        }

        debug!("Overlay window {:?} created for {}", hwnd, monitor.id);

        Ok(Self {
            hwnd,
            area,
            dpi_scale: monitor.dpi_scale,
            visible: false,
            renderer: GridRenderer::new(),
        })
    }

    fn render(&mut self, geometry: &GridGeometry, style: GridStyle) -> Result<(), OverlayError> {
        self.area = geometry.work_area();
        let layout = GridLayout::for_geometry(geometry, style, self.dpi_scale);
        let pixmap = self.renderer.render(&layout)?;
        self.present(&pixmap)
    }

    /// Uploads the pixmap and hands it to the compositor
    fn present(&self, pixmap: &tiny_skia::Pixmap) -> Result<(), OverlayError> {
        let width = pixmap.width() as i32;
        let height = pixmap.height() as i32;
        let bgra = GridRenderer::to_bgra(pixmap);

        let screen = ScreenDc::acquire()?;
        let memory = MemoryDc::compatible_with(&screen)?;
        let mut frame = DibFrame::create(&memory, width, height)?;
        frame.pixels_mut(bgra.len()).copy_from_slice(&bgra);
        let _selected = frame.select_into(&memory)?;

        let size = SIZE { cx: width, cy: height };
        let origin = POINT {
            x: self.area.x,
            y: self.area.y,
        };
        let source = POINT::default();
        let blend = BLENDFUNCTION {
            BlendOp: AC_SRC_OVER as u8,
            BlendFlags: 0,
            SourceConstantAlpha: 255,
            AlphaFormat: AC_SRC_ALPHA as u8,
        };

        unsafe {
            UpdateLayeredWindow(
                self.hwnd,
                screen.0,
                Some(&origin),
                Some(&size),
                memory.0,
                Some(&source),
                COLORREF(0),
                Some(&blend),
                ULW_ALPHA,
            )
        }
        .map_err(|_| OverlayError::LayerUpdateFailed)
    }
}

/// Screen device context; released on drop
struct ScreenDc(HDC);

impl ScreenDc {
    fn acquire() -> Result<Self, OverlayError> {
        let dc = unsafe { GetDC(HWND(0)) };
        if dc.0 == 0 {
            return Err(OverlayError::DeviceContextFailed);
        }
        Ok(Self(dc))
    }
}

impl Drop for ScreenDc {
    fn drop(&mut self) {
        unsafe { ReleaseDC(HWND(0), self.0) };
    }
}

/// Off-screen context the frame is selected into
struct MemoryDc(CreatedHDC);

impl MemoryDc {
    fn compatible_with(screen: &ScreenDc) -> Result<Self, OverlayError> {
        let dc = unsafe { CreateCompatibleDC(screen.0) };
        if dc.0 == 0 {
            return Err(OverlayError::MemoryDeviceContextFailed);
        }
        Ok(Self(dc))
    }
}

impl Drop for MemoryDc {
    fn drop(&mut self) {
        unsafe { DeleteDC(self.0) };
    }
}

/// Top-down 32-bit DIB section with its pixel memory
struct DibFrame {
    bitmap: HGDIOBJ,
    bits: *mut c_void,
}

impl DibFrame {
    fn create(memory: &MemoryDc, width: i32, height: i32) -> Result<Self, OverlayError> {
        let info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                // Negative height: rows run top-down like the pixmap
                biHeight: -height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut bits: *mut c_void = std::ptr::null_mut();
        let bitmap = unsafe { CreateDIBSection(memory.0, &info, DIB_RGB_COLORS, &mut bits, None, 0) }
            .map_err(|_| OverlayError::DibSectionCreationFailed)?;
        let frame = Self {
            bitmap: HGDIOBJ(bitmap.0),
            bits,
        };
        if frame.bits.is_null() {
            return Err(OverlayError::DibSectionCreationFailed);
        }
        Ok(frame)
    }

    fn pixels_mut(&mut self, len: usize) -> &mut [u8] {
        // The section holds width * height * 4 bytes, which is `len`
        unsafe { std::slice::from_raw_parts_mut(self.bits as *mut u8, len) }
    }

    fn select_into<'a>(&self, memory: &'a MemoryDc) -> Result<Selection<'a>, OverlayError> {
        let previous = unsafe { SelectObject(memory.0, self.bitmap) };
        if previous.0 == 0 {
            return Err(OverlayError::BitmapSelectionFailed);
        }
        Ok(Selection { memory, previous })
    }
}

impl Drop for DibFrame {
    fn drop(&mut self) {
        unsafe { DeleteObject(self.bitmap) };
    }
}

/// Restores the context's previous bitmap on drop
struct Selection<'a> {
    memory: &'a MemoryDc,
    previous: HGDIOBJ,
}

impl Drop for Selection<'_> {
    fn drop(&mut self) {
        unsafe { SelectObject(self.memory.0, self.previous) };
    }
}

impl OverlaySurface for OverlayWindow {
    fn update_grid(&mut self, geometry: &GridGeometry, style: GridStyle) {
        if let Err(e) = self.render(geometry, style) {
            warn!("Overlay {:?} not redrawn: {e}", self.hwnd);
        }
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        let cmd = if visible { SW_SHOWNOACTIVATE } else { SW_HIDE };
        unsafe {
            let _ = ShowWindow(self.hwnd, cmd);
        }
        self.visible = visible;
    }
}

impl Drop for OverlayWindow {
    fn drop(&mut self) {
        unsafe {
            DestroyWindow(self.hwnd).ok();
        }
    }
}
