//! General Windows platform utilities
//!
//! Conversions between Win32 structures and domain types, plus small
//! helpers shared by the other platform modules.

use windows::Win32::Foundation::{POINT, RECT};

use crate::domain::core::{Point, Rect};

impl From<RECT> for Rect {
    fn from(rect: RECT) -> Self {
        Rect::new(rect.left, rect.top, rect.right - rect.left, rect.bottom - rect.top)
    }
}

impl From<POINT> for Point {
    fn from(p: POINT) -> Self {
        Point::new(p.x, p.y)
    }
}

impl From<Point> for POINT {
    fn from(p: Point) -> Self {
        POINT { x: p.x, y: p.y }
    }
}

/// Decodes a NUL-terminated UTF-16 buffer filled in by a Win32 call
pub fn wide_to_string(buffer: &[u16]) -> String {
    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_from_win32_uses_width_and_height() {
        let rect = RECT {
            left: -1280,
            top: 40,
            right: 0,
            bottom: 1024,
        };
        assert_eq!(Rect::from(rect), Rect::new(-1280, 40, 1280, 984));
    }

    #[test]
    fn point_conversions_keep_coordinates() {
        let p = Point::new(-5, 17);
        let raw: POINT = p.into();
        assert_eq!((raw.x, raw.y), (-5, 17));
        assert_eq!(Point::from(raw), p);
    }

    #[test]
    fn wide_string_stops_at_nul() {
        let mut buffer = [0u16; 32];
        for (dst, src) in buffer.iter_mut().zip("\\\\.\\DISPLAY1".encode_utf16()) {
            *dst = src;
        }
        assert_eq!(wide_to_string(&buffer), "\\\\.\\DISPLAY1");
        assert_eq!(wide_to_string(&[0x57, 0x6F]), "Wo");
    }
}
