//! Core domain types and operations
//!
//! This module defines pure geometric types in virtual-desktop pixels.
//! Nothing here knows about Win32, window handles or foreign processes.

/// Point in virtual-desktop pixel coordinates
///
/// Desktop icon positions reported by the shell's list control share this
/// coordinate space with monitor rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Creates a new point
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rectangle in real pixel coordinates
///
/// Used for monitor bounds and working areas. `x`/`y` is the top-left
/// corner; the right and bottom edges are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Creates a new rectangle
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Returns the right edge coordinate (exclusive)
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Returns the bottom edge coordinate (exclusive)
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Returns true if this rectangle contains the given point
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Clamps a point into the rectangle
    ///
    /// Degenerate rectangles (zero or negative extent) collapse to their
    /// top-left corner.
    pub fn clamp(&self, p: Point) -> Point {
        let max_x = self.x + (self.w.max(1) - 1);
        let max_y = self.y + (self.h.max(1) - 1);
        Point::new(p.x.clamp(self.x, max_x), p.y.clamp(self.y, max_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_basic_properties() {
        let rect = Rect::new(10, 20, 100, 50);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 70);
    }

    #[test]
    fn rect_contains_point() {
        let rect = Rect::new(10, 10, 20, 20);
        assert!(rect.contains(Point::new(15, 15))); // Inside
        assert!(rect.contains(Point::new(10, 10))); // Top-left corner
        assert!(!rect.contains(Point::new(30, 30))); // Right/bottom edges are exclusive
        assert!(!rect.contains(Point::new(5, 5)));
    }

    #[test]
    fn negative_origin_monitor_contains_its_points() {
        // Secondary monitor left of the primary one
        let rect = Rect::new(-1920, 0, 1920, 1080);
        assert!(rect.contains(Point::new(-1, 0)));
        assert!(!rect.contains(Point::new(0, 0)));
    }

    #[test]
    fn clamp_keeps_points_inside() {
        let rect = Rect::new(100, 100, 50, 50);
        assert_eq!(rect.clamp(Point::new(0, 0)), Point::new(100, 100));
        assert_eq!(rect.clamp(Point::new(500, 120)), Point::new(149, 120));

        let empty = Rect::new(10, 10, 0, 0);
        assert_eq!(empty.clamp(Point::new(99, -99)), Point::new(10, 10));
    }
}
