//! Grid geometry and cell calculations
//!
//! Maps pixel positions on one monitor's working area to grid cells and
//! back. Every function here is pure; the same inputs always produce the
//! same outputs.
//!
//! ## Edge policy
//! - Points left of or above the working area map to column/row 0.
//! - Cells are clamped to the last full column/row before converting back
//!   to pixels, so an icon can never be pushed off the working area.
//! - Offsets are applied modulo the cell size. This keeps `snap` idempotent
//!   for any configured offset.

use crate::domain::core::{Point, Rect};

/// Per-monitor grid parameters
///
/// Owned by the settings layer; the geometry engine only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub cell_width: i32,
    pub cell_height: i32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl GridConfig {
    /// Smallest accepted cell edge in pixels
    pub const MIN_CELL: i32 = 16;

    /// Creates a config, clamping both cell edges to at least [`Self::MIN_CELL`]
    pub fn new(cell_width: i32, cell_height: i32, offset_x: i32, offset_y: i32) -> Self {
        Self {
            cell_width,
            cell_height,
            offset_x,
            offset_y,
        }
        .sanitized()
    }

    /// Returns a copy with out-of-range cell sizes corrected
    pub fn sanitized(self) -> Self {
        Self {
            cell_width: self.cell_width.max(Self::MIN_CELL),
            cell_height: self.cell_height.max(Self::MIN_CELL),
            ..self
        }
    }
}

/// Logical address of one grid square on a single monitor
///
/// Values produced by [`GridGeometry::cell_of`] are never negative. Nudge
/// arithmetic may push them out of range temporarily; [`GridGeometry::point_of`]
/// clamps them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub col: i32,
    pub row: i32,
}

impl GridCell {
    /// Creates a new cell address
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Returns the cell shifted by `dx` columns and `dy` rows
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            col: self.col.saturating_add(dx),
            row: self.row.saturating_add(dy),
        }
    }
}

/// Grid laid over one monitor's working area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    work_area: Rect,
    config: GridConfig,
}

impl GridGeometry {
    /// Creates the geometry for a working area
    ///
    /// The config is sanitized, so a zero or negative cell size behaves as
    /// the minimum cell size rather than failing.
    pub fn new(work_area: Rect, config: GridConfig) -> Self {
        Self {
            work_area,
            config: config.sanitized(),
        }
    }

    /// Returns the working area this grid covers
    pub fn work_area(&self) -> Rect {
        self.work_area
    }

    /// Returns the sanitized grid parameters
    pub fn config(&self) -> GridConfig {
        self.config
    }

    /// Number of full columns that fit the working area (at least 1)
    pub fn columns(&self) -> i32 {
        (self.work_area.w / self.config.cell_width).max(1)
    }

    /// Number of full rows that fit the working area (at least 1)
    pub fn rows(&self) -> i32 {
        (self.work_area.h / self.config.cell_height).max(1)
    }

    /// Returns true if the point lies inside this grid's working area
    pub fn contains(&self, p: Point) -> bool {
        self.work_area.contains(p)
    }

    /// Maps a pixel position to the cell containing it
    pub fn cell_of(&self, p: Point) -> GridCell {
        let dx = i64::from(p.x) - i64::from(self.work_area.x);
        let dy = i64::from(p.y) - i64::from(self.work_area.y);

        let col = dx.div_euclid(i64::from(self.config.cell_width)).max(0);
        let row = dy.div_euclid(i64::from(self.config.cell_height)).max(0);

        GridCell::new(saturate(col), saturate(row))
    }

    /// Maps a cell to the pixel position an icon in that cell should occupy
    pub fn point_of(&self, cell: GridCell) -> Point {
        let col = cell.col.clamp(0, self.columns() - 1);
        let row = cell.row.clamp(0, self.rows() - 1);

        let offset_x = self.config.offset_x.rem_euclid(self.config.cell_width);
        let offset_y = self.config.offset_y.rem_euclid(self.config.cell_height);

        let x = self.work_area.x + col * self.config.cell_width + offset_x;
        let y = self.work_area.y + row * self.config.cell_height + offset_y;

        // Only matters when the working area is narrower than one cell
        self.work_area.clamp(Point::new(x, y))
    }

    /// Snaps a pixel position to its cell's anchor point
    pub fn snap(&self, p: Point) -> Point {
        self.point_of(self.cell_of(p))
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_hd() -> GridGeometry {
        GridGeometry::new(Rect::new(0, 0, 1920, 1080), GridConfig::new(120, 96, 8, 12))
    }

    #[test]
    fn cell_of_uses_floor_division() {
        let grid = full_hd();
        assert_eq!(grid.cell_of(Point::new(500, 500)), GridCell::new(4, 5));
        assert_eq!(grid.cell_of(Point::new(0, 0)), GridCell::new(0, 0));
        assert_eq!(grid.cell_of(Point::new(119, 95)), GridCell::new(0, 0));
        assert_eq!(grid.cell_of(Point::new(120, 96)), GridCell::new(1, 1));
    }

    #[test]
    fn points_above_and_left_map_to_first_cell() {
        let grid = GridGeometry::new(Rect::new(100, 50, 800, 600), GridConfig::new(64, 64, 0, 0));
        assert_eq!(grid.cell_of(Point::new(-5000, -1)), GridCell::new(0, 0));
        assert_eq!(grid.cell_of(Point::new(99, 49)), GridCell::new(0, 0));
    }

    #[test]
    fn nudge_right_example() {
        let grid = full_hd();
        let cell = grid.cell_of(Point::new(500, 500)).offset(1, 0);
        assert_eq!(cell, GridCell::new(5, 5));
        assert_eq!(grid.point_of(cell), Point::new(608, 492));
    }

    #[test]
    fn snap_example() {
        let grid = full_hd();
        assert_eq!(grid.snap(Point::new(615, 480)), Point::new(608, 492));
        assert_eq!(grid.snap(Point::new(608, 492)), Point::new(608, 492));
    }

    #[test]
    fn point_of_clamps_out_of_range_cells() {
        let grid = full_hd();
        // 1920 / 120 = 16 columns, 1080 / 96 = 11 rows
        assert_eq!(grid.point_of(GridCell::new(-3, -7)), Point::new(8, 12));
        assert_eq!(grid.point_of(GridCell::new(400, 400)), Point::new(15 * 120 + 8, 10 * 96 + 12));
        assert_eq!(
            grid.point_of(GridCell::new(i32::MAX, i32::MIN)),
            Point::new(15 * 120 + 8, 12)
        );
    }

    #[test]
    fn point_of_stays_inside_work_area() {
        let areas = [
            Rect::new(0, 0, 1920, 1080),
            Rect::new(-1280, -200, 1280, 1024),
            Rect::new(3840, 0, 1080, 1920),
            Rect::new(0, 0, 10, 10),
            Rect::new(50, 50, 17, 300),
        ];
        let configs = [
            GridConfig::new(16, 16, 0, 0),
            GridConfig::new(120, 96, 8, 12),
            GridConfig::new(75, 200, -30, 250),
            GridConfig::new(600, 600, 599, -1),
        ];
        let cells = [
            GridCell::new(0, 0),
            GridCell::new(-1, -1),
            GridCell::new(3, 9),
            GridCell::new(i32::MAX, i32::MAX),
            GridCell::new(i32::MIN, 17),
        ];

        for area in areas {
            for config in configs {
                let grid = GridGeometry::new(area, config);
                for cell in cells {
                    let p = grid.point_of(cell);
                    assert!(area.contains(p), "{p:?} escaped {area:?} with {config:?}");
                }
            }
        }
    }

    #[test]
    fn snap_is_idempotent() {
        let areas = [
            Rect::new(0, 0, 1920, 1040),
            Rect::new(-1920, 0, 1920, 1080),
            Rect::new(0, -1080, 1366, 728),
            Rect::new(20, 20, 40, 40),
        ];
        let configs = [
            GridConfig::new(16, 16, 0, 0),
            GridConfig::new(120, 96, 8, 12),
            GridConfig::new(97, 33, -8, -200),
            GridConfig::new(300, 17, 450, 16),
        ];

        for area in areas {
            for config in configs {
                let grid = GridGeometry::new(area, config);
                for x in (area.x..area.right()).step_by(7) {
                    for y in (area.y..area.bottom()).step_by(11) {
                        let once = grid.snap(Point::new(x, y));
                        assert_eq!(grid.snap(once), once, "area {area:?} config {config:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn non_positive_cell_size_is_clamped() {
        let config = GridConfig::new(0, -40, 0, 0);
        assert_eq!(config.cell_width, GridConfig::MIN_CELL);
        assert_eq!(config.cell_height, GridConfig::MIN_CELL);

        let grid = GridGeometry::new(
            Rect::new(0, 0, 160, 160),
            GridConfig {
                cell_width: -5,
                cell_height: 0,
                offset_x: 0,
                offset_y: 0,
            },
        );
        assert_eq!(grid.columns(), 10);
        assert_eq!(grid.cell_of(Point::new(40, 40)), GridCell::new(2, 2));
    }

    #[test]
    fn work_area_smaller_than_a_cell_collapses_to_cell_zero() {
        let grid = GridGeometry::new(Rect::new(0, 0, 50, 50), GridConfig::new(120, 96, 8, 12));
        assert_eq!(grid.columns(), 1);
        assert_eq!(grid.rows(), 1);
        assert_eq!(grid.point_of(GridCell::new(3, 3)), Point::new(8, 12));
    }

    #[test]
    fn secondary_monitor_uses_its_own_origin() {
        let grid = GridGeometry::new(Rect::new(-1920, 0, 1920, 1080), GridConfig::new(120, 96, 8, 12));
        assert_eq!(grid.cell_of(Point::new(-1920 + 250, 100)), GridCell::new(2, 1));
        assert_eq!(grid.snap(Point::new(-1920 + 250, 100)), Point::new(-1920 + 248, 108));
    }
}
