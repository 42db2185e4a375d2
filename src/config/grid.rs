use crate::domain::grid::GridConfig;

/// Bounds applied to user-supplied grid values
///
/// Match the ranges the settings form has always accepted, so files
/// written by older versions load unchanged.
pub struct GridLimits;

impl GridLimits {
    pub const MIN_CELL: i32 = GridConfig::MIN_CELL;
    pub const MAX_CELL: i32 = 600;
    pub const MAX_OFFSET: i32 = 200;

    pub fn cell(value: i32) -> i32 {
        value.clamp(Self::MIN_CELL, Self::MAX_CELL)
    }

    pub fn offset(value: i32) -> i32 {
        value.clamp(-Self::MAX_OFFSET, Self::MAX_OFFSET)
    }

    pub fn alpha(value: i32) -> u8 {
        value.clamp(0, 255) as u8
    }
}

/// Visual style of the grid lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStyle {
    /// Base colour as packed ARGB; the alpha byte is ignored
    pub color_argb: i32,
    /// Line opacity, 0 = invisible, 255 = opaque
    pub alpha: u8,
}

impl GridStyle {
    /// CornflowerBlue
    pub const DEFAULT_COLOR: i32 = 0xFF64_95ED_u32 as i32;
    pub const DEFAULT_ALPHA: u8 = 120;

    pub fn new(color_argb: i32, alpha: u8) -> Self {
        Self { color_argb, alpha }
    }

    /// Returns the colour as `(r, g, b, a)` with this style's opacity
    pub fn rgba(&self) -> (u8, u8, u8, u8) {
        let packed = self.color_argb as u32;
        (
            ((packed >> 16) & 0xFF) as u8,
            ((packed >> 8) & 0xFF) as u8,
            (packed & 0xFF) as u8,
            self.alpha,
        )
    }
}

impl Default for GridStyle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COLOR, Self::DEFAULT_ALPHA)
    }
}
