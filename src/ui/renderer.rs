//! Grid rendering for overlay windows
//!
//! Layout and rasterization are separate steps: [`GridLayout`] computes the
//! line rectangles in overlay-local pixels, [`GridRenderer`] paints them onto
//! a transparent tiny-skia canvas. Neither step touches a window, so both
//! are tested without a display.

use tiny_skia::{Color, Paint, Pixmap, Rect as SkiaRect, Transform};

use crate::config::GridStyle;
use crate::domain::grid::GridGeometry;

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Failed to create {width}x{height} pixmap")]
    PixmapCreationFailed { width: u32, height: u32 },
}

/// Orientation of a grid line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAxis {
    Vertical,
    Horizontal,
}

/// One grid line in overlay-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub axis: LineAxis,
    /// x for vertical lines, y for horizontal ones
    pub position: u32,
    pub width: u32,
}

/// Pre-calculated layout for one overlay
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub lines: Vec<Line>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub style: GridStyle,
}

impl GridLayout {
    /// Lines for a grid, one every cell edge strictly inside the working area
    ///
    /// The overlay window covers exactly the working area, so the area's
    /// top-left corner is the canvas origin.
    pub fn for_geometry(geometry: &GridGeometry, style: GridStyle, dpi_scale: f32) -> Self {
        let area = geometry.work_area();
        let config = geometry.config();
        let canvas_width = area.w.max(0) as u32;
        let canvas_height = area.h.max(0) as u32;
        let width = line_width(dpi_scale);

        let vertical = (1..)
            .map(|k| k * config.cell_width as u32)
            .take_while(|&x| x < canvas_width)
            .map(|position| Line {
                axis: LineAxis::Vertical,
                position,
                width,
            });
        let horizontal = (1..)
            .map(|k| k * config.cell_height as u32)
            .take_while(|&y| y < canvas_height)
            .map(|position| Line {
                axis: LineAxis::Horizontal,
                position,
                width,
            });

        Self {
            lines: vertical.chain(horizontal).collect(),
            canvas_width,
            canvas_height,
            style,
        }
    }

    pub fn vertical_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.axis == LineAxis::Vertical)
    }

    pub fn horizontal_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.axis == LineAxis::Horizontal)
    }
}

fn line_width(dpi_scale: f32) -> u32 {
    if dpi_scale.is_finite() {
        (dpi_scale.round() as u32).max(1)
    } else {
        1
    }
}

/// Paints grid layouts onto transparent canvases
#[derive(Debug, Default)]
pub struct GridRenderer;

impl GridRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render a layout to a premultiplied RGBA pixmap
    pub fn render(&self, layout: &GridLayout) -> Result<Pixmap, RendererError> {
        let (w, h) = (layout.canvas_width, layout.canvas_height);
        let mut pixmap = Pixmap::new(w, h).ok_or(RendererError::PixmapCreationFailed { width: w, height: h })?;
        pixmap.fill(Color::TRANSPARENT);

        let (r, g, b, a) = layout.style.rgba();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = false;

        for line in &layout.lines {
            let rect = match line.axis {
                LineAxis::Vertical => SkiaRect::from_xywh(
                    line.position as f32,
                    0.0,
                    line.width.min(w - line.position) as f32,
                    h as f32,
                ),
                LineAxis::Horizontal => SkiaRect::from_xywh(
                    0.0,
                    line.position as f32,
                    w as f32,
                    line.width.min(h - line.position) as f32,
                ),
            };
            if let Some(rect) = rect {
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }

        Ok(pixmap)
    }

    /// Pixmap bytes reordered to the premultiplied BGRA layout GDI expects
    pub fn to_bgra(pixmap: &Pixmap) -> Vec<u8> {
        let mut data = pixmap.data().to_vec();
        for px in data.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::core::Rect;
    use crate::domain::grid::GridConfig;

    fn geometry(w: i32, h: i32, cell_w: i32, cell_h: i32) -> GridGeometry {
        GridGeometry::new(Rect::new(1920, -200, w, h), GridConfig::new(cell_w, cell_h, 8, 12))
    }

    fn positions<'a>(lines: impl Iterator<Item = &'a Line>) -> Vec<u32> {
        lines.map(|l| l.position).collect()
    }

    #[test]
    fn lines_fall_on_cell_edges_inside_the_area() {
        let layout = GridLayout::for_geometry(&geometry(400, 200, 120, 96), GridStyle::default(), 1.0);

        assert_eq!(positions(layout.vertical_lines()), vec![120, 240, 360]);
        assert_eq!(positions(layout.horizontal_lines()), vec![96, 192]);
        assert_eq!((layout.canvas_width, layout.canvas_height), (400, 200));
    }

    #[test]
    fn no_line_on_the_far_edge() {
        let layout = GridLayout::for_geometry(&geometry(240, 192, 120, 96), GridStyle::default(), 1.0);

        assert_eq!(positions(layout.vertical_lines()), vec![120]);
        assert_eq!(positions(layout.horizontal_lines()), vec![96]);
    }

    #[test]
    fn area_smaller_than_a_cell_has_no_lines() {
        let layout = GridLayout::for_geometry(&geometry(50, 40, 120, 96), GridStyle::default(), 1.0);
        assert!(layout.lines.is_empty());
    }

    #[test]
    fn line_width_follows_dpi() {
        let g = geometry(400, 200, 120, 96);
        assert_eq!(GridLayout::for_geometry(&g, GridStyle::default(), 1.0).lines[0].width, 1);
        assert_eq!(GridLayout::for_geometry(&g, GridStyle::default(), 1.5).lines[0].width, 2);
        assert_eq!(GridLayout::for_geometry(&g, GridStyle::default(), 0.5).lines[0].width, 1);
        assert_eq!(GridLayout::for_geometry(&g, GridStyle::default(), f32::NAN).lines[0].width, 1);
    }

    #[test]
    fn render_paints_only_grid_lines() {
        let style = GridStyle::new(GridStyle::DEFAULT_COLOR, 255);
        let layout = GridLayout::for_geometry(&geometry(64, 48, 16, 16), style, 1.0);
        let pixmap = GridRenderer::new().render(&layout).unwrap();

        assert_eq!((pixmap.width(), pixmap.height()), (64, 48));

        let on_line = pixmap.pixel(16, 5).unwrap();
        assert_eq!(on_line.alpha(), 255);
        assert_eq!((on_line.red(), on_line.green(), on_line.blue()), (0x64, 0x95, 0xED));

        let crossing = pixmap.pixel(32, 32).unwrap();
        assert_eq!(crossing.alpha(), 255);

        assert_eq!(pixmap.pixel(5, 5).unwrap().alpha(), 0);
        assert_eq!(pixmap.pixel(17, 17).unwrap().alpha(), 0);
    }

    #[test]
    fn render_uses_configured_opacity() {
        let style = GridStyle::new(GridStyle::DEFAULT_COLOR, 120);
        let layout = GridLayout::for_geometry(&geometry(64, 48, 16, 16), style, 1.0);
        let pixmap = GridRenderer::new().render(&layout).unwrap();

        let alpha = pixmap.pixel(16, 5).unwrap().alpha();
        assert!((119..=121).contains(&alpha), "alpha was {alpha}");
    }

    #[test]
    fn empty_area_cannot_be_rendered() {
        let layout = GridLayout::for_geometry(&geometry(0, 0, 16, 16), GridStyle::default(), 1.0);
        assert!(matches!(
            GridRenderer::new().render(&layout),
            Err(RendererError::PixmapCreationFailed { width: 0, height: 0 })
        ));
    }

    #[test]
    fn bgra_swaps_red_and_blue() {
        let style = GridStyle::new(0x00FF_0000, 255);
        let layout = GridLayout::for_geometry(&geometry(32, 16, 16, 16), style, 1.0);
        let pixmap = GridRenderer::new().render(&layout).unwrap();
        let bgra = GridRenderer::to_bgra(&pixmap);

        assert_eq!(bgra.len(), 32 * 16 * 4);
        let i = 16 * 4;
        assert_eq!(&bgra[i..i + 4], &[0, 0, 255, 255]);
    }
}
