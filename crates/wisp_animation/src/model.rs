//! Deformable grid model
//!
//! Warp effects animate a `width × height` grid of control points laid over
//! the window's outer rectangle. Shade and unshade use a dedicated layout with
//! a header row, a footer row and body rows mapped into the client area, since
//! the decoration keeps its height while the contents collapse.

use crate::event::WindowEvent;
use wisp_core::{Point, Result, Vec3, WindowInfo, WispError};

/// Upper bound on control points per window
pub const MAX_GRID_POINTS: usize = 1 << 16;

/// Grid dimensions in control points
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            width: 2,
            height: 2,
        }
    }
}

impl GridSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Enforce the minimum layout: 2×2, and header/body/footer rows for shading
    pub fn normalized(self, shade_layout: bool) -> Self {
        let min_height = if shade_layout { 4 } else { 2 };
        Self {
            width: self.width.max(2),
            height: self.height.max(min_height),
        }
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One control point of the grid
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridPoint {
    /// Rest position as a fraction of the outer rectangle
    pub grid_position: Point,
    /// Deformed position in screen space (z in screen widths)
    pub position: Vec3,
    /// Texture offset for the quad ending at this point's row
    pub tex_offset_before: Point,
    /// Texture offset for the quad starting at this point's row
    pub tex_offset_after: Point,
}

/// Control-point grid of one window
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub grid: GridSize,
    pub points: Vec<GridPoint>,
    /// Outer size the grid was built for
    pub win_width: f32,
    pub win_height: f32,
    /// Event the layout was built for (shade layout or not)
    pub for_event: WindowEvent,
    /// Decoration heights above and below the client area
    pub top_height: f32,
    pub bottom_height: f32,
    pub scale: Point,
    pub scale_origin: Point,
}

impl Model {
    /// Build a grid over the window's outer rectangle
    pub fn new(window: &WindowInfo, event: WindowEvent, grid: GridSize) -> Result<Model> {
        let grid = grid.normalized(event.is_shade());
        if grid.len() > MAX_GRID_POINTS {
            return Err(WispError::Resource(format!(
                "grid of {}x{} control points is too large",
                grid.width, grid.height
            )));
        }

        let outer = window.outer_rect();
        let mut model = Model {
            grid,
            points: vec![GridPoint::default(); grid.len()],
            win_width: outer.width(),
            win_height: outer.height(),
            for_event: event,
            top_height: window.output.top as f32,
            bottom_height: window.output.bottom as f32,
            scale: Point::new(1.0, 1.0),
            scale_origin: Point::ZERO,
        };
        model.init_points(outer.x(), outer.y(), outer.width(), outer.height());
        Ok(model)
    }

    pub fn is_shade_layout(&self) -> bool {
        self.for_event.is_shade()
    }

    /// Whether this grid can be reused for the given window, event and size
    pub fn fits(&self, window: &WindowInfo, event: WindowEvent, grid: GridSize) -> bool {
        let outer = window.outer_rect();
        self.grid == grid.normalized(event.is_shade())
            && self.is_shade_layout() == event.is_shade()
            && self.win_width == outer.width()
            && self.win_height == outer.height()
    }

    pub fn point(&self, gx: usize, gy: usize) -> &GridPoint {
        &self.points[gy * self.grid.width + gx]
    }

    /// Lay the points out at rest over the given rectangle
    pub fn init_points(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let (x0, y0) = (self.scale_origin.x, self.scale_origin.y);
        let (sx, sy) = (self.scale.x, self.scale.y);
        let cells_x = (self.grid.width - 1) as f32;
        let grid_width = self.grid.width;
        let grid_height = self.grid.height;

        let column_x = |gx: usize| x + ((gx as f32 * width / cells_x) - x0) * sx + x0;

        if self.is_shade_layout() {
            let cells_y = (grid_height - 3) as f32;
            let contents_height = height - self.top_height - self.bottom_height;

            let place_row = |points: &mut [GridPoint], gy: usize, obj_y: f32, grid_y: f32| {
                for gx in 0..grid_width {
                    points[gy * grid_width + gx] = GridPoint {
                        grid_position: Point::new(gx as f32 / cells_x, grid_y),
                        position: Vec3::new(column_x(gx), obj_y, 0.0),
                        ..Default::default()
                    };
                }
            };

            place_row(&mut self.points, 0, y + (0.0 - y0) * sy + y0, 0.0);
            for gy in 1..grid_height - 1 {
                let in_win_y = (gy - 1) as f32 * contents_height / cells_y + self.top_height;
                let grid_y = if height > 0.0 { in_win_y / height } else { 0.0 };
                place_row(&mut self.points, gy, y + (in_win_y - y0) * sy + y0, grid_y);
            }
            place_row(
                &mut self.points,
                grid_height - 1,
                y + (height - y0) * sy + y0,
                1.0,
            );
        } else {
            let cells_y = (grid_height - 1) as f32;
            for gy in 0..grid_height {
                let obj_y = y + ((gy as f32 * height / cells_y) - y0) * sy + y0;
                for gx in 0..grid_width {
                    self.points[gy * grid_width + gx] = GridPoint {
                        grid_position: Point::new(gx as f32 / cells_x, gy as f32 / cells_y),
                        position: Vec3::new(column_x(gx), obj_y, 0.0),
                        ..Default::default()
                    };
                }
            }
        }
    }

    /// Move every point by a screen-space offset
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for p in &mut self.points {
            p.position.x += dx;
            p.position.y += dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_core::{Extents, WindowId};

    fn window() -> WindowInfo {
        WindowInfo::new(WindowId(1), 100, 100, 200, 100)
            .with_extents(Extents::new(0, 0, 20, 0), Extents::new(0, 0, 20, 10))
    }

    #[test]
    fn test_regular_grid_covers_outer_rect() {
        let model = Model::new(&window(), WindowEvent::Open, GridSize::new(3, 3)).unwrap();
        let tl = model.point(0, 0).position;
        let br = model.point(2, 2).position;
        assert_eq!((tl.x, tl.y), (100.0, 80.0));
        assert_eq!((br.x, br.y), (300.0, 210.0));
        assert_eq!(model.point(1, 1).grid_position, Point::new(0.5, 0.5));
    }

    #[test]
    fn test_shade_layout_reserves_header_and_footer() {
        let model = Model::new(&window(), WindowEvent::Shade, GridSize::new(2, 2)).unwrap();
        assert_eq!(model.grid.height, 4);

        // Header at the frame top, first body row at the client top
        assert_eq!(model.point(0, 0).position.y, 80.0);
        assert_eq!(model.point(0, 1).position.y, 100.0);
        assert_eq!(model.point(0, 2).position.y, 200.0);
        assert_eq!(model.point(0, 3).position.y, 210.0);
        assert_eq!(model.point(0, 3).grid_position.y, 1.0);
    }

    #[test]
    fn test_fits_detects_resize_and_layout_change() {
        let w = window();
        let model = Model::new(&w, WindowEvent::Minimize, GridSize::default()).unwrap();
        assert!(model.fits(&w, WindowEvent::Close, GridSize::default()));
        assert!(!model.fits(&w, WindowEvent::Shade, GridSize::default()));

        let mut resized = w.clone();
        resized.width += 10;
        assert!(!model.fits(&resized, WindowEvent::Minimize, GridSize::default()));
    }

    #[test]
    fn test_oversized_grid_is_refused() {
        let err = Model::new(&window(), WindowEvent::Open, GridSize::new(2, MAX_GRID_POINTS))
            .unwrap_err();
        assert!(matches!(err, WispError::Resource(_)));
    }

    #[test]
    fn test_translate_moves_all_points() {
        let mut model = Model::new(&window(), WindowEvent::Open, GridSize::default()).unwrap();
        model.translate(5.0, -5.0);
        assert_eq!(model.point(0, 0).position.x, 105.0);
        assert_eq!(model.point(0, 0).position.y, 75.0);
    }
}
