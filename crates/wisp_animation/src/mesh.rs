//! Drawable geometry
//!
//! Grid effects hand the host a list of quads built by walking each paint
//! clip over the deformed control-point grid. Vertices carry the deformed
//! position and the undeformed window position as texture coordinates
//! (`s, t, r, q`); the host maps those through its own texture matrix.

use crate::model::Model;
use smallvec::SmallVec;
use wisp_core::{Color, Mat4, Rect, Vec3, WindowInfo};

/// One vertex: deformed position plus projective texture coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    /// `s, t, r, q` in window space; `s` and `t` are premultiplied by `q`
    pub tex: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec3, s: f32, t: f32) -> Self {
        Self {
            position,
            tex: [s, t, 0.0, 1.0],
        }
    }

    /// Same vertex with projective coordinate `q`
    pub fn with_q(mut self, q: f32) -> Self {
        self.tex[0] *= q;
        self.tex[1] *= q;
        self.tex[3] = q;
        self
    }
}

/// A convex face
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub vertices: SmallVec<[Vertex; 4]>,
    /// Per-face transform (rigid polygons), composed after the window transform
    pub transform: Option<Mat4>,
    pub opacity: f32,
    /// Outward normal before `transform` (lit polygons)
    pub normal: Option<Vec3>,
    /// Screen rectangle the face must be clipped to
    pub clip: Option<Rect>,
}

impl Face {
    pub fn quad(vertices: [Vertex; 4]) -> Self {
        Self {
            vertices: SmallVec::from_buf(vertices),
            transform: None,
            opacity: 1.0,
            normal: None,
            clip: None,
        }
    }
}

/// Faces for one paint of a window
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub faces: Vec<Face>,
    /// Faces are extruded solids and need the depth test
    pub depth_test: bool,
    /// Shade faces by their normals
    pub lighting: bool,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.faces.iter().map(|f| f.vertices.len()).sum()
    }
}

/// A textured point sprite (particles)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub position: Vec3,
    pub width: f32,
    pub height: f32,
    pub color: Color,
    /// Index of the particle system the sprite belongs to
    pub layer: u8,
    /// Additive blending instead of alpha blending
    pub additive: bool,
    /// Amount the layer darkens what is behind it, in [0, 1]
    pub darken: f32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Grid tessellation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Band {
    Header,
    Contents,
    Footer,
}

struct Row {
    y: f32,
    top_iy: usize,
    in_y: f32,
    apply_offsets: bool,
}

/// Quads covering `clips` over the deformed grid
///
/// `clips` are screen-space rectangles the host wants painted. Depth is
/// dropped unless `uses_3d` is set; `use_q` emits projective texture
/// coordinates so trapezoid quads do not show a diagonal seam.
pub fn grid_geometry(
    model: &Model,
    window: &WindowInfo,
    clips: &[Rect],
    uses_3d: bool,
    use_q: bool,
) -> Geometry {
    let mut geometry = Geometry::new();
    let outer = window.outer_rect();
    let (wx, wy, width, height) = (outer.x(), outer.y(), outer.width(), outer.height());
    if width <= 0.0 || height <= 0.0 {
        return geometry;
    }

    let gw = model.grid.width;
    let gh = model.grid.height;
    let shade = model.is_shade_layout();
    let contents_y = window.y as f32;
    let contents_h = window.height as f32;
    let grid_w = width / (gw - 1) as f32;

    for clip in clips {
        let (x1, y1, x2, y2) = (clip.x(), clip.y(), clip.right(), clip.bottom());
        if x2 <= x1 || y2 <= y1 {
            continue;
        }

        let band = if !shade {
            Band::Contents
        } else if y1 < contents_y {
            Band::Header
        } else if y2 > contents_y + contents_h {
            Band::Footer
        } else {
            Band::Contents
        };

        let grid_h = if shade {
            match band {
                Band::Header => model.top_height,
                Band::Footer => model.bottom_height,
                Band::Contents => {
                    (height - model.top_height - model.bottom_height) / (gh - 3) as f32
                }
            }
        } else {
            height / (gh - 1) as f32
        };

        let row_at = |y: f32| -> Row {
            let (top_iy_f, apply_offsets) = if shade {
                match band {
                    Band::Header => {
                        let f = if model.top_height > 0.0 {
                            (y - wy) / model.top_height
                        } else {
                            0.0
                        };
                        (f.min(0.999), false)
                    }
                    Band::Footer => {
                        let f = if model.bottom_height > 0.0 {
                            (y - contents_y - contents_h) / model.bottom_height
                        } else {
                            0.0
                        };
                        ((gh - 2) as f32 + f, false)
                    }
                    Band::Contents => {
                        let f = if contents_h > 0.0 {
                            (gh - 3) as f32 * (y - contents_y) / contents_h
                        } else {
                            0.0
                        };
                        (f + 1.0, true)
                    }
                }
            } else {
                ((gh - 1) as f32 * (y - wy) / height, true)
            };
            let top_iy = ((top_iy_f + 1e-4).max(0.0) as usize).min(gh - 2);
            Row {
                y,
                top_iy,
                in_y: top_iy_f - top_iy as f32,
                apply_offsets,
            }
        };

        // Vertex rows land on grid lines between the clip edges
        let mut rows = Vec::new();
        let mut y = y1;
        loop {
            let row = row_at(y.min(y2));
            let next = if grid_h <= 0.0 {
                y2
            } else if shade {
                row.y + grid_h
            } else {
                (row.top_iy + 1) as f32 * grid_h + wy
            };
            let done = row.y >= y2;
            rows.push(row);
            if done {
                break;
            }
            y = if next > y { next } else { y2 };
        }

        let mut columns = Vec::new();
        let mut x = x1;
        loop {
            let x_c = x.min(x2);
            let left_f = (gw - 1) as f32 * (x_c - wx) / width;
            let left = ((left_f + 1e-4).max(0.0) as usize).min(gw - 2);
            columns.push((x_c, left, left_f - left as f32));
            if x_c >= x2 {
                break;
            }
            let next = (left + 1) as f32 * grid_w + wx;
            x = if next > x_c { next } else { x2 };
        }

        if rows.len() < 2 || columns.len() < 2 {
            continue;
        }

        // Deformed positions and texture rows
        let mut prev_cell_width = 0.0f32;
        let mut tops: Vec<Vertex> = Vec::new();
        let mut prev_tops: Vec<Vertex>;

        for (j, row) in rows.iter().enumerate() {
            let mut bottoms = Vec::with_capacity(columns.len());
            let mut new_tops = Vec::with_capacity(columns.len());
            let mut deformed_xs = Vec::with_capacity(columns.len());

            for &(x, left, in_x) in &columns {
                let tl = model.point(left, row.top_iy);
                let tr = model.point(left + 1, row.top_iy);
                let bl = model.point(left, row.top_iy + 1);
                let br = model.point(left + 1, row.top_iy + 1);

                let hor1 = Vec3::lerp(tl.position, tr.position, in_x);
                let hor2 = Vec3::lerp(bl.position, br.position, in_x);
                let mut deformed = Vec3::lerp(hor1, hor2, row.in_y);
                if !uses_3d {
                    deformed.z = 0.0;
                }
                deformed_xs.push(deformed.x);

                let after = if row.apply_offsets && row.y < y2 {
                    tl.tex_offset_after.y
                } else {
                    0.0
                };
                let before = if row.apply_offsets && tl.tex_offset_before.y != 0.0 {
                    tl.tex_offset_before.y
                } else {
                    after
                };
                new_tops.push(Vertex::new(deformed, x, row.y + after));
                bottoms.push(Vertex::new(deformed, x, row.y + before));
            }

            let cell_width = deformed_xs[1] - deformed_xs[0];
            if j > 0 {
                let q = if use_q && prev_cell_width != 0.0 {
                    let q = cell_width / prev_cell_width;
                    if q.is_finite() && q > 0.0 {
                        q
                    } else {
                        1.0
                    }
                } else {
                    1.0
                };

                prev_tops = std::mem::take(&mut tops);
                for c in 0..columns.len() - 1 {
                    geometry.faces.push(Face::quad([
                        bottoms[c].with_q(q),
                        bottoms[c + 1].with_q(q),
                        prev_tops[c + 1],
                        prev_tops[c],
                    ]));
                }
            }
            prev_cell_width = cell_width;
            tops = new_tops;
        }
    }

    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::WindowEvent;
    use crate::model::GridSize;
    use wisp_core::WindowId;

    fn window() -> WindowInfo {
        WindowInfo::new(WindowId(1), 100, 100, 200, 100)
    }

    #[test]
    fn test_rest_grid_reproduces_window() {
        let w = window();
        let model = Model::new(&w, WindowEvent::Minimize, GridSize::new(3, 3)).unwrap();
        let g = grid_geometry(&model, &w, &[w.outer_rect()], false, false);
        assert_eq!(g.len(), 4);
        for face in &g.faces {
            for v in &face.vertices {
                assert!((v.position.x - v.tex[0]).abs() < 1e-3);
                assert!((v.position.y - v.tex[1]).abs() < 1e-3);
                assert_eq!(v.tex[3], 1.0);
            }
        }
    }

    #[test]
    fn test_partial_clip_is_cut_on_clip_edges() {
        let w = window();
        let model = Model::new(&w, WindowEvent::Minimize, GridSize::new(2, 2)).unwrap();
        let clip = Rect::new(150.0, 120.0, 50.0, 30.0);
        let g = grid_geometry(&model, &w, &[clip], false, false);
        assert_eq!(g.len(), 1);
        let xs: Vec<f32> = g.faces[0].vertices.iter().map(|v| v.position.x).collect();
        assert!(xs.iter().all(|x| (150.0..=200.0).contains(x)));
    }

    #[test]
    fn test_q_coordinates_follow_row_width() {
        let w = window();
        let mut model = Model::new(&w, WindowEvent::Minimize, GridSize::new(2, 2)).unwrap();
        // Pinch the bottom row to half width
        model.points[2].position.x = 150.0;
        model.points[3].position.x = 250.0;
        let g = grid_geometry(&model, &w, &[w.outer_rect()], false, true);
        let bottom = g.faces[0].vertices[0];
        assert!((bottom.tex[3] - 0.5).abs() < 1e-4);
        let top = g.faces[0].vertices[3];
        assert_eq!(top.tex[3], 1.0);
    }

    #[test]
    fn test_empty_clip_list() {
        let w = window();
        let model = Model::new(&w, WindowEvent::Open, GridSize::new(2, 2)).unwrap();
        assert!(grid_geometry(&model, &w, &[], false, false).is_empty());
    }
}
