//! Polygon engine
//!
//! Breaks a window into rigid pieces (rectangles, hexagons or glass shards),
//! extrudes each piece into a thin slab and moves every slab along its own
//! path. Pieces are textured from where they sat at rest, so a piece keeps
//! showing the same patch of the window wherever it flies.
//!
//! Effects built on this module implement [`PolygonEffect`]: they build a
//! [`PolygonSet`] once when the animation starts and place its pieces on
//! every step. [`Polygons`] turns such an effect into an engine [`Effect`].
//!
//! Depth inside a set is kept in screen-width units (the compositor's
//! normalised z) while x and y stay in pixels.

use smallvec::SmallVec;
use wisp_animation::effect::{default_init, default_step, screen_bounding_box};
use wisp_animation::progress::decelerate;
use wisp_animation::{
    AnimContext, Effect, EventSet, Face, Geometry, ParamSpec, ParamView, Vertex, WindowEvent,
    ZoomStyle,
};
use wisp_core::{
    DamageBox, Mat4, Point, Rect, Result, ScreenInfo, ScreenProjection, Vec3, WindowInfo,
    WispError,
};

/// Smallest side of a rectangle piece, px
pub const MIN_RECT_CELL: f32 = 10.0;
/// Smallest side of a hexagon cell, px
pub const MIN_HEX_CELL: f32 = 20.0;
/// Glass needs at least this much room on both axes, px
pub const MIN_GLASS_SIZE: f32 = 100.0;

/// How a window is cut into pieces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tessellation {
    Rectangles,
    Hexagons,
    Glass,
}

impl Tessellation {
    /// Option index: 0 rectangles, 1 hexagons, 2 glass
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Rectangles),
            1 => Some(Self::Hexagons),
            2 => Some(Self::Glass),
            _ => None,
        }
    }
}

/// Where the perspective skew is centred
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Perspective {
    #[default]
    None,
    /// One skew for the whole window, centred on the window
    Window,
    /// Each piece skewed around its own centre
    Polygon,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pieces
// ─────────────────────────────────────────────────────────────────────────────

/// One rigid piece of the window
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonObject {
    /// Front face outline relative to the centre, in order around the face
    pub outline: SmallVec<[Point; 6]>,
    /// Centre at rest (x, y in px, z in screen-width units)
    pub center_start: Vec3,
    pub center: Vec3,
    /// Centre as a fraction of the tessellated area
    pub rel_pos: Point,
    pub rot_axis: Vec3,
    /// Pivot of the rotation relative to the centre, px
    pub rot_axis_offset: Vec3,
    pub rot_angle: f32,
    pub rot_angle_start: f32,
    /// Displacement at the end of the move (z in px)
    pub final_rel_pos: Vec3,
    pub final_rot_angle: f32,
    /// Fractions of the animation
    pub move_start: f32,
    pub move_duration: f32,
    pub fade_start: f32,
    pub fade_duration: f32,
    /// Screen rectangle covered at rest
    pub bounds: Rect,
    /// Radius around the centre enclosing the whole slab, px
    pub sphere_radius: f32,
    /// Applied between the translation to the centre and the rotation
    pub extra_transform: Option<Mat4>,
}

impl PolygonObject {
    /// Piece at rest around `center`
    pub fn new(
        center: Vec3,
        rel_pos: Point,
        outline: SmallVec<[Point; 6]>,
        half_thickness_px: f32,
    ) -> Self {
        let mut min = Point::new(f32::MAX, f32::MAX);
        let mut max = Point::new(f32::MIN, f32::MIN);
        let mut radius = 0.0f32;
        for p in &outline {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            radius = radius.max((p.x * p.x + p.y * p.y + half_thickness_px * half_thickness_px).sqrt());
        }
        let (x1, y1) = (center.x + min.x, center.y + min.y);
        let bounds = Rect::new(
            x1,
            y1,
            (center.x + max.x).ceil() - x1,
            (center.y + max.y).ceil() - y1,
        );

        Self {
            outline,
            center_start: center,
            center,
            rel_pos,
            rot_axis: Vec3::ZERO,
            rot_axis_offset: Vec3::ZERO,
            rot_angle: 0.0,
            rot_angle_start: 0.0,
            final_rel_pos: Vec3::ZERO,
            final_rot_angle: 0.0,
            move_start: 0.0,
            move_duration: 1.0,
            fade_start: 0.0,
            fade_duration: 1.0,
            bounds,
            sphere_radius: radius,
            extra_transform: None,
        }
    }

    /// Fraction of this piece's own move completed at `progress`
    pub fn move_progress(&self, progress: f32) -> f32 {
        let mut moved = progress - self.move_start;
        if self.move_duration > 0.0 {
            moved /= self.move_duration;
        }
        moved.clamp(0.0, 1.0)
    }

    /// Put the piece `moved` of the way along its path
    pub fn place(&mut self, moved: f32, screen_width: f32) {
        self.center = Vec3::new(
            self.center_start.x + moved * self.final_rel_pos.x,
            self.center_start.y + moved * self.final_rel_pos.y,
            self.center_start.z + moved * self.final_rel_pos.z / screen_width,
        );
        self.rot_angle = moved * self.final_rot_angle + self.rot_angle_start;
    }

    pub fn step_linear(&mut self, progress: f32, screen_width: f32) {
        let moved = self.move_progress(progress);
        self.place(moved, screen_width);
    }

    pub fn step_decelerating(&mut self, progress: f32, screen_width: f32) {
        let moved = decelerate(self.move_progress(progress));
        self.place(moved, screen_width);
    }

    /// Local slab coordinates to screen
    pub fn transform(&self, skew: &Mat4, screen_width: f32) -> Mat4 {
        let c = self.center;
        let off = self.rot_axis_offset;
        let mut m = skew
            .translate(c.x, c.y, c.z)
            .scale_by(1.0, 1.0, 1.0 / screen_width);
        if let Some(extra) = &self.extra_transform {
            m = m.mul(extra);
        }
        m.translate(off.x, off.y, off.z)
            .rotate(self.rot_angle, self.rot_axis)
            .translate(-off.x, -off.y, -off.z)
            .scale_by(1.0, 1.0, screen_width)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clip cache
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
struct ClipEntry {
    clip: Rect,
    /// Clip actually applied to the faces
    bounds: Rect,
    /// Pieces whose rest bounds overlap the clip
    polygons: Vec<usize>,
}

/// Paint clips seen so far and the pieces each of them touches
///
/// Hosts repaint with the same clips frame after frame, so entries are kept
/// until a clip at the same position in the list changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipCache {
    entries: Vec<ClipEntry>,
}

impl ClipCache {
    /// Match the cache to this paint's clips, returning how many entries were rebuilt
    pub fn update(&mut self, clips: &[Rect], polygons: &[PolygonObject], border: Rect) -> usize {
        let keep = self
            .entries
            .iter()
            .zip(clips)
            .take_while(|(entry, clip)| entry.clip == **clip)
            .count();
        self.entries.truncate(keep);

        for clip in &clips[keep..] {
            // A clip covering exactly the window must not shave the pieces' edges
            let bounds = if *clip == border {
                clip.inflate(0.1)
            } else {
                *clip
            };
            let polygons = polygons
                .iter()
                .enumerate()
                .filter(|(_, p)| overlaps(&p.bounds, clip))
                .map(|(i, _)| i)
                .collect();
            self.entries.push(ClipEntry {
                clip: *clip,
                bounds,
                polygons,
            });
        }
        clips.len() - keep
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn overlaps(bounds: &Rect, clip: &Rect) -> bool {
    !(bounds.right() <= clip.x()
        || bounds.x() >= clip.right()
        || bounds.bottom() <= clip.y()
        || bounds.y() >= clip.bottom())
}

// ─────────────────────────────────────────────────────────────────────────────
// Polygon set
// ─────────────────────────────────────────────────────────────────────────────

/// All pieces of one animating window plus how to draw them
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonSet {
    pub polygons: Vec<PolygonObject>,
    /// Columns and rows of a grid tessellation (0 for glass)
    pub grid: (usize, usize),
    /// Slab thickness in screen-width units
    pub thickness: f32,
    /// Fade every piece together over this final fraction of the animation
    pub all_fade_duration: Option<f32>,
    /// Backs and sides fade in over this initial fraction
    pub back_and_sides_fade: f32,
    pub depth_test: bool,
    pub lighting: bool,
    pub perspective: Perspective,
    /// Tessellate the outer rectangle (shadows included) instead of the border
    pub include_shadows: bool,
    /// Ease piece fades out with the deceleration curve
    pub decelerating: bool,
    clips: ClipCache,
}

impl Default for PolygonSet {
    fn default() -> Self {
        Self::new(false)
    }
}

impl PolygonSet {
    pub fn new(include_shadows: bool) -> Self {
        Self {
            polygons: Vec::new(),
            grid: (0, 0),
            thickness: 0.0,
            all_fade_duration: None,
            back_and_sides_fade: 0.0,
            depth_test: false,
            lighting: false,
            perspective: Perspective::None,
            include_shadows,
            decelerating: false,
            clips: ClipCache::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn clip_cache(&self) -> &ClipCache {
        &self.clips
    }

    /// Refresh the clip cache for this paint; see [`ClipCache::update`]
    pub fn update_clips(&mut self, clips: &[Rect], border: Rect) -> usize {
        self.clips.update(clips, &self.polygons, border)
    }

    /// Area cut into pieces
    pub fn limits(&self, window: &WindowInfo) -> Rect {
        if self.include_shadows {
            let outer = window.outer_rect();
            Rect::new(outer.x(), outer.y(), outer.width() - 1.0, outer.height())
        } else {
            window.border_rect()
        }
    }

    fn start(&mut self, thickness_px: f32, screen_width: f32) -> f32 {
        self.polygons.clear();
        self.clips.clear();
        self.thickness = thickness_px / screen_width;
        self.thickness / 2.0
    }

    /// Cut into a `grid_x` × `grid_y` grid of rectangles
    ///
    /// Cells never get smaller than [`MIN_RECT_CELL`]; the grid is coarsened
    /// instead.
    pub fn tessellate_rectangles(
        &mut self,
        window: &WindowInfo,
        screen_width: f32,
        grid_x: usize,
        grid_y: usize,
        thickness_px: f32,
    ) -> Result<()> {
        let limits = self.limits(window);
        let gx = fit_grid(limits.width(), grid_x, MIN_RECT_CELL);
        let gy = fit_grid(limits.height(), grid_y, MIN_RECT_CELL);
        if gx == 0 || gy == 0 {
            return Err(WispError::Resource(format!(
                "window {}x{} too small to cut into rectangles",
                limits.width(),
                limits.height()
            )));
        }

        let half_z = self.start(thickness_px, screen_width);
        let cell_w = limits.width() / gx as f32;
        let cell_h = limits.height() / gy as f32;
        let (hw, hh) = (cell_w / 2.0, cell_h / 2.0);
        let outline: SmallVec<[Point; 6]> = SmallVec::from_slice(&[
            Point::new(-hw, -hh),
            Point::new(-hw, hh),
            Point::new(hw, hh),
            Point::new(hw, -hh),
        ]);

        self.polygons.reserve(gx * gy);
        for j in 0..gy {
            for i in 0..gx {
                let center = Vec3::new(
                    limits.x() + cell_w * (i as f32 + 0.5),
                    limits.y() + cell_h * (j as f32 + 0.5),
                    -half_z,
                );
                let rel = Point::new(
                    (i as f32 + 0.5) / gx as f32,
                    (j as f32 + 0.5) / gy as f32,
                );
                self.polygons.push(PolygonObject::new(
                    center,
                    rel,
                    outline.clone(),
                    thickness_px / 2.0,
                ));
            }
        }
        self.grid = (gx, gy);
        Ok(())
    }

    /// Cut into staggered rows of hexagons
    ///
    /// Even rows hold `grid_x` cells, odd rows one more; pieces on the edges
    /// are cut flat so the set covers exactly the window.
    pub fn tessellate_hexagons(
        &mut self,
        window: &WindowInfo,
        screen_width: f32,
        grid_x: usize,
        grid_y: usize,
        thickness_px: f32,
    ) -> Result<()> {
        let limits = self.limits(window);
        let gx = fit_grid(limits.width(), grid_x, MIN_HEX_CELL);
        let gy = fit_grid(limits.height(), grid_y, MIN_HEX_CELL);
        if gx == 0 || gy == 0 {
            return Err(WispError::Resource(format!(
                "window {}x{} too small to cut into hexagons",
                limits.width(),
                limits.height()
            )));
        }

        let half_z = self.start(thickness_px, screen_width);
        let cell_w = limits.width() / gx as f32;
        let cell_h = limits.height() / gy as f32;
        let hw = cell_w / 2.0;

        self.polygons.reserve((gy + 1) * gx + (gy + 1) / 2);
        for y in 0..=gy {
            let odd = y % 2 == 1;
            let columns = if odd { gx + 1 } else { gx };
            let pos_y = limits.y() + cell_h * y as f32;

            // Vertical extent: top point, upper corners, lower corners, bottom point
            let (top, upper, lower, bottom) = if y == 0 {
                (0.0, 0.0, cell_h / 3.0, 2.0 * cell_h / 3.0)
            } else if y == gy {
                (-2.0 * cell_h / 3.0, -cell_h / 3.0, 0.0, 0.0)
            } else {
                (
                    -2.0 * cell_h / 3.0,
                    -cell_h / 3.0,
                    cell_h / 3.0,
                    2.0 * cell_h / 3.0,
                )
            };

            for x in 0..columns {
                let (left, right) = if !odd {
                    (-hw, hw)
                } else if x == 0 {
                    (0.0, hw)
                } else if x == columns - 1 {
                    (-hw, 0.0)
                } else {
                    (-hw, hw)
                };
                let shift = if odd { 0.0 } else { 0.5 };
                let center = Vec3::new(limits.x() + cell_w * (x as f32 + shift), pos_y, -half_z);
                let rel = Point::new(
                    (x as f32 + 0.5) / gx as f32,
                    (y as f32 + 0.5) / gy as f32,
                );
                let outline = SmallVec::from_slice(&[
                    Point::new(0.0, top),
                    Point::new(left, upper),
                    Point::new(left, lower),
                    Point::new(0.0, bottom),
                    Point::new(right, lower),
                    Point::new(right, upper),
                ]);
                self.polygons.push(PolygonObject::new(
                    center,
                    rel,
                    outline,
                    thickness_px / 2.0,
                ));
            }
        }
        self.grid = (gx, gy);
        Ok(())
    }

    /// Shatter from the centre along `4 * spoke_multiplier` spokes
    ///
    /// Spokes start at the four corner directions with the rest spread
    /// between them and jittered by `random`. Each wedge between neighbouring
    /// spokes is cut into `tiers` rings.
    pub fn tessellate_glass(
        &mut self,
        window: &WindowInfo,
        screen_width: f32,
        spoke_multiplier: usize,
        tiers: usize,
        thickness_px: f32,
        mut random: impl FnMut() -> f32,
    ) -> Result<()> {
        use std::f32::consts::{FRAC_PI_2, PI, TAU};

        let limits = self.limits(window);
        if limits.width() < MIN_GLASS_SIZE || limits.height() < MIN_GLASS_SIZE {
            return Err(WispError::Resource(format!(
                "window {}x{} too small to shatter",
                limits.width(),
                limits.height()
            )));
        }
        let multiplier = spoke_multiplier.max(1);
        let tiers = tiers.max(1);
        let spokes = 4 * multiplier;

        let half_z = self.start(thickness_px, screen_width);
        let c = limits.center();
        let a0 = ((c.y - limits.y()) / (limits.right() - c.x)).atan();
        let corners = [a0, PI - a0, PI + a0, TAU - a0];

        let rings: Vec<SmallVec<[Point; 8]>> = (0..spokes)
            .map(|i| {
                let corner = i / multiplier;
                let step = i % multiplier;
                let direction = if step == 0 {
                    corners[corner]
                } else {
                    let next = corners[(corner + 1) % 4];
                    let mut range = next - corners[corner];
                    if range < 0.0 {
                        range = TAU - corners[corner] + next;
                    }
                    let mut d = corners[corner] + step as f32 * range / multiplier as f32;
                    if d > TAU {
                        d -= TAU;
                    }
                    d + range * random() / 3.0
                };

                let vertical = if direction < PI {
                    c.y - limits.y()
                } else {
                    limits.bottom() - c.y
                };
                let horizontal = if direction < FRAC_PI_2 || direction > 3.0 * FRAC_PI_2 {
                    limits.right() - c.x
                } else {
                    c.x - limits.x()
                };
                let length = (vertical / direction.sin())
                    .abs()
                    .min((horizontal / direction.cos()).abs());

                (0..tiers)
                    .map(|j| {
                        let dist = (j + 1) as f32 / tiers as f32 * length;
                        Point::new(c.x + dist * direction.cos(), c.y + dist * direction.sin())
                    })
                    .collect()
            })
            .collect();

        self.polygons.reserve(spokes * tiers);
        for i in 0..spokes {
            let (a, b) = (&rings[i], &rings[(i + 1) % spokes]);
            for j in 0..tiers {
                let (quad, piece_center) = if j == 0 {
                    let pts = [c, a[0], b[0], c];
                    let centroid = Point::new(
                        (c.x + a[0].x + b[0].x) / 3.0,
                        (c.y + a[0].y + b[0].y) / 3.0,
                    );
                    (pts, centroid)
                } else {
                    let pts = [a[j - 1], a[j], b[j], b[j - 1]];
                    let centroid = Point::new(
                        pts.iter().map(|p| p.x).sum::<f32>() / 4.0,
                        pts.iter().map(|p| p.y).sum::<f32>() / 4.0,
                    );
                    (pts, centroid)
                };
                let outline = quad
                    .iter()
                    .rev()
                    .map(|p| Point::new(p.x - piece_center.x, p.y - piece_center.y))
                    .collect();
                let rel = Point::new(
                    (piece_center.x - limits.x()) / limits.width(),
                    (piece_center.y - limits.y()) / limits.height(),
                );
                self.polygons.push(PolygonObject::new(
                    Vec3::new(piece_center.x, piece_center.y, -half_z),
                    rel,
                    outline,
                    thickness_px / 2.0,
                ));
            }
        }
        self.grid = (0, 0);
        Ok(())
    }

    /// Pieces with hand-made outlines sharing one centre
    ///
    /// `center` is relative to the tessellated area's origin.
    pub fn tessellate_outlines<I>(
        &mut self,
        window: &WindowInfo,
        screen_width: f32,
        center: Point,
        outlines: I,
        thickness_px: f32,
    ) -> Result<()>
    where
        I: IntoIterator<Item = SmallVec<[Point; 6]>>,
    {
        let limits = self.limits(window);
        if limits.width() <= 0.0 || limits.height() <= 0.0 {
            return Err(WispError::Resource(format!(
                "window {}x{} has nothing to cut",
                limits.width(),
                limits.height()
            )));
        }
        let half_z = self.start(thickness_px, screen_width);
        let rel = Point::new(center.x / limits.width(), center.y / limits.height());
        let center = Vec3::new(limits.x() + center.x, limits.y() + center.y, -half_z);
        self.polygons.extend(
            outlines
                .into_iter()
                .map(|outline| PolygonObject::new(center, rel, outline, thickness_px / 2.0)),
        );
        self.grid = (0, 0);
        Ok(())
    }

    /// Opacity of a piece relative to the window at `progress`
    pub fn fade_factor(&self, polygon: &PolygonObject, progress: f32) -> f32 {
        let (passed, duration) = match self.all_fade_duration {
            Some(all) => (progress - (1.0 - all), all),
            None => (progress - polygon.fade_start, polygon.fade_duration),
        };
        if passed <= 1e-5 {
            return 1.0;
        }
        if duration <= 0.0 {
            return 0.0;
        }
        let faded = (passed / duration).min(1.0);
        let faded = if self.decelerating {
            decelerate(faded)
        } else {
            faded
        };
        (1.0 - faded).clamp(0.0, 1.0)
    }

    /// Faces for every cached clip, opaque pieces first
    ///
    /// `opacity` is the window's paint opacity; face opacities are relative
    /// to it. `skew_at` yields the perspective skew around a screen point.
    pub fn geometry(
        &self,
        progress: f32,
        opacity: f32,
        screen_width: f32,
        window_center: Point,
        skew_at: impl Fn(Point) -> Mat4,
    ) -> Geometry {
        let mut geometry = Geometry {
            faces: Vec::new(),
            depth_test: self.depth_test,
            lighting: self.lighting,
        };
        let window_skew = match self.perspective {
            Perspective::Window => skew_at(window_center),
            _ => Mat4::IDENTITY,
        };

        for opaque_pass in [true, false] {
            for entry in &self.clips.entries {
                for &index in &entry.polygons {
                    let polygon = &self.polygons[index];
                    let factor = self.fade_factor(polygon, progress);
                    let absolute = opacity * factor;
                    if absolute < 1e-5 || (absolute > 0.9999) != opaque_pass {
                        continue;
                    }
                    let skew = match self.perspective {
                        Perspective::None => Mat4::IDENTITY,
                        Perspective::Window => window_skew,
                        Perspective::Polygon => {
                            skew_at(Point::new(polygon.center.x, polygon.center.y))
                        }
                    };
                    let transform = polygon.transform(&skew, screen_width);
                    self.push_faces(
                        polygon,
                        transform,
                        factor,
                        progress,
                        entry.bounds,
                        &mut geometry.faces,
                    );
                }
            }
        }
        geometry
    }

    /// Back, sides, then front of one slab
    fn push_faces(
        &self,
        polygon: &PolygonObject,
        transform: Mat4,
        opacity: f32,
        progress: f32,
        clip: Rect,
        out: &mut Vec<Face>,
    ) {
        let half = self.thickness / 2.0;
        let origin = polygon.center_start;
        let vertex = |p: &Point, z: f32| Vertex::new(Vec3::new(p.x, p.y, z), p.x + origin.x, p.y + origin.y);
        let face = |vertices: SmallVec<[Vertex; 4]>, normal: Vec3, opacity: f32| Face {
            vertices,
            transform: Some(transform),
            opacity,
            normal: Some(normal),
            clip: Some(clip),
        };

        let back_opacity = if self.back_and_sides_fade > 0.0 && progress <= self.back_and_sides_fade
        {
            opacity * progress / self.back_and_sides_fade
        } else {
            opacity
        };

        if back_opacity > 1e-5 {
            let back = polygon.outline.iter().rev().map(|p| vertex(p, -half)).collect();
            out.push(face(back, -Vec3::Z, back_opacity));

            if half > 0.0 {
                let n = polygon.outline.len();
                for i in 0..n {
                    let a = polygon.outline[i];
                    let b = polygon.outline[(i + 1) % n];
                    let mut normal = Vec3::new(-(b.y - a.y), b.x - a.x, 0.0);
                    if normal.length() <= f32::EPSILON {
                        continue;
                    }
                    let mid = Vec3::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, 0.0);
                    if normal.dot(mid) < 0.0 {
                        normal = -normal;
                    }
                    let side = SmallVec::from_buf([
                        vertex(&a, half),
                        vertex(&b, half),
                        vertex(&b, -half),
                        vertex(&a, -half),
                    ]);
                    out.push(face(side, normal.normalize(), back_opacity));
                }
            }
        }

        let front = polygon.outline.iter().map(|p| vertex(p, half)).collect();
        out.push(face(front, Vec3::Z, opacity));
    }

    /// Project every slab's bounding cube
    ///
    /// Returns `false` once a corner falls behind the camera.
    pub fn expand_bounding_box(
        &self,
        projection: &ScreenProjection,
        screen_width: f32,
        window_center: Point,
        bb: &mut DamageBox,
    ) -> bool {
        let skew_at = |p: Point| {
            let (sx, sy) = projection.output().perspective_skew(p);
            Mat4::IDENTITY.with_perspective_skew(sx, sy)
        };
        let window_skew = skew_at(window_center);

        for polygon in &self.polygons {
            let skew = match self.perspective {
                Perspective::None => Mat4::IDENTITY,
                Perspective::Window => window_skew,
                Perspective::Polygon => skew_at(Point::new(polygon.center.x, polygon.center.y)),
            };
            let off = polygon.rot_axis_offset;
            let c = Vec3::new(
                polygon.center.x + off.x,
                polygon.center.y + off.y,
                polygon.center.z + off.z / screen_width,
            );
            let radius = polygon.sphere_radius + 2.0 + off.x.abs().max(off.y.abs()).max(off.z.abs());
            let zr = radius / screen_width;
            let corners = [
                (-1.0, -1.0, -1.0),
                (1.0, -1.0, -1.0),
                (-1.0, 1.0, -1.0),
                (1.0, 1.0, -1.0),
                (-1.0, -1.0, 1.0),
                (1.0, -1.0, 1.0),
                (-1.0, 1.0, 1.0),
                (1.0, 1.0, 1.0),
            ]
            .map(|(x, y, z)| Vec3::new(c.x + x * radius, c.y + y * radius, c.z + z * zr));
            if !projection.expand_box(&skew, corners, bb) {
                return false;
            }
        }
        true
    }
}

/// Cells along one axis so none is smaller than `min_cell`
fn fit_grid(extent: f32, wanted: usize, min_cell: f32) -> usize {
    if wanted == 0 || extent / wanted as f32 >= min_cell {
        wanted
    } else {
        (extent / min_cell) as usize
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Effect adapter
// ─────────────────────────────────────────────────────────────────────────────

/// What a piece choreography may read while placing pieces
pub struct StepFrame<'f> {
    pub progress: f32,
    pub event: WindowEvent,
    pub screen: &'f ScreenInfo,
    pub border: Rect,
    pub icon: Rect,
    pub params: &'f ParamView<'f>,
}

impl StepFrame<'_> {
    pub fn screen_width(&self) -> f32 {
        self.screen.width as f32
    }
}

/// An effect that moves a window's pieces
pub trait PolygonEffect: Send + Sync {
    fn name(&self) -> &'static str;

    fn params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Cut the window and give every piece its path
    ///
    /// May stretch the animation through [`AnimContext::stretch_duration`].
    fn build(&self, ctx: &mut AnimContext) -> Result<PolygonSet>;

    /// Place the pieces for this step
    fn step_polygons(&self, frame: &StepFrame, set: &mut PolygonSet) {
        let screen_width = frame.screen_width();
        for polygon in &mut set.polygons {
            polygon.step_linear(frame.progress, screen_width);
        }
    }

    /// Runs after the pieces were placed
    fn after_step(&self, _ctx: &mut AnimContext) {}

    /// Damage the whole screen instead of the pieces' bounds
    fn damages_whole_screen(&self) -> bool {
        false
    }
}

/// Engine [`Effect`] for a [`PolygonEffect`]
pub struct Polygons<E>(pub E);

impl<E: PolygonEffect> Effect for Polygons<E> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn events(&self) -> EventSet {
        EventSet::OPEN_CLOSE_MINIMIZE
    }

    fn params(&self) -> Vec<ParamSpec> {
        self.0.params()
    }

    fn uses_custom_geometry(&self) -> bool {
        true
    }

    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        default_init(ctx);
        let set = self.0.build(ctx)?;
        tracing::debug!(
            window = ?ctx.id,
            effect = self.0.name(),
            pieces = set.len(),
            "Window cut into pieces"
        );
        ctx.state.set_data(set);
        Ok(())
    }

    fn step(&self, ctx: &mut AnimContext, _ms: f32) {
        default_step(false, ZoomStyle::Plain, ctx);
        let frame = StepFrame {
            progress: ctx.progress(),
            event: ctx.state.event,
            screen: ctx.screen,
            border: ctx.window.border_rect(),
            icon: ctx.state.icon,
            params: &ctx.params,
        };
        if let Some(set) = ctx.state.data_mut::<PolygonSet>() {
            self.0.step_polygons(&frame, set);
        }
        self.0.after_step(ctx);
    }

    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        if self.0.damages_whole_screen() {
            screen_bounding_box(ctx, bb);
            return;
        }
        if let Some(set) = ctx.state.data::<PolygonSet>() {
            let projected =
                set.expand_bounding_box(projection, ctx.screen.width as f32, ctx.outer().center(), bb);
            if !projected {
                // A piece reached the camera
                screen_bounding_box(ctx, bb);
            }
        }
    }

    fn custom_geometry(&self, ctx: &mut AnimContext, clips: &[Rect]) -> Option<Geometry> {
        let progress = ctx.progress();
        let opacity = ctx.window.opacity;
        let screen = ctx.screen;
        let border = ctx.window.border_rect();
        let window_center = ctx.outer().center();

        let set = ctx.state.data_mut::<PolygonSet>()?;
        set.update_clips(clips, border);

        Some(set.geometry(
            progress,
            opacity,
            screen.width as f32,
            window_center,
            |p| {
                let (sx, sy) = screen.output_at(p).perspective_skew(p);
                Mat4::IDENTITY.with_perspective_skew(sx, sy)
            },
        ))
    }

    fn cleanup(&self, ctx: &mut AnimContext) {
        ctx.state.clear_data();
    }

    fn refresh(&self, ctx: &mut AnimContext, initialized: bool) {
        if !initialized {
            ctx.state.clear_data();
        }
    }
}
