//! Compositor projection
//!
//! Reproduces the compositor's view setup: window coordinates are mapped into a
//! unit cube placed at `-DEFAULT_Z_CAMERA` in front of a 60° perspective camera,
//! so that an untransformed point at depth 0 lands on the same pixel it started
//! from. Effects with 3D transforms project their geometry through this to find
//! the on-screen footprint for damage.

use crate::bounds::DamageBox;
use crate::geometry::{Mat4, Point, Rect, Vec3};
use serde::{Deserialize, Serialize};

/// Camera distance that makes the unit square fill the 60° field of view
pub const DEFAULT_Z_CAMERA: f32 = 0.866_025_4;

const FOVY_DEGREES: f32 = 60.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// One output (monitor) of the screen, in screen coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub region: Rect,
}

impl Output {
    pub fn new(region: Rect) -> Self {
        Self { region }
    }

    pub fn width(&self) -> f32 {
        self.region.width()
    }

    pub fn height(&self) -> f32 {
        self.region.height()
    }

    /// Skew factors pulling depth toward the centre of this output
    pub fn perspective_skew(&self, center: Point) -> (f32, f32) {
        let skew_x = -(((center.x - self.region.x()) - self.width() / 2.0) * 1.15);
        let skew_y = -(((center.y - self.region.y()) - self.height() / 2.0) * 1.15);
        (skew_x, skew_y)
    }
}

/// View and projection for one output of a screen
#[derive(Clone, Debug)]
pub struct ScreenProjection {
    screen_height: f32,
    output: Output,
    view: Mat4,
    projection: Mat4,
}

impl ScreenProjection {
    pub fn new(screen_height: f32, output: Output) -> Self {
        let region = output.region;
        let view = Mat4::IDENTITY
            .translate(-0.5, -0.5, -DEFAULT_Z_CAMERA)
            .scale_by(1.0 / region.width(), -1.0 / region.height(), 1.0)
            .translate(-region.x(), -region.bottom(), 0.0);

        Self {
            screen_height,
            output,
            view,
            projection: perspective(FOVY_DEGREES, 1.0, Z_NEAR, Z_FAR),
        }
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Project a point through `transform` into screen coordinates
    ///
    /// Returns `None` when the point is on or behind the camera plane.
    pub fn project(&self, transform: &Mat4, p: Vec3) -> Option<Point> {
        let model_view = self.view.mul(transform);
        let eye = model_view.transform_vec4([p.x, p.y, p.z, 1.0]);
        let clip = self.projection.transform_vec4(eye);
        if clip[3] <= 0.0 {
            return None;
        }
        let ndc_x = clip[0] / clip[3];
        let ndc_y = clip[1] / clip[3];

        let region = self.output.region;
        let win_x = region.x() + (1.0 + ndc_x) * region.width() / 2.0;
        let win_y = region.y() + (1.0 + ndc_y) * region.height() / 2.0;

        Some(Point::new(win_x, self.screen_height - win_y))
    }

    /// Expand `bb` with the projections of `points`
    ///
    /// Stops at the first point that cannot be projected and reports `false`.
    pub fn expand_box(
        &self,
        transform: &Mat4,
        points: impl IntoIterator<Item = Vec3>,
        bb: &mut DamageBox,
    ) -> bool {
        for p in points {
            match self.project(transform, p) {
                Some(s) => bb.expand_with_point(s.x + 0.5, s.y + 0.5),
                None => return false,
            }
        }
        true
    }
}

/// Perspective projection matrix (gluPerspective)
fn perspective(fovy_degrees: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
    let f = 1.0 / (fovy_degrees.to_radians() / 2.0).tan();
    Mat4 {
        cols: [
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, (z_far + z_near) / (z_near - z_far), -1.0],
            [0.0, 0.0, 2.0 * z_far * z_near / (z_near - z_far), 0.0],
        ],
    }
}
