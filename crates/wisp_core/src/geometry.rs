//! Geometry primitives shared by the engine and its effects
//!
//! Screen space follows compositor conventions: origin at the top-left corner of
//! the screen, y growing downwards. Depth values used by 3D effects are expressed
//! in units of the screen width so that the same effect looks alike on every
//! resolution.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

// ─────────────────────────────────────────────────────────────────────────────
// Core Geometry Types
// ─────────────────────────────────────────────────────────────────────────────

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation between `a` and `b`
    pub fn lerp(a: Point, b: Point, t: f32) -> Point {
        Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }

    pub fn distance(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// 2D rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// A rectangle with no area covers nothing
    pub fn is_empty(&self) -> bool {
        self.size.width <= 0.0 || self.size.height <= 0.0
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.x < self.right()
            && point.y >= self.origin.y
            && point.y < self.bottom()
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.origin.x + dx, self.origin.y + dy, self.width(), self.height())
    }

    /// Grow the rectangle by `margin` on every side
    pub fn inflate(&self, margin: f32) -> Self {
        Self::new(
            self.origin.x - margin,
            self.origin.y - margin,
            self.width() + margin * 2.0,
            self.height() + margin * 2.0,
        )
    }

    /// Create from two corner points
    pub fn from_points(p1: Point, p2: Point) -> Self {
        let min_x = p1.x.min(p2.x);
        let min_y = p1.y.min(p2.y);
        let max_x = p1.x.max(p2.x);
        let max_y = p1.y.max(p2.y);
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Smallest rectangle containing both rectangles
    pub fn union(&self, other: &Rect) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::from_points(
            Point::new(self.x().min(other.x()), self.y().min(other.y())),
            Point::new(self.right().max(other.right()), self.bottom().max(other.bottom())),
        )
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x() < other.right()
            && other.x() < self.right()
            && self.y() < other.bottom()
            && other.y() < self.bottom()
    }

    /// Overlapping area of two rectangles, `None` when they are disjoint
    pub fn intersection(&self, other: &Rect) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        let x1 = self.x().max(other.x());
        let y1 = self.y().max(other.y());
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Some(Self::new(x1, y1, x2 - x1, y2 - y1))
    }
}

/// 3D vector
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const X: Vec3 = Vec3 {
        x: 1.0,
        y: 0.0,
        z: 0.0,
    };
    pub const Y: Vec3 = Vec3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };
    pub const Z: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len, self.z / len)
        } else {
            Self::ZERO
        }
    }

    pub fn dot(&self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
        a + (b - a) * t
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transforms
// ─────────────────────────────────────────────────────────────────────────────

/// 4x4 transformation matrix (column-major)
///
/// Composition helpers (`translate`, `scale_by`, `rotate`) post-multiply and
/// return a new matrix, so a chain reads in the order the operations apply to
/// the matrix, the last one being applied to a point first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [x, 0.0, 0.0, 0.0],
                [0.0, y, 0.0, 0.0],
                [0.0, 0.0, z, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation of `degrees` around an arbitrary axis (right-handed)
    pub fn rotation(degrees: f32, axis: Vec3) -> Self {
        let axis = axis.normalize();
        if axis == Vec3::ZERO {
            return Self::IDENTITY;
        }
        let (s, c) = degrees.to_radians().sin_cos();
        let t = 1.0 - c;
        let Vec3 { x, y, z } = axis;
        Self {
            cols: [
                [t * x * x + c, t * x * y + s * z, t * x * z - s * y, 0.0],
                [t * x * y - s * z, t * y * y + c, t * y * z + s * x, 0.0],
                [t * x * z + s * y, t * y * z - s * x, t * z * z + c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Multiply two matrices
    pub fn mul(&self, other: &Mat4) -> Mat4 {
        let mut result = [[0.0f32; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    result[i][j] += self.cols[k][j] * other.cols[i][k];
                }
            }
        }
        Mat4 { cols: result }
    }

    pub fn translate(&self, x: f32, y: f32, z: f32) -> Mat4 {
        self.mul(&Mat4::translation(x, y, z))
    }

    pub fn scale_by(&self, x: f32, y: f32, z: f32) -> Mat4 {
        self.mul(&Mat4::scale(x, y, z))
    }

    pub fn rotate(&self, degrees: f32, axis: Vec3) -> Mat4 {
        self.mul(&Mat4::rotation(degrees, axis))
    }

    /// Multiply a homogeneous vector
    pub fn transform_vec4(&self, v: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        for (row, value) in out.iter_mut().enumerate() {
            *value = self.cols[0][row] * v[0]
                + self.cols[1][row] * v[1]
                + self.cols[2][row] * v[2]
                + self.cols[3][row] * v[3];
        }
        out
    }

    /// Transform a point (w = 1) without perspective division
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let [x, y, z, _] = self.transform_vec4([p.x, p.y, p.z, 1.0]);
        Vec3::new(x, y, z)
    }

    /// Flatten depth into the homogeneous coordinate
    ///
    /// Scales z by 0 and turns it into a perspective divisor, so a tilted plane
    /// looks the same wherever it sits on the screen.
    pub fn perspective_distort_and_reset_z(&self, screen_width: f32) -> Mat4 {
        let v = -1.0 / screen_width;
        let mut m = *self;
        for row in 0..4 {
            m.cols[2][row] = v * self.cols[3][row];
        }
        m
    }

    /// Skew depth toward the output centre
    pub fn with_perspective_skew(&self, skew_x: f32, skew_y: f32) -> Mat4 {
        let mut m = *self;
        for row in 0..4 {
            m.cols[2][row] =
                skew_x * self.cols[0][row] + skew_y * self.cols[1][row] + self.cols[2][row];
        }
        m
    }

    /// Flat array view in column-major order
    pub fn to_cols_array(&self) -> [f32; 16] {
        let mut out = [0.0f32; 16];
        for (c, col) in self.cols.iter().enumerate() {
            out[c * 4..c * 4 + 4].copy_from_slice(col);
        }
        out
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Colors
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color with components in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbbaa` (alpha optional)
    pub fn from_hex_str(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        let byte = |i: usize| -> Option<f32> {
            let pair = hex.get(i..i + 2)?;
            u8::from_str_radix(pair, 16).ok().map(|b| b as f32 / 255.0)
        };
        match hex.len() {
            6 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, 1.0)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        Color::rgba(
            a.r + (b.r - a.r) * t,
            a.g + (b.g - a.g) * t,
            a.b + (b.b - a.b) * t,
            a.a + (b.a - a.a) * t,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_rect_union_and_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);

        let u = a.union(&b);
        assert_eq!(u, Rect::new(0.0, 0.0, 15.0, 15.0));

        let i = a.intersection(&b).unwrap();
        assert_eq!(i, Rect::new(5.0, 5.0, 5.0, 5.0));

        let c = Rect::new(20.0, 20.0, 1.0, 1.0);
        assert!(a.intersection(&c).is_none());
        assert_eq!(Rect::ZERO.union(&c), c);
    }

    #[test]
    fn test_translate_then_scale_about_point() {
        // Scaling by 2 around (10, 10) keeps that point fixed
        let m = Mat4::IDENTITY
            .translate(10.0, 10.0, 0.0)
            .scale_by(2.0, 2.0, 1.0)
            .translate(-10.0, -10.0, 0.0);

        let fixed = m.transform_point(Vec3::new(10.0, 10.0, 0.0));
        assert!(approx(fixed.x, 10.0) && approx(fixed.y, 10.0));

        let moved = m.transform_point(Vec3::new(11.0, 10.0, 0.0));
        assert!(approx(moved.x, 12.0));
    }

    #[test]
    fn test_rotation_about_z() {
        let m = Mat4::rotation(90.0, Vec3::Z);
        let p = m.transform_point(Vec3::X);
        assert!(approx(p.x, 0.0) && approx(p.y, 1.0));
    }

    #[test]
    fn test_perspective_distort_moves_depth_into_w() {
        let m = Mat4::IDENTITY.perspective_distort_and_reset_z(1000.0);
        let [_, _, z, w] = m.transform_vec4([0.0, 0.0, 100.0, 1.0]);
        assert!(approx(z, 0.0));
        assert!(approx(w, 0.9));
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex_str("#ff000080").unwrap();
        assert!(approx(c.r, 1.0));
        assert!(approx(c.a, 128.0 / 255.0));
        assert!(Color::from_hex_str("ff0000").is_none());
    }
}
