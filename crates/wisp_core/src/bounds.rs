//! Integer damage boxes and the per-window bounding-box accumulator
//!
//! A [`DamageBox`] starts out as an inverted sentinel (`x1 > x2`) so that the
//! first expansion initializes it. Coordinates are clamped to the 16-bit range
//! compositors use for damage rectangles.

use crate::geometry::Rect;
use smallvec::SmallVec;

const MAX_COORD: i32 = i16::MAX as i32;
const MIN_COORD: i32 = i16::MIN as i32;

/// Axis-aligned integer box in screen space (`x2`/`y2` exclusive)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Default for DamageBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl DamageBox {
    /// Inverted sentinel; any expansion replaces it
    pub const EMPTY: DamageBox = DamageBox {
        x1: MAX_COORD,
        y1: MAX_COORD,
        x2: MIN_COORD,
        y2: MIN_COORD,
    };

    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box covering a floating point rectangle
    pub fn from_rect(rect: &Rect) -> Self {
        Self::new(
            rect.x().floor() as i32,
            rect.y().floor() as i32,
            rect.right().ceil() as i32,
            rect.bottom().ceil() as i32,
        )
    }

    /// Whether the box has been expanded since the last reset
    pub fn is_initialized(&self) -> bool {
        self.x1 != MAX_COORD
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Grow to include a point
    ///
    /// The first point of an empty box produces a 1x1 box.
    pub fn expand_with_point(&mut self, fx: f32, fy: f32) {
        let x = clamp_coord(fx);
        let y = clamp_coord(fy);

        if !self.is_initialized() {
            *self = Self::new(x, y, x + 1, y + 1);
            return;
        }
        if x < self.x1 {
            self.x1 = x;
        } else if x > self.x2 {
            self.x2 = x;
        }
        if y < self.y1 {
            self.y1 = y;
        } else if y > self.y2 {
            self.y2 = y;
        }
    }

    /// Grow to include another box
    pub fn expand_with_box(&mut self, other: &DamageBox) {
        self.x1 = self.x1.min(other.x1);
        self.y1 = self.y1.min(other.y1);
        self.x2 = self.x2.max(other.x2);
        self.y2 = self.y2.max(other.y2);
    }

    /// Whether `other` lies completely inside this box
    pub fn contains_box(&self, other: &DamageBox) -> bool {
        other.x1 >= self.x1 && other.y1 >= self.y1 && other.x2 <= self.x2 && other.y2 <= self.y2
    }

    /// Rectangle grown by `margin` pixels on every side
    pub fn inflated(&self, margin: i32) -> DamageRect {
        DamageRect {
            x: self.x1 - margin,
            y: self.y1 - margin,
            width: self.width() + margin * 2,
            height: self.height() + margin * 2,
        }
    }
}

fn clamp_coord(v: f32) -> i32 {
    // Saturating float-to-int cast, then clamp into the 16-bit range
    (v as i32).clamp(MIN_COORD, MAX_COORD - 1)
}

/// Damage rectangle handed to the compositor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DamageRect {
    pub fn contains(&self, other: &DamageRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

/// Damage region: union of at most a couple of rectangles
pub type DamageRegion = SmallVec<[DamageRect; 2]>;

/// Tracks a window's screen-space envelope across frames
///
/// `current` is rebuilt every step; `previous` keeps what was painted during the
/// last frame so the reported damage covers both the old and new footprint.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundingBoxAccumulator {
    pub current: DamageBox,
    pub previous: DamageBox,
}

impl BoundingBoxAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset both boxes to the sentinel
    pub fn reset(&mut self) {
        self.current = DamageBox::EMPTY;
        self.previous = DamageBox::EMPTY;
    }

    /// Remember the current box and start a fresh one
    pub fn copy_reset(&mut self) {
        self.previous = self.current;
        self.current = DamageBox::EMPTY;
    }

    pub fn expand_with_point(&mut self, x: f32, y: f32) {
        self.current.expand_with_point(x, y);
    }

    pub fn expand_with_box(&mut self, other: &DamageBox) {
        self.current.expand_with_box(other);
    }

    /// Union of the current and previous boxes, each with a 1px margin
    ///
    /// Returns an empty region while the current box is still the sentinel.
    pub fn damage(&self) -> DamageRegion {
        let mut region = DamageRegion::new();
        if !self.current.is_initialized() {
            return region;
        }
        region.push(self.current.inflated(1));
        if self.previous.is_initialized() {
            let prev = self.previous.inflated(1);
            if !region[0].contains(&prev) {
                region.push(prev);
            }
        }
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_point_initializes_box() {
        let mut bb = DamageBox::EMPTY;
        assert!(!bb.is_initialized());

        bb.expand_with_point(10.4, 20.9);
        assert_eq!(bb, DamageBox::new(10, 20, 11, 21));

        bb.expand_with_point(5.0, 30.0);
        assert_eq!(bb, DamageBox::new(5, 20, 11, 30));
    }

    #[test]
    fn test_expand_with_box_from_sentinel() {
        let mut bb = DamageBox::EMPTY;
        bb.expand_with_box(&DamageBox::new(0, 0, 100, 50));
        assert_eq!(bb, DamageBox::new(0, 0, 100, 50));
        assert!(bb.is_initialized());
    }

    #[test]
    fn test_points_are_clamped_to_short_range() {
        let mut bb = DamageBox::EMPTY;
        bb.expand_with_point(1.0e9, -1.0e9);
        assert_eq!(bb.x1, i16::MAX as i32 - 1);
        assert_eq!(bb.y1, i16::MIN as i32);
    }

    #[test]
    fn test_damage_is_union_with_margin() {
        let mut acc = BoundingBoxAccumulator::new();
        acc.expand_with_box(&DamageBox::new(0, 0, 10, 10));
        acc.copy_reset();
        acc.expand_with_box(&DamageBox::new(20, 20, 30, 30));

        let region = acc.damage();
        assert_eq!(region.len(), 2);
        assert_eq!(
            region[0],
            DamageRect {
                x: 19,
                y: 19,
                width: 12,
                height: 12
            }
        );
        assert_eq!(
            region[1],
            DamageRect {
                x: -1,
                y: -1,
                width: 12,
                height: 12
            }
        );
    }

    #[test]
    fn test_uninitialized_box_reports_no_damage() {
        let mut acc = BoundingBoxAccumulator::new();
        acc.expand_with_box(&DamageBox::new(0, 0, 10, 10));
        acc.copy_reset();
        assert!(acc.damage().is_empty());
    }
}
