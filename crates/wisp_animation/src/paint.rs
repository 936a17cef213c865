//! Paint-time output of the engine

use crate::mesh::Sprite;
use wisp_core::{DamageRegion, Mat4, Rect, WindowId};

/// Per-window paint attributes, all in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintAttributes {
    pub opacity: f32,
    pub brightness: f32,
    pub saturation: f32,
}

impl Default for PaintAttributes {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            brightness: 1.0,
            saturation: 1.0,
        }
    }
}

impl PaintAttributes {
    pub fn with_opacity(opacity: f32) -> Self {
        Self {
            opacity,
            ..Default::default()
        }
    }
}

/// How the host should paint one animating window
#[derive(Clone, Debug, PartialEq)]
pub struct PaintInstructions {
    pub attributes: PaintAttributes,
    /// Window transform with the effect transform composed in
    pub transform: Mat4,
    /// Clip for the drawn geometry
    pub draw_region: Option<Rect>,
    /// Back-facing windows cull their front faces
    pub cull_front_faces: bool,
    /// The host draws its own geometry; only attributes and transform apply
    pub host_draws_geometry: bool,
    /// Sprites drawn on top, in window space
    pub sprites: Vec<Sprite>,
}

impl PaintInstructions {
    pub fn new(attributes: PaintAttributes, transform: Mat4) -> Self {
        Self {
            attributes,
            transform,
            draw_region: None,
            cull_front_faces: false,
            host_draws_geometry: false,
            sprites: Vec::new(),
        }
    }
}

/// Outcome of `paint_window`
#[derive(Clone, Debug, PartialEq)]
pub enum PaintDecision {
    /// Not animating; paint as usual
    Untouched,
    /// Do not paint this copy
    Skip,
    Paint(PaintInstructions),
}

/// Damage produced by one window during `prepare_paint`
#[derive(Clone, Debug, PartialEq)]
pub struct FrameDamage {
    pub window: WindowId,
    pub region: DamageRegion,
}

/// One entry of the paint order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaintStep {
    pub window: WindowId,
    /// The window is painted at its new stacking position (second copy)
    pub over_new_copy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_attributes_are_opaque() {
        let a = PaintAttributes::default();
        assert_eq!(a.opacity, 1.0);
        assert_eq!(PaintAttributes::with_opacity(0.5).brightness, 1.0);
    }
}
