//! Built-in effects
//!
//! Registered as the `wisp` extension when an [`EffectRegistry`] is created.
//! `None` and `Random` come first so every event list starts with them.
//!
//! [`EffectRegistry`]: crate::registry::EffectRegistry

pub mod curved_fold;
pub mod dodge;
pub mod dream;
pub mod fade;
pub mod focus_fade;
pub mod glide;
pub mod horizontal_folds;
pub mod magic_lamp;
pub mod placeholder;
pub mod rollup;
pub mod wave;
pub mod zoom;

use crate::effect::Effect;
use crate::model::Model;
use crate::registry::{Extension, BUILTIN_EXTENSION};
use std::sync::Arc;
use wisp_core::{Point, WindowInfo};

pub use curved_fold::CurvedFold;
pub use dodge::Dodge;
pub use dream::Dream;
pub use fade::Fade;
pub use focus_fade::FocusFade;
pub use glide::Glide;
pub use horizontal_folds::HorizontalFolds;
pub use magic_lamp::MagicLamp;
pub use placeholder::{NoneEffect, RandomEffect};
pub use rollup::RollUp;
pub use wave::Wave;
pub use zoom::{Sidekick, Zoom};

/// The built-in effect set
pub struct Builtins;

impl Extension for Builtins {
    fn name(&self) -> &str {
        BUILTIN_EXTENSION
    }

    fn effects(&self) -> Vec<Arc<dyn Effect>> {
        vec![
            Arc::new(NoneEffect),
            Arc::new(RandomEffect),
            Arc::new(CurvedFold),
            Arc::new(Dodge),
            Arc::new(Dream),
            Arc::new(Fade),
            Arc::new(FocusFade),
            Arc::new(Glide::one()),
            Arc::new(Glide::two()),
            Arc::new(HorizontalFolds),
            Arc::new(MagicLamp::lamp()),
            Arc::new(RollUp),
            Arc::new(Sidekick),
            Arc::new(MagicLamp::vacuum()),
            Arc::new(Wave),
            Arc::new(Zoom),
        ]
    }
}

/// Undeformed screen position of a grid point under the model scale
pub(crate) fn rest_position(window: &WindowInfo, model: &Model, grid: Point) -> Point {
    let outer = window.outer_rect();
    Point::new(
        window.x as f32 + (outer.width() * grid.x - window.output.left as f32) * model.scale.x,
        window.y as f32 + (outer.height() * grid.y - window.output.top as f32) * model.scale.y,
    )
}

/// Whether a `zoom_from_center`-style parameter applies to the running event
///
/// 0 = off, 1 = minimize only, 2 = open/close only, 3 = always.
pub(crate) fn from_center_applies(mode: i64, event: crate::event::WindowEvent) -> bool {
    match mode {
        3 => true,
        1 => event.is_minimize(),
        2 => event.is_open_or_close(),
        _ => false,
    }
}
