//! Focus Fade
//!
//! A raised (or lowered) window cross-fades between its old and new stacking
//! positions. The engine paints it twice through the window walker: once at
//! the old position fading out and once at the new position fading in.

use crate::effect::{window_bounding_box, AnimContext, Effect};
use crate::event::{EventKind, EventSet};
use crate::paint::PaintAttributes;
use crate::progress::{decelerate, decelerate_custom};
use wisp_core::{DamageBox, ScreenProjection};

/// Opacity of one copy of a cross-fading window
///
/// Translucent windows would look too light where both copies overlap, so
/// the fade curve depends on the window's own opacity. Lowering swaps which
/// copy is treated as the new one.
pub fn cross_fade_opacity(
    progress: f32,
    opacity: f32,
    has_alpha: bool,
    over_new_copy: bool,
    lowering: bool,
) -> f32 {
    let progress = if over_new_copy { progress } else { 1.0 - progress };
    let new_copy = over_new_copy != lowering;

    let multiplier = if has_alpha || (new_copy && opacity >= 0.91) {
        decelerate(progress)
    } else if opacity > 0.94 {
        decelerate_custom(progress, 0.55, 1.32)
    } else if opacity >= 0.91 {
        decelerate_custom(progress, 0.62, 0.92)
    } else if opacity >= 0.89 {
        decelerate(progress)
    } else if opacity >= 0.84 {
        decelerate_custom(progress, 0.64, 0.80)
    } else if opacity >= 0.79 {
        decelerate_custom(progress, 0.67, 0.77)
    } else if opacity >= 0.54 {
        decelerate_custom(progress, 0.61, 0.69)
    } else {
        progress
    };

    (opacity * (1.0 - multiplier)).clamp(0.0, 1.0)
}

pub struct FocusFade;

impl Effect for FocusFade {
    fn name(&self) -> &'static str {
        "Focus Fade"
    }

    fn events(&self) -> EventSet {
        EventSet::EMPTY.with(EventKind::Focus)
    }

    fn host_draws_geometry(&self) -> bool {
        true
    }

    fn reorders_paint(&self) -> bool {
        true
    }

    fn update_attributes(&self, ctx: &AnimContext, attrs: &mut PaintAttributes) {
        let lowering = ctx
            .chains
            .get(ctx.id)
            .and_then(|l| l.restack)
            .is_some_and(|r| !r.raised);
        attrs.opacity = cross_fade_opacity(
            ctx.progress(),
            attrs.opacity,
            ctx.window.has_alpha,
            ctx.over_new_copy,
            lowering,
        );
    }

    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        _projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        window_bounding_box(ctx, bb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_swap_roles_over_the_run() {
        assert!((cross_fade_opacity(0.0, 1.0, true, true, false) - 1.0).abs() < 1e-4);
        assert!(cross_fade_opacity(0.0, 1.0, true, false, false).abs() < 1e-4);
        assert!(cross_fade_opacity(1.0, 1.0, true, true, false).abs() < 1e-4);
        assert!((cross_fade_opacity(1.0, 1.0, true, false, false) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_translucent_windows_fade_linearly() {
        let o = cross_fade_opacity(0.25, 0.5, false, true, false);
        assert!((o - 0.375).abs() < 1e-5);
    }

    #[test]
    fn test_result_is_clamped() {
        for p in [0.0, 0.3, 0.7, 1.0] {
            let o = cross_fade_opacity(p, 0.95, false, false, true);
            assert!((0.0..=0.95).contains(&o));
        }
    }
}
