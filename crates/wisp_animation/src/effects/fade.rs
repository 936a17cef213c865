//! Fade
//!
//! Plain opacity ramp; the host draws the window as usual.

use crate::effect::{window_bounding_box, AnimContext, Effect};
use crate::event::EventSet;
use crate::paint::PaintAttributes;
use wisp_core::{DamageBox, ScreenProjection};

pub struct Fade;

impl Effect for Fade {
    fn name(&self) -> &'static str {
        "Fade"
    }

    fn events(&self) -> EventSet {
        EventSet::OPEN_CLOSE_MINIMIZE
    }

    fn host_draws_geometry(&self) -> bool {
        true
    }

    fn update_attributes(&self, ctx: &AnimContext, attrs: &mut PaintAttributes) {
        attrs.opacity = ctx.state.stored_opacity * (1.0 - ctx.progress());
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
    use crate::event::WindowEvent;
    use crate::testing::Fixture;

    #[test]
    fn test_open_fades_in() {
        let mut f = Fixture::with_window(
            wisp_core::WindowInfo::new(wisp_core::WindowId(4), 0, 0, 50, 50).with_opacity(0.8),
        );
        f.start(WindowEvent::Open, 110.0);
        Fade.init(&mut f.ctx()).unwrap();

        let mut attrs = PaintAttributes::default();
        Fade.update_attributes(&f.ctx(), &mut attrs);
        assert!(attrs.opacity.abs() < 1e-5);

        f.state.remaining_time = 0.0;
        Fade.update_attributes(&f.ctx(), &mut attrs);
        assert!((attrs.opacity - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_damage_covers_window() {
        let mut f = Fixture::new();
        f.start(WindowEvent::Close, 100.0);
        let projection = ScreenProjection::new(800.0, f.screen.output_at(f.screen.center()));
        let mut bb = DamageBox::EMPTY;
        Fade.update_bounding_box(&f.ctx(), &projection, &mut bb);
        assert_eq!((bb.x1, bb.y1, bb.x2, bb.y2), (100, 100, 300, 200));
    }
}
