//! Curved Fold
//!
//! The window bends away from the viewer along a curve while collapsing
//! toward its horizontal centre line. Shading collapses toward the title bar
//! instead, keeping the decorations flat.

use super::magic_lamp::lamp_grid_size;
use super::rest_position;
use super::zoom::fade_with_scale;
use crate::effect::{
    default_step, model_bounding_box, progress_and_center, transform_init, AnimContext, Effect,
    ZoomStyle,
};
use crate::event::{EventKind, EventSet};
use crate::model::GridSize;
use crate::options::ParamSpec;
use crate::paint::PaintAttributes;
use std::f32::consts::FRAC_PI_2;
use wisp_core::{DamageBox, Result, ScreenProjection};

/// Depth of a point at `rel_dist` from the fold line
fn fold_z(sin_progress: f32, rel_dist: f32, max_amp: f32, scale_x: f32) -> f32 {
    -(sin_progress * (1.0 - (2.0 * rel_dist).powf(1.3).powi(2)) * max_amp * scale_x)
}

/// Opacity shared by the fold effects
///
/// Shading keeps full opacity; minimizing to the icon fades with the zoom.
pub(crate) fn fold_attributes(zooms_to_icon: bool, ctx: &AnimContext, attrs: &mut PaintAttributes) {
    if ctx.state.event.is_shade() {
        return;
    }
    if zooms_to_icon {
        fade_with_scale(ZoomStyle::Plain, ctx, attrs);
    } else {
        attrs.opacity = ctx.state.stored_opacity * (1.0 - ctx.progress());
    }
}

pub struct CurvedFold;

impl Effect for CurvedFold {
    fn name(&self) -> &'static str {
        "Curved Fold"
    }

    fn events(&self) -> EventSet {
        EventSet::OPEN_CLOSE_MINIMIZE.with(EventKind::Shade)
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::float("curved_fold_amp_mult", 1.0, -1.5, 2.0),
            ParamSpec::boolean("curved_fold_zoom_to_taskbar", true),
        ]
    }

    fn uses_3d_model(&self) -> bool {
        true
    }

    fn zooms_to_icon(&self, ctx: &AnimContext) -> bool {
        ctx.state.event.is_minimize() && ctx.params.boolean("curved_fold_zoom_to_taskbar")
    }

    fn grid_size(&self, ctx: &AnimContext) -> GridSize {
        lamp_grid_size(&ctx.params)
    }

    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        transform_init(self.zooms_to_icon(ctx), ctx);
        Ok(())
    }

    fn step(&self, ctx: &mut AnimContext, _ms: f32) {
        let zooms = self.zooms_to_icon(ctx);
        default_step(zooms, ZoomStyle::Plain, ctx);

        let (forward, _) = progress_and_center(zooms, ZoomStyle::Plain, ctx);
        let outer = ctx.outer();
        let border = ctx.window.border_rect();
        let screen_h = ctx.screen.height.max(1) as f32;
        let max_amp = 0.4
            * (outer.height() / screen_h).powf(0.4)
            * ctx.params.float("curved_fold_amp_mult");
        let sin_progress = (forward * FRAC_PI_2).sin();

        let window = ctx.window;
        let shading = ctx.state.event.is_shade();
        let Some(model) = ctx.state.model.as_mut() else {
            return;
        };
        let client_h = window.height.max(1) as f32;
        let border_h = border.height().max(1.0);
        let shadow_top = (window.output.top - window.input.top) as f32;

        for i in 0..model.points.len() {
            let g = model.points[i].grid_position;
            let orig = rest_position(window, model, g);
            let p = &mut model.points[i].position;
            p.x = orig.x;

            if shading {
                let rel_in_contents = (g.y * outer.height() - model.top_height) / client_h;
                let rel_dist = (rel_in_contents - 0.5).abs();

                if g.y == 0.0 {
                    p.y = outer.y();
                    p.z = 0.0;
                } else if g.y == 1.0 {
                    p.y = (1.0 - forward) * orig.y
                        + forward * (outer.y() + model.top_height + model.bottom_height);
                    p.z = 0.0;
                } else {
                    p.y = (1.0 - forward) * orig.y + forward * (outer.y() + model.top_height);
                    p.z = fold_z(sin_progress, rel_dist, max_amp, model.scale.x);
                }
            } else {
                let rel_in_borders = (g.y * outer.height() - shadow_top) / border_h;
                // Shadows past the borders stay flat
                let rel_dist = (rel_in_borders - 0.5).abs().min(0.5);

                p.y = (1.0 - forward) * orig.y + forward * (border.y() + border.height() / 2.0);
                p.z = fold_z(sin_progress, rel_dist, max_amp, model.scale.x);
            }
        }
    }

    fn update_attributes(&self, ctx: &AnimContext, attrs: &mut PaintAttributes) {
        fold_attributes(self.zooms_to_icon(ctx), ctx, attrs);
    }

    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        model_bounding_box(true, self.zooms_to_icon(ctx), ZoomStyle::Plain, ctx, projection, bb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::MagicLamp;
    use crate::event::WindowEvent;
    use crate::model::Model;
    use crate::options::ParamValue;
    use crate::testing::Fixture;

    fn fixture(event: WindowEvent, remaining: f32) -> Fixture {
        let mut f = Fixture::new();
        f.declare(CurvedFold.params());
        f.declare(MagicLamp::lamp().params());
        f.configured
            .insert("magic_lamp_grid_res".into(), ParamValue::Int(5));
        f.start(event, 200.0);
        let grid = CurvedFold.grid_size(&f.ctx());
        f.state.model = Some(Model::new(&f.window, event, grid).unwrap());
        CurvedFold.init(&mut f.ctx()).unwrap();
        f.state.remaining_time = remaining;
        f
    }

    #[test]
    fn test_close_collapses_to_center_line() {
        let mut f = fixture(WindowEvent::Close, 0.0);
        CurvedFold.step(&mut f.ctx(), 10.0);
        for p in &f.state.model.as_ref().unwrap().points {
            assert!((p.position.y - 150.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_middle_row_bends_most() {
        let mut f = fixture(WindowEvent::Close, 100.0);
        CurvedFold.step(&mut f.ctx(), 10.0);
        let model = f.state.model.as_ref().unwrap();
        let mid = model.point(0, 2).position.z;
        let edge = model.point(0, 0).position.z;
        assert!(mid < 0.0);
        assert!(mid < edge);
        assert!(edge.abs() < 1e-4);
    }

    #[test]
    fn test_minimize_zooms_with_transform() {
        let f = fixture(WindowEvent::Minimize, 200.0);
        assert!(f.state.using_transform);
        let mut f2 = fixture(WindowEvent::Close, 200.0);
        assert!(!CurvedFold.zooms_to_icon(&f2.ctx()));
    }

    #[test]
    fn test_close_fades_out() {
        let mut f = fixture(WindowEvent::Close, 50.0);
        let mut attrs = PaintAttributes::default();
        CurvedFold.update_attributes(&f.ctx(), &mut attrs);
        // Progress spans the total minus one time step
        let progress = 1.0 - 50.0 / 190.0;
        assert!((attrs.opacity - (1.0 - progress)).abs() < 1e-4);
    }
}
