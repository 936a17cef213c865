//! Horizontal Folds
//!
//! The window folds like a paper fan: alternate rows move back in depth while
//! the whole window collapses toward its centre line (or the title bar when
//! shading).

use super::curved_fold::fold_attributes;
use super::rest_position;
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

fn fold_z(sin_progress: f32, rel_dist: f32, max_amp: f32, scale_x: f32) -> f32 {
    -(sin_progress * max_amp * scale_x * 2.0 * (0.5 - rel_dist))
}

pub struct HorizontalFolds;

impl HorizontalFolds {
    fn num_folds(ctx: &AnimContext) -> usize {
        ctx.params.int("horizontal_folds_num_folds").max(1) as usize
    }
}

impl Effect for HorizontalFolds {
    fn name(&self) -> &'static str {
        "Horizontal Folds"
    }

    fn events(&self) -> EventSet {
        EventSet::OPEN_CLOSE_MINIMIZE.with(EventKind::Shade)
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::float("horizontal_folds_amp_mult", 1.0, -1.5, 2.0),
            ParamSpec::int("horizontal_folds_num_folds", 3, 1, 8),
            ParamSpec::boolean("horizontal_folds_zoom_to_taskbar", true),
        ]
    }

    fn uses_3d_model(&self) -> bool {
        true
    }

    fn zooms_to_icon(&self, ctx: &AnimContext) -> bool {
        ctx.state.event.is_minimize() && ctx.params.boolean("horizontal_folds_zoom_to_taskbar")
    }

    fn grid_size(&self, ctx: &AnimContext) -> GridSize {
        let folds = Self::num_folds(ctx);
        // Header and footer rows come on top when shading
        let extra = if ctx.state.event.is_shade() { 3 } else { 1 };
        GridSize::new(2, extra + 2 * folds)
    }

    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        transform_init(self.zooms_to_icon(ctx), ctx);
        Ok(())
    }

    fn step(&self, ctx: &mut AnimContext, _ms: f32) {
        let zooms = self.zooms_to_icon(ctx);
        default_step(zooms, ZoomStyle::Plain, ctx);

        let shading = ctx.state.event.is_shade();
        let window = ctx.window;
        let outer = ctx.outer();
        let border = window.border_rect();
        let win_height = if shading {
            window.height as f32
        } else {
            border.height()
        };
        let half_folds = 2.0 * Self::num_folds(ctx) as f32;
        let screen_h = ctx.screen.height.max(1) as f32;
        let max_amp = 0.3
            * ((win_height / half_folds) / screen_h).powf(0.3)
            * ctx.params.float("horizontal_folds_amp_mult");

        let (forward, _) = progress_and_center(zooms, ZoomStyle::Plain, ctx);
        let sin_progress = (forward * FRAC_PI_2).sin();

        let Some(model) = ctx.state.model.as_mut() else {
            return;
        };
        let width = model.grid.width;
        for i in 0..model.points.len() {
            let row = i / width;
            let g = model.points[i].grid_position;
            let orig = rest_position(window, model, g);
            let (top, bottom, scale_x) = (model.top_height, model.bottom_height, model.scale.x);
            let p = &mut model.points[i].position;
            p.x = orig.x;

            if shading {
                let rel_dist = if row % 2 == 1 { 0.5 } else { 0.0 };
                if g.y == 0.0 {
                    p.y = outer.y();
                    p.z = 0.0;
                } else if g.y == 1.0 {
                    p.y = (1.0 - forward) * orig.y + forward * (outer.y() + top + bottom);
                    p.z = 0.0;
                } else {
                    p.y = (1.0 - forward) * orig.y + forward * (outer.y() + top);
                    p.z = fold_z(sin_progress, rel_dist, max_amp, scale_x);
                }
            } else {
                let rel_dist = if row % 2 == 0 { 0.5 } else { 0.0 };
                p.y = (1.0 - forward) * orig.y + forward * (border.y() + border.height() / 2.0);
                p.z = fold_z(sin_progress, rel_dist, max_amp, scale_x);
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
    use crate::event::WindowEvent;
    use crate::model::Model;
    use crate::testing::Fixture;

    fn fixture(event: WindowEvent) -> Fixture {
        let mut f = Fixture::new();
        f.declare(HorizontalFolds.params());
        f.start(event, 200.0);
        let grid = HorizontalFolds.grid_size(&f.ctx());
        f.state.model = Some(Model::new(&f.window, event, grid).unwrap());
        HorizontalFolds.init(&mut f.ctx()).unwrap();
        f
    }

    #[test]
    fn test_grid_has_two_rows_per_fold() {
        let mut f = fixture(WindowEvent::Close);
        assert_eq!(HorizontalFolds.grid_size(&f.ctx()), GridSize::new(2, 7));
        let mut s = fixture(WindowEvent::Shade);
        assert_eq!(HorizontalFolds.grid_size(&s.ctx()), GridSize::new(2, 9));
    }

    #[test]
    fn test_rows_alternate_in_depth() {
        let mut f = fixture(WindowEvent::Close);
        f.state.remaining_time = 100.0;
        HorizontalFolds.step(&mut f.ctx(), 10.0);
        let model = f.state.model.as_ref().unwrap();
        assert!(model.point(0, 0).position.z.abs() < 1e-5);
        assert!(model.point(0, 1).position.z < 0.0);
        assert!(model.point(0, 2).position.z.abs() < 1e-5);
    }

    #[test]
    fn test_shade_keeps_title_row_in_place() {
        let mut f = fixture(WindowEvent::Shade);
        f.state.remaining_time = 0.0;
        HorizontalFolds.step(&mut f.ctx(), 10.0);
        let model = f.state.model.as_ref().unwrap();
        assert_eq!(model.point(1, 0).position.y, 100.0);
        // Undecorated window: everything ends on the top edge
        assert!((model.point(1, 8).position.y - 100.0).abs() < 1e-3);
    }
}
