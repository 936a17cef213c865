//! Roll Up
//!
//! Shading rolls the window contents up under the title bar. With a fixed
//! interior the contents stay put and get covered; otherwise they scroll up
//! with the rolling edge.

use crate::effect::{default_init, default_step, model_bounding_box, AnimContext, Effect, ZoomStyle};
use crate::event::{EventKind, EventSet};
use crate::model::GridSize;
use crate::options::ParamSpec;
use crate::progress::{sigmoid_progress, ROLLUP_PERCEIVED_T};
use wisp_core::{DamageBox, Result, ScreenProjection};

pub struct RollUp;

impl Effect for RollUp {
    fn name(&self) -> &'static str {
        "Roll Up"
    }

    fn events(&self) -> EventSet {
        EventSet::OPEN_CLOSE_MINIMIZE.with(EventKind::Shade)
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::boolean("rollup_fixed_interior", false)]
    }

    fn grid_size(&self, ctx: &AnimContext) -> GridSize {
        if ctx.state.event.is_shade() {
            GridSize::new(2, 4)
        } else {
            GridSize::new(2, 2)
        }
    }

    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        ctx.stretch_duration(ROLLUP_PERCEIVED_T);
        default_init(ctx);
        Ok(())
    }

    fn step(&self, ctx: &mut AnimContext, _ms: f32) {
        default_step(false, ZoomStyle::Plain, ctx);
        if !ctx.state.event.is_shade() {
            return;
        }

        let forward = sigmoid_progress(ctx.state);
        let fixed_interior = ctx.params.boolean("rollup_fixed_interior");
        let outer = ctx.outer();
        let client_h = ctx.window.height.max(1) as f32;

        let Some(model) = ctx.state.model.as_mut() else {
            return;
        };
        let (top, bottom) = (model.top_height, model.bottom_height);
        for point in &mut model.points {
            let g = point.grid_position;
            let orig_y = outer.y() + outer.height() * g.y;
            point.position.x = outer.x() + outer.width() * g.x;

            if g.y == 0.0 {
                point.position.y = outer.y();
            } else if g.y == 1.0 {
                point.position.y = (1.0 - forward) * orig_y + forward * (outer.y() + top + bottom);
            } else {
                let rel_in_contents = (g.y * outer.height() - top) / client_h;
                if rel_in_contents > forward {
                    point.position.y = (1.0 - forward) * orig_y + forward * (outer.y() + top);
                    if fixed_interior {
                        point.tex_offset_before.y = -forward * client_h;
                    }
                } else {
                    point.position.y = outer.y() + top;
                    if !fixed_interior {
                        point.tex_offset_after.y = (forward - rel_in_contents) * client_h;
                    }
                }
            }
        }
    }

    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        model_bounding_box(false, false, ZoomStyle::Plain, ctx, projection, bb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::WindowEvent;
    use crate::model::Model;
    use crate::options::ParamValue;
    use crate::testing::Fixture;
    use wisp_core::{Extents, WindowId, WindowInfo};

    fn fixture(fixed: bool) -> Fixture {
        let window = WindowInfo::new(WindowId(1), 100, 120, 200, 100)
            .with_extents(Extents::new(0, 0, 20, 0), Extents::new(0, 0, 20, 0));
        let mut f = Fixture::with_window(window);
        f.declare(RollUp.params());
        f.configured
            .insert("rollup_fixed_interior".into(), ParamValue::Bool(fixed));
        f.start(WindowEvent::Shade, 300.0);
        let grid = RollUp.grid_size(&f.ctx());
        f.state.model = Some(Model::new(&f.window, WindowEvent::Shade, grid).unwrap());
        f
    }

    #[test]
    fn test_shade_uses_header_rows() {
        let mut f = fixture(false);
        assert_eq!(RollUp.grid_size(&f.ctx()), GridSize::new(2, 4));
        f.state.event = WindowEvent::Minimize;
        assert_eq!(RollUp.grid_size(&f.ctx()), GridSize::new(2, 2));
    }

    #[test]
    fn test_fully_rolled_window_is_a_title_bar() {
        let mut f = fixture(false);
        f.state.remaining_time = 0.0;
        RollUp.step(&mut f.ctx(), 10.0);
        let model = f.state.model.as_ref().unwrap();
        assert_eq!(model.point(0, 0).position.y, 100.0);
        for gy in 1..4 {
            assert!((model.point(0, gy).position.y - 120.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_scrolling_contents_offset_texture() {
        let mut f = fixture(false);
        f.state.remaining_time = 0.0;
        RollUp.step(&mut f.ctx(), 10.0);
        // Top content row rolled away entirely
        let p = f.state.model.as_ref().unwrap().point(0, 1);
        assert!((p.tex_offset_after.y - 100.0).abs() < 1e-3);
    }
}
