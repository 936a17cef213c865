//! Wave
//!
//! A single bulge travels from the top of the window to the bottom, lifting
//! rows toward the viewer as it passes.

use super::magic_lamp::lamp_grid_size;
use super::rest_position;
use crate::effect::{
    default_step, model_bounding_box, transform_init, AnimContext, Effect, ZoomStyle,
};
use crate::event::{EventKind, EventSet};
use crate::model::GridSize;
use crate::options::ParamSpec;
use std::f32::consts::PI;
use wisp_core::{DamageBox, Result, ScreenProjection};

pub struct Wave;

impl Effect for Wave {
    fn name(&self) -> &'static str {
        "Wave"
    }

    fn events(&self) -> EventSet {
        EventSet::OPEN_CLOSE_MINIMIZE.with(EventKind::Focus)
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::float("wave_width", 0.7, 0.02, 3.0),
            ParamSpec::float("wave_amp_mult", 1.0, -20.0, 20.0),
        ]
    }

    fn uses_3d_model(&self) -> bool {
        true
    }

    fn grid_size(&self, ctx: &AnimContext) -> GridSize {
        lamp_grid_size(&ctx.params)
    }

    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        transform_init(false, ctx);
        Ok(())
    }

    fn step(&self, ctx: &mut AnimContext, _ms: f32) {
        default_step(false, ZoomStyle::Plain, ctx);

        let forward = 1.0 - ctx.progress();
        let outer = ctx.outer();
        let screen_h = ctx.screen.height.max(1) as f32;
        let amp = 0.02 * (outer.height() / screen_h).powf(0.4) * ctx.params.float("wave_amp_mult");
        let width = ctx.params.float("wave_width");

        let window = ctx.window;
        let Some(model) = ctx.state.model.as_mut() else {
            return;
        };
        let half_width = outer.height() * model.scale.y * width / 2.0;
        let position = outer.y() - half_width
            + forward * (outer.height() * model.scale.y + 2.0 * half_width);

        for i in 0..model.points.len() {
            let orig = rest_position(window, model, model.points[i].grid_position);
            let p = &mut model.points[i].position;
            p.x = orig.x;
            p.y = orig.y;
            p.z = 0.0;

            let d = p.y - position;
            if d.abs() < half_width {
                p.z += amp * ((d * PI / half_width).cos() + 1.0) / 2.0;
            }
        }
    }

    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        model_bounding_box(true, false, ZoomStyle::Plain, ctx, projection, bb);
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

    fn stepped(remaining: f32) -> Fixture {
        let mut f = Fixture::new();
        f.declare(Wave.params());
        f.declare(MagicLamp::lamp().params());
        f.configured
            .insert("magic_lamp_grid_res".into(), ParamValue::Int(21));
        f.start(WindowEvent::Close, 210.0);
        let grid = Wave.grid_size(&f.ctx());
        f.state.model = Some(Model::new(&f.window, WindowEvent::Close, grid).unwrap());
        Wave.init(&mut f.ctx()).unwrap();
        f.state.remaining_time = remaining;
        Wave.step(&mut f.ctx(), 10.0);
        f
    }

    #[test]
    fn test_wave_peak_is_centred_mid_run() {
        // Halfway: the wave sits on the window's centre row
        let f = stepped(100.0);
        let model = f.state.model.as_ref().unwrap();
        let peak = model.point(0, 10).position.z;
        assert!(peak > 0.0);
        for gy in 0..21 {
            assert!(model.point(0, gy).position.z <= peak + 1e-6);
        }
    }

    #[test]
    fn test_wave_is_flat_outside_its_width() {
        let f = stepped(100.0);
        let model = f.state.model.as_ref().unwrap();
        assert_eq!(model.point(0, 0).position.z, 0.0);
        assert_eq!(model.point(1, 20).position.z, 0.0);
    }
}
