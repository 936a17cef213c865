//! Dream
//!
//! A sideways ripple runs down the window while it fades. Minimizing can
//! zoom to the icon at the same time.

use super::magic_lamp::lamp_grid_size;
use super::rest_position;
use super::zoom::fade_with_scale;
use crate::effect::{
    default_init, default_step, model_bounding_box, progress_and_center, AnimContext, Effect,
    ZoomStyle,
};
use crate::event::EventSet;
use crate::model::GridSize;
use crate::options::ParamSpec;
use crate::paint::PaintAttributes;
use crate::progress::{DREAM_PERCEIVED_T, ZOOM_PERCEIVED_T};
use std::f32::consts::PI;
use wisp_core::{DamageBox, Result, ScreenProjection};

const WAVE_WIDTH: f32 = 10.0;
const WAVE_SPEED: f32 = 7.0;

pub struct Dream;

impl Effect for Dream {
    fn name(&self) -> &'static str {
        "Dream"
    }

    fn events(&self) -> EventSet {
        EventSet::OPEN_CLOSE_MINIMIZE
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::boolean("dream_zoom_to_taskbar", true)]
    }

    fn zooms_to_icon(&self, ctx: &AnimContext) -> bool {
        ctx.state.event.is_minimize() && ctx.params.boolean("dream_zoom_to_taskbar")
    }

    fn grid_size(&self, ctx: &AnimContext) -> GridSize {
        lamp_grid_size(&ctx.params)
    }

    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        if self.zooms_to_icon(ctx) {
            ctx.stretch_duration(ZOOM_PERCEIVED_T);
            ctx.state.using_transform = true;
        } else {
            ctx.stretch_duration(DREAM_PERCEIVED_T);
        }
        default_init(ctx);
        Ok(())
    }

    fn step(&self, ctx: &mut AnimContext, _ms: f32) {
        let zooms = self.zooms_to_icon(ctx);
        default_step(zooms, ZoomStyle::Plain, ctx);

        let (forward, _) = progress_and_center(zooms, ZoomStyle::Plain, ctx);
        let outer = ctx.outer();
        let amp = outer.height().min(outer.width()) * 0.125;

        let window = ctx.window;
        let Some(model) = ctx.state.model.as_mut() else {
            return;
        };
        for i in 0..model.points.len() {
            let g = model.points[i].grid_position;
            let orig = rest_position(window, model, g);
            let phase = g.y * PI * WAVE_WIDTH + WAVE_SPEED * forward;
            let scale_x = model.scale.x;
            let p = &mut model.points[i].position;
            p.x = orig.x + forward * amp * scale_x * phase.sin();
            p.y = orig.y;
        }
    }

    fn update_attributes(&self, ctx: &AnimContext, attrs: &mut PaintAttributes) {
        if self.zooms_to_icon(ctx) {
            fade_with_scale(ZoomStyle::Plain, ctx, attrs);
        } else {
            attrs.opacity = ctx.state.stored_opacity * (1.0 - ctx.progress());
        }
    }

    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        model_bounding_box(false, self.zooms_to_icon(ctx), ZoomStyle::Plain, ctx, projection, bb);
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

    fn fixture(event: WindowEvent) -> Fixture {
        let mut f = Fixture::new();
        f.declare(Dream.params());
        f.declare(MagicLamp::lamp().params());
        f.configured
            .insert("magic_lamp_grid_res".into(), ParamValue::Int(10));
        f.start(event, 300.0);
        let grid = Dream.grid_size(&f.ctx());
        f.state.model = Some(Model::new(&f.window, event, grid).unwrap());
        f
    }

    #[test]
    fn test_close_is_stretched_for_perceived_speed() {
        let mut f = fixture(WindowEvent::Close);
        Dream.init(&mut f.ctx()).unwrap();
        assert!((f.state.total_time - 500.0).abs() < 1e-3);
        assert!(!f.state.using_transform);
    }

    #[test]
    fn test_ripple_only_moves_sideways() {
        let mut f = fixture(WindowEvent::Close);
        Dream.init(&mut f.ctx()).unwrap();
        f.state.remaining_time = 250.0;
        Dream.step(&mut f.ctx(), 10.0);
        let model = f.state.model.as_ref().unwrap();
        let rest = Model::new(&f.window, WindowEvent::Close, model.grid).unwrap();
        let mut moved = false;
        for (p, r) in model.points.iter().zip(&rest.points) {
            assert!((p.position.y - r.position.y).abs() < 1e-3);
            moved |= (p.position.x - r.position.x).abs() > 1.0;
        }
        assert!(moved);
    }

    #[test]
    fn test_minimize_zooms_to_icon() {
        let mut f = fixture(WindowEvent::Minimize);
        Dream.init(&mut f.ctx()).unwrap();
        assert!(f.state.using_transform);
        assert!((f.state.total_time - 400.0).abs() < 1e-3);
    }
}
