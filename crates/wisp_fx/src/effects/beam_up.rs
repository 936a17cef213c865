//! Beam Up
//!
//! The window shrinks toward its centre inside a column of light beams while
//! it fades, like a transporter. Opening runs the beam backwards.

use crate::particle::{self, spawn_budget, Blend, Particle, ParticleSystem, Particles};
use wisp_animation::effect::{default_init, default_step};
use wisp_animation::progress::raw_progress;
use wisp_animation::{
    AnimContext, Effect, EventSet, PaintAttributes, ParamSpec, Sprite, WindowEvent, ZoomStyle,
};
use wisp_core::{Color, DamageBox, Point, Rect, Result, ScreenProjection, Vec3};

/// Remaining time that keeps the animation alive while beams fade out
const LINGER_MS: f32 = 0.001;

pub struct BeamUp;

impl Effect for BeamUp {
    fn name(&self) -> &'static str {
        "Beam Up"
    }

    fn events(&self) -> EventSet {
        EventSet::OPEN_CLOSE_MINIMIZE
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::float("beam_size", 8.0, 0.1, 20.0),
            ParamSpec::int("beam_spacing", 5, 1, 20),
            ParamSpec::color("beam_color", Color::rgba(0.498, 0.498, 0.498, 1.0)),
            ParamSpec::float("beam_slowdown", 1.0, 0.1, 10.0),
            ParamSpec::float("beam_life", 0.7, 0.1, 1.0),
        ]
    }

    fn host_draws_geometry(&self) -> bool {
        true
    }

    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        default_init(ctx);
        ctx.state.time_step = ctx.params.int("time_step_intense").max(1) as f32;

        let outer = ctx.outer();
        let mut beams = ParticleSystem::new(outer.width().max(0.0) as usize)
            .with_slowdown(ctx.params.float("beam_slowdown"))
            .with_darken(0.5)
            .with_blend(Blend::Additive);
        beams.anchor = Point::new(outer.x(), outer.y());
        ctx.state.set_data(Particles::new(vec![beams]));
        Ok(())
    }

    fn pre_prepare(&self, ctx: &mut AnimContext, ms: f32) -> bool {
        particle::pre_prepare(ctx, ms)
    }

    fn step(&self, ctx: &mut AnimContext, ms: f32) {
        default_step(false, ZoomStyle::Plain, ctx);

        let outer = ctx.outer();
        let (w, h) = (outer.width(), outer.height());
        let creating = ctx.state.event.runs_backwards();
        let running = ctx.state.is_animating();
        let consumed = raw_progress(ctx.state);
        let front = if creating { 1.0 - consumed } else { consumed };

        let size = ctx.params.float("beam_size");
        let spacing = ctx.params.int("beam_spacing").max(1) as f32;
        let life = ctx.params.float("beam_life");
        let c = ctx.params.color("beam_color");

        let visible = Rect::new(
            outer.x() + front / 2.0 * w,
            outer.y() + front / 2.0 * h,
            (1.0 - front) * w,
            (1.0 - front) * h,
        );

        let Some(data) = ctx.state.data_mut::<Particles>() else {
            return;
        };
        if let Some(beams) = data.systems.first_mut() {
            if running {
                beams.set_len((w / spacing).max(0.0) as usize);
                let budget = spawn_budget(beams.len(), ms, life, beams.len() as f32);
                let origin = beams.anchor;
                let height = if creating {
                    (1.0 - front / 2.0) * h
                } else {
                    (1.0 - front) * h
                };
                let grow = w / 40.0;
                let rng = &mut *ctx.rng;
                beams.spawn(budget, |p: &mut Particle| {
                    p.fade = rng.next_f32() * (1.0 - life) + 0.2 * (1.01 - life);
                    p.width = 2.5 * size;
                    p.height = height;
                    p.w_mod = grow * 0.2;
                    p.h_mod = grow * 0.02;

                    let r = rng.next_f32();
                    let x = if w > 1.0 { origin.x + r * w } else { origin.x };
                    p.position = Vec3::new(x, origin.y + h / 2.0, 0.0);
                    p.origin = p.position;
                    // Same shade for the same column
                    p.color = Color::rgba(
                        c.r - r * c.r / 1.7,
                        c.g - r * c.g / 1.7,
                        c.b - r * c.b / 1.7,
                        c.a,
                    );
                });
                for p in beams.particles_mut() {
                    p.gravity.x = p.drift_sign();
                }
            }
        }
        let lingering = !running && data.any_active();

        particle::set_draw_region(ctx, running.then_some(visible), front);
        if lingering {
            ctx.state.remaining_time = LINGER_MS;
        }
    }

    fn update_attributes(&self, ctx: &AnimContext, attrs: &mut PaintAttributes) {
        let mut progress = raw_progress(ctx.state);
        if matches!(ctx.state.event, WindowEvent::Open | WindowEvent::Unminimize) {
            progress = 1.0 - progress.powi(4);
        }
        attrs.opacity = ctx.state.stored_opacity * (1.0 - progress);
    }

    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        _projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        particle::update_bounding_box(ctx, bb);
    }

    fn post_paint(&self, ctx: &AnimContext) -> Vec<Sprite> {
        particle::post_paint(ctx)
    }

    fn cleanup(&self, ctx: &mut AnimContext) {
        ctx.state.clear_data();
        ctx.state.draw_region = None;
    }
}
