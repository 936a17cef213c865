//! Burn
//!
//! The window burns away from one side. A flame front of additive fire
//! particles follows the edge, optionally under a layer of smoke; the window
//! is clipped to the part the fire has not reached yet. The animation keeps
//! running until the last particle dies.

use crate::particle::{self, scatter, spawn_budget, Blend, Particle, ParticleSystem, Particles};
use wisp_animation::effect::default_init;
use wisp_animation::progress::raw_progress;
use wisp_animation::{AnimContext, AnimDirection, Effect, EventSet, ParamSpec, ParamView, Sprite};
use wisp_core::{Color, DamageBox, Point, Rect, Result, Rng, ScreenProjection, Vec3};

/// Window height burned in the configured duration when the speed is constant
const CONSTANT_SPEED_HEIGHT: f32 = 500.0;

pub struct Burn;

/// Fire options read once per step
struct Fuel {
    life: f32,
    size: f32,
    color: Color,
    mystical: bool,
}

impl Fuel {
    fn read(params: &ParamView) -> Self {
        Self {
            life: params.float("fire_life"),
            size: params.float("fire_size"),
            color: params.color("fire_color"),
            mystical: params.boolean("fire_mystical"),
        }
    }

    fn fade(&self, rng: &mut Rng) -> f32 {
        rng.next_f32() * (1.0 - self.life) + 0.2 * (1.01 - self.life)
    }
}

fn spawn_fire(system: &mut ParticleSystem, area: Rect, size: f32, ms: f32, fuel: &Fuel, rng: &mut Rng) {
    let budget = spawn_budget(system.len(), ms, fuel.life, system.len() as f32 / 5.0);
    let c = fuel.color;
    system.spawn(budget, |p: &mut Particle| {
        p.fade = fuel.fade(rng);
        p.width = fuel.size;
        p.height = fuel.size * 1.5;
        let grow = size * rng.next_f32();
        p.w_mod = grow;
        p.h_mod = grow;

        let (x, y) = scatter(&area, rng);
        p.position = Vec3::new(x, y, 0.0);
        p.origin = p.position;
        p.velocity = Vec3::new(rng.next_f32() * 20.0 - 10.0, rng.next_f32() * 20.0 - 15.0, 0.0);

        p.color = if fuel.mystical {
            Color::rgba(rng.next_f32(), rng.next_f32(), rng.next_f32(), c.a)
        } else {
            let r = rng.next_f32();
            Color::rgba(c.r - r * c.r / 1.7, c.g - r * c.g / 1.7, c.b - r * c.b / 1.7, c.a)
        };
        p.gravity = Vec3::new(p.drift_sign(), -3.0, 0.0);
    });
}

fn spawn_smoke(system: &mut ParticleSystem, area: Rect, size: f32, ms: f32, fuel: &Fuel, rng: &mut Rng) {
    let budget = spawn_budget(system.len(), ms, fuel.life, system.len() as f32);
    let puff = fuel.size * size * 5.0;
    system.spawn(budget, |p: &mut Particle| {
        p.fade = fuel.fade(rng);
        p.width = puff;
        p.height = puff;
        p.w_mod = -0.8;
        p.h_mod = -0.8;

        let (x, y) = scatter(&area, rng);
        p.position = Vec3::new(x, y, 0.0);
        p.origin = p.position;
        p.velocity = Vec3::new(rng.next_f32() * 20.0 - 10.0, (rng.next_f32() + 0.2) * -size, 0.0);

        let grey = rng.next_f32() / 4.0;
        p.color = Color::rgba(grey, grey, grey, 0.5 + rng.next_f32() / 2.0);
        p.gravity = Vec3::new(p.drift_sign() * size, -size, 0.0);
    });
}

/// Pull every particle of `system` back toward its spawn column
fn drift(system: &mut ParticleSystem, strength: f32) {
    for p in system.particles_mut() {
        p.gravity.x = p.drift_sign() * strength;
    }
}

impl Effect for Burn {
    fn name(&self) -> &'static str {
        "Burn"
    }

    fn events(&self) -> EventSet {
        EventSet::OPEN_CLOSE_MINIMIZE
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::int("time_step_intense", 20, 1, 50),
            ParamSpec::int("fire_particles", 1000, 100, 20000),
            ParamSpec::float("fire_size", 5.0, 0.1, 20.0),
            ParamSpec::float("fire_slowdown", 0.5, 0.1, 10.0),
            ParamSpec::float("fire_life", 0.7, 0.1, 1.0),
            ParamSpec::color("fire_color", Color::rgba(1.0, 0.2, 0.0196, 0.835)),
            ParamSpec::int("fire_direction", 1, 0, 5),
            ParamSpec::boolean("fire_constant_speed", false),
            ParamSpec::boolean("fire_smoke", false),
            ParamSpec::boolean("fire_mystical", false),
        ]
    }

    fn host_draws_geometry(&self) -> bool {
        true
    }

    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        default_init(ctx);
        ctx.state.time_step = ctx.params.int("time_step_intense").max(1) as f32;

        let count = ctx.params.int("fire_particles").max(0) as usize;
        let slowdown = ctx.params.float("fire_slowdown");
        let outer = ctx.outer();
        let anchor = Point::new(outer.x(), outer.y());

        let mut smoke = ParticleSystem::new(count / 10)
            .with_slowdown(slowdown / 2.0)
            .with_blend(Blend::Alpha);
        let mut fire = ParticleSystem::new(count)
            .with_slowdown(slowdown)
            .with_darken(0.5)
            .with_blend(Blend::Additive);
        smoke.anchor = anchor;
        fire.anchor = anchor;

        let direction =
            AnimDirection::from_index(ctx.params.int("fire_direction")).resolve(ctx, false);

        if ctx.params.boolean("fire_constant_speed") {
            let scale = outer.height() / CONSTANT_SPEED_HEIGHT;
            ctx.state.total_time *= scale;
            ctx.state.remaining_time *= scale;
            tracing::debug!(
                total_ms = ctx.state.total_time,
                "Burn duration scaled to window height"
            );
        }

        let mut particles = Particles::new(vec![smoke, fire]);
        particles.direction = Some(direction);
        ctx.state.set_data(particles);
        Ok(())
    }

    fn pre_prepare(&self, ctx: &mut AnimContext, ms: f32) -> bool {
        particle::pre_prepare(ctx, ms)
    }

    fn step(&self, ctx: &mut AnimContext, ms: f32) {
        let outer = ctx.outer();
        let (w, h) = (outer.width(), outer.height());
        let fuel = Fuel::read(&ctx.params);
        let smoking = ctx.params.boolean("fire_smoke");
        let running = ctx.state.is_animating();
        let time_step = ctx.state.time_step;
        let reveals = ctx.state.event.runs_backwards();
        let consumed = raw_progress(ctx.state);

        let Some(data) = ctx.state.data_mut::<Particles>() else {
            return;
        };
        let step = consumed - data.last_progress;
        data.last_progress = consumed;
        let front = if reveals { 1.0 - consumed } else { consumed };
        let direction = data.direction.unwrap_or(AnimDirection::Down);

        let visible = match direction {
            AnimDirection::Up => Rect::new(0.0, 0.0, w, h - front * h),
            AnimDirection::Right => Rect::new(front * w, 0.0, w - front * w, h),
            AnimDirection::Left => Rect::new(0.0, 0.0, w - front * w, h),
            _ => Rect::new(0.0, front * h, w, h - front * h),
        }
        .offset(outer.x(), outer.y());

        if running && data.systems.len() == 2 {
            let origin = data.systems[1].anchor;
            let (x, y) = (origin.x, origin.y);
            // Smoke rises from a one-pixel line on vertical fronts
            let (fire_area, smoke_area, size) = match direction {
                AnimDirection::Up => {
                    let top = y + (1.0 - front) * h;
                    (Rect::new(x, top, w, step * h), Rect::new(x, top, w, 1.0), w / 40.0)
                }
                AnimDirection::Left => {
                    let area = Rect::new(x + (1.0 - front) * w, y, step * w, h);
                    (area, area, h / 40.0)
                }
                AnimDirection::Right => {
                    let area = Rect::new(x + front * w, y, step * w, h);
                    (area, area, h / 40.0)
                }
                _ => {
                    let top = y + front * h;
                    (Rect::new(x, top, w, step * h), Rect::new(x, top, w, 1.0), w / 40.0)
                }
            };

            let (smoke, fire) = data.systems.split_at_mut(1);
            if smoking {
                spawn_smoke(&mut smoke[0], smoke_area, size, ms, &fuel, ctx.rng);
                drift(&mut smoke[0], w / 40.0);
            }
            spawn_fire(&mut fire[0], fire_area, size, ms, &fuel, ctx.rng);
            drift(&mut fire[0], 1.0);
        }
        let smouldering = !running && data.any_active();

        particle::set_draw_region(ctx, running.then_some(visible), front);
        if smouldering {
            ctx.state.remaining_time = time_step;
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use wisp_animation::{ParamValue, WindowEvent};

    fn burning(event: WindowEvent) -> Fixture {
        let mut f = Fixture::new();
        f.start(event, 420.0);
        Burn.init(&mut f.ctx()).unwrap();
        f
    }

    fn fire(f: &Fixture) -> &ParticleSystem {
        &f.state.data::<Particles>().unwrap().systems[1]
    }

    #[test]
    fn test_init_builds_smoke_and_fire() {
        let f = burning(WindowEvent::Close);
        let data = f.state.data::<Particles>().unwrap();
        assert_eq!(data.systems[0].len(), 100);
        assert_eq!(data.systems[1].len(), 1000);
        assert_eq!(data.systems[1].blend, Blend::Additive);
        assert_eq!(data.direction, Some(AnimDirection::Down));
        assert_eq!(f.state.time_step, 20.0);
    }

    #[test]
    fn test_constant_speed_follows_window_height() {
        let mut f = Fixture::new();
        f.set("fire_constant_speed", ParamValue::Bool(true));
        f.start(WindowEvent::Close, 500.0);
        Burn.init(&mut f.ctx()).unwrap();
        assert_eq!(f.state.total_time, 100.0);
        assert_eq!(f.state.remaining_time, 100.0);
    }

    #[test]
    fn test_front_consumes_window_and_spawns_fire() {
        let mut f = burning(WindowEvent::Close);
        f.state.remaining_time = 200.0;
        Burn.step(&mut f.ctx(), 20.0);

        assert_eq!(f.state.draw_region, Some(Rect::new(100.0, 150.0, 200.0, 50.0)));
        // About 1000 × (20 / 50) × (1.05 - 0.7)
        assert!((140..=141).contains(&fire(&f).live_count()));
        assert!(fire(&f)
            .particles()
            .iter()
            .filter(|p| p.is_alive())
            .all(|p| p.origin.y >= 150.0 && p.origin.y <= 200.0));
    }

    #[test]
    fn test_open_starts_fully_burnt() {
        let mut f = burning(WindowEvent::Open);
        Burn.step(&mut f.ctx(), 20.0);
        let region = f.state.draw_region.unwrap();
        assert_eq!(region.height(), 0.0);
    }

    #[test]
    fn test_smoulders_until_particles_die() {
        let mut f = burning(WindowEvent::Close);
        f.state.remaining_time = 200.0;
        Burn.step(&mut f.ctx(), 20.0);

        f.state.remaining_time = 0.0;
        Burn.step(&mut f.ctx(), 20.0);
        assert_eq!(f.state.remaining_time, 20.0);
        assert_eq!(f.state.draw_region, Some(Rect::ZERO));

        let sprites = Burn.post_paint(&f.ctx());
        assert_eq!(sprites.len(), fire(&f).live_count());
        assert!(sprites.iter().all(|s| s.additive && s.layer == 1));
    }
}
