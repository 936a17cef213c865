//! Particle engine
//!
//! Pools of short-lived point sprites driven by a tiny physics model: each
//! live particle moves by its velocity, its velocity by its gravity, and it
//! loses life at its fade rate. A pool never grows while it runs; new
//! particles only take over slots whose life ran out.
//!
//! Positions are screen coordinates taken when the particle spawned. Sprites
//! and bounds are shifted by however far the window moved since the system
//! was created.

use wisp_animation::{AnimContext, AnimDirection, Sprite};
use wisp_core::{Color, DamageBox, Point, Rect, Rng, Vec3};

/// How a layer combines with what is already on screen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Blend {
    /// Source over
    #[default]
    Alpha,
    /// Source added (glow)
    Additive,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Remaining life; the particle is dead at or below 0
    pub life: f32,
    /// Life lost per 50 ms
    pub fade: f32,
    pub width: f32,
    pub height: f32,
    /// Growth of the half size per unit of remaining life
    pub w_mod: f32,
    pub h_mod: f32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub gravity: Vec3,
    /// Where the particle spawned
    pub origin: Vec3,
    pub color: Color,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            life: 0.0,
            fade: 0.0,
            width: 0.0,
            height: 0.0,
            w_mod: 0.0,
            h_mod: 0.0,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            gravity: Vec3::ZERO,
            origin: Vec3::ZERO,
            color: Color::WHITE,
        }
    }
}

impl Particle {
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Half extents, grown by the size modifiers while the particle is young
    pub fn half_size(&self) -> (f32, f32) {
        let w = self.width / 2.0;
        let h = self.height / 2.0;
        (w + w * self.w_mod * self.life, h + h * self.h_mod * self.life)
    }

    /// Sign of the horizontal pull back toward the spawn column
    pub fn drift_sign(&self) -> f32 {
        if self.position.x < self.origin.x {
            1.0
        } else {
            -1.0
        }
    }
}

/// A fixed-size pool of particles sharing blending and damping
#[derive(Clone, Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    /// Velocity damping; higher is slower
    pub slowdown: f32,
    /// Background darkening applied under the layer, in [0, 1]
    pub darken: f32,
    pub blend: Blend,
    /// Some particle was alive after the last update or spawn
    pub active: bool,
    /// Window position when the system was set up
    pub anchor: Point,
}

impl ParticleSystem {
    /// A pool of `count` dead particles
    pub fn new(count: usize) -> Self {
        Self {
            particles: vec![Particle::default(); count],
            slowdown: 1.0,
            darken: 0.0,
            blend: Blend::Alpha,
            active: false,
            anchor: Point::ZERO,
        }
    }

    pub fn with_slowdown(mut self, slowdown: f32) -> Self {
        self.slowdown = slowdown;
        self
    }

    pub fn with_darken(mut self, darken: f32) -> Self {
        self.darken = darken;
        self
    }

    pub fn with_blend(mut self, blend: Blend) -> Self {
        self.blend = blend;
        self
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Grow or shrink the pool; new slots start dead
    pub fn set_len(&mut self, count: usize) {
        self.particles.resize(count, Particle::default());
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    /// Revive up to `max_new` dead particles through `init`
    ///
    /// `init` receives a particle already set to full life. Live particles are
    /// never replaced, so the pool size bounds the live count. Returns how
    /// many particles were spawned.
    pub fn spawn(&mut self, max_new: usize, mut init: impl FnMut(&mut Particle)) -> usize {
        let mut spawned = 0;
        for particle in self.particles.iter_mut() {
            if spawned >= max_new {
                break;
            }
            if particle.is_alive() {
                continue;
            }
            *particle = Particle {
                life: 1.0,
                ..Particle::default()
            };
            init(particle);
            spawned += 1;
        }
        if spawned > 0 {
            self.active = true;
        }
        spawned
    }

    /// Integrate motion over `ms` milliseconds
    pub fn update(&mut self, ms: f32) {
        let speed = ms / 50.0;
        // Frames of a second or more would stop the damping term from going positive
        let slowdown = self.slowdown * (1.0 - (ms.min(999.0) / 1000.0).max(0.99)) * 1000.0;
        let drift = if slowdown > 0.0 { 1.0 / slowdown } else { 0.0 };
        self.active = false;
        for p in self.particles.iter_mut().filter(|p| p.is_alive()) {
            p.position += p.velocity * drift;
            p.velocity += p.gravity * speed;
            p.life -= p.fade * speed;
            self.active = true;
        }
    }

    fn offset(&self, window: Point) -> Point {
        Point::new(window.x - self.anchor.x, window.y - self.anchor.y)
    }

    /// Expand `bb` with the quad of every live particle
    pub fn expand_bounding_box(&self, window: Point, bb: &mut DamageBox) {
        let off = self.offset(window);
        for p in self.particles.iter().filter(|p| p.is_alive()) {
            let (w, h) = p.half_size();
            let x = p.position.x + off.x;
            let y = p.position.y + off.y;
            bb.expand_with_box(&DamageBox::new(
                (x - w).floor() as i32,
                (y - h).floor() as i32,
                (x + w).ceil() as i32,
                (y + h).ceil() as i32,
            ));
        }
    }

    /// Sprites for the live particles, alpha scaled by remaining life
    pub fn sprites(&self, window: Point, layer: u8, out: &mut Vec<Sprite>) {
        let off = self.offset(window);
        let additive = self.blend == Blend::Additive;
        out.extend(self.particles.iter().filter(|p| p.is_alive()).map(|p| {
            let (w, h) = p.half_size();
            Sprite {
                position: Vec3::new(p.position.x + off.x, p.position.y + off.y, p.position.z),
                width: w * 2.0,
                height: h * 2.0,
                color: Color::rgba(p.color.r, p.color.g, p.color.b, p.life * p.color.a),
                layer,
                additive,
                darken: self.darken,
            }
        }));
    }
}

/// Uniform point inside `area`, ignoring degenerate extents
pub fn scatter(area: &Rect, rng: &mut Rng) -> (f32, f32) {
    let x = if area.width() > 1.0 {
        area.x() + rng.next_f32() * area.width()
    } else {
        area.x()
    };
    let y = if area.height() > 1.0 {
        area.y() + rng.next_f32() * area.height()
    } else {
        area.y()
    };
    (x, y)
}

/// Particles a pool of `len` may spawn during `ms`
pub fn spawn_budget(len: usize, ms: f32, life: f32, cap: f32) -> usize {
    let wanted = len as f32 * (ms / 50.0) * (1.05 - life);
    wanted.min(cap).ceil().max(0.0) as usize
}

// ─────────────────────────────────────────────────────────────────────────────
// Effect hooks shared by the particle effects
// ─────────────────────────────────────────────────────────────────────────────

/// Particle systems of one animating window, kept as effect data
#[derive(Clone, Debug, Default)]
pub struct Particles {
    pub systems: Vec<ParticleSystem>,
    /// Side the window is consumed from
    pub direction: Option<AnimDirection>,
    /// Progress at the previous step
    pub last_progress: f32,
}

impl Particles {
    pub fn new(systems: Vec<ParticleSystem>) -> Self {
        Self {
            systems,
            direction: None,
            last_progress: 0.0,
        }
    }

    pub fn any_active(&self) -> bool {
        self.systems.iter().any(|s| s.active)
    }
}

fn window_origin(ctx: &AnimContext) -> Point {
    let outer = ctx.outer();
    Point::new(outer.x(), outer.y())
}

/// Move every active system by the frame time
///
/// Returns whether any system was active, which keeps the frame loop running.
pub fn pre_prepare(ctx: &mut AnimContext, ms: f32) -> bool {
    let Some(particles) = ctx.state.data_mut::<Particles>() else {
        return false;
    };
    let mut active = false;
    for system in particles.systems.iter_mut().filter(|s| s.active) {
        system.update(ms);
        active = true;
    }
    active
}

/// Live particles plus the visible part of the window
pub fn update_bounding_box(ctx: &AnimContext, bb: &mut DamageBox) {
    let origin = window_origin(ctx);
    if let Some(particles) = ctx.state.data::<Particles>() {
        for system in particles.systems.iter().filter(|s| s.active) {
            system.expand_bounding_box(origin, bb);
        }
    }
    match ctx.state.draw_region {
        Some(region) if !region.is_empty() => {
            bb.expand_with_box(&DamageBox::from_rect(&region));
        }
        Some(_) => {}
        None => bb.expand_with_box(&DamageBox::from_rect(&ctx.outer())),
    }
}

/// One layer of sprites per active system, in system order
pub fn post_paint(ctx: &AnimContext) -> Vec<Sprite> {
    let mut sprites = Vec::new();
    if ctx.window.hidden {
        return sprites;
    }
    let origin = window_origin(ctx);
    if let Some(particles) = ctx.state.data::<Particles>() {
        for (layer, system) in particles.systems.iter().enumerate() {
            if system.active {
                system.sprites(origin, layer as u8, &mut sprites);
            }
        }
    }
    sprites
}

/// Clip the window to what the effect has not consumed yet
///
/// `remaining` is `None` once the animation ran out, hiding the window. At
/// progress 0 the whole window is drawn.
pub fn set_draw_region(ctx: &mut AnimContext, remaining: Option<Rect>, progress: f32) {
    ctx.state.draw_region = if progress.abs() > 1e-5 {
        Some(remaining.unwrap_or(Rect::ZERO))
    } else {
        None
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spark(p: &mut Particle) {
        p.fade = 0.5;
        p.width = 4.0;
        p.height = 6.0;
        p.velocity = Vec3::new(10.0, 0.0, 0.0);
    }

    #[test]
    fn test_spawn_respects_pool_size() {
        let mut system = ParticleSystem::new(8);
        assert_eq!(system.spawn(100, spark), 8);
        assert_eq!(system.live_count(), 8);
        // Every slot is alive: nothing can be replaced
        assert_eq!(system.spawn(5, spark), 0);
        assert_eq!(system.live_count(), 8);
    }

    #[test]
    fn test_spawn_reuses_only_dead_slots() {
        let mut system = ParticleSystem::new(4);
        system.spawn(4, spark);
        system.particles_mut()[1].life = 0.0;
        system.particles_mut()[3].life = -0.2;
        system.particles_mut()[0].life = 0.3;

        assert_eq!(system.spawn(10, |p| p.width = 99.0), 2);
        let widths: Vec<f32> = system.particles().iter().map(|p| p.width).collect();
        assert_eq!(widths, vec![4.0, 99.0, 4.0, 99.0]);
        assert_eq!(system.particles()[0].life, 0.3);
    }

    #[test]
    fn test_update_moves_and_ages() {
        let mut system = ParticleSystem::new(1);
        system.spawn(1, |p| {
            spark(p);
            p.gravity = Vec3::new(0.0, 2.0, 0.0);
        });
        system.update(50.0);
        let p = system.particles()[0];
        // slowdown 1 damps by 10 below a second per frame
        assert!((p.position.x - 1.0).abs() < 1e-4);
        assert!((p.velocity.y - 2.0).abs() < 1e-4);
        assert!((p.life - 0.5).abs() < 1e-4);
        assert!(system.active);

        system.update(50.0);
        system.update(50.0);
        assert!(!system.particles()[0].is_alive());
        system.update(50.0);
        assert!(!system.active);
    }

    #[test]
    fn test_bounding_box_covers_live_quads() {
        let mut system = ParticleSystem::new(3);
        system.spawn(2, |p| {
            p.width = 10.0;
            p.height = 10.0;
        });
        system.particles_mut()[0].position = Vec3::new(100.0, 100.0, 0.0);
        system.particles_mut()[1].position = Vec3::new(200.0, 150.0, 0.0);
        let mut bb = DamageBox::EMPTY;
        system.expand_bounding_box(Point::ZERO, &mut bb);
        assert_eq!(bb, DamageBox::new(95, 95, 205, 155));
    }

    #[test]
    fn test_long_frame_still_ages_particles() {
        let mut system = ParticleSystem::new(1);
        system.spawn(1, spark);
        system.update(1200.0);
        let p = system.particles()[0];
        assert!(p.position.x > 0.0);
        assert!(!p.is_alive());
        assert!(system.active);

        let mut slow = ParticleSystem::new(1);
        slow.spawn(1, |p| {
            spark(p);
            p.fade = 0.01;
        });
        slow.update(1000.0);
        assert!(slow.particles()[0].is_alive());
        assert!(slow.active);
    }

    #[test]
    fn test_bounding_box_rounds_outward() {
        let mut system = ParticleSystem::new(1);
        system.spawn(1, |p| {
            p.width = 3.0;
            p.height = 3.0;
        });
        system.particles_mut()[0].position = Vec3::new(-10.2, 20.2, 0.0);
        let mut bb = DamageBox::EMPTY;
        system.expand_bounding_box(Point::ZERO, &mut bb);
        // Quad spans x -11.7..-8.7, y 18.7..21.7
        assert_eq!(bb, DamageBox::new(-12, 18, -8, 22));
    }

    #[test]
    fn test_sprites_follow_window_and_fade() {
        let mut system = ParticleSystem::new(2).with_blend(Blend::Additive);
        system.anchor = Point::new(10.0, 10.0);
        system.spawn(1, |p| {
            p.width = 2.0;
            p.height = 2.0;
            p.color = Color::rgba(1.0, 0.5, 0.0, 0.8);
        });
        system.particles_mut()[0].life = 0.5;

        let mut sprites = Vec::new();
        system.sprites(Point::new(30.0, 10.0), 1, &mut sprites);
        assert_eq!(sprites.len(), 1);
        let s = sprites[0];
        assert_eq!(s.position.x, 20.0);
        assert!((s.color.a - 0.4).abs() < 1e-6);
        assert!(s.additive);
        assert_eq!(s.layer, 1);
    }
}
