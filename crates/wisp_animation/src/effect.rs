//! Effect interface
//!
//! Every animation is an [`Effect`] implementation. The engine owns the
//! per-window [`AnimationState`] and hands it to the running effect's hooks
//! through an [`AnimContext`]. Hooks an effect does not need keep their
//! default (mostly no-op) behaviour.
//!
//! Frame order for one animating window:
//!
//! 1. `pre_prepare` (particle/polygon bookkeeping before the clock moves)
//! 2. `init` on the first frame
//! 3. clock advance, then `step`
//! 4. `update_bounding_box` once per output
//! 5. `post_prepare` for every running effect, after all windows stepped
//!
//! Paint hooks (`update_attributes`, `update_transform`, `pre_paint`,
//! `custom_geometry`, `post_paint`) only read the state, except for
//! geometry caches kept in the effect data.

use crate::chain::ChainRegistry;
use crate::event::{EventSet, WindowEvent};
use crate::mesh::{Geometry, Sprite};
use crate::model::GridSize;
use crate::options::{ParamSpec, ParamView};
use crate::paint::{PaintAttributes, PaintInstructions};
use crate::progress::{default_progress, ZOOM_PERCEIVED_T};
use crate::state::AnimationState;
use rustc_hash::FxHashMap;
use wisp_core::{
    DamageBox, Mat4, Point, Rect, Result, Rng, ScreenInfo, ScreenProjection, Vec3, WindowId,
    WindowInfo,
};

/// Everything a hook may look at or change for one window
pub struct AnimContext<'a> {
    pub id: WindowId,
    pub window: &'a WindowInfo,
    pub screen: &'a ScreenInfo,
    pub state: &'a mut AnimationState,
    /// Parameters resolved for the row that selected the effect
    pub params: ParamView<'a>,
    pub rng: &'a mut Rng,
    /// Last known pointer position
    pub pointer: Option<Point>,
    pub chains: &'a mut ChainRegistry,
    /// Snapshots of every known window (dodge needs its subjects)
    pub windows: &'a FxHashMap<WindowId, WindowInfo>,
    /// Configured simulation step in ms
    pub time_step: f32,
    /// Stretch durations of effects that look faster than they are
    pub perceived_time_compensation: bool,
    /// Paint pass: the walker is over the copy painted in the new position
    pub over_new_copy: bool,
}

impl AnimContext<'_> {
    /// Outer rectangle of the window (decorations and shadows included)
    pub fn outer(&self) -> Rect {
        self.window.outer_rect()
    }

    /// Divide the total duration, keeping remaining in sync
    ///
    /// Only applied when perceived-time compensation is enabled.
    pub fn stretch_duration(&mut self, perceived: f32) {
        if self.perceived_time_compensation && perceived > 0.0 {
            self.state.total_time /= perceived;
            self.state.remaining_time = self.state.total_time;
        }
    }

    /// Linear progress of the running animation
    pub fn progress(&self) -> f32 {
        default_progress(self.state)
    }

    pub fn event(&self) -> WindowEvent {
        self.state.event
    }
}

/// How an effect travels between the window and its icon
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomStyle {
    /// Scale uniformly toward the icon (the zoom-to-taskbar variants)
    Plain,
    /// Per-axis scale with optional spring overshoot
    Zoom,
    /// Zoom plus spinning around the window centre
    Sidekick,
}

/// A pluggable window animation
pub trait Effect: Send + Sync {
    /// Display name, unique within the owning extension
    fn name(&self) -> &'static str;

    /// Event classes the effect can be configured for
    fn events(&self) -> EventSet;

    /// Parameters this effect declares
    fn params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// The `None`/`Random` placeholders: selectable but never run
    fn is_placeholder(&self) -> bool {
        false
    }

    /// Grid points carry depth
    fn uses_3d_model(&self) -> bool {
        false
    }

    /// Emit projective texture coordinates to hide quad seams
    fn uses_q_tex_coord(&self) -> bool {
        false
    }

    /// The host draws the window normally (only attributes and transform change)
    fn host_draws_geometry(&self) -> bool {
        false
    }

    /// Geometry comes from [`Effect::custom_geometry`] instead of the grid
    fn uses_custom_geometry(&self) -> bool {
        false
    }

    /// Whether damage is tracked through [`Effect::update_bounding_box`]
    fn has_bounding_box(&self) -> bool {
        true
    }

    /// Paint order must go through the window walker (focus fade, dodge)
    fn reorders_paint(&self) -> bool {
        false
    }

    /// Give the whole window one last damage when the animation ends
    fn damages_window_on_cleanup(&self) -> bool {
        false
    }

    fn zoom_style(&self) -> ZoomStyle {
        ZoomStyle::Plain
    }

    /// Width of the pointer-sized icon an open or close without a taskbar
    /// icon starts from; `None` keeps the window's own minimize target
    fn fake_icon_width(&self, params: &ParamView) -> Option<f32> {
        let _ = params;
        None
    }

    /// Whether this run moves toward the icon instead of animating in place
    fn zooms_to_icon(&self, ctx: &AnimContext) -> bool {
        let _ = ctx;
        false
    }

    /// Grid size the model must have while this effect runs
    fn grid_size(&self, ctx: &AnimContext) -> GridSize {
        let _ = ctx;
        GridSize::default()
    }

    /// First-frame initialisation
    ///
    /// An error aborts the animation; the window still completes its change.
    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        minimize_init(self.zooms_to_icon(ctx), ctx);
        Ok(())
    }

    /// Runs before the clock advances; returns whether work is still pending
    fn pre_prepare(&self, ctx: &mut AnimContext, ms: f32) -> bool {
        let _ = (ctx, ms);
        false
    }

    /// Advance the simulation after the engine moved the clock
    fn step(&self, ctx: &mut AnimContext, ms: f32) {
        let _ = ms;
        default_step(self.zooms_to_icon(ctx), self.zoom_style(), ctx);
    }

    /// Runs once every window has stepped
    ///
    /// `peer_progress` reports another window's transform progress.
    fn post_prepare(&self, ctx: &mut AnimContext, peer_progress: &dyn Fn(WindowId) -> f32) {
        let _ = (ctx, peer_progress);
    }

    /// Release effect resources; must tolerate partially initialised state
    fn cleanup(&self, ctx: &mut AnimContext) {
        let _ = ctx;
    }

    /// Window moved or resized while the effect ran
    fn refresh(&self, ctx: &mut AnimContext, initialized: bool) {
        let _ = (ctx, initialized);
    }

    fn update_attributes(&self, ctx: &AnimContext, attrs: &mut PaintAttributes) {
        let _ = (ctx, attrs);
    }

    /// Compose the effect transform into the host's window transform
    fn update_transform(&self, ctx: &AnimContext, transform: Mat4) -> Mat4 {
        default_update_transform(
            self.uses_3d_model(),
            self.zooms_to_icon(ctx),
            self.zoom_style(),
            ctx,
            transform,
        )
    }

    /// Expand `bb` with the window's footprint on `projection`'s output
    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        let _ = projection;
        window_bounding_box(ctx, bb);
    }

    fn pre_paint(&self, ctx: &AnimContext, paint: &mut PaintInstructions) {
        let _ = (ctx, paint);
    }

    /// Drawable faces for custom-geometry effects, clipped to `clips`
    fn custom_geometry(&self, ctx: &mut AnimContext, clips: &[Rect]) -> Option<Geometry> {
        let _ = (ctx, clips);
        None
    }

    /// Extra sprites drawn over the window (particles)
    fn post_paint(&self, ctx: &AnimContext) -> Vec<Sprite> {
        let _ = ctx;
        Vec::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Default hooks
// ─────────────────────────────────────────────────────────────────────────────

/// Remember the opacity and take the configured time step
pub fn default_init(ctx: &mut AnimContext) {
    ctx.state.stored_opacity = ctx.window.opacity;
    ctx.state.time_step = ctx.time_step;
}

/// Init for effects that may zoom to the icon
pub fn minimize_init(zooms_to_icon: bool, ctx: &mut AnimContext) {
    if zooms_to_icon {
        ctx.stretch_duration(ZOOM_PERCEIVED_T);
        ctx.state.using_transform = true;
    }
    default_init(ctx);
}

/// Init for effects that always compose a transform
pub fn transform_init(zooms_to_icon: bool, ctx: &mut AnimContext) {
    ctx.state.using_transform = true;
    minimize_init(zooms_to_icon, ctx);
}

/// Reset the transform, then apply the icon zoom when it is active
pub fn default_step(zooms_to_icon: bool, style: ZoomStyle, ctx: &mut AnimContext) {
    ctx.state.transform = Mat4::IDENTITY;
    if zooms_to_icon {
        ctx.state.transform = crate::effects::zoom::zoom_transform(style, ctx);
    }
}

/// Progress and the point perspective correction centres on
pub fn progress_and_center(
    zooms_to_icon: bool,
    style: ZoomStyle,
    ctx: &AnimContext,
) -> (f32, Point) {
    let outer = ctx.outer();
    if zooms_to_icon {
        return crate::effects::zoom::zoom_progress_and_center(style, ctx);
    }

    let progress = default_progress(ctx.state);
    let center_y = if ctx.state.event.is_shade() {
        let top = ctx
            .state
            .model
            .as_ref()
            .map(|m| m.top_height)
            .unwrap_or(ctx.window.output.top as f32);
        let orig = outer.y() + outer.height() / 2.0;
        (1.0 - progress) * orig + progress * (outer.y() + top)
    } else {
        outer.y() + outer.height() / 2.0
    };
    (progress, Point::new(outer.x() + outer.width() / 2.0, center_y))
}

/// Perspective skew of the output the point lies on
pub fn perspective_skew(ctx: &AnimContext, center: Point) -> Mat4 {
    let (sx, sy) = ctx.screen.output_at(center).perspective_skew(center);
    Mat4::IDENTITY.with_perspective_skew(sx, sy)
}

pub fn default_update_transform(
    uses_3d: bool,
    zooms_to_icon: bool,
    style: ZoomStyle,
    ctx: &AnimContext,
    transform: Mat4,
) -> Mat4 {
    if !ctx.state.using_transform {
        return transform;
    }
    let composed = transform.mul(&ctx.state.transform);
    if uses_3d {
        let (_, center) = progress_and_center(zooms_to_icon, style, ctx);
        composed.mul(&perspective_skew(ctx, center))
    } else {
        composed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bounding boxes
// ─────────────────────────────────────────────────────────────────────────────

/// The window's outer rectangle
pub fn window_bounding_box(ctx: &AnimContext, bb: &mut DamageBox) {
    bb.expand_with_box(&DamageBox::from_rect(&ctx.outer()));
}

/// The whole screen
pub fn screen_bounding_box(ctx: &AnimContext, bb: &mut DamageBox) {
    bb.expand_with_box(&DamageBox::from_rect(&ctx.screen.rect()));
}

/// Corners of the outer rectangle projected through the effect transform
pub fn transformed_bounding_box(
    ctx: &AnimContext,
    projection: &ScreenProjection,
    bb: &mut DamageBox,
) {
    let r = ctx.outer();
    let corners = [
        Vec3::new(r.x(), r.y(), 0.0),
        Vec3::new(r.right(), r.y(), 0.0),
        Vec3::new(r.x(), r.bottom(), 0.0),
        Vec3::new(r.right(), r.bottom(), 0.0),
    ];
    projection.expand_box(&ctx.state.transform, corners, bb);
}

/// Deformed grid points, through the transform when one is in use
pub fn model_bounding_box(
    uses_3d: bool,
    zooms_to_icon: bool,
    style: ZoomStyle,
    ctx: &AnimContext,
    projection: &ScreenProjection,
    bb: &mut DamageBox,
) {
    let Some(model) = ctx.state.model.as_ref() else {
        return;
    };

    if ctx.state.using_transform {
        if uses_3d {
            let (_, center) = progress_and_center(zooms_to_icon, style, ctx);
            let (sx, sy) = projection.output().perspective_skew(center);
            let full = ctx.state.transform.with_perspective_skew(sx, sy);
            projection.expand_box(&full, model.points.iter().map(|p| p.position), bb);
        } else {
            for p in &model.points {
                let t = ctx
                    .state
                    .transform
                    .transform_point(Vec3::new(p.position.x, p.position.y, 0.0));
                bb.expand_with_point(t.x, t.y);
            }
        }
    } else {
        for p in &model.points {
            bb.expand_with_point(p.position.x + 0.5, p.position.y + 0.5);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Playback;
    use crate::testing::Fixture;

    #[test]
    fn test_minimize_init_stretches_zooming_runs() {
        let mut f = Fixture::new();
        f.state.total_time = 300.0;
        f.state.remaining_time = 300.0;
        let mut ctx = f.ctx();
        minimize_init(true, &mut ctx);
        assert!((f.state.total_time - 400.0).abs() < 1e-3);
        assert_eq!(f.state.remaining_time, f.state.total_time);
        assert!(f.state.using_transform);
    }

    #[test]
    fn test_stretch_respects_compensation_flag() {
        let mut f = Fixture::new();
        f.state.total_time = 300.0;
        let mut ctx = f.ctx();
        ctx.perceived_time_compensation = false;
        ctx.stretch_duration(0.75);
        assert_eq!(f.state.total_time, 300.0);
    }

    #[test]
    fn test_window_box_covers_outer_rect() {
        let mut f = Fixture::new();
        let ctx = f.ctx();
        let mut bb = DamageBox::EMPTY;
        window_bounding_box(&ctx, &mut bb);
        assert_eq!(bb, DamageBox::new(100, 100, 300, 200));
    }

    #[test]
    fn test_shade_center_moves_to_title() {
        let mut f = Fixture::new();
        f.state.event = WindowEvent::Shade;
        f.state.playback = Playback::Forward;
        f.state.total_time = 110.0;
        f.state.time_step = 10.0;
        f.state.remaining_time = 0.0;
        let ctx = f.ctx();
        let (p, c) = progress_and_center(false, ZoomStyle::Plain, &ctx);
        assert_eq!(p, 1.0);
        assert_eq!(c.y, 100.0);
    }
}
