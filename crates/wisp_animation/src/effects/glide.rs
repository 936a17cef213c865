//! Glide 1 and Glide 2
//!
//! The window tilts around its horizontal axis and slides away in depth while
//! fading. The two variants only differ in their configured distance and
//! angle. Once the window turns its back to the viewer the host must cull
//! front faces instead of back faces.

use super::zoom::fade_with_scale;
use crate::effect::{
    default_init, default_step, transformed_bounding_box, AnimContext, Effect, ZoomStyle,
};
use crate::event::EventSet;
use crate::options::ParamSpec;
use crate::paint::{PaintAttributes, PaintInstructions};
use crate::progress::{decelerate, zoom_progress, ZOOM_PERCEIVED_T};
use wisp_core::{DamageBox, Mat4, Result, ScreenProjection, Vec3, DEFAULT_Z_CAMERA};

pub struct Glide {
    second: bool,
}

impl Glide {
    pub fn one() -> Self {
        Self { second: false }
    }

    pub fn two() -> Self {
        Self { second: true }
    }

    fn param(&self, name: &str) -> &'static str {
        match (self.second, name) {
            (false, "away_position") => "glide1_away_position",
            (false, "away_angle") => "glide1_away_angle",
            (false, _) => "glide1_zoom_to_taskbar",
            (true, "away_position") => "glide2_away_position",
            (true, "away_angle") => "glide2_away_angle",
            (true, _) => "glide2_zoom_to_taskbar",
        }
    }

    fn progress(&self, ctx: &AnimContext) -> f32 {
        if self.zooms_to_icon(ctx) {
            zoom_progress(ctx.state, 0.0, true).movement
        } else {
            decelerate(ctx.progress())
        }
    }

    /// Rotation so far, folded into [0, 360)
    fn rotation(&self, ctx: &AnimContext) -> f32 {
        let angle = ctx.params.float(self.param("away_angle")) * self.progress(ctx);
        (angle + 720.0).rem_euclid(360.0)
    }

    fn glide_transform(&self, ctx: &AnimContext, base: Mat4) -> Mat4 {
        let progress = self.progress(ctx);
        let screen_w = ctx.screen.width.max(1) as f32;
        let final_z =
            ctx.params.float(self.param("away_position")) * 0.8 * DEFAULT_Z_CAMERA * screen_w;
        let angle = ctx.params.float(self.param("away_angle")) * progress;
        let axis = ctx.outer().center();

        base.translate(axis.x, axis.y, 0.0)
            .perspective_distort_and_reset_z(screen_w)
            .translate(0.0, 0.0, final_z * progress)
            .rotate(angle, Vec3::X)
            // Flatten depth so the tilted window keeps a stable opacity
            .scale_by(1.0, 1.0, 0.0)
            .translate(-axis.x, -axis.y, 0.0)
    }
}

impl Effect for Glide {
    fn name(&self) -> &'static str {
        if self.second {
            "Glide 2"
        } else {
            "Glide 1"
        }
    }

    fn events(&self) -> EventSet {
        EventSet::OPEN_CLOSE_MINIMIZE
    }

    fn params(&self) -> Vec<ParamSpec> {
        let (position, angle) = if self.second { (-0.4, -45.0) } else { (1.0, 0.0) };
        vec![
            ParamSpec::float(self.param("away_position"), position, -2.0, 2.0),
            ParamSpec::float(self.param("away_angle"), angle, -540.0, 540.0),
            ParamSpec::boolean(self.param("zoom_to_taskbar"), true),
        ]
    }

    fn host_draws_geometry(&self) -> bool {
        true
    }

    fn zooms_to_icon(&self, ctx: &AnimContext) -> bool {
        ctx.state.event.is_minimize() && ctx.params.boolean(self.param("zoom_to_taskbar"))
    }

    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        if self.zooms_to_icon(ctx) {
            ctx.stretch_duration(ZOOM_PERCEIVED_T);
        }
        ctx.state.using_transform = true;
        default_init(ctx);
        Ok(())
    }

    fn step(&self, ctx: &mut AnimContext, _ms: f32) {
        default_step(self.zooms_to_icon(ctx), ZoomStyle::Plain, ctx);
        ctx.state.transform = self.glide_transform(ctx, ctx.state.transform);
    }

    fn update_attributes(&self, ctx: &AnimContext, attrs: &mut PaintAttributes) {
        if self.zooms_to_icon(ctx) {
            fade_with_scale(ZoomStyle::Plain, ctx, attrs);
        } else {
            attrs.opacity = ctx.state.stored_opacity * (1.0 - self.progress(ctx));
        }
    }

    fn update_transform(&self, ctx: &AnimContext, transform: Mat4) -> Mat4 {
        transform.mul(&ctx.state.transform)
    }

    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        transformed_bounding_box(ctx, projection, bb);
    }

    fn pre_paint(&self, ctx: &AnimContext, paint: &mut PaintInstructions) {
        let angle = self.rotation(ctx);
        if 90.0 < angle && angle < 270.0 {
            paint.cull_front_faces = true;
        }
    }
}
