//! Glide 3
//!
//! The window tilts around its horizontal axis and glides away (or toward
//! the viewer) as one slab, easing out.

use crate::polygon::{Perspective, PolygonEffect, PolygonSet, StepFrame};
use wisp_animation::{AnimContext, ParamSpec};
use wisp_core::{Result, Vec3, DEFAULT_Z_CAMERA};

pub struct Glide3;

impl PolygonEffect for Glide3 {
    fn name(&self) -> &'static str {
        "Glide 3"
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::float("glide3_away_position", -0.4, -2.0, 2.0),
            ParamSpec::float("glide3_away_angle", 45.0, -540.0, 540.0),
            ParamSpec::float("glide3_thickness", 0.0, 0.0, 100.0),
        ]
    }

    fn build(&self, ctx: &mut AnimContext) -> Result<PolygonSet> {
        let screen_width = ctx.screen.width as f32;
        let distance = ctx.params.float("glide3_away_position");
        let angle = ctx.params.float("glide3_away_angle");
        let thickness = ctx.params.float("glide3_thickness");

        // A flat slab carries the shadow with it
        let mut set = PolygonSet::new(thickness < 1e-5);
        set.tessellate_rectangles(ctx.window, screen_width, 1, 1, thickness)?;

        for p in &mut set.polygons {
            p.rot_axis = Vec3::X;
            p.final_rel_pos = Vec3::new(0.0, 0.0, distance * 0.8 * DEFAULT_Z_CAMERA * screen_width);
            p.final_rot_angle = angle;
        }
        set.all_fade_duration = Some(1.0);
        set.back_and_sides_fade = 0.2;
        set.lighting = true;
        set.perspective = Perspective::Polygon;
        set.decelerating = true;
        Ok(set)
    }

    fn step_polygons(&self, frame: &StepFrame, set: &mut PolygonSet) {
        let screen_width = frame.screen_width();
        for p in &mut set.polygons {
            p.step_decelerating(frame.progress, screen_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Polygons;
    use crate::testing::Fixture;
    use wisp_animation::{Effect, WindowEvent};
    use wisp_core::{Extents, WindowId, WindowInfo};

    #[test]
    fn test_flat_glide_includes_shadow() {
        let window = WindowInfo::new(WindowId(2), 100, 100, 200, 100)
            .with_extents(Extents::default(), Extents::new(5, 5, 5, 5));
        let mut f = Fixture::with_window(window);
        f.start(WindowEvent::Close, 300.0);
        Polygons(Glide3).init(&mut f.ctx()).unwrap();

        let set = f.state.data::<PolygonSet>().unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.include_shadows);
        // Outer rectangle, one pixel narrower
        assert_eq!(set.polygons[0].bounds.width(), 209.0);
        assert!(set.polygons[0].final_rel_pos.z < 0.0);
    }

    #[test]
    fn test_glide_eases_out() {
        let mut f = Fixture::new();
        f.start(WindowEvent::Close, 300.0);
        let effect = Polygons(Glide3);
        effect.init(&mut f.ctx()).unwrap();

        f.state.remaining_time = 145.0;
        effect.step(&mut f.ctx(), 10.0);
        let angle = f.state.data::<PolygonSet>().unwrap().polygons[0].rot_angle;
        let eased = wisp_animation::progress::decelerate(0.5) * 45.0;
        assert!((angle - eased).abs() < 1e-3);
        assert!((angle - 22.5).abs() > 1.0);
    }
}
