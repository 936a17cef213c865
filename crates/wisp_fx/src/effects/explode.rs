//! Explode
//!
//! The window shatters and its pieces fly outward and toward the viewer,
//! spinning, while everything fades over the last stretch.

use super::EXPLODE_PERCEIVED_T;
use crate::polygon::{Perspective, PolygonEffect, PolygonSet, Tessellation};
use std::f32::consts::SQRT_2;
use wisp_animation::{AnimContext, ParamSpec};
use wisp_core::{Result, Vec3, WispError, DEFAULT_Z_CAMERA};

pub struct Explode;

impl PolygonEffect for Explode {
    fn name(&self) -> &'static str {
        "Explode"
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::float("explode_thickness", 15.0, 1.0, 100.0),
            ParamSpec::int("explode_gridx", 13, 1, 200),
            ParamSpec::int("explode_gridy", 10, 1, 200),
            ParamSpec::int("explode_spokes", 2, 1, 10),
            ParamSpec::int("explode_tiers", 3, 1, 20),
            ParamSpec::int("explode_tessellation", 0, 0, 2),
        ]
    }

    fn build(&self, ctx: &mut AnimContext) -> Result<PolygonSet> {
        let screen_width = ctx.screen.width as f32;
        let thickness = ctx.params.float("explode_thickness");
        let grid_x = ctx.params.int("explode_gridx").max(1) as usize;
        let grid_y = ctx.params.int("explode_gridy").max(1) as usize;

        let mut set = PolygonSet::new(false);
        let index = ctx.params.int("explode_tessellation");
        match Tessellation::from_index(index as i32) {
            Some(Tessellation::Rectangles) => {
                set.tessellate_rectangles(ctx.window, screen_width, grid_x, grid_y, thickness)?
            }
            Some(Tessellation::Hexagons) => {
                set.tessellate_hexagons(ctx.window, screen_width, grid_x, grid_y, thickness)?
            }
            Some(Tessellation::Glass) => {
                let spokes = ctx.params.int("explode_spokes").max(1) as usize;
                let tiers = ctx.params.int("explode_tiers").max(1) as usize;
                let rng = &mut *ctx.rng;
                set.tessellate_glass(ctx.window, screen_width, spokes, tiers, thickness, || {
                    rng.next_f32()
                })?
            }
            None => {
                return Err(WispError::Config(format!(
                    "unknown explode tessellation {index}"
                )))
            }
        }

        let screen_factor = 0.8 * DEFAULT_Z_CAMERA * screen_width;
        let rng = &mut *ctx.rng;
        for p in &mut set.polygons {
            p.rot_axis = Vec3::new(rng.next_f32(), rng.next_f32(), rng.next_f32());
            let speed = screen_factor / 10.0 * (0.2 + rng.next_f32());

            let xx = 2.0 * (p.rel_pos.x - 0.5);
            let yy = 2.0 * (p.rel_pos.y - 0.5);
            let x = speed * 2.0 * (xx + 0.5 * (rng.next_f32() - 0.5));
            let y = speed * 2.0 * (yy + 0.5 * (rng.next_f32() - 0.5));

            // Pieces near the middle come out furthest
            let spread = (1.0 - (xx * xx + yy * yy).sqrt() / SQRT_2).max(0.0);
            let z = speed * 10.0 * (0.1 + rng.next_f32() * spread.sqrt());

            p.final_rel_pos = Vec3::new(x, y, z);
            p.final_rot_angle = rng.next_f32() * 540.0 - 270.0;
        }
        set.all_fade_duration = Some(0.3);
        set.back_and_sides_fade = 0.2;
        set.depth_test = true;
        set.lighting = true;
        set.perspective = Perspective::Polygon;

        ctx.stretch_duration(EXPLODE_PERCEIVED_T);
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Polygons;
    use crate::testing::Fixture;
    use wisp_animation::{Effect, ParamValue, WindowEvent};
    use wisp_core::{WindowId, WindowInfo};

    #[test]
    fn test_pieces_fly_toward_the_viewer() {
        let mut f = Fixture::new();
        f.start(WindowEvent::Close, 700.0);
        Polygons(Explode).init(&mut f.ctx()).unwrap();

        assert!((f.state.total_time - 1000.0).abs() < 1e-2);
        let set = f.state.data::<PolygonSet>().unwrap();
        // 200 × 100 window: 13 columns fit, 10 rows of 10 px
        assert_eq!(set.grid, (13, 10));
        assert_eq!(set.all_fade_duration, Some(0.3));
        assert!(set.polygons.iter().all(|p| p.final_rel_pos.z > 0.0));
        assert!(set
            .polygons
            .iter()
            .all(|p| (-270.0..=270.0).contains(&p.final_rot_angle)));
    }

    #[test]
    fn test_left_pieces_head_left() {
        let mut f = Fixture::new();
        f.start(WindowEvent::Close, 700.0);
        Polygons(Explode).init(&mut f.ctx()).unwrap();
        let set = f.state.data::<PolygonSet>().unwrap();
        // Jitter is at most a quarter of the spread
        assert!(set.polygons[0].final_rel_pos.x < 0.0);
        assert!(set.polygons[set.len() - 1].final_rel_pos.x > 0.0);
    }

    #[test]
    fn test_small_window_cannot_shatter() {
        let mut f = Fixture::with_window(WindowInfo::new(WindowId(1), 0, 0, 80, 60));
        f.set("explode_tessellation", ParamValue::Int(2));
        f.start(WindowEvent::Close, 700.0);
        let err = Polygons(Explode).init(&mut f.ctx()).unwrap_err();
        assert!(matches!(err, WispError::Resource(_)));
        assert!(!f.state.has_data());
    }
}
