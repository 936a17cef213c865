//! Leaf Spread
//!
//! The window comes apart into leaves that drift away row by row from the
//! top, each turning as it goes.

use super::LEAF_SPREAD_PERCEIVED_T;
use crate::polygon::{Perspective, PolygonEffect, PolygonSet};
use wisp_animation::AnimContext;
use wisp_core::{Result, Vec3, DEFAULT_Z_CAMERA};

const FADE_DURATION: f32 = 0.26;
/// Time a leaf travels before it starts to fade
const LIFE: f32 = 0.4;
const SPREAD: f32 = 3.5;
/// Random delay added to the row delay
const RANDOM_DELAY: f32 = 0.07;

pub struct LeafSpread;

impl PolygonEffect for LeafSpread {
    fn name(&self) -> &'static str {
        "Leaf Spread"
    }

    fn build(&self, ctx: &mut AnimContext) -> Result<PolygonSet> {
        let screen_width = ctx.screen.width as f32;
        let mut set = PolygonSet::new(false);
        set.tessellate_rectangles(ctx.window, screen_width, 20, 14, 15.0)?;

        let outer = ctx.outer();
        let fac_x = outer.width() / 800.0;
        let fac_y = outer.height() / 800.0;
        let fac_z = (outer.width() + outer.height()) / 2.0 / 800.0;
        let screen_factor = 0.8 * DEFAULT_Z_CAMERA * screen_width;

        let rng = &mut *ctx.rng;
        for p in &mut set.polygons {
            p.rot_axis = Vec3::new(rng.next_f32(), rng.next_f32(), rng.next_f32());
            let speed = screen_factor / 10.0 * (0.2 + rng.next_f32());

            let xx = 2.0 * (p.rel_pos.x - 0.5);
            let yy = 2.0 * (p.rel_pos.y - 0.5);
            p.final_rel_pos = Vec3::new(
                speed * fac_x * SPREAD * (xx + 0.5 * (rng.next_f32() - 0.5)),
                speed * fac_y * SPREAD * (yy + 0.5 * (rng.next_f32() - 0.5)),
                speed * fac_z * 7.0 * ((rng.next_f32() - 0.5) / 0.5),
            );

            p.move_start =
                p.rel_pos.y * (1.0 - FADE_DURATION - RANDOM_DELAY) + RANDOM_DELAY * rng.next_f32();
            p.move_duration = 1.0;
            p.fade_start = (p.move_start + LIFE).min(1.0 - FADE_DURATION);
            p.fade_duration = FADE_DURATION;
            p.final_rot_angle = 150.0;
        }
        set.depth_test = true;
        set.lighting = true;
        set.perspective = Perspective::Polygon;

        ctx.stretch_duration(LEAF_SPREAD_PERCEIVED_T);
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Polygons;
    use crate::testing::Fixture;
    use wisp_animation::{Effect, WindowEvent};
    use wisp_core::{WindowId, WindowInfo};

    #[test]
    fn test_rows_leave_top_first() {
        let mut f = Fixture::with_window(WindowInfo::new(WindowId(3), 0, 0, 400, 280));
        f.start(WindowEvent::Minimize, 600.0);
        Polygons(LeafSpread).init(&mut f.ctx()).unwrap();

        let set = f.state.data::<PolygonSet>().unwrap();
        assert_eq!(set.grid, (20, 14));
        let top = &set.polygons[0];
        let bottom = &set.polygons[set.len() - 1];
        // Row delays differ by more than the random part
        assert!(top.move_start < bottom.move_start);
        assert!(set
            .polygons
            .iter()
            .all(|p| p.fade_start <= 1.0 - FADE_DURATION && p.fade_duration == FADE_DURATION));
        assert_eq!(set.all_fade_duration, None);
    }
}
