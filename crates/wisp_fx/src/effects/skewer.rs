//! Skewer
//!
//! Pieces shoot off the screen one after another in random order, either
//! sideways, vertically or straight through the screen plane.

use super::SKEWER_PERCEIVED_T;
use crate::polygon::{Perspective, PolygonEffect, PolygonSet, StepFrame, Tessellation};
use smallvec::SmallVec;
use wisp_animation::{AnimContext, ParamSpec};
use wisp_core::{Result, Rng, Vec3, DEFAULT_Z_CAMERA};

/// Where a single piece leaves to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Heading {
    Left,
    Right,
    Up,
    Down,
    In,
    Out,
}

/// Headings a piece may pick from for a `skewer_direction` value
fn headings(direction: i64, rng: &mut Rng) -> SmallVec<[Heading; 2]> {
    use Heading::*;
    let list: &[Heading] = match direction {
        0 => &[Left],
        1 => &[Right],
        2 => &[Left, Right],
        3 => &[Up],
        4 => &[Down],
        5 => &[Up, Down],
        6 => &[In],
        7 => &[Out],
        8 => &[In, Out],
        9 => return headings(rng.below(8) as i64, rng),
        _ => &[],
    };
    SmallVec::from_slice(list)
}

pub struct Skewer;

impl PolygonEffect for Skewer {
    fn name(&self) -> &'static str {
        "Skewer"
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::int("skewer_gridx", 6, 1, 200),
            ParamSpec::int("skewer_gridy", 4, 1, 200),
            ParamSpec::float("skewer_thickness", 0.0, 0.0, 100.0),
            ParamSpec::int("skewer_direction", 8, 0, 9),
            ParamSpec::int("skewer_tessellation", 0, 0, 1),
            ParamSpec::int("skewer_rotation", 0, -720, 720),
        ]
    }

    fn build(&self, ctx: &mut AnimContext) -> Result<PolygonSet> {
        ctx.stretch_duration(SKEWER_PERCEIVED_T);

        let screen_width = ctx.screen.width as f32;
        let screen_height = ctx.screen.height as f32;
        let thickness = ctx.params.float("skewer_thickness");
        let rotation = ctx.params.int("skewer_rotation") as f32;
        let grid_x = ctx.params.int("skewer_gridx").max(1) as usize;
        let grid_y = ctx.params.int("skewer_gridy").max(1) as usize;
        let choices = headings(ctx.params.int("skewer_direction"), ctx.rng);

        let mut set = PolygonSet::new(false);
        let tessellation = Tessellation::from_index(ctx.params.int("skewer_tessellation") as i32);
        if tessellation == Some(Tessellation::Hexagons) {
            set.tessellate_hexagons(ctx.window, screen_width, grid_x, grid_y, thickness)?;
        } else {
            set.tessellate_rectangles(ctx.window, screen_width, grid_x, grid_y, thickness)?;
        }

        // Draw start slots without replacement
        let n = set.len();
        let mut slots: Vec<usize> = (0..n).collect();
        let mut last = n.saturating_sub(1);
        let depth = 0.8 * DEFAULT_Z_CAMERA * screen_width;
        let rng = &mut *ctx.rng;
        for p in &mut set.polygons {
            if !choices.is_empty() {
                match choices[rng.below(choices.len())] {
                    Heading::Left => {
                        p.final_rel_pos.x = -screen_width;
                        p.rot_axis.x = rotation;
                    }
                    Heading::Right => {
                        p.final_rel_pos.x = screen_width;
                        p.rot_axis.x = rotation;
                    }
                    Heading::Up => {
                        p.final_rel_pos.y = -screen_height;
                        p.rot_axis.y = rotation;
                    }
                    Heading::Down => {
                        p.final_rel_pos.y = screen_height;
                        p.rot_axis.y = rotation;
                    }
                    Heading::In => {
                        p.final_rel_pos.z = -depth;
                        p.rot_axis = Vec3::new(rotation, rotation, 0.0);
                    }
                    Heading::Out => {
                        p.final_rel_pos.z = depth;
                        p.rot_axis = Vec3::new(rotation, rotation, 0.0);
                    }
                }
                p.final_rot_angle = rotation;
            }

            let k = ((rng.next_f32() * last as f32) as usize).min(last);
            p.move_start = 0.8 / n as f32 * slots[k] as f32;
            p.move_duration = 1.0 - p.move_start;
            p.fade_start = p.move_start + 0.2;
            p.fade_duration = 1.0 - p.fade_start;
            slots[k] = slots[last];
            last = last.saturating_sub(1);
        }
        set.depth_test = true;
        set.lighting = true;
        set.perspective = Perspective::Window;
        Ok(set)
    }

    fn step_polygons(&self, frame: &StepFrame, set: &mut PolygonSet) {
        let screen_width = frame.screen_width();
        for p in &mut set.polygons {
            let moved = p.move_progress(frame.progress);
            p.place(moved * moved, screen_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Polygons;
    use crate::testing::Fixture;
    use wisp_animation::{Effect, ParamValue, ParamView, WindowEvent};

    fn skewered(direction: i64) -> PolygonSet {
        let mut f = Fixture::new();
        f.set("skewer_direction", ParamValue::Int(direction));
        f.set("skewer_rotation", ParamValue::Int(90));
        f.start(WindowEvent::Minimize, 600.0);
        Polygons(Skewer).init(&mut f.ctx()).unwrap();
        assert!((f.state.total_time - 1000.0).abs() < 0.01);
        f.state.data::<PolygonSet>().unwrap().clone()
    }

    #[test]
    fn test_random_direction_picks_a_fixed_list() {
        let mut rng = Rng::new(3);
        for _ in 0..20 {
            let list = headings(9, &mut rng);
            assert!(!list.is_empty() && list.len() <= 2);
        }
        assert_eq!(headings(5, &mut rng).as_slice(), &[Heading::Up, Heading::Down]);
    }

    #[test]
    fn test_start_times_are_a_permutation() {
        let set = skewered(1);
        let n = set.len();
        assert_eq!(n, 24);
        let mut slots: Vec<usize> = set
            .polygons
            .iter()
            .map(|p| (p.move_start * n as f32 / 0.8).round() as usize)
            .collect();
        slots.sort_unstable();
        assert_eq!(slots, (0..n).collect::<Vec<_>>());
        for p in &set.polygons {
            assert!((p.move_start + p.move_duration - 1.0).abs() < 1e-5);
            assert_eq!(p.final_rel_pos.x, 1000.0);
            assert_eq!(p.final_rot_angle, 90.0);
        }
    }

    #[test]
    fn test_pieces_accelerate_away() {
        let mut set = skewered(6);
        assert!(set.polygons.iter().all(|p| p.final_rel_pos.z < 0.0));
        for p in &mut set.polygons {
            p.move_start = 0.0;
            p.move_duration = 1.0;
        }
        let f = Fixture::new();
        let params = ParamView::new(&[], &f.configured, &f.specs);
        let frame = StepFrame {
            progress: 0.5,
            event: WindowEvent::Minimize,
            screen: &f.screen,
            border: set.polygons[0].bounds,
            icon: wisp_core::Rect::ZERO,
            params: &params,
        };
        Skewer.step_polygons(&frame, &mut set);
        let p = &set.polygons[0];
        let expected = p.center_start.z + 0.25 * p.final_rel_pos.z / 1000.0;
        assert!((p.center.z - expected).abs() < 1e-6);
        assert_eq!(p.rot_angle, 22.5);
    }
}
