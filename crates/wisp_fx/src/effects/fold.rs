//! Fold
//!
//! The window folds up like a sheet of paper: rows flip onto the row below
//! them from the top down, then the pieces of the last row fold in from the
//! sides onto the middle one.

use super::FOLD_PERCEIVED_T;
use crate::polygon::{Perspective, PolygonEffect, PolygonObject, PolygonSet, StepFrame};
use wisp_animation::{AnimContext, ParamSpec};
use wisp_core::{Result, Vec3};

/// What a piece does in the fold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    /// Flips over onto the next row
    Row(usize),
    Left,
    Middle,
    Right,
}

fn role(index: usize, grid: (usize, usize)) -> Role {
    let (gx, gy) = grid;
    let bottom = gx * gy.saturating_sub(1);
    if index < bottom {
        return Role::Row(index / gx);
    }
    let column = index - bottom;
    match column.cmp(&(gx / 2)) {
        std::cmp::Ordering::Less => Role::Left,
        std::cmp::Ordering::Equal => Role::Middle,
        std::cmp::Ordering::Greater => Role::Right,
    }
}

/// `fold_dir` 0 folds toward the viewer
fn fold_in(dir: i64) -> bool {
    dir == 0
}

pub struct Fold;

impl PolygonEffect for Fold {
    fn name(&self) -> &'static str {
        "Fold"
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::int("fold_gridx", 3, 1, 100),
            ParamSpec::int("fold_gridy", 3, 1, 100),
            ParamSpec::int("fold_dir", 1, 0, 1),
        ]
    }

    fn build(&self, ctx: &mut AnimContext) -> Result<PolygonSet> {
        ctx.stretch_duration(FOLD_PERCEIVED_T);

        let mut set = PolygonSet::new(false);
        set.tessellate_rectangles(
            ctx.window,
            ctx.screen.width as f32,
            ctx.params.int("fold_gridx").max(1) as usize,
            ctx.params.int("fold_gridy").max(1) as usize,
            1.0,
        )?;
        let (gx, gy) = set.grid;
        let inward = fold_in(ctx.params.int("fold_dir"));
        let half = gx / 2;

        let (fd, rows) = if gy == 1 {
            (1.0 / (gy + 2 * half) as f32, 0.0)
        } else {
            let fd = 1.0 / (gy + 2 * half + 1 + inward as usize) as f32;
            (fd, (gy - 1 + inward as usize) as f32 * fd)
        };
        let duration = 2.0 * fd;

        for (i, p) in set.polygons.iter_mut().enumerate() {
            p.final_rot_angle = 180.0;
            let start = match role(i, (gx, gy)) {
                Role::Row(row) => {
                    let start = row as f32 * fd;
                    p.rot_axis = Vec3::new(180.0, 0.0, 0.0);
                    p.fade_start = if row + 2 < gy || inward {
                        start + fd
                    } else {
                        start
                    };
                    start
                }
                Role::Left => {
                    let column = (i % gx) as f32;
                    p.rot_axis = Vec3::new(0.0, -180.0, 0.0);
                    let start = rows + duration * column;
                    p.fade_start = start + fd;
                    start
                }
                Role::Middle => {
                    p.rot_axis = Vec3::new(0.0, 90.0, 0.0);
                    p.final_rot_angle = 90.0;
                    let start = rows + duration * half as f32;
                    p.fade_start = start + fd;
                    start
                }
                Role::Right => {
                    // Mirrors the left side, innermost first
                    let column = i % gx;
                    let k = (column - half - 1) as f32;
                    p.rot_axis = Vec3::new(0.0, 180.0, 0.0);
                    let start = rows + (half as f32 - 1.0) * duration - duration * k;
                    p.fade_start = start + fd;
                    start
                }
            };
            p.fade_duration = fd;
            p.move_start = start;
            p.move_duration = duration;
        }
        set.depth_test = true;
        set.lighting = true;
        set.perspective = Perspective::Window;
        Ok(set)
    }

    fn step_polygons(&self, frame: &StepFrame, set: &mut PolygonSet) {
        let (gx, gy) = set.grid;
        if gx == 0 || gy == 0 {
            return;
        }
        let dir = if fold_in(frame.params.int("fold_dir")) {
            1.0
        } else {
            -1.0
        };
        let screen_width = frame.screen_width();
        let cell_w = frame.border.width() / gx as f32;
        let cell_h = frame.border.height() / gy as f32;

        for (i, p) in set.polygons.iter_mut().enumerate() {
            let moved = p.move_progress(frame.progress);
            p.rot_angle = dir * moved * p.final_rot_angle;
            p.center = p.center_start;
            match role(i, (gx, gy)) {
                Role::Row(row) if row + 2 == gy || p.rot_angle.abs() < 90.0 => {
                    hinge_down(p, cell_h, screen_width);
                }
                Role::Row(_) => {
                    // Past upright the piece turns twice as fast and rolls over the next row
                    let alpha = p.rot_angle - dir * 90.0;
                    let (a, a2) = (alpha.to_radians(), (2.0 * alpha).to_radians());
                    p.rot_angle = alpha * 2.0 + dir * 90.0;
                    p.center.y = p.center_start.y + cell_h / 2.0 + cell_h - a.cos() * cell_h
                        + dir * a2.sin() * cell_h / 2.0;
                    p.center.z = p.center_start.z
                        + (-a.sin() * cell_h - dir * a2.cos() * cell_h / 2.0) / screen_width;
                }
                Role::Left => {
                    let a = p.rot_angle.to_radians();
                    p.center.x = p.center_start.x + (1.0 - a.cos()) * cell_w / 2.0;
                    p.center.z = p.center_start.z - a.sin() * cell_w / 2.0 / screen_width;
                }
                Role::Right => {
                    let a = -p.rot_angle.to_radians();
                    p.center.x = p.center_start.x - (1.0 - a.cos()) * cell_w / 2.0;
                    p.center.z = p.center_start.z + a.sin() * cell_w / 2.0 / screen_width;
                }
                Role::Middle => {}
            }
        }
    }
}

/// Turn about the piece's bottom edge
fn hinge_down(p: &mut PolygonObject, cell_h: f32, screen_width: f32) {
    let a = p.rot_angle.to_radians();
    p.center.y = p.center_start.y + (1.0 - a.cos()) * cell_h / 2.0;
    p.center.z = p.center_start.z + (-a).sin() * cell_h / 2.0 / screen_width;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Polygons;
    use crate::testing::Fixture;
    use wisp_animation::{Effect, ParamValue, ParamView, WindowEvent};

    fn folded(dir: i64) -> Fixture {
        let mut f = Fixture::new();
        f.set("fold_dir", ParamValue::Int(dir));
        f.start(WindowEvent::Minimize, 550.0);
        Polygons(Fold).init(&mut f.ctx()).unwrap();
        f
    }

    #[test]
    fn test_roles_by_index() {
        let grid = (3, 3);
        assert_eq!(role(4, grid), Role::Row(1));
        assert_eq!(role(6, grid), Role::Left);
        assert_eq!(role(7, grid), Role::Middle);
        assert_eq!(role(8, grid), Role::Right);
    }

    #[test]
    fn test_rows_fold_before_the_last_row() {
        let f = folded(1);
        let set = f.state.data::<PolygonSet>().unwrap();
        // Three rows, two side steps and one more slot
        let fd = 1.0 / 6.0;
        let starts: Vec<f32> = set.polygons.iter().map(|p| p.move_start).collect();
        assert!((starts[0] - 0.0).abs() < 1e-6);
        assert!((starts[3] - fd).abs() < 1e-6);
        // Sides of the last row start together after the rows, then the middle
        assert!((starts[6] - 2.0 * fd).abs() < 1e-6);
        assert!((starts[8] - 2.0 * fd).abs() < 1e-6);
        assert!((starts[7] - 4.0 * fd).abs() < 1e-6);
        assert!(set.polygons.iter().all(|p| (p.move_duration - 2.0 * fd).abs() < 1e-6));
        // The last folding row stays visible until it lands
        assert_eq!(set.polygons[3].fade_start, set.polygons[3].move_start);
        assert_eq!(set.polygons[7].final_rot_angle, 90.0);
    }

    #[test]
    fn test_row_swings_up_around_its_bottom_edge() {
        let f = folded(1);
        let mut set = f.state.data::<PolygonSet>().unwrap().clone();
        let params = ParamView::new(&[], &f.configured, &f.specs);
        // Halfway through the first row's move: 90 degrees, upright
        let frame = StepFrame {
            progress: 1.0 / 6.0,
            event: WindowEvent::Minimize,
            screen: &f.screen,
            border: f.window.border_rect(),
            icon: wisp_core::Rect::ZERO,
            params: &params,
        };
        Fold.step_polygons(&frame, &mut set);
        let p = &set.polygons[0];
        assert!((p.rot_angle + 90.0).abs() < 1e-3);
        let cell_h = 100.0 / 3.0;
        assert!((p.center.y - (p.center_start.y + cell_h / 2.0)).abs() < 1e-3);
    }
}
