//! Domino and Razr
//!
//! The window is cut into tiles that fall over one row after another, like
//! dominoes. Razr tiles flip on a hinge along one edge instead, so the
//! window folds up like a phone keypad.

use super::DOMINO_PERCEIVED_T;
use crate::polygon::{Perspective, PolygonEffect, PolygonSet};
use wisp_animation::{AnimContext, AnimDirection, ParamSpec};
use wisp_core::{Result, Vec3};

const DEFAULT_GRID: usize = 20;
const MIN_CELL: f32 = 30.0;
const RISE_RANDOM_MAX: f32 = 0.2;

pub struct Domino {
    razr: bool,
}

impl Domino {
    pub fn domino() -> Self {
        Self { razr: false }
    }

    pub fn razr() -> Self {
        Self { razr: true }
    }

    fn direction_param(&self) -> &'static str {
        if self.razr {
            "razr_direction"
        } else {
            "domino_direction"
        }
    }
}

/// Tile grid for a window falling in `direction`
#[derive(Clone, Copy, Debug, PartialEq)]
struct Tiles {
    columns: usize,
    rows: usize,
    cell_w: f32,
    cell_h: f32,
    /// Tiles along the fall direction
    along: usize,
}

impl Tiles {
    fn fit(width: f32, height: f32, vertical: bool, aspect: f32) -> Self {
        // Lay the grid out along one axis and derive the other from the aspect
        let layout = |across: f32, down: f32| {
            let min_cell = MIN_CELL.min(across);
            let n = if across / (DEFAULT_GRID as f32) < min_cell {
                ((across / min_cell) as usize).max(1)
            } else {
                DEFAULT_GRID
            };
            let cell = across / n as f32;
            let m = ((down / (cell * aspect)) as usize).max(1);
            (n, cell, m, down / m as f32)
        };

        if vertical {
            let (columns, cell_w, rows, cell_h) = layout(width, height);
            Self {
                columns,
                rows,
                cell_w,
                cell_h,
                along: rows,
            }
        } else {
            let (rows, cell_h, columns, cell_w) = layout(height, width);
            Self {
                columns,
                rows,
                cell_w,
                cell_h,
                along: columns,
            }
        }
    }
}

impl PolygonEffect for Domino {
    fn name(&self) -> &'static str {
        if self.razr {
            "Razr"
        } else {
            "Domino"
        }
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::int(self.direction_param(), 5, 0, 5)]
    }

    fn build(&self, ctx: &mut AnimContext) -> Result<PolygonSet> {
        let direction =
            AnimDirection::from_index(ctx.params.int(self.direction_param())).resolve(ctx, true);
        let border = ctx.window.border_rect();
        let vertical = matches!(direction, AnimDirection::Up | AnimDirection::Down);
        let aspect = if self.razr { 1.0 } else { 1.25 };
        let tiles = Tiles::fit(border.width(), border.height(), vertical, aspect);

        let thickness = tiles.cell_w.min(tiles.cell_h) / 3.5;
        let mut set = PolygonSet::new(false);
        set.tessellate_rectangles(
            ctx.window,
            ctx.screen.width as f32,
            tiles.columns,
            tiles.rows,
            thickness,
        )?;

        let (half_w, half_h) = (tiles.cell_w / 2.0, tiles.cell_h / 2.0);
        let mut axis = Vec3::ZERO;
        let mut hinge = Vec3::new(0.0, 0.0, thickness / 2.0);
        let mut standing = Vec3::ZERO;
        let mut lanes = tiles.columns;
        match direction {
            AnimDirection::Down => {
                axis.x = -1.0;
                hinge.y = -half_h;
                standing = Vec3::new(0.0, -(half_h + thickness), half_h - thickness / 2.0);
            }
            AnimDirection::Left => {
                axis.y = -1.0;
                hinge.x = half_w;
                standing = Vec3::new(half_w + thickness, 0.0, half_w - thickness / 2.0);
                lanes = tiles.rows;
            }
            AnimDirection::Up => {
                axis.x = 1.0;
                hinge.y = half_h;
                standing = Vec3::new(0.0, half_h + thickness, half_h - thickness / 2.0);
            }
            AnimDirection::Right => {
                axis.y = 1.0;
                hinge.x = -half_w;
                standing = Vec3::new(-(half_w + thickness), 0.0, half_w - thickness / 2.0);
                lanes = tiles.rows;
            }
            _ => {}
        }

        let (rise, fade) = if self.razr {
            let rise = (1.0 - RISE_RANDOM_MAX) / tiles.along as f32;
            (rise, rise / 2.0)
        } else {
            (0.2, 0.18)
        };
        // One random delay per lane so a lane falls as a chain
        let seeds: Vec<f32> = (0..lanes).map(|_| ctx.rng.next_f32()).collect();
        let min_dist = 1.0 / tiles.along as f32 / 2.0;

        for p in &mut set.polygons {
            p.rot_axis = axis;
            if !self.razr {
                p.final_rel_pos = standing;
            }

            let (from_start, across) = match direction {
                AnimDirection::Up => (p.rel_pos.y, p.rel_pos.x),
                AnimDirection::Right => (1.0 - p.rel_pos.x, p.rel_pos.y),
                AnimDirection::Down => (1.0 - p.rel_pos.y, p.rel_pos.x),
                _ => (p.rel_pos.x, p.rel_pos.y),
            };
            let lane = ((across * lanes as f32) as usize).min(lanes.saturating_sub(1));
            let delay = seeds.get(lane).copied().unwrap_or(0.0) * RISE_RANDOM_MAX;

            let mult = if tiles.along > 1 {
                (from_start - min_dist) / (1.0 - 2.0 * min_dist)
            } else {
                1.0
            };
            p.move_start = mult * (1.0 - rise - RISE_RANDOM_MAX) + delay;
            p.move_duration = rise;
            if self.razr {
                p.fade_start = p.move_start + rise / 2.0;
                p.final_rot_angle = -180.0;
                p.rot_axis_offset = hinge;
            } else {
                p.fade_start = p.move_start + rise - delay + 0.03;
                p.final_rot_angle = -90.0;
            }
            p.fade_start = p.fade_start.min(1.0 - fade);
            p.fade_duration = fade;
        }
        set.depth_test = true;
        set.lighting = true;
        set.perspective = Perspective::Polygon;

        ctx.stretch_duration(DOMINO_PERCEIVED_T);
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
    fn test_vertical_fall_grid() {
        // 600 px wide: 20 columns of 30 px, rows of 37.5 px
        let tiles = Tiles::fit(600.0, 300.0, true, 1.25);
        assert_eq!((tiles.columns, tiles.rows), (20, 8));
        assert_eq!(tiles.along, 8);

        // Narrow windows get fewer, wider tiles
        let tiles = Tiles::fit(300.0, 300.0, true, 1.25);
        assert_eq!(tiles.columns, 10);
        assert_eq!(tiles.cell_w, 30.0);
    }

    #[test]
    fn test_horizontal_fall_grid() {
        let tiles = Tiles::fit(300.0, 600.0, false, 1.0);
        assert_eq!((tiles.columns, tiles.rows), (10, 20));
        assert_eq!(tiles.along, 10);
    }

    fn dominoes(effect: Domino, direction: i64) -> PolygonSet {
        let mut f = Fixture::with_window(WindowInfo::new(WindowId(5), 0, 0, 600, 300));
        f.set(effect.direction_param(), ParamValue::Int(direction));
        f.start(WindowEvent::Close, 800.0);
        Polygons(effect).init(&mut f.ctx()).unwrap();
        f.state.data::<PolygonSet>().unwrap().clone()
    }

    #[test]
    fn test_dominoes_fall_from_the_start_edge() {
        // Down: the bottom row falls first
        let set = dominoes(Domino::domino(), 1);
        let top = &set.polygons[0];
        let bottom = &set.polygons[set.len() - 1];
        assert!(bottom.move_start < top.move_start);
        assert_eq!(top.final_rot_angle, -90.0);
        assert_eq!(top.rot_axis, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(top.rot_axis_offset, Vec3::ZERO);
        assert!(set.polygons.iter().all(|p| p.fade_start <= 1.0 - 0.18));
    }

    #[test]
    fn test_razr_tiles_flip_on_hinges() {
        // Up
        let set = dominoes(Domino::razr(), 0);
        let p = &set.polygons[0];
        assert_eq!(p.final_rot_angle, -180.0);
        assert_eq!(p.final_rel_pos, Vec3::ZERO);
        assert!(p.rot_axis_offset.y > 0.0);
        assert!(set.polygons.iter().all(|p| p.move_duration < 0.2));
    }
}
