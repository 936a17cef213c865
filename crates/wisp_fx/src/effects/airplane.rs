//! Airplane
//!
//! The window folds itself into a paper airplane in three creases, then
//! banks and flies off along a curve, to the taskbar icon when there is one.
//!
//! The window is cut into eight pieces sharing a centre on the left edge,
//! half the window height in:
//!
//! ```text
//!  +----+--------+------------------+
//!  |    |       /                   |
//!  |    | 6   /                     |
//!  | 7  |   /              5        |
//!  |    | +                         |
//!  |    +--------+------------------+
//!  |  /                 4           |
//!  |/___________.___________________|
//!  |\        centre                 |
//!  |  \                 3           |
//!  |    +--------+------------------+
//!  |    | +                         |
//!  | 0  |   \                       |
//!  |    |  1  \            2        |
//!  +----+--------+------------------+
//! ```

use crate::polygon::{Perspective, PolygonEffect, PolygonObject, PolygonSet, StepFrame};
use smallvec::SmallVec;
use std::f32::consts::FRAC_PI_2;
use wisp_animation::{AnimContext, ParamSpec, WindowEvent};
use wisp_core::{Mat4, Point, Rect, Result, Vec3};

/// Crease timings as (start, duration) fractions
const FOLD_CENTER: (f32, f32) = (0.0, 0.19);
const FOLD_A: (f32, f32) = (0.19, 0.19);
const FOLD_B: (f32, f32) = (0.38, 0.19);
const BANK: (f32, f32) = (0.58, 0.09);
const FLY: (f32, f32) = (0.59, 0.41);

const FLY_FINAL_ROTATION: (f32, f32) = (90.0, 10.0);

/// A rotation about an axis through `offset`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Hinge {
    offset: Vec3,
    axis: Vec3,
    angle: f32,
}

impl Hinge {
    fn new(offset_y: f32, axis: Vec3, angle: f32) -> Self {
        Self {
            offset: Vec3::new(0.0, offset_y, 0.0),
            axis,
            angle,
        }
    }
}

/// The three creases one piece takes part in
#[derive(Clone, Copy, Debug, PartialEq)]
struct Wing {
    /// Centre crease, carried by the piece itself
    center: Hinge,
    center_duration: f32,
    a: Hinge,
    b: Hinge,
}

/// Creases of piece `index` for a window `h` px high
fn wing(index: usize, h: f32) -> Wing {
    let (h4, h6) = (h / 4.0, h / 6.0);
    let upper = Hinge {
        offset: Vec3::new(-h4, h4, 0.0),
        axis: Vec3::new(1.0, 1.0, 0.0),
        angle: 179.5,
    };
    let lower = Hinge {
        offset: Vec3::new(-h4, -h4, 0.0),
        axis: Vec3::new(1.0, -1.0, 0.0),
        angle: -179.5,
    };
    let none = Hinge::default();
    let (center, a, b) = match index {
        0 => (upper, 84.0, none),
        1 => (upper, 84.0, Hinge::new(h6, Vec3::X, -84.0)),
        2 => (none, 84.0, Hinge::new(h6, Vec3::X, -84.0)),
        3 => (none, 84.0, none),
        4 => (none, -84.0, none),
        5 => (none, -84.0, Hinge::new(-h6, Vec3::X, 84.0)),
        6 => (lower, -84.0, Hinge::new(-h6, Vec3::X, 84.0)),
        _ => (lower, -84.0, none),
    };
    Wing {
        center,
        center_duration: if center.angle == 0.0 { 0.0 } else { FOLD_CENTER.1 },
        a: Hinge::new(0.0, Vec3::X, a),
        b,
    }
}

fn outlines(w: f32, h: f32) -> [SmallVec<[Point; 6]>; 8] {
    let (h2, h3, h6) = (h / 2.0, h / 3.0, h / 6.0);
    let quad = |pts: [(f32, f32); 4]| pts.iter().map(|&(x, y)| Point::new(x, y)).collect();
    [
        quad([(-h2, 0.0), (-h2, h2), (-h3, h2), (-h3, h6)]),
        quad([(-h3, h6), (-h3, h2), (0.0, h2), (0.0, h2)]),
        quad([(-h3, h6), (0.0, h2), (w - h2, h2), (w - h2, h6)]),
        quad([(-h2, 0.0), (-h3, h6), (w - h2, h6), (w - h2, 0.0)]),
        quad([(-h3, -h6), (-h2, 0.0), (w - h2, 0.0), (w - h2, -h6)]),
        quad([(0.0, -h2), (-h3, -h6), (w - h2, -h6), (w - h2, -h2)]),
        quad([(-h3, -h2), (-h3, -h6), (-h3, -h6), (0.0, -h2)]),
        quad([(-h2, -h2), (-h2, 0.0), (-h3, -h6), (-h3, -h2)]),
    ]
}

fn phase(progress: f32, (start, duration): (f32, f32)) -> f32 {
    if duration <= 0.0 {
        return 0.0;
    }
    ((progress - start) / duration).clamp(0.0, 1.0)
}

/// Bank, scale and the two wing creases applied on top of the centre crease
fn wing_transform(fly_rotation: Vec3, fly_scale: f32, a: Hinge, b: Hinge) -> Mat4 {
    let s = 1.0 / (1.0 + fly_scale);
    Mat4::rotation(fly_rotation.x, Vec3::X)
        .rotate(-fly_rotation.y, Vec3::Y)
        .rotate(fly_rotation.z, Vec3::Z)
        .scale_by(s, s, s)
        .translate(a.offset.x, a.offset.y, a.offset.z)
        .rotate(a.angle, a.axis)
        .translate(-a.offset.x, -a.offset.y, -a.offset.z)
        .translate(b.offset.x, b.offset.y, b.offset.z)
        .rotate(b.angle, b.axis)
        .translate(-b.offset.x, -b.offset.y, -b.offset.z)
}

pub struct Airplane;

impl Airplane {
    fn fold(p: &mut PolygonObject, wing: &Wing, progress: f32) {
        let a = phase(progress, FOLD_A);
        let b = phase(progress, FOLD_B);
        p.center = p.center_start;
        p.rot_angle = phase(progress, (FOLD_CENTER.0, wing.center_duration)) * wing.center.angle;
        p.extra_transform = Some(wing_transform(
            Vec3::ZERO,
            0.0,
            Hinge {
                angle: a * wing.a.angle,
                ..wing.a
            },
            Hinge {
                angle: b * wing.b.angle,
                ..wing.b
            },
        ));
    }

    fn fly(p: &mut PolygonObject, wing: &Wing, frame: &StepFrame) {
        let path = frame.params.float("airplane_path_length");
        let to_icon = frame.params.boolean("airplane_fly_to_taskbar");
        let (sw, sh) = (frame.screen_width(), frame.screen.height as f32);
        let bank = phase(frame.progress, BANK);
        let fly = phase(frame.progress, FLY);
        let start = p.center_start;

        let theta = fly * -FRAC_PI_2 * path;
        let mut fly_x = sw * 0.4 * (2.0 * theta).sin();
        let mut icon_dx = 0.0;
        let fly_y;
        let event = frame.event;
        let targets_icon = match event {
            WindowEvent::Minimize | WindowEvent::Unminimize => to_icon,
            WindowEvent::Open | WindowEvent::Close => true,
            _ => false,
        };
        if targets_icon {
            let sign = if matches!(event, WindowEvent::Unminimize | WindowEvent::Open) {
                -1.0
            } else {
                1.0
            };
            let icon = frame.icon;
            let lands_at = start.x + sign * sw * 0.4 * (2.0 * -FRAC_PI_2 * path).sin();
            icon_dx = (icon.x() + icon.width() / 2.0 - lands_at) * fly;
            fly_y = (icon.y() + icon.height() / 2.0 - start.y) * -(theta / path).sin();
        } else {
            let edge = start.y < sh * 0.33 || start.y > sh * 0.66;
            let reach = if edge { 0.6 } else { 0.4 };
            let y = sh * reach * (theta / 3.4).sin();
            fly_y = if start.y < sh * 0.33 { -y } else { y };
        }

        let mut roll = ((2.0f32.atan() + FRAC_PI_2) * theta.sin() - FRAC_PI_2).to_degrees() + 90.0;
        match event {
            WindowEvent::Minimize | WindowEvent::Close => roll = -roll,
            WindowEvent::Unminimize | WindowEvent::Open => fly_x = -fly_x,
            _ => {}
        }

        let final_scale = 6.0 * (frame.border.width() / (sw / 2.0));
        p.center = Vec3::new(start.x + fly_x + icon_dx, start.y + fly_y, start.z);
        p.rot_angle = wing.center.angle;
        p.extra_transform = Some(wing_transform(
            Vec3::new(bank * FLY_FINAL_ROTATION.0, bank * FLY_FINAL_ROTATION.1, roll),
            fly * final_scale,
            wing.a,
            wing.b,
        ));
    }
}

impl PolygonEffect for Airplane {
    fn name(&self) -> &'static str {
        "Airplane"
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::float("airplane_path_length", 1.0, 0.2, 3.0),
            ParamSpec::boolean("airplane_fly_to_taskbar", true),
        ]
    }

    fn build(&self, ctx: &mut AnimContext) -> Result<PolygonSet> {
        let border = ctx.window.border_rect();
        let (w, h) = (border.width(), border.height());
        let mut set = PolygonSet::new(false);
        set.tessellate_outlines(
            ctx.window,
            ctx.screen.width as f32,
            Point::new(h / 2.0, h / 2.0),
            outlines(w, h),
            0.0,
        )?;

        for (i, p) in set.polygons.iter_mut().enumerate() {
            let wing = wing(i, h);
            p.rot_axis_offset = wing.center.offset;
            p.rot_axis = wing.center.axis;
            p.final_rot_angle = wing.center.angle;
            p.move_start = FOLD_CENTER.0;
            p.move_duration = wing.center_duration;
        }

        let path = ctx.params.float("airplane_path_length");
        set.all_fade_duration = Some(if path >= 1.0 { 0.3 / path } else { 0.3 });
        set.depth_test = true;
        set.lighting = true;
        set.perspective = Perspective::Polygon;

        // Longer flights take longer
        ctx.state.total_time *= 2.0 + path;
        ctx.state.remaining_time = ctx.state.total_time;
        Ok(set)
    }

    fn step_polygons(&self, frame: &StepFrame, set: &mut PolygonSet) {
        let h = frame.border.height();
        for (i, p) in set.polygons.iter_mut().enumerate() {
            let wing = wing(i, h);
            if frame.progress >= BANK.0 {
                Self::fly(p, &wing, frame);
            } else if frame.progress > FOLD_CENTER.0 {
                Self::fold(p, &wing, frame.progress);
            }
        }
    }

    fn after_step(&self, ctx: &mut AnimContext) {
        // A closing window flies at the pointer
        if ctx.state.event == WindowEvent::Close {
            if let Some(pointer) = ctx.pointer {
                let icon = ctx.state.icon;
                ctx.state.icon = Rect::new(pointer.x, pointer.y, icon.width(), icon.height());
            }
        }
    }

    fn damages_whole_screen(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Polygons;
    use crate::testing::Fixture;
    use wisp_animation::{Effect, ParamView};

    fn airplane(event: WindowEvent) -> Fixture {
        let mut f = Fixture::new();
        f.start(event, 1000.0);
        f.state.icon = Rect::new(500.0, 760.0, 40.0, 40.0);
        Polygons(Airplane).init(&mut f.ctx()).unwrap();
        f
    }

    fn step(f: &Fixture, event: WindowEvent, progress: f32) -> PolygonSet {
        let mut set = f.state.data::<PolygonSet>().unwrap().clone();
        let params = ParamView::new(&[], &f.configured, &f.specs);
        let frame = StepFrame {
            progress,
            event,
            screen: &f.screen,
            border: f.window.border_rect(),
            icon: f.state.icon,
            params: &params,
        };
        Airplane.step_polygons(&frame, &mut set);
        set
    }

    #[test]
    fn test_eight_pieces_around_the_nose() {
        let f = airplane(WindowEvent::Minimize);
        let set = f.state.data::<PolygonSet>().unwrap();
        assert_eq!(set.len(), 8);
        // 200x100 window at (100, 100): centre 50 px in from the left edge
        assert!(set
            .polygons
            .iter()
            .all(|p| (p.center_start.x, p.center_start.y) == (150.0, 150.0)));
        assert_eq!(f.state.total_time, 3000.0);
        assert_eq!(set.all_fade_duration, Some(0.3));
        assert_eq!(set.polygons[2].move_duration, 0.0);
    }

    #[test]
    fn test_creases_fold_in_order() {
        let f = airplane(WindowEvent::Minimize);
        let set = step(&f, WindowEvent::Minimize, 0.1);
        assert!(set.polygons[0].rot_angle > 0.0 && set.polygons[0].rot_angle < 179.5);
        assert_eq!(set.polygons[2].rot_angle, 0.0);

        let set = step(&f, WindowEvent::Minimize, 0.5);
        assert_eq!(set.polygons[0].rot_angle, 179.5);
        assert_eq!(set.polygons[6].rot_angle, -179.5);
        assert!(set.polygons.iter().all(|p| p.center == p.center_start));
    }

    #[test]
    fn test_minimize_lands_on_the_icon() {
        let f = airplane(WindowEvent::Minimize);
        let set = step(&f, WindowEvent::Minimize, 1.0);
        for p in &set.polygons {
            assert!((p.center.x - 520.0).abs() < 0.1);
            assert!((p.center.y - 780.0).abs() < 0.1);
        }
    }

    #[test]
    fn test_close_follows_the_pointer() {
        let mut f = airplane(WindowEvent::Close);
        f.pointer = Some(Point::new(30.0, 40.0));
        Airplane.after_step(&mut f.ctx());
        assert_eq!(f.state.icon, Rect::new(30.0, 40.0, 40.0, 40.0));
    }
}
