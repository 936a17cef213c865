//! Zoom and Sidekick
//!
//! The window scales between its own rectangle and the icon. Zoom scales
//! each axis separately and may overshoot like a spring when appearing;
//! Sidekick keeps the aspect ratio and spins. Warp effects that "zoom to
//! taskbar" reuse the same transform with [`ZoomStyle::Plain`].

use super::from_center_applies;
use crate::effect::{
    default_init, transformed_bounding_box, AnimContext, Effect, ZoomStyle,
};
use crate::event::{EventSet, WindowEvent};
use crate::options::{ParamSpec, ParamView};
use crate::paint::PaintAttributes;
use crate::progress::{
    zoom_progress, ZoomProgress, NONSPRINGY_ZOOM_PERCEIVED_T, SPRINGY_ZOOM_PERCEIVED_T,
    ZOOM_PERCEIVED_T,
};
use wisp_core::{DamageBox, Mat4, Point, Result, ScreenProjection, Vec3};

/// Sidekick's turn count for the running animation
struct Spin {
    rotations: f32,
}

/// Effective springiness of a zoom style
fn springiness(style: ZoomStyle, params: &ParamView) -> f32 {
    match style {
        ZoomStyle::Zoom => 2.0 * params.float("zoom_springiness"),
        ZoomStyle::Sidekick => 1.6 * params.float("sidekick_springiness"),
        ZoomStyle::Plain => 0.0,
    }
}

fn progress(style: ZoomStyle, ctx: &AnimContext) -> ZoomProgress {
    zoom_progress(
        ctx.state,
        springiness(style, &ctx.params),
        style == ZoomStyle::Plain,
    )
}

struct ZoomFrame {
    center: Point,
    scale: Point,
    win_center: Point,
    icon_center: Point,
    rotate_progress: f32,
}

fn frame(style: ZoomStyle, ctx: &AnimContext) -> ZoomFrame {
    let outer = ctx.outer();
    let icon = ctx.state.icon;
    let win_center = outer.center();
    let icon_center = icon.center();
    let win_w = if outer.width() == 0.0 { 1.0 } else { outer.width() };
    let win_h = if outer.height() == 0.0 { 1.0 } else { outer.height() };

    let p = progress(style, ctx);
    let rotate_progress = if style == ZoomStyle::Sidekick {
        p.movement
    } else {
        0.0
    };

    ZoomFrame {
        center: Point::lerp(win_center, icon_center, p.movement),
        scale: Point::new(
            ((1.0 - p.scale) * win_w + p.scale * icon.width()) / win_w,
            ((1.0 - p.scale) * win_h + p.scale * icon.height()) / win_h,
        ),
        win_center,
        icon_center,
        rotate_progress,
    }
}

/// Movement progress and current centre of a window zooming to its icon
pub fn zoom_progress_and_center(style: ZoomStyle, ctx: &AnimContext) -> (f32, Point) {
    let movement = zoom_progress(ctx.state, 0.0, true).movement;
    (movement, frame(style, ctx).center)
}

/// Transform moving and scaling the window toward its icon
pub fn zoom_transform(style: ZoomStyle, ctx: &AnimContext) -> Mat4 {
    let f = frame(style, ctx);
    let turns = ctx.state.data::<Spin>().map(|s| s.rotations).unwrap_or(0.0);
    let angle = f.rotate_progress * 360.0 * turns;

    let plain_open_close = springiness(style, &ctx.params) == 0.0
        && style != ZoomStyle::Plain
        && ctx.state.event.is_open_or_close();

    if plain_open_close {
        // Scale about the icon centre so the window grows out of it
        let mut t = Mat4::IDENTITY
            .translate(f.icon_center.x, f.icon_center.y, 0.0)
            .scale_by(f.scale.x, f.scale.y, f.scale.y)
            .translate(-f.icon_center.x, -f.icon_center.y, 0.0);
        if style == ZoomStyle::Sidekick {
            t = t
                .translate(f.win_center.x, f.win_center.y, 0.0)
                .rotate(angle, Vec3::Z)
                .translate(-f.win_center.x, -f.win_center.y, 0.0);
        }
        return t;
    }

    let mut t = Mat4::IDENTITY.translate(f.win_center.x, f.win_center.y, 0.0);
    let (tx, ty) = if style == ZoomStyle::Zoom {
        t = t.scale_by(f.scale.x, f.scale.y, f.scale.y);
        (
            (f.center.x - f.win_center.x) / f.scale.x,
            (f.center.y - f.win_center.y) / f.scale.y,
        )
    } else {
        // Uniform scale avoids a parallelogram look
        let s = f.scale.x.max(f.scale.y);
        t = t.scale_by(s, s, s);
        ((f.center.x - f.win_center.x) / s, (f.center.y - f.win_center.y) / s)
    };
    t = t.translate(tx, ty, 0.0);
    if style == ZoomStyle::Sidekick {
        t = t.rotate(angle, Vec3::Z);
    }
    t.translate(-f.win_center.x, -f.win_center.y, 0.0)
}

/// Init shared by Zoom and Sidekick
fn zoom_init(style: ZoomStyle, ctx: &mut AnimContext) {
    let mode = match style {
        ZoomStyle::Sidekick => ctx.params.int("sidekick_zoom_from_center"),
        _ => ctx.params.int("zoom_from_center"),
    };
    if from_center_applies(mode, ctx.state.event) {
        let outer = ctx.outer();
        let icon = ctx.state.icon;
        ctx.state.icon = wisp_core::Rect::new(
            (outer.x() + outer.width() / 2.0 - icon.width() / 2.0).floor(),
            (outer.y() + outer.height() / 2.0 - icon.height() / 2.0).floor(),
            icon.width(),
            icon.height(),
        );
    }

    let appearing = matches!(ctx.state.event, WindowEvent::Open | WindowEvent::Unminimize);
    let perceived = if appearing && springiness(style, &ctx.params) > 1e-4 {
        SPRINGY_ZOOM_PERCEIVED_T
    } else if ctx.state.event.is_open_or_close() {
        NONSPRINGY_ZOOM_PERCEIVED_T
    } else {
        ZOOM_PERCEIVED_T
    };
    ctx.stretch_duration(perceived);
    ctx.state.using_transform = true;
    default_init(ctx);
}

pub(crate) fn fade_with_scale(style: ZoomStyle, ctx: &AnimContext, attrs: &mut PaintAttributes) {
    let p = progress(style, ctx);
    attrs.opacity = ctx.state.stored_opacity * (1.0 - p.scale);
}

pub struct Zoom;

impl Effect for Zoom {
    fn name(&self) -> &'static str {
        "Zoom"
    }

    fn events(&self) -> EventSet {
        EventSet::OPEN_CLOSE_MINIMIZE
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::int("zoom_from_center", 0, 0, 3),
            ParamSpec::float("zoom_springiness", 0.1, 0.0, 1.0),
        ]
    }

    fn host_draws_geometry(&self) -> bool {
        true
    }

    fn zoom_style(&self) -> ZoomStyle {
        ZoomStyle::Zoom
    }

    fn zooms_to_icon(&self, _ctx: &AnimContext) -> bool {
        true
    }

    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        zoom_init(ZoomStyle::Zoom, ctx);
        Ok(())
    }

    fn update_attributes(&self, ctx: &AnimContext, attrs: &mut PaintAttributes) {
        fade_with_scale(ZoomStyle::Zoom, ctx, attrs);
    }

    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        transformed_bounding_box(ctx, projection, bb);
    }
}

pub struct Sidekick;

impl Effect for Sidekick {
    fn name(&self) -> &'static str {
        "Sidekick"
    }

    fn events(&self) -> EventSet {
        EventSet::OPEN_CLOSE_MINIMIZE
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::float("sidekick_num_rotations", 0.5, 0.0, 5.0),
            ParamSpec::float("sidekick_springiness", 0.0, 0.0, 1.0),
            ParamSpec::int("sidekick_zoom_from_center", 0, 0, 3),
        ]
    }

    fn host_draws_geometry(&self) -> bool {
        true
    }

    fn zoom_style(&self) -> ZoomStyle {
        ZoomStyle::Sidekick
    }

    fn zooms_to_icon(&self, _ctx: &AnimContext) -> bool {
        true
    }

    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        // Between 0.9 and 1.1 times the configured turns
        let jitter = 1.0 + 0.2 * ctx.rng.next_f32() - 0.1;
        let mut rotations = ctx.params.float("sidekick_num_rotations") * jitter;

        // Turn clockwise when the window is right of its icon
        if ctx.outer().center().x > ctx.state.icon.center().x {
            rotations = -rotations;
        }
        ctx.state.set_data(Spin { rotations });
        zoom_init(ZoomStyle::Sidekick, ctx);
        Ok(())
    }

    fn update_attributes(&self, ctx: &AnimContext, attrs: &mut PaintAttributes) {
        fade_with_scale(ZoomStyle::Sidekick, ctx, attrs);
    }

    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        transformed_bounding_box(ctx, projection, bb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use wisp_core::Rect;

    fn minimizing() -> Fixture {
        let mut f = Fixture::new();
        f.declare(Zoom.params());
        f.start(WindowEvent::Minimize, 300.0);
        f.state.icon = Rect::new(480.0, 780.0, 40.0, 20.0);
        f
    }

    #[test]
    fn test_minimize_init_scales_duration() {
        let mut f = minimizing();
        Zoom.init(&mut f.ctx()).unwrap();
        assert!((f.state.total_time - 400.0).abs() < 1e-3);
        assert!(f.state.using_transform);
    }

    #[test]
    fn test_transform_is_identity_at_start() {
        let mut f = minimizing();
        f.state.remaining_time = f.state.total_time;
        let ctx = f.ctx();
        let t = zoom_transform(ZoomStyle::Zoom, &ctx);
        let p = t.transform_point(Vec3::new(100.0, 100.0, 0.0));
        assert!((p.x - 100.0).abs() < 1e-2 && (p.y - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_midway_scale_is_between_window_and_icon() {
        let mut f = minimizing();
        f.state.remaining_time = 150.0;
        let ctx = f.ctx();
        let t = zoom_transform(ZoomStyle::Zoom, &ctx);
        let a = t.transform_point(Vec3::new(100.0, 100.0, 0.0));
        let b = t.transform_point(Vec3::new(300.0, 200.0, 0.0));
        let width = b.x - a.x;
        assert!(width < 200.0 && width > 40.0);
    }

    #[test]
    fn test_ends_on_icon() {
        let mut f = minimizing();
        f.state.remaining_time = 0.0;
        let ctx = f.ctx();
        let t = zoom_transform(ZoomStyle::Zoom, &ctx);
        let c = t.transform_point(Vec3::new(200.0, 150.0, 0.0));
        assert!((c.x - 500.0).abs() < 0.5);
        assert!((c.y - 790.0).abs() < 0.5);
    }

    #[test]
    fn test_zoom_from_center_moves_icon() {
        let mut f = minimizing();
        f.configured
            .insert("zoom_from_center".into(), crate::options::ParamValue::Int(3));
        Zoom.init(&mut f.ctx()).unwrap();
        assert_eq!(f.state.icon.center(), Point::new(200.0, 150.0));
    }

    #[test]
    fn test_sidekick_turns_clockwise_right_of_icon() {
        let mut f = minimizing();
        f.declare(Sidekick.params());
        f.state.icon = Rect::new(0.0, 780.0, 40.0, 20.0);
        Sidekick.init(&mut f.ctx()).unwrap();
        let spin = f.state.data::<Spin>().unwrap();
        assert!(spin.rotations < -0.44 && spin.rotations > -0.56);
    }
}
