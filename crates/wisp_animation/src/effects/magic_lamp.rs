//! Magic Lamp and Vacuum
//!
//! The window is sucked into the icon through a sigmoid-shaped funnel. The
//! animation runs in three phases: the bottom (or top) edge is shaped toward
//! the icon, the window stretches until its near edge reaches the icon, then
//! the whole window slides in. Magic Lamp adds sideways waves along the
//! funnel; Vacuum is the same motion without them.

use crate::effect::{default_init, default_step, model_bounding_box, AnimContext, Effect, ZoomStyle};
use crate::event::{EventKind, EventSet};
use crate::model::GridSize;
use crate::options::{ParamSpec, ParamView};
use crate::progress::{decelerate, sigmoid};
use smallvec::SmallVec;
use std::f32::consts::PI;
use wisp_core::{DamageBox, Rect, Result, ScreenProjection};

/// Part of the animation spent shaping the far edge
const PRE_SHAPE_PHASE_END: f32 = 0.22;
const MIN_WAVE_HALF_WIDTH: f32 = 0.22;
const MAX_WAVE_HALF_WIDTH: f32 = 0.38;

#[derive(Clone, Copy, Debug, PartialEq)]
struct WaveParam {
    amp: f32,
    pos: f32,
    half_width: f32,
}

struct LampData {
    minimize_to_top: bool,
    waves: SmallVec<[WaveParam; 4]>,
}

/// Tall two-column grid sized by the lamp resolution, shared by the warps
pub(crate) fn lamp_grid_size(params: &ParamView) -> GridSize {
    GridSize::new(2, params.int("magic_lamp_grid_res").max(2) as usize)
}

pub struct MagicLamp {
    vacuum: bool,
}

impl MagicLamp {
    pub fn lamp() -> Self {
        Self { vacuum: false }
    }

    pub fn vacuum() -> Self {
        Self { vacuum: true }
    }

    fn param(&self, name: &str) -> String {
        let prefix = if self.vacuum { "vacuum" } else { "magic_lamp" };
        format!("{prefix}_{name}")
    }
}

impl Effect for MagicLamp {
    fn name(&self) -> &'static str {
        if self.vacuum {
            "Vacuum"
        } else {
            "Magic Lamp"
        }
    }

    fn events(&self) -> EventSet {
        if self.vacuum {
            EventSet::EMPTY.with(EventKind::Open).with(EventKind::Close)
        } else {
            EventSet::OPEN_CLOSE_MINIMIZE
        }
    }

    fn params(&self) -> Vec<ParamSpec> {
        if self.vacuum {
            vec![
                ParamSpec::boolean("vacuum_moving_end", true),
                ParamSpec::int("vacuum_grid_res", 100, 4, 200),
                ParamSpec::int("vacuum_open_start_width", 30, 0, 500),
            ]
        } else {
            vec![
                ParamSpec::boolean("magic_lamp_moving_end", true),
                ParamSpec::int("magic_lamp_grid_res", 100, 4, 200),
                ParamSpec::int("magic_lamp_max_waves", 3, 0, 20),
                ParamSpec::float("magic_lamp_wave_amp_min", 200.0, 0.0, 1000.0),
                ParamSpec::float("magic_lamp_wave_amp_max", 300.0, 0.0, 1000.0),
                ParamSpec::int("magic_lamp_open_start_width", 30, 0, 500),
            ]
        }
    }

    fn uses_q_tex_coord(&self) -> bool {
        true
    }

    fn damages_window_on_cleanup(&self) -> bool {
        true
    }

    fn fake_icon_width(&self, params: &ParamView) -> Option<f32> {
        Some(params.int(&self.param("open_start_width")) as f32)
    }

    fn grid_size(&self, ctx: &AnimContext) -> GridSize {
        GridSize::new(2, ctx.params.int(&self.param("grid_res")).max(2) as usize)
    }

    fn init(&self, ctx: &mut AnimContext) -> Result<()> {
        let outer = ctx.outer();
        let icon = ctx.state.icon;
        let minimize_to_top = outer.center().y > icon.center().y;

        let (max_waves, amp_min, mut amp_max) = if self.vacuum {
            (0, 0.0, 0.0)
        } else {
            (
                ctx.params.int("magic_lamp_max_waves"),
                ctx.params.float("magic_lamp_wave_amp_min"),
                ctx.params.float("magic_lamp_wave_amp_max"),
            )
        };
        if amp_max < amp_min {
            amp_max = amp_min;
        }

        let mut waves = SmallVec::new();
        if max_waves > 0 {
            let distance = if minimize_to_top {
                outer.bottom() - icon.y()
            } else {
                icon.y() - outer.y()
            };
            let screen_h = ctx.screen.height.max(1) as f32;
            let count = (1.0 + max_waves as f32 * distance / screen_h).max(0.0) as usize;

            let mut direction = if ctx.rng.next_f32() < 0.5 { 1.0 } else { -1.0 };
            for i in 0..count {
                let amp =
                    direction * (amp_max - amp_min) * ctx.rng.next_f32() + direction * amp_min;
                let half_width = ctx.rng.range(MIN_WAVE_HALF_WIDTH, MAX_WAVE_HALF_WIDTH);

                // Keep waves off the very top and bottom
                let avail = 1.0 - 2.0 * half_width;
                let offset = if i > 0 {
                    (avail / count as f32) * ctx.rng.next_f32()
                } else {
                    0.0
                };
                waves.push(WaveParam {
                    amp,
                    half_width,
                    pos: offset + i as f32 * avail / count as f32 + half_width,
                });
                direction = -direction;
            }
        }

        ctx.state.set_data(LampData {
            minimize_to_top,
            waves,
        });
        default_init(ctx);
        Ok(())
    }

    fn step(&self, ctx: &mut AnimContext, _ms: f32) {
        default_step(false, ZoomStyle::Plain, ctx);

        if ctx.state.event.is_open_or_close() && ctx.params.boolean(&self.param("moving_end")) {
            if let Some(p) = ctx.pointer {
                let icon = ctx.state.icon;
                ctx.state.icon = Rect::new(p.x, p.y, icon.width(), icon.height());
            }
        }

        let forward = ctx.progress();
        let Some(data) = ctx.state.data::<LampData>() else {
            tracing::debug!(window = ?ctx.id, "magic lamp stepped without init");
            return;
        };
        let minimize_to_top = data.minimize_to_top;
        let waves = data.waves.clone();

        let window = ctx.window;
        let icon = ctx.state.icon;
        let outer = window.outer_rect();
        let (win_w, win_h) = (outer.width(), outer.height());
        let client_w = window.width.max(1) as f32;
        let shadow_left = (window.output.left - window.input.left) as f32 * icon.width() / client_w;
        let shadow_right =
            (window.output.right - window.input.right) as f32 * icon.width() / client_w;

        let (icon_far_end, icon_close_end, win_far_end, win_close_end) = if minimize_to_top {
            (
                icon.y(),
                icon.bottom(),
                outer.bottom(),
                outer.y().max(icon.bottom()),
            )
        } else {
            (
                icon.bottom(),
                icon.y(),
                outer.y(),
                outer.bottom().min(icon.y()),
            )
        };

        let span = (icon_close_end - win_far_end) + (icon_close_end - win_close_end);
        let mut stretch_end = if span != 0.0 {
            PRE_SHAPE_PHASE_END
                + (1.0 - PRE_SHAPE_PHASE_END) * (icon_close_end - win_close_end) / span
        } else {
            1.0
        };
        if stretch_end < PRE_SHAPE_PHASE_END + 0.1 {
            stretch_end = PRE_SHAPE_PHASE_END + 0.1;
        }

        let mut pre_shape = 0.0;
        let mut stretch = 0.0;
        let mut post_stretch = 0.0;
        if forward < PRE_SHAPE_PHASE_END {
            // Slow the shaping down toward its end
            pre_shape = 1.0 - decelerate(1.0 - forward / PRE_SHAPE_PHASE_END);
            stretch = forward / stretch_end;
        } else if forward < stretch_end {
            stretch = forward / stretch_end;
        } else {
            post_stretch = (forward - stretch_end) / (1.0 - stretch_end);
        }

        let s0 = sigmoid(0.0);
        let s1 = sigmoid(1.0);
        let funnel_len = icon_close_end - win_far_end;

        let Some(model) = ctx.state.model.as_mut() else {
            return;
        };
        let scale = model.scale;
        for p in &mut model.points {
            let g = p.grid_position;
            let orig_x = window.x as f32 + (win_w * g.x - window.output.left as f32) * scale.x;
            let orig_y = window.y as f32 + (win_h * g.y - window.output.top as f32) * scale.y;

            let icon_x = (icon.x() - shadow_left)
                + (icon.width() + shadow_left + shadow_right) * g.x;
            let icon_y = icon.y() + icon.height() * g.y;

            let stretched = if minimize_to_top {
                g.y * orig_y + (1.0 - g.y) * icon_y
            } else {
                (1.0 - g.y) * orig_y + g.y * icon_y
            };

            p.position.y = if forward < stretch_end {
                (1.0 - stretch) * orig_y + stretch * stretched
            } else {
                (1.0 - post_stretch) * stretched + post_stretch * (stretched + funnel_len)
            };

            // Funnel shape
            let fx = if funnel_len != 0.0 {
                (icon_close_end - p.position.y) / funnel_len
            } else {
                0.0
            };
            let fy = (sigmoid(fx) - s0) / (s1 - s0);
            let mut target_x = fy * (orig_x - icon_x) + icon_x;

            for wave in &waves {
                let cosfx = (fx - wave.pos) / wave.half_width;
                if (-1.0..=1.0).contains(&cosfx) {
                    target_x += wave.amp * scale.x * ((cosfx * PI).cos() + 1.0) / 2.0;
                }
            }

            p.position.x = if forward < PRE_SHAPE_PHASE_END {
                (1.0 - pre_shape) * orig_x + pre_shape * target_x
            } else {
                target_x
            };

            if minimize_to_top {
                p.position.y = p.position.y.max(icon_far_end);
            } else {
                p.position.y = p.position.y.min(icon_far_end);
            }
        }
    }

    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        model_bounding_box(false, false, ZoomStyle::Plain, ctx, projection, bb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::WindowEvent;
    use crate::model::Model;
    use crate::options::ParamValue;
    use crate::testing::Fixture;

    fn lamp_fixture(remaining: f32) -> Fixture {
        let mut f = Fixture::new();
        let lamp = MagicLamp::lamp();
        f.declare(lamp.params());
        f.configured
            .insert("magic_lamp_max_waves".into(), ParamValue::Int(0));
        f.start(WindowEvent::Minimize, 310.0);
        f.state.icon = Rect::new(480.0, 780.0, 40.0, 20.0);
        let grid = lamp.grid_size(&f.ctx());
        f.state.model = Some(Model::new(&f.window, WindowEvent::Minimize, grid).unwrap());
        lamp.init(&mut f.ctx()).unwrap();
        f.state.remaining_time = remaining;
        f
    }

    #[test]
    fn test_grid_follows_resolution() {
        let f = lamp_fixture(310.0);
        assert_eq!(f.state.model.as_ref().unwrap().grid, GridSize::new(2, 100));
    }

    #[test]
    fn test_first_frame_is_at_rest() {
        let mut f = lamp_fixture(310.0);
        MagicLamp::lamp().step(&mut f.ctx(), 10.0);
        let model = f.state.model.as_ref().unwrap();
        let tl = model.point(0, 0).position;
        let br = model.point(1, 99).position;
        assert!((tl.x - 100.0).abs() < 1e-3 && (tl.y - 100.0).abs() < 1e-3);
        assert!((br.x - 300.0).abs() < 1e-3 && (br.y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_last_frame_is_inside_icon() {
        let mut f = lamp_fixture(0.0);
        MagicLamp::lamp().step(&mut f.ctx(), 10.0);
        for p in &f.state.model.as_ref().unwrap().points {
            assert!(p.position.y >= 779.9 && p.position.y <= 800.0, "y = {}", p.position.y);
            assert!(p.position.x >= 478.0 && p.position.x <= 522.0, "x = {}", p.position.x);
        }
    }

    #[test]
    fn test_waves_are_created_for_far_icons() {
        let mut f = Fixture::new();
        let lamp = MagicLamp::lamp();
        f.declare(lamp.params());
        f.start(WindowEvent::Minimize, 300.0);
        f.state.icon = Rect::new(480.0, 780.0, 40.0, 20.0);
        lamp.init(&mut f.ctx()).unwrap();
        let data = f.state.data::<LampData>().unwrap();
        // 1 + 3 * 680 / 800
        assert_eq!(data.waves.len(), 3);
        assert!(!data.minimize_to_top);
        for w in &data.waves {
            assert!(w.amp.abs() >= 200.0 && w.amp.abs() <= 300.0);
            assert!(w.half_width >= MIN_WAVE_HALF_WIDTH && w.half_width <= MAX_WAVE_HALF_WIDTH);
        }
    }

    #[test]
    fn test_vacuum_has_no_waves() {
        let mut f = Fixture::new();
        let vacuum = MagicLamp::vacuum();
        f.declare(vacuum.params());
        f.start(WindowEvent::Close, 300.0);
        vacuum.init(&mut f.ctx()).unwrap();
        assert!(f.state.data::<LampData>().unwrap().waves.is_empty());
        assert_eq!(vacuum.fake_icon_width(&f.ctx().params), Some(30.0));
    }
}
