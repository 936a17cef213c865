//! Progress curves
//!
//! Every effect derives its animation fraction from the window's total and
//! remaining time. The raw fraction leaves out one time step so the final frame
//! lands exactly on 1.

use crate::event::{ProgressDirection, WindowEvent};
use crate::state::AnimationState;
use std::f32::consts::PI;

/// Duration scaling applied when an effect zooms to the icon
pub const ZOOM_PERCEIVED_T: f32 = 0.75;
/// Zoom/Sidekick appearing with springiness
pub const SPRINGY_ZOOM_PERCEIVED_T: f32 = 0.55;
/// Zoom/Sidekick open/close without springiness
pub const NONSPRINGY_ZOOM_PERCEIVED_T: f32 = 0.6;
pub const DREAM_PERCEIVED_T: f32 = 0.6;
pub const ROLLUP_PERCEIVED_T: f32 = 0.6;

/// Logistic curve with slope 5 centred on 0.5
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-5.0 * 2.0 * (x - 0.5)).exp())
}

/// Logistic curve with slope `s` centred on 0.5
pub fn sigmoid2(x: f32, s: f32) -> f32 {
    1.0 / (1.0 + (-s * 2.0 * (x - 0.5)).exp())
}

/// Deceleration through a window `[min_x, max_x]` of a steep sigmoid
pub fn decelerate_custom(progress: f32, min_x: f32, max_x: f32) -> f32 {
    let x = 1.0 - progress;
    let s = 8.0;
    1.0 - ((sigmoid2(min_x + x * (max_x - min_x), s) - sigmoid2(min_x, s))
        / (sigmoid2(max_x, s) - sigmoid2(min_x, s)))
}

pub fn decelerate(progress: f32) -> f32 {
    decelerate_custom(progress, 0.5, 0.75)
}

/// Linear fraction of the animation completed, in [0, 1]
pub fn raw_progress(state: &AnimationState) -> f32 {
    let span = state.total_time - state.time_step;
    if span <= 0.0 {
        return if state.remaining_time > 0.0 { 0.0 } else { 1.0 };
    }
    (1.0 - state.remaining_time / span).clamp(0.0, 1.0)
}

fn orient(event: WindowEvent, progress: f32) -> f32 {
    if event.runs_backwards() {
        1.0 - progress
    } else {
        progress
    }
}

/// Linear progress, running 1 → 0 for revealing events
pub fn default_progress(state: &AnimationState) -> f32 {
    orient(state.event, raw_progress(state))
}

/// Normalized sigmoid progress, running 1 → 0 for revealing events
pub fn sigmoid_progress(state: &AnimationState) -> f32 {
    let p = raw_progress(state);
    let p = (sigmoid(p) - sigmoid(0.0)) / (sigmoid(1.0) - sigmoid(0.0));
    orient(state.event, p)
}

/// Movement and scale fractions of a zoom toward the icon
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomProgress {
    /// 0 at the window's own position, 1 at the icon
    pub movement: f32,
    /// 0 at full size, 1 at icon size
    pub scale: f32,
}

/// Zoom progress with optional spring overshoot when appearing
///
/// `springiness` is the effect's effective springiness (already scaled).
pub fn zoom_progress(
    state: &AnimationState,
    springiness: f32,
    never_springy: bool,
) -> ZoomProgress {
    let event = state.event;
    let appearing = matches!(event, WindowEvent::Open | WindowEvent::Unminimize);
    let disappearing = matches!(event, WindowEvent::Close | WindowEvent::Minimize);

    let backwards = match ProgressDirection::resolve(event, state.playback) {
        ProgressDirection::Hide => appearing,
        ProgressDirection::Reveal => disappearing,
    };

    let mut x = raw_progress(state);
    if backwards {
        x = 1.0 - x;
    }

    let half_pow10 = 0.5f32.powi(10);
    let damp_base = ((1.0 - x.powf(1.2) * 0.5).powi(10) - half_pow10) / (1.0 - half_pow10);
    let non_springy = 1.0 - decelerate_custom(1.0 - x, 0.5, 0.8).powf(1.7);

    let damping = damp_base.sqrt();
    let damping2 =
        ((1.0 - x.powf(0.7) * 0.5).powi(10) - half_pow10) / (1.0 - half_pow10) * 0.7 + 0.3;

    let springiness = if appearing && !never_springy {
        springiness
    } else {
        0.0
    };

    let mut movement = if springiness > 1e-4 {
        let mut springy = (2.0 * PI * x * 1.25).cos() * damping * damping2;
        if x > 0.2 {
            springy *= springiness;
        } else {
            // Blend toward the scaled curve so the hand-over at 0.2 is smooth
            let upto = x / 0.2;
            springy = (1.0 - upto) * springy + upto * springy * springiness;
        }
        1.0 - springy
    } else {
        non_springy
    };
    if appearing {
        movement = 1.0 - movement;
    }
    if backwards {
        movement = 1.0 - movement;
    }

    let mut scale = non_springy;
    if appearing {
        scale = 1.0 - scale;
    }
    if backwards {
        scale = 1.0 - scale;
    }

    ZoomProgress {
        movement,
        scale: scale.max(0.0).powf(1.25),
    }
}
