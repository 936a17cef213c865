//! Per-window animation state

use crate::event::{EventKind, Playback, WindowEvent};
use crate::model::Model;
use crate::registry::EffectId;
use std::any::Any;
use wisp_core::{BoundingBoxAccumulator, Mat4, Rect};

/// Mutable animation record of one window
///
/// Reset to idle when the window is created and when its animation completes.
/// Only the engine and the running effect's hooks mutate it.
pub struct AnimationState {
    pub event: WindowEvent,
    pub effect: Option<EffectId>,
    /// Total duration in ms (after perceived-time scaling)
    pub total_time: f32,
    /// Remaining duration in ms
    pub remaining_time: f32,
    /// Simulation step in ms
    pub time_step: f32,
    /// Fractional steps carried to the next frame
    pub remainder_steps: f32,
    pub playback: Playback,

    /// Rule row that selected the effect; its option overrides apply
    pub selection_row: Option<(EventKind, usize)>,

    pub using_transform: bool,
    /// Effect transform, assigned once per step
    pub transform: Mat4,
    /// Fraction of the animation after which the transform starts (dodge)
    pub transform_start_progress: f32,
    pub transform_progress: f32,

    /// Window opacity when the animation started
    pub stored_opacity: f32,
    /// Icon (or fake icon) the animation moves toward
    pub icon: Rect,
    pub model: Option<Model>,
    /// `init` has run for the current effect
    pub initialized: bool,
    pub bb: BoundingBoxAccumulator,
    /// Optional clip applied to the drawn geometry
    pub draw_region: Option<Rect>,

    effect_data: Option<Box<dyn Any>>,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            event: WindowEvent::None,
            effect: None,
            total_time: 0.0,
            remaining_time: 0.0,
            time_step: 10.0,
            remainder_steps: 0.0,
            playback: Playback::Forward,
            selection_row: None,
            using_transform: false,
            transform: Mat4::IDENTITY,
            transform_start_progress: 0.0,
            transform_progress: 0.0,
            stored_opacity: 1.0,
            icon: Rect::ZERO,
            model: None,
            initialized: false,
            bb: BoundingBoxAccumulator::new(),
            draw_region: None,
            effect_data: None,
        }
    }
}

impl std::fmt::Debug for AnimationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationState")
            .field("event", &self.event)
            .field("effect", &self.effect)
            .field("total_time", &self.total_time)
            .field("remaining_time", &self.remaining_time)
            .field("playback", &self.playback)
            .field("selection_row", &self.selection_row)
            .field("using_transform", &self.using_transform)
            .field("has_model", &self.model.is_some())
            .field("has_effect_data", &self.effect_data.is_some())
            .finish()
    }
}

impl AnimationState {
    pub fn is_animating(&self) -> bool {
        self.remaining_time > 0.0
    }

    /// Advance the simulation clock by a frame of `ms` milliseconds
    ///
    /// Always consumes at least one time step. Returns the number of steps taken.
    pub fn advance_clock(&mut self, ms: f32) -> u32 {
        if self.time_step <= 0.0 {
            self.remaining_time = 0.0;
            return 1;
        }
        self.remainder_steps += ms.max(0.0) / self.time_step;
        let steps = self.remainder_steps.floor();
        self.remainder_steps -= steps;
        let steps = steps.max(1.0);

        self.remaining_time = (self.remaining_time - self.time_step * steps).max(0.0);
        steps as u32
    }

    /// Play the running animation backwards as `event`
    ///
    /// Keeps the visual state continuous by swapping the elapsed and remaining
    /// time. The result stays within `[1, total_time]`.
    pub fn reverse(&mut self, event: WindowEvent) {
        let remaining = self.total_time - self.remaining_time;
        self.remaining_time = if remaining <= 0.0 {
            1.0
        } else {
            remaining.min(self.total_time.max(1.0))
        };
        self.playback = self.playback.toggled();
        self.event = event;
    }

    /// Return to idle, releasing per-effect data
    ///
    /// The model is kept when `keep_model` is set so the next event can reuse it.
    pub fn reset(&mut self, keep_model: bool) {
        self.event = WindowEvent::None;
        self.effect = None;
        self.total_time = 0.0;
        self.remaining_time = 0.0;
        self.remainder_steps = 0.0;
        self.playback = Playback::Forward;
        self.using_transform = false;
        self.transform = Mat4::IDENTITY;
        self.transform_start_progress = 0.0;
        self.transform_progress = 0.0;
        self.initialized = false;
        self.draw_region = None;
        self.effect_data = None;
        if !keep_model {
            self.model = None;
        }
    }

    pub fn set_data<T: Any>(&mut self, data: T) {
        self.effect_data = Some(Box::new(data));
    }

    pub fn data<T: Any>(&self) -> Option<&T> {
        self.effect_data.as_ref()?.downcast_ref::<T>()
    }

    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.effect_data.as_mut()?.downcast_mut::<T>()
    }

    pub fn has_data(&self) -> bool {
        self.effect_data.is_some()
    }

    pub fn clear_data(&mut self) {
        self.effect_data = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(total: f32, step: f32) -> AnimationState {
        AnimationState {
            event: WindowEvent::Minimize,
            total_time: total,
            remaining_time: total,
            time_step: step,
            ..Default::default()
        }
    }

    #[test]
    fn test_clock_takes_at_least_one_step() {
        let mut s = running(100.0, 10.0);
        assert_eq!(s.advance_clock(0.0), 1);
        assert_eq!(s.remaining_time, 90.0);
    }

    #[test]
    fn test_clock_carries_fractional_steps() {
        let mut s = running(100.0, 10.0);
        assert_eq!(s.advance_clock(15.0), 1);
        assert_eq!(s.advance_clock(15.0), 2);
        assert_eq!(s.remaining_time, 70.0);
    }

    #[test]
    fn test_clock_never_goes_negative() {
        let mut s = running(20.0, 10.0);
        s.advance_clock(500.0);
        assert_eq!(s.remaining_time, 0.0);
        assert!(!s.is_animating());
    }

    #[test]
    fn test_reverse_stays_in_bounds() {
        let mut s = running(300.0, 16.0);
        s.reverse(WindowEvent::Unminimize);
        assert_eq!(s.remaining_time, 1.0);
        assert_eq!(s.playback, Playback::Reversed);

        s.remaining_time = 0.5;
        s.reverse(WindowEvent::Minimize);
        assert!(s.remaining_time >= 1.0 && s.remaining_time <= 300.0);
        assert_eq!(s.playback, Playback::Forward);
    }

    #[test]
    fn test_effect_data_round_trip() {
        let mut s = AnimationState::default();
        s.set_data(42u32);
        assert_eq!(s.data::<u32>(), Some(&42));
        assert!(s.data::<f32>().is_none());
        s.reset(false);
        assert!(!s.has_data());
    }
}
