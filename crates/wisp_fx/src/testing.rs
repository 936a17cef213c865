//! Shared fixtures for unit tests

use crate::polygon::{PolygonEffect, PolygonSet, StepFrame};
use crate::Addon;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use wisp_animation::chain::ChainRegistry;
use wisp_animation::{
    AnimContext, AnimationState, Extension, ParamTable, ParamValue, ParamView, WindowEvent,
};
use wisp_core::{Rng, ScreenInfo, WindowId, WindowInfo};

/// One window on a 1000×800 screen with every addon parameter declared
pub(crate) struct Fixture {
    pub window: WindowInfo,
    pub screen: ScreenInfo,
    pub state: AnimationState,
    pub rng: Rng,
    pub chains: ChainRegistry,
    pub windows: FxHashMap<WindowId, WindowInfo>,
    pub specs: ParamTable,
    pub configured: IndexMap<String, ParamValue>,
    pub pointer: Option<wisp_core::Point>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_window(WindowInfo::new(WindowId(1), 100, 100, 200, 100))
    }

    pub fn with_window(window: WindowInfo) -> Self {
        let mut windows = FxHashMap::default();
        windows.insert(window.id, window.clone());
        let mut specs = ParamTable::new();
        for effect in Addon.effects() {
            for spec in effect.params() {
                specs.insert(spec.name.to_string(), spec);
            }
        }
        Self {
            window,
            screen: ScreenInfo::new(1000, 800),
            state: AnimationState::default(),
            rng: Rng::new(1),
            chains: ChainRegistry::new(),
            windows,
            specs,
            configured: IndexMap::new(),
            pointer: None,
        }
    }

    /// Override a declared parameter
    pub fn set(&mut self, name: &str, value: ParamValue) {
        self.configured.insert(name.to_string(), value);
    }

    /// Start a run of `total` ms for `event`
    pub fn start(&mut self, event: WindowEvent, total: f32) {
        self.state.event = event;
        self.state.total_time = total;
        self.state.remaining_time = total;
        self.state.time_step = 10.0;
    }

    pub fn ctx(&mut self) -> AnimContext<'_> {
        AnimContext {
            id: self.window.id,
            window: &self.window,
            screen: &self.screen,
            state: &mut self.state,
            params: ParamView::new(&[], &self.configured, &self.specs),
            rng: &mut self.rng,
            pointer: self.pointer,
            chains: &mut self.chains,
            windows: &self.windows,
            time_step: 10.0,
            perceived_time_compensation: true,
            over_new_copy: false,
        }
    }

    /// Build `effect` for `event` and place its pieces at progress 0
    pub fn placed_at_start<E: PolygonEffect>(
        &mut self,
        effect: &E,
        event: WindowEvent,
    ) -> PolygonSet {
        self.start(event, 1000.0);
        let mut set = effect.build(&mut self.ctx()).unwrap();
        let params = ParamView::new(&[], &self.configured, &self.specs);
        let frame = StepFrame {
            progress: 0.0,
            event,
            screen: &self.screen,
            border: self.window.border_rect(),
            icon: self.state.icon,
            params: &params,
        };
        effect.step_polygons(&frame, &mut set);
        set
    }
}
