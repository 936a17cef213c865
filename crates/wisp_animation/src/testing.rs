//! Shared fixtures for unit tests

use crate::chain::ChainRegistry;
use crate::effect::AnimContext;
use crate::options::{ParamSpec, ParamTable, ParamValue, ParamView};
use crate::state::AnimationState;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use wisp_core::{Rng, ScreenInfo, WindowId, WindowInfo};

/// One window on a 1000×800 screen with everything a hook needs
pub(crate) struct Fixture {
    pub window: WindowInfo,
    pub screen: ScreenInfo,
    pub state: AnimationState,
    pub rng: Rng,
    pub chains: ChainRegistry,
    pub windows: FxHashMap<WindowId, WindowInfo>,
    pub specs: ParamTable,
    pub configured: IndexMap<String, ParamValue>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_window(WindowInfo::new(WindowId(1), 100, 100, 200, 100))
    }

    pub fn with_window(window: WindowInfo) -> Self {
        let mut windows = FxHashMap::default();
        windows.insert(window.id, window.clone());
        Self {
            window,
            screen: ScreenInfo::new(1000, 800),
            state: AnimationState::default(),
            rng: Rng::new(1),
            chains: ChainRegistry::new(),
            windows,
            specs: ParamTable::new(),
            configured: IndexMap::new(),
        }
    }

    /// Declare parameters so `ParamView` resolves their defaults
    pub fn declare(&mut self, specs: Vec<ParamSpec>) {
        for spec in specs {
            self.specs.insert(spec.name.to_string(), spec);
        }
    }

    /// Start a run of `total` ms for `event`
    pub fn start(&mut self, event: crate::event::WindowEvent, total: f32) {
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
            pointer: None,
            chains: &mut self.chains,
            windows: &self.windows,
            time_step: 10.0,
            perceived_time_compensation: true,
            over_new_copy: false,
        }
    }
}
