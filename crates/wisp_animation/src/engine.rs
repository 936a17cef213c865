//! Animation engine
//!
//! [`Animator`] is the per-screen orchestrator. The host feeds it
//! [`HostEvent`]s as windows change, calls [`Animator::prepare_paint`] once
//! per frame, walks [`Animator::paint_order`] and asks
//! [`Animator::paint_window`] and [`Animator::add_window_geometry`] how to
//! draw each window. Work the engine holds back (unmaps and destroys of
//! closing windows, the activity flag) comes back as [`EngineEvent`]s.
//!
//! Everything runs on the compositor thread; nothing here is shared.

use crate::chain::{ChainRegistry, DodgeDirection};
use crate::config::AnimationConfig;
use crate::effect::{AnimContext, Effect};
use crate::effects::dodge::dodge_amount;
use crate::event::{EventKind, Playback, WindowEvent};
use crate::host::{EngineEvent, HostEvent, WatchedPlugin};
use crate::matching::{ExprMatcher, WindowMatcher};
use crate::mesh::{grid_geometry, Geometry};
use crate::model::Model;
use crate::options::{ParamValue, ParamView};
use crate::paint::{FrameDamage, PaintAttributes, PaintDecision, PaintInstructions, PaintStep};
use crate::registry::{EffectId, EffectRegistry, Extension, ExtensionId};
use crate::restack::{detect_restack, RestackInfo};
use crate::selection::{pick_random, EffectSets, Selection};
use crate::state::AnimationState;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use wisp_core::{
    DamageBox, Mat4, Point, Rect, Result, Rng, ScreenInfo, ScreenProjection, WindowId, WindowInfo,
    WindowKind,
};

/// Side of the square icon used when a window has no taskbar icon
pub const FAKE_ICON_SIZE: f32 = 4.0;

/// Frames focus animations stay suppressed after a switcher closes
const SWITCHER_POST_WAIT_FRAMES: u32 = 4;

/// Map state of a window as the engine last confirmed it to the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum HostState {
    #[default]
    Normal,
    Iconic,
    Withdrawn,
}

#[derive(Debug, Default)]
struct WindowRecord {
    state: AnimationState,
    host_state: HostState,
    /// State the window enters once the running animation completes
    new_state: HostState,
    now_shaded: bool,
    /// Unmaps held back until the animation completes
    unmap_count: u32,
    destroy_count: u32,
    grabbed: bool,
    /// The window has been shown at least once
    created: bool,
}

/// How far a cleanup goes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cleanup {
    /// Ran out or was aborted
    Completed,
    /// Another event takes over; the model is kept for it
    Replaced,
    /// A close takes over; the paint chain goes too
    ReplacedByClose,
    /// The window is going away; held unmaps are dropped
    Forgotten,
}

impl Cleanup {
    fn keeps_model(self) -> bool {
        matches!(self, Cleanup::Replaced | Cleanup::ReplacedByClose)
    }

    fn dissolves_chain(self) -> bool {
        matches!(self, Cleanup::ReplacedByClose | Cleanup::Forgotten)
    }

    fn releases_unmaps(self) -> bool {
        self != Cleanup::Forgotten
    }
}

/// Output of one [`Animator::prepare_paint`] call
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Screen areas to repaint, per window
    pub damage: Vec<FrameDamage>,
    /// Unmaps, destroys and activity changes released during the frame
    pub events: Vec<EngineEvent>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.damage.is_empty() && self.events.is_empty()
    }
}

/// Per-screen animation engine
pub struct Animator {
    registry: EffectRegistry,
    config: AnimationConfig,
    sets: EffectSets,
    matcher: Box<dyn WindowMatcher>,

    screen: ScreenInfo,
    windows: FxHashMap<WindowId, WindowInfo>,
    records: FxHashMap<WindowId, WindowRecord>,
    chains: ChainRegistry,
    /// Client stacking order, bottom to top
    stacking: Vec<WindowId>,

    rng: Rng,
    pointer: Option<Point>,
    anim_in_progress: bool,
    active_plugins: FxHashSet<WatchedPlugin>,
    switcher_post_wait: u32,
    restacked_just_now: bool,

    damage: Vec<FrameDamage>,
    outbox: Vec<EngineEvent>,

    dodge: Option<EffectId>,
    focus_fade: Option<EffectId>,
}

impl Animator {
    pub fn new(config: AnimationConfig, screen: ScreenInfo) -> Self {
        Self::with_matcher(config, screen, Box::new(ExprMatcher::new()))
    }

    /// Engine using the host's own window matcher
    pub fn with_matcher(
        config: AnimationConfig,
        screen: ScreenInfo,
        matcher: Box<dyn WindowMatcher>,
    ) -> Self {
        let registry = EffectRegistry::new();
        let dodge = registry.lookup("Dodge");
        let focus_fade = registry.lookup("Focus Fade");
        let rng = Rng::new(config.seed);
        let mut animator = Self {
            registry,
            config,
            sets: EffectSets::default(),
            matcher,
            screen,
            windows: FxHashMap::default(),
            records: FxHashMap::default(),
            chains: ChainRegistry::new(),
            stacking: Vec::new(),
            rng,
            pointer: None,
            anim_in_progress: false,
            active_plugins: FxHashSet::default(),
            switcher_post_wait: 0,
            restacked_just_now: false,
            damage: Vec::new(),
            outbox: Vec::new(),
            dodge,
            focus_fade,
        };
        animator.rebuild_sets();
        animator
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Replace the configuration; running animations keep their settings
    pub fn set_config(&mut self, config: AnimationConfig) {
        self.config = config;
        self.rebuild_sets();
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn screen(&self) -> &ScreenInfo {
        &self.screen
    }

    pub fn set_screen(&mut self, screen: ScreenInfo) {
        self.screen = screen;
    }

    pub fn state(&self, id: WindowId) -> Option<&AnimationState> {
        self.records.get(&id).map(|r| &r.state)
    }

    pub fn window(&self, id: WindowId) -> Option<&WindowInfo> {
        self.windows.get(&id)
    }

    pub fn chains(&self) -> &ChainRegistry {
        &self.chains
    }

    pub fn stacking(&self) -> &[WindowId] {
        &self.stacking
    }

    pub fn is_animating(&self, id: WindowId) -> bool {
        self.records
            .get(&id)
            .is_some_and(|r| r.state.is_animating())
    }

    /// Name of the effect running on a window
    pub fn effect_name(&self, id: WindowId) -> Option<&str> {
        let effect = self.records.get(&id)?.state.effect?;
        self.registry.get(effect).map(|r| r.effect.name())
    }

    /// Whether another frame should be scheduled
    pub fn done_paint(&self) -> bool {
        self.anim_in_progress
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Extensions
    // ─────────────────────────────────────────────────────────────────────────

    /// Register an extension's effects and re-resolve the configuration
    pub fn add_extension(&mut self, extension: &dyn Extension) -> Result<ExtensionId> {
        let id = self.registry.register_extension(extension)?;
        self.rebuild_sets();
        info!(extension = extension.name(), "extension added");
        Ok(id)
    }

    /// Unregister an extension
    ///
    /// Windows running one of its effects are cleaned up first; their held
    /// unmaps are returned. An unknown handle is a no-op.
    pub fn remove_extension(&mut self, id: ExtensionId) -> Vec<EngineEvent> {
        let effects = self.registry.extension_effects(id).to_vec();
        if effects.is_empty() {
            return Vec::new();
        }
        let mut victims: Vec<WindowId> = self
            .records
            .iter()
            .filter(|(_, r)| r.state.effect.is_some_and(|e| effects.contains(&e)))
            .map(|(w, _)| *w)
            .collect();
        victims.sort_unstable();
        for w in victims {
            self.cleanup(w, Cleanup::Completed);
        }

        self.registry.unregister_extension(id);
        self.rebuild_sets();
        if !self.records.values().any(|r| r.state.is_animating()) {
            self.set_activity(false);
        }
        std::mem::take(&mut self.outbox)
    }

    fn rebuild_sets(&mut self) {
        self.sets = EffectSets::build(&self.config, &self.registry, self.matcher.as_mut());
        if let Err(e) = self.matcher.prepare(&self.config.never_animate) {
            error!(error = %e, "invalid never_animate match");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Host events
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a host notification
    ///
    /// Returns the replies released by it: unmaps and destroys the engine
    /// does not hold back and activity changes.
    pub fn handle(&mut self, event: HostEvent) -> Vec<EngineEvent> {
        trace!(?event, "host event");
        match event {
            HostEvent::Add { window } => self.add_window(window),
            HostEvent::Map { window } => self.map_window(window),
            HostEvent::Unmap {
                window,
                shaded,
                iconic,
            } => self.unmap_window(window, shaded, iconic),
            HostEvent::Withdraw { window } => self.withdraw_window(window),
            HostEvent::Destroy { window } => self.destroy_window(window),
            HostEvent::Damage { window, initial } => {
                if initial {
                    self.first_damage(window);
                }
            }
            HostEvent::Restack { stacking } => self.restack(stacking),
            HostEvent::ActiveWindow { window } => self.activate_window(window),
            HostEvent::Resize { window } => self.resize_window(window),
            HostEvent::Move {
                window,
                dx,
                dy,
                immediate,
            } => self.move_window(window, dx, dy, immediate),
            HostEvent::Grab { window } => {
                if let Some(record) = self.records.get_mut(&window) {
                    record.grabbed = true;
                }
                if let Some(links) = self.chains.get_mut(window) {
                    links.configure_notified = true;
                }
            }
            HostEvent::Ungrab { window } => {
                if let Some(record) = self.records.get_mut(&window) {
                    record.grabbed = false;
                }
            }
            HostEvent::PluginActivation { plugin, active } => {
                if active {
                    self.active_plugins.insert(plugin);
                } else {
                    self.active_plugins.remove(&plugin);
                    if plugin.is_switcher() {
                        self.switcher_post_wait = 1;
                    }
                }
            }
            HostEvent::Pointer { position } => self.pointer = Some(position),
            HostEvent::Update { window } => {
                if self.records.contains_key(&window.id) {
                    self.windows.insert(window.id, window);
                } else {
                    self.add_window(window);
                }
            }
        }
        std::mem::take(&mut self.outbox)
    }

    fn add_window(&mut self, window: WindowInfo) {
        let id = window.id;
        let host_state = if window.minimized {
            HostState::Iconic
        } else {
            HostState::Normal
        };
        self.records.entry(id).or_insert_with(|| WindowRecord {
            host_state,
            new_state: host_state,
            now_shaded: window.shaded,
            created: window.mapped,
            ..Default::default()
        });
        self.chains.insert(id);
        if !self.stacking.contains(&id) {
            self.stacking.push(id);
        }
        self.windows.insert(id, window);
    }

    fn map_window(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get_mut(&id) {
            window.mapped = true;
        }
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        if record.state.is_animating() {
            record.host_state = record.new_state;
        }
        for _ in 0..record.unmap_count {
            self.outbox.push(EngineEvent::Unmap { window: id });
        }
        record.unmap_count = 0;
    }

    fn unmap_window(&mut self, id: WindowId, shaded: bool, iconic: bool) {
        if !self.windows.contains_key(&id) || (!shaded && !iconic) {
            if let Some(window) = self.windows.get_mut(&id) {
                window.mapped = false;
            }
            self.release_unmap(id);
            return;
        }

        let held = if shaded {
            self.shade_window(id)
        } else {
            self.minimize_window(id)
        };
        if held {
            if let Some(record) = self.records.get_mut(&id) {
                record.unmap_count += 1;
            }
        } else {
            self.release_unmap(id);
        }
    }

    fn shade_window(&mut self, id: WindowId) -> bool {
        if let Some(window) = self.windows.get_mut(&id) {
            window.shaded = true;
        }
        if let Some(record) = self.records.get_mut(&id) {
            record.now_shaded = true;
        }
        match self.select(EventKind::Shade, id) {
            Some((row, selection, duration)) => {
                self.start_event(id, WindowEvent::Shade, row, selection, duration)
            }
            None => false,
        }
    }

    fn minimize_window(&mut self, id: WindowId) -> bool {
        let Some(window) = self.windows.get_mut(&id) else {
            return false;
        };
        let hidden = window.hidden;
        window.minimized = true;
        let icon = self.minimize_icon(id);

        self.chains.reset_stacking_info();
        if let Some(record) = self.records.get_mut(&id) {
            record.new_state = HostState::Iconic;
        }
        let started = !hidden
            && match self.select(EventKind::Minimize, id) {
                Some((row, selection, duration)) => {
                    self.start_event(id, WindowEvent::Minimize, row, selection, duration)
                }
                None => false,
            };
        if let Some(record) = self.records.get_mut(&id) {
            if started {
                record.state.icon = icon;
            } else {
                record.host_state = record.new_state;
            }
        }
        started
    }

    fn withdraw_window(&mut self, id: WindowId) {
        self.chains.reset_stacking_info();
        let skip = match self.windows.get(&id) {
            Some(window) => self.never_animate(window) || self.other_plugins_active(),
            None => true,
        };
        if skip {
            self.release_unmap(id);
            return;
        }
        if let Some(record) = self.records.get_mut(&id) {
            record.host_state = HostState::Normal;
            record.new_state = HostState::Withdrawn;
        }

        let Some((row, selection, duration)) = self.select(EventKind::Close, id) else {
            // No close animation: the window leaves right away
            if self.is_animating(id) {
                self.cleanup(id, Cleanup::ReplacedByClose);
            }
            if let Some(record) = self.records.get_mut(&id) {
                record.host_state = record.new_state;
            }
            self.release_unmap(id);
            return;
        };

        if self.start_event(id, WindowEvent::Close, row, selection, duration) {
            let icon = self.fake_icon(id, false);
            if let Some(record) = self.records.get_mut(&id) {
                record.state.icon = icon;
                record.unmap_count += 1;
            }
        } else {
            if let Some(record) = self.records.get_mut(&id) {
                record.host_state = record.new_state;
            }
            self.release_unmap(id);
        }
    }

    fn destroy_window(&mut self, id: WindowId) {
        let hold = self.is_animating(id)
            && self
                .records
                .get(&id)
                .is_some_and(|r| r.state.event == WindowEvent::Close)
            && self.select(EventKind::Close, id).is_some();
        if hold {
            if let Some(record) = self.records.get_mut(&id) {
                record.destroy_count += 1;
            }
            debug!(window = ?id, "destroy held until the close animation ends");
            return;
        }
        self.outbox.push(EngineEvent::Destroy { window: id });
        self.forget(id);
    }

    /// First paint after a map: unminimize, unshade or open
    fn first_damage(&mut self, id: WindowId) {
        let Some(record) = self.records.get(&id) else {
            return;
        };
        let iconic = record.host_state == HostState::Iconic;
        let shaded = record.now_shaded;

        let started = if iconic {
            let hidden = match self.windows.get_mut(&id) {
                Some(window) => {
                    window.minimized = false;
                    window.mapped = true;
                    window.hidden
                }
                None => true,
            };
            if hidden || self.active_plugins.contains(&WatchedPlugin::FadeDesktop) {
                false
            } else if let Some((row, selection, duration)) = self.select(EventKind::Minimize, id) {
                self.chains.reset_stacking_info();
                let icon = self.minimize_icon(id);
                let started =
                    self.start_event(id, WindowEvent::Unminimize, row, selection, duration);
                if started {
                    if let Some(record) = self.records.get_mut(&id) {
                        record.state.icon = icon;
                    }
                }
                started
            } else {
                false
            }
        } else if shaded {
            if let Some(window) = self.windows.get_mut(&id) {
                window.shaded = false;
            }
            if let Some(record) = self.records.get_mut(&id) {
                record.now_shaded = false;
            }
            match self.select(EventKind::Shade, id) {
                Some((row, selection, duration)) => {
                    self.start_event(id, WindowEvent::Unshade, row, selection, duration)
                }
                None => false,
            }
        } else {
            self.chains.reset_stacking_info();
            if let Some(record) = self.records.get_mut(&id) {
                record.created = true;
            }
            let skip = match self.windows.get_mut(&id) {
                Some(window) => {
                    window.mapped = true;
                    false
                }
                None => true,
            };
            let skip = skip
                || self.other_plugins_active()
                || self.windows.get(&id).is_some_and(|w| self.never_animate(w));
            match self.select(EventKind::Open, id).filter(|_| !skip) {
                Some((row, selection, duration)) => {
                    let started =
                        self.start_event(id, WindowEvent::Open, row, selection, duration);
                    if started {
                        let icon = self.fake_icon(id, true);
                        if let Some(record) = self.records.get_mut(&id) {
                            record.state.icon = icon;
                        }
                    }
                    started
                }
                None => false,
            }
        };

        if let Some(record) = self.records.get_mut(&id) {
            record.new_state = HostState::Normal;
            if !started && !record.state.is_animating() {
                record.host_state = HostState::Normal;
            }
        }
    }

    fn restack(&mut self, stacking: Vec<WindowId>) {
        let info = {
            let windows = &self.windows;
            let chains = &self.chains;
            detect_restack(
                &self.stacking,
                &stacking,
                |w| windows.get(&w).is_some_and(|w| w.is_stacking_relevant()),
                |w| chains.get(w).is_some_and(|l| l.configure_notified),
            )
        };
        if stacking.len() == self.stacking.len() {
            for w in &stacking {
                if let Some(links) = self.chains.get_mut(*w) {
                    links.configure_notified = false;
                }
            }
        }

        if let Some(info) = info {
            let created = self
                .records
                .get(&info.restacked)
                .is_some_and(|r| r.created);
            if created {
                debug!(
                    window = ?info.restacked,
                    raised = info.raised,
                    "window restacked"
                );
                self.chains.entry(info.restacked).restack = Some(info);
                self.restacked_just_now = true;
            }
        }
        self.stacking = stacking;
    }

    fn activate_window(&mut self, id: WindowId) {
        if let Some(links) = self.chains.get_mut(id) {
            links.configure_notified = true;
        }
        // Paint-reordering focus effects start from the restack instead
        let reorders = match self.select(EventKind::Focus, id) {
            Some((_, Selection::Effect(effect), _)) => self
                .registry
                .effect(effect)
                .is_some_and(|e| e.reorders_paint()),
            _ => false,
        };
        if !reorders {
            self.initiate_focus(id);
        }
    }

    fn resize_window(&mut self, window: WindowInfo) {
        let id = window.id;
        let transient_open = window.kind.is_transient_menu();
        let outer = window.outer_rect();
        self.windows.insert(id, window);

        let Some(record) = self.records.get(&id) else {
            return;
        };
        let initialized = record.state.initialized;
        // Menus resize while opening; let them finish
        if !(transient_open && record.state.event == WindowEvent::Open) {
            self.with_ctx(id, false, |effect, ctx| effect.refresh(ctx, initialized));
            if self.is_animating(id) {
                self.cleanup(id, Cleanup::Completed);
            }
        }
        if let Some(model) = self
            .records
            .get_mut(&id)
            .and_then(|r| r.state.model.as_mut())
        {
            model.init_points(outer.x(), outer.y(), outer.width(), outer.height());
        }
    }

    fn move_window(&mut self, id: WindowId, dx: i32, dy: i32, immediate: bool) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        window.x += dx;
        window.y += dy;
        let outer = window.outer_rect();

        if immediate {
            if let Some(model) = self
                .records
                .get_mut(&id)
                .and_then(|r| r.state.model.as_mut())
            {
                model.translate(dx as f32, dy as f32);
            }
            return;
        }

        let animating = self.is_animating(id);
        if animating && self.running_effect(id).is_some_and(|e| e.reorders_paint()) {
            return;
        }
        let (initialized, grabbed) = self
            .records
            .get(&id)
            .map_or((false, false), |r| (r.state.initialized, r.grabbed));
        self.with_ctx(id, false, |effect, ctx| effect.refresh(ctx, initialized));
        if animating && grabbed {
            self.cleanup(id, Cleanup::Completed);
            if !self.records.values().any(|r| r.state.is_animating()) {
                self.set_activity(false);
            }
        }
        if let Some(model) = self
            .records
            .get_mut(&id)
            .and_then(|r| r.state.model.as_mut())
        {
            model.init_points(outer.x(), outer.y(), outer.width(), outer.height());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Starting animations
    // ─────────────────────────────────────────────────────────────────────────

    /// First rule row of `kind` that animates the window
    fn select(&self, kind: EventKind, id: WindowId) -> Option<(usize, Selection, u32)> {
        let window = self.windows.get(&id)?;
        let (row, rule) = self.sets.select(kind, window, self.matcher.as_ref())?;
        match rule.selection {
            Selection::Skip => None,
            selection => Some((row, selection, rule.duration)),
        }
    }

    /// Start (or reverse into) `event` on a window
    ///
    /// Returns whether the window now animates.
    fn start_event(
        &mut self,
        id: WindowId,
        event: WindowEvent,
        row: usize,
        selection: Selection,
        duration: u32,
    ) -> bool {
        let Some(kind) = event.kind() else {
            return false;
        };
        let Some(record) = self.records.get(&id) else {
            return false;
        };
        let current = record.state.event;
        let running = record.state.is_animating();
        let has_effect = record.state.effect.is_some();

        if running && current == event {
            return true;
        }
        if running && event.inverse() == Some(current) {
            if let Some(record) = self.records.get_mut(&id) {
                record.state.reverse(event);
                record.state.selection_row = Some((kind, row));
            }
            debug!(window = ?id, ?event, "animation reversed");
            self.set_activity(true);
            return true;
        }

        if current != WindowEvent::None || has_effect {
            let mode = if event == WindowEvent::Close {
                Cleanup::ReplacedByClose
            } else {
                Cleanup::Replaced
            };
            self.cleanup(id, mode);
        }

        let effect = match selection {
            Selection::Effect(effect) if !self.config.all_random || !kind.has_random_pool() => {
                Some(effect)
            }
            _ => pick_random(kind, &self.sets, &self.registry, &mut self.rng),
        };
        let Some(effect) = effect else {
            return false;
        };
        if self.registry.get(effect).is_none() {
            return false;
        }

        let Some(record) = self.records.get_mut(&id) else {
            return false;
        };
        let state = &mut record.state;
        state.effect = Some(effect);
        state.event = event;
        state.total_time = duration as f32;
        state.remaining_time = duration as f32;
        state.remainder_steps = 0.0;
        state.playback = Playback::Forward;
        state.selection_row = Some((kind, row));
        state.initialized = false;
        debug!(
            window = ?id,
            ?event,
            effect = self.registry.name(effect),
            duration,
            "animation started"
        );

        self.set_activity(true);
        if !self.ensure_model(id) {
            self.cleanup(id, Cleanup::Completed);
            return false;
        }
        true
    }

    /// Make sure the window has a model of the grid size its effect wants
    fn ensure_model(&mut self, id: WindowId) -> bool {
        let Some(grid) = self.with_ctx(id, false, |effect, ctx| effect.grid_size(ctx)) else {
            return true;
        };
        let Some(window) = self.windows.get(&id) else {
            return false;
        };
        let Some(record) = self.records.get_mut(&id) else {
            return false;
        };
        let event = record.state.event;
        if record
            .state
            .model
            .as_ref()
            .is_some_and(|m| m.fits(window, event, grid))
        {
            return true;
        }
        match Model::new(window, event, grid) {
            Ok(model) => {
                record.state.model = Some(model);
                true
            }
            Err(e) => {
                error!(window = ?id, error = %e, "cannot build animation model");
                record.state.model = None;
                false
            }
        }
    }

    /// Start a focus animation, wiring up dodgers and paint chains
    fn initiate_focus(&mut self, id: WindowId) {
        let Some(record) = self.records.get(&id) else {
            return;
        };
        if record.state.event != WindowEvent::None
            || self.other_plugins_active()
            || self.switcher_post_wait > 0
        {
            return;
        }
        let Some((row, Selection::Effect(chosen), duration)) = self.select(EventKind::Focus, id)
        else {
            return;
        };
        let Some(effect) = self.registry.effect(chosen) else {
            return;
        };
        if effect.is_placeholder() {
            return;
        }
        let is_dodge = Some(chosen) == self.dodge;

        if let Some(record) = self.records.get_mut(&id) {
            record.state.effect = Some(chosen);
            record.state.event = WindowEvent::Focus;
            record.state.selection_row = Some((EventKind::Focus, row));
            record.state.playback = Playback::Forward;
            record.state.initialized = false;
        }

        let mut duration = duration as f32;
        let mut subject_total = None;
        let restack = self.chains.get(id).and_then(|l| l.restack);

        if effect.reorders_paint() {
            let (passed, overlaps) = match restack {
                Some(info) => self.windows_passed(id, &info, is_dodge, chosen),
                None => (Vec::new(), false),
            };
            if !overlaps {
                duration = 0.0;
            }
            if let Some(info) = restack {
                let above = info.old_above;
                if above != id && self.chains.get(above).is_some() {
                    self.chains.entry(above).to_be_painted_before = Some(id);
                    self.chains.entry(id).painted_before = Some(above);
                }
            }
            if is_dodge {
                let raised = restack.map_or(true, |r| r.raised);
                subject_total = Some(self.setup_dodgers(id, &passed, raised, duration));
            }
        }

        if !self.ensure_model(id) {
            self.cleanup(id, Cleanup::Completed);
            return;
        }
        self.set_activity(true);
        if let Some(record) = self.records.get_mut(&id) {
            let total = subject_total.unwrap_or(duration);
            record.state.total_time = total;
            record.state.remaining_time = total;
        }
        debug!(window = ?id, effect = effect.name(), "focus animation started");
    }

    /// Windows the restacked window passes through
    ///
    /// Returns the dodge candidates (with whether they stay put) and whether
    /// the window overlaps anything it passed.
    fn windows_passed(
        &mut self,
        id: WindowId,
        info: &RestackInfo,
        is_dodge: bool,
        chosen: EffectId,
    ) -> (Vec<(WindowId, bool)>, bool) {
        let mut passed = Vec::new();
        let mut overlaps = false;
        let Some(subject) = self.windows.get(&id).map(|w| w.border_rect()) else {
            return (passed, overlaps);
        };
        let pos = |w: WindowId| self.stacking.iter().position(|s| *s == w);
        let (Some(start), Some(end)) = (pos(info.start), pos(info.end)) else {
            return (passed, overlaps);
        };
        if start > end {
            return (passed, overlaps);
        }

        for dw in self.stacking[start..=end].to_vec() {
            let Some(window) = self.windows.get(&dw) else {
                continue;
            };
            if !self.is_visible(dw) || window.kind == WindowKind::Dock {
                continue;
            }
            if dw != info.end && self.chains.get(dw).is_some_and(|l| l.restack.is_some()) {
                continue;
            }
            if dw == id && !is_dodge {
                continue;
            }
            let hit = subject
                .intersection(&window.border_rect())
                .filter(|r| !r.is_empty());
            overlaps |= hit.is_some();

            if !is_dodge {
                self.chains.entry(dw).passing_through = Some(id);
                continue;
            }
            let stationary = !matches!(
                self.select(EventKind::Focus, dw),
                Some((_, Selection::Effect(e), _)) if e == chosen
            );
            let free = self
                .records
                .get(&dw)
                .map_or(true, |r| r.state.effect.is_none() || r.state.effect == self.dodge);
            if hit.is_some() && free && dw != id {
                passed.push((dw, stationary));
            }
        }
        (passed, overlaps)
    }

    /// Chain the dodgers to their subject and give each its timing
    ///
    /// Returns the subject's total duration.
    fn setup_dodgers(
        &mut self,
        id: WindowId,
        dodgers: &[(WindowId, bool)],
        raised: bool,
        duration: f32,
    ) -> f32 {
        let gap_ratio = self
            .with_ctx(id, false, |_, ctx| ctx.params.float("dodge_gap_ratio"))
            .unwrap_or(0.5);
        let num = dodgers.len() as f32;
        let max_start = num * gap_ratio * duration / 1000.0;
        let subject_rect = self
            .windows
            .get(&id)
            .map(|w| w.border_rect())
            .unwrap_or(Rect::ZERO);

        {
            let links = self.chains.entry(id);
            links.is_dodge_subject = true;
            links.dodge_chain_start = None;
            links.dodge_max_amount = 0.0;
        }

        let mut max_total = 0.0f32;
        let mut last: Option<WindowId> = None;
        for (i, &(dw, stationary)) in dodgers.iter().enumerate() {
            let order = (i + 1) as f32;
            let mut start = if raised {
                max_start * (order - 1.0) / num
            } else {
                max_start * (1.0 - order / num)
            };
            let mut total = 1.0 + start;
            max_total = max_total.max(total);
            start /= total;
            if stationary {
                start = 0.0;
                total = 0.0;
            }

            if let Some(record) = self.records.get_mut(&dw) {
                let state = &mut record.state;
                state.effect = self.dodge;
                state.transform_start_progress = start;
                state.total_time = total * duration;
                state.remaining_time = state.total_time;
                state.playback = Playback::Forward;
                state.selection_row = None;
            }

            let dodger_rect = self
                .windows
                .get(&dw)
                .map(|w| w.border_rect())
                .unwrap_or(Rect::ZERO);
            let (direction, amount) = DodgeDirection::ALL
                .iter()
                .map(|d| (*d, dodge_amount(subject_rect, dodger_rect, *d)))
                .min_by(|a, b| a.1.abs().partial_cmp(&b.1.abs()).unwrap_or(Ordering::Equal))
                .unwrap_or((DodgeDirection::Up, 0.0));

            match last {
                Some(prev) if raised => self.chains.entry(prev).dodge_next = Some(dw),
                Some(prev) => self.chains.entry(prev).dodge_prev = Some(dw),
                None if raised => self.chains.entry(id).dodge_chain_start = Some(dw),
                None => {}
            }
            let links = self.chains.entry(dw);
            links.dodge_subject = Some(id);
            links.dodge_order = if stationary { -(order as i32) } else { order as i32 };
            links.dodge_direction = direction;
            links.dodge_max_amount = amount;
            if raised {
                links.dodge_prev = last;
                links.dodge_next = None;
            } else {
                links.dodge_prev = None;
                links.dodge_next = last;
            }
            last = Some(dw);
        }
        if !raised {
            self.chains.entry(id).dodge_chain_start = last;
        }
        for &(dw, _) in dodgers {
            self.chains.entry(dw).dodge_order = 0;
        }
        max_total * duration
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame
    // ─────────────────────────────────────────────────────────────────────────

    /// Advance every running animation by `ms` milliseconds
    pub fn prepare_paint(&mut self, ms: f32) -> Frame {
        if self.switcher_post_wait > 0 {
            self.switcher_post_wait += 1;
            if self.switcher_post_wait > SWITCHER_POST_WAIT_FRAMES {
                self.switcher_post_wait = 0;
                self.chains.reset_stacking_info();
            }
        }
        if self.restacked_just_now {
            self.restacked_just_now = false;
            self.process_restacks();
        }

        if self.anim_in_progress {
            let mut ids = self.stacking.clone();
            let mut rest: Vec<WindowId> = self
                .records
                .keys()
                .copied()
                .filter(|w| !self.stacking.contains(w))
                .collect();
            rest.sort_unstable();
            ids.extend(rest);

            let mut still_running = false;
            for id in &ids {
                still_running |= self.step_window(*id, ms);
            }

            let progress: FxHashMap<WindowId, f32> = self
                .records
                .iter()
                .map(|(w, r)| (*w, r.state.transform_progress))
                .collect();
            for id in &ids {
                if self.running_effect(*id).is_none() {
                    continue;
                }
                self.with_ctx(*id, false, |effect, ctx| {
                    effect.post_prepare(ctx, &|w| progress.get(&w).copied().unwrap_or(0.0))
                });
            }

            if !still_running {
                self.set_activity(false);
            }
        }

        Frame {
            damage: std::mem::take(&mut self.damage),
            events: std::mem::take(&mut self.outbox),
        }
    }

    /// Step one window; returns whether it still needs frames
    fn step_window(&mut self, id: WindowId, ms: f32) -> bool {
        let Some(record) = self.records.get(&id) else {
            return false;
        };
        let mut running = false;
        if record.state.is_animating() {
            match self.running_effect(id) {
                Some(effect) => running = self.advance(id, effect.as_ref(), ms),
                None => self.cleanup(id, Cleanup::Completed),
            }
        }

        let leftover = self.records.get(&id).is_some_and(|r| {
            !r.state.is_animating()
                && (r.state.effect.is_some() || r.unmap_count > 0 || r.destroy_count > 0)
        });
        if leftover {
            self.cleanup(id, Cleanup::Completed);
        }
        running
    }

    fn advance(&mut self, id: WindowId, effect: &dyn Effect, ms: f32) -> bool {
        let pending = self
            .with_ctx(id, false, |effect, ctx| effect.pre_prepare(ctx, ms))
            .unwrap_or(false);

        let initialized = self.records.get(&id).is_some_and(|r| r.state.initialized);
        if !initialized {
            if let Some(Err(e)) = self.with_ctx(id, false, |effect, ctx| effect.init(ctx)) {
                error!(window = ?id, effect = effect.name(), error = %e, "effect init failed");
                self.cleanup(id, Cleanup::Completed);
                return pending;
            }
        }

        let Some(outer) = self.windows.get(&id).map(|w| w.outer_rect()) else {
            return pending;
        };
        let resized = self
            .records
            .get(&id)
            .and_then(|r| r.state.model.as_ref())
            .is_some_and(|m| m.win_width != outer.width() || m.win_height != outer.height());
        if resized && !self.ensure_model(id) {
            self.cleanup(id, Cleanup::Completed);
            return pending;
        }

        let has_bb = effect.has_bounding_box();
        let is_subject = self.chains.get(id).is_some_and(|l| l.is_dodge_subject);
        let dodge = self.dodge;
        let Some(record) = self.records.get_mut(&id) else {
            return pending;
        };
        let state = &mut record.state;
        if has_bb {
            state.bb.copy_reset();
            let first_frame_covers_window = matches!(
                state.event,
                WindowEvent::Close | WindowEvent::Minimize | WindowEvent::Shade
            ) || ((state.event == WindowEvent::Focus
                || (state.effect.is_some() && state.effect == dodge))
                && !is_subject);
            if !initialized && first_frame_covers_window {
                state.bb.expand_with_box(&DamageBox::from_rect(&outer));
            }
        }
        state.initialized = true;
        state.advance_clock(ms);

        self.with_ctx(id, false, |effect, ctx| {
            effect.step(ctx, ms);
            if has_bb {
                let mut bb = ctx.state.bb.current;
                for output in &ctx.screen.outputs {
                    let projection = ScreenProjection::new(ctx.screen.height as f32, *output);
                    effect.update_bounding_box(ctx, &projection, &mut bb);
                }
                ctx.state.bb.current = bb;
            }
        });

        let Some(record) = self.records.get(&id) else {
            return pending;
        };
        if has_bb {
            let region = record.state.bb.damage();
            if !region.is_empty() {
                self.damage.push(FrameDamage { window: id, region });
            }
        }
        trace!(window = ?id, remaining = record.state.remaining_time, "stepped");
        if !record.state.is_animating() {
            self.cleanup(id, Cleanup::Completed);
        }
        pending || self.is_animating(id)
    }

    /// Turn restack notifications into focus animations
    fn process_restacks(&mut self) {
        let plugins_active = self.other_plugins_active();

        // A window raised together with its dialogs shares one old neighbour
        let mut shared_above: Option<WindowId> = None;
        for id in self.stacking.clone() {
            let Some(info) = self.chains.get(id).and_then(|l| l.restack) else {
                continue;
            };
            let busy = self
                .records
                .get(&id)
                .map_or(true, |r| r.state.event != WindowEvent::None);
            if busy || plugins_active || !self.restack_still_good(&info) {
                continue;
            }
            match shared_above {
                None => shared_above = Some(info.old_above),
                Some(above) if above != id => {
                    if let Some(r) = self.chains.entry(id).restack.as_mut() {
                        r.old_above = above;
                    }
                }
                Some(_) => {}
            }
        }

        for idx in (0..self.stacking.len()).rev() {
            let id = self.stacking[idx];
            let Some(info) = self.chains.get(id).and_then(|l| l.restack) else {
                continue;
            };
            let busy = self.records.get(&id).map_or(true, |r| {
                r.state.event != WindowEvent::None || r.state.effect.is_some()
            });
            let passing = self
                .chains
                .get(id)
                .is_some_and(|l| l.passing_through.is_some());
            if busy || passing || plugins_active || !self.restack_still_good(&info) {
                self.chains.entry(id).restack = None;
                continue;
            }

            let above = self.stacking[idx + 1..]
                .iter()
                .copied()
                .find(|w| self.relevant_for_fade_focus(*w));
            if !info.raised && above.is_none() {
                self.chains.entry(id).restack = None;
                continue;
            }
            if let Some(nw) = above {
                let host = self.chains.get(nw).and_then(|l| l.painted_before);
                if let Some(host) = host {
                    if self.chains.wont_create_circular_chain(id, nw) {
                        self.chains.entry(nw).more_prev = Some(id);
                        let links = self.chains.entry(id);
                        links.more_next = Some(nw);
                        if let Some(r) = links.restack.as_mut() {
                            r.old_above = host;
                        }
                    }
                }
            }
            self.initiate_focus(id);
        }

        // A subject whose dodgers are all subjects themselves stays put
        for id in self.stacking.clone() {
            if !self.chains.get(id).is_some_and(|l| l.is_dodge_subject) {
                continue;
            }
            let chain = self.chains.dodge_chain(id);
            let only_subjects = chain
                .iter()
                .all(|d| self.chains.get(*d).is_some_and(|l| l.is_dodge_subject));
            if only_subjects {
                self.chains.entry(id).skip_post_prepare = true;
            }
        }
    }

    fn restack_still_good(&self, info: &RestackInfo) -> bool {
        [info.start, info.end, info.old_above, info.restacked]
            .iter()
            .all(|w| self.is_visible(*w))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cleanup
    // ─────────────────────────────────────────────────────────────────────────

    fn cleanup(&mut self, id: WindowId, mode: Cleanup) {
        let Some(record) = self.records.get(&id) else {
            return;
        };
        let event = record.state.event;
        let effect_id = record.state.effect;
        let effect = self.running_effect(id);

        let damage_window = match &effect {
            Some(effect) => {
                effect.damages_window_on_cleanup()
                    || (effect.uses_custom_geometry()
                        && matches!(
                            event,
                            WindowEvent::Open
                                | WindowEvent::Unminimize
                                | WindowEvent::Unshade
                                | WindowEvent::Focus
                        ))
            }
            None => event == WindowEvent::Close,
        };
        if damage_window {
            if let (Some(window), Some(record)) = (self.windows.get(&id), self.records.get_mut(&id))
            {
                record
                    .state
                    .bb
                    .expand_with_box(&DamageBox::from_rect(&window.outer_rect()));
            }
        }

        if effect_id.is_some() && effect_id == self.focus_fade {
            let others: Vec<WindowId> = self.chains.ids().collect();
            for w in others {
                if let Some(links) = self.chains.get_mut(w) {
                    if links.passing_through == Some(id) {
                        links.passing_through = None;
                    }
                }
            }
        }

        if effect.is_some() {
            self.with_ctx(id, false, |effect, ctx| effect.cleanup(ctx));
        }

        if self.chains.get(id).is_some_and(|l| l.is_dodge_subject) {
            self.chains.clear_dodgers_subject(id);
        } else if effect_id.is_some() && effect_id == self.dodge {
            self.chains.remove_from_dodge_chain(id);
        }

        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        let region = record.state.bb.damage();
        if !region.is_empty() {
            self.damage.push(FrameDamage { window: id, region });
        }
        record.state.bb.reset();
        record.state.reset(mode.keeps_model());
        if !mode.keeps_model() {
            record.state.selection_row = None;
        }
        record.host_state = record.new_state;

        let still_running = {
            let records = &self.records;
            self.chains.chain_has_running(id, |w| {
                records.get(&w).is_some_and(|r| r.state.is_animating())
            })
        };
        if mode.dissolves_chain() || !still_running {
            self.chains.finish_paint_chain(id);
        }
        if let Some(links) = self.chains.get_mut(id) {
            links.dodge_max_amount = 0.0;
            links.restack = None;
        }
        debug!(window = ?id, ?event, ?mode, "animation cleaned up");

        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        let unmaps = std::mem::take(&mut record.unmap_count);
        let destroys = std::mem::take(&mut record.destroy_count);
        if mode.releases_unmaps() {
            for _ in 0..unmaps {
                self.outbox.push(EngineEvent::Unmap { window: id });
            }
        }
        if destroys > 0 {
            for _ in 0..destroys {
                self.outbox.push(EngineEvent::Destroy { window: id });
            }
            self.forget(id);
        }
    }

    /// Drop every trace of a destroyed window
    fn forget(&mut self, id: WindowId) {
        let busy = self
            .records
            .get(&id)
            .is_some_and(|r| r.state.effect.is_some() || r.state.is_animating());
        if busy {
            self.cleanup(id, Cleanup::Forgotten);
        }
        self.records.remove(&id);
        self.windows.remove(&id);
        self.chains.remove(id);
        self.stacking.retain(|w| *w != id);
    }

    fn release_unmap(&mut self, id: WindowId) {
        self.outbox.push(EngineEvent::Unmap { window: id });
    }

    fn set_activity(&mut self, active: bool) {
        if self.anim_in_progress == active {
            return;
        }
        self.anim_in_progress = active;
        self.outbox.push(EngineEvent::Activity { active });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Paint
    // ─────────────────────────────────────────────────────────────────────────

    /// Order in which the host paints windows this frame
    ///
    /// Plain stacking order unless a paint-reordering focus animation runs;
    /// then windows hosting a chain are preceded by it, and restacked windows
    /// appear twice (old and new position).
    pub fn paint_order(&self) -> Vec<PaintStep> {
        let reordering = self.records.iter().any(|(w, r)| {
            r.state.is_animating() && self.running_effect(*w).is_some_and(|e| e.reorders_paint())
        });
        if !reordering {
            return self
                .stacking
                .iter()
                .map(|&window| PaintStep {
                    window,
                    over_new_copy: false,
                })
                .collect();
        }
        let Some(&first) = self.stacking.first() else {
            return Vec::new();
        };

        let position: FxHashMap<WindowId, usize> = self
            .stacking
            .iter()
            .enumerate()
            .map(|(i, w)| (*w, i))
            .collect();
        let mut visits: FxHashMap<WindowId, u32> = FxHashMap::default();
        let mut over_new: FxHashSet<WindowId> = FxHashSet::default();
        let mut order = Vec::with_capacity(self.stacking.len() + 2);

        let mut cur = Some(self.chains.bottommost_in_focus_chain(first));
        while let Some(id) = cur {
            let count = visits.entry(id).or_default();
            *count += 1;
            if *count > 2 {
                warn!(window = ?id, "paint walker revisited a window; stopping");
                break;
            }
            order.push(PaintStep {
                window: id,
                over_new_copy: over_new.contains(&id),
            });
            cur = self.walk_next(id, &position, &mut over_new);
        }
        order
    }

    fn walk_next(
        &self,
        id: WindowId,
        position: &FxHashMap<WindowId, usize>,
        over_new: &mut FxHashSet<WindowId>,
    ) -> Option<WindowId> {
        if !over_new.remove(&id) {
            let chained = self
                .chains
                .get(id)
                .and_then(|l| l.more_next.or(l.painted_before));
            if chained.is_some() {
                return chained;
            }
        }
        let above = position
            .get(&id)
            .and_then(|&i| self.stacking.get(i + 1))
            .copied()?;
        if self.chains.get(above).is_some_and(|l| l.in_paint_chain()) {
            over_new.insert(above);
            Some(above)
        } else {
            Some(self.chains.bottommost_in_focus_chain(above))
        }
    }

    /// Paint instructions for one step of the paint order
    pub fn paint_window(&mut self, step: PaintStep) -> PaintDecision {
        let id = step.window;
        if !self.is_animating(id) {
            return PaintDecision::Untouched;
        }
        if !self.anim_in_progress {
            self.cleanup(id, Cleanup::Completed);
            return PaintDecision::Untouched;
        }
        let Some(effect) = self.running_effect(id) else {
            return PaintDecision::Untouched;
        };
        let effect_id = self.records.get(&id).and_then(|r| r.state.effect);
        let is_subject = self.chains.get(id).is_some_and(|l| l.is_dodge_subject);
        if effect_id == self.dodge && is_subject && step.over_new_copy {
            return PaintDecision::Skip;
        }
        let focus = self
            .records
            .get(&id)
            .is_some_and(|r| r.state.event == WindowEvent::Focus);
        if focus && self.other_plugins_active() {
            self.cleanup(id, Cleanup::Completed);
            return PaintDecision::Untouched;
        }

        let opacity = self.windows.get(&id).map_or(1.0, |w| w.opacity);
        let host_draws = effect.host_draws_geometry();
        self.with_ctx(id, step.over_new_copy, |effect, ctx| {
            let mut attributes = PaintAttributes::with_opacity(opacity);
            effect.update_attributes(ctx, &mut attributes);
            let transform = effect.update_transform(ctx, Mat4::IDENTITY);
            let mut paint = PaintInstructions::new(attributes, transform);
            paint.draw_region = ctx.state.draw_region;
            paint.host_draws_geometry = host_draws;
            effect.pre_paint(ctx, &mut paint);
            paint.sprites = effect.post_paint(ctx);
            PaintDecision::Paint(paint)
        })
        .unwrap_or(PaintDecision::Untouched)
    }

    /// Geometry to draw for an animating window, clipped to `clips`
    ///
    /// `None` when the host draws the window itself.
    pub fn add_window_geometry(&mut self, id: WindowId, clips: &[Rect]) -> Option<Geometry> {
        if !self.is_animating(id) {
            return None;
        }
        self.with_ctx(id, false, |effect, ctx| {
            if effect.is_placeholder() || effect.host_draws_geometry() {
                return None;
            }
            if effect.uses_custom_geometry() {
                return effect.custom_geometry(ctx, clips);
            }
            let clips: Vec<Rect> = match ctx.state.draw_region {
                Some(region) => clips
                    .iter()
                    .filter_map(|c| c.intersection(&region))
                    .collect(),
                None => clips.to_vec(),
            };
            let model = ctx.state.model.as_ref()?;
            Some(grid_geometry(
                model,
                ctx.window,
                &clips,
                effect.uses_3d_model(),
                effect.uses_q_tex_coord(),
            ))
        })
        .flatten()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// The window's effect, unless it is a placeholder or gone
    fn running_effect(&self, id: WindowId) -> Option<Arc<dyn Effect>> {
        let effect = self.records.get(&id)?.state.effect?;
        self.registry.effect(effect).filter(|e| !e.is_placeholder())
    }

    /// Run `f` with the window's effect and a context over its state
    fn with_ctx<R>(
        &mut self,
        id: WindowId,
        over_new_copy: bool,
        f: impl FnOnce(&dyn Effect, &mut AnimContext) -> R,
    ) -> Option<R> {
        let Self {
            ref registry,
            ref config,
            ref sets,
            ref screen,
            ref windows,
            ref mut records,
            ref mut chains,
            ref mut rng,
            pointer,
            ..
        } = *self;
        let record = records.get_mut(&id)?;
        let window = windows.get(&id)?;
        let effect = registry.effect(record.state.effect?)?;
        let no_overrides: &[(String, ParamValue)] = &[];
        let overrides = record
            .state
            .selection_row
            .and_then(|(kind, row)| sets.row(kind, row))
            .map(|r| r.overrides.as_slice())
            .unwrap_or(no_overrides);

        let mut ctx = AnimContext {
            id,
            window,
            screen,
            state: &mut record.state,
            params: ParamView::new(overrides, &config.params, registry.params()),
            rng,
            pointer,
            chains,
            windows,
            time_step: config.time_step as f32,
            perceived_time_compensation: config.perceived_time_compensation,
            over_new_copy,
        };
        Some(f(effect.as_ref(), &mut ctx))
    }

    fn never_animate(&self, window: &WindowInfo) -> bool {
        !self.config.never_animate.trim().is_empty()
            && self.matcher.evaluate(&self.config.never_animate, window)
    }

    fn other_plugins_active(&self) -> bool {
        !self.active_plugins.is_empty()
    }

    fn is_visible(&self, id: WindowId) -> bool {
        self.windows
            .get(&id)
            .is_some_and(|w| w.shaded || w.is_viewable())
    }

    fn relevant_for_fade_focus(&self, id: WindowId) -> bool {
        let Some(window) = self.windows.get(&id) else {
            return false;
        };
        matches!(
            window.kind,
            WindowKind::Dock
                | WindowKind::Splash
                | WindowKind::Normal
                | WindowKind::Dialog
                | WindowKind::Utility
                | WindowKind::Unknown
        ) && self.is_visible(id)
    }

    fn pointer_or_center(&self) -> Point {
        self.pointer.unwrap_or_else(|| self.screen.center())
    }

    /// Taskbar icon, or a tiny one under the pointer
    fn minimize_icon(&self, id: WindowId) -> Rect {
        self.windows
            .get(&id)
            .and_then(|w| w.icon_geometry)
            .unwrap_or_else(|| {
                let p = self.pointer_or_center();
                Rect::new(p.x, p.y, FAKE_ICON_SIZE, FAKE_ICON_SIZE)
            })
    }

    /// Pointer-sized icon for opens and closes, widened by the effect
    fn fake_icon(&mut self, id: WindowId, centered: bool) -> Rect {
        let p = self.pointer_or_center();
        let width = self
            .with_ctx(id, false, |effect, ctx| effect.fake_icon_width(&ctx.params))
            .flatten()
            .map_or(FAKE_ICON_SIZE, |w| w.max(FAKE_ICON_SIZE));
        let icon = Rect::new(p.x, p.y, width, FAKE_ICON_SIZE);
        if centered {
            icon.offset(-(width / 2.0).floor(), -(FAKE_ICON_SIZE / 2.0).floor())
        } else {
            icon
        }
    }
}
