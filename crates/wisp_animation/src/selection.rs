//! Event to effect selection
//!
//! [`EffectSets`] is rebuilt from the configuration whenever it or the
//! registry changes. Each event kind gets its rule rows resolved against the
//! registry (effect id, duration, parsed option overrides) plus the pool the
//! `Random` effect draws from.

use crate::config::AnimationConfig;
use crate::event::EventKind;
use crate::matching::WindowMatcher;
use crate::options::{parse_overrides, OverrideSet};
use crate::registry::{EffectId, EffectRegistry};
use tracing::error;
use wisp_core::{Rng, WindowInfo};

/// What a rule row asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Do not animate
    Skip,
    /// Draw an effect when the animation starts
    Random,
    Effect(EffectId),
}

/// One resolved configuration row
#[derive(Clone, Debug)]
pub struct RuleRow {
    pub selection: Selection,
    /// Duration in ms
    pub duration: u32,
    pub matches: String,
    pub overrides: OverrideSet,
}

#[derive(Clone, Debug, Default)]
struct EventEffects {
    rows: Vec<RuleRow>,
    random_pool: Vec<EffectId>,
    /// Row lists had matching lengths
    consistent: bool,
}

/// Resolved rule rows of every event kind
#[derive(Clone, Debug, Default)]
pub struct EffectSets {
    events: [EventEffects; EventKind::COUNT],
}

impl EffectSets {
    /// Resolve the configuration against the registry
    ///
    /// Problems are logged once here: a row-count mismatch disables the
    /// event, an unknown or disallowed effect makes its row a no-op and a bad
    /// override string drops that row's overrides.
    pub fn build(
        config: &AnimationConfig,
        registry: &EffectRegistry,
        matcher: &mut dyn WindowMatcher,
    ) -> EffectSets {
        let mut sets = EffectSets::default();

        for kind in EventKind::ALL {
            let rules = config.rules(kind);
            let entry = &mut sets.events[kind.index()];
            entry.consistent = rules.is_consistent();
            if !entry.consistent {
                error!(
                    "Animation settings mismatch in \"Animation Selection\" list for {} event.",
                    kind.name()
                );
            }

            let n = rules.effects.len();
            for i in 0..n {
                let name = &rules.effects[i];
                let selection = match registry.lookup(name) {
                    Some(id) if id == registry.none_id() => Selection::Skip,
                    Some(id) if id == registry.random_id() && kind.has_random_pool() => {
                        Selection::Random
                    }
                    Some(id) if registry.is_allowed(kind, id) => Selection::Effect(id),
                    Some(_) => {
                        error!(effect = %name, event = kind.name(), "effect not allowed for event");
                        Selection::Skip
                    }
                    None => {
                        error!(effect = %name, event = kind.name(), "unknown effect");
                        Selection::Skip
                    }
                };

                let matches = rules.matches.get(i).cloned().unwrap_or_default();
                if let Err(e) = matcher.prepare(&matches) {
                    error!(event = kind.name(), row = i, error = %e, "bad match expression");
                }

                let overrides = match rules.options.get(i) {
                    Some(text) => parse_overrides(text, registry.params()).unwrap_or_else(|e| {
                        error!(event = kind.name(), row = i, "{e}");
                        OverrideSet::new()
                    }),
                    None => OverrideSet::new(),
                };

                let duration = match rules.durations.get(i) {
                    Some(&d) if d > 0 => d,
                    _ => config.default_duration,
                };

                entry.rows.push(RuleRow {
                    selection,
                    duration,
                    matches,
                    overrides,
                });
            }

            if kind.has_random_pool() {
                for name in &rules.random_effects {
                    match registry.lookup(name) {
                        Some(id)
                            if registry.is_allowed(kind, id)
                                && id != registry.none_id()
                                && id != registry.random_id() =>
                        {
                            entry.random_pool.push(id)
                        }
                        _ => error!(effect = %name, event = kind.name(), "bad random pool entry"),
                    }
                }
            }
        }
        sets
    }

    /// First row whose match expression accepts the window
    ///
    /// Returns the row index; `None` means "do not animate".
    pub fn select(
        &self,
        kind: EventKind,
        window: &WindowInfo,
        matcher: &dyn WindowMatcher,
    ) -> Option<(usize, &RuleRow)> {
        let entry = &self.events[kind.index()];
        if !entry.consistent {
            return None;
        }
        entry
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| matcher.evaluate(&row.matches, window))
    }

    pub fn row(&self, kind: EventKind, index: usize) -> Option<&RuleRow> {
        self.events[kind.index()].rows.get(index)
    }

    pub fn random_pool(&self, kind: EventKind) -> &[EffectId] {
        &self.events[kind.index()].random_pool
    }
}

/// Pick the effect a `Random` row (or "all random") plays
///
/// Draws uniformly from the configured pool, or from every allowed effect
/// except the placeholders when the pool is empty.
pub fn pick_random(
    kind: EventKind,
    sets: &EffectSets,
    registry: &EffectRegistry,
    rng: &mut Rng,
) -> Option<EffectId> {
    let pool = sets.random_pool(kind);
    if !pool.is_empty() {
        return Some(pool[rng.below(pool.len())]);
    }
    let candidates: Vec<EffectId> = registry
        .allowed(kind)
        .iter()
        .copied()
        .filter(|id| *id != registry.none_id() && *id != registry.random_id())
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.below(candidates.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventRules;
    use crate::matching::ExprMatcher;
    use wisp_core::{WindowId, WindowKind};

    fn build(config: &AnimationConfig) -> (EffectSets, EffectRegistry, ExprMatcher) {
        let registry = EffectRegistry::new();
        let mut matcher = ExprMatcher::new();
        let sets = EffectSets::build(config, &registry, &mut matcher);
        (sets, registry, matcher)
    }

    #[test]
    fn test_first_matching_row_wins() {
        let mut config = AnimationConfig::empty();
        config.minimize.push_row("Zoom", 300, "type=dialog", "");
        config.minimize.push_row("Magic Lamp", 250, "any", "magic_lamp_grid_res=20");
        let (sets, registry, matcher) = build(&config);

        let w = WindowInfo::new(WindowId(1), 0, 0, 10, 10);
        let (row, rule) = sets.select(EventKind::Minimize, &w, &matcher).unwrap();
        assert_eq!(row, 1);
        assert_eq!(rule.selection, Selection::Effect(registry.lookup("Magic Lamp").unwrap()));
        assert_eq!(rule.duration, 250);
        assert_eq!(rule.overrides.len(), 1);

        let dialog = w.with_kind(WindowKind::Dialog);
        assert_eq!(sets.select(EventKind::Minimize, &dialog, &matcher).unwrap().0, 0);
    }

    #[test]
    fn test_no_match_means_no_animation() {
        let (sets, _, matcher) = build(&AnimationConfig::empty());
        let w = WindowInfo::new(WindowId(1), 0, 0, 10, 10);
        assert!(sets.select(EventKind::Close, &w, &matcher).is_none());
    }

    #[test]
    fn test_mismatched_lists_disable_the_event() {
        let mut config = AnimationConfig::empty();
        config.open = EventRules::single("Fade", 100);
        config.open.durations.push(50);
        let (sets, _, matcher) = build(&config);
        let w = WindowInfo::new(WindowId(1), 0, 0, 10, 10);
        assert!(sets.select(EventKind::Open, &w, &matcher).is_none());
    }

    #[test]
    fn test_unknown_and_disallowed_effects_skip() {
        let mut config = AnimationConfig::empty();
        config.focus = EventRules::single("Magic Lamp", 100);
        config.open = EventRules::single("Nonexistent", 100);
        let (sets, _, _) = build(&config);
        assert_eq!(sets.row(EventKind::Focus, 0).unwrap().selection, Selection::Skip);
        assert_eq!(sets.row(EventKind::Open, 0).unwrap().selection, Selection::Skip);
    }

    #[test]
    fn test_random_draws_from_pool() {
        let mut config = AnimationConfig::empty();
        config.close = EventRules::single("Random", 100);
        config.close.random_effects = vec!["Fade".into()];
        let (sets, registry, _) = build(&config);
        assert_eq!(sets.row(EventKind::Close, 0).unwrap().selection, Selection::Random);

        let mut rng = Rng::new(3);
        let fade = registry.lookup("Fade").unwrap();
        for _ in 0..10 {
            assert_eq!(pick_random(EventKind::Close, &sets, &registry, &mut rng), Some(fade));
        }
    }

    #[test]
    fn test_random_without_pool_avoids_placeholders() {
        let (sets, registry, _) = build(&AnimationConfig::empty());
        let mut rng = Rng::new(9);
        for _ in 0..50 {
            let id = pick_random(EventKind::Open, &sets, &registry, &mut rng).unwrap();
            assert_ne!(id, registry.none_id());
            assert_ne!(id, registry.random_id());
            assert!(registry.is_allowed(EventKind::Open, id));
        }
    }

    #[test]
    fn test_zero_duration_uses_default() {
        let mut config = AnimationConfig::empty();
        config.open = EventRules::single("Fade", 0);
        config.default_duration = 222;
        let (sets, _, _) = build(&config);
        assert_eq!(sets.row(EventKind::Open, 0).unwrap().duration, 222);
    }
}
