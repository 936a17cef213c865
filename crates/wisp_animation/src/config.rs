//! Animation configuration
//!
//! Loaded from TOML. Each event class has its own rule table made of parallel
//! lists (one entry per row):
//!
//! ```toml
//! time_step = 10
//!
//! [minimize]
//! effects = ["Magic Lamp"]
//! durations = [300]
//! matches = ["type=normal | type=dialog"]
//! options = ["magic_lamp_grid_res=60"]
//!
//! [params]
//! zoom_springiness = 0.1
//! ```

use crate::event::EventKind;
use crate::options::ParamValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use wisp_core::{Result, WispError};

// =============================================================================
// Rule rows
// =============================================================================

/// Rule rows of one event class
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRules {
    /// Effect name per row (`"Zoom"` or `"fx:Burn"`)
    pub effects: Vec<String>,
    /// Duration per row in ms
    pub durations: Vec<u32>,
    /// Window match expression per row
    pub matches: Vec<String>,
    /// Option override string per row
    pub options: Vec<String>,
    /// Pool the Random effect draws from (every allowed effect when empty)
    pub random_effects: Vec<String>,
}

impl EventRules {
    /// One row applying `effect` to every window
    pub fn single(effect: &str, duration: u32) -> Self {
        Self {
            effects: vec![effect.to_string()],
            durations: vec![duration],
            matches: vec!["any".to_string()],
            options: vec![String::new()],
            random_effects: Vec::new(),
        }
    }

    /// Append a row
    pub fn push_row(&mut self, effect: &str, duration: u32, matches: &str, options: &str) {
        self.effects.push(effect.to_string());
        self.durations.push(duration);
        self.matches.push(matches.to_string());
        self.options.push(options.to_string());
    }

    pub fn row_count(&self) -> usize {
        self.effects.len()
    }

    /// Whether every list has one entry per row
    pub fn is_consistent(&self) -> bool {
        let n = self.effects.len();
        self.durations.len() == n && self.matches.len() == n && self.options.len() == n
    }
}

// =============================================================================
// Screen configuration
// =============================================================================

/// Complete engine configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Replace every selected effect with a random one
    pub all_random: bool,
    /// Simulation step in ms
    pub time_step: u32,
    /// Stretch durations of effects that look faster than they are
    pub perceived_time_compensation: bool,
    /// Windows matching this never animate
    pub never_animate: String,
    /// Duration used for rows without one
    pub default_duration: u32,
    /// Seed of the effects' random source
    pub seed: u64,

    pub open: EventRules,
    pub close: EventRules,
    pub minimize: EventRules,
    pub shade: EventRules,
    pub focus: EventRules,

    /// Screen-wide effect parameter values
    pub params: IndexMap<String, ParamValue>,
}

const TRANSIENT_MATCH: &str = "type=menu | type=popup_menu | type=dropdown_menu | type=tooltip \
                               | type=notification | type=combo | type=dnd";
const REGULAR_MATCH: &str =
    "(type=normal | type=dialog | type=modal_dialog | type=unknown) & !name=gnome-screensaver";

const MANAGED_MATCH: &str =
    "type=normal | type=dialog | type=modal_dialog | type=utility | type=unknown";

impl Default for AnimationConfig {
    fn default() -> Self {
        let mut open = EventRules::default();
        open.push_row("Zoom", 200, REGULAR_MATCH, "");
        open.push_row("Fade", 150, TRANSIENT_MATCH, "");

        let mut close = EventRules::default();
        close.push_row("Zoom", 200, REGULAR_MATCH, "");
        close.push_row("Fade", 150, TRANSIENT_MATCH, "");

        let mut minimize = EventRules::default();
        minimize.push_row("Magic Lamp", 300, MANAGED_MATCH, "");

        let mut shade = EventRules::default();
        shade.push_row("Roll Up", 300, "any", "");

        let mut focus = EventRules::default();
        focus.push_row("None", 300, MANAGED_MATCH, "");

        Self {
            open,
            close,
            minimize,
            shade,
            focus,
            all_random: false,
            time_step: 10,
            perceived_time_compensation: true,
            never_animate: "type=desktop".to_string(),
            default_duration: 200,
            seed: 0x5EED,
            params: IndexMap::new(),
        }
    }
}

impl AnimationConfig {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: AnimationConfig =
            toml::from_str(s).map_err(|e| WispError::Config(e.to_string()))?;
        if config.time_step == 0 {
            return Err(WispError::Config("time_step must be at least 1 ms".into()));
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| WispError::Config(e.to_string()))
    }

    pub fn rules(&self, kind: EventKind) -> &EventRules {
        match kind {
            EventKind::Open => &self.open,
            EventKind::Close => &self.close,
            EventKind::Minimize => &self.minimize,
            EventKind::Shade => &self.shade,
            EventKind::Focus => &self.focus,
        }
    }

    pub fn rules_mut(&mut self, kind: EventKind) -> &mut EventRules {
        match kind {
            EventKind::Open => &mut self.open,
            EventKind::Close => &mut self.close,
            EventKind::Minimize => &mut self.minimize,
            EventKind::Shade => &mut self.shade,
            EventKind::Focus => &mut self.focus,
        }
    }

    /// Configuration with no rows for any event
    pub fn empty() -> Self {
        Self {
            open: EventRules::default(),
            close: EventRules::default(),
            minimize: EventRules::default(),
            shade: EventRules::default(),
            focus: EventRules::default(),
            never_animate: String::new(),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, name: &str, value: ParamValue) -> Self {
        self.params.insert(name.to_ascii_lowercase(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rows_are_consistent() {
        let config = AnimationConfig::default();
        for kind in EventKind::ALL {
            assert!(config.rules(kind).is_consistent(), "{}", kind.name());
        }
        assert_eq!(config.time_step, 10);
        assert!(config.perceived_time_compensation);
    }

    #[test]
    fn test_parse_toml() {
        let config = AnimationConfig::from_toml_str(
            r#"
            time_step = 16

            [minimize]
            effects = ["Zoom"]
            durations = [300]
            matches = ["any"]
            options = ["zoom_springiness=0.0"]

            [params]
            zoom_springiness = 0.25
            magic_lamp_grid_res = 80
            "#,
        )
        .unwrap();

        assert_eq!(config.time_step, 16);
        assert_eq!(config.minimize.effects, vec!["Zoom".to_string()]);
        assert!(config.minimize.is_consistent());
        assert_eq!(config.params["zoom_springiness"], ParamValue::Float(0.25));
        assert_eq!(config.params["magic_lamp_grid_res"], ParamValue::Int(80));
        // Unspecified tables keep their defaults
        assert_eq!(config.shade.effects, vec!["Roll Up".to_string()]);
    }

    #[test]
    fn test_zero_time_step_is_rejected() {
        let err = AnimationConfig::from_toml_str("time_step = 0").unwrap_err();
        assert!(matches!(err, WispError::Config(_)));
    }

    #[test]
    fn test_mismatched_rows_detected() {
        let mut rules = EventRules::single("Fade", 100);
        assert!(rules.is_consistent());
        rules.durations.push(200);
        assert!(!rules.is_consistent());
    }
}
