//! Scripted window-event timelines
//!
//! A scenario file is TOML:
//!
//! ```toml
//! [screen]
//! width = 1280
//! height = 800
//!
//! [[steps]]
//! frame = 0
//! event = { type = "add", window = { id = 1, x = 100, y = 100, width = 400, height = 300 } }
//!
//! [[steps]]
//! frame = 2
//! event = { type = "unmap", window = 1, iconic = true }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use wisp_animation::HostEvent;
use wisp_core::ScreenInfo;

/// A timeline replayed against the engine
#[derive(Debug, Deserialize, Serialize)]
pub struct Scenario {
    #[serde(default)]
    pub screen: ScreenSpec,
    /// Overrides the configuration's random seed
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ScreenSpec {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
}

impl Default for ScreenSpec {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_width() -> i32 {
    1920
}

fn default_height() -> i32 {
    1080
}

impl ScreenSpec {
    pub fn info(&self) -> ScreenInfo {
        ScreenInfo::new(self.width, self.height)
    }
}

/// One host event delivered before the given frame is prepared
#[derive(Debug, Deserialize, Serialize)]
pub struct Step {
    #[serde(default)]
    pub frame: usize,
    pub event: HostEvent,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut scenario: Scenario = toml::from_str(content)?;
        // Stable: steps sharing a frame keep file order
        scenario.steps.sort_by_key(|s| s.frame);
        Ok(scenario)
    }

    /// Frame of the last scripted event
    pub fn last_frame(&self) -> usize {
        self.steps.iter().map(|s| s.frame).max().unwrap_or(0)
    }

    /// Events due at `frame`
    pub fn due(&self, frame: usize) -> impl Iterator<Item = &HostEvent> {
        self.steps
            .iter()
            .filter(move |s| s.frame == frame)
            .map(|s| &s.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_core::WindowId;

    const SCENARIO: &str = r#"
        seed = 3

        [[steps]]
        frame = 4
        event = { type = "unmap", window = 1, iconic = true }

        [[steps]]
        event = { type = "add", window = { id = 1, x = 10, y = 20, width = 300, height = 200 } }
    "#;

    #[test]
    fn test_parse_orders_steps_by_frame() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        assert_eq!(scenario.seed, Some(3));
        assert_eq!(scenario.screen.width, 1920);
        assert_eq!(scenario.last_frame(), 4);

        let first: Vec<_> = scenario.due(0).collect();
        match first.as_slice() {
            [HostEvent::Add { window }] => {
                assert_eq!(window.id, WindowId(1));
                assert_eq!((window.width, window.height), (300, 200));
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert!(matches!(
            scenario.due(4).next(),
            Some(HostEvent::Unmap { iconic: true, .. })
        ));
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let err = Scenario::parse("[[steps]]\nevent = { type = \"explode\" }\n");
        assert!(err.is_err());
    }
}
