//! Host notifications and engine replies
//!
//! The host compositor forwards window lifecycle changes as [`HostEvent`]s and
//! receives [`EngineEvent`]s for work the engine deferred: unmaps and destroys
//! held back while a closing animation plays, and the "animation in
//! progress" flag other plugins listen to.

use serde::{Deserialize, Serialize};
use wisp_core::{Point, WindowId, WindowInfo};

/// Plugins whose activity suppresses focus and open/close animations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchedPlugin {
    Switcher,
    Ring,
    Shift,
    Scale,
    GroupTabChange,
    FadeDesktop,
}

impl WatchedPlugin {
    /// Switchers leave a short grace window after they close
    pub fn is_switcher(self) -> bool {
        matches!(
            self,
            WatchedPlugin::Switcher
                | WatchedPlugin::Ring
                | WatchedPlugin::Shift
                | WatchedPlugin::Scale
        )
    }
}

/// Window lifecycle change reported by the host
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// A window became known (before its first map)
    Add { window: WindowInfo },
    /// Window mapped again
    Map { window: WindowId },
    /// Window is being unmapped; `iconic` when it is minimizing
    Unmap {
        window: WindowId,
        #[serde(default)]
        shaded: bool,
        #[serde(default)]
        iconic: bool,
    },
    /// Window withdrawn (closing)
    Withdraw { window: WindowId },
    Destroy { window: WindowId },
    /// First damage after a map; `initial` on the first paint of a new mapping
    Damage {
        window: WindowId,
        #[serde(default)]
        initial: bool,
    },
    /// Client stacking order, bottom to top
    Restack { stacking: Vec<WindowId> },
    ActiveWindow { window: WindowId },
    /// Geometry changed; carries the updated snapshot
    Resize { window: WindowInfo },
    Move {
        window: WindowId,
        dx: i32,
        dy: i32,
        #[serde(default)]
        immediate: bool,
    },
    Grab { window: WindowId },
    Ungrab { window: WindowId },
    PluginActivation { plugin: WatchedPlugin, active: bool },
    Pointer { position: Point },
    /// Window state flags changed (shaded, minimized, hidden...)
    Update { window: WindowInfo },
}

/// Work handed back to the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Perform an unmap that was held back for an animation
    Unmap { window: WindowId },
    /// Perform a destroy that was held back for an animation
    Destroy { window: WindowId },
    /// The "animation in progress" flag changed
    Activity { active: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switchers_are_distinguished() {
        assert!(WatchedPlugin::Ring.is_switcher());
        assert!(!WatchedPlugin::FadeDesktop.is_switcher());
    }

    #[test]
    fn test_host_event_from_toml_style_table() {
        let ev: HostEvent =
            serde_json::from_str(r#"{"type":"unmap","window":3,"iconic":true}"#).unwrap();
        assert_eq!(
            ev,
            HostEvent::Unmap {
                window: WindowId(3),
                shaded: false,
                iconic: true
            }
        );
    }
}
