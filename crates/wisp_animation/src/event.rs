//! Window events and animation directions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical window event an animation plays for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowEvent {
    #[default]
    None,
    Open,
    Close,
    Minimize,
    Unminimize,
    Shade,
    Unshade,
    Focus,
}

impl WindowEvent {
    /// Rule rows this event is configured by
    ///
    /// Minimize/Unminimize share the minimize rows and Shade/Unshade the shade rows.
    pub fn kind(self) -> Option<EventKind> {
        match self {
            WindowEvent::None => None,
            WindowEvent::Open => Some(EventKind::Open),
            WindowEvent::Close => Some(EventKind::Close),
            WindowEvent::Minimize | WindowEvent::Unminimize => Some(EventKind::Minimize),
            WindowEvent::Shade | WindowEvent::Unshade => Some(EventKind::Shade),
            WindowEvent::Focus => Some(EventKind::Focus),
        }
    }

    /// The event that plays the same animation backwards
    pub fn inverse(self) -> Option<WindowEvent> {
        match self {
            WindowEvent::Open => Some(WindowEvent::Close),
            WindowEvent::Close => Some(WindowEvent::Open),
            WindowEvent::Minimize => Some(WindowEvent::Unminimize),
            WindowEvent::Unminimize => Some(WindowEvent::Minimize),
            WindowEvent::Shade => Some(WindowEvent::Unshade),
            WindowEvent::Unshade => Some(WindowEvent::Shade),
            WindowEvent::None | WindowEvent::Focus => None,
        }
    }

    /// Events whose default progress runs from 1 down to 0
    pub fn runs_backwards(self) -> bool {
        matches!(
            self,
            WindowEvent::Open | WindowEvent::Unminimize | WindowEvent::Unshade | WindowEvent::Focus
        )
    }

    pub fn is_shade(self) -> bool {
        matches!(self, WindowEvent::Shade | WindowEvent::Unshade)
    }

    pub fn is_minimize(self) -> bool {
        matches!(self, WindowEvent::Minimize | WindowEvent::Unminimize)
    }

    pub fn is_open_or_close(self) -> bool {
        matches!(self, WindowEvent::Open | WindowEvent::Close)
    }

    /// Direction the event moves the window in when it plays forward
    pub fn natural_direction(self) -> ProgressDirection {
        match self {
            WindowEvent::Open | WindowEvent::Unminimize => ProgressDirection::Reveal,
            _ => ProgressDirection::Hide,
        }
    }
}

impl fmt::Display for WindowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowEvent::None => "none",
            WindowEvent::Open => "open",
            WindowEvent::Close => "close",
            WindowEvent::Minimize => "minimize",
            WindowEvent::Unminimize => "unminimize",
            WindowEvent::Shade => "shade",
            WindowEvent::Unshade => "unshade",
            WindowEvent::Focus => "focus",
        };
        f.write_str(name)
    }
}

/// Configuration event class (one rule table each)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Open,
    Close,
    Minimize,
    Shade,
    Focus,
}

impl EventKind {
    pub const COUNT: usize = 5;

    pub const ALL: [EventKind; EventKind::COUNT] = [
        EventKind::Open,
        EventKind::Close,
        EventKind::Minimize,
        EventKind::Shade,
        EventKind::Focus,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Open => "open",
            EventKind::Close => "close",
            EventKind::Minimize => "minimize",
            EventKind::Shade => "shade",
            EventKind::Focus => "focus",
        }
    }

    /// Focus rows have no random pool and never draw a random effect
    pub fn has_random_pool(self) -> bool {
        self != EventKind::Focus
    }
}

/// Set of event kinds an effect applies to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EventSet(u8);

impl EventSet {
    pub const EMPTY: EventSet = EventSet(0);
    pub const ALL: EventSet = EventSet(0b1_1111);
    /// Every event but focus
    pub const ALL_BUT_FOCUS: EventSet = EventSet(0b0_1111);
    /// Open, close and minimize
    pub const OPEN_CLOSE_MINIMIZE: EventSet = EventSet(0b0_0111);

    pub const fn with(self, kind: EventKind) -> EventSet {
        EventSet(self.0 | (1 << kind as u8))
    }

    pub const fn contains(self, kind: EventKind) -> bool {
        self.0 & (1 << kind as u8) != 0
    }

    pub fn iter(self) -> impl Iterator<Item = EventKind> {
        EventKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

/// Whether progress runs in the event's natural direction
///
/// Reversing a running animation (an event interrupting its own inverse)
/// toggles playback, so a chain of interruptions always resolves to one of
/// two unambiguous states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Playback {
    #[default]
    Forward,
    Reversed,
}

impl Playback {
    pub fn toggled(self) -> Playback {
        match self {
            Playback::Forward => Playback::Reversed,
            Playback::Reversed => Playback::Forward,
        }
    }
}

/// Visual direction of an animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressDirection {
    /// Toward hidden (close, minimize)
    Hide,
    /// Toward visible (open, unminimize)
    Reveal,
}

impl ProgressDirection {
    pub fn flipped(self) -> ProgressDirection {
        match self {
            ProgressDirection::Hide => ProgressDirection::Reveal,
            ProgressDirection::Reveal => ProgressDirection::Hide,
        }
    }

    /// Resolve the direction an event actually animates in
    pub fn resolve(event: WindowEvent, playback: Playback) -> ProgressDirection {
        match playback {
            Playback::Forward => event.natural_direction(),
            Playback::Reversed => event.natural_direction().flipped(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_pairs() {
        for event in [
            WindowEvent::Open,
            WindowEvent::Close,
            WindowEvent::Minimize,
            WindowEvent::Unminimize,
            WindowEvent::Shade,
            WindowEvent::Unshade,
        ] {
            let inverse = event.inverse().unwrap();
            assert_eq!(inverse.inverse(), Some(event));
            if !event.is_open_or_close() {
                assert_eq!(inverse.kind(), event.kind());
            }
        }
        assert_eq!(WindowEvent::Focus.inverse(), None);
    }

    #[test]
    fn test_event_set() {
        let set = EventSet::EMPTY.with(EventKind::Open).with(EventKind::Focus);
        assert!(set.contains(EventKind::Open));
        assert!(set.contains(EventKind::Focus));
        assert!(!set.contains(EventKind::Close));
        assert_eq!(set.iter().count(), 2);
        assert!(!EventSet::ALL_BUT_FOCUS.contains(EventKind::Focus));
        assert!(EventSet::ALL_BUT_FOCUS.contains(EventKind::Shade));
    }

    #[test]
    fn test_reversed_playback_flips_direction() {
        assert_eq!(
            ProgressDirection::resolve(WindowEvent::Unminimize, Playback::Forward),
            ProgressDirection::Reveal
        );
        assert_eq!(
            ProgressDirection::resolve(WindowEvent::Unminimize, Playback::Reversed),
            ProgressDirection::Hide
        );
        assert_eq!(Playback::Forward.toggled().toggled(), Playback::Forward);
    }
}
