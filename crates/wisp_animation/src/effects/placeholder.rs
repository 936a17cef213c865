//! `None` and `Random`
//!
//! Selectable in rule rows but never run: `None` disables the animation and
//! `Random` is replaced by a drawn effect when the animation starts.

use crate::effect::Effect;
use crate::event::EventSet;

pub struct NoneEffect;

impl Effect for NoneEffect {
    fn name(&self) -> &'static str {
        "None"
    }

    fn events(&self) -> EventSet {
        EventSet::ALL
    }

    fn is_placeholder(&self) -> bool {
        true
    }

    fn has_bounding_box(&self) -> bool {
        false
    }
}

pub struct RandomEffect;

impl Effect for RandomEffect {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn events(&self) -> EventSet {
        EventSet::ALL_BUT_FOCUS
    }

    fn is_placeholder(&self) -> bool {
        true
    }

    fn has_bounding_box(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[test]
    fn test_random_never_applies_to_focus() {
        assert!(!RandomEffect.events().contains(EventKind::Focus));
        assert!(NoneEffect.events().contains(EventKind::Focus));
    }
}
