//! Animation direction resolution

use crate::effect::AnimContext;
use serde::{Deserialize, Serialize};

/// Direction an effect travels in (Glide 3, Burn, Leaf Spread...)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimDirection {
    Up,
    Down,
    Left,
    Right,
    Random,
    /// Away from the icon (or toward it for closing events)
    #[default]
    Auto,
}

impl AnimDirection {
    pub fn from_index(index: i64) -> AnimDirection {
        match index {
            0 => AnimDirection::Up,
            1 => AnimDirection::Down,
            2 => AnimDirection::Left,
            3 => AnimDirection::Right,
            4 => AnimDirection::Random,
            _ => AnimDirection::Auto,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, AnimDirection::Left | AnimDirection::Right)
    }

    fn opposite(self) -> AnimDirection {
        match self {
            AnimDirection::Up => AnimDirection::Down,
            AnimDirection::Down => AnimDirection::Up,
            AnimDirection::Left => AnimDirection::Right,
            AnimDirection::Right => AnimDirection::Left,
            other => other,
        }
    }

    /// Concrete direction for the running animation
    ///
    /// `open_direction` selects the "away from the icon" sense; closing
    /// events travel the opposite way.
    pub fn resolve(self, ctx: &mut AnimContext, open_direction: bool) -> AnimDirection {
        match self {
            AnimDirection::Random => AnimDirection::from_index(ctx.rng.below(4) as i64),
            AnimDirection::Auto => {
                let border = ctx.window.border_rect();
                let center = border.center();
                let icon = ctx.state.icon;
                let resolved = if ctx.state.event.is_minimize() {
                    if icon.y() < ctx.screen.height as f32 - icon.y() {
                        AnimDirection::Down
                    } else {
                        AnimDirection::Up
                    }
                } else {
                    let rel_x = if border.width() > 0.0 {
                        (center.x - icon.x()) / border.width()
                    } else {
                        0.0
                    };
                    let rel_y = if border.height() > 0.0 {
                        (center.y - icon.y()) / border.height()
                    } else {
                        0.0
                    };
                    if rel_y.abs() > rel_x.abs() {
                        if rel_y > 0.0 {
                            AnimDirection::Down
                        } else {
                            AnimDirection::Up
                        }
                    } else if rel_x > 0.0 {
                        AnimDirection::Right
                    } else {
                        AnimDirection::Left
                    }
                };
                if open_direction {
                    resolved
                } else {
                    resolved.opposite()
                }
            }
            concrete => concrete,
        }
    }
}
