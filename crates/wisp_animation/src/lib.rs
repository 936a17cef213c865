//! Wisp Animation Engine
//!
//! Window event animations for a compositing window manager: windows opening,
//! closing, minimizing, shading and changing focus.
//!
//! # Features
//!
//! - **Animator**: per-screen engine driven by host events and frame ticks
//! - **Effects**: Zoom, Magic Lamp, Roll Up, Fade, Dodge, Focus Fade and more,
//!   behind one [`Effect`] trait
//! - **Extensions**: third-party effect sets register and unregister at runtime
//! - **Rule tables**: per-event effect selection by window match expression,
//!   with per-row parameter overrides
//! - **Dodge and paint chains**: raised windows push others aside and are
//!   painted in their old stacking position until the dodgers pass
//! - **Damage tracking**: per-window bounding boxes projected through the
//!   effect transform onto every output
//!
//! # Example
//!
//! ```ignore
//! use wisp_animation::{AnimationConfig, Animator, HostEvent};
//! use wisp_core::{ScreenInfo, WindowId, WindowInfo};
//!
//! let mut animator = Animator::new(AnimationConfig::default(), ScreenInfo::new(1920, 1080));
//! animator.handle(HostEvent::Add { window: WindowInfo::new(WindowId(1), 0, 0, 640, 480) });
//! animator.handle(HostEvent::Damage { window: WindowId(1), initial: true });
//! while animator.done_paint() {
//!     let frame = animator.prepare_paint(16.0);
//!     for step in animator.paint_order() {
//!         let _decision = animator.paint_window(step);
//!     }
//! #   let _ = frame;
//! }
//! ```

pub mod chain;
pub mod config;
pub mod direction;
pub mod effect;
pub mod effects;
pub mod engine;
pub mod event;
pub mod host;
pub mod matching;
pub mod mesh;
pub mod model;
pub mod options;
pub mod paint;
pub mod progress;
pub mod registry;
pub mod restack;
pub mod selection;
pub mod state;

#[cfg(test)]
mod testing;

pub use chain::{ChainLinks, ChainRegistry, DodgeDirection};
pub use config::{AnimationConfig, EventRules};
pub use direction::AnimDirection;
pub use effect::{AnimContext, Effect, ZoomStyle};
pub use engine::{Animator, Frame, FAKE_ICON_SIZE};
pub use event::{EventKind, EventSet, Playback, WindowEvent};
pub use host::{EngineEvent, HostEvent, WatchedPlugin};
pub use matching::{ExprMatcher, MatchExpr, WindowMatcher};
pub use mesh::{Face, Geometry, Sprite, Vertex};
pub use model::{GridPoint, GridSize, Model};
pub use options::{ParamKind, ParamSpec, ParamTable, ParamValue, ParamView};
pub use paint::{FrameDamage, PaintAttributes, PaintDecision, PaintInstructions, PaintStep};
pub use registry::{EffectId, EffectRegistry, Extension, ExtensionId, BUILTIN_EXTENSION};
pub use restack::RestackInfo;
pub use state::AnimationState;
