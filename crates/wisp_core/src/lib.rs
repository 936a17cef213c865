//! Wisp Core
//!
//! Shared building blocks for the wisp window animation engine.
//!
//! # Features
//!
//! - **Geometry**: points, rects, 3D vectors and column-major 4x4 matrices
//! - **Damage**: integer bounding boxes with an inverted sentinel and a
//!   two-frame accumulator producing 1px-margined damage regions
//! - **Projection**: the compositor's view/perspective setup for projecting
//!   transformed geometry back to screen pixels
//! - **Window snapshots**: the host-supplied view of windows and outputs
//! - **Randomness**: a seeded generator so animations replay identically

pub mod bounds;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod random;
pub mod window;

pub use bounds::{BoundingBoxAccumulator, DamageBox, DamageRect, DamageRegion};
pub use error::{Result, WispError};
pub use geometry::{Color, Mat4, Point, Rect, Size, Vec3};
pub use projection::{Output, ScreenProjection, DEFAULT_Z_CAMERA};
pub use random::Rng;
pub use window::{Extents, ScreenInfo, WindowId, WindowInfo, WindowKind};
