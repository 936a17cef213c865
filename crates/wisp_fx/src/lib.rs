//! Wisp FX
//!
//! Add-on effects for the Wisp animation engine: particle fire and beams,
//! and effects that break the window into pieces.
//!
//! # Features
//!
//! - **Particles**: Burn and Beam Up draw sprite systems over a window
//!   that is revealed or hidden along a moving front
//! - **Polygon engine**: rectangles, hexagons, glass shards or hand-made
//!   outlines extruded into slabs, each moving on its own path
//! - **Piece effects**: Airplane, Domino, Explode, Fold, Glide 3,
//!   Leaf Spread, Razr and Skewer
//!
//! # Example
//!
//! ```ignore
//! use wisp_animation::{AnimationConfig, Animator, EventRules};
//! use wisp_core::ScreenInfo;
//! use wisp_fx::Addon;
//!
//! let mut config = AnimationConfig::default();
//! config.close = EventRules::single("fx:Explode", 500);
//! let mut animator = Animator::new(config, ScreenInfo::new(1920, 1080));
//! animator.add_extension(&Addon)?;
//! ```

pub mod effects;
pub mod particle;
pub mod polygon;

#[cfg(test)]
mod testing;

use effects::{Airplane, BeamUp, Burn, Domino, Explode, Fold, Glide3, LeafSpread, Skewer};
use polygon::Polygons;
use std::sync::Arc;
use wisp_animation::{Effect, Extension};

/// Prefix of the add-on's qualified effect names
pub const EXTENSION_NAME: &str = "fx";

/// The add-on effect set
pub struct Addon;

impl Extension for Addon {
    fn name(&self) -> &str {
        EXTENSION_NAME
    }

    fn effects(&self) -> Vec<Arc<dyn Effect>> {
        vec![
            Arc::new(Polygons(Airplane)),
            Arc::new(BeamUp),
            Arc::new(Burn),
            Arc::new(Polygons(Domino::domino())),
            Arc::new(Polygons(Explode)),
            Arc::new(Polygons(Fold)),
            Arc::new(Polygons(Glide3)),
            Arc::new(Polygons(LeafSpread)),
            Arc::new(Polygons(Domino::razr())),
            Arc::new(Polygons(Skewer)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_animation::{
        AnimationConfig, Animator, EngineEvent, EventRules, HostEvent, PaintDecision, PaintStep,
        ParamValue, WindowEvent,
    };
    use wisp_core::{
        Mat4, Output, Point, Rect, ScreenInfo, ScreenProjection, WindowId, WindowInfo,
        DEFAULT_Z_CAMERA,
    };

    const A: WindowId = WindowId(1);

    fn animator(config: AnimationConfig) -> Animator {
        let mut anim = Animator::new(config, ScreenInfo::new(1000, 800));
        anim.add_extension(&Addon).unwrap();
        anim
    }

    fn run_until_released(anim: &mut Animator, max_frames: usize) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        for _ in 0..max_frames {
            events.extend(anim.prepare_paint(20.0).events);
            if !anim.is_animating(A) {
                break;
            }
        }
        // Activity may settle a frame later
        events.extend(anim.prepare_paint(20.0).events);
        events
    }

    #[test]
    fn test_effects_are_qualified_by_the_addon() {
        let anim = animator(AnimationConfig::empty());
        let registry = anim.registry();
        for name in ["fx:Explode", "fx:Burn", "fx:Beam Up", "fx:Razr", "fx:Glide 3"] {
            assert!(registry.lookup(name).is_some(), "{name} missing");
        }
        assert!(registry.params().get("time_step_intense").is_some());
    }

    #[test]
    fn test_explode_minimize_holds_the_unmap() {
        let mut config = AnimationConfig::empty();
        config.seed = 7;
        config.minimize = EventRules::single("fx:Explode", 350);
        let mut anim = animator(config);
        anim.handle(HostEvent::Add {
            window: WindowInfo::new(A, 100, 100, 260, 200),
        });
        let replies = anim.handle(HostEvent::Unmap {
            window: A,
            shaded: false,
            iconic: true,
        });
        assert_eq!(replies, vec![EngineEvent::Activity { active: true }]);
        assert_eq!(anim.effect_name(A), Some("Explode"));
        assert_eq!(anim.state(A).unwrap().total_time, 350.0);

        let frame = anim.prepare_paint(20.0);
        // Stretched by the perceived time of the effect once it starts
        assert!((anim.state(A).unwrap().total_time - 500.0).abs() < 0.01);
        assert!(!frame.damage.is_empty());
        let border = Rect::new(100.0, 100.0, 260.0, 200.0);
        let geometry = anim.add_window_geometry(A, &[border]).unwrap();
        assert!(geometry.depth_test);
        assert!(!geometry.faces.is_empty());

        let events = run_until_released(&mut anim, 100);
        assert!(events.contains(&EngineEvent::Unmap { window: A }));
        assert!(events.contains(&EngineEvent::Activity { active: false }));
    }

    /// Minimize `A` with `effect` and check every projected face corner against the damage
    fn pieces_inside_damage(effect: &str) -> usize {
        let mut config = AnimationConfig::empty();
        config.seed = 11;
        config.minimize = EventRules::single(effect, 400);
        let mut anim = animator(config);
        anim.handle(HostEvent::Add {
            window: WindowInfo::new(A, 300, 200, 240, 160)
                .with_icon(Rect::new(480.0, 770.0, 40.0, 30.0)),
        });
        anim.handle(HostEvent::Unmap {
            window: A,
            shaded: false,
            iconic: true,
        });

        let screen = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let projection = ScreenProjection::new(800.0, Output::new(screen));
        let mut checked = 0;
        for frame in 0..200 {
            let damage = anim.prepare_paint(16.0).damage;
            if !anim.is_animating(A) {
                break;
            }
            let region = damage
                .iter()
                .find(|d| d.window == A)
                .map(|d| d.region.clone())
                .unwrap_or_default();
            let window_transform = match anim.paint_window(PaintStep {
                window: A,
                over_new_copy: false,
            }) {
                PaintDecision::Paint(p) => p.transform,
                other => panic!("expected paint instructions, got {other:?}"),
            };
            let geometry = anim.add_window_geometry(A, &[screen]).unwrap();
            for face in &geometry.faces {
                let transform = window_transform.mul(&face.transform.unwrap_or(Mat4::IDENTITY));
                for v in &face.vertices {
                    // The host clips whatever passes the near plane
                    if transform.transform_point(v.position).z >= DEFAULT_Z_CAMERA - 0.1 {
                        continue;
                    }
                    let s = projection.project(&transform, v.position).unwrap();
                    let s = Point::new(s.x.clamp(0.0, 1000.0), s.y.clamp(0.0, 800.0));
                    let inside = region.iter().any(|r| {
                        s.x >= r.x as f32
                            && s.x <= (r.x + r.width) as f32
                            && s.y >= r.y as f32
                            && s.y <= (r.y + r.height) as f32
                    });
                    assert!(inside, "{effect} frame {frame}: {s:?} outside {region:?}");
                    checked += 1;
                }
            }
        }
        checked
    }

    #[test]
    fn test_explode_damage_covers_flying_pieces() {
        assert!(pieces_inside_damage("fx:Explode") > 0);
    }

    #[test]
    fn test_fold_damage_covers_folding_pieces() {
        assert!(pieces_inside_damage("fx:Fold") > 0);
    }

    #[test]
    fn test_burn_close_smoulders_then_releases() {
        let mut config = AnimationConfig::empty().with_param("fire_smoke", ParamValue::Bool(false));
        config.close = EventRules::single("fx:Burn", 300);
        let mut anim = animator(config);
        anim.handle(HostEvent::Add {
            window: WindowInfo::new(A, 100, 100, 200, 150),
        });
        anim.handle(HostEvent::Withdraw { window: A });
        assert_eq!(anim.state(A).unwrap().event, WindowEvent::Close);

        let events = run_until_released(&mut anim, 1000);
        assert!(events.contains(&EngineEvent::Unmap { window: A }));
        assert!(!anim.is_animating(A));
    }
}
