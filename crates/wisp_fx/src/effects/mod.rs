//! Add-on effects
//!
//! Particle effects (Burn, Beam Up) draw sprites over the window; the rest
//! break the window into pieces through [`crate::polygon`].

pub mod airplane;
pub mod beam_up;
pub mod burn;
pub mod domino;
pub mod explode;
pub mod fold;
pub mod glide3;
pub mod leaf_spread;
pub mod skewer;

pub use airplane::Airplane;
pub use beam_up::BeamUp;
pub use burn::Burn;
pub use domino::Domino;
pub use explode::Explode;
pub use fold::Fold;
pub use glide3::Glide3;
pub use leaf_spread::LeafSpread;
pub use skewer::Skewer;

// How long each effect seems to take relative to its configured duration;
// the duration is divided by this when perceived time compensation is on.
pub const DOMINO_PERCEIVED_T: f32 = 0.8;
pub const EXPLODE_PERCEIVED_T: f32 = 0.7;
pub const FOLD_PERCEIVED_T: f32 = 0.55;
pub const LEAF_SPREAD_PERCEIVED_T: f32 = 0.6;
pub const SKEWER_PERCEIVED_T: f32 = 0.6;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::PolygonEffect;
    use crate::testing::Fixture;
    use wisp_animation::{ParamValue, WindowEvent};
    use wisp_core::{WindowId, WindowInfo};

    /// Pieces that left their rest pose when placed at progress 0
    fn moved_at_start(effect: &impl PolygonEffect, params: &[(&str, ParamValue)]) -> usize {
        let mut f = Fixture::with_window(WindowInfo::new(WindowId(1), 120, 90, 233, 157));
        for (name, value) in params {
            f.set(name, value.clone());
        }
        let set = f.placed_at_start(effect, WindowEvent::Close);
        assert!(!set.is_empty(), "{} built no pieces", effect.name());
        set.polygons
            .iter()
            .filter(|p| p.center != p.center_start || p.rot_angle != p.rot_angle_start)
            .count()
    }

    #[test]
    fn test_every_tessellation_rests_at_progress_zero() {
        for index in 0..3 {
            let params = [("explode_tessellation", ParamValue::Int(index))];
            assert_eq!(moved_at_start(&Explode, &params), 0, "tessellation {index}");
        }
    }

    #[test]
    fn test_every_choreography_rests_at_progress_zero() {
        for dir in 0..2 {
            let params = [("fold_dir", ParamValue::Int(dir))];
            assert_eq!(moved_at_start(&Fold, &params), 0, "fold_dir {dir}");
        }
        for direction in 0..10 {
            for tessellation in 0..2 {
                let params = [
                    ("skewer_direction", ParamValue::Int(direction)),
                    ("skewer_tessellation", ParamValue::Int(tessellation)),
                ];
                assert_eq!(moved_at_start(&Skewer, &params), 0, "skewer {direction}");
            }
        }
        for direction in 0..6 {
            let params = [
                ("domino_direction", ParamValue::Int(direction)),
                ("razr_direction", ParamValue::Int(direction)),
            ];
            assert_eq!(moved_at_start(&Domino::domino(), &params), 0);
            assert_eq!(moved_at_start(&Domino::razr(), &params), 0);
        }
        assert_eq!(moved_at_start(&Airplane, &[]), 0);
        assert_eq!(moved_at_start(&LeafSpread, &[]), 0);
        assert_eq!(moved_at_start(&Glide3, &[]), 0);
    }
}
