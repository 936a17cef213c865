//! Dodge
//!
//! When a window is raised or lowered, the windows it passes through move out
//! of its way and come back. The restacked window is the dodge *subject*; it
//! does not move itself but its paint position walks along the dodge chain:
//! it is drawn behind the first dodger that has not yet reached the halfway
//! point of its movement.

use crate::chain::{ChainLinks, DodgeDirection};
use crate::effect::{default_step, transformed_bounding_box, AnimContext, Effect, ZoomStyle};
use crate::event::{EventKind, EventSet};
use crate::options::ParamSpec;
use std::f32::consts::PI;
use tracing::error;
use wisp_core::{DamageBox, Mat4, Rect, ScreenProjection, WindowId};

/// Distance a dodger must travel in `direction` to clear `subject`
///
/// Negative for up and left.
pub fn dodge_amount(subject: Rect, dodger: Rect, direction: DodgeDirection) -> f32 {
    match direction {
        DodgeDirection::Up => subject.y() - dodger.bottom(),
        DodgeDirection::Down => subject.bottom() - dodger.y(),
        DodgeDirection::Left => subject.x() - dodger.right(),
        DodgeDirection::Right => subject.right() - dodger.x(),
    }
}

/// Area the dodger has to avoid
///
/// The subject plus any of its dialogs that overlap the dodger's path, so a
/// window with attached transients is dodged as a whole. `None` once the
/// subject is gone.
fn dodge_box(ctx: &AnimContext, links: &ChainLinks) -> Option<Rect> {
    let subject = links.dodge_subject?;
    let subject_rect = ctx.windows.get(&subject)?.outer_rect();

    // Cover everything the dodger sweeps over during its movement
    let r = ctx.outer();
    let amount = links.dodge_max_amount.trunc();
    let path = match links.dodge_direction {
        DodgeDirection::Up => Rect::new(r.x(), r.y() + amount, r.width(), r.height() - amount),
        DodgeDirection::Down => Rect::new(r.x(), r.y(), r.width(), r.height() + amount),
        DodgeDirection::Left => Rect::new(r.x() + amount, r.y(), r.width() - amount, r.height()),
        DodgeDirection::Right => Rect::new(r.x(), r.y(), r.width() + amount, r.height()),
    };

    let related = ctx
        .chains
        .more_next_chain(subject)
        .into_iter()
        .chain(ctx.chains.more_prev_chain(subject));
    let area = related
        .filter_map(|id| ctx.windows.get(&id))
        .map(|w| w.outer_rect())
        .filter(|rect| rect.intersects(&path))
        .fold(subject_rect, |acc, rect| acc.union(&rect));
    Some(area)
}

pub struct Dodge;

impl Dodge {
    fn is_subject(ctx: &AnimContext) -> bool {
        ctx.chains.get(ctx.id).is_some_and(|l| l.is_dodge_subject)
    }
}

impl Effect for Dodge {
    fn name(&self) -> &'static str {
        "Dodge"
    }

    fn events(&self) -> EventSet {
        EventSet::EMPTY.with(EventKind::Focus)
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::float("dodge_gap_ratio", 0.5, 0.0, 1.0)]
    }

    fn host_draws_geometry(&self) -> bool {
        true
    }

    fn reorders_paint(&self) -> bool {
        true
    }

    fn damages_window_on_cleanup(&self) -> bool {
        true
    }

    fn step(&self, ctx: &mut AnimContext, _ms: f32) {
        default_step(false, ZoomStyle::Plain, ctx);

        let forward = ctx.progress();
        let start = ctx.state.transform_start_progress;
        ctx.state.transform_progress = if forward > start && start < 1.0 {
            (forward - start) / (1.0 - start)
        } else {
            0.0
        };

        let Some(links) = ctx.chains.get(ctx.id).cloned() else {
            return;
        };
        if links.is_dodge_subject {
            return;
        }

        // Follow a subject that moved while we are still on the way out
        let mut max_amount = links.dodge_max_amount;
        if ctx.state.transform_progress <= 0.5 {
            if let Some(area) = dodge_box(ctx, &links) {
                let border = ctx.window.border_rect();
                let amount = dodge_amount(area, border, links.dodge_direction);
                let same_sign =
                    (amount > 0.0 && max_amount > 0.0) || (amount < 0.0 && max_amount < 0.0);
                if same_sign && amount.abs() > max_amount.abs() {
                    max_amount = amount;
                    ctx.chains.entry(ctx.id).dodge_max_amount = amount;
                }
            }
        }

        let offset = (PI * ctx.state.transform_progress).sin() * max_amount;
        ctx.state.transform = if links.dodge_direction.is_horizontal() {
            Mat4::translation(offset, 0.0, 0.0)
        } else {
            Mat4::translation(0.0, offset, 0.0)
        };
    }

    fn post_prepare(&self, ctx: &mut AnimContext, peer_progress: &dyn Fn(WindowId) -> f32) {
        let id = ctx.id;
        let Some(links) = ctx.chains.get(id).cloned() else {
            return;
        };
        if !links.is_dodge_subject || links.skip_post_prepare {
            return;
        }
        let Some(restack) = links.restack else {
            return;
        };

        // First dodger still on its way out
        let chain = ctx.chains.dodge_chain(id);
        let host = chain.iter().copied().find(|d| peer_progress(*d) <= 0.5);

        if restack.raised {
            if host == links.painted_before {
                return;
            }
            if let Some(old) = links.painted_before {
                ctx.chains.entry(old).to_be_painted_before = None;
            }
            if let Some(h) = host {
                ctx.chains.entry(h).to_be_painted_before = Some(id);
            }
            let mut group = vec![id];
            group.extend(ctx.chains.more_next_chain(id));
            for w in group {
                ctx.chains.entry(w).painted_before = host;
            }
        } else {
            // Lowering: paint in front of `host`, i.e. behind the dodger above it
            let mut above = None;
            if let Some(h) = host {
                let prev = ctx.chains.get(h).and_then(|l| l.dodge_prev);
                above = prev.or(Some(restack.old_above));
                if let Some(a) = above.filter(|a| Some(*a) != links.painted_before) {
                    if a == id {
                        error!(window = ?id, "dodge subject would host itself");
                        above = None;
                    } else {
                        ctx.chains.entry(a).to_be_painted_before = Some(id);
                    }
                }
            }
            if let Some(old) = links.painted_before.filter(|old| Some(*old) != above) {
                ctx.chains.entry(old).to_be_painted_before = None;
            }
            ctx.chains.entry(id).painted_before = above;
        }
    }

    fn update_transform(&self, ctx: &AnimContext, transform: Mat4) -> Mat4 {
        if Self::is_subject(ctx) {
            transform
        } else {
            transform.mul(&ctx.state.transform)
        }
    }

    fn update_bounding_box(
        &self,
        ctx: &AnimContext,
        projection: &ScreenProjection,
        bb: &mut DamageBox,
    ) {
        if !Self::is_subject(ctx) {
            transformed_bounding_box(ctx, projection, bb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::WindowEvent;
    use crate::restack::RestackInfo;
    use crate::testing::Fixture;
    use wisp_core::{Vec3, WindowInfo};

    const SUBJECT: WindowId = WindowId(1);
    const D1: WindowId = WindowId(2);
    const D2: WindowId = WindowId(3);

    #[test]
    fn test_amount_per_direction() {
        let subject = Rect::new(150.0, 150.0, 200.0, 100.0);
        let dodger = Rect::new(100.0, 100.0, 200.0, 100.0);
        assert_eq!(dodge_amount(subject, dodger, DodgeDirection::Up), -50.0);
        assert_eq!(dodge_amount(subject, dodger, DodgeDirection::Down), 150.0);
        assert_eq!(dodge_amount(subject, dodger, DodgeDirection::Left), -150.0);
        assert_eq!(dodge_amount(subject, dodger, DodgeDirection::Right), 250.0);
    }

    #[test]
    fn test_dodger_moves_out_and_back() {
        let mut f = Fixture::with_window(WindowInfo::new(D1, 100, 100, 200, 100));
        f.windows
            .insert(SUBJECT, WindowInfo::new(SUBJECT, 150, 150, 200, 100));
        {
            let links = f.chains.entry(D1);
            links.dodge_subject = Some(SUBJECT);
            links.dodge_direction = DodgeDirection::Up;
            links.dodge_max_amount = -50.0;
        }
        f.chains.entry(SUBJECT).is_dodge_subject = true;
        f.start(WindowEvent::Focus, 210.0);

        // Halfway: the full amount
        f.state.remaining_time = 100.0;
        Dodge.step(&mut f.ctx(), 10.0);
        let p = f.state.transform.transform_point(Vec3::ZERO);
        assert!((p.y + 50.0).abs() < 1e-3 && p.x.abs() < 1e-3);

        // End: back in place
        f.state.remaining_time = 0.0;
        Dodge.step(&mut f.ctx(), 10.0);
        let p = f.state.transform.transform_point(Vec3::ZERO);
        assert!(p.y.abs() < 1e-3);
    }

    #[test]
    fn test_amount_grows_when_subject_moves_away() {
        let mut f = Fixture::with_window(WindowInfo::new(D1, 100, 100, 200, 100));
        f.windows
            .insert(SUBJECT, WindowInfo::new(SUBJECT, 150, 120, 200, 100));
        {
            let links = f.chains.entry(D1);
            links.dodge_subject = Some(SUBJECT);
            links.dodge_direction = DodgeDirection::Down;
            links.dodge_max_amount = 100.0;
        }
        f.start(WindowEvent::Focus, 210.0);
        // Focus progress runs backwards: late in the run the dodger is still on its way out
        f.state.remaining_time = 20.0;
        Dodge.step(&mut f.ctx(), 10.0);
        assert!(f.state.transform_progress <= 0.5);
        // Subject bottom 220 minus dodger top 100
        assert_eq!(f.chains.get(D1).unwrap().dodge_max_amount, 120.0);
    }

    fn subject_fixture(raised: bool) -> Fixture {
        let mut f = Fixture::new();
        {
            let s = f.chains.entry(SUBJECT);
            s.is_dodge_subject = true;
            s.dodge_chain_start = Some(D1);
            s.restack = Some(RestackInfo {
                restacked: SUBJECT,
                start: D1,
                end: D2,
                old_above: WindowId(9),
                raised,
            });
        }
        f.chains.entry(D1).dodge_next = Some(D2);
        f.chains.entry(D2).dodge_prev = Some(D1);
        f.chains.insert(WindowId(9));
        f.start(WindowEvent::Focus, 210.0);
        f
    }

    #[test]
    fn test_raised_subject_walks_the_chain() {
        let mut f = subject_fixture(true);
        Dodge.post_prepare(&mut f.ctx(), &|w| if w == D1 { 0.7 } else { 0.3 });
        assert_eq!(f.chains.get(SUBJECT).unwrap().painted_before, Some(D2));
        assert_eq!(f.chains.get(D2).unwrap().to_be_painted_before, Some(SUBJECT));

        // Every dodger passed halfway: the subject is painted in its new place
        Dodge.post_prepare(&mut f.ctx(), &|_| 0.8);
        assert_eq!(f.chains.get(SUBJECT).unwrap().painted_before, None);
        assert_eq!(f.chains.get(D2).unwrap().to_be_painted_before, None);
    }

    #[test]
    fn test_lowered_subject_uses_old_neighbour() {
        let mut f = subject_fixture(false);
        Dodge.post_prepare(&mut f.ctx(), &|_| 0.2);
        assert_eq!(f.chains.get(SUBJECT).unwrap().painted_before, Some(WindowId(9)));
        assert_eq!(
            f.chains.get(WindowId(9)).unwrap().to_be_painted_before,
            Some(SUBJECT)
        );
        f.chains.check_invariants().unwrap();
    }
}
