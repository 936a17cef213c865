//! Focus-fade and dodge chains
//!
//! Raising or lowering a window past others links several windows together:
//!
//! - a *paint chain* (`more_prev`/`more_next`) groups an application window with
//!   its dialogs so they fade together;
//! - *host links* (`painted_before`/`to_be_painted_before`) paint a window's old
//!   copy right before another window, out of stacking order;
//! - a *dodge chain* (`dodge_prev`/`dodge_next`) orders the windows moving out of
//!   the way of a raised or lowered subject.
//!
//! All links are window ids looked up in a [`ChainRegistry`]; a link to a window
//! that has gone is a lookup miss, never a stale reference. Links must be
//! severed when an endpoint finishes animating or is destroyed.

use crate::restack::RestackInfo;
use rustc_hash::{FxHashMap, FxHashSet};
use wisp_core::{Result, WindowId, WispError};

/// Direction a dodging window moves in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DodgeDirection {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl DodgeDirection {
    pub const ALL: [DodgeDirection; 4] = [
        DodgeDirection::Up,
        DodgeDirection::Down,
        DodgeDirection::Left,
        DodgeDirection::Right,
    ];

    pub fn is_horizontal(self) -> bool {
        matches!(self, DodgeDirection::Left | DodgeDirection::Right)
    }
}

/// Chain membership and restack bookkeeping of one window
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChainLinks {
    /// Subject this window dodges
    pub dodge_subject: Option<WindowId>,
    /// First dodger (subjects only)
    pub dodge_chain_start: Option<WindowId>,
    pub dodge_prev: Option<WindowId>,
    pub dodge_next: Option<WindowId>,
    /// Window this one's old copy is painted before (its host)
    pub painted_before: Option<WindowId>,
    /// Window painted right before this one (hosted here)
    pub to_be_painted_before: Option<WindowId>,
    pub more_prev: Option<WindowId>,
    pub more_next: Option<WindowId>,
    pub is_dodge_subject: bool,
    pub skip_post_prepare: bool,
    /// Position among the dodgers; negative marks a stationary dodger
    pub dodge_order: i32,
    pub dodge_direction: DodgeDirection,
    pub dodge_max_amount: f32,
    /// Focus-fading window passing through this one
    pub passing_through: Option<WindowId>,
    pub restack: Option<RestackInfo>,
    /// The host configured this window since the last restack
    pub configure_notified: bool,
}

impl ChainLinks {
    /// Whether the window takes part in a paint chain
    pub fn in_paint_chain(&self) -> bool {
        self.painted_before.is_some() || self.more_prev.is_some()
    }

    fn has_dodge_links(&self) -> bool {
        self.dodge_prev.is_some() || self.dodge_next.is_some()
    }
}

/// Chain links of every known window
#[derive(Debug, Default)]
pub struct ChainRegistry {
    links: FxHashMap<WindowId, ChainLinks>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: WindowId) -> Option<&ChainLinks> {
        self.links.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut ChainLinks> {
        self.links.get_mut(&id)
    }

    pub fn entry(&mut self, id: WindowId) -> &mut ChainLinks {
        self.links.entry(id).or_default()
    }

    pub fn insert(&mut self, id: WindowId) {
        self.links.entry(id).or_default();
    }

    /// Forget a window, clearing every link that points at it
    pub fn remove(&mut self, id: WindowId) {
        self.links.remove(&id);
        for l in self.links.values_mut() {
            for link in [
                &mut l.dodge_subject,
                &mut l.dodge_chain_start,
                &mut l.dodge_prev,
                &mut l.dodge_next,
                &mut l.painted_before,
                &mut l.to_be_painted_before,
                &mut l.more_prev,
                &mut l.more_next,
                &mut l.passing_through,
            ] {
                if *link == Some(id) {
                    *link = None;
                }
            }
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.links.keys().copied()
    }

    /// Follow a link from `start` until it ends, a window repeats or is unknown
    fn walk(
        &self,
        start: Option<WindowId>,
        next: impl Fn(&ChainLinks) -> Option<WindowId>,
    ) -> Vec<WindowId> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        let mut cur = start;
        while let Some(id) = cur {
            if !seen.insert(id) {
                break;
            }
            let Some(l) = self.links.get(&id) else {
                break;
            };
            out.push(id);
            cur = next(l);
        }
        out
    }

    /// Windows of `id`'s dodge chain, in chain order
    pub fn dodge_chain(&self, subject: WindowId) -> Vec<WindowId> {
        let start = self.links.get(&subject).and_then(|l| l.dodge_chain_start);
        self.walk(start, |l| l.dodge_next)
    }

    /// Windows above `id` in its paint chain (not including `id`)
    pub fn more_next_chain(&self, id: WindowId) -> Vec<WindowId> {
        let start = self.links.get(&id).and_then(|l| l.more_next);
        self.walk(start, |l| l.more_next)
    }

    /// Windows below `id` in its paint chain (not including `id`)
    pub fn more_prev_chain(&self, id: WindowId) -> Vec<WindowId> {
        let start = self.links.get(&id).and_then(|l| l.more_prev);
        self.walk(start, |l| l.more_prev)
    }

    /// Drop `id`'s paint-chain membership and host link
    pub fn clean_up_item(&mut self, id: WindowId) {
        let host = self.links.get(&id).and_then(|l| l.painted_before);
        if let Some(h) = host.and_then(|h| self.links.get_mut(&h)) {
            h.to_be_painted_before = None;
        }
        if let Some(l) = self.links.get_mut(&id) {
            l.painted_before = None;
            l.more_prev = None;
            l.more_next = None;
            l.is_dodge_subject = false;
            l.skip_post_prepare = false;
        }
    }

    /// Make `subject`'s dodgers forget it and sever its dodge chain
    pub fn clear_dodgers_subject(&mut self, subject: WindowId) {
        for dw in self.dodge_chain(subject) {
            if let Some(l) = self.links.get_mut(&dw) {
                if l.dodge_subject == Some(subject) {
                    l.dodge_subject = None;
                }
                l.dodge_prev = None;
                l.dodge_next = None;
            }
        }
        if let Some(l) = self.links.get_mut(&subject) {
            l.dodge_chain_start = None;
        }
    }

    /// Unlink a finished dodger from its chain
    pub fn remove_from_dodge_chain(&mut self, dw: WindowId) {
        let Some(l) = self.links.get(&dw).cloned() else {
            return;
        };

        if let Some(subject) = l.dodge_subject.and_then(|s| self.links.get_mut(&s)) {
            if subject.dodge_chain_start == Some(dw) {
                subject.dodge_chain_start = l.dodge_next.or(l.dodge_prev);
            }
        }
        if let Some(next) = l.dodge_next.and_then(|n| self.links.get_mut(&n)) {
            next.dodge_prev = l.dodge_prev;
        }
        if let Some(prev) = l.dodge_prev.and_then(|p| self.links.get_mut(&p)) {
            prev.dodge_next = l.dodge_next;
        }
        if let Some(me) = self.links.get_mut(&dw) {
            me.dodge_prev = None;
            me.dodge_next = None;
            me.dodge_subject = None;
        }
    }

    /// Whether any other window of `id`'s paint chain is still animating
    pub fn chain_has_running(&self, id: WindowId, is_animating: impl Fn(WindowId) -> bool) -> bool {
        self.more_next_chain(id)
            .into_iter()
            .chain(self.more_prev_chain(id))
            .any(is_animating)
    }

    /// Dissolve the whole paint chain `id` belongs to
    pub fn finish_paint_chain(&mut self, id: WindowId) {
        let mut members = self.more_next_chain(id);
        members.push(id);
        members.extend(self.more_prev_chain(id));

        for w in members {
            if self.links.get(&w).is_some_and(|l| l.is_dodge_subject) {
                self.clear_dodgers_subject(w);
            }
            self.clean_up_item(w);
        }
    }

    /// Whether linking `cur` below `next` keeps the paint chain acyclic
    pub fn wont_create_circular_chain(&self, cur: WindowId, next: WindowId) -> bool {
        let mut seen = FxHashSet::default();
        let mut w = Some(next);
        while let Some(id) = w {
            if id == cur || !seen.insert(id) {
                return false;
            }
            w = self.links.get(&id).and_then(|l| l.more_next);
        }
        true
    }

    /// Lowest window of the paint chain hosted on `id` (or `id` itself)
    pub fn bottommost_in_focus_chain(&self, id: WindowId) -> WindowId {
        let Some(hosted) = self.links.get(&id).and_then(|l| l.to_be_painted_before) else {
            return id;
        };
        if !self.links.contains_key(&hosted) {
            return id;
        }
        self.more_prev_chain(hosted).last().copied().unwrap_or(hosted)
    }

    /// Forget every pending restack
    pub fn reset_stacking_info(&mut self) {
        for l in self.links.values_mut() {
            l.configure_notified = false;
            l.restack = None;
        }
    }

    pub fn dodge_link_count(&self) -> usize {
        self.links.values().filter(|l| l.has_dodge_links()).count()
    }

    pub fn dodge_subject_count(&self) -> usize {
        self.links.values().filter(|l| l.is_dodge_subject).count()
    }

    /// Check link symmetry and acyclicity
    pub fn check_invariants(&self) -> Result<()> {
        for (id, l) in &self.links {
            if let Some(next) = l.dodge_next {
                if let Some(n) = self.links.get(&next) {
                    if n.dodge_prev != Some(*id) {
                        return Err(WispError::Invariant(format!(
                            "dodge link {id} -> {next} is one-sided"
                        )));
                    }
                }
            }
            if let Some(next) = l.more_next {
                if let Some(n) = self.links.get(&next) {
                    if n.more_prev != Some(*id) {
                        return Err(WispError::Invariant(format!(
                            "paint chain link {id} -> {next} is one-sided"
                        )));
                    }
                }
            }
            if !self.is_acyclic(*id, |l| l.more_next) || !self.is_acyclic(*id, |l| l.dodge_next) {
                return Err(WispError::Invariant(format!("chain through {id} is circular")));
            }
        }
        Ok(())
    }

    fn is_acyclic(&self, start: WindowId, next: impl Fn(&ChainLinks) -> Option<WindowId>) -> bool {
        let mut seen = FxHashSet::default();
        let mut cur = Some(start);
        while let Some(id) = cur {
            if !seen.insert(id) {
                return false;
            }
            cur = self.links.get(&id).and_then(&next);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(i: u64) -> WindowId {
        WindowId(i)
    }

    /// Subject 1 with dodgers 2 -> 3 -> 4
    fn dodge_chain() -> ChainRegistry {
        let mut reg = ChainRegistry::new();
        for i in 1..=4 {
            reg.insert(w(i));
        }
        reg.entry(w(1)).is_dodge_subject = true;
        reg.entry(w(1)).dodge_chain_start = Some(w(2));
        let order = [w(2), w(3), w(4)];
        for (i, id) in order.iter().enumerate() {
            let l = reg.entry(*id);
            l.dodge_subject = Some(w(1));
            l.dodge_prev = if i > 0 { Some(order[i - 1]) } else { None };
            l.dodge_next = order.get(i + 1).copied();
        }
        reg
    }

    #[test]
    fn test_dodge_chain_walk() {
        let reg = dodge_chain();
        assert_eq!(reg.dodge_chain(w(1)), vec![w(2), w(3), w(4)]);
        assert!(reg.check_invariants().is_ok());
    }

    #[test]
    fn test_remove_middle_dodger() {
        let mut reg = dodge_chain();
        reg.remove_from_dodge_chain(w(3));
        assert_eq!(reg.dodge_chain(w(1)), vec![w(2), w(4)]);
        assert_eq!(reg.get(w(4)).unwrap().dodge_prev, Some(w(2)));
        assert!(reg.check_invariants().is_ok());
    }

    #[test]
    fn test_remove_first_dodger_moves_chain_start() {
        let mut reg = dodge_chain();
        reg.remove_from_dodge_chain(w(2));
        assert_eq!(reg.get(w(1)).unwrap().dodge_chain_start, Some(w(3)));
    }

    #[test]
    fn test_subject_teardown_severs_everything() {
        let mut reg = dodge_chain();
        reg.clear_dodgers_subject(w(1));
        reg.finish_paint_chain(w(1));
        assert_eq!(reg.dodge_link_count(), 0);
        assert_eq!(reg.dodge_subject_count(), 0);
        assert!(reg.get(w(3)).unwrap().dodge_subject.is_none());
    }

    #[test]
    fn test_circular_chain_detection() {
        let mut reg = ChainRegistry::new();
        reg.entry(w(1)).more_next = Some(w(2));
        reg.entry(w(2)).more_prev = Some(w(1));
        // 2 already sits above 1, so 2 cannot go below 1
        assert!(!reg.wont_create_circular_chain(w(2), w(1)));
        assert!(reg.wont_create_circular_chain(w(3), w(2)));

        reg.entry(w(2)).more_next = Some(w(1));
        reg.entry(w(1)).more_prev = Some(w(2));
        assert!(reg.check_invariants().is_err());
    }

    #[test]
    fn test_bottommost_in_focus_chain() {
        let mut reg = ChainRegistry::new();
        // 3 is hosted on 5; 2 is below 3 in its paint chain
        reg.entry(w(5)).to_be_painted_before = Some(w(3));
        reg.entry(w(3)).painted_before = Some(w(5));
        reg.entry(w(3)).more_prev = Some(w(2));
        reg.entry(w(2)).more_next = Some(w(3));
        assert_eq!(reg.bottommost_in_focus_chain(w(5)), w(2));
        assert_eq!(reg.bottommost_in_focus_chain(w(2)), w(2));
    }

    #[test]
    fn test_remove_clears_incoming_links() {
        let mut reg = dodge_chain();
        reg.remove(w(3));
        assert_eq!(reg.get(w(2)).unwrap().dodge_next, None);
        assert_eq!(reg.get(w(4)).unwrap().dodge_prev, None);
    }
}
