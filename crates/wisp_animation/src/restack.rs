//! Restack detection
//!
//! The host reports the full client stacking list (bottom to top) whenever it
//! changes. Comparing it with the previous list finds the single window that
//! was raised or lowered, the range of windows it moved across, and the window
//! that used to be right above it.

use wisp_core::WindowId;

/// A detected raise or lower of one window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestackInfo {
    /// The window that moved
    pub restacked: WindowId,
    /// Lowest window of the changed range
    pub start: WindowId,
    /// Highest window of the changed range
    pub end: WindowId,
    /// Window that was directly above the restacked one before the move
    pub old_above: WindowId,
    pub raised: bool,
}

/// Compare two stacking lists and find the restacked window
///
/// `relevant` filters out windows that should not take part (hidden,
/// minimized, skip-taskbar). `clicked` reports windows the host configured
/// since the last restack; when only two windows swapped, the clicked one is
/// taken as raised. Returns `None` for an open/close (list length changed) or
/// when no single window moved.
pub fn detect_restack(
    last: &[WindowId],
    now: &[WindowId],
    relevant: impl Fn(WindowId) -> bool,
    clicked: impl Fn(WindowId) -> bool,
) -> Option<RestackInfo> {
    let n = now.len();
    if n != last.len() {
        return None;
    }

    let mut change_start: Option<usize> = None;
    let mut change_end: Option<usize> = None;
    for i in 0..n {
        if !relevant(now[i]) {
            continue;
        }
        if now[i] != last[i] {
            if change_start.is_none() {
                change_start = Some(i);
            } else {
                change_end = Some(i);
            }
        } else if change_start.is_some() {
            break;
        }
    }
    let (cs, ce) = (change_start?, change_end?);

    let only_two = now[ce] == last[cs] && now[cs] == last[ce];
    let prefer_raised = only_two && clicked(now[ce]);

    let (restacked, start, end, old_above, raised) =
        if prefer_raised || (!only_two && now[ce] == last[cs]) {
            (now[ce], now[cs], now[ce], Some(now[cs]), true)
        } else if now[cs] == last[ce] && ce + 1 < n {
            // Lowering needs a window above to host the old copy
            (now[cs], now[cs], now[ce], Some(last[ce + 1]), false)
        } else {
            return None;
        };

    // Skip invisible windows upward from the old neighbour
    let old_above = old_above.and_then(|above| {
        let pos = now.iter().position(|w| *w == above)?;
        now[pos..].iter().copied().find(|w| relevant(*w))
    })?;

    Some(RestackInfo {
        restacked,
        start,
        end,
        old_above,
        raised,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[u64]) -> Vec<WindowId> {
        v.iter().map(|i| WindowId(*i)).collect()
    }

    #[test]
    fn test_detect_raise() {
        let last = ids(&[1, 2, 3, 4, 5]);
        let now = ids(&[1, 3, 4, 2, 5]);
        let info = detect_restack(&last, &now, |_| true, |_| false).unwrap();
        assert!(info.raised);
        assert_eq!(info.restacked, WindowId(2));
        assert_eq!(info.start, WindowId(3));
        assert_eq!(info.end, WindowId(2));
        assert_eq!(info.old_above, WindowId(3));
    }

    #[test]
    fn test_detect_lower() {
        let last = ids(&[1, 2, 3, 4, 5]);
        let now = ids(&[1, 4, 2, 3, 5]);
        let info = detect_restack(&last, &now, |_| true, |_| false).unwrap();
        assert!(!info.raised);
        assert_eq!(info.restacked, WindowId(4));
        assert_eq!(info.start, WindowId(4));
        assert_eq!(info.end, WindowId(3));
        assert_eq!(info.old_above, WindowId(5));
    }

    #[test]
    fn test_swap_of_two_prefers_clicked() {
        let last = ids(&[1, 2, 3]);
        let now = ids(&[2, 1, 3]);
        let info = detect_restack(&last, &now, |_| true, |w| w == WindowId(1)).unwrap();
        assert!(info.raised);
        assert_eq!(info.restacked, WindowId(1));
    }

    #[test]
    fn test_lowering_to_top_slot_is_ignored() {
        // The topmost window cannot be lowered onto a host
        let last = ids(&[1, 2, 3]);
        let now = ids(&[1, 3, 2]);
        let info = detect_restack(&last, &now, |_| true, |_| false);
        // Two-window swap without a click reads as lowering 3 with nothing above
        assert!(info.is_none());
    }

    #[test]
    fn test_open_or_close_is_not_a_restack() {
        let last = ids(&[1, 2, 3]);
        let now = ids(&[1, 2, 3, 4]);
        assert!(detect_restack(&last, &now, |_| true, |_| false).is_none());
    }
}
