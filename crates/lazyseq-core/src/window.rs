//! Fetch window coalescing.
//!
//! A miss at a single index is widened to the aligned block of
//! `fetch_window_size` indexes that contains it, so clustered or sequential
//! reads turn into a few large requests instead of many small ones. The block
//! depends only on `(index, window_size)`; a re-fetch of the same index always
//! asks for the same range.

use crate::collections::{new_map, HashMap};
use std::ops::Range;

/// Window size used when nothing else is configured. Windowing is off.
pub const DEFAULT_FETCH_WINDOW_SIZE: usize = 1;

/// Returns the aligned range to request for a miss at `index`.
///
/// A `window_size` of 0 or 1 requests exactly `index..index + 1`.
pub fn fetch_window(index: usize, window_size: usize) -> Range<usize> {
    if window_size <= 1 {
        return index..index.saturating_add(1);
    }
    let start = window_size.saturating_mul(index / window_size);
    start..start.saturating_add(window_size)
}

/// Range fetches that were issued and have not been completed yet.
///
/// Keyed by window start. A miss whose window start is still outstanding does
/// not issue a second request.
#[derive(Debug, Default)]
pub struct RequestedRanges {
    outstanding: HashMap<usize, usize>,
}

impl RequestedRanges {
    pub fn new() -> Self {
        Self {
            outstanding: new_map(),
        }
    }

    pub fn is_requested(&self, start: usize) -> bool {
        self.outstanding.contains_key(&start)
    }

    /// Records `range` as outstanding. Returns `false` when its start already was.
    pub fn mark(&mut self, range: &Range<usize>) -> bool {
        if self.outstanding.contains_key(&range.start) {
            return false;
        }
        self.outstanding.insert(range.start, range.end);
        true
    }

    /// Clears the marker for the window starting at `start`.
    pub fn complete(&mut self, start: usize) -> bool {
        self.outstanding.remove(&start).is_some()
    }

    /// Clears every marker whose window is fully covered by `written`.
    ///
    /// Windows reaching past `limit` only need to be covered up to it.
    pub fn complete_covered(&mut self, written: &Range<usize>, limit: Option<usize>) {
        self.outstanding.retain(|start, end| {
            let end = limit.map_or(*end, |limit| (*end).min(limit).max(*start));
            !(*start >= written.start && end <= written.end)
        });
    }

    /// Clears every marker whose window overlaps `range`.
    pub fn forget_overlapping(&mut self, range: &Range<usize>) {
        self.outstanding
            .retain(|start, end| *end <= range.start || *start >= range.end);
    }

    pub fn clear(&mut self) {
        self.outstanding.clear();
    }

    pub fn len(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outstanding.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_of_one_is_exact() {
        assert_eq!(fetch_window(7, 1), 7..8);
        assert_eq!(fetch_window(7, 0), 7..8);
    }

    #[test]
    fn window_snaps_to_block_start() {
        assert_eq!(fetch_window(7, 5), 5..10);
        assert_eq!(fetch_window(5, 5), 5..10);
        assert_eq!(fetch_window(4, 5), 0..5);
    }

    #[test]
    fn window_is_constant_within_block() {
        let window_size = 8;
        for block in 0..4 {
            let expected = fetch_window(block * window_size, window_size);
            for index in block * window_size..(block + 1) * window_size {
                let window = fetch_window(index, window_size);
                assert_eq!(window, expected);
                assert!(window.contains(&index));
            }
        }
    }

    #[test]
    fn window_near_usize_max_saturates() {
        let window = fetch_window(usize::MAX - 1, 4);
        assert!(window.contains(&(usize::MAX - 1)));
        assert_eq!(window.end, usize::MAX);
    }

    #[test]
    fn requested_ranges_deduplicate_by_start() {
        let mut requested = RequestedRanges::new();
        assert!(requested.mark(&(10..20)));
        assert!(!requested.mark(&(10..20)));
        assert!(requested.is_requested(10));
        assert!(requested.complete(10));
        assert!(!requested.complete(10));
        assert!(requested.is_empty());
    }

    #[test]
    fn covering_write_completes_window() {
        let mut requested = RequestedRanges::new();
        requested.mark(&(0..5));
        requested.mark(&(5..10));
        requested.complete_covered(&(0..4), None);
        assert!(requested.is_requested(0));
        requested.complete_covered(&(0..5), None);
        assert!(!requested.is_requested(0));
        // Window 5..10 on a list of length 8 is satisfied by writing 5..8.
        requested.complete_covered(&(5..8), Some(8));
        assert!(requested.is_empty());
    }

    #[test]
    fn forget_overlapping_leaves_disjoint_windows() {
        let mut requested = RequestedRanges::new();
        requested.mark(&(0..5));
        requested.mark(&(5..10));
        requested.mark(&(10..15));
        requested.forget_overlapping(&(7..9));
        assert!(requested.is_requested(0));
        assert!(!requested.is_requested(5));
        assert!(requested.is_requested(10));
        assert_eq!(requested.len(), 2);
    }
}
