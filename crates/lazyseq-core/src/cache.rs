//! Sparse, index-addressed element storage.
//!
//! [`ElementCache`] keeps only the elements a provider has delivered. An index
//! missing from the cache means "not yet populated", which is distinct from an
//! element whose value happens to be empty (for example `None` in an
//! `ElementCache<Option<U>>`).

use std::collections::BTreeMap;
use std::ops::Range;

/// Ordered sparse map from index to element.
///
/// The cache has no notion of length. Callers track the declared length
/// separately and decide which writes are in bounds.
#[derive(Clone)]
pub struct ElementCache<T> {
    entries: BTreeMap<usize, T>,
}

impl<T> std::fmt::Debug for ElementCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementCache")
            .field("populated", &self.entries.len())
            .field("extent", &self.extent())
            .finish()
    }
}

impl<T> Default for ElementCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ElementCache<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Looks up a populated element. Never triggers a fetch.
    #[inline]
    pub fn read(&self, index: usize) -> Option<&T> {
        self.entries.get(&index)
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    /// Stores `value` at `index`, replacing any previous element.
    pub fn write_one(&mut self, index: usize, value: T) {
        self.entries.insert(index, value);
    }

    /// Stores consecutive values starting at `start`.
    ///
    /// Returns the number of values written.
    pub fn write_range(&mut self, start: usize, values: impl IntoIterator<Item = T>) -> usize {
        let mut written = 0;
        for (offset, value) in values.into_iter().enumerate() {
            self.entries.insert(start + offset, value);
            written += 1;
        }
        written
    }

    /// Removes every element whose index lies in `range`.
    pub fn invalidate(&mut self, range: Range<usize>) {
        if range.start >= range.end || self.entries.is_empty() {
            return;
        }
        if range.start == 0 && range.end >= self.extent() {
            self.entries.clear();
            return;
        }
        let mut tail = self.entries.split_off(&range.start);
        let mut kept = tail.split_off(&range.end);
        self.entries.append(&mut kept);
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Drops every element at or beyond `len`, returning how many were removed.
    pub fn truncate(&mut self, len: usize) -> usize {
        self.entries.split_off(&len).len()
    }

    /// Removes `removed` logical slots at `index`, inserts `inserted` in their
    /// place and shifts everything after the removed slots accordingly.
    pub fn splice<I>(&mut self, index: usize, removed: usize, inserted: I)
    where
        I: IntoIterator<Item = T>,
    {
        let removed_end = index.saturating_add(removed);
        let mut tail = self.entries.split_off(&index);
        let after = tail.split_off(&removed_end);
        drop(tail);

        let mut next = index;
        for value in inserted {
            self.entries.insert(next, value);
            next += 1;
        }
        for (key, value) in after {
            self.entries.insert(key - removed_end + next, value);
        }
    }

    /// One past the highest populated index, or `0` when empty.
    pub fn extent(&self) -> usize {
        self.entries
            .last_key_value()
            .map(|(index, _)| index + 1)
            .unwrap_or(0)
    }

    /// Number of populated indexes.
    pub fn populated(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Populated indexes in ascending order.
    pub fn indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.entries.iter().map(|(index, value)| (*index, value))
    }
}

impl<T: PartialEq> ElementCache<T> {
    /// Lowest populated index holding `value`.
    pub fn position_of(&self, value: &T) -> Option<usize> {
        self.iter()
            .find(|(_, candidate)| *candidate == value)
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(range: Range<usize>) -> ElementCache<usize> {
        let mut cache = ElementCache::new();
        cache.write_range(range.start, range.map(|i| i * 10));
        cache
    }

    #[test]
    fn absent_is_distinct_from_empty_value() {
        let mut cache: ElementCache<Option<u32>> = ElementCache::new();
        cache.write_one(3, None);
        assert_eq!(cache.read(3), Some(&None));
        assert_eq!(cache.read(2), None);
        assert!(cache.contains(3));
        assert!(!cache.contains(2));
    }

    #[test]
    fn write_overwrites() {
        let mut cache = filled(0..3);
        cache.write_one(1, 99);
        assert_eq!(cache.read(1), Some(&99));
        assert_eq!(cache.write_range(2, [7, 8]), 2);
        assert_eq!(cache.read(2), Some(&7));
        assert_eq!(cache.read(3), Some(&8));
    }

    #[test]
    fn invalidate_only_touches_range() {
        let mut cache = filled(0..10);
        cache.invalidate(3..6);
        let remaining: Vec<_> = cache.indexes().collect();
        assert_eq!(remaining, vec![0, 1, 2, 6, 7, 8, 9]);
        assert_eq!(cache.read(6), Some(&60));
    }

    #[test]
    fn invalidate_covering_range_clears_everything() {
        let mut cache = filled(2..6);
        cache.invalidate(0..6);
        assert!(cache.is_empty());
    }

    #[test]
    fn empty_invalidation_is_noop() {
        let mut cache = filled(0..4);
        cache.invalidate(2..2);
        assert_eq!(cache.populated(), 4);
    }

    #[test]
    fn truncate_drops_tail() {
        let mut cache = filled(0..8);
        assert_eq!(cache.truncate(5), 3);
        assert_eq!(cache.extent(), 5);
    }

    #[test]
    fn splice_shifts_following_entries() {
        let mut cache = filled(0..5);
        cache.splice(2, 1, [100, 101]);
        let items: Vec<_> = cache.iter().map(|(i, v)| (i, *v)).collect();
        assert_eq!(
            items,
            vec![(0, 0), (1, 10), (2, 100), (3, 101), (4, 30), (5, 40)]
        );
    }

    #[test]
    fn splice_removal_shifts_down() {
        let mut cache = filled(0..6);
        cache.splice(1, 3, []);
        let items: Vec<_> = cache.iter().map(|(i, v)| (i, *v)).collect();
        assert_eq!(items, vec![(0, 0), (1, 40), (2, 50)]);
    }

    #[test]
    fn splice_preserves_holes() {
        let mut cache = ElementCache::new();
        cache.write_one(0, 'a');
        cache.write_one(4, 'e');
        cache.splice(1, 0, ['x']);
        assert_eq!(cache.indexes().collect::<Vec<_>>(), vec![0, 1, 5]);
    }

    #[test]
    fn position_scans_cache_only() {
        let cache = filled(3..6);
        assert_eq!(cache.position_of(&40), Some(4));
        assert_eq!(cache.position_of(&10), None);
    }
}
