//! The lazily populated list.
//!
//! [`SparseList`] is a cheap, cloneable handle to a sparse sequence whose
//! length and elements come from an attached [`ListProvider`]. Reads of
//! missing elements turn into fetch requests; providers answer them by
//! writing back into the list, either before the request returns or later.
//!
//! # Reentrancy
//!
//! The list never holds an internal borrow while calling into the provider
//! or an observer. Providers may write, resolve the length, read or edit the
//! list from inside any callback.

use crate::cache::ElementCache;
use crate::change::{ChangeObserver, ContentChange, ListChange, ObserverHandle, ObserverRegistry};
use crate::config::{normalize_window_size, ListConfig};
use crate::edit::EditPhase;
use crate::error::ListError;
use crate::length::LengthState;
use crate::provider::ListProvider;
use crate::window::{fetch_window, RequestedRanges};
use std::cell::{Cell, RefCell, RefMut};
use std::ops::Range;
use std::rc::{Rc, Weak};

pub(crate) struct ListState<T> {
    pub(crate) cache: ElementCache<T>,
    pub(crate) length: LengthState,
    pub(crate) requested: RequestedRanges,
}

pub(crate) struct ListInner<T> {
    state: RefCell<ListState<T>>,
    provider: RefCell<Option<Rc<dyn ListProvider<T>>>>,
    fetch_window_size: Cell<usize>,
    requesting_length: Cell<usize>,
    edit_phase: Cell<EditPhase>,
    observers: Rc<ObserverRegistry>,
}

/// Keeps `requesting_length` raised while a length request is in flight.
struct LengthRequestGuard<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> LengthRequestGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self { depth }
    }
}

impl Drop for LengthRequestGuard<'_> {
    fn drop(&mut self) {
        let depth = self.depth.get();
        debug_assert!(depth > 0, "length request depth underflow");
        self.depth.set(depth.saturating_sub(1));
    }
}

/// A sparse sequence of declared length whose elements are fetched on demand.
///
/// Cloning the handle is cheap; all clones share the same elements, length,
/// provider and observers.
pub struct SparseList<T> {
    inner: Rc<ListInner<T>>,
}

impl<T> Clone for SparseList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for SparseList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SparseList")
            .field("length", &state.length.resolved())
            .field("populated", &state.cache.populated())
            .field("outstanding_ranges", &state.requested.len())
            .field("fetch_window_size", &self.inner.fetch_window_size.get())
            .field("has_provider", &self.inner.provider.borrow().is_some())
            .field("observers", &self.inner.observers.len())
            .finish()
    }
}

impl<T> Default for SparseList<T> {
    fn default() -> Self {
        Self::with_config(ListConfig::default())
    }
}

impl<T> SparseList<T> {
    /// Creates a list with the given declared length, or unresolved for `None`.
    pub fn new(initial_length: Option<usize>) -> Self {
        Self::with_config(ListConfig {
            initial_length,
            ..ListConfig::default()
        })
    }

    /// Creates a list whose length will be resolved by its provider.
    pub fn unresolved() -> Self {
        Self::new(None)
    }

    pub fn with_length(length: usize) -> Self {
        Self::new(Some(length))
    }

    pub fn with_config(config: ListConfig) -> Self {
        Self {
            inner: Rc::new(ListInner {
                state: RefCell::new(ListState {
                    cache: ElementCache::new(),
                    length: LengthState::new(config.initial_length),
                    requested: RequestedRanges::new(),
                }),
                provider: RefCell::new(None),
                fetch_window_size: Cell::new(normalize_window_size(config.fetch_window_size)),
                requesting_length: Cell::new(0),
                edit_phase: Cell::new(EditPhase::Idle),
                observers: ObserverRegistry::new(),
            }),
        }
    }

    /// Returns a weak handle that does not keep the list alive.
    pub fn downgrade(&self) -> WeakSparseList<T> {
        WeakSparseList {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// `true` when both handles refer to the same list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn state_mut(&self) -> RefMut<'_, ListState<T>> {
        self.inner.state.borrow_mut()
    }

    pub(crate) fn edit_phase_cell(&self) -> &Cell<EditPhase> {
        &self.inner.edit_phase
    }

    pub(crate) fn notify(&self, change: ListChange) {
        log::trace!("notifying observers: {change:?}");
        self.inner.observers.notify(&change);
    }

    // Provider -------------------------------------------------------------

    /// Attaches `provider`, replacing and returning the previous one.
    ///
    /// Attaching does not trigger any request.
    pub fn set_provider(
        &self,
        provider: Option<Rc<dyn ListProvider<T>>>,
    ) -> Option<Rc<dyn ListProvider<T>>> {
        self.inner.provider.replace(provider)
    }

    pub fn provider(&self) -> Option<Rc<dyn ListProvider<T>>> {
        self.inner.provider.borrow().clone()
    }

    pub fn fetch_window_size(&self) -> usize {
        self.inner.fetch_window_size.get()
    }

    /// Sets the fetch window. Zero is treated as one.
    pub fn set_fetch_window_size(&self, window_size: usize) {
        self.inner
            .fetch_window_size
            .set(normalize_window_size(window_size));
    }

    // Length ---------------------------------------------------------------

    /// The declared length if resolved. Never consults the provider.
    pub fn resolved_len(&self) -> Option<usize> {
        self.inner.state.borrow().length.resolved()
    }

    /// The declared length.
    ///
    /// While unresolved, asks the provider to resolve it once and returns
    /// whatever it set synchronously, or `0`.
    pub fn len(&self) -> usize {
        if let Some(length) = self.resolved_len() {
            return length;
        }
        if !self.is_requesting_length() {
            if let Some(provider) = self.provider() {
                let _guard = LengthRequestGuard::enter(&self.inner.requesting_length);
                if !provider.resolve_length(self).is_supported() {
                    log::trace!("provider cannot resolve length");
                }
            }
        }
        self.resolved_len().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` while a provider's `resolve_length` call is on the stack.
    pub fn is_requesting_length(&self) -> bool {
        self.inner.requesting_length.get() > 0
    }

    /// Sets the declared length.
    ///
    /// `None` discards every cached element. A resolved length purges elements
    /// at or beyond it, whatever the previous length was. Observers are
    /// notified when the value changes or cached contents were dropped.
    pub fn set_length(&self, length: Option<usize>) {
        let (change, purged) = {
            let mut state = self.state_mut();
            let purged = match length {
                None => {
                    let dropped = state.cache.populated() + state.requested.len();
                    state.cache.clear_all();
                    state.requested.clear();
                    dropped
                }
                Some(new_len) => {
                    state.requested.forget_overlapping(&(new_len..usize::MAX));
                    state.cache.truncate(new_len)
                }
            };
            (state.length.set(length), purged)
        };
        if purged > 0 {
            log::debug!("purged {purged} cached entries for new length {length:?}");
        }
        if let Some(change) = change {
            log::debug!("length changed from {:?} to {:?}", change.old, change.new);
        }
        if change.is_some() || purged > 0 {
            self.notify(ListChange::content(ContentChange::All).with_length(change));
        }
    }

    // Reads ----------------------------------------------------------------

    /// `true` when `index` holds a populated element.
    pub fn contains_index(&self, index: usize) -> bool {
        self.inner.state.borrow().cache.contains(index)
    }

    /// Runs `f` on the element at `index` if populated. Never fetches.
    pub fn with_element<R>(&self, index: usize, f: impl FnOnce(&T) -> R) -> Option<R> {
        let state = self.inner.state.borrow();
        state.cache.read(index).map(f)
    }

    /// Populated indexes in ascending order.
    pub fn defined_indexes(&self) -> Vec<usize> {
        self.inner.state.borrow().cache.indexes().collect()
    }

    pub fn populated_count(&self) -> usize {
        self.inner.state.borrow().cache.populated()
    }

    /// Issues the fetch that would populate `index`.
    ///
    /// The request covers the aligned fetch window around `index`. With range
    /// support, a window still outstanding is not requested again. Without
    /// it, every index of the window is requested individually.
    pub fn request_index(&self, index: usize) {
        let Some(provider) = self.provider() else {
            return;
        };
        let window = fetch_window(index, self.fetch_window_size());
        if !self.state_mut().requested.mark(&window) {
            log::trace!("window {window:?} for index {index} is already outstanding");
            return;
        }
        log::trace!("requesting window {window:?} for index {index}");
        if provider.fetch_range(self, window.clone()).is_supported() {
            return;
        }
        self.state_mut().requested.complete(window.start);
        for candidate in window {
            if !provider.fetch_index(self, candidate).is_supported() {
                log::trace!("provider cannot fetch index {candidate}");
                break;
            }
        }
    }

    /// Clears the outstanding marker for the window starting at `start`.
    ///
    /// Returns `false` if no such window was outstanding.
    pub fn complete_range_request(&self, start: usize) -> bool {
        self.state_mut().requested.complete(start)
    }

    pub fn is_range_requested(&self, start: usize) -> bool {
        self.inner.state.borrow().requested.is_requested(start)
    }

    // Writes ---------------------------------------------------------------

    /// Stores one element. Writes beyond a resolved length are dropped.
    pub fn write_one(&self, index: usize, value: T) {
        let written = {
            let mut state = self.state_mut();
            let limit = state.length.resolved();
            if limit.is_some_and(|len| index >= len) {
                false
            } else {
                state.cache.write_one(index, value);
                state
                    .requested
                    .complete_covered(&(index..index.saturating_add(1)), limit);
                true
            }
        };
        if !written {
            log::warn!("dropping write at index {index} beyond declared length");
            return;
        }
        log::trace!("wrote index {index}");
        self.notify(ListChange::content(ContentChange::Range(
            index..index.saturating_add(1),
        )));
    }

    /// Stores `values` at the indexes of `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is reversed or `values` does not yield exactly
    /// `range.len()` items. See [`try_write_range`](Self::try_write_range).
    pub fn write_range(&self, range: Range<usize>, values: impl IntoIterator<Item = T>) {
        if let Err(err) = self.try_write_range(range, values) {
            panic!("invalid range write: {err}");
        }
    }

    /// Fallible form of [`write_range`](Self::write_range).
    ///
    /// Values falling beyond a resolved length are dropped.
    pub fn try_write_range(
        &self,
        range: Range<usize>,
        values: impl IntoIterator<Item = T>,
    ) -> Result<(), ListError> {
        ListError::check_range(&range)?;
        let mut values: Vec<T> = values.into_iter().collect();
        if values.len() != range.len() {
            return Err(ListError::LengthMismatch {
                expected: range.len(),
                actual: values.len(),
            });
        }

        let written = {
            let mut state = self.state_mut();
            let limit = state.length.resolved();
            if let Some(len) = limit {
                let keep = len.saturating_sub(range.start).min(values.len());
                if keep < values.len() {
                    log::warn!(
                        "dropping {} values of {range:?} beyond declared length {len}",
                        values.len() - keep
                    );
                    values.truncate(keep);
                }
            }
            let written = state.cache.write_range(range.start, values);
            state.requested.complete_covered(&range, limit);
            written
        };

        if written > 0 {
            log::trace!("wrote {written} values at {range:?}");
            self.notify(ListChange::content(ContentChange::Range(
                range.start..range.start + written,
            )));
        }
        Ok(())
    }

    // Invalidation ---------------------------------------------------------

    /// Drops the cached elements inside `range` and notifies observers.
    ///
    /// The declared length is untouched.
    ///
    /// # Panics
    ///
    /// Panics if `range` is reversed.
    pub fn invalidate(&self, range: Range<usize>) {
        if let Err(err) = self.try_invalidate(range) {
            panic!("invalid invalidation: {err}");
        }
    }

    pub fn try_invalidate(&self, range: Range<usize>) -> Result<(), ListError> {
        ListError::check_range(&range)?;
        {
            let mut state = self.state_mut();
            state.cache.invalidate(range.clone());
            state.requested.forget_overlapping(&range);
        }
        log::trace!("invalidated {range:?}");
        self.notify(ListChange::content(ContentChange::Range(range)));
        Ok(())
    }

    /// Invalidates `len` elements starting at `start`.
    ///
    /// # Panics
    ///
    /// Panics if `start + len` overflows.
    pub fn invalidate_span(&self, start: usize, len: usize) {
        match ListError::span(start, len) {
            Ok(range) => self.invalidate(range),
            Err(err) => panic!("invalid invalidation: {err}"),
        }
    }

    /// Drops every element and the declared length, then tells the provider.
    ///
    /// The next length query resolves the length again.
    pub fn reset(&self) {
        let length = {
            let mut state = self.state_mut();
            state.cache.clear_all();
            state.requested.clear();
            state.length.set(None)
        };
        log::debug!("list reset");
        self.notify(ListChange::content(ContentChange::All).with_length(length));
        if let Some(provider) = self.provider() {
            provider.on_reset(self);
        }
    }

    // Observation ----------------------------------------------------------

    /// Registers `observer` for every subsequent [`ListChange`].
    pub fn observe(&self, observer: impl Fn(&ListChange) + 'static) -> ObserverHandle {
        self.observe_shared(Rc::new(observer))
    }

    pub fn observe_shared(&self, observer: ChangeObserver) -> ObserverHandle {
        self.inner.observers.register(observer)
    }
}

impl<T: Clone> SparseList<T> {
    /// Returns the element at `index` if populated. Never fetches.
    pub fn peek(&self, index: usize) -> Option<T> {
        self.with_element(index, T::clone)
    }

    /// Returns the element at `index`, requesting it from the provider when missing.
    ///
    /// Returns `None` for indexes at or beyond the length, and for missing
    /// elements the provider did not deliver synchronously.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }
        if let Some(value) = self.peek(index) {
            return Some(value);
        }
        self.request_index(index);
        self.peek(index)
    }

    /// Returns the populated elements as `(index, value)` pairs.
    pub fn populated(&self) -> Vec<(usize, T)> {
        let state = self.inner.state.borrow();
        state
            .cache
            .iter()
            .map(|(index, value)| (index, value.clone()))
            .collect()
    }
}

impl<T: PartialEq> SparseList<T> {
    /// Index of `value`.
    ///
    /// Asks the provider when it supports lookups; otherwise scans the
    /// populated elements only, without fetching.
    pub fn index_of(&self, value: &T) -> Option<usize> {
        if let Some(provider) = self.provider() {
            if let Some(found) = provider.lookup_index_of(self, value).supported() {
                return found;
            }
        }
        self.inner.state.borrow().cache.position_of(value)
    }
}

/// Non-owning handle to a [`SparseList`].
pub struct WeakSparseList<T> {
    inner: Weak<ListInner<T>>,
}

impl<T> Clone for WeakSparseList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for WeakSparseList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakSparseList")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<T> WeakSparseList<T> {
    pub fn upgrade(&self) -> Option<SparseList<T>> {
        self.inner.upgrade().map(|inner| SparseList { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Support;

    struct Squares {
        length: usize,
    }

    impl ListProvider<usize> for Squares {
        fn resolve_length(&self, list: &SparseList<usize>) -> Support {
            list.set_length(Some(self.length));
            Support::Supported(())
        }

        fn fetch_range(&self, list: &SparseList<usize>, range: Range<usize>) -> Support {
            let end = range.end.min(self.length);
            let start = range.start.min(end);
            list.write_range(start..end, (start..end).map(|i| i * i));
            Support::Supported(())
        }
    }

    fn squares(length: usize) -> SparseList<usize> {
        let list: SparseList<usize> = SparseList::unresolved();
        list.set_provider(Some(Rc::new(Squares { length })));
        list
    }

    #[test]
    fn len_defaults_to_zero_without_provider() {
        let list = SparseList::<u8>::unresolved();
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
        assert_eq!(list.resolved_len(), None);
    }

    #[test]
    fn len_resolves_through_provider() {
        let list = squares(12);
        assert_eq!(list.resolved_len(), None);
        assert_eq!(list.len(), 12);
        assert_eq!(list.resolved_len(), Some(12));
        assert!(!list.is_requesting_length());
    }

    #[test]
    fn get_populates_synchronously() {
        let list = squares(6);
        assert_eq!(list.peek(3), None);
        assert_eq!(list.get(3), Some(9));
        assert_eq!(list.peek(3), Some(9));
    }

    #[test]
    fn get_past_end_is_none() {
        let list = squares(4);
        assert_eq!(list.get(4), None);
        assert_eq!(list.populated_count(), 0);
    }

    #[test]
    fn writes_beyond_length_are_dropped() {
        let list = SparseList::with_length(3);
        list.write_range(1..5, [1, 2, 3, 4]);
        list.write_one(7, 7);
        assert_eq!(list.defined_indexes(), vec![1, 2]);
    }

    #[test]
    fn shrinking_length_purges_tail() {
        let list = SparseList::with_length(8);
        list.write_range(0..8, 0..8);
        list.set_length(Some(5));
        assert_eq!(list.defined_indexes(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn unresolving_length_clears_cache() {
        let list = SparseList::with_length(3);
        list.write_range(0..3, ['a', 'b', 'c']);
        list.set_length(None);
        assert_eq!(list.populated_count(), 0);
    }

    #[test]
    #[should_panic(expected = "invalid range write")]
    fn mismatched_range_write_panics() {
        let list = SparseList::with_length(10);
        list.write_range(0..3, [1, 2]);
    }

    #[test]
    fn try_write_range_reports_mismatch() {
        let list = SparseList::with_length(10);
        assert_eq!(
            list.try_write_range(2..4, [1]),
            Err(ListError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(list.populated_count(), 0);
    }

    #[test]
    #[should_panic(expected = "invalid invalidation")]
    fn overflowing_span_panics() {
        let list = SparseList::<u8>::with_length(1);
        list.invalidate_span(usize::MAX, 2);
    }

    #[test]
    fn weak_handle_does_not_keep_list_alive() {
        let list = SparseList::<u8>::with_length(1);
        let weak = list.downgrade();
        assert!(weak.upgrade().is_some_and(|strong| strong.ptr_eq(&list)));
        drop(list);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn index_of_falls_back_to_cache_scan() {
        let list = SparseList::with_length(5);
        list.write_range(2..4, ["x", "y"]);
        assert_eq!(list.index_of(&"y"), Some(3));
        assert_eq!(list.index_of(&"z"), None);
    }

    #[test]
    fn window_size_is_normalized() {
        let list = SparseList::<u8>::with_config(ListConfig::default().with_fetch_window_size(4));
        assert_eq!(list.fetch_window_size(), 4);
        list.set_fetch_window_size(0);
        assert_eq!(list.fetch_window_size(), 1);
    }
}
