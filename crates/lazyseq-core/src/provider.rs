//! Provider protocol for lazy lists.
//!
//! This module defines the [`ListProvider`] trait: the set of optional
//! capabilities a [`SparseList`] uses to resolve its length, populate
//! elements and authorize edits.

use crate::list::SparseList;
use std::ops::Range;

/// Outcome of invoking an optional provider capability.
///
/// Every capability has a default implementation returning
/// [`Support::Unsupported`]; the list then falls back to its local behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support<T = ()> {
    Supported(T),
    Unsupported,
}

impl<T> Support<T> {
    #[inline]
    pub fn is_supported(&self) -> bool {
        matches!(self, Support::Supported(_))
    }

    /// Converts into `Some(value)` when supported.
    #[inline]
    pub fn supported(self) -> Option<T> {
        match self {
            Support::Supported(value) => Some(value),
            Support::Unsupported => None,
        }
    }
}

/// Supplies length and elements to a [`SparseList`] on demand.
///
/// Every method receives the requesting list so one provider can serve
/// several lists. Requests may be answered synchronously, by calling
/// [`SparseList::set_length`], [`SparseList::write_one`] or
/// [`SparseList::write_range`] before returning, or later from any point in
/// the same thread.
///
/// Implementors only override the capabilities they support.
pub trait ListProvider<T> {
    /// Asked when the list's length is queried while unresolved.
    ///
    /// The provider is expected to eventually call [`SparseList::set_length`].
    fn resolve_length(&self, list: &SparseList<T>) -> Support {
        let _ = list;
        Support::Unsupported
    }

    /// Asked to populate every index of `range`.
    ///
    /// Preferred over [`fetch_index`](Self::fetch_index) when supported. The
    /// range is aligned to the list's fetch window and may extend past the
    /// declared length; writes beyond it are dropped by the list.
    fn fetch_range(&self, list: &SparseList<T>, range: Range<usize>) -> Support {
        let _ = (list, range);
        Support::Unsupported
    }

    /// Asked to populate a single index.
    ///
    /// Called once per index of the fetch window when `fetch_range` is unsupported.
    fn fetch_index(&self, list: &SparseList<T>, index: usize) -> Support {
        let _ = (list, index);
        Support::Unsupported
    }

    /// Finds the index of `value` in the full dataset.
    ///
    /// When unsupported the list scans its populated elements only.
    fn lookup_index_of(&self, list: &SparseList<T>, value: &T) -> Support<Option<usize>> {
        let _ = (list, value);
        Support::Unsupported
    }

    /// Approves or vetoes a structural edit before it is applied.
    ///
    /// Returning `Supported(false)` aborts the edit without any state change.
    /// Unsupported means approved.
    fn authorize_replace(
        &self,
        list: &SparseList<T>,
        index: usize,
        removed: usize,
        inserted: &[T],
    ) -> Support<bool> {
        let _ = (list, index, removed, inserted);
        Support::Unsupported
    }

    /// Informs the provider that the list dropped its length and elements.
    fn on_reset(&self, list: &SparseList<T>) {
        let _ = list;
    }
}
