//! Synchronous spy provider.

use lazyseq_core::{ListProvider, SparseList, Support};
use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

type Source<T> = Rc<dyn Fn(usize) -> T>;
type Lookup<T> = Rc<dyn Fn(&T) -> Option<usize>>;

/// One capability invocation observed by a [`RecordingProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ResolveLength,
    FetchRange(Range<usize>),
    FetchIndex(usize),
    LookupIndexOf,
    AuthorizeReplace {
        index: usize,
        removed: usize,
        inserted: usize,
    },
    Reset,
}

/// Provider whose capabilities are switched on one by one and whose calls are logged.
///
/// Every enabled capability answers synchronously, before returning to the list.
/// A freshly created provider supports nothing.
pub struct RecordingProvider<T> {
    length: Cell<Option<usize>>,
    ranges: Option<Source<T>>,
    indexes: Option<Source<T>>,
    lookup: Option<Lookup<T>>,
    authorize: Cell<Option<bool>>,
    calls: RefCell<Vec<ProviderCall>>,
}

impl<T> Default for RecordingProvider<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordingProvider<T> {
    pub fn new() -> Self {
        Self {
            length: Cell::new(None),
            ranges: None,
            indexes: None,
            lookup: None,
            authorize: Cell::new(None),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Resolves the list's length to `length` when asked.
    pub fn with_length(self, length: usize) -> Self {
        self.length.set(Some(length));
        self
    }

    /// Supports range fetches, filling each index with `source(index)`.
    pub fn serving_ranges(mut self, source: impl Fn(usize) -> T + 'static) -> Self {
        self.ranges = Some(Rc::new(source));
        self
    }

    /// Supports per-index fetches only, filling each index with `source(index)`.
    pub fn serving_indexes(mut self, source: impl Fn(usize) -> T + 'static) -> Self {
        self.indexes = Some(Rc::new(source));
        self
    }

    /// Supports lookups by value.
    pub fn with_lookup(mut self, lookup: impl Fn(&T) -> Option<usize> + 'static) -> Self {
        self.lookup = Some(Rc::new(lookup));
        self
    }

    /// Answers every edit authorization with `allow`.
    pub fn authorizing(self, allow: bool) -> Self {
        self.authorize.set(Some(allow));
        self
    }

    /// Changes the authorization answer; `None` makes the capability unsupported.
    pub fn set_authorizing(&self, allow: Option<bool>) {
        self.authorize.set(allow);
    }

    /// Changes the length reported on the next resolution.
    pub fn set_length(&self, length: Option<usize>) {
        self.length.set(length);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.borrow().clone()
    }

    /// Returns and clears the call log.
    pub fn take_calls(&self) -> Vec<ProviderCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub fn count(&self, predicate: impl Fn(&ProviderCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: ProviderCall) {
        log::trace!("provider call: {call:?}");
        self.calls.borrow_mut().push(call);
    }
}

/// Clamps `range` to the list's resolved length.
fn clamp<T>(list: &SparseList<T>, range: Range<usize>) -> Range<usize> {
    match list.resolved_len() {
        Some(len) => range.start.min(len)..range.end.min(len),
        None => range,
    }
}

impl<T> ListProvider<T> for RecordingProvider<T> {
    fn resolve_length(&self, list: &SparseList<T>) -> Support {
        self.record(ProviderCall::ResolveLength);
        match self.length.get() {
            Some(length) => {
                list.set_length(Some(length));
                Support::Supported(())
            }
            None => Support::Unsupported,
        }
    }

    fn fetch_range(&self, list: &SparseList<T>, range: Range<usize>) -> Support {
        let Some(source) = self.ranges.clone() else {
            return Support::Unsupported;
        };
        self.record(ProviderCall::FetchRange(range.clone()));
        let target = clamp(list, range);
        list.write_range(target.clone(), target.map(|index| source(index)));
        Support::Supported(())
    }

    fn fetch_index(&self, list: &SparseList<T>, index: usize) -> Support {
        let Some(source) = self.indexes.clone() else {
            return Support::Unsupported;
        };
        self.record(ProviderCall::FetchIndex(index));
        if list.resolved_len().map_or(true, |len| index < len) {
            list.write_one(index, source(index));
        }
        Support::Supported(())
    }

    fn lookup_index_of(&self, _list: &SparseList<T>, value: &T) -> Support<Option<usize>> {
        let Some(lookup) = self.lookup.clone() else {
            return Support::Unsupported;
        };
        self.record(ProviderCall::LookupIndexOf);
        Support::Supported(lookup(value))
    }

    fn authorize_replace(
        &self,
        _list: &SparseList<T>,
        index: usize,
        removed: usize,
        inserted: &[T],
    ) -> Support<bool> {
        let Some(allow) = self.authorize.get() else {
            return Support::Unsupported;
        };
        self.record(ProviderCall::AuthorizeReplace {
            index,
            removed,
            inserted: inserted.len(),
        });
        Support::Supported(allow)
    }

    fn on_reset(&self, _list: &SparseList<T>) {
        self.record(ProviderCall::Reset);
    }
}
