//! Provider that answers on demand rather than inline.
//!
//! Requests are queued and only delivered when the test calls
//! [`DeferredProvider::flush`] or [`DeferredProvider::pump_until_idle`], which
//! mimics a provider backed by a network or a worker thread.

use lazyseq_core::{ListProvider, SparseList, Support, WeakSparseList};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::ops::Range;
use std::rc::Rc;

enum Pending<T> {
    Length(WeakSparseList<T>),
    Range(WeakSparseList<T>, Range<usize>),
}

/// Queues length and range requests until pumped.
pub struct DeferredProvider<T> {
    length: Cell<usize>,
    source: Rc<dyn Fn(usize) -> T>,
    pending: RefCell<VecDeque<Pending<T>>>,
    delivered: Cell<usize>,
}

impl<T> DeferredProvider<T> {
    pub fn new(length: usize, source: impl Fn(usize) -> T + 'static) -> Self {
        Self {
            length: Cell::new(length),
            source: Rc::new(source),
            pending: RefCell::new(VecDeque::new()),
            delivered: Cell::new(0),
        }
    }

    /// Changes the length delivered by later length requests.
    pub fn set_length(&self, length: usize) {
        self.length.set(length);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Number of responses delivered so far.
    pub fn delivered(&self) -> usize {
        self.delivered.get()
    }

    /// Answers every request queued before this call.
    ///
    /// Requests issued while answering stay queued for the next flush.
    /// Returns the number of requests answered.
    pub fn flush(&self) -> usize {
        let batch: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        let answered = batch.len();
        for request in batch {
            self.answer(request);
        }
        answered
    }

    /// Flushes until nothing is queued or `max_iterations` flushes ran.
    pub fn pump_until_idle(&self, max_iterations: usize) -> usize {
        let mut answered = 0;
        for _ in 0..max_iterations {
            if self.is_idle() {
                break;
            }
            answered += self.flush();
        }
        answered
    }

    fn answer(&self, request: Pending<T>) {
        match request {
            Pending::Length(list) => {
                let Some(list) = list.upgrade() else {
                    return;
                };
                list.set_length(Some(self.length.get()));
            }
            Pending::Range(list, range) => {
                let Some(list) = list.upgrade() else {
                    return;
                };
                let len = list.resolved_len().unwrap_or(self.length.get());
                let target = range.start.min(len)..range.end.min(len);
                let source = Rc::clone(&self.source);
                list.write_range(target.clone(), target.map(|index| source(index)));
                list.complete_range_request(range.start);
            }
        }
        self.delivered.set(self.delivered.get() + 1);
    }
}

impl<T> ListProvider<T> for DeferredProvider<T> {
    fn resolve_length(&self, list: &SparseList<T>) -> Support {
        self.pending
            .borrow_mut()
            .push_back(Pending::Length(list.downgrade()));
        Support::Supported(())
    }

    fn fetch_range(&self, list: &SparseList<T>, range: Range<usize>) -> Support {
        self.pending
            .borrow_mut()
            .push_back(Pending::Range(list.downgrade(), range));
        Support::Supported(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_arrives_before_flush() {
        let provider = Rc::new(DeferredProvider::new(8, |i| i * 2));
        let list = SparseList::<usize>::unresolved();
        list.set_provider(Some(provider.clone()));

        assert_eq!(list.len(), 0);
        assert_eq!(provider.pending_len(), 1);
        assert_eq!(provider.flush(), 1);
        assert_eq!(list.len(), 8);

        assert_eq!(list.get(3), None);
        provider.flush();
        assert_eq!(list.get(3), Some(6));
        assert_eq!(provider.delivered(), 2);
    }

    #[test]
    fn dropped_lists_are_skipped() {
        let provider = Rc::new(DeferredProvider::new(4, |i| i));
        let list = SparseList::<usize>::with_length(4);
        list.set_provider(Some(provider.clone()));
        list.request_index(1);
        drop(list);
        assert_eq!(provider.flush(), 1);
        assert_eq!(provider.delivered(), 0);
    }
}
