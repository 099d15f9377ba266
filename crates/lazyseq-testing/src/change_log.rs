//! Recorder for list notifications.

use lazyseq_core::{ContentChange, ListChange, ObserverHandle, SparseList};
use std::cell::RefCell;
use std::rc::Rc;

/// Records every [`ListChange`] a list emits while the log is alive.
pub struct ChangeLog {
    changes: Rc<RefCell<Vec<ListChange>>>,
    _handle: ObserverHandle,
}

impl ChangeLog {
    pub fn attach<T>(list: &SparseList<T>) -> Self {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        let handle = list.observe(move |change| sink.borrow_mut().push(change.clone()));
        Self {
            changes,
            _handle: handle,
        }
    }

    pub fn count(&self) -> usize {
        self.changes.borrow().len()
    }

    pub fn changes(&self) -> Vec<ListChange> {
        self.changes.borrow().clone()
    }

    pub fn last(&self) -> Option<ListChange> {
        self.changes.borrow().last().cloned()
    }

    /// Returns and clears the recorded changes.
    pub fn take(&self) -> Vec<ListChange> {
        std::mem::take(&mut *self.changes.borrow_mut())
    }

    /// Number of recorded changes carrying a length transition.
    pub fn length_changes(&self) -> usize {
        self.changes
            .borrow()
            .iter()
            .filter(|change| change.length.is_some())
            .count()
    }

    /// Number of recorded changes that may affect `index`.
    pub fn touching(&self, index: usize) -> usize {
        self.changes
            .borrow()
            .iter()
            .filter(|change| change.content.affects(index))
            .count()
    }

    /// Content scopes recorded so far, in order.
    pub fn contents(&self) -> Vec<ContentChange> {
        self.changes
            .borrow()
            .iter()
            .map(|change| change.content.clone())
            .collect()
    }
}
