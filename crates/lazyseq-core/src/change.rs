//! Change notifications emitted by [`SparseList`](crate::SparseList).
//!
//! Every logical operation produces at most one [`ListChange`]. When an
//! operation touches several fields (a structural edit that also moves the
//! declared length) both facts travel in the same record, so observers never
//! see the length updated without the matching content change.
//!
//! Notifications never carry element values. Observers re-read the indexes
//! they care about.

use crate::collections::{new_map, HashMap};
use crate::length::LengthChange;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::{Rc, Weak};

/// Which part of the content an operation affected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentChange {
    /// The whole sequence should be considered stale.
    All,
    /// Elements inside the range were written or invalidated.
    Range(Range<usize>),
    /// A structural edit replaced `removed` slots at `index` with `inserted` new ones.
    Splice {
        index: usize,
        removed: usize,
        inserted: usize,
    },
}

impl ContentChange {
    /// `true` when the change may affect `index`.
    pub fn affects(&self, index: usize) -> bool {
        match self {
            ContentChange::All => true,
            ContentChange::Range(range) => range.contains(&index),
            ContentChange::Splice { index: at, .. } => index >= *at,
        }
    }
}

/// One notification delivered to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListChange {
    /// Set when the declared length changed value.
    pub length: Option<LengthChange>,
    pub content: ContentChange,
}

impl ListChange {
    pub fn content(content: ContentChange) -> Self {
        Self {
            length: None,
            content,
        }
    }

    pub fn with_length(mut self, length: Option<LengthChange>) -> Self {
        self.length = length;
        self
    }
}

/// Callback invoked for every [`ListChange`].
pub type ChangeObserver = Rc<dyn Fn(&ListChange) + 'static>;

/// Observers registered on one list.
pub(crate) struct ObserverRegistry {
    next_id: Cell<usize>,
    observers: RefCell<HashMap<usize, ChangeObserver>>,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            next_id: Cell::new(0),
            observers: RefCell::new(new_map()),
        })
    }

    pub(crate) fn register(self: &Rc<Self>, observer: ChangeObserver) -> ObserverHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.observers.borrow_mut().insert(id, observer);
        ObserverHandle {
            registry: Rc::downgrade(self),
            id,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Delivers `change` to every observer registered at the time of the call.
    ///
    /// The registry is not borrowed while observers run, so they may read the
    /// list, register new observers or drop their own handle.
    pub(crate) fn notify(&self, change: &ListChange) {
        let mut observers: SmallVec<[(usize, ChangeObserver); 4]> = self
            .observers
            .borrow()
            .iter()
            .map(|(id, observer)| (*id, Rc::clone(observer)))
            .collect();
        observers.sort_unstable_by_key(|(id, _)| *id);
        for (_, observer) in observers {
            observer(change);
        }
    }
}

/// Handle for an observer registered with [`SparseList::observe`](crate::SparseList::observe).
///
/// When dropped, automatically removes the associated observer.
#[must_use = "dropping the handle unregisters the observer"]
pub struct ObserverHandle {
    registry: Weak<ObserverRegistry>,
    id: usize,
}

impl ObserverHandle {
    /// Keeps the observer registered for as long as the list lives.
    pub fn detach(self) {
        std::mem::forget(self);
    }
}

impl std::fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverHandle").field("id", &self.id).finish()
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.observers.borrow_mut().remove(&self.id);
        }
    }
}
