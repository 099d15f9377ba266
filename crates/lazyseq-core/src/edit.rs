//! Structural edits gated by provider authorization.
//!
//! An edit moves through `Idle -> Authorizing -> Applying -> Idle`, or
//! `Idle -> Authorizing -> Rejected -> Idle` when the provider vetoes it. A
//! rejected edit leaves elements, length and observers untouched. An applied
//! edit emits exactly one [`ListChange`] carrying both the splice and, when
//! the declared length moved, the length transition.

use crate::change::{ContentChange, ListChange};
use crate::list::SparseList;
use smallvec::SmallVec;
use std::cell::Cell;

/// Where an in-progress edit currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPhase {
    #[default]
    Idle,
    Authorizing,
    Applying,
    Rejected,
}

/// Result of [`SparseList::replace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit was applied; `delta` is `inserted - removed`.
    Applied { delta: isize },
    /// The provider vetoed the edit. Nothing changed.
    Rejected,
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, EditOutcome::Rejected)
    }
}

/// Restores the previous phase when the edit scope ends, including on panic.
struct PhaseGuard<'a> {
    phase: &'a Cell<EditPhase>,
    previous: EditPhase,
}

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a Cell<EditPhase>) -> Self {
        let previous = phase.replace(EditPhase::Authorizing);
        Self { phase, previous }
    }

    fn transition(&self, next: EditPhase) {
        self.phase.set(next);
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.phase.set(self.previous);
    }
}

impl<T> SparseList<T> {
    /// Phase of the edit currently running on this list, if any.
    ///
    /// Observers notified by an edit see [`EditPhase::Applying`].
    pub fn edit_phase(&self) -> EditPhase {
        self.edit_phase_cell().get()
    }

    /// Removes `removed` elements at `index` and inserts `inserted` in their place.
    ///
    /// The provider's `authorize_replace` is consulted first; a veto returns
    /// [`EditOutcome::Rejected`] with no state change and no notification.
    /// Otherwise cached elements after the removed slots shift by
    /// `inserted.len() - removed`, and a resolved length moves by the same
    /// amount.
    pub fn replace<I>(&self, index: usize, removed: usize, inserted: I) -> EditOutcome
    where
        I: IntoIterator<Item = T>,
    {
        let inserted: SmallVec<[T; 4]> = inserted.into_iter().collect();
        let phase = PhaseGuard::enter(self.edit_phase_cell());

        if !self.authorize(index, removed, &inserted) {
            phase.transition(EditPhase::Rejected);
            log::debug!(
                "provider rejected replacing {removed} elements at {index} with {}",
                inserted.len()
            );
            return EditOutcome::Rejected;
        }

        phase.transition(EditPhase::Applying);
        let count = inserted.len();
        let length = {
            let mut state = self.state_mut();
            state.cache.splice(index, removed, inserted);
            state.requested.forget_overlapping(&(index..usize::MAX));
            let length = state.length.apply_delta(removed, count);
            if let Some(len) = state.length.resolved() {
                let dropped = state.cache.truncate(len);
                if dropped > 0 {
                    log::debug!("edit at {index} left {dropped} values beyond length {len}");
                }
            }
            length
        };

        log::trace!("replaced {removed} elements at {index} with {count}");
        self.notify(
            ListChange::content(ContentChange::Splice {
                index,
                removed,
                inserted: count,
            })
            .with_length(length),
        );
        EditOutcome::Applied {
            delta: count as isize - removed as isize,
        }
    }

    /// Inserts `values` before `index`.
    pub fn insert<I>(&self, index: usize, values: I) -> EditOutcome
    where
        I: IntoIterator<Item = T>,
    {
        self.replace(index, 0, values)
    }

    /// Removes `count` elements starting at `index`.
    pub fn remove(&self, index: usize, count: usize) -> EditOutcome {
        self.replace(index, count, std::iter::empty())
    }

    /// Appends `value` after the last element.
    pub fn push(&self, value: T) -> EditOutcome {
        let index = self.len();
        self.replace(index, 0, [value])
    }

    fn authorize(&self, index: usize, removed: usize, inserted: &[T]) -> bool {
        let Some(provider) = self.provider() else {
            return true;
        };
        provider
            .authorize_replace(self, index, removed, inserted)
            .supported()
            .unwrap_or(true)
    }
}
