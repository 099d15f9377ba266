//! Declared length bookkeeping.

/// Before/after pair describing one change of the declared length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthChange {
    pub old: Option<usize>,
    pub new: Option<usize>,
}

impl LengthChange {
    /// `true` when the declared length got smaller, including becoming unresolved.
    pub fn is_shrink(&self) -> bool {
        match (self.old, self.new) {
            (Some(old), Some(new)) => new < old,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

/// Optional, lazily resolved declared length.
///
/// Resolution through the provider is driven by the owning list; this type
/// only records the value and reports transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthState {
    value: Option<usize>,
}

impl LengthState {
    pub fn new(value: Option<usize>) -> Self {
        Self { value }
    }

    #[inline]
    pub fn resolved(&self) -> Option<usize> {
        self.value
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }

    /// Stores `value`. Returns the transition when it differs from the previous one.
    pub fn set(&mut self, value: Option<usize>) -> Option<LengthChange> {
        if self.value == value {
            return None;
        }
        let old = std::mem::replace(&mut self.value, value);
        Some(LengthChange { old, new: value })
    }

    /// Adjusts a resolved length by `inserted - removed`.
    ///
    /// Unresolved lengths and zero deltas are left alone. The result saturates
    /// at zero when more elements are removed than the length accounts for.
    pub fn apply_delta(&mut self, removed: usize, inserted: usize) -> Option<LengthChange> {
        let current = self.value?;
        if removed == inserted {
            return None;
        }
        let next = current.saturating_add(inserted).saturating_sub(removed);
        self.set(Some(next))
    }
}
