use crate::window::DEFAULT_FETCH_WINDOW_SIZE;

/// Construction options for a [`SparseList`](crate::SparseList).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListConfig {
    /// Declared length at creation. `None` leaves it to the provider.
    pub initial_length: Option<usize>,

    /// Minimum granularity of a fetch request. `1` disables windowing.
    pub fetch_window_size: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            initial_length: None,
            fetch_window_size: DEFAULT_FETCH_WINDOW_SIZE,
        }
    }
}

impl ListConfig {
    /// Configuration for a list whose length the provider resolves.
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.initial_length = Some(length);
        self
    }

    /// Sets the fetch window. Zero is treated as one.
    pub fn with_fetch_window_size(mut self, window_size: usize) -> Self {
        self.fetch_window_size = normalize_window_size(window_size);
        self
    }
}

pub(crate) fn normalize_window_size(window_size: usize) -> usize {
    window_size.max(1)
}
