use std::ops::Range;

/// Contract violations detected at the collection's entry points.
///
/// Expected conditions (missing provider, vetoed edits, reads past the end)
/// never produce a `ListError`; they degrade to a no-op or a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    /// A range whose start lies after its end.
    ReversedRange { start: usize, end: usize },
    /// A range write whose value count does not match the range length.
    LengthMismatch { expected: usize, actual: usize },
    /// An index computation that would overflow `usize`.
    IndexOverflow { index: usize, len: usize },
}

impl ListError {
    pub(crate) fn check_range(range: &Range<usize>) -> Result<(), ListError> {
        if range.start > range.end {
            return Err(ListError::ReversedRange {
                start: range.start,
                end: range.end,
            });
        }
        Ok(())
    }

    pub(crate) fn span(index: usize, len: usize) -> Result<Range<usize>, ListError> {
        index
            .checked_add(len)
            .map(|end| index..end)
            .ok_or(ListError::IndexOverflow { index, len })
    }
}

impl std::fmt::Display for ListError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListError::ReversedRange { start, end } => {
                write!(f, "range start {start} is past its end {end}")
            }
            ListError::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} values for range, got {actual}")
            }
            ListError::IndexOverflow { index, len } => {
                write!(f, "index {index} plus length {len} overflows")
            }
        }
    }
}

impl std::error::Error for ListError {}
