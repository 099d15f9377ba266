//! A fixed-height window over a list, redrawn only when something visible changes.

use crate::remote::Row;
use lazyseq_core::{ObserverHandle, SparseList};
use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;

pub const PLACEHOLDER: &str = "...";

pub struct Viewport {
    list: SparseList<Row>,
    top: Rc<Cell<usize>>,
    height: usize,
    dirty: Rc<Cell<bool>>,
    _observer: ObserverHandle,
}

impl Viewport {
    pub fn new(list: SparseList<Row>, height: usize) -> Self {
        let top = Rc::new(Cell::new(0));
        let dirty = Rc::new(Cell::new(true));

        let watched_top = Rc::clone(&top);
        let flag = Rc::clone(&dirty);
        let observer = list.observe(move |change| {
            let start = watched_top.get();
            if change.length.is_some()
                || (start..start + height).any(|index| change.content.affects(index))
            {
                flag.set(true);
            }
        });

        Self {
            list,
            top,
            height,
            dirty,
            _observer: observer,
        }
    }

    pub fn list(&self) -> &SparseList<Row> {
        &self.list
    }

    pub fn top(&self) -> usize {
        self.top.get()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Indexes currently on screen. Never extends past the known length.
    pub fn visible(&self) -> Range<usize> {
        let len = self.list.resolved_len().unwrap_or(0);
        let start = self.top.get().min(len);
        start..(start + self.height).min(len)
    }

    /// Moves the first visible row, clamped so the viewport stays filled.
    pub fn scroll_to(&self, top: usize) {
        let len = self.list.len();
        let clamped = top.min(len.saturating_sub(self.height));
        if clamped != self.top.get() {
            self.top.set(clamped);
            self.dirty.set(true);
        }
    }

    pub fn scroll_by(&self, delta: isize) {
        self.scroll_to(self.top.get().saturating_add_signed(delta));
    }

    /// Number of visible rows already loaded.
    pub fn loaded(&self) -> usize {
        self.visible()
            .filter(|&index| self.list.contains_index(index))
            .count()
    }

    /// Draws the visible rows, requesting the missing ones.
    pub fn render(&self) -> Vec<String> {
        self.dirty.set(false);
        let len = self.list.len();
        let start = self.top.get().min(len);
        let end = (start + self.height).min(len);
        (start..end)
            .map(|index| match self.list.get(index) {
                Some(row) => format!("{index:>5}  {}", row.title),
                None => format!("{index:>5}  {PLACEHOLDER}"),
            })
            .collect()
    }
}
