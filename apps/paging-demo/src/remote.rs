//! Simulated remote catalog.
//!
//! Requests are queued and answered a fixed number of frames later, the way a
//! network-backed source answers a scrolling list.

use anyhow::Context;
use lazyseq_core::{ListProvider, SparseList, Support, WeakSparseList};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::ops::Range;

/// The first row is a header and cannot be removed.
pub const PINNED_ROWS: usize = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub id: usize,
    pub title: String,
}

impl Row {
    pub fn new(id: usize, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    fn seeded(id: usize) -> Self {
        if id == 0 {
            Self::new(id, "Catalog")
        } else {
            Self::new(id, format!("Row #{id:04}"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
    Length,
    Page(Range<usize>),
}

struct Pending {
    due: u64,
    list: WeakSparseList<Row>,
    request: Request,
}

/// Remote data source serving any number of lists.
pub struct RemoteCatalog {
    rows: RefCell<Vec<Row>>,
    latency: u32,
    frame: Cell<u64>,
    queue: RefCell<VecDeque<Pending>>,
    pages_served: Cell<usize>,
}

impl RemoteCatalog {
    pub fn new(items: usize, latency: u32) -> Self {
        Self {
            rows: RefCell::new((0..items).map(Row::seeded).collect()),
            latency,
            frame: Cell::new(0),
            queue: RefCell::new(VecDeque::new()),
            pages_served: Cell::new(0),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn pages_served(&self) -> usize {
        self.pages_served.get()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Advances one frame and answers every request that has come due.
    ///
    /// Returns the number of answered requests.
    pub fn tick(&self) -> anyhow::Result<usize> {
        let frame = self.frame.get() + 1;
        self.frame.set(frame);

        let mut answered = 0;
        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                match queue.front() {
                    Some(pending) if pending.due <= frame => queue.pop_front(),
                    _ => None,
                }
            };
            let Some(pending) = next else {
                break;
            };
            let Some(list) = pending.list.upgrade() else {
                log::debug!("dropping answer for a released list: {:?}", pending.request);
                continue;
            };
            self.answer(&list, &pending.request)?;
            answered += 1;
        }
        Ok(answered)
    }

    fn answer(&self, list: &SparseList<Row>, request: &Request) -> anyhow::Result<()> {
        match request {
            Request::Length => {
                let count = self.row_count();
                log::debug!("catalog reports {count} rows");
                list.set_length(Some(count));
            }
            Request::Page(range) => {
                let page: Vec<Row> = {
                    let rows = self.rows.borrow();
                    let end = range.end.min(rows.len());
                    let start = range.start.min(end);
                    rows[start..end].to_vec()
                };
                let target = range.start..range.start + page.len();
                list.try_write_range(target, page)
                    .with_context(|| format!("delivering page {range:?}"))?;
                list.complete_range_request(range.start);
                self.pages_served.set(self.pages_served.get() + 1);
            }
        }
        Ok(())
    }

    fn enqueue(&self, list: &SparseList<Row>, request: Request) {
        if self.latency == 0 {
            if let Err(err) = self.answer(list, &request) {
                log::error!("{err:#}");
            }
            return;
        }
        let due = self.frame.get() + u64::from(self.latency);
        log::trace!("queueing {request:?} until frame {due}");
        self.queue.borrow_mut().push_back(Pending {
            due,
            list: list.downgrade(),
            request,
        });
    }

    fn length_pending_for(&self, list: &SparseList<Row>) -> bool {
        self.queue.borrow().iter().any(|pending| {
            pending.request == Request::Length
                && pending
                    .list
                    .upgrade()
                    .is_some_and(|queued| queued.ptr_eq(list))
        })
    }
}

impl ListProvider<Row> for RemoteCatalog {
    fn resolve_length(&self, list: &SparseList<Row>) -> Support {
        if !self.length_pending_for(list) {
            self.enqueue(list, Request::Length);
        }
        Support::Supported(())
    }

    fn fetch_range(&self, list: &SparseList<Row>, range: Range<usize>) -> Support {
        self.enqueue(list, Request::Page(range));
        Support::Supported(())
    }

    fn lookup_index_of(&self, _list: &SparseList<Row>, value: &Row) -> Support<Option<usize>> {
        Support::Supported(self.rows.borrow().iter().position(|row| row == value))
    }

    fn authorize_replace(
        &self,
        _list: &SparseList<Row>,
        index: usize,
        removed: usize,
        inserted: &[Row],
    ) -> Support<bool> {
        if removed > 0 && index < PINNED_ROWS {
            log::info!("refusing to remove pinned rows at {index}");
            return Support::Supported(false);
        }
        let mut rows = self.rows.borrow_mut();
        if index > rows.len() {
            return Support::Supported(false);
        }
        let end = index.saturating_add(removed).min(rows.len());
        rows.splice(index..end, inserted.iter().cloned());
        Support::Supported(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn attached(catalog: &Rc<RemoteCatalog>, window: usize) -> SparseList<Row> {
        let list = SparseList::<Row>::unresolved();
        list.set_fetch_window_size(window);
        list.set_provider(Some(catalog.clone()));
        list
    }

    #[test]
    fn answers_arrive_after_latency() {
        let catalog = Rc::new(RemoteCatalog::new(10, 2));
        let list = attached(&catalog, 4);

        assert_eq!(list.len(), 0);
        assert_eq!(list.len(), 0);
        assert_eq!(catalog.pending(), 1);
        assert_eq!(catalog.tick().ok(), Some(0));
        assert_eq!(catalog.tick().ok(), Some(1));
        assert_eq!(list.len(), 10);

        assert_eq!(list.get(5), None);
        catalog.tick().ok();
        catalog.tick().ok();
        assert_eq!(list.peek(5).map(|row| row.id), Some(5));
        assert_eq!(list.defined_indexes(), vec![4, 5, 6, 7]);
        assert_eq!(catalog.pages_served(), 1);
    }

    #[test]
    fn zero_latency_answers_inline() {
        let catalog = Rc::new(RemoteCatalog::new(3, 0));
        let list = attached(&catalog, 8);
        assert_eq!(list.get(2).map(|row| row.title), Some("Row #0002".to_string()));
        assert_eq!(list.populated_count(), 3);
    }

    #[test]
    fn header_cannot_be_removed() {
        let catalog = Rc::new(RemoteCatalog::new(3, 0));
        let list = attached(&catalog, 3);
        list.len();
        assert!(list.remove(0, 1).is_rejected());
        assert!(list.insert(1, [Row::new(99, "Note")]).is_applied());
        assert_eq!(catalog.row_count(), 4);
        assert_eq!(list.index_of(&Row::new(99, "Note")), Some(1));
    }

    #[test]
    fn released_lists_are_skipped() {
        let catalog = Rc::new(RemoteCatalog::new(5, 1));
        let list = attached(&catalog, 1);
        list.len();
        drop(list);
        assert_eq!(catalog.tick().ok(), Some(0));
        assert_eq!(catalog.pending(), 0);
    }
}
