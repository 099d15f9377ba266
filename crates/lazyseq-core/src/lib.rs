//! Lazily populated sparse sequences.
//!
//! A [`SparseList`] looks like an ordinary indexable sequence of declared
//! length, but its elements are only materialised when first read. Missing
//! elements are requested from an attached [`ListProvider`], widened to an
//! aligned fetch window so that clustered reads coalesce into few requests.
//! Providers answer synchronously or later; consumers learn about new data
//! through [`ListChange`] notifications and re-read.
//!
//! # Architecture
//!
//! - [`ElementCache`] - sparse index to element storage
//! - [`LengthState`] - optional, lazily resolved declared length
//! - [`fetch_window`] / [`RequestedRanges`] - request coalescing
//! - [`ListProvider`] - optional provider capabilities
//! - [`SparseList::replace`] - structural edits behind provider authorization
//!
//! # Example
//!
//! ```
//! use lazyseq_core::{ListConfig, ListProvider, SparseList, Support};
//! use std::ops::Range;
//! use std::rc::Rc;
//!
//! struct Tens;
//!
//! impl ListProvider<usize> for Tens {
//!     fn resolve_length(&self, list: &SparseList<usize>) -> Support {
//!         list.set_length(Some(10));
//!         Support::Supported(())
//!     }
//!
//!     fn fetch_range(&self, list: &SparseList<usize>, range: Range<usize>) -> Support {
//!         list.write_range(range.clone(), range.map(|i| i * 10));
//!         Support::Supported(())
//!     }
//! }
//!
//! let list = SparseList::<usize>::with_config(ListConfig::unresolved().with_fetch_window_size(5));
//! list.set_provider(Some(Rc::new(Tens)));
//! assert_eq!(list.get(7), Some(70));
//! assert_eq!(list.peek(5), Some(50));
//! ```

mod cache;
mod change;
mod collections;
mod config;
mod edit;
mod error;
mod length;
mod list;
mod provider;
mod window;

pub use cache::ElementCache;
pub use change::{ChangeObserver, ContentChange, ListChange, ObserverHandle};
pub use config::ListConfig;
pub use edit::{EditOutcome, EditPhase};
pub use error::ListError;
pub use length::{LengthChange, LengthState};
pub use list::{SparseList, WeakSparseList};
pub use provider::{ListProvider, Support};
pub use window::{fetch_window, RequestedRanges, DEFAULT_FETCH_WINDOW_SIZE};
