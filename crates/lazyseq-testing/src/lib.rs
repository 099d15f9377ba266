//! Testing utilities and harness for lazyseq
//!
//! - [`RecordingProvider`] answers requests synchronously and records every call.
//! - [`DeferredProvider`] queues requests until the test pumps it, simulating
//!   a provider that answers asynchronously.
//! - [`ChangeLog`] records every notification a list emits.

pub mod change_log;
pub mod deferred;
pub mod recording;

pub use change_log::ChangeLog;
pub use deferred::DeferredProvider;
pub use recording::{ProviderCall, RecordingProvider};

pub mod prelude {
    pub use crate::change_log::ChangeLog;
    pub use crate::deferred::DeferredProvider;
    pub use crate::recording::{ProviderCall, RecordingProvider};
    pub use lazyseq_core::{
        ContentChange, EditOutcome, LengthChange, ListChange, ListConfig, ListProvider,
        SparseList, Support,
    };
}
