//! Hash map used for internal bookkeeping.
//!
//! Keys are small integers, so the `rustc-hash` hasher is used unless the
//! `std-hash` feature asks for the standard one.

#[cfg(feature = "std-hash")]
pub(crate) use std::collections::HashMap;

#[cfg(not(feature = "std-hash"))]
pub(crate) use rustc_hash::FxHashMap as HashMap;

pub(crate) fn new_map<K, V>() -> HashMap<K, V> {
    HashMap::default()
}
