//! Hash map alias for the cell slot pool.
//!
//! The pool looks cells up by item index and items up by cell id on every
//! scroll sample, so the map defaults to Fx hashing over those small integer
//! keys. The `std-hash` feature switches back to the std hasher.

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::HashMap;
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use rustc_hash::FxHashMap as HashMap;
}
