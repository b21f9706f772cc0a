//! Shared primitives for the thumbstrip crates.
//!
//! Geometry types used by the layout and the widget, plus the hash map
//! aliases every crate in the workspace uses.

pub mod collections;
mod geometry;

pub use geometry::*;
