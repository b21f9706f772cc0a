//! Strip layout and cell bookkeeping.
//!
//! - [`ExpandingFlowLayout`] - Packs cells left to right with one expanded cell
//! - [`StripLayout`] - Immutable result of a layout pass, answers geometry queries
//! - [`StripItemProvider`] - Read-only view of the backing item list
//! - [`SlotReusePool`] - Recycles cells that scrolled out of view

mod expanding_layout;
mod item_provider;
mod slot_reuse;
mod strip_layout;

pub use expanding_layout::*;
pub use item_provider::*;
pub use slot_reuse::*;
pub use strip_layout::*;
