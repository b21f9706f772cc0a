//! Interaction core of the thumbnail strip.
//!
//! - [`scroll`] turns raw scroll callbacks into phases and reconciles them
//!   into deduplicated drag/scroll/select index events.
//! - [`lazy`] lays out the strip with a single expanded cell and tracks
//!   reusable cell slots.

pub mod lazy;
pub mod scroll;

pub use thumbstrip_core::{Frame, Size};
