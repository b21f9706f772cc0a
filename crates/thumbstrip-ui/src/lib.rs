//! Thumbnail strip widget.
//!
//! [`ThumbnailStrip`] composes the phase machine, the index reconciler and
//! the expanding layout from `thumbstrip-foundation`, owns the item snapshot
//! and the visible cells, and relays image fetch results and list changes
//! onto its single update timeline.

mod asset;
mod cell;
mod change;
pub mod image;
pub mod widgets;

pub use asset::*;
pub use cell::*;
pub use change::*;
pub use image::{
    ContentMode, ImageDelivery, ImageQuality, ImageRequest, ImageSink, ImageSource,
    QualityPreference, RequestId,
};
pub use widgets::*;

pub use thumbstrip_core::{Frame, Size};
pub use thumbstrip_foundation::lazy::{
    CellId, ExpandingLayoutConfig, SlotReusePolicy, StripLayout,
};
pub use thumbstrip_foundation::scroll::{
    DragSelectionPolicy, IndexTracking, ScrollEvent, ScrollPhase, StripEvent, StripGeometry,
};
