//! Scroll phase tracking and index reconciliation.
//!
//! The gesture source delivers a fixed ordered sequence of callbacks
//! ([`ScrollEvent`]). [`ScrollPhaseMachine`] collapses them into distinct
//! [`ScrollPhase`] changes, and [`IndexReconciler`] turns phase changes plus
//! a [`StripGeometry`] query into drag/scroll/select index events.

mod geometry;
mod phase;
mod reconciler;

pub use geometry::*;
pub use phase::*;
pub use reconciler::*;
