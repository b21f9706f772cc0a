//! Result of a strip layout pass.

use std::ops::Range;

use thumbstrip_core::Frame;

use crate::scroll::{nearest_frame_index, StripGeometry};

/// Frames and content metrics computed by [`ExpandingFlowLayout`].
///
/// A `StripLayout` never changes after it is built; every invalidation
/// produces a fresh one.
///
/// [`ExpandingFlowLayout`]: super::ExpandingFlowLayout
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StripLayout {
    pub(crate) frames: Vec<Frame>,
    pub(crate) viewport_width: f32,
    pub(crate) cell_height: f32,
    pub(crate) leading_inset: f32,
    pub(crate) trailing_inset: f32,
    pub(crate) content_width: f32,
    pub(crate) target_index: Option<usize>,
}

impl StripLayout {
    /// A layout with no items.
    pub fn empty(viewport_width: f32, cell_height: f32) -> Self {
        Self {
            viewport_width,
            cell_height,
            ..Self::default()
        }
    }

    /// Frames in index order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn item_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn cell_height(&self) -> f32 {
        self.cell_height
    }

    /// The expanded item this layout was computed for.
    pub fn target_index(&self) -> Option<usize> {
        self.target_index
    }

    /// Inset before the first cell.
    pub fn leading_inset(&self) -> f32 {
        self.leading_inset
    }

    /// Inset after the last cell.
    pub fn trailing_inset(&self) -> f32 {
        self.trailing_inset
    }

    /// Total scrollable width including both insets.
    pub fn content_width(&self) -> f32 {
        self.content_width
    }

    /// Largest valid content offset.
    pub fn max_offset(&self) -> f32 {
        (self.content_width - self.viewport_width).max(0.0)
    }

    pub fn clamp_offset(&self, offset: f32) -> f32 {
        offset.clamp(0.0, self.max_offset())
    }

    /// Content offset that puts the center of `index` at the viewport center.
    pub fn centering_offset(&self, index: usize) -> Option<f32> {
        let frame = self.frames.get(index)?;
        Some(self.clamp_offset(frame.center_x() - self.viewport_width / 2.0))
    }

    /// Snap target for an inertial scroll proposed to end at `proposed_offset`.
    ///
    /// Picks the item whose center is closest to the proposed viewport center
    /// (lower index on a tie) and returns the offset that centers it. A
    /// proposal past either end snaps to the nearest edge item.
    pub fn target_content_offset_for_fling(&self, proposed_offset: f32, _velocity: f32) -> f32 {
        let (Some(first), Some(last)) = (self.frames.first(), self.frames.last()) else {
            return self.clamp_offset(proposed_offset);
        };
        let center = (proposed_offset + self.viewport_width / 2.0).clamp(first.x, last.max_x());
        nearest_frame_index(&self.frames, center)
            .and_then(|index| self.centering_offset(index))
            .unwrap_or_else(|| self.clamp_offset(proposed_offset))
    }

    /// Indices of the cells intersecting the viewport at `offset`, widened by
    /// `beyond_bounds` items on each side.
    pub fn visible_range(&self, offset: f32, beyond_bounds: usize) -> Range<usize> {
        if self.frames.is_empty() || self.viewport_width <= 0.0 {
            return 0..0;
        }
        let end_x = offset + self.viewport_width;
        let start = self.frames.partition_point(|frame| frame.max_x() <= offset);
        let end = self.frames.partition_point(|frame| frame.x < end_x);
        if start >= end {
            return 0..0;
        }
        start.saturating_sub(beyond_bounds)..(end + beyond_bounds).min(self.frames.len())
    }
}

impl StripGeometry for StripLayout {
    fn nearest_index_to_position(&self, position: f32) -> Option<usize> {
        let first = self.frames.first()?;
        let last = self.frames.last()?;
        if position < first.x || position > last.max_x() {
            return None;
        }
        nearest_frame_index(&self.frames, position)
    }

    fn frame_for_index(&self, index: usize) -> Option<Frame> {
        self.frames.get(index).copied()
    }

    fn viewport_width(&self) -> f32 {
        self.viewport_width
    }
}
