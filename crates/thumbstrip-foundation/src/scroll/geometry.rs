//! Geometry queries the reconciler asks of the layout.

use thumbstrip_core::Frame;

/// Position-to-index lookup over a laid-out strip.
///
/// Positions are in content coordinates along the horizontal axis.
pub trait StripGeometry {
    /// Index of the item whose center is closest to `position`.
    ///
    /// Returns `None` when there are no items or when `position` lies outside
    /// the content span (before the first cell or after the last one). On an
    /// exact tie the lower index wins.
    fn nearest_index_to_position(&self, position: f32) -> Option<usize>;

    /// Frame of the item at `index`, if it exists.
    fn frame_for_index(&self, index: usize) -> Option<Frame>;

    /// Width of the viewport the strip is shown in.
    fn viewport_width(&self) -> f32;

    /// Index of the item centered in the viewport when scrolled to `offset`.
    fn centered_index_for_offset(&self, offset: f32) -> Option<usize> {
        self.nearest_index_to_position(offset + self.viewport_width() / 2.0)
    }
}

/// Nearest-center search over frames sorted by `x`.
///
/// Shared by every [`StripGeometry`] implementation so the tie-break stays
/// identical everywhere: strictly closer wins, equal distance keeps the
/// earlier (lower) index.
pub fn nearest_frame_index(frames: &[Frame], position: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for frame in frames {
        let distance = (frame.center_x() - position).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((frame.index, distance)),
        }
    }
    best.map(|(index, _)| index)
}
