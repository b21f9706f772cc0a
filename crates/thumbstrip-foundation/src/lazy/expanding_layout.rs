//! Horizontal strip layout with a single expanded cell.
//!
//! Every cell gets a baseline width proportional to the cell height, except
//! the target cell which is widened by an expansion amount. Cells are packed
//! left to right with a fixed spacing, and insets on both ends let the first
//! and last cell reach the viewport center.

use thumbstrip_core::Frame;

use super::item_provider::StripItemProvider;
use super::strip_layout::StripLayout;

/// Baseline cell width as a fraction of the cell height.
pub const DEFAULT_BASELINE_WIDTH_RATIO: f32 = 0.5;

/// Extra width of the expanded cell as a fraction of the cell height.
pub const DEFAULT_EXPANSION_RATIO: f32 = 1.5;

/// Gap between neighboring cells.
pub const DEFAULT_CELL_SPACING: f32 = 1.0;

/// Configuration for [`ExpandingFlowLayout`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpandingLayoutConfig {
    /// Baseline width = `cell_height * baseline_width_ratio`.
    pub baseline_width_ratio: f32,
    /// Expanded width = baseline + `cell_height * expansion_ratio`.
    pub expansion_ratio: f32,
    /// Spacing between items.
    pub spacing: f32,
}

impl Default for ExpandingLayoutConfig {
    fn default() -> Self {
        Self {
            baseline_width_ratio: DEFAULT_BASELINE_WIDTH_RATIO,
            expansion_ratio: DEFAULT_EXPANSION_RATIO,
            spacing: DEFAULT_CELL_SPACING,
        }
    }
}

impl ExpandingLayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn baseline_width_ratio(mut self, ratio: f32) -> Self {
        self.baseline_width_ratio = ratio;
        self
    }

    pub fn expansion_ratio(mut self, ratio: f32) -> Self {
        self.expansion_ratio = ratio;
        self
    }

    pub fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn baseline_width(&self, cell_height: f32) -> f32 {
        cell_height * self.baseline_width_ratio
    }

    pub fn expanded_width(&self, cell_height: f32) -> f32 {
        self.baseline_width(cell_height) + cell_height * self.expansion_ratio
    }
}

/// Computes [`StripLayout`]s from scratch on every invalidation.
///
/// The only thing remembered between passes is which index was expanded
/// last, so callers can tell whether a pass moves the expanded cell.
#[derive(Debug, Default)]
pub struct ExpandingFlowLayout {
    config: ExpandingLayoutConfig,
    last_target: Option<usize>,
}

impl ExpandingFlowLayout {
    pub fn new(config: ExpandingLayoutConfig) -> Self {
        Self {
            config,
            last_target: None,
        }
    }

    pub fn config(&self) -> &ExpandingLayoutConfig {
        &self.config
    }

    /// Target index used by the most recent layout pass.
    pub fn last_target(&self) -> Option<usize> {
        self.last_target
    }

    /// Whether laying out for `target_index` would move the expanded cell.
    pub fn target_differs(&self, target_index: Option<usize>) -> bool {
        self.last_target != target_index
    }

    /// Lays out `items` with `target_index` expanded.
    ///
    /// `target_index = None` (or out of range) yields uniform baseline
    /// widths, which is what the strip shows while dragging before a landing
    /// prediction exists.
    pub fn layout<P>(
        &mut self,
        items: &P,
        target_index: Option<usize>,
        viewport_width: f32,
        cell_height: f32,
    ) -> StripLayout
    where
        P: StripItemProvider + ?Sized,
    {
        let items_count = items.item_count();
        let target_index = target_index.filter(|&index| index < items_count);
        self.last_target = target_index;

        if !viewport_width.is_finite() || !cell_height.is_finite() {
            log::warn!(
                "ExpandingFlowLayout: non-finite bounds ({viewport_width} x {cell_height}), \
                 laying out nothing. Give the strip a constrained size."
            );
            return StripLayout::empty(0.0, 0.0);
        }
        if items_count == 0 || viewport_width <= 0.0 || cell_height <= 0.0 {
            return StripLayout::empty(viewport_width.max(0.0), cell_height.max(0.0));
        }

        let baseline = self.config.baseline_width(cell_height);
        let expanded = self.config.expanded_width(cell_height);
        let spacing = self.config.spacing;
        let width_of = |index: usize| {
            if Some(index) == target_index {
                expanded
            } else {
                baseline
            }
        };

        let leading_inset = ((viewport_width - width_of(0)) / 2.0).max(0.0);
        let trailing_inset = ((viewport_width - width_of(items_count - 1)) / 2.0).max(0.0);

        let mut frames = Vec::with_capacity(items_count);
        let mut current_offset = leading_inset;
        for index in 0..items_count {
            let width = width_of(index);
            frames.push(Frame::new(index, current_offset, 0.0, width, cell_height));
            current_offset += width + spacing;
        }
        // The running offset carries one trailing spacing past the last cell.
        let content_width = current_offset - spacing + trailing_inset;

        log::debug!(
            "laid out {items_count} cells, target {target_index:?}, content width {content_width}"
        );

        StripLayout {
            frames,
            viewport_width,
            cell_height,
            leading_inset,
            trailing_inset,
            content_width,
            target_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lazy::ItemCount;
    use crate::scroll::StripGeometry;

    const VIEWPORT: f32 = 400.0;
    const HEIGHT: f32 = 100.0;

    fn layout(count: usize, target: Option<usize>) -> StripLayout {
        ExpandingFlowLayout::default().layout(&ItemCount(count), target, VIEWPORT, HEIGHT)
    }

    #[test]
    fn test_empty_list() {
        let result = layout(0, Some(0));
        assert!(result.is_empty());
        assert_eq!(result.content_width(), 0.0);
        assert_eq!(result.nearest_index_to_position(10.0), None);
        assert_eq!(result.target_content_offset_for_fling(30.0, 1.0), 0.0);
    }

    #[test]
    fn test_uniform_without_target() {
        let result = layout(5, None);
        assert!(result.frames().iter().all(|f| f.width == 50.0));
        assert_eq!(result.leading_inset(), 175.0);
        // The first baseline cell is centered at offset zero.
        assert_eq!(result.frames()[0].center_x(), VIEWPORT / 2.0);
        assert_eq!(result.centering_offset(0), Some(0.0));
    }

    #[test]
    fn test_exactly_one_cell_expanded() {
        for target in 0..6 {
            let result = layout(6, Some(target));
            let expanded: Vec<usize> = result
                .frames()
                .iter()
                .filter(|f| f.width == 200.0)
                .map(|f| f.index)
                .collect();
            assert_eq!(expanded, vec![target]);
            assert!(result
                .frames()
                .iter()
                .filter(|f| f.index != target)
                .all(|f| f.width == 50.0));
        }
    }

    #[test]
    fn test_out_of_range_target_is_uniform() {
        let result = layout(3, Some(7));
        assert_eq!(result.target_index(), None);
        assert!(result.frames().iter().all(|f| f.width == 50.0));
    }

    #[test]
    fn test_cumulative_offsets_are_contiguous() {
        for target in [None, Some(0), Some(3), Some(9)] {
            let result = layout(10, target);
            let frames = result.frames();
            let mut running = result.leading_inset();
            for (i, frame) in frames.iter().enumerate() {
                assert_eq!(frame.x, running, "frame {i} for target {target:?}");
                running += frame.width + 1.0;
            }
            let last = frames.last().unwrap();
            assert_eq!(
                result.content_width(),
                last.max_x() + result.trailing_inset()
            );
        }
    }

    #[test]
    fn test_every_item_can_be_centered() {
        for target in 0..5 {
            let result = layout(5, Some(target));
            let offset = result.centering_offset(target).unwrap();
            let frame = result.frame_for_index(target).unwrap();
            assert_eq!(frame.center_x() - offset, VIEWPORT / 2.0);
            assert_eq!(result.centered_index_for_offset(offset), Some(target));
        }
    }

    #[test]
    fn test_centering_offset_for_middle_item() {
        let result = layout(5, Some(2));
        // 175 + 2 * 51 = 277, center at 377, minus half the viewport.
        assert_eq!(result.centering_offset(2), Some(177.0));
        assert_eq!(result.centering_offset(5), None);
    }

    #[test]
    fn test_nearest_outside_content_is_none() {
        let result = layout(3, None);
        assert_eq!(result.nearest_index_to_position(10.0), None);
        assert_eq!(result.nearest_index_to_position(175.0), Some(0));
        let last = result.frames().last().unwrap().max_x();
        assert_eq!(result.nearest_index_to_position(last + 0.5), None);
    }

    #[test]
    fn test_nearest_tie_picks_lower_index() {
        let result = layout(3, None);
        // Centers at 200 and 251; the midpoint is equidistant.
        assert_eq!(result.nearest_index_to_position(225.5), Some(0));
        assert_eq!(result.nearest_index_to_position(225.6), Some(1));
    }

    #[test]
    fn test_fling_snaps_to_nearest_center() {
        let result = layout(10, None);
        // Item 3 is centered at offset 3 * 51 = 153.
        assert_eq!(result.target_content_offset_for_fling(160.0, 2.0), 153.0);
        assert_eq!(result.target_content_offset_for_fling(-300.0, -5.0), 0.0);
        assert_eq!(
            result.target_content_offset_for_fling(10_000.0, 5.0),
            result.max_offset()
        );
    }

    #[test]
    fn test_visible_range() {
        let result = layout(20, None);
        // Viewport [0, 400) covers x up to 400: cells 0..=4 start before 400.
        assert_eq!(result.visible_range(0.0, 0), 0..5);
        assert_eq!(result.visible_range(0.0, 2), 0..7);
        assert_eq!(result.visible_range(510.0, 1), 5..16);
        assert_eq!(layout(0, None).visible_range(0.0, 2), 0..0);
    }

    #[test]
    fn test_relayout_tracks_last_target() {
        let mut flow = ExpandingFlowLayout::default();
        assert!(!flow.target_differs(None));
        flow.layout(&ItemCount(4), Some(2), VIEWPORT, HEIGHT);
        assert_eq!(flow.last_target(), Some(2));
        assert!(!flow.target_differs(Some(2)));
        assert!(flow.target_differs(None));
    }

    #[test]
    fn test_degenerate_bounds() {
        let mut flow = ExpandingFlowLayout::default();
        assert!(flow.layout(&ItemCount(4), None, 0.0, HEIGHT).is_empty());
        assert!(flow
            .layout(&ItemCount(4), None, f32::INFINITY, HEIGHT)
            .is_empty());
    }
}
