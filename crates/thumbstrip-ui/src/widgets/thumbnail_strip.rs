//! ThumbnailStrip widget implementation.
//!
//! The strip is driven from a single UI timeline: the host feeds it its
//! viewport size, the raw scroll callbacks and the item list, and applies the
//! [`ScrollRequest`]s it hands back. Image results arrive on a channel and
//! are applied in [`ThumbnailStrip::process_image_deliveries`].

use std::sync::mpsc::{channel, Receiver, Sender};

use indexmap::IndexMap;
use smallvec::SmallVec;
use thumbstrip_core::Size;
use thumbstrip_foundation::lazy::{
    CellId, ExpandingFlowLayout, ExpandingLayoutConfig, SlotReusePolicy, SlotReusePool,
    StripLayout,
};
use thumbstrip_foundation::scroll::{
    DragSelectionPolicy, IndexChanges, IndexReconciler, IndexTracking, ScrollEvent, ScrollPhase,
    ScrollPhaseMachine, StripEvent,
};

use crate::asset::{AssetHandle, AssetSnapshot};
use crate::cell::{CellBinding, ThumbnailCell};
use crate::change::ItemChangeDetails;
use crate::image::{
    ContentMode, ImageDelivery, ImageRequest, ImageSink, ImageSource, QualityPreference,
    RequestId,
};

/// Offsets closer than this are considered already centered.
const CENTERING_TOLERANCE: f32 = 0.5;

/// Specification for ThumbnailStrip behavior.
#[derive(Clone, Debug)]
pub struct ThumbnailStripSpec {
    /// Cell sizing and spacing.
    pub layout: ExpandingLayoutConfig,
    /// Number of cells bound beyond the visible bounds on each side.
    pub beyond_bounds_item_count: usize,
    /// Logical to device pixel factor used for image requests.
    pub scale_factor: f32,
    pub content_mode: ContentMode,
    /// Request only fast images while the strip is moving.
    pub low_quality_while_scrolling: bool,
    pub drag_selection_policy: DragSelectionPolicy,
    pub index_tracking: IndexTracking,
    pub reuse_policy: SlotReusePolicy,
}

impl Default for ThumbnailStripSpec {
    fn default() -> Self {
        Self {
            layout: ExpandingLayoutConfig::default(),
            beyond_bounds_item_count: 2,
            scale_factor: 1.0,
            content_mode: ContentMode::AspectFill,
            low_quality_while_scrolling: true,
            drag_selection_policy: DragSelectionPolicy::default(),
            index_tracking: IndexTracking::default(),
            reuse_policy: SlotReusePolicy::default(),
        }
    }
}

impl ThumbnailStripSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(mut self, layout: ExpandingLayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn beyond_bounds_item_count(mut self, count: usize) -> Self {
        self.beyond_bounds_item_count = count;
        self
    }

    pub fn scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn content_mode(mut self, content_mode: ContentMode) -> Self {
        self.content_mode = content_mode;
        self
    }

    pub fn low_quality_while_scrolling(mut self, enabled: bool) -> Self {
        self.low_quality_while_scrolling = enabled;
        self
    }

    pub fn drag_selection_policy(mut self, policy: DragSelectionPolicy) -> Self {
        self.drag_selection_policy = policy;
        self
    }

    pub fn index_tracking(mut self, tracking: IndexTracking) -> Self {
        self.index_tracking = tracking;
        self
    }

    pub fn reuse_policy(mut self, policy: SlotReusePolicy) -> Self {
        self.reuse_policy = policy;
        self
    }
}

/// Content offset the host should scroll to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRequest {
    pub offset: f32,
    /// Animated requests are expected to report progress through
    /// [`ScrollEvent::PositionChanged`] and finish with
    /// [`ScrollEvent::EndScrollAnimation`].
    pub animated: bool,
}

/// Receives the strip's outward index events.
///
/// Each channel reports a value at most once in a row. After a gesture the
/// select event comes after that gesture's drag and scroll events.
pub trait ThumbnailStripListener {
    /// The item under the viewport center while the user drags.
    fn did_drag_item_at(&mut self, _index: usize) {}
    /// The item under the viewport center while the strip decelerates.
    fn did_scroll_item_at(&mut self, _index: usize) {}
    /// The item the strip settled on, or the one the user tapped.
    fn did_select_item_at(&mut self, _index: usize) {}
}

/// Horizontal strip of thumbnails with one expanded, centered item.
pub struct ThumbnailStrip<S: ImageSource> {
    spec: ThumbnailStripSpec,
    source: S,
    listener: Option<Box<dyn ThumbnailStripListener>>,
    items: AssetSnapshot<S::Asset>,
    machine: ScrollPhaseMachine,
    reconciler: IndexReconciler,
    flow: ExpandingFlowLayout,
    layout: StripLayout,
    viewport: Size,
    content_offset: f32,
    layout_dirty: bool,
    /// Selection waiting for the next committed layout pass.
    pending_selection: Option<usize>,
    pending_scroll: Option<ScrollRequest>,
    /// `Some` from `BeginDrag` until the gesture reports a phase; holds the
    /// target the gesture started from.
    resting_before_drag: Option<Option<usize>>,
    slots: SlotReusePool,
    cells: IndexMap<CellId, ThumbnailCell<S::Image>>,
    next_request: u64,
    deliveries_tx: Sender<ImageDelivery<S::Image>>,
    deliveries_rx: Receiver<ImageDelivery<S::Image>>,
}

impl<S: ImageSource> ThumbnailStrip<S> {
    pub fn new(source: S, spec: ThumbnailStripSpec) -> Self {
        let (deliveries_tx, deliveries_rx) = channel();
        Self {
            reconciler: IndexReconciler::new(spec.drag_selection_policy),
            flow: ExpandingFlowLayout::new(spec.layout),
            slots: SlotReusePool::with_policy(spec.reuse_policy.clone()),
            spec,
            source,
            listener: None,
            items: AssetSnapshot::empty(),
            machine: ScrollPhaseMachine::new(),
            layout: StripLayout::default(),
            viewport: Size::ZERO,
            content_offset: 0.0,
            layout_dirty: true,
            pending_selection: None,
            pending_scroll: None,
            resting_before_drag: None,
            cells: IndexMap::new(),
            next_request: 0,
            deliveries_tx,
            deliveries_rx,
        }
    }

    pub fn set_listener(&mut self, listener: impl ThumbnailStripListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn spec(&self) -> &ThumbnailStripSpec {
        &self.spec
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn items(&self) -> &AssetSnapshot<S::Asset> {
        &self.items
    }

    pub fn phase(&self) -> ScrollPhase {
        self.machine.phase()
    }

    pub fn target_index(&self) -> Option<usize> {
        self.reconciler.target_index()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.reconciler.selected_index()
    }

    /// The most recently committed layout.
    pub fn layout(&self) -> &StripLayout {
        &self.layout
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn content_offset(&self) -> f32 {
        self.content_offset
    }

    /// Whether a list replacement or resize has not been laid out yet.
    pub fn is_layout_pending(&self) -> bool {
        self.layout_dirty
    }

    /// Takes the scroll the host should perform next, if any.
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.pending_scroll.take()
    }

    /// Cells in creation order, bound or pooled.
    pub fn cells(&self) -> impl Iterator<Item = &ThumbnailCell<S::Image>> {
        self.cells.values()
    }

    pub fn cell(&self, id: CellId) -> Option<&ThumbnailCell<S::Image>> {
        self.cells.get(&id)
    }

    /// Cell currently bound to `index`.
    pub fn cell_for_index(&self, index: usize) -> Option<&ThumbnailCell<S::Image>> {
        self.slots
            .cell_for_index(index)
            .and_then(|id| self.cells.get(&id))
    }

    /// Number of cells bound to an item.
    pub fn bound_cell_count(&self) -> usize {
        self.slots.in_use_count()
    }

    /// Replaces the item list.
    ///
    /// Index state is reset because indices from the previous list mean
    /// nothing in the new one. `selected_index` is applied, without a select
    /// event, by the next committed layout pass together with a non-animated
    /// centering scroll. `None` shows an empty strip.
    pub fn set_items(&mut self, items: Option<AssetSnapshot<S::Asset>>, selected_index: usize) {
        self.items = items.unwrap_or_default();
        self.reconciler.reset(self.items.len());
        for id in self.slots.release_all() {
            if let Some(cell) = self.cells.get_mut(&id) {
                cell.unbind();
            }
        }
        self.drop_discarded_cells();
        self.pending_selection = Some(selected_index);
        self.pending_scroll = None;
        self.resting_before_drag = self.resting_before_drag.map(|_| None);
        self.layout_dirty = true;
        log::debug!(
            "strip items replaced: {} items, selection {selected_index} pending",
            self.items.len()
        );
        if !self.flush_layout() {
            // Frames of the previous list must not answer geometry queries
            // until the new one is laid out.
            self.layout = StripLayout::empty(
                self.viewport.width.max(0.0),
                self.viewport.height.max(0.0),
            );
            self.content_offset = 0.0;
        }
    }

    /// Reacts to a change notification from the item source.
    ///
    /// Keeps the selected asset selected when it survived the change, else
    /// falls back to the first item.
    pub fn items_did_change(
        &mut self,
        items: Option<AssetSnapshot<S::Asset>>,
        details: &ItemChangeDetails,
    ) {
        let selected_key = self
            .pending_selection
            .or(self.reconciler.selected_index())
            .and_then(|index| self.items.key_at(index));
        let items = items.unwrap_or_default();
        let selected = selected_key
            .and_then(|key| items.index_of_key(key))
            .unwrap_or(0);
        log::debug!(
            "item source changed (structural: {}, removed {}, inserted {}, changed {})",
            details.is_structural(),
            details.removed_indices.len(),
            details.inserted_indices.len(),
            details.changed_indices.len()
        );
        self.set_items(Some(items), selected);
    }

    /// Sets the viewport size and lays out again when it changed.
    pub fn measure(&mut self, viewport: Size) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.layout_dirty = true;
        }
        self.flush_layout();
    }

    /// Commits a pending layout, applying a deferred selection.
    ///
    /// Returns `false` when nothing was pending or the viewport is still
    /// empty; in the latter case the pending work waits for [`measure`].
    ///
    /// [`measure`]: Self::measure
    pub fn flush_layout(&mut self) -> bool {
        if !self.layout_dirty || self.viewport.is_empty() {
            return false;
        }
        let selection = self.pending_selection.take();
        if let Some(changes) = selection.and_then(|index| self.reconciler.select_explicit(index, false))
        {
            self.apply_changes(&changes);
        }
        if self.layout_dirty {
            self.relayout();
        }
        match selection.and_then(|index| self.layout.centering_offset(index)) {
            Some(offset) => self.request_scroll(offset, false),
            None => self.populate_cells(),
        }
        true
    }

    /// Host-driven selection. Never fires a select event; the item is
    /// centered even when it was already selected.
    pub fn select_item(&mut self, index: usize, animated: bool) {
        self.flush_layout();
        if self.layout_dirty {
            self.pending_selection = Some(index);
            return;
        }
        if let Some(changes) = self.reconciler.select_explicit(index, false) {
            self.apply_changes(&changes);
        }
        if let Some(offset) = self.layout.centering_offset(index) {
            self.request_scroll(offset, animated);
        }
    }

    /// The user tapped `cell`. Selects its item with a select event and
    /// animates it to the center. Returns `false` for an unbound cell.
    pub fn tap_cell(&mut self, cell: CellId) -> bool {
        self.flush_layout();
        let Some(index) = self.slots.index_of_cell(cell) else {
            log::debug!("tap on unbound cell {cell:?}");
            return false;
        };
        if let Some(changes) = self.reconciler.select_explicit(index, true) {
            self.apply_changes(&changes);
        }
        if let Some(offset) = self.layout.centering_offset(index) {
            self.request_scroll(offset, true);
        }
        true
    }

    /// Feeds one raw scroll callback.
    ///
    /// For [`ScrollEvent::WillEndDrag`] returns the offset the deceleration
    /// should land on: the predicted cell is expanded first and then
    /// centered.
    pub fn dispatch(&mut self, event: ScrollEvent) -> Option<f32> {
        self.flush_layout();

        let mut snapped = None;
        match event {
            ScrollEvent::BeginDrag => {
                self.pending_scroll = None;
                self.resting_before_drag = Some(self.reconciler.target_index());
                let changes = self.reconciler.on_begin_drag();
                self.apply_changes(&changes);
            }
            ScrollEvent::PositionChanged { offset } => self.content_offset = offset,
            ScrollEvent::WillEndDrag { .. } if self.is_resting_touch() => {
                if let Some(resting) = self.resting_before_drag.take() {
                    self.settle_in_place(resting);
                }
                snapped = Some(self.content_offset);
            }
            ScrollEvent::WillEndDrag {
                velocity,
                target_offset,
            } => {
                let before = self.reconciler.target_index();
                let landing = self.reconciler.on_will_end_drag(target_offset, &self.layout);
                if self.reconciler.target_index() != before {
                    self.invalidate();
                }
                snapped = Some(
                    landing
                        .and_then(|index| self.layout.centering_offset(index))
                        .unwrap_or_else(|| {
                            self.layout
                                .target_content_offset_for_fling(target_offset, velocity)
                        }),
                );
            }
            ScrollEvent::EndScrollAnimation => {
                if self
                    .reconciler
                    .on_scroll_animation_ended(self.content_offset, &self.layout)
                    .is_some()
                {
                    self.invalidate();
                }
            }
            _ => {}
        }

        if let Some(phase) = self.machine.consume(event) {
            self.resting_before_drag = None;
            let changes = self
                .reconciler
                .on_phase_changed(phase, self.content_offset, &self.layout);
            let target_changed = self.apply_changes(&changes);
            if phase == ScrollPhase::Idle {
                self.settle(target_changed);
            }
        } else if let ScrollEvent::PositionChanged { offset } = event {
            if self.spec.index_tracking == IndexTracking::Continuous {
                let changes =
                    self.reconciler
                        .on_position_changed(self.machine.phase(), offset, &self.layout);
                self.apply_changes(&changes);
            }
        } else if matches!(
            event,
            ScrollEvent::EndDragNoDecel | ScrollEvent::EndDecelerate
        ) && self.machine.phase() == ScrollPhase::Idle
        {
            // The gesture ended without the content moving; Idle was never
            // left, so no phase change announces the rest.
            if let Some(resting) = self.resting_before_drag.take() {
                self.settle_in_place(resting);
            }
        }

        if matches!(event, ScrollEvent::PositionChanged { .. }) {
            self.populate_cells();
        }
        snapped
    }

    /// Applies image results that arrived since the last call. Returns how
    /// many were applied; stale ones are dropped.
    pub fn process_image_deliveries(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(delivery) = self.deliveries_rx.try_recv() {
            let cell_id = delivery.cell;
            match self.cells.get_mut(&cell_id) {
                Some(cell) => {
                    if cell.apply_delivery(delivery) {
                        applied += 1;
                    }
                }
                None => log::debug!("dropping image for discarded cell {cell_id:?}"),
            }
        }
        applied
    }

    /// Reports events and updates highlights. Returns whether the target
    /// moved, in which case the layout was already invalidated.
    fn apply_changes(&mut self, changes: &IndexChanges) -> bool {
        if let Some(selection) = changes.selection {
            if let Some(cell) = selection.deselected.and_then(|index| self.cell_at_mut(index)) {
                cell.set_selected(false);
            }
            if let Some(cell) = selection.selected.and_then(|index| self.cell_at_mut(index)) {
                cell.set_selected(true);
            }
        }
        if changes.target_changed {
            self.invalidate();
        }
        if let Some(listener) = self.listener.as_mut() {
            for event in changes.events() {
                log::debug!("strip event {event:?}");
                match event {
                    StripEvent::Drag(index) => listener.did_drag_item_at(index),
                    StripEvent::Scroll(index) => listener.did_scroll_item_at(index),
                    StripEvent::Select(index) => listener.did_select_item_at(index),
                }
            }
        }
        changes.target_changed
    }

    /// The strip came to rest.
    fn settle(&mut self, target_changed: bool) {
        if target_changed {
            let offset = self
                .reconciler
                .target_index()
                .and_then(|index| self.layout.centering_offset(index));
            if let Some(offset) = offset {
                if (offset - self.content_offset).abs() > CENTERING_TOLERANCE {
                    self.request_scroll(offset, true);
                }
            }
        }

        let scale = self.spec.scale_factor;
        let upgrades: SmallVec<[(CellId, usize, Size); 8]> = self
            .cells
            .values()
            .filter(|cell| cell.needs_quality_upgrade())
            .filter_map(|cell| Some((cell.id(), cell.index()?, cell.frame().size().scaled(scale))))
            .collect();
        for (id, index, pixel_size) in upgrades {
            self.fetch(id, index, pixel_size, QualityPreference::Opportunistic);
        }
    }

    /// A drag began from rest and has not moved the content yet.
    fn is_resting_touch(&self) -> bool {
        self.machine.is_drag_pending() && self.machine.phase() == ScrollPhase::Idle
    }

    fn settle_in_place(&mut self, resting: Option<usize>) {
        log::debug!("gesture ended in place, resting item {resting:?}");
        let changes =
            self.reconciler
                .on_gesture_ended_in_place(resting, self.content_offset, &self.layout);
        let target_changed = self.apply_changes(&changes);
        self.settle(target_changed);
    }

    /// Marks the layout stale and recomputes it when a viewport is known.
    fn invalidate(&mut self) {
        self.layout_dirty = true;
        if !self.viewport.is_empty() {
            self.relayout();
            self.populate_cells();
        }
    }

    fn relayout(&mut self) {
        let target = self.reconciler.target_index();
        if self.flow.target_differs(target) {
            log::debug!("expanded item {:?} -> {target:?}", self.flow.last_target());
        }
        self.layout = self.flow.layout(
            &self.items,
            target,
            self.viewport.width,
            self.viewport.height,
        );
        self.content_offset = self.layout.clamp_offset(self.content_offset);
        self.layout_dirty = false;
    }

    fn request_scroll(&mut self, offset: f32, animated: bool) {
        let offset = self.layout.clamp_offset(offset);
        if !animated {
            self.content_offset = offset;
            self.populate_cells();
        }
        self.pending_scroll = Some(ScrollRequest { offset, animated });
    }

    /// Binds cells to the items around the viewport and requests images for
    /// the ones that need them.
    fn populate_cells(&mut self) {
        let range = self
            .layout
            .visible_range(self.content_offset, self.spec.beyond_bounds_item_count);
        for id in self.slots.release_outside(range.clone()) {
            if let Some(cell) = self.cells.get_mut(&id) {
                cell.unbind();
            }
        }
        self.drop_discarded_cells();

        let quality = if self.spec.low_quality_while_scrolling
            && self.machine.phase() != ScrollPhase::Idle
        {
            QualityPreference::FastOnly
        } else {
            QualityPreference::Opportunistic
        };
        let selected = self.reconciler.selected_index();
        let scale = self.spec.scale_factor;

        let mut fetches: SmallVec<[(CellId, usize, Size); 8]> = SmallVec::new();
        for index in range {
            let (Some(frame), Some(asset_key)) = (
                self.layout.frames().get(index).copied(),
                self.items.key_at(index),
            ) else {
                continue;
            };
            let id = self.slots.acquire(index).cell();
            let cell = self
                .cells
                .entry(id)
                .or_insert_with(|| ThumbnailCell::new(id));
            cell.bind(CellBinding { index, asset_key }, frame);
            cell.set_selected(selected == Some(index));
            let pixel_size = frame.size().scaled(scale);
            if cell.needs_fetch(pixel_size) {
                fetches.push((id, index, pixel_size));
            }
        }
        for (id, index, pixel_size) in fetches {
            self.fetch(id, index, pixel_size, quality);
        }
    }

    fn fetch(&mut self, cell_id: CellId, index: usize, pixel_size: Size, quality: QualityPreference) {
        let Some(asset) = self.items.item_at(index) else {
            return;
        };
        let Some(cell) = self.cells.get_mut(&cell_id) else {
            return;
        };
        let request = ImageRequest {
            id: RequestId(self.next_request),
            target_size: pixel_size,
            content_mode: self.spec.content_mode,
            quality,
        };
        self.next_request += 1;
        cell.begin_request(request.id, pixel_size, quality);
        log::trace!("fetch {:?} for item {index} into {cell_id:?}", request);
        let sink = ImageSink::new(cell_id, asset.asset_key(), &request, self.deliveries_tx.clone());
        self.source.fetch(asset, request, sink);
    }

    fn cell_at_mut(&mut self, index: usize) -> Option<&mut ThumbnailCell<S::Image>> {
        let id = self.slots.cell_for_index(index)?;
        self.cells.get_mut(&id)
    }

    fn drop_discarded_cells(&mut self) {
        for id in self.slots.take_discarded() {
            self.cells.shift_remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::image::ImageQuality;

    #[derive(Debug, Clone)]
    struct Photo(u64);

    impl AssetHandle for Photo {
        fn asset_key(&self) -> u64 {
            self.0
        }
    }

    #[derive(Default)]
    struct QueueSource {
        pending: RefCell<Vec<(u64, ImageRequest, ImageSink<u64>)>>,
    }

    impl ImageSource for QueueSource {
        type Asset = Photo;
        type Image = u64;

        fn fetch(&self, asset: &Photo, request: ImageRequest, sink: ImageSink<u64>) {
            self.pending.borrow_mut().push((asset.0, request, sink));
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<StripEvent>>>);

    impl ThumbnailStripListener for Recorder {
        fn did_drag_item_at(&mut self, index: usize) {
            self.0.borrow_mut().push(StripEvent::Drag(index));
        }
        fn did_scroll_item_at(&mut self, index: usize) {
            self.0.borrow_mut().push(StripEvent::Scroll(index));
        }
        fn did_select_item_at(&mut self, index: usize) {
            self.0.borrow_mut().push(StripEvent::Select(index));
        }
    }

    fn photos(keys: std::ops::Range<u64>) -> AssetSnapshot<Photo> {
        keys.map(Photo).collect::<Vec<_>>().into()
    }

    fn strip(count: u64, selected: usize) -> (ThumbnailStrip<QueueSource>, Recorder) {
        let mut strip = ThumbnailStrip::new(QueueSource::default(), ThumbnailStripSpec::default());
        let recorder = Recorder::default();
        strip.set_listener(recorder.clone());
        strip.measure(Size::new(400.0, 100.0));
        strip.set_items(Some(photos(0..count)), selected);
        (strip, recorder)
    }

    #[test]
    fn test_initial_selection_is_centered_silently() {
        let (mut strip, recorder) = strip(5, 2);
        assert_eq!(strip.selected_index(), Some(2));
        assert_eq!(strip.target_index(), Some(2));
        assert_eq!(strip.content_offset(), 177.0);
        assert_eq!(
            strip.take_scroll_request(),
            Some(ScrollRequest {
                offset: 177.0,
                animated: false
            })
        );
        assert!(recorder.0.borrow().is_empty());
        assert!(strip.cell_for_index(2).unwrap().is_selected());
        assert!(!strip.cell_for_index(1).unwrap().is_selected());
    }

    #[test]
    fn test_selection_waits_for_viewport() {
        let mut strip = ThumbnailStrip::new(QueueSource::default(), ThumbnailStripSpec::default());
        strip.set_items(Some(photos(0..5)), 3);
        assert!(strip.is_layout_pending());
        assert_eq!(strip.selected_index(), None);

        strip.measure(Size::new(400.0, 100.0));
        assert!(!strip.is_layout_pending());
        assert_eq!(strip.selected_index(), Some(3));
        let centered = strip.layout().centering_offset(3).unwrap();
        assert_eq!(strip.content_offset(), centered);
    }

    #[test]
    fn test_gesture_emits_drag_scroll_select() {
        let (mut strip, recorder) = strip(10, 2);
        strip.take_scroll_request();

        strip.dispatch(ScrollEvent::BeginDrag);
        assert_eq!(strip.target_index(), None);
        assert_eq!(strip.selected_index(), None);
        assert!(strip.layout().frames().iter().all(|f| f.width == 50.0));

        // Uniform cells: item 3 is centered at 3 * 51.
        strip.dispatch(ScrollEvent::PositionChanged { offset: 153.0 });
        strip.dispatch(ScrollEvent::PositionChanged { offset: 155.0 });
        assert_eq!(strip.phase(), ScrollPhase::Dragging);

        let snapped = strip.dispatch(ScrollEvent::WillEndDrag {
            velocity: 1.0,
            target_offset: 207.0,
        });
        assert_eq!(strip.target_index(), Some(4));
        assert_eq!(strip.layout().frames()[4].width, 200.0);
        assert_eq!(snapped, Some(279.0));

        strip.dispatch(ScrollEvent::EndDragWithDecel);
        strip.dispatch(ScrollEvent::WillBeginDecelerate);
        strip.dispatch(ScrollEvent::PositionChanged { offset: 250.0 });
        strip.dispatch(ScrollEvent::PositionChanged { offset: 279.0 });
        strip.dispatch(ScrollEvent::EndDecelerate);
        strip.dispatch(ScrollEvent::EndDecelerate);

        assert_eq!(strip.phase(), ScrollPhase::Idle);
        assert_eq!(
            recorder.0.borrow().as_slice(),
            &[StripEvent::Drag(3), StripEvent::Scroll(4), StripEvent::Select(4)]
        );
        assert_eq!(strip.selected_index(), Some(4));
        // Already centered on the snapped item.
        assert_eq!(strip.take_scroll_request(), None);
    }

    #[test]
    fn test_settle_without_inertia_recenters() {
        let (mut strip, recorder) = strip(10, 0);
        strip.dispatch(ScrollEvent::BeginDrag);
        strip.dispatch(ScrollEvent::PositionChanged { offset: 160.0 });
        strip.dispatch(ScrollEvent::EndDragNoDecel);

        assert_eq!(
            recorder.0.borrow().as_slice(),
            &[StripEvent::Drag(3), StripEvent::Select(3)]
        );
        let request = strip.take_scroll_request().unwrap();
        assert!(request.animated);
        assert_eq!(Some(request.offset), strip.layout().centering_offset(3));
    }

    #[test]
    fn test_release_in_place_restores_resting_item() {
        let (mut strip, recorder) = strip(5, 2);
        strip.take_scroll_request();

        strip.dispatch(ScrollEvent::BeginDrag);
        assert_eq!(strip.selected_index(), None);
        strip.dispatch(ScrollEvent::EndDragNoDecel);

        assert_eq!(strip.phase(), ScrollPhase::Idle);
        assert_eq!(recorder.0.borrow().as_slice(), &[StripEvent::Select(2)]);
        assert_eq!(strip.selected_index(), Some(2));
        assert_eq!(strip.target_index(), Some(2));
        assert_eq!(strip.layout().frames()[2].width, 200.0);
        assert_eq!(strip.content_offset(), 177.0);
        assert!(strip.cell_for_index(2).unwrap().is_selected());
        assert_eq!(strip.take_scroll_request(), None);
    }

    #[test]
    fn test_will_end_drag_in_place_keeps_offset() {
        let (mut strip, recorder) = strip(5, 2);
        strip.take_scroll_request();

        strip.dispatch(ScrollEvent::BeginDrag);
        let snapped = strip.dispatch(ScrollEvent::WillEndDrag {
            velocity: 0.0,
            target_offset: 237.0,
        });
        assert_eq!(snapped, Some(177.0));
        assert_eq!(strip.target_index(), Some(2));
        strip.dispatch(ScrollEvent::EndDragNoDecel);

        assert_eq!(recorder.0.borrow().as_slice(), &[StripEvent::Select(2)]);
        assert_eq!(strip.selected_index(), Some(2));
    }

    #[test]
    fn test_items_replaced_while_hidden_drop_old_frames() {
        let (mut strip, recorder) = strip(10, 0);
        strip.measure(Size::ZERO);
        strip.set_items(Some(photos(0..3)), 0);
        assert!(strip.layout().is_empty());

        strip.dispatch(ScrollEvent::BeginDrag);
        strip.dispatch(ScrollEvent::PositionChanged { offset: 408.0 });
        assert!(recorder.0.borrow().is_empty());
        assert_eq!(strip.target_index(), None);

        strip.measure(Size::new(400.0, 100.0));
        assert_eq!(strip.selected_index(), Some(0));
        assert_eq!(strip.layout().item_count(), 3);
    }

    #[test]
    fn test_select_item_always_scrolls() {
        let (mut strip, recorder) = strip(5, 1);
        strip.take_scroll_request();
        strip.select_item(1, true);
        let request = strip.take_scroll_request().unwrap();
        assert!(request.animated);
        assert!(recorder.0.borrow().is_empty());

        strip.select_item(9, true);
        assert_eq!(strip.take_scroll_request(), None);
        assert_eq!(strip.selected_index(), Some(1));
    }

    #[test]
    fn test_tap_selects_with_event() {
        let (mut strip, recorder) = strip(5, 0);
        let cell = strip.cell_for_index(3).unwrap().id();
        assert!(strip.tap_cell(cell));
        assert_eq!(recorder.0.borrow().as_slice(), &[StripEvent::Select(3)]);
        assert_eq!(strip.target_index(), Some(3));
        assert!(strip.take_scroll_request().unwrap().animated);
        assert!(!strip.tap_cell(CellId(999)));
    }

    #[test]
    fn test_images_apply_and_stale_results_are_dropped() {
        let (mut strip, _) = strip(5, 0);
        let pending: Vec<_> = strip.source().pending.borrow_mut().drain(..).collect();
        assert_eq!(pending.len(), strip.bound_cell_count());
        assert!(pending
            .iter()
            .all(|(_, request, _)| request.quality == QualityPreference::Opportunistic));

        // The list is replaced before the results arrive.
        strip.set_items(Some(photos(100..105)), 0);
        for (key, _, mut sink) in pending {
            sink.deliver_final(key);
        }
        assert_eq!(strip.process_image_deliveries(), 0);
        assert!(strip.cells().all(|cell| cell.image().is_none()));

        let fresh: Vec<_> = strip.source().pending.borrow_mut().drain(..).collect();
        for (key, _, mut sink) in fresh {
            sink.deliver_interim(key);
            sink.deliver_final(key + 1_000);
        }
        assert_eq!(strip.process_image_deliveries(), 2 * strip.bound_cell_count());
        let first = strip.cell_for_index(0).unwrap();
        assert_eq!(first.image(), Some(&1_100));
        assert_eq!(first.image_quality(), Some(ImageQuality::Final));
    }

    #[test]
    fn test_scrolling_requests_fast_images_then_upgrades() {
        let (mut strip, _) = strip(40, 0);
        strip.source().pending.borrow_mut().clear();

        strip.dispatch(ScrollEvent::BeginDrag);
        strip.source().pending.borrow_mut().clear();
        strip.dispatch(ScrollEvent::PositionChanged { offset: 1_000.0 });
        let during: Vec<_> = strip.source().pending.borrow_mut().drain(..).collect();
        assert!(!during.is_empty());
        assert!(during
            .iter()
            .all(|(_, request, _)| request.quality == QualityPreference::FastOnly));

        strip.dispatch(ScrollEvent::EndDragNoDecel);
        let after: Vec<_> = strip.source().pending.borrow_mut().drain(..).collect();
        assert!(after
            .iter()
            .any(|(_, request, _)| request.quality == QualityPreference::Opportunistic));
        assert!(strip
            .cells()
            .filter(|cell| cell.binding().is_some())
            .all(|cell| !cell.needs_quality_upgrade()));
    }

    #[test]
    fn test_items_did_change_keeps_selected_asset() {
        let (mut strip, _) = strip(5, 3);
        // Key 3 moves to index 1.
        let reordered: AssetSnapshot<Photo> = vec![Photo(9), Photo(3), Photo(4)].into();
        strip.items_did_change(Some(reordered), &ItemChangeDetails::reload());
        assert_eq!(strip.selected_index(), Some(1));

        strip.items_did_change(Some(photos(50..52)), &ItemChangeDetails::reload());
        assert_eq!(strip.selected_index(), Some(0));

        strip.items_did_change(None, &ItemChangeDetails::reload());
        assert!(strip.layout().is_empty());
        assert_eq!(strip.selected_index(), None);
        assert_eq!(strip.bound_cell_count(), 0);
    }
}
