//! Index reconciliation.
//!
//! Arbitrates between three notions of "current item": the item being
//! dragged past, the item a deceleration is heading to, and the item the
//! strip finally settled on. Each notion is an outward channel with its own
//! de-duplication memory.

use smallvec::SmallVec;

use super::geometry::StripGeometry;
use super::phase::ScrollPhase;

/// Outward index notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StripEvent {
    Drag(usize),
    Scroll(usize),
    Select(usize),
}

/// What happens to the selection highlight when a new drag begins.
///
/// Historical variants of the widget disagree; clearing on drag and
/// restoring on settle is the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragSelectionPolicy {
    /// The highlight follows the finger: cleared on BeginDrag, set on settle.
    #[default]
    ClearOnBeginDrag,
    /// The previous highlight stays until the strip settles elsewhere.
    KeepUntilSettle,
}

/// How often the drag/scroll channels consult the geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexTracking {
    /// Only on phase changes.
    #[default]
    PhaseChanges,
    /// On every position sample while dragging or decelerating.
    Continuous,
}

/// Symmetric highlight update: leave `deselected`, enter `selected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionChange {
    pub deselected: Option<usize>,
    pub selected: Option<usize>,
}

/// Result of feeding the reconciler.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexChanges {
    /// New drag channel value, if it changed.
    pub drag: Option<usize>,
    /// New scroll channel value, if it changed.
    pub scroll: Option<usize>,
    /// New select channel value, if it changed.
    pub select: Option<usize>,
    /// Highlight transition, if the selected index moved.
    pub selection: Option<SelectionChange>,
    /// Whether the target index changed (the expanded cell must move).
    pub target_changed: bool,
}

impl IndexChanges {
    /// Whether nothing observable changed.
    pub fn is_empty(&self) -> bool {
        self.drag.is_none()
            && self.scroll.is_none()
            && self.select.is_none()
            && self.selection.is_none()
            && !self.target_changed
    }

    /// Outward events in drag, scroll, select order.
    pub fn events(&self) -> SmallVec<[StripEvent; 3]> {
        let mut events = SmallVec::new();
        if let Some(index) = self.drag {
            events.push(StripEvent::Drag(index));
        }
        if let Some(index) = self.scroll {
            events.push(StripEvent::Scroll(index));
        }
        if let Some(index) = self.select {
            events.push(StripEvent::Select(index));
        }
        events
    }
}

/// De-duplication memory for one outward channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ChannelMemory {
    last: Option<usize>,
}

impl ChannelMemory {
    /// Records `index`; returns it only when it differs from the last value.
    fn notify(&mut self, index: usize) -> Option<usize> {
        if self.last == Some(index) {
            return None;
        }
        self.last = Some(index);
        Some(index)
    }

    fn clear(&mut self) {
        self.last = None;
    }
}

/// Derives the centered item from phase changes and tracks the target and
/// selected indices.
///
/// The reconciler is the single writer of the target index (read by the
/// layout) and of the selected index (read by the widget for highlighting).
#[derive(Debug)]
pub struct IndexReconciler {
    item_count: usize,
    target_index: Option<usize>,
    selected_index: Option<usize>,
    drag: ChannelMemory,
    scroll: ChannelMemory,
    select: ChannelMemory,
    policy: DragSelectionPolicy,
}

impl IndexReconciler {
    pub fn new(policy: DragSelectionPolicy) -> Self {
        Self {
            item_count: 0,
            target_index: None,
            selected_index: None,
            drag: ChannelMemory::default(),
            scroll: ChannelMemory::default(),
            select: ChannelMemory::default(),
            policy,
        }
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Item predicted or chosen to become centered/expanded next.
    pub fn target_index(&self) -> Option<usize> {
        self.target_index
    }

    /// Item currently highlighted as the resting choice.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn policy(&self) -> DragSelectionPolicy {
        self.policy
    }

    /// Forgets every index after the backing list was replaced.
    ///
    /// Indices are positional, so nothing from the previous list is valid
    /// against the new one.
    pub fn reset(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.target_index = None;
        self.selected_index = None;
        self.drag.clear();
        self.scroll.clear();
        self.select.clear();
    }

    /// A new drag gesture starts.
    ///
    /// Clears the target and all de-duplication memory so decisions made
    /// during this gesture are not suppressed by the previous one.
    pub fn on_begin_drag(&mut self) -> IndexChanges {
        let mut changes = IndexChanges {
            target_changed: self.target_index.take().is_some(),
            ..IndexChanges::default()
        };
        self.drag.clear();
        self.scroll.clear();
        self.select.clear();
        if self.policy == DragSelectionPolicy::ClearOnBeginDrag {
            changes.selection = self.set_selected(None);
        }
        changes
    }

    /// The observable scroll phase changed while the content sits at `offset`.
    pub fn on_phase_changed(
        &mut self,
        phase: ScrollPhase,
        offset: f32,
        geometry: &impl StripGeometry,
    ) -> IndexChanges {
        let mut changes = IndexChanges::default();
        let Some(index) = self.centered_index(offset, geometry) else {
            log::debug!("no centered item at offset {offset}; skipping {phase:?} reconciliation");
            return changes;
        };

        match phase {
            ScrollPhase::Dragging => changes.drag = self.drag.notify(index),
            ScrollPhase::Decelerating => changes.scroll = self.scroll.notify(index),
            ScrollPhase::Idle => return self.settle_on(index),
        }
        changes
    }

    /// A gesture ended before the content ever moved, so no phase change
    /// was observed.
    ///
    /// Settles back on `resting`, the target held before the gesture began.
    /// Without one, settles on the item centered at `offset`.
    pub fn on_gesture_ended_in_place(
        &mut self,
        resting: Option<usize>,
        offset: f32,
        geometry: &impl StripGeometry,
    ) -> IndexChanges {
        match resting.filter(|&index| index < self.item_count) {
            Some(index) => self.settle_on(index),
            None => self.on_phase_changed(ScrollPhase::Idle, offset, geometry),
        }
    }

    /// Continuous tracking between phase changes.
    ///
    /// Only consulted with [`IndexTracking::Continuous`]; updates the channel
    /// of the current moving phase under the same de-duplication law.
    pub fn on_position_changed(
        &mut self,
        phase: ScrollPhase,
        offset: f32,
        geometry: &impl StripGeometry,
    ) -> IndexChanges {
        let mut changes = IndexChanges::default();
        if phase == ScrollPhase::Idle {
            return changes;
        }
        let Some(index) = self.centered_index(offset, geometry) else {
            return changes;
        };
        match phase {
            ScrollPhase::Dragging => changes.drag = self.drag.notify(index),
            ScrollPhase::Decelerating => changes.scroll = self.scroll.notify(index),
            ScrollPhase::Idle => {}
        }
        changes
    }

    /// The finger lifted and inertia predicts landing at `predicted_offset`.
    ///
    /// Stores the landing item as the target so it can expand before the
    /// deceleration completes. Leaves the target untouched when the
    /// prediction falls outside the content.
    pub fn on_will_end_drag(
        &mut self,
        predicted_offset: f32,
        geometry: &impl StripGeometry,
    ) -> Option<usize> {
        let index = self.centered_index(predicted_offset, geometry)?;
        self.set_target(Some(index));
        Some(index)
    }

    /// A programmatic animated scroll stopped at `offset`.
    ///
    /// Re-derives the target from where the animation really ended. Returns
    /// the new target only when it moved; never emits events.
    pub fn on_scroll_animation_ended(
        &mut self,
        offset: f32,
        geometry: &impl StripGeometry,
    ) -> Option<usize> {
        let index = self.centered_index(offset, geometry)?;
        self.set_target(Some(index)).then_some(index)
    }

    /// Host- or tap-driven selection.
    ///
    /// Returns `None` (and changes nothing) when `index` is out of range.
    /// The select channel memory always follows the explicit value; an event
    /// is reported only when `fire_event` is set and the value differs from
    /// what the channel last saw. Centering is the caller's job and happens
    /// regardless of the outcome.
    pub fn select_explicit(&mut self, index: usize, fire_event: bool) -> Option<IndexChanges> {
        if index >= self.item_count {
            log::debug!(
                "ignoring selection of {index}: only {} items",
                self.item_count
            );
            return None;
        }

        let notified = self.select.notify(index);
        Some(IndexChanges {
            select: notified.filter(|_| fire_event),
            selection: self.set_selected(Some(index)),
            target_changed: self.set_target(Some(index)),
            ..IndexChanges::default()
        })
    }

    /// The strip is at rest on `index`; select, selection and target converge.
    fn settle_on(&mut self, index: usize) -> IndexChanges {
        IndexChanges {
            select: self.select.notify(index),
            selection: self.set_selected(Some(index)),
            target_changed: self.set_target(Some(index)),
            ..IndexChanges::default()
        }
    }

    /// Geometry lookups are bounded by the item count, which may be ahead of
    /// a layout that has not been committed yet.
    fn centered_index(&self, offset: f32, geometry: &impl StripGeometry) -> Option<usize> {
        geometry
            .centered_index_for_offset(offset)
            .filter(|&index| index < self.item_count)
    }

    fn set_selected(&mut self, index: Option<usize>) -> Option<SelectionChange> {
        if self.selected_index == index {
            return None;
        }
        let change = SelectionChange {
            deselected: self.selected_index,
            selected: index,
        };
        self.selected_index = index;
        Some(change)
    }

    fn set_target(&mut self, index: Option<usize>) -> bool {
        if self.target_index == index {
            return false;
        }
        log::trace!("target index {:?} -> {:?}", self.target_index, index);
        self.target_index = index;
        true
    }
}

impl Default for IndexReconciler {
    fn default() -> Self {
        Self::new(DragSelectionPolicy::default())
    }
}
