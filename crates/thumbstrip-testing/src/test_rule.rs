use std::cell::RefCell;
use std::rc::Rc;

use thumbstrip_core::Size;
use thumbstrip_ui::{
    ScrollEvent, ScrollRequest, StripEvent, ThumbnailStrip, ThumbnailStripListener,
    ThumbnailStripSpec,
};

use super::test_source::{test_assets, ManualImageSource};

/// Viewport used by [`StripTestRule::new`].
pub const DEFAULT_TEST_VIEWPORT: Size = Size {
    width: 400.0,
    height: 100.0,
};

const MAX_IDLE_ITERATIONS: usize = 100;

/// Listener that records every event in order.
#[derive(Clone, Default)]
pub struct RecordingListener {
    events: Rc<RefCell<Vec<StripEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StripEvent> {
        self.events.borrow().clone()
    }

    pub fn take(&self) -> Vec<StripEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Indices reported through `did_select_item_at`.
    pub fn selections(&self) -> Vec<usize> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                StripEvent::Select(index) => Some(*index),
                _ => None,
            })
            .collect()
    }
}

impl ThumbnailStripListener for RecordingListener {
    fn did_drag_item_at(&mut self, index: usize) {
        self.events.borrow_mut().push(StripEvent::Drag(index));
    }

    fn did_scroll_item_at(&mut self, index: usize) {
        self.events.borrow_mut().push(StripEvent::Scroll(index));
    }

    fn did_select_item_at(&mut self, index: usize) {
        self.events.borrow_mut().push(StripEvent::Select(index));
    }
}

/// Drives a [`ThumbnailStrip`] the way a host scroll view would.
pub struct StripTestRule {
    strip: ThumbnailStrip<ManualImageSource>,
    source: ManualImageSource,
    listener: RecordingListener,
    applied_scrolls: Vec<ScrollRequest>,
}

impl StripTestRule {
    /// A strip of `item_count` test assets in a [`DEFAULT_TEST_VIEWPORT`],
    /// resting on the first item.
    pub fn new(item_count: usize) -> Self {
        Self::with_spec(item_count, ThumbnailStripSpec::default())
    }

    pub fn with_spec(item_count: usize, spec: ThumbnailStripSpec) -> Self {
        let source = ManualImageSource::new();
        let listener = RecordingListener::new();
        let mut strip = ThumbnailStrip::new(source.clone(), spec);
        strip.set_listener(listener.clone());
        strip.measure(DEFAULT_TEST_VIEWPORT);

        let mut rule = Self {
            strip,
            source,
            listener,
            applied_scrolls: Vec::new(),
        };
        rule.set_items(item_count, 0);
        rule
    }

    pub fn strip(&self) -> &ThumbnailStrip<ManualImageSource> {
        &self.strip
    }

    pub fn strip_mut(&mut self) -> &mut ThumbnailStrip<ManualImageSource> {
        &mut self.strip
    }

    pub fn source(&self) -> &ManualImageSource {
        &self.source
    }

    pub fn listener(&self) -> &RecordingListener {
        &self.listener
    }

    pub fn events(&self) -> Vec<StripEvent> {
        self.listener.events()
    }

    /// Scroll requests the rule has played back so far.
    pub fn applied_scrolls(&self) -> &[ScrollRequest] {
        &self.applied_scrolls
    }

    /// Replaces the list with `item_count` test assets.
    ///
    /// Scroll requests are left for the caller; use [`await_idle`] to play
    /// them.
    ///
    /// [`await_idle`]: Self::await_idle
    pub fn set_items(&mut self, item_count: usize, selected_index: usize) {
        self.strip
            .set_items(Some(test_assets(item_count)), selected_index);
    }

    pub fn dispatch(&mut self, event: ScrollEvent) -> Option<f32> {
        self.strip.dispatch(event)
    }

    /// Plays pending scroll requests and completes every image fetch until
    /// nothing is left to do.
    pub fn await_idle(&mut self) {
        for _ in 0..MAX_IDLE_ITERATIONS {
            let scroll = self.strip.take_scroll_request();
            if let Some(request) = scroll {
                self.applied_scrolls.push(request);
                self.strip.dispatch(ScrollEvent::PositionChanged {
                    offset: request.offset,
                });
                if request.animated {
                    self.strip.dispatch(ScrollEvent::EndScrollAnimation);
                }
            }
            let completed = self.source.complete_all();
            self.strip.process_image_deliveries();
            if scroll.is_none() && completed == 0 && self.source.pending_count() == 0 {
                return;
            }
        }
        panic!("Strip failed to settle after {MAX_IDLE_ITERATIONS} iterations");
    }

    /// Runs a touch gesture against the strip.
    pub fn perform_gesture<R>(&mut self, block: impl FnOnce(&mut GestureScope<'_>) -> R) -> R {
        let offset = self.strip.content_offset();
        let mut scope = GestureScope {
            rule: self,
            offset,
            decelerating: false,
        };
        block(&mut scope)
    }
}

/// Gesture steps, in the callback order a scroll view produces.
pub struct GestureScope<'a> {
    rule: &'a mut StripTestRule,
    offset: f32,
    decelerating: bool,
}

impl<'a> GestureScope<'a> {
    pub fn strip(&self) -> &ThumbnailStrip<ManualImageSource> {
        &self.rule.strip
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn begin_drag(&mut self) {
        self.decelerating = false;
        self.rule.dispatch(ScrollEvent::BeginDrag);
    }

    pub fn drag_to_offset(&mut self, offset: f32) {
        self.offset = offset;
        self.rule.dispatch(ScrollEvent::PositionChanged { offset });
    }

    /// Drags until `index` sits under the viewport center.
    pub fn drag_to_item(&mut self, index: usize) {
        let offset = self.offset_for_item(index);
        self.drag_to_offset(offset);
    }

    /// Lifts the finger with inertia predicted to land at `target_offset`.
    /// Returns where the strip asks the deceleration to end.
    pub fn will_end_drag(&mut self, velocity: f32, target_offset: f32) -> f32 {
        self.rule
            .dispatch(ScrollEvent::WillEndDrag {
                velocity,
                target_offset,
            })
            .unwrap_or(target_offset)
    }

    /// Decelerates to `offset`, starting the deceleration if needed.
    pub fn decelerate_to(&mut self, offset: f32) {
        if !self.decelerating {
            self.decelerating = true;
            self.rule.dispatch(ScrollEvent::EndDragWithDecel);
            self.rule.dispatch(ScrollEvent::WillBeginDecelerate);
        }
        self.drag_to_offset(offset);
    }

    /// Flings toward `index` and decelerates onto the snapped offset
    /// without settling.
    pub fn fling_to_item(&mut self, index: usize, velocity: f32) -> f32 {
        let target = self.offset_for_item(index);
        let snapped = self.will_end_drag(velocity, target);
        self.decelerate_to(snapped);
        snapped
    }

    /// Ends the drag with no deceleration to follow.
    pub fn end_drag(&mut self) {
        self.decelerating = false;
        self.rule.dispatch(ScrollEvent::EndDragNoDecel);
    }

    /// Lifts the finger without velocity and lets the strip come to rest.
    pub fn release(&mut self) {
        let snapped = self.will_end_drag(0.0, self.offset);
        if (snapped - self.offset).abs() < f32::EPSILON {
            self.end_drag();
        } else {
            self.decelerate_to(snapped);
            self.settle();
        }
    }

    /// Ends the deceleration.
    pub fn settle(&mut self) {
        self.decelerating = false;
        self.rule.dispatch(ScrollEvent::EndDecelerate);
    }

    fn offset_for_item(&self, index: usize) -> f32 {
        self.rule
            .strip
            .layout()
            .centering_offset(index)
            .unwrap_or(self.offset)
    }
}
