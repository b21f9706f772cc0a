//! Scroll phase state machine.
//!
//! Converts the raw callback stream of a scroll view into the three phases
//! observers care about. Emission happens only on an observable change, so
//! the high-frequency [`ScrollEvent::PositionChanged`] never re-announces the
//! phase it is already in.

/// Raw callbacks delivered by the gesture/scroll event source.
///
/// Offsets are content offsets along the strip's horizontal axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollEvent {
    /// The user put a finger down and started dragging.
    BeginDrag,
    /// The content offset moved.
    PositionChanged { offset: f32 },
    /// The finger lifted; `target_offset` is where inertia would land.
    WillEndDrag { velocity: f32, target_offset: f32 },
    /// Dragging ended without inertia.
    EndDragNoDecel,
    /// Dragging ended and deceleration will follow.
    EndDragWithDecel,
    /// Inertial deceleration is about to start.
    WillBeginDecelerate,
    /// Inertial deceleration finished.
    EndDecelerate,
    /// A programmatic animated scroll finished.
    EndScrollAnimation,
}

/// Publicly observable scroll phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollPhase {
    #[default]
    Idle,
    Dragging,
    Decelerating,
}

/// Internal machine state. The `Begin*` states are markers that are not
/// phases in themselves: the observable phase is confirmed by the next
/// position sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MachineState {
    BeginDragging,
    Dragging,
    BeginDecelerating,
    Decelerating,
    Stopped,
}

/// Classifies [`ScrollEvent`]s into [`ScrollPhase`] transitions.
///
/// # Example
///
/// ```
/// use thumbstrip_foundation::scroll::{ScrollEvent, ScrollPhase, ScrollPhaseMachine};
///
/// let mut machine = ScrollPhaseMachine::new();
/// assert_eq!(machine.consume(ScrollEvent::BeginDrag), None);
/// assert_eq!(
///     machine.consume(ScrollEvent::PositionChanged { offset: 4.0 }),
///     Some(ScrollPhase::Dragging)
/// );
/// assert_eq!(machine.consume(ScrollEvent::PositionChanged { offset: 8.0 }), None);
/// ```
#[derive(Debug)]
pub struct ScrollPhaseMachine {
    state: MachineState,
    /// Last phase handed out by [`consume`](Self::consume).
    phase: ScrollPhase,
}

impl ScrollPhaseMachine {
    pub fn new() -> Self {
        Self {
            state: MachineState::Stopped,
            phase: ScrollPhase::Idle,
        }
    }

    /// The current observable phase.
    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    /// Whether a drag has begun but no position sample confirmed it yet.
    pub fn is_drag_pending(&self) -> bool {
        self.state == MachineState::BeginDragging
    }

    /// Feeds one raw event; returns the new phase only when it changed.
    pub fn consume(&mut self, event: ScrollEvent) -> Option<ScrollPhase> {
        let next = match event {
            ScrollEvent::BeginDrag => Some(MachineState::BeginDragging),
            ScrollEvent::PositionChanged { .. } => match self.state {
                MachineState::BeginDragging | MachineState::Dragging => {
                    Some(MachineState::Dragging)
                }
                MachineState::BeginDecelerating | MachineState::Decelerating => {
                    Some(MachineState::Decelerating)
                }
                MachineState::Stopped => None,
            },
            ScrollEvent::WillBeginDecelerate => Some(MachineState::BeginDecelerating),
            ScrollEvent::EndDragNoDecel => Some(MachineState::Stopped),
            ScrollEvent::EndDecelerate => {
                if self.state != MachineState::Stopped {
                    Some(MachineState::Stopped)
                } else {
                    None
                }
            }
            ScrollEvent::WillEndDrag { .. }
            | ScrollEvent::EndDragWithDecel
            | ScrollEvent::EndScrollAnimation => None,
        }?;

        log::trace!("scroll machine {:?} --{:?}--> {:?}", self.state, event, next);
        self.state = next;

        let observed = match next {
            MachineState::Dragging => ScrollPhase::Dragging,
            MachineState::Decelerating => ScrollPhase::Decelerating,
            MachineState::Stopped => ScrollPhase::Idle,
            MachineState::BeginDragging | MachineState::BeginDecelerating => return None,
        };

        if observed == self.phase {
            return None;
        }
        self.phase = observed;
        Some(observed)
    }
}

impl Default for ScrollPhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved() -> ScrollEvent {
        ScrollEvent::PositionChanged { offset: 1.0 }
    }

    fn feed(machine: &mut ScrollPhaseMachine, events: &[ScrollEvent]) -> Vec<ScrollPhase> {
        events.iter().filter_map(|e| machine.consume(*e)).collect()
    }

    #[test]
    fn test_drag_is_confirmed_by_first_position_sample() {
        let mut machine = ScrollPhaseMachine::new();
        assert_eq!(machine.consume(ScrollEvent::BeginDrag), None);
        assert!(machine.is_drag_pending());
        assert_eq!(machine.phase(), ScrollPhase::Idle);

        assert_eq!(machine.consume(moved()), Some(ScrollPhase::Dragging));
        assert_eq!(machine.consume(moved()), None);
        assert_eq!(machine.consume(moved()), None);
        assert_eq!(machine.phase(), ScrollPhase::Dragging);
    }

    #[test]
    fn test_full_fling_sequence() {
        let mut machine = ScrollPhaseMachine::new();
        let phases = feed(
            &mut machine,
            &[
                ScrollEvent::BeginDrag,
                moved(),
                moved(),
                ScrollEvent::WillEndDrag {
                    velocity: 2.0,
                    target_offset: 300.0,
                },
                ScrollEvent::EndDragWithDecel,
                ScrollEvent::WillBeginDecelerate,
                moved(),
                moved(),
                ScrollEvent::EndDecelerate,
            ],
        );
        assert_eq!(
            phases,
            vec![
                ScrollPhase::Dragging,
                ScrollPhase::Decelerating,
                ScrollPhase::Idle
            ]
        );
    }

    #[test]
    fn test_end_drag_without_deceleration_stops() {
        let mut machine = ScrollPhaseMachine::new();
        let phases = feed(
            &mut machine,
            &[ScrollEvent::BeginDrag, moved(), ScrollEvent::EndDragNoDecel],
        );
        assert_eq!(phases, vec![ScrollPhase::Dragging, ScrollPhase::Idle]);
    }

    #[test]
    fn test_repeated_end_decelerate_emits_idle_once() {
        let mut machine = ScrollPhaseMachine::new();
        feed(
            &mut machine,
            &[ScrollEvent::BeginDrag, moved(), ScrollEvent::WillBeginDecelerate, moved()],
        );
        assert_eq!(machine.consume(ScrollEvent::EndDecelerate), Some(ScrollPhase::Idle));
        assert_eq!(machine.consume(ScrollEvent::EndDecelerate), None);
    }

    #[test]
    fn test_release_without_movement_keeps_drag_pending_until_end() {
        let mut machine = ScrollPhaseMachine::new();
        assert_eq!(machine.consume(ScrollEvent::BeginDrag), None);
        assert_eq!(
            machine.consume(ScrollEvent::WillEndDrag {
                velocity: 0.0,
                target_offset: 0.0,
            }),
            None
        );
        assert!(machine.is_drag_pending());

        // Idle was never left, so nothing is announced.
        assert_eq!(machine.consume(ScrollEvent::EndDragNoDecel), None);
        assert!(!machine.is_drag_pending());
        assert_eq!(machine.phase(), ScrollPhase::Idle);
    }

    #[test]
    fn test_position_while_stopped_is_ignored() {
        let mut machine = ScrollPhaseMachine::new();
        assert_eq!(machine.consume(moved()), None);
        assert_eq!(machine.consume(ScrollEvent::EndScrollAnimation), None);
        assert_eq!(machine.phase(), ScrollPhase::Idle);
    }

    #[test]
    fn test_grab_during_deceleration_returns_to_dragging() {
        let mut machine = ScrollPhaseMachine::new();
        feed(
            &mut machine,
            &[ScrollEvent::BeginDrag, moved(), ScrollEvent::WillBeginDecelerate, moved()],
        );
        assert_eq!(machine.phase(), ScrollPhase::Decelerating);
        assert_eq!(machine.consume(ScrollEvent::BeginDrag), None);
        assert_eq!(machine.consume(moved()), Some(ScrollPhase::Dragging));
    }

    #[test]
    fn test_never_emits_same_phase_twice_in_a_row() {
        const EVENTS: [ScrollEvent; 8] = [
            ScrollEvent::BeginDrag,
            ScrollEvent::PositionChanged { offset: 0.0 },
            ScrollEvent::WillEndDrag {
                velocity: 0.0,
                target_offset: 0.0,
            },
            ScrollEvent::EndDragNoDecel,
            ScrollEvent::EndDragWithDecel,
            ScrollEvent::WillBeginDecelerate,
            ScrollEvent::EndDecelerate,
            ScrollEvent::EndScrollAnimation,
        ];

        // Deterministic LCG so the sequences are reproducible.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..200 {
            let mut machine = ScrollPhaseMachine::new();
            let mut last: Option<ScrollPhase> = None;
            for _ in 0..64 {
                seed = seed
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                let event = EVENTS[(seed >> 33) as usize % EVENTS.len()];
                if let Some(phase) = machine.consume(event) {
                    assert_ne!(Some(phase), last, "phase {:?} emitted twice", phase);
                    // Idle starts out as the implicit current phase.
                    if last.is_none() {
                        assert_ne!(phase, ScrollPhase::Idle);
                    }
                    last = Some(phase);
                }
            }
        }
    }
}
