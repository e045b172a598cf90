// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture interpreter: turn ordered touch snapshots into pinch start/move/end events.
//!
//! ## Usage
//!
//! 1) Extract the ordered touch points of each platform event (the input adapter's job).
//! 2) Classify the event as [`InputPhase::Start`], [`InputPhase::Move`] or [`InputPhase::End`].
//! 3) Feed both to [`GestureInterpreter::handle`].
//! 4) When an event comes back, suppress the platform's native scroll/zoom for that input.
//!
//! Only exactly-two-point gestures are recognized. Any other arity is ignored
//! without a state change, so single-pointer input simply never starts a gesture.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use pinchzoom::gesture::{GestureEvent, GestureInterpreter, InputPhase};
//!
//! let mut pinch = GestureInterpreter::new();
//!
//! let start = [Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
//! assert!(matches!(pinch.handle(InputPhase::Start, &start), Some(GestureEvent::Start(_))));
//!
//! let spread = [Point::new(0.0, 0.0), Point::new(250.0, 0.0)];
//! let Some(GestureEvent::Move(m)) = pinch.handle(InputPhase::Move, &spread) else {
//!     panic!("expected a move");
//! };
//! assert_eq!(m.scale_factor, 2.5);
//!
//! assert_eq!(pinch.handle(InputPhase::End, &[]), Some(GestureEvent::End));
//! assert!(!pinch.is_active());
//! ```

use smallvec::SmallVec;

use crate::geometry::{TouchPoint, distance, midpoint};

/// Classification of a platform input event, supplied by the input adapter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputPhase {
    /// A pointer went down (touchstart-class).
    Start,
    /// Pointers moved (touchmove-class).
    Move,
    /// A pointer went up or the platform cancelled the input (touchend/touchcancel-class).
    End,
}

/// Payload of [`GestureEvent::Start`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GestureStart {
    /// Distance between the two points when the gesture started.
    pub initial_distance: f64,
    /// Focal point between the two points.
    pub midpoint: TouchPoint,
    /// The two points, in extraction order.
    pub points: [TouchPoint; 2],
}

/// Payload of [`GestureEvent::Move`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GestureMove {
    /// `current_distance / initial_distance`; infinite for a zero-distance start.
    pub scale_factor: f64,
    /// Last computed scale of the gesture. Equal to `scale_factor`.
    pub current_scale: f64,
    /// Focal point between the two points.
    pub midpoint: TouchPoint,
    /// The two points, in extraction order.
    pub points: [TouchPoint; 2],
    /// Distance recorded at gesture start.
    pub initial_distance: f64,
    /// Distance between the two current points.
    pub current_distance: f64,
}

/// Semantic pinch event emitted by [`GestureInterpreter`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// Two points went down.
    Start(GestureStart),
    /// Two tracked points moved.
    Move(GestureMove),
    /// All points lifted while a gesture was active.
    End,
}

/// Mutable tracking state of one interpreter.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureState {
    /// `true` between a qualifying two-point start and the point count dropping to zero.
    pub active: bool,
    /// Distance between the two points at gesture start; `0` when inactive.
    pub initial_distance: f64,
    /// Last computed scale ratio; `1` when inactive.
    pub current_scale: f64,
    /// Most recent two-point snapshot. Replaced wholesale, never patched.
    pub points: SmallVec<[TouchPoint; 2]>,
}

impl Default for GestureState {
    fn default() -> Self {
        Self {
            active: false,
            initial_distance: 0.0,
            current_scale: 1.0,
            points: SmallVec::new(),
        }
    }
}

/// Stateful two-point pinch recognizer for one bound element.
#[derive(Clone, Debug, Default)]
pub struct GestureInterpreter {
    state: GestureState,
    detached: bool,
}

impl GestureInterpreter {
    /// Creates an idle interpreter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current tracking state.
    #[must_use]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Returns `true` while a two-point gesture is being tracked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Routes an input event to [`start`](Self::start), [`update`](Self::update) or
    /// [`end`](Self::end) according to its classification.
    ///
    /// When this returns an event the caller should suppress the platform's
    /// default handling of the input.
    pub fn handle(&mut self, phase: InputPhase, points: &[TouchPoint]) -> Option<GestureEvent> {
        match phase {
            InputPhase::Start => self.start(points),
            InputPhase::Move => self.update(points),
            InputPhase::End => self.end(points),
        }
    }

    /// Handles a start-class event. Begins (or restarts) tracking when exactly two points are down.
    pub fn start(&mut self, points: &[TouchPoint]) -> Option<GestureEvent> {
        let [p1, p2] = self.two_points(points)?;
        let initial_distance = distance(p1, p2);
        self.state.active = true;
        self.state.initial_distance = initial_distance;
        self.state.current_scale = 1.0;
        self.state.points = SmallVec::from_slice(&[p1, p2]);
        Some(GestureEvent::Start(GestureStart {
            initial_distance,
            midpoint: midpoint(p1, p2),
            points: [p1, p2],
        }))
    }

    /// Handles a move-class event. Emits a move only while active with exactly two points.
    pub fn update(&mut self, points: &[TouchPoint]) -> Option<GestureEvent> {
        if !self.state.active {
            return None;
        }
        let [p1, p2] = self.two_points(points)?;
        let current_distance = distance(p1, p2);
        let scale_factor = if self.state.initial_distance > 0.0 {
            current_distance / self.state.initial_distance
        } else {
            // Zero-distance start: let the scale bounds decide.
            f64::INFINITY
        };
        self.state.current_scale = scale_factor;
        self.state.points = SmallVec::from_slice(&[p1, p2]);
        Some(GestureEvent::Move(GestureMove {
            scale_factor,
            current_scale: scale_factor,
            midpoint: midpoint(p1, p2),
            points: [p1, p2],
            initial_distance: self.state.initial_distance,
            current_distance,
        }))
    }

    /// Handles an end-class event. Ends the gesture once no points remain.
    pub fn end(&mut self, points: &[TouchPoint]) -> Option<GestureEvent> {
        if self.detached || !self.state.active || !points.is_empty() {
            return None;
        }
        self.state = GestureState::default();
        Some(GestureEvent::End)
    }

    /// Stops reacting to input and drops any in-flight gesture.
    ///
    /// Used when the owning element is unbound; every later call is ignored.
    pub fn detach(&mut self) {
        self.detached = true;
        self.state = GestureState::default();
    }

    /// Returns `true` once [`detach`](Self::detach) has been called.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    fn two_points(&self, points: &[TouchPoint]) -> Option<[TouchPoint; 2]> {
        if self.detached {
            return None;
        }
        match points {
            [p1, p2] => Some([*p1, *p2]),
            _ => None,
        }
    }
}
