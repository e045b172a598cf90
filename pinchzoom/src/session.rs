// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session orchestrator: wire one element's gestures to its transform and the group backdrop.
//!
//! Per gesture phase:
//!
//! - **Start**: make sure the backdrop element exists (still transparent).
//! - **Move**: clamp the scale factor into bounds, apply it, and set the
//!   backdrop opacity from [`backdrop_opacity`].
//! - **End**: reset the transform and fade the backdrop to zero.
//!
//! When the snap-back transition completes and the element is no longer
//! zoomed, the backdrop is forced to zero once more after
//! [`SETTLE_DELAY_MS`], so no residual tint survives the gesture.
//!
//! Driver failures are logged and never stop the remaining effects of the
//! same event: a zoom without a backdrop is an acceptable degraded mode.

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use kurbo::Vec2;

use crate::backdrop::BackdropDriver;
use crate::capability::Capabilities;
use crate::color::ColorSpec;
use crate::config::PinchZoomConfig;
use crate::geometry::TouchPoint;
use crate::gesture::{GestureEvent, GestureInterpreter, InputPhase};
use crate::surface::{BackdropFactory, SurfaceError, ZoomTarget};
use crate::timer::{Millis, earliest};
use crate::transform::{TransformDriver, TransformSettings, clamp_scale};

/// Backdrop opacity reached at the upper scale bound.
pub const MAX_BACKDROP_OPACITY: f64 = 0.8;

/// Delay after a completed snap-back before the backdrop is forced to zero.
pub const SETTLE_DELAY_MS: Millis = 50;

/// Backdrop driver shared by every element of one bound group.
pub type SharedBackdrop<F> = Rc<RefCell<BackdropDriver<F>>>;

/// Backdrop opacity for an (already clamped) scale.
///
/// Ramps linearly from `0` at scale `1` to [`MAX_BACKDROP_OPACITY`] at
/// `max_scale`, never exceeding it. When the bounds leave no room to ramp
/// (`max_scale <= 1` or `max_scale <= min_scale`) any enlargement maps straight
/// to the ceiling.
#[must_use]
pub fn backdrop_opacity(scale: f64, min_scale: f64, max_scale: f64) -> f64 {
    if max_scale <= 1.0 || max_scale <= min_scale {
        return if scale > 1.0 {
            MAX_BACKDROP_OPACITY
        } else {
            0.0
        };
    }
    let ramp = MAX_BACKDROP_OPACITY * (scale - 1.0) / (max_scale - 1.0);
    ramp.clamp(0.0, MAX_BACKDROP_OPACITY)
}

fn report(what: &str, outcome: Result<(), SurfaceError>) {
    if let Err(err) = outcome {
        log::warn!("pinchzoom: {what} failed: {err}");
    }
}

/// One bound element: its gesture interpreter, transform driver and the group backdrop.
pub struct Session<T, F: BackdropFactory> {
    interpreter: GestureInterpreter,
    transform: TransformDriver<T>,
    backdrop: SharedBackdrop<F>,
    config: PinchZoomConfig,
    capabilities: Capabilities,
}

impl<T: fmt::Debug, F: BackdropFactory> fmt::Debug for Session<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("interpreter", &self.interpreter)
            .field("transform", &self.transform)
            .field("config", &self.config)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl<T: ZoomTarget, F: BackdropFactory + 'static> Session<T, F> {
    /// Binds `target` with an already validated `config`.
    pub fn new(
        target: T,
        backdrop: SharedBackdrop<F>,
        config: PinchZoomConfig,
        capabilities: Capabilities,
    ) -> Self {
        let mut transform =
            TransformDriver::new(target, TransformSettings::from(&config), capabilities);

        let settle: Weak<RefCell<BackdropDriver<F>>> = Rc::downgrade(&backdrop);
        transform.on_transition_end(move |state, now| {
            if state.is_zoomed() {
                return;
            }
            // The group may already be torn down.
            let Some(backdrop) = settle.upgrade() else {
                return;
            };
            if let Ok(mut backdrop) = backdrop.try_borrow_mut() {
                backdrop.schedule_clear(now + SETTLE_DELAY_MS);
            }
        });

        Self {
            interpreter: GestureInterpreter::new(),
            transform,
            backdrop,
            config,
            capabilities,
        }
    }
}

impl<T: ZoomTarget, F: BackdropFactory> Session<T, F> {
    /// Returns the configuration snapshot in use.
    #[must_use]
    pub fn config(&self) -> &PinchZoomConfig {
        &self.config
    }

    /// Returns the capabilities read at bind time.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Returns the gesture interpreter.
    #[must_use]
    pub fn interpreter(&self) -> &GestureInterpreter {
        &self.interpreter
    }

    /// Returns the transform driver.
    #[must_use]
    pub fn transform(&self) -> &TransformDriver<T> {
        &self.transform
    }

    /// Returns the group backdrop.
    #[must_use]
    pub fn backdrop(&self) -> &SharedBackdrop<F> {
        &self.backdrop
    }

    /// Returns `true` while the element is enlarged.
    #[must_use]
    pub fn is_zoomed(&self) -> bool {
        self.transform.transform_state().is_zoomed()
    }

    /// Feeds one classified input event through the interpreter and applies the result.
    ///
    /// Returns the recognized gesture event; when there is one the caller
    /// should suppress the platform's default handling of the input.
    pub fn handle_input(
        &mut self,
        phase: InputPhase,
        points: &[TouchPoint],
        now: Millis,
    ) -> Option<GestureEvent> {
        let event = self.interpreter.handle(phase, points)?;
        self.on_gesture(&event, now);
        Some(event)
    }

    /// Applies a gesture event to the transform and backdrop.
    pub fn on_gesture(&mut self, event: &GestureEvent, now: Millis) {
        let (min_scale, max_scale) = (self.config.min_scale, self.config.max_scale);
        match event {
            GestureEvent::Start(_) => {
                self.with_backdrop("backdrop creation", BackdropDriver::create_overlay);
            }
            GestureEvent::Move(m) => {
                let scale = clamp_scale(m.scale_factor, min_scale, max_scale);
                report(
                    "transform",
                    self.transform.apply_transform(scale, Vec2::ZERO, now),
                );
                let opacity = backdrop_opacity(scale, min_scale, max_scale);
                self.with_backdrop("backdrop update", |b| b.update_overlay(opacity, now));
            }
            GestureEvent::End => {
                report("transform reset", self.transform.reset_transform(now));
                self.with_backdrop("backdrop fade-out", |b| b.update_overlay(0.0, now));
            }
        }
    }

    /// Platform signal: the element's transform transition finished.
    pub fn transition_ended(&mut self, now: Millis) {
        report("transition end", self.transform.transition_end(now));
    }

    /// Earliest pending deadline of the transform and the backdrop.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        let backdrop = self
            .backdrop
            .try_borrow()
            .ok()
            .and_then(|b| b.next_deadline());
        earliest(self.transform.next_deadline(), backdrop)
    }

    /// Runs expired timers.
    pub fn poll(&mut self, now: Millis) {
        report("transition fallback", self.transform.poll(now));
        self.with_backdrop("backdrop timer", |b| b.poll(now));
    }

    /// Adopts a new, already validated configuration without dropping gesture state.
    ///
    /// A current scale outside the new bounds is clamped back in.
    pub fn rebind(&mut self, config: PinchZoomConfig, now: Millis) {
        report(
            "transform settings",
            self.transform.set_settings(TransformSettings::from(&config), now),
        );
        let color = ColorSpec::parse(&config.background_color);
        self.with_backdrop("backdrop recolor", |b| b.set_color(color));
        self.config = config;
    }

    /// Stops input handling, then tears down the transform and the backdrop, in that order.
    ///
    /// A backdrop still shared with other sessions of the group survives; it
    /// is hidden if this session was zoomed, and the last session to go
    /// destroys it.
    pub fn teardown(&mut self, now: Millis) {
        let was_zoomed = self.is_zoomed();
        self.interpreter.detach();
        report("transform teardown", self.transform.destroy());
        if Rc::strong_count(&self.backdrop) == 1 {
            self.with_backdrop("backdrop teardown", BackdropDriver::destroy);
        } else if was_zoomed {
            self.with_backdrop("backdrop hide", |b| b.update_overlay(0.0, now));
        }
    }

    fn with_backdrop(
        &self,
        what: &str,
        f: impl FnOnce(&mut BackdropDriver<F>) -> Result<(), SurfaceError>,
    ) {
        match self.backdrop.try_borrow_mut() {
            Ok(mut backdrop) => report(what, f(&mut backdrop)),
            Err(_) => log::warn!("pinchzoom: {what} skipped, backdrop busy"),
        }
    }
}
