// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backdrop driver: one translucent backing element whose alpha tracks zoom.
//!
//! The element is created lazily on first need and is kept (hidden) rather
//! than destroyed when its opacity drops to zero. Hiding waits for a short
//! grace delay ([`HIDE_GRACE_MS`]) so the transparent frame is painted first;
//! the delayed hide re-checks the opacity when it fires, so a zoom that
//! resumes inside the window keeps the backdrop on screen.

use core::fmt;

use crate::color::ColorSpec;
use crate::surface::{BackdropElement, BackdropFactory, SurfaceError, keep_first_error};
use crate::timer::{Millis, Timer, earliest};

/// Delay between reaching zero opacity and taking the backdrop out of rendering.
pub const HIDE_GRACE_MS: Millis = 100;

/// Observable backdrop state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BackdropState {
    /// Whether the element currently exists.
    pub has_element: bool,
    /// Whether the element participates in rendering.
    pub visible: bool,
    /// Current opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Drives one shared backdrop element.
pub struct BackdropDriver<F: BackdropFactory> {
    factory: F,
    element: Option<F::Element>,
    color: ColorSpec,
    visible: bool,
    opacity: f64,
    hide_timer: Timer,
    clear_timer: Timer,
}

impl<F> fmt::Debug for BackdropDriver<F>
where
    F: BackdropFactory + fmt::Debug,
    F::Element: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackdropDriver")
            .field("factory", &self.factory)
            .field("element", &self.element)
            .field("color", &self.color)
            .field("visible", &self.visible)
            .field("opacity", &self.opacity)
            .field("hide_timer", &self.hide_timer)
            .field("clear_timer", &self.clear_timer)
            .finish()
    }
}

impl<F: BackdropFactory> BackdropDriver<F> {
    /// Creates a driver. No element exists until one is needed.
    #[must_use]
    pub fn new(factory: F, color: ColorSpec) -> Self {
        Self {
            factory,
            element: None,
            color,
            visible: false,
            opacity: 0.0,
            hide_timer: Timer::new(),
            clear_timer: Timer::new(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> BackdropState {
        BackdropState {
            has_element: self.element.is_some(),
            visible: self.visible,
            opacity: self.opacity,
        }
    }

    /// Returns the backing element, if created.
    #[must_use]
    pub fn element(&self) -> Option<&F::Element> {
        self.element.as_ref()
    }

    /// Returns the factory.
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Returns the color spec.
    #[must_use]
    pub fn color(&self) -> &ColorSpec {
        &self.color
    }

    /// Replaces the color spec, repainting a visible backdrop.
    pub fn set_color(&mut self, color: ColorSpec) -> Result<(), SurfaceError> {
        self.color = color;
        match &mut self.element {
            Some(element) if self.visible => element.set_color(self.color.with_alpha(self.opacity)),
            _ => Ok(()),
        }
    }

    /// Creates the backing element if it does not exist yet.
    pub fn create_overlay(&mut self) -> Result<(), SurfaceError> {
        if self.element.is_none() {
            self.element = Some(self.factory.create_backdrop()?);
            self.visible = false;
        }
        Ok(())
    }

    /// Sets the opacity, clamped to `[0, 1]`.
    ///
    /// A positive opacity shows the backdrop immediately. Zero makes it fully
    /// transparent now and takes it out of rendering after [`HIDE_GRACE_MS`]
    /// unless a positive opacity arrives first.
    pub fn update_overlay(&mut self, opacity: f64, now: Millis) -> Result<(), SurfaceError> {
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        self.opacity = opacity;

        if opacity > 0.0 {
            self.hide_timer.cancel();
            self.clear_timer.cancel();
            self.create_overlay()?;
            let color = self.color.with_alpha(opacity);
            let Some(element) = &mut self.element else {
                return Ok(());
            };
            let mut outcome = element.set_visible(true);
            keep_first_error(&mut outcome, element.set_color(color));
            self.visible = true;
            return outcome;
        }

        let Some(element) = &mut self.element else {
            return Ok(());
        };
        self.hide_timer.arm_if_idle(now + HIDE_GRACE_MS);
        element.set_color(self.color.with_alpha(0.0))
    }

    /// Forces the opacity to zero at `at`, unless a positive opacity arrives first.
    pub fn schedule_clear(&mut self, at: Millis) {
        self.clear_timer.arm(at);
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        earliest(self.hide_timer.deadline(), self.clear_timer.deadline())
    }

    /// Runs expired timers.
    pub fn poll(&mut self, now: Millis) -> Result<(), SurfaceError> {
        let mut outcome = Ok(());
        if self.clear_timer.fire(now) {
            keep_first_error(&mut outcome, self.update_overlay(0.0, now));
        }
        if self.hide_timer.fire(now) && self.opacity == 0.0 {
            if let Some(element) = &mut self.element {
                keep_first_error(&mut outcome, element.set_visible(false));
                self.visible = false;
            }
        }
        outcome
    }

    /// Detaches and discards the backing element, if any. Always safe to call.
    pub fn remove_overlay(&mut self) -> Result<(), SurfaceError> {
        self.hide_timer.cancel();
        self.clear_timer.cancel();
        self.visible = false;
        self.opacity = 0.0;
        match self.element.take() {
            Some(element) => element.remove(),
            None => Ok(()),
        }
    }

    /// Same as [`remove_overlay`](Self::remove_overlay).
    pub fn destroy(&mut self) -> Result<(), SurfaceError> {
        self.remove_overlay()
    }
}
