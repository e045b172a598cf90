// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform driver: scale (and translate) one target element within bounds.
//!
//! The driver keeps a [`TransformState`] whose scale always lies in
//! `[min_scale, max_scale]`, renders it onto a [`ZoomTarget`], and tracks the
//! transition that follows each change. While the element is zoomed it is
//! promoted into its own stacking context; that promotion is only cleared
//! once the snap-back transition has completed, so it never pops above or
//! below its siblings mid-animation.
//!
//! ## Transition completion
//!
//! Completion is reported at most once per transform change, by whichever
//! comes first:
//!
//! - [`TransformDriver::transition_end`], called when the platform reports that
//!   the animated property finished.
//! - The fallback deadline polled through [`TransformDriver::poll`].
//!
//! With a zero-length transition, completion happens synchronously.
//!
//! ## Minimal example
//!
//! ```
//! # use kurbo::{Size, Vec2};
//! # use pinchzoom::surface::{Promotion, SurfaceError, ZoomTarget};
//! # #[derive(Debug, Default)]
//! # struct Target { scale: f64 }
//! # impl ZoomTarget for Target {
//! #     fn set_transform(&mut self, scale: f64, _: Vec2) -> Result<(), SurfaceError> {
//! #         self.scale = scale;
//! #         Ok(())
//! #     }
//! #     fn set_transition(&mut self, _: Option<u32>) -> Result<(), SurfaceError> { Ok(()) }
//! #     fn natural_size(&self) -> Result<Size, SurfaceError> { Ok(Size::ZERO) }
//! #     fn set_box_size(&mut self, _: Option<Size>) -> Result<(), SurfaceError> { Ok(()) }
//! #     fn set_promotion(&mut self, _: Option<Promotion>) -> Result<(), SurfaceError> { Ok(()) }
//! # }
//! use pinchzoom::Capabilities;
//! use pinchzoom::transform::{TransformDriver, TransformSettings};
//!
//! let settings = TransformSettings { min_scale: 1.0, max_scale: 3.0, ..Default::default() };
//! let mut driver = TransformDriver::new(Target::default(), settings, Capabilities::default());
//!
//! driver.apply_transform(10.0, Vec2::ZERO, 0).unwrap();
//! assert_eq!(driver.transform_state().scale, 3.0);
//! assert_eq!(driver.target().scale, 3.0);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Size, Vec2};

use crate::capability::Capabilities;
use crate::config::{
    DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, DEFAULT_STACKING_ORDER, DEFAULT_TRANSITION_DURATION_MS,
    PinchZoomConfig,
};
use crate::surface::{Promotion, SurfaceError, ZoomTarget, keep_first_error};
use crate::timer::{Millis, Timer};

/// Extra time allowed past the transition duration before completion is forced.
pub const TRANSITION_SLACK_MS: Millis = 50;

/// Callback run when a transform transition completes.
///
/// Receives the state at completion and the time it fired.
pub type TransitionEndHook = Box<dyn FnMut(&TransformState, Millis)>;

/// Snapshot of a driver's transform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TransformState {
    /// Uniform scale, within the driver's bounds.
    pub scale: f64,
    /// Translation applied after scaling.
    pub translate: Vec2,
}

impl TransformState {
    /// Unscaled, untranslated.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate: Vec2::ZERO,
    };

    /// Returns `true` when the element is enlarged.
    #[must_use]
    pub fn is_zoomed(&self) -> bool {
        self.scale > 1.0
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The part of [`PinchZoomConfig`] a transform driver uses.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TransformSettings {
    /// Lower scale bound.
    pub min_scale: f64,
    /// Upper scale bound.
    pub max_scale: f64,
    /// Transition duration for scale changes.
    pub transition_duration_ms: u32,
    /// Stacking order while zoomed.
    pub stacking_order: u32,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            transition_duration_ms: DEFAULT_TRANSITION_DURATION_MS,
            stacking_order: DEFAULT_STACKING_ORDER,
        }
    }
}

impl From<&PinchZoomConfig> for TransformSettings {
    fn from(config: &PinchZoomConfig) -> Self {
        Self {
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            transition_duration_ms: config.transition_duration_ms,
            stacking_order: config.stacking_order,
        }
    }
}

/// Clamps `scale` into `[min_scale, max_scale]`.
///
/// Infinite input saturates at the matching bound; NaN maps to `min_scale`.
#[must_use]
pub fn clamp_scale(scale: f64, min_scale: f64, max_scale: f64) -> f64 {
    scale.max(min_scale).min(max_scale)
}

/// Drives the scale transform of one element.
pub struct TransformDriver<T> {
    target: T,
    settings: TransformSettings,
    capabilities: Capabilities,
    state: TransformState,
    natural_size: Option<Size>,
    promoted: bool,
    transition_styled: bool,
    transition_pending: bool,
    transition_timer: Timer,
    hooks: Vec<TransitionEndHook>,
    destroyed: bool,
}

impl<T: fmt::Debug> fmt::Debug for TransformDriver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformDriver")
            .field("target", &self.target)
            .field("settings", &self.settings)
            .field("capabilities", &self.capabilities)
            .field("state", &self.state)
            .field("natural_size", &self.natural_size)
            .field("promoted", &self.promoted)
            .field("transition_styled", &self.transition_styled)
            .field("transition_pending", &self.transition_pending)
            .field("transition_timer", &self.transition_timer)
            .field("hooks", &self.hooks.len())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl<T: ZoomTarget> TransformDriver<T> {
    /// Creates a driver at identity. Nothing is rendered until the first change.
    #[must_use]
    pub fn new(target: T, settings: TransformSettings, capabilities: Capabilities) -> Self {
        Self {
            target,
            settings,
            capabilities,
            state: TransformState::IDENTITY,
            natural_size: None,
            promoted: false,
            transition_styled: false,
            transition_pending: false,
            transition_timer: Timer::new(),
            hooks: Vec::new(),
            destroyed: false,
        }
    }

    /// Returns the driven element.
    #[must_use]
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Returns the current settings.
    #[must_use]
    pub fn settings(&self) -> TransformSettings {
        self.settings
    }

    /// Replaces the settings.
    ///
    /// A promoted element is restacked at the new order right away, and a
    /// scale left outside the new bounds is clamped back in (animated like
    /// any other change).
    pub fn set_settings(
        &mut self,
        settings: TransformSettings,
        now: Millis,
    ) -> Result<(), SurfaceError> {
        let previous = core::mem::replace(&mut self.settings, settings);
        if settings.transition_duration_ms != previous.transition_duration_ms {
            self.transition_styled = false;
        }
        if self.destroyed {
            return Ok(());
        }

        let mut outcome = Ok(());
        if settings.stacking_order != previous.stacking_order && self.promoted {
            keep_first_error(
                &mut outcome,
                self.target.set_promotion(Some(Promotion {
                    stacking_order: settings.stacking_order,
                })),
            );
        }
        let clamped = clamp_scale(self.state.scale, settings.min_scale, settings.max_scale);
        if clamped != self.state.scale {
            keep_first_error(
                &mut outcome,
                self.apply_transform(clamped, self.state.translate, now),
            );
        }
        outcome
    }

    /// Returns a copy of the current transform.
    #[must_use]
    pub fn transform_state(&self) -> TransformState {
        self.state
    }

    /// Returns `true` while the element carries the zoomed stacking promotion.
    #[must_use]
    pub fn is_promoted(&self) -> bool {
        self.promoted
    }

    /// Returns `true` while a transition completion is outstanding.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transition_pending
    }

    /// Ratio `current / initial`, clamped to the scale bounds; `1` when `initial` is zero.
    #[must_use]
    pub fn calculate_scale(&self, initial_distance: f64, current_distance: f64) -> f64 {
        if initial_distance == 0.0 {
            return 1.0;
        }
        clamp_scale(
            current_distance / initial_distance,
            self.settings.min_scale,
            self.settings.max_scale,
        )
    }

    /// Sets the transform, clamping `scale` into bounds.
    ///
    /// The state is updated even when rendering fails; the error reports the
    /// first failing visual mutation.
    pub fn apply_transform(
        &mut self,
        scale: f64,
        translate: Vec2,
        now: Millis,
    ) -> Result<(), SurfaceError> {
        if self.destroyed {
            return Err(SurfaceError::Detached);
        }
        let next = TransformState {
            scale: clamp_scale(scale, self.settings.min_scale, self.settings.max_scale),
            translate,
        };
        let changed = next != self.state;
        self.state = next;

        let mut outcome = self.ensure_transition_style();
        if next.is_zoomed() && !self.promoted {
            let promoted = self.target.set_promotion(Some(Promotion {
                stacking_order: self.settings.stacking_order,
            }));
            self.promoted = promoted.is_ok();
            keep_first_error(&mut outcome, promoted);
        }
        keep_first_error(&mut outcome, self.render());

        if changed {
            if self.settings.transition_duration_ms == 0 {
                keep_first_error(&mut outcome, self.finish_transition(now));
            } else {
                self.transition_pending = true;
                self.transition_timer.arm(
                    now + Millis::from(self.settings.transition_duration_ms) + TRANSITION_SLACK_MS,
                );
            }
        }
        outcome
    }

    /// Returns to identity and drops any fallback size override.
    pub fn reset_transform(&mut self, now: Millis) -> Result<(), SurfaceError> {
        let mut outcome = self.apply_transform(1.0, Vec2::ZERO, now);
        if !self.destroyed && !self.capabilities.transform_supported() {
            keep_first_error(&mut outcome, self.target.set_box_size(None));
        }
        outcome
    }

    /// Registers a hook run on every transition completion.
    pub fn on_transition_end(&mut self, hook: impl FnMut(&TransformState, Millis) + 'static) {
        self.hooks.push(Box::new(hook));
    }

    /// Platform signal: the animated property finished.
    ///
    /// Ignored unless a transition is outstanding, so duplicate platform
    /// signals (one per animated property) complete it only once.
    pub fn transition_end(&mut self, now: Millis) -> Result<(), SurfaceError> {
        if !self.transition_pending || self.destroyed {
            return Ok(());
        }
        self.finish_transition(now)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.transition_timer.deadline()
    }

    /// Completes an outstanding transition whose fallback deadline has passed.
    pub fn poll(&mut self, now: Millis) -> Result<(), SurfaceError> {
        if self.transition_timer.fire(now) && self.transition_pending && !self.destroyed {
            return self.finish_transition(now);
        }
        Ok(())
    }

    /// Resets the element, clears transition styling and promotion, and drops hooks.
    ///
    /// Calling this more than once has no further effect.
    pub fn destroy(&mut self) -> Result<(), SurfaceError> {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;
        self.transition_timer.cancel();
        self.transition_pending = false;
        self.hooks.clear();
        self.state = TransformState::IDENTITY;

        let mut outcome = if self.capabilities.transform_supported() {
            self.target.set_transform(1.0, Vec2::ZERO)
        } else {
            self.target.set_box_size(None)
        };
        keep_first_error(&mut outcome, self.target.set_transition(None));
        keep_first_error(&mut outcome, self.target.set_promotion(None));
        self.promoted = false;
        self.transition_styled = false;
        outcome
    }

    /// Returns `true` once [`destroy`](Self::destroy) has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn ensure_transition_style(&mut self) -> Result<(), SurfaceError> {
        if self.transition_styled {
            return Ok(());
        }
        let duration = Some(self.settings.transition_duration_ms).filter(|d| *d > 0);
        self.target.set_transition(duration)?;
        self.transition_styled = true;
        Ok(())
    }

    fn render(&mut self) -> Result<(), SurfaceError> {
        if self.capabilities.transform_supported() {
            return self
                .target
                .set_transform(self.state.scale, self.state.translate);
        }
        let natural = match self.natural_size {
            Some(size) => size,
            None => {
                let size = self.target.natural_size()?;
                self.natural_size = Some(size);
                size
            }
        };
        self.target.set_box_size(Some(natural * self.state.scale))
    }

    fn finish_transition(&mut self, now: Millis) -> Result<(), SurfaceError> {
        self.transition_pending = false;
        self.transition_timer.cancel();

        let mut outcome = Ok(());
        if !self.state.is_zoomed() && self.promoted {
            let cleared = self.target.set_promotion(None);
            self.promoted = cleared.is_err();
            keep_first_error(&mut outcome, cleared);
        }
        let state = self.state;
        for hook in &mut self.hooks {
            hook(&state, now);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockTarget;
    use alloc::rc::Rc;
    use core::cell::Cell;

    fn driver(min: f64, max: f64) -> TransformDriver<MockTarget> {
        TransformDriver::new(
            MockTarget::new(),
            TransformSettings {
                min_scale: min,
                max_scale: max,
                transition_duration_ms: 300,
                stacking_order: 50,
            },
            Capabilities::default(),
        )
    }

    #[test]
    fn scale_is_always_clamped() {
        let mut d = driver(0.5, 4.0);
        for (input, expected) in [
            (f64::INFINITY, 4.0),
            (f64::NEG_INFINITY, 0.5),
            (0.0, 0.5),
            (-3.0, 0.5),
            (100.0, 4.0),
            (2.0, 2.0),
            (f64::NAN, 0.5),
        ] {
            d.apply_transform(input, Vec2::ZERO, 0).unwrap();
            let scale = d.transform_state().scale;
            assert_eq!(scale, expected, "input {input}");
            assert!((0.5..=4.0).contains(&scale));
            assert_eq!(d.target().scale, expected);
        }
    }

    #[test]
    fn translation_is_rendered() {
        let mut d = driver(1.0, 4.0);
        d.apply_transform(2.0, Vec2::new(10.0, -5.0), 0).unwrap();
        assert_eq!(d.target().translate, Vec2::new(10.0, -5.0));
        assert_eq!(d.transform_state().translate, Vec2::new(10.0, -5.0));
    }

    #[test]
    fn first_change_styles_transition() {
        let mut d = driver(1.0, 4.0);
        assert_eq!(d.target().transition, None);
        d.apply_transform(2.0, Vec2::ZERO, 0).unwrap();
        assert_eq!(d.target().transition, Some(300));
    }

    #[test]
    fn zooming_promotes_and_promotion_outlives_reset_until_transition_end() {
        let mut d = driver(1.0, 4.0);
        d.apply_transform(2.0, Vec2::ZERO, 0).unwrap();
        assert!(d.is_promoted());
        assert_eq!(d.target().promotion, Some(Promotion { stacking_order: 50 }));

        d.reset_transform(10).unwrap();
        assert_eq!(d.transform_state(), TransformState::IDENTITY);
        assert!(d.is_promoted(), "promotion must survive until the transition ends");

        d.transition_end(310).unwrap();
        assert!(!d.is_promoted());
        assert_eq!(d.target().promotion, None);
    }

    #[test]
    fn transition_end_keeps_promotion_while_zoomed() {
        let mut d = driver(1.0, 4.0);
        d.apply_transform(2.0, Vec2::ZERO, 0).unwrap();
        d.transition_end(300).unwrap();
        assert!(d.is_promoted());
    }

    #[test]
    fn restacking_while_zoomed_moves_promotion_and_release_clears_it() {
        let mut d = driver(1.0, 4.0);
        d.apply_transform(3.0, Vec2::ZERO, 0).unwrap();
        let settings = TransformSettings {
            stacking_order: 7,
            ..d.settings()
        };
        d.set_settings(settings, 5).unwrap();
        assert!(d.is_promoted());
        assert_eq!(d.target().promotion, Some(Promotion { stacking_order: 7 }));

        d.reset_transform(10).unwrap();
        d.transition_end(400).unwrap();
        assert!(!d.is_promoted());
        assert_eq!(d.target().promotion, None);
    }

    #[test]
    fn restacking_at_rest_waits_for_next_zoom() {
        let mut d = driver(1.0, 4.0);
        let settings = TransformSettings {
            stacking_order: 7,
            ..d.settings()
        };
        d.set_settings(settings, 0).unwrap();
        assert_eq!(d.target().promotion, None);

        d.apply_transform(2.0, Vec2::ZERO, 10).unwrap();
        assert_eq!(d.target().promotion, Some(Promotion { stacking_order: 7 }));
    }

    #[test]
    fn narrowed_bounds_clamp_current_scale() {
        let mut d = driver(1.0, 4.0);
        d.apply_transform(3.0, Vec2::new(4.0, 2.0), 0).unwrap();
        d.transition_end(300).unwrap();

        let settings = TransformSettings {
            max_scale: 2.0,
            ..d.settings()
        };
        d.set_settings(settings, 500).unwrap();
        assert_eq!(d.transform_state().scale, 2.0);
        assert_eq!(d.transform_state().translate, Vec2::new(4.0, 2.0));
        assert_eq!(d.target().scale, 2.0);
        assert!(d.is_transitioning());
        assert_eq!(d.next_deadline(), Some(500 + 300 + TRANSITION_SLACK_MS));

        // Bounds that still contain the scale leave it alone.
        let calls = d.target().transform_calls;
        let settings = TransformSettings {
            max_scale: 3.0,
            ..d.settings()
        };
        d.set_settings(settings, 600).unwrap();
        assert_eq!(d.transform_state().scale, 2.0);
        assert_eq!(d.target().transform_calls, calls);
    }

    #[test]
    fn fallback_deadline_completes_transition() {
        let mut d = driver(1.0, 4.0);
        d.apply_transform(2.0, Vec2::ZERO, 0).unwrap();
        d.reset_transform(100).unwrap();
        assert_eq!(d.next_deadline(), Some(100 + 300 + TRANSITION_SLACK_MS));

        d.poll(399).unwrap();
        assert!(d.is_promoted());
        d.poll(450).unwrap();
        assert!(!d.is_promoted());
        assert!(!d.is_transitioning());
        assert_eq!(d.next_deadline(), None);
    }

    #[test]
    fn hooks_fire_once_per_change() {
        let fired = Rc::new(Cell::new(0));
        let mut d = driver(1.0, 4.0);
        let counter = Rc::clone(&fired);
        d.on_transition_end(move |_, _| counter.set(counter.get() + 1));

        d.apply_transform(2.0, Vec2::ZERO, 0).unwrap();
        d.transition_end(300).unwrap();
        d.transition_end(301).unwrap();
        d.poll(1_000).unwrap();
        assert_eq!(fired.get(), 1);

        // No change, no transition.
        d.apply_transform(2.0, Vec2::ZERO, 2_000).unwrap();
        d.transition_end(2_300).unwrap();
        assert_eq!(fired.get(), 1);

        d.reset_transform(3_000).unwrap();
        d.transition_end(3_300).unwrap();
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn zero_duration_completes_synchronously() {
        let seen = Rc::new(Cell::new(None));
        let mut d = TransformDriver::new(
            MockTarget::new(),
            TransformSettings {
                transition_duration_ms: 0,
                ..TransformSettings::default()
            },
            Capabilities::default(),
        );
        let sink = Rc::clone(&seen);
        d.on_transition_end(move |state, now| sink.set(Some((state.scale, now))));

        d.apply_transform(3.0, Vec2::ZERO, 5).unwrap();
        assert_eq!(seen.get(), Some((3.0, 5)));
        assert_eq!(d.target().transition, None);

        d.reset_transform(9).unwrap();
        assert_eq!(seen.get(), Some((1.0, 9)));
        assert!(!d.is_promoted());
        assert_eq!(d.next_deadline(), None);
    }

    #[test]
    fn fallback_mode_resizes_box() {
        let mut d = TransformDriver::new(
            MockTarget::new(),
            TransformSettings::default(),
            Capabilities::TOUCH,
        );
        d.apply_transform(2.0, Vec2::new(5.0, 5.0), 0).unwrap();
        assert_eq!(d.target().box_size, Some(Size::new(400.0, 200.0)));
        assert_eq!(d.target().transform_calls, 0);

        d.reset_transform(10).unwrap();
        assert_eq!(d.target().box_size, None);
    }

    #[test]
    fn calculate_scale_guards_zero_and_clamps() {
        let d = driver(1.0, 4.0);
        assert_eq!(d.calculate_scale(0.0, 50.0), 1.0);
        assert_eq!(d.calculate_scale(100.0, 250.0), 2.5);
        assert_eq!(d.calculate_scale(100.0, 1_000.0), 4.0);
        assert_eq!(d.calculate_scale(100.0, 10.0), 1.0);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut d = driver(1.0, 4.0);
        d.apply_transform(2.0, Vec2::ZERO, 0).unwrap();
        let mut snapshot = d.transform_state();
        snapshot.scale = 9.0;
        assert_eq!(d.transform_state().scale, 2.0);
        assert!(d.transform_state().is_zoomed());
    }

    #[test]
    fn detached_target_reports_failure_but_tracks_state() {
        let mut d = TransformDriver::new(
            MockTarget::detached(),
            TransformSettings::default(),
            Capabilities::default(),
        );
        assert_eq!(
            d.apply_transform(2.0, Vec2::ZERO, 0),
            Err(SurfaceError::Detached)
        );
        assert_eq!(d.transform_state().scale, 2.0);
        assert!(!d.is_promoted());
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut d = driver(1.0, 4.0);
        d.apply_transform(3.0, Vec2::new(1.0, 1.0), 0).unwrap();

        d.destroy().unwrap();
        let after_once = d.target().clone();
        assert_eq!(after_once.scale, 1.0);
        assert_eq!(after_once.transition, None);
        assert_eq!(after_once.promotion, None);
        assert_eq!(d.next_deadline(), None);

        d.destroy().unwrap();
        assert_eq!(d.target().transform_calls, after_once.transform_calls);
        assert_eq!(d.transform_state(), TransformState::IDENTITY);
        assert!(d.is_destroyed());
        assert_eq!(
            d.apply_transform(2.0, Vec2::ZERO, 0),
            Err(SurfaceError::Detached)
        );
    }
}
