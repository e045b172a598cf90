// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Validated configuration record.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Default backdrop color spec.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#000000";
/// Default lower scale bound.
pub const DEFAULT_MIN_SCALE: f64 = 1.0;
/// Default upper scale bound.
pub const DEFAULT_MAX_SCALE: f64 = 4.0;
/// Default duration of the snap-back transition.
pub const DEFAULT_TRANSITION_DURATION_MS: u32 = 300;
/// Default stacking order of a zoomed element.
pub const DEFAULT_STACKING_ORDER: u32 = 1000;

/// Options for one bound group of elements.
#[derive(Clone, Debug, PartialEq)]
pub struct PinchZoomConfig {
    /// Backdrop color spec; see [`ColorSpec`](crate::color::ColorSpec).
    pub background_color: String,
    /// Smallest allowed scale. Must be finite and `> 0`.
    pub min_scale: f64,
    /// Largest allowed scale. Must be finite and `> min_scale`.
    pub max_scale: f64,
    /// Duration of transform transitions, in milliseconds.
    pub transition_duration_ms: u32,
    /// Stacking order applied to a zoomed element.
    pub stacking_order: u32,
}

impl Default for PinchZoomConfig {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND_COLOR.into(),
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            transition_duration_ms: DEFAULT_TRANSITION_DURATION_MS,
            stacking_order: DEFAULT_STACKING_ORDER,
        }
    }
}

/// A configuration field that was replaced during validation.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigIssue {
    /// `min_scale` was not finite or not positive.
    InvalidMinScale(f64),
    /// `max_scale` was not finite.
    InvalidMaxScale(f64),
    /// The bounds were not ordered `min_scale < max_scale`.
    UnorderedScaleBounds {
        /// Offending lower bound.
        min_scale: f64,
        /// Offending upper bound.
        max_scale: f64,
    },
    /// `background_color` was empty.
    EmptyBackgroundColor,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMinScale(v) => {
                write!(f, "min_scale {v} is not a positive number, using {DEFAULT_MIN_SCALE}")
            }
            Self::InvalidMaxScale(v) => {
                write!(f, "max_scale {v} is not a finite number, using {DEFAULT_MAX_SCALE}")
            }
            Self::UnorderedScaleBounds {
                min_scale,
                max_scale,
            } => write!(
                f,
                "min_scale {min_scale} must be below max_scale {max_scale}, using defaults"
            ),
            Self::EmptyBackgroundColor => write!(
                f,
                "background_color is empty, using {DEFAULT_BACKGROUND_COLOR:?}"
            ),
        }
    }
}

impl PinchZoomConfig {
    /// Replaces every invalid field with its default and reports what changed.
    ///
    /// Afterwards `0 < min_scale < max_scale` holds and both are finite. Each
    /// issue is also logged as a warning.
    #[must_use]
    pub fn validated(mut self) -> (Self, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
            issues.push(ConfigIssue::InvalidMinScale(self.min_scale));
            self.min_scale = DEFAULT_MIN_SCALE;
        }
        if !self.max_scale.is_finite() {
            issues.push(ConfigIssue::InvalidMaxScale(self.max_scale));
            self.max_scale = DEFAULT_MAX_SCALE;
        }
        if self.min_scale >= self.max_scale {
            issues.push(ConfigIssue::UnorderedScaleBounds {
                min_scale: self.min_scale,
                max_scale: self.max_scale,
            });
            self.min_scale = DEFAULT_MIN_SCALE;
            self.max_scale = DEFAULT_MAX_SCALE;
        }
        if self.background_color.trim().is_empty() {
            issues.push(ConfigIssue::EmptyBackgroundColor);
            self.background_color = DEFAULT_BACKGROUND_COLOR.into();
        }

        for issue in &issues {
            log::warn!("pinchzoom config: {issue}");
        }
        (self, issues)
    }
}
