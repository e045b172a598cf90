// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visual-layer seams implemented by platform adapters.
//!
//! The drivers in this crate never touch a rendering environment directly.
//! They mutate a [`ZoomTarget`] (the element being zoomed) and a
//! [`BackdropElement`] produced on demand by a [`BackdropFactory`]. Every
//! mutation is fallible; the drivers turn failures into degraded output
//! instead of propagating them into gesture handling.

use alloc::string::String;
use core::fmt;

use kurbo::{Size, Vec2};
use peniko::Color;

/// Failure while mutating the visual layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceError {
    /// The element is no longer attached to a document or scene.
    Detached,
    /// The runtime does not support the requested operation.
    Unsupported(&'static str),
    /// Any other platform failure, with the platform's message.
    Platform(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => f.write_str("element is detached"),
            Self::Unsupported(what) => write!(f, "unsupported operation: {what}"),
            Self::Platform(msg) => write!(f, "platform error: {msg}"),
        }
    }
}

impl core::error::Error for SurfaceError {}

/// Stacking and positioning applied while an element is zoomed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Promotion {
    /// Stacking order placing the element above the backdrop and its siblings.
    pub stacking_order: u32,
}

/// The element a transform driver scales.
pub trait ZoomTarget {
    /// Applies a uniform scale followed by a translation, as one visual transform.
    fn set_transform(&mut self, scale: f64, translate: Vec2) -> Result<(), SurfaceError>;

    /// Sets the animated transition used for transform or box-size changes.
    ///
    /// `None` removes any transition styling.
    fn set_transition(&mut self, duration_ms: Option<u32>) -> Result<(), SurfaceError>;

    /// Returns the element's natural (unscaled) box size.
    fn natural_size(&self) -> Result<Size, SurfaceError>;

    /// Overrides the element's box size. `None` restores the natural size.
    ///
    /// Only used when transforms are unavailable.
    fn set_box_size(&mut self, size: Option<Size>) -> Result<(), SurfaceError>;

    /// Raises the element into its own positioned stacking context, or clears that with `None`.
    fn set_promotion(&mut self, promotion: Option<Promotion>) -> Result<(), SurfaceError>;
}

/// A translucent full-viewport backing element.
///
/// A freshly created backdrop must be fully transparent, hidden, and must
/// never intercept pointer input meant for the content underneath.
pub trait BackdropElement {
    /// Sets the fill color, including its alpha.
    fn set_color(&mut self, color: Color) -> Result<(), SurfaceError>;

    /// Makes the backdrop participate in rendering, or takes it out of rendering.
    fn set_visible(&mut self, visible: bool) -> Result<(), SurfaceError>;

    /// Detaches the backdrop from the visual layer.
    fn remove(self) -> Result<(), SurfaceError>
    where
        Self: Sized;
}

/// Lazily creates the backdrop element.
pub trait BackdropFactory {
    /// The element type this factory creates.
    type Element: BackdropElement;

    /// Creates and attaches a new, transparent, hidden backdrop.
    fn create_backdrop(&mut self) -> Result<Self::Element, SurfaceError>;
}

/// Folds `next` into `acc`, keeping the first failure.
pub(crate) fn keep_first_error(acc: &mut Result<(), SurfaceError>, next: Result<(), SurfaceError>) {
    if acc.is_ok() {
        *acc = next;
    }
}
