// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=pinchzoom_web --heading-base-level=0

//! Browser adapter for [`pinchzoom`].
//!
//! When targeting `wasm32`, this crate provides:
//!
//! - `HtmlZoomTarget`: a [`ZoomTarget`](pinchzoom::ZoomTarget) over a `web_sys::HtmlElement`,
//!   writing `transform`, `transition`, box size and stacking styles.
//! - `DomBackdrops`: a [`BackdropFactory`](pinchzoom::BackdropFactory) creating one fixed,
//!   full-viewport, click-through `<div>` per bind group.
//! - `SelectorResolver`: resolves CSS selectors with `querySelectorAll`, keying elements
//!   through a `WeakMap` so nothing is written onto them.
//! - `WebPinchZoom`: binds elements, installs `touchstart`/`touchmove`/`touchend`/
//!   `touchcancel` and `transitionend` listeners, and drives pending timers with `setTimeout`.
//!
//! ```no_run
//! #[cfg(target_arch = "wasm32")]
//! fn zoom_gallery() -> Result<pinchzoom_web::WebPinchZoom, pinchzoom::SurfaceError> {
//!     let _ = pinchzoom_web::init_logging(log::Level::Info);
//!     let mut zoom = pinchzoom_web::WebPinchZoom::new()?;
//!     match zoom.bind(".gallery img", pinchzoom::PinchZoomConfig::default()) {
//!         Ok(report) => log::info!("zooming {} images", report.bound.len()),
//!         Err(err) => log::warn!("{err}"),
//!     }
//!     Ok(zoom)
//! }
//! ```
//!
//! The helpers turning core values into CSS text and classifying event types
//! are target independent.

#![no_std]

extern crate alloc;

use alloc::format;
use alloc::string::{String, ToString};

use kurbo::{Size, Vec2};
use peniko::Color;
use pinchzoom::gesture::InputPhase;

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::{
    DomBackdrop, DomBackdrops, ElementKey, HtmlZoomTarget, SelectorResolver, WebPinchZoom,
    image_only, probe_capabilities,
};

/// Touch event types the adapter listens to.
pub const TOUCH_EVENTS: [&str; 4] = ["touchstart", "touchmove", "touchend", "touchcancel"];

/// Classifies a DOM event type. Cancellation ends the gesture.
#[must_use]
pub fn classify(event_type: &str) -> Option<InputPhase> {
    match event_type {
        "touchstart" => Some(InputPhase::Start),
        "touchmove" => Some(InputPhase::Move),
        "touchend" | "touchcancel" => Some(InputPhase::End),
        _ => None,
    }
}

/// Returns `true` for the transitioned properties that complete a zoom change.
#[must_use]
pub fn completes_zoom(property_name: &str) -> bool {
    matches!(property_name, "transform" | "width")
}

/// CSS `transform` value for a scale and translation.
#[must_use]
pub fn transform_css(scale: f64, translate: Vec2) -> String {
    format!(
        "translate({}px, {}px) scale({scale})",
        translate.x, translate.y
    )
}

/// CSS `transition` value for the zoomed properties, or `None` for no transition.
#[must_use]
pub fn transition_css(duration_ms: Option<u32>) -> Option<String> {
    let ms = duration_ms.filter(|ms| *ms > 0)?;
    Some(format!(
        "transform {ms}ms ease-out, width {ms}ms ease-out, height {ms}ms ease-out"
    ))
}

/// CSS `width`/`height` values for a fallback box size.
#[must_use]
pub fn box_size_css(size: Size) -> (String, String) {
    (format!("{}px", size.width), format!("{}px", size.height))
}

/// CSS color text for a backdrop color.
#[must_use]
pub fn color_css(color: Color) -> String {
    // `Rgba8` formats as a CSS `rgb(...)`/`rgba(...)` string.
    color.to_rgba8().to_string()
}

/// Installs `console_log` as the `log` backend.
#[cfg(target_arch = "wasm32")]
pub fn init_logging(level: log::Level) -> Result<(), log::SetLoggerError> {
    console_log::init_with_level(level)
}
