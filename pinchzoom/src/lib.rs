// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=pinchzoom --heading-base-level=0

//! Pinchzoom: a headless pinch-to-zoom pipeline.
//!
//! Two-finger touch input on a bound element becomes a visual enlargement of
//! that element plus a translucent full-viewport backdrop whose opacity grows
//! with the zoom. Releasing the fingers snaps the element back to its original
//! size and fades the backdrop out.
//!
//! The pipeline is split into small pieces that know nothing about any
//! particular platform:
//!
//! - [`geometry`]: distance and midpoint of two touch points.
//! - [`gesture`]: a state machine turning touch snapshots into pinch start/move/end events.
//! - [`transform`]: applies a clamped scale to a [`ZoomTarget`], with transition bookkeeping.
//! - [`backdrop`]: a lazily created [`BackdropElement`] whose alpha tracks the zoom.
//! - [`session`]: wires one element's gestures to its transform and the group backdrop.
//! - [`controller`]: the registry of bound elements ([`PinchZoom`]).
//!
//! Rendering goes through the traits in [`surface`]; a platform adapter
//! implements them for real elements and feeds classified input events in.
//!
//! ## Time
//!
//! Nothing here reads a clock. Operations that start delays take the current
//! time in milliseconds, and the host drives expiry by calling `poll(now)`
//! at or after `next_deadline()`. Every delayed effect re-checks state when it
//! fires and can be cancelled before then.
//!
//! ## Example
//!
//! ```
//! use kurbo::{Point, Size, Vec2};
//! use peniko::Color;
//! use pinchzoom::controller::{AcceptAll, ResolveError, TargetResolver};
//! use pinchzoom::gesture::InputPhase;
//! use pinchzoom::surface::{BackdropElement, BackdropFactory, Promotion, SurfaceError, ZoomTarget};
//! use pinchzoom::{Capabilities, PinchZoom, PinchZoomConfig};
//!
//! #[derive(Default)]
//! struct Image {
//!     scale: f64,
//! }
//!
//! impl ZoomTarget for Image {
//!     fn set_transform(&mut self, scale: f64, _: Vec2) -> Result<(), SurfaceError> {
//!         self.scale = scale;
//!         Ok(())
//!     }
//!     fn set_transition(&mut self, _: Option<u32>) -> Result<(), SurfaceError> {
//!         Ok(())
//!     }
//!     fn natural_size(&self) -> Result<Size, SurfaceError> {
//!         Ok(Size::new(320.0, 240.0))
//!     }
//!     fn set_box_size(&mut self, _: Option<Size>) -> Result<(), SurfaceError> {
//!         Ok(())
//!     }
//!     fn set_promotion(&mut self, _: Option<Promotion>) -> Result<(), SurfaceError> {
//!         Ok(())
//!     }
//! }
//!
//! struct Overlay;
//!
//! impl BackdropElement for Overlay {
//!     fn set_color(&mut self, _: Color) -> Result<(), SurfaceError> {
//!         Ok(())
//!     }
//!     fn set_visible(&mut self, _: bool) -> Result<(), SurfaceError> {
//!         Ok(())
//!     }
//!     fn remove(self) -> Result<(), SurfaceError> {
//!         Ok(())
//!     }
//! }
//!
//! struct Overlays;
//!
//! impl BackdropFactory for Overlays {
//!     type Element = Overlay;
//!     fn create_backdrop(&mut self) -> Result<Overlay, SurfaceError> {
//!         Ok(Overlay)
//!     }
//! }
//!
//! struct Gallery;
//!
//! impl TargetResolver for Gallery {
//!     type Spec = str;
//!     type Key = &'static str;
//!     type Target = Image;
//!     fn resolve(&mut self, _: &str) -> Result<Vec<(&'static str, Image)>, ResolveError> {
//!         Ok(vec![("hero", Image::default())])
//!     }
//! }
//!
//! let mut zoom = PinchZoom::new();
//! let report = zoom
//!     .bind(
//!         &mut Gallery,
//!         "img",
//!         &AcceptAll,
//!         Overlays,
//!         PinchZoomConfig::default(),
//!         Capabilities::default(),
//!         0,
//!     )
//!     .unwrap();
//! assert_eq!(report.bound, ["hero"]);
//!
//! let fingers = |dx: f64| [Point::new(0.0, 0.0), Point::new(dx, 0.0)];
//! zoom.handle_input(&"hero", InputPhase::Start, &fingers(100.0), 0);
//! zoom.handle_input(&"hero", InputPhase::Move, &fingers(250.0), 16);
//! assert_eq!(zoom.session(&"hero").unwrap().transform().target().scale, 2.5);
//!
//! zoom.handle_input(&"hero", InputPhase::End, &[], 40);
//! assert_eq!(zoom.session(&"hero").unwrap().transform().target().scale, 1.0);
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): forwards `std` to Kurbo and Peniko.
//! - `libm`: forwards `libm` to Kurbo and Peniko, for `no_std` targets.
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

pub mod backdrop;
pub mod capability;
pub mod color;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod gesture;
pub mod session;
pub mod surface;
pub mod timer;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use capability::Capabilities;
pub use config::PinchZoomConfig;
pub use controller::PinchZoom;
pub use session::Session;
pub use surface::{BackdropElement, BackdropFactory, SurfaceError, ZoomTarget};
