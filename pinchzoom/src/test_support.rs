// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording surfaces for unit tests.

use alloc::rc::Rc;
use core::cell::Cell;

use kurbo::{Size, Vec2};
use peniko::Color;

use crate::surface::{BackdropElement, BackdropFactory, Promotion, SurfaceError, ZoomTarget};

#[derive(Clone, Debug)]
pub(crate) struct MockTarget {
    pub(crate) scale: f64,
    pub(crate) translate: Vec2,
    pub(crate) transition: Option<u32>,
    pub(crate) natural: Size,
    pub(crate) box_size: Option<Size>,
    pub(crate) promotion: Option<Promotion>,
    pub(crate) detached: bool,
    pub(crate) transform_calls: usize,
}

impl MockTarget {
    pub(crate) fn new() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
            transition: None,
            natural: Size::new(200.0, 100.0),
            box_size: None,
            promotion: None,
            detached: false,
            transform_calls: 0,
        }
    }

    pub(crate) fn detached() -> Self {
        Self {
            detached: true,
            ..Self::new()
        }
    }

    fn check(&self) -> Result<(), SurfaceError> {
        if self.detached {
            Err(SurfaceError::Detached)
        } else {
            Ok(())
        }
    }
}

impl ZoomTarget for MockTarget {
    fn set_transform(&mut self, scale: f64, translate: Vec2) -> Result<(), SurfaceError> {
        self.check()?;
        self.scale = scale;
        self.translate = translate;
        self.transform_calls += 1;
        Ok(())
    }

    fn set_transition(&mut self, duration_ms: Option<u32>) -> Result<(), SurfaceError> {
        self.check()?;
        self.transition = duration_ms;
        Ok(())
    }

    fn natural_size(&self) -> Result<Size, SurfaceError> {
        self.check()?;
        Ok(self.natural)
    }

    fn set_box_size(&mut self, size: Option<Size>) -> Result<(), SurfaceError> {
        self.check()?;
        self.box_size = size;
        Ok(())
    }

    fn set_promotion(&mut self, promotion: Option<Promotion>) -> Result<(), SurfaceError> {
        self.check()?;
        self.promotion = promotion;
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct MockBackdrop {
    pub(crate) color: Option<Color>,
    pub(crate) visible: bool,
    removed: Rc<Cell<usize>>,
}

impl MockBackdrop {
    pub(crate) fn alpha(&self) -> f32 {
        self.color.map_or(0.0, |c| c.components[3])
    }
}

impl BackdropElement for MockBackdrop {
    fn set_color(&mut self, color: Color) -> Result<(), SurfaceError> {
        self.color = Some(color);
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> Result<(), SurfaceError> {
        self.visible = visible;
        Ok(())
    }

    fn remove(self) -> Result<(), SurfaceError> {
        self.removed.set(self.removed.get() + 1);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockBackdrops {
    pub(crate) created: usize,
    pub(crate) removed: Rc<Cell<usize>>,
    pub(crate) fail: bool,
}

impl MockBackdrops {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl BackdropFactory for MockBackdrops {
    type Element = MockBackdrop;

    fn create_backdrop(&mut self) -> Result<MockBackdrop, SurfaceError> {
        if self.fail {
            return Err(SurfaceError::Unsupported("backdrop"));
        }
        self.created += 1;
        Ok(MockBackdrop {
            color: None,
            visible: false,
            removed: Rc::clone(&self.removed),
        })
    }
}
