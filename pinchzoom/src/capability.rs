// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime capability flags.

bitflags::bitflags! {
    /// Runtime capabilities, read once when an element is bound.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// The visual layer supports scale/translate transforms.
        ///
        /// Without it the transform driver resizes the element box instead.
        const TRANSFORM = 0b0000_0001;
        /// The platform delivers multi-point touch input.
        const TOUCH     = 0b0000_0010;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::TRANSFORM | Self::TOUCH
    }
}

impl Capabilities {
    /// Returns `true` if transforms are available.
    #[must_use]
    pub fn transform_supported(self) -> bool {
        self.contains(Self::TRANSFORM)
    }

    /// Returns `true` if touch input is available.
    #[must_use]
    pub fn touch_supported(self) -> bool {
        self.contains(Self::TOUCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_everything() {
        let caps = Capabilities::default();
        assert!(caps.transform_supported());
        assert!(caps.touch_supported());
    }

    #[test]
    fn touch_only() {
        let caps = Capabilities::TOUCH;
        assert!(!caps.transform_supported());
        assert!(caps.touch_supported());
        assert!(!Capabilities::empty().touch_supported());
    }
}
