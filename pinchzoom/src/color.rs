// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backdrop color specs with a replaceable alpha channel.
//!
//! Accepted forms are `rgb(r, g, b)`, `rgba(r, g, b, a)`, `#rgb` and `#rrggbb`.
//! Anything else (named colors, gradients, garbage) maps to
//! [`DEFAULT_BACKDROP_RGB`]; parsing never fails.

use alloc::string::String;

use peniko::Color;

/// Fallback backdrop color for unrecognized specs.
pub const DEFAULT_BACKDROP_RGB: [u8; 3] = [0, 0, 0];

/// A parsed backdrop color spec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorSpec {
    source: String,
    rgb: Option<[u8; 3]>,
}

impl ColorSpec {
    /// Parses a color spec. Unrecognized input is kept but renders as the default color.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let trimmed = source.trim();
        let rgb = parse_hex(trimmed).or_else(|| parse_rgb_function(trimmed));
        if rgb.is_none() {
            log::debug!("backdrop color {trimmed:?} not recognized, using default");
        }
        Self {
            source: source.into(),
            rgb,
        }
    }

    /// Returns the spec as given.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the spec was recognized.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.rgb.is_some()
    }

    /// Returns the color channels, falling back to [`DEFAULT_BACKDROP_RGB`].
    #[must_use]
    pub fn rgb(&self) -> [u8; 3] {
        self.rgb.unwrap_or(DEFAULT_BACKDROP_RGB)
    }

    /// Returns the spec's color with `alpha` (clamped to `0..=1`) replacing its alpha.
    #[must_use]
    pub fn with_alpha(&self, alpha: f64) -> Color {
        let [r, g, b] = self.rgb();
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Alpha is a unit fraction; f32 precision is plenty."
        )]
        let alpha = alpha.clamp(0.0, 1.0) as f32;
        Color::from_rgb8(r, g, b).with_alpha(alpha)
    }
}

impl Default for ColorSpec {
    fn default() -> Self {
        Self::parse(crate::config::DEFAULT_BACKGROUND_COLOR)
    }
}

fn parse_hex(s: &str) -> Option<[u8; 3]> {
    let digits = s.strip_prefix('#')?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).ok();
    match digits.len() {
        3 => {
            let mut out = [0_u8; 3];
            for (i, channel) in out.iter_mut().enumerate() {
                *channel = nibble(i)? * 17;
            }
            Some(out)
        }
        6 => {
            let mut out = [0_u8; 3];
            for (i, channel) in out.iter_mut().enumerate() {
                *channel = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).ok()?;
            }
            Some(out)
        }
        _ => None,
    }
}

fn parse_rgb_function(s: &str) -> Option<[u8; 3]> {
    let lower = s.to_ascii_lowercase();
    let (args, expected) = if let Some(rest) = lower.strip_prefix("rgba") {
        (rest, 4)
    } else if let Some(rest) = lower.strip_prefix("rgb") {
        (rest, 3)
    } else {
        return None;
    };
    let inner = args.trim().strip_prefix('(')?.strip_suffix(')')?;

    let mut out = [0_u8; 3];
    let mut count = 0;
    for (i, part) in inner.split(',').enumerate() {
        let value: f64 = part.trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        if i < 3 {
            out[i] = channel_from_f64(value);
        }
        count += 1;
    }
    (count == expected).then_some(out)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Value is clamped into 0..=255 first; the cast rounds half up."
)]
fn channel_from_f64(v: f64) -> u8 {
    (v.clamp(0.0, 255.0) + 0.5) as u8
}
