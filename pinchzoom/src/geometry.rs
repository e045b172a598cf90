// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-point geometry used by the gesture interpreter.

use kurbo::Point;

/// A single normalized touch sample in viewport coordinates.
///
/// Touch points carry no identity beyond the sample they came from; the
/// input adapter produces a fresh set on every platform event.
pub type TouchPoint = Point;

/// Euclidean distance between two touch samples.
#[must_use]
pub fn distance(p1: TouchPoint, p2: TouchPoint) -> f64 {
    p1.distance(p2)
}

/// Arithmetic mean of two touch samples.
#[must_use]
pub fn midpoint(p1: TouchPoint, p2: TouchPoint) -> TouchPoint {
    p1.midpoint(p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(Point::new(-1.0, 2.0), Point::new(-1.0, 2.0)), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Point::new(12.5, -3.0);
        let b = Point::new(-7.0, 40.25);
        assert_eq!(distance(a, b), distance(b, a));
    }

    #[test]
    fn midpoint_averages_coordinates() {
        let mid = midpoint(Point::new(0.0, 10.0), Point::new(100.0, -10.0));
        assert_eq!(mid, Point::new(50.0, 0.0));
    }
}
