//! Membership primitives and the declarative shape descriptor interpreted by them.
//!
//! Every primitive returns a degree clamped to `[0, 1]`. Zero-width ramps never divide:
//! they collapse into a step at the shared breakpoint, so `trapezoidal(0.0, 0.0, 0.0, 0.1, 0.2)`
//! is fully inside the plateau.

use serde::{Deserialize, Serialize};

/// Triangle rising on `[a, b]` and falling on `[b, c]`; zero outside `[a, c]`.
pub fn triangular(x: f64, a: f64, b: f64, c: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    if a == b && b == c {
        return if x == a { 1.0 } else { 0.0 };
    }
    if x < a || x > c {
        return 0.0;
    }
    if x == b {
        return 1.0;
    }

    let degree = if x < b {
        (x - a) / (b - a)
    } else {
        (c - x) / (c - b)
    };
    clamp_unit(degree)
}

/// Trapezoid with a flat top on `[b, c]`, ramps on `[a, b)` and `(c, d]`.
pub fn trapezoidal(x: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    if b <= x && x <= c {
        return 1.0;
    }
    if x <= a || x >= d {
        return 0.0;
    }

    let degree = if x < b {
        (x - a) / (b - a)
    } else {
        (d - x) / (d - c)
    };
    clamp_unit(degree)
}

/// Linear ramp from 0 at `start` to 1 at `end`, saturated on both sides.
pub fn ramp_up(x: f64, start: f64, end: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    if x >= end {
        return 1.0;
    }
    if x <= start {
        return 0.0;
    }
    clamp_unit((x - start) / (end - start))
}

/// Linear ramp from 1 at `start` down to 0 at `end`, saturated on both sides.
pub fn ramp_down(x: f64, start: f64, end: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    if x <= start {
        return 1.0;
    }
    if x >= end {
        return 0.0;
    }
    clamp_unit((end - x) / (end - start))
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Declarative membership shape. Policy documents describe labels with these
/// descriptors instead of ad-hoc functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MembershipShape {
    Triangular { a: f64, b: f64, c: f64 },
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
    RampUp { start: f64, end: f64 },
    RampDown { start: f64, end: f64 },
}

impl MembershipShape {
    pub fn degree(&self, x: f64) -> f64 {
        match *self {
            MembershipShape::Triangular { a, b, c } => triangular(x, a, b, c),
            MembershipShape::Trapezoidal { a, b, c, d } => trapezoidal(x, a, b, c, d),
            MembershipShape::RampUp { start, end } => ramp_up(x, start, end),
            MembershipShape::RampDown { start, end } => ramp_down(x, start, end),
        }
    }

    pub fn breakpoints(&self) -> Vec<f64> {
        match *self {
            MembershipShape::Triangular { a, b, c } => vec![a, b, c],
            MembershipShape::Trapezoidal { a, b, c, d } => vec![a, b, c, d],
            MembershipShape::RampUp { start, end } | MembershipShape::RampDown { start, end } => {
                vec![start, end]
            }
        }
    }

    /// Representative point of the shape's core, where the degree is exactly 1.
    pub fn core_center(&self) -> f64 {
        match *self {
            MembershipShape::Triangular { b, .. } => b,
            MembershipShape::Trapezoidal { b, c, .. } => b + (c - b) / 2.0,
            MembershipShape::RampUp { end, .. } => end,
            MembershipShape::RampDown { start, .. } => start,
        }
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        let points = self.breakpoints();
        if points.iter().any(|point| !point.is_finite()) {
            return Err(ShapeError::NonFinite);
        }
        if points.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(ShapeError::Unordered { breakpoints: points });
        }
        Ok(())
    }
}

/// Construction-time defects in a membership shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("breakpoints must be finite numbers")]
    NonFinite,
    #[error("breakpoints must be non-decreasing, found {breakpoints:?}")]
    Unordered { breakpoints: Vec<f64> },
}
