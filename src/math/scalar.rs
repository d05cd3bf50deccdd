//! Scalar helpers shared by the integrators and the spring model.

use std::f64::consts::PI;

/// Clamps `value` into `[min, max]`. NaN passes through unchanged.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linear interpolation; `t` outside [0, 1] extrapolates.
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Inverse of [`lerp`]: where `value` sits between `from` and `to`.
/// Returns 0 for an empty range.
#[inline]
pub fn inverse_lerp(from: f64, to: f64, value: f64) -> f64 {
    let span = to - from;
    if span.abs() <= f64::EPSILON {
        0.0
    } else {
        (value - from) / span
    }
}

#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Wraps an angle in radians to (-PI, PI].
pub fn wrap_angle(angle: f64) -> f64 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = angle.sin().atan2(angle.cos());
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}
