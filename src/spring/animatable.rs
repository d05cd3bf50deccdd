use std::fmt::Debug;

use crate::math::Vec2;

/// A value a [`Spring`](super::Spring) can drive. Each axis is integrated
/// independently with the same config.
pub trait Animatable: Copy + PartialEq + Debug {
    const DIMENSIONS: usize;

    fn zero() -> Self;

    /// Component `axis`, `axis < DIMENSIONS`.
    fn get(&self, axis: usize) -> f64;

    fn set(&mut self, axis: usize, value: f64);
}

impl Animatable for f64 {
    const DIMENSIONS: usize = 1;

    fn zero() -> Self {
        0.0
    }

    fn get(&self, _axis: usize) -> f64 {
        *self
    }

    fn set(&mut self, _axis: usize, value: f64) {
        *self = value;
    }
}

impl Animatable for Vec2 {
    const DIMENSIONS: usize = 2;

    fn zero() -> Self {
        Vec2::ZERO
    }

    fn get(&self, axis: usize) -> f64 {
        if axis == 0 {
            self.x
        } else {
            self.y
        }
    }

    fn set(&mut self, axis: usize, value: f64) {
        if axis == 0 {
            self.x = value;
        } else {
            self.y = value;
        }
    }
}

/// Fixed-size channel arrays, e.g. RGBA colours or `[x, y, scale]`.
impl<const N: usize> Animatable for [f64; N] {
    const DIMENSIONS: usize = N;

    fn zero() -> Self {
        [0.0; N]
    }

    fn get(&self, axis: usize) -> f64 {
        self[axis]
    }

    fn set(&mut self, axis: usize, value: f64) {
        self[axis] = value;
    }
}
