use crate::math::Vec2;
use crate::objects::BodyId;

/// Narrow-phase result for one overlapping shape pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactGeometry {
    /// Unit normal pointing from shape A towards shape B.
    pub normal: Vec2,
    /// Penetration depth along `normal`, > 0.
    pub depth: f64,
    /// Representative contact point in world space (deepest point).
    pub point: Vec2,
}

impl ContactGeometry {
    /// Same contact seen from the other shape.
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// A contact between two bodies, produced once per sub-step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub body_a: BodyId,
    pub body_b: BodyId,
    /// Unit normal pointing from body A towards body B.
    pub normal: Vec2,
    pub depth: f64,
    pub point: Vec2,
    /// At least one body is a sensor: reported, never resolved.
    pub sensor: bool,
}

impl Contact {
    pub fn new(body_a: BodyId, body_b: BodyId, geometry: ContactGeometry, sensor: bool) -> Self {
        Self {
            body_a,
            body_b,
            normal: geometry.normal,
            depth: geometry.depth,
            point: geometry.point,
            sensor,
        }
    }

    /// Order-independent key for begin/end tracking.
    pub fn pair_key(&self) -> (BodyId, BodyId) {
        if self.body_a <= self.body_b {
            (self.body_a, self.body_b)
        } else {
            (self.body_b, self.body_a)
        }
    }
}
