use super::vec2::Vec2;

/// Rigid placement of a body: translation plus rotation, with the rotation's
/// sine and cosine cached so narrow-phase loops transform vertices cheaply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: f64,
    cos: f64,
    sin: f64,
}

impl Transform {
    pub fn new(position: Vec2, rotation: f64) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self { position, rotation, cos, sin }
    }

    pub fn identity() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }

    /// Rotates a local direction into world space (no translation).
    #[inline]
    pub fn rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(v.x * self.cos - v.y * self.sin, v.x * self.sin + v.y * self.cos)
    }

    /// Rotates a world direction into local space.
    #[inline]
    pub fn inverse_rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(v.x * self.cos + v.y * self.sin, -v.x * self.sin + v.y * self.cos)
    }

    /// Maps a local point to world space (rotation, then translation).
    #[inline]
    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.rotate(point) + self.position
    }

    /// Maps a world point back into local space.
    #[inline]
    pub fn apply_inverse(&self, point: Vec2) -> Vec2 {
        self.inverse_rotate(point - self.position)
    }

    pub fn is_axis_aligned(&self) -> bool {
        self.sin == 0.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
