use crate::error::ShapeError;
use crate::math::Vec2;

/// Outward normals of the four edges, in the same order as the vertices
/// (bottom, right, top, left for counter-clockwise winding).
const EDGE_NORMALS: [Vec2; 4] = [
    Vec2::new(0.0, -1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(-1.0, 0.0),
];

/// A box centred on the body origin, oriented by the body rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub half_width: f64,
    pub half_height: f64,
    vertices: [Vec2; 4],
}

impl Rectangle {
    pub fn new(half_width: f64, half_height: f64) -> Result<Self, ShapeError> {
        for extent in [half_width, half_height] {
            if !(extent.is_finite() && extent > 0.0) {
                return Err(ShapeError::InvalidDimension(extent));
            }
        }
        Ok(Self {
            half_width,
            half_height,
            vertices: [
                Vec2::new(-half_width, -half_height),
                Vec2::new(half_width, -half_height),
                Vec2::new(half_width, half_height),
                Vec2::new(-half_width, half_height),
            ],
        })
    }

    /// Builds a rectangle from its full width and height.
    pub fn from_size(width: f64, height: f64) -> Result<Self, ShapeError> {
        Self::new(width * 0.5, height * 0.5)
    }

    /// Local-space corners, counter-clockwise from bottom-left.
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec2] {
        &EDGE_NORMALS
    }

    pub fn area(&self) -> f64 {
        4.0 * self.half_width * self.half_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_vertices_ccw() {
        let r = Rectangle::new(2.0, 1.0).unwrap();
        let v = r.vertices();
        assert_eq!(v[0], Vec2::new(-2.0, -1.0));
        assert_eq!(v[2], Vec2::new(2.0, 1.0));
        // Each normal points away from the centre through its edge midpoint.
        for i in 0..4 {
            let mid = (v[i] + v[(i + 1) % 4]) * 0.5;
            assert!(mid.dot(r.normals()[i]) > 0.0);
        }
        assert_eq!(r.area(), 8.0);
    }

    #[test]
    fn test_rectangle_from_size() {
        let r = Rectangle::from_size(10.0, 4.0).unwrap();
        assert_eq!(r.half_width, 5.0);
        assert_eq!(r.half_height, 2.0);
    }

    #[test]
    fn test_rectangle_rejects_bad_extent() {
        assert!(Rectangle::new(0.0, 1.0).is_err());
        assert!(Rectangle::new(1.0, -2.0).is_err());
    }
}
