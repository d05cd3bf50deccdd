use crate::error::ShapeError;
use crate::math::Vec2;

/// Relative tolerance for zero-area and reflex-turn checks.
const GEOMETRY_TOLERANCE: f64 = 1e-12;

/// A convex polygon in body-local space, stored counter-clockwise with one
/// precomputed outward unit normal per edge (`normals[i]` belongs to the
/// edge from `vertices[i]` to `vertices[i + 1]`).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
}

impl Polygon {
    /// Validates and stores a convex polygon.
    ///
    /// Clockwise input is reversed so every stored polygon winds
    /// counter-clockwise. Collinear vertices are accepted.
    pub fn new(mut vertices: Vec<Vec2>) -> Result<Self, ShapeError> {
        if vertices.len() < 3 {
            return Err(ShapeError::TooFewVertices(vertices.len()));
        }
        if let Some(i) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(ShapeError::NonFiniteVertex(i));
        }

        let scale = vertices
            .iter()
            .fold(0.0_f64, |acc, v| acc.max(v.length_squared()))
            .max(1.0);
        let signed_area = signed_area(&vertices);
        if signed_area.abs() <= GEOMETRY_TOLERANCE * scale {
            return Err(ShapeError::Degenerate);
        }
        if signed_area < 0.0 {
            vertices.reverse();
        }

        let n = vertices.len();
        let mut normals = Vec::with_capacity(n);
        for i in 0..n {
            let edge = vertices[(i + 1) % n] - vertices[i];
            if edge.length_squared() <= GEOMETRY_TOLERANCE * scale {
                return Err(ShapeError::Degenerate);
            }
            let next_edge = vertices[(i + 2) % n] - vertices[(i + 1) % n];
            if edge.cross(next_edge) < -GEOMETRY_TOLERANCE * scale {
                return Err(ShapeError::NotConvex((i + 1) % n));
            }
            normals.push(Vec2::new(edge.y, -edge.x).normalize_or_zero());
        }

        Ok(Self { vertices, normals })
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`.
    pub fn regular(sides: usize, radius: f64) -> Result<Self, ShapeError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ShapeError::InvalidDimension(radius));
        }
        let step = std::f64::consts::TAU / sides.max(1) as f64;
        let vertices = (0..sides)
            .map(|i| Vec2::X.rotate(step * i as f64) * radius)
            .collect();
        Self::new(vertices)
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    /// Shoelace area.
    pub fn area(&self) -> f64 {
        signed_area(&self.vertices).abs()
    }

    /// Area centroid, relative to the body origin.
    pub fn centroid(&self) -> Vec2 {
        let origin = self.vertices[0];
        let mut weighted = Vec2::ZERO;
        let mut area_sum = 0.0;
        for window in self.vertices[1..].windows(2) {
            let tri_area = (window[0] - origin).cross(window[1] - origin) * 0.5;
            weighted += (origin + window[0] + window[1]) / 3.0 * tri_area;
            area_sum += tri_area;
        }
        weighted / area_sum
    }
}

fn signed_area(vertices: &[Vec2]) -> f64 {
    let n = vertices.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        twice_area += vertices[i].cross(vertices[(i + 1) % n]);
    }
    twice_area * 0.5
}
