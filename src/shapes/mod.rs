pub mod circle;
pub mod polygon;
pub mod rectangle;

pub use circle::Circle;
pub use polygon::Polygon;
pub use rectangle::Rectangle;

use crate::collision::Aabb;
use crate::math::{Transform, Vec2};

/// Geometric shape of a body, matched exhaustively by the narrow phase.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
    Polygon(Polygon),
}

impl Shape {
    /// Shorthand for `Shape::Circle(Circle::new(radius)?)`.
    pub fn circle(radius: f64) -> Result<Self, crate::ShapeError> {
        Circle::new(radius).map(Shape::Circle)
    }

    /// Shorthand for an oriented box given its half extents.
    pub fn rectangle(half_width: f64, half_height: f64) -> Result<Self, crate::ShapeError> {
        Rectangle::new(half_width, half_height).map(Shape::Rectangle)
    }

    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self, crate::ShapeError> {
        Polygon::new(vertices).map(Shape::Polygon)
    }

    /// Re-checks dimensions that callers can edit through public fields.
    /// Polygons are validated once in [`Polygon::new`] and cannot change.
    pub fn validate(&self) -> Result<(), crate::ShapeError> {
        match self {
            Shape::Circle(c) => Circle::new(c.radius).map(drop),
            Shape::Rectangle(r) => Rectangle::new(r.half_width, r.half_height).map(drop),
            Shape::Polygon(_) => Ok(()),
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Shape::Circle(c) => c.area(),
            Shape::Rectangle(r) => r.area(),
            Shape::Polygon(p) => p.area(),
        }
    }

    /// Local vertices of a polygonal shape; empty for circles.
    pub fn vertices(&self) -> &[Vec2] {
        match self {
            Shape::Circle(_) => &[],
            Shape::Rectangle(r) => r.vertices(),
            Shape::Polygon(p) => p.vertices(),
        }
    }

    /// Local outward edge normals of a polygonal shape; empty for circles.
    pub fn normals(&self) -> &[Vec2] {
        match self {
            Shape::Circle(_) => &[],
            Shape::Rectangle(r) => r.normals(),
            Shape::Polygon(p) => p.normals(),
        }
    }

    /// World-space bounding box under `transform`.
    pub fn aabb(&self, transform: &Transform) -> Aabb {
        match self {
            Shape::Circle(c) => {
                let extent = Vec2::splat(c.radius);
                Aabb::new(transform.position - extent, transform.position + extent)
            }
            Shape::Rectangle(r) if transform.is_axis_aligned() => {
                let extent = Vec2::new(r.half_width, r.half_height);
                Aabb::new(transform.position - extent, transform.position + extent)
            }
            Shape::Rectangle(_) | Shape::Polygon(_) => {
                Aabb::from_points(self.vertices().iter().map(|&v| transform.apply(v)))
                    .unwrap_or_else(|| Aabb::new(transform.position, transform.position))
            }
        }
    }

    /// Whether a world-space point lies inside (or on) the shape.
    pub fn contains_point(&self, transform: &Transform, point: Vec2) -> bool {
        match self {
            Shape::Circle(c) => transform.position.distance_squared(point) <= c.radius * c.radius,
            Shape::Rectangle(_) | Shape::Polygon(_) => {
                let local = transform.apply_inverse(point);
                self.vertices()
                    .iter()
                    .zip(self.normals())
                    .all(|(&v, &n)| (local - v).dot(n) <= 0.0)
            }
        }
    }
}
