//! Narrow phase: exact overlap tests between pairs of shapes.
//!
//! Every test returns a [`ContactGeometry`] whose normal points from the
//! first shape to the second. Rectangles and polygons share one separating
//! axis implementation; when several axes report the same minimal overlap
//! the first one tested wins, and shape A's edge normals are always tested
//! before shape B's, so results are reproducible run to run.

use crate::math::{Transform, Vec2};
use crate::shapes::Shape;

use super::manifold::ContactGeometry;

/// Below this distance two circle centres are treated as coincident.
const COINCIDENT_EPSILON: f64 = 1e-10;

/// Dispatches on the shape pair.
pub fn collide(
    shape_a: &Shape,
    transform_a: &Transform,
    shape_b: &Shape,
    transform_b: &Transform,
) -> Option<ContactGeometry> {
    match (shape_a, shape_b) {
        (Shape::Circle(a), Shape::Circle(b)) => {
            circle_circle(transform_a.position, a.radius, transform_b.position, b.radius)
        }
        (Shape::Circle(a), Shape::Rectangle(_) | Shape::Polygon(_)) => circle_polygon(
            transform_a.position,
            a.radius,
            shape_b.vertices(),
            shape_b.normals(),
            transform_b,
        ),
        (Shape::Rectangle(_) | Shape::Polygon(_), Shape::Circle(b)) => circle_polygon(
            transform_b.position,
            b.radius,
            shape_a.vertices(),
            shape_a.normals(),
            transform_a,
        )
        .map(ContactGeometry::flipped),
        (Shape::Rectangle(_) | Shape::Polygon(_), Shape::Rectangle(_) | Shape::Polygon(_)) => {
            polygon_polygon(
                shape_a.vertices(),
                shape_a.normals(),
                transform_a,
                shape_b.vertices(),
                shape_b.normals(),
                transform_b,
            )
        }
    }
}

/// Distance test between two circles.
pub fn circle_circle(
    center_a: Vec2,
    radius_a: f64,
    center_b: Vec2,
    radius_b: f64,
) -> Option<ContactGeometry> {
    let offset = center_b - center_a;
    let dist_sq = offset.length_squared();
    let radii = radius_a + radius_b;
    if dist_sq >= radii * radii {
        return None;
    }

    let distance = dist_sq.sqrt();
    let normal = if distance > COINCIDENT_EPSILON {
        offset / distance
    } else {
        // Concentric: any direction separates them, pick +Y.
        Vec2::Y
    };

    Some(ContactGeometry {
        normal,
        depth: radii - distance,
        point: center_a + normal * radius_a,
    })
}

/// Projection interval of a polygon's world vertices on `axis`.
fn project_polygon(vertices: &[Vec2], transform: &Transform, axis: Vec2) -> (f64, f64) {
    vertices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
        let p = transform.apply(v).dot(axis);
        (min.min(p), max.max(p))
    })
}

/// World vertex of a polygon furthest along `direction`.
fn support_point(vertices: &[Vec2], transform: &Transform, direction: Vec2) -> Vec2 {
    let mut best = transform.apply(vertices[0]);
    let mut best_dot = best.dot(direction);
    for &v in &vertices[1..] {
        let world = transform.apply(v);
        let d = world.dot(direction);
        if d > best_dot {
            best = world;
            best_dot = d;
        }
    }
    best
}

/// Overlap of interval A with interval B along an axis, plus the sign that
/// makes the normal point from A to B. `None` means the axis separates them.
#[inline]
fn interval_overlap(a: (f64, f64), b: (f64, f64)) -> Option<(f64, f64)> {
    let b_ahead = a.1 - b.0;
    let b_behind = b.1 - a.0;
    if b_ahead <= 0.0 || b_behind <= 0.0 {
        return None;
    }
    if b_ahead <= b_behind {
        Some((b_ahead, 1.0))
    } else {
        Some((b_behind, -1.0))
    }
}

/// Separating axis test between a circle (A) and a convex polygon (B).
pub fn circle_polygon(
    center: Vec2,
    radius: f64,
    vertices: &[Vec2],
    normals: &[Vec2],
    transform: &Transform,
) -> Option<ContactGeometry> {
    let circle_interval = |axis: Vec2| {
        let c = center.dot(axis);
        (c - radius, c + radius)
    };

    let mut best_depth = f64::INFINITY;
    let mut best_normal = Vec2::ZERO;

    for &local_normal in normals {
        let axis = transform.rotate(local_normal);
        let (depth, sign) = interval_overlap(
            circle_interval(axis),
            project_polygon(vertices, transform, axis),
        )?;
        if depth < best_depth {
            best_depth = depth;
            best_normal = axis * sign;
        }
    }

    // Vertex region: the axis through the closest vertex catches corner hits.
    let closest_vertex = vertices
        .iter()
        .map(|&v| transform.apply(v))
        .min_by(|p, q| p.distance_squared(center).total_cmp(&q.distance_squared(center)))?;
    let axis = (closest_vertex - center).normalize_or_zero();
    if axis != Vec2::ZERO {
        let (depth, sign) = interval_overlap(
            circle_interval(axis),
            project_polygon(vertices, transform, axis),
        )?;
        if depth < best_depth {
            best_depth = depth;
            best_normal = axis * sign;
        }
    }

    if !best_depth.is_finite() {
        return None;
    }
    Some(ContactGeometry {
        normal: best_normal,
        depth: best_depth,
        point: center + best_normal * radius,
    })
}

/// Separating axis test over every edge normal of two convex polygons.
pub fn polygon_polygon(
    vertices_a: &[Vec2],
    normals_a: &[Vec2],
    transform_a: &Transform,
    vertices_b: &[Vec2],
    normals_b: &[Vec2],
    transform_b: &Transform,
) -> Option<ContactGeometry> {
    if vertices_a.is_empty() || vertices_b.is_empty() {
        return None;
    }

    let mut best_depth = f64::INFINITY;
    let mut best_normal = Vec2::ZERO;
    let mut reference_is_a = true;

    let axes_a = normals_a.iter().map(|&n| (transform_a.rotate(n), true));
    let axes_b = normals_b.iter().map(|&n| (transform_b.rotate(n), false));
    for (axis, from_a) in axes_a.chain(axes_b) {
        let (depth, sign) = interval_overlap(
            project_polygon(vertices_a, transform_a, axis),
            project_polygon(vertices_b, transform_b, axis),
        )?;
        if depth < best_depth {
            best_depth = depth;
            best_normal = axis * sign;
            reference_is_a = from_a;
        }
    }

    // The deepest vertex of the incident polygon.
    let point = if reference_is_a {
        support_point(vertices_b, transform_b, -best_normal)
    } else {
        support_point(vertices_a, transform_a, best_normal)
    };

    Some(ContactGeometry {
        normal: best_normal,
        depth: best_depth,
        point,
    })
}
