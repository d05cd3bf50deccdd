//! Magnetic snapping of a dragged value to nearby anchor points.

use crate::error::ConfigError;
use crate::math::Vec2;
use crate::spring::{Spring, SpringConfig};

/// Pulls a 2D position toward the nearest anchor within `radius`, animated by
/// a spring. Outside every anchor's radius the spring just follows the input.
#[derive(Debug, Clone)]
pub struct MagneticSnap {
    points: Vec<Vec2>,
    radius: f64,
    spring: Spring<Vec2>,
    active: Option<usize>,
}

impl MagneticSnap {
    pub fn new(points: Vec<Vec2>, radius: f64, config: SpringConfig, initial: Vec2) -> Result<Self, ConfigError> {
        ConfigError::check_non_negative("radius", radius)?;
        if points.iter().any(|p| !p.is_finite()) {
            return Err(ConfigError::NonFinite { field: "points" });
        }
        Ok(Self {
            points,
            radius,
            spring: Spring::new(config, initial),
            active: None,
        })
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn add_point(&mut self, point: Vec2) {
        self.points.push(point);
    }

    /// Index of the anchor currently pulling the value, if any.
    pub fn active_point(&self) -> Option<usize> {
        self.active
    }

    /// Closest anchor within the radius; ties go to the lower index.
    pub fn nearest(&self, position: Vec2) -> Option<(usize, Vec2)> {
        let radius_squared = self.radius * self.radius;
        let mut best: Option<(usize, f64)> = None;
        for (index, point) in self.points.iter().enumerate() {
            let distance = point.distance_squared(position);
            if distance <= radius_squared && best.map_or(true, |(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| (index, self.points[index]))
    }

    /// Retargets the spring for an input at `position`: the nearest anchor
    /// in range, or `position` itself.
    pub fn update(&mut self, position: Vec2) -> Option<usize> {
        let snapped = self.nearest(position);
        self.active = snapped.map(|(index, _)| index);
        self.spring.set_target(snapped.map_or(position, |(_, point)| point));
        self.active
    }

    /// Hands over a released drag: the spring starts at `position` with
    /// `velocity` and settles on the anchor nearest to where it was let go.
    pub fn release(&mut self, position: Vec2, velocity: Vec2) -> Option<usize> {
        self.spring.set_value(position);
        self.spring.set_velocity(velocity);
        self.update(position)
    }

    pub fn advance(&mut self, dt: f64) -> Vec2 {
        self.spring.advance(dt)
    }

    pub fn value(&self) -> Vec2 {
        self.spring.value()
    }

    pub fn is_at_rest(&self) -> bool {
        self.spring.is_at_rest()
    }

    pub fn spring(&self) -> &Spring<Vec2> {
        &self.spring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_snap() -> MagneticSnap {
        let points = vec![Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), Vec2::new(0.0, 100.0)];
        MagneticSnap::new(points, 30.0, SpringConfig::SNAPPY, Vec2::ZERO).unwrap()
    }

    #[test]
    fn test_nearest_within_radius() {
        let snap = grid_snap();
        assert_eq!(snap.nearest(Vec2::new(90.0, 10.0)), Some((1, Vec2::new(100.0, 0.0))));
        assert_eq!(snap.nearest(Vec2::new(50.0, 50.0)), None);
        // Exactly on the edge counts.
        assert_eq!(snap.nearest(Vec2::new(0.0, 70.0)).map(|(i, _)| i), Some(2));
    }

    #[test]
    fn test_ties_prefer_lower_index() {
        let snap = MagneticSnap::new(
            vec![Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0)],
            20.0,
            SpringConfig::DEFAULT,
            Vec2::ZERO,
        )
        .unwrap();
        assert_eq!(snap.nearest(Vec2::ZERO).map(|(i, _)| i), Some(0));
    }

    #[test]
    fn test_settles_on_anchor() {
        let mut snap = grid_snap();
        assert_eq!(snap.release(Vec2::new(85.0, 12.0), Vec2::new(200.0, 0.0)), Some(1));
        assert!(!snap.is_at_rest());
        for _ in 0..300 {
            snap.advance(1.0 / 60.0);
        }
        assert!(snap.is_at_rest());
        assert_eq!(snap.value(), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_follows_freely_out_of_range() {
        let mut snap = grid_snap();
        assert_eq!(snap.update(Vec2::new(50.0, 50.0)), None);
        assert_eq!(snap.active_point(), None);
        assert_eq!(snap.spring().target(), Vec2::new(50.0, 50.0));

        snap.add_point(Vec2::new(55.0, 55.0));
        assert_eq!(snap.update(Vec2::new(50.0, 50.0)), Some(3));
    }

    #[test]
    fn test_new_validates() {
        assert!(MagneticSnap::new(vec![], -1.0, SpringConfig::DEFAULT, Vec2::ZERO).is_err());
        assert!(MagneticSnap::new(vec![Vec2::new(f64::NAN, 0.0)], 1.0, SpringConfig::DEFAULT, Vec2::ZERO).is_err());
    }
}
