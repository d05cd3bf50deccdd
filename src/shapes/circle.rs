use crate::error::ShapeError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    pub fn new(radius: f64) -> Result<Self, ShapeError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ShapeError::InvalidDimension(radius));
        }
        Ok(Self { radius })
    }

    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_new() {
        let c = Circle::new(5.0).unwrap();
        assert_eq!(c.radius, 5.0);
        assert!((c.area() - 25.0 * std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_circle_rejects_bad_radius() {
        assert_eq!(Circle::new(-1.0), Err(ShapeError::InvalidDimension(-1.0)));
        assert!(Circle::new(0.0).is_err());
        assert!(Circle::new(f64::NAN).is_err());
    }
}
