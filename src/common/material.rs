//! Surface properties used by the collision resolver.

use crate::error::ConfigError;

/// How a body responds on contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Coefficient of restitution in [0, 1]. 0 = no bounce, 1 = perfectly elastic.
    pub restitution: f64,
    /// Coulomb friction coefficient, >= 0.
    pub friction: f64,
}

impl Material {
    /// Creates a material, clamping both values into their valid ranges.
    pub fn new(restitution: f64, friction: f64) -> Self {
        Material {
            restitution: restitution.clamp(0.0, 1.0),
            friction: friction.max(0.0),
        }
    }

    /// Perfectly elastic and frictionless.
    pub const ELASTIC: Material = Material { restitution: 1.0, friction: 0.0 };

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_range("restitution", self.restitution, 0.0, 1.0)?;
        ConfigError::check_non_negative("friction", self.friction)
    }

    /// Restitution used for a pair: the less bouncy of the two.
    pub fn combined_restitution(&self, other: &Material) -> f64 {
        self.restitution.min(other.restitution)
    }

    /// Friction used for a pair: geometric mean of the two.
    pub fn combined_friction(&self, other: &Material) -> f64 {
        (self.friction * other.friction).sqrt()
    }
}

impl Default for Material {
    /// Slight bounce, moderate friction.
    fn default() -> Self {
        Material {
            restitution: 0.2,
            friction: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_new_clamps() {
        let m = Material::new(1.5, -2.0);
        assert_eq!(m.restitution, 1.0);
        assert_eq!(m.friction, 0.0);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_material_validate_rejects_raw_fields() {
        let m = Material { restitution: 2.0, friction: 0.1 };
        assert!(m.validate().is_err());
        let m = Material { restitution: 0.5, friction: f64::NAN };
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_material_combination() {
        let a = Material::new(0.8, 0.4);
        let b = Material::new(0.3, 0.9);
        assert_eq!(a.combined_restitution(&b), 0.3);
        assert!((a.combined_friction(&b) - 0.6).abs() < 1e-12);
    }
}
