//! Engine configuration.

use crate::error::ConfigError;
use crate::math::Vec2;

/// Configuration for an [`Engine`](crate::Engine), validated once at construction.
///
/// # Builder Pattern
/// ```
/// use ui_physics::{EngineConfig, Vec2};
///
/// let config = EngineConfig::default()
///     .with_gravity(Vec2::new(0.0, 980.0))
///     .with_max_sub_steps(3)
///     .with_sleep_time_threshold(0.25);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Length of one simulation sub-step in seconds. Default: 1/60.
    pub fixed_time_step: f64,
    /// Upper bound on sub-steps per `step()` call. Default: 5.
    pub max_sub_steps: u32,
    /// Let resting bodies fall asleep. Default: true.
    pub enable_sleeping: bool,
    /// Linear speed (world units per second) under which a body counts as resting. Default: 0.05.
    pub velocity_sleep_threshold: f64,
    /// Angular speed (radians per second) under which a body counts as resting. Default: 0.05.
    pub angular_sleep_threshold: f64,
    /// Seconds a body must stay resting before it sleeps. Default: 0.5.
    pub sleep_time_threshold: f64,
    /// World gravity in units per second squared. Default: zero.
    pub gravity: Vec2,
    /// Impulse passes over the contact set per sub-step. Default: 8.
    pub velocity_iterations: u32,
    /// Approach speed (world units per second) above which contacts bounce
    /// with their restitution. Slower contacts settle instead. Default: 50.
    pub restitution_threshold: f64,
    /// Fraction of penetration removed per sub-step, in (0, 1]. Default: 0.4.
    pub position_correction_percent: f64,
    /// Penetration tolerated without correction. Default: 0.01.
    pub position_correction_slop: f64,
    /// Broad-phase cell edge length in world units. Default: 128.
    pub broad_phase_cell_size: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            fixed_time_step: 1.0 / 60.0,
            max_sub_steps: 5,
            enable_sleeping: true,
            velocity_sleep_threshold: 0.05,
            angular_sleep_threshold: 0.05,
            sleep_time_threshold: 0.5,
            gravity: Vec2::ZERO,
            velocity_iterations: 8,
            restitution_threshold: 50.0,
            position_correction_percent: 0.4,
            position_correction_slop: 0.01,
            broad_phase_cell_size: 128.0,
        }
    }
}

impl EngineConfig {
    pub fn with_fixed_time_step(mut self, fixed_time_step: f64) -> Self {
        self.fixed_time_step = fixed_time_step;
        self
    }

    pub fn with_max_sub_steps(mut self, max_sub_steps: u32) -> Self {
        self.max_sub_steps = max_sub_steps;
        self
    }

    pub fn with_sleeping(mut self, enable_sleeping: bool) -> Self {
        self.enable_sleeping = enable_sleeping;
        self
    }

    pub fn with_velocity_sleep_threshold(mut self, threshold: f64) -> Self {
        self.velocity_sleep_threshold = threshold;
        self
    }

    pub fn with_angular_sleep_threshold(mut self, threshold: f64) -> Self {
        self.angular_sleep_threshold = threshold;
        self
    }

    pub fn with_sleep_time_threshold(mut self, seconds: f64) -> Self {
        self.sleep_time_threshold = seconds;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_velocity_iterations(mut self, iterations: u32) -> Self {
        self.velocity_iterations = iterations;
        self
    }

    pub fn with_restitution_threshold(mut self, speed: f64) -> Self {
        self.restitution_threshold = speed;
        self
    }

    /// Sets the positional correction percent and slop together.
    pub fn with_position_correction(mut self, percent: f64, slop: f64) -> Self {
        self.position_correction_percent = percent;
        self.position_correction_slop = slop;
        self
    }

    pub fn with_broad_phase_cell_size(mut self, cell_size: f64) -> Self {
        self.broad_phase_cell_size = cell_size;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("fixed_time_step", self.fixed_time_step)?;
        if self.max_sub_steps == 0 {
            return Err(ConfigError::ZeroCount { field: "max_sub_steps" });
        }
        if self.velocity_iterations == 0 {
            return Err(ConfigError::ZeroCount { field: "velocity_iterations" });
        }
        ConfigError::check_non_negative("velocity_sleep_threshold", self.velocity_sleep_threshold)?;
        ConfigError::check_non_negative("angular_sleep_threshold", self.angular_sleep_threshold)?;
        ConfigError::check_non_negative("sleep_time_threshold", self.sleep_time_threshold)?;
        if !self.gravity.is_finite() {
            return Err(ConfigError::NonFinite { field: "gravity" });
        }
        ConfigError::check_non_negative("restitution_threshold", self.restitution_threshold)?;
        ConfigError::check_positive("position_correction_percent", self.position_correction_percent)?;
        ConfigError::check_range("position_correction_percent", self.position_correction_percent, 0.0, 1.0)?;
        ConfigError::check_non_negative("position_correction_slop", self.position_correction_slop)?;
        ConfigError::check_positive("broad_phase_cell_size", self.broad_phase_cell_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.fixed_time_step - 1.0 / 60.0).abs() < 1e-15);
        assert_eq!(config.max_sub_steps, 5);
        assert!(config.enable_sleeping);
        assert_eq!(config.gravity, Vec2::ZERO);
    }

    #[test]
    fn test_builder_chain() {
        let config = EngineConfig::default()
            .with_fixed_time_step(1.0 / 120.0)
            .with_max_sub_steps(10)
            .with_sleeping(false)
            .with_gravity(Vec2::new(0.0, 10.0))
            .with_position_correction(0.8, 0.0);
        assert_eq!(config.max_sub_steps, 10);
        assert!(!config.enable_sleeping);
        assert_eq!(config.position_correction_percent, 0.8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        let base = EngineConfig::default;
        assert_eq!(
            base().with_max_sub_steps(0).validate(),
            Err(ConfigError::ZeroCount { field: "max_sub_steps" })
        );
        assert!(base().with_fixed_time_step(0.0).validate().is_err());
        assert!(base().with_fixed_time_step(f64::NAN).validate().is_err());
        assert!(base().with_velocity_sleep_threshold(-0.1).validate().is_err());
        assert!(base().with_sleep_time_threshold(-1.0).validate().is_err());
        assert!(base().with_gravity(Vec2::new(f64::INFINITY, 0.0)).validate().is_err());
        assert!(base().with_position_correction(1.5, 0.01).validate().is_err());
        assert!(base().with_restitution_threshold(-1.0).validate().is_err());
        assert!(base().with_restitution_threshold(0.0).validate().is_ok());
        assert!(base().with_broad_phase_cell_size(0.0).validate().is_err());
        assert!(base().with_velocity_iterations(0).validate().is_err());
    }

    #[test]
    fn test_zero_correction_percent_is_rejected() {
        let config = EngineConfig::default().with_position_correction(0.0, 0.01);
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "position_correction_percent",
                value: 0.0
            })
        );
        assert!(EngineConfig::default().with_position_correction(1.0, 0.01).validate().is_ok());
    }
}
