//! Spring parameters and integration options.

use crate::error::ConfigError;
use crate::integration::SubStepPolicy;

/// Physical parameters of a damped spring.
///
/// Fields are private so every value in circulation has passed validation:
/// build one with [`SpringConfig::new`] or start from a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    tension: f64,
    friction: f64,
    mass: f64,
}

impl SpringConfig {
    /// Balanced: fast with a barely visible overshoot.
    pub const DEFAULT: Self = Self::preset(170.0, 26.0);
    /// Soft and slightly floaty.
    pub const GENTLE: Self = Self::preset(120.0, 14.0);
    /// Visible oscillation around the target.
    pub const WOBBLY: Self = Self::preset(180.0, 12.0);
    pub const STIFF: Self = Self::preset(210.0, 20.0);
    /// Overdamped, eases in without overshoot.
    pub const SLOW: Self = Self::preset(280.0, 60.0);
    /// Heavily overdamped.
    pub const MOLASSES: Self = Self::preset(280.0, 120.0);
    pub const SNAPPY: Self = Self::preset(300.0, 30.0);
    pub const BOUNCY: Self = Self::preset(200.0, 10.0);

    const fn preset(tension: f64, friction: f64) -> Self {
        Self {
            tension,
            friction,
            mass: 1.0,
        }
    }

    /// Tension and mass must be positive, friction non-negative, all finite.
    pub fn new(tension: f64, friction: f64, mass: f64) -> Result<Self, ConfigError> {
        ConfigError::check_positive("tension", tension)?;
        ConfigError::check_non_negative("friction", friction)?;
        ConfigError::check_positive("mass", mass)?;
        Ok(Self {
            tension,
            friction,
            mass,
        })
    }

    pub fn tension(&self) -> f64 {
        self.tension
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// `friction / (2 * sqrt(tension * mass))`: below 1 overshoots, 1 is
    /// critically damped, above 1 creeps in.
    pub fn damping_ratio(&self) -> f64 {
        self.friction / (2.0 * (self.tension * self.mass).sqrt())
    }

    /// Undamped angular frequency in radians per second.
    pub fn natural_frequency(&self) -> f64 {
        (self.tension / self.mass).sqrt()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Rest detection thresholds and sub-stepping limits shared by all axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringOptions {
    /// Max distance from the target that still counts as resting. Default: 0.01.
    pub position_epsilon: f64,
    /// Max speed that still counts as resting. Default: 0.5 units/s.
    pub velocity_epsilon: f64,
    /// Seconds the spring must stay within both epsilons before it rests. Default: 1/20.
    pub rest_duration: f64,
    /// Longest integration sub-step. Default: 1/120 s.
    pub max_step: f64,
    /// Sub-steps per `advance` before the remaining time is dropped. Default: 8.
    pub max_sub_steps: u32,
}

impl Default for SpringOptions {
    fn default() -> Self {
        Self {
            position_epsilon: 0.01,
            velocity_epsilon: 0.5,
            rest_duration: 1.0 / 20.0,
            max_step: 1.0 / 120.0,
            max_sub_steps: 8,
        }
    }
}

impl SpringOptions {
    pub fn with_position_epsilon(mut self, epsilon: f64) -> Self {
        self.position_epsilon = epsilon;
        self
    }

    pub fn with_velocity_epsilon(mut self, epsilon: f64) -> Self {
        self.velocity_epsilon = epsilon;
        self
    }

    pub fn with_rest_duration(mut self, seconds: f64) -> Self {
        self.rest_duration = seconds;
        self
    }

    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step;
        self
    }

    pub fn with_max_sub_steps(mut self, max_sub_steps: u32) -> Self {
        self.max_sub_steps = max_sub_steps;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("position_epsilon", self.position_epsilon)?;
        ConfigError::check_positive("velocity_epsilon", self.velocity_epsilon)?;
        ConfigError::check_non_negative("rest_duration", self.rest_duration)?;
        ConfigError::check_positive("max_step", self.max_step)?;
        if self.max_sub_steps == 0 {
            return Err(ConfigError::ZeroCount { field: "max_sub_steps" });
        }
        Ok(())
    }

    pub(crate) fn sub_step_policy(&self) -> SubStepPolicy {
        SubStepPolicy {
            max_step: self.max_step,
            max_sub_steps: self.max_sub_steps,
        }
    }
}
