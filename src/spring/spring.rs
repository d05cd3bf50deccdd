use super::{Animatable, SpringConfig, SpringOptions};

/// Position, velocity and target of a spring, plus its rest bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringState<V: Animatable> {
    value: V,
    velocity: V,
    target: V,
    /// Seconds spent continuously within the rest epsilons.
    rest_timer: f64,
    at_rest: bool,
}

impl<V: Animatable> SpringState<V> {
    /// A spring sitting at `initial`, already at rest.
    pub fn new(initial: V) -> Self {
        Self {
            value: initial,
            velocity: V::zero(),
            target: initial,
            rest_timer: 0.0,
            at_rest: true,
        }
    }

    pub fn value(&self) -> V {
        self.value
    }

    pub fn velocity(&self) -> V {
        self.velocity
    }

    pub fn target(&self) -> V {
        self.target
    }

    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// A new target wakes the spring and restarts rest detection.
    pub fn set_target(&mut self, target: V) {
        if target != self.target {
            self.target = target;
            self.wake();
        }
    }

    /// Moves the value without touching the target, keeping the velocity.
    pub fn set_value(&mut self, value: V) {
        self.value = value;
        self.wake();
    }

    /// Hands the spring a velocity, e.g. the release speed of a flick.
    pub fn set_velocity(&mut self, velocity: V) {
        self.velocity = velocity;
        self.wake();
    }

    /// Jumps to `value` and rests there.
    pub fn snap_to(&mut self, value: V) {
        *self = Self::new(value);
    }

    fn wake(&mut self) {
        self.at_rest = false;
        self.rest_timer = 0.0;
    }

    fn within_rest_epsilons(&self, options: &SpringOptions) -> bool {
        (0..V::DIMENSIONS).all(|axis| {
            (self.target.get(axis) - self.value.get(axis)).abs() < options.position_epsilon
                && self.velocity.get(axis).abs() < options.velocity_epsilon
        })
    }
}

/// Advances `state` by `dt` seconds with semi-implicit Euler:
///
/// ```text
/// acceleration = (tension * (target - value) - friction * velocity) / mass
/// velocity += acceleration * h
/// value    += velocity * h
/// ```
///
/// `dt` is split into sub-steps no longer than `options.max_step`; past
/// `options.max_sub_steps` the rest of `dt` is dropped. Once the spring has
/// stayed within the rest epsilons for `options.rest_duration` it snaps to
/// the target and stops. Resting springs and non-positive `dt` are no-ops.
pub fn advance<V: Animatable>(state: &mut SpringState<V>, config: &SpringConfig, options: &SpringOptions, dt: f64) {
    if state.at_rest {
        return;
    }
    let plan = options.sub_step_policy().plan(dt);
    if plan.count == 0 {
        return;
    }

    let (tension, friction, inverse_mass) = (config.tension(), config.friction(), 1.0 / config.mass());
    for axis in 0..V::DIMENSIONS {
        let target = state.target.get(axis);
        let mut value = state.value.get(axis);
        let mut velocity = state.velocity.get(axis);
        for _ in 0..plan.count {
            let acceleration = (tension * (target - value) - friction * velocity) * inverse_mass;
            velocity += acceleration * plan.step;
            value += velocity * plan.step;
        }
        state.value.set(axis, value);
        state.velocity.set(axis, velocity);
    }

    if plan.discarded > 0.0 {
        log::trace!("spring advance dropped {:.4}s over the sub-step cap", plan.discarded);
    }

    if state.within_rest_epsilons(options) {
        state.rest_timer += f64::from(plan.count) * plan.step;
        if state.rest_timer + crate::integration::TIME_EPSILON >= options.rest_duration {
            state.value = state.target;
            state.velocity = V::zero();
            state.at_rest = true;
        }
    } else {
        state.rest_timer = 0.0;
    }
}

/// A value animated toward a target by a damped spring.
///
/// ```
/// use ui_physics::{Spring, SpringConfig};
///
/// let mut opacity = Spring::new(SpringConfig::DEFAULT, 0.0);
/// opacity.set_target(1.0);
/// while !opacity.is_at_rest() {
///     opacity.advance(1.0 / 60.0);
/// }
/// assert_eq!(opacity.value(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring<V: Animatable> {
    config: SpringConfig,
    options: SpringOptions,
    state: SpringState<V>,
}

impl<V: Animatable> Spring<V> {
    pub fn new(config: SpringConfig, initial: V) -> Self {
        Self {
            config,
            options: SpringOptions::default(),
            state: SpringState::new(initial),
        }
    }

    /// Replaces the default rest thresholds and sub-step limits.
    pub fn with_options(mut self, options: SpringOptions) -> Result<Self, crate::ConfigError> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    /// Swaps the spring parameters mid-flight, keeping value and velocity.
    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }

    pub fn options(&self) -> &SpringOptions {
        &self.options
    }

    pub fn state(&self) -> &SpringState<V> {
        &self.state
    }

    pub fn set_target(&mut self, target: V) {
        self.state.set_target(target);
    }

    /// Advances by `dt` seconds and returns the new value.
    pub fn advance(&mut self, dt: f64) -> V {
        advance(&mut self.state, &self.config, &self.options, dt);
        self.state.value
    }

    pub fn is_at_rest(&self) -> bool {
        self.state.at_rest
    }

    pub fn value(&self) -> V {
        self.state.value
    }

    pub fn velocity(&self) -> V {
        self.state.velocity
    }

    pub fn target(&self) -> V {
        self.state.target
    }

    pub fn set_value(&mut self, value: V) {
        self.state.set_value(value);
    }

    pub fn set_velocity(&mut self, velocity: V) {
        self.state.set_velocity(velocity);
    }

    pub fn snap_to(&mut self, value: V) {
        self.state.snap_to(value);
    }
}
