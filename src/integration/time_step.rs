//! Frame-time to fixed-step conversion shared by the engine and springs.
//!
//! Both follow the same rule under frame drops: never step longer than the
//! configured step, never run more than the configured number of steps per
//! call, and throw away whatever time is left over beyond that.

/// Slack for float accumulation: thirty 1/60 s frames sum to slightly less than 0.5.
pub const TIME_EPSILON: f64 = 1e-9;

/// How a single `dt` is split by [`SubStepPolicy::plan`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubStepPlan {
    pub count: u32,
    /// Length of each sub-step; `count * step + discarded == dt`.
    pub step: f64,
    pub discarded: f64,
}

/// Splits an arbitrary `dt` into equal sub-steps no longer than `max_step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubStepPolicy {
    pub max_step: f64,
    pub max_sub_steps: u32,
}

impl SubStepPolicy {
    pub fn plan(&self, dt: f64) -> SubStepPlan {
        if !(dt.is_finite() && dt > 0.0) || self.max_sub_steps == 0 {
            return SubStepPlan {
                count: 0,
                step: 0.0,
                discarded: if dt.is_finite() { dt.max(0.0) } else { 0.0 },
            };
        }

        let needed = (dt / self.max_step - TIME_EPSILON).ceil().max(1.0);
        if needed <= f64::from(self.max_sub_steps) {
            let count = needed as u32;
            SubStepPlan {
                count,
                step: dt / f64::from(count),
                discarded: 0.0,
            }
        } else {
            let count = self.max_sub_steps;
            SubStepPlan {
                count,
                step: self.max_step,
                discarded: dt - self.max_step * f64::from(count),
            }
        }
    }
}

/// Result of feeding one frame into a [`FixedStepAccumulator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepBudget {
    /// Fixed steps to run now.
    pub steps: u32,
    /// Backlog thrown away because the sub-step cap was reached.
    pub discarded: f64,
}

/// Accumulates variable frame time and pays it out in whole fixed steps.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStepAccumulator {
    step: f64,
    max_sub_steps: u32,
    accumulator: f64,
}

impl FixedStepAccumulator {
    pub fn new(step: f64, max_sub_steps: u32) -> Self {
        Self {
            step,
            max_sub_steps,
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Time carried over to the next frame, always below one step.
    pub fn remainder(&self) -> f64 {
        self.accumulator
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Adds `dt` and returns how many fixed steps are due. If the cap is reached
    /// with at least one whole step still pending, the entire backlog is dropped.
    /// Non-finite or negative `dt` adds nothing.
    pub fn advance(&mut self, dt: f64) -> StepBudget {
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }

        let mut steps = 0;
        while steps < self.max_sub_steps && self.accumulator + TIME_EPSILON >= self.step {
            self.accumulator = (self.accumulator - self.step).max(0.0);
            steps += 1;
        }

        let discarded = if self.accumulator + TIME_EPSILON >= self.step {
            std::mem::take(&mut self.accumulator)
        } else {
            0.0
        };
        StepBudget { steps, discarded }
    }
}
