pub mod integrator;
pub mod time_step;

pub use integrator::{integrate_position, integrate_velocity, IntegrationOutcome};
pub use time_step::{FixedStepAccumulator, StepBudget, SubStepPlan, SubStepPolicy, TIME_EPSILON};
