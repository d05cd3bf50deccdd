//! Semi-implicit Euler, split in two halves so contacts can be solved
//! between them: velocities from forces first, positions from the solved
//! velocities after.

use crate::math::{wrap_angle, Vec2};
use crate::objects::Body;

/// What an integration pass did to a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationOutcome {
    /// Static or sleeping: nothing moved.
    Skipped,
    Integrated,
    /// The pass produced NaN or infinity; the body was put back where it was
    /// and stopped.
    Reset,
}

fn stop(body: &mut Body) {
    body.velocity = Vec2::ZERO;
    body.angular_velocity = 0.0;
}

/// Applies gravity, the accumulated force and damping to the body's
/// velocity, then clears the force.
pub fn integrate_velocity(body: &mut Body, gravity: Vec2, dt: f64) -> IntegrationOutcome {
    if !body.is_active() {
        body.clear_force();
        return IntegrationOutcome::Skipped;
    }

    let acceleration = gravity * body.gravity_scale + body.force * body.inverse_mass;
    body.velocity += acceleration * dt;
    // Implicit damping: stays stable for any damping coefficient and step size.
    body.velocity *= 1.0 / (1.0 + dt * body.linear_damping);
    body.angular_velocity *= 1.0 / (1.0 + dt * body.angular_damping);
    body.clear_force();

    if body.velocity.is_finite() && body.angular_velocity.is_finite() {
        IntegrationOutcome::Integrated
    } else {
        stop(body);
        IntegrationOutcome::Reset
    }
}

/// Moves the body along its current velocity.
pub fn integrate_position(body: &mut Body, dt: f64) -> IntegrationOutcome {
    if !body.is_active() {
        return IntegrationOutcome::Skipped;
    }

    let previous_position = body.position;
    let previous_rotation = body.rotation;
    body.position += body.velocity * dt;
    body.rotation = wrap_angle(body.rotation + body.angular_velocity * dt);

    if body.position.is_finite() && body.rotation.is_finite() {
        return IntegrationOutcome::Integrated;
    }

    body.position = previous_position;
    body.rotation = previous_rotation;
    stop(body);
    IntegrationOutcome::Reset
}
