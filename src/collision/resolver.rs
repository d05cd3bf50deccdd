//! Impulse-based contact response.
//!
//! Contacts are solved with sequential impulses: each [`ContactConstraint`]
//! keeps the normal and friction impulse it has applied so far, and every
//! iteration adjusts that running total, clamping it rather than the single
//! correction. Totals carried over from the previous sub-step seed the next
//! one (warm starting), which is what lets resting stacks settle to zero
//! velocity.
//!
//! Static and sleeping bodies are resolved with an inverse mass of zero, so
//! they never receive velocity or position changes. Waking a sleeping partner
//! is the engine's job and happens before constraints are built.

use crate::collision::Contact;
use crate::math::Vec2;
use crate::objects::Body;

/// Cached impulses only seed a contact whose normal still points this way.
const WARM_START_ALIGNMENT: f64 = 0.99;

#[inline]
fn solver_inverse_mass(body: &Body) -> f64 {
    if body.is_active() {
        body.inverse_mass
    } else {
        0.0
    }
}

/// Impulses a contact ended a sub-step with, kept for warm starting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedImpulse {
    pub normal: Vec2,
    pub normal_impulse: f64,
    pub tangent_impulse: f64,
}

/// One non-sensor contact prepared for the velocity solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactConstraint {
    normal: Vec2,
    tangent: Vec2,
    inv_mass_a: f64,
    inv_mass_b: f64,
    effective_mass: f64,
    friction: f64,
    /// Separating speed restitution asks for along the normal.
    velocity_bias: f64,
    normal_impulse: f64,
    tangent_impulse: f64,
}

impl ContactConstraint {
    /// Prepares `contact` for solving. Restitution only applies when the
    /// bodies approach faster than `restitution_threshold`, so resting
    /// contacts do not bounce on gravity alone. Returns `None` when neither
    /// body can move.
    pub fn new(body_a: &Body, body_b: &Body, contact: &Contact, restitution_threshold: f64) -> Option<Self> {
        let inv_mass_a = solver_inverse_mass(body_a);
        let inv_mass_b = solver_inverse_mass(body_b);
        let inv_mass_sum = inv_mass_a + inv_mass_b;
        if inv_mass_sum == 0.0 {
            return None;
        }

        let relative_velocity = body_b.effective_velocity() - body_a.effective_velocity();
        let approach = relative_velocity.dot(contact.normal);
        let restitution = body_a.material.combined_restitution(&body_b.material);
        let velocity_bias = if approach < -restitution_threshold {
            -restitution * approach
        } else {
            0.0
        };

        Some(Self {
            normal: contact.normal,
            tangent: contact.normal.perp(),
            inv_mass_a,
            inv_mass_b,
            effective_mass: 1.0 / inv_mass_sum,
            friction: body_a.material.combined_friction(&body_b.material),
            velocity_bias,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
        })
    }

    /// Seeds the running totals from the previous sub-step when the contact
    /// normal has not turned. Call [`ContactConstraint::apply_warm_start`]
    /// once every constraint is seeded.
    pub fn warm_start(&mut self, cached: &CachedImpulse) {
        if self.normal.dot(cached.normal) >= WARM_START_ALIGNMENT {
            self.normal_impulse = cached.normal_impulse;
            self.tangent_impulse = cached.tangent_impulse;
        }
    }

    pub fn apply_warm_start(&self, body_a: &mut Body, body_b: &mut Body) {
        let impulse = self.normal * self.normal_impulse + self.tangent * self.tangent_impulse;
        self.apply(body_a, body_b, impulse);
    }

    /// One solver iteration: the normal impulse (kept non-negative) and then
    /// Coulomb friction bounded by `friction * normal_impulse`.
    pub fn solve(&mut self, body_a: &mut Body, body_b: &mut Body) {
        let relative_velocity = body_b.effective_velocity() - body_a.effective_velocity();
        let lambda = -self.effective_mass * (relative_velocity.dot(self.normal) - self.velocity_bias);
        let total = (self.normal_impulse + lambda).max(0.0);
        let applied = total - self.normal_impulse;
        self.normal_impulse = total;
        self.apply(body_a, body_b, self.normal * applied);

        let relative_velocity = body_b.effective_velocity() - body_a.effective_velocity();
        let max_friction = self.friction * self.normal_impulse;
        let total = (self.tangent_impulse - self.effective_mass * relative_velocity.dot(self.tangent))
            .clamp(-max_friction, max_friction);
        let applied = total - self.tangent_impulse;
        self.tangent_impulse = total;
        self.apply(body_a, body_b, self.tangent * applied);
    }

    pub fn normal_impulse(&self) -> f64 {
        self.normal_impulse
    }

    pub fn tangent_impulse(&self) -> f64 {
        self.tangent_impulse
    }

    pub fn cached(&self) -> CachedImpulse {
        CachedImpulse {
            normal: self.normal,
            normal_impulse: self.normal_impulse,
            tangent_impulse: self.tangent_impulse,
        }
    }

    fn apply(&self, body_a: &mut Body, body_b: &mut Body, impulse: Vec2) {
        body_a.velocity -= impulse * self.inv_mass_a;
        body_b.velocity += impulse * self.inv_mass_b;
    }
}

/// Pushes the bodies apart by `percent` of the penetration beyond `slop`,
/// split by inverse mass.
pub fn correct_positions(body_a: &mut Body, body_b: &mut Body, contact: &Contact, percent: f64, slop: f64) {
    let inv_mass_a = solver_inverse_mass(body_a);
    let inv_mass_b = solver_inverse_mass(body_b);
    let inv_mass_sum = inv_mass_a + inv_mass_b;
    let excess = (contact.depth - slop).max(0.0);
    if inv_mass_sum == 0.0 || excess <= 0.0 {
        return;
    }

    let correction = contact.normal * (excess / inv_mass_sum * percent);
    body_a.position -= correction * inv_mass_a;
    body_b.position += correction * inv_mass_b;
}
