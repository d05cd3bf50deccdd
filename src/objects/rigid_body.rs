use crate::collision::Aabb;
use crate::common::{CollisionFilter, Material};
use crate::error::ConfigError;
use crate::math::{Transform, Vec2};
use crate::shapes::Shape;

use super::arena::BodyId;

/// Whether a body is simulated or immovable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Integrated, pushed by contacts, can sleep.
    Dynamic,
    /// Infinite mass: never moves, never sleeps, never receives impulses.
    Static,
}

/// Description of a body to add to an [`Engine`](crate::Engine).
///
/// ```
/// use ui_physics::{BodySpec, Shape, Vec2};
///
/// let card = BodySpec::dynamic(Shape::rectangle(40.0, 60.0).unwrap())
///     .with_position(Vec2::new(100.0, 200.0))
///     .with_mass(2.0)
///     .with_linear_damping(4.0);
/// assert_eq!(card.mass, 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub kind: BodyKind,
    pub shape: Shape,
    pub position: Vec2,
    pub rotation: f64,
    pub velocity: Vec2,
    pub angular_velocity: f64,
    /// Ignored for static bodies.
    pub mass: f64,
    pub material: Material,
    pub filter: CollisionFilter,
    /// Fraction of linear velocity removed per second (0 = none).
    pub linear_damping: f64,
    pub angular_damping: f64,
    /// Multiplier on the engine gravity.
    pub gravity_scale: f64,
    pub can_sleep: bool,
    /// Sensors report contacts but are never pushed and never push.
    pub sensor: bool,
    /// Start asleep (for example, a settled item restored from a saved layout).
    pub start_asleep: bool,
    pub user_data: u64,
}

impl BodySpec {
    /// A dynamic body of mass 1 at the origin.
    pub fn dynamic(shape: Shape) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            shape,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: 1.0,
            material: Material::default(),
            filter: CollisionFilter::DEFAULT,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: 1.0,
            can_sleep: true,
            sensor: false,
            start_asleep: false,
            user_data: 0,
        }
    }

    /// An immovable body (walls, scroll bounds, drop zones).
    pub fn new_static(shape: Shape) -> Self {
        Self {
            kind: BodyKind::Static,
            mass: 0.0,
            ..Self::dynamic(shape)
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: f64) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Sets mass from a uniform density over the shape's area.
    pub fn with_density(mut self, density: f64) -> Self {
        self.mass = density * self.shape.area();
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.material.restitution = restitution;
        self
    }

    pub fn with_friction(mut self, friction: f64) -> Self {
        self.material.friction = friction;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_linear_damping(mut self, damping: f64) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn with_angular_damping(mut self, damping: f64) -> Self {
        self.angular_damping = damping;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f64) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_start_asleep(mut self, asleep: bool) -> Self {
        self.start_asleep = asleep;
        self
    }

    pub fn with_user_data(mut self, user_data: u64) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kind == BodyKind::Dynamic {
            ConfigError::check_positive("mass", self.mass)?;
        }
        if !self.position.is_finite() {
            return Err(ConfigError::NonFinite { field: "position" });
        }
        if !self.velocity.is_finite() {
            return Err(ConfigError::NonFinite { field: "velocity" });
        }
        if !(self.rotation.is_finite() && self.angular_velocity.is_finite()) {
            return Err(ConfigError::NonFinite { field: "rotation" });
        }
        if !self.gravity_scale.is_finite() {
            return Err(ConfigError::NonFinite { field: "gravity_scale" });
        }
        ConfigError::check_non_negative("linear_damping", self.linear_damping)?;
        ConfigError::check_non_negative("angular_damping", self.angular_damping)?;
        self.material.validate()
    }
}

/// Read-only snapshot of a body's motion, copied out for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub rotation: f64,
    pub velocity: Vec2,
    pub angular_velocity: f64,
    pub sleeping: bool,
}

/// A simulated body. Owned by the engine's arena; callers see it through
/// [`Engine::body`](crate::Engine::body).
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub(crate) id: BodyId,
    pub kind: BodyKind,
    pub shape: Shape,
    pub position: Vec2,
    pub rotation: f64,
    pub velocity: Vec2,
    pub angular_velocity: f64,
    /// Force accumulated since the last sub-step, cleared by integration.
    pub force: Vec2,
    pub mass: f64,
    /// 0 for static bodies.
    pub inverse_mass: f64,
    pub material: Material,
    pub filter: CollisionFilter,
    pub linear_damping: f64,
    pub angular_damping: f64,
    pub gravity_scale: f64,
    pub can_sleep: bool,
    pub sensor: bool,
    pub sleeping: bool,
    /// Seconds spent continuously below the sleep thresholds.
    pub sleep_timer: f64,
    pub user_data: u64,
}

impl Body {
    /// Builds a body from an already validated spec.
    pub(crate) fn from_spec(id: BodyId, spec: BodySpec) -> Self {
        let is_static = spec.kind == BodyKind::Static;
        let (mass, inverse_mass) = if is_static { (0.0, 0.0) } else { (spec.mass, 1.0 / spec.mass) };
        let sleeping = !is_static && spec.start_asleep;
        Self {
            id,
            kind: spec.kind,
            shape: spec.shape,
            position: spec.position,
            rotation: spec.rotation,
            velocity: if is_static || sleeping { Vec2::ZERO } else { spec.velocity },
            angular_velocity: if is_static || sleeping { 0.0 } else { spec.angular_velocity },
            force: Vec2::ZERO,
            mass,
            inverse_mass,
            material: spec.material,
            filter: spec.filter,
            linear_damping: spec.linear_damping,
            angular_damping: spec.angular_damping,
            gravity_scale: spec.gravity_scale,
            can_sleep: spec.can_sleep && !is_static,
            sensor: spec.sensor,
            sleeping,
            sleep_timer: 0.0,
            user_data: spec.user_data,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn is_static(&self) -> bool {
        self.inverse_mass == 0.0
    }

    pub fn is_dynamic(&self) -> bool {
        !self.is_static()
    }

    /// Dynamic and not sleeping: the bodies the integrator touches.
    pub fn is_active(&self) -> bool {
        self.is_dynamic() && !self.sleeping
    }

    pub fn restitution(&self) -> f64 {
        self.material.restitution
    }

    pub fn friction(&self) -> f64 {
        self.material.friction
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }

    pub fn aabb(&self) -> Aabb {
        self.shape.aabb(&self.transform())
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.shape.contains_point(&self.transform(), point)
    }

    /// Velocity as seen by the integrator and resolver: exactly zero while asleep.
    pub fn effective_velocity(&self) -> Vec2 {
        if self.sleeping {
            Vec2::ZERO
        } else {
            self.velocity
        }
    }

    pub fn state(&self) -> BodyState {
        BodyState {
            position: self.position,
            rotation: self.rotation,
            velocity: self.effective_velocity(),
            angular_velocity: if self.sleeping { 0.0 } else { self.angular_velocity },
            sleeping: self.sleeping,
        }
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.effective_velocity().length_squared()
    }

    /// Returns false, leaving the body untouched, if the accumulated force
    /// would overflow.
    pub(crate) fn apply_force(&mut self, force: Vec2) -> bool {
        let total = self.force + force;
        if !total.is_finite() {
            return false;
        }
        if self.is_dynamic() {
            self.force = total;
        }
        true
    }

    /// Returns false, leaving the body untouched, if the new velocity would
    /// overflow.
    pub(crate) fn apply_impulse(&mut self, impulse: Vec2) -> bool {
        let velocity = self.velocity + impulse * self.inverse_mass;
        if !velocity.is_finite() {
            return false;
        }
        self.velocity = velocity;
        true
    }

    pub(crate) fn clear_force(&mut self) {
        self.force = Vec2::ZERO;
    }

    /// Returns true if the body was asleep.
    pub(crate) fn wake(&mut self) -> bool {
        self.sleep_timer = 0.0;
        std::mem::replace(&mut self.sleeping, false)
    }

    /// Returns true if the body was awake. Static bodies never sleep.
    pub(crate) fn fall_asleep(&mut self) -> bool {
        if self.is_static() || self.sleeping {
            return false;
        }
        self.sleeping = true;
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self.force = Vec2::ZERO;
        true
    }
}
