use std::collections::{BTreeSet, HashMap};

use log::{debug, trace, warn};

use crate::collision::resolver::{self, CachedImpulse, ContactConstraint};
use crate::collision::{collide, Contact, SpatialGrid};
use crate::error::{ConfigError, EngineError};
use crate::integration::{integrate_position, integrate_velocity, FixedStepAccumulator, IntegrationOutcome};
use crate::math::Vec2;
use crate::objects::{Body, BodyArena, BodyId, BodySpec, BodyState};

use super::events::{Command, Commands, EventKind, ListenerId, Listeners, PhysicsEvent};
use super::sleep::{SleepIslands, SleepThresholds};
use super::EngineConfig;

type PairKey = (BodyId, BodyId);

/// Looks up the target of an external input, rejecting stale ids first and
/// non-finite values second.
fn body_for_input<'a>(
    bodies: &'a mut BodyArena,
    id: BodyId,
    value: Vec2,
    quantity: &'static str,
) -> Result<&'a mut Body, EngineError> {
    let body = bodies.get_mut(id).ok_or(EngineError::BodyNotFound(id))?;
    if !value.is_finite() {
        return Err(EngineError::NumericInstability { id, quantity });
    }
    Ok(body)
}

/// The simulation: owns every body, steps them at a fixed rate and reports
/// what happened through events.
///
/// ```
/// use ui_physics::{BodySpec, Engine, EngineConfig, Shape, Vec2};
///
/// let mut engine = Engine::new(EngineConfig::default().with_gravity(Vec2::new(0.0, 980.0)))?;
/// let card = engine.add_body(BodySpec::dynamic(Shape::rectangle(40.0, 60.0)?))?;
///
/// engine.step(1.0 / 60.0);
/// let state = engine.get_body_state(card).unwrap();
/// assert!(state.position.y > 0.0);
/// # Ok::<(), ui_physics::EngineError>(())
/// ```
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    sleep: SleepThresholds,
    bodies: BodyArena,
    accumulator: FixedStepAccumulator,
    grid: SpatialGrid,
    /// Broad-phase output, reused every sub-step.
    pairs: Vec<(usize, usize)>,
    /// Contacts found in the most recent sub-step.
    contacts: Vec<Contact>,
    constraints: Vec<(BodyId, BodyId, ContactConstraint)>,
    /// Impulses each contact ended the previous sub-step with, keyed in
    /// contact order.
    impulse_cache: HashMap<PairKey, CachedImpulse>,
    islands: SleepIslands,
    /// Pairs touching at the end of the previous `step`.
    touching: BTreeSet<PairKey>,
    /// Pairs seen touching in any sub-step of the current `step`.
    step_touching: BTreeSet<PairKey>,
    pending_events: Vec<PhysicsEvent>,
    dispatched_events: Vec<PhysicsEvent>,
    listeners: Listeners,
    command_queue: Vec<Command>,
    state_buffer: Vec<(BodyId, BodyState)>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_valid_config(EngineConfig::default())
    }
}

impl Engine {
    /// Creates an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: EngineConfig) -> Self {
        Engine {
            sleep: SleepThresholds::from_config(&config),
            bodies: BodyArena::new(),
            accumulator: FixedStepAccumulator::new(config.fixed_time_step, config.max_sub_steps),
            grid: SpatialGrid::new(config.broad_phase_cell_size),
            pairs: Vec::new(),
            contacts: Vec::new(),
            constraints: Vec::new(),
            impulse_cache: HashMap::new(),
            islands: SleepIslands::default(),
            touching: BTreeSet::new(),
            step_touching: BTreeSet::new(),
            pending_events: Vec::new(),
            dispatched_events: Vec::new(),
            listeners: Listeners::default(),
            command_queue: Vec::new(),
            state_buffer: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    /// Changes gravity and wakes every sleeping body so it can react.
    pub fn set_gravity(&mut self, gravity: Vec2) -> Result<(), EngineError> {
        if !gravity.is_finite() {
            return Err(ConfigError::NonFinite { field: "gravity" }.into());
        }
        self.config.gravity = gravity;
        for body in self.bodies.iter_mut() {
            if body.wake() {
                self.pending_events.push(PhysicsEvent::Wake(body.id()));
            }
        }
        Ok(())
    }

    // ---- Body store ----

    pub fn add_body(&mut self, spec: BodySpec) -> Result<BodyId, EngineError> {
        spec.shape.validate()?;
        spec.validate()?;
        let id = self.bodies.insert_with(|id| Body::from_spec(id, spec));
        debug!("added body {} ({} live)", id, self.bodies.len());
        Ok(id)
    }

    /// Removes a body. Contacts it was part of vanish without a
    /// `CollisionEnd` event, and sleepers it was touching wake up.
    pub fn remove_body(&mut self, id: BodyId) -> Result<(), EngineError> {
        self.bodies.remove(id).ok_or(EngineError::BodyNotFound(id))?;
        self.wake_touching(id);
        self.touching.retain(|&(a, b)| a != id && b != id);
        self.step_touching.retain(|&(a, b)| a != id && b != id);
        self.contacts.retain(|c| c.body_a != id && c.body_b != id);
        self.impulse_cache.retain(|&(a, b), _| a != id && b != id);
        debug!("removed body {} ({} live)", id, self.bodies.len());
        Ok(())
    }

    /// Removes every body. Listeners stay registered.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.touching.clear();
        self.step_touching.clear();
        self.contacts.clear();
        self.impulse_cache.clear();
        self.pending_events.clear();
        self.accumulator.reset();
        debug!("cleared all bodies");
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains(id)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn get_body_state(&self, id: BodyId) -> Option<BodyState> {
        self.bodies.get(id).map(Body::state)
    }

    /// Snapshot of every live body in slot order. The backing buffer is
    /// reused between calls.
    pub fn all_body_states(&mut self) -> &[(BodyId, BodyState)] {
        self.state_buffer.clear();
        self.state_buffer
            .extend(self.bodies.iter().map(|body| (body.id(), body.state())));
        &self.state_buffer
    }

    /// Same as [`Engine::all_body_states`] without a buffer.
    pub fn body_states(&self) -> impl Iterator<Item = (BodyId, BodyState)> + '_ {
        self.bodies.iter().map(|body| (body.id(), body.state()))
    }

    /// Bodies whose shape contains `point`, in slot order.
    pub fn query_point(&self, point: Vec2) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies
            .iter()
            .filter(move |body| body.aabb().contains_point(point) && body.contains_point(point))
            .map(Body::id)
    }

    // ---- External input ----

    fn wake_for_input(body: &mut Body, events: &mut Vec<PhysicsEvent>) {
        if body.is_dynamic() && body.wake() {
            events.push(PhysicsEvent::Wake(body.id()));
        }
    }

    /// Wakes the sleepers in every pair `id` is part of. Their support may
    /// be gone, and dormant pairs are never re-tested on their own.
    fn wake_touching(&mut self, id: BodyId) {
        for &(a, b) in self.touching.iter().chain(&self.step_touching) {
            let other = match (a == id, b == id) {
                (true, _) => b,
                (_, true) => a,
                _ => continue,
            };
            if let Some(body) = self.bodies.get_mut(other) {
                Self::wake_for_input(body, &mut self.pending_events);
            }
        }
    }

    /// Adds `impulse / mass` to the body's velocity, waking it. No effect on
    /// static bodies. Fails without touching the body if the resulting
    /// velocity would overflow.
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) -> Result<(), EngineError> {
        let body = body_for_input(&mut self.bodies, id, impulse, "impulse")?;
        if body.is_static() {
            return Ok(());
        }
        if !body.apply_impulse(impulse) {
            return Err(EngineError::NumericInstability { id, quantity: "velocity" });
        }
        Self::wake_for_input(body, &mut self.pending_events);
        Ok(())
    }

    /// Accumulates a force for the next sub-step, waking the body.
    pub fn apply_force(&mut self, id: BodyId, force: Vec2) -> Result<(), EngineError> {
        let body = body_for_input(&mut self.bodies, id, force, "force")?;
        if body.is_static() {
            return Ok(());
        }
        if !body.apply_force(force) {
            return Err(EngineError::NumericInstability { id, quantity: "force" });
        }
        Self::wake_for_input(body, &mut self.pending_events);
        Ok(())
    }

    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2) -> Result<(), EngineError> {
        let body = body_for_input(&mut self.bodies, id, velocity, "velocity")?;
        if body.is_static() {
            return Ok(());
        }
        Self::wake_for_input(body, &mut self.pending_events);
        body.velocity = velocity;
        Ok(())
    }

    pub fn set_angular_velocity(&mut self, id: BodyId, angular_velocity: f64) -> Result<(), EngineError> {
        let body = body_for_input(&mut self.bodies, id, Vec2::new(angular_velocity, 0.0), "angular velocity")?;
        if body.is_static() {
            return Ok(());
        }
        Self::wake_for_input(body, &mut self.pending_events);
        body.angular_velocity = angular_velocity;
        Ok(())
    }

    /// Teleports a body. Works on static bodies too (walls following a
    /// resized viewport). Sleepers touching it wake up.
    pub fn set_position(&mut self, id: BodyId, position: Vec2) -> Result<(), EngineError> {
        let body = body_for_input(&mut self.bodies, id, position, "position")?;
        Self::wake_for_input(body, &mut self.pending_events);
        body.position = position;
        self.wake_touching(id);
        Ok(())
    }

    pub fn wake_body(&mut self, id: BodyId) -> Result<(), EngineError> {
        let body = self.bodies.get_mut(id).ok_or(EngineError::BodyNotFound(id))?;
        Self::wake_for_input(body, &mut self.pending_events);
        Ok(())
    }

    /// Puts a dynamic body to sleep immediately, zeroing its motion.
    pub fn sleep_body(&mut self, id: BodyId) -> Result<(), EngineError> {
        let body = self.bodies.get_mut(id).ok_or(EngineError::BodyNotFound(id))?;
        if body.fall_asleep() {
            self.pending_events.push(PhysicsEvent::Sleep(id));
        }
        Ok(())
    }

    // ---- Listeners ----

    pub fn on_collision_start(&mut self, mut callback: impl FnMut(BodyId, BodyId, &mut Commands<'_>) + 'static) -> ListenerId {
        self.listeners.add(
            EventKind::CollisionStart,
            Box::new(move |event, commands| {
                if let PhysicsEvent::CollisionStart { a, b } = *event {
                    callback(a, b, commands);
                }
            }),
        )
    }

    pub fn on_collision_end(&mut self, mut callback: impl FnMut(BodyId, BodyId, &mut Commands<'_>) + 'static) -> ListenerId {
        self.listeners.add(
            EventKind::CollisionEnd,
            Box::new(move |event, commands| {
                if let PhysicsEvent::CollisionEnd { a, b } = *event {
                    callback(a, b, commands);
                }
            }),
        )
    }

    pub fn on_sleep(&mut self, mut callback: impl FnMut(BodyId, &mut Commands<'_>) + 'static) -> ListenerId {
        self.listeners.add(
            EventKind::Sleep,
            Box::new(move |event, commands| {
                if let PhysicsEvent::Sleep(id) = *event {
                    callback(id, commands);
                }
            }),
        )
    }

    pub fn on_wake(&mut self, mut callback: impl FnMut(BodyId, &mut Commands<'_>) + 'static) -> ListenerId {
        self.listeners.add(
            EventKind::Wake,
            Box::new(move |event, commands| {
                if let PhysicsEvent::Wake(id) = *event {
                    callback(id, commands);
                }
            }),
        )
    }

    /// Returns false if the listener was already removed.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // ---- Stepping ----

    /// Contacts found in the most recent sub-step.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Events dispatched at the end of the most recent `step`.
    pub fn events(&self) -> &[PhysicsEvent] {
        &self.dispatched_events
    }

    /// Advances the simulation by `dt` seconds of frame time and returns the
    /// number of fixed sub-steps run. Time beyond `max_sub_steps` worth of
    /// sub-steps is dropped. Queued events are dispatched before returning.
    pub fn step(&mut self, dt: f64) -> u32 {
        let budget = self.accumulator.advance(dt);
        if budget.discarded > 0.0 {
            debug!(
                "step({dt:.4}) hit the {} sub-step cap, discarding {:.4}s",
                self.config.max_sub_steps, budget.discarded
            );
        }

        if budget.steps > 0 {
            self.step_touching.clear();
            let h = self.accumulator.step();
            for index in 0..budget.steps {
                self.sub_step(h);
                trace!(
                    "sub-step {}/{}: {} candidate pairs, {} contacts",
                    index + 1,
                    budget.steps,
                    self.pairs.len(),
                    self.contacts.len()
                );
            }
            self.emit_contact_changes();
        }

        self.flush_events();
        budget.steps
    }

    /// Velocities first, then contacts against them, then positions from
    /// the solved velocities.
    fn sub_step(&mut self, h: f64) {
        let gravity = self.config.gravity;
        for body in self.bodies.iter_mut() {
            if integrate_velocity(body, gravity, h) == IntegrationOutcome::Reset {
                warn!("body {} reached a non-finite velocity; stopped it", body.id());
            }
        }

        self.find_contacts();
        self.wake_touched_sleepers();
        self.solve_velocities();

        for body in self.bodies.iter_mut() {
            if integrate_position(body, h) == IntegrationOutcome::Reset {
                warn!("body {} went non-finite during integration; reset to its last valid state", body.id());
            }
        }
        self.correct_positions();

        for contact in &self.contacts {
            self.step_touching.insert(contact.pair_key());
        }

        if self.config.enable_sleeping {
            self.update_sleep(h);
        }
    }

    fn find_contacts(&mut self) {
        self.grid.clear();
        for index in 0..self.bodies.capacity() {
            if let Some(body) = self.bodies.get_by_index(index) {
                self.grid.insert(index, body.aabb());
            }
        }
        self.grid.query_pairs(&mut self.pairs);

        self.contacts.clear();
        for &(i, j) in &self.pairs {
            let (Some(a), Some(b)) = (self.bodies.get_by_index(i), self.bodies.get_by_index(j)) else {
                continue;
            };
            if !(a.is_active() || b.is_active()) || !a.filter.can_collide(&b.filter) {
                continue;
            }
            if let Some(geometry) = collide(&a.shape, &a.transform(), &b.shape, &b.transform()) {
                self.contacts
                    .push(Contact::new(a.id(), b.id(), geometry, a.sensor || b.sensor));
            }
        }
    }

    /// A sleeping body hit by an awake, moving partner wakes before resolution.
    fn wake_touched_sleepers(&mut self) {
        let thresholds = self.sleep;
        for contact in self.contacts.iter().filter(|c| !c.sensor) {
            let Some((a, b)) = self.bodies.pair_mut(contact.body_a.index(), contact.body_b.index()) else {
                continue;
            };
            if a.sleeping && thresholds.wakes_on_contact(b) && a.wake() {
                self.pending_events.push(PhysicsEvent::Wake(a.id()));
            }
            if b.sleeping && thresholds.wakes_on_contact(a) && b.wake() {
                self.pending_events.push(PhysicsEvent::Wake(b.id()));
            }
        }
    }

    fn solve_velocities(&mut self) {
        let threshold = self.config.restitution_threshold;
        self.constraints.clear();
        for contact in self.contacts.iter().filter(|c| !c.sensor) {
            let (Some(a), Some(b)) = (self.bodies.get(contact.body_a), self.bodies.get(contact.body_b)) else {
                continue;
            };
            if let Some(mut constraint) = ContactConstraint::new(a, b, contact, threshold) {
                if let Some(cached) = self.impulse_cache.get(&(contact.body_a, contact.body_b)) {
                    constraint.warm_start(cached);
                }
                self.constraints.push((contact.body_a, contact.body_b, constraint));
            }
        }

        for (a, b, constraint) in &self.constraints {
            if let Some((a, b)) = self.bodies.pair_mut(a.index(), b.index()) {
                constraint.apply_warm_start(a, b);
            }
        }
        for _ in 0..self.config.velocity_iterations {
            for (a, b, constraint) in &mut self.constraints {
                if let Some((a, b)) = self.bodies.pair_mut(a.index(), b.index()) {
                    constraint.solve(a, b);
                }
            }
        }

        self.impulse_cache.clear();
        self.impulse_cache
            .extend(self.constraints.iter().map(|(a, b, constraint)| ((*a, *b), constraint.cached())));
    }

    fn correct_positions(&mut self) {
        let percent = self.config.position_correction_percent;
        let slop = self.config.position_correction_slop;
        for contact in self.contacts.iter().filter(|c| !c.sensor) {
            if let Some((a, b)) = self.bodies.pair_mut(contact.body_a.index(), contact.body_b.index()) {
                resolver::correct_positions(a, b, contact, percent, slop);
            }
        }
    }

    /// Advances rest timers and puts whole islands of touching awake bodies
    /// to sleep once their least rested member has rested long enough.
    fn update_sleep(&mut self, h: f64) {
        let thresholds = self.sleep;
        self.islands.reset(self.bodies.capacity());
        for contact in self.contacts.iter().filter(|c| !c.sensor) {
            let active = |id| self.bodies.get(id).map_or(false, Body::is_active);
            if active(contact.body_a) && active(contact.body_b) {
                self.islands.link(contact.body_a.index(), contact.body_b.index());
            }
        }

        for body in self.bodies.iter_mut() {
            thresholds.update_timer(body, h);
            if body.is_active() {
                self.islands.record(body.id().index(), body.sleep_timer);
            }
        }
        for body in self.bodies.iter_mut() {
            if !body.is_active() || !thresholds.has_rested(self.islands.rest_time(body.id().index())) {
                continue;
            }
            if body.fall_asleep() {
                trace!("body {} fell asleep", body.id());
                self.pending_events.push(PhysicsEvent::Sleep(body.id()));
            }
        }
    }

    /// Diffs this step's touching pairs against the previous step's and
    /// queues begin/end events in pair order.
    fn emit_contact_changes(&mut self) {
        // Sleeping pairs are not re-tested but are still touching.
        let dormant = |id| self.bodies.get(id).map_or(false, |body: &Body| !body.is_active());
        for &(a, b) in &self.touching {
            if dormant(a) && dormant(b) {
                self.step_touching.insert((a, b));
            }
        }

        for &(a, b) in self.step_touching.difference(&self.touching) {
            self.pending_events.push(PhysicsEvent::CollisionStart { a, b });
        }
        for &(a, b) in self.touching.difference(&self.step_touching) {
            self.pending_events.push(PhysicsEvent::CollisionEnd { a, b });
        }
        std::mem::swap(&mut self.touching, &mut self.step_touching);
    }

    fn flush_events(&mut self) {
        self.dispatched_events.clear();
        std::mem::swap(&mut self.dispatched_events, &mut self.pending_events);
        let mut queue = std::mem::take(&mut self.command_queue);
        self.listeners
            .dispatch(&self.dispatched_events, &mut Commands::new(&self.bodies, &mut queue));

        for command in queue.drain(..) {
            let result = match command {
                Command::ApplyImpulse(id, impulse) => self.apply_impulse(id, impulse),
                Command::SetVelocity(id, velocity) => self.set_velocity(id, velocity),
                Command::Wake(id) => self.wake_body(id),
                Command::RemoveBody(id) => self.remove_body(id),
            };
            if let Err(err) = result {
                debug!("dropping queued {command:?}: {err}");
            }
        }
        self.command_queue = queue;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CollisionFilter;
    use crate::shapes::Shape;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f64 = 1.0 / 60.0;
    const EPSILON: f64 = 1e-9;

    fn ball(radius: f64) -> BodySpec {
        BodySpec::dynamic(Shape::circle(radius).unwrap())
    }

    fn crate_box(x: f64, y: f64) -> BodySpec {
        BodySpec::dynamic(Shape::rectangle(10.0, 10.0).unwrap()).with_position(Vec2::new(x, y))
    }

    fn settled_ball_on_floor() -> (Engine, BodyId, BodyId) {
        let config = EngineConfig::default().with_gravity(Vec2::new(0.0, 980.0));
        let mut engine = Engine::new(config).unwrap();
        let floor = engine
            .add_body(BodySpec::new_static(Shape::rectangle(100.0, 10.0).unwrap()).with_position(Vec2::new(0.0, 30.0)))
            .unwrap();
        let ball = engine.add_body(ball(10.0).with_restitution(0.0)).unwrap();
        for _ in 0..300 {
            engine.step(DT);
        }
        assert!(engine.get_body_state(ball).unwrap().sleeping);
        (engine, floor, ball)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EngineConfig::default().with_max_sub_steps(0);
        assert_eq!(
            Engine::new(config).err(),
            Some(EngineError::Config(ConfigError::ZeroCount { field: "max_sub_steps" }))
        );
    }

    #[test]
    fn test_add_body_validates() {
        let mut engine = Engine::default();
        let err = engine.add_body(ball(1.0).with_mass(-1.0)).unwrap_err();
        assert!(matches!(err, EngineError::Config(ConfigError::NotPositive { field: "mass", .. })));
        assert_eq!(engine.body_count(), 0);
    }

    #[test]
    fn test_free_body_moves_in_a_straight_line() {
        let mut engine = Engine::default();
        let id = engine.add_body(ball(1.0).with_velocity(Vec2::new(60.0, 0.0))).unwrap();
        assert_eq!(engine.step(DT), 1);
        let state = engine.get_body_state(id).unwrap();
        assert!((state.position.x - 1.0).abs() < EPSILON);
        assert_eq!(state.velocity, Vec2::new(60.0, 0.0));
    }

    #[test]
    fn test_partial_frames_accumulate() {
        let mut engine = Engine::default();
        let id = engine.add_body(ball(1.0).with_velocity(Vec2::new(60.0, 0.0))).unwrap();
        assert_eq!(engine.step(DT / 2.0), 0);
        assert_eq!(engine.get_body_state(id).unwrap().position, Vec2::ZERO);
        assert_eq!(engine.step(DT / 2.0), 1);
        assert!((engine.get_body_state(id).unwrap().position.x - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_gravity_accelerates_bodies() {
        let config = EngineConfig::default().with_gravity(Vec2::new(0.0, 600.0));
        let mut engine = Engine::new(config).unwrap();
        let id = engine.add_body(ball(1.0)).unwrap();
        engine.step(DT);
        let state = engine.get_body_state(id).unwrap();
        assert!((state.velocity.y - 10.0).abs() < EPSILON);
        assert!(state.position.y > 0.0);
    }

    #[test]
    fn test_static_bodies_do_not_move() {
        let config = EngineConfig::default().with_gravity(Vec2::new(0.0, 600.0));
        let mut engine = Engine::new(config).unwrap();
        let wall = engine
            .add_body(BodySpec::new_static(Shape::rectangle(10.0, 10.0).unwrap()))
            .unwrap();
        engine.apply_impulse(wall, Vec2::new(100.0, 0.0)).unwrap();
        for _ in 0..10 {
            engine.step(DT);
        }
        let state = engine.get_body_state(wall).unwrap();
        assert_eq!(state.position, Vec2::ZERO);
        assert_eq!(state.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_ball_rests_on_floor() {
        let config = EngineConfig::default().with_gravity(Vec2::new(0.0, 500.0));
        let mut engine = Engine::new(config).unwrap();
        let floor = engine
            .add_body(
                BodySpec::new_static(Shape::rectangle(200.0, 10.0).unwrap())
                    .with_position(Vec2::new(0.0, 110.0)),
            )
            .unwrap();
        let ball = engine
            .add_body(ball(10.0).with_restitution(0.0).with_position(Vec2::new(0.0, 50.0)))
            .unwrap();

        for _ in 0..240 {
            engine.step(DT);
        }
        let state = engine.get_body_state(ball).unwrap();
        // Resting on the floor's top edge at y = 100, within slop and one frame of sag.
        assert!((state.position.y - 90.0).abs() < 0.5, "y = {}", state.position.y);
        assert!(state.velocity.length() < 10.0);
        assert!(engine.contains(floor));
    }

    #[test]
    fn test_resting_stacks_fall_asleep() {
        let config = EngineConfig::default().with_gravity(Vec2::new(0.0, 980.0));
        let mut engine = Engine::new(config).unwrap();
        engine
            .add_body(BodySpec::new_static(Shape::rectangle(400.0, 10.0).unwrap()).with_position(Vec2::new(0.0, 10.0)))
            .unwrap();
        let two: Vec<_> = (0..2)
            .map(|level| engine.add_body(crate_box(-100.0, -10.0 - 20.0 * level as f64)).unwrap())
            .collect();
        let three: Vec<_> = (0..3)
            .map(|level| engine.add_body(crate_box(100.0, -10.0 - 20.0 * level as f64)).unwrap())
            .collect();

        for _ in 0..1200 {
            engine.step(DT);
        }
        for &id in two.iter().chain(&three) {
            let state = engine.get_body_state(id).unwrap();
            assert!(state.sleeping, "{id} still awake at y = {}", state.position.y);
        }
        let top = engine.get_body_state(three[2]).unwrap();
        assert!((top.position.y + 50.0).abs() < 2.0, "top box at y = {}", top.position.y);
        assert!((top.position.x - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_moving_the_support_wakes_the_sleeper() {
        let (mut engine, floor, ball) = settled_ball_on_floor();
        let resting = engine.get_body_state(ball).unwrap().position;

        engine.set_position(floor, Vec2::new(0.0, 500.0)).unwrap();
        assert!(!engine.get_body_state(ball).unwrap().sleeping);
        engine.step(DT);
        assert_eq!(
            engine.events(),
            &[PhysicsEvent::Wake(ball), PhysicsEvent::CollisionEnd { a: floor, b: ball }]
        );

        for _ in 0..10 {
            engine.step(DT);
        }
        assert!(engine.get_body_state(ball).unwrap().position.y > resting.y + 1.0);
    }

    #[test]
    fn test_removing_the_support_wakes_the_sleeper() {
        let (mut engine, floor, ball) = settled_ball_on_floor();
        engine.remove_body(floor).unwrap();
        assert!(!engine.get_body_state(ball).unwrap().sleeping);

        engine.step(DT);
        assert_eq!(engine.events(), &[PhysicsEvent::Wake(ball)]);
        assert!(engine.get_body_state(ball).unwrap().velocity.y > 0.0);
    }

    #[test]
    fn test_collision_events_begin_and_end() {
        let mut engine = Engine::default();
        let a = engine
            .add_body(ball(10.0).with_velocity(Vec2::new(100.0, 0.0)).with_restitution(1.0))
            .unwrap();
        let b = engine
            .add_body(ball(10.0).with_position(Vec2::new(25.0, 0.0)).with_restitution(1.0))
            .unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        let starts = Rc::clone(&log);
        engine.on_collision_start(move |x, y, _| starts.borrow_mut().push(("start", x, y)));
        let ends = Rc::clone(&log);
        engine.on_collision_end(move |x, y, _| ends.borrow_mut().push(("end", x, y)));

        for _ in 0..30 {
            engine.step(DT);
        }
        assert_eq!(*log.borrow(), vec![("start", a, b), ("end", a, b)]);
    }

    #[test]
    fn test_filtered_pairs_do_not_collide() {
        let mut engine = Engine::default();
        let ghost = CollisionFilter::new(0b10, 0b10);
        let solid = CollisionFilter::new(0b01, 0b01);
        let a = engine
            .add_body(ball(10.0).with_filter(ghost).with_velocity(Vec2::new(10.0, 0.0)))
            .unwrap();
        engine.add_body(ball(10.0).with_filter(solid).with_position(Vec2::new(5.0, 0.0))).unwrap();
        engine.step(DT);
        assert!(engine.contacts().is_empty());
        assert_eq!(engine.get_body_state(a).unwrap().velocity, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_sensor_reports_without_pushing() {
        let mut engine = Engine::default();
        let zone = engine
            .add_body(BodySpec::new_static(Shape::rectangle(50.0, 50.0).unwrap()).with_sensor(true))
            .unwrap();
        let item = engine.add_body(ball(5.0).with_velocity(Vec2::new(30.0, 0.0))).unwrap();
        engine.step(DT);
        assert_eq!(engine.events(), &[PhysicsEvent::CollisionStart { a: zone, b: item }]);
        assert!(engine.contacts()[0].sensor);
        assert_eq!(engine.get_body_state(item).unwrap().velocity, Vec2::new(30.0, 0.0));
    }

    #[test]
    fn test_stale_ids_fail_cleanly() {
        let mut engine = Engine::default();
        let id = engine.add_body(ball(1.0)).unwrap();
        engine.remove_body(id).unwrap();
        assert_eq!(engine.remove_body(id), Err(EngineError::BodyNotFound(id)));
        assert_eq!(engine.apply_impulse(id, Vec2::X), Err(EngineError::BodyNotFound(id)));
        assert_eq!(engine.set_velocity(id, Vec2::X), Err(EngineError::BodyNotFound(id)));
        assert!(engine.get_body_state(id).is_none());
        assert!(engine.body(id).is_none());
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let mut engine = Engine::default();
        let id = engine.add_body(ball(1.0)).unwrap();
        assert_eq!(
            engine.apply_impulse(id, Vec2::new(f64::NAN, 0.0)),
            Err(EngineError::NumericInstability { id, quantity: "impulse" })
        );
        assert!(engine.apply_force(id, Vec2::new(0.0, f64::INFINITY)).is_err());
        assert!(engine.set_position(id, Vec2::new(f64::NAN, 0.0)).is_err());
        assert!(engine.set_angular_velocity(id, f64::NAN).is_err());
        assert_eq!(engine.get_body_state(id).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_overflowing_input_is_rejected() {
        let mut engine = Engine::default();
        let id = engine
            .add_body(ball(1.0).with_mass(0.1).with_velocity(Vec2::new(1.0, 0.0)))
            .unwrap();
        assert_eq!(
            engine.apply_impulse(id, Vec2::new(1e308, 0.0)),
            Err(EngineError::NumericInstability { id, quantity: "velocity" })
        );
        assert_eq!(engine.apply_force(id, Vec2::new(0.0, f64::MAX)), Ok(()));
        assert_eq!(
            engine.apply_force(id, Vec2::new(0.0, f64::MAX)),
            Err(EngineError::NumericInstability { id, quantity: "force" })
        );
        assert_eq!(engine.get_body_state(id).unwrap().velocity, Vec2::new(1.0, 0.0));

        let sleeper = engine.add_body(ball(1.0).with_mass(0.1).with_start_asleep(true)).unwrap();
        assert!(engine.apply_impulse(sleeper, Vec2::new(-1e308, 0.0)).is_err());
        let state = engine.get_body_state(sleeper).unwrap();
        assert!(state.sleeping);
        assert_eq!(state.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_impulse_wakes_sleeping_body() {
        let mut engine = Engine::default();
        let id = engine.add_body(ball(1.0).with_start_asleep(true)).unwrap();
        assert!(engine.get_body_state(id).unwrap().sleeping);

        engine.apply_impulse(id, Vec2::new(2.0, 0.0)).unwrap();
        let state = engine.get_body_state(id).unwrap();
        assert!(!state.sleeping);
        assert_eq!(state.velocity, Vec2::new(2.0, 0.0));

        engine.step(DT);
        assert_eq!(engine.events(), &[PhysicsEvent::Wake(id)]);
    }

    #[test]
    fn test_sleep_body_and_wake_body() {
        let mut engine = Engine::default();
        let id = engine.add_body(ball(1.0).with_velocity(Vec2::new(5.0, 0.0))).unwrap();
        engine.sleep_body(id).unwrap();
        let before = engine.get_body_state(id).unwrap();
        assert!(before.sleeping);
        engine.step(DT);
        assert_eq!(engine.events(), &[PhysicsEvent::Sleep(id)]);
        assert_eq!(engine.get_body_state(id).unwrap().position, before.position);

        engine.wake_body(id).unwrap();
        engine.step(DT);
        assert_eq!(engine.events(), &[PhysicsEvent::Wake(id)]);
    }

    #[test]
    fn test_slow_contact_does_not_wake_sleeper() {
        let mut engine = Engine::default();
        let sleeper = engine.add_body(ball(10.0).with_start_asleep(true)).unwrap();
        let nudger = engine
            .add_body(
                ball(10.0)
                    .with_position(Vec2::new(19.0, 0.0))
                    .with_velocity(Vec2::new(-0.01, 0.0))
                    .with_can_sleep(false),
            )
            .unwrap();
        engine.step(DT);
        assert!(engine.get_body_state(sleeper).unwrap().sleeping);
        assert_eq!(engine.get_body_state(sleeper).unwrap().position, Vec2::ZERO);
        assert!(engine.get_body_state(nudger).unwrap().position.x > 19.0);
    }

    #[test]
    fn test_fast_contact_wakes_sleeper() {
        let mut engine = Engine::default();
        let sleeper = engine
            .add_body(ball(10.0).with_start_asleep(true).with_restitution(1.0))
            .unwrap();
        let striker = engine
            .add_body(
                ball(10.0)
                    .with_position(Vec2::new(19.5, 0.0))
                    .with_velocity(Vec2::new(-120.0, 0.0))
                    .with_restitution(1.0),
            )
            .unwrap();
        engine.step(DT);
        let state = engine.get_body_state(sleeper).unwrap();
        assert!(!state.sleeping);
        assert!(state.velocity.x < -100.0);
        assert!(engine.get_body_state(striker).unwrap().velocity.x.abs() < EPSILON);
        assert!(engine.events().contains(&PhysicsEvent::Wake(sleeper)));
    }

    #[test]
    fn test_listener_commands_apply_after_dispatch() {
        let mut engine = Engine::default();
        let a = engine.add_body(ball(10.0).with_velocity(Vec2::new(10.0, 0.0))).unwrap();
        let b = engine.add_body(ball(10.0).with_position(Vec2::new(15.0, 0.0))).unwrap();
        engine.on_collision_start(move |_, other, commands| commands.remove_body(other));

        engine.step(DT);
        assert!(engine.contains(a));
        assert!(!engine.contains(b));
        // The removed body's contact ends silently.
        engine.step(DT);
        assert!(engine.events().is_empty());
        assert!(engine.contacts().is_empty());
    }

    #[test]
    fn test_listeners_see_end_of_step_state() {
        let mut engine = Engine::default();
        let a = engine.add_body(ball(10.0).with_velocity(Vec2::new(60.0, 0.0))).unwrap();
        let b = engine.add_body(ball(10.0).with_position(Vec2::new(19.0, 0.0))).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        engine.on_collision_start(move |x, y, commands| {
            log.borrow_mut().push((commands.body_state(x), commands.body_state(y)));
        });

        // The contact begins in the first of three sub-steps.
        assert_eq!(engine.step(3.0 * DT), 3);
        let end_of_step = (engine.get_body_state(a), engine.get_body_state(b));
        assert!(end_of_step.0.is_some() && end_of_step.1.is_some());
        assert_eq!(*seen.borrow(), vec![end_of_step]);
    }

    #[test]
    fn test_remove_listener_stops_callbacks() {
        let mut engine = Engine::default();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let listener = engine.on_wake(move |_, _| *counter.borrow_mut() += 1);
        let id = engine.add_body(ball(1.0).with_start_asleep(true)).unwrap();

        engine.wake_body(id).unwrap();
        engine.step(DT);
        assert!(engine.remove_listener(listener));
        engine.sleep_body(id).unwrap();
        engine.wake_body(id).unwrap();
        engine.step(DT);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_all_body_states_reuses_buffer() {
        let mut engine = Engine::default();
        let ids: Vec<_> = (0..4)
            .map(|i| engine.add_body(ball(1.0).with_position(Vec2::new(10.0 * i as f64, 0.0))).unwrap())
            .collect();
        engine.remove_body(ids[1]).unwrap();

        let states = engine.all_body_states();
        assert_eq!(states.len(), 3);
        assert_eq!(states[1].0, ids[2]);
        assert_eq!(states[1].1.position, Vec2::new(20.0, 0.0));
        let capacity = engine.state_buffer.capacity();
        engine.all_body_states();
        assert_eq!(engine.state_buffer.capacity(), capacity);
        assert_eq!(engine.body_states().count(), 3);
    }

    #[test]
    fn test_query_point() {
        let mut engine = Engine::default();
        let card = engine
            .add_body(BodySpec::dynamic(Shape::rectangle(20.0, 30.0).unwrap()).with_position(Vec2::new(100.0, 100.0)))
            .unwrap();
        let coin = engine.add_body(ball(5.0).with_position(Vec2::new(110.0, 110.0))).unwrap();

        let hits: Vec<_> = engine.query_point(Vec2::new(110.0, 110.0)).collect();
        assert_eq!(hits, vec![card, coin]);
        let hits: Vec<_> = engine.query_point(Vec2::new(85.0, 75.0)).collect();
        assert_eq!(hits, vec![card]);
        assert_eq!(engine.query_point(Vec2::new(0.0, 0.0)).count(), 0);
    }

    #[test]
    fn test_set_gravity_wakes_sleepers() {
        let mut engine = Engine::default();
        let id = engine.add_body(ball(1.0).with_start_asleep(true)).unwrap();
        assert!(engine.set_gravity(Vec2::new(f64::NAN, 0.0)).is_err());
        engine.set_gravity(Vec2::new(0.0, 60.0)).unwrap();
        engine.step(DT);
        let state = engine.get_body_state(id).unwrap();
        assert!(!state.sleeping);
        assert!((state.velocity.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_clear() {
        let mut engine = Engine::default();
        let id = engine.add_body(ball(1.0)).unwrap();
        engine.clear();
        assert_eq!(engine.body_count(), 0);
        assert!(!engine.contains(id));
        let fresh = engine.add_body(ball(1.0)).unwrap();
        assert_ne!(fresh, id);
    }

    #[test]
    fn test_step_ignores_bad_dt() {
        let mut engine = Engine::default();
        let id = engine.add_body(ball(1.0).with_velocity(Vec2::X)).unwrap();
        assert_eq!(engine.step(f64::NAN), 0);
        assert_eq!(engine.step(-1.0), 0);
        assert_eq!(engine.get_body_state(id).unwrap().position, Vec2::ZERO);
    }
}
