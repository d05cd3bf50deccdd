//! Engine events, listener registry and the deferred command queue.
//!
//! Events are queued while the engine steps and handed to listeners in one
//! batch at the end of [`Engine::step`](crate::Engine::step). Listeners get no
//! mutable access to the engine; they read body state and queue changes
//! through [`Commands`], which the engine applies once every listener has run.

use std::fmt;

use crate::math::Vec2;
use crate::objects::{Body, BodyArena, BodyId, BodyState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicsEvent {
    /// Two bodies started touching. `a < b`.
    CollisionStart { a: BodyId, b: BodyId },
    /// Two previously touching bodies separated. `a < b`.
    CollisionEnd { a: BodyId, b: BodyId },
    Sleep(BodyId),
    Wake(BodyId),
}

impl PhysicsEvent {
    fn kind(&self) -> EventKind {
        match self {
            PhysicsEvent::CollisionStart { .. } => EventKind::CollisionStart,
            PhysicsEvent::CollisionEnd { .. } => EventKind::CollisionEnd,
            PhysicsEvent::Sleep(_) => EventKind::Sleep,
            PhysicsEvent::Wake(_) => EventKind::Wake,
        }
    }

    /// Whether the event mentions `id`.
    pub fn involves(&self, id: BodyId) -> bool {
        match *self {
            PhysicsEvent::CollisionStart { a, b } | PhysicsEvent::CollisionEnd { a, b } => a == id || b == id,
            PhysicsEvent::Sleep(body) | PhysicsEvent::Wake(body) => body == id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventKind {
    CollisionStart,
    CollisionEnd,
    Sleep,
    Wake,
}

/// Handle returned when registering a listener, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub(crate) type Callback = Box<dyn FnMut(&PhysicsEvent, &mut Commands<'_>)>;

/// Listeners in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, EventKind, Callback)>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    pub(crate) fn add(&mut self, kind: EventKind, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, kind, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Calls every matching listener for each event, events in queue order.
    pub(crate) fn dispatch(&mut self, events: &[PhysicsEvent], commands: &mut Commands<'_>) {
        if self.entries.is_empty() {
            return;
        }
        for event in events {
            let kind = event.kind();
            for (_, entry_kind, callback) in self.entries.iter_mut() {
                if *entry_kind == kind {
                    callback(event, commands);
                }
            }
        }
    }
}

/// A change requested by a listener, applied after dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    ApplyImpulse(BodyId, Vec2),
    SetVelocity(BodyId, Vec2),
    Wake(BodyId),
    RemoveBody(BodyId),
}

/// What listeners get to work with: read access to the bodies as they are
/// at the end of the step, and a queue of changes applied after dispatch.
///
/// ```
/// use ui_physics::{BodySpec, Engine, Shape, Vec2};
///
/// let mut engine = Engine::default();
/// let ball = engine.add_body(BodySpec::dynamic(Shape::circle(5.0).unwrap())).unwrap();
/// // Whatever the ball touches while moving fast gets removed after the step.
/// engine.on_collision_start(move |a, b, commands| {
///     let other = if a == ball { b } else { a };
///     let fast = commands.body_state(ball).map_or(false, |s| s.velocity.length() > 100.0);
///     if fast {
///         commands.remove_body(other);
///     }
/// });
/// ```
pub struct Commands<'w> {
    bodies: &'w BodyArena,
    queue: &'w mut Vec<Command>,
}

impl<'w> Commands<'w> {
    pub(crate) fn new(bodies: &'w BodyArena, queue: &'w mut Vec<Command>) -> Self {
        Self { bodies, queue }
    }

    pub fn body(&self, id: BodyId) -> Option<&'w Body> {
        self.bodies.get(id)
    }

    pub fn body_state(&self, id: BodyId) -> Option<BodyState> {
        self.bodies.get(id).map(Body::state)
    }

    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) {
        self.queue.push(Command::ApplyImpulse(id, impulse));
    }

    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        self.queue.push(Command::SetVelocity(id, velocity));
    }

    pub fn wake(&mut self, id: BodyId) {
        self.queue.push(Command::Wake(id));
    }

    pub fn remove_body(&mut self, id: BodyId) {
        self.queue.push(Command::RemoveBody(id));
    }

    /// Commands queued so far in this dispatch.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl fmt::Debug for Commands<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commands")
            .field("bodies", &self.bodies.len())
            .field("queue", &self.queue)
            .finish()
    }
}
