//! A small 2D physics engine for interface motion.
//!
//! Two independent pieces share one sub-stepping policy:
//!
//! - [`Engine`]: rigid circles, boxes and convex polygons stepped at a fixed
//!   rate, with impulse collision response, sleeping and end-of-frame events.
//! - [`Spring`]: damped springs that animate scalars, points or channel
//!   arrays toward a target and report when they have settled.
//!
//! [`interaction`] wires pointer input into both.

pub mod collision;
pub mod common;
pub mod error;
pub mod integration;
pub mod interaction;
pub mod math;
pub mod objects;
pub mod shapes;
pub mod spring;
pub mod world;

pub use common::{CollisionFilter, Material};
pub use error::{ConfigError, EngineError, ShapeError};
pub use math::{Transform, Vec2};
pub use objects::{Body, BodyId, BodyKind, BodySpec, BodyState};
pub use shapes::{Circle, Polygon, Rectangle, Shape};
pub use spring::{Animatable, Spring, SpringConfig, SpringOptions, SpringState};
pub use world::{Commands, Engine, EngineConfig, ListenerId, PhysicsEvent};
