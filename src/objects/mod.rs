pub mod arena;
pub mod rigid_body;

pub use arena::{BodyArena, BodyId};
pub use rigid_body::{Body, BodyKind, BodySpec, BodyState};
