pub mod config;
pub mod engine;
pub mod events;
mod sleep;

pub use config::EngineConfig;
pub use engine::Engine;
pub use events::{Command, Commands, ListenerId, PhysicsEvent};
