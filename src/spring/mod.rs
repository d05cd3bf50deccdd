//! Damped-spring animation of scalars, vectors and channel arrays.

pub mod animatable;
pub mod config;
#[allow(clippy::module_inception)]
pub mod spring;

pub use animatable::Animatable;
pub use config::{SpringConfig, SpringOptions};
pub use spring::{advance, Spring, SpringState};
