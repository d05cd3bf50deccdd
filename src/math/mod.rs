pub mod scalar;
pub mod transform;
pub mod vec2;

pub use scalar::{approx_eq, clamp, inverse_lerp, lerp, wrap_angle};
pub use transform::Transform;
pub use vec2::Vec2;
