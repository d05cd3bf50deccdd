pub mod filter;
pub mod material;

pub use filter::CollisionFilter;
pub use material::Material;
