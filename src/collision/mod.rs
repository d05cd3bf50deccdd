pub mod aabb;
pub mod detection;
pub mod manifold;
pub mod resolver;
pub mod spatial_grid;

pub use aabb::Aabb;
pub use detection::collide;
pub use manifold::{Contact, ContactGeometry};
pub use spatial_grid::SpatialGrid;
