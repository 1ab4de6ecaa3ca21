pub mod aabb;
pub mod collide;
pub mod distance;
pub mod dynamic_tree;
pub mod manifold;
pub mod toi;

pub use aabb::Aabb;
pub use distance::{distance, DistanceInput, DistanceOutput, SimplexCache};
pub use manifold::{Manifold, ManifoldPoint, WorldManifold};
pub use toi::{time_of_impact, ToiInput, ToiOutput, ToiState};
