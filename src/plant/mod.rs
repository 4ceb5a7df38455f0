//! The stem tree and its owned resources
//!
//! A `Plant` is an arena of stems addressed by generational handles.
//! Stems form an intrusive tree through index links; a child's world
//! location is derived from a point along its parent's path.

pub mod leaf;
pub mod material;
pub mod plant;
pub mod stem;

pub use leaf::{Leaf, LeafId};
pub use material::{LeafMesh, Material, MaterialId, MeshId};
pub use plant::{Plant, StemId};
pub use stem::{Stem, StemSurface};
