//! Leaves attached to stems

use glam::{Quat, Vec3};

use super::material::{MaterialId, MeshId};

/// Unique leaf identifier, drawn from the plant's allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafId(pub u64);

/// A leaf placed at a scalar position along its owning stem's path.
#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
    pub(crate) id: LeafId,
    /// Arc-length position along the owning stem's path. Negative while
    /// the leaf is unplaced.
    pub position: f32,
    pub scale: Vec3,
    pub rotation: Quat,
    pub material: MaterialId,
    pub mesh: MeshId,
}

impl Default for Leaf {
    fn default() -> Self {
        Self {
            id: LeafId(0),
            position: -1.0,
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
            material: 0,
            mesh: 0,
        }
    }
}

impl Leaf {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id assigned when the leaf was added to a stem.
    pub fn id(&self) -> LeafId {
        self.id
    }
}
