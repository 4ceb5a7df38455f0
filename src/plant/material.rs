//! Material and leaf-mesh registries
//!
//! Stems and leaves reference materials and meshes by index; the actual
//! shading and triangulation belong to the consumers of the read-only
//! interfaces.

pub type MaterialId = usize;
pub type MeshId = usize;

/// A named material slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub texture: Option<String>,
}

impl Material {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture: None,
        }
    }
}

/// A named leaf mesh slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LeafMesh {
    pub name: String,
}

impl LeafMesh {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
