//! Stem records stored in the plant arena

use glam::{Vec2, Vec3};

use crate::animation::Joint;
use crate::params::ParameterTree;
use crate::path::Path;

use super::leaf::{Leaf, LeafId};
use super::material::MaterialId;
use super::plant::StemId;

/// Which surface of a stem a material applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StemSurface {
    Outer = 0,
    Inner = 1,
}

/// One node of the stem tree.
///
/// Tree links are index handles owned by the arena; `position` is the
/// arc-length placement along the parent's path and `location` the cached
/// world-space origin derived from it. Path and position edits must go
/// through the plant so location updates cascade to descendants.
#[derive(Clone, Debug)]
pub struct Stem {
    pub(crate) parent: Option<StemId>,
    pub(crate) child: Option<StemId>,
    pub(crate) next_sibling: Option<StemId>,
    pub(crate) prev_sibling: Option<StemId>,

    pub(crate) depth: u32,
    pub(crate) position: f32,
    pub(crate) location: Vec3,
    pub(crate) path: Path,
    swelling: Vec2,
    material: [MaterialId; 2],
    custom: bool,
    params: ParameterTree,
    pub(crate) leaves: Vec<Leaf>,
    joints: Vec<Joint>,
}

impl Stem {
    pub(crate) fn new(parent: Option<StemId>, depth: u32) -> Self {
        Self {
            parent,
            child: None,
            next_sibling: None,
            prev_sibling: None,
            depth,
            position: 0.0,
            location: Vec3::ZERO,
            path: Path::new(),
            swelling: Vec2::new(1.5, 3.0),
            material: [0, 0],
            custom: false,
            params: ParameterTree::new(),
            leaves: Vec::new(),
            joints: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<StemId> {
        self.parent
    }

    pub fn child(&self) -> Option<StemId> {
        self.child
    }

    pub fn sibling(&self) -> Option<StemId> {
        self.next_sibling
    }

    pub fn prev_sibling(&self) -> Option<StemId> {
        self.prev_sibling
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn location(&self) -> Vec3 {
        self.location
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn swelling(&self) -> Vec2 {
        self.swelling
    }

    /// Collar scale where the stem meets its parent.
    pub fn set_swelling(&mut self, swelling: Vec2) {
        self.swelling = swelling;
    }

    pub fn material(&self, surface: StemSurface) -> MaterialId {
        self.material[surface as usize]
    }

    pub fn set_material(&mut self, surface: StemSurface, material: MaterialId) {
        self.material[surface as usize] = material;
    }

    /// Custom stems are skipped by procedural regeneration.
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub fn set_custom(&mut self, custom: bool) {
        self.custom = custom;
    }

    pub fn parameters(&self) -> &ParameterTree {
        &self.params
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterTree {
        &mut self.params
    }

    pub fn set_parameters(&mut self, params: ParameterTree) {
        self.params = params;
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn leaf(&self, id: LeafId) -> Option<&Leaf> {
        self.leaves.iter().find(|leaf| leaf.id == id)
    }

    pub fn leaf_mut(&mut self, id: LeafId) -> Option<&mut Leaf> {
        self.leaves.iter_mut().find(|leaf| leaf.id == id)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn has_joints(&self) -> bool {
        !self.joints.is_empty()
    }

    pub fn add_joint(&mut self, joint: Joint) {
        self.joints.push(joint);
    }

    pub(crate) fn joints_mut(&mut self) -> &mut [Joint] {
        &mut self.joints
    }

    pub fn clear_joints(&mut self) {
        self.joints.clear();
    }
}

/// Content equality for undo-style change detection; tree links and
/// derived joints are excluded.
impl PartialEq for Stem {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth
            && self.position == other.position
            && self.location == other.location
            && self.path == other.path
            && self.swelling == other.swelling
            && self.material == other.material
            && self.custom == other.custom
            && self.params == other.params
            && self.leaves == other.leaves
    }
}
