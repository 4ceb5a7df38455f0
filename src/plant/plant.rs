//! Arena for the stem tree
//!
//! Stems live in slot storage addressed by generational handles, so
//! structural edits are O(1) and stale handles fail instead of aliasing a
//! reused slot. A stem exclusively owns its subtree: removal frees the
//! whole subtree, extraction detaches it alive for later reinsertion.

use crate::core::Error;
use crate::path::Path;

use super::leaf::{Leaf, LeafId};
use super::material::{LeafMesh, Material, MaterialId, MeshId};
use super::stem::Stem;

/// Generational handle to a stem slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StemId {
    index: u32,
    generation: u32,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    stem: Option<Stem>,
}

/// The plant: stem arena plus material and leaf-mesh registries and the
/// leaf id allocator.
#[derive(Clone, Debug, Default)]
pub struct Plant {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: Option<StemId>,
    next_leaf_id: u64,
    materials: Vec<Material>,
    leaf_meshes: Vec<LeafMesh>,
}

impl Plant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all stems and create a fresh root.
    pub fn create_root(&mut self) -> StemId {
        self.slots.clear();
        self.free.clear();
        let id = self.alloc(Stem::new(None, 0));
        self.root = Some(id);
        id
    }

    pub fn root(&self) -> Option<StemId> {
        self.root
    }

    pub fn get(&self, id: StemId) -> Option<&Stem> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.stem.as_ref()
    }

    pub fn get_mut(&mut self, id: StemId) -> Option<&mut Stem> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.stem.as_mut()
    }

    fn stem(&self, id: StemId) -> Result<&Stem, Error> {
        self.get(id).ok_or(Error::StaleStem)
    }

    fn stem_mut(&mut self, id: StemId) -> Result<&mut Stem, Error> {
        self.get_mut(id).ok_or(Error::StaleStem)
    }

    /// Number of live stems.
    pub fn stem_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.stem.is_some()).count()
    }

    /// Add a new stem as the first child of `parent`.
    pub fn add_stem(&mut self, parent: StemId) -> Result<StemId, Error> {
        let depth = self.stem(parent)?.depth + 1;
        let id = self.alloc(Stem::new(Some(parent), depth));
        let first = self.stem(parent)?.child;
        if let Some(first) = first {
            self.stem_mut(first)?.prev_sibling = Some(id);
        }
        {
            let stem = self.stem_mut(id)?;
            stem.next_sibling = first;
        }
        self.stem_mut(parent)?.child = Some(id);
        Ok(id)
    }

    /// Remove a stem and destroy its entire subtree.
    pub fn remove_stem(&mut self, id: StemId) -> Result<(), Error> {
        self.unlink(id)?;
        self.free_subtree(id);
        if self.root == Some(id) {
            self.root = None;
        }
        Ok(())
    }

    /// Detach a stem from the tree without destroying its subtree, for
    /// undo-style detach/reattach. The subtree stays alive in the arena
    /// and keeps its position value for reinsertion.
    pub fn extract_stem(&mut self, id: StemId) -> Result<StemId, Error> {
        if self.root == Some(id) {
            return Err(Error::RootStem);
        }
        self.unlink(id)?;
        Ok(id)
    }

    /// Reattach an extracted stem as the first child of `parent`.
    pub fn insert_stem(&mut self, id: StemId, parent: StemId) -> Result<(), Error> {
        if self.stem(id)?.parent.is_some() || self.root == Some(id) {
            return Err(Error::StemAttached);
        }
        let depth = self.stem(parent)?.depth + 1;
        let first = self.stem(parent)?.child;
        if let Some(first) = first {
            self.stem_mut(first)?.prev_sibling = Some(id);
        }
        {
            let stem = self.stem_mut(id)?;
            stem.parent = Some(parent);
            stem.next_sibling = first;
            stem.prev_sibling = None;
        }
        self.stem_mut(parent)?.child = Some(id);
        self.update_depths(id, depth)?;
        let position = self.stem(id)?.position;
        self.set_position(id, position)
    }

    /// Store a path on a stem and resample it; the first segment collapses
    /// to its start point for attached stems so the attachment point is
    /// not duplicated. Locations of all descendants are recomputed.
    pub fn set_path(&mut self, id: StemId, mut path: Path) -> Result<(), Error> {
        let attached = self.stem(id)?.parent.is_some();
        path.generate(attached);
        self.stem_mut(id)?.path = path;
        self.update_positions(id)
    }

    /// Place a stem at an arc-length position along its parent's path and
    /// recompute its location and those of all descendants. A degenerate
    /// parent path leaves the location NaN. No-op for the root.
    pub fn set_position(&mut self, id: StemId, position: f32) -> Result<(), Error> {
        let Some(parent_id) = self.stem(id)?.parent else {
            return Ok(());
        };
        let (point, parent_location) = {
            let parent = self.stem(parent_id)?;
            (parent.path().get_intermediate(position), parent.location())
        };
        let location = if point.x.is_nan() {
            point
        } else {
            parent_location + point
        };
        {
            let stem = self.stem_mut(id)?;
            stem.position = position;
            stem.location = location;
        }
        self.update_positions(id)
    }

    fn update_positions(&mut self, id: StemId) -> Result<(), Error> {
        let mut child = self.stem(id)?.child;
        while let Some(c) = child {
            let position = self.stem(c)?.position;
            self.set_position(c, position)?;
            child = self.stem(c)?.next_sibling;
        }
        Ok(())
    }

    fn update_depths(&mut self, id: StemId, depth: u32) -> Result<(), Error> {
        self.stem_mut(id)?.depth = depth;
        let mut child = self.stem(id)?.child;
        while let Some(c) = child {
            self.update_depths(c, depth + 1)?;
            child = self.stem(c)?.next_sibling;
        }
        Ok(())
    }

    /// True iff `ancestor` is a strict ancestor of `id`. The depth gate
    /// avoids the parent walk when it cannot succeed.
    pub fn is_descendant_of(&self, id: StemId, ancestor: StemId) -> bool {
        let (Some(stem), Some(other)) = (self.get(id), self.get(ancestor)) else {
            return false;
        };
        if stem.depth <= other.depth {
            return false;
        }
        let mut current = stem.parent;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.get(p).and_then(|s| s.parent);
        }
        false
    }

    /// Pre-order listing of a subtree.
    pub fn subtree(&self, id: StemId) -> Vec<StemId> {
        let mut out = Vec::new();
        self.collect_subtree(id, &mut out);
        out
    }

    fn collect_subtree(&self, id: StemId, out: &mut Vec<StemId>) {
        if self.get(id).is_none() {
            return;
        }
        out.push(id);
        let mut child = self.get(id).and_then(|s| s.child);
        while let Some(c) = child {
            self.collect_subtree(c, out);
            child = self.get(c).and_then(|s| s.next_sibling);
        }
    }

    /// Flattened pre-order list of every joint in the tree, with world
    /// locations and parent links, for skinned-export consumers.
    pub fn flattened_joints(&self) -> Vec<crate::animation::Joint> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        let mut joints = Vec::new();
        for id in self.subtree(root) {
            if let Some(stem) = self.get(id) {
                joints.extend_from_slice(stem.joints());
            }
        }
        joints
    }

    /// Attach a leaf to a stem, assigning it a fresh id.
    pub fn add_leaf(&mut self, id: StemId, mut leaf: Leaf) -> Result<LeafId, Error> {
        self.next_leaf_id += 1;
        let leaf_id = LeafId(self.next_leaf_id);
        leaf.id = leaf_id;
        self.stem_mut(id)?.leaves.push(leaf);
        Ok(leaf_id)
    }

    /// Remove a leaf by id. Returns false if the stem does not own it.
    pub fn remove_leaf(&mut self, id: StemId, leaf: LeafId) -> bool {
        let Some(stem) = self.get_mut(id) else {
            return false;
        };
        let before = stem.leaves.len();
        stem.leaves.retain(|l| l.id != leaf);
        stem.leaves.len() != before
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn add_leaf_mesh(&mut self, mesh: LeafMesh) -> MeshId {
        self.leaf_meshes.push(mesh);
        self.leaf_meshes.len() - 1
    }

    pub fn leaf_mesh(&self, id: MeshId) -> Option<&LeafMesh> {
        self.leaf_meshes.get(id)
    }

    pub fn leaf_meshes(&self) -> &[LeafMesh] {
        &self.leaf_meshes
    }

    fn alloc(&mut self, stem: Stem) -> StemId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.stem = Some(stem);
            StemId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                stem: Some(stem),
            });
            StemId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    fn unlink(&mut self, id: StemId) -> Result<(), Error> {
        let (parent, prev, next) = {
            let stem = self.stem(id)?;
            (stem.parent, stem.prev_sibling, stem.next_sibling)
        };
        if let Some(prev) = prev {
            self.stem_mut(prev)?.next_sibling = next;
        }
        if let Some(next) = next {
            self.stem_mut(next)?.prev_sibling = prev;
        }
        if let Some(parent) = parent {
            if self.stem(parent)?.child == Some(id) {
                self.stem_mut(parent)?.child = next;
            }
        }
        let stem = self.stem_mut(id)?;
        stem.parent = None;
        stem.prev_sibling = None;
        stem.next_sibling = None;
        Ok(())
    }

    fn free_subtree(&mut self, id: StemId) {
        let mut child = self.get(id).and_then(|s| s.child);
        while let Some(c) = child {
            let next = self.get(c).and_then(|s| s.next_sibling);
            self.free_subtree(c);
            child = next;
        }
        let slot = &mut self.slots[id.index as usize];
        slot.stem = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
    }
}
