//! Derivation parameters for the built-in pseudo generator

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::curve::{Preset, Spline};

use super::tree::{NodeId, OverrideTree};

/// How leaves are arranged around a node on the stem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafArrangement {
    #[default]
    Alternate,
    Opposite,
    Whorled,
}

/// Growth parameters for one branching level of the pseudo generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Derivation {
    pub stem_density_curve: Spline,
    pub leaf_density_curve: Spline,
    pub leaf_scale: Vec3,
    pub stem_density: f32,
    pub leaf_density: f32,
    /// Distance along the parent before the first stem.
    pub stem_start: f32,
    /// Distance along the stem before the first leaf.
    pub leaf_start: f32,
    /// Stem length as a multiple of its base radius.
    pub length_factor: f32,
    pub radius_threshold: f32,
    pub leaf_rotation: f32,
    pub min_up: f32,
    pub max_up: f32,
    pub min_direction: f32,
    pub max_direction: f32,
    pub leaves_per_node: u32,
    pub arrangement: LeafArrangement,
}

impl Default for Derivation {
    fn default() -> Self {
        Self {
            stem_density_curve: Spline::preset(Preset::Flat),
            leaf_density_curve: Spline::preset(Preset::Flat),
            leaf_scale: Vec3::ONE,
            stem_density: 0.0,
            leaf_density: 0.0,
            stem_start: 0.0,
            leaf_start: 0.0,
            length_factor: 1.0,
            radius_threshold: 0.0,
            leaf_rotation: 0.0,
            min_up: 0.0,
            max_up: 1.0,
            min_direction: 0.0,
            max_direction: 1.0,
            leaves_per_node: 1,
            arrangement: LeafArrangement::Alternate,
        }
    }
}

/// A dotted-address tree of `Derivation` levels plus the generator seed.
///
/// The first-child chain below the root defines the branching levels the
/// pseudo generator produces; the chain length bounds the recursion depth.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerivationTree {
    seed: u64,
    tree: OverrideTree<Derivation>,
}

impl DerivationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn tree(&self) -> &OverrideTree<Derivation> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut OverrideTree<Derivation> {
        &mut self.tree
    }

    /// Derivation for a branching depth, walking the first-child chain
    /// below the root. Returns `None` past the end of the chain.
    pub fn level(&self, depth: u32) -> Option<&Derivation> {
        let mut node: NodeId = self.tree.first_child(self.tree.root()?)?;
        for _ in 0..depth {
            node = self.tree.first_child(node)?;
        }
        self.tree.node_data(node)
    }

    /// Build a tree with `levels` nested derivation levels.
    pub fn with_levels(levels: u32) -> Self {
        let mut derivation = Self::new();
        derivation.tree.create_root();
        let mut name = String::new();
        for _ in 0..levels {
            if derivation.tree.add_child(&name).is_none() {
                break;
            }
            if name.is_empty() {
                name.push('1');
            } else {
                name.push_str(".1");
            }
        }
        derivation
    }
}
