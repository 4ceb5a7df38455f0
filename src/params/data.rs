//! Stem and leaf generation parameters
//!
//! One `StemData` per branching level describes how a generator populates
//! that level: spacing along the parent (density and its curve), branch
//! length and radius, angular variation, and the nested leaf parameters.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::curve::{Preset, Spline};

/// Leaf placement parameters for one branching level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafData {
    pub density_curve: Spline,
    pub scale: Vec3,
    pub density: f32,
    /// Distance along the stem before the first leaf.
    pub distance: f32,
    pub rotation: f32,
    pub min_up: f32,
    pub max_up: f32,
    pub local_up: f32,
    pub global_up: f32,
    pub min_forward: f32,
    pub max_forward: f32,
    pub gravity: f32,
    pub leaves_per_node: u32,
}

impl Default for LeafData {
    fn default() -> Self {
        Self {
            density_curve: Spline::preset(Preset::Flat),
            scale: Vec3::ONE,
            density: 0.0,
            distance: 2.0,
            rotation: std::f32::consts::PI,
            min_up: 0.0,
            max_up: 1.0,
            local_up: 1.0,
            global_up: 1.0,
            min_forward: 0.0,
            max_forward: 1.0,
            gravity: 0.0,
            leaves_per_node: 1,
        }
    }
}

/// Stem generation parameters for one branching level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StemData {
    pub density_curve: Spline,
    pub incline_curve: Spline,
    pub length_curve: Spline,
    pub density: f32,
    /// Distance along the parent before the first stem.
    pub distance: f32,
    pub length: f32,
    pub angle_variation: f32,
    /// Stems are not generated below this parent radius.
    pub radius_threshold: f32,
    pub incline_variation: f32,
    pub radius_variation: f32,
    pub point_density: f32,
    pub gravity: f32,
    pub radius: f32,
    pub fork: f32,
    pub fork_angle: f32,
    pub fork_scale: f32,
    pub noise: f32,
    pub max_depth: u32,
    pub seed: i32,
    pub leaf: LeafData,
}

impl Default for StemData {
    fn default() -> Self {
        Self {
            density_curve: Spline::preset(Preset::Flat),
            incline_curve: Spline::preset(Preset::Flat),
            length_curve: Spline::preset(Preset::Flat),
            density: 0.0,
            distance: 0.0,
            length: 60.0,
            angle_variation: 0.5,
            radius_threshold: 0.01,
            incline_variation: 0.0,
            radius_variation: 0.1,
            point_density: 1.0,
            gravity: 0.1,
            radius: 1.0,
            fork: 0.0,
            fork_angle: 0.5,
            fork_scale: 1.0,
            noise: 0.05,
            max_depth: 1,
            seed: 0,
            leaf: LeafData::default(),
        }
    }
}
