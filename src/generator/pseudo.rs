//! Pseudo generator: grows a plant from a derivation tree
//!
//! Lateral stems are spaced by the inverse density, scaled by the density
//! curve along the parent; branches below the radius threshold are culled.
//! Paths are jittered straight lines, so the result reads as a plant
//! without any physical simulation. Deterministic for a fixed seed.

use std::f32::consts::PI;

use glam::{Quat, Vec2, Vec3};

use crate::core::Error;
use crate::curve::{Degree, Spline};
use crate::math::rng::SimpleRng;
use crate::params::{Derivation, DerivationTree, LeafArrangement};
use crate::path::Path;
use crate::plant::{Leaf, Plant, StemId};

const ROOT_RADIUS: f32 = 0.2;
const ROOT_MIN_RADIUS: f32 = 0.01;
const SWELLING: Vec2 = Vec2::new(1.5, 3.0);

/// Grows plants from `DerivationTree` levels.
pub struct PseudoGenerator {
    derivation: DerivationTree,
}

impl PseudoGenerator {
    pub fn new(derivation: DerivationTree) -> Self {
        Self { derivation }
    }

    pub fn derivation(&self) -> &DerivationTree {
        &self.derivation
    }

    pub fn set_derivation(&mut self, derivation: DerivationTree) {
        self.derivation = derivation;
    }

    /// Replace the plant's contents with a freshly grown tree.
    pub fn grow(&self, plant: &mut Plant) -> Result<StemId, Error> {
        let root = plant.create_root();
        let mut rng = SimpleRng::new(self.derivation.seed());
        let level = self.level(0);

        self.set_stem_path(
            plant,
            root,
            Vec3::Y,
            ROOT_RADIUS,
            ROOT_MIN_RADIUS,
            level.length_factor,
            &mut rng,
        )?;
        self.add_lateral_stems(plant, root, 0, &mut rng)?;

        log::debug!("grew {} stems", plant.stem_count());
        Ok(root)
    }

    /// Regrow the lateral stems of one existing stem.
    pub fn grow_laterals(&self, plant: &mut Plant, stem: StemId) -> Result<(), Error> {
        let depth = plant.get(stem).ok_or(Error::StaleStem)?.depth();
        let mut rng = SimpleRng::new(self.derivation.seed());
        self.add_lateral_stems(plant, stem, depth, &mut rng)
    }

    fn level(&self, depth: u32) -> Derivation {
        self.derivation.level(depth).cloned().unwrap_or_default()
    }

    fn add_lateral_stems(
        &self,
        plant: &mut Plant,
        parent: StemId,
        depth: u32,
        rng: &mut SimpleRng,
    ) -> Result<(), Error> {
        let dvn = self.level(depth);
        if dvn.stem_density == 0.0 {
            return Ok(());
        }

        let length = plant.get(parent).ok_or(Error::StaleStem)?.path().length();
        let spacing = 1.0 / dvn.stem_density;
        let mut position = dvn.stem_start;

        while position < length {
            let t = position / length;
            let fraction = dvn.stem_density_curve.get_point(t).z;
            if fraction == 0.0 {
                break;
            }
            self.add_lateral_stem(plant, parent, position, depth, &dvn, rng)?;
            position += spacing / fraction;
        }
        Ok(())
    }

    fn add_lateral_stem(
        &self,
        plant: &mut Plant,
        parent: StemId,
        position: f32,
        depth: u32,
        dvn: &Derivation,
        rng: &mut SimpleRng,
    ) -> Result<(), Error> {
        let radius = {
            let path = plant.get(parent).ok_or(Error::StaleStem)?.path();
            let parent_radius = path.get_intermediate_radius(position / path.length());
            parent_radius / (SWELLING.x + 0.1)
        };
        if radius < dvn.radius_threshold {
            return Ok(());
        }
        let min_radius = (radius / 5.0).clamp(0.001, 0.01);

        let stem = plant.add_stem(parent)?;
        if let Some(s) = plant.get_mut(stem) {
            s.set_swelling(SWELLING);
        }
        plant.set_position(stem, position)?;

        let direction = self.stem_direction(plant, stem, rng)?;
        self.set_stem_path(
            plant,
            stem,
            direction,
            radius,
            min_radius,
            dvn.length_factor,
            rng,
        )?;
        self.add_leaves(plant, stem, dvn)?;

        if self.derivation.level(depth + 1).is_some() {
            self.add_lateral_stems(plant, stem, depth + 1, rng)?;
        }
        Ok(())
    }

    /// Pick a growth direction: tilt away from the parent axis, more so
    /// near the tip, and spin randomly around it.
    fn stem_direction(
        &self,
        plant: &Plant,
        stem: StemId,
        rng: &mut SimpleRng,
    ) -> Result<Vec3, Error> {
        let stem_ref = plant.get(stem).ok_or(Error::StaleStem)?;
        let parent = plant
            .get(stem_ref.parent().ok_or(Error::StaleStem)?)
            .ok_or(Error::StaleStem)?;
        let path = parent.path();
        let position = stem_ref.position();
        let ratio = position / path.length();
        let parent_direction = path.get_intermediate_direction(position);

        let angle_x = PI * (0.1 + 0.4 * (1.0 - ratio));
        let angle_y = rng.range(0.0, 2.0 * PI);
        let local = Quat::from_rotation_y(angle_y) * (Quat::from_rotation_x(angle_x) * Vec3::Y);
        let align = match parent_direction.try_normalize() {
            Some(direction) => Quat::from_rotation_arc(Vec3::Y, direction),
            None => Quat::IDENTITY,
        };
        Ok(align * local)
    }

    /// Build a jittered, linear-spline path of `radius * length_factor`
    /// world units and hand it to the stem.
    fn set_stem_path(
        &self,
        plant: &mut Plant,
        stem: StemId,
        direction: Vec3,
        radius: f32,
        min_radius: f32,
        length_factor: f32,
        rng: &mut SimpleRng,
    ) -> Result<(), Error> {
        let length = radius * length_factor;
        let points = (length / 2.0) as usize + 1;
        let increment = length / points as f32;

        let mut direction = direction;
        let mut control = Vec3::ZERO;
        let mut controls = vec![control];
        control += radius * 5.0 * direction;
        controls.push(control);

        for _ in 0..points {
            control += increment * direction;
            direction.x += rng.range(-0.05, 0.05);
            direction.y += rng.range(-0.05, 0.05);
            direction.z += rng.range(-0.05, 0.05);
            direction = direction.try_normalize().unwrap_or(Vec3::Y);
            controls.push(control);
        }

        let mut spline = Spline::new(Degree::Linear);
        spline.set_controls(controls);

        let mut path = Path::new();
        path.set_resolution(1);
        path.profile_mut().max = radius;
        path.profile_mut().min = min_radius;
        path.set_spline(spline);
        plant.set_path(stem, path)
    }

    fn add_leaves(&self, plant: &mut Plant, stem: StemId, dvn: &Derivation) -> Result<(), Error> {
        if dvn.leaf_density <= 0.0 {
            return Ok(());
        }

        let length = plant.get(stem).ok_or(Error::StaleStem)?.path().length();
        let spacing = 1.0 / dvn.leaf_density;
        let mut position = dvn.leaf_start;
        let mut rotation = Quat::IDENTITY;
        let whorl = Quat::from_axis_angle(Vec3::X, 2.0 * PI / 3.0);

        while position < length {
            let t = position / length;
            let fraction = dvn.leaf_density_curve.get_point(t).z;
            if fraction == 0.0 {
                break;
            }

            match dvn.arrangement {
                LeafArrangement::Alternate => {
                    self.add_leaf(plant, stem, position, rotation, dvn)?;
                    rotation = alternate(rotation);
                }
                LeafArrangement::Opposite => {
                    self.add_leaf(plant, stem, position, rotation, dvn)?;
                    rotation = alternate(rotation);
                    self.add_leaf(plant, stem, position, rotation, dvn)?;
                    rotation = alternate(rotation);
                }
                LeafArrangement::Whorled => {
                    rotation = Quat::from_xyzw(1.0, 0.0, 0.0, 0.0);
                    for _ in 0..3 {
                        self.add_leaf(plant, stem, position, rotation, dvn)?;
                        rotation *= whorl;
                    }
                }
            }
            position += spacing / fraction;
        }
        Ok(())
    }

    fn add_leaf(
        &self,
        plant: &mut Plant,
        stem: StemId,
        position: f32,
        rotation: Quat,
        dvn: &Derivation,
    ) -> Result<(), Error> {
        let mut leaf = Leaf::new();
        leaf.position = position;
        leaf.scale = dvn.leaf_scale;
        leaf.rotation = rotation;
        plant.add_leaf(stem, leaf)?;
        Ok(())
    }
}

/// Flip a leaf to the other side of the stem.
fn alternate(prev: Quat) -> Quat {
    if prev.w == 1.0 {
        Quat::from_xyzw(0.0, 1.0, 0.0, 0.0)
    } else {
        Quat::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_derivation(seed: u64) -> DerivationTree {
        let mut derivation = DerivationTree::with_levels(2);
        derivation.set_seed(seed);
        {
            let data = derivation.tree_mut().data_mut("1").unwrap();
            data.stem_density = 1.0;
            data.stem_start = 0.5;
            data.length_factor = 60.0;
            data.leaf_density = 2.0;
        }
        {
            let data = derivation.tree_mut().data_mut("1.1").unwrap();
            data.stem_density = 0.5;
            data.length_factor = 40.0;
        }
        derivation
    }

    #[test]
    fn test_grow_produces_branches() {
        let mut plant = Plant::new();
        let generator = PseudoGenerator::new(test_derivation(42));
        let root = generator.grow(&mut plant).unwrap();

        assert_eq!(plant.root(), Some(root));
        assert!(plant.stem_count() > 1);
        // The root path exists and has usable length.
        assert!(plant.get(root).unwrap().path().length() > 1.0);

        // Children sit inside the parent's length and know their location.
        let mut child = plant.get(root).unwrap().child();
        assert!(child.is_some());
        while let Some(c) = child {
            let stem = plant.get(c).unwrap();
            assert!(stem.position() >= 0.0);
            assert!(stem.position() <= plant.get(root).unwrap().path().length());
            assert!(!stem.location().x.is_nan());
            child = stem.sibling();
        }
    }

    #[test]
    fn test_grow_is_deterministic() {
        let generator = PseudoGenerator::new(test_derivation(7));

        let mut first = Plant::new();
        generator.grow(&mut first).unwrap();
        let mut second = Plant::new();
        generator.grow(&mut second).unwrap();

        assert_eq!(first.stem_count(), second.stem_count());
        let a = first.subtree(first.root().unwrap());
        let b = second.subtree(second.root().unwrap());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(first.get(*x).unwrap(), second.get(*y).unwrap());
        }
    }

    #[test]
    fn test_seed_changes_tree() {
        let mut a = Plant::new();
        PseudoGenerator::new(test_derivation(1)).grow(&mut a).unwrap();
        let mut b = Plant::new();
        PseudoGenerator::new(test_derivation(2)).grow(&mut b).unwrap();

        let ra = a.root().unwrap();
        let rb = b.root().unwrap();
        // Same structure parameters, different jitter.
        let pa = a.get(a.get(ra).unwrap().child().unwrap()).unwrap().path().clone();
        let pb = b.get(b.get(rb).unwrap().child().unwrap()).unwrap().path().clone();
        assert_ne!(pa, pb);
    }

    #[test]
    fn test_zero_density_grows_bare_trunk() {
        let mut derivation = DerivationTree::with_levels(1);
        derivation.tree_mut().data_mut("1").unwrap().length_factor = 60.0;
        let mut plant = Plant::new();
        PseudoGenerator::new(derivation).grow(&mut plant).unwrap();
        assert_eq!(plant.stem_count(), 1);
    }

    #[test]
    fn test_radius_threshold_culls_branches() {
        let mut derivation = test_derivation(3);
        derivation
            .tree_mut()
            .data_mut("1")
            .unwrap()
            .radius_threshold = 10.0;
        let mut plant = Plant::new();
        PseudoGenerator::new(derivation).grow(&mut plant).unwrap();
        assert_eq!(plant.stem_count(), 1);
    }

    #[test]
    fn test_leaves_attached_with_density() {
        let mut plant = Plant::new();
        let generator = PseudoGenerator::new(test_derivation(42));
        let root = generator.grow(&mut plant).unwrap();

        let mut leaves = 0;
        for id in plant.subtree(root) {
            leaves += plant.get(id).unwrap().leaf_count();
        }
        assert!(leaves > 0);

        // Leaf ids are unique across the whole plant.
        let mut ids: Vec<_> = plant
            .subtree(root)
            .iter()
            .flat_map(|id| plant.get(*id).unwrap().leaves())
            .map(|leaf| leaf.id())
            .collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_second_level_uses_own_parameters() {
        let mut plant = Plant::new();
        let generator = PseudoGenerator::new(test_derivation(42));
        let root = generator.grow(&mut plant).unwrap();

        let depths: Vec<u32> = plant
            .subtree(root)
            .iter()
            .map(|id| plant.get(*id).unwrap().depth())
            .collect();
        // Two derivation levels bound the tree to depth 2.
        assert!(depths.iter().any(|&d| d == 1));
        assert!(depths.iter().all(|d| *d <= 2));
    }
}
