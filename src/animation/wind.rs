//! Wind skeleton generation
//!
//! Walks a finished stem tree, attaches one joint per spline anchor, and
//! fills keyframe tracks with sinusoidal sway. Joint ids increase in
//! pre-order across the whole tree; each stem chains its joints along its
//! own spline and hands the last assigned id to qualifying children.

use std::f32::consts::PI;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::rng::SimpleRng;
use crate::plant::{Plant, StemId};

use super::clip::{Animation, KeyFrame};
use super::joint::{Joint, NO_PARENT};

fn rotate_into(from: Vec3, to: Vec3) -> Quat {
    match to.try_normalize() {
        Some(to) => Quat::from_rotation_arc(from, to),
        None => Quat::IDENTITY,
    }
}

/// Wind model settings and the joint/keyframe generation pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    direction: Vec3,
    speed: f32,
    seed: u64,
    /// Ticks between stored frames.
    time_step: u32,
    frame_count: usize,
}

impl Default for Wind {
    fn default() -> Self {
        Self {
            direction: Vec3::new(1.0, 0.0, 0.0),
            speed: 1.0,
            seed: 0,
            time_step: 30,
            frame_count: 21,
        }
    }
}

impl Wind {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn set_frame_count(&mut self, count: usize) {
        self.frame_count = count;
    }

    pub fn time_step(&self) -> u32 {
        self.time_step
    }

    pub fn set_time_step(&mut self, step: u32) {
        self.time_step = step;
    }

    /// Total animation length in ticks.
    pub fn duration(&self) -> u32 {
        (self.frame_count as u32).saturating_sub(1) * self.time_step
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
    }

    /// Rebuild the joint skeleton for the whole plant and produce its
    /// keyframe tracks. Yields an empty animation for a rootless plant or
    /// a non-positive wind speed.
    pub fn generate(&self, plant: &mut Plant) -> Animation {
        let mut animation = Animation {
            time_step: self.time_step,
            frames: Vec::new(),
        };
        let Some(root) = plant.root() else {
            return animation;
        };
        if self.speed <= 0.0 {
            return animation;
        }

        for id in plant.subtree(root) {
            if let Some(stem) = plant.get_mut(id) {
                stem.clear_joints();
            }
        }

        let mut count = 0;
        self.generate_joints(plant, root, -1, NO_PARENT, &mut count);
        log::debug!("wind skeleton: {} joints", count);

        animation.frames = vec![vec![KeyFrame::default(); self.frame_count]; count];
        let mut rng = SimpleRng::new(self.seed);
        let root_location = plant.get(root).map(|s| s.location()).unwrap_or(Vec3::ZERO);
        self.transform_joints(plant, root, root_location, &mut rng, &mut animation);
        animation
    }

    /// Assign joints at the stem's spline anchors, then descend into
    /// children that attach within the distance covered so far.
    fn generate_joints(
        &self,
        plant: &mut Plant,
        id: StemId,
        mut joint_id: i32,
        mut parent_id: i32,
        count: &mut usize,
    ) -> i32 {
        let Some((step, control_count, attached)) = plant.get(id).map(|stem| {
            let spline = stem.path().spline();
            (
                spline.degree().step(),
                spline.control_count(),
                stem.parent().is_some(),
            )
        }) else {
            return joint_id;
        };

        let mut distance = 0.0;
        // The first control of an attached stem duplicates the attachment
        // point on the parent and gets no joint of its own.
        let mut i = if attached { step } else { 0 };
        while i + 1 < control_count {
            let Some((start, segment)) = plant.get(id).map(|stem| {
                let path = stem.path();
                let start = path.sample_index(i);
                let end = path.sample_index(i + step);
                (start, path.distance_between(start, end))
            }) else {
                return joint_id;
            };
            distance += segment;

            joint_id += 1;
            if let Some(stem) = plant.get_mut(id) {
                stem.add_joint(Joint::new(joint_id, parent_id, start));
            }
            parent_id = joint_id;
            *count += 1;

            let mut child = plant.get(id).and_then(|s| s.child());
            while let Some(c) = child {
                let (position, needs_joints) = match plant.get(c) {
                    Some(stem) => (stem.position(), !stem.has_joints()),
                    None => (0.0, false),
                };
                if position < distance && needs_joints {
                    joint_id = self.generate_joints(plant, c, joint_id, parent_id, count);
                }
                child = plant.get(c).and_then(|s| s.sibling());
            }

            i += step;
        }
        joint_id
    }

    fn transform_joints(
        &self,
        plant: &mut Plant,
        id: StemId,
        mut prev_location: Vec3,
        rng: &mut SimpleRng,
        animation: &mut Animation,
    ) {
        let Some((joints, stem_location, attached)) = plant
            .get(id)
            .map(|stem| (stem.joints().to_vec(), stem.location(), stem.parent().is_some()))
        else {
            return;
        };

        for (i, joint) in joints.iter().enumerate() {
            let index = joint.path_index();
            let Some((location, direction, segment, radius)) = plant.get(id).map(|stem| {
                let path = stem.path();
                let segment = if index > 0 {
                    path.distance_between(index - 1, index)
                } else {
                    0.0
                };
                (
                    stem_location + path.get(index),
                    path.get_direction(index),
                    segment,
                    path.get_radius(index),
                )
            }) else {
                return;
            };

            if i > 0 {
                self.set_rotation(joint.id(), segment, radius, direction, rng, animation);
            } else {
                self.set_no_rotation(joint.id(), animation);
            }

            if i > 0 || attached {
                self.set_translation(joint.id(), location, prev_location, animation);
            } else {
                self.set_root_translation(stem_location, animation);
            }

            if let Some(stem) = plant.get_mut(id) {
                if let Some(stored) = stem.joints_mut().get_mut(i) {
                    stored.update_location(location);
                }
            }

            let mut child = plant.get(id).and_then(|s| s.child());
            while let Some(c) = child {
                let first = plant.get(c).and_then(|s| s.joints().first().copied());
                if let Some(first) = first {
                    if first.parent_id() == joint.id() {
                        self.transform_joints(plant, c, location, rng, animation);
                    }
                }
                child = plant.get(c).and_then(|s| s.sibling());
            }

            prev_location = location;
        }
    }

    /// Two phase-shifted waves sway the joint toward the wind direction
    /// and its orthogonal, scaled by segment length and damped by the
    /// squared radius.
    fn set_rotation(
        &self,
        joint: i32,
        distance: f32,
        radius: f32,
        direction: Vec3,
        rng: &mut SimpleRng,
        animation: &mut Animation,
    ) {
        let resistance = (radius + 1.0) * (radius + 1.0);
        let intensity = 0.1 * (distance * self.speed) / resistance;
        let orthogonal = self.direction.cross(direction);
        let offset = rng.range(0.0, PI);

        for i in 0..self.frame_count {
            let x = i as f32 * 2.0 * PI / (self.frame_count - 1) as f32 + offset;

            let wave = x.sin() * (2.0 * x + PI * 0.25).cos();
            let movement = direction.lerp(self.direction, intensity * wave);
            let mut rotation = rotate_into(direction, movement);

            let wave = (x + PI * 0.5).sin() * (2.0 * x + PI * 0.25).cos();
            let movement = direction.lerp(orthogonal, intensity * wave);
            rotation *= rotate_into(direction, movement);

            animation.frames[joint as usize][i].rotation = rotation;
        }
    }

    fn set_no_rotation(&self, joint: i32, animation: &mut Animation) {
        for frame in &mut animation.frames[joint as usize] {
            frame.rotation = Quat::IDENTITY;
        }
    }

    fn set_translation(&self, joint: i32, point: Vec3, origin: Vec3, animation: &mut Animation) {
        for frame in &mut animation.frames[joint as usize] {
            frame.translation = point - origin;
        }
    }

    fn set_root_translation(&self, location: Vec3, animation: &mut Animation) {
        for frame in &mut animation.frames[0] {
            frame.translation = location;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Degree, Spline};
    use crate::path::Path;

    fn bent_path(length: f32, segments: usize) -> Path {
        let mut spline = Spline::new(Degree::Cubic);
        spline.add_control(Vec3::ZERO);
        for i in 0..segments {
            let y = length * (i + 1) as f32 / segments as f32;
            let x = 0.1 * (i + 1) as f32;
            spline.add_control(Vec3::new(x, y - 0.2, 0.0));
            spline.add_control(Vec3::new(x, y - 0.1, 0.0));
            spline.add_control(Vec3::new(x, y, 0.0));
        }
        let mut path = Path::new();
        path.set_spline(spline);
        path
    }

    fn single_stem_plant() -> (Plant, StemId) {
        let mut plant = Plant::new();
        let root = plant.create_root();
        plant.set_path(root, bent_path(4.0, 4)).unwrap();
        (plant, root)
    }

    fn branched_plant() -> (Plant, StemId) {
        let (mut plant, root) = single_stem_plant();
        for position in [0.5, 1.5, 3.0] {
            let stem = plant.add_stem(root).unwrap();
            plant.set_path(stem, bent_path(2.0, 2)).unwrap();
            plant.set_position(stem, position).unwrap();
        }
        (plant, root)
    }

    #[test]
    fn test_joints_at_anchors() {
        let (mut plant, root) = single_stem_plant();
        let wind = Wind::new();
        let animation = wind.generate(&mut plant);

        let joints = plant.get(root).unwrap().joints();
        // One joint per anchor except the final endpoint.
        assert_eq!(joints.len(), 4);
        assert_eq!(animation.joint_count(), 4);
        assert_eq!(joints[0].id(), 0);
        assert_eq!(joints[0].parent_id(), NO_PARENT);
        for pair in joints.windows(2) {
            assert_eq!(pair[1].parent_id(), pair[0].id());
        }
    }

    #[test]
    fn test_ids_increase_in_preorder() {
        let (mut plant, _root) = branched_plant();
        let wind = Wind::new();
        let animation = wind.generate(&mut plant);

        let joints = plant.flattened_joints();
        assert_eq!(joints.len(), animation.joint_count());

        let mut ids: Vec<i32> = joints.iter().map(|j| j.id()).collect();
        ids.sort();
        let expected: Vec<i32> = (0..joints.len() as i32).collect();
        assert_eq!(ids, expected);

        for joint in &joints {
            if joint.parent_id() != NO_PARENT {
                assert!(joint.parent_id() < joint.id());
            }
        }
        // Exactly one root joint.
        let roots = joints.iter().filter(|j| j.parent_id() == NO_PARENT).count();
        assert_eq!(roots, 1);
    }

    #[test]
    fn test_joint_path_indices_and_locations() {
        let (mut plant, root) = branched_plant();
        let wind = Wind::new();
        wind.generate(&mut plant);

        for id in plant.subtree(root) {
            let stem = plant.get(id).unwrap();
            for joint in stem.joints() {
                assert!(joint.path_index() < stem.path().sample_count());
                let expected = stem.location() + stem.path().get(joint.path_index());
                assert!((joint.location() - expected).length() < 1e-5);
            }
        }
    }

    #[test]
    fn test_attached_stems_skip_first_control() {
        let (mut plant, root) = branched_plant();
        let wind = Wind::new();
        wind.generate(&mut plant);

        let mut child = plant.get(root).unwrap().child();
        while let Some(c) = child {
            let stem = plant.get(c).unwrap();
            // The child's first joint does not sit on its first sample.
            if let Some(first) = stem.joints().first() {
                assert!(first.path_index() > 0);
            }
            child = stem.sibling();
        }
    }

    #[test]
    fn test_regeneration_is_stable() {
        let (mut plant, _) = branched_plant();
        let wind = Wind::new();
        let first = wind.generate(&mut plant);
        let second = wind.generate(&mut plant);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_speed_yields_empty_animation() {
        let (mut plant, root) = single_stem_plant();
        let mut wind = Wind::new();
        wind.set_speed(0.0);
        let animation = wind.generate(&mut plant);
        assert_eq!(animation.joint_count(), 0);
        assert!(plant.get(root).unwrap().joints().is_empty());
    }

    #[test]
    fn test_root_joint_has_identity_rotation() {
        let (mut plant, _) = single_stem_plant();
        let wind = Wind::new();
        let animation = wind.generate(&mut plant);
        for frame in &animation.frames[0] {
            assert_eq!(frame.rotation, Quat::IDENTITY);
        }
    }

    #[test]
    fn test_frame_count_and_duration() {
        let (mut plant, _) = single_stem_plant();
        let mut wind = Wind::new();
        wind.set_frame_count(11);
        wind.set_time_step(20);
        assert_eq!(wind.duration(), 200);
        let animation = wind.generate(&mut plant);
        assert_eq!(animation.frame_count(), 11);
        assert_eq!(animation.time_step, 20);
    }

    #[test]
    fn test_blend_of_generated_animation() {
        let (mut plant, root) = single_stem_plant();
        let wind = Wind::new();
        let animation = wind.generate(&mut plant);
        let pose = animation.frame_at(0, &plant, root);
        assert_eq!(pose.len(), animation.joint_count());
        // Root pose reproduces the stored frame at tick zero.
        assert_eq!(pose[0].rotation, animation.frames[0][0].rotation);
        assert_eq!(pose[0].translation, animation.frames[0][0].translation);
    }
}
