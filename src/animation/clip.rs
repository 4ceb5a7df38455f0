//! Keyframe storage and pose blending
//!
//! The wind pass fills one keyframe track per joint. `frame_at` blends
//! two neighboring frames and composes the result down the joint
//! hierarchy, visiting parents strictly before children.

use glam::{Quat, Vec3};

use crate::plant::{Plant, StemId};

/// One stored pose of a joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyFrame {
    pub rotation: Quat,
    /// Offset from the parent joint.
    pub translation: Vec3,
    /// World-space translation accumulated during blending.
    pub final_translation: Vec3,
}

impl Default for KeyFrame {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
            final_translation: Vec3::ZERO,
        }
    }
}

/// Keyframe tracks indexed by joint id, then frame index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animation {
    /// Ticks between stored frames.
    pub time_step: u32,
    pub frames: Vec<Vec<KeyFrame>>,
}

impl Animation {
    pub fn joint_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.first().map(|track| track.len()).unwrap_or(0)
    }

    /// Total animation length in ticks.
    pub fn duration(&self) -> u32 {
        self.frame_count().saturating_sub(1) as u32 * self.time_step
    }

    /// Blend a pose for an arbitrary tick.
    ///
    /// Interpolates between the two frames bracketing `ticks` and composes
    /// each joint with its already-blended parent. Ticks at or past the
    /// end clamp to the last stored frame.
    pub fn frame_at(&self, ticks: u32, plant: &Plant, stem: StemId) -> Vec<KeyFrame> {
        let mut mixed = vec![KeyFrame::default(); self.frames.len()];
        if self.frames.is_empty() || self.time_step == 0 {
            return mixed;
        }
        let last = self.frame_count().saturating_sub(1);
        let index1 = ((ticks / self.time_step) as usize).min(last);
        let index2 = (index1 + 1).min(last);
        let t = (ticks % self.time_step) as f32 / self.time_step as f32;
        self.blend(t, index1, index2, plant, stem, &mut mixed);
        mixed
    }

    fn blend(
        &self,
        t: f32,
        index1: usize,
        index2: usize,
        plant: &Plant,
        id: StemId,
        mixed: &mut [KeyFrame],
    ) {
        let Some(stem) = plant.get(id) else {
            return;
        };
        for joint in stem.joints() {
            let index = joint.id() as usize;
            let frame1 = self.frames[index][index1];
            let frame2 = self.frames[index][index2];
            let rotation = frame1.rotation.lerp(frame2.rotation, t);

            if joint.id() > 0 {
                let prev = mixed[joint.parent_id() as usize];
                mixed[index] = KeyFrame {
                    rotation: rotation * prev.rotation,
                    translation: prev.translation + frame1.translation,
                    final_translation: prev.final_translation
                        + prev.rotation * frame1.translation,
                };
            } else {
                mixed[index] = KeyFrame {
                    rotation,
                    translation: frame1.translation,
                    final_translation: frame1.translation,
                };
            }
        }

        let mut child = stem.child();
        while let Some(c) = child {
            self.blend(t, index1, index2, plant, c, mixed);
            child = plant.get(c).and_then(|s| s.sibling());
        }
    }
}
