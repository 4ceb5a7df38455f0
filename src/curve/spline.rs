//! Piecewise Bezier spline with curve-editing operations
//!
//! A spline is an ordered list of control points interpreted as chained
//! Bezier segments that share endpoints. Cubic splines alternate anchors
//! (`index % 3 == 0`) with pairs of tangent handles. Profile curves reuse
//! the same type with `x` as the parameter and `z` as the value.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::bezier;

/// Segment degree of a spline. Only linear and cubic splines are produced
/// by the editing operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Degree {
    Linear,
    #[default]
    Cubic,
}

impl Degree {
    /// Control-point stride between segment start points.
    pub fn step(self) -> usize {
        match self {
            Degree::Linear => 1,
            Degree::Cubic => 3,
        }
    }
}

/// Built-in profile curve presets for radius and density curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    /// Cubic taper with a fat base, used for radius profiles.
    Bulge,
    /// Constant 1.0, used for density profiles.
    Flat,
}

/// A piecewise Bezier curve of degree 1 or 3.
///
/// Invariant: `(control_count - 1) % degree.step() == 0` whenever the
/// spline is non-empty. Index arguments to the editing operations must be
/// valid for the current control list; malformed indices are caller bugs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    controls: Vec<Vec3>,
    degree: Degree,
}

fn normalize_or_z(v: Vec3) -> Vec3 {
    v.try_normalize().unwrap_or(Vec3::Z)
}

impl Spline {
    pub fn new(degree: Degree) -> Self {
        Self {
            controls: Vec::new(),
            degree,
        }
    }

    /// Build one of the fixed profile presets.
    pub fn preset(preset: Preset) -> Self {
        let mut spline = Spline::default();
        spline.set_default(preset);
        spline
    }

    /// Replace the controls with a built-in profile preset.
    pub fn set_default(&mut self, preset: Preset) {
        match preset {
            Preset::Bulge => {
                self.degree = Degree::Cubic;
                self.controls = vec![
                    Vec3::new(0.0, 0.0, 1.0),
                    Vec3::new(0.25, 0.0, 1.0),
                    Vec3::new(0.75, 0.0, 0.25),
                    Vec3::new(1.0, 0.0, 0.0),
                ];
            }
            Preset::Flat => {
                self.degree = Degree::Linear;
                self.controls = vec![Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 1.0)];
            }
        }
    }

    pub fn degree(&self) -> Degree {
        self.degree
    }

    pub fn set_degree(&mut self, degree: Degree) {
        self.degree = degree;
    }

    pub fn controls(&self) -> &[Vec3] {
        &self.controls
    }

    pub fn set_controls(&mut self, controls: Vec<Vec3>) {
        self.controls = controls;
    }

    pub fn add_control(&mut self, point: Vec3) {
        self.controls.push(point);
    }

    pub fn control_count(&self) -> usize {
        self.controls.len()
    }

    /// Number of Bezier segments.
    pub fn curve_count(&self) -> usize {
        if self.controls.is_empty() {
            0
        } else {
            (self.controls.len() - 1) / self.degree.step()
        }
    }

    /// Evaluate a profile curve at parameter `t`.
    ///
    /// Locates the segment whose anchors bracket `t` on the x axis (profile
    /// curves are monotonic in x) and remaps `t` into that segment.
    pub fn get_point(&self, t: f32) -> Vec3 {
        let step = self.degree.step();
        let mut i = 0;
        while i + step < self.controls.len() {
            if self.controls[i].x <= t && self.controls[i + step].x >= t {
                let span = self.controls[i + step].x - self.controls[i].x;
                let local = (t - self.controls[i].x) / span;
                return bezier::bezier(local, &self.controls[i..=i + step]);
            }
            i += step;
        }
        Vec3::ZERO
    }

    /// Evaluate segment `curve` at local parameter `t`.
    pub fn get_curve_point(&self, curve: usize, t: f32) -> Vec3 {
        let step = self.degree.step();
        let index = step * curve;
        bezier::bezier(t, &self.controls[index..=index + step])
    }

    /// Insert a point near `index`, synthesizing tangent handles for cubic
    /// splines so the curve keeps its local tangent. Returns the index of
    /// the new anchor, which becomes the caller's selection point.
    pub fn insert(&mut self, index: usize, point: Vec3) -> usize {
        match self.degree {
            Degree::Linear => {
                self.controls.insert(index + 1, point);
                index + 1
            }
            Degree::Cubic => self.insert_cubic(index, point),
        }
    }

    fn insert_cubic(&mut self, index: usize, point: Vec3) -> usize {
        let controls = &self.controls;
        let mut at = index;
        let center;
        let group;

        match index % 3 {
            // Anchor point.
            0 => {
                if index == controls.len() - 1 {
                    let d = controls[index - 1] - controls[index];
                    group = [-d + point, d + point, point];
                    center = index + 3;
                    at += 1;
                } else {
                    let d1 = controls[index - 1] - controls[index];
                    let d2 = controls[index + 1] - controls[index];
                    group = [d1 + point, point, d2 + point];
                    center = index + 3;
                    at += 2;
                }
            }
            // Outgoing handle of the previous anchor.
            1 => {
                if index == 1 {
                    let d = controls[index] - controls[index - 1];
                    group = [-d + point, point, d + point];
                    center = index + 2;
                    at += 1;
                } else {
                    let d1 = controls[index - 1] - controls[index];
                    let d2 = controls[index - 1] - controls[index - 2];
                    group = [d1 + point, point, d2 + point];
                    center = index + 2;
                    at += 1;
                }
            }
            // Incoming handle of the next anchor.
            _ => {
                if index == controls.len() - 2 {
                    let d = controls[index + 1] - controls[index];
                    group = [-d + point, point, d + point];
                    center = index + 1;
                } else {
                    let d1 = controls[index] - controls[index + 1];
                    let d2 = controls[index + 2] - controls[index + 1];
                    group = [d1 + point, point, d2 + point];
                    center = index + 1;
                }
            }
        }

        self.controls.splice(at..at, group);
        center
    }

    /// Remove the point at `index`; for cubic splines this removes the
    /// whole anchor group the index belongs to. Removing the last segment
    /// of a cubic spline empties it.
    pub fn remove(&mut self, index: usize) {
        match self.degree {
            Degree::Linear => {
                self.controls.remove(index);
            }
            Degree::Cubic => {
                let len = self.controls.len();
                if len == 4 {
                    self.controls.clear();
                } else if index < 2 {
                    self.controls.drain(..3);
                } else if index > len - 3 {
                    self.controls.drain(len - 3..);
                } else {
                    let start = match index % 3 {
                        0 => index - 1,
                        1 => index - 2,
                        _ => index,
                    };
                    self.controls.drain(start..start + 3);
                }
            }
        }
    }

    /// Destructively convert between degrees.
    ///
    /// Cubic to linear keeps only the anchors; the handles are lost by
    /// design. Linear to cubic synthesizes handles at a quarter of the
    /// local segment length along the averaged adjacent directions.
    pub fn adjust(&mut self, degree: Degree) {
        if degree == self.degree {
            return;
        }
        match degree {
            Degree::Linear => {
                self.controls = self.controls.iter().copied().step_by(3).collect();
            }
            Degree::Cubic => self.adjust_to_cubic(),
        }
        self.degree = degree;
    }

    fn adjust_to_cubic(&mut self) {
        {
            let d = self.controls[1] - self.controls[0];
            let t = d.length() / 4.0;
            let point = self.controls[0] + t * normalize_or_z(d);
            self.controls.insert(1, point);
        }

        let mut i = 2;
        while i < self.controls.len() - 1 {
            let d1 = self.controls[i - 2] - self.controls[i];
            let d2 = self.controls[i] - self.controls[i + 1];
            let t1 = d1.length() / 4.0;
            let t2 = -d2.length() / 4.0;
            let direction = normalize_or_z(d1 + d2);

            let incoming = self.controls[i] + t1 * direction;
            let outgoing = self.controls[i] + t2 * direction;
            self.controls.insert(i + 1, outgoing);
            self.controls.insert(i, incoming);
            i += 3;
        }

        {
            let last = self.controls.len() - 1;
            let direction = normalize_or_z(self.controls[last] - self.controls[last - 1]);
            let t = (self.controls[last] - self.controls[last - 2]).length() / 4.0;
            let point = self.controls[last] - t * direction;
            self.controls.insert(last, point);
        }
    }

    /// Move a control point. Moving a cubic anchor rigidly translates its
    /// adjacent handles; moving a handle with `parallel` re-derives the
    /// opposite handle to keep the tangent straight through the anchor.
    pub fn move_point(&mut self, index: usize, location: Vec3, parallel: bool) {
        if self.degree == Degree::Linear {
            self.controls[index] = location;
            return;
        }
        if index % 3 == 0 {
            let delta = location - self.controls[index];
            if index != 0 {
                self.controls[index - 1] += delta;
            }
            if index != self.controls.len() - 1 {
                self.controls[index + 1] += delta;
            }
            self.controls[index] = location;
        } else {
            self.controls[index] = location;
            if parallel {
                self.parallelize(index);
            }
        }
    }

    /// Recompute the handle opposite to `index` so that both handles lie
    /// on one line through their anchor, preserving the opposite handle's
    /// distance. Anchors and linear splines are left untouched.
    pub fn parallelize(&mut self, index: usize) {
        if self.degree == Degree::Linear {
            return;
        }
        match index % 3 {
            1 if index != 1 => {
                let anchor = self.controls[index - 1];
                let mut length = (anchor - self.controls[index - 2]).length();
                if length == 0.0 {
                    length = 1.0;
                }
                let mut d = anchor - self.controls[index];
                if d == Vec3::ZERO {
                    d.z = 1.0;
                }
                self.controls[index - 2] = length * d.normalize() + anchor;
            }
            2 if index != self.controls.len() - 2 => {
                let anchor = self.controls[index + 1];
                let mut length = (self.controls[index + 2] - anchor).length();
                if length == 0.0 {
                    length = 1.0;
                }
                let mut d = anchor - self.controls[index];
                if d == Vec3::ZERO {
                    d.z = 1.0;
                }
                self.controls[index + 2] = length * d.normalize() + anchor;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic_controls() -> Vec<Vec3> {
        vec![
            // Segment 1
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            // Segment 2
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 7.0),
        ]
    }

    fn cubic_spline() -> Spline {
        let mut spline = Spline::new(Degree::Cubic);
        spline.set_controls(cubic_controls());
        spline
    }

    fn anchors(spline: &Spline) -> Vec<Vec3> {
        spline.controls().iter().copied().step_by(3).collect()
    }

    #[test]
    fn test_curve_count() {
        let spline = cubic_spline();
        assert_eq!(spline.curve_count(), 2);
        assert_eq!((spline.control_count() - 1) % 3, 0);

        let empty = Spline::new(Degree::Cubic);
        assert_eq!(empty.curve_count(), 0);
    }

    #[test]
    fn test_to_linear_keeps_anchors() {
        let controls = cubic_controls();
        let mut spline = cubic_spline();
        spline.adjust(Degree::Linear);
        let result = spline.controls();
        assert_eq!(result.len(), 3);
        assert_eq!(result[0], controls[0]);
        assert_eq!(result[1], controls[3]);
        assert_eq!(result[2], controls[6]);
    }

    #[test]
    fn test_degree_round_trip_preserves_anchors() {
        let mut spline = cubic_spline();
        let before = anchors(&spline);
        spline.adjust(Degree::Linear);
        spline.adjust(Degree::Cubic);
        assert_eq!(spline.degree(), Degree::Cubic);
        assert_eq!((spline.control_count() - 1) % 3, 0);
        let after = anchors(&spline);
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((*a - *b).length() < 1e-5);
        }
    }

    #[test]
    fn test_move_anchor_translates_handles() {
        let controls = cubic_controls();
        let mut spline = cubic_spline();
        spline.move_point(3, Vec3::new(7.0, 7.0, 7.0), false);
        let result = spline.controls();
        let delta = Vec3::new(7.0, 7.0, 7.0) - controls[3];
        assert_eq!(result[3], Vec3::new(7.0, 7.0, 7.0));
        assert!((result[2] - (controls[2] + delta)).length() < 1e-6);
        assert!((result[4] - (controls[4] + delta)).length() < 1e-6);
    }

    #[test]
    fn test_move_handle_parallel() {
        let mut spline = cubic_spline();
        spline.move_point(4, Vec3::new(2.0, 2.0, 0.0), true);
        let result = spline.controls();
        assert_eq!(result[4], Vec3::new(2.0, 2.0, 0.0));
        // The opposite handle now lies on the line through the anchor.
        let incoming = (result[3] - result[2]).normalize();
        let outgoing = (result[4] - result[3]).normalize();
        assert!((incoming - outgoing).length() < 1e-5);
    }

    #[test]
    fn test_parallelize_cubic() {
        let mut controls = cubic_controls();
        controls[2] = Vec3::new(1.0, 0.0, 0.0);
        controls[3] = Vec3::new(1.0, 1.0, 0.0);
        controls[4] = Vec3::new(1.0, 2.0, 0.0);

        let mut spline = Spline::new(Degree::Cubic);
        spline.set_controls(controls.clone());
        spline.parallelize(2);

        // Handles were already parallel, so the opposite handle is unmoved.
        let point = spline.controls()[4];
        assert!((point - controls[4]).length() < 1e-6);

        controls[4] = point;
        controls[2].y = -1.0;
        spline.set_controls(controls.clone());
        spline.parallelize(4);

        let point = spline.controls()[2];
        assert!((point - controls[2]).length() < 1e-6);
    }

    #[test]
    fn test_parallelize_linear_is_noop() {
        let controls = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)];
        let mut spline = Spline::new(Degree::Linear);
        spline.set_controls(controls.clone());
        spline.parallelize(0);
        spline.parallelize(1);
        assert_eq!(spline.controls(), controls.as_slice());
    }

    #[test]
    fn test_insert_then_remove_restores_anchors() {
        let mut spline = cubic_spline();
        let before = anchors(&spline);

        let center = spline.insert(3, Vec3::new(1.5, 1.5, 0.0));
        assert_eq!(spline.controls()[center], Vec3::new(1.5, 1.5, 0.0));
        assert_eq!((spline.control_count() - 1) % 3, 0);
        assert_eq!(spline.curve_count(), 3);

        spline.remove(center);
        assert_eq!(anchors(&spline), before);
    }

    #[test]
    fn test_insert_at_last_anchor() {
        let mut spline = cubic_spline();
        let center = spline.insert(6, Vec3::new(2.0, 0.0, 7.0));
        assert_eq!(center, 9);
        assert_eq!(spline.curve_count(), 3);
        assert_eq!(spline.controls()[center], Vec3::new(2.0, 0.0, 7.0));
    }

    #[test]
    fn test_insert_linear() {
        let mut spline = Spline::new(Degree::Linear);
        spline.set_controls(vec![Vec3::ZERO, Vec3::ONE, Vec3::splat(2.0)]);
        let center = spline.insert(0, Vec3::splat(0.5));
        assert_eq!(center, 1);
        assert_eq!(spline.controls()[1], Vec3::splat(0.5));
        assert_eq!(spline.control_count(), 4);
    }

    #[test]
    fn test_remove_single_segment_clears() {
        let mut spline = Spline::new(Degree::Cubic);
        spline.set_controls(cubic_controls()[..4].to_vec());
        spline.remove(3);
        assert_eq!(spline.control_count(), 0);
        assert_eq!(spline.curve_count(), 0);
    }

    #[test]
    fn test_remove_first_group() {
        let mut spline = cubic_spline();
        spline.remove(0);
        assert_eq!(spline.control_count(), 4);
        assert_eq!(spline.controls()[0], cubic_controls()[3]);
    }

    #[test]
    fn test_get_point_profile() {
        let spline = Spline::preset(Preset::Flat);
        assert!((spline.get_point(0.0).z - 1.0).abs() < 1e-6);
        assert!((spline.get_point(0.5).z - 1.0).abs() < 1e-6);
        assert!((spline.get_point(1.0).z - 1.0).abs() < 1e-6);

        let bulge = Spline::preset(Preset::Bulge);
        assert!((bulge.get_point(0.0).z - 1.0).abs() < 1e-6);
        assert!(bulge.get_point(1.0).z.abs() < 1e-6);
        let mid = bulge.get_point(0.5).z;
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_get_curve_point_endpoints() {
        let spline = cubic_spline();
        let controls = cubic_controls();
        assert!((spline.get_curve_point(0, 0.0) - controls[0]).length() < 1e-6);
        assert!((spline.get_curve_point(0, 1.0) - controls[3]).length() < 1e-6);
        assert!((spline.get_curve_point(1, 1.0) - controls[6]).length() < 1e-6);
    }
}
