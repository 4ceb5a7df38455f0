//! Sampled curve paths with radius profiles
//!
//! A `Path` caches a polyline sampled from its spline at a fixed number of
//! samples per segment. Stems attach to a point along their parent path, so
//! paths also answer arc-length queries. The radius profile resolves a
//! per-sample thickness for mesh and wind consumers.

use glam::Vec3;

use crate::curve::{Preset, Spline};

fn normalize_or_z(v: Vec3) -> Vec3 {
    v.try_normalize().unwrap_or(Vec3::Z)
}

/// Thickness profile of a path: a 1D curve scaled by `max` and floored at
/// `min`. The curve's z axis holds the radius fraction.
#[derive(Clone, Debug, PartialEq)]
pub struct RadiusProfile {
    pub curve: Spline,
    pub min: f32,
    pub max: f32,
}

impl Default for RadiusProfile {
    fn default() -> Self {
        Self {
            curve: Spline::preset(Preset::Bulge),
            min: 0.015,
            max: 0.2,
        }
    }
}

/// A spline sampled into a polyline at `resolution` samples per segment.
///
/// The polyline is stale until `generate` runs after a spline mutation;
/// callers are responsible for regeneration. `set_spline` and
/// `set_resolution` regenerate with the last `linear_start` mode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    spline: Spline,
    samples: Vec<Vec3>,
    resolution: usize,
    linear_start: bool,
    profile: RadiusProfile,
}

impl Path {
    pub fn new() -> Self {
        Self {
            resolution: 2,
            ..Default::default()
        }
    }

    pub fn spline(&self) -> &Spline {
        &self.spline
    }

    pub fn set_spline(&mut self, spline: Spline) {
        self.spline = spline;
        self.generate(self.linear_start);
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Set the number of samples per curve segment and resample.
    pub fn set_resolution(&mut self, resolution: usize) {
        self.resolution = resolution;
        self.generate(self.linear_start);
    }

    pub fn profile(&self) -> &RadiusProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut RadiusProfile {
        &mut self.profile
    }

    pub fn set_min_radius(&mut self, radius: f32) {
        self.profile.min = radius;
    }

    pub fn min_radius(&self) -> f32 {
        self.profile.min
    }

    pub fn set_max_radius(&mut self, radius: f32) {
        self.profile.max = radius;
    }

    pub fn max_radius(&self) -> f32 {
        self.profile.max
    }

    pub fn set_radius_curve(&mut self, curve: Spline) {
        self.profile.curve = curve;
    }

    /// Rebuild the sample polyline.
    ///
    /// With `linear_start` the first segment contributes only its start
    /// point, so a child stem's path does not duplicate the attachment
    /// point where it meets its parent.
    pub fn generate(&mut self, linear_start: bool) {
        self.linear_start = linear_start;
        self.samples.clear();
        if self.spline.control_count() == 0 {
            return;
        }
        for curve in 0..self.spline.curve_count() {
            if curve == 0 && linear_start {
                self.samples.push(self.spline.get_curve_point(0, 0.0));
                continue;
            }
            for i in 0..self.resolution {
                let t = i as f32 / self.resolution as f32;
                self.samples.push(self.spline.get_curve_point(curve, t));
            }
        }
        if let Some(&last) = self.spline.controls().last() {
            self.samples.push(last);
        }
    }

    pub fn samples(&self) -> &[Vec3] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Vec3 {
        self.samples[index]
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Map a spline control-point index to the index of its sample.
    ///
    /// Valid for anchor controls. The mapping accounts for the reduced
    /// sample count of the first segment in `linear_start` mode.
    pub fn sample_index(&self, control: usize) -> usize {
        let curve = control / self.spline.degree().step();
        if self.linear_start {
            if curve == 0 {
                0
            } else {
                1 + (curve - 1) * self.resolution
            }
        } else {
            curve * self.resolution
        }
    }

    /// Total arc length of the polyline.
    pub fn length(&self) -> f32 {
        let mut length = 0.0;
        for i in 0..self.samples.len().saturating_sub(1) {
            length += (self.samples[i + 1] - self.samples[i]).length();
        }
        length
    }

    /// Point at an arc-length distance from the start. Distances past the
    /// end clamp to the final sample; a degenerate path yields NaN.
    pub fn get_intermediate(&self, distance: f32) -> Vec3 {
        if self.samples.len() < 2 {
            return Vec3::NAN;
        }
        let mut total = 0.0;
        for i in 0..self.samples.len() - 1 {
            let length = (self.samples[i + 1] - self.samples[i]).length();
            if total + length >= distance {
                return (distance - total) * self.get_direction(i) + self.samples[i];
            }
            total += length;
        }
        self.samples[self.samples.len() - 1]
    }

    /// Direction of the segment starting at `index` (the last sample uses
    /// the preceding segment).
    pub fn get_direction(&self, index: usize) -> Vec3 {
        if index == self.samples.len() - 1 {
            normalize_or_z(self.samples[index] - self.samples[index - 1])
        } else {
            normalize_or_z(self.samples[index + 1] - self.samples[index])
        }
    }

    /// Direction averaged over the segments on both sides of `index`.
    pub fn get_average_direction(&self, index: usize) -> Vec3 {
        if index == 0 || index == self.samples.len() - 1 {
            self.get_direction(index)
        } else {
            normalize_or_z(self.get_direction(index - 1) + self.get_direction(index))
        }
    }

    /// Direction of the segment containing the given arc-length distance.
    pub fn get_intermediate_direction(&self, distance: f32) -> Vec3 {
        let mut total = 0.0;
        for i in 0..self.samples.len().saturating_sub(1) {
            total += (self.samples[i + 1] - self.samples[i]).length();
            if total >= distance {
                return self.get_direction(i);
            }
        }
        if self.samples.len() < 2 {
            Vec3::NAN
        } else {
            self.get_direction(self.samples.len() - 1)
        }
    }

    /// Arc length from the path start to a control point's sample.
    pub fn get_distance(&self, control: usize) -> f32 {
        self.distance_between(0, self.sample_index(control))
    }

    /// Arc length between two sample indices.
    pub fn distance_between(&self, start: usize, end: usize) -> f32 {
        let mut length = 0.0;
        for i in start..end {
            length += (self.samples[i + 1] - self.samples[i]).length();
        }
        length
    }

    /// Radius at a sample index.
    pub fn get_radius(&self, index: usize) -> f32 {
        let t = self.distance_between(0, index) / self.length();
        self.get_intermediate_radius(t)
    }

    /// Radius at a normalized arc-length fraction.
    pub fn get_intermediate_radius(&self, t: f32) -> f32 {
        let radius = self.profile.curve.get_point(t).z * self.profile.max;
        radius.max(self.profile.min)
    }
}
