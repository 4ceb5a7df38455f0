//! Skeleton joints derived from spline anchors

use glam::Vec3;

/// `parent_id` of the skeleton root.
pub const NO_PARENT: i32 = -1;

/// A skeletal node attached to a sample of its stem's path.
///
/// Ids are assigned in pre-order across the whole stem tree, so a joint's
/// parent always has a smaller id.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Joint {
    id: i32,
    parent_id: i32,
    path_index: usize,
    location: Vec3,
}

impl Joint {
    pub fn new(id: i32, parent_id: i32, path_index: usize) -> Self {
        Self {
            id,
            parent_id,
            path_index,
            location: Vec3::ZERO,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn parent_id(&self) -> i32 {
        self.parent_id
    }

    /// Index into the owning stem's sampled path.
    pub fn path_index(&self) -> usize {
        self.path_index
    }

    /// Update the location if the path changes.
    pub fn update_location(&mut self, location: Vec3) {
        self.location = location;
    }

    pub fn location(&self) -> Vec3 {
        self.location
    }
}
