//! Wind animation: joint skeletons and keyframe blending

pub mod clip;
pub mod joint;
pub mod wind;

pub use clip::{Animation, KeyFrame};
pub use joint::Joint;
pub use wind::Wind;
