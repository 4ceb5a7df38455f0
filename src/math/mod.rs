//! Math utilities on top of glam

pub mod bezier;
pub mod rng;
