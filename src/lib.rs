//! Sylva - a procedural plant modeling and wind animation library

pub mod core;
pub mod math;
pub mod curve;
pub mod path;
pub mod plant;
pub mod params;
pub mod animation;
pub mod generator;
