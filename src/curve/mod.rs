//! Piecewise Bezier curves and profile presets

pub mod spline;

pub use spline::{Degree, Preset, Spline};
