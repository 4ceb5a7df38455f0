//! Procedural growth of stem trees

pub mod pseudo;

pub use pseudo::PseudoGenerator;
