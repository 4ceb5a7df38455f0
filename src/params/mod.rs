//! Hierarchical generation parameters addressed by dotted names
//!
//! Parameters for procedural variation live in a separate tree whose levels
//! mirror branching levels. Nodes are addressed by dotted 1-based sibling
//! positions ("2.1" is the first child of the second top-level node).

pub mod data;
pub mod derivation;
pub mod tree;

pub use data::{LeafData, StemData};
pub use derivation::{Derivation, DerivationTree, LeafArrangement};
pub use tree::{NodeId, OverrideTree};

/// Per-stem generation parameters consumed by external generators.
pub type ParameterTree = OverrideTree<StemData>;
