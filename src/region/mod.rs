//! Region graph module.
//!
//! This module contains the attributed graph of systems, gates and bridges,
//! together with the physical and topological distance primitives every
//! planner component is built on.

pub mod types;
pub mod graph;
pub mod spatial;

// Re-export key types and functions for easier access
pub use types::{Bridge, Edge, EdgeKind, Position, RegionError, RegionSpec, System};
pub use graph::{RegionGraph, Traversal};
pub use spatial::{
    hop_distance, hop_distances_from, physical_distance, Hops, MAX_BRIDGE_RANGE_LY, METERS_PER_LY,
};
