//! Placement module.
//!
//! This module contains the multi-factor placement scorer with its greedy
//! selection arena, and the distribution strategies used to spread a fixed
//! number of placements over the region.

pub mod types;
pub mod scorer;
pub mod distribution;

// Re-export key types and functions for easier access
pub use types::{PlacementError, ScoredSystem};
pub use scorer::{
    score, select_placements, BoolAttribute, MagnitudeAttribute, PlacementSelector, ScoreWeights,
};
pub use distribution::{
    Cluster, DistributionParams, DistributionStrategy, OnePerGroup, Spread, StrategyKind,
};
