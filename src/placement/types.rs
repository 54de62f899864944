//! Placement type definitions.

use serde::{Deserialize, Serialize};

use crate::region::RegionError;

/// A selected system together with the score it was selected with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSystem {
    pub system: String,
    pub score: f64,
}

impl ScoredSystem {
    pub fn new(system: &str, score: f64) -> Self {
        Self {
            system: system.to_string(),
            score,
        }
    }
}

/// Errors raised by placement scoring and distribution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlacementError {
    #[error(transparent)]
    Region(#[from] RegionError),

    #[error("Unknown weight '{0}'. Valid weights: distance, attribute_bonus, magnitude, clustering")]
    UnknownWeight(String),

    #[error("Unknown strategy: {0}. Use 'spread', 'cluster', or 'one_per_group'")]
    UnknownStrategy(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Strategy '{0}' requires a staging system")]
    MissingStaging(String),

    #[error("Invalid hop band: min {min} exceeds max {max}")]
    InvalidBand { min: u32, max: u32 },
}
