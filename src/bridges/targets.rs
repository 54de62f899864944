//! Target sets for the bridge objective.
//!
//! Each builder turns a planning goal into weighted target systems:
//!
//! - **Staging**: the staging system plus the region's entry gates
//! - **FarthestSystems**: the staging system plus the systems farthest from
//!   it, weighted by their distance
//! - **MaxDistance**: every system with equal weight

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::region::RegionGraph;

use super::types::{BridgeError, WeightedTarget};

/// Weight of the staging system in every target set
pub const STAGING_WEIGHT: f64 = 1.0;

/// Weight of each regional gate system in the staging target set
pub const REGIONAL_GATE_WEIGHT: f64 = 0.5;

/// Default percentile for the farthest-systems target set
pub const DEFAULT_PERCENTILE: f64 = 0.8;

/// Staging system weighted 1.0 and each regional gate system weighted 0.5
pub fn staging_targets(
    graph: &RegionGraph,
    staging: &str,
    regional_gates: &[&str],
) -> Result<Vec<WeightedTarget>, BridgeError> {
    graph.require(staging)?;
    let mut targets = vec![WeightedTarget::new(staging, STAGING_WEIGHT)];
    for &gate in regional_gates {
        graph.require(gate)?;
        if gate == staging || targets.iter().any(|t| t.system == gate) {
            continue;
        }
        targets.push(WeightedTarget::new(gate, REGIONAL_GATE_WEIGHT));
    }
    Ok(targets)
}

/// Staging system plus every system whose jump distance from staging is at
/// or above the given percentile of all distances, weighted by that distance
pub fn farthest_targets(
    graph: &RegionGraph,
    staging: &str,
    percentile: f64,
) -> Result<Vec<WeightedTarget>, BridgeError> {
    if !(0.0..=1.0).contains(&percentile) {
        return Err(BridgeError::InvalidPercentile(percentile));
    }
    let source = graph.require(staging)?;
    let hops = graph.bfs(source);

    let mut reachable: Vec<(u32, usize)> = hops
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != source)
        .filter_map(|(i, d)| d.map(|d| (d, i)))
        .collect();
    let unreachable = graph.len() - 1 - reachable.len();
    if unreachable > 0 {
        warn!("{} systems are unreachable from {}", unreachable, staging);
    }

    let mut targets = vec![WeightedTarget::new(staging, STAGING_WEIGHT)];
    if reachable.is_empty() {
        return Ok(targets);
    }

    let mut distances: Vec<u32> = reachable.iter().map(|&(d, _)| d).collect();
    distances.sort_unstable();
    let rank = (percentile * (distances.len() - 1) as f64).floor() as usize;
    let threshold = distances[rank.min(distances.len() - 1)];

    reachable.sort_by(|&(da, a), &(db, b)| db.cmp(&da).then_with(|| graph.name_of(a).cmp(graph.name_of(b))));
    targets.extend(
        reachable
            .into_iter()
            .filter(|&(d, _)| d >= threshold)
            .map(|(d, i)| WeightedTarget::new(graph.name_of(i), d as f64)),
    );
    debug!(
        "{} farthest targets at or beyond {} jumps from {}",
        targets.len() - 1,
        threshold,
        staging
    );
    Ok(targets)
}

/// Every system weighted 1.0
pub fn uniform_targets(graph: &RegionGraph) -> Vec<WeightedTarget> {
    graph
        .systems()
        .iter()
        .map(|s| WeightedTarget::new(&s.name, 1.0))
        .collect()
}

/// Closed set of bridge planning goals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    #[default]
    Staging,
    FarthestSystems,
    MaxDistance,
}

impl TargetMode {
    /// Build the weighted target set for this goal
    pub fn build(
        &self,
        graph: &RegionGraph,
        staging: &str,
        regional_gates: &[&str],
        percentile: f64,
    ) -> Result<Vec<WeightedTarget>, BridgeError> {
        match self {
            TargetMode::Staging => staging_targets(graph, staging, regional_gates),
            TargetMode::FarthestSystems => farthest_targets(graph, staging, percentile),
            TargetMode::MaxDistance => {
                graph.require(staging)?;
                Ok(uniform_targets(graph))
            }
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetMode::Staging => write!(f, "staging"),
            TargetMode::FarthestSystems => write!(f, "farthest_systems"),
            TargetMode::MaxDistance => write!(f, "max_distance"),
        }
    }
}

impl FromStr for TargetMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "staging" | "staging_system" => Ok(TargetMode::Staging),
            "farthest" | "farthest_systems" => Ok(TargetMode::FarthestSystems),
            "max_distance" | "uniform" => Ok(TargetMode::MaxDistance),
            _ => Err(format!(
                "Unknown target mode: {}. Use 'staging', 'farthest_systems', or 'max_distance'",
                s
            )),
        }
    }
}
