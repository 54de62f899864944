//! Type definitions for structural analysis and planning reports.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bridges::{BridgePlan, JumpSavings, RegionBridgeStatistics, StagingStatistics};
use crate::capacity::CapacitySummary;
use crate::placement::ScoredSystem;

/// A cut vertex of the region graph and the damage its loss would do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chokepoint {
    pub system: String,
    pub constellation: String,
    /// Connected components left after removing the system
    pub components_after: usize,
    /// Size of the largest of those components
    pub largest_component: usize,
    /// `components_after * largest_component`
    pub impact: usize,
}

/// A system's value under one centrality metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityScore {
    pub system: String,
    pub score: f64,
}

/// Systems of minimum eccentricity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphCenter {
    pub eccentricity: u32,
    pub systems: Vec<String>,
}

/// Closed set of centrality metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentralityMetric {
    /// Share of all shortest paths passing through a system
    #[default]
    Betweenness,
    /// Betweenness counting only paths that end at weighted targets
    TargetBetweenness,
    /// Inverse average hop distance to the other systems
    Closeness,
    /// Number of distinct neighbors
    Degree,
}

impl fmt::Display for CentralityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CentralityMetric::Betweenness => write!(f, "betweenness"),
            CentralityMetric::TargetBetweenness => write!(f, "target_betweenness"),
            CentralityMetric::Closeness => write!(f, "closeness"),
            CentralityMetric::Degree => write!(f, "degree"),
        }
    }
}

impl FromStr for CentralityMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "betweenness" => Ok(CentralityMetric::Betweenness),
            "target_betweenness" | "weighted_betweenness" => Ok(CentralityMetric::TargetBetweenness),
            "closeness" => Ok(CentralityMetric::Closeness),
            "degree" => Ok(CentralityMetric::Degree),
            _ => Err(format!(
                "Unknown metric: {}. Use 'betweenness', 'target_betweenness', 'closeness', or 'degree'",
                s
            )),
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub region: String,
    pub total_systems: usize,
    pub total_gates: usize,
    pub total_bridges: usize,
    pub staging: Option<String>,
}

/// Capacity state of every system carrying upgrades
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityOverview {
    pub systems: Vec<CapacitySummary>,
    pub invalid_systems: Vec<String>,
}

/// Bridge section of a plan report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeAnalysis {
    pub target_mode: String,
    pub plan: BridgePlan,
    pub staging: Option<StagingStatistics>,
    pub jump_savings: JumpSavings,
    pub region_statistics: RegionBridgeStatistics,
    /// Ranking used for `candidate_sites`
    pub site_metric: String,
    /// Best termini for further bridges on the optimized network
    pub candidate_sites: Vec<CentralityScore>,
}

/// Structural section of a plan report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureAnalysis {
    pub chokepoints: Vec<Chokepoint>,
    pub top_betweenness: Vec<CentralityScore>,
    pub top_target_betweenness: Vec<CentralityScore>,
    pub network_center: Option<CentralityScore>,
    pub graph_center: GraphCenter,
}

/// Placement section of a plan report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementAnalysis {
    pub strategy: String,
    pub systems: Vec<ScoredSystem>,
}

/// Combined planning report; sections are present when the corresponding
/// operation ran
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub metadata: ReportMetadata,
    pub mining: Option<PlacementAnalysis>,
    pub distribution: Option<PlacementAnalysis>,
    pub bridges: Option<BridgeAnalysis>,
    pub structure: Option<StructureAnalysis>,
    pub capacity: Option<CapacityOverview>,
}
