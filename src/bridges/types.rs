//! Bridge network type definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::region::{Hops, RegionError};

/// Outcome of a bridge validity check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeCheck {
    pub ok: bool,
    pub distance_ly: f64,
    /// Human-readable explanation of the outcome
    pub reason: String,
}

/// A target system of the bridge objective with its importance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedTarget {
    pub system: String,
    pub weight: f64,
}

impl WeightedTarget {
    pub fn new(system: &str, weight: f64) -> Self {
        Self {
            system: system.to_string(),
            weight,
        }
    }
}

/// A bridge committed by the optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedBridge {
    pub from: String,
    pub to: String,
    pub distance_ly: f64,
    /// Objective reduction achieved by this bridge
    pub improvement: f64,
    /// Objective value once this bridge stands
    pub objective_after: f64,
}

/// Why the optimizer stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The configured number of bridges was placed
    MaxBridgesReached,
    /// No remaining candidate improves the objective
    NoImprovement,
    /// The wall-clock cutoff elapsed
    TimeBudgetExhausted,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::MaxBridgesReached => write!(f, "maximum bridge count reached"),
            Termination::NoImprovement => write!(f, "no improving bridge left"),
            Termination::TimeBudgetExhausted => write!(f, "time budget exhausted"),
        }
    }
}

/// Result of a bridge optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgePlan {
    pub bridges: Vec<PlannedBridge>,
    pub baseline_objective: f64,
    pub final_objective: f64,
    pub termination: Termination,
}

/// In-range bridge options of one system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeSummary {
    pub system: String,
    pub total_connections: usize,
    pub closest: Option<(String, f64)>,
    pub farthest: Option<(String, f64)>,
    pub average_distance: Option<f64>,
}

/// Bridge connectivity across the whole region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionBridgeStatistics {
    pub total_systems: usize,
    /// Unordered pairs within bridge range
    pub possible_connections: usize,
    pub average_connections_per_system: f64,
    pub max_connections: usize,
    pub min_connections: usize,
    pub systems_without_connections: usize,
}

/// Route improvement of one system pair thanks to bridges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpImprovement {
    pub from: String,
    pub to: String,
    pub gate_jumps: u32,
    pub bridged_jumps: u32,
    pub saved: u32,
}

/// All-pairs comparison of gate-only routes against routes using bridges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpSavings {
    pub average_jumps_gates_only: f64,
    pub average_jumps_with_bridges: f64,
    pub average_savings: f64,
    pub improved_pairs: usize,
    pub top_improvements: Vec<JumpImprovement>,
}

/// Reach of a staging system over the current graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingStatistics {
    pub staging: String,
    pub average_jumps: f64,
    pub max_jumps: u32,
    pub unreachable: usize,
}

/// Bridge-siting metrics of one system over the current graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemBridgeMetrics {
    pub system: String,
    pub constellation: String,
    pub closeness: f64,
    pub betweenness: f64,
    /// Stargate connections only
    pub gate_degree: usize,
    /// Systems within bridge range
    pub bridge_connections: usize,
    /// Other constellations reachable with one bridge
    pub cross_constellation_reach: usize,
}

/// Closed set of rankings for bridge terminus candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeSiteMetric {
    /// Weighted blend of the four normalized metrics below
    #[default]
    Composite,
    Closeness,
    Betweenness,
    Connections,
    CrossConstellation,
}

impl fmt::Display for BridgeSiteMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeSiteMetric::Composite => write!(f, "composite"),
            BridgeSiteMetric::Closeness => write!(f, "closeness"),
            BridgeSiteMetric::Betweenness => write!(f, "betweenness"),
            BridgeSiteMetric::Connections => write!(f, "connections"),
            BridgeSiteMetric::CrossConstellation => write!(f, "cross_constellation"),
        }
    }
}

impl FromStr for BridgeSiteMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "composite" => Ok(BridgeSiteMetric::Composite),
            "closeness" | "centrality" => Ok(BridgeSiteMetric::Closeness),
            "betweenness" => Ok(BridgeSiteMetric::Betweenness),
            "connections" => Ok(BridgeSiteMetric::Connections),
            "cross_constellation" => Ok(BridgeSiteMetric::CrossConstellation),
            _ => Err(format!(
                "Unknown bridge site metric: {}. Use 'composite', 'closeness', 'betweenness', 'connections', or 'cross_constellation'",
                s
            )),
        }
    }
}

/// Value of one proposed bridge on the current graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeValue {
    pub from: String,
    pub to: String,
    pub distance_ly: f64,
    pub current_jumps: Hops,
    /// Jumps saved between the two endpoints; `None` when they are not
    /// connected yet
    pub jump_savings: Option<u32>,
    pub cross_constellation: bool,
    pub from_constellation: String,
    pub to_constellation: String,
    /// Unordered system pairs whose route gets shorter
    pub improved_paths: usize,
}

/// Errors raised by bridge edits and the optimizer
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Region(#[from] RegionError),

    #[error("Cannot bridge {0} to itself")]
    SameSystem(String),

    #[error("Bridge already exists between {from} and {to}")]
    AlreadyExists { from: String, to: String },

    #[error("Systems too far apart: {from} <-> {to} is {distance:.2} LY (max {limit} LY)")]
    OutOfRange {
        from: String,
        to: String,
        distance: f64,
        limit: f64,
    },

    #[error("System {system} already has a bridge (to {partner})")]
    TerminusInUse { system: String, partner: String },

    #[error("No bridge found between {from} and {to}")]
    NoSuchBridge { from: String, to: String },

    #[error("Target weight for {system} must be positive, got {weight}")]
    InvalidTargetWeight { system: String, weight: f64 },

    #[error("Percentile must be within 0.0..=1.0, got {0}")]
    InvalidPercentile(f64),
}
