//! Bridge network module.
//!
//! This module contains bridge validity checks and edits, the greedy bridge
//! optimizer with its target-set builders, coverage statistics for the
//! current bridge network, and siting metrics for placing bridges by hand.

pub mod types;
pub mod validity;
pub mod targets;
pub mod optimizer;
pub mod metrics;

// Re-export key types and functions for easier access
pub use types::{
    BridgeCheck, BridgeError, BridgePlan, BridgeSiteMetric, BridgeSummary, BridgeValue,
    JumpImprovement, JumpSavings, PlannedBridge, RegionBridgeStatistics, StagingStatistics,
    SystemBridgeMetrics, Termination, WeightedTarget,
};
pub use validity::{add_bridge, check_bridge, clear_bridges, remove_bridge, valid_connections};
pub use targets::{farthest_targets, staging_targets, uniform_targets, TargetMode};
pub use optimizer::{optimize_bridges, weighted_objective, OptimizerSettings};
pub use metrics::{
    all_system_bridge_metrics, bridge_summary, bridge_value, jump_savings, rank_bridge_sites,
    region_bridge_statistics, staging_statistics, system_bridge_metrics, COMPOSITE_WEIGHTS,
};
