//! Structural analysis and reporting for region plans.
//!
//! This module provides chokepoint detection, centrality metrics, and the
//! JSON and text reports that collect the results of every planning step.

pub mod types;
pub mod chokepoints;
pub mod centrality;
pub mod report;

pub use types::*;
pub use chokepoints::{articulation_points, find_chokepoints};
pub use centrality::{
    betweenness_centrality, closeness_centrality, graph_center, network_center, rank_centrality,
    target_betweenness_centrality,
};
pub use report::{generate_json_report, generate_text_report, print_summary, render_text_report};
