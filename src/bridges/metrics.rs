//! Bridge coverage and route statistics, plus the siting metrics used when
//! choosing bridges by hand.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use crate::analysis::{betweenness_centrality, closeness_centrality, CentralityScore};
use crate::region::spatial::distance_between;
use crate::region::{Hops, RegionGraph, Traversal, MAX_BRIDGE_RANGE_LY};

use super::types::{
    BridgeError, BridgeSiteMetric, BridgeSummary, BridgeValue, JumpImprovement, JumpSavings,
    RegionBridgeStatistics, StagingStatistics, SystemBridgeMetrics,
};
use super::validity::valid_connections;

/// Number of pair improvements listed in [`JumpSavings`]
pub const TOP_IMPROVEMENTS: usize = 10;

/// Composite site score weights for closeness, betweenness, in-range
/// connections and cross-constellation reach
pub const COMPOSITE_WEIGHTS: [f64; 4] = [0.25, 0.25, 0.30, 0.20];

/// Bridge options of one system: count, closest, farthest and average
/// distance of in-range systems
pub fn bridge_summary(graph: &RegionGraph, system: &str) -> Result<BridgeSummary, BridgeError> {
    let connections = valid_connections(graph, system, &[])?;
    let average_distance = if connections.is_empty() {
        None
    } else {
        Some(connections.iter().map(|(_, d)| d).sum::<f64>() / connections.len() as f64)
    };
    Ok(BridgeSummary {
        system: system.to_string(),
        total_connections: connections.len(),
        closest: connections.first().cloned(),
        farthest: connections.last().cloned(),
        average_distance,
    })
}

/// In-range connection counts across the region
pub fn region_bridge_statistics(graph: &RegionGraph) -> RegionBridgeStatistics {
    let n = graph.len();
    let mut counts = vec![0usize; n];
    for a in 0..n {
        for b in (a + 1)..n {
            if distance_between(graph, a, b) <= MAX_BRIDGE_RANGE_LY {
                counts[a] += 1;
                counts[b] += 1;
            }
        }
    }
    let total: usize = counts.iter().sum();
    RegionBridgeStatistics {
        total_systems: n,
        possible_connections: total / 2,
        average_connections_per_system: if n == 0 { 0.0 } else { total as f64 / n as f64 },
        max_connections: counts.iter().copied().max().unwrap_or(0),
        min_connections: counts.iter().copied().min().unwrap_or(0),
        systems_without_connections: counts.iter().filter(|&&c| c == 0).count(),
    }
}

/// Compare all-pairs routes over gates only against routes using the
/// current bridges.
///
/// Pairs unreachable in either view are left out of both averages.
pub fn jump_savings(graph: &RegionGraph) -> JumpSavings {
    let n = graph.len();
    let gates_only = Traversal::gates_only();
    let mut pairs = 0u64;
    let mut total_gates = 0u64;
    let mut total_bridged = 0u64;
    let mut improvements = Vec::new();

    for a in 0..n {
        let via_gates = graph.bfs_with(a, &gates_only);
        let via_bridges = graph.bfs(a);
        for b in (a + 1)..n {
            let (Some(g), Some(br)) = (via_gates[b], via_bridges[b]) else {
                continue;
            };
            pairs += 1;
            total_gates += u64::from(g);
            total_bridged += u64::from(br);
            if br < g {
                improvements.push(JumpImprovement {
                    from: graph.name_of(a).to_string(),
                    to: graph.name_of(b).to_string(),
                    gate_jumps: g,
                    bridged_jumps: br,
                    saved: g - br,
                });
            }
        }
    }

    let average = |total: u64| if pairs == 0 { 0.0 } else { total as f64 / pairs as f64 };
    let improved_pairs = improvements.len();
    improvements.sort_by(|x, y| {
        y.saved
            .cmp(&x.saved)
            .then_with(|| x.from.cmp(&y.from))
            .then_with(|| x.to.cmp(&y.to))
    });
    improvements.truncate(TOP_IMPROVEMENTS);
    debug!("{} of {} pairs improved by bridges", improved_pairs, pairs);

    JumpSavings {
        average_jumps_gates_only: average(total_gates),
        average_jumps_with_bridges: average(total_bridged),
        average_savings: average(total_gates) - average(total_bridged),
        improved_pairs,
        top_improvements: improvements,
    }
}

/// Average and maximum jumps from `staging` over the current graph
pub fn staging_statistics(graph: &RegionGraph, staging: &str) -> Result<StagingStatistics, BridgeError> {
    let source = graph.require(staging)?;
    let hops = graph.bfs(source);
    let reached: Vec<u32> = hops
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != source)
        .filter_map(|(_, d)| *d)
        .collect();
    let unreachable = graph.len() - 1 - reached.len();
    Ok(StagingStatistics {
        staging: staging.to_string(),
        average_jumps: if reached.is_empty() {
            0.0
        } else {
            reached.iter().map(|&d| f64::from(d)).sum::<f64>() / reached.len() as f64
        },
        max_jumps: reached.iter().copied().max().unwrap_or(0),
        unreachable,
    })
}

fn site_metrics(
    graph: &RegionGraph,
    idx: usize,
    closeness: &BTreeMap<String, f64>,
    betweenness: &BTreeMap<String, f64>,
) -> SystemBridgeMetrics {
    let system = graph.system_at(idx);
    let in_range: Vec<usize> = (0..graph.len())
        .filter(|&other| other != idx && distance_between(graph, idx, other) <= MAX_BRIDGE_RANGE_LY)
        .collect();
    let reach: BTreeSet<&str> = in_range
        .iter()
        .map(|&other| graph.system_at(other).constellation.as_str())
        .filter(|&c| c != system.constellation)
        .collect();
    SystemBridgeMetrics {
        system: system.name.clone(),
        constellation: system.constellation.clone(),
        closeness: closeness.get(&system.name).copied().unwrap_or(0.0),
        betweenness: betweenness.get(&system.name).copied().unwrap_or(0.0),
        gate_degree: graph.gate_neighbors(idx).len(),
        bridge_connections: in_range.len(),
        cross_constellation_reach: reach.len(),
    }
}

/// Siting metrics of one system
pub fn system_bridge_metrics(graph: &RegionGraph, system: &str) -> Result<SystemBridgeMetrics, BridgeError> {
    let idx = graph.require(system)?;
    Ok(site_metrics(
        graph,
        idx,
        &closeness_centrality(graph),
        &betweenness_centrality(graph),
    ))
}

/// Siting metrics of every system, in graph order
pub fn all_system_bridge_metrics(graph: &RegionGraph) -> Vec<SystemBridgeMetrics> {
    let closeness = closeness_centrality(graph);
    let betweenness = betweenness_centrality(graph);
    (0..graph.len())
        .map(|idx| site_metrics(graph, idx, &closeness, &betweenness))
        .collect()
}

fn composite_components(m: &SystemBridgeMetrics) -> [f64; 4] {
    [
        m.closeness,
        m.betweenness,
        m.bridge_connections as f64,
        m.cross_constellation_reach as f64,
    ]
}

/// Rank systems as bridge termini, highest first, ties by name.
///
/// The composite normalizes each component by its regional maximum and
/// blends them with [`COMPOSITE_WEIGHTS`]; a component whose maximum is zero
/// contributes nothing.
pub fn rank_bridge_sites(
    graph: &RegionGraph,
    metric: BridgeSiteMetric,
    top_n: Option<usize>,
) -> Vec<CentralityScore> {
    let metrics = all_system_bridge_metrics(graph);
    let values: Vec<f64> = match metric {
        BridgeSiteMetric::Composite => {
            let rows: Vec<[f64; 4]> = metrics.iter().map(composite_components).collect();
            let mut maxima = [0.0f64; 4];
            for row in &rows {
                for (top, value) in maxima.iter_mut().zip(row) {
                    *top = top.max(*value);
                }
            }
            rows.iter()
                .map(|row| {
                    row.iter()
                        .zip(&maxima)
                        .zip(COMPOSITE_WEIGHTS)
                        .map(|((value, top), weight)| if *top > 0.0 { weight * value / top } else { 0.0 })
                        .sum::<f64>()
                })
                .collect()
        }
        BridgeSiteMetric::Closeness => metrics.iter().map(|m| m.closeness).collect(),
        BridgeSiteMetric::Betweenness => metrics.iter().map(|m| m.betweenness).collect(),
        BridgeSiteMetric::Connections => metrics.iter().map(|m| m.bridge_connections as f64).collect(),
        BridgeSiteMetric::CrossConstellation => metrics
            .iter()
            .map(|m| m.cross_constellation_reach as f64)
            .collect(),
    };

    let mut ranked: Vec<CentralityScore> = metrics
        .into_iter()
        .zip(values)
        .map(|(m, score)| CentralityScore { system: m.system, score })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.system.cmp(&b.system)));
    if let Some(n) = top_n {
        ranked.truncate(n);
    }
    info!("Ranked {} bridge sites by {}", ranked.len(), metric);
    ranked
}

/// Value of a proposed bridge between `from` and `to` on the current graph.
///
/// Only the range is checked; a terminus already in use does not stop the
/// evaluation. Every unordered pair is compared against its route through
/// the new bridge.
pub fn bridge_value(graph: &RegionGraph, from: &str, to: &str) -> Result<BridgeValue, BridgeError> {
    let a = graph.require(from)?;
    let b = graph.require(to)?;
    if a == b {
        return Err(BridgeError::SameSystem(from.to_string()));
    }
    let distance = distance_between(graph, a, b);
    if distance > MAX_BRIDGE_RANGE_LY {
        return Err(BridgeError::OutOfRange {
            from: from.to_string(),
            to: to.to_string(),
            distance,
            limit: MAX_BRIDGE_RANGE_LY,
        });
    }

    let from_a = graph.bfs(a);
    let from_b = graph.bfs(b);
    let n = graph.len();
    let mut improved_paths = 0;
    for x in 0..n {
        let from_x = graph.bfs(x);
        for y in (x + 1)..n {
            let bridged = [(from_a[x], from_b[y]), (from_b[x], from_a[y])]
                .iter()
                .filter_map(|&(p, q)| Some(p? + 1 + q?))
                .min();
            let Some(bridged) = bridged else {
                continue;
            };
            if from_x[y].map_or(true, |current| bridged < current) {
                improved_paths += 1;
            }
        }
    }

    let current = from_a[b];
    let from_constellation = graph.system_at(a).constellation.clone();
    let to_constellation = graph.system_at(b).constellation.clone();
    debug!(
        "Bridge {} <-> {} would shorten {} routes",
        from, to, improved_paths
    );
    Ok(BridgeValue {
        from: from.to_string(),
        to: to.to_string(),
        distance_ly: distance,
        current_jumps: Hops::from(current),
        jump_savings: current.map(|jumps| jumps.saturating_sub(1)),
        cross_constellation: from_constellation != to_constellation,
        from_constellation,
        to_constellation,
        improved_paths,
    })
}
