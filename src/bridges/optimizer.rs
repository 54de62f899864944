//! Greedy bridge network optimizer.
//!
//! The objective is the weighted average hop distance from every target to
//! every other system:
//!
//! ```text
//! sum_t w_t * sum_{v != t} d(t, v)  /  (sum_t w_t * (V - 1))
//! ```
//!
//! where an unreachable pair counts as `V` jumps. Each iteration evaluates
//! every in-range pair whose endpoints are both free, tentatively adding the
//! bridge for one traversal per target, and commits the pair with the
//! largest improvement. Committed bridges are never revisited.

use std::time::{Duration, Instant};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::region::spatial::distance_between;
use crate::region::{RegionGraph, Traversal, MAX_BRIDGE_RANGE_LY};

use super::types::{BridgeError, BridgePlan, PlannedBridge, Termination, WeightedTarget};
use super::validity::validate_indices;

/// Smallest objective reduction that counts as an improvement
const MIN_IMPROVEMENT: f64 = 1e-12;

/// Optimizer limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Maximum number of bridges to add
    pub max_bridges: usize,
    /// Per-bridge range in light-years, capped at the game limit
    pub range_ly: f64,
    /// Wall-clock cutoff for the whole run
    #[serde(with = "humantime_serde")]
    pub time_budget: Option<Duration>,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            max_bridges: 10,
            range_ly: MAX_BRIDGE_RANGE_LY,
            time_budget: None,
        }
    }
}

/// Resolve targets to indices, rejecting non-positive weights
fn resolve_targets(
    graph: &RegionGraph,
    targets: &[WeightedTarget],
) -> Result<Vec<(usize, f64)>, BridgeError> {
    targets
        .iter()
        .map(|t| {
            let idx = graph.require(&t.system)?;
            if !(t.weight.is_finite() && t.weight > 0.0) {
                return Err(BridgeError::InvalidTargetWeight {
                    system: t.system.clone(),
                    weight: t.weight,
                });
            }
            Ok((idx, t.weight))
        })
        .collect()
}

fn objective_with(graph: &RegionGraph, targets: &[(usize, f64)], traversal: &Traversal) -> f64 {
    let n = graph.len();
    let total_weight: f64 = targets.iter().map(|&(_, w)| w).sum();
    if n < 2 || total_weight <= 0.0 {
        return 0.0;
    }
    let penalty = n as u64;
    let mut weighted = 0.0;
    for &(t, w) in targets {
        let hops: u64 = graph
            .bfs_with(t, traversal)
            .iter()
            .enumerate()
            .filter(|&(v, _)| v != t)
            .map(|(_, d)| d.map_or(penalty, u64::from))
            .sum();
        weighted += w * hops as f64;
    }
    weighted / (total_weight * (n - 1) as f64)
}

/// Weighted average hop distance from `targets` over the current graph
pub fn weighted_objective(graph: &RegionGraph, targets: &[WeightedTarget]) -> Result<f64, BridgeError> {
    let resolved = resolve_targets(graph, targets)?;
    Ok(objective_with(graph, &resolved, &Traversal::default()))
}

/// Unordered in-range pairs, lower name first, sorted by name pair
fn candidate_pairs(graph: &RegionGraph, range_ly: f64) -> Vec<(usize, usize, f64)> {
    let mut pairs = Vec::new();
    for a in 0..graph.len() {
        for b in (a + 1)..graph.len() {
            if graph.has_gate(a, b) {
                continue;
            }
            let distance = distance_between(graph, a, b);
            if distance <= range_ly {
                let (lo, hi) = if graph.name_of(a) <= graph.name_of(b) { (a, b) } else { (b, a) };
                pairs.push((lo, hi, distance));
            }
        }
    }
    pairs.sort_by(|x, y| {
        graph
            .name_of(x.0)
            .cmp(graph.name_of(y.0))
            .then_with(|| graph.name_of(x.1).cmp(graph.name_of(y.1)))
    });
    pairs
}

/// Greedily add bridges to `graph` to reduce the weighted average hop
/// distance from `targets`.
///
/// Ties between equally good candidates go to the lexicographically smallest
/// name pair. Stops at `max_bridges`, when nothing improves, or when the time
/// budget runs out; an iteration cut short by the budget commits nothing.
pub fn optimize_bridges(
    graph: &mut RegionGraph,
    targets: &[WeightedTarget],
    settings: &OptimizerSettings,
) -> Result<BridgePlan, BridgeError> {
    let resolved = resolve_targets(graph, targets)?;
    let range = settings.range_ly.min(MAX_BRIDGE_RANGE_LY);
    let started = Instant::now();
    let out_of_time = || settings.time_budget.is_some_and(|budget| started.elapsed() >= budget);

    let pairs = candidate_pairs(graph, range);
    let baseline = objective_with(graph, &resolved, &Traversal::default());
    info!(
        "Optimizing up to {} bridges for {} targets ({} in-range pairs, baseline {:.4})",
        settings.max_bridges,
        resolved.len(),
        pairs.len(),
        baseline
    );

    let mut current = baseline;
    let mut planned = Vec::new();
    let termination = loop {
        if planned.len() >= settings.max_bridges {
            break Termination::MaxBridgesReached;
        }
        if out_of_time() {
            break Termination::TimeBudgetExhausted;
        }

        let mut best: Option<(usize, usize, f64, f64)> = None;
        let mut timed_out = false;
        for &(a, b, distance) in &pairs {
            if graph.bridge_partner(a).is_some() || graph.bridge_partner(b).is_some() {
                continue;
            }
            if out_of_time() {
                timed_out = true;
                break;
            }
            let objective = objective_with(graph, &resolved, &Traversal::with_extra_edge(a, b));
            let improvement = current - objective;
            // Pairs are visited in name order, so only a strictly better
            // candidate replaces the incumbent.
            if improvement > MIN_IMPROVEMENT && best.map_or(true, |(_, _, _, obj)| objective < obj - MIN_IMPROVEMENT) {
                best = Some((a, b, distance, objective));
            }
        }
        if timed_out {
            break Termination::TimeBudgetExhausted;
        }

        let Some((a, b, _, objective)) = best else {
            break Termination::NoImprovement;
        };
        let distance = validate_indices(graph, a, b)?;
        let bridge = graph.insert_bridge(a, b, distance);
        debug!(
            "Bridge {} <-> {} ({:.2} LY): objective {:.4} -> {:.4}",
            bridge.from, bridge.to, distance, current, objective
        );
        planned.push(PlannedBridge {
            from: bridge.from,
            to: bridge.to,
            distance_ly: distance,
            improvement: current - objective,
            objective_after: objective,
        });
        current = objective;
    };

    info!(
        "Placed {} bridges, objective {:.4} -> {:.4} ({})",
        planned.len(),
        baseline,
        current,
        termination
    );
    Ok(BridgePlan {
        bridges: planned,
        baseline_objective: baseline,
        final_objective: current,
        termination,
    })
}
