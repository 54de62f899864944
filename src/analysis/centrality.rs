//! Centrality metrics over the current graph.
//!
//! Betweenness uses Brandes' accumulation with one breadth-first pass per
//! source. The target-weighted variant only credits shortest paths that end
//! at a target, scaled by the target's weight, which is what matters when
//! siting infrastructure around a few important systems.

use std::collections::{BTreeMap, VecDeque};

use log::{debug, info};

use crate::bridges::WeightedTarget;
use crate::region::{RegionError, RegionGraph};

use super::types::{CentralityMetric, CentralityScore, GraphCenter};

fn adjacency(graph: &RegionGraph) -> Vec<Vec<usize>> {
    (0..graph.len()).map(|i| graph.distinct_neighbors(i)).collect()
}

/// Brandes dependency accumulation. `endpoint_weight[t]` is the credit a
/// shortest path ending at `t` contributes.
fn accumulate(adjacency: &[Vec<usize>], endpoint_weight: &[f64]) -> Vec<f64> {
    let n = adjacency.len();
    let mut centrality = vec![0.0; n];

    for s in 0..n {
        let mut order = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist: Vec<Option<u32>> = vec![None; n];
        sigma[s] = 1.0;
        dist[s] = Some(0);

        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            let dv = dist[v].unwrap_or(0);
            for &w in &adjacency[v] {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = order.pop() {
            let credit = if w == s { 0.0 } else { endpoint_weight[w] };
            let coefficient = (credit + delta[w]) / sigma[w];
            for &v in &preds[w] {
                delta[v] += sigma[v] * coefficient;
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }
    centrality
}

fn by_name(graph: &RegionGraph, values: Vec<f64>) -> BTreeMap<String, f64> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (graph.name_of(i).to_string(), v))
        .collect()
}

fn betweenness_values(graph: &RegionGraph) -> Vec<f64> {
    let n = graph.len();
    let raw = accumulate(&adjacency(graph), &vec![1.0; n]);
    if n <= 2 {
        return vec![0.0; n];
    }
    // Every unordered pair is seen from both ends
    let pairs = ((n - 1) * (n - 2)) as f64 / 2.0;
    raw.into_iter().map(|v| v / 2.0 / pairs).collect()
}

fn target_betweenness_values(
    graph: &RegionGraph,
    targets: &[WeightedTarget],
) -> Result<Vec<f64>, RegionError> {
    let n = graph.len();
    let mut weights = vec![0.0; n];
    for target in targets {
        weights[graph.require(&target.system)?] += target.weight;
    }
    let total: f64 = weights.iter().sum();
    if n <= 2 || total <= 0.0 {
        return Ok(vec![0.0; n]);
    }
    let raw = accumulate(&adjacency(graph), &weights);
    let norm = total * (n - 2) as f64;
    Ok(raw.into_iter().map(|v| v / norm).collect())
}

fn closeness_values(graph: &RegionGraph) -> Vec<f64> {
    let n = graph.len();
    (0..n)
        .map(|v| {
            let (reached, sum) = graph
                .bfs(v)
                .iter()
                .flatten()
                .fold((0usize, 0u64), |(r, s), &d| (r + 1, s + u64::from(d)));
            if sum == 0 || n < 2 {
                return 0.0;
            }
            // Scaled by the reachable share so small components do not look
            // artificially central
            let others = (reached - 1) as f64;
            (others / sum as f64) * (others / (n - 1) as f64)
        })
        .collect()
}

fn degree_values(graph: &RegionGraph) -> Vec<f64> {
    (0..graph.len())
        .map(|i| graph.distinct_neighbors(i).len() as f64)
        .collect()
}

/// Normalized betweenness of every system
pub fn betweenness_centrality(graph: &RegionGraph) -> BTreeMap<String, f64> {
    by_name(graph, betweenness_values(graph))
}

/// Betweenness counting only shortest paths that end at a target, each
/// weighted by the target's weight and normalized by the total weighted
/// pair count
pub fn target_betweenness_centrality(
    graph: &RegionGraph,
    targets: &[WeightedTarget],
) -> Result<BTreeMap<String, f64>, RegionError> {
    Ok(by_name(graph, target_betweenness_values(graph, targets)?))
}

/// Closeness of every system: inverse average hop distance to the systems
/// it can reach, scaled by the share of the region it reaches
pub fn closeness_centrality(graph: &RegionGraph) -> BTreeMap<String, f64> {
    by_name(graph, closeness_values(graph))
}

/// The system with the highest closeness, ties by name
pub fn network_center(graph: &RegionGraph) -> Option<CentralityScore> {
    let values = closeness_values(graph);
    (0..graph.len())
        .max_by(|&a, &b| {
            values[a]
                .total_cmp(&values[b])
                .then_with(|| graph.name_of(b).cmp(graph.name_of(a)))
        })
        .map(|i| CentralityScore {
            system: graph.name_of(i).to_string(),
            score: values[i],
        })
}

/// Systems of minimum eccentricity. Unreachable systems count as the region
/// size.
pub fn graph_center(graph: &RegionGraph) -> GraphCenter {
    let n = graph.len() as u32;
    let eccentricities: Vec<u32> = (0..graph.len())
        .map(|v| {
            graph
                .bfs(v)
                .into_iter()
                .map(|d| d.unwrap_or(n))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let min = eccentricities.iter().copied().min().unwrap_or(0);
    let mut systems: Vec<String> = eccentricities
        .iter()
        .enumerate()
        .filter(|&(_, &e)| e == min)
        .map(|(i, _)| graph.name_of(i).to_string())
        .collect();
    systems.sort_unstable();
    debug!("Graph center: {:?} (eccentricity {})", systems, min);
    GraphCenter {
        eccentricity: min,
        systems,
    }
}

/// Rank systems by `metric`, highest first, ties by name.
///
/// `targets` is only used by [`CentralityMetric::TargetBetweenness`].
/// `top_n` of `None` returns every system.
pub fn rank_centrality(
    graph: &RegionGraph,
    metric: CentralityMetric,
    targets: &[WeightedTarget],
    top_n: Option<usize>,
) -> Result<Vec<CentralityScore>, RegionError> {
    let values = match metric {
        CentralityMetric::Betweenness => betweenness_values(graph),
        CentralityMetric::TargetBetweenness => target_betweenness_values(graph, targets)?,
        CentralityMetric::Closeness => closeness_values(graph),
        CentralityMetric::Degree => degree_values(graph),
    };
    let mut ranked: Vec<CentralityScore> = values
        .into_iter()
        .enumerate()
        .map(|(i, score)| CentralityScore {
            system: graph.name_of(i).to_string(),
            score,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.system.cmp(&b.system)));
    if let Some(n) = top_n {
        ranked.truncate(n);
    }
    info!("Ranked {} systems by {}", ranked.len(), metric);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::graph::test_support::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_betweenness_on_line() {
        let g = graph(&line(&["A", "B", "C", "D", "E"]));
        let b = betweenness_centrality(&g);
        // C lies on 4 of the 6 pairs not involving it
        assert!(approx(b["C"], 4.0 / 6.0));
        assert!(approx(b["B"], 3.0 / 6.0));
        assert!(approx(b["A"], 0.0));
    }

    #[test]
    fn test_betweenness_splits_equal_paths() {
        // Square A-B-C-D-A: B and D each carry half of A <-> C
        let mut spec = line(&["A", "B", "C", "D"]);
        spec.gates.push(("D".to_string(), "A".to_string()));
        let g = graph(&spec);
        let b = betweenness_centrality(&g);
        // n = 4, three pairs exclude each node
        assert!(approx(b["B"], 0.5 / 3.0));
        assert!(approx(b["D"], 0.5 / 3.0));
    }

    #[test]
    fn test_target_betweenness_only_counts_target_paths() {
        let g = graph(&line(&["A", "B", "C", "D", "E"]));
        let targets = vec![WeightedTarget::new("A", 1.0)];
        let b = target_betweenness_centrality(&g, &targets).unwrap();
        // Paths ending at A: from C, D, E via B; from D, E via C; from E via D
        let norm = 1.0 * 3.0;
        assert!(approx(b["B"], 3.0 / norm));
        assert!(approx(b["C"], 2.0 / norm));
        assert!(approx(b["D"], 1.0 / norm));
        assert!(approx(b["E"], 0.0));

        let unknown = vec![WeightedTarget::new("Q", 1.0)];
        assert!(target_betweenness_centrality(&g, &unknown).is_err());
    }

    #[test]
    fn test_closeness_and_center() {
        let g = graph(&line(&["A", "B", "C", "D", "E"]));
        let c = closeness_centrality(&g);
        // C: distances 2,1,1,2
        assert!(approx(c["C"], 4.0 / 6.0));
        assert!(approx(c["A"], 4.0 / 10.0));
        assert_eq!(network_center(&g).unwrap().system, "C");

        let center = graph_center(&g);
        assert_eq!(center.eccentricity, 2);
        assert_eq!(center.systems, vec!["C"]);
    }

    #[test]
    fn test_closeness_scales_disconnected() {
        let mut spec = line(&["A", "B"]);
        spec.systems.push(system("Z", "C1", 5.0));
        let c = closeness_centrality(&graph(&spec));
        // A reaches one of two others at distance 1
        assert!(approx(c["A"], 0.5));
        assert_eq!(c["Z"], 0.0);
    }

    #[test]
    fn test_rank_centrality() {
        let g = graph(&line(&["A", "B", "C", "D", "E"]));
        let top = rank_centrality(&g, CentralityMetric::Betweenness, &[], Some(2)).unwrap();
        assert_eq!(top[0].system, "C");
        assert_eq!(top[1].system, "B");

        let degree = rank_centrality(&g, CentralityMetric::Degree, &[], None).unwrap();
        assert_eq!(degree.len(), 5);
        assert_eq!(degree[0].score, 2.0);
        assert_eq!(degree[4].system, "E");
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("closeness".parse::<CentralityMetric>().unwrap(), CentralityMetric::Closeness);
        assert!("pagerank".parse::<CentralityMetric>().is_err());
    }
}
