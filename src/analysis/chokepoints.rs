//! Chokepoint detection.
//!
//! Chokepoints are the articulation points of the current graph (gates and
//! bridges). Each is scored by the damage its removal does: the number of
//! resulting components times the size of the largest one.

use log::info;

use crate::region::{RegionGraph, Traversal};

use super::types::Chokepoint;

const UNVISITED: usize = usize::MAX;

/// Articulation points of the current graph, ascending by index.
///
/// Iterative Tarjan over distinct neighbors, so parallel gate and bridge
/// edges count once.
pub fn articulation_points(graph: &RegionGraph) -> Vec<usize> {
    let n = graph.len();
    let adjacency: Vec<Vec<usize>> = (0..n).map(|i| graph.distinct_neighbors(i)).collect();
    let mut disc = vec![UNVISITED; n];
    let mut low = vec![0usize; n];
    let mut is_cut = vec![false; n];
    let mut timer = 0usize;

    for root in 0..n {
        if disc[root] != UNVISITED {
            continue;
        }
        disc[root] = timer;
        low[root] = timer;
        timer += 1;
        let mut root_children = 0;
        // (node, parent, next neighbor position)
        let mut stack: Vec<(usize, usize, usize)> = vec![(root, UNVISITED, 0)];

        while let Some(frame) = stack.last_mut() {
            let (u, parent) = (frame.0, frame.1);
            if let Some(&v) = adjacency[u].get(frame.2) {
                frame.2 += 1;
                if disc[v] == UNVISITED {
                    disc[v] = timer;
                    low[v] = timer;
                    timer += 1;
                    if u == root {
                        root_children += 1;
                    }
                    stack.push((v, u, 0));
                } else if v != parent {
                    low[u] = low[u].min(disc[v]);
                }
            } else {
                stack.pop();
                if let Some(&(p, _, _)) = stack.last() {
                    low[p] = low[p].min(low[u]);
                    if p != root && low[u] >= disc[p] {
                        is_cut[p] = true;
                    }
                }
            }
        }
        if root_children > 1 {
            is_cut[root] = true;
        }
    }

    (0..n).filter(|&i| is_cut[i]).collect()
}

/// Score every chokepoint, highest impact first, ties by name
pub fn find_chokepoints(graph: &RegionGraph) -> Vec<Chokepoint> {
    let mut chokepoints: Vec<Chokepoint> = articulation_points(graph)
        .into_iter()
        .map(|idx| {
            let components = graph.components(&Traversal::without(idx));
            let largest = components.iter().map(Vec::len).max().unwrap_or(0);
            let system = graph.system_at(idx);
            Chokepoint {
                system: system.name.clone(),
                constellation: system.constellation.clone(),
                components_after: components.len(),
                largest_component: largest,
                impact: components.len() * largest,
            }
        })
        .collect();
    chokepoints.sort_by(|a, b| b.impact.cmp(&a.impact).then_with(|| a.system.cmp(&b.system)));
    info!("Found {} chokepoints", chokepoints.len());
    chokepoints
}
