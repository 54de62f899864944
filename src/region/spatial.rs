//! Distance primitives: physical light-year distance and graph hop distance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::graph::RegionGraph;
use super::types::{Position, RegionError};

/// Meters per light-year
pub const METERS_PER_LY: f64 = 9.461e15;

/// Maximum range of a constructed bridge, in light-years
pub const MAX_BRIDGE_RANGE_LY: f64 = 5.0;

/// Result of a hop-distance query.
///
/// The graph may be transiently disconnected while bridges are being
/// edited, so an unreachable target is a value rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hops {
    Jumps(u32),
    Unreachable,
}

impl Hops {
    pub fn jumps(self) -> Option<u32> {
        match self {
            Hops::Jumps(n) => Some(n),
            Hops::Unreachable => None,
        }
    }

    pub fn is_reachable(self) -> bool {
        matches!(self, Hops::Jumps(_))
    }
}

impl From<Option<u32>> for Hops {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Hops::Unreachable, Hops::Jumps)
    }
}

impl std::fmt::Display for Hops {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Hops::Jumps(n) => write!(f, "{} jumps", n),
            Hops::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// Euclidean distance between two positions, in light-years
pub fn distance_ly(a: &Position, b: &Position) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dz = b.z - a.z;
    (dx * dx + dy * dy + dz * dz).sqrt() / METERS_PER_LY
}

/// Light-year distance between two systems by index
pub fn distance_between(graph: &RegionGraph, a: usize, b: usize) -> f64 {
    distance_ly(&graph.system_at(a).position, &graph.system_at(b).position)
}

/// Light-year distance between two named systems
pub fn physical_distance(graph: &RegionGraph, a: &str, b: &str) -> Result<f64, RegionError> {
    let ia = graph.require(a)?;
    let ib = graph.require(b)?;
    Ok(distance_between(graph, ia, ib))
}

/// Hop distance between two named systems over gates and bridges
pub fn hop_distance(graph: &RegionGraph, a: &str, b: &str) -> Result<Hops, RegionError> {
    let ia = graph.require(a)?;
    let ib = graph.require(b)?;
    Ok(graph.bfs(ia)[ib].into())
}

/// Hop distance from `source` to every reachable system.
///
/// Unreachable systems are absent from the map.
pub fn hop_distances_from(
    graph: &RegionGraph,
    source: &str,
) -> Result<BTreeMap<String, u32>, RegionError> {
    let idx = graph.require(source)?;
    Ok(graph
        .bfs(idx)
        .into_iter()
        .enumerate()
        .filter_map(|(i, d)| d.map(|d| (graph.name_of(i).to_string(), d)))
        .collect())
}

/// For every system, the hop distance to the nearest of `sources`.
///
/// Runs one single-source traversal per source and keeps the minimum.
pub fn nearest_hops(graph: &RegionGraph, sources: &[usize]) -> Vec<Option<u32>> {
    let mut nearest: Vec<Option<u32>> = vec![None; graph.len()];
    for &source in sources {
        for (slot, d) in nearest.iter_mut().zip(graph.bfs(source)) {
            *slot = match (*slot, d) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }
    }
    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::graph::test_support::*;

    #[test]
    fn test_distance_is_zero_for_same_system() {
        let g = graph(&line(&["A", "B"]));
        assert_eq!(physical_distance(&g, "A", "A").unwrap(), 0.0);
    }

    #[test]
    fn test_distance_in_light_years() {
        let g = graph(&line(&["A", "B", "C"]));
        let d = physical_distance(&g, "A", "C").unwrap();
        assert!((d - 2.0).abs() < 1e-9);
        assert_eq!(d, physical_distance(&g, "C", "A").unwrap());
    }

    #[test]
    fn test_distance_3d() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0 * METERS_PER_LY, 4.0 * METERS_PER_LY, 0.0);
        assert!((distance_ly(&a, &b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_system_is_rejected() {
        let g = graph(&line(&["A", "B"]));
        assert_eq!(
            physical_distance(&g, "A", "Q").unwrap_err(),
            RegionError::UnknownSystem("Q".to_string())
        );
        assert!(hop_distance(&g, "Q", "A").is_err());
        assert!(hop_distances_from(&g, "Q").is_err());
    }

    #[test]
    fn test_hop_distance_and_unreachable() {
        let mut spec = line(&["A", "B", "C"]);
        spec.systems.push(system("Z", "C9", 1.0));
        let g = graph(&spec);
        assert_eq!(hop_distance(&g, "A", "C").unwrap(), Hops::Jumps(2));
        assert_eq!(hop_distance(&g, "C", "A").unwrap(), Hops::Jumps(2));
        assert_eq!(hop_distance(&g, "A", "Z").unwrap(), Hops::Unreachable);
        assert_eq!(hop_distance(&g, "A", "Z").unwrap().jumps(), None);
    }

    #[test]
    fn test_hop_distances_from_skips_unreachable() {
        let mut spec = line(&["A", "B", "C"]);
        spec.systems.push(system("Z", "C9", 1.0));
        let g = graph(&spec);
        let map = hop_distances_from(&g, "B").unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["A"], 1);
        assert_eq!(map["B"], 0);
        assert!(!map.contains_key("Z"));
    }

    #[test]
    fn test_nearest_hops() {
        let g = graph(&line(&["A", "B", "C", "D", "E"]));
        let nearest = nearest_hops(&g, &[0, 4]);
        assert_eq!(nearest, vec![Some(0), Some(1), Some(2), Some(1), Some(0)]);
        assert!(nearest_hops(&g, &[]).iter().all(Option::is_none));
    }
}
