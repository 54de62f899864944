//! Bridge constraints and bridge edits.
//!
//! A bridge is valid when its endpoints differ, lie within
//! [`MAX_BRIDGE_RANGE_LY`] of each other and neither already terminates a
//! bridge. Edits check these constraints before touching the graph.

use log::{debug, info};

use crate::region::spatial::distance_between;
use crate::region::{Bridge, RegionGraph, MAX_BRIDGE_RANGE_LY};

use super::types::{BridgeCheck, BridgeError};

/// Validate a bridge between two system indices, returning its length
pub(crate) fn validate_indices(graph: &RegionGraph, a: usize, b: usize) -> Result<f64, BridgeError> {
    if a == b {
        return Err(BridgeError::SameSystem(graph.name_of(a).to_string()));
    }
    if graph.bridge_partner(a) == Some(b) {
        return Err(BridgeError::AlreadyExists {
            from: graph.name_of(a).to_string(),
            to: graph.name_of(b).to_string(),
        });
    }
    for idx in [a, b] {
        if let Some(partner) = graph.bridge_partner(idx) {
            return Err(BridgeError::TerminusInUse {
                system: graph.name_of(idx).to_string(),
                partner: graph.name_of(partner).to_string(),
            });
        }
    }
    let distance = distance_between(graph, a, b);
    if distance > MAX_BRIDGE_RANGE_LY {
        return Err(BridgeError::OutOfRange {
            from: graph.name_of(a).to_string(),
            to: graph.name_of(b).to_string(),
            distance,
            limit: MAX_BRIDGE_RANGE_LY,
        });
    }
    Ok(distance)
}

/// Check whether a bridge between `from` and `to` could be added.
///
/// Unknown systems are errors; constraint violations are reported as a
/// failed check with the reason.
pub fn check_bridge(graph: &RegionGraph, from: &str, to: &str) -> Result<BridgeCheck, BridgeError> {
    let a = graph.require(from)?;
    let b = graph.require(to)?;
    let distance_ly = distance_between(graph, a, b);
    Ok(match validate_indices(graph, a, b) {
        Ok(_) => BridgeCheck {
            ok: true,
            distance_ly,
            reason: format!("Bridge valid: {} <-> {} ({:.2} LY)", from, to, distance_ly),
        },
        Err(e) => BridgeCheck {
            ok: false,
            distance_ly,
            reason: e.to_string(),
        },
    })
}

/// Add a bridge after validating it
pub fn add_bridge(graph: &mut RegionGraph, from: &str, to: &str) -> Result<Bridge, BridgeError> {
    let a = graph.require(from)?;
    let b = graph.require(to)?;
    let distance = validate_indices(graph, a, b)?;
    let bridge = graph.insert_bridge(a, b, distance);
    info!("Bridge added: {} <-> {} ({:.2} LY)", from, to, distance);
    Ok(bridge)
}

/// Remove the bridge between `from` and `to`
pub fn remove_bridge(graph: &mut RegionGraph, from: &str, to: &str) -> Result<Bridge, BridgeError> {
    let a = graph.require(from)?;
    let b = graph.require(to)?;
    let bridge = graph
        .remove_bridge_between(a, b)
        .ok_or_else(|| BridgeError::NoSuchBridge {
            from: from.to_string(),
            to: to.to_string(),
        })?;
    info!("Bridge removed: {} <-> {}", from, to);
    Ok(bridge)
}

/// Remove every bridge, returning the removed bridges
pub fn clear_bridges(graph: &mut RegionGraph) -> Vec<Bridge> {
    let removed = graph.take_bridges();
    info!("Cleared {} bridges", removed.len());
    removed
}

/// Systems within bridge range of `system`, closest first (ties by name).
///
/// Only the range is considered here; existing bridges do not exclude a
/// system.
pub fn valid_connections(
    graph: &RegionGraph,
    system: &str,
    exclude: &[&str],
) -> Result<Vec<(String, f64)>, BridgeError> {
    let idx = graph.require(system)?;
    let mut connections: Vec<(String, f64)> = (0..graph.len())
        .filter(|&other| other != idx)
        .filter(|&other| !exclude.contains(&graph.name_of(other)))
        .map(|other| (other, distance_between(graph, idx, other)))
        .filter(|&(_, d)| d <= MAX_BRIDGE_RANGE_LY)
        .map(|(other, d)| (graph.name_of(other).to_string(), d))
        .collect();
    connections.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    debug!("{} has {} systems in bridge range", system, connections.len());
    Ok(connections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::graph::test_support::*;
    use crate::region::RegionError;

    #[test]
    fn test_check_bridge_within_range() {
        let g = graph(&line(&["A", "B", "C", "D", "E", "F", "G"]));
        let check = check_bridge(&g, "A", "E").unwrap();
        assert!(check.ok);
        assert!((check.distance_ly - 4.0).abs() < 1e-9);

        let check = check_bridge(&g, "A", "G").unwrap();
        assert!(!check.ok);
        assert!(check.reason.contains("too far apart"));
    }

    #[test]
    fn test_add_bridge_enforces_single_terminus() {
        let mut g = graph(&line(&["A", "B", "C", "D"]));
        add_bridge(&mut g, "A", "C").unwrap();
        assert_eq!(g.bridge_partner(0), Some(2));

        match add_bridge(&mut g, "C", "D").unwrap_err() {
            BridgeError::TerminusInUse { system, partner } => {
                assert_eq!(system, "C");
                assert_eq!(partner, "A");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            add_bridge(&mut g, "A", "C"),
            Err(BridgeError::AlreadyExists { .. })
        ));
        assert_eq!(g.bridges().len(), 1);
    }

    #[test]
    fn test_add_bridge_rejects_bad_input() {
        let mut g = graph(&line(&["A", "B"]));
        assert_eq!(
            add_bridge(&mut g, "A", "A"),
            Err(BridgeError::SameSystem("A".to_string()))
        );
        assert_eq!(
            add_bridge(&mut g, "A", "Q"),
            Err(BridgeError::Region(RegionError::UnknownSystem("Q".to_string())))
        );
        assert!(g.bridges().is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut g = graph(&line(&["A", "B", "C", "D"]));
        add_bridge(&mut g, "A", "C").unwrap();
        add_bridge(&mut g, "B", "D").unwrap();

        let removed = remove_bridge(&mut g, "C", "A").unwrap();
        assert_eq!(removed.from, "A");
        assert!(matches!(
            remove_bridge(&mut g, "A", "C"),
            Err(BridgeError::NoSuchBridge { .. })
        ));

        let cleared = clear_bridges(&mut g);
        assert_eq!(cleared.len(), 1);
        assert!(g.bridges().is_empty());
        assert_eq!(g.bridge_partner(1), None);
    }

    #[test]
    fn test_valid_connections_sorted_by_distance() {
        let g = graph(&line(&["A", "B", "C", "D", "E", "F", "G"]));
        let conns = valid_connections(&g, "C", &[]).unwrap();
        let names: Vec<&str> = conns.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["B", "D", "A", "E", "F", "G"]);

        let conns = valid_connections(&g, "C", &["B", "D"]).unwrap();
        assert_eq!(conns[0].0, "A");
    }
}
