//! Core data types for the region graph.

use serde::{Deserialize, Serialize};

/// Physical position of a system in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A solar system in the region, as supplied by the data layer.
///
/// Systems are immutable once the graph is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    /// Unique, stable identifier
    pub name: String,
    /// Structural group id
    pub constellation: String,
    pub security: f64,
    pub position: Position,
    #[serde(default)]
    pub has_ice: bool,
    #[serde(default)]
    pub moons: u32,
    #[serde(default)]
    pub planets: u32,
    #[serde(default)]
    pub belts: u32,
    /// Base power capacity
    #[serde(default)]
    pub power: i64,
    /// Base workforce capacity
    #[serde(default)]
    pub workforce: i64,
}

/// Kind of connection between two systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Immutable topological gate
    Gate,
    /// Constructed long-range bridge
    Bridge,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Gate => write!(f, "gate"),
            EdgeKind::Bridge => write!(f, "bridge"),
        }
    }
}

/// An undirected edge of the region graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    /// Physical length, only recorded for bridges
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_ly: Option<f64>,
}

/// A constructed bridge between two systems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bridge {
    pub from: String,
    pub to: String,
    pub distance_ly: f64,
}

impl Bridge {
    /// Returns true if this bridge terminates at `system`
    pub fn touches(&self, system: &str) -> bool {
        self.from == system || self.to == system
    }

    /// Returns true if this bridge connects `a` and `b` in either direction
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

/// Serializable description of a region, as handed over by the data layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub systems: Vec<System>,
    /// Gate connections as `[from, to]` pairs
    #[serde(default)]
    pub gates: Vec<(String, String)>,
    /// Bridges already standing in the region
    #[serde(default)]
    pub bridges: Vec<(String, String)>,
}

/// Errors raised when building or querying the region graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegionError {
    #[error("Unknown system: {0}")]
    UnknownSystem(String),
    #[error("Duplicate system: {0}")]
    DuplicateSystem(String),
    #[error("Gate {from} <-> {to} references unknown system {missing}")]
    UnknownGateEndpoint {
        from: String,
        to: String,
        missing: String,
    },
    #[error("Gate connects {0} to itself")]
    SelfLoop(String),
    #[error("Invalid bridge in region data: {0}")]
    InvalidBridge(String),
}
