//! Upgrade and capacity type definitions.

use serde::{Deserialize, Serialize};

/// A sovereignty upgrade definition.
///
/// A negative cost adds to the corresponding capacity instead of consuming it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub name: String,
    pub power: i64,
    pub workforce: i64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Upgrade {
    pub fn new(name: &str, power: i64, workforce: i64, category: &str) -> Self {
        Self {
            name: name.to_string(),
            power,
            workforce,
            category: category.to_string(),
            description: None,
        }
    }
}

/// The two capacity resources of a system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Power,
    Workforce,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Power => write!(f, "power"),
            Resource::Workforce => write!(f, "workforce"),
        }
    }
}

/// Capacity usage of one system under one upgrade set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityReport {
    pub power_used: i64,
    pub power_capacity: i64,
    pub power_remaining: i64,
    pub workforce_used: i64,
    pub workforce_capacity: i64,
    pub workforce_remaining: i64,
    pub valid: bool,
}

impl CapacityReport {
    /// The first overdrawn resource and by how much, if any
    pub fn deficit(&self) -> Option<(Resource, i64)> {
        if self.power_remaining < 0 {
            Some((Resource::Power, -self.power_remaining))
        } else if self.workforce_remaining < 0 {
            Some((Resource::Workforce, -self.workforce_remaining))
        } else {
            None
        }
    }

    pub fn remaining(&self, resource: Resource) -> i64 {
        match resource {
            Resource::Power => self.power_remaining,
            Resource::Workforce => self.workforce_remaining,
        }
    }
}

/// Detailed capacity view of a system, for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacitySummary {
    pub system: String,
    pub base_power: i64,
    pub base_workforce: i64,
    pub power_added: i64,
    pub workforce_added: i64,
    pub report: CapacityReport,
    pub upgrades: Vec<Upgrade>,
}

/// Errors raised by upgrade validation and edits.
///
/// The display text is the reason shown to the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CapacityError {
    #[error("Unknown system: {0}")]
    UnknownSystem(String),

    #[error("Unknown upgrade: {0}")]
    UnknownUpgrade(String),

    #[error("Upgrade '{0}' is defined more than once in the catalog")]
    DuplicateCatalogEntry(String),

    #[error("Upgrade '{upgrade}' is already installed in {system}")]
    DuplicateUpgrade { system: String, upgrade: String },

    #[error("Insufficient {resource} in {system} for '{upgrade}': need {needed}, only {available} available (deficit: {deficit})")]
    Insufficient {
        system: String,
        upgrade: String,
        resource: Resource,
        needed: i64,
        available: i64,
        deficit: i64,
    },

    #[error("Upgrade '{upgrade}' is not installed in {system}")]
    NotInstalled { system: String, upgrade: String },

    #[error("Removing '{upgrade}' from {system} would overdraw {resource} by {deficit}")]
    RemovalOverdraws {
        system: String,
        upgrade: String,
        resource: Resource,
        deficit: i64,
    },

    #[error("Upgrade set of {system} exceeds {resource} capacity by {deficit}")]
    InvalidUpgradeSet {
        system: String,
        resource: Resource,
        deficit: i64,
    },

    #[error("Unknown preset: {0}. Use 'max_mining', 'max_ratting', 'balanced', or 'empty'")]
    UnknownPreset(String),
}
