//! Per-system upgrade sets and their edit operations.
//!
//! Every edit is validated against a scratch copy first and only committed
//! when the whole change is accepted.

use std::collections::BTreeMap;
use std::str::FromStr;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::region::{RegionGraph, System};

use super::catalog::UpgradeCatalog;
use super::types::{CapacityError, CapacityReport, CapacitySummary, Upgrade};
use super::validator::{capacity_added, check_addition, check_removal, evaluate};

/// Quick configurations that replace a system's upgrade set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    MaxMining,
    MaxRatting,
    Balanced,
    Empty,
}

impl Preset {
    /// Alternative groups of the preset. From each group the first upgrade
    /// that fits is installed.
    pub fn groups(&self) -> &'static [&'static [&'static str]] {
        match self {
            Preset::MaxMining => MAX_MINING,
            Preset::MaxRatting => MAX_RATTING,
            Preset::Balanced => BALANCED,
            Preset::Empty => &[],
        }
    }
}

const MAX_MINING: &[&[&str]] = &[&[
    "Prospecting Array 3",
    "Prospecting Array 2",
    "Prospecting Array 1",
]];
const MAX_RATTING: &[&[&str]] = &[
    &["Major Threat 3", "Major Threat 2", "Major Threat 1"],
    &["Minor Threat 3", "Minor Threat 2", "Minor Threat 1"],
];
const BALANCED: &[&[&str]] = &[&["Prospecting Array 1"], &["Major Threat 1"]];

impl FromStr for Preset {
    type Err = CapacityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "max_mining" => Ok(Preset::MaxMining),
            "max_ratting" => Ok(Preset::MaxRatting),
            "balanced" => Ok(Preset::Balanced),
            "empty" => Ok(Preset::Empty),
            _ => Err(CapacityError::UnknownPreset(s.to_string())),
        }
    }
}

/// Installed upgrades per system, in installation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemUpgrades {
    installed: BTreeMap<String, Vec<String>>,
}

fn resolve_system<'g>(graph: &'g RegionGraph, name: &str) -> Result<&'g System, CapacityError> {
    graph
        .system(name)
        .ok_or_else(|| CapacityError::UnknownSystem(name.to_string()))
}

fn resolve_upgrades<'c>(
    catalog: &'c UpgradeCatalog,
    names: &[String],
) -> Result<Vec<&'c Upgrade>, CapacityError> {
    names.iter().map(|n| catalog.require(n)).collect()
}

impl SystemUpgrades {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a stored mapping, validating every system's set
    pub fn from_map(
        graph: &RegionGraph,
        catalog: &UpgradeCatalog,
        installed: BTreeMap<String, Vec<String>>,
    ) -> Result<Self, CapacityError> {
        for (system_name, names) in &installed {
            let system = resolve_system(graph, system_name)?;
            let mut accepted: Vec<&Upgrade> = Vec::with_capacity(names.len());
            for name in names {
                let upgrade = catalog.require(name)?;
                if accepted.iter().any(|u| u.name == upgrade.name) {
                    return Err(CapacityError::DuplicateUpgrade {
                        system: system_name.clone(),
                        upgrade: name.clone(),
                    });
                }
                accepted.push(upgrade);
            }
            if let Some((resource, deficit)) = evaluate(system, accepted.iter().copied()).deficit() {
                return Err(CapacityError::InvalidUpgradeSet {
                    system: system_name.clone(),
                    resource,
                    deficit,
                });
            }
        }
        info!("Loaded upgrades for {} systems", installed.len());
        Ok(Self { installed })
    }

    /// Upgrades installed in `system`, in installation order
    pub fn installed(&self, system: &str) -> &[String] {
        self.installed.get(system).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Systems with at least one upgrade, in name order
    pub fn systems(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.installed
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.installed
    }

    /// Capacity report for the current set of `system`
    pub fn evaluate(
        &self,
        graph: &RegionGraph,
        catalog: &UpgradeCatalog,
        system: &str,
    ) -> Result<CapacityReport, CapacityError> {
        let sys = resolve_system(graph, system)?;
        let upgrades = resolve_upgrades(catalog, self.installed(system))?;
        Ok(evaluate(sys, upgrades))
    }

    /// Detailed capacity breakdown of `system`
    pub fn summary(
        &self,
        graph: &RegionGraph,
        catalog: &UpgradeCatalog,
        system: &str,
    ) -> Result<CapacitySummary, CapacityError> {
        let sys = resolve_system(graph, system)?;
        let upgrades = resolve_upgrades(catalog, self.installed(system))?;
        let (power_added, workforce_added) = capacity_added(upgrades.iter().copied());
        Ok(CapacitySummary {
            system: sys.name.clone(),
            base_power: sys.power,
            base_workforce: sys.workforce,
            power_added,
            workforce_added,
            report: evaluate(sys, upgrades.iter().copied()),
            upgrades: upgrades.into_iter().cloned().collect(),
        })
    }

    /// Check whether `upgrade` could be added to `system` without changing
    /// anything. Returns the report of the resulting set.
    pub fn can_add(
        &self,
        graph: &RegionGraph,
        catalog: &UpgradeCatalog,
        system: &str,
        upgrade: &str,
    ) -> Result<CapacityReport, CapacityError> {
        let sys = resolve_system(graph, system)?;
        let candidate = catalog.require(upgrade)?;
        let installed = resolve_upgrades(catalog, self.installed(system))?;
        check_addition(sys, &installed, candidate)
    }

    /// Add `upgrade` to `system` if capacity allows
    pub fn add(
        &mut self,
        graph: &RegionGraph,
        catalog: &UpgradeCatalog,
        system: &str,
        upgrade: &str,
    ) -> Result<CapacityReport, CapacityError> {
        let report = self.can_add(graph, catalog, system, upgrade)?;
        self.installed
            .entry(system.to_string())
            .or_default()
            .push(upgrade.to_string());
        info!(
            "Added '{}' to {} ({} power, {} workforce remaining)",
            upgrade, system, report.power_remaining, report.workforce_remaining
        );
        Ok(report)
    }

    /// Remove `upgrade` from `system` unless the remaining set would be
    /// overdrawn
    pub fn remove(
        &mut self,
        graph: &RegionGraph,
        catalog: &UpgradeCatalog,
        system: &str,
        upgrade: &str,
    ) -> Result<CapacityReport, CapacityError> {
        let sys = resolve_system(graph, system)?;
        let installed = resolve_upgrades(catalog, self.installed(system))?;
        let report = check_removal(sys, &installed, upgrade)?;

        if let Some(list) = self.installed.get_mut(system) {
            list.retain(|u| u != upgrade);
            if list.is_empty() {
                self.installed.remove(system);
            }
        }
        info!("Removed '{}' from {}", upgrade, system);
        Ok(report)
    }

    /// Remove every upgrade from `system`, returning what was installed
    pub fn clear(&mut self, graph: &RegionGraph, system: &str) -> Result<Vec<String>, CapacityError> {
        resolve_system(graph, system)?;
        let removed = self.installed.remove(system).unwrap_or_default();
        info!("Cleared {} upgrades from {}", removed.len(), system);
        Ok(removed)
    }

    /// Replace the set of `system` with the given preset.
    ///
    /// The new set is assembled on a scratch list and swapped in at the end.
    pub fn apply_preset(
        &mut self,
        graph: &RegionGraph,
        catalog: &UpgradeCatalog,
        system: &str,
        preset: Preset,
    ) -> Result<Vec<String>, CapacityError> {
        let sys = resolve_system(graph, system)?;
        let mut chosen: Vec<&Upgrade> = Vec::new();

        for group in preset.groups() {
            for name in group.iter() {
                let Some(candidate) = catalog.get(name) else {
                    warn!("Preset {:?} references '{}' which is not in the catalog", preset, name);
                    continue;
                };
                match check_addition(sys, &chosen, candidate) {
                    Ok(_) => {
                        chosen.push(candidate);
                        break;
                    }
                    Err(reason) => debug!("Preset {:?} skipped '{}': {}", preset, name, reason),
                }
            }
        }

        let names: Vec<String> = chosen.iter().map(|u| u.name.clone()).collect();
        if names.is_empty() {
            self.installed.remove(system);
        } else {
            self.installed.insert(system.to_string(), names.clone());
        }
        info!(
            "Applied preset {:?} to {}: {} upgrades installed",
            preset,
            system,
            names.len()
        );
        Ok(names)
    }
}
