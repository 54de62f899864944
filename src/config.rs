//! Planning configuration.
//!
//! Every section is optional in YAML and falls back to documented defaults.
//! `PlanConfig::validate` checks value ranges the type system cannot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::CentralityMetric;
use crate::bridges::{BridgeSiteMetric, OptimizerSettings, TargetMode, WeightedTarget};
use crate::capacity::Preset;
use crate::placement::{DistributionParams, ScoreWeights, StrategyKind};
use crate::region::MAX_BRIDGE_RANGE_LY;

/// Top-level planning configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub mining: MiningConfig,
    #[serde(default)]
    pub distribution: DistributionConfig,
    #[serde(default)]
    pub bridges: BridgeConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub capacity: CapacityConfig,
}

/// Settings shared by every planning step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Staging system used when a step does not name its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging: Option<String>,
    /// Region name shown in reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    /// Log filter used when neither `--log-level` nor `RUST_LOG` is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Mining placement settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Staging system for this step, overriding `general.staging`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging: Option<String>,
    pub count: usize,
    /// Systems the placement should stay close to; the staging system when
    /// empty
    pub targets: Vec<String>,
    /// Named weights, e.g. `distance: -2.0`
    pub weights: BTreeMap<String, f64>,
    pub bool_attribute: crate::placement::BoolAttribute,
    pub magnitude_attribute: crate::placement::MagnitudeAttribute,
}

impl Default for MiningConfig {
    fn default() -> Self {
        let defaults = ScoreWeights::default();
        Self {
            staging: None,
            count: 5,
            targets: Vec::new(),
            weights: BTreeMap::new(),
            bool_attribute: defaults.bool_attribute,
            magnitude_attribute: defaults.magnitude_attribute,
        }
    }
}

impl MiningConfig {
    /// Resolve the named weights against their defaults
    pub fn score_weights(&self) -> Result<ScoreWeights, ValidationError> {
        let mut weights = ScoreWeights::from_named(&self.weights)
            .map_err(|e| ValidationError::InvalidMining(e.to_string()))?;
        weights.bool_attribute = self.bool_attribute;
        weights.magnitude_attribute = self.magnitude_attribute;
        Ok(weights)
    }
}

/// Distribution settings: the strategy plus its parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(flatten)]
    pub params: DistributionParams,
}

/// Bridge optimizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Staging system for this step, overriding `general.staging`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging: Option<String>,
    pub target_mode: TargetMode,
    /// Entry systems weighted by the staging target mode
    pub regional_gates: Vec<String>,
    /// Percentile for the farthest-systems target mode
    pub percentile: f64,
    /// Ranking of candidate sites for further bridges
    pub site_metric: BridgeSiteMetric,
    #[serde(flatten)]
    pub optimizer: OptimizerSettings,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            staging: None,
            target_mode: TargetMode::default(),
            regional_gates: Vec::new(),
            percentile: crate::bridges::targets::DEFAULT_PERCENTILE,
            site_metric: BridgeSiteMetric::default(),
            optimizer: OptimizerSettings::default(),
        }
    }
}

/// Structural analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of systems listed per centrality ranking
    pub top_n: usize,
    pub metric: CentralityMetric,
    /// Targets of the target-weighted betweenness
    pub targets: Vec<WeightedTarget>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            metric: CentralityMetric::default(),
            targets: Vec::new(),
        }
    }
}

/// Initial upgrade state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Upgrades already installed, per system
    pub installed: BTreeMap<String, Vec<String>>,
    /// Presets applied per system after the installed sets are loaded
    pub presets: BTreeMap<String, Preset>,
}

impl PlanConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(staging) = &self.general.staging {
            if staging.trim().is_empty() {
                return Err(ValidationError::InvalidGeneral(
                    "staging cannot be empty".to_string(),
                ));
            }
        }
        if self.mining.staging.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(ValidationError::InvalidMining("staging cannot be empty".to_string()));
        }
        if self.bridges.staging.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(ValidationError::InvalidBridges("staging cannot be empty".to_string()));
        }

        let weights = self.mining.score_weights()?;
        for (name, value) in [
            ("distance", weights.distance),
            ("attribute_bonus", weights.attribute_bonus),
            ("magnitude", weights.magnitude),
            ("clustering", weights.clustering),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::InvalidMining(format!(
                    "weight '{}' must be finite",
                    name
                )));
            }
        }

        let params = &self.distribution.params;
        if params.band_min > params.band_max {
            return Err(ValidationError::InvalidDistribution(format!(
                "band_min ({}) cannot exceed band_max ({})",
                params.band_min, params.band_max
            )));
        }
        if !params.security_weight.is_finite() || !params.proximity_weight.is_finite() {
            return Err(ValidationError::InvalidDistribution(
                "weights must be finite".to_string(),
            ));
        }
        if !(params.group_penalty.is_finite() && params.group_penalty >= 0.0) {
            return Err(ValidationError::InvalidDistribution(
                "group_penalty must be a non-negative number".to_string(),
            ));
        }

        let bridges = &self.bridges;
        if !(bridges.optimizer.range_ly > 0.0 && bridges.optimizer.range_ly <= MAX_BRIDGE_RANGE_LY) {
            return Err(ValidationError::InvalidBridges(format!(
                "range_ly must be within (0, {}], got {}",
                MAX_BRIDGE_RANGE_LY, bridges.optimizer.range_ly
            )));
        }
        if !(0.0..=1.0).contains(&bridges.percentile) {
            return Err(ValidationError::InvalidBridges(format!(
                "percentile must be within [0, 1], got {}",
                bridges.percentile
            )));
        }

        for target in &self.analysis.targets {
            if !(target.weight.is_finite() && target.weight > 0.0) {
                return Err(ValidationError::InvalidAnalysis(format!(
                    "target weight for {} must be positive",
                    target.system
                )));
            }
        }

        for (system, upgrades) in &self.capacity.installed {
            let mut seen: Vec<&String> = Vec::with_capacity(upgrades.len());
            for upgrade in upgrades {
                if seen.contains(&upgrade) {
                    return Err(ValidationError::InvalidCapacity(format!(
                        "upgrade '{}' listed twice for {}",
                        upgrade, system
                    )));
                }
                seen.push(upgrade);
            }
        }

        Ok(())
    }

    /// Staging system for a step: the step's own setting, else the general one
    pub fn staging_for<'a>(&'a self, step_staging: Option<&'a str>) -> Option<&'a str> {
        step_staging.or(self.general.staging.as_deref())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid mining configuration: {0}")]
    InvalidMining(String),
    #[error("Invalid distribution configuration: {0}")]
    InvalidDistribution(String),
    #[error("Invalid bridges configuration: {0}")]
    InvalidBridges(String),
    #[error("Invalid analysis configuration: {0}")]
    InvalidAnalysis(String),
    #[error("Invalid capacity configuration: {0}")]
    InvalidCapacity(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: PlanConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.mining.count, 5);
        assert_eq!(config.distribution.strategy, StrategyKind::Spread);
        assert_eq!(config.bridges.optimizer.max_bridges, 10);
        assert_eq!(config.bridges.percentile, 0.8);
        assert_eq!(config.analysis.top_n, 10);
    }

    #[test]
    fn test_full_config_parsing() {
        let yaml = r#"
general:
  staging: "X-7OMU"
mining:
  count: 3
  weights:
    distance: -1.5
    clustering: 0.0
  magnitude_attribute: belts
distribution:
  strategy: cluster
  count: 4
  band_min: 1
  band_max: 3
bridges:
  staging: "Z-H2MA"
  target_mode: farthest_systems
  site_metric: cross_constellation
  max_bridges: 4
  time_budget: 30s
analysis:
  metric: closeness
  targets:
    - system: "X-7OMU"
      weight: 2.0
capacity:
  installed:
    "X-7OMU": ["Major Threat 1"]
  presets:
    "Y-2ANO": max_mining
"#;
        let config: PlanConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();

        let weights = config.mining.score_weights().unwrap();
        assert_eq!(weights.distance, -1.5);
        assert_eq!(weights.clustering, 0.0);
        assert_eq!(weights.attribute_bonus, 10.0);
        assert_eq!(config.distribution.strategy, StrategyKind::Cluster);
        assert_eq!(config.distribution.params.count, 4);
        assert_eq!(config.distribution.params.security_weight, 2.0);
        assert_eq!(config.bridges.target_mode, TargetMode::FarthestSystems);
        assert_eq!(config.bridges.optimizer.time_budget, Some(Duration::from_secs(30)));
        assert_eq!(config.analysis.metric, CentralityMetric::Closeness);
        assert_eq!(config.capacity.presets["Y-2ANO"], Preset::MaxMining);
        assert_eq!(config.bridges.site_metric, BridgeSiteMetric::CrossConstellation);
        assert_eq!(config.staging_for(config.mining.staging.as_deref()), Some("X-7OMU"));
        assert_eq!(config.staging_for(config.bridges.staging.as_deref()), Some("Z-H2MA"));
    }

    #[test]
    fn test_unknown_weight_is_rejected() {
        let yaml = "mining:\n  weights:\n    luck: 1.0\n";
        let config: PlanConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidMining(_))));
    }

    #[test]
    fn test_invalid_ranges_are_rejected() {
        let mut config = PlanConfig::default();
        config.distribution.params.band_min = 5;
        config.distribution.params.band_max = 2;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidDistribution(_))));

        let mut config = PlanConfig::default();
        config.bridges.optimizer.range_ly = 6.0;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidBridges(_))));

        let mut config = PlanConfig::default();
        config.bridges.percentile = 1.2;
        assert!(config.validate().is_err());

        let mut config = PlanConfig::default();
        config.bridges.staging = Some(" ".to_string());
        assert!(matches!(config.validate(), Err(ValidationError::InvalidBridges(_))));

        let mut config = PlanConfig::default();
        config.analysis.targets.push(WeightedTarget::new("A", -1.0));
        assert!(matches!(config.validate(), Err(ValidationError::InvalidAnalysis(_))));

        let mut config = PlanConfig::default();
        config
            .capacity
            .installed
            .insert("A".to_string(), vec!["X".to_string(), "X".to_string()]);
        assert!(matches!(config.validate(), Err(ValidationError::InvalidCapacity(_))));
    }
}
