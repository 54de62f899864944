//! The region planner: single owner of the graph, its bridges and the
//! per-system upgrade sets.
//!
//! Every edit goes through this type and is all-or-nothing; queries borrow
//! it immutably. Batch operations return full result structures and the
//! `plan` method assembles them into a [`PlanReport`].

use std::collections::BTreeMap;

use log::{info, warn};

use crate::analysis::{
    self, BridgeAnalysis, CapacityOverview, CentralityMetric, CentralityScore, Chokepoint,
    GraphCenter, PlacementAnalysis, PlanReport, ReportMetadata, StructureAnalysis,
};
use crate::bridges::{
    self, BridgeCheck, BridgeError, BridgePlan, BridgeSiteMetric, BridgeSummary, BridgeValue,
    JumpSavings, OptimizerSettings, RegionBridgeStatistics, StagingStatistics,
    SystemBridgeMetrics, TargetMode, WeightedTarget,
};
use crate::capacity::{
    CapacityError, CapacityReport, CapacitySummary, Preset, SystemUpgrades, Upgrade,
    UpgradeCatalog,
};
use crate::config::{PlanConfig, ValidationError};
use crate::placement::{
    self, DistributionParams, PlacementError, ScoreWeights, ScoredSystem, StrategyKind,
};
use crate::region::{spatial, Bridge, Hops, RegionError, RegionGraph, RegionSpec, Traversal};

/// Errors from any planning step
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0} requires a staging system")]
    MissingStaging(&'static str),
}

/// Coordinating owner of the region state
#[derive(Debug, Clone)]
pub struct RegionPlanner {
    name: String,
    graph: RegionGraph,
    catalog: UpgradeCatalog,
    upgrades: SystemUpgrades,
}

impl RegionPlanner {
    /// Build the graph and install the bridges already standing in `spec`.
    ///
    /// A standing bridge that violates the range or terminus constraints is
    /// rejected as `RegionError::InvalidBridge`.
    pub fn new(spec: &RegionSpec, catalog: UpgradeCatalog) -> Result<Self, RegionError> {
        let mut graph = RegionGraph::from_spec(spec)?;
        for (from, to) in &spec.bridges {
            bridges::add_bridge(&mut graph, from, to).map_err(|e| match e {
                BridgeError::Region(inner) => inner,
                other => RegionError::InvalidBridge(other.to_string()),
            })?;
        }
        let name = spec.name.clone().unwrap_or_else(|| "Unnamed region".to_string());
        info!(
            "Planner ready for {}: {} systems, {} bridges, {} upgrades in catalog",
            name,
            graph.len(),
            graph.bridges().len(),
            catalog.len()
        );
        Ok(Self {
            name,
            graph,
            catalog,
            upgrades: SystemUpgrades::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &RegionGraph {
        &self.graph
    }

    pub fn catalog(&self) -> &UpgradeCatalog {
        &self.catalog
    }

    pub fn upgrades(&self) -> &SystemUpgrades {
        &self.upgrades
    }

    // Region queries

    pub fn physical_distance(&self, a: &str, b: &str) -> Result<f64, RegionError> {
        spatial::physical_distance(&self.graph, a, b)
    }

    pub fn hop_distance(&self, a: &str, b: &str) -> Result<Hops, RegionError> {
        spatial::hop_distance(&self.graph, a, b)
    }

    pub fn hop_distances_from(&self, source: &str) -> Result<BTreeMap<String, u32>, RegionError> {
        spatial::hop_distances_from(&self.graph, source)
    }

    /// Hop distances from `source` ignoring bridges
    pub fn gate_hop_distances_from(&self, source: &str) -> Result<BTreeMap<String, u32>, RegionError> {
        let idx = self.graph.require(source)?;
        Ok(self
            .graph
            .bfs_with(idx, &Traversal::gates_only())
            .into_iter()
            .enumerate()
            .filter_map(|(i, d)| d.map(|d| (self.graph.name_of(i).to_string(), d)))
            .collect())
    }

    pub fn neighbors(&self, system: &str) -> Result<Vec<&str>, RegionError> {
        self.graph.neighbor_names(system)
    }

    pub fn constellation_systems(&self, constellation: &str) -> Vec<&str> {
        self.graph.constellation_systems(constellation)
    }

    pub fn shortest_route(&self, from: &str, to: &str) -> Result<Vec<String>, RegionError> {
        self.graph.shortest_route(from, to)
    }

    /// Connected components of the current graph, each sorted by name
    pub fn components(&self) -> Vec<Vec<String>> {
        self.graph
            .components(&Traversal::default())
            .into_iter()
            .map(|members| {
                let mut names: Vec<String> =
                    members.into_iter().map(|i| self.graph.name_of(i).to_string()).collect();
                names.sort_unstable();
                names
            })
            .collect()
    }

    /// True if the current graph (gates and bridges) is connected
    pub fn is_connected(&self) -> bool {
        self.graph.is_connected_with(&Traversal::default())
    }

    pub fn is_gate_connected(&self) -> bool {
        self.graph.is_gate_connected()
    }

    // Upgrades

    /// Replace every upgrade set with `installed`, validating all of them
    /// first
    pub fn load_upgrades(&mut self, installed: BTreeMap<String, Vec<String>>) -> Result<(), CapacityError> {
        self.upgrades = SystemUpgrades::from_map(&self.graph, &self.catalog, installed)?;
        Ok(())
    }

    pub fn evaluate_upgrades(&self, system: &str) -> Result<CapacityReport, CapacityError> {
        self.upgrades.evaluate(&self.graph, &self.catalog, system)
    }

    pub fn can_add_upgrade(&self, system: &str, upgrade: &str) -> Result<CapacityReport, CapacityError> {
        self.upgrades.can_add(&self.graph, &self.catalog, system, upgrade)
    }

    pub fn add_upgrade(&mut self, system: &str, upgrade: &str) -> Result<CapacityReport, CapacityError> {
        self.upgrades.add(&self.graph, &self.catalog, system, upgrade)
    }

    pub fn remove_upgrade(&mut self, system: &str, upgrade: &str) -> Result<CapacityReport, CapacityError> {
        self.upgrades.remove(&self.graph, &self.catalog, system, upgrade)
    }

    pub fn clear_upgrades(&mut self, system: &str) -> Result<Vec<String>, CapacityError> {
        self.upgrades.clear(&self.graph, system)
    }

    pub fn apply_preset(&mut self, system: &str, preset: Preset) -> Result<Vec<String>, CapacityError> {
        self.upgrades.apply_preset(&self.graph, &self.catalog, system, preset)
    }

    pub fn capacity_summary(&self, system: &str) -> Result<CapacitySummary, CapacityError> {
        self.upgrades.summary(&self.graph, &self.catalog, system)
    }

    pub fn upgrades_by_category(&self, category: &str) -> Vec<&Upgrade> {
        self.catalog.by_category(category)
    }

    /// Capacity summaries of every system carrying upgrades
    pub fn capacity_overview(&self) -> Result<CapacityOverview, CapacityError> {
        let mut systems = Vec::new();
        let mut invalid_systems = Vec::new();
        for (system, _) in self.upgrades.systems() {
            let summary = self.capacity_summary(system)?;
            if !summary.report.valid {
                invalid_systems.push(system.to_string());
            }
            systems.push(summary);
        }
        Ok(CapacityOverview {
            systems,
            invalid_systems,
        })
    }

    // Placement

    pub fn score_system(
        &self,
        system: &str,
        targets: &[&str],
        weights: &ScoreWeights,
        selected: &[&str],
    ) -> Result<f64, PlacementError> {
        placement::score(&self.graph, system, targets, weights, selected)
    }

    pub fn select_mining_systems(
        &self,
        targets: &[&str],
        count: usize,
        weights: &ScoreWeights,
    ) -> Result<Vec<ScoredSystem>, PlacementError> {
        placement::select_placements(&self.graph, targets, count, weights)
    }

    pub fn distribute(
        &self,
        strategy: StrategyKind,
        params: &DistributionParams,
    ) -> Result<Vec<ScoredSystem>, PlacementError> {
        strategy.select(&self.graph, params)
    }

    // Bridges

    pub fn check_bridge(&self, from: &str, to: &str) -> Result<BridgeCheck, BridgeError> {
        bridges::check_bridge(&self.graph, from, to)
    }

    pub fn add_bridge(&mut self, from: &str, to: &str) -> Result<Bridge, BridgeError> {
        bridges::add_bridge(&mut self.graph, from, to)
    }

    pub fn remove_bridge(&mut self, from: &str, to: &str) -> Result<Bridge, BridgeError> {
        bridges::remove_bridge(&mut self.graph, from, to)
    }

    pub fn clear_bridges(&mut self) -> Vec<Bridge> {
        bridges::clear_bridges(&mut self.graph)
    }

    pub fn bridges(&self) -> &[Bridge] {
        self.graph.bridges()
    }

    pub fn valid_connections(&self, system: &str, exclude: &[&str]) -> Result<Vec<(String, f64)>, BridgeError> {
        bridges::valid_connections(&self.graph, system, exclude)
    }

    pub fn bridge_summary(&self, system: &str) -> Result<BridgeSummary, BridgeError> {
        bridges::bridge_summary(&self.graph, system)
    }

    pub fn region_bridge_statistics(&self) -> RegionBridgeStatistics {
        bridges::region_bridge_statistics(&self.graph)
    }

    pub fn jump_savings(&self) -> JumpSavings {
        bridges::jump_savings(&self.graph)
    }

    pub fn staging_statistics(&self, staging: &str) -> Result<StagingStatistics, BridgeError> {
        bridges::staging_statistics(&self.graph, staging)
    }

    pub fn system_bridge_metrics(&self, system: &str) -> Result<SystemBridgeMetrics, BridgeError> {
        bridges::system_bridge_metrics(&self.graph, system)
    }

    pub fn rank_bridge_sites(&self, metric: BridgeSiteMetric, top_n: Option<usize>) -> Vec<CentralityScore> {
        bridges::rank_bridge_sites(&self.graph, metric, top_n)
    }

    pub fn bridge_value(&self, from: &str, to: &str) -> Result<BridgeValue, BridgeError> {
        bridges::bridge_value(&self.graph, from, to)
    }

    pub fn bridge_targets(
        &self,
        mode: TargetMode,
        staging: &str,
        regional_gates: &[&str],
        percentile: f64,
    ) -> Result<Vec<WeightedTarget>, BridgeError> {
        mode.build(&self.graph, staging, regional_gates, percentile)
    }

    /// Run the greedy optimizer and keep the bridges it commits
    pub fn optimize_bridges(
        &mut self,
        targets: &[WeightedTarget],
        settings: &OptimizerSettings,
    ) -> Result<BridgePlan, BridgeError> {
        bridges::optimize_bridges(&mut self.graph, targets, settings)
    }

    // Structural analysis

    pub fn chokepoints(&self) -> Vec<Chokepoint> {
        analysis::find_chokepoints(&self.graph)
    }

    pub fn betweenness(&self) -> BTreeMap<String, f64> {
        analysis::betweenness_centrality(&self.graph)
    }

    pub fn target_betweenness(&self, targets: &[WeightedTarget]) -> Result<BTreeMap<String, f64>, RegionError> {
        analysis::target_betweenness_centrality(&self.graph, targets)
    }

    pub fn closeness(&self) -> BTreeMap<String, f64> {
        analysis::closeness_centrality(&self.graph)
    }

    pub fn network_center(&self) -> Option<CentralityScore> {
        analysis::network_center(&self.graph)
    }

    pub fn graph_center(&self) -> GraphCenter {
        analysis::graph_center(&self.graph)
    }

    pub fn rank_centrality(
        &self,
        metric: CentralityMetric,
        targets: &[WeightedTarget],
        top_n: Option<usize>,
    ) -> Result<Vec<CentralityScore>, RegionError> {
        analysis::rank_centrality(&self.graph, metric, targets, top_n)
    }

    // Report sections

    /// Mining placement near the configured targets (the staging system when
    /// none are listed)
    pub fn mining_section(&self, config: &PlanConfig) -> Result<PlacementAnalysis, PlanError> {
        let weights = config.mining.score_weights()?;
        let targets: Vec<&str> = if config.mining.targets.is_empty() {
            let staging = config
                .staging_for(config.mining.staging.as_deref())
                .ok_or(PlanError::MissingStaging("Mining placement"))?;
            vec![staging]
        } else {
            config.mining.targets.iter().map(String::as_str).collect()
        };
        let systems = self.select_mining_systems(&targets, config.mining.count, &weights)?;
        Ok(PlacementAnalysis {
            strategy: "greedy".to_string(),
            systems,
        })
    }

    /// Distribution with the configured strategy
    pub fn distribution_section(&self, config: &PlanConfig) -> Result<PlacementAnalysis, PlanError> {
        let mut params = config.distribution.params.clone();
        params.staging = config.staging_for(params.staging.as_deref()).map(str::to_string);
        let strategy = config.distribution.strategy;
        let systems = self.distribute(strategy, &params)?;
        Ok(PlacementAnalysis {
            strategy: strategy.to_string(),
            systems,
        })
    }

    /// Bridge optimization from the configured staging system. Standing
    /// bridges are kept and the optimizer only adds to them; the best sites
    /// for further bridges are ranked on the resulting network.
    pub fn bridge_section(&mut self, config: &PlanConfig) -> Result<BridgeAnalysis, PlanError> {
        let staging = config
            .staging_for(config.bridges.staging.as_deref())
            .ok_or(PlanError::MissingStaging("Bridge optimization"))?
            .to_string();
        let gates: Vec<&str> = config.bridges.regional_gates.iter().map(String::as_str).collect();
        let targets = self.bridge_targets(
            config.bridges.target_mode,
            &staging,
            &gates,
            config.bridges.percentile,
        )?;
        let plan = self.optimize_bridges(&targets, &config.bridges.optimizer)?;
        Ok(BridgeAnalysis {
            target_mode: config.bridges.target_mode.to_string(),
            plan,
            staging: Some(self.staging_statistics(&staging)?),
            jump_savings: self.jump_savings(),
            region_statistics: self.region_bridge_statistics(),
            site_metric: config.bridges.site_metric.to_string(),
            candidate_sites: self.rank_bridge_sites(config.bridges.site_metric, Some(config.analysis.top_n)),
        })
    }

    /// Chokepoints and centrality rankings
    pub fn structure_section(&self, config: &PlanConfig) -> Result<StructureAnalysis, PlanError> {
        let top_n = Some(config.analysis.top_n);
        let top_target_betweenness = if config.analysis.targets.is_empty() {
            Vec::new()
        } else {
            self.rank_centrality(
                CentralityMetric::TargetBetweenness,
                &config.analysis.targets,
                top_n,
            )?
        };
        Ok(StructureAnalysis {
            chokepoints: self.chokepoints(),
            top_betweenness: self.rank_centrality(config.analysis.metric, &config.analysis.targets, top_n)?,
            top_target_betweenness,
            network_center: self.network_center(),
            graph_center: self.graph_center(),
        })
    }

    /// Apply the configured upgrade state: installed sets first, then presets.
    ///
    /// The new sets are built aside and only replace the current ones when
    /// every preset applies.
    pub fn apply_capacity_config(&mut self, config: &PlanConfig) -> Result<(), PlanError> {
        let mut upgrades = if config.capacity.installed.is_empty() {
            self.upgrades.clone()
        } else {
            SystemUpgrades::from_map(&self.graph, &self.catalog, config.capacity.installed.clone())?
        };
        for (system, preset) in &config.capacity.presets {
            upgrades.apply_preset(&self.graph, &self.catalog, system, *preset)?;
        }
        self.upgrades = upgrades;
        Ok(())
    }

    /// Run every planning step and collect the results.
    ///
    /// The steps run on a copy of the planner that replaces it only when all
    /// of them succeed, so a failed plan leaves bridges and upgrades as they
    /// were. Steps needing a staging system are skipped with a warning when
    /// none is configured.
    pub fn plan(&mut self, config: &PlanConfig) -> Result<PlanReport, PlanError> {
        config.validate()?;
        let mut staged = self.clone();
        let report = staged.run_steps(config)?;
        *self = staged;
        Ok(report)
    }

    fn run_steps(&mut self, config: &PlanConfig) -> Result<PlanReport, PlanError> {
        self.apply_capacity_config(config)?;
        let staging = config.general.staging.clone();

        let mut report = PlanReport::new(ReportMetadata::new(&self.graph, &self.name, staging.as_deref()));
        let mining_staging = config.staging_for(config.mining.staging.as_deref());
        if mining_staging.is_some() || !config.mining.targets.is_empty() {
            report.mining = Some(self.mining_section(config)?);
        } else {
            warn!("No staging system or mining targets configured; skipping mining placement");
        }

        match self.distribution_section(config) {
            Ok(section) => report.distribution = Some(section),
            Err(PlanError::Placement(PlacementError::MissingStaging(strategy))) => {
                warn!("Skipping distribution: strategy '{}' needs a staging system", strategy)
            }
            Err(e) => return Err(e),
        }

        if config.staging_for(config.bridges.staging.as_deref()).is_some() {
            report.bridges = Some(self.bridge_section(config)?);
        } else {
            warn!("No staging system configured; skipping bridge optimization");
        }

        report.structure = Some(self.structure_section(config)?);
        report.capacity = Some(self.capacity_overview()?);
        report.metadata.total_bridges = self.graph.bridges().len();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::graph::test_support::*;

    fn catalog() -> UpgradeCatalog {
        UpgradeCatalog::from_upgrades(vec![
            Upgrade::new("Prospecting Array 1", 500, 4000, "Mining"),
            Upgrade::new("Major Threat 1", 600, 5000, "Ratting"),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_installs_standing_bridges() {
        let mut spec = line(&["A", "B", "C", "D"]);
        spec.bridges.push(("A".to_string(), "D".to_string()));
        let planner = RegionPlanner::new(&spec, catalog()).unwrap();
        assert_eq!(planner.bridges().len(), 1);
        assert_eq!(planner.hop_distance("A", "D").unwrap(), Hops::Jumps(1));
        assert_eq!(planner.gate_hop_distances_from("A").unwrap()["D"], 3);
    }

    #[test]
    fn test_new_rejects_invalid_standing_bridges() {
        let mut spec = line(&["A", "B", "C", "D"]);
        spec.bridges.push(("A".to_string(), "C".to_string()));
        spec.bridges.push(("C".to_string(), "D".to_string()));
        assert!(matches!(
            RegionPlanner::new(&spec, catalog()),
            Err(RegionError::InvalidBridge(_))
        ));

        let mut spec = line(&["A", "B"]);
        spec.bridges.push(("A".to_string(), "Q".to_string()));
        assert_eq!(
            RegionPlanner::new(&spec, catalog()).unwrap_err(),
            RegionError::UnknownSystem("Q".to_string())
        );
    }

    #[test]
    fn test_components_and_connectivity() {
        let mut spec = line(&["A", "B"]);
        spec.systems.push(system("Z", "C1", 3.0));
        let mut planner = RegionPlanner::new(&spec, catalog()).unwrap();
        assert!(!planner.is_connected());
        assert_eq!(planner.components().len(), 2);

        planner.add_bridge("B", "Z").unwrap();
        assert!(planner.is_connected());
        assert!(!planner.is_gate_connected());
    }

    #[test]
    fn test_upgrade_edits_through_planner() {
        let mut planner = RegionPlanner::new(&line(&["A", "B"]), catalog()).unwrap();
        planner.add_upgrade("A", "Major Threat 1").unwrap();
        assert!(planner.add_upgrade("A", "Major Threat 1").is_err());
        let overview = planner.capacity_overview().unwrap();
        assert_eq!(overview.systems.len(), 1);
        assert!(overview.invalid_systems.is_empty());
        assert_eq!(planner.upgrades_by_category("ratting").len(), 1);
    }

    #[test]
    fn test_plan_without_staging_skips_staged_steps() {
        let spec = line(&["A", "B", "C"]);
        let mut planner = RegionPlanner::new(&spec, catalog()).unwrap();
        let report = planner.plan(&PlanConfig::default()).unwrap();
        assert!(report.mining.is_none());
        assert!(report.distribution.is_none());
        assert!(report.bridges.is_none());
        assert!(report.structure.is_some());
    }

    fn eight_system_planner() -> RegionPlanner {
        let names: Vec<String> = (0..8).map(|i| format!("S{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        RegionPlanner::new(&line(&refs), catalog()).unwrap()
    }

    #[test]
    fn test_failed_plan_leaves_state_untouched() {
        let mut planner = eight_system_planner();
        planner.add_upgrade("S3", "Major Threat 1").unwrap();
        let upgrades_before = planner.upgrades().clone();

        let mut config = PlanConfig::default();
        config
            .capacity
            .installed
            .insert("S1".to_string(), vec!["Prospecting Array 1".to_string()]);
        config.capacity.presets.insert("NOPE".to_string(), Preset::Balanced);
        assert_eq!(
            planner.apply_capacity_config(&config).unwrap_err(),
            PlanError::Capacity(CapacityError::UnknownSystem("NOPE".to_string()))
        );
        assert_eq!(planner.upgrades(), &upgrades_before);
        assert!(planner.plan(&config).is_err());
        assert_eq!(planner.upgrades(), &upgrades_before);

        // The bridge step succeeds before the analysis step fails
        let mut config = PlanConfig::default();
        config.general.staging = Some("S0".to_string());
        config.bridges.optimizer.max_bridges = 2;
        config.analysis.targets.push(WeightedTarget::new("NOPE", 1.0));
        assert_eq!(
            planner.plan(&config).unwrap_err(),
            PlanError::Region(RegionError::UnknownSystem("NOPE".to_string()))
        );
        assert!(planner.bridges().is_empty());
        assert_eq!(planner.upgrades(), &upgrades_before);
    }

    #[test]
    fn test_section_staging_overrides_general() {
        let mut planner = eight_system_planner();
        let mut config = PlanConfig::default();
        config.bridges.staging = Some("S7".to_string());
        config.bridges.optimizer.max_bridges = 1;

        let report = planner.plan(&config).unwrap();
        assert!(report.mining.is_none());
        let bridges = report.bridges.as_ref().unwrap();
        assert_eq!(bridges.staging.as_ref().map(|s| s.staging.as_str()), Some("S7"));
        assert_eq!(bridges.site_metric, "composite");
        assert_eq!(bridges.candidate_sites.len(), 8);
        assert_eq!(planner.bridges().len(), 1);
    }

    #[test]
    fn test_bridge_siting_through_planner() {
        let planner = eight_system_planner();
        let value = planner.bridge_value("S0", "S4").unwrap();
        assert_eq!(value.current_jumps, Hops::Jumps(4));
        assert!(value.improved_paths > 0);
        let metrics = planner.system_bridge_metrics("S0").unwrap();
        assert_eq!(metrics.bridge_connections, 5);
        let top = planner.rank_bridge_sites(BridgeSiteMetric::Connections, Some(1));
        assert_eq!(top[0].score, 7.0);
    }

    #[test]
    fn test_plan_with_staging() {
        let mut planner = eight_system_planner();

        let mut config = PlanConfig::default();
        config.general.staging = Some("S0".to_string());
        config.bridges.optimizer.max_bridges = 2;
        config
            .capacity
            .installed
            .insert("S1".to_string(), vec!["Prospecting Array 1".to_string()]);

        let report = planner.plan(&config).unwrap();
        assert_eq!(report.mining.as_ref().map(|m| m.systems.len()), Some(5));
        assert_eq!(report.distribution.as_ref().map(|d| d.systems.len()), Some(5));
        let bridges = report.bridges.as_ref().unwrap();
        assert!(!bridges.plan.bridges.is_empty());
        assert!(bridges.plan.final_objective < bridges.plan.baseline_objective);
        assert_eq!(report.metadata.total_bridges, planner.bridges().len());
        assert_eq!(report.capacity.as_ref().map(|c| c.systems.len()), Some(1));
    }
}
