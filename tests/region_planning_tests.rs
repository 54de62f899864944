//! End-to-end tests of the region planner: YAML loading, planning steps and
//! invariants checked over seeded random regions.

use std::collections::HashSet;
use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::NamedTempFile;

use sovplan::analysis;
use sovplan::bridges::{uniform_targets, OptimizerSettings, Termination};
use sovplan::capacity::{Upgrade, UpgradeCatalog};
use sovplan::config_loader::{load_catalog, load_config, load_region};
use sovplan::placement::{DistributionParams, StrategyKind};
use sovplan::region::{Hops, Position, RegionSpec, System, METERS_PER_LY};
use sovplan::RegionPlanner;

fn system(name: &str, constellation: &str, pos_ly: (f64, f64, f64), security: f64) -> System {
    System {
        name: name.to_string(),
        constellation: constellation.to_string(),
        security,
        position: Position::new(
            pos_ly.0 * METERS_PER_LY,
            pos_ly.1 * METERS_PER_LY,
            pos_ly.2 * METERS_PER_LY,
        ),
        has_ice: false,
        moons: 0,
        planets: 0,
        belts: 0,
        power: 2500,
        workforce: 18000,
    }
}

/// Random region: systems in a 10 LY cube, a spanning chain of gates plus a
/// few extra gates, and occasionally a detached system.
fn random_region(seed: u64, n: usize) -> RegionSpec {
    let mut rng = StdRng::seed_from_u64(seed);
    let systems: Vec<System> = (0..n)
        .map(|i| {
            system(
                &format!("S{:02}", i),
                &format!("C{}", i % 3),
                (
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(0.0..10.0),
                ),
                rng.gen_range(-1.0..0.0),
            )
        })
        .collect();

    let detached = rng.gen_bool(0.3);
    let chained = if detached { n - 1 } else { n };
    let mut gates = Vec::new();
    for i in 1..chained {
        let parent = rng.gen_range(0..i);
        gates.push((systems[parent].name.clone(), systems[i].name.clone()));
    }
    for _ in 0..n / 3 {
        let a = rng.gen_range(0..chained);
        let b = rng.gen_range(0..chained);
        if a != b {
            gates.push((systems[a].name.clone(), systems[b].name.clone()));
        }
    }

    RegionSpec {
        name: Some(format!("Random {}", seed)),
        systems,
        gates,
        bridges: Vec::new(),
    }
}

fn catalog() -> UpgradeCatalog {
    UpgradeCatalog::from_upgrades(vec![
        Upgrade::new("Major Threat 2", 1000, 8000, "Ratting"),
        Upgrade::new("Power Monitoring Division 1", -200, 2500, "Capacity"),
    ])
    .unwrap()
}

#[test]
fn test_hop_distance_is_symmetric() {
    for seed in 0..10 {
        let spec = random_region(seed, 14);
        let planner = RegionPlanner::new(&spec, catalog()).unwrap();
        for a in &spec.systems {
            for b in &spec.systems {
                assert_eq!(
                    planner.hop_distance(&a.name, &b.name).unwrap(),
                    planner.hop_distance(&b.name, &a.name).unwrap(),
                    "seed {}: {} <-> {}",
                    seed,
                    a.name,
                    b.name
                );
            }
        }
    }
}

#[test]
fn test_physical_distance_is_a_metric() {
    let spec = random_region(42, 12);
    let planner = RegionPlanner::new(&spec, catalog()).unwrap();
    let names: Vec<&str> = spec.systems.iter().map(|s| s.name.as_str()).collect();
    for &a in &names {
        assert_eq!(planner.physical_distance(a, a).unwrap(), 0.0);
        for &b in &names {
            let ab = planner.physical_distance(a, b).unwrap();
            assert_eq!(ab, planner.physical_distance(b, a).unwrap());
            for &c in &names {
                let ac = planner.physical_distance(a, c).unwrap();
                let cb = planner.physical_distance(c, b).unwrap();
                assert!(ab <= ac + cb + 1e-9, "{} {} {}", a, b, c);
            }
        }
    }
}

#[test]
fn test_optimizer_respects_bridge_constraints() {
    for seed in 0..8 {
        let spec = random_region(seed, 16);
        let mut planner = RegionPlanner::new(&spec, catalog()).unwrap();
        let targets = uniform_targets(planner.graph());
        let settings = OptimizerSettings {
            max_bridges: 6,
            ..OptimizerSettings::default()
        };
        let plan = planner.optimize_bridges(&targets, &settings).unwrap();

        let mut termini = HashSet::new();
        for bridge in &plan.bridges {
            let distance = planner.physical_distance(&bridge.from, &bridge.to).unwrap();
            assert!(distance <= 5.0, "seed {}: {:.3} LY", seed, distance);
            assert!(termini.insert(bridge.from.clone()), "seed {}: {} reused", seed, bridge.from);
            assert!(termini.insert(bridge.to.clone()), "seed {}: {} reused", seed, bridge.to);
        }
        assert_eq!(plan.bridges.len(), planner.bridges().len());
        assert!(plan.final_objective <= plan.baseline_objective);
    }
}

#[test]
fn test_zero_bridges_leaves_graph_unchanged() {
    let spec = random_region(7, 12);
    let mut planner = RegionPlanner::new(&spec, catalog()).unwrap();
    let before = planner.hop_distances_from("S00").unwrap();
    let targets = uniform_targets(planner.graph());
    let settings = OptimizerSettings {
        max_bridges: 0,
        ..OptimizerSettings::default()
    };
    let plan = planner.optimize_bridges(&targets, &settings).unwrap();
    assert!(plan.bridges.is_empty());
    assert_eq!(plan.termination, Termination::MaxBridgesReached);
    assert!(planner.bridges().is_empty());
    assert_eq!(planner.hop_distances_from("S00").unwrap(), before);
}

#[test]
fn test_distribution_returns_distinct_systems() {
    let strategies = [StrategyKind::Spread, StrategyKind::Cluster, StrategyKind::OnePerGroup];
    for seed in 0..5 {
        let spec = random_region(100 + seed, 10);
        let planner = RegionPlanner::new(&spec, catalog()).unwrap();
        for strategy in strategies {
            for count in [0, 1, 4, 10, 15] {
                let params = DistributionParams {
                    count,
                    staging: Some("S00".to_string()),
                    ..DistributionParams::default()
                };
                let picks = planner.distribute(strategy, &params).unwrap();
                let distinct: HashSet<&str> = picks.iter().map(|p| p.system.as_str()).collect();
                assert_eq!(picks.len(), count.min(10), "{} count {}", strategy, count);
                assert_eq!(distinct.len(), picks.len(), "{} count {}", strategy, count);
            }
        }
    }
}

#[test]
fn test_capacity_reference_case() {
    let spec = RegionSpec {
        name: None,
        systems: vec![system("A", "C1", (0.0, 0.0, 0.0), -0.5)],
        gates: Vec::new(),
        bridges: Vec::new(),
    };
    let mut planner = RegionPlanner::new(&spec, catalog()).unwrap();
    planner.add_upgrade("A", "Major Threat 2").unwrap();
    planner.add_upgrade("A", "Power Monitoring Division 1").unwrap();

    let report = planner.evaluate_upgrades("A").unwrap();
    assert_eq!(report.power_used, 1000);
    assert_eq!(report.power_capacity, 2700);
    assert_eq!(report.workforce_used, 10500);
    assert_eq!(report.workforce_capacity, 18000);
    assert!(report.valid);

    // Pure: evaluating again gives the same answer
    assert_eq!(planner.evaluate_upgrades("A").unwrap(), report);

    // Duplicates are rejected without touching the set
    assert!(planner.add_upgrade("A", "Major Threat 2").is_err());
    assert_eq!(planner.upgrades().installed("A").len(), 2);
}

#[test]
fn test_hub_between_two_subgraphs_is_a_chokepoint() {
    // Ring of four and ring of three joined only through H
    let mut systems = Vec::new();
    for (i, name) in ["X1", "X2", "X3", "X4"].iter().enumerate() {
        systems.push(system(name, "West", (i as f64, 0.0, 0.0), -0.2));
    }
    for (i, name) in ["Y1", "Y2", "Y3"].iter().enumerate() {
        systems.push(system(name, "East", (i as f64, 20.0, 0.0), -0.2));
    }
    systems.push(system("H", "Hub", (0.0, 10.0, 0.0), -0.2));
    let gate = |a: &str, b: &str| (a.to_string(), b.to_string());
    let spec = RegionSpec {
        name: None,
        systems,
        gates: vec![
            gate("X1", "X2"),
            gate("X2", "X3"),
            gate("X3", "X4"),
            gate("X4", "X1"),
            gate("Y1", "Y2"),
            gate("Y2", "Y3"),
            gate("Y3", "Y1"),
            gate("H", "X1"),
            gate("H", "Y1"),
        ],
        bridges: Vec::new(),
    };
    let planner = RegionPlanner::new(&spec, catalog()).unwrap();
    let chokepoints = planner.chokepoints();
    let hub = chokepoints.iter().find(|c| c.system == "H").unwrap();
    assert_eq!(hub.components_after, 2);
    assert_eq!(hub.largest_component, 4);
    assert_eq!(hub.impact, 8);
    assert!(chokepoints.windows(2).all(|w| w[0].impact >= w[1].impact));
    assert!(chokepoints.iter().all(|c| c.system != "X2" && c.system != "Y2"));
}

#[test]
fn test_full_plan_from_yaml_files() {
    let mut region = NamedTempFile::new().unwrap();
    write!(
        region,
        r#"
name: Test Region
systems:
  - {{name: A, constellation: North, security: -0.1, position: {{x: 0.0, y: 0.0, z: 0.0}}, power: 2500, workforce: 18000}}
  - {{name: B, constellation: North, security: -0.3, position: {{x: 9.461e15, y: 0.0, z: 0.0}}, power: 2500, workforce: 18000, has_ice: true}}
  - {{name: C, constellation: North, security: -0.5, position: {{x: 1.8922e16, y: 0.0, z: 0.0}}, power: 2500, workforce: 18000}}
  - {{name: D, constellation: South, security: -0.7, position: {{x: 2.8383e16, y: 0.0, z: 0.0}}, power: 2500, workforce: 18000, moons: 12}}
  - {{name: E, constellation: South, security: -0.9, position: {{x: 3.7844e16, y: 0.0, z: 0.0}}, power: 2500, workforce: 18000}}
  - {{name: F, constellation: South, security: -1.0, position: {{x: 4.7305e16, y: 0.0, z: 0.0}}, power: 2500, workforce: 18000}}
gates:
  - [A, B]
  - [B, C]
  - [C, D]
  - [D, E]
  - [E, F]
"#
    )
    .unwrap();

    let mut upgrades = NamedTempFile::new().unwrap();
    write!(
        upgrades,
        r#"
- {{name: "Prospecting Array 1", power: 500, workforce: 4000, category: Mining}}
- {{name: "Major Threat 1", power: 600, workforce: 5000, category: Ratting}}
"#
    )
    .unwrap();

    let mut config = NamedTempFile::new().unwrap();
    write!(
        config,
        r#"
general:
  staging: A
mining:
  count: 2
distribution:
  strategy: one_per_group
  count: 2
bridges:
  max_bridges: 1
  time_budget: 10s
analysis:
  top_n: 3
capacity:
  presets:
    D: balanced
"#
    )
    .unwrap();

    let spec = load_region(region.path()).unwrap();
    let catalog = load_catalog(upgrades.path()).unwrap();
    let config = load_config(config.path()).unwrap();

    let mut planner = RegionPlanner::new(&spec, catalog).unwrap();
    assert_eq!(planner.name(), "Test Region");
    let report = planner.plan(&config).unwrap();

    let mining = report.mining.as_ref().unwrap();
    assert_eq!(mining.systems.len(), 2);

    let distribution = report.distribution.as_ref().unwrap();
    let picked: Vec<&str> = distribution.systems.iter().map(|s| s.system.as_str()).collect();
    assert_eq!(picked, vec!["A", "D"]);

    let bridges = report.bridges.as_ref().unwrap();
    assert_eq!(bridges.plan.bridges.len(), 1);
    assert_eq!(bridges.plan.bridges[0].from, "A");
    assert_eq!(planner.hop_distance("A", "F").unwrap(), Hops::Jumps(2));

    let structure = report.structure.as_ref().unwrap();
    assert_eq!(structure.top_betweenness.len(), 3);
    assert!(!structure.chokepoints.is_empty());

    let capacity = report.capacity.as_ref().unwrap();
    assert_eq!(capacity.systems.len(), 1);
    assert_eq!(capacity.systems[0].system, "D");
    assert_eq!(capacity.systems[0].upgrades.len(), 2);

    let json = NamedTempFile::new().unwrap();
    analysis::generate_json_report(&report, json.path()).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json.path()).unwrap()).unwrap();
    assert_eq!(value["metadata"]["total_bridges"], 1);
    assert_eq!(value["metadata"]["staging"], "A");
}

#[test]
fn test_sample_data_plans_cleanly() {
    let data = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let spec = load_region(&data.join("sample_region.yaml")).unwrap();
    let catalog = load_catalog(&data.join("upgrades.yaml")).unwrap();
    let config = load_config(&data.join("plan.yaml")).unwrap();

    let mut planner = RegionPlanner::new(&spec, catalog).unwrap();
    assert!(planner.is_gate_connected());
    let gate_chokepoints: Vec<String> = planner.chokepoints().into_iter().map(|c| c.system).collect();
    assert_eq!(gate_chokepoints[0], "1DQ1-A");
    assert!(gate_chokepoints.iter().any(|s| s == "N-8YET"));
    let report = planner.plan(&config).unwrap();

    assert_eq!(report.mining.as_ref().map(|m| m.systems.len()), Some(4));
    assert_eq!(report.distribution.as_ref().map(|d| d.systems.len()), Some(5));
    let bridges = report.bridges.as_ref().unwrap();
    assert_eq!(planner.bridges().len(), bridges.plan.bridges.len());
    assert_eq!(bridges.candidate_sites.len(), 5);

    // Chokepoints are taken on the bridged network, where only N-8YET still
    // splits the region
    let structure = report.structure.as_ref().unwrap();
    let chokepoints: Vec<&str> = structure.chokepoints.iter().map(|c| c.system.as_str()).collect();
    assert_eq!(chokepoints, vec!["N-8YET"]);
    assert!(chokepoints.len() < gate_chokepoints.len());
    assert_eq!(structure.top_target_betweenness.len(), 5);

    let capacity = report.capacity.as_ref().unwrap();
    assert!(capacity.invalid_systems.is_empty());
    assert_eq!(
        planner.upgrades().installed("K-6K16"),
        &["Prospecting Array 2".to_string()]
    );
    assert!(analysis::render_text_report(&report).contains("BRIDGE NETWORK"));
}
