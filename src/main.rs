//! Sovereignty region planning CLI.
//!
//! Loads a region, an upgrade catalog and an optional planning configuration,
//! runs the requested planning step and writes JSON and text reports.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Context, Result};
use env_logger::Env;
use log::info;

use sovplan::analysis::{self, CentralityMetric, PlanReport, ReportMetadata, StructureAnalysis};
use sovplan::bridges::{BridgeSiteMetric, TargetMode};
use sovplan::capacity::{Preset, UpgradeCatalog};
use sovplan::config::PlanConfig;
use sovplan::config_loader;
use sovplan::placement::StrategyKind;
use sovplan::RegionPlanner;

#[derive(Parser, Debug)]
#[command(name = "sovplan")]
#[command(about = "Sovereignty region planner: bridges, upgrade placement and structural analysis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Region file (systems, gates, standing bridges)
    #[arg(short, long, default_value = "region.yaml")]
    region: PathBuf,

    /// Upgrade catalog file
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Planning configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for reports
    #[arg(short, long, default_value = "plan_output")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error); falls back to the
    /// configuration, then to "info"
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every planning step
    Full {
        /// Staging system, overriding the configuration
        #[arg(long)]
        staging: Option<String>,
    },

    /// Select mining systems near the target systems
    Mining {
        /// Number of systems to select
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Target system (repeatable); defaults to the staging system
        #[arg(short, long = "target")]
        targets: Vec<String>,

        #[arg(long)]
        staging: Option<String>,
    },

    /// Distribute placements over the region
    Distribute {
        /// spread, cluster or one-per-group
        #[arg(long)]
        strategy: Option<StrategyKind>,

        #[arg(short = 'n', long)]
        count: Option<usize>,

        #[arg(long)]
        staging: Option<String>,
    },

    /// Greedily place jump bridges
    Bridges {
        #[arg(long)]
        staging: Option<String>,

        /// staging, farthest-systems or max-distance
        #[arg(long)]
        target_mode: Option<TargetMode>,

        #[arg(long)]
        max_bridges: Option<usize>,

        /// Ranking of sites for further bridges: composite, closeness,
        /// betweenness, connections or cross-constellation
        #[arg(long)]
        site_metric: Option<BridgeSiteMetric>,

        /// Remove standing bridges before optimizing
        #[arg(long)]
        fresh: bool,
    },

    /// List systems whose loss disconnects the region
    Chokepoints,

    /// Rank systems by a centrality metric
    Centrality {
        /// betweenness, target-betweenness, closeness or degree
        #[arg(long)]
        metric: Option<CentralityMetric>,

        /// Number of systems to list
        #[arg(long)]
        top: Option<usize>,
    },

    /// Show upgrade capacity, optionally applying a preset first
    Capacity {
        /// Restrict the report to one system
        #[arg(long)]
        system: Option<String>,

        /// Preset to apply to --system
        #[arg(long, requires = "system")]
        preset: Option<Preset>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Some(config_loader::load_config(path)?),
        None => None,
    };
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.general.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();
    let mut config = config.unwrap_or_default();

    let region = config_loader::load_region(&cli.region)?;
    let catalog = match &cli.catalog {
        Some(path) => config_loader::load_catalog(path)?,
        None => UpgradeCatalog::default(),
    };
    let mut planner = RegionPlanner::new(&region, catalog)
        .wrap_err_with(|| format!("Invalid region {}", cli.region.display()))?;
    if let Some(name) = &config.general.region_name {
        info!("Planning region {}", name);
    }

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create output directory: {}", cli.output.display()))?;

    match cli.command {
        Commands::Full { staging } => {
            override_staging(&mut config, staging);
            let mut report = planner.plan(&config)?;
            if let Some(name) = &config.general.region_name {
                report.metadata.region = name.clone();
            }
            write_reports(&report, &cli.output, "full")?;
        }
        Commands::Mining {
            count,
            targets,
            staging,
        } => {
            override_staging(&mut config, staging);
            if let Some(count) = count {
                config.mining.count = count;
            }
            if !targets.is_empty() {
                config.mining.targets = targets;
            }
            config.validate()?;
            let mut report = new_report(&planner, &config);
            report.mining = Some(planner.mining_section(&config)?);
            write_reports(&report, &cli.output, "mining")?;
        }
        Commands::Distribute {
            strategy,
            count,
            staging,
        } => {
            override_staging(&mut config, staging);
            if let Some(strategy) = strategy {
                config.distribution.strategy = strategy;
            }
            if let Some(count) = count {
                config.distribution.params.count = count;
            }
            config.validate()?;
            let mut report = new_report(&planner, &config);
            report.distribution = Some(planner.distribution_section(&config)?);
            write_reports(&report, &cli.output, "distribution")?;
        }
        Commands::Bridges {
            staging,
            target_mode,
            max_bridges,
            site_metric,
            fresh,
        } => {
            override_staging(&mut config, staging);
            if let Some(mode) = target_mode {
                config.bridges.target_mode = mode;
            }
            if let Some(max) = max_bridges {
                config.bridges.optimizer.max_bridges = max;
            }
            if let Some(metric) = site_metric {
                config.bridges.site_metric = metric;
            }
            config.validate()?;
            if config.staging_for(config.bridges.staging.as_deref()).is_none() {
                return Err(eyre!("Bridge optimization needs --staging or a configured staging system"));
            }
            if fresh {
                let removed = planner.clear_bridges();
                info!("Removed {} standing bridges", removed.len());
            }
            let mut report = new_report(&planner, &config);
            report.bridges = Some(planner.bridge_section(&config)?);
            report.metadata.total_bridges = planner.bridges().len();
            write_reports(&report, &cli.output, "bridges")?;
        }
        Commands::Chokepoints => {
            let mut report = new_report(&planner, &config);
            report.structure = Some(StructureAnalysis {
                chokepoints: planner.chokepoints(),
                top_betweenness: Vec::new(),
                top_target_betweenness: Vec::new(),
                network_center: None,
                graph_center: planner.graph_center(),
            });
            write_reports(&report, &cli.output, "chokepoints")?;
        }
        Commands::Centrality { metric, top } => {
            if let Some(metric) = metric {
                config.analysis.metric = metric;
            }
            if let Some(top) = top {
                config.analysis.top_n = top;
            }
            config.validate()?;
            let mut report = new_report(&planner, &config);
            report.structure = Some(planner.structure_section(&config)?);
            write_reports(&report, &cli.output, "centrality")?;
        }
        Commands::Capacity { system, preset } => {
            planner.apply_capacity_config(&config)?;
            let mut report = new_report(&planner, &config);
            let mut overview = planner.capacity_overview()?;
            if let Some(system) = system {
                if let Some(preset) = preset {
                    let installed = planner.apply_preset(&system, preset)?;
                    info!("Applied {:?} to {}: {}", preset, system, installed.join(", "));
                    overview = planner.capacity_overview()?;
                }
                let summary = planner.capacity_summary(&system)?;
                overview.systems.retain(|s| s.system == system);
                overview.invalid_systems.retain(|s| *s == system);
                if overview.systems.is_empty() {
                    overview.systems.push(summary);
                }
            }
            report.capacity = Some(overview);
            write_reports(&report, &cli.output, "capacity")?;
        }
    }

    info!("Planning complete. Reports written to {}", cli.output.display());
    Ok(())
}

/// `--staging` replaces the general staging system and every per-step one
fn override_staging(config: &mut PlanConfig, staging: Option<String>) {
    if staging.is_some() {
        config.general.staging = staging;
        config.mining.staging = None;
        config.distribution.params.staging = None;
        config.bridges.staging = None;
    }
}

fn new_report(planner: &RegionPlanner, config: &PlanConfig) -> PlanReport {
    let name = config.general.region_name.as_deref().unwrap_or(planner.name());
    PlanReport::new(ReportMetadata::new(
        planner.graph(),
        name,
        config.general.staging.as_deref(),
    ))
}

fn write_reports(report: &PlanReport, output_dir: &Path, stem: &str) -> Result<()> {
    analysis::generate_json_report(report, &output_dir.join(format!("{}_report.json", stem)))?;
    analysis::generate_text_report(report, &output_dir.join(format!("{}_report.txt", stem)))?;
    analysis::print_summary(report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["sovplan", "--region", "r.yaml", "chokepoints"]);
        assert_eq!(cli.region, PathBuf::from("r.yaml"));
        assert_eq!(cli.output, PathBuf::from("plan_output"));
        assert!(cli.catalog.is_none());
        assert!(matches!(cli.command, Commands::Chokepoints));
    }

    #[test]
    fn test_subcommand_value_parsing() {
        let cli = Cli::parse_from([
            "sovplan",
            "distribute",
            "--strategy",
            "one-per-group",
            "-n",
            "3",
        ]);
        match cli.command {
            Commands::Distribute { strategy, count, .. } => {
                assert_eq!(strategy, Some(StrategyKind::OnePerGroup));
                assert_eq!(count, Some(3));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::parse_from([
            "sovplan",
            "bridges",
            "--target-mode",
            "farthest-systems",
            "--site-metric",
            "cross-constellation",
            "--fresh",
        ]);
        match cli.command {
            Commands::Bridges {
                target_mode,
                site_metric,
                fresh,
                ..
            } => {
                assert_eq!(target_mode, Some(TargetMode::FarthestSystems));
                assert_eq!(site_metric, Some(BridgeSiteMetric::CrossConstellation));
                assert!(fresh);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_staging_override_clears_step_staging() {
        let mut config = PlanConfig::default();
        config.bridges.staging = Some("B".to_string());
        config.mining.staging = Some("M".to_string());
        override_staging(&mut config, Some("A".to_string()));
        assert_eq!(config.staging_for(config.bridges.staging.as_deref()), Some("A"));
        assert_eq!(config.staging_for(config.mining.staging.as_deref()), Some("A"));

        override_staging(&mut config, None);
        assert_eq!(config.general.staging.as_deref(), Some("A"));
    }

    #[test]
    fn test_preset_requires_system() {
        assert!(Cli::try_parse_from(["sovplan", "capacity", "--preset", "balanced"]).is_err());
        let cli = Cli::parse_from(["sovplan", "capacity", "--system", "A", "--preset", "max-mining"]);
        assert!(matches!(
            cli.command,
            Commands::Capacity { preset: Some(Preset::MaxMining), .. }
        ));
    }
}
