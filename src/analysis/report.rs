//! Report generation for region plans.
//!
//! Generates both JSON and human-readable text reports.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};

use crate::region::{EdgeKind, RegionGraph};

use super::types::*;

impl ReportMetadata {
    /// Metadata for a report about `graph`, stamped with the current time
    pub fn new(graph: &RegionGraph, region: &str, staging: Option<&str>) -> Self {
        let edges = graph.edges();
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            region: region.to_string(),
            total_systems: graph.len(),
            total_gates: edges.iter().filter(|e| e.kind == EdgeKind::Gate).count(),
            total_bridges: graph.bridges().len(),
            staging: staging.map(str::to_string),
        }
    }
}

impl PlanReport {
    /// Empty report; sections are filled in as operations run
    pub fn new(metadata: ReportMetadata) -> Self {
        Self {
            metadata,
            mining: None,
            distribution: None,
            bridges: None,
            structure: None,
            capacity: None,
        }
    }
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push("=".repeat(80));
    lines.push(format!("{:^80}", title));
    lines.push("=".repeat(80));
    lines.push(String::new());
}

fn placement_lines(lines: &mut Vec<String>, placement: &PlacementAnalysis) {
    lines.push(format!("Strategy: {}", placement.strategy));
    for (i, pick) in placement.systems.iter().enumerate() {
        lines.push(format!("  {:2}. {:<12} score {:>8.2}", i + 1, pick.system, pick.score));
    }
    lines.push(String::new());
}

/// Render the human-readable text report
pub fn render_text_report(report: &PlanReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    section(&mut lines, "SOVEREIGNTY REGION PLAN");
    lines.push(format!("Generated: {}", report.metadata.generated_at));
    lines.push(format!("Region: {}", report.metadata.region));
    lines.push(format!("Systems: {}", report.metadata.total_systems));
    lines.push(format!("Gates: {}", report.metadata.total_gates));
    lines.push(format!("Bridges: {}", report.metadata.total_bridges));
    if let Some(ref staging) = report.metadata.staging {
        lines.push(format!("Staging: {}", staging));
    }
    lines.push(String::new());

    if let Some(ref mining) = report.mining {
        section(&mut lines, "MINING PLACEMENT");
        placement_lines(&mut lines, mining);
    }

    if let Some(ref distribution) = report.distribution {
        section(&mut lines, "RATTING DISTRIBUTION");
        placement_lines(&mut lines, distribution);
    }

    if let Some(ref bridges) = report.bridges {
        section(&mut lines, "BRIDGE NETWORK");
        let plan = &bridges.plan;
        lines.push(format!("Objective: {}", bridges.target_mode));
        lines.push(format!(
            "Weighted average jumps: {:.3} -> {:.3}",
            plan.baseline_objective, plan.final_objective
        ));
        lines.push(format!(
            "Placed {} bridges ({})",
            plan.bridges.len(),
            plan.termination
        ));
        for (i, bridge) in plan.bridges.iter().enumerate() {
            lines.push(format!(
                "  {:2}. {} <-> {} ({:.2} LY, improvement {:.3})",
                i + 1,
                bridge.from,
                bridge.to,
                bridge.distance_ly,
                bridge.improvement
            ));
        }
        lines.push(String::new());

        if let Some(ref staging) = bridges.staging {
            lines.push(format!(
                "From {}: average {:.2} jumps, max {} jumps",
                staging.staging, staging.average_jumps, staging.max_jumps
            ));
            if staging.unreachable > 0 {
                lines.push(format!("  {} systems unreachable", staging.unreachable));
            }
        }

        let savings = &bridges.jump_savings;
        lines.push(format!(
            "All pairs: {:.2} jumps via gates, {:.2} with bridges ({} pairs improved)",
            savings.average_jumps_gates_only, savings.average_jumps_with_bridges, savings.improved_pairs
        ));
        for improvement in savings.top_improvements.iter().take(5) {
            lines.push(format!(
                "  {} -> {}: {} -> {} jumps",
                improvement.from, improvement.to, improvement.gate_jumps, improvement.bridged_jumps
            ));
        }

        let stats = &bridges.region_statistics;
        lines.push(format!(
            "In-range pairs: {} (avg {:.1} per system, {} systems with none)",
            stats.possible_connections,
            stats.average_connections_per_system,
            stats.systems_without_connections
        ));
        if !bridges.candidate_sites.is_empty() {
            lines.push(format!("Best sites for further bridges ({}):", bridges.site_metric));
            for (i, site) in bridges.candidate_sites.iter().enumerate() {
                lines.push(format!("  {:2}. {:<12} {:.3}", i + 1, site.system, site.score));
            }
        }
        lines.push(String::new());
    }

    if let Some(ref structure) = report.structure {
        section(&mut lines, "STRUCTURAL ANALYSIS");
        if structure.chokepoints.is_empty() {
            lines.push("No chokepoints: the network survives the loss of any single system.".to_string());
        } else {
            lines.push("Chokepoints (by impact):".to_string());
            for cp in structure.chokepoints.iter().take(10) {
                lines.push(format!(
                    "  {:<12} impact {:>4} ({} components, largest {}) [{}]",
                    cp.system, cp.impact, cp.components_after, cp.largest_component, cp.constellation
                ));
            }
        }
        lines.push(String::new());

        lines.push("Highest betweenness:".to_string());
        for score in &structure.top_betweenness {
            lines.push(format!("  {:<12} {:.4}", score.system, score.score));
        }
        if !structure.top_target_betweenness.is_empty() {
            lines.push("Highest target-weighted betweenness:".to_string());
            for score in &structure.top_target_betweenness {
                lines.push(format!("  {:<12} {:.4}", score.system, score.score));
            }
        }
        if let Some(ref center) = structure.network_center {
            lines.push(format!("Network center: {} (closeness {:.4})", center.system, center.score));
        }
        lines.push(format!(
            "Graph center: {} (eccentricity {})",
            structure.graph_center.systems.join(", "),
            structure.graph_center.eccentricity
        ));
        lines.push(String::new());
    }

    if let Some(ref capacity) = report.capacity {
        section(&mut lines, "UPGRADE CAPACITY");
        for summary in &capacity.systems {
            let r = &summary.report;
            lines.push(format!(
                "{:<12} power {}/{}  workforce {}/{}  {}",
                summary.system,
                r.power_used,
                r.power_capacity,
                r.workforce_used,
                r.workforce_capacity,
                if r.valid { "OK" } else { "OVER CAPACITY" }
            ));
            for upgrade in &summary.upgrades {
                lines.push(format!(
                    "    {} ({} power, {} workforce)",
                    upgrade.name, upgrade.power, upgrade.workforce
                ));
            }
        }
        if !capacity.invalid_systems.is_empty() {
            lines.push(format!("Over capacity: {}", capacity.invalid_systems.join(", ")));
        }
        lines.push(String::new());
    }

    // Footer
    lines.push("=".repeat(80));
    lines.join("\n")
}

/// Generate JSON report
pub fn generate_json_report(report: &PlanReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Generate human-readable text report
pub fn generate_text_report(report: &PlanReport, output_path: &Path) -> Result<()> {
    fs::write(output_path, render_text_report(report))
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Print a summary to stdout
pub fn print_summary(report: &PlanReport) {
    println!("\n=== REGION PLAN SUMMARY ===\n");
    println!("Region: {}", report.metadata.region);
    println!("Systems: {}", report.metadata.total_systems);
    println!("Bridges: {}", report.metadata.total_bridges);

    if let Some(ref mining) = report.mining {
        println!("\nMining placement:");
        let names: Vec<&str> = mining.systems.iter().map(|s| s.system.as_str()).collect();
        println!("  {}", names.join(", "));
    }

    if let Some(ref distribution) = report.distribution {
        println!("\nDistribution ({}):", distribution.strategy);
        let names: Vec<&str> = distribution.systems.iter().map(|s| s.system.as_str()).collect();
        println!("  {}", names.join(", "));
    }

    if let Some(ref bridges) = report.bridges {
        println!("\nBridge network:");
        println!("  Bridges placed: {}", bridges.plan.bridges.len());
        println!(
            "  Objective: {:.3} -> {:.3}",
            bridges.plan.baseline_objective, bridges.plan.final_objective
        );
    }

    if let Some(ref structure) = report.structure {
        println!("\nStructure:");
        println!("  Chokepoints: {}", structure.chokepoints.len());
        if let Some(top) = structure.chokepoints.first() {
            println!("  Most critical: {} (impact {})", top.system, top.impact);
        }
        if let Some(ref center) = structure.network_center {
            println!("  Network center: {}", center.system);
        }
    }

    if let Some(ref capacity) = report.capacity {
        println!("\nCapacity:");
        println!("  Systems with upgrades: {}", capacity.systems.len());
        println!("  Over capacity: {}", capacity.invalid_systems.len());
    }

    println!();
}
