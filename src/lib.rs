//! # Sovplan - Sovereignty region planner
//!
//! This library plans infrastructure for a region of star systems connected
//! by stargates: where to install upgrades, how to spread them, where to
//! build jump bridges, and which systems hold the network together.
//!
//! ## Overview
//!
//! A region is an undirected graph of systems. Gates are fixed edges;
//! bridges are edges added by the planner, limited to 5 light-years and one
//! per system. Distances are either physical (light-years between positions)
//! or topological (jumps over gates and bridges).
//!
//! ## Key Features
//!
//! - **Capacity validation**: Power and workforce bookkeeping for upgrades
//! - **Placement scoring**: Multi-factor greedy selection near target systems
//! - **Distribution**: Spread, cluster or one-per-constellation strategies
//! - **Bridge optimization**: Greedy bridge placement minimizing weighted jumps
//! - **Structural analysis**: Chokepoints, betweenness and closeness centrality
//! - **Reports**: JSON and text reports for a full planning run
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `region`: Graph of systems, gates and bridges with distance queries
//! - `capacity`: Upgrade catalog, capacity validator and per-system ledger
//! - `placement`: Placement scorer and distribution strategies
//! - `bridges`: Bridge validity, greedy optimizer and coverage statistics
//! - `analysis`: Chokepoints, centrality metrics and report generation
//! - `planner`: The `RegionPlanner` that owns the state and runs every step
//! - `config`: Planning configuration structures and validation
//! - `config_loader`: YAML loading of regions, catalogs and configuration
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use sovplan::{config_loader, planner::RegionPlanner};
//!
//! let region = config_loader::load_region(Path::new("data/sample_region.yaml"))?;
//! let catalog = config_loader::load_catalog(Path::new("data/upgrades.yaml"))?;
//! let config = config_loader::load_config(Path::new("data/plan.yaml"))?;
//!
//! let mut planner = RegionPlanner::new(&region, catalog)?;
//! let report = planner.plan(&config)?;
//! sovplan::analysis::print_summary(&report);
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Domain operations return typed errors built with `thiserror`; the loaders
//! and the binary use `color_eyre` for error reports with context.

pub mod region;
pub mod capacity;
pub mod placement;
pub mod bridges;
pub mod analysis;
pub mod planner;
pub mod config;
pub mod config_loader;

pub use planner::{PlanError, RegionPlanner};
