//! Distribution strategies for spreading N placements over a region.
//!
//! Three strategies share the [`DistributionStrategy`] interface:
//!
//! - **Spread**: max-min diversity. Seeds with the system nearest staging,
//!   then repeatedly adds the candidate farthest from the selection, with a
//!   security bonus and a penalty for crowding one constellation.
//! - **Cluster**: static ranking by a proximity preference that peaks inside
//!   a hop band around staging, plus the security bonus.
//! - **OnePerGroup**: the highest-security system of each constellation.
//!
//! Every strategy returns `min(count, region size)` distinct systems.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::region::RegionGraph;

use super::scorer::by_score_then_name;
use super::types::{PlacementError, ScoredSystem};

/// Parameters shared by the distribution strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionParams {
    /// Number of systems to select
    pub count: usize,
    /// Reference system for the spread and cluster strategies
    pub staging: Option<String>,
    /// Bonus per unit of negative security
    pub security_weight: f64,
    /// Penalty per already selected system in the candidate's constellation
    pub group_penalty: f64,
    /// Preferred hop band around staging, inclusive
    pub band_min: u32,
    pub band_max: u32,
    /// Weight of the proximity preference
    pub proximity_weight: f64,
}

impl Default for DistributionParams {
    fn default() -> Self {
        Self {
            count: 5,
            staging: None,
            security_weight: 2.0,
            group_penalty: 1.5,
            band_min: 2,
            band_max: 4,
            proximity_weight: 5.0,
        }
    }
}

impl DistributionParams {
    fn security_bonus(&self, security: f64) -> f64 {
        self.security_weight * (-security).max(0.0)
    }

    fn staging_index(&self, graph: &RegionGraph, strategy: &str) -> Result<usize, PlacementError> {
        let staging = self
            .staging
            .as_deref()
            .ok_or_else(|| PlacementError::MissingStaging(strategy.to_string()))?;
        Ok(graph.require(staging)?)
    }

    /// Proximity preference for a hop distance: 1.0 inside the band, rising
    /// linearly towards it from below and decaying hyperbolically beyond it
    pub fn band_preference(&self, hops: Option<u32>) -> f64 {
        let Some(d) = hops else {
            return 0.0;
        };
        if d < self.band_min {
            d as f64 / self.band_min as f64
        } else if d <= self.band_max {
            1.0
        } else {
            1.0 / (1.0 + (d - self.band_max) as f64)
        }
    }
}

/// A way of choosing N systems from the region
pub trait DistributionStrategy {
    /// Stable name used in logs and reports
    fn name(&self) -> &'static str;

    /// Select systems, each with the score it was ranked by
    fn select(
        &self,
        graph: &RegionGraph,
        params: &DistributionParams,
    ) -> Result<Vec<ScoredSystem>, PlacementError>;
}

/// Max-min diversity selection around a staging system
#[derive(Debug, Clone, Copy, Default)]
pub struct Spread;

/// Band-preference ranking around a staging system
#[derive(Debug, Clone, Copy, Default)]
pub struct Cluster;

/// Highest-security system per constellation
#[derive(Debug, Clone, Copy, Default)]
pub struct OnePerGroup;

impl DistributionStrategy for Spread {
    fn name(&self) -> &'static str {
        "spread"
    }

    fn select(
        &self,
        graph: &RegionGraph,
        params: &DistributionParams,
    ) -> Result<Vec<ScoredSystem>, PlacementError> {
        let staging = params.staging_index(graph, self.name())?;
        let target = params.count.min(graph.len());
        if target == 0 {
            return Ok(Vec::new());
        }

        let from_staging = graph.bfs(staging);
        let seed = (0..graph.len())
            .filter(|&i| i != staging)
            .filter_map(|i| from_staging[i].map(|d| (d, i)))
            .min_by(|(da, a), (db, b)| da.cmp(db).then_with(|| graph.name_of(*a).cmp(graph.name_of(*b))))
            .map_or(staging, |(_, i)| i);

        let mut selected = vec![false; graph.len()];
        let mut group_counts: HashMap<&str, u32> = HashMap::new();
        let mut min_dist = graph.bfs(seed);
        let mut picks = Vec::with_capacity(target);

        let seed_system = graph.system_at(seed);
        selected[seed] = true;
        *group_counts.entry(seed_system.constellation.as_str()).or_default() += 1;
        picks.push(ScoredSystem::new(
            &seed_system.name,
            params.security_bonus(seed_system.security),
        ));
        debug!("Spread seeded with {}", seed_system.name);

        let unreachable = graph.len() as f64;
        while picks.len() < target {
            let score_of = |i: usize| {
                let system = graph.system_at(i);
                let spread = min_dist[i].map_or(unreachable, |d| d as f64);
                let crowding = group_counts
                    .get(system.constellation.as_str())
                    .copied()
                    .unwrap_or(0);
                spread + params.security_bonus(system.security) - params.group_penalty * crowding as f64
            };

            let best = (0..graph.len())
                .filter(|&i| !selected[i])
                .map(|i| (score_of(i), i))
                .max_by(|(sa, a), (sb, b)| {
                    sa.total_cmp(sb)
                        .then_with(|| graph.name_of(*b).cmp(graph.name_of(*a)))
                });
            let Some((best_score, best)) = best else {
                break;
            };

            let system = graph.system_at(best);
            selected[best] = true;
            *group_counts.entry(system.constellation.as_str()).or_default() += 1;
            for (slot, d) in min_dist.iter_mut().zip(graph.bfs(best)) {
                *slot = match (*slot, d) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
            }
            picks.push(ScoredSystem::new(&system.name, best_score));
        }

        Ok(picks)
    }
}

impl DistributionStrategy for Cluster {
    fn name(&self) -> &'static str {
        "cluster"
    }

    fn select(
        &self,
        graph: &RegionGraph,
        params: &DistributionParams,
    ) -> Result<Vec<ScoredSystem>, PlacementError> {
        if params.band_min > params.band_max {
            return Err(PlacementError::InvalidBand {
                min: params.band_min,
                max: params.band_max,
            });
        }
        let staging = params.staging_index(graph, self.name())?;
        let from_staging = graph.bfs(staging);

        let mut ranked: Vec<ScoredSystem> = graph
            .systems()
            .iter()
            .zip(&from_staging)
            .map(|(system, &hops)| {
                let score = params.proximity_weight * params.band_preference(hops)
                    + params.security_bonus(system.security);
                ScoredSystem::new(&system.name, score)
            })
            .collect();
        ranked.sort_by(by_score_then_name);
        ranked.truncate(params.count);
        Ok(ranked)
    }
}

impl DistributionStrategy for OnePerGroup {
    fn name(&self) -> &'static str {
        "one_per_group"
    }

    fn select(
        &self,
        graph: &RegionGraph,
        params: &DistributionParams,
    ) -> Result<Vec<ScoredSystem>, PlacementError> {
        let target = params.count.min(graph.len());
        let groups: Vec<Vec<usize>> = graph
            .constellations()
            .into_values()
            .map(|mut members| {
                members.sort_by(|&a, &b| {
                    graph
                        .system_at(b)
                        .security
                        .total_cmp(&graph.system_at(a).security)
                        .then_with(|| graph.name_of(a).cmp(graph.name_of(b)))
                });
                members
            })
            .collect();

        // The first pass takes each group's best system; further passes only
        // run when there are fewer groups than requested systems.
        let mut picks = Vec::with_capacity(target);
        let mut round = 0;
        while picks.len() < target {
            for members in &groups {
                if picks.len() == target {
                    break;
                }
                if let Some(&idx) = members.get(round) {
                    let system = graph.system_at(idx);
                    picks.push(ScoredSystem::new(&system.name, system.security));
                }
            }
            round += 1;
        }
        Ok(picks)
    }
}

/// Closed set of distribution strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Spread,
    Cluster,
    OnePerGroup,
}

impl StrategyKind {
    pub fn strategy(&self) -> &'static dyn DistributionStrategy {
        match self {
            StrategyKind::Spread => &Spread,
            StrategyKind::Cluster => &Cluster,
            StrategyKind::OnePerGroup => &OnePerGroup,
        }
    }

    /// Run the strategy
    pub fn select(
        &self,
        graph: &RegionGraph,
        params: &DistributionParams,
    ) -> Result<Vec<ScoredSystem>, PlacementError> {
        let strategy = self.strategy();
        info!(
            "Distributing {} systems with the {} strategy",
            params.count,
            strategy.name()
        );
        let picks = strategy.select(graph, params)?;
        debug!(
            "{} selected: {:?}",
            strategy.name(),
            picks.iter().map(|p| p.system.as_str()).collect::<Vec<_>>()
        );
        Ok(picks)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strategy().name())
    }
}

impl FromStr for StrategyKind {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "spread" => Ok(StrategyKind::Spread),
            "cluster" => Ok(StrategyKind::Cluster),
            "one_per_group" | "one_per_constellation" => Ok(StrategyKind::OnePerGroup),
            _ => Err(PlacementError::UnknownStrategy(s.to_string())),
        }
    }
}
