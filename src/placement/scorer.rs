//! Multi-factor placement scoring.
//!
//! A system's score is the sum of four weighted terms:
//!
//! - **distance**: `weights.distance` times the hop distance to the nearest
//!   target (the weight is negative, so closer is better)
//! - **attribute bonus**: a fixed bonus when a boolean attribute holds
//! - **magnitude**: `weights.magnitude` times an integer attribute
//! - **clustering**: `weights.clustering` times the number of already
//!   selected systems that share the candidate's constellation and are its
//!   graph neighbors
//!
//! Only the clustering term depends on the selection, so greedy selection
//! keeps an arena of static base scores and updates clustering counts as
//! systems are picked.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::region::spatial::nearest_hops;
use crate::region::{RegionGraph, System};

use super::types::{PlacementError, ScoredSystem};

/// Boolean system attribute rewarded by the attribute bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolAttribute {
    #[default]
    HasIce,
}

impl BoolAttribute {
    pub fn holds(&self, system: &System) -> bool {
        match self {
            BoolAttribute::HasIce => system.has_ice,
        }
    }
}

impl FromStr for BoolAttribute {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "has_ice" | "ice" => Ok(BoolAttribute::HasIce),
            _ => Err(PlacementError::UnknownAttribute(s.to_string())),
        }
    }
}

/// Integer system attribute scaled by the magnitude weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeAttribute {
    #[default]
    Moons,
    Planets,
    Belts,
}

impl MagnitudeAttribute {
    pub fn value(&self, system: &System) -> u32 {
        match self {
            MagnitudeAttribute::Moons => system.moons,
            MagnitudeAttribute::Planets => system.planets,
            MagnitudeAttribute::Belts => system.belts,
        }
    }
}

impl FromStr for MagnitudeAttribute {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "moons" => Ok(MagnitudeAttribute::Moons),
            "planets" => Ok(MagnitudeAttribute::Planets),
            "belts" => Ok(MagnitudeAttribute::Belts),
            _ => Err(PlacementError::UnknownAttribute(s.to_string())),
        }
    }
}

/// Named scoring weights.
///
/// Defaults: distance `-2.0` per jump, attribute bonus `10.0`, magnitude
/// `0.1` per unit, clustering `3.0` per adjacent selected system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub distance: f64,
    pub attribute_bonus: f64,
    pub magnitude: f64,
    pub clustering: f64,
    pub bool_attribute: BoolAttribute,
    pub magnitude_attribute: MagnitudeAttribute,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            distance: -2.0,
            attribute_bonus: 10.0,
            magnitude: 0.1,
            clustering: 3.0,
            bool_attribute: BoolAttribute::default(),
            magnitude_attribute: MagnitudeAttribute::default(),
        }
    }
}

impl ScoreWeights {
    /// Build weights from a plain `name -> value` mapping.
    ///
    /// Names not present keep their default; unknown names are rejected.
    pub fn from_named(values: &BTreeMap<String, f64>) -> Result<Self, PlacementError> {
        let mut weights = Self::default();
        for (name, &value) in values {
            match name.as_str() {
                "distance" => weights.distance = value,
                "attribute_bonus" => weights.attribute_bonus = value,
                "magnitude" => weights.magnitude = value,
                "clustering" => weights.clustering = value,
                _ => return Err(PlacementError::UnknownWeight(name.clone())),
            }
        }
        Ok(weights)
    }

    /// Distance, attribute and magnitude terms for one system.
    ///
    /// `nearest` is the hop distance to the closest target. Systems no target
    /// can reach are charged the region size as their distance; with no
    /// targets at all the distance term is zero.
    fn base_score(&self, graph: &RegionGraph, idx: usize, nearest: Option<u32>, has_targets: bool) -> f64 {
        let system = graph.system_at(idx);
        let distance = match (has_targets, nearest) {
            (false, _) => 0.0,
            (true, Some(d)) => d as f64,
            (true, None) => graph.len() as f64,
        };
        let bonus = if self.bool_attribute.holds(system) {
            self.attribute_bonus
        } else {
            0.0
        };
        self.distance * distance + bonus + self.magnitude * self.magnitude_attribute.value(system) as f64
    }
}

/// Distinct graph neighbors of `idx` sharing its constellation
fn same_group_neighbors(graph: &RegionGraph, idx: usize) -> Vec<usize> {
    let group = &graph.system_at(idx).constellation;
    graph
        .distinct_neighbors(idx)
        .into_iter()
        .filter(|&n| &graph.system_at(n).constellation == group)
        .collect()
}

/// Score one system against `targets` and an existing `selected` set
pub fn score(
    graph: &RegionGraph,
    system: &str,
    targets: &[&str],
    weights: &ScoreWeights,
    selected: &[&str],
) -> Result<f64, PlacementError> {
    let idx = graph.require(system)?;
    let target_idx = targets
        .iter()
        .map(|t| graph.require(t))
        .collect::<Result<Vec<_>, _>>()?;
    let selected_idx = selected
        .iter()
        .map(|s| graph.require(s))
        .collect::<Result<Vec<_>, _>>()?;

    let nearest = nearest_hops(graph, &target_idx)[idx];
    let base = weights.base_score(graph, idx, nearest, !target_idx.is_empty());
    let adjacent = same_group_neighbors(graph, idx)
        .into_iter()
        .filter(|n| selected_idx.contains(n))
        .count();
    Ok(base + weights.clustering * adjacent as f64)
}

/// Greedy selection arena: static base scores plus clustering counts that
/// are updated whenever a system is picked.
#[derive(Debug)]
pub struct PlacementSelector<'g> {
    graph: &'g RegionGraph,
    clustering_weight: f64,
    base: Vec<f64>,
    clustering: Vec<u32>,
    selected: Vec<bool>,
    order: Vec<usize>,
}

impl<'g> PlacementSelector<'g> {
    /// Compute base scores for every system once
    pub fn new(graph: &'g RegionGraph, targets: &[usize], weights: &ScoreWeights) -> Self {
        let nearest = nearest_hops(graph, targets);
        let base = (0..graph.len())
            .map(|i| weights.base_score(graph, i, nearest[i], !targets.is_empty()))
            .collect();
        Self {
            graph,
            clustering_weight: weights.clustering,
            base,
            clustering: vec![0; graph.len()],
            selected: vec![false; graph.len()],
            order: Vec::new(),
        }
    }

    /// Current score of a candidate: base plus clustering against the
    /// selection so far
    pub fn current_score(&self, idx: usize) -> f64 {
        self.base[idx] + self.clustering_weight * self.clustering[idx] as f64
    }

    /// Pick the best unselected candidate, ties by lowest name
    pub fn select_next(&mut self) -> Option<ScoredSystem> {
        let graph = self.graph;
        let best = (0..graph.len())
            .filter(|&i| !self.selected[i])
            .max_by(|&a, &b| {
                self.current_score(a)
                    .total_cmp(&self.current_score(b))
                    .then_with(|| graph.name_of(b).cmp(graph.name_of(a)))
            })?;

        let picked = ScoredSystem::new(graph.name_of(best), self.current_score(best));
        self.selected[best] = true;
        self.order.push(best);
        for n in same_group_neighbors(graph, best) {
            if !self.selected[n] {
                self.clustering[n] += 1;
            }
        }
        debug!(
            "Selected {} (base {:.2}, score {:.2})",
            picked.system, self.base[best], picked.score
        );
        Some(picked)
    }

    /// Names of the systems selected so far, in selection order
    pub fn selected(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(|&i| self.graph.name_of(i))
    }
}

/// Greedily select up to `count` systems for placement near `targets`.
///
/// # Arguments
///
/// * `graph` - The region graph
/// * `targets` - Systems the placement should stay close to
/// * `count` - Number of systems to select
/// * `weights` - Scoring weights
///
/// # Returns
///
/// * Selected systems in selection order with the score each was picked at
pub fn select_placements(
    graph: &RegionGraph,
    targets: &[&str],
    count: usize,
    weights: &ScoreWeights,
) -> Result<Vec<ScoredSystem>, PlacementError> {
    let target_idx = targets
        .iter()
        .map(|t| graph.require(t))
        .collect::<Result<Vec<_>, _>>()?;

    let mut selector = PlacementSelector::new(graph, &target_idx, weights);
    let mut picks = Vec::with_capacity(count.min(graph.len()));
    while picks.len() < count {
        match selector.select_next() {
            Some(pick) => picks.push(pick),
            None => break,
        }
    }
    info!(
        "Selected {} placement systems near {} targets",
        picks.len(),
        targets.len()
    );
    Ok(picks)
}

/// Order two scored systems: higher score first, then by name
pub(crate) fn by_score_then_name(a: &ScoredSystem, b: &ScoredSystem) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.system.cmp(&b.system))
}
