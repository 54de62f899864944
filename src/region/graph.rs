//! The attributed region graph.
//!
//! Systems and gates are fixed at construction. Bridges are the only mutable
//! part of the graph; they are inserted and removed through `crate::bridges`,
//! which enforces range and terminus constraints before touching the graph.
//!
//! Internally systems are addressed by their index in construction order so
//! that traversals run over plain `Vec`s. Every traversal visits neighbors in
//! ascending index order, which keeps all results deterministic.

use std::collections::{BTreeMap, HashMap, VecDeque};

use log::debug;

use super::types::{Bridge, Edge, EdgeKind, RegionError, RegionSpec, System};

/// Options controlling which edges a traversal may use.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Traversal {
    /// Ignore constructed bridges and walk gates only
    pub gates_only: bool,
    /// A tentative edge considered present for this traversal only
    pub extra_edge: Option<(usize, usize)>,
    /// A system treated as absent (never entered, never a source)
    pub removed: Option<usize>,
}

impl Traversal {
    /// Traversal over gates only
    pub fn gates_only() -> Self {
        Self {
            gates_only: true,
            ..Self::default()
        }
    }

    /// Traversal over the current graph plus one tentative edge
    pub fn with_extra_edge(a: usize, b: usize) -> Self {
        Self {
            extra_edge: Some((a, b)),
            ..Self::default()
        }
    }

    /// Traversal over the current graph with one system removed
    pub fn without(system: usize) -> Self {
        Self {
            removed: Some(system),
            ..Self::default()
        }
    }
}

/// Region graph: systems, immutable gates and the mutable bridge set
#[derive(Debug, Clone)]
pub struct RegionGraph {
    systems: Vec<System>,
    index: HashMap<String, usize>,
    gates: Vec<Vec<usize>>,
    bridge_partner: Vec<Option<usize>>,
    bridges: Vec<Bridge>,
}

impl RegionGraph {
    /// Build a graph from region data. Standing bridges in `spec` are not
    /// applied here; `RegionPlanner::new` validates and installs them.
    pub fn from_spec(spec: &RegionSpec) -> Result<Self, RegionError> {
        let mut index = HashMap::with_capacity(spec.systems.len());
        for (i, system) in spec.systems.iter().enumerate() {
            if index.insert(system.name.clone(), i).is_some() {
                return Err(RegionError::DuplicateSystem(system.name.clone()));
            }
        }

        let mut gates = vec![Vec::new(); spec.systems.len()];
        for (from, to) in &spec.gates {
            let lookup = |name: &String| {
                index
                    .get(name)
                    .copied()
                    .ok_or_else(|| RegionError::UnknownGateEndpoint {
                        from: from.clone(),
                        to: to.clone(),
                        missing: name.clone(),
                    })
            };
            let a = lookup(from)?;
            let b = lookup(to)?;
            if a == b {
                return Err(RegionError::SelfLoop(from.clone()));
            }
            gates[a].push(b);
            gates[b].push(a);
        }
        for adjacency in &mut gates {
            adjacency.sort_unstable();
            adjacency.dedup();
        }

        let gate_count: usize = gates.iter().map(Vec::len).sum::<usize>() / 2;
        debug!(
            "Built region graph with {} systems and {} gates",
            spec.systems.len(),
            gate_count
        );

        Ok(Self {
            bridge_partner: vec![None; spec.systems.len()],
            systems: spec.systems.clone(),
            index,
            gates,
            bridges: Vec::new(),
        })
    }

    /// Number of systems
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// All systems in construction order
    pub fn systems(&self) -> &[System] {
        &self.systems
    }

    pub fn system(&self, name: &str) -> Option<&System> {
        self.index.get(name).map(|&i| &self.systems[i])
    }

    pub fn system_at(&self, idx: usize) -> &System {
        &self.systems[idx]
    }

    pub fn name_of(&self, idx: usize) -> &str {
        &self.systems[idx].name
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Resolve a system name, failing with `UnknownSystem`
    pub fn require(&self, name: &str) -> Result<usize, RegionError> {
        self.index_of(name)
            .ok_or_else(|| RegionError::UnknownSystem(name.to_string()))
    }

    /// Gate neighbors of a system, ascending by index
    pub fn gate_neighbors(&self, idx: usize) -> &[usize] {
        &self.gates[idx]
    }

    /// The other end of the bridge terminating at `idx`, if any
    pub fn bridge_partner(&self, idx: usize) -> Option<usize> {
        self.bridge_partner[idx]
    }

    /// Every neighbor over gates and bridges
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.gates[idx]
            .iter()
            .copied()
            .chain(self.bridge_partner[idx])
    }

    /// Neighbors over gates and bridges with parallel edges collapsed,
    /// ascending by index
    pub fn distinct_neighbors(&self, idx: usize) -> Vec<usize> {
        let mut out = self.gates[idx].clone();
        if let Some(partner) = self.bridge_partner[idx] {
            if let Err(pos) = out.binary_search(&partner) {
                out.insert(pos, partner);
            }
        }
        out
    }

    /// Names of every neighbor of `name` over gates and bridges
    pub fn neighbor_names(&self, name: &str) -> Result<Vec<&str>, RegionError> {
        let idx = self.require(name)?;
        Ok(self.neighbors(idx).map(|n| self.name_of(n)).collect())
    }

    pub fn has_gate(&self, a: usize, b: usize) -> bool {
        self.gates[a].binary_search(&b).is_ok()
    }

    /// True if `a` and `b` are adjacent over a gate or a bridge
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.has_gate(a, b) || self.bridge_partner[a] == Some(b)
    }

    /// Bridges currently standing, in the order they were added
    pub fn bridges(&self) -> &[Bridge] {
        &self.bridges
    }

    /// Every edge of the graph: gates (listed once) followed by bridges
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (a, adjacency) in self.gates.iter().enumerate() {
            for &b in adjacency.iter().filter(|&&b| b > a) {
                edges.push(Edge {
                    from: self.name_of(a).to_string(),
                    to: self.name_of(b).to_string(),
                    kind: EdgeKind::Gate,
                    distance_ly: None,
                });
            }
        }
        edges.extend(self.bridges.iter().map(|bridge| Edge {
            from: bridge.from.clone(),
            to: bridge.to.clone(),
            kind: EdgeKind::Bridge,
            distance_ly: Some(bridge.distance_ly),
        }));
        edges
    }

    /// Record a bridge. Callers must have validated the constraints.
    pub(crate) fn insert_bridge(&mut self, a: usize, b: usize, distance_ly: f64) -> Bridge {
        let bridge = Bridge {
            from: self.name_of(a).to_string(),
            to: self.name_of(b).to_string(),
            distance_ly,
        };
        self.bridge_partner[a] = Some(b);
        self.bridge_partner[b] = Some(a);
        self.bridges.push(bridge.clone());
        bridge
    }

    /// Remove the bridge between `a` and `b`, returning it if one existed
    pub(crate) fn remove_bridge_between(&mut self, a: usize, b: usize) -> Option<Bridge> {
        if self.bridge_partner[a] != Some(b) {
            return None;
        }
        let from = self.name_of(a).to_string();
        let to = self.name_of(b).to_string();
        let position = self.bridges.iter().position(|br| br.connects(&from, &to))?;
        self.bridge_partner[a] = None;
        self.bridge_partner[b] = None;
        Some(self.bridges.remove(position))
    }

    /// Remove every bridge, returning them in the order they were added
    pub(crate) fn take_bridges(&mut self) -> Vec<Bridge> {
        self.bridge_partner.iter_mut().for_each(|p| *p = None);
        std::mem::take(&mut self.bridges)
    }

    /// Systems grouped by constellation, groups and members in name order
    pub fn constellations(&self) -> BTreeMap<&str, Vec<usize>> {
        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, system) in self.systems.iter().enumerate() {
            groups.entry(system.constellation.as_str()).or_default().push(i);
        }
        for members in groups.values_mut() {
            members.sort_by(|&a, &b| self.name_of(a).cmp(self.name_of(b)));
        }
        groups
    }

    /// Names of all systems in a constellation, in name order
    pub fn constellation_systems(&self, constellation: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .systems
            .iter()
            .filter(|s| s.constellation == constellation)
            .map(|s| s.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    fn visit_neighbors(&self, u: usize, traversal: &Traversal, mut visit: impl FnMut(usize)) {
        for &v in &self.gates[u] {
            visit(v);
        }
        if !traversal.gates_only {
            if let Some(v) = self.bridge_partner[u] {
                visit(v);
            }
        }
        if let Some((a, b)) = traversal.extra_edge {
            if u == a {
                visit(b);
            } else if u == b {
                visit(a);
            }
        }
    }

    /// Breadth-first hop distances from `source` over the current graph.
    ///
    /// Unreachable systems are `None`.
    pub fn bfs(&self, source: usize) -> Vec<Option<u32>> {
        self.bfs_with(source, &Traversal::default())
    }

    /// Breadth-first hop distances from `source` under the given traversal
    pub fn bfs_with(&self, source: usize, traversal: &Traversal) -> Vec<Option<u32>> {
        let mut dist = vec![None; self.len()];
        if traversal.removed == Some(source) {
            return dist;
        }
        dist[source] = Some(0);
        let mut queue = VecDeque::from([source]);
        while let Some(u) = queue.pop_front() {
            let next = dist[u].map_or(0, |d| d + 1);
            self.visit_neighbors(u, traversal, |v| {
                if dist[v].is_none() && traversal.removed != Some(v) {
                    dist[v] = Some(next);
                    queue.push_back(v);
                }
            });
        }
        dist
    }

    /// Breadth-first parent pointers from `source`
    fn bfs_parents(&self, source: usize) -> Vec<Option<usize>> {
        let traversal = Traversal::default();
        let mut parent = vec![None; self.len()];
        let mut seen = vec![false; self.len()];
        seen[source] = true;
        let mut queue = VecDeque::from([source]);
        while let Some(u) = queue.pop_front() {
            self.visit_neighbors(u, &traversal, |v| {
                if !seen[v] {
                    seen[v] = true;
                    parent[v] = Some(u);
                    queue.push_back(v);
                }
            });
        }
        parent
    }

    /// Shortest route from `from` to `to` over gates and bridges, inclusive
    /// of both ends. Empty when no route exists.
    pub fn shortest_route(&self, from: &str, to: &str) -> Result<Vec<String>, RegionError> {
        let a = self.require(from)?;
        let b = self.require(to)?;
        let parent = self.bfs_parents(a);

        let mut route = vec![b];
        let mut current = b;
        while current != a {
            match parent[current] {
                Some(p) => {
                    route.push(p);
                    current = p;
                }
                None => return Ok(Vec::new()),
            }
        }
        route.reverse();
        Ok(route.into_iter().map(|i| self.name_of(i).to_string()).collect())
    }

    /// Connected components under the given traversal, each sorted by index.
    /// A removed system belongs to no component.
    pub fn components(&self, traversal: &Traversal) -> Vec<Vec<usize>> {
        let mut assigned = vec![false; self.len()];
        let mut components = Vec::new();
        for start in 0..self.len() {
            if assigned[start] || traversal.removed == Some(start) {
                continue;
            }
            let dist = self.bfs_with(start, traversal);
            let members: Vec<usize> = dist
                .iter()
                .enumerate()
                .filter_map(|(i, d)| d.map(|_| i))
                .collect();
            for &m in &members {
                assigned[m] = true;
            }
            components.push(members);
        }
        components
    }

    /// True if every system can reach every other under the traversal
    pub fn is_connected_with(&self, traversal: &Traversal) -> bool {
        self.components(traversal).len() <= 1
    }

    /// True if the gate network alone connects the region
    pub fn is_gate_connected(&self) -> bool {
        self.is_connected_with(&Traversal::gates_only())
    }
}
