//! Adjacency construction, degree classification, and reachability queries.
//!
//! The underlying graph is treated as undirected for distance and force
//! purposes even though edges carry direction for rendering elsewhere; the
//! adjacency view is always symmetric.

use crate::{Edge, Node};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeSet, VecDeque};

/// Symmetric neighbor view derived from a node/edge snapshot.
///
/// Edges referencing unknown node ids are skipped silently: partially-loaded
/// CSV data routinely produces dangling references and the positioning core
/// must tolerate them.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyView {
    neighbors: FxHashMap<String, FxHashSet<String>>,
    /// Canonical (min, max) endpoint pair -> index of the first edge between
    /// the pair in the caller's edge slice.
    edge_index: FxHashMap<(String, String), usize>,
}

impl AdjacencyView {
    /// Build the view in O(N + E).
    pub fn build(nodes: &[Node], edges: &[Edge]) -> Self {
        let mut neighbors: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
        neighbors.reserve(nodes.len() * 2);
        for n in nodes {
            neighbors.entry(n.id.clone()).or_default();
        }

        let mut edge_index: FxHashMap<(String, String), usize> = FxHashMap::default();
        for (idx, e) in edges.iter().enumerate() {
            if e.source == e.target {
                continue;
            }
            if !neighbors.contains_key(&e.source) || !neighbors.contains_key(&e.target) {
                continue;
            }
            if let Some(s) = neighbors.get_mut(&e.source) {
                s.insert(e.target.clone());
            }
            if let Some(s) = neighbors.get_mut(&e.target) {
                s.insert(e.source.clone());
            }
            edge_index.entry(canonical_pair(&e.source, &e.target)).or_insert(idx);
        }

        Self {
            neighbors,
            edge_index,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.neighbors.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Node ids in sorted order. The internal maps are unordered; callers that
    /// need determinism iterate through here.
    pub fn node_ids_sorted(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.neighbors.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn neighbors(&self, id: &str) -> Option<&FxHashSet<String>> {
        self.neighbors.get(id)
    }

    /// Neighbor ids in sorted order; empty for unknown ids.
    pub fn neighbors_sorted(&self, id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .neighbors
            .get(id)
            .map(|s| s.iter().map(String::as_str).collect())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }

    pub fn degree(&self, id: &str) -> usize {
        self.neighbors.get(id).map(FxHashSet::len).unwrap_or(0)
    }

    pub fn is_leaf(&self, id: &str) -> bool {
        self.degree(id) == 1
    }

    /// Whether `a` and `b` share at least one neighbor other than each other.
    pub fn are_siblings(&self, a: &str, b: &str) -> bool {
        let (Some(na), Some(nb)) = (self.neighbors.get(a), self.neighbors.get(b)) else {
            return false;
        };
        let (small, large) = if na.len() <= nb.len() { (na, nb) } else { (nb, na) };
        small
            .iter()
            .any(|n| n != a && n != b && large.contains(n))
    }

    /// Index of the first edge between `a` and `b` in the snapshot's edge
    /// slice, in either direction.
    pub fn edge_between(&self, a: &str, b: &str) -> Option<usize> {
        self.edge_index.get(&canonical_pair(a, b)).copied()
    }

    /// Unweighted BFS shortest path from `from` to `to`, returned as the
    /// ordered sequence of edge indices along the path. Empty when either
    /// endpoint is unknown, the target is unreachable, or `from == to`.
    pub fn shortest_path(&self, from: &str, to: &str) -> Vec<usize> {
        if from == to || !self.contains(from) || !self.contains(to) {
            return Vec::new();
        }

        let mut predecessor: FxHashMap<&str, &str> = FxHashMap::default();
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut queue: VecDeque<&str> = VecDeque::new();
        visited.insert(from);
        queue.push_back(from);

        'search: while let Some(v) = queue.pop_front() {
            for w in self.neighbors_sorted(v) {
                if visited.insert(w) {
                    predecessor.insert(w, v);
                    if w == to {
                        break 'search;
                    }
                    queue.push_back(w);
                }
            }
        }

        if !predecessor.contains_key(to) {
            return Vec::new();
        }

        let mut path: Vec<usize> = Vec::new();
        let mut cur = to;
        while cur != from {
            let prev = predecessor[cur];
            let Some(idx) = self.edge_between(prev, cur) else {
                return Vec::new();
            };
            path.push(idx);
            cur = prev;
        }
        path.reverse();
        path
    }

    /// Flood fill of the connected component containing `id`; empty set for
    /// unknown ids.
    pub fn connected_component(&self, id: &str) -> BTreeSet<String> {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        if !self.contains(id) {
            return seen;
        }
        let mut queue: VecDeque<&str> = VecDeque::new();
        seen.insert(id.to_string());
        queue.push_back(id);
        while let Some(v) = queue.pop_front() {
            for w in self.neighbors_sorted(v) {
                if seen.insert(w.to_string()) {
                    queue.push_back(w);
                }
            }
        }
        seen
    }

    /// All connected components, ordered by their smallest member id, each
    /// sorted internally.
    pub fn components(&self) -> Vec<Vec<String>> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut out: Vec<Vec<String>> = Vec::new();
        for start in self.node_ids_sorted() {
            if seen.contains(start) {
                continue;
            }
            let comp = self.connected_component(start);
            for m in &comp {
                // BTreeSet members outlive this loop; track by borrowing from
                // the view's own keys.
                if let Some((k, _)) = self.neighbors.get_key_value(m.as_str()) {
                    seen.insert(k.as_str());
                }
            }
            out.push(comp.into_iter().collect());
        }
        out
    }

    /// Highest-degree neighbor of `id`, ties broken by id. The simulator's
    /// hub-gravity step pulls every node toward this neighbor.
    pub fn hub_neighbor(&self, id: &str) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for n in self.neighbors_sorted(id) {
            let d = self.degree(n);
            match best {
                Some((_, bd)) if d <= bd => {}
                _ => best = Some((n, d)),
            }
        }
        best.map(|(n, _)| n)
    }

    /// Mean degree across the view; 0 for an empty graph.
    pub fn mean_degree(&self) -> f64 {
        if self.neighbors.is_empty() {
            return 0.0;
        }
        let total: usize = self.neighbors.values().map(FxHashSet::len).sum();
        total as f64 / self.neighbors.len() as f64
    }
}

fn canonical_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}
