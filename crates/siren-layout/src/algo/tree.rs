//! Tree layout: Reingold-Tilford-style forest placement from edge direction.

use crate::options::TreeOptions;
use rustc_hash::{FxHashMap, FxHashSet};
use siren_graph::{Bounds, Edge, Node, Point};
use std::collections::BTreeMap;

pub fn compute(
    nodes: &[Node],
    edges: &[Edge],
    opts: &TreeOptions,
    bounds: Bounds,
) -> BTreeMap<String, Point> {
    let mut positions: BTreeMap<String, Point> = BTreeMap::new();
    if nodes.is_empty() {
        return positions;
    }
    if nodes.len() == 1 {
        positions.insert(nodes[0].id.clone(), bounds.center());
        return positions;
    }

    let known: FxHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let mut children: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    let mut in_degree: FxHashMap<&str, usize> = FxHashMap::default();
    for node in nodes {
        children.insert(node.id.as_str(), Vec::new());
        in_degree.insert(node.id.as_str(), 0);
    }
    for edge in edges {
        let (s, t) = (edge.source.as_str(), edge.target.as_str());
        if s == t || !known.contains(s) || !known.contains(t) {
            continue;
        }
        // Child order is edge encounter order; duplicates collapse.
        if let Some(kids) = children.get_mut(s) {
            if !kids.contains(&t) {
                kids.push(t);
                if let Some(d) = in_degree.get_mut(t) {
                    *d += 1;
                }
            }
        }
    }

    let roots = elect_roots(nodes, &children, &in_degree);

    // First walk: leaves claim successive x slots, parents center over their
    // children's span. A visited set breaks cycles.
    let mut visited: FxHashSet<&str> = FxHashSet::default();
    let mut xs: FxHashMap<&str, f64> = FxHashMap::default();
    let mut depths: FxHashMap<&str, usize> = FxHashMap::default();
    let mut next_tree_x = 0.0;
    for root in roots {
        if visited.contains(root) {
            continue;
        }
        let mut next_slot = 0.0;
        place_subtree(
            root,
            0,
            &children,
            &mut visited,
            &mut next_slot,
            &mut xs,
            &mut depths,
            opts,
            next_tree_x,
        );
        let tree_width = (next_slot - 1.0).max(0.0) * opts.node_spacing;
        next_tree_x += tree_width + opts.tree_spacing;
    }

    // Nodes never reached (cycle remnants) become single-node trees.
    for node in nodes {
        let id = node.id.as_str();
        if !visited.contains(id) {
            visited.insert(id);
            xs.insert(id, next_tree_x);
            depths.insert(id, 0);
            next_tree_x += opts.tree_spacing;
        }
    }

    // Center the whole forest within the canvas.
    let min_x = xs.values().copied().fold(f64::INFINITY, f64::min);
    let max_x = xs.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let max_depth = depths.values().copied().max().unwrap_or(0);
    let x_shift = bounds.width / 2.0 - (min_x + max_x) / 2.0;
    let total_height = max_depth as f64 * opts.level_spacing;
    let y_offset = (bounds.height - total_height) / 2.0;

    for node in nodes {
        let id = node.id.as_str();
        positions.insert(
            node.id.clone(),
            Point::new(
                xs[id] + x_shift,
                y_offset + depths[id] as f64 * opts.level_spacing,
            ),
        );
    }
    positions
}

/// Roots are the zero-in-degree nodes, in input order; a fully cyclic graph
/// falls back to the highest out-degree node, ties broken by id.
fn elect_roots<'a>(
    nodes: &'a [Node],
    children: &FxHashMap<&'a str, Vec<&'a str>>,
    in_degree: &FxHashMap<&'a str, usize>,
) -> Vec<&'a str> {
    let mut roots: Vec<&str> = nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| in_degree[id] == 0)
        .collect();
    if roots.is_empty() {
        let fallback = nodes
            .iter()
            .map(|n| n.id.as_str())
            .max_by(|a, b| {
                children[a]
                    .len()
                    .cmp(&children[b].len())
                    .then_with(|| b.cmp(a))
            });
        roots.extend(fallback);
    }
    roots
}

#[allow(clippy::too_many_arguments)]
fn place_subtree<'a>(
    id: &'a str,
    depth: usize,
    children: &FxHashMap<&'a str, Vec<&'a str>>,
    visited: &mut FxHashSet<&'a str>,
    next_slot: &mut f64,
    xs: &mut FxHashMap<&'a str, f64>,
    depths: &mut FxHashMap<&'a str, usize>,
    opts: &TreeOptions,
    tree_origin: f64,
) {
    visited.insert(id);
    depths.insert(id, depth);

    let kids: Vec<&str> = children[id]
        .iter()
        .copied()
        .filter(|k| !visited.contains(k))
        .collect();
    if kids.is_empty() {
        xs.insert(id, tree_origin + *next_slot * opts.node_spacing);
        *next_slot += 1.0;
        return;
    }

    let mut first = f64::INFINITY;
    let mut last = f64::NEG_INFINITY;
    for kid in kids {
        // A sibling's subtree may have claimed this node in the meantime.
        if visited.contains(kid) {
            continue;
        }
        place_subtree(
            kid, depth + 1, children, visited, next_slot, xs, depths, opts, tree_origin,
        );
        first = first.min(xs[kid]);
        last = last.max(xs[kid]);
    }
    let x = if first.is_finite() {
        (first + last) / 2.0
    } else {
        let x = tree_origin + *next_slot * opts.node_spacing;
        *next_slot += 1.0;
        x
    };
    xs.insert(id, x);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<Node> {
        names.iter().map(|n| Node::new(*n)).collect()
    }

    #[test]
    fn parent_centers_over_children() {
        let nodes = ids(&["A", "B", "C"]);
        let edges = vec![Edge::new("A", "B"), Edge::new("A", "C")];
        let pos = compute(&nodes, &edges, &TreeOptions::default(), Bounds::default());

        assert_eq!(pos["B"].y, pos["C"].y);
        assert!(pos["A"].y < pos["B"].y);
        assert_eq!(pos["A"].x, (pos["B"].x + pos["C"].x) / 2.0);
    }

    #[test]
    fn disconnected_nodes_become_their_own_trees() {
        let nodes = ids(&["root", "kid", "island"]);
        let edges = vec![Edge::new("root", "kid")];
        let pos = compute(&nodes, &edges, &TreeOptions::default(), Bounds::default());
        assert_eq!(pos.len(), 3);
        assert_ne!(pos["island"].x, pos["root"].x);
        assert_eq!(pos["island"].y, pos["root"].y);
    }

    #[test]
    fn cycle_falls_back_to_out_degree_root() {
        let nodes = ids(&["a", "b", "c"]);
        let edges = vec![
            Edge::new("a", "b"),
            Edge::new("b", "c"),
            Edge::new("c", "a"),
            Edge::new("a", "c"),
        ];
        let pos = compute(&nodes, &edges, &TreeOptions::default(), Bounds::default());
        // "a" has out-degree 2, so it roots the tree.
        assert_eq!(pos.len(), 3);
        let min_y = pos.values().map(|p| p.y).fold(f64::INFINITY, f64::min);
        assert_eq!(pos["a"].y, min_y);
    }

    #[test]
    fn forest_is_centered_in_bounds() {
        let nodes = ids(&["r", "x", "y"]);
        let edges = vec![Edge::new("r", "x"), Edge::new("r", "y")];
        let bounds = Bounds::new(1000.0, 400.0);
        let pos = compute(&nodes, &edges, &TreeOptions::default(), bounds);
        let min_x = pos.values().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = pos.values().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        assert!(((min_x + max_x) / 2.0 - 500.0).abs() < 1e-9);
    }

    #[test]
    fn singleton_sits_at_center() {
        let pos = compute(
            &ids(&["only"]),
            &[],
            &TreeOptions::default(),
            Bounds::new(800.0, 600.0),
        );
        assert_eq!(pos["only"], Point::new(400.0, 300.0));
    }

    #[test]
    fn empty_graph_yields_empty_map() {
        assert!(compute(&[], &[], &TreeOptions::default(), Bounds::default()).is_empty());
    }
}
