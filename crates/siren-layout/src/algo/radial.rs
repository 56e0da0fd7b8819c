//! Radial layout: concentric BFS rings around the best-connected node.

use crate::options::RadialOptions;
use rustc_hash::FxHashMap;
use siren_graph::topology::AdjacencyView;
use siren_graph::{Bounds, Edge, Node, Point};
use std::collections::{BTreeMap, VecDeque};

pub fn compute(
    nodes: &[Node],
    edges: &[Edge],
    opts: &RadialOptions,
    bounds: Bounds,
) -> BTreeMap<String, Point> {
    let mut positions: BTreeMap<String, Point> = BTreeMap::new();
    if nodes.is_empty() {
        return positions;
    }
    let center = bounds.center();
    if nodes.len() == 1 {
        positions.insert(nodes[0].id.clone(), center);
        return positions;
    }

    let view = AdjacencyView::build(nodes, edges);

    // Root: highest degree, ties broken by id.
    let root = nodes
        .iter()
        .map(|n| n.id.as_str())
        .max_by(|a, b| {
            view.degree(a)
                .cmp(&view.degree(b))
                .then_with(|| b.cmp(a))
        })
        .unwrap_or(nodes[0].id.as_str());

    let mut ring: FxHashMap<&str, usize> = FxHashMap::default();
    ring.insert(root, 0);
    let mut queue: VecDeque<&str> = VecDeque::from([root]);
    let mut max_ring = 0usize;
    while let Some(id) = queue.pop_front() {
        let next = ring[id] + 1;
        for n in view.neighbors_sorted(id) {
            if !ring.contains_key(n) {
                ring.insert(n, next);
                max_ring = max_ring.max(next);
                queue.push_back(n);
            }
        }
    }

    // Anything unreachable from the root joins an extra outermost ring.
    let outer = max_ring + 1;
    for node in nodes {
        ring.entry(node.id.as_str()).or_insert(outer);
    }

    let mut members: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for node in nodes {
        members.entry(ring[node.id.as_str()]).or_default().push(node.id.as_str());
    }

    for (ring_idx, ids) in &mut members {
        ids.sort_unstable();
        if *ring_idx == 0 {
            for id in ids {
                positions.insert((*id).to_string(), center);
            }
            continue;
        }
        let radius = *ring_idx as f64 * opts.ring_spacing;
        let step = std::f64::consts::TAU / ids.len() as f64;
        for (i, id) in ids.iter().enumerate() {
            let angle = -std::f64::consts::FRAC_PI_2 + i as f64 * step;
            positions.insert(
                (*id).to_string(),
                Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin()),
            );
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_sits_at_center_with_leaves_on_ring_one() {
        let nodes = vec![
            Node::new("hub"),
            Node::new("a"),
            Node::new("b"),
            Node::new("c"),
        ];
        let edges = vec![
            Edge::new("hub", "a"),
            Edge::new("hub", "b"),
            Edge::new("hub", "c"),
        ];
        let opts = RadialOptions::default();
        let bounds = Bounds::new(800.0, 600.0);
        let pos = compute(&nodes, &edges, &opts, bounds);

        assert_eq!(pos["hub"], Point::new(400.0, 300.0));
        for id in ["a", "b", "c"] {
            let d = pos[id].distance_to(&pos["hub"]);
            assert!((d - opts.ring_spacing).abs() < 1e-9, "{id} off ring: {d}");
        }
    }

    #[test]
    fn unreachable_nodes_take_the_outermost_ring() {
        let nodes = vec![Node::new("hub"), Node::new("a"), Node::new("island")];
        let edges = vec![Edge::new("hub", "a")];
        let opts = RadialOptions::default();
        let pos = compute(&nodes, &edges, &opts, Bounds::default());
        let center = Bounds::default().center();
        let d = pos["island"].distance_to(&center);
        assert!((d - 2.0 * opts.ring_spacing).abs() < 1e-9);
    }

    #[test]
    fn deterministic_across_calls() {
        let nodes = vec![Node::new("x"), Node::new("y"), Node::new("z")];
        let edges = vec![Edge::new("x", "y"), Edge::new("y", "z")];
        let a = compute(&nodes, &edges, &RadialOptions::default(), Bounds::default());
        let b = compute(&nodes, &edges, &RadialOptions::default(), Bounds::default());
        assert_eq!(a, b);
    }
}
