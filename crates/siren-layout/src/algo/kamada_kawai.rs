//! Kamada-Kawai-style stress layout over BFS hop distances.
//!
//! Target distances are graph-theoretic hops scaled to the canvas; positions
//! start on a circle and relax through stress-majorization sweeps, which do
//! not diverge regardless of step count. Disconnected pairs carry no stress
//! term, so separate components drift apart freely.

use crate::options::KamadaKawaiOptions;
use rustc_hash::FxHashMap;
use siren_graph::{Bounds, Edge, Node, Point};
use std::collections::{BTreeMap, VecDeque};

const MIN_DISTANCE: f64 = 0.01;

pub fn compute(
    nodes: &[Node],
    edges: &[Edge],
    opts: &KamadaKawaiOptions,
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

    let n = nodes.len();
    let mut ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    ids.sort_unstable();
    let index: FxHashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in edges {
        let (Some(&s), Some(&t)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            continue;
        };
        if s == t {
            continue;
        }
        if !adjacency[s].contains(&t) {
            adjacency[s].push(t);
            adjacency[t].push(s);
        }
    }
    for neigh in &mut adjacency {
        neigh.sort_unstable();
    }

    // Hop distances; -1 marks an unreachable pair.
    let mut hops: Vec<Vec<i32>> = vec![vec![-1; n]; n];
    let mut diameter = 1i32;
    for (start, row) in hops.iter_mut().enumerate() {
        row[start] = 0;
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            for &u in &adjacency[v] {
                if row[u] == -1 {
                    row[u] = row[v] + 1;
                    diameter = diameter.max(row[u]);
                    queue.push_back(u);
                }
            }
        }
    }

    let unit = 0.8 * bounds.width.min(bounds.height) / diameter as f64;

    // Circle start, id order.
    let radius = bounds.width.min(bounds.height) * 0.4;
    let step = std::f64::consts::TAU / n as f64;
    let mut pts: Vec<Point> = (0..n)
        .map(|i| {
            let angle = -std::f64::consts::FRAC_PI_2 + i as f64 * step;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect();

    for _ in 0..opts.iterations.max(1) {
        for i in 0..n {
            let mut weight_sum = 0.0;
            let mut x = 0.0;
            let mut y = 0.0;
            for j in 0..n {
                if j == i || hops[i][j] <= 0 {
                    continue;
                }
                let target = unit * hops[i][j] as f64;
                let weight = 1.0 / (target * target);
                let dx = pts[i].x - pts[j].x;
                let dy = pts[i].y - pts[j].y;
                let dist = dx.hypot(dy).max(MIN_DISTANCE);
                // Where node i should sit to satisfy this pair exactly.
                x += weight * (pts[j].x + target * dx / dist);
                y += weight * (pts[j].y + target * dy / dist);
                weight_sum += weight;
            }
            if weight_sum > 0.0 {
                pts[i] = Point::new(x / weight_sum, y / weight_sum);
            }
        }
    }

    // Re-center the drawing after relaxation.
    let cx = pts.iter().map(|p| p.x).sum::<f64>() / n as f64;
    let cy = pts.iter().map(|p| p.y).sum::<f64>() / n as f64;
    for (id, p) in ids.iter().zip(&pts) {
        positions.insert(
            (*id).to_string(),
            Point::new(p.x - cx + center.x, p.y - cy + center.y),
        );
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_endpoints_sit_farther_apart_than_adjacent_pairs() {
        let nodes = vec![Node::new("a"), Node::new("b"), Node::new("c")];
        let edges = vec![Edge::new("a", "b"), Edge::new("b", "c")];
        let pos = compute(&nodes, &edges, &KamadaKawaiOptions::default(), Bounds::default());
        let ab = pos["a"].distance_to(&pos["b"]);
        let ac = pos["a"].distance_to(&pos["c"]);
        assert!(ac > ab);
    }

    #[test]
    fn adjacent_distances_approach_the_unit_length() {
        let nodes = vec![Node::new("a"), Node::new("b"), Node::new("c")];
        let edges = vec![Edge::new("a", "b"), Edge::new("b", "c")];
        let bounds = Bounds::new(800.0, 600.0);
        let pos = compute(&nodes, &edges, &KamadaKawaiOptions::default(), bounds);
        // diameter 2, unit = 0.8 * 600 / 2 = 240
        let ab = pos["a"].distance_to(&pos["b"]);
        assert!((ab - 240.0).abs() < 24.0, "ab = {ab}");
    }

    #[test]
    fn deterministic_without_a_seed() {
        let nodes = vec![Node::new("x"), Node::new("y"), Node::new("z")];
        let edges = vec![Edge::new("x", "y")];
        let a = compute(&nodes, &edges, &KamadaKawaiOptions::default(), Bounds::default());
        let b = compute(&nodes, &edges, &KamadaKawaiOptions::default(), Bounds::default());
        assert_eq!(a, b);
    }

    #[test]
    fn result_is_centered() {
        let nodes = vec![Node::new("a"), Node::new("b")];
        let edges = vec![Edge::new("a", "b")];
        let bounds = Bounds::new(800.0, 600.0);
        let pos = compute(&nodes, &edges, &KamadaKawaiOptions::default(), bounds);
        let cx = (pos["a"].x + pos["b"].x) / 2.0;
        let cy = (pos["a"].y + pos["b"].y) / 2.0;
        assert!((cx - 400.0).abs() < 1e-6);
        assert!((cy - 300.0).abs() < 1e-6);
    }
}
