//! Spectral layout: classical scaling over a pivot-sampled distance matrix.
//!
//! BFS distances to a handful of pivot nodes stand in for the full distance
//! matrix; the two dominant eigenvectors of the doubly-centered squared
//! distances (extracted by power iteration) give raw coordinates, which are
//! then scaled to fit the canvas. Degenerate graphs fall back to the circle
//! layout so the contract (complete, finite output) always holds.

use crate::algo::circle;
use crate::options::SpectralOptions;
use crate::rng::XorShift64Star;
use nalgebra::{DMatrix, DVector};
use rustc_hash::FxHashMap;
use siren_graph::{Bounds, Edge, Node, Point};
use std::collections::{BTreeMap, VecDeque};

const UNREACHABLE: f64 = 100_000_000.0;
const SMALL: f64 = 1e-9;
const NODE_SEPARATION: f64 = 75.0;
const PI_TOLERANCE: f64 = 1e-7;
const MAX_POWER_ITERATIONS: usize = 10_000;

pub fn compute(
    nodes: &[Node],
    edges: &[Edge],
    opts: &SpectralOptions,
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

    match raw_coordinates(nodes, edges, opts) {
        Some(coords) => {
            let scaled = fit_to_bounds(&coords, bounds);
            for (node, p) in nodes.iter().zip(scaled) {
                positions.insert(node.id.clone(), p);
            }
            positions
        }
        None => circle::compute(nodes, bounds),
    }
}

/// Unscaled 2D embedding of the real nodes, or `None` when the graph is too
/// small or the numerics fail.
fn raw_coordinates(
    nodes: &[Node],
    edges: &[Edge],
    opts: &SpectralOptions,
) -> Option<Vec<Point>> {
    let n_real = nodes.len();
    let adjacency = build_connected_adjacency(nodes, edges);
    let size = adjacency.len();
    let sample_size = size.min(opts.sample_size);
    if sample_size <= 2 {
        return None;
    }

    let mut rng = XorShift64Star::new(opts.seed);

    // Greedy pivot sampling: random first pivot, then the node farthest from
    // the already-sampled set.
    let mut c = DMatrix::<f64>::zeros(size, sample_size);
    let mut samples = vec![0usize; sample_size];
    let mut min_dist = vec![UNREACHABLE; size];
    let mut pivot = rng.next_usize(size);
    for col in 0..sample_size {
        samples[col] = pivot;
        pivot = bfs_fill_column(pivot, col, &adjacency, &mut c, &mut min_dist);
    }

    for i in 0..size {
        for j in 0..sample_size {
            let v = c[(i, j)];
            c[(i, j)] = v * v;
        }
    }

    // The pivot-by-pivot block of the sampled matrix.
    let mut phi = DMatrix::<f64>::zeros(sample_size, sample_size);
    for i in 0..sample_size {
        for j in 0..sample_size {
            phi[(i, j)] = c[(samples[j], i)];
        }
    }
    let inv = regularized_inverse(&phi)?;

    let (xs, ys) = power_iteration(&mut rng, &c, &inv)?;
    let mut out = Vec::with_capacity(n_real);
    for i in 0..n_real {
        if !(xs[i].is_finite() && ys[i].is_finite()) {
            return None;
        }
        out.push(Point::new(xs[i], ys[i]));
    }
    Some(out)
}

/// Undirected adjacency over valid edges; when the graph has several
/// components, one trailing dummy node bridges a minimum-degree
/// representative of each so BFS sampling covers everything.
fn build_connected_adjacency(nodes: &[Node], edges: &[Edge]) -> Vec<Vec<usize>> {
    let index: FxHashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for edge in edges {
        let (Some(&s), Some(&t)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            continue;
        };
        if s != t {
            adjacency[s].push(t);
            adjacency[t].push(s);
        }
    }
    for neigh in &mut adjacency {
        neigh.sort_unstable();
        neigh.dedup();
    }

    let components = component_lists(&adjacency);
    if components.len() <= 1 {
        return adjacency;
    }

    let dummy = adjacency.len();
    adjacency.push(Vec::new());
    for comp in components {
        let mut best = comp[0];
        for &v in &comp {
            let (deg, best_deg) = (adjacency[v].len(), adjacency[best].len());
            if deg < best_deg || (deg == best_deg && v < best) {
                best = v;
            }
        }
        adjacency[dummy].push(best);
        adjacency[best].push(dummy);
    }
    for neigh in &mut adjacency {
        neigh.sort_unstable();
        neigh.dedup();
    }
    adjacency
}

fn component_lists(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut visited = vec![false; adjacency.len()];
    let mut out = Vec::new();
    for start in 0..adjacency.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut queue = VecDeque::from([start]);
        let mut comp = Vec::new();
        while let Some(v) = queue.pop_front() {
            comp.push(v);
            for &u in &adjacency[v] {
                if !visited[u] {
                    visited[u] = true;
                    queue.push_back(u);
                }
            }
        }
        comp.sort_unstable();
        out.push(comp);
    }
    out
}

/// Fill one sampled-distance column from a BFS rooted at `pivot`; returns the
/// node that maximizes the minimum distance to all pivots so far.
fn bfs_fill_column(
    pivot: usize,
    col: usize,
    adjacency: &[Vec<usize>],
    c: &mut DMatrix<f64>,
    min_dist: &mut [f64],
) -> usize {
    let size = adjacency.len();
    let mut hops = vec![-1i64; size];
    hops[pivot] = 0;
    let mut queue = VecDeque::from([pivot]);
    while let Some(v) = queue.pop_front() {
        for &u in &adjacency[v] {
            if hops[u] == -1 {
                hops[u] = hops[v] + 1;
                queue.push_back(u);
            }
        }
    }

    let mut farthest = 0.0;
    let mut next = pivot;
    for i in 0..size {
        let d = if hops[i] == -1 {
            UNREACHABLE
        } else {
            hops[i] as f64 * NODE_SEPARATION
        };
        c[(i, col)] = d;
        if d < min_dist[i] {
            min_dist[i] = d;
        }
        if min_dist[i] > farthest {
            farthest = min_dist[i];
            next = i;
        }
    }
    next
}

/// Moore-Penrose-style inverse of the pivot block, regularized so repeated
/// singular values do not blow up.
fn regularized_inverse(phi: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let svd = nalgebra::linalg::SVD::new(phi.clone(), true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;
    let s = svd.singular_values;
    if s.len() == 0 {
        return None;
    }
    let max_s = s[0] * s[0] * s[0];
    let k = s.len();
    let mut sig = DMatrix::<f64>::zeros(k, k);
    for i in 0..k {
        let si2 = s[i] * s[i];
        let denom = if si2 == 0.0 {
            f64::INFINITY
        } else {
            si2 + (max_s / si2)
        };
        sig[(i, i)] = if denom.is_finite() && denom != 0.0 {
            s[i] / denom
        } else {
            0.0
        };
    }
    Some(v_t.transpose() * sig * u.transpose())
}

fn power_iteration(
    rng: &mut XorShift64Star,
    c: &DMatrix<f64>,
    inv: &DMatrix<f64>,
) -> Option<(DVector<f64>, DVector<f64>)> {
    let n = c.nrows();
    if n == 0 {
        return None;
    }
    let mut y1 = DVector::<f64>::from_fn(n, |_, _| rng.next_f64_unit());
    let mut y2 = DVector::<f64>::from_fn(n, |_, _| rng.next_f64_unit());
    normalize(&mut y1);
    normalize(&mut y2);

    let (v1, theta1) = eigenvector(c, inv, y1, None);
    let (v2, theta2) = eigenvector(c, inv, y2, Some(&v1));
    Some((v1 * theta1.abs().sqrt(), v2 * theta2.abs().sqrt()))
}

/// Power iteration against the implicitly-formed `-0.5 * J * C * INV * C^T * J`
/// operator; deflates against `deflate` when extracting the second vector.
fn eigenvector(
    c: &DMatrix<f64>,
    inv: &DMatrix<f64>,
    mut y: DVector<f64>,
    deflate: Option<&DVector<f64>>,
) -> (DVector<f64>, f64) {
    let mut previous = SMALL;
    let mut theta = 0.0;
    for _ in 0..MAX_POWER_ITERATIONS {
        let mut v = y.clone();
        if let Some(d) = deflate {
            let proj = d.dot(&v);
            v -= d * proj;
        }
        let t = center(&v);
        let t = apply_operator(&t, c, inv);
        let mut next = center(&t);
        theta = v.dot(&next);
        normalize(&mut next);

        let current = v.dot(&next);
        let denom = if previous.abs() < SMALL { SMALL } else { previous };
        let ratio = (current / denom).abs();
        y = next;
        if (1.0..=1.0 + PI_TOLERANCE).contains(&ratio) {
            break;
        }
        previous = current;
    }
    (y, theta)
}

fn center(v: &DVector<f64>) -> DVector<f64> {
    let n = v.len();
    if n == 0 {
        return v.clone();
    }
    let mean = v.iter().sum::<f64>() / n as f64;
    DVector::from_fn(n, |i, _| v[i] - mean)
}

fn apply_operator(v: &DVector<f64>, c: &DMatrix<f64>, inv: &DMatrix<f64>) -> DVector<f64> {
    let t = c.transpose() * v;
    let t = inv * t;
    (c * t) * -0.5
}

fn normalize(v: &mut DVector<f64>) {
    let norm = v.norm();
    if norm.is_finite() && norm > 0.0 {
        *v /= norm;
    }
}

/// Translate and uniformly scale raw coordinates into the middle 80% of the
/// canvas, preserving aspect ratio.
fn fit_to_bounds(coords: &[Point], bounds: Bounds) -> Vec<Point> {
    let min_x = coords.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = coords.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = coords.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = coords.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    let span = (max_x - min_x).max(max_y - min_y);
    let center = bounds.center();
    if span <= SMALL {
        return vec![center; coords.len()];
    }
    let scale = 0.8 * bounds.width.min(bounds.height) / span;
    let mid_x = (min_x + max_x) / 2.0;
    let mid_y = (min_y + max_y) / 2.0;
    coords
        .iter()
        .map(|p| {
            Point::new(
                center.x + (p.x - mid_x) * scale,
                center.y + (p.y - mid_y) * scale,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> (Vec<Node>, Vec<Edge>) {
        let nodes: Vec<Node> = (0..n).map(|i| Node::new(format!("n{i:02}"))).collect();
        let edges: Vec<Edge> = (1..n)
            .map(|i| Edge::new(format!("n{:02}", i - 1), format!("n{i:02}")))
            .collect();
        (nodes, edges)
    }

    #[test]
    fn output_is_complete_and_finite() {
        let (nodes, edges) = path(12);
        let pos = compute(&nodes, &edges, &SpectralOptions::default(), Bounds::default());
        assert_eq!(pos.len(), 12);
        for p in pos.values() {
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }

    #[test]
    fn seeded_runs_are_identical() {
        let (nodes, edges) = path(10);
        let opts = SpectralOptions::default();
        let a = compute(&nodes, &edges, &opts, Bounds::default());
        let b = compute(&nodes, &edges, &opts, Bounds::default());
        assert_eq!(a, b);
    }

    #[test]
    fn path_ends_are_far_apart() {
        let (nodes, edges) = path(10);
        let pos = compute(&nodes, &edges, &SpectralOptions::default(), Bounds::default());
        let ends = pos["n00"].distance_to(&pos["n09"]);
        let adjacent = pos["n00"].distance_to(&pos["n01"]);
        assert!(ends > adjacent * 3.0, "ends {ends} adjacent {adjacent}");
    }

    #[test]
    fn tiny_graph_falls_back_to_circle() {
        let nodes = vec![Node::new("a"), Node::new("b")];
        let edges = vec![Edge::new("a", "b")];
        let bounds = Bounds::new(800.0, 600.0);
        let pos = compute(&nodes, &edges, &SpectralOptions::default(), bounds);
        assert_eq!(pos, circle::compute(&nodes, bounds));
    }

    #[test]
    fn disconnected_components_are_still_placed() {
        let nodes = vec![
            Node::new("a"),
            Node::new("b"),
            Node::new("c"),
            Node::new("d"),
            Node::new("e"),
            Node::new("f"),
        ];
        let edges = vec![Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("d", "e")];
        let pos = compute(&nodes, &edges, &SpectralOptions::default(), Bounds::default());
        assert_eq!(pos.len(), 6);
        for p in pos.values() {
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }
}
