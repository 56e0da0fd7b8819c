//! Single-shot Fruchterman-Reingold layout with linear temperature cooling.
//!
//! Unlike the phased simulator this runs all of its iterations inside one
//! call, applies no leaf/hub heuristics, and clamps results into bounds.

use crate::options::FruchtermanOptions;
use crate::rng::XorShift64Star;
use rustc_hash::FxHashMap;
use siren_graph::{Bounds, Edge, Node, Point};
use std::collections::BTreeMap;

const MIN_DISTANCE: f64 = 0.01;

pub fn compute(
    nodes: &[Node],
    edges: &[Edge],
    opts: &FruchtermanOptions,
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

    let n = nodes.len();
    let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let index: FxHashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let pairs: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|e| {
            let s = *index.get(e.source.as_str())?;
            let t = *index.get(e.target.as_str())?;
            (s != t).then_some((s, t))
        })
        .collect();

    let k = (bounds.area().max(1.0) / n as f64).sqrt();
    let mut rng = XorShift64Star::new(opts.seed);
    let mut pts: Vec<Point> = (0..n)
        .map(|_| {
            Point::new(
                bounds.width * rng.next_f64_unit(),
                bounds.height * rng.next_f64_unit(),
            )
        })
        .collect();

    let iterations = opts.iterations.max(1);
    let t0 = bounds.width.min(bounds.height) / 10.0;
    for iter in 0..iterations {
        let temperature = t0 * (1.0 - iter as f64 / iterations as f64);
        let mut disp = vec![(0.0_f64, 0.0_f64); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = pts[i].x - pts[j].x;
                let dy = pts[i].y - pts[j].y;
                let dist = dx.hypot(dy).max(MIN_DISTANCE);
                let force = k * k / dist;
                disp[i].0 += force * dx / dist;
                disp[i].1 += force * dy / dist;
                disp[j].0 -= force * dx / dist;
                disp[j].1 -= force * dy / dist;
            }
        }

        for &(s, t) in &pairs {
            let dx = pts[s].x - pts[t].x;
            let dy = pts[s].y - pts[t].y;
            let dist = dx.hypot(dy).max(MIN_DISTANCE);
            let force = dist * dist / k;
            disp[s].0 -= force * dx / dist;
            disp[s].1 -= force * dy / dist;
            disp[t].0 += force * dx / dist;
            disp[t].1 += force * dy / dist;
        }

        for i in 0..n {
            let (dx, dy) = disp[i];
            let mag = dx.hypot(dy).max(MIN_DISTANCE);
            let step = mag.min(temperature);
            pts[i].x = (pts[i].x + dx / mag * step).clamp(0.0, bounds.width);
            pts[i].y = (pts[i].y + dy / mag * step).clamp(0.0, bounds.height);
        }
    }

    for (id, p) in ids.iter().zip(pts) {
        positions.insert((*id).to_string(), p);
    }
    positions
}
