//! Layered (sugiyama-style) layout: longest-path ranking plus even spacing.

use crate::options::{LayeredOptions, RankDirection};
use rustc_hash::FxHashMap;
use siren_graph::{Bounds, Edge, Node, Point};
use std::collections::{BTreeMap, VecDeque};

pub fn compute(
    nodes: &[Node],
    edges: &[Edge],
    opts: &LayeredOptions,
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

    let layers = assign_layers(nodes, edges);

    // Bucket by layer; within a layer, order by id for stable output.
    let mut buckets: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for node in nodes {
        buckets
            .entry(layers[node.id.as_str()])
            .or_default()
            .push(node.id.as_str());
    }
    for bucket in buckets.values_mut() {
        bucket.sort_unstable();
    }

    let layer_count = buckets.len();
    let (main_extent, cross_extent) = match opts.direction {
        RankDirection::TopBottom | RankDirection::BottomTop => (bounds.height, bounds.width),
        RankDirection::LeftRight | RankDirection::RightLeft => (bounds.width, bounds.height),
    };

    for (rank, (_, members)) in buckets.iter().enumerate() {
        let main = (rank as f64 + 0.5) * main_extent / layer_count as f64;
        let main = match opts.direction {
            RankDirection::TopBottom | RankDirection::LeftRight => main,
            RankDirection::BottomTop | RankDirection::RightLeft => main_extent - main,
        };
        for (i, id) in members.iter().enumerate() {
            let cross = (i as f64 + 0.5) * cross_extent / members.len() as f64;
            let point = match opts.direction {
                RankDirection::TopBottom | RankDirection::BottomTop => Point::new(cross, main),
                RankDirection::LeftRight | RankDirection::RightLeft => Point::new(main, cross),
            };
            positions.insert((*id).to_string(), point);
        }
    }
    positions
}

/// Longest path from any source, propagated over a Kahn-style frontier.
/// Disconnected nodes stay at layer 0; nodes trapped in cycles take the
/// maximum layer of any processed predecessor plus one (or 0 when none).
fn assign_layers<'a>(nodes: &'a [Node], edges: &'a [Edge]) -> FxHashMap<&'a str, usize> {
    let mut layer: FxHashMap<&str, usize> = FxHashMap::default();
    let mut out: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    let mut remaining: FxHashMap<&str, usize> = FxHashMap::default();
    for node in nodes {
        layer.insert(node.id.as_str(), 0);
        out.insert(node.id.as_str(), Vec::new());
        remaining.insert(node.id.as_str(), 0);
    }
    for edge in edges {
        let (s, t) = (edge.source.as_str(), edge.target.as_str());
        if s == t || !layer.contains_key(s) || !layer.contains_key(t) {
            continue;
        }
        if let Some(targets) = out.get_mut(s) {
            targets.push(t);
        }
        if let Some(r) = remaining.get_mut(t) {
            *r += 1;
        }
    }

    let mut queue: VecDeque<&str> = nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| remaining[id] == 0)
        .collect();
    let mut processed = 0usize;
    while let Some(id) = queue.pop_front() {
        processed += 1;
        let next = layer[id] + 1;
        for &t in &out[id].clone() {
            if next > layer[t] {
                layer.insert(t, next);
            }
            if let Some(r) = remaining.get_mut(t) {
                *r -= 1;
                if *r == 0 {
                    queue.push_back(t);
                }
            }
        }
    }

    // Cycle remnants, in id order so the result is stable.
    if processed < nodes.len() {
        let mut leftovers: Vec<&str> = nodes
            .iter()
            .map(|n| n.id.as_str())
            .filter(|id| remaining[id] > 0)
            .collect();
        leftovers.sort_unstable();
        for id in leftovers {
            let max_pred = out
                .iter()
                .filter(|(_, targets)| targets.contains(&id))
                .map(|(src, _)| layer[src])
                .max();
            layer.insert(id, max_pred.map_or(0, |m| m + 1));
        }
    }

    layer
}
