//! Timeline layout: x from timestamps, y from optional swimlane grouping.

use crate::options::{LaneOrder, TimelineOptions, TimelineSpacing};
use crate::rng::pair_unit_hash;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use siren_graph::topology::AdjacencyView;
use siren_graph::{Bounds, Edge, Node, Point};
use std::collections::BTreeMap;

/// One horizontal band of the timeline, keyed by the shared attribute value.
#[derive(Debug, Clone, PartialEq)]
pub struct Swimlane {
    pub label: String,
    /// Y coordinate of the lane's vertical center.
    pub y: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TimelineResult {
    pub positions: BTreeMap<String, Point>,
    pub lanes: Vec<Swimlane>,
}

pub fn compute(
    nodes: &[Node],
    edges: &[Edge],
    opts: &TimelineOptions,
    bounds: Bounds,
) -> TimelineResult {
    if nodes.is_empty() {
        return TimelineResult::default();
    }
    if nodes.len() == 1 {
        let mut positions = BTreeMap::new();
        positions.insert(nodes[0].id.clone(), bounds.center());
        return TimelineResult {
            positions,
            lanes: Vec::new(),
        };
    }

    let usable = (bounds.width - 2.0 * opts.margin).max(0.0);
    let lanes = build_lanes(nodes, opts, bounds);
    let lane_of: FxHashMap<&str, usize> = lane_membership(nodes, opts, &lanes);

    let mut positions: BTreeMap<String, Point> = BTreeMap::new();

    // X placement for everything that sits on the timeline proper.
    let on_axis: Vec<&Node> = nodes.iter().filter(|n| !n.stub).collect();
    match opts.spacing {
        TimelineSpacing::Relative => {
            let stamps: Vec<f64> = on_axis.iter().filter_map(|n| n.timestamp).collect();
            let min = stamps.iter().copied().fold(f64::INFINITY, f64::min);
            let max = stamps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            for node in &on_axis {
                let x = match node.timestamp {
                    Some(ts) => {
                        let frac = if max > min { (ts - min) / (max - min) } else { 0.5 };
                        opts.margin + frac * usable
                    }
                    // No timestamp: after all timestamped nodes, at the edge.
                    None => bounds.width - opts.margin,
                };
                positions.insert(node.id.clone(), Point::new(x, 0.0));
            }
        }
        TimelineSpacing::Equal => {
            let mut stamped: Vec<&&Node> =
                on_axis.iter().filter(|n| n.timestamp.is_some()).collect();
            stamped.sort_by(|a, b| {
                a.timestamp
                    .partial_cmp(&b.timestamp)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.id.cmp(&b.id))
            });
            let count = stamped.len();
            for (i, node) in stamped.iter().enumerate() {
                let frac = if count > 1 {
                    i as f64 / (count - 1) as f64
                } else {
                    0.5
                };
                positions.insert(
                    node.id.clone(),
                    Point::new(opts.margin + frac * usable, 0.0),
                );
            }
            for node in &on_axis {
                if node.timestamp.is_none() {
                    positions.insert(
                        node.id.clone(),
                        Point::new(bounds.width - opts.margin, 0.0),
                    );
                }
            }
        }
    }

    // Y placement: lane center plus a deterministic jitter inside the lane,
    // or the canvas midline when no grouping is configured.
    for node in &on_axis {
        if let Some(p) = positions.get_mut(&node.id) {
            p.y = match lane_of.get(node.id.as_str()) {
                Some(&idx) => {
                    let lane = &lanes[idx];
                    let jitter =
                        (pair_unit_hash(&node.id, &lane.label) - 0.5) * lane.height * 0.5;
                    lane.y + jitter
                }
                None => bounds.height / 2.0,
            };
        }
    }

    // Stubs hang off their referencing parent instead of the axis. Several
    // stubs of one parent stack below it in id order.
    let view = AdjacencyView::build(nodes, edges);
    let mut stubs: Vec<&Node> = nodes.iter().filter(|n| n.stub).collect();
    stubs.sort_by(|a, b| a.id.cmp(&b.id));
    let mut per_parent: FxHashMap<&str, usize> = FxHashMap::default();
    for stub in stubs {
        let parent = view
            .neighbors_sorted(&stub.id)
            .into_iter()
            .find(|n| positions.contains_key(*n));
        let point = match parent {
            Some(pid) => {
                let pp = positions[pid];
                let rank = per_parent.entry(pid).or_insert(0);
                *rank += 1;
                Point::new(pp.x + opts.stub_offset, pp.y + opts.stub_offset * *rank as f64)
            }
            // Orphan stub: fall back to the untimestamped edge position.
            None => Point::new(bounds.width - opts.margin, bounds.height / 2.0),
        };
        positions.insert(stub.id.clone(), point);
    }

    TimelineResult { positions, lanes }
}

fn build_lanes(nodes: &[Node], opts: &TimelineOptions, bounds: Bounds) -> Vec<Swimlane> {
    let Some(attr) = &opts.swimlane_attr else {
        return Vec::new();
    };

    // Insertion order doubles as encounter order; non-stub nodes only.
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for node in nodes.iter().filter(|n| !n.stub) {
        *counts.entry(lane_label(node, attr)).or_insert(0) += 1;
    }
    if counts.is_empty() {
        return Vec::new();
    }

    match opts.lane_order {
        LaneOrder::Alphabetical => counts.sort_keys(),
        LaneOrder::MemberCountDesc => {
            counts.sort_by(|ka, va, kb, vb| vb.cmp(va).then_with(|| ka.cmp(kb)));
        }
        LaneOrder::Encounter => {}
    }

    let height = bounds.height / counts.len() as f64;
    counts
        .into_keys()
        .enumerate()
        .map(|(i, label)| Swimlane {
            label,
            y: (i as f64 + 0.5) * height,
            height,
        })
        .collect()
}

fn lane_membership<'a>(
    nodes: &'a [Node],
    opts: &TimelineOptions,
    lanes: &[Swimlane],
) -> FxHashMap<&'a str, usize> {
    let mut map = FxHashMap::default();
    let Some(attr) = &opts.swimlane_attr else {
        return map;
    };
    let index: FxHashMap<&str, usize> = lanes
        .iter()
        .enumerate()
        .map(|(i, l)| (l.label.as_str(), i))
        .collect();
    for node in nodes.iter().filter(|n| !n.stub) {
        if let Some(&i) = index.get(lane_label(node, attr).as_str()) {
            map.insert(node.id.as_str(), i);
        }
    }
    map
}

/// Nodes missing the grouping attribute (or holding an uncoercible value)
/// collect in an unlabeled lane.
fn lane_label(node: &Node, attr: &str) -> String {
    node.attrs
        .get(attr)
        .and_then(|v| v.as_group_label())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use siren_graph::AttrValue;

    fn node_at(id: &str, ts: Option<f64>) -> Node {
        Node {
            timestamp: ts,
            ..Node::new(id)
        }
    }

    #[test]
    fn path_scenario_places_margins_and_untimestamped_edge() {
        let nodes = vec![
            node_at("A", Some(0.0)),
            node_at("B", None),
            node_at("C", Some(100.0)),
        ];
        let edges = vec![Edge::new("A", "B"), Edge::new("B", "C")];
        let bounds = Bounds::new(1000.0, 600.0);
        let result = compute(&nodes, &edges, &TimelineOptions::default(), bounds);

        let a = result.positions["A"];
        let b = result.positions["B"];
        let c = result.positions["C"];
        assert_eq!(a.x, 50.0);
        assert_eq!(c.x, 950.0);
        assert_eq!(b.x, 950.0);
        assert_eq!(a.y, 300.0);
        assert_eq!(b.y, a.y);
        assert_eq!(c.y, a.y);
    }

    #[test]
    fn equal_spacing_distributes_by_rank() {
        let nodes = vec![
            node_at("a", Some(0.0)),
            node_at("b", Some(1.0)),
            // Far outlier; equal spacing ignores the gap.
            node_at("c", Some(1000.0)),
        ];
        let opts = TimelineOptions {
            spacing: TimelineSpacing::Equal,
            ..Default::default()
        };
        let result = compute(&nodes, &[], &opts, Bounds::new(1000.0, 600.0));
        assert_eq!(result.positions["a"].x, 50.0);
        assert_eq!(result.positions["b"].x, 500.0);
        assert_eq!(result.positions["c"].x, 950.0);
    }

    #[test]
    fn swimlanes_sort_alphabetically_by_default() {
        let mut n1 = node_at("n1", Some(0.0));
        n1.attrs
            .insert("team".to_string(), AttrValue::Scalar("zulu".to_string()));
        let mut n2 = node_at("n2", Some(1.0));
        n2.attrs
            .insert("team".to_string(), AttrValue::Scalar("alpha".to_string()));
        let opts = TimelineOptions {
            swimlane_attr: Some("team".to_string()),
            ..Default::default()
        };
        let result = compute(&[n1, n2], &[], &opts, Bounds::new(800.0, 600.0));

        assert_eq!(result.lanes.len(), 2);
        assert_eq!(result.lanes[0].label, "alpha");
        assert_eq!(result.lanes[1].label, "zulu");
        assert_eq!(result.lanes[0].y, 150.0);
        assert_eq!(result.lanes[1].y, 450.0);
        // Each node stays inside its lane band despite jitter.
        let y2 = result.positions["n2"].y;
        assert!(y2 > 0.0 && y2 < 300.0);
        let y1 = result.positions["n1"].y;
        assert!(y1 > 300.0 && y1 < 600.0);
    }

    #[test]
    fn member_count_order_puts_largest_lane_first() {
        let mut nodes = Vec::new();
        for (id, team) in [("a", "small"), ("b", "big"), ("c", "big"), ("d", "big")] {
            let mut n = node_at(id, Some(0.0));
            n.attrs
                .insert("team".to_string(), AttrValue::Scalar(team.to_string()));
            nodes.push(n);
        }
        let opts = TimelineOptions {
            swimlane_attr: Some("team".to_string()),
            lane_order: LaneOrder::MemberCountDesc,
            ..Default::default()
        };
        let result = compute(&nodes, &[], &opts, Bounds::default());
        assert_eq!(result.lanes[0].label, "big");
        assert_eq!(result.lanes[1].label, "small");
    }

    #[test]
    fn stubs_hang_off_their_parent() {
        let mut stub = Node::new("ghost");
        stub.stub = true;
        let nodes = vec![node_at("real", Some(50.0)), stub];
        let edges = vec![Edge::new("real", "ghost")];
        let opts = TimelineOptions::default();
        let result = compute(&nodes, &edges, &opts, Bounds::new(1000.0, 600.0));

        let parent = result.positions["real"];
        let ghost = result.positions["ghost"];
        assert_eq!(ghost.x, parent.x + opts.stub_offset);
        assert_eq!(ghost.y, parent.y + opts.stub_offset);
    }

    #[test]
    fn single_node_lands_at_center() {
        let result = compute(
            &[node_at("solo", Some(3.0))],
            &[],
            &TimelineOptions::default(),
            Bounds::new(800.0, 600.0),
        );
        assert_eq!(result.positions["solo"], Point::new(400.0, 300.0));
    }

    #[test]
    fn identical_timestamps_collapse_to_band_center() {
        let nodes = vec![node_at("a", Some(7.0)), node_at("b", Some(7.0))];
        let result = compute(&nodes, &[], &TimelineOptions::default(), Bounds::new(1000.0, 600.0));
        assert_eq!(result.positions["a"].x, 500.0);
        assert_eq!(result.positions["b"].x, 500.0);
    }
}
