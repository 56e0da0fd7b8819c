//! Circle layout: all nodes on one ring, ordered by id.

use siren_graph::{Bounds, Node, Point};
use std::collections::BTreeMap;

/// Radius fraction of the smaller canvas dimension.
const RADIUS_FACTOR: f64 = 0.4;

pub fn compute(nodes: &[Node], bounds: Bounds) -> BTreeMap<String, Point> {
    let mut positions: BTreeMap<String, Point> = BTreeMap::new();
    if nodes.is_empty() {
        return positions;
    }
    let center = bounds.center();
    if nodes.len() == 1 {
        positions.insert(nodes[0].id.clone(), center);
        return positions;
    }

    let mut ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    ids.sort_unstable();

    let radius = bounds.width.min(bounds.height) * RADIUS_FACTOR;
    let step = std::f64::consts::TAU / ids.len() as f64;
    for (i, id) in ids.iter().enumerate() {
        let angle = -std::f64::consts::FRAC_PI_2 + i as f64 * step;
        positions.insert(
            (*id).to_string(),
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin()),
        );
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_share_one_radius() {
        let nodes: Vec<Node> = ["a", "b", "c", "d"].iter().map(|n| Node::new(*n)).collect();
        let bounds = Bounds::new(800.0, 600.0);
        let pos = compute(&nodes, bounds);
        let center = bounds.center();
        for p in pos.values() {
            assert!((p.distance_to(&center) - 240.0).abs() < 1e-9);
        }
    }

    #[test]
    fn first_id_starts_at_twelve_oclock() {
        let nodes: Vec<Node> = ["b", "a"].iter().map(|n| Node::new(*n)).collect();
        let pos = compute(&nodes, Bounds::new(800.0, 600.0));
        assert!((pos["a"].x - 400.0).abs() < 1e-9);
        assert!(pos["a"].y < 300.0);
    }

    #[test]
    fn singleton_sits_at_center() {
        let pos = compute(&[Node::new("solo")], Bounds::new(800.0, 600.0));
        assert_eq!(pos["solo"], Point::new(400.0, 300.0));
    }
}
