//! Seeded uniform scatter, kept away from the canvas edges by an inset.

use crate::options::RandomOptions;
use crate::rng::XorShift64Star;
use siren_graph::{Bounds, Node, Point};
use std::collections::BTreeMap;

pub fn compute(nodes: &[Node], opts: &RandomOptions, bounds: Bounds) -> BTreeMap<String, Point> {
    let mut positions: BTreeMap<String, Point> = BTreeMap::new();
    if nodes.is_empty() {
        return positions;
    }
    if nodes.len() == 1 {
        positions.insert(nodes[0].id.clone(), bounds.center());
        return positions;
    }

    let inset = opts.inset.clamp(0.0, 0.45);
    let mut rng = XorShift64Star::new(opts.seed);

    // Scatter in id order so the pairing of node to draw is stable even when
    // the caller reorders its node list.
    let mut ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    ids.sort_unstable();
    for id in ids {
        let x = bounds.width * (inset + (1.0 - 2.0 * inset) * rng.next_f64_unit());
        let y = bounds.height * (inset + (1.0 - 2.0 * inset) * rng.next_f64_unit());
        positions.insert(id.to_string(), Point::new(x, y));
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_respects_the_inset() {
        let nodes: Vec<Node> = (0..50).map(|i| Node::new(format!("n{i}"))).collect();
        let bounds = Bounds::new(1000.0, 500.0);
        let opts = RandomOptions::default();
        let pos = compute(&nodes, &opts, bounds);
        assert_eq!(pos.len(), 50);
        for p in pos.values() {
            assert!(p.x >= 50.0 && p.x <= 950.0);
            assert!(p.y >= 25.0 && p.y <= 475.0);
        }
    }

    #[test]
    fn input_order_does_not_change_the_result() {
        let forward: Vec<Node> = ["a", "b", "c"].iter().map(|n| Node::new(*n)).collect();
        let backward: Vec<Node> = ["c", "b", "a"].iter().map(|n| Node::new(*n)).collect();
        let opts = RandomOptions::default();
        assert_eq!(
            compute(&forward, &opts, Bounds::default()),
            compute(&backward, &opts, Bounds::default())
        );
    }

    #[test]
    fn seeds_change_the_scatter() {
        let nodes: Vec<Node> = ["a", "b"].iter().map(|n| Node::new(*n)).collect();
        let a = compute(&nodes, &RandomOptions { seed: 1, ..Default::default() }, Bounds::default());
        let b = compute(&nodes, &RandomOptions { seed: 2, ..Default::default() }, Bounds::default());
        assert_ne!(a, b);
    }
}
