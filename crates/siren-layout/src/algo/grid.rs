//! Grid layout: row-major cells, node order by id.

use siren_graph::{Bounds, Node, Point};
use std::collections::BTreeMap;

pub fn compute(nodes: &[Node], bounds: Bounds) -> BTreeMap<String, Point> {
    let mut positions: BTreeMap<String, Point> = BTreeMap::new();
    if nodes.is_empty() {
        return positions;
    }

    let mut ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    ids.sort_unstable();

    let cols = (ids.len() as f64).sqrt().ceil().max(1.0) as usize;
    let rows = ids.len().div_ceil(cols);
    let cell_w = bounds.width / cols as f64;
    let cell_h = bounds.height / rows as f64;

    for (i, id) in ids.iter().enumerate() {
        let col = i % cols;
        let row = i / cols;
        positions.insert(
            (*id).to_string(),
            Point::new(
                (col as f64 + 0.5) * cell_w,
                (row as f64 + 0.5) * cell_h,
            ),
        );
    }
    positions
}
