//! The layout-algorithm registry.
//!
//! Every algorithm here is a single-shot pure function from
//! `(nodes, edges, options, bounds)` to a position map: deterministic for
//! identical inputs, complete (its key set equals the input id set), and
//! tolerant of empty, singleton and partially-dangling graphs. The iterative
//! simulator lives in [`crate::force`] and is driven frame-by-frame instead.

pub mod circle;
pub mod fruchterman;
pub mod grid;
pub mod kamada_kawai;
pub mod layered;
pub mod radial;
pub mod random;
pub mod spectral;
pub mod timeline;
pub mod tree;

use crate::error::{Error, Result};
use crate::options::LayoutOptions;
use siren_graph::{Bounds, Edge, Node, Point};
use std::collections::BTreeMap;

pub use timeline::Swimlane;

/// The closed set of single-shot layouts, selectable by name at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutAlgorithm {
    Timeline,
    Tree,
    Layered,
    Radial,
    Circle,
    Grid,
    Fruchterman,
    KamadaKawai,
    Spectral,
    Random,
}

pub const ALL_ALGORITHMS: &[LayoutAlgorithm] = &[
    LayoutAlgorithm::Timeline,
    LayoutAlgorithm::Tree,
    LayoutAlgorithm::Layered,
    LayoutAlgorithm::Radial,
    LayoutAlgorithm::Circle,
    LayoutAlgorithm::Grid,
    LayoutAlgorithm::Fruchterman,
    LayoutAlgorithm::KamadaKawai,
    LayoutAlgorithm::Spectral,
    LayoutAlgorithm::Random,
];

impl LayoutAlgorithm {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "timeline" => Ok(Self::Timeline),
            "tree" => Ok(Self::Tree),
            "layered" => Ok(Self::Layered),
            "radial" => Ok(Self::Radial),
            "circle" => Ok(Self::Circle),
            "grid" => Ok(Self::Grid),
            "fruchterman" => Ok(Self::Fruchterman),
            "kamada_kawai" => Ok(Self::KamadaKawai),
            "spectral" => Ok(Self::Spectral),
            "random" => Ok(Self::Random),
            other => Err(Error::UnknownAlgorithm {
                name: other.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Timeline => "timeline",
            Self::Tree => "tree",
            Self::Layered => "layered",
            Self::Radial => "radial",
            Self::Circle => "circle",
            Self::Grid => "grid",
            Self::Fruchterman => "fruchterman",
            Self::KamadaKawai => "kamada_kawai",
            Self::Spectral => "spectral",
            Self::Random => "random",
        }
    }
}

/// Positions plus whatever grouping metadata the algorithm derived. Only the
/// timeline populates `lanes`; every other algorithm leaves it empty.
#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
    pub positions: BTreeMap<String, Point>,
    pub lanes: Vec<Swimlane>,
}

impl LayoutResult {
    fn positions_only(positions: BTreeMap<String, Point>) -> Self {
        Self {
            positions,
            lanes: Vec::new(),
        }
    }
}

/// Run one single-shot algorithm over a node/edge snapshot.
pub fn compute(
    algorithm: LayoutAlgorithm,
    nodes: &[Node],
    edges: &[Edge],
    options: &LayoutOptions,
    bounds: Bounds,
) -> LayoutResult {
    tracing::debug!(
        algorithm = algorithm.name(),
        nodes = nodes.len(),
        edges = edges.len(),
        "computing layout"
    );
    match algorithm {
        LayoutAlgorithm::Timeline => {
            let result = timeline::compute(nodes, edges, &options.timeline, bounds);
            LayoutResult {
                positions: result.positions,
                lanes: result.lanes,
            }
        }
        LayoutAlgorithm::Tree => {
            LayoutResult::positions_only(tree::compute(nodes, edges, &options.tree, bounds))
        }
        LayoutAlgorithm::Layered => {
            LayoutResult::positions_only(layered::compute(nodes, edges, &options.layered, bounds))
        }
        LayoutAlgorithm::Radial => {
            LayoutResult::positions_only(radial::compute(nodes, edges, &options.radial, bounds))
        }
        LayoutAlgorithm::Circle => {
            LayoutResult::positions_only(circle::compute(nodes, bounds))
        }
        LayoutAlgorithm::Grid => LayoutResult::positions_only(grid::compute(nodes, bounds)),
        LayoutAlgorithm::Fruchterman => LayoutResult::positions_only(fruchterman::compute(
            nodes,
            edges,
            &options.fruchterman,
            bounds,
        )),
        LayoutAlgorithm::KamadaKawai => LayoutResult::positions_only(kamada_kawai::compute(
            nodes,
            edges,
            &options.kamada_kawai,
            bounds,
        )),
        LayoutAlgorithm::Spectral => LayoutResult::positions_only(spectral::compute(
            nodes,
            edges,
            &options.spectral,
            bounds,
        )),
        LayoutAlgorithm::Random => {
            LayoutResult::positions_only(random::compute(nodes, &options.random, bounds))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for &alg in ALL_ALGORITHMS {
            assert_eq!(LayoutAlgorithm::from_name(alg.name()).unwrap(), alg);
        }
    }

    #[test]
    fn unknown_name_is_reported() {
        let err = LayoutAlgorithm::from_name("voronoi").unwrap_err();
        assert!(matches!(err, Error::UnknownAlgorithm { name } if name == "voronoi"));
    }
}
