#![forbid(unsafe_code)]

//! Layout and positioning engine: a multi-phase force-directed simulator, a
//! uniform-grid spatial index, and a registry of single-shot deterministic
//! layout algorithms sharing one contract.
//!
//! The deterministic path is one call:
//!
//! ```
//! use siren_graph::{Bounds, Edge, Node};
//! use siren_layout::{LayoutOptions, layout};
//!
//! let nodes = vec![Node::new("a"), Node::new("b")];
//! let edges = vec![Edge::new("a", "b")];
//! let result = layout("circle", &nodes, &edges, &LayoutOptions::default(), Bounds::default())?;
//! assert_eq!(result.positions.len(), 2);
//! # Ok::<(), siren_layout::Error>(())
//! ```
//!
//! The iterative path is caller-driven: build a
//! [`force::ForceSimulation`] and invoke [`force::ForceSimulation::step`]
//! once per animation tick, reading positions between frames.

pub mod algo;
pub mod error;
pub mod force;
pub mod geom;
pub mod options;
pub mod rng;
pub mod spatial;

pub use algo::{ALL_ALGORITHMS, LayoutAlgorithm, LayoutResult, Swimlane};
pub use error::{Error, Result};
pub use force::ForceSimulation;
pub use options::{LayoutOptions, PhysicsParams};
pub use spatial::SpatialGrid;

use siren_graph::{Bounds, Edge, Node};

/// Resolve an algorithm by name and run it over the snapshot.
pub fn layout(
    name: &str,
    nodes: &[Node],
    edges: &[Edge],
    options: &LayoutOptions,
    bounds: Bounds,
) -> Result<LayoutResult> {
    let algorithm = LayoutAlgorithm::from_name(name)?;
    Ok(algo::compute(algorithm, nodes, edges, options, bounds))
}
