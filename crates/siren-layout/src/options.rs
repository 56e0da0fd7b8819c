//! Tunable configuration for the force simulator and the deterministic
//! layout algorithms.
//!
//! These structs are supplied by host UI controls and treated as immutable
//! for the duration of a layout run. The engine validates nothing beyond
//! numeric sanity; callers are responsible for sane configuration.

use serde::{Deserialize, Serialize};

/// Numeric configuration for [`crate::force::ForceSimulation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Coulomb repulsion numerator (`force = repulsion_strength / distance`).
    pub repulsion_strength: f64,
    /// Spring stiffness baseline for ordinary connections.
    pub attraction_strength: f64,
    /// Stiffness baseline for leaf connections; multiplied further by the
    /// phase schedule (up to 20x by the snap phase).
    pub leaf_spring_strength: f64,
    /// Velocity damping applied after the temperature cap.
    pub damping: f64,
    /// Uniform pull toward canvas center; disabled when <= 0.
    pub center_gravity: f64,
    /// Amplitude of the bounded random repulsion perturbation.
    pub chaos: f64,
    /// Neighborhood radius for spatial-index repulsion queries. Also the
    /// default cell size of the per-frame grid rebuild.
    pub repulsion_radius: f64,
    /// Stiffness of hub-to-hub springs (kept very weak so hubs pay out line
    /// instead of clumping).
    pub hub_edge_strength: f64,
    /// Repulsion multiplier for hub pairs above the degree threshold.
    pub hub_repulsion_boost: f64,
    /// Mean-degree multiple above which a pair counts as hub-hub for the
    /// repulsion boost.
    pub hub_degree_threshold: f64,
    /// Weak pull toward each node's highest-degree neighbor.
    pub hub_gravity: f64,
    /// Nominal node radius; collision separation is a multiple of this.
    pub node_radius: f64,
    /// Minimum separation between node centers, in node radii.
    pub min_separation_factor: f64,
    /// Total iteration budget used for phase selection and annealing.
    pub iterations: usize,
    /// Seed for the chaos contribution.
    pub seed: u64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            repulsion_strength: 4500.0,
            attraction_strength: 0.06,
            leaf_spring_strength: 0.12,
            damping: 0.85,
            center_gravity: 0.0,
            chaos: 0.0,
            repulsion_radius: 250.0,
            hub_edge_strength: 0.005,
            hub_repulsion_boost: 2.5,
            hub_degree_threshold: 1.5,
            hub_gravity: 0.01,
            node_radius: 20.0,
            min_separation_factor: 2.2,
            iterations: 300,
            seed: 1,
        }
    }
}

/// How timeline x positions are derived from timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineSpacing {
    /// X proportional to the timestamp's fraction of the observed range.
    #[default]
    Relative,
    /// X evenly distributed, nodes sorted by timestamp.
    Equal,
}

/// Ordering of swimlanes along the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneOrder {
    #[default]
    Alphabetical,
    /// Largest lanes first.
    MemberCountDesc,
    /// First-seen order while scanning the input nodes.
    Encounter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    pub spacing: TimelineSpacing,
    /// Attribute whose value groups nodes into horizontal swimlanes.
    pub swimlane_attr: Option<String>,
    pub lane_order: LaneOrder,
    /// Horizontal margin inside the canvas; nodes without a timestamp land at
    /// `width - margin`.
    pub margin: f64,
    /// Horizontal offset of a stub node from its referencing parent.
    pub stub_offset: f64,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            spacing: TimelineSpacing::Relative,
            swimlane_attr: None,
            lane_order: LaneOrder::Alphabetical,
            margin: 50.0,
            stub_offset: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    /// Horizontal gap between adjacent leaves.
    pub node_spacing: f64,
    /// Vertical gap between tree levels.
    pub level_spacing: f64,
    /// Gap between trees of a forest.
    pub tree_spacing: f64,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            node_spacing: 80.0,
            level_spacing: 100.0,
            tree_spacing: 120.0,
        }
    }
}

/// Direction in which layered ranks advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankDirection {
    #[default]
    TopBottom,
    BottomTop,
    LeftRight,
    RightLeft,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayeredOptions {
    pub direction: RankDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FruchtermanOptions {
    pub iterations: usize,
    pub seed: u64,
}

impl Default for FruchtermanOptions {
    fn default() -> Self {
        Self {
            iterations: 200,
            seed: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KamadaKawaiOptions {
    pub iterations: usize,
}

impl Default for KamadaKawaiOptions {
    fn default() -> Self {
        Self { iterations: 300 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralOptions {
    pub seed: u64,
    /// Pivot count for the sampled distance matrix.
    pub sample_size: usize,
}

impl Default for SpectralOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            sample_size: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomOptions {
    pub seed: u64,
    /// Fraction of each canvas dimension kept clear at the edges.
    pub inset: f64,
}

impl Default for RandomOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            inset: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialOptions {
    /// Radial gap between successive BFS rings.
    pub ring_spacing: f64,
}

impl Default for RadialOptions {
    fn default() -> Self {
        Self { ring_spacing: 90.0 }
    }
}

/// All per-algorithm option objects in one bundle, so hosts can hold a single
/// configuration value and switch algorithms at runtime.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub timeline: TimelineOptions,
    pub tree: TreeOptions,
    pub layered: LayeredOptions,
    pub radial: RadialOptions,
    pub fruchterman: FruchtermanOptions,
    pub kamada_kawai: KamadaKawaiOptions,
    pub spectral: SpectralOptions,
    pub random: RandomOptions,
}
