//! Phase schedule for the iterative simulator.
//!
//! The simulation advances through four fixed-length phases selected purely
//! from iteration progress; each phase occupies a quarter of the iteration
//! budget. Phase changes alter only the parameters fed into an otherwise
//! identical force-accumulation step.

/// One of the four stages of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Strong repulsion blows the graph apart so clusters can untangle.
    Explosion,
    /// Springs pull structure back together; leaf retraction begins.
    Retraction,
    /// Repulsion relaxes, collision constraints extend to leaves.
    Spacing,
    /// Leaves snap tight to their parents; forces settle.
    Snap,
}

impl Phase {
    /// Phase for a given progress fraction in `[0, 1]`.
    pub fn at(progress: f64) -> Self {
        if progress < 0.25 {
            Self::Explosion
        } else if progress < 0.5 {
            Self::Retraction
        } else if progress < 0.75 {
            Self::Spacing
        } else {
            Self::Snap
        }
    }

    pub fn profile(self) -> PhaseProfile {
        match self {
            Self::Explosion => PhaseProfile {
                leaf_rest_length: 30.0,
                leaf_stiffness_mul: 1.0,
                leaf_attraction: 0.0,
                normal_rest_length: 120.0,
                hub_rest_length: 260.0,
                repulsion_scale: 3.0,
                leaf_collisions: false,
            },
            Self::Retraction => PhaseProfile {
                leaf_rest_length: 20.0,
                leaf_stiffness_mul: 4.0,
                leaf_attraction: 0.02,
                normal_rest_length: 100.0,
                hub_rest_length: 260.0,
                repulsion_scale: 1.5,
                leaf_collisions: false,
            },
            Self::Spacing => PhaseProfile {
                leaf_rest_length: 10.0,
                leaf_stiffness_mul: 10.0,
                leaf_attraction: 0.05,
                normal_rest_length: 90.0,
                hub_rest_length: 240.0,
                repulsion_scale: 1.0,
                leaf_collisions: true,
            },
            Self::Snap => PhaseProfile {
                leaf_rest_length: 5.0,
                leaf_stiffness_mul: 20.0,
                leaf_attraction: 0.12,
                normal_rest_length: 80.0,
                hub_rest_length: 220.0,
                repulsion_scale: 0.6,
                leaf_collisions: true,
            },
        }
    }
}

/// Force parameters resolved for one phase.
///
/// Leaf springs tighten monotonically across phases (rest length 30 -> 5,
/// stiffness x1 -> x20) while hub-to-hub springs stay long and weak, so hubs
/// pay out line instead of clumping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseProfile {
    pub leaf_rest_length: f64,
    pub leaf_stiffness_mul: f64,
    /// Secondary leaf-to-parent attraction coefficient; zero before the
    /// retraction phase.
    pub leaf_attraction: f64,
    pub normal_rest_length: f64,
    pub hub_rest_length: f64,
    pub repulsion_scale: f64,
    /// Whether collision resolution applies to pairs involving a leaf.
    pub leaf_collisions: bool,
}
