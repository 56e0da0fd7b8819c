//! Multi-phase force-directed simulator.
//!
//! One [`ForceSimulation`] owns the per-frame state of an iterative layout
//! run. The caller drives it: typically one [`ForceSimulation::step`] per
//! animation tick until the iteration budget is spent, reading positions out
//! between frames. Each frame is a bounded synchronous computation over a
//! snapshot; the simulator never touches the caller's node/edge collections.

pub mod phase;

use crate::error::{Error, Result};
use crate::options::PhysicsParams;
use crate::rng::{XorShift64Star, pair_unit_hash};
use crate::spatial::SpatialGrid;
use phase::{Phase, PhaseProfile};
use rustc_hash::FxHashMap;
use siren_graph::topology::AdjacencyView;
use siren_graph::{Bounds, Edge, Node, Point, Position};
use std::collections::BTreeMap;

const MIN_DISTANCE: f64 = 0.01;

#[derive(Debug)]
pub struct ForceSimulation {
    ids: Vec<String>,
    id_to_idx: FxHashMap<String, usize>,
    /// Sorted neighbor indices per node.
    neighbors: Vec<Vec<usize>>,
    degrees: Vec<usize>,
    /// The single neighbor of a degree-1 node.
    leaf_parent: Vec<Option<usize>>,
    /// Highest-degree neighbor, the target of hub gravity.
    hub_neighbor: Vec<Option<usize>>,
    has_leaf_child: Vec<bool>,
    mean_degree: f64,

    positions: Vec<Position>,
    dragged: Vec<bool>,

    params: PhysicsParams,
    bounds: Bounds,
    iteration: usize,
    rng: XorShift64Star,
    last_max_displacement: f64,
}

impl ForceSimulation {
    /// Build a simulation over a node/edge snapshot.
    ///
    /// When `previous` is supplied it must contain an entry for every node in
    /// the snapshot; a missing entry is a programmer error at the integration
    /// boundary and is surfaced as [`Error::MissingPosition`]. Entries for
    /// unknown ids are ignored. Without `previous`, nodes start from their
    /// preset position when present, otherwise from a seeded scatter.
    pub fn new(
        nodes: &[Node],
        edges: &[Edge],
        params: PhysicsParams,
        bounds: Bounds,
        previous: Option<&BTreeMap<String, Position>>,
    ) -> Result<Self> {
        let view = AdjacencyView::build(nodes, edges);

        let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
        let mut id_to_idx: FxHashMap<String, usize> = FxHashMap::default();
        id_to_idx.reserve(ids.len() * 2);
        for (idx, id) in ids.iter().enumerate() {
            id_to_idx.insert(id.clone(), idx);
        }

        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
        for (idx, id) in ids.iter().enumerate() {
            let mut ns: Vec<usize> = view
                .neighbors_sorted(id)
                .into_iter()
                .filter_map(|n| id_to_idx.get(n).copied())
                .collect();
            ns.sort_unstable();
            neighbors[idx] = ns;
        }

        let degrees: Vec<usize> = neighbors.iter().map(Vec::len).collect();
        let leaf_parent: Vec<Option<usize>> = neighbors
            .iter()
            .map(|ns| if ns.len() == 1 { Some(ns[0]) } else { None })
            .collect();
        let hub_neighbor: Vec<Option<usize>> = ids
            .iter()
            .map(|id| view.hub_neighbor(id).and_then(|n| id_to_idx.get(n).copied()))
            .collect();
        let mut has_leaf_child: Vec<bool> = vec![false; ids.len()];
        for parent in leaf_parent.iter().flatten() {
            has_leaf_child[*parent] = true;
        }
        let mean_degree = view.mean_degree();

        let mut rng = XorShift64Star::new(params.seed);
        let positions: Vec<Position> = match previous {
            Some(prev) => {
                let mut out = Vec::with_capacity(ids.len());
                for id in &ids {
                    match prev.get(id) {
                        Some(p) => out.push(*p),
                        None => {
                            return Err(Error::MissingPosition {
                                node_id: id.clone(),
                            });
                        }
                    }
                }
                out
            }
            None => nodes
                .iter()
                .map(|n| match n.preset {
                    Some(p) => Position::at(p.x, p.y),
                    None => Position::at(
                        bounds.width * rng.next_f64_unit(),
                        bounds.height * rng.next_f64_unit(),
                    ),
                })
                .collect(),
        };

        Ok(Self {
            ids,
            id_to_idx,
            neighbors,
            degrees,
            leaf_parent,
            hub_neighbor,
            has_leaf_child,
            mean_degree,
            positions,
            dragged: vec![false; nodes.len()],
            params,
            bounds,
            iteration: 0,
            rng,
            last_max_displacement: 0.0,
        })
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Progress fraction through the configured iteration budget, clamped to
    /// `[0, 1]`. Running past the budget holds progress at 1.
    pub fn progress(&self) -> f64 {
        let budget = self.params.iterations.max(1) as f64;
        (self.iteration as f64 / budget).min(1.0)
    }

    pub fn phase(&self) -> Phase {
        Phase::at(self.progress())
    }

    /// Annealing temperature: the per-frame displacement cap. Decays
    /// quadratically to zero; the cap, not convergence detection, is what
    /// guarantees the run settles.
    pub fn temperature(&self) -> f64 {
        let n = self.ids.len().max(1) as f64;
        let k = 0.5 * (self.bounds.area().max(1.0) / n).sqrt();
        let remaining = 1.0 - self.progress();
        k * remaining * remaining
    }

    /// Maximum per-node displacement applied during the most recent frame.
    pub fn last_max_displacement(&self) -> f64 {
        self.last_max_displacement
    }

    /// Mark or clear direct-manipulation state for a node. A dragged node
    /// receives no forces and is never displaced by collision resolution; it
    /// only imposes collisions on others. Unknown ids are ignored.
    pub fn set_dragged(&mut self, id: &str, dragged: bool) {
        if let Some(&idx) = self.id_to_idx.get(id) {
            self.dragged[idx] = dragged;
        }
    }

    /// Overwrite one node's position (the drag handler's write path).
    pub fn set_position(&mut self, id: &str, x: f64, y: f64) {
        if let Some(&idx) = self.id_to_idx.get(id) {
            self.positions[idx] = Position::at(x, y);
        }
    }

    pub fn positions(&self) -> BTreeMap<String, Point> {
        self.ids
            .iter()
            .zip(self.positions.iter())
            .map(|(id, p)| (id.clone(), p.point()))
            .collect()
    }

    /// Positions with velocities, suitable as the `previous` argument of a
    /// future simulation over the same topology.
    pub fn position_state(&self) -> BTreeMap<String, Position> {
        self.ids
            .iter()
            .zip(self.positions.iter())
            .map(|(id, p)| (id.clone(), *p))
            .collect()
    }

    /// Advance one frame: rebuild the spatial index, accumulate forces,
    /// integrate with the annealing cap, then resolve collisions.
    pub fn step(&mut self) {
        if self.ids.is_empty() {
            self.iteration += 1;
            return;
        }

        let profile = self.phase().profile();
        let temperature = self.temperature();
        let points: Vec<Point> = self.positions.iter().map(Position::point).collect();
        let grid = SpatialGrid::build(&points, self.params.repulsion_radius);

        let mut displacements: Vec<(f64, f64)> = vec![(0.0, 0.0); self.ids.len()];
        for i in 0..self.ids.len() {
            if self.dragged[i] {
                continue;
            }
            let (mut fx, mut fy) = self.spring_forces(i, &profile);
            let (rx, ry) = self.repulsion_forces(i, &grid, &points, &profile);
            fx += rx;
            fy += ry;
            let (gx, gy) = self.gravity_forces(i);
            fx += gx;
            fy += gy;
            displacements[i] = (fx, fy);
        }

        let mut max_displacement = 0.0_f64;
        for i in 0..self.ids.len() {
            if self.dragged[i] {
                continue;
            }
            let (mut dx, mut dy) = displacements[i];
            let magnitude = dx.hypot(dy);
            if magnitude > temperature && magnitude > 0.0 {
                let scale = temperature / magnitude;
                dx *= scale;
                dy *= scale;
            }
            dx *= self.params.damping;
            dy *= self.params.damping;
            self.positions[i].x += dx;
            self.positions[i].y += dy;
            self.positions[i].vx = dx;
            self.positions[i].vy = dy;
            max_displacement = max_displacement.max(dx.hypot(dy));
        }

        self.resolve_collisions(profile.leaf_collisions);

        self.last_max_displacement = max_displacement;
        self.iteration += 1;
        tracing::trace!(
            iteration = self.iteration,
            phase = ?self.phase(),
            temperature,
            max_displacement,
            "force frame"
        );
    }

    /// Drive [`Self::step`] for `frames` iterations.
    pub fn run(&mut self, frames: usize) {
        let timing = std::env::var("SIREN_FORCE_TIMING").ok().as_deref() == Some("1");
        let start = timing.then(std::time::Instant::now);
        for _ in 0..frames {
            self.step();
        }
        if let Some(s) = start {
            eprintln!(
                "[siren-force-timing] frames={} nodes={} total={:?}",
                frames,
                self.ids.len(),
                s.elapsed()
            );
        }
    }

    fn spring_forces(&self, i: usize, profile: &PhaseProfile) -> (f64, f64) {
        let pi = self.positions[i];
        let mut fx = 0.0;
        let mut fy = 0.0;

        // Hooke springs along each adjacency edge, classified per connection.
        for &j in &self.neighbors[i] {
            let pj = self.positions[j];
            let dx = pj.x - pi.x;
            let dy = pj.y - pi.y;
            let dist = dx.hypot(dy).max(MIN_DISTANCE);

            let leaf_conn = self.degrees[i] == 1 || self.degrees[j] == 1;
            let hub_conn = !leaf_conn && self.is_hub(i) && self.is_hub(j);
            let (rest, stiffness) = if leaf_conn {
                (
                    profile.leaf_rest_length,
                    self.params.leaf_spring_strength * profile.leaf_stiffness_mul,
                )
            } else if hub_conn {
                // "Pay-out" springs: long and very weak.
                (profile.hub_rest_length, self.params.hub_edge_strength)
            } else {
                (profile.normal_rest_length, self.params.attraction_strength)
            };

            let force = stiffness * (dist - rest);
            fx += force * dx / dist;
            fy += force * dy / dist;
        }

        // Secondary leaf-to-parent attraction, distance-proportional and
        // uncapped, so leaves visibly snap in by the final phase.
        if profile.leaf_attraction > 0.0 {
            if let Some(parent) = self.leaf_parent[i] {
                let pp = self.positions[parent];
                fx += profile.leaf_attraction * (pp.x - pi.x);
                fy += profile.leaf_attraction * (pp.y - pi.y);
            }
        }

        (fx, fy)
    }

    fn repulsion_forces(
        &mut self,
        i: usize,
        grid: &SpatialGrid,
        points: &[Point],
        profile: &PhaseProfile,
    ) -> (f64, f64) {
        let radius = self.params.repulsion_radius;
        let pi = points[i];
        let mut fx = 0.0;
        let mut fy = 0.0;

        for j in grid.query_radius(pi.x, pi.y, radius) {
            if j == i {
                continue;
            }
            let pj = points[j];
            let dx = pi.x - pj.x;
            let dy = pi.y - pj.y;
            let dist = dx.hypot(dy).max(MIN_DISTANCE);
            if dist > radius {
                continue;
            }
            // Siblings stay compact: nodes sharing a neighbor do not repel.
            if self.share_neighbor(i, j) {
                continue;
            }

            let mut force = profile.repulsion_scale * self.params.repulsion_strength / dist;

            // Deterministic per-pair jitter (±15%) keeps layouts from looking
            // perfectly symmetric.
            force *= 0.85 + 0.3 * pair_unit_hash(&self.ids[i], &self.ids[j]);

            if self.params.chaos > 0.0 {
                force *= 1.0 + self.params.chaos * 0.5 * self.rng.next_f64_signed();
            }

            let connected = self.neighbors[i].binary_search(&j).is_ok();
            if connected && (self.degrees[i] == 1 || self.degrees[j] == 1) {
                // Don't let repulsion fight the leaf-attraction springs.
                force *= 0.15;
            }

            let pair_mean = (self.degrees[i] + self.degrees[j]) as f64 / 2.0;
            let hub_pair = self.degrees[i] > 1 && self.degrees[j] > 1;
            if hub_pair && pair_mean > self.params.hub_degree_threshold * self.mean_degree.max(1.0)
            {
                force *= self.params.hub_repulsion_boost;
            }

            // Magnetic hub separation: two hubs that both own leaf halos push
            // each other harder as they approach the critical distance, so
            // their halos don't interleave.
            if hub_pair && self.has_leaf_child[i] && self.has_leaf_child[j] {
                let critical = radius * 0.6;
                if dist < critical {
                    force *= 1.0 + 2.0 * (1.0 - dist / critical);
                }
            }

            fx += force * dx / dist;
            fy += force * dy / dist;
        }

        (fx, fy)
    }

    fn gravity_forces(&self, i: usize) -> (f64, f64) {
        let pi = self.positions[i];
        let mut fx = 0.0;
        let mut fy = 0.0;

        if self.params.hub_gravity > 0.0 {
            if let Some(hub) = self.hub_neighbor[i] {
                let ph = self.positions[hub];
                fx += self.params.hub_gravity * (ph.x - pi.x);
                fy += self.params.hub_gravity * (ph.y - pi.y);
            }
        }

        if self.params.center_gravity > 0.0 {
            let center = self.bounds.center();
            fx += self.params.center_gravity * (center.x - pi.x);
            fy += self.params.center_gravity * (center.y - pi.y);
        }

        (fx, fy)
    }

    /// Hard minimum-separation constraint, applied after integration.
    ///
    /// Pairs involving a leaf are exempt until the spacing phase so the
    /// constraint doesn't fight leaf retraction. Dragged nodes impose
    /// collisions but never receive them.
    fn resolve_collisions(&mut self, include_leaves: bool) {
        let min_sep = self.params.node_radius * self.params.min_separation_factor;
        if min_sep <= 0.0 || self.ids.len() < 2 {
            return;
        }

        // A push can knock a node into a third party. Early phases take the
        // worst of it off with a few sweeps; once leaf pairs join in (phase 3
        // onward) the separation is a hard invariant of the completed frame,
        // so sweep until a pass corrects nothing. The cap only guards against
        // float ping-pong.
        let max_sweeps = if include_leaves {
            self.ids.len() * self.ids.len() + 8
        } else {
            3
        };
        for _ in 0..max_sweeps {
            if !self.collision_sweep(min_sep, include_leaves) {
                break;
            }
        }
    }

    /// One separation sweep; true when any overlap was corrected.
    ///
    /// The grid is a candidate generator built from the sweep's starting
    /// positions; overlap checks and pushes read the live positions, so a
    /// correction is visible to every later pair in the same sweep. A sweep
    /// that corrects nothing has verified every candidate pair at its final
    /// coordinates.
    fn collision_sweep(&mut self, min_sep: f64, include_leaves: bool) -> bool {
        let points: Vec<Point> = self.positions.iter().map(Position::point).collect();
        let grid = SpatialGrid::build(&points, min_sep);
        let mut moved = false;

        for i in 0..self.ids.len() {
            for j in grid.query_radius(points[i].x, points[i].y, min_sep) {
                if j <= i {
                    continue;
                }
                if self.dragged[i] && self.dragged[j] {
                    continue;
                }
                if !include_leaves && (self.degrees[i] == 1 || self.degrees[j] == 1) {
                    continue;
                }

                let dx = self.positions[j].x - self.positions[i].x;
                let dy = self.positions[j].y - self.positions[i].y;
                let dist = dx.hypot(dy);
                if dist >= min_sep {
                    continue;
                }

                let overlap = min_sep - dist;
                let (ux, uy) = if dist > MIN_DISTANCE {
                    (dx / dist, dy / dist)
                } else {
                    // Coincident centers: separate along a deterministic
                    // pair-specific direction instead of an arbitrary axis.
                    let angle = pair_unit_hash(&self.ids[i], &self.ids[j])
                        * std::f64::consts::TAU;
                    (angle.cos(), angle.sin())
                };

                match (self.dragged[i], self.dragged[j]) {
                    (false, false) => {
                        self.positions[i].x -= ux * overlap / 2.0;
                        self.positions[i].y -= uy * overlap / 2.0;
                        self.positions[j].x += ux * overlap / 2.0;
                        self.positions[j].y += uy * overlap / 2.0;
                    }
                    (true, false) => {
                        self.positions[j].x += ux * overlap;
                        self.positions[j].y += uy * overlap;
                    }
                    (false, true) => {
                        self.positions[i].x -= ux * overlap;
                        self.positions[i].y -= uy * overlap;
                    }
                    (true, true) => {}
                }
                moved = true;
            }
        }
        moved
    }

    fn is_hub(&self, i: usize) -> bool {
        self.degrees[i] as f64 > self.mean_degree && self.degrees[i] > 1
    }

    fn share_neighbor(&self, i: usize, j: usize) -> bool {
        let (a, b) = (&self.neighbors[i], &self.neighbors[j]);
        let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        small
            .iter()
            .any(|&n| n != i && n != j && large.binary_search(&n).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siren_graph::{Edge, Node};

    fn star(center: &str, leaves: &[&str]) -> (Vec<Node>, Vec<Edge>) {
        let mut nodes = vec![Node::new(center)];
        let mut edges = Vec::new();
        for l in leaves {
            nodes.push(Node::new(*l));
            edges.push(Edge::new(center, *l));
        }
        (nodes, edges)
    }

    #[test]
    fn missing_previous_position_is_an_error() {
        let (nodes, edges) = star("hub", &["a", "b"]);
        let mut prev: BTreeMap<String, Position> = BTreeMap::new();
        prev.insert("hub".to_string(), Position::at(0.0, 0.0));
        prev.insert("a".to_string(), Position::at(1.0, 0.0));
        let err = ForceSimulation::new(
            &nodes,
            &edges,
            PhysicsParams::default(),
            Bounds::default(),
            Some(&prev),
        )
        .expect_err("must reject incomplete position map");
        match err {
            Error::MissingPosition { node_id } => assert_eq!(node_id, "b"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn extra_previous_positions_are_ignored() {
        let (nodes, edges) = star("hub", &["a"]);
        let mut prev: BTreeMap<String, Position> = BTreeMap::new();
        prev.insert("hub".to_string(), Position::at(0.0, 0.0));
        prev.insert("a".to_string(), Position::at(1.0, 0.0));
        prev.insert("stale".to_string(), Position::at(9.0, 9.0));
        let sim = ForceSimulation::new(
            &nodes,
            &edges,
            PhysicsParams::default(),
            Bounds::default(),
            Some(&prev),
        )
        .expect("superset maps are fine");
        assert_eq!(sim.node_count(), 2);
        assert!(!sim.positions().contains_key("stale"));
    }

    #[test]
    fn dragged_nodes_do_not_move() {
        let (nodes, edges) = star("hub", &["a", "b", "c"]);
        let mut sim = ForceSimulation::new(
            &nodes,
            &edges,
            PhysicsParams::default(),
            Bounds::default(),
            None,
        )
        .expect("sim");
        sim.set_dragged("hub", true);
        sim.set_position("hub", 400.0, 300.0);
        sim.run(50);
        let pos = sim.positions();
        assert_eq!(pos["hub"], Point::new(400.0, 300.0));
    }

    #[test]
    fn empty_graph_steps_are_noops() {
        let mut sim = ForceSimulation::new(
            &[],
            &[],
            PhysicsParams::default(),
            Bounds::default(),
            None,
        )
        .expect("sim");
        sim.run(10);
        assert!(sim.positions().is_empty());
        assert_eq!(sim.iteration(), 10);
    }

    #[test]
    fn phase_follows_iteration_progress() {
        let (nodes, edges) = star("hub", &["a"]);
        let params = PhysicsParams {
            iterations: 100,
            ..Default::default()
        };
        let mut sim =
            ForceSimulation::new(&nodes, &edges, params, Bounds::default(), None).expect("sim");
        assert_eq!(sim.phase(), Phase::Explosion);
        sim.run(25);
        assert_eq!(sim.phase(), Phase::Retraction);
        sim.run(50);
        assert_eq!(sim.phase(), Phase::Snap);
    }
}
