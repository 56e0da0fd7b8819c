//! The grid query, filtered by exact distance, must match a brute-force scan.

use siren_graph::Point;
use siren_layout::SpatialGrid;
use siren_layout::rng::XorShift64Star;

fn scatter(count: usize, seed: u64) -> Vec<Point> {
    let mut rng = XorShift64Star::new(seed);
    (0..count)
        .map(|_| Point::new(rng.next_f64_unit() * 2000.0, rng.next_f64_unit() * 1500.0))
        .collect()
}

#[test]
fn filtered_query_equals_brute_force_scan() {
    let points = scatter(500, 7);
    let radius = 120.0;
    let grid = SpatialGrid::build(&points, radius);

    let mut rng = XorShift64Star::new(99);
    for _ in 0..50 {
        let qx = rng.next_f64_unit() * 2000.0;
        let qy = rng.next_f64_unit() * 1500.0;
        let origin = Point::new(qx, qy);

        let mut filtered: Vec<usize> = grid
            .query_radius(qx, qy, radius)
            .into_iter()
            .filter(|&i| points[i].distance_to(&origin) <= radius)
            .collect();
        filtered.sort_unstable();

        let brute: Vec<usize> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.distance_to(&origin) <= radius)
            .map(|(i, _)| i)
            .collect();

        assert_eq!(filtered, brute, "mismatch at ({qx}, {qy})");
    }
}

#[test]
fn raw_query_is_a_superset_of_the_true_matches() {
    let points = scatter(500, 13);
    let radius = 200.0;
    let grid = SpatialGrid::build(&points, radius);

    let origin = Point::new(1000.0, 750.0);
    let raw: std::collections::BTreeSet<usize> =
        grid.query_radius(origin.x, origin.y, radius).into_iter().collect();
    for (i, p) in points.iter().enumerate() {
        if p.distance_to(&origin) <= radius {
            assert!(raw.contains(&i), "true match {i} missing from superset");
        }
    }
}

#[test]
fn small_cells_and_large_radius_still_agree() {
    let points = scatter(300, 21);
    let grid = SpatialGrid::build(&points, 25.0);
    let radius = 400.0;
    let origin = Point::new(500.0, 500.0);

    let mut filtered: Vec<usize> = grid
        .query_radius(origin.x, origin.y, radius)
        .into_iter()
        .filter(|&i| points[i].distance_to(&origin) <= radius)
        .collect();
    filtered.sort_unstable();

    let brute: Vec<usize> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.distance_to(&origin) <= radius)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(filtered, brute);
}
