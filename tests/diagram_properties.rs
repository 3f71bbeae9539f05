//! Whole-diagram properties over seeded random inputs

use approx::assert_abs_diff_eq;
use voronoi_map::geometry::{signed_double_area, winding, Winding};
use voronoi_map::*;

fn random_diagram(count: usize, bounds: Rect, seed: u64) -> Diagram {
    Diagram::build(&generate_random_points(count, bounds, seed), bounds).unwrap()
}

fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

fn points(coords: &[(f32, f32)]) -> Vec<SitePoint> {
    coords.iter().map(|&(x, y)| SitePoint::new(x, y)).collect()
}

/// Whether two non-adjacent polygon sides cross at an interior point
fn crosses(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let side = |p: Vec2, q: Vec2, r: Vec2| (q - p).perp_dot(r - p);
    let tol = 1e-3;
    let (d1, d2) = (side(a, b, c), side(a, b, d));
    let (d3, d4) = (side(c, d, a), side(c, d, b));
    ((d1 > tol && d2 < -tol) || (d1 < -tol && d2 > tol)) && ((d3 > tol && d4 < -tol) || (d3 < -tol && d4 > tol))
}

fn is_simple(region: &[Vec2]) -> bool {
    let n = region.len();
    for i in 0..n {
        for j in i + 2..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (a, b) = (region[i], region[(i + 1) % n]);
            let (c, d) = (region[j], region[(j + 1) % n]);
            if crosses(a, b, c, d) {
                return false;
            }
        }
    }
    true
}

/// Every region is a simple counter-clockwise polygon and together they
/// cover the bounds exactly once
fn assert_tiles(diagram: &Diagram, label: &str) {
    let bounds = diagram.bounds();
    let mut total = 0.0;
    for (i, region) in diagram.regions().into_iter().enumerate() {
        assert!(region.len() >= 3, "{} site {}: {:?}", label, i, region);
        assert_eq!(winding(region), Winding::CounterClockwise, "{} site {}", label, i);
        assert!(is_simple(region), "{} site {}: {:?}", label, i, region);
        total += signed_double_area(region) * 0.5;
    }
    let area = bounds.width * bounds.height;
    assert!((total - area).abs() < area * 1e-3, "{}: {} vs {}", label, total, area);
}

#[test]
fn every_site_gets_a_counter_clockwise_region() {
    init_logging();
    let bounds = Rect::new(-50.0, 20.0, 600.0, 400.0);

    for seed in [1, 2, 3] {
        let points = generate_random_points(120, bounds, seed);
        let diagram = Diagram::build(&points, bounds).unwrap();
        assert_eq!(diagram.site_count(), points.len());

        let mut total = 0.0;
        for region in diagram.regions() {
            assert!(region.len() >= 3);
            assert_eq!(winding(region), Winding::CounterClockwise);
            for p in region {
                assert!(p.x >= bounds.left() - EPSILON && p.x <= bounds.right() + EPSILON);
                assert!(p.y >= bounds.top() - EPSILON && p.y <= bounds.bottom() + EPSILON);
            }
            total += signed_double_area(region) * 0.5;
        }
        // Regions tile the rectangle
        let area = bounds.width * bounds.height;
        assert!((total - area).abs() < area * 1e-3, "seed {}: {} vs {}", seed, total, area);
    }
}

#[test]
fn collinear_sites_split_the_rectangle_into_strips() {
    init_logging();
    let bounds = Rect::from_size(100.0, 100.0);
    let diagram = Diagram::build(&points(&[(20.0, 50.0), (50.0, 50.0), (80.0, 50.0)]), bounds).unwrap();
    assert_tiles(&diagram, "three in a row");

    let middle = diagram.site_at(Vec2::new(50.0, 50.0)).unwrap();
    let strip = diagram.region(middle).unwrap();
    assert_eq!(strip.len(), 4);
    for p in strip {
        assert!((p.x - 35.0).abs() < 1e-3 || (p.x - 65.0).abs() < 1e-3, "{:?}", p);
    }
    assert_abs_diff_eq!(signed_double_area(strip), 6_000.0, epsilon = 1e-1);
}

#[test]
fn collinear_rows_columns_and_diagonals_tile_the_bounds() {
    let bounds = Rect::from_size(100.0, 100.0);
    let xs = [10.0, 25.0, 40.0, 55.0, 70.0, 85.0];

    let row: Vec<(f32, f32)> = xs.iter().map(|&x| (x, 50.0)).collect();
    let column: Vec<(f32, f32)> = xs.iter().map(|&y| (50.0, y)).collect();
    let diagonal: Vec<(f32, f32)> = xs.iter().map(|&x| (x, x * 0.5 + 20.0)).collect();

    for (label, coords) in [("row", row), ("column", column), ("diagonal", diagonal)] {
        let diagram = Diagram::build(&points(&coords), bounds).unwrap();
        assert_eq!(diagram.site_count(), 6);
        assert_tiles(&diagram, label);
    }
}

#[test]
fn lattice_sites_tile_the_bounds() {
    let bounds = Rect::from_size(100.0, 100.0);
    let mut coords = Vec::new();
    for row in 0..5 {
        for col in 0..5 {
            coords.push((10.0 + col as f32 * 20.0, 10.0 + row as f32 * 20.0));
        }
    }
    let diagram = Diagram::build(&points(&coords), bounds).unwrap();
    assert_eq!(diagram.site_count(), 25);
    assert_tiles(&diagram, "lattice");
}

#[test]
fn random_regions_are_simple() {
    let bounds = Rect::from_size(300.0, 300.0);
    for seed in [11, 12] {
        assert_tiles(&random_diagram(80, bounds, seed), "random");
    }
}

#[test]
fn internal_edge_vertices_are_equidistant_from_both_sites() {
    let bounds = Rect::from_size(500.0, 500.0);
    let diagram = random_diagram(150, bounds, 99);

    let mut checked = 0;
    for edge in diagram.edges() {
        let (Some(l), Some(r)) = (edge.vertex(Side::Left), edge.vertex(Side::Right)) else {
            continue;
        };
        let left = diagram.site(edge.left_site()).unwrap().coord();
        let right = diagram.site(edge.right_site()).unwrap().coord();
        for v in [l, r] {
            let p = diagram.vertex_coord(v).unwrap();
            if !bounds.contains(p) {
                continue;
            }
            let dl = p.distance(left);
            let dr = p.distance(right);
            assert!((dl - dr).abs() <= 1e-2 * dl.max(1.0), "{:?}: {} vs {}", p, dl, dr);
            checked += 1;
        }
    }
    assert!(checked > 100);
}

#[test]
fn regions_are_stable_across_calls_and_rebuilds() {
    let bounds = Rect::from_size(300.0, 200.0);
    let points = generate_random_points(60, bounds, 5);
    let a = Diagram::build(&points, bounds).unwrap();
    let b = Diagram::build(&points, bounds).unwrap();

    for i in 0..a.site_count() {
        let first = a.region(SiteId(i)).unwrap().to_vec();
        let again = a.region(SiteId(i)).unwrap().to_vec();
        assert_eq!(first, again);
        assert_eq!(first, b.region(SiteId(i)).unwrap().to_vec());
    }
}

#[test]
fn relaxation_keeps_count_and_bounds() {
    init_logging();
    let bounds = Rect::new(10.0, 10.0, 400.0, 250.0);
    let diagram = random_diagram(90, bounds, 17);

    for k in [0, 1, 3] {
        let relaxed = lloyd_relaxation(&diagram, k).unwrap();
        assert_eq!(relaxed.site_count(), diagram.site_count(), "k = {}", k);
        assert_eq!(relaxed.bounds(), bounds);
        for p in relaxed.site_coords() {
            assert!(p.x >= bounds.left() - EPSILON && p.x <= bounds.right() + EPSILON);
            assert!(p.y >= bounds.top() - EPSILON && p.y <= bounds.bottom() + EPSILON);
        }
    }
}

#[test]
fn relaxation_evens_out_cell_sizes() {
    let bounds = Rect::from_size(400.0, 400.0);
    let diagram = random_diagram(100, bounds, 23);
    let relaxed = lloyd_relaxation(&diagram, 5).unwrap();

    let spread = |d: &Diagram| {
        let areas: Vec<f32> = d.regions().iter().map(|r| signed_double_area(r)).collect();
        let max = areas.iter().cloned().fold(f32::MIN, f32::max);
        let min = areas.iter().cloned().fold(f32::MAX, f32::min);
        max / min
    };
    assert!(spread(&relaxed) < spread(&diagram));
}

#[test]
fn point_in_unit_square_region() {
    let bounds = Rect::from_size(2.0, 1.0);
    let diagram = Diagram::build(&[SitePoint::new(0.5, 0.5), SitePoint::new(1.5, 0.5)], bounds).unwrap();
    let square = diagram.site_at(Vec2::new(0.5, 0.5)).unwrap();

    let region = diagram.region(square).unwrap();
    assert_abs_diff_eq!(signed_double_area(region), 2.0, epsilon = 1e-3);

    assert_eq!(diagram.find_site_containing(Vec2::new(0.5, 0.5)), Some(square));
    assert_ne!(diagram.find_site_containing(Vec2::new(1.5, 1.5)), Some(square));
    assert_ne!(diagram.find_site_containing(Vec2::new(1.5, 0.5)), Some(square));
}

#[test]
fn scaling_there_and_back_restores_sites() {
    let b1 = Rect::from_size(400.0, 300.0);
    let b2 = Rect::new(50.0, 20.0, 800.0, 900.0);
    let diagram = random_diagram(80, b1, 31);

    let there = diagram.scale(b2).unwrap();
    assert_eq!(there.bounds(), b2);
    let back = there.scale(b1).unwrap();

    let original = diagram.site_coords();
    let restored = back.site_coords();
    assert_eq!(original.len(), restored.len());
    // Sort order may differ for near-equal rows, so match by position
    for a in &original {
        let nearest = restored
            .iter()
            .map(|b| a.distance(*b))
            .fold(f32::MAX, f32::min);
        assert!(nearest < 1e-2, "{:?} drifted by {}", a, nearest);
    }
}

#[test]
fn single_point_owns_the_whole_rectangle() {
    let bounds = Rect::new(5.0, 5.0, 120.0, 80.0);
    let diagram = Diagram::build(&[SitePoint::new(40.0, 60.0)], bounds).unwrap();

    assert_eq!(diagram.site_count(), 1);
    let region = diagram.region(SiteId(0)).unwrap();
    assert_eq!(region.len(), 4);
    for corner in bounds.corners() {
        assert!(region.iter().any(|p| p.distance(corner) < EPSILON));
    }
}

#[test]
fn dual_graph_matches_diagram_adjacency() {
    let bounds = Rect::from_size(300.0, 300.0);
    let diagram = random_diagram(70, bounds, 8);
    let graph = MapGraph::build(&diagram, None);

    assert_eq!(graph.site_count(), diagram.site_count());
    for i in 0..graph.site_count() {
        let id = SiteId(i);
        let mut expected = diagram.neighbor_sites(id).unwrap();
        let mut actual = graph.neighbors(id).unwrap().to_vec();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);

        // Neighbourhood is symmetric
        for n in graph.neighbors(id).unwrap() {
            assert!(graph.neighbors(*n).unwrap().contains(&id));
        }
    }
}

#[cfg(feature = "serde")]
#[test]
fn config_and_geometry_serialize() {
    let config = MapConfigBuilder::new().seed(3).build().unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let restored: MapConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, restored);

    let state = SiteState::WALL | SiteState::PATH;
    let json = serde_json::to_string(&state).unwrap();
    assert_eq!(serde_json::from_str::<SiteState>(&json).unwrap(), state);
}
