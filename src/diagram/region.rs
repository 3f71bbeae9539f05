//! Region extraction: edge reordering and clipping to the plot bounds
//!
//! # Algorithm
//!
//! 1. Chain a site's edges into one connected sequence by matching shared
//!    endpoints, recording which end of each edge leads.
//! 2. Walk the chain emitting clipped endpoints. Where two consecutive
//!    endpoints do not coincide the boundary left the rectangle, so the
//!    gap is closed by walking the rectangle perimeter between them and
//!    inserting every corner passed. The chain is first turned so the site
//!    lies on the left of each segment, which fixes the walking direction.
//! 3. Normalise to positive signed area.

use glam::Vec2;

use crate::geometry::{bounds_check, close_enough, winding, Rect, Winding, EPSILON};

use super::edge::{Edge, EdgeId, Side};

/// Chain `edges` end to end using `ends` as the connectivity criterion
///
/// `ends` yields an edge's `(left, right)` endpoint keys, or `None` when an
/// endpoint is the vertex at infinity, which aborts with an empty chain.
/// Absent vertices compare equal, so unbounded ends chain through infinity.
pub(crate) fn reorder_edges<K, F>(edges: &[EdgeId], ends: F) -> Vec<(EdgeId, Side)>
where
    K: PartialEq + Copy,
    F: Fn(EdgeId) -> Option<(K, K)>,
{
    let Some(&first) = edges.first() else {
        return Vec::new();
    };
    let Some((mut first_point, mut last_point)) = ends(first) else {
        return Vec::new();
    };

    let n = edges.len();
    let mut done = vec![false; n];
    done[0] = true;
    let mut n_done = 1;
    let mut ordered = std::collections::VecDeque::with_capacity(n);
    ordered.push_back((first, Side::Left));

    while n_done < n {
        let before = n_done;
        for i in 1..n {
            if done[i] {
                continue;
            }
            let edge = edges[i];
            let Some((left_point, right_point)) = ends(edge) else {
                return Vec::new();
            };

            if left_point == last_point {
                last_point = right_point;
                ordered.push_back((edge, Side::Left));
            } else if right_point == first_point {
                first_point = left_point;
                ordered.push_front((edge, Side::Left));
            } else if left_point == first_point {
                first_point = right_point;
                ordered.push_front((edge, Side::Right));
            } else if right_point == last_point {
                last_point = left_point;
                ordered.push_back((edge, Side::Right));
            } else {
                continue;
            }
            done[i] = true;
            n_done += 1;
        }

        if n_done == before {
            log::warn!(
                "edge chain broken after {} of {} edges; treating region as unbounded",
                n_done,
                n
            );
            return Vec::new();
        }
    }

    ordered.into_iter().collect()
}

/// Clip an ordered edge chain to `bounds` as a closed polygon
///
/// Returns an empty list when no edge of the chain is visible.
pub(crate) fn clip_to_bounds(
    site: Vec2,
    ordered: &[(EdgeId, Side)],
    edges: &[Edge],
    bounds: &Rect,
) -> Vec<Vec2> {
    let mut visible: Vec<(Vec2, Vec2, bool)> = ordered
        .iter()
        .filter_map(|&(id, side)| {
            let edge = &edges[id.0];
            let unanchored = edge.left_vertex.is_none() && edge.right_vertex.is_none();
            Some((edge.clipped_end(side)?, edge.clipped_end(side.other())?, unanchored))
        })
        .collect();

    if visible.is_empty() {
        return Vec::new();
    }

    // Walk the chain so the site stays on the left of every segment
    if rotation_sense(site, &visible) < 0.0 {
        visible.reverse();
        for (a, b, _) in visible.iter_mut() {
            std::mem::swap(a, b);
        }
    }
    // Full bisector lines share no vertex with their neighbours, so the
    // chain order says nothing about their direction
    for (a, b, unanchored) in visible.iter_mut() {
        if *unanchored && (*a - site).perp_dot(*b - site) < 0.0 {
            std::mem::swap(a, b);
        }
    }

    let (start, end, _) = visible[0];
    let mut points = vec![start, end];
    for &(a, b, _) in &visible[1..] {
        connect(&mut points, (a, b), bounds, false);
    }
    connect(&mut points, (start, end), bounds, true);

    if winding(&points) == Winding::Clockwise {
        points.reverse();
    }
    points
}

/// Sum of the turns the chain makes around its site
fn rotation_sense(site: Vec2, visible: &[(Vec2, Vec2, bool)]) -> f32 {
    visible
        .iter()
        .map(|&(a, b, _)| (a - site).perp_dot(b - site))
        .sum()
}

fn connect(points: &mut Vec<Vec2>, (new_point, new_right): (Vec2, Vec2), bounds: &Rect, closing_up: bool) {
    let Some(&right_point) = points.last() else {
        return;
    };

    if !close_enough(right_point, new_point) {
        stitch_corners(points, right_point, new_point, bounds);
        if closing_up {
            return;
        }
        points.push(new_point);
    }

    if !close_enough(points[0], new_right) {
        points.push(new_right);
    }
}

/// Position along the rectangle perimeter, clockwise on screen from the
/// top-left corner; `None` for points off the boundary
fn perimeter_position(p: Vec2, bounds: &Rect) -> Option<f32> {
    let check = bounds_check::check(p, bounds);
    let (w, h) = (bounds.width, bounds.height);
    let t = if check & bounds_check::TOP != 0 {
        p.x - bounds.left()
    } else if check & bounds_check::RIGHT != 0 {
        w + (p.y - bounds.top())
    } else if check & bounds_check::BOTTOM != 0 {
        w + h + (bounds.right() - p.x)
    } else if check & bounds_check::LEFT != 0 {
        2.0 * w + h + (bounds.bottom() - p.y)
    } else {
        return None;
    };
    Some(t.clamp(0.0, 2.0 * (w + h)))
}

/// Insert the rectangle corners met when walking clockwise on screen from
/// `from` to `to`
fn stitch_corners(points: &mut Vec<Vec2>, from: Vec2, to: Vec2, bounds: &Rect) {
    let (Some(t_from), Some(t_to)) = (perimeter_position(from, bounds), perimeter_position(to, bounds)) else {
        return;
    };
    let perimeter = 2.0 * (bounds.width + bounds.height);
    let distance = |t: f32| (t - t_from).rem_euclid(perimeter);
    let span = distance(t_to);

    let (w, h) = (bounds.width, bounds.height);
    let corners = [
        (0.0, Vec2::new(bounds.left(), bounds.top())),
        (w, Vec2::new(bounds.right(), bounds.top())),
        (w + h, Vec2::new(bounds.right(), bounds.bottom())),
        (2.0 * w + h, Vec2::new(bounds.left(), bounds.bottom())),
    ];

    let mut passed: Vec<(f32, Vec2)> = corners
        .iter()
        .map(|&(t, corner)| (distance(t), corner))
        .filter(|&(d, _)| d > EPSILON && d < span - EPSILON)
        .collect();
    passed.sort_by(|a, b| a.0.total_cmp(&b.0));
    points.extend(passed.into_iter().map(|(_, corner)| corner));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::site::SiteId;
    use crate::geometry::signed_double_area;

    fn clipped_edge(left: Vec2, right: Vec2) -> Edge {
        let mut edge = Edge::bisect(0, SiteId(0), Vec2::ZERO, SiteId(1), Vec2::X);
        edge.clipped = Some([left, right]);
        edge
    }

    #[test]
    fn test_reorder_chains_by_shared_ends() {
        let edges = [EdgeId(0), EdgeId(1), EdgeId(2)];
        // 0: a-b, 1: c-b, 2: c-a
        let ends = |id: EdgeId| match id.0 {
            0 => Some(('a', 'b')),
            1 => Some(('c', 'b')),
            _ => Some(('c', 'a')),
        };
        let ordered = reorder_edges(&edges, ends);
        assert_eq!(ordered.len(), 3);
        assert_eq!(ordered[0], (EdgeId(0), Side::Left));
        assert_eq!(ordered[1], (EdgeId(1), Side::Right));
        assert_eq!(ordered[2], (EdgeId(2), Side::Left));
    }

    #[test]
    fn test_reorder_aborts_at_infinity() {
        let edges = [EdgeId(0), EdgeId(1)];
        let ends = |id: EdgeId| if id.0 == 0 { Some((1, 2)) } else { None };
        assert!(reorder_edges(&edges, ends).is_empty());
    }

    #[test]
    fn test_reorder_gives_up_on_disconnected_edges() {
        let edges = [EdgeId(0), EdgeId(1)];
        let ends = |id: EdgeId| if id.0 == 0 { Some((1, 2)) } else { Some((3, 4)) };
        assert!(reorder_edges(&edges, ends).is_empty());
    }

    #[test]
    fn test_clip_half_plane_takes_far_corners() {
        let bounds = Rect::from_size(100.0, 100.0);
        let edges = vec![clipped_edge(Vec2::new(50.0, 0.0), Vec2::new(50.0, 100.0))];
        let ordered = [(EdgeId(0), Side::Left)];

        let left = clip_to_bounds(Vec2::new(25.0, 50.0), &ordered, &edges, &bounds);
        assert_eq!(left.len(), 4);
        assert!(left.contains(&Vec2::new(0.0, 0.0)));
        assert!(left.contains(&Vec2::new(0.0, 100.0)));
        assert!((signed_double_area(&left) - 10_000.0).abs() < 1e-2);

        let right = clip_to_bounds(Vec2::new(75.0, 50.0), &ordered, &edges, &bounds);
        assert!(right.contains(&Vec2::new(100.0, 0.0)));
        assert!(right.contains(&Vec2::new(100.0, 100.0)));
        assert!(signed_double_area(&right) > 0.0);
    }

    #[test]
    fn test_clip_large_region_walks_three_corners() {
        // A corner cut off the top-left; the site owns the rest
        let bounds = Rect::from_size(100.0, 100.0);
        let edges = vec![clipped_edge(Vec2::new(0.0, 10.0), Vec2::new(10.0, 0.0))];
        let ordered = [(EdgeId(0), Side::Left)];

        let region = clip_to_bounds(Vec2::new(60.0, 60.0), &ordered, &edges, &bounds);
        assert_eq!(region.len(), 5);
        for corner in [Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0), Vec2::new(0.0, 100.0)] {
            assert!(region.contains(&corner));
        }
        assert!(!region.contains(&Vec2::new(0.0, 0.0)));
        assert!((signed_double_area(&region) - 2.0 * (10_000.0 - 50.0)).abs() < 1e-1);
    }

    #[test]
    fn test_clip_between_parallel_lines_is_a_strip() {
        let bounds = Rect::from_size(100.0, 100.0);
        let edges = vec![
            clipped_edge(Vec2::new(35.0, 0.0), Vec2::new(35.0, 100.0)),
            clipped_edge(Vec2::new(65.0, 0.0), Vec2::new(65.0, 100.0)),
        ];
        let ordered = [(EdgeId(0), Side::Left), (EdgeId(1), Side::Left)];

        let strip = clip_to_bounds(Vec2::new(50.0, 50.0), &ordered, &edges, &bounds);
        assert_eq!(strip.len(), 4);
        assert!(strip.iter().all(|p| p.x == 35.0 || p.x == 65.0));
        assert_eq!(winding(&strip), Winding::CounterClockwise);
        assert!((signed_double_area(&strip) - 6_000.0).abs() < 1e-2);
    }

    #[test]
    fn test_clip_without_visible_edges_is_empty() {
        let bounds = Rect::from_size(10.0, 10.0);
        let edge = Edge::bisect(0, SiteId(0), Vec2::ZERO, SiteId(1), Vec2::X);
        let ordered = [(EdgeId(0), Side::Left)];
        assert!(clip_to_bounds(Vec2::ONE, &ordered, &[edge], &bounds).is_empty());
    }
}
