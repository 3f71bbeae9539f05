//! Voronoi vertices and bisector intersection

use std::cmp::Ordering;

use glam::Vec2;

use crate::geometry::compare_y_then_x;

use super::edge::{Edge, Side};
use super::halfedge::{EdgeSlot, Halfedge};
use super::site::Site;

/// Bisector determinants below this are treated as parallel
const PARALLEL_DETERMINANT: f32 = 1e-10;

/// Handle of a vertex within one diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// A point where bisectors meet
///
/// Vertices are created speculatively for circle events; only those that
/// an event actually resolves get an index ("frozen").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub(crate) coord: Vec2,
    pub(crate) index: Option<usize>,
}

impl Vertex {
    pub(crate) fn new(coord: Vec2) -> Self {
        Self { coord, index: None }
    }

    pub fn coord(&self) -> Vec2 {
        self.coord
    }

    /// Permanent index, assigned when the vertex is frozen
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_frozen(&self) -> bool {
        self.index.is_some()
    }

    /// Non-finite coordinates stand for the vertex at infinity
    pub fn is_at_infinity(&self) -> bool {
        !self.coord.is_finite()
    }
}

/// Where the bisectors of two beach-line half-edges cross, if they do
/// on the side both half-edges face
///
/// Boundary markers, a shared right site, parallel bisectors and
/// non-finite results all yield `None`.
pub(crate) fn intersect(
    he0: &Halfedge,
    he1: &Halfedge,
    edges: &[Edge],
    sites: &[Site],
) -> Option<Vec2> {
    let (EdgeSlot::Live(id0), EdgeSlot::Live(id1)) = (he0.edge, he1.edge) else {
        return None;
    };
    let edge0 = &edges[id0.0];
    let edge1 = &edges[id1.0];
    if edge0.right_site == edge1.right_site {
        return None;
    }

    let determinant = edge0.a * edge1.b - edge0.b * edge1.a;
    if determinant.abs() < PARALLEL_DETERMINANT {
        return None;
    }

    let x = (edge0.c * edge1.b - edge1.c * edge0.b) / determinant;
    let y = (edge1.c * edge0.a - edge0.c * edge1.a) / determinant;

    let right0 = sites[edge0.right_site.0].coord;
    let right1 = sites[edge1.right_site.0].coord;
    let (halfedge, right) = if compare_y_then_x(right0, right1) == Ordering::Less {
        (he0, right0)
    } else {
        (he1, right1)
    };

    let right_of_site = x >= right.x;
    if (right_of_site && halfedge.side == Some(Side::Left))
        || (!right_of_site && halfedge.side == Some(Side::Right))
    {
        return None;
    }

    let p = Vec2::new(x, y);
    p.is_finite().then_some(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::edge::EdgeId;
    use crate::diagram::site::SiteId;

    fn sites(coords: &[(f32, f32)]) -> Vec<Site> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Site::new(Vec2::new(x, y), Vec2::new(x, y), None, i, 0.0))
            .collect()
    }

    #[test]
    fn test_vertex_freezing() {
        let mut v = Vertex::new(Vec2::new(1.0, 2.0));
        assert!(!v.is_frozen());
        v.index = Some(3);
        assert_eq!(v.index(), Some(3));
        assert!(!v.is_at_infinity());
        assert!(Vertex::new(Vec2::new(f32::NAN, 0.0)).is_at_infinity());
    }

    #[test]
    fn test_intersect_circumcenter() {
        // Right triangle; circumcenter at the hypotenuse midpoint
        let sites = sites(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        let edges = vec![
            Edge::bisect(0, SiteId(0), sites[0].coord, SiteId(1), sites[1].coord),
            Edge::bisect(1, SiteId(0), sites[0].coord, SiteId(2), sites[2].coord),
        ];
        let he0 = Halfedge::new(EdgeSlot::Live(EdgeId(0)), Some(Side::Left));
        let he1 = Halfedge::new(EdgeSlot::Live(EdgeId(1)), Some(Side::Left));

        let p = intersect(&he0, &he1, &edges, &sites).unwrap();
        assert!((p - Vec2::new(5.0, 5.0)).length() < 1e-3);

        // Facing away from the crossing: x = 5 lies left of site (10, 0)
        let he0 = Halfedge::new(EdgeSlot::Live(EdgeId(0)), Some(Side::Right));
        assert!(intersect(&he0, &he1, &edges, &sites).is_none());
    }

    #[test]
    fn test_parallel_bisectors_do_not_intersect() {
        let sites = sites(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let edges = vec![
            Edge::bisect(0, SiteId(0), sites[0].coord, SiteId(1), sites[1].coord),
            Edge::bisect(1, SiteId(1), sites[1].coord, SiteId(2), sites[2].coord),
        ];
        let he0 = Halfedge::new(EdgeSlot::Live(EdgeId(0)), Some(Side::Left));
        let he1 = Halfedge::new(EdgeSlot::Live(EdgeId(1)), Some(Side::Left));
        assert!(intersect(&he0, &he1, &edges, &sites).is_none());
    }

    #[test]
    fn test_boundary_markers_do_not_intersect() {
        let sites = sites(&[(0.0, 0.0), (10.0, 5.0)]);
        let edges = vec![Edge::bisect(0, SiteId(0), sites[0].coord, SiteId(1), sites[1].coord)];
        let dummy = Halfedge::new(EdgeSlot::Dummy, None);
        let live = Halfedge::new(EdgeSlot::Live(EdgeId(0)), Some(Side::Left));
        assert!(intersect(&dummy, &live, &edges, &sites).is_none());
    }
}
