//! Bisecting edges and their clipping against the plot bounds

use glam::Vec2;

use crate::geometry::{LineSegment, Rect};

use super::site::{Site, SiteId};
use super::vertex::{Vertex, VertexId};

/// Handle of an edge within one diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// Which end of an edge (or which side of a half-edge) is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// The perpendicular bisector of two sites, `a*x + b*y = c`
///
/// One of `a`, `b` is exactly 1. A missing vertex means the edge runs to
/// infinity on that side. `clipped` holds the visible `[left, right]` ends
/// after clipping; `None` means the edge lies outside the bounds.
#[derive(Debug, Clone)]
pub struct Edge {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub(crate) index: usize,
    pub(crate) left_site: SiteId,
    pub(crate) right_site: SiteId,
    pub(crate) left_vertex: Option<VertexId>,
    pub(crate) right_vertex: Option<VertexId>,
    pub(crate) clipped: Option<[Vec2; 2]>,
}

impl Edge {
    /// Bisector between `s0` (left) and `s1` (right)
    pub(crate) fn bisect(index: usize, id0: SiteId, s0: Vec2, id1: SiteId, s1: Vec2) -> Self {
        let dx = s1.x - s0.x;
        let dy = s1.y - s0.y;
        let mut c = s0.x * dx + s0.y * dy + (dx * dx + dy * dy) * 0.5;
        let (a, b) = if dx.abs() > dy.abs() {
            c /= dx;
            (1.0, dy / dx)
        } else {
            c /= dy;
            (dx / dy, 1.0)
        };

        Self {
            a,
            b,
            c,
            index,
            left_site: id0,
            right_site: id1,
            left_vertex: None,
            right_vertex: None,
            clipped: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the line is solved for `x` (`a == 1`); a diagonal bisector
    /// normalised by `dy` can land here as well
    pub(crate) fn x_normalized(&self) -> bool {
        self.a == 1.0
    }

    pub fn site(&self, side: Side) -> SiteId {
        match side {
            Side::Left => self.left_site,
            Side::Right => self.right_site,
        }
    }

    pub fn left_site(&self) -> SiteId {
        self.left_site
    }

    pub fn right_site(&self) -> SiteId {
        self.right_site
    }

    pub fn vertex(&self, side: Side) -> Option<VertexId> {
        match side {
            Side::Left => self.left_vertex,
            Side::Right => self.right_vertex,
        }
    }

    pub(crate) fn set_vertex(&mut self, side: Side, vertex: VertexId) {
        match side {
            Side::Left => self.left_vertex = Some(vertex),
            Side::Right => self.right_vertex = Some(vertex),
        }
    }

    /// The site across this edge from `site`
    pub fn other_site(&self, site: SiteId) -> SiteId {
        if self.left_site == site {
            self.right_site
        } else {
            self.left_site
        }
    }

    /// Edges with an unbounded end separate two hull sites
    pub fn is_part_of_convex_hull(&self) -> bool {
        self.left_vertex.is_none() || self.right_vertex.is_none()
    }

    pub fn is_visible(&self) -> bool {
        self.clipped.is_some()
    }

    pub fn clipped_end(&self, side: Side) -> Option<Vec2> {
        self.clipped.map(|ends| match side {
            Side::Left => ends[0],
            Side::Right => ends[1],
        })
    }

    /// Visible part of the edge, if any
    pub fn voronoi_segment(&self) -> Option<LineSegment> {
        self.clipped.map(|[l, r]| LineSegment::new(l, r))
    }

    /// Segment joining the two generating sites
    pub fn delaunay_line(&self, sites: &[Site]) -> LineSegment {
        LineSegment::new(sites[self.left_site.0].coord, sites[self.right_site.0].coord)
    }

    pub fn sites_distance(&self, sites: &[Site]) -> f32 {
        self.delaunay_line(sites).length()
    }

    /// Clip the edge to `bounds`, storing the visible ends
    ///
    /// Steep lines (`a == 1`) are walked along y, the rest along x. The end
    /// vertices, when present and inside the bounds, cap the walk.
    pub(crate) fn clip_vertices(&mut self, bounds: &Rect, vertices: &[Vertex]) {
        self.clipped = None;

        let x_min = bounds.left();
        let y_min = bounds.top();
        let x_max = bounds.right();
        let y_max = bounds.bottom();

        let (vertex0, vertex1) = if self.x_normalized() && self.b >= 0.0 {
            (self.right_vertex, self.left_vertex)
        } else {
            (self.left_vertex, self.right_vertex)
        };
        let v0 = vertex0.map(|v| vertices[v.0].coord);
        let v1 = vertex1.map(|v| vertices[v.0].coord);

        let (a, b, c) = (self.a, self.b, self.c);
        let (mut x0, mut y0, mut x1, mut y1): (f32, f32, f32, f32);

        if self.x_normalized() {
            y0 = match v0 {
                Some(v) if v.y > y_min => v.y,
                _ => y_min,
            };
            if y0 > y_max {
                return;
            }
            x0 = c - b * y0;

            y1 = match v1 {
                Some(v) if v.y < y_max => v.y,
                _ => y_max,
            };
            if y1 < y_min {
                return;
            }
            x1 = c - b * y1;

            if (x0 > x_max && x1 > x_max) || (x0 < x_min && x1 < x_min) {
                return;
            }

            if x0 > x_max {
                x0 = x_max;
                y0 = (c - x0) / b;
            } else if x0 < x_min {
                x0 = x_min;
                y0 = (c - x0) / b;
            }
            if x1 > x_max {
                x1 = x_max;
                y1 = (c - x1) / b;
            } else if x1 < x_min {
                x1 = x_min;
                y1 = (c - x1) / b;
            }
        } else {
            x0 = match v0 {
                Some(v) if v.x > x_min => v.x,
                _ => x_min,
            };
            if x0 > x_max {
                return;
            }
            y0 = c - a * x0;

            x1 = match v1 {
                Some(v) if v.x < x_max => v.x,
                _ => x_max,
            };
            if x1 < x_min {
                return;
            }
            y1 = c - a * x1;

            if (y0 > y_max && y1 > y_max) || (y0 < y_min && y1 < y_min) {
                return;
            }

            if y0 > y_max {
                y0 = y_max;
                x0 = (c - y0) / a;
            } else if y0 < y_min {
                y0 = y_min;
                x0 = (c - y0) / a;
            }
            if y1 > y_max {
                y1 = y_max;
                x1 = (c - y1) / a;
            } else if y1 < y_min {
                y1 = y_min;
                x1 = (c - y1) / a;
            }
        }

        let p0 = Vec2::new(x0, y0);
        let p1 = Vec2::new(x1, y1);
        self.clipped = Some(if vertex0 == self.left_vertex {
            [p0, p1]
        } else {
            [p1, p0]
        });
    }
}
