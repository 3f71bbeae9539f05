//! Fortune's sweepline driver
//!
//! # Algorithm
//!
//! Sites are consumed in (y, x) order. Each step takes whichever comes
//! first, the next site or the earliest pending circle event:
//!
//! - a site event splits the arc above the new site, adding one bisector
//!   as two half-edges and queueing any circle events they create;
//! - a circle event freezes the vertex where three arcs meet, records the
//!   Delaunay triangle, closes the two converging edges and starts the
//!   bisector of the outer sites.
//!
//! # References
//!
//! - Fortune, S. (1987). "A sweepline algorithm for Voronoi diagrams"

use std::cmp::Ordering;

use glam::Vec2;

use crate::error::{MapError, Result};
use crate::geometry::compare_y_then_x;

use super::beach_line::BeachLine;
use super::edge::{Edge, EdgeId, Side};
use super::event_queue::EventQueue;
use super::halfedge::{EdgeSlot, HalfedgeArena, HalfedgeId};
use super::site::{Site, SiteId};
use super::vertex::{intersect, Vertex, VertexId};
use super::Triangle;

/// Everything the sweep produces besides the site edge lists
#[derive(Debug, Default)]
pub(crate) struct SweepOutput {
    pub(crate) edges: Vec<Edge>,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) triangles: Vec<Triangle>,
    pub(crate) frozen_vertices: usize,
    pub(crate) circle_events: usize,
}

struct Sweep<'a> {
    sites: &'a mut [Site],
    arena: HalfedgeArena,
    beach: BeachLine,
    queue: EventQueue,
    out: SweepOutput,
}

/// Run the sweep over `sites`, which must already be sorted by (y, x)
pub(crate) fn run(sites: &mut [Site]) -> Result<SweepOutput> {
    if sites.is_empty() {
        return Ok(SweepOutput::default());
    }

    let n = sites.len();
    let sqrt_sites = ((n + 4) as f32).sqrt() as usize;
    let y_min = sites[0].coord.y;
    let y_max = sites[n - 1].coord.y;
    let (x_min, x_max) = sites
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), s| (lo.min(s.coord.x), hi.max(s.coord.x)));

    let mut arena = HalfedgeArena::default();
    let beach = BeachLine::new(&mut arena, x_min, x_max - x_min, sqrt_sites);
    let queue = EventQueue::new(&mut arena, y_min, y_max - y_min, sqrt_sites);

    let mut sweep = Sweep {
        sites,
        arena,
        beach,
        queue,
        out: SweepOutput::default(),
    };
    sweep.sweep()?;

    log::trace!(
        "sweep: {} sites, {} half-edges, {} circle events",
        n,
        sweep.arena.len(),
        sweep.out.circle_events
    );
    Ok(sweep.out)
}

impl Sweep<'_> {
    const BOTTOM_MOST: SiteId = SiteId(0);

    fn sweep(&mut self) -> Result<()> {
        let mut next_site = 1;
        let mut new_int_star = Vec2::ZERO;

        loop {
            if let Some(min) = self.queue.min(&self.arena, &self.out.vertices) {
                new_int_star = min;
            }

            let site_first = next_site < self.sites.len()
                && (self.queue.is_empty()
                    || compare_y_then_x(self.sites[next_site].coord, new_int_star) == Ordering::Less);

            if site_first {
                self.site_event(SiteId(next_site));
                next_site += 1;
            } else if !self.queue.is_empty() {
                self.circle_event()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn site_event(&mut self, site: SiteId) {
        let coord = self.sites[site.0].coord;

        let lbnd = self
            .beach
            .left_neighbor(&self.arena, &self.out.edges, &*self.sites, coord);
        let rbnd = self.beach.right_of(&self.arena, lbnd);
        let bottom = self.right_region(lbnd);

        let edge = self.bisect(bottom, site);

        let bisector = self.arena.alloc(EdgeSlot::Live(edge), Some(Side::Left));
        self.beach.insert(&mut self.arena, lbnd, bisector);
        if let Some(p) = self.intersect(lbnd, bisector) {
            self.queue.remove(&mut self.arena, lbnd);
            self.schedule(lbnd, p, coord);
        }

        let lbnd = bisector;
        let bisector = self.arena.alloc(EdgeSlot::Live(edge), Some(Side::Right));
        self.beach.insert(&mut self.arena, lbnd, bisector);
        if let Some(p) = self.intersect(bisector, rbnd) {
            self.schedule(bisector, p, coord);
        }
    }

    fn circle_event(&mut self) -> Result<()> {
        let Some(lbnd) = self.queue.extract_min(&mut self.arena) else {
            return Ok(());
        };
        let llbnd = self.beach.left_of(&self.arena, lbnd);
        let rbnd = self.beach.right_of(&self.arena, lbnd);
        let rrbnd = self.beach.right_of(&self.arena, rbnd);

        let mut bottom = self.left_region(lbnd);
        let mut top = self.right_region(rbnd);
        let middle = self.right_region(lbnd);
        self.out.triangles.push(Triangle {
            sites: [bottom, top, middle],
        });

        let vertex = self.arena[lbnd].vertex.ok_or_else(|| {
            MapError::GenerationFailed("circle event without a vertex".to_string())
        })?;
        self.out.vertices[vertex.0].index = Some(self.out.frozen_vertices);
        self.out.frozen_vertices += 1;
        self.out.circle_events += 1;

        self.end_edge(lbnd, vertex);
        self.end_edge(rbnd, vertex);

        self.beach.remove(&mut self.arena, lbnd);
        self.queue.remove(&mut self.arena, rbnd);
        self.beach.remove(&mut self.arena, rbnd);

        let mut side = Side::Left;
        if self.sites[bottom.0].coord.y > self.sites[top.0].coord.y {
            std::mem::swap(&mut bottom, &mut top);
            side = Side::Right;
        }

        let edge = self.bisect(bottom, top);
        let bisector = self.arena.alloc(EdgeSlot::Live(edge), Some(side));
        self.beach.insert(&mut self.arena, llbnd, bisector);
        self.out.edges[edge.0].set_vertex(side.other(), vertex);

        let bottom_coord = self.sites[bottom.0].coord;
        if let Some(p) = self.intersect(llbnd, bisector) {
            self.queue.remove(&mut self.arena, llbnd);
            self.schedule(llbnd, p, bottom_coord);
        }
        if let Some(p) = self.intersect(bisector, rrbnd) {
            self.schedule(bisector, p, bottom_coord);
        }
        Ok(())
    }

    /// New bisector between `left` and `right`, registered on both sites
    fn bisect(&mut self, left: SiteId, right: SiteId) -> EdgeId {
        let id = EdgeId(self.out.edges.len());
        let edge = Edge::bisect(
            id.0,
            left,
            self.sites[left.0].coord,
            right,
            self.sites[right.0].coord,
        );
        self.out.edges.push(edge);
        self.sites[left.0].edges.push(id);
        self.sites[right.0].edges.push(id);
        id
    }

    /// Record `vertex` on the end of `he`'s edge that `he` faces
    fn end_edge(&mut self, he: HalfedgeId, vertex: VertexId) {
        if let (EdgeSlot::Live(edge), Some(side)) = (self.arena[he].edge, self.arena[he].side) {
            self.out.edges[edge.0].set_vertex(side, vertex);
        }
    }

    fn intersect(&self, he0: HalfedgeId, he1: HalfedgeId) -> Option<Vec2> {
        intersect(&self.arena[he0], &self.arena[he1], &self.out.edges, &*self.sites)
    }

    /// Queue a circle event at `p` for `he`, keyed by its distance from `site`
    fn schedule(&mut self, he: HalfedgeId, p: Vec2, site: Vec2) {
        self.out.vertices.push(Vertex::new(p));
        let vertex = VertexId(self.out.vertices.len() - 1);
        let node = &mut self.arena[he];
        node.vertex = Some(vertex);
        node.ystar = p.y + site.distance(p);
        self.queue.insert(&mut self.arena, &self.out.vertices, he);
    }

    fn left_region(&self, he: HalfedgeId) -> SiteId {
        match (self.arena[he].edge, self.arena[he].side) {
            (EdgeSlot::Live(edge), Some(side)) => self.out.edges[edge.0].site(side),
            _ => Self::BOTTOM_MOST,
        }
    }

    fn right_region(&self, he: HalfedgeId) -> SiteId {
        match (self.arena[he].edge, self.arena[he].side) {
            (EdgeSlot::Live(edge), Some(side)) => self.out.edges[edge.0].site(side.other()),
            _ => Self::BOTTOM_MOST,
        }
    }
}
