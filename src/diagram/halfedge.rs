//! Construction-time half-edges
//!
//! Half-edges live in a per-build arena and are linked both into the beach
//! line and into the circle-event queue through index handles. They never
//! outlive the sweep.

use std::ops::{Index, IndexMut};

use glam::Vec2;

use super::edge::{Edge, EdgeId, Side};
use super::site::Site;
use super::vertex::VertexId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HalfedgeId(pub(crate) usize);

/// What a half-edge wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeSlot {
    /// Beach-line ends and queue bucket heads
    Dummy,
    Live(EdgeId),
    /// Removed from the beach line; hash entries pointing here are stale
    Deleted,
}

#[derive(Debug, Clone)]
pub(crate) struct Halfedge {
    pub(crate) edge: EdgeSlot,
    pub(crate) side: Option<Side>,
    pub(crate) left: Option<HalfedgeId>,
    pub(crate) right: Option<HalfedgeId>,
    pub(crate) next_in_queue: Option<HalfedgeId>,
    pub(crate) vertex: Option<VertexId>,
    /// Event y in the transformed space: vertex y plus distance to the site
    pub(crate) ystar: f32,
}

impl Halfedge {
    pub(crate) fn new(edge: EdgeSlot, side: Option<Side>) -> Self {
        Self {
            edge,
            side,
            left: None,
            right: None,
            next_in_queue: None,
            vertex: None,
            ystar: 0.0,
        }
    }

    /// Whether the boundary this half-edge traces lies left of `p`
    pub(crate) fn is_left_of(&self, p: Vec2, edges: &[Edge], sites: &[Site]) -> bool {
        let (EdgeSlot::Live(id), Some(side)) = (self.edge, self.side) else {
            return false;
        };
        let edge = &edges[id.0];
        let top_site = sites[edge.right_site.0].coord;
        let right_of_site = p.x > top_site.x;

        if right_of_site && side == Side::Left {
            return true;
        }
        if !right_of_site && side == Side::Right {
            return false;
        }

        let above = if edge.x_normalized() {
            let dyp = p.y - top_site.y;
            let dxp = p.x - top_site.x;
            let mut fast = false;
            let mut above;

            if (!right_of_site && edge.b < 0.0) || (right_of_site && edge.b >= 0.0) {
                above = dyp >= edge.b * dxp;
                fast = above;
            } else {
                above = p.x + p.y * edge.b > edge.c;
                if edge.b < 0.0 {
                    above = !above;
                }
                if !above {
                    fast = true;
                }
            }

            if !fast {
                let dxs = top_site.x - sites[edge.left_site.0].coord.x;
                above = edge.b * (dxp * dxp - dyp * dyp)
                    < dxs * dyp * (1.0 + 2.0 * dxp / dxs + edge.b * edge.b);
                if edge.b < 0.0 {
                    above = !above;
                }
            }
            above
        } else {
            let y1 = edge.c - edge.a * p.x;
            let t1 = p.y - y1;
            let t2 = p.x - top_site.x;
            let t3 = y1 - top_site.y;
            t1 * t1 > t2 * t2 + t3 * t3
        };

        match side {
            Side::Left => above,
            Side::Right => !above,
        }
    }
}

/// Bulk storage for every half-edge of one sweep
#[derive(Debug, Default)]
pub(crate) struct HalfedgeArena {
    nodes: Vec<Halfedge>,
}

impl HalfedgeArena {
    pub(crate) fn alloc(&mut self, edge: EdgeSlot, side: Option<Side>) -> HalfedgeId {
        self.nodes.push(Halfedge::new(edge, side));
        HalfedgeId(self.nodes.len() - 1)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl Index<HalfedgeId> for HalfedgeArena {
    type Output = Halfedge;

    fn index(&self, id: HalfedgeId) -> &Halfedge {
        &self.nodes[id.0]
    }
}

impl IndexMut<HalfedgeId> for HalfedgeArena {
    fn index_mut(&mut self, id: HalfedgeId) -> &mut Halfedge {
        &mut self.nodes[id.0]
    }
}
