//! The sweep front: an x-ordered doubly linked list of half-edges
//!
//! A coarse hash over x (about 2·sqrt(N) buckets) remembers a recently seen
//! half-edge per bucket so neighbour lookups start close to their answer.

use glam::Vec2;

use super::edge::Edge;
use super::halfedge::{EdgeSlot, HalfedgeArena, HalfedgeId};
use super::site::Site;

pub(crate) struct BeachLine {
    x_min: f32,
    delta_x: f32,
    hash: Vec<Option<HalfedgeId>>,
    pub(crate) left_end: HalfedgeId,
    pub(crate) right_end: HalfedgeId,
}

impl BeachLine {
    pub(crate) fn new(arena: &mut HalfedgeArena, x_min: f32, delta_x: f32, sqrt_sites: usize) -> Self {
        let size = (2 * sqrt_sites).max(2);
        let left_end = arena.alloc(EdgeSlot::Dummy, None);
        let right_end = arena.alloc(EdgeSlot::Dummy, None);
        arena[left_end].right = Some(right_end);
        arena[right_end].left = Some(left_end);

        let mut hash = vec![None; size];
        hash[0] = Some(left_end);
        hash[size - 1] = Some(right_end);

        Self {
            x_min,
            delta_x: if delta_x > 0.0 { delta_x } else { 1.0 },
            hash,
            left_end,
            right_end,
        }
    }

    /// Splice `new` in directly right of `left`
    pub(crate) fn insert(&self, arena: &mut HalfedgeArena, left: HalfedgeId, new: HalfedgeId) {
        let right = arena[left].right;
        arena[new].left = Some(left);
        arena[new].right = right;
        if let Some(right) = right {
            arena[right].left = Some(new);
        }
        arena[left].right = Some(new);
    }

    /// Unlink `he` and mark it deleted; it stays allocated
    pub(crate) fn remove(&self, arena: &mut HalfedgeArena, he: HalfedgeId) {
        let left = arena[he].left;
        let right = arena[he].right;
        if let Some(left) = left {
            arena[left].right = right;
        }
        if let Some(right) = right {
            arena[right].left = left;
        }
        let node = &mut arena[he];
        node.edge = EdgeSlot::Deleted;
        node.left = None;
        node.right = None;
    }

    pub(crate) fn left_of(&self, arena: &HalfedgeArena, he: HalfedgeId) -> HalfedgeId {
        arena[he].left.unwrap_or(self.left_end)
    }

    pub(crate) fn right_of(&self, arena: &HalfedgeArena, he: HalfedgeId) -> HalfedgeId {
        arena[he].right.unwrap_or(self.right_end)
    }

    /// The rightmost half-edge that is still left of `p`
    pub(crate) fn left_neighbor(
        &mut self,
        arena: &HalfedgeArena,
        edges: &[Edge],
        sites: &[Site],
        p: Vec2,
    ) -> HalfedgeId {
        let size = self.hash.len() as isize;
        let bucket = (((p.x - self.x_min) / self.delta_x * size as f32) as isize).clamp(0, size - 1);

        let mut he = match self.hash_entry(arena, bucket) {
            Some(he) => he,
            None => {
                // The end buckets always hold the list ends, so this terminates
                let mut i = 1;
                loop {
                    if let Some(he) = self.hash_entry(arena, bucket - i) {
                        break he;
                    }
                    if let Some(he) = self.hash_entry(arena, bucket + i) {
                        break he;
                    }
                    i += 1;
                }
            }
        };

        if he == self.left_end || (he != self.right_end && arena[he].is_left_of(p, edges, sites)) {
            loop {
                he = self.right_of(arena, he);
                if he == self.right_end || !arena[he].is_left_of(p, edges, sites) {
                    break;
                }
            }
            he = self.left_of(arena, he);
        } else {
            loop {
                he = self.left_of(arena, he);
                if he == self.left_end || arena[he].is_left_of(p, edges, sites) {
                    break;
                }
            }
        }

        if bucket > 0 && bucket < size - 1 {
            self.hash[bucket as usize] = Some(he);
        }
        he
    }

    /// Hash lookup that prunes entries pointing at deleted half-edges
    fn hash_entry(&mut self, arena: &HalfedgeArena, bucket: isize) -> Option<HalfedgeId> {
        if bucket < 0 || bucket >= self.hash.len() as isize {
            return None;
        }
        let slot = &mut self.hash[bucket as usize];
        match *slot {
            Some(he) if arena[he].edge == EdgeSlot::Deleted => {
                *slot = None;
                None
            }
            entry => entry,
        }
    }
}
