//! Bucketed priority queue of pending circle events
//!
//! Events are keyed by ystar and kept in about 4·sqrt(N) buckets, each a
//! singly linked list headed by a dummy half-edge. Within a bucket events
//! are sorted by ystar, then by vertex x when ystar ties within epsilon.

use glam::Vec2;

use crate::geometry::EPSILON;

use super::halfedge::{EdgeSlot, HalfedgeArena, HalfedgeId};
use super::vertex::Vertex;

pub(crate) struct EventQueue {
    y_min: f32,
    delta_y: f32,
    heads: Vec<HalfedgeId>,
    count: usize,
    min_bucket: usize,
}

impl EventQueue {
    pub(crate) fn new(arena: &mut HalfedgeArena, y_min: f32, delta_y: f32, sqrt_sites: usize) -> Self {
        let size = (4 * sqrt_sites).max(1);
        let heads = (0..size).map(|_| arena.alloc(EdgeSlot::Dummy, None)).collect();
        Self {
            y_min,
            delta_y: if delta_y > 0.0 { delta_y } else { 1.0 },
            heads,
            count: 0,
            min_bucket: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    fn bucket(&self, ystar: f32) -> usize {
        let size = self.heads.len();
        let bucket = ((ystar - self.y_min) / self.delta_y * size as f32) as isize;
        bucket.clamp(0, size as isize - 1) as usize
    }

    fn vertex_x(arena: &HalfedgeArena, vertices: &[Vertex], he: HalfedgeId) -> f32 {
        arena[he].vertex.map_or(f32::NAN, |v| vertices[v.0].coord.x)
    }

    /// Queue `he` by its ystar; its vertex must already be set
    ///
    /// The minimum-bucket pointer only advances while extracting; an event
    /// landing in an earlier bucket pulls it back.
    pub(crate) fn insert(&mut self, arena: &mut HalfedgeArena, vertices: &[Vertex], he: HalfedgeId) {
        let bucket = self.bucket(arena[he].ystar);
        if bucket < self.min_bucket {
            self.min_bucket = bucket;
        }

        let ystar = arena[he].ystar;
        let x = Self::vertex_x(arena, vertices, he);
        let mut previous = self.heads[bucket];
        while let Some(next) = arena[previous].next_in_queue {
            let next_ystar = arena[next].ystar;
            let later = ystar > next_ystar
                || ((ystar - next_ystar).abs() < EPSILON
                    && x > Self::vertex_x(arena, vertices, next));
            if !later {
                break;
            }
            previous = next;
        }

        arena[he].next_in_queue = arena[previous].next_in_queue;
        arena[previous].next_in_queue = Some(he);
        self.count += 1;
    }

    /// Drop `he` from the queue; half-edges without a vertex are not queued
    pub(crate) fn remove(&mut self, arena: &mut HalfedgeArena, he: HalfedgeId) {
        if arena[he].vertex.is_none() {
            return;
        }
        let mut previous = self.heads[self.bucket(arena[he].ystar)];
        loop {
            match arena[previous].next_in_queue {
                Some(next) if next == he => break,
                Some(next) => previous = next,
                None => {
                    log::warn!("circle event {:?} missing from its bucket", he);
                    arena[he].vertex = None;
                    return;
                }
            }
        }
        arena[previous].next_in_queue = arena[he].next_in_queue;
        self.count -= 1;

        let node = &mut arena[he];
        node.vertex = None;
        node.next_in_queue = None;
    }

    fn adjust_min_bucket(&mut self, arena: &HalfedgeArena) {
        while self.min_bucket < self.heads.len() - 1
            && arena[self.heads[self.min_bucket]].next_in_queue.is_none()
        {
            self.min_bucket += 1;
        }
    }

    /// Vertex x and ystar of the earliest event
    pub(crate) fn min(&mut self, arena: &HalfedgeArena, vertices: &[Vertex]) -> Option<Vec2> {
        self.adjust_min_bucket(arena);
        let he = arena[self.heads[self.min_bucket]].next_in_queue?;
        Some(Vec2::new(Self::vertex_x(arena, vertices, he), arena[he].ystar))
    }

    pub(crate) fn extract_min(&mut self, arena: &mut HalfedgeArena) -> Option<HalfedgeId> {
        self.adjust_min_bucket(arena);
        let head = self.heads[self.min_bucket];
        let he = arena[head].next_in_queue?;
        arena[head].next_in_queue = arena[he].next_in_queue;
        arena[he].next_in_queue = None;
        self.count -= 1;
        Some(he)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::edge::{EdgeId, Side};
    use crate::diagram::vertex::VertexId;

    fn queued(arena: &mut HalfedgeArena, vertex: usize, ystar: f32) -> HalfedgeId {
        let he = arena.alloc(EdgeSlot::Live(EdgeId(0)), Some(Side::Left));
        arena[he].vertex = Some(VertexId(vertex));
        arena[he].ystar = ystar;
        he
    }

    #[test]
    fn test_extracts_in_ystar_order() {
        let mut arena = HalfedgeArena::default();
        let vertices = vec![
            Vertex::new(Vec2::new(1.0, 0.0)),
            Vertex::new(Vec2::new(2.0, 0.0)),
            Vertex::new(Vec2::new(3.0, 0.0)),
        ];
        let mut queue = EventQueue::new(&mut arena, 0.0, 100.0, 3);

        let late = queued(&mut arena, 0, 80.0);
        let early = queued(&mut arena, 1, 10.0);
        let middle = queued(&mut arena, 2, 40.0);
        for he in [late, early, middle] {
            queue.insert(&mut arena, &vertices, he);
        }
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.min(&arena, &vertices), Some(Vec2::new(2.0, 10.0)));
        assert_eq!(queue.extract_min(&mut arena), Some(early));
        assert_eq!(queue.extract_min(&mut arena), Some(middle));
        assert_eq!(queue.extract_min(&mut arena), Some(late));
        assert!(queue.is_empty());
        assert_eq!(queue.extract_min(&mut arena), None);
    }

    #[test]
    fn test_ties_break_by_vertex_x() {
        let mut arena = HalfedgeArena::default();
        let vertices = vec![Vertex::new(Vec2::new(9.0, 0.0)), Vertex::new(Vec2::new(4.0, 0.0))];
        let mut queue = EventQueue::new(&mut arena, 0.0, 100.0, 3);

        let right = queued(&mut arena, 0, 50.0);
        let left = queued(&mut arena, 1, 50.001);
        queue.insert(&mut arena, &vertices, right);
        queue.insert(&mut arena, &vertices, left);

        assert_eq!(queue.extract_min(&mut arena), Some(left));
    }

    #[test]
    fn test_remove_and_min_bucket_rewind() {
        let mut arena = HalfedgeArena::default();
        let vertices = vec![Vertex::new(Vec2::ZERO); 2];
        let mut queue = EventQueue::new(&mut arena, 0.0, 100.0, 3);

        let high = queued(&mut arena, 0, 90.0);
        queue.insert(&mut arena, &vertices, high);
        assert_eq!(queue.min(&arena, &vertices).map(|m| m.y), Some(90.0));

        // An earlier event after the pointer advanced is still found
        let low = queued(&mut arena, 1, 5.0);
        queue.insert(&mut arena, &vertices, low);
        assert_eq!(queue.min(&arena, &vertices).map(|m| m.y), Some(5.0));

        queue.remove(&mut arena, low);
        assert!(arena[low].vertex.is_none());
        assert_eq!(queue.len(), 1);

        // Not queued: no-op
        queue.remove(&mut arena, low);
        assert_eq!(queue.len(), 1);
    }
}
