//! Diagram sites and the sweep-order sort

use std::cell::Cell;
use std::cmp::Ordering;
use std::sync::OnceLock;

use glam::Vec2;

use crate::geometry::compare_y_then_x;

use super::edge::{EdgeId, Side};

/// Handle of a site; indexes the diagram's sites in sweep order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(pub usize);

/// The generating point of one Voronoi cell
#[derive(Debug)]
pub struct Site {
    pub(crate) coord: Vec2,
    pub(crate) previous: Vec2,
    pub(crate) color: Option<u32>,
    pub(crate) index: usize,
    pub(crate) weight: f32,
    pub(crate) edges: Vec<EdgeId>,
    pub(crate) region: OnceLock<Region>,
}

/// Ordered boundary of a site, computed once per build
#[derive(Debug, Clone, Default)]
pub(crate) struct Region {
    pub(crate) ordered: Vec<(EdgeId, Side)>,
    pub(crate) points: Vec<Vec2>,
}

impl Site {
    pub(crate) fn new(coord: Vec2, previous: Vec2, color: Option<u32>, index: usize, weight: f32) -> Self {
        Self {
            coord,
            previous,
            color,
            index,
            weight,
            edges: Vec::new(),
            region: OnceLock::new(),
        }
    }

    pub fn coord(&self) -> Vec2 {
        self.coord
    }

    /// Coordinate this site was derived from (itself when freshly placed)
    pub fn previous(&self) -> Vec2 {
        self.previous
    }

    pub fn color(&self) -> Option<u32> {
        self.color
    }

    /// Stabilised sweep-order index
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }
}

/// Sort sites by (y, x) while stabilising their indices
///
/// Each comparison that orders two sites also swaps their indices when the
/// earlier site holds the larger one, so the earlier site always ends up
/// with the smaller index of the pair. Ties leave indices untouched. The
/// outcome depends on the comparison sequence of the (stable, deterministic)
/// sort, which makes it reproducible for a given input order.
pub(crate) fn sort_sites(sites: &mut Vec<Site>) {
    let indices: Vec<Cell<usize>> = sites.iter().map(|s| Cell::new(s.index)).collect();
    let mut order: Vec<usize> = (0..sites.len()).collect();

    order.sort_by(|&a, &b| {
        let result = compare_y_then_x(sites[a].coord, sites[b].coord);
        match result {
            Ordering::Less if indices[a].get() > indices[b].get() => indices[a].swap(&indices[b]),
            Ordering::Greater if indices[b].get() > indices[a].get() => indices[a].swap(&indices[b]),
            _ => {}
        }
        result
    });

    let mut slots: Vec<Option<Site>> = sites.drain(..).map(Some).collect();
    for position in order {
        if let Some(mut site) = slots[position].take() {
            site.index = indices[position].get();
            sites.push(site);
        }
    }
}
