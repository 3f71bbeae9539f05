//! Spatial indexing for fast position-to-site lookups
//!
//! This module is only available with the `spatial-index` feature.

use glam::Vec2;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

use crate::diagram::SiteId;

/// Wrapper around KD-tree for nearest-site queries
///
/// In a Voronoi diagram the nearest site to a point is the site whose
/// region contains it, so this answers the same question as
/// `find_site_containing` in O(log n) without walking polygons. Points
/// outside the plot still get the nearest site.
#[derive(Clone)]
pub struct SpatialIndex {
    tree: Option<ImmutableKdTree<f32, usize, 2, 32>>,
    len: usize,
}

impl SpatialIndex {
    /// Build spatial index from site coordinates
    ///
    /// # Arguments
    ///
    /// * `coords` - Site coordinates, indexed by `SiteId`
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_map::*;
    /// use glam::Vec2;
    ///
    /// let coords = vec![
    ///     Vec2::new(10.0, 10.0),
    ///     Vec2::new(90.0, 10.0),
    ///     Vec2::new(50.0, 90.0),
    /// ];
    ///
    /// let index = SpatialIndex::new(&coords);
    /// assert_eq!(index.nearest(Vec2::new(80.0, 20.0)), Some(SiteId(1)));
    /// ```
    pub fn new(coords: &[Vec2]) -> Self {
        let points: Vec<[f32; 2]> = coords.iter().map(|c| c.to_array()).collect();

        // The tree needs at least one point
        let tree = (!points.is_empty()).then(|| ImmutableKdTree::new_from_slice(&points));

        Self {
            tree,
            len: points.len(),
        }
    }

    /// Number of indexed sites
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Find the site nearest to a position
    ///
    /// # Returns
    ///
    /// `None` only for an empty index
    pub fn nearest(&self, position: Vec2) -> Option<SiteId> {
        let tree = self.tree.as_ref()?;
        let result = tree.nearest_one::<SquaredEuclidean>(&position.to_array());
        Some(SiteId(result.item))
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex").field("len", &self.len).finish()
    }
}
