//! Voronoi diagram and Delaunay dual over a rectangle
//!
//! [`Diagram::build`] runs Fortune's sweep over the input points, clips
//! every bisector to the plot bounds and indexes the sites by coordinate.
//! Regions are extracted lazily and cached per site until the diagram is
//! rebuilt.

mod beach_line;
mod edge;
mod event_queue;
mod halfedge;
mod region;
mod site;
mod sweep;
mod vertex;

use std::collections::HashMap;
use std::time::Instant;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::geometry::{approx_eq, polygon_contains, Circle, CoordKey, LineSegment, Rect, SitePoint};

pub use edge::{Edge, EdgeId, Side};
pub use site::{Site, SiteId};
pub use vertex::{Vertex, VertexId};

use region::{clip_to_bounds, reorder_edges};
use site::{sort_sites, Region};

/// Seed for site weights when the caller does not pick one
const DEFAULT_WEIGHT_SEED: u64 = 0;

/// Three sites whose circumcircle is empty
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub sites: [SiteId; 3],
}

/// A complete Voronoi diagram
///
/// Sites are stored in sweep order, so [`SiteId`]s are positions in
/// [`Diagram::sites`]. All handles are only meaningful for the diagram
/// that produced them.
///
/// # Example
///
/// ```
/// use voronoi_map::{Diagram, Rect, SitePoint};
///
/// let points = [SitePoint::new(25.0, 50.0), SitePoint::new(75.0, 50.0)];
/// let diagram = Diagram::build(&points, Rect::from_size(100.0, 100.0)).unwrap();
///
/// assert_eq!(diagram.site_count(), 2);
/// assert_eq!(diagram.line_segments().len(), 1);
/// ```
#[derive(Debug)]
pub struct Diagram {
    bounds: Rect,
    weight_seed: u64,
    sites: Vec<Site>,
    edges: Vec<Edge>,
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
    lookup: HashMap<CoordKey, SiteId>,
}

impl Diagram {
    /// Build the diagram of `points` clipped to `bounds`
    ///
    /// # Arguments
    ///
    /// * `points` - Site positions; epsilon-equal duplicates collapse
    /// * `bounds` - Plot rectangle every edge is clipped against
    ///
    /// # Returns
    ///
    /// `Result<Diagram>` - The diagram, or `InvalidInput` for an empty
    /// point set, non-finite coordinates or degenerate bounds
    pub fn build(points: &[SitePoint], bounds: Rect) -> Result<Self> {
        Self::build_seeded(points, bounds, DEFAULT_WEIGHT_SEED)
    }

    /// Build with site weights drawn from `seed`
    pub fn build_seeded(points: &[SitePoint], bounds: Rect, seed: u64) -> Result<Self> {
        bounds.validate()?;
        if points.is_empty() {
            return Err(MapError::InvalidInput("point set is empty".to_string()));
        }
        if let Some(bad) = points.iter().find(|p| !p.position.is_finite()) {
            return Err(MapError::InvalidInput(format!(
                "non-finite site coordinate {:?}",
                bad.position
            )));
        }

        let start = Instant::now();
        let mut sites = collapse_duplicates(points, seed);
        let duplicates = points.len() - sites.len();
        sort_sites(&mut sites);

        let output = sweep::run(&mut sites)?;
        let mut edges = output.edges;
        for edge in &mut edges {
            edge.clip_vertices(&bounds, &output.vertices);
        }

        let lookup = sites
            .iter()
            .enumerate()
            .map(|(i, site)| (CoordKey::of(site.coord), SiteId(i)))
            .collect();

        log::debug!(
            "built diagram: {} sites ({} duplicates dropped), {} edges, {} vertices, {} triangles in {:?}",
            sites.len(),
            duplicates,
            edges.len(),
            output.frozen_vertices,
            output.triangles.len(),
            start.elapsed()
        );

        Ok(Self {
            bounds,
            weight_seed: seed,
            sites,
            edges,
            vertices: output.vertices,
            triangles: output.triangles,
            lookup,
        })
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(id.0)
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Every bisector, visible or not
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    /// Vertices that became part of the diagram, in freezing order
    pub fn vertices(&self) -> Vec<Vertex> {
        let mut frozen: Vec<Vertex> = self.vertices.iter().copied().filter(Vertex::is_frozen).collect();
        frozen.sort_by_key(|v| v.index);
        frozen
    }

    /// Coordinate of an edge end; `None` for an unbounded end
    pub fn vertex_coord(&self, id: VertexId) -> Option<Vec2> {
        self.vertices.get(id.0).map(Vertex::coord)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// The site at `coord`, within epsilon
    pub fn site_at(&self, coord: Vec2) -> Option<SiteId> {
        CoordKey::of(coord)
            .neighborhood()
            .filter_map(|key| self.lookup.get(&key).copied())
            .find(|id| approx_eq(self.sites[id.0].coord, coord))
    }

    pub fn site_coords(&self) -> Vec<Vec2> {
        self.sites.iter().map(Site::coord).collect()
    }

    /// Input points reproducing this diagram's sites
    pub fn site_points(&self) -> Vec<SitePoint> {
        self.sites
            .iter()
            .map(|site| SitePoint {
                position: site.coord,
                previous: Some(site.previous),
                color: site.color,
            })
            .collect()
    }

    fn check(&self, id: SiteId) -> Result<&Site> {
        self.sites.get(id.0).ok_or(MapError::SiteNotFound(id.0))
    }

    /// Clipped, counter-clockwise region of a site
    ///
    /// Computed on first use and cached. Unbounded regions whose edge
    /// chain cannot be closed and regions outside the bounds are empty.
    pub fn region(&self, id: SiteId) -> Result<&[Vec2]> {
        Ok(&self.cached_region(id)?.points)
    }

    /// Regions of all sites, indexed by [`SiteId`]
    pub fn regions(&self) -> Vec<&[Vec2]> {
        self.sites
            .iter()
            .map(|site| site.region.get_or_init(|| self.compute_region(site)).points.as_slice())
            .collect()
    }

    fn cached_region(&self, id: SiteId) -> Result<&Region> {
        let site = self.check(id)?;
        Ok(site.region.get_or_init(|| self.compute_region(site)))
    }

    fn compute_region(&self, site: &Site) -> Region {
        let ordered = reorder_edges(&site.edges, |id| {
            let edge = &self.edges[id.0];
            let at_infinity = |v: Option<VertexId>| v.is_some_and(|v| self.vertices[v.0].is_at_infinity());
            if at_infinity(edge.left_vertex) || at_infinity(edge.right_vertex) {
                None
            } else {
                Some((edge.left_vertex, edge.right_vertex))
            }
        });

        let mut points = clip_to_bounds(site.coord, &ordered, &self.edges, &self.bounds);
        if points.is_empty()
            && !site.edges.iter().any(|e| self.edges[e.0].is_visible())
            && self.bounds.contains(site.coord)
        {
            points = self.bounds.corners().to_vec();
        }
        Region { ordered, points }
    }

    /// Sites sharing a bisector with `id`
    pub fn neighbor_sites(&self, id: SiteId) -> Result<Vec<SiteId>> {
        let site = self.check(id)?;
        let mut neighbors: Vec<SiteId> = Vec::with_capacity(site.edges.len());
        for edge in &site.edges {
            let other = self.edges[edge.0].other_site(id);
            if !neighbors.contains(&other) {
                neighbors.push(other);
            }
        }
        Ok(neighbors)
    }

    /// Visible edges bounding one site
    pub fn boundary_segments(&self, id: SiteId) -> Result<Vec<LineSegment>> {
        let site = self.check(id)?;
        Ok(site
            .edges
            .iter()
            .filter_map(|e| self.edges[e.0].voronoi_segment())
            .collect())
    }

    /// All visible Voronoi segments
    pub fn line_segments(&self) -> Vec<LineSegment> {
        self.edges.iter().filter_map(Edge::voronoi_segment).collect()
    }

    /// Delaunay edges, one per bisector
    pub fn delaunay_lines(&self) -> Vec<LineSegment> {
        self.edges.iter().map(|e| e.delaunay_line(&self.sites)).collect()
    }

    /// Bisectors between neighbouring hull sites
    pub fn hull_edges(&self) -> Vec<EdgeId> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_part_of_convex_hull())
            .map(|(i, _)| EdgeId(i))
            .collect()
    }

    /// Convex hull sites, chained by shared sites
    pub fn hull_points_in_order(&self) -> Vec<Vec2> {
        let hull = self.hull_edges();
        reorder_edges(&hull, |id| {
            let edge = &self.edges[id.0];
            Some((edge.left_site, edge.right_site))
        })
        .into_iter()
        .map(|(id, side)| self.sites[self.edges[id.0].site(side).0].coord)
        .collect()
    }

    /// Largest site-centred circle inside each region
    ///
    /// Half the distance to the nearest neighbour; zero when that neighbour
    /// sits across a hull edge or the site has none.
    pub fn circles(&self) -> Vec<Circle> {
        self.sites
            .iter()
            .map(|site| {
                let nearest = site.edges.iter().map(|e| &self.edges[e.0]).min_by(|a, b| {
                    a.sites_distance(&self.sites)
                        .total_cmp(&b.sites_distance(&self.sites))
                });
                let radius = match nearest {
                    Some(edge) if !edge.is_part_of_convex_hull() => edge.sites_distance(&self.sites) * 0.5,
                    _ => 0.0,
                };
                Circle {
                    center: site.coord,
                    radius,
                }
            })
            .collect()
    }

    /// The site whose region contains `p`, by linear scan
    pub fn find_site_containing(&self, p: Vec2) -> Option<SiteId> {
        self.sites
            .iter()
            .enumerate()
            .find(|(_, site)| {
                let region = &site.region.get_or_init(|| self.compute_region(site)).points;
                polygon_contains(region, p)
            })
            .map(|(i, _)| SiteId(i))
    }

    /// Site points mapped proportionally onto `bounds`
    ///
    /// Each point records the coordinate it was scaled from.
    pub fn scaled_points(&self, bounds: Rect) -> Vec<SitePoint> {
        let from_min = self.bounds.min();
        let ratio = bounds.size() / self.bounds.size();
        self.sites
            .iter()
            .map(|site| SitePoint {
                position: bounds.min() + (site.coord - from_min) * ratio,
                previous: Some(site.coord),
                color: site.color,
            })
            .collect()
    }

    /// Rebuild with every site scaled onto `bounds`
    pub fn scale(&self, bounds: Rect) -> Result<Self> {
        bounds.validate()?;
        let points = self.scaled_points(bounds);
        log::debug!("scaling {} sites from {:?} to {:?}", points.len(), self.bounds, bounds);
        Self::build_seeded(&points, bounds, self.weight_seed)
    }

    /// Rebuild from new positions, keeping bounds and weight seed
    pub(crate) fn rebuild(&self, points: &[SitePoint]) -> Result<Self> {
        Self::build_seeded(points, self.bounds, self.weight_seed)
    }
}

/// One site per distinct coordinate, in input order
///
/// A later epsilon-equal point replaces the earlier one's data in place.
fn collapse_duplicates(points: &[SitePoint], seed: u64) -> Vec<Site> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut slots: HashMap<CoordKey, usize> = HashMap::with_capacity(points.len());
    let mut sites: Vec<Site> = Vec::with_capacity(points.len());

    for point in points {
        let weight = rng.gen_range(0.0..100.0);
        let existing = CoordKey::of(point.position)
            .neighborhood()
            .filter_map(|key| slots.get(&key).copied())
            .find(|&i| approx_eq(sites[i].coord, point.position));

        match existing {
            Some(i) => {
                let site = &mut sites[i];
                site.coord = point.position;
                site.previous = point.provenance();
                site.color = point.color;
                site.weight = weight;
            }
            None => {
                let index = sites.len();
                slots.insert(CoordKey::of(point.position), index);
                sites.push(Site::new(point.position, point.provenance(), point.color, index, weight));
            }
        }
    }
    sites
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{signed_double_area, Winding};
    use approx::assert_abs_diff_eq;

    fn points(coords: &[(f32, f32)]) -> Vec<SitePoint> {
        coords.iter().map(|&(x, y)| SitePoint::new(x, y)).collect()
    }

    fn square() -> Rect {
        Rect::from_size(100.0, 100.0)
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(matches!(
            Diagram::build(&[], square()),
            Err(MapError::InvalidInput(_))
        ));
        assert!(matches!(
            Diagram::build(&points(&[(f32::NAN, 1.0)]), square()),
            Err(MapError::InvalidInput(_))
        ));
        assert!(Diagram::build(&points(&[(1.0, 1.0)]), Rect::from_size(0.0, 10.0)).is_err());
    }

    #[test]
    fn test_duplicates_collapse() {
        let input = [
            SitePoint::new(10.0, 10.0).with_color(1),
            SitePoint::new(50.0, 50.0),
            SitePoint::new(10.001, 10.0).with_color(2),
        ];
        let diagram = Diagram::build(&input, square()).unwrap();
        assert_eq!(diagram.site_count(), 2);

        let id = diagram.site_at(Vec2::new(10.0, 10.0)).unwrap();
        assert_eq!(diagram.sites()[id.0].color(), Some(2));
    }

    #[test]
    fn test_two_sites_split_the_square() {
        let diagram = Diagram::build(&points(&[(25.0, 50.0), (75.0, 50.0)]), square()).unwrap();

        let left = diagram.site_at(Vec2::new(25.0, 50.0)).unwrap();
        let right = diagram.site_at(Vec2::new(75.0, 50.0)).unwrap();
        assert_eq!(diagram.neighbor_sites(left).unwrap(), vec![right]);

        for id in [left, right] {
            let region = diagram.region(id).unwrap();
            assert_eq!(region.len(), 4);
            assert_abs_diff_eq!(signed_double_area(region), 10_000.0, epsilon = 0.1);
        }
        assert_eq!(diagram.find_site_containing(Vec2::new(10.0, 90.0)), Some(left));
        assert_eq!(diagram.find_site_containing(Vec2::new(90.0, 10.0)), Some(right));
        assert_eq!(diagram.find_site_containing(Vec2::new(150.0, 10.0)), None);
    }

    #[test]
    fn test_single_site_owns_bounds() {
        let diagram = Diagram::build(&points(&[(30.0, 40.0)]), square()).unwrap();
        let region = diagram.region(SiteId(0)).unwrap();
        assert_eq!(region.len(), 4);
        for corner in square().corners() {
            assert!(region.contains(&corner));
        }
        assert!(diagram.line_segments().is_empty());
    }

    #[test]
    fn test_four_sites_meet_in_one_vertex_pair() {
        let diagram = Diagram::build(
            &points(&[(25.0, 25.0), (75.0, 25.0), (25.0, 75.0), (75.0, 80.0)]),
            square(),
        )
        .unwrap();

        assert!(!diagram.vertices().is_empty());
        assert!(!diagram.triangles().is_empty());
        let total: f32 = diagram.regions().iter().map(|r| signed_double_area(r)).sum();
        assert_abs_diff_eq!(total, 20_000.0, epsilon = 1.0);
        for region in diagram.regions() {
            assert_eq!(crate::geometry::winding(region), Winding::CounterClockwise);
        }
    }

    #[test]
    fn test_region_is_cached() {
        let diagram = Diagram::build(&points(&[(20.0, 30.0), (70.0, 60.0), (40.0, 80.0)]), square()).unwrap();
        let first = diagram.region(SiteId(1)).unwrap().as_ptr();
        let second = diagram.region(SiteId(1)).unwrap().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_hull_points_cover_every_site_of_a_triangle() {
        let diagram = Diagram::build(&points(&[(10.0, 10.0), (90.0, 20.0), (50.0, 90.0)]), square()).unwrap();
        assert_eq!(diagram.hull_edges().len(), 3);
        let hull = diagram.hull_points_in_order();
        assert_eq!(hull.len(), 3);
        for coord in diagram.site_coords() {
            assert!(hull.contains(&coord));
        }
    }

    #[test]
    fn test_circles_are_zero_on_hull() {
        let diagram = Diagram::build(&points(&[(25.0, 50.0), (75.0, 50.0)]), square()).unwrap();
        assert!(diagram.circles().iter().all(|c| c.radius == 0.0));
    }

    #[test]
    fn test_unknown_site_is_reported() {
        let diagram = Diagram::build(&points(&[(25.0, 50.0)]), square()).unwrap();
        assert_eq!(diagram.region(SiteId(3)).unwrap_err(), MapError::SiteNotFound(3));
    }

    #[test]
    fn test_scaled_points_are_offset_aware() {
        let diagram = Diagram::build(&points(&[(20.0, 40.0)]), Rect::new(10.0, 20.0, 100.0, 100.0)).unwrap();
        let scaled = diagram.scaled_points(Rect::new(0.0, 0.0, 200.0, 50.0));
        assert_abs_diff_eq!(scaled[0].position.x, 20.0, epsilon = 1e-4);
        assert_abs_diff_eq!(scaled[0].position.y, 10.0, epsilon = 1e-4);
        assert_eq!(scaled[0].previous, Some(Vec2::new(20.0, 40.0)));
    }
}
