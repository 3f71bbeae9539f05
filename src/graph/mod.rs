//! Dual graph over a diagram
//!
//! Two cross-linked adjacency structures: a site graph (one node per cell,
//! linked to the cells it shares a bisector with) and a corner graph (one
//! node per distinct region corner, linked along region boundaries). Each
//! site links to the corners around it, and its region is re-derived from
//! those links so neighbouring cells share the very same corner nodes.
//!
//! Topology is immutable once built; only the per-site terrain and state
//! flags change afterwards, through shared references.

mod state;

pub use state::SiteState;

use std::collections::HashMap;

use glam::Vec2;

use crate::diagram::{Diagram, SiteId};
use crate::error::{MapError, Result};
use crate::geometry::{approx_eq, polygon_contains, CoordKey, Rect};
use crate::terrain::{impassable_flag, SiteType};

use state::{AtomicState, AtomicTerrain};

/// Handle of a corner node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CornerId(pub usize);

/// A cell node of the site graph
#[derive(Debug, Clone)]
pub struct MapSite {
    coord: Vec2,
    previous: Vec2,
    color: Option<u32>,
    site_type: AtomicTerrain,
    state: AtomicState,
    /// Adjacent cells; every link has the same topological weight
    neighbors: Vec<SiteId>,
    /// Cross-links into the corner graph, in region order
    corners: Vec<CornerId>,
    region: Vec<Vec2>,
}

impl MapSite {
    pub fn coord(&self) -> Vec2 {
        self.coord
    }

    /// The coordinate this site was derived from by relaxation or scaling
    pub fn previous(&self) -> Vec2 {
        self.previous
    }

    pub fn color(&self) -> Option<u32> {
        self.color
    }

    pub fn site_type(&self) -> SiteType {
        self.site_type.load()
    }

    pub fn elevation(&self) -> Option<u8> {
        self.site_type().elevation()
    }

    pub fn state(&self) -> SiteState {
        self.state.load()
    }

    pub fn is_passable(&self) -> bool {
        self.state().is_passable()
    }

    pub fn neighbors(&self) -> &[SiteId] {
        &self.neighbors
    }

    pub fn corners(&self) -> &[CornerId] {
        &self.corners
    }

    /// Counter-clockwise region, one point per linked corner
    pub fn region(&self) -> &[Vec2] {
        &self.region
    }
}

/// A region corner node of the corner graph
#[derive(Debug, Clone)]
pub struct Corner {
    coord: Vec2,
    neighbors: Vec<CornerId>,
    sites: Vec<SiteId>,
}

impl Corner {
    pub fn coord(&self) -> Vec2 {
        self.coord
    }

    /// Corners joined to this one by a boundary segment
    pub fn neighbors(&self) -> &[CornerId] {
        &self.neighbors
    }

    /// Sites whose regions touch this corner
    pub fn sites(&self) -> &[SiteId] {
        &self.sites
    }
}

/// The cross-linked site and corner graphs
///
/// Site ids match the [`Diagram`] the graph was built from.
#[derive(Debug, Clone)]
pub struct MapGraph {
    bounds: Rect,
    sites: Vec<MapSite>,
    corners: Vec<Corner>,
    site_lookup: HashMap<CoordKey, SiteId>,
    corner_lookup: HashMap<CoordKey, CornerId>,
}

impl MapGraph {
    /// Build the dual graph of `diagram`
    ///
    /// # Arguments
    ///
    /// * `diagram` - Freshly built diagram
    /// * `previous` - Graph of the diagram this one was derived from; each
    ///   site copies terrain and flags from the node at its previous
    ///   coordinate, when there is one
    pub fn build(diagram: &Diagram, previous: Option<&MapGraph>) -> Self {
        let mut graph = Self {
            bounds: diagram.bounds(),
            sites: Vec::with_capacity(diagram.site_count()),
            corners: Vec::new(),
            site_lookup: HashMap::with_capacity(diagram.site_count()),
            corner_lookup: HashMap::new(),
        };
        let mut carried = 0;

        // Step 1: Site nodes, carrying state forward
        for (i, site) in diagram.sites().iter().enumerate() {
            let earlier = previous.and_then(|g| g.site_at(site.previous()).and_then(|id| g.site(id)));
            let (site_type, state) = match earlier {
                Some(node) => {
                    carried += 1;
                    (node.site_type(), node.state())
                }
                None => (SiteType::Unknown, SiteState::NONE),
            };

            graph.site_lookup.insert(CoordKey::of(site.coord()), SiteId(i));
            graph.sites.push(MapSite {
                coord: site.coord(),
                previous: site.previous(),
                color: site.color(),
                site_type: AtomicTerrain::new(site_type),
                state: AtomicState::new(state),
                // Step 2: Adjacency
                neighbors: diagram.neighbor_sites(SiteId(i)).unwrap_or_default(),
                corners: Vec::new(),
                region: Vec::new(),
            });
        }

        // Step 3: Corner graph from every boundary segment
        let regions = diagram.regions();
        for segment in diagram.line_segments() {
            graph.connect(segment.p0, segment.p1);
        }
        for region in &regions {
            for (i, &p) in region.iter().enumerate() {
                graph.connect(p, region[(i + 1) % region.len()]);
            }
        }

        // Step 4: Cross-links, then regions from the linked corners
        for (i, region) in regions.iter().enumerate() {
            let site = SiteId(i);
            let mut corners: Vec<CornerId> = Vec::with_capacity(region.len());
            for &p in region.iter() {
                let corner = graph.corner_for(p);
                if corners.last() != Some(&corner) && corners.first() != Some(&corner) {
                    corners.push(corner);
                }
            }
            for &corner in &corners {
                graph.corners[corner.0].sites.push(site);
            }
            let node = &mut graph.sites[i];
            node.region = corners.iter().map(|c| graph.corners[c.0].coord).collect();
            node.corners = corners;
        }

        log::debug!(
            "dual graph: {} sites ({} carried over), {} corners",
            graph.sites.len(),
            carried,
            graph.corners.len()
        );
        graph
    }

    /// A site graph with explicit topology and no regions
    ///
    /// For search over hand-made layouts. `neighbors[i]` lists the sites
    /// adjacent to site `i`.
    pub fn from_adjacency(bounds: Rect, coords: Vec<Vec2>, neighbors: Vec<Vec<SiteId>>) -> Result<Self> {
        if coords.len() != neighbors.len() {
            return Err(MapError::InvalidInput(format!(
                "{} sites but {} adjacency lists",
                coords.len(),
                neighbors.len()
            )));
        }
        if let Some(bad) = neighbors.iter().flatten().find(|id| id.0 >= coords.len()) {
            return Err(MapError::SiteNotFound(bad.0));
        }

        let site_lookup = coords
            .iter()
            .enumerate()
            .map(|(i, &c)| (CoordKey::of(c), SiteId(i)))
            .collect();
        let sites = coords
            .into_iter()
            .zip(neighbors)
            .map(|(coord, neighbors)| MapSite {
                coord,
                previous: coord,
                color: None,
                site_type: AtomicTerrain::default(),
                state: AtomicState::default(),
                neighbors,
                corners: Vec::new(),
                region: Vec::new(),
            })
            .collect();

        Ok(Self {
            bounds,
            sites,
            corners: Vec::new(),
            site_lookup,
            corner_lookup: HashMap::new(),
        })
    }

    fn corner_for(&mut self, p: Vec2) -> CornerId {
        if let Some(id) = self.corner_at(p) {
            return id;
        }
        let id = CornerId(self.corners.len());
        self.corners.push(Corner {
            coord: p,
            neighbors: Vec::new(),
            sites: Vec::new(),
        });
        self.corner_lookup.insert(CoordKey::of(p), id);
        id
    }

    /// Link the corners at `a` and `b`, once
    fn connect(&mut self, a: Vec2, b: Vec2) {
        let a = self.corner_for(a);
        let b = self.corner_for(b);
        if a == b || self.corners[a.0].neighbors.contains(&b) {
            return;
        }
        self.corners[a.0].neighbors.push(b);
        self.corners[b.0].neighbors.push(a);
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    pub fn sites(&self) -> &[MapSite] {
        &self.sites
    }

    pub fn site(&self, id: SiteId) -> Option<&MapSite> {
        self.sites.get(id.0)
    }

    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    pub fn corner(&self, id: CornerId) -> Option<&Corner> {
        self.corners.get(id.0)
    }

    /// The site node at `coord`, within epsilon
    pub fn site_at(&self, coord: Vec2) -> Option<SiteId> {
        CoordKey::of(coord)
            .neighborhood()
            .filter_map(|key| self.site_lookup.get(&key).copied())
            .find(|id| approx_eq(self.sites[id.0].coord, coord))
    }

    /// The corner node at `coord`, within epsilon
    pub fn corner_at(&self, coord: Vec2) -> Option<CornerId> {
        CoordKey::of(coord)
            .neighborhood()
            .filter_map(|key| self.corner_lookup.get(&key).copied())
            .find(|id| approx_eq(self.corners[id.0].coord, coord))
    }

    fn node(&self, id: SiteId) -> Result<&MapSite> {
        self.sites.get(id.0).ok_or(MapError::SiteNotFound(id.0))
    }

    pub fn neighbors(&self, id: SiteId) -> Result<&[SiteId]> {
        Ok(&self.node(id)?.neighbors)
    }

    pub fn state(&self, id: SiteId) -> Result<SiteState> {
        Ok(self.node(id)?.state())
    }

    pub fn is_passable(&self, id: SiteId) -> Result<bool> {
        Ok(self.node(id)?.is_passable())
    }

    /// Set flags on a site; `Ok(true)` when that changed anything
    pub fn add_state(&self, id: SiteId, flags: SiteState) -> Result<bool> {
        Ok(self.node(id)?.state.insert(flags))
    }

    /// Clear flags on a site; `Ok(true)` when that changed anything
    pub fn remove_state(&self, id: SiteId, flags: SiteState) -> Result<bool> {
        Ok(self.node(id)?.state.remove(flags))
    }

    /// Clear `flags` everywhere, returning the sites that had any of them
    pub fn clear_state(&self, flags: SiteState) -> Vec<SiteId> {
        self.sites
            .iter()
            .enumerate()
            .filter(|(_, site)| site.state.remove(flags))
            .map(|(i, _)| SiteId(i))
            .collect()
    }

    /// Sites carrying all of `flags`
    pub fn sites_with(&self, flags: SiteState) -> Vec<SiteId> {
        self.sites
            .iter()
            .enumerate()
            .filter(|(_, site)| site.state().contains(flags))
            .map(|(i, _)| SiteId(i))
            .collect()
    }

    /// Reclassify a site; the impassable flag follows the type
    ///
    /// Returns whether the type or the flag changed.
    pub(crate) fn set_terrain(&self, id: SiteId, site_type: SiteType) -> bool {
        let Some(site) = self.sites.get(id.0) else {
            return false;
        };
        let type_changed = site.site_type.store(site_type);
        let flag_changed = if impassable_flag(site_type).is_empty() {
            site.state.remove(SiteState::IMPASSABLE)
        } else {
            site.state.insert(SiteState::IMPASSABLE)
        };
        type_changed || flag_changed
    }

    /// The site whose region contains `p`, by linear scan
    pub fn find_site_containing(&self, p: Vec2) -> Option<SiteId> {
        self.sites
            .iter()
            .position(|site| polygon_contains(&site.region, p))
            .map(SiteId)
    }

    /// Manhattan distance between two site coordinates
    pub fn manhattan(&self, a: SiteId, b: SiteId) -> Result<f32> {
        let d = self.node(a)?.coord - self.node(b)?.coord;
        Ok(d.x.abs() + d.y.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SitePoint;

    fn quad_diagram() -> Diagram {
        let points = [
            SitePoint::new(25.0, 25.0),
            SitePoint::new(75.0, 25.0),
            SitePoint::new(25.0, 75.0),
            SitePoint::new(75.0, 80.0),
        ];
        Diagram::build(&points, Rect::from_size(100.0, 100.0)).unwrap()
    }

    #[test]
    fn test_every_site_gets_a_node() {
        let diagram = quad_diagram();
        let graph = MapGraph::build(&diagram, None);
        assert_eq!(graph.site_count(), diagram.site_count());
        for (i, site) in graph.sites().iter().enumerate() {
            assert_eq!(graph.site_at(site.coord()), Some(SiteId(i)));
            assert!(!site.neighbors().is_empty());
            assert_eq!(site.site_type(), SiteType::Unknown);
        }
    }

    #[test]
    fn test_regions_share_corner_nodes() {
        let graph = MapGraph::build(&quad_diagram(), None);

        // Each rectangle corner belongs to exactly one cell
        for corner in Rect::from_size(100.0, 100.0).corners() {
            let id = graph.corner_at(corner).unwrap();
            assert_eq!(graph.corner(id).unwrap().sites().len(), 1);
        }

        // Interior corners are shared by three cells
        let shared = graph.corners().iter().filter(|c| c.sites().len() >= 3).count();
        assert!(shared >= 1);

        for site in graph.sites() {
            assert_eq!(site.region().len(), site.corners().len());
            for (p, c) in site.region().iter().zip(site.corners()) {
                assert_eq!(*p, graph.corner(*c).unwrap().coord());
            }
        }
    }

    #[test]
    fn test_corner_links_are_symmetric() {
        let graph = MapGraph::build(&quad_diagram(), None);
        for (i, corner) in graph.corners().iter().enumerate() {
            for n in corner.neighbors() {
                assert!(graph.corner(*n).unwrap().neighbors().contains(&CornerId(i)));
            }
        }
    }

    #[test]
    fn test_state_flags() {
        let graph = MapGraph::build(&quad_diagram(), None);
        let id = SiteId(2);
        assert_eq!(graph.add_state(id, SiteState::WALL), Ok(true));
        assert_eq!(graph.add_state(id, SiteState::WALL), Ok(false));
        assert_eq!(graph.is_passable(id), Ok(false));
        assert_eq!(graph.sites_with(SiteState::WALL), vec![id]);

        assert_eq!(graph.clear_state(SiteState::WALL | SiteState::PATH), vec![id]);
        assert_eq!(graph.is_passable(id), Ok(true));
        assert_eq!(graph.add_state(SiteId(99), SiteState::WALL), Err(MapError::SiteNotFound(99)));
    }

    #[test]
    fn test_state_carries_over_by_previous_coordinate() {
        let diagram = quad_diagram();
        let graph = MapGraph::build(&diagram, None);
        let id = graph.site_at(Vec2::new(25.0, 75.0)).unwrap();
        graph.set_terrain(id, SiteType::Mountain);
        graph.add_state(id, SiteState::VISITED).unwrap();

        let scaled = diagram.scale(Rect::from_size(200.0, 200.0)).unwrap();
        let next = MapGraph::build(&scaled, Some(&graph));
        let moved = next.site_at(Vec2::new(50.0, 150.0)).unwrap();
        let node = next.site(moved).unwrap();
        assert_eq!(node.site_type(), SiteType::Mountain);
        assert!(node.state().contains(SiteState::VISITED | SiteState::IMPASSABLE));
        assert_eq!(next.sites_with(SiteState::VISITED), vec![moved]);
    }

    #[test]
    fn test_set_terrain_tracks_passability() {
        let graph = MapGraph::build(&quad_diagram(), None);
        assert!(graph.set_terrain(SiteId(0), SiteType::Ocean));
        assert!(!graph.is_passable(SiteId(0)).unwrap());
        assert!(!graph.set_terrain(SiteId(0), SiteType::Ocean));
        assert!(graph.set_terrain(SiteId(0), SiteType::Beach));
        assert!(graph.is_passable(SiteId(0)).unwrap());
    }

    #[test]
    fn test_find_site_containing_uses_shared_regions() {
        let graph = MapGraph::build(&quad_diagram(), None);
        let id = graph.find_site_containing(Vec2::new(10.0, 10.0)).unwrap();
        assert_eq!(graph.site(id).unwrap().coord(), Vec2::new(25.0, 25.0));
        assert_eq!(graph.find_site_containing(Vec2::new(-5.0, 10.0)), None);
    }
}
