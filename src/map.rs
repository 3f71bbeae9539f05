//! The assembled map: diagram, dual graph, terrain and observers
//!
//! [`VoronoiMap`] is the entry point a frontend drives. It owns the current
//! diagram and the graph built from it, reapplies terrain after every
//! rebuild, and reports every site whose flags or terrain it changes to
//! the subscribed channels so a renderer can repaint just that cell.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::MapConfig;
use crate::diagram::{Diagram, SiteId};
use crate::error::{MapError, Result};
use crate::generation::{generate_diagram, lloyd_relaxation};
use crate::geometry::{Rect, SitePoint};
use crate::graph::{MapGraph, SiteState};
use crate::search::{self, AStarSearch, SearchConfig, SearchHandle, SearchResult};
use crate::terrain::{assign_terrain, ElevationThresholds, NoiseMap, ThresholdKind};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// A Voronoi map with live site state
///
/// # Example
///
/// ```
/// use voronoi_map::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(7)
///     .site_count(50)
///     .unwrap()
///     .bounds(Rect::from_size(200.0, 200.0))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let mut map = VoronoiMap::generate(config).unwrap();
/// let updates = map.subscribe();
///
/// let site = map.find_site_containing(glam::Vec2::new(100.0, 100.0)).unwrap();
/// map.add_state(site, SiteState::WALL).unwrap();
/// assert_eq!(updates.try_recv(), Ok(site));
/// ```
#[derive(Debug)]
pub struct VoronoiMap {
    diagram: Diagram,
    graph: Arc<MapGraph>,
    thresholds: ElevationThresholds,
    field: Option<NoiseMap>,
    subscribers: Vec<Sender<SiteId>>,
    current: Option<SiteId>,
    rng: ChaCha8Rng,
    #[cfg(feature = "spatial-index")]
    index: SpatialIndex,
}

impl VoronoiMap {
    /// Generate a map from configuration
    ///
    /// Places and relaxes the sites, then builds the dual graph.
    pub fn generate(config: MapConfig) -> Result<Self> {
        let start = Instant::now();
        let diagram = generate_diagram(&config)?;
        let map = Self::assemble(diagram, config.thresholds, config.seed);
        info!(
            "generated map with {} sites in {:.1}ms",
            map.diagram.site_count(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(map)
    }

    /// Build a map from explicit points
    pub fn from_points(points: &[SitePoint], bounds: Rect) -> Result<Self> {
        let diagram = Diagram::build(points, bounds)?;
        Ok(Self::assemble(diagram, ElevationThresholds::default(), 0))
    }

    fn assemble(diagram: Diagram, thresholds: ElevationThresholds, seed: u64) -> Self {
        let graph = MapGraph::build(&diagram, None);
        Self {
            #[cfg(feature = "spatial-index")]
            index: SpatialIndex::new(&diagram.site_coords()),
            diagram,
            graph: Arc::new(graph),
            thresholds,
            field: None,
            subscribers: Vec::new(),
            current: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn graph(&self) -> &MapGraph {
        &self.graph
    }

    /// Shared handle on the current graph, for background work
    pub fn shared_graph(&self) -> Arc<MapGraph> {
        Arc::clone(&self.graph)
    }

    pub fn bounds(&self) -> Rect {
        self.diagram.bounds()
    }

    pub fn thresholds(&self) -> ElevationThresholds {
        self.thresholds
    }

    pub fn intensity_field(&self) -> Option<&NoiseMap> {
        self.field.as_ref()
    }

    /// Site the agent stands on
    pub fn current_site(&self) -> Option<SiteId> {
        self.current
    }

    /// Receive every site whose flags or terrain change from now on
    pub fn subscribe(&mut self) -> Receiver<SiteId> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, id: SiteId) {
        // Dropped receivers unsubscribe
        self.subscribers.retain(|tx| tx.send(id).is_ok());
    }

    fn notify_all(&mut self, ids: impl IntoIterator<Item = SiteId>) {
        for id in ids {
            self.notify(id);
        }
    }

    // ----- rebuilds -----

    /// Run `iterations` Lloyd passes, rebuilding the graph after each
    ///
    /// Flags and terrain carry over to the relaxed sites. Sites only record
    /// the coordinate of the pass before, so the graph follows every pass.
    pub fn relax(&mut self, iterations: usize) -> Result<()> {
        let start = Instant::now();
        for _ in 0..iterations {
            let relaxed = lloyd_relaxation(&self.diagram, 1)?;
            self.replace_diagram(relaxed);
        }
        debug!(
            "relaxed {} sites x{} in {:.1}ms",
            self.diagram.site_count(),
            iterations,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }

    /// Scale every site onto new bounds and rebuild
    ///
    /// The intensity field is resampled to the new size alongside.
    pub fn scale(&mut self, bounds: Rect) -> Result<()> {
        let scaled = self.diagram.scale(bounds)?;
        if let Some(field) = &self.field {
            let width = (bounds.width as usize).max(1);
            let height = (bounds.height as usize).max(1);
            self.field = Some(field.resampled(width, height)?);
        }
        self.replace_diagram(scaled);
        Ok(())
    }

    fn replace_diagram(&mut self, diagram: Diagram) {
        let graph = MapGraph::build(&diagram, Some(&*self.graph));
        #[cfg(feature = "spatial-index")]
        {
            self.index = SpatialIndex::new(&diagram.site_coords());
        }
        self.diagram = diagram;
        // A search still running keeps the graph it started on
        self.graph = Arc::new(graph);
        self.current = self.graph.sites_with(SiteState::CURRENT).first().copied();
        self.reassign_terrain();
    }

    // ----- terrain -----

    /// Install an intensity field, shrunk by `scale` in (0, 1]
    pub fn set_intensity_field(&mut self, field: NoiseMap, scale: f64) -> Result<()> {
        self.field = Some(field.scaled(scale)?);
        self.reassign_terrain();
        Ok(())
    }

    pub fn set_thresholds(&mut self, thresholds: ElevationThresholds) -> Result<()> {
        thresholds.validate()?;
        self.thresholds = thresholds;
        self.reassign_terrain();
        Ok(())
    }

    /// Move one cut point and reclassify
    pub fn set_threshold(&mut self, kind: ThresholdKind, value: u8) -> Result<()> {
        let mut thresholds = self.thresholds;
        thresholds.set(kind, value)?;
        self.set_thresholds(thresholds)
    }

    fn reassign_terrain(&mut self) {
        let Some(field) = &self.field else {
            return;
        };
        let bounds = self.diagram.bounds();
        let changed = assign_terrain(&self.graph, field, &self.thresholds, bounds);
        self.notify_all(changed);
    }

    // ----- queries -----

    pub fn find_site_containing(&self, p: Vec2) -> Option<SiteId> {
        self.graph.find_site_containing(p)
    }

    /// Nearest site to `p`; inside the plot this is the containing site
    #[cfg(feature = "spatial-index")]
    pub fn nearest_site(&self, p: Vec2) -> Option<SiteId> {
        self.index.nearest(p)
    }

    // ----- state flags -----

    /// Set flags on a site, notifying subscribers when that changed anything
    pub fn add_state(&mut self, id: SiteId, flags: SiteState) -> Result<bool> {
        let changed = self.graph.add_state(id, flags)?;
        if changed {
            self.notify(id);
        }
        Ok(changed)
    }

    /// Clear flags on a site, notifying subscribers when that changed anything
    pub fn remove_state(&mut self, id: SiteId, flags: SiteState) -> Result<bool> {
        let changed = self.graph.remove_state(id, flags)?;
        if changed {
            self.notify(id);
        }
        Ok(changed)
    }

    /// Move the hover highlight; `None` clears it
    pub fn set_hover(&mut self, id: Option<SiteId>) -> Result<()> {
        if let Some(id) = id {
            self.graph.state(id)?;
        }
        let cleared = self.graph.clear_state(SiteState::HOVER);
        self.notify_all(cleared);
        if let Some(id) = id {
            self.add_state(id, SiteState::HOVER)?;
        }
        Ok(())
    }

    // ----- agent -----

    /// Put the agent on `id`
    ///
    /// The site becomes `VISITED | CURRENT`; the site left behind loses
    /// `CURRENT`.
    pub fn enter_site(&mut self, id: SiteId) -> Result<()> {
        self.graph.state(id)?;
        if let Some(previous) = self.current.filter(|&p| p != id) {
            self.remove_state(previous, SiteState::CURRENT)?;
        }
        self.add_state(id, SiteState::VISITED | SiteState::CURRENT)?;
        self.current = Some(id);
        Ok(())
    }

    /// Step the agent onto a random passable neighbour
    ///
    /// # Returns
    ///
    /// The site entered, or `None` when there is no agent or nowhere to go
    pub fn move_to_random_neighbor(&mut self) -> Result<Option<SiteId>> {
        let Some(current) = self.current else {
            return Ok(None);
        };
        let options: Vec<SiteId> = self
            .graph
            .neighbors(current)?
            .iter()
            .copied()
            .filter(|&n| self.graph.is_passable(n).unwrap_or(false))
            .collect();
        let Some(&next) = options.choose(&mut self.rng) else {
            debug!("agent at {:?} is boxed in", current);
            return Ok(None);
        };
        self.enter_site(next)?;
        Ok(Some(next))
    }

    // ----- search -----

    /// Start a search on a background thread
    ///
    /// Progress arrives on the handle, not on this map's subscribers.
    pub fn search(&self, start: SiteId, goal: SiteId, config: SearchConfig) -> Result<SearchHandle> {
        self.graph.state(start)?;
        self.graph.state(goal)?;
        Ok(search::spawn_search(self.shared_graph(), start, goal, config))
    }

    /// Search on the calling thread, notifying subscribers as it goes
    pub fn search_blocking(&mut self, start: SiteId, goal: SiteId, config: SearchConfig) -> Result<SearchResult> {
        let mut touched = Vec::new();
        let result = AStarSearch::new(&self.graph, config).run(start, goal, |id| touched.push(id))?;
        self.notify_all(touched);
        Ok(result)
    }

    /// Flag the result's path with `PATH`
    pub fn mark_path(&mut self, result: &SearchResult) -> Result<Vec<SiteId>> {
        if result.start.0 >= self.graph.site_count() {
            return Err(MapError::SiteNotFound(result.start.0));
        }
        let marked = search::mark_path(&self.graph, result);
        self.notify_all(marked.iter().copied());
        Ok(marked)
    }

    /// Remove every search flag
    pub fn clear_search_state(&mut self) -> Vec<SiteId> {
        let cleared = search::clear_search_state(&self.graph);
        self.notify_all(cleared.iter().copied());
        cleared
    }
}
