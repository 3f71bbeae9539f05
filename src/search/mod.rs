//! A* search over the site graph
//!
//! The search walks site adjacency, skipping walls and impassable terrain,
//! and marks its progress on the graph (`FRONTIER` on enqueue, `VISITED` on
//! expansion). Every flag change is reported through a callback so a
//! renderer can repaint just that cell.
//!
//! [`spawn_search`] runs a search on its own thread. Progress arrives on the
//! handle's update channel and exactly one result on its completion channel,
//! even if the search fails internally.

mod types;

pub use types::{SearchConfig, SearchResult};

use std::collections::{BinaryHeap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, trace};

use crate::diagram::SiteId;
use crate::error::{MapError, Result};
use crate::graph::{MapGraph, SiteState};

use types::FrontierEntry;

/// A* search bound to one graph
pub struct AStarSearch<'a> {
    graph: &'a MapGraph,
    config: SearchConfig,
}

impl<'a> AStarSearch<'a> {
    pub fn new(graph: &'a MapGraph, config: SearchConfig) -> Self {
        Self { graph, config }
    }

    /// Create with default costs
    pub fn with_defaults(graph: &'a MapGraph) -> Self {
        Self::new(graph, SearchConfig::default())
    }

    /// Search from `start` to `goal`
    ///
    /// # Arguments
    ///
    /// * `start` - Site the search expands first
    /// * `goal` - Site that ends the search when expanded
    /// * `on_update` - Called with every site whose flags the search changed
    ///
    /// # Returns
    ///
    /// `Result<SearchResult>` - Predecessor and cost maps; the goal is
    /// missing from them when no path exists. `SiteNotFound` for unknown ids.
    pub fn run<F>(&self, start: SiteId, goal: SiteId, mut on_update: F) -> Result<SearchResult>
    where
        F: FnMut(SiteId),
    {
        for id in [start, goal] {
            if self.graph.site(id).is_none() {
                return Err(MapError::SiteNotFound(id.0));
            }
        }
        trace!("[AStar] search: start={:?} goal={:?}", start, goal);

        let walls: Option<Vec<bool>> = self
            .config
            .snapshot_walls
            .then(|| self.graph.sites().iter().map(|s| !s.is_passable()).collect());
        let blocked = |id: SiteId| match &walls {
            Some(snapshot) => snapshot.get(id.0).copied().unwrap_or(true),
            None => !self.graph.is_passable(id).unwrap_or(false),
        };

        let mut mark = |id: SiteId, add: SiteState, remove: SiteState| {
            let removed = self.graph.remove_state(id, remove).unwrap_or(false);
            let added = self.graph.add_state(id, add).unwrap_or(false);
            if removed || added {
                on_update(id);
            }
        };
        mark(start, SiteState::SEARCH_START, SiteState::NONE);
        mark(goal, SiteState::SEARCH_GOAL, SiteState::NONE);

        let mut result = SearchResult::empty(start, goal);
        let mut frontier = BinaryHeap::new();
        let mut sequence = 0u64;

        frontier.push(FrontierEntry {
            site: start,
            priority: 0,
            sequence,
        });
        result.came_from.insert(start, start);
        result.cost_so_far.insert(start, 0);

        while let Some(current) = frontier.pop() {
            let site = current.site;
            result.expanded += 1;
            mark(site, SiteState::VISITED, SiteState::FRONTIER);

            if site == goal {
                debug!(
                    "[AStar] reached goal {:?} after expanding {} sites",
                    goal, result.expanded
                );
                return Ok(result);
            }

            let current_cost = result.cost_so_far.get(&site).copied().unwrap_or(0);
            for &next in self.graph.neighbors(site)? {
                if blocked(next) {
                    continue;
                }

                let new_cost = current_cost + self.cost(&result.cost_so_far, next);
                let known = result.cost_so_far.get(&next).copied();
                if known.is_some_and(|cost| new_cost >= cost) {
                    continue;
                }

                result.cost_so_far.insert(next, new_cost);
                result.came_from.insert(next, site);
                sequence += 1;
                frontier.push(FrontierEntry {
                    site: next,
                    priority: u64::from(new_cost) + self.heuristic(next, goal),
                    sequence,
                });
                mark(next, SiteState::FRONTIER, SiteState::NONE);
            }
        }

        debug!(
            "[AStar] no path from {:?} to {:?} after expanding {} sites",
            start, goal, result.expanded
        );
        Ok(result)
    }

    /// Step cost onto `next`; sites already reached cost more
    fn cost(&self, reached: &HashMap<SiteId, u32>, next: SiteId) -> u32 {
        if reached.contains_key(&next) {
            self.config.revisit_cost
        } else {
            self.config.step_cost
        }
    }

    /// Manhattan distance between site coordinates, truncated
    fn heuristic(&self, from: SiteId, to: SiteId) -> u64 {
        self.graph.manhattan(from, to).map_or(0, |d| d as u64)
    }
}

/// Handle on a background search
///
/// Dropping the handle detaches the worker; it still runs to completion.
pub struct SearchHandle {
    updates: Receiver<SiteId>,
    completion: Receiver<SearchResult>,
    worker: Option<JoinHandle<()>>,
}

impl SearchHandle {
    /// Sites whose flags changed, in order; idempotent repaint hints
    pub fn updates(&self) -> &Receiver<SiteId> {
        &self.updates
    }

    /// The single terminal notification
    pub fn completion(&self) -> &Receiver<SearchResult> {
        &self.completion
    }

    /// The result if the search has finished
    pub fn try_result(&self) -> Option<SearchResult> {
        match self.completion.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Block until the search completes
    pub fn wait(mut self) -> Option<SearchResult> {
        let result = self.completion.recv().ok();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("[AStar] search worker panicked after completing");
            }
        }
        result
    }
}

/// Run a search on a background thread
///
/// The graph is only read, apart from the state flags the search sets.
/// Walls placed while it runs are seen or not depending on timing unless
/// `config.snapshot_walls` is set.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use voronoi_map::{spawn_search, Diagram, MapGraph, Rect, SearchConfig, SiteId, SitePoint};
///
/// let points = [SitePoint::new(20.0, 50.0), SitePoint::new(50.0, 50.0), SitePoint::new(80.0, 50.0)];
/// let diagram = Diagram::build(&points, Rect::from_size(100.0, 100.0)).unwrap();
/// let graph = Arc::new(MapGraph::build(&diagram, None));
///
/// let handle = spawn_search(graph, SiteId(0), SiteId(2), SearchConfig::default());
/// let result = handle.wait().unwrap();
/// assert_eq!(result.hop_count(), Some(2));
/// ```
pub fn spawn_search(graph: Arc<MapGraph>, start: SiteId, goal: SiteId, config: SearchConfig) -> SearchHandle {
    let (update_tx, updates) = mpsc::channel();
    let (done_tx, completion) = mpsc::channel();
    let fallback_tx = done_tx.clone();

    let spawned = thread::Builder::new()
        .name("astar-search".to_string())
        .spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                AStarSearch::new(&graph, config).run(start, goal, |id| {
                    // Receiver gone means nobody repaints; keep searching
                    let _ = update_tx.send(id);
                })
            }));

            let result = match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    error!("[AStar] search {:?} -> {:?} failed: {}", start, goal, e);
                    SearchResult::empty(start, goal)
                }
                Err(_) => {
                    error!("[AStar] search {:?} -> {:?} panicked", start, goal);
                    SearchResult::empty(start, goal)
                }
            };
            let _ = done_tx.send(result);
        });

    let worker = match spawned {
        Ok(worker) => Some(worker),
        Err(e) => {
            error!("[AStar] could not start search thread: {}", e);
            let _ = fallback_tx.send(SearchResult::empty(start, goal));
            None
        }
    };

    SearchHandle {
        updates,
        completion,
        worker,
    }
}

/// Flag every site on the result's path with `PATH`
///
/// Returns the sites that changed.
pub fn mark_path(graph: &MapGraph, result: &SearchResult) -> Vec<SiteId> {
    result
        .path()
        .unwrap_or_default()
        .into_iter()
        .filter(|&id| graph.add_state(id, SiteState::PATH).unwrap_or(false))
        .collect()
}

/// Clear everything a search left on the graph
pub fn clear_search_state(graph: &MapGraph) -> Vec<SiteId> {
    graph.clear_state(SiteState::SEARCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use glam::Vec2;

    /// Sites on a line, each linked to the next
    fn chain(n: usize) -> MapGraph {
        let coords = (0..n).map(|i| Vec2::new(i as f32 * 10.0, 0.0)).collect();
        let links = (0..n)
            .map(|i| {
                let mut v = Vec::new();
                if i > 0 {
                    v.push(SiteId(i - 1));
                }
                if i + 1 < n {
                    v.push(SiteId(i + 1));
                }
                v
            })
            .collect();
        MapGraph::from_adjacency(Rect::from_size(100.0, 10.0), coords, links).unwrap()
    }

    #[test]
    fn test_chain_path_and_flags() {
        let graph = chain(5);
        let mut updates = Vec::new();
        let result = AStarSearch::with_defaults(&graph)
            .run(SiteId(0), SiteId(4), |id| updates.push(id))
            .unwrap();

        assert_eq!(result.hop_count(), Some(4));
        assert_eq!(result.goal_cost(), Some(4));
        assert_eq!(result.came_from[&SiteId(0)], SiteId(0));
        assert!(!updates.is_empty());

        let start = graph.state(SiteId(0)).unwrap();
        assert!(start.contains(SiteState::SEARCH_START | SiteState::VISITED));
        let goal = graph.state(SiteId(4)).unwrap();
        assert!(goal.contains(SiteState::SEARCH_GOAL | SiteState::VISITED));
        assert!(!goal.contains(SiteState::FRONTIER));
    }

    #[test]
    fn test_wall_blocks_path() {
        let graph = chain(4);
        graph.add_state(SiteId(2), SiteState::WALL).unwrap();
        let result = AStarSearch::with_defaults(&graph).run(SiteId(0), SiteId(3), |_| {}).unwrap();

        assert!(!result.found());
        assert_eq!(result.path(), None);
        assert!(!result.cost_so_far.contains_key(&SiteId(2)));
    }

    #[test]
    fn test_snapshot_ignores_later_walls() {
        let graph = chain(3);
        let search = AStarSearch::new(&graph, SearchConfig::default().with_wall_snapshot());
        // The wall lands once the start is expanded, after the snapshot
        let result = search
            .run(SiteId(0), SiteId(2), |id| {
                if id == SiteId(1) {
                    let _ = graph.add_state(SiteId(2), SiteState::WALL);
                }
            })
            .unwrap();
        assert!(result.found());
    }

    #[test]
    fn test_unknown_sites_are_errors() {
        let graph = chain(2);
        let err = AStarSearch::with_defaults(&graph).run(SiteId(0), SiteId(7), |_| {});
        assert_eq!(err.unwrap_err(), MapError::SiteNotFound(7));
    }

    #[test]
    fn test_background_search_signals_completion() {
        let graph = Arc::new(chain(6));
        let handle = spawn_search(Arc::clone(&graph), SiteId(5), SiteId(0), SearchConfig::default());
        let result = handle.wait().unwrap();
        assert_eq!(result.hop_count(), Some(5));
    }

    #[test]
    fn test_background_failure_still_completes() {
        let graph = Arc::new(chain(2));
        let handle = spawn_search(graph, SiteId(0), SiteId(42), SearchConfig::default());
        let result = handle.wait().unwrap();
        assert!(!result.found());
        assert!(result.came_from.is_empty());
    }

    #[test]
    fn test_mark_and_clear() {
        let graph = chain(3);
        let result = AStarSearch::with_defaults(&graph).run(SiteId(0), SiteId(2), |_| {}).unwrap();
        assert_eq!(mark_path(&graph, &result).len(), 3);
        assert_eq!(graph.sites_with(SiteState::PATH).len(), 3);

        let cleared = clear_search_state(&graph);
        assert_eq!(cleared.len(), 3);
        assert!(graph.sites().iter().all(|s| !s.state().intersects(SiteState::SEARCH)));
    }
}
