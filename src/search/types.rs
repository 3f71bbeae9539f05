//! A* search types.

use std::cmp::Ordering;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::diagram::SiteId;

/// A queued site in the A* frontier
#[derive(Clone, Debug)]
pub(super) struct FrontierEntry {
    pub site: SiteId,
    pub priority: u64, // cost so far + heuristic
    pub sequence: u64, // insertion order, breaks ties first-in first-out
}

impl Eq for FrontierEntry {}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* search configuration
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Cost of stepping onto a site the search has not reached yet
    pub step_cost: u32,
    /// Cost of stepping onto a site already reached; discourages doubling
    /// back without forbidding it
    pub revisit_cost: u32,
    /// Read walls once at start instead of live while searching
    pub snapshot_walls: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            step_cost: 1,
            revisit_cost: 5,
            snapshot_walls: false,
        }
    }
}

impl SearchConfig {
    /// Freeze wall state when the search starts
    pub fn with_wall_snapshot(mut self) -> Self {
        self.snapshot_walls = true;
        self
    }
}

/// Outcome of one A* run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub start: SiteId,
    pub goal: SiteId,
    /// Predecessor of every reached site; the start maps to itself
    pub came_from: HashMap<SiteId, SiteId>,
    /// Cheapest known cost of every reached site
    pub cost_so_far: HashMap<SiteId, u32>,
    /// Number of sites popped from the frontier
    pub expanded: usize,
}

impl SearchResult {
    /// A result that reached nothing
    pub(crate) fn empty(start: SiteId, goal: SiteId) -> Self {
        Self {
            start,
            goal,
            came_from: HashMap::new(),
            cost_so_far: HashMap::new(),
            expanded: 0,
        }
    }

    /// Whether the goal was reached
    pub fn found(&self) -> bool {
        self.came_from.contains_key(&self.goal)
    }

    /// Sites from start to goal, or `None` when the goal was not reached
    pub fn path(&self) -> Option<Vec<SiteId>> {
        if !self.found() {
            return None;
        }

        let mut path = vec![self.goal];
        let mut current = self.goal;
        while current != self.start {
            let previous = *self.came_from.get(&current)?;
            if previous == current || path.len() > self.came_from.len() {
                return None;
            }
            path.push(previous);
            current = previous;
        }
        path.reverse();
        Some(path)
    }

    /// Path length in steps
    pub fn hop_count(&self) -> Option<usize> {
        self.path().map(|p| p.len().saturating_sub(1))
    }

    pub fn goal_cost(&self) -> Option<u32> {
        self.cost_so_far.get(&self.goal).copied()
    }
}
