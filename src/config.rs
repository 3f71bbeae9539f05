//! Voronoi Map Configuration and Builder
//!
//! This module provides configuration types for deterministic map generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::geometry::Rect;
use crate::terrain::ElevationThresholds;

/// Default plot size, matching a typical window
pub const DEFAULT_BOUNDS: Rect = Rect::from_size(800.0, 600.0);

/// Configuration for deterministic map generation
///
/// The same configuration always produces the identical diagram: site
/// placement, site weights and relaxation all derive from `seed`.
///
/// # Example
///
/// ```rust
/// use voronoi_map::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .site_count(200)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// // Config is serializable (with "serde" feature)
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: MapConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config.seed, restored.seed);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Random seed for point placement and site weights
    pub seed: u64,

    /// Number of random sites to place
    pub site_count: usize,

    /// Plot rectangle the diagram is clipped to
    pub bounds: Rect,

    /// Number of Lloyd's Relaxation passes
    ///
    /// - 0: Random Voronoi cells (irregular)
    /// - 1: Default, removes the worst slivers
    /// - 5+: Near-uniform cells, diminishing returns
    pub lloyd_iterations: usize,

    /// Early-exit threshold for relaxation, in plot units
    ///
    /// Relaxation stops once no site moves farther than this in one pass.
    /// 0.0 runs every pass.
    pub lloyd_convergence: f32,

    /// Intensity cut points used when terrain is assigned
    pub thresholds: ElevationThresholds,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfigBuilder::new().build_unseeded(0)
    }
}

/// Builder for creating MapConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_map::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(12345)
///     .bounds(Rect::from_size(400.0, 300.0))
///     .unwrap()
///     .lloyd_iterations(3)
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.lloyd_iterations, 3);
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    seed: Option<u64>,
    site_count: usize,
    bounds: Rect,
    lloyd_iterations: usize,
    lloyd_convergence: f32,
    thresholds: ElevationThresholds,
}

impl MapConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random
    /// - site_count: 100
    /// - bounds: 800 x 600 at the origin
    /// - lloyd_iterations: 1
    /// - lloyd_convergence: 0.0 (run every pass)
    /// - thresholds: 30 / 75 / 175 / 240 / 255
    pub fn new() -> Self {
        Self {
            seed: None,
            site_count: 100,
            bounds: DEFAULT_BOUNDS,
            lloyd_iterations: 1,
            lloyd_convergence: 0.0,
            thresholds: ElevationThresholds::default(),
        }
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of sites
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for zero
    pub fn site_count(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(MapError::InvalidConfig("site count must be positive".to_string()));
        }
        self.site_count = count;
        Ok(self)
    }

    /// Set the plot rectangle
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for empty or non-finite rectangles
    pub fn bounds(mut self, bounds: Rect) -> Result<Self> {
        bounds
            .validate()
            .map_err(|e| MapError::InvalidConfig(e.to_string()))?;
        self.bounds = bounds;
        Ok(self)
    }

    /// Set the number of Lloyd's Relaxation iterations
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations > 20 (excessive and impractical)
    pub fn lloyd_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations > 20 {
            return Err(MapError::InvalidConfig(format!(
                "Lloyd iterations must be <= 20 (got {})",
                iterations
            )));
        }
        self.lloyd_iterations = iterations;
        Ok(self)
    }

    /// Set the convergence threshold for Lloyd's relaxation
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if threshold is negative or not finite
    pub fn lloyd_convergence(mut self, threshold: f32) -> Result<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(MapError::InvalidConfig(format!(
                "Lloyd convergence threshold must be >= 0 (got {})",
                threshold
            )));
        }
        self.lloyd_convergence = threshold;
        Ok(self)
    }

    /// Set the terrain cut points
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless the cut points are non-decreasing
    pub fn thresholds(mut self, thresholds: ElevationThresholds) -> Result<Self> {
        thresholds.validate()?;
        self.thresholds = thresholds;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random one.
    pub fn build(self) -> Result<MapConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);
        Ok(self.build_unseeded(seed))
    }

    fn build_unseeded(self, fallback_seed: u64) -> MapConfig {
        MapConfig {
            seed: self.seed.unwrap_or(fallback_seed),
            site_count: self.site_count,
            bounds: self.bounds,
            lloyd_iterations: self.lloyd_iterations,
            lloyd_convergence: self.lloyd_convergence,
            thresholds: self.thresholds,
        }
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
