//! Planar Voronoi map generation
//!
//! A standalone library for building bounded Voronoi diagrams with
//! Fortune's sweep, relaxing them with Lloyd's algorithm, and driving an
//! interactive map on top: a dual site/corner graph with per-site state
//! flags, terrain from an intensity field, and A* search on a background
//! thread. Rendering is left to the caller; [`generate_mesh`] produces
//! engine-agnostic vertex buffers.
//!
//! # Quick Start
//!
//! ```rust
//! use voronoi_map::*;
//!
//! // Generate a map
//! let config = MapConfigBuilder::new()
//!     .seed(42)
//!     .site_count(150).unwrap()
//!     .bounds(Rect::from_size(400.0, 300.0)).unwrap()
//!     .lloyd_iterations(2).unwrap()
//!     .build().unwrap();
//!
//! let mut map = VoronoiMap::generate(config).unwrap();
//!
//! // Find a path across it
//! let start = map.find_site_containing(Vec2::new(20.0, 20.0)).unwrap();
//! let goal = map.find_site_containing(Vec2::new(380.0, 280.0)).unwrap();
//! let result = map.search_blocking(start, goal, SearchConfig::default()).unwrap();
//! map.mark_path(&result).unwrap();
//!
//! // Generate mesh for rendering
//! let mesh = generate_mesh(map.graph(), &BasicColorMapper);
//! println!("Generated {} triangles", mesh.triangle_count());
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-site lookups using KD-tree
//! - `serde`: Enables serialization support for configuration, geometry and site state

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod diagram;
pub mod generation;
pub mod graph;
pub mod terrain;
pub mod search;
pub mod mesh;
pub mod map;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{MapError, Result};
pub use config::{MapConfig, MapConfigBuilder};
pub use geometry::{Circle, LineSegment, Rect, SitePoint, EPSILON};
pub use diagram::{Diagram, Edge, EdgeId, Side, Site, SiteId, Triangle, Vertex, VertexId};
pub use generation::{generate_diagram, generate_random_points, lloyd_relaxation, lloyd_relaxation_with_options, LloydOptions};
pub use graph::{Corner, CornerId, MapGraph, MapSite, SiteState};
pub use terrain::{assign_terrain, ElevationThresholds, IntensityField, NoiseMap, SiteType, ThresholdKind};
pub use search::{clear_search_state, mark_path, spawn_search, AStarSearch, SearchConfig, SearchHandle, SearchResult};
pub use mesh::{generate_mesh, BasicColorMapper, ColorMapper, CustomColorMapper, MeshData, SiteColor};
pub use map::VoronoiMap;

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::Vec2 for convenience
pub use glam::Vec2;
