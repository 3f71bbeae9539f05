//! Mesh generation for map graphs
//!
//! Generates engine-agnostic 2D mesh data from the graph's site regions.
//! Every site owns a contiguous vertex range, so a renderer reacting to a
//! "site updated" notification recolors one cell instead of the scene.

mod colors;

pub use colors::{
    display_color, state_color, BasicColorMapper, ColorMapper, CustomColorMapper, SiteColor, STATE_PRECEDENCE,
};

use std::ops::Range;

use glam::Vec2;

use crate::diagram::SiteId;
use crate::graph::MapGraph;
use crate::terrain::SiteType;

/// Engine-agnostic mesh data output
///
/// Contains raw vertex data suitable for any rendering engine:
/// - Bevy: Convert to `Mesh` with attributes
/// - Godot: Convert to `ArrayMesh`
/// - wgpu: Use directly as vertex buffers
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Vertex positions (2D coordinates)
    pub positions: Vec<[f32; 2]>,
    /// Vertex colors (RGBA)
    pub colors: Vec<[f32; 4]>,
    /// Triangle indices
    pub indices: Vec<u32>,
    /// Vertex range of each site; empty for sites without a region
    pub site_ranges: Vec<Range<usize>>,
}

impl MeshData {
    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Vertex range of one site
    pub fn site_range(&self, id: SiteId) -> Option<Range<usize>> {
        self.site_ranges.get(id.0).cloned()
    }

    /// Repaint one site's vertices from its current state
    ///
    /// Returns false for unknown sites.
    pub fn recolor_site<C>(&mut self, graph: &MapGraph, id: SiteId, color_mapper: &C) -> bool
    where
        C: ColorMapper<SiteType> + ?Sized,
    {
        let (Some(site), Some(range)) = (graph.site(id), self.site_range(id)) else {
            return false;
        };
        let color = display_color(site, color_mapper);
        for slot in &mut self.colors[range] {
            *slot = color;
        }
        true
    }
}

/// Generate mesh from graph with color mapping
///
/// Each site is triangulated as a triangle fan from its coordinate to its
/// region corners. All vertices of a site share its display color.
pub fn generate_mesh<C>(graph: &MapGraph, color_mapper: &C) -> MeshData
where
    C: ColorMapper<SiteType> + ?Sized,
{
    let mut mesh = MeshData::default();

    for site in graph.sites() {
        let start = mesh.positions.len();

        // Skip degenerate regions
        if site.region().len() >= 3 {
            let color = display_color(site, color_mapper);
            triangulate_site(site.coord(), site.region(), color, &mut mesh);
        }

        mesh.site_ranges.push(start..mesh.positions.len());
    }

    mesh
}

/// Triangulate a single site as a triangle fan
fn triangulate_site(center: Vec2, corners: &[Vec2], color: SiteColor, mesh: &mut MeshData) {
    let base_idx = mesh.positions.len() as u32;

    // Add center vertex
    mesh.positions.push(center.to_array());
    mesh.colors.push(color);

    // Add boundary vertices
    for corner in corners {
        mesh.positions.push(corner.to_array());
        mesh.colors.push(color);
    }

    // Create triangle fan indices
    let num_corners = corners.len();
    for i in 0..num_corners {
        let next_i = (i + 1) % num_corners;
        mesh.indices.push(base_idx); // Center
        mesh.indices.push(base_idx + 1 + i as u32); // Current corner
        mesh.indices.push(base_idx + 1 + next_i as u32); // Next corner
    }
}
