//! Lloyd's Relaxation for uniform site distribution
//!
//! Each pass moves every site to the centroid of its clipped region and
//! rebuilds the diagram from scratch, rounding the cells out.

use std::time::Instant;

use glam::Vec2;

use crate::diagram::Diagram;
use crate::error::Result;
use crate::geometry::{polygon_centroid, SitePoint, ORIGIN_PRECISION};

/// Options for Lloyd's relaxation algorithm
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LloydOptions {
    /// Maximum number of passes to run
    pub max_iterations: usize,
    /// Stop once no site moves further than this
    /// Set to 0.0 to always run every pass
    pub convergence_threshold: f32,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1,
            convergence_threshold: 0.0,
        }
    }
}

/// Relax `diagram` for exactly `iterations` passes
///
/// # Arguments
///
/// * `diagram` - Diagram to relax; its bounds are kept
/// * `iterations` - Number of passes (0 returns an identical rebuild)
///
/// # Returns
///
/// `Result<Diagram>` - The rebuilt diagram with the same site count
///
/// # Example
///
/// ```
/// use voronoi_map::{generate_random_points, lloyd_relaxation, Diagram, Rect};
///
/// let bounds = Rect::from_size(200.0, 200.0);
/// let diagram = Diagram::build(&generate_random_points(30, bounds, 1), bounds).unwrap();
/// let relaxed = lloyd_relaxation(&diagram, 2).unwrap();
/// assert_eq!(relaxed.site_count(), diagram.site_count());
/// ```
pub fn lloyd_relaxation(diagram: &Diagram, iterations: usize) -> Result<Diagram> {
    let options = LloydOptions {
        max_iterations: iterations,
        ..Default::default()
    };
    lloyd_relaxation_with_options(diagram, options)
}

/// Relax with early exit once the largest displacement drops below the
/// convergence threshold
pub fn lloyd_relaxation_with_options(diagram: &Diagram, options: LloydOptions) -> Result<Diagram> {
    let total_start = Instant::now();
    log::debug!(
        "lloyd: {} sites, max {} iterations, threshold {:.4}",
        diagram.site_count(),
        options.max_iterations,
        options.convergence_threshold
    );

    let mut current = diagram.rebuild(&diagram.site_points())?;
    let mut iterations_run = 0;
    let mut converged = false;

    for iteration in 0..options.max_iterations {
        let iter_start = Instant::now();
        let (points, max_displacement) = relaxed_points(&current);
        current = current.rebuild(&points)?;
        iterations_run = iteration + 1;

        log::trace!(
            "lloyd: iteration {} took {:?}, max displacement {:.4}",
            iterations_run,
            iter_start.elapsed(),
            max_displacement
        );

        if options.convergence_threshold > 0.0 && max_displacement < options.convergence_threshold {
            converged = true;
            break;
        }
    }

    log::debug!(
        "lloyd: finished {} of {} iterations, converged={}, total {:?}",
        iterations_run,
        options.max_iterations,
        converged,
        total_start.elapsed()
    );
    Ok(current)
}

/// Region centroids of every site, plus the largest move
///
/// Sites without a usable region stay put. Each new point remembers the
/// coordinate it came from; an axis that sits at zero keeps the older
/// provenance instead.
fn relaxed_points(diagram: &Diagram) -> (Vec<SitePoint>, f32) {
    let regions = diagram.regions();
    let mut max_displacement: f32 = 0.0;

    let points = diagram
        .sites()
        .iter()
        .zip(regions)
        .map(|(site, region)| {
            let position = polygon_centroid(region).unwrap_or(site.coord());
            max_displacement = max_displacement.max(position.distance(site.coord()));

            SitePoint {
                position,
                previous: Some(provenance(site.coord(), site.previous())),
                color: site.color(),
            }
        })
        .collect();

    (points, max_displacement)
}

/// Per axis: the current coordinate, or the older one where it is zero
fn provenance(coord: Vec2, previous: Vec2) -> Vec2 {
    let pick = |now: f32, before: f32| if now.abs() < ORIGIN_PRECISION { before } else { now };
    Vec2::new(pick(coord.x, previous.x), pick(coord.y, previous.y))
}
