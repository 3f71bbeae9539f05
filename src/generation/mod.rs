//! Site generation and relaxation
//!
//! Random seeded placement inside the plot bounds, followed by optional
//! Lloyd passes over the planar diagram.

mod lloyd;
mod points;

pub use lloyd::{lloyd_relaxation, lloyd_relaxation_with_options, LloydOptions};
pub use points::generate_random_points;

use crate::config::MapConfig;
use crate::diagram::Diagram;
use crate::error::Result;

/// Generate the diagram described by `config` (geometry only)
///
/// Places `site_count` random points, builds their diagram and relaxes it.
pub fn generate_diagram(config: &MapConfig) -> Result<Diagram> {
    // Step 1: Random points in the bounds
    let points = generate_random_points(config.site_count, config.bounds, config.seed);

    // Step 2: Sweep
    let diagram = Diagram::build_seeded(&points, config.bounds, config.seed)?;

    // Step 3: Relaxation with convergence detection
    if config.lloyd_iterations == 0 {
        return Ok(diagram);
    }
    let options = LloydOptions {
        max_iterations: config.lloyd_iterations,
        convergence_threshold: config.lloyd_convergence,
    };
    lloyd_relaxation_with_options(&diagram, options)
}
