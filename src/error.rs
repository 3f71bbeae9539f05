//! Error types for Voronoi map generation and queries

use thiserror::Error;

/// Errors that can occur while building, relaxing or querying a map
///
/// Numerical degeneracies (parallel bisectors, unbounded regions) and an
/// exhausted search are not errors; they surface as empty results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Input rejected before any sweep state is allocated
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The sweep lost an internal invariant
    #[error("generation failed: {0}")]
    GenerationFailed(String),
    /// Requested site ID does not exist
    #[error("site not found: {0}")]
    SiteNotFound(usize),
}

/// Result type alias for map operations
pub type Result<T> = std::result::Result<T, MapError>;
