//! Terrain classification
//!
//! Maps an external intensity field (0-255, e.g. a noise image) onto site
//! types through five ascending cut points. Generating the field itself is
//! up to the caller; [`NoiseMap`] is a plain grid container for it.

mod noise;

pub use noise::NoiseMap;

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::diagram::SiteId;
use crate::error::{MapError, Result};
use crate::geometry::Rect;
use crate::graph::{MapGraph, SiteState};

/// Terrain class of a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SiteType {
    /// Not covered by any intensity field
    #[default]
    Unknown,
    Ocean,
    Beach,
    Lowland,
    Highland,
    Mountain,
}

impl SiteType {
    /// Discrete elevation level, 0 (ocean) to 4 (mountain)
    pub fn elevation(&self) -> Option<u8> {
        match self {
            SiteType::Unknown => None,
            SiteType::Ocean => Some(0),
            SiteType::Beach => Some(1),
            SiteType::Lowland => Some(2),
            SiteType::Highland => Some(3),
            SiteType::Mountain => Some(4),
        }
    }

    /// Ocean and mountains cannot be entered
    pub fn is_impassable(&self) -> bool {
        matches!(self, SiteType::Ocean | SiteType::Mountain)
    }
}

/// One of the five cut points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ThresholdKind {
    Ocean,
    Beach,
    Lowland,
    Highland,
    Mountain,
}

/// Ascending intensity cut points
///
/// An intensity at or below `ocean` is ocean, at or below `beach` is beach
/// and so on; anything above `highland` is mountain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElevationThresholds {
    pub ocean: u8,
    pub beach: u8,
    pub lowland: u8,
    pub highland: u8,
    pub mountain: u8,
}

impl Default for ElevationThresholds {
    fn default() -> Self {
        Self {
            ocean: 30,
            beach: 75,
            lowland: 175,
            highland: 240,
            mountain: 255,
        }
    }
}

impl ElevationThresholds {
    /// Create validated thresholds
    ///
    /// # Returns
    ///
    /// `Result<ElevationThresholds>` - `InvalidConfig` unless the cut
    /// points are non-decreasing
    pub fn new(ocean: u8, beach: u8, lowland: u8, highland: u8, mountain: u8) -> Result<Self> {
        let thresholds = Self {
            ocean,
            beach,
            lowland,
            highland,
            mountain,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        let cuts = self.as_array();
        if cuts.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(MapError::InvalidConfig(format!(
                "elevation thresholds must be non-decreasing (got {:?})",
                cuts
            )));
        }
        Ok(())
    }

    pub fn get(&self, kind: ThresholdKind) -> u8 {
        match kind {
            ThresholdKind::Ocean => self.ocean,
            ThresholdKind::Beach => self.beach,
            ThresholdKind::Lowland => self.lowland,
            ThresholdKind::Highland => self.highland,
            ThresholdKind::Mountain => self.mountain,
        }
    }

    /// Change one cut point; rejected (and left unchanged) if the order breaks
    pub fn set(&mut self, kind: ThresholdKind, value: u8) -> Result<()> {
        let mut updated = *self;
        match kind {
            ThresholdKind::Ocean => updated.ocean = value,
            ThresholdKind::Beach => updated.beach = value,
            ThresholdKind::Lowland => updated.lowland = value,
            ThresholdKind::Highland => updated.highland = value,
            ThresholdKind::Mountain => updated.mountain = value,
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn as_array(&self) -> [u8; 5] {
        [self.ocean, self.beach, self.lowland, self.highland, self.mountain]
    }

    pub fn classify(&self, intensity: f64) -> SiteType {
        if intensity <= f64::from(self.ocean) {
            SiteType::Ocean
        } else if intensity <= f64::from(self.beach) {
            SiteType::Beach
        } else if intensity <= f64::from(self.lowland) {
            SiteType::Lowland
        } else if intensity <= f64::from(self.highland) {
            SiteType::Highland
        } else {
            SiteType::Mountain
        }
    }
}

/// A 2D grid of intensities addressed by whole pixel offsets
pub trait IntensityField {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Intensity at a cell, `None` outside the field
    fn sample(&self, x: usize, y: usize) -> Option<f64>;
}

/// Classify every site from the field value under it
///
/// The field's origin sits at the bounds' top-left corner and each site
/// samples the cell at its truncated offset. Sites outside the field keep
/// their terrain.
///
/// # Returns
///
/// The sites whose type or passability changed
pub fn assign_terrain<F>(
    graph: &MapGraph,
    field: &F,
    thresholds: &ElevationThresholds,
    bounds: Rect,
) -> Vec<SiteId>
where
    F: IntensityField + ?Sized,
{
    let mut changed = Vec::new();
    let mut outside = 0;

    for i in 0..graph.site_count() {
        let id = SiteId(i);
        let Some(intensity) = graph
            .site(id)
            .and_then(|site| sample_at(field, site.coord() - bounds.min()))
        else {
            outside += 1;
            continue;
        };

        let site_type = thresholds.classify(intensity);
        if graph.set_terrain(id, site_type) {
            changed.push(id);
        }
    }

    log::debug!(
        "terrain: {} sites reclassified, {} outside the {}x{} field",
        changed.len(),
        outside,
        field.width(),
        field.height()
    );
    changed
}

fn sample_at<F: IntensityField + ?Sized>(field: &F, offset: Vec2) -> Option<f64> {
    if !(offset.x >= 0.0 && offset.y >= 0.0) {
        return None;
    }
    field.sample(offset.x as usize, offset.y as usize)
}

/// The passability flag a site type implies
pub(crate) fn impassable_flag(site_type: SiteType) -> SiteState {
    if site_type.is_impassable() {
        SiteState::IMPASSABLE
    } else {
        SiteState::NONE
    }
}
