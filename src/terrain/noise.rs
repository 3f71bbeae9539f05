//! Grid intensity field

use crate::error::{MapError, Result};

use super::IntensityField;

/// Row-major grid of intensities in 0-255
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseMap {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl NoiseMap {
    /// Wrap `values` (row-major, `width * height` long)
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidInput(format!(
                "noise map must not be empty (got {}x{})",
                width, height
            )));
        }
        if values.len() != width * height {
            return Err(MapError::InvalidInput(format!(
                "noise map of {}x{} needs {} values, got {}",
                width,
                height,
                width * height,
                values.len()
            )));
        }
        Ok(Self { width, height, values })
    }

    /// Build a map by evaluating `f(x, y)` for every cell
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Result<Self> {
        let values = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::new(width, height, values)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        (x < self.width && y < self.height).then(|| self.values[y * self.width + x])
    }

    /// Nearest-neighbour resample to `width` x `height`
    pub fn resampled(&self, width: usize, height: usize) -> Result<Self> {
        let sx = self.width as f64 / width.max(1) as f64;
        let sy = self.height as f64 / height.max(1) as f64;
        Self::from_fn(width, height, |x, y| {
            let src_x = ((x as f64 * sx) as usize).min(self.width - 1);
            let src_y = ((y as f64 * sy) as usize).min(self.height - 1);
            self.values[src_y * self.width + src_x]
        })
    }

    /// Shrink by `factor` in (0, 1]; 1.0 returns a copy
    pub fn scaled(&self, factor: f64) -> Result<Self> {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(MapError::InvalidConfig(format!(
                "noise scale must be in (0, 1] (got {})",
                factor
            )));
        }
        let width = ((self.width as f64 * factor) as usize).max(1);
        let height = ((self.height as f64 * factor) as usize).max(1);
        self.resampled(width, height)
    }
}

impl IntensityField for NoiseMap {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn sample(&self, x: usize, y: usize) -> Option<f64> {
        self.get(x, y)
    }
}
