//! Random site placement
//!
//! Points are drawn uniformly inside the plot bounds from a seeded ChaCha8
//! stream, so the same seed always yields the same layout on every platform.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::geometry::{Rect, SitePoint};

/// Generate `count` uniformly distributed points inside `bounds`
///
/// # Arguments
///
/// * `count` - Number of points to generate
/// * `bounds` - Rectangle the points are drawn from
/// * `seed` - Random seed for deterministic placement
///
/// # Returns
///
/// Points with no provenance or color tag
pub fn generate_random_points(count: usize, bounds: Rect, seed: u64) -> Vec<SitePoint> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x = bounds.left() + rng.gen::<f32>() * bounds.width;
            let y = bounds.top() + rng.gen::<f32>() * bounds.height;
            SitePoint::new(x, y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_stay_in_bounds() {
        let bounds = Rect::new(-50.0, 10.0, 200.0, 40.0);
        let points = generate_random_points(500, bounds, 7);

        assert_eq!(points.len(), 500);
        for p in &points {
            assert!(bounds.contains(p.position), "{:?} escaped", p.position);
            assert!(p.previous.is_none());
        }
    }

    #[test]
    fn test_points_are_deterministic() {
        let bounds = Rect::from_size(100.0, 100.0);
        let a = generate_random_points(20, bounds, 12345);
        let b = generate_random_points(20, bounds, 12345);
        let c = generate_random_points(20, bounds, 54321);

        let positions = |v: &[SitePoint]| v.iter().map(|p| p.position).collect::<Vec<_>>();
        assert_eq!(positions(&a), positions(&b));
        assert_ne!(positions(&a), positions(&c));
    }
}
