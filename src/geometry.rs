//! Planar geometry primitives
//!
//! Value types shared by the sweep, the region clipper and the dual graph.
//! Coordinates are `glam::Vec2`; coincidence tests use [`EPSILON`].

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec2;

use crate::error::{MapError, Result};

/// Tolerance for point coincidence, bounds checks and event tie-breaks
pub const EPSILON: f32 = 0.005;

/// Coordinates this close to the origin count as "unset" provenance
pub(crate) const ORIGIN_PRECISION: f32 = 1e-10;

/// Per-axis epsilon equality
#[inline]
pub fn approx_eq(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

/// Distance-based coincidence used when stitching region boundaries
#[inline]
pub(crate) fn close_enough(a: Vec2, b: Vec2) -> bool {
    a.distance(b) < EPSILON
}

/// Sweep order: ascending y, ties broken by ascending x
pub fn compare_y_then_x(a: Vec2, b: Vec2) -> Ordering {
    if a.y < b.y {
        Ordering::Less
    } else if a.y > b.y {
        Ordering::Greater
    } else if a.x < b.x {
        Ordering::Less
    } else if a.x > b.x {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

#[inline]
pub(crate) fn near_origin(p: Vec2) -> bool {
    p.x.abs() < ORIGIN_PRECISION && p.y.abs() < ORIGIN_PRECISION
}

/// An input point for diagram construction
///
/// Besides its position a point may carry the coordinate it was derived
/// from (relaxation and scaling record it) and an opaque color tag.
/// Equality is epsilon-tolerant on the position only.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct SitePoint {
    pub position: Vec2,
    pub previous: Option<Vec2>,
    pub color: Option<u32>,
}

impl SitePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self::from(Vec2::new(x, y))
    }

    pub fn with_previous(mut self, previous: Vec2) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    /// Provenance used when a site is created from this point
    ///
    /// A missing or origin-valued previous coordinate falls back to the
    /// point's own position.
    pub fn provenance(&self) -> Vec2 {
        match self.previous {
            Some(prev) if !near_origin(prev) => prev,
            _ => self.position,
        }
    }
}

impl From<Vec2> for SitePoint {
    fn from(position: Vec2) -> Self {
        Self {
            position,
            previous: None,
            color: None,
        }
    }
}

impl PartialEq for SitePoint {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.position, other.position)
    }
}

/// Axis-aligned rectangle in screen orientation (y grows downward)
///
/// `top()` is the minimum y and `bottom()` the maximum y.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Inclusive containment test
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// The four corners with positive signed area
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left(), self.top()),
            Vec2::new(self.right(), self.top()),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.left(), self.bottom()),
        ]
    }

    /// Reject empty, negative or non-finite rectangles
    pub fn validate(&self) -> Result<()> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.width <= 0.0 || self.height <= 0.0 {
            return Err(MapError::InvalidInput(format!(
                "bounds must be finite with positive extent (got {:?})",
                self
            )));
        }
        Ok(())
    }
}

/// A clipped or derived line segment
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub p0: Vec2,
    pub p1: Vec2,
}

impl LineSegment {
    pub fn new(p0: Vec2, p1: Vec2) -> Self {
        Self { p0, p1 }
    }

    pub fn length(&self) -> f32 {
        self.p0.distance(self.p1)
    }

    /// True when both endpoints coincide
    pub fn is_degenerate(&self) -> bool {
        approx_eq(self.p0, self.p1)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

/// Polygon orientation by signed area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
    None,
}

/// Twice the signed shoelace area, wrap-around pair included
pub fn signed_double_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let p = points[i];
            let next = points[(i + 1) % n];
            p.x * next.y - next.x * p.y
        })
        .sum()
}

pub fn winding(points: &[Vec2]) -> Winding {
    let area = signed_double_area(points);
    if area < 0.0 {
        Winding::Clockwise
    } else if area > 0.0 {
        Winding::CounterClockwise
    } else {
        Winding::None
    }
}

/// Area-weighted centroid of a simple polygon
///
/// Returns `None` for empty input or when the signed area vanishes.
pub fn polygon_centroid(points: &[Vec2]) -> Option<Vec2> {
    if points.is_empty() {
        return None;
    }
    let n = points.len();
    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p0 = points[i];
        let p1 = points[(i + 1) % n];
        let a = p0.x * p1.y - p1.x * p0.y;
        area += a;
        cx += (p0.x + p1.x) * a;
        cy += (p0.y + p1.y) * a;
    }
    area *= 0.5;
    if area.abs() < ORIGIN_PRECISION {
        return None;
    }
    Some(Vec2::new(cx / (6.0 * area), cy / (6.0 * area)))
}

/// Ray-casting point-in-polygon test with edge-crossing parity
pub fn polygon_contains(points: &[Vec2], p: Vec2) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > p.y) != (pj.y > p.y) && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Which rectangle sides a point lies on, as a 4-bit mask
pub mod bounds_check {
    use super::{Rect, EPSILON};
    use glam::Vec2;

    pub const TOP: u8 = 1;
    pub const BOTTOM: u8 = 2;
    pub const LEFT: u8 = 4;
    pub const RIGHT: u8 = 8;

    pub fn check(p: Vec2, bounds: &Rect) -> u8 {
        let mut value = 0;
        if (p.x - bounds.left()).abs() < EPSILON {
            value |= LEFT;
        }
        if (p.x - bounds.right()).abs() < EPSILON {
            value |= RIGHT;
        }
        if (p.y - bounds.top()).abs() < EPSILON {
            value |= TOP;
        }
        if (p.y - bounds.bottom()).abs() < EPSILON {
            value |= BOTTOM;
        }
        value
    }
}

/// Hashable coordinate cell of side [`EPSILON`]
///
/// Two epsilon-equal points always fall in the same or adjacent cells, so
/// lookups scan the 3x3 neighbourhood and confirm with [`approx_eq`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CoordKey(i64, i64);

impl CoordKey {
    pub(crate) fn of(p: Vec2) -> Self {
        Self(
            (p.x / EPSILON).floor() as i64,
            (p.y / EPSILON).floor() as i64,
        )
    }

    pub(crate) fn neighborhood(self) -> impl Iterator<Item = CoordKey> {
        (-1..=1).flat_map(move |dx| (-1..=1).map(move |dy| CoordKey(self.0 + dx, self.1 + dy)))
    }
}
