//! Axis-aligned rectangle math
//!
//! Rectangles may have infinite extents: a clipping area that only clips
//! horizontally is represented with `y = -inf` and `height = inf`. Far edges
//! of such rectangles evaluate to `NaN` (`-inf + inf`) and are filtered out
//! explicitly wherever edges are reduced.

use serde::{Deserialize, Serialize};

/// Rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new Rect
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rect bounded horizontally, unbounded vertically
    pub fn horizontal_band(x: f64, width: f64) -> Self {
        Self::new(x, f64::NEG_INFINITY, width, f64::INFINITY)
    }

    /// Rect bounded vertically, unbounded horizontally
    pub fn vertical_band(y: f64, height: f64) -> Self {
        Self::new(f64::NEG_INFINITY, y, f64::INFINITY, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if the rect has non-zero dimensions
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Check if a point lies inside the rect (edges inclusive)
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Smallest rect containing both rects
pub fn bounding_rect(a: &Rect, b: &Rect) -> Rect {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    let width = a.right().max(b.right()) - x;
    let height = a.bottom().max(b.bottom()) - y;
    Rect { x, y, width, height }
}

/// Intersection of two rects, `None` when they don't overlap.
///
/// Zero-area overlaps (touching edges) count as no intersection.
pub fn intersection(a: &Rect, b: &Rect) -> Option<Rect> {
    let x = a.x.max(b.x);
    let y = a.y.max(b.y);
    let x2 = nearest_far_edge([a.right(), b.right()]);
    let y2 = nearest_far_edge([a.bottom(), b.bottom()]);

    if x2 > x && y2 > y {
        Some(Rect::new(x, y, x2 - x, y2 - y))
    } else {
        None
    }
}

// NaN edges come from `-inf + inf` and carry no bound
fn nearest_far_edge(edges: [f64; 2]) -> f64 {
    edges
        .into_iter()
        .filter(|edge| !edge.is_nan())
        .fold(f64::INFINITY, f64::min)
}

/// Compare rects after rounding every component to the nearest integer
pub fn rects_match(a: &Rect, b: &Rect) -> bool {
    round_half_up(a.x) == round_half_up(b.x)
        && round_half_up(a.y) == round_half_up(b.y)
        && round_half_up(a.width) == round_half_up(b.width)
        && round_half_up(a.height) == round_half_up(b.height)
}

// -2.5 rounds to -2, the way browsers round layout values
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Check if a rect matches any rect of the array
pub fn matches_any(rect: &Rect, rects: &[Rect]) -> bool {
    rects.iter().any(|candidate| rects_match(rect, candidate))
}

/// Return the rects of `source` that don't match any rect of `filters`
pub fn filter_rect_array_by_rect_array(source: &[Rect], filters: &[Rect]) -> Vec<Rect> {
    source
        .iter()
        .filter(|rect| !matches_any(rect, filters))
        .copied()
        .collect()
}
