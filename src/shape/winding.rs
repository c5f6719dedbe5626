//! Point-in-region classification over flattened boundaries.

use kurbo::{Point, Rect};

use crate::foundation::error::BlobtoneResult;
use crate::shape::path::BoundaryPath;

/// Rule deciding which winding numbers count as "inside".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillRule {
    /// Inside when the winding number is non-zero.
    #[default]
    NonZero,
    /// Inside when the winding number is odd.
    EvenOdd,
}

impl FillRule {
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }
}

/// A boundary flattened once into polygons, ready for repeated point queries.
///
/// Read-only after construction, so it can be shared across rasterizer threads.
#[derive(Clone, Debug)]
pub struct FlatRegion {
    rings: Vec<Vec<Point>>,
    bounds: Rect,
    rule: FillRule,
}

impl FlatRegion {
    pub fn new(path: &BoundaryPath, tolerance: f64, rule: FillRule) -> BlobtoneResult<Self> {
        let rings = path.flatten(tolerance)?;
        Ok(Self::from_rings(rings, rule))
    }

    pub fn from_rings(rings: Vec<Vec<Point>>, rule: FillRule) -> Self {
        let mut bounds: Option<Rect> = None;
        for p in rings.iter().flatten() {
            let r = Rect::from_points(*p, *p);
            bounds = Some(bounds.map_or(r, |b| b.union(r)));
        }
        Self {
            rings,
            bounds: bounds.unwrap_or(Rect::ZERO),
            rule,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn rings(&self) -> &[Vec<Point>] {
        &self.rings
    }

    pub fn winding_number(&self, pt: Point) -> i32 {
        self.rings.iter().map(|r| winding_number_ring(r, pt)).sum()
    }

    pub fn contains(&self, pt: Point) -> bool {
        if pt.x < self.bounds.x0
            || pt.x > self.bounds.x1
            || pt.y < self.bounds.y0
            || pt.y > self.bounds.y1
        {
            return false;
        }
        self.rule.is_inside(self.winding_number(pt))
    }
}

/// Winding number of an implicitly closed ring around `pt`.
///
/// Counts signed crossings of a rightward horizontal ray; upward edges include their start
/// vertex and downward edges their end vertex, so shared vertices are counted once.
fn winding_number_ring(ring: &[Point], pt: Point) -> i32 {
    if ring.len() < 3 {
        return 0;
    }
    let mut winding = 0i32;
    for (i, &a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        if a.y <= pt.y {
            if b.y > pt.y && is_left(a, b, pt) > 0.0 {
                winding += 1;
            }
        } else if b.y <= pt.y && is_left(a, b, pt) < 0.0 {
            winding -= 1;
        }
    }
    winding
}

fn is_left(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y)
}

#[cfg(test)]
#[path = "../../tests/unit/shape/winding.rs"]
mod tests;
