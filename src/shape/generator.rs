use kurbo::{Point, Vec2};
use rand::Rng;

use crate::foundation::core::Size;
use crate::foundation::error::{BlobtoneError, BlobtoneResult};
use crate::shape::path::{BoundaryPath, Segment};

/// Smallest allowed radius multiplier; keeps anchors off the center so the outline stays simple.
pub const MIN_RADIUS_FACTOR: f64 = 0.1;

/// Largest accepted anchor count.
pub const MAX_POINT_COUNT: u32 = 4096;

/// Catmull-Rom to cubic Bézier handle factor (uniform parameterization, tension 0).
const CATMULL_ROM_HANDLE: f64 = 1.0 / 6.0;

/// Generative envelope of one blob.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeParams {
    /// Nominal ellipse width.
    pub width: f64,
    /// Nominal ellipse height.
    pub height: f64,
    /// Number of anchors around the ellipse, within `[3, MAX_POINT_COUNT]`.
    pub point_count: u32,
    /// Radius variance in `[0, 1]`; 0 yields a smooth ellipse.
    pub randomness: f64,
}

impl ShapeParams {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn validate(&self) -> BlobtoneResult<()> {
        self.size().validate("shape")?;
        if !(3..=MAX_POINT_COUNT).contains(&self.point_count) {
            return Err(BlobtoneError::invalid_parameters(format!(
                "shape point_count must be within [3, {MAX_POINT_COUNT}] (got {})",
                self.point_count
            )));
        }
        if !self.randomness.is_finite() || !(0.0..=1.0).contains(&self.randomness) {
            return Err(BlobtoneError::invalid_parameters(format!(
                "shape randomness must be within [0, 1] (got {})",
                self.randomness
            )));
        }
        Ok(())
    }
}

/// Generate a closed, smooth, randomly perturbed blob outline inside `width × height`.
///
/// Anchors sit at equal angular steps on the inscribed ellipse, each radius scaled by a factor
/// drawn uniformly from `[1 - randomness, 1 + randomness]` (floored at [`MIN_RADIUS_FACTOR`]).
/// Consecutive anchors are joined by Catmull-Rom cubics, so the outline has no corners.
///
/// The result is `MoveTo`, one `CubicCurveTo` per anchor, then `ClosePath`. With `randomness`
/// above 0 the outline may overshoot the nominal box by up to `randomness` times the half extents;
/// it is not cropped.
#[tracing::instrument(skip(rng))]
pub fn generate_shape<R: Rng + ?Sized>(
    params: &ShapeParams,
    rng: &mut R,
) -> BlobtoneResult<BoundaryPath> {
    params.validate()?;

    let center = params.size().center();
    let rx = params.width * 0.5;
    let ry = params.height * 0.5;
    let n = params.point_count as usize;
    let step = std::f64::consts::TAU / n as f64;
    let lo = 1.0 - params.randomness;
    let hi = 1.0 + params.randomness;

    let anchors: Vec<Point> = (0..n)
        .map(|i| {
            let m = rng.gen_range(lo..=hi).max(MIN_RADIUS_FACTOR);
            let (sin, cos) = (step * i as f64).sin_cos();
            center + Vec2::new(rx * m * cos, ry * m * sin)
        })
        .collect();

    let mut segments = Vec::with_capacity(n + 2);
    segments.push(Segment::MoveTo { to: anchors[0] });
    for i in 0..n {
        let p0 = anchors[(i + n - 1) % n];
        let p1 = anchors[i];
        let p2 = anchors[(i + 1) % n];
        let p3 = anchors[(i + 2) % n];
        segments.push(Segment::CubicCurveTo {
            c1: p1 + (p2 - p0) * CATMULL_ROM_HANDLE,
            c2: p2 - (p3 - p1) * CATMULL_ROM_HANDLE,
            to: p2,
        });
    }
    segments.push(Segment::ClosePath);

    Ok(BoundaryPath::from_segments(segments))
}

#[cfg(test)]
#[path = "../../tests/unit/shape/generator.rs"]
mod tests;
