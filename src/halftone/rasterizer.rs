use kurbo::Point;
use rand::Rng;
use rayon::prelude::*;

use crate::foundation::core::{Rgba8, Size};
use crate::foundation::error::{BlobtoneError, BlobtoneResult};
use crate::foundation::rng::SplitMix64;
use crate::shape::path::{BoundaryPath, DEFAULT_FLATTEN_TOLERANCE};
use crate::shape::winding::{FillRule, FlatRegion};

/// Dots with a radius at or below this are not emitted.
pub const VISIBILITY_THRESHOLD: f64 = 0.5;

/// Upper bound on sampled grid points per rasterization.
pub const MAX_GRID_POINTS: usize = 16 * 1024 * 1024;

/// Rasterization density and appearance.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HalftoneParams {
    /// Distance between grid samples on both axes.
    pub grid_spacing: f64,
    /// Largest dot radius; each dot's radius is uniform in `[0, max_dot_radius]`.
    pub max_dot_radius: f64,
    /// Dot fill color (straight alpha).
    pub dot_color: Rgba8,
    /// Fill behind the dots over the layer box; `None` is transparent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Rgba8>,
    /// Maximum positional jitter per axis applied to each grid point.
    pub jitter: f64,
    /// Winding rule used to classify samples against the boundary.
    pub fill_rule: FillRule,
    /// Curve flattening tolerance.
    pub tolerance: f64,
}

impl Default for HalftoneParams {
    fn default() -> Self {
        Self {
            grid_spacing: 10.0,
            max_dot_radius: 5.0,
            dot_color: Rgba8::rgb(32, 32, 48),
            background_color: None,
            jitter: 0.5,
            fill_rule: FillRule::NonZero,
            tolerance: DEFAULT_FLATTEN_TOLERANCE,
        }
    }
}

impl HalftoneParams {
    pub fn validate(&self) -> BlobtoneResult<()> {
        if !self.grid_spacing.is_finite() || self.grid_spacing <= 0.0 {
            return Err(BlobtoneError::invalid_parameters(format!(
                "halftone grid_spacing must be finite and > 0 (got {})",
                self.grid_spacing
            )));
        }
        if !self.max_dot_radius.is_finite() || self.max_dot_radius <= 0.0 {
            return Err(BlobtoneError::invalid_parameters(format!(
                "halftone max_dot_radius must be finite and > 0 (got {})",
                self.max_dot_radius
            )));
        }
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err(BlobtoneError::invalid_parameters(format!(
                "halftone jitter must be finite and >= 0 (got {})",
                self.jitter
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(BlobtoneError::invalid_parameters(format!(
                "halftone tolerance must be finite and > 0 (got {})",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// One stipple dot.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Dot {
    pub center: Point,
    pub radius: f64,
}

/// Rasterization output: dots in row-major grid order plus the params they were made with.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DotField {
    pub dots: Vec<Dot>,
    pub params: HalftoneParams,
}

impl DotField {
    /// A field with no dots, e.g. as a stand-in after a failed rasterization.
    pub fn empty(params: HalftoneParams) -> Self {
        Self {
            dots: Vec::new(),
            params,
        }
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }
}

/// How grid rows are scheduled and where their randomness comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterMode {
    /// One pass over the grid consuming the caller's RNG in row-major order.
    #[default]
    Sequential,
    /// Rows in parallel; one base seed is drawn from the caller's RNG and each row gets its own
    /// [`SplitMix64`] derived from (seed, row). Output is independent of thread count.
    Parallel,
}

/// Rasterize `path` over `bounds` into a halftone dot field, sequentially.
pub fn rasterize<R: Rng + ?Sized>(
    path: &BoundaryPath,
    bounds: Size,
    params: &HalftoneParams,
    rng: &mut R,
) -> BlobtoneResult<DotField> {
    rasterize_with_mode(path, bounds, params, RasterMode::Sequential, rng)
}

/// Rasterize `path` over `bounds`.
///
/// Grid points sit at cell centers `((i + 0.5) * spacing, (j + 0.5) * spacing)`, are jittered by
/// up to `params.jitter` per axis and clamped into `bounds`. Points inside the boundary get a dot
/// whose radius is uniform in `[0, max_dot_radius]`; only radii above [`VISIBILITY_THRESHOLD`] are
/// kept. The radius carries no tonal meaning.
///
/// Parameter errors are reported before the boundary is inspected. A malformed boundary yields
/// [`BlobtoneError::MalformedBoundary`] and no partial field.
#[tracing::instrument(skip(path, params, rng), fields(segments = path.len()))]
pub fn rasterize_with_mode<R: Rng + ?Sized>(
    path: &BoundaryPath,
    bounds: Size,
    params: &HalftoneParams,
    mode: RasterMode,
    rng: &mut R,
) -> BlobtoneResult<DotField> {
    params.validate()?;
    bounds.validate("raster box")?;
    let grid = Grid::new(bounds, params.grid_spacing)?;
    let region = FlatRegion::new(path, params.tolerance, params.fill_rule)?;

    let dots = match mode {
        RasterMode::Sequential => {
            let mut dots = Vec::new();
            for row in 0..grid.rows {
                sample_row(&grid, row, &region, params, rng, &mut dots);
            }
            dots
        }
        RasterMode::Parallel => {
            let seed: u64 = rng.r#gen();
            let rows: Vec<Vec<Dot>> = (0..grid.rows)
                .into_par_iter()
                .map(|row| {
                    let mut row_rng = SplitMix64::derive(seed, row as u64);
                    let mut dots = Vec::new();
                    sample_row(&grid, row, &region, params, &mut row_rng, &mut dots);
                    dots
                })
                .collect();
            rows.concat()
        }
    };

    tracing::debug!(dots = dots.len(), rows = grid.rows, cols = grid.cols, "rasterized");
    Ok(DotField {
        dots,
        params: *params,
    })
}

#[derive(Clone, Copy, Debug)]
struct Grid {
    bounds: Size,
    spacing: f64,
    cols: usize,
    rows: usize,
}

impl Grid {
    fn new(bounds: Size, spacing: f64) -> BlobtoneResult<Self> {
        // Number of cell centers that fall inside [0, extent].
        let count = |extent: f64| ((extent / spacing) + 0.5).floor() as usize;
        let (cols, rows) = match (count(bounds.width), count(bounds.height)) {
            // A box thinner than half a cell on either axis holds no samples.
            (0, _) | (_, 0) => (0, 0),
            counts => counts,
        };
        if cols.saturating_mul(rows) > MAX_GRID_POINTS {
            return Err(BlobtoneError::invalid_parameters(format!(
                "halftone grid of {cols}x{rows} exceeds {MAX_GRID_POINTS} samples"
            )));
        }
        Ok(Self {
            bounds,
            spacing,
            cols,
            rows,
        })
    }
}

fn sample_row<R: Rng + ?Sized>(
    grid: &Grid,
    row: usize,
    region: &FlatRegion,
    params: &HalftoneParams,
    rng: &mut R,
    out: &mut Vec<Dot>,
) {
    let y = (row as f64 + 0.5) * grid.spacing;
    let j = params.jitter;
    for col in 0..grid.cols {
        let x = (col as f64 + 0.5) * grid.spacing;
        let jx = rng.gen_range(-j..=j);
        let jy = rng.gen_range(-j..=j);
        let p = Point::new(
            (x + jx).clamp(0.0, grid.bounds.width),
            (y + jy).clamp(0.0, grid.bounds.height),
        );
        if !region.contains(p) {
            continue;
        }
        let radius = rng.gen_range(0.0..=params.max_dot_radius);
        if radius > VISIBILITY_THRESHOLD {
            out.push(Dot { center: p, radius });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/halftone/rasterizer.rs"]
mod tests;
