use kurbo::{BezPath, PathEl, Point, Rect, Shape as _};

use crate::foundation::error::{BlobtoneError, BlobtoneResult};

/// Default flattening tolerance in length units.
pub const DEFAULT_FLATTEN_TOLERANCE: f64 = 0.25;

/// One absolute-coordinate segment of a [`BoundaryPath`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Start a new subpath.
    MoveTo { to: Point },
    /// Straight line to `to`.
    LineTo { to: Point },
    /// Cubic Bézier with two control points.
    CubicCurveTo { c1: Point, c2: Point, to: Point },
    /// Quadratic Bézier with one control point.
    QuadraticCurveTo { c: Point, to: Point },
    /// Close the current subpath back to its start.
    ClosePath,
}

impl Segment {
    fn for_each_point(&self, mut f: impl FnMut(Point)) {
        match *self {
            Segment::MoveTo { to } | Segment::LineTo { to } => f(to),
            Segment::CubicCurveTo { c1, c2, to } => {
                f(c1);
                f(c2);
                f(to);
            }
            Segment::QuadraticCurveTo { c, to } => {
                f(c);
                f(to);
            }
            Segment::ClosePath => {}
        }
    }

    fn to_path_el(self) -> PathEl {
        match self {
            Segment::MoveTo { to } => PathEl::MoveTo(to),
            Segment::LineTo { to } => PathEl::LineTo(to),
            Segment::CubicCurveTo { c1, c2, to } => PathEl::CurveTo(c1, c2, to),
            Segment::QuadraticCurveTo { c, to } => PathEl::QuadTo(c, to),
            Segment::ClosePath => PathEl::ClosePath,
        }
    }
}

/// A closed region outline as an ordered, immutable segment sequence.
///
/// Paths built by [`crate::generate_shape`] are always well-formed. Paths supplied from elsewhere
/// (e.g. deserialized) are checked by [`BoundaryPath::validate`] before any rasterization.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BoundaryPath {
    segments: Vec<Segment>,
}

impl BoundaryPath {
    /// Wrap raw segments without validation.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Structural checks: non-empty, starts with `MoveTo`, every subpath closed, finite coordinates.
    pub fn validate(&self) -> BlobtoneResult<()> {
        let Some(first) = self.segments.first() else {
            return Err(BlobtoneError::malformed_boundary("path has no segments"));
        };
        if !matches!(first, Segment::MoveTo { .. }) {
            return Err(BlobtoneError::malformed_boundary(
                "path must start with MoveTo",
            ));
        }

        let mut open = false;
        let mut drawn = 0usize;
        for (idx, seg) in self.segments.iter().enumerate() {
            let mut finite = true;
            seg.for_each_point(|p| finite &= p.x.is_finite() && p.y.is_finite());
            if !finite {
                return Err(BlobtoneError::malformed_boundary(format!(
                    "segment {idx} has non-finite coordinates"
                )));
            }

            match seg {
                Segment::MoveTo { .. } => {
                    if open {
                        return Err(BlobtoneError::malformed_boundary(format!(
                            "segment {idx} starts a subpath before the previous one was closed"
                        )));
                    }
                    open = true;
                }
                Segment::ClosePath => {
                    if !open {
                        return Err(BlobtoneError::malformed_boundary(format!(
                            "segment {idx} closes a subpath that was never started"
                        )));
                    }
                    open = false;
                }
                _ => {
                    if !open {
                        return Err(BlobtoneError::malformed_boundary(format!(
                            "segment {idx} draws outside of a subpath (missing MoveTo)"
                        )));
                    }
                    drawn += 1;
                }
            }
        }

        if open {
            return Err(BlobtoneError::malformed_boundary(
                "path does not end with ClosePath",
            ));
        }
        if drawn == 0 {
            return Err(BlobtoneError::malformed_boundary(
                "path encloses no area (no drawing segments)",
            ));
        }
        Ok(())
    }

    pub fn to_bez_path(&self) -> BezPath {
        BezPath::from_vec(self.segments.iter().map(|s| s.to_path_el()).collect())
    }

    /// Tight bounding box of the curve (not of its control polygon).
    pub fn bounding_box(&self) -> Rect {
        self.to_bez_path().bounding_box()
    }

    /// Validate, then flatten curves into closed polygons (one per subpath).
    pub fn flatten(&self, tolerance: f64) -> BlobtoneResult<Vec<Vec<Point>>> {
        self.validate()?;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(BlobtoneError::invalid_parameters(
                "flatten tolerance must be finite and > 0",
            ));
        }

        let mut rings: Vec<Vec<Point>> = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        let els = self.segments.iter().map(|s| s.to_path_el());
        kurbo::flatten(els, tolerance, |el| match el {
            PathEl::MoveTo(p) => {
                if current.len() > 1 {
                    rings.push(std::mem::take(&mut current));
                }
                current.clear();
                current.push(p);
            }
            PathEl::LineTo(p) => current.push(p),
            PathEl::ClosePath => {
                if current.len() > 1 {
                    rings.push(std::mem::take(&mut current));
                }
                current.clear();
            }
            PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
        });
        if current.len() > 1 {
            rings.push(current);
        }

        if rings.iter().all(|r| r.len() < 3) {
            return Err(BlobtoneError::malformed_boundary(
                "flattened path has no polygon with at least 3 vertices",
            ));
        }
        Ok(rings)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shape/path.rs"]
mod tests;
