use super::*;
use crate::foundation::rng::SplitMix64;
use kurbo::{ParamCurve, Rect};

fn params(point_count: u32, randomness: f64) -> ShapeParams {
    ShapeParams {
        width: 400.0,
        height: 400.0,
        point_count,
        randomness,
    }
}

fn cubic_segments(path: &BoundaryPath) -> Vec<kurbo::CubicBez> {
    let mut from = Point::ZERO;
    let mut out = Vec::new();
    for seg in path.segments() {
        match *seg {
            Segment::MoveTo { to } => from = to,
            Segment::CubicCurveTo { c1, c2, to } => {
                out.push(kurbo::CubicBez::new(from, c1, c2, to));
                from = to;
            }
            _ => {}
        }
    }
    out
}

#[test]
fn path_starts_with_move_to_and_ends_closed() {
    let mut rng = SplitMix64::new(1);
    for n in [3, 4, 7, 8, 31] {
        for r in [0.0, 0.3, 1.0] {
            let path = generate_shape(&params(n, r), &mut rng).unwrap();
            assert!(matches!(path.segments()[0], Segment::MoveTo { .. }));
            assert_eq!(path.segments().last(), Some(&Segment::ClosePath));
            assert_eq!(path.len(), n as usize + 2);
            path.validate().unwrap();
        }
    }
}

#[test]
fn eight_anchors_without_randomness_close_to_start_inside_box() {
    let mut rng = SplitMix64::new(7);
    let path = generate_shape(&params(8, 0.0), &mut rng).unwrap();

    let cubics = cubic_segments(&path);
    assert_eq!(cubics.len(), 8);
    let Segment::MoveTo { to: start } = path.segments()[0] else {
        panic!("first segment must be MoveTo");
    };
    assert!((cubics[7].p3 - start).hypot() < 1e-9);

    let bb = path.bounding_box();
    let slack = 1e-9;
    assert!(bb.x0 >= -slack && bb.y0 >= -slack);
    assert!(bb.x1 <= 400.0 + slack && bb.y1 <= 400.0 + slack);
}

#[test]
fn zero_randomness_approximates_inscribed_ellipse() {
    let p = ShapeParams {
        width: 300.0,
        height: 120.0,
        point_count: 8,
        randomness: 0.0,
    };
    let path = generate_shape(&p, &mut SplitMix64::new(3)).unwrap();
    for cubic in cubic_segments(&path) {
        for k in 0..=10 {
            let pt = cubic.eval(f64::from(k) / 10.0);
            let nx = (pt.x - 150.0) / 150.0;
            let ny = (pt.y - 60.0) / 60.0;
            let r = (nx * nx + ny * ny).sqrt();
            assert!((0.98..=1.0 + 1e-9).contains(&r), "normalized radius {r}");
        }
    }
}

#[test]
fn zero_randomness_does_not_depend_on_rng() {
    let a = generate_shape(&params(12, 0.0), &mut SplitMix64::new(1)).unwrap();
    let b = generate_shape(&params(12, 0.0), &mut SplitMix64::new(999)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn same_seed_same_path() {
    let a = generate_shape(&params(9, 0.6), &mut SplitMix64::new(42)).unwrap();
    let b = generate_shape(&params(9, 0.6), &mut SplitMix64::new(42)).unwrap();
    let c = generate_shape(&params(9, 0.6), &mut SplitMix64::new(43)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn overshoot_is_bounded_by_randomness() {
    let mut rng = SplitMix64::new(5);
    for _ in 0..50 {
        let path = generate_shape(&params(6, 1.0), &mut rng).unwrap();
        let bb = path.bounding_box();
        // Anchors reach at most 2x the half extent; smoothing adds a little on top.
        let allowed = Rect::new(-400.0, -400.0, 800.0, 800.0);
        assert!(allowed.contains(bb.origin()));
        assert!(bb.x1 <= allowed.x1 && bb.y1 <= allowed.y1);
    }
}

#[test]
fn rejects_invalid_parameters() {
    let mut rng = SplitMix64::new(0);
    for bad in [
        params(2, 0.0),
        ShapeParams {
            width: 0.0,
            ..params(5, 0.0)
        },
        ShapeParams {
            height: -3.0,
            ..params(5, 0.0)
        },
        params(5, 1.5),
        params(5, -0.1),
        params(5, f64::NAN),
        params(MAX_POINT_COUNT + 1, 0.0),
        params(u32::MAX, 0.0),
    ] {
        let err = generate_shape(&bad, &mut rng).unwrap_err();
        assert!(matches!(err, BlobtoneError::InvalidParameters(_)), "{bad:?}");
    }
}

#[test]
fn accepts_maximum_point_count() {
    let path = generate_shape(&params(MAX_POINT_COUNT, 0.2), &mut SplitMix64::new(9)).unwrap();
    assert_eq!(path.len(), MAX_POINT_COUNT as usize + 2);
}
