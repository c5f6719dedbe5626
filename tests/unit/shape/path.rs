use super::*;

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Segment> {
    vec![
        Segment::MoveTo {
            to: Point::new(x0, y0),
        },
        Segment::LineTo {
            to: Point::new(x1, y0),
        },
        Segment::LineTo {
            to: Point::new(x1, y1),
        },
        Segment::LineTo {
            to: Point::new(x0, y1),
        },
        Segment::ClosePath,
    ]
}

#[test]
fn closed_square_validates() {
    let path = BoundaryPath::from_segments(square(0.0, 0.0, 10.0, 10.0));
    assert!(path.validate().is_ok());
    assert_eq!(path.bounding_box(), Rect::new(0.0, 0.0, 10.0, 10.0));
}

#[test]
fn empty_path_is_malformed() {
    let err = BoundaryPath::from_segments(vec![]).validate().unwrap_err();
    assert!(matches!(err, BlobtoneError::MalformedBoundary(_)));
}

#[test]
fn missing_move_to_is_malformed() {
    let path = BoundaryPath::from_segments(vec![
        Segment::LineTo {
            to: Point::new(1.0, 1.0),
        },
        Segment::ClosePath,
    ]);
    assert!(matches!(
        path.validate(),
        Err(BlobtoneError::MalformedBoundary(_))
    ));
}

#[test]
fn unclosed_path_is_malformed() {
    let mut segs = square(0.0, 0.0, 10.0, 10.0);
    segs.pop();
    let err = BoundaryPath::from_segments(segs).validate().unwrap_err();
    assert!(err.to_string().contains("ClosePath"));
}

#[test]
fn non_finite_coordinates_are_malformed() {
    let mut segs = square(0.0, 0.0, 10.0, 10.0);
    segs[2] = Segment::LineTo {
        to: Point::new(f64::NAN, 3.0),
    };
    assert!(matches!(
        BoundaryPath::from_segments(segs).validate(),
        Err(BlobtoneError::MalformedBoundary(_))
    ));
}

#[test]
fn move_close_only_encloses_nothing() {
    let path = BoundaryPath::from_segments(vec![
        Segment::MoveTo {
            to: Point::new(1.0, 1.0),
        },
        Segment::ClosePath,
    ]);
    assert!(path.validate().is_err());
}

#[test]
fn flatten_yields_one_ring_per_subpath() {
    let mut segs = square(0.0, 0.0, 10.0, 10.0);
    segs.extend(square(20.0, 20.0, 30.0, 30.0));
    let rings = BoundaryPath::from_segments(segs).flatten(0.25).unwrap();
    assert_eq!(rings.len(), 2);
    assert_eq!(rings[0].len(), 4);
}

#[test]
fn flatten_subdivides_curves() {
    let path = BoundaryPath::from_segments(vec![
        Segment::MoveTo {
            to: Point::new(0.0, 0.0),
        },
        Segment::CubicCurveTo {
            c1: Point::new(0.0, 100.0),
            c2: Point::new(100.0, 100.0),
            to: Point::new(100.0, 0.0),
        },
        Segment::QuadraticCurveTo {
            c: Point::new(50.0, -50.0),
            to: Point::new(0.0, 0.0),
        },
        Segment::ClosePath,
    ]);
    let rings = path.flatten(0.25).unwrap();
    assert_eq!(rings.len(), 1);
    assert!(rings[0].len() > 10);
}

#[test]
fn flatten_rejects_bad_tolerance() {
    let path = BoundaryPath::from_segments(square(0.0, 0.0, 10.0, 10.0));
    assert!(matches!(
        path.flatten(0.0),
        Err(BlobtoneError::InvalidParameters(_))
    ));
}

#[test]
fn serde_uses_tagged_segments() {
    let path = BoundaryPath::from_segments(square(0.0, 0.0, 1.0, 1.0));
    let json = serde_json::to_string(&path).unwrap();
    assert!(json.starts_with("[{\"kind\":\"move_to\""));
    assert!(json.ends_with("{\"kind\":\"close_path\"}]"));
    let back: BoundaryPath = serde_json::from_str(&json).unwrap();
    assert_eq!(back, path);
}
