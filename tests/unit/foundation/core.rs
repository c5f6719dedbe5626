use super::*;

#[test]
fn size_validation_rejects_degenerate_dimensions() {
    assert!(Size::new(10.0, 5.0).validate("box").is_ok());
    assert!(Size::new(0.0, 5.0).validate("box").is_err());
    assert!(Size::new(10.0, -1.0).validate("box").is_err());
    assert!(Size::new(f64::NAN, 5.0).validate("box").is_err());
    assert!(Size::new(10.0, f64::INFINITY).validate("box").is_err());
}

#[test]
fn rgba8_serializes_as_array() {
    let c = Rgba8::new(1, 2, 3, 4);
    assert_eq!(serde_json::to_string(&c).unwrap(), "[1,2,3,4]");
    let back: Rgba8 = serde_json::from_str("[10,20,30,255]").unwrap();
    assert_eq!(back, Rgba8::rgb(10, 20, 30));
}

#[test]
fn premultiply_scales_channels_by_alpha() {
    let p = Rgba8::new(255, 128, 0, 128).premultiply();
    assert_eq!(p.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8::WHITE.premultiply().to_array(), [255, 255, 255, 255]);
}
