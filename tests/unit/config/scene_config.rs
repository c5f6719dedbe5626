use super::*;
use crate::compose::compositor::PresetSelection;
use crate::compose::layer::BlendMode;

#[test]
fn empty_object_uses_defaults() {
    let cfg = SceneConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, SceneConfig::default());
    cfg.validate().unwrap();
    assert_eq!(cfg.preset_provider().unwrap(), PresetProvider::builtin());
    assert_eq!(cfg.compositor.layer_count, 5);
    assert_eq!(cfg.compositor.blend_modes, [BlendMode::Multiply]);
}

#[test]
fn partial_config_overrides_selected_fields() {
    let json = r#"{
        "compositor": {
            "layer_count": 3,
            "auto_refresh": true,
            "refresh_interval_ms": 2500,
            "container": { "width": 640, "height": 480 },
            "preset_selection": "random",
            "transform_ranges": { "opacity": { "min": 0.1, "max": 0.2 } }
        },
        "halftone": { "grid_spacing": 12, "fill_rule": "even_odd" },
        "presets": [
            { "name": "only", "shape": { "width": 100, "height": 80, "point_count": 5, "randomness": 0.2 } }
        ]
    }"#;
    let cfg = SceneConfig::from_json_str(json).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.compositor.layer_count, 3);
    assert!(cfg.compositor.auto_refresh);
    assert_eq!(cfg.compositor.preset_selection, PresetSelection::Random);
    assert_eq!(cfg.compositor.transform_ranges.opacity.max, 0.2);
    assert_eq!(cfg.compositor.transform_ranges.scale.min, 0.6);
    assert_eq!(cfg.halftone.grid_spacing, 12.0);
    assert_eq!(cfg.preset_provider().unwrap().len(), 1);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = SceneConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, BlobtoneError::Serde(_)));
}

#[test]
fn invalid_values_fail_validation() {
    let cfg =
        SceneConfig::from_json_str(r#"{ "compositor": { "refresh_interval_ms": 0 } }"#).unwrap();
    assert!(matches!(
        cfg.validate(),
        Err(BlobtoneError::InvalidParameters(_))
    ));

    let cfg = SceneConfig::from_json_str(
        r#"{ "presets": [ { "name": "p", "shape": { "width": 1, "height": 1, "point_count": 2, "randomness": 0 } } ] }"#,
    )
    .unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn missing_file_reports_path() {
    let err = SceneConfig::from_path("definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("definitely/not/here.json"));
}

#[test]
fn pretty_json_parses_back() {
    let cfg = SceneConfig::default();
    let text = cfg.to_json_pretty().unwrap();
    assert_eq!(SceneConfig::from_json_str(&text).unwrap(), cfg);
}

#[test]
fn builds_seeded_compositor() {
    let mut cfg = SceneConfig::default();
    cfg.compositor.layer_count = 1;
    cfg.compositor.container = crate::foundation::core::Size::new(200.0, 200.0);
    cfg.halftone.grid_spacing = 20.0;
    let c = cfg.build_compositor(3).unwrap();
    let out = c.regenerate().unwrap();
    assert_eq!(out.scene.layers.len(), 1);
}
