use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BlobtoneError::invalid_parameters("x")
            .to_string()
            .contains("invalid parameters:")
    );
    assert!(
        BlobtoneError::malformed_boundary("x")
            .to_string()
            .contains("malformed boundary:")
    );
    assert!(
        BlobtoneError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(BlobtoneError::render("x").to_string().contains("render error:"));
}

#[test]
fn layer_generation_names_layer_and_cause() {
    let err = BlobtoneError::layer_generation(3, BlobtoneError::invalid_parameters("width"));
    let msg = err.to_string();
    assert!(msg.contains("layer 3"));
    assert!(msg.contains("invalid parameters: width"));
    match err {
        BlobtoneError::LayerGeneration { layer, source } => {
            assert_eq!(layer, 3);
            assert!(matches!(*source, BlobtoneError::InvalidParameters(_)));
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BlobtoneError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
