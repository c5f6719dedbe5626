use kurbo::{Affine, Vec2};

use crate::foundation::core::Size;
use crate::halftone::rasterizer::{DotField, HalftoneParams};
use crate::shape::generator::ShapeParams;
use crate::shape::path::BoundaryPath;

/// How a layer's pixels combine with what is already on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Standard source-over.
    Normal,
    /// Darken by multiplying source and destination colors.
    #[default]
    Multiply,
    /// Lighten by inverting, multiplying and inverting again.
    Screen,
}

/// Placement of a layer inside its container.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerTransform {
    /// Top-left of the layer box as a percentage of the container size.
    pub position_pct: Vec2,
    /// Rotation about the layer box center, in degrees.
    pub rotation_deg: f64,
    /// Uniform scale about the layer box center.
    pub scale: f64,
    /// Layer opacity in `[0, 1]`.
    pub opacity: f64,
    pub blend_mode: BlendMode,
    pub z_index: i32,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            position_pct: Vec2::ZERO,
            rotation_deg: 0.0,
            scale: 1.0,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            z_index: 0,
        }
    }
}

impl LayerTransform {
    /// Map layer-local coordinates (the layer box `[0, w] × [0, h]`) into container pixels.
    pub fn to_affine(&self, layer: Size, container: Size) -> Affine {
        let translate = Vec2::new(
            self.position_pct.x / 100.0 * container.width,
            self.position_pct.y / 100.0 * container.height,
        );
        let anchor = layer.center().to_vec2();

        // T(translate) * T(anchor) * R(rot) * S(scale) * T(-anchor)
        Affine::translate(translate)
            * Affine::translate(anchor)
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale(self.scale)
            * Affine::translate(-anchor)
    }
}

/// One blob + halftone instance with its placement.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    /// Name of the preset this layer was sampled from.
    pub preset: String,
    pub shape_params: ShapeParams,
    pub boundary_path: BoundaryPath,
    pub halftone_params: HalftoneParams,
    pub dot_field: DotField,
    pub transform: LayerTransform,
}

impl Layer {
    /// The layer box the dot field was rasterized over.
    pub fn size(&self) -> Size {
        self.shape_params.size()
    }
}

/// A complete, immutable set of layers produced by one regeneration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// Monotonic regeneration counter; 0 for the initial empty scene.
    pub generation: u64,
    pub container: Size,
    pub layers: Vec<Layer>,
}

impl Scene {
    pub fn empty(container: Size) -> Self {
        Self {
            generation: 0,
            container,
            layers: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers in paint order: ascending `z_index`, ties kept in sequence order.
    pub fn draw_order(&self) -> Vec<&Layer> {
        let mut out: Vec<&Layer> = self.layers.iter().collect();
        out.sort_by_key(|l| l.transform.z_index);
        out
    }

    pub fn dot_count(&self) -> usize {
        self.layers.iter().map(|l| l.dot_field.len()).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layer.rs"]
mod tests;
