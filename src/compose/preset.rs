use crate::foundation::error::{BlobtoneError, BlobtoneResult};
use crate::shape::generator::ShapeParams;

/// Named shape template sampled by the compositor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Preset {
    pub name: String,
    /// Template shape; `width`/`height` are perturbed per layer.
    pub shape: ShapeParams,
    /// Relative size perturbation: each dimension is scaled by `1 ± size_jitter`.
    #[serde(default = "default_size_jitter")]
    pub size_jitter: f64,
}

fn default_size_jitter() -> f64 {
    0.2
}

impl Preset {
    pub fn new(name: impl Into<String>, shape: ShapeParams) -> Self {
        Self {
            name: name.into(),
            shape,
            size_jitter: default_size_jitter(),
        }
    }

    pub fn validate(&self) -> BlobtoneResult<()> {
        if self.name.trim().is_empty() {
            return Err(BlobtoneError::invalid_parameters(
                "preset name must be non-empty",
            ));
        }
        self.shape.validate().map_err(|e| {
            BlobtoneError::invalid_parameters(format!("preset '{}': {e}", self.name))
        })?;
        if !self.size_jitter.is_finite() || !(0.0..1.0).contains(&self.size_jitter) {
            return Err(BlobtoneError::invalid_parameters(format!(
                "preset '{}' size_jitter must be within [0, 1)",
                self.name
            )));
        }
        Ok(())
    }
}

/// Ordered, validated preset list.
#[derive(Clone, Debug, PartialEq)]
pub struct PresetProvider {
    presets: Vec<Preset>,
}

impl PresetProvider {
    pub fn new(presets: Vec<Preset>) -> BlobtoneResult<Self> {
        for p in &presets {
            p.validate()?;
        }
        Ok(Self { presets })
    }

    /// Built-in size/point-count/randomness bands.
    pub fn builtin() -> Self {
        let shape = |width, height, point_count, randomness| ShapeParams {
            width,
            height,
            point_count,
            randomness,
        };
        Self {
            presets: vec![
                Preset::new("pebble", shape(320.0, 280.0, 6, 0.25)),
                Preset::new("cloud", shape(520.0, 420.0, 10, 0.35)),
                Preset::new("drift", shape(720.0, 560.0, 8, 0.5)),
                Preset::new("sprawl", shape(900.0, 700.0, 12, 0.2)),
            ],
        }
    }

    pub fn list(&self) -> &[Preset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }
}

impl Default for PresetProvider {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/preset.rs"]
mod tests;
