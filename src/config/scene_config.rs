use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::compose::compositor::{CompositorConfig, LayerCompositor};
use crate::compose::preset::{Preset, PresetProvider};
use crate::foundation::error::{BlobtoneError, BlobtoneResult};
use crate::foundation::rng::SplitMix64;
use crate::halftone::rasterizer::HalftoneParams;

/// JSON-facing configuration for a layered background.
///
/// Every field is optional; an empty object `{}` is a valid configuration using built-in
/// presets and default halftone/compositor settings.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub compositor: CompositorConfig,
    pub halftone: HalftoneParams,
    /// Custom presets; empty selects [`PresetProvider::builtin`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<Preset>,
}

impl SceneConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> BlobtoneResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| BlobtoneError::serde(format!("parse scene config JSON: {e}")))
    }

    pub fn from_json_str(s: &str) -> BlobtoneResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| BlobtoneError::serde(format!("parse scene config JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> BlobtoneResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            BlobtoneError::Other(
                anyhow::Error::new(e).context(format!("open scene config '{}'", path.display())),
            )
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn to_json_pretty(&self) -> BlobtoneResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BlobtoneError::serde(format!("serialize scene config: {e}")))
    }

    pub fn validate(&self) -> BlobtoneResult<()> {
        self.compositor.validate()?;
        self.halftone.validate()?;
        self.preset_provider().map(|_| ())
    }

    pub fn preset_provider(&self) -> BlobtoneResult<PresetProvider> {
        if self.presets.is_empty() {
            return Ok(PresetProvider::builtin());
        }
        PresetProvider::new(self.presets.clone())
    }

    /// Build a seeded compositor from this configuration.
    pub fn build_compositor(&self, seed: u64) -> BlobtoneResult<LayerCompositor<SplitMix64>> {
        LayerCompositor::with_seed(
            self.compositor.clone(),
            self.preset_provider()?,
            self.halftone,
            seed,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/scene_config.rs"]
mod tests;
