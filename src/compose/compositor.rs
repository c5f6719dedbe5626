//! Layered scene generation and publication.
//!
//! [`compose_layers`] is the pure pipeline: presets -> shape -> halftone -> transform, repeated
//! per layer. [`LayerCompositor`] owns the configuration and RNG, publishes complete scenes
//! atomically and optionally drives regeneration from a timer thread.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use kurbo::Vec2;
use rand::Rng;

use crate::compose::layer::{BlendMode, Layer, LayerTransform, Scene};
use crate::compose::preset::PresetProvider;
use crate::foundation::core::{Rgba8, Size};
use crate::foundation::error::{BlobtoneError, BlobtoneResult};
use crate::foundation::rng::SplitMix64;
use crate::halftone::rasterizer::{HalftoneParams, RasterMode, rasterize_with_mode};
use crate::shape::generator::generate_shape;

/// How the compositor picks a preset for each layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetSelection {
    /// Layer `i` uses preset `i % presets.len()`.
    #[default]
    RoundRobin,
    /// Uniformly random preset per layer.
    Random,
}

/// Inclusive `[min, max]` sampling range.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Only called on bands that passed `validate`.
    pub(crate) fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> f64 {
        rng.gen_range(self.min..=self.max)
    }

    fn validate(self, what: &str) -> BlobtoneResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(BlobtoneError::invalid_parameters(format!(
                "{what} range must be finite with min <= max (got [{}, {}])",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Randomization bands for layer placement.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TransformRanges {
    /// Position of the layer box top-left, percent of the container, both axes.
    pub position_pct: Band,
    pub opacity: Band,
    pub rotation_deg: Band,
    pub scale: Band,
}

impl Default for TransformRanges {
    fn default() -> Self {
        Self {
            position_pct: Band::new(-10.0, 90.0),
            opacity: Band::new(0.3, 0.7),
            rotation_deg: Band::new(-30.0, 30.0),
            scale: Band::new(0.6, 1.1),
        }
    }
}

impl TransformRanges {
    fn validate(&self) -> BlobtoneResult<()> {
        self.position_pct.validate("position_pct")?;
        self.opacity.validate("opacity")?;
        self.rotation_deg.validate("rotation_deg")?;
        self.scale.validate("scale")?;
        if self.opacity.min < 0.0 || self.opacity.max > 1.0 {
            return Err(BlobtoneError::invalid_parameters(
                "opacity range must lie within [0, 1]",
            ));
        }
        if self.scale.min <= 0.0 {
            return Err(BlobtoneError::invalid_parameters(
                "scale range must be > 0",
            ));
        }
        Ok(())
    }
}

/// Compositor configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Layers requested per regeneration; 0 yields an empty scene.
    pub layer_count: usize,
    /// Start the periodic refresh timer in [`LayerCompositor::start`].
    pub auto_refresh: bool,
    /// Timer period; must be > 0.
    pub refresh_interval_ms: u64,
    /// Size of the area layers are positioned in.
    pub container: Size,
    pub preset_selection: PresetSelection,
    /// Candidate blend modes, one picked per layer.
    pub blend_modes: Vec<BlendMode>,
    /// Candidate dot colors, one picked per layer; empty keeps the halftone dot color.
    pub palette: Vec<Rgba8>,
    pub transform_ranges: TransformRanges,
    pub raster_mode: RasterMode,
    /// Keep the previous scene published when every requested layer failed.
    pub retain_on_total_failure: bool,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            layer_count: 5,
            auto_refresh: false,
            refresh_interval_ms: 8000,
            container: Size::new(1920.0, 1080.0),
            preset_selection: PresetSelection::RoundRobin,
            blend_modes: vec![BlendMode::Multiply],
            palette: vec![Rgba8::rgb(32, 32, 48)],
            transform_ranges: TransformRanges::default(),
            raster_mode: RasterMode::Sequential,
            retain_on_total_failure: true,
        }
    }
}

impl CompositorConfig {
    pub fn validate(&self) -> BlobtoneResult<()> {
        if self.refresh_interval_ms == 0 {
            return Err(BlobtoneError::invalid_parameters(
                "refresh_interval_ms must be > 0",
            ));
        }
        self.container.validate("container")?;
        if self.blend_modes.is_empty() {
            return Err(BlobtoneError::invalid_parameters(
                "blend_modes must contain at least one mode",
            ));
        }
        self.transform_ranges.validate()
    }
}

/// Layers produced by one [`compose_layers`] call, plus the per-layer failures that were skipped.
#[derive(Debug, Default)]
pub struct LayerBatch {
    pub layers: Vec<Layer>,
    /// [`BlobtoneError::LayerGeneration`] values, in layer order.
    pub failures: Vec<BlobtoneError>,
}

/// Build up to `layer_count` randomized layers.
///
/// A layer whose shape generation or rasterization fails is skipped and recorded in
/// [`LayerBatch::failures`]; the remaining layers keep ascending `z_index` values. Invalid
/// configuration is rejected before any layer is built. The RNG is consumed sequentially in layer
/// order.
pub fn compose_layers<R: Rng + ?Sized>(
    layer_count: usize,
    presets: &PresetProvider,
    config: &CompositorConfig,
    halftone: &HalftoneParams,
    rng: &mut R,
) -> BlobtoneResult<LayerBatch> {
    config.validate()?;
    halftone.validate()?;
    if layer_count > 0 && presets.is_empty() {
        return Err(BlobtoneError::invalid_parameters(
            "at least one preset is required to build layers",
        ));
    }

    let mut batch = LayerBatch::default();
    for i in 0..layer_count {
        match build_layer(i, batch.layers.len(), presets, config, halftone, rng) {
            Ok(layer) => batch.layers.push(layer),
            Err(e) => {
                let err = BlobtoneError::layer_generation(i, e);
                tracing::warn!(layer = i, error = %err, "skipping layer");
                batch.failures.push(err);
            }
        }
    }
    Ok(batch)
}

fn build_layer<R: Rng + ?Sized>(
    index: usize,
    z_index: usize,
    presets: &PresetProvider,
    config: &CompositorConfig,
    halftone: &HalftoneParams,
    rng: &mut R,
) -> BlobtoneResult<Layer> {
    let list = presets.list();
    let preset = match config.preset_selection {
        PresetSelection::RoundRobin => &list[index % list.len()],
        PresetSelection::Random => &list[rng.gen_range(0..list.len())],
    };

    let mut shape = preset.shape;
    let j = preset.size_jitter;
    shape.width *= 1.0 + rng.gen_range(-j..=j);
    shape.height *= 1.0 + rng.gen_range(-j..=j);

    let boundary_path = generate_shape(&shape, rng)?;

    let mut halftone_params = *halftone;
    if let Some(color) = pick(&config.palette, rng) {
        halftone_params.dot_color = color;
    }
    let dot_field = rasterize_with_mode(
        &boundary_path,
        shape.size(),
        &halftone_params,
        config.raster_mode,
        rng,
    )?;

    let ranges = &config.transform_ranges;
    let transform = LayerTransform {
        position_pct: Vec2::new(
            ranges.position_pct.sample(rng),
            ranges.position_pct.sample(rng),
        ),
        opacity: ranges.opacity.sample(rng),
        rotation_deg: ranges.rotation_deg.sample(rng),
        scale: ranges.scale.sample(rng),
        blend_mode: pick(&config.blend_modes, rng).unwrap_or_default(),
        z_index: i32::try_from(z_index)
            .map_err(|_| BlobtoneError::invalid_parameters("layer z_index overflow"))?,
    };

    Ok(Layer {
        preset: preset.name.clone(),
        shape_params: shape,
        boundary_path,
        halftone_params,
        dot_field,
        transform,
    })
}

/// Single-entry lists are returned without consuming randomness.
fn pick<T: Copy, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Option<T> {
    match items {
        [] => None,
        [only] => Some(*only),
        _ => Some(items[rng.gen_range(0..items.len())]),
    }
}

/// Lifecycle of a [`LayerCompositor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositorState {
    /// Nothing generated yet.
    Idle,
    /// A regeneration is in progress.
    Generating,
    /// At least one regeneration has completed.
    Ready,
}

impl CompositorState {
    fn to_u8(self) -> u8 {
        match self {
            CompositorState::Idle => 0,
            CompositorState::Generating => 1,
            CompositorState::Ready => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => CompositorState::Generating,
            2 => CompositorState::Ready,
            _ => CompositorState::Idle,
        }
    }
}

/// Result of one [`LayerCompositor::regenerate`] call.
#[derive(Debug)]
pub struct Regeneration {
    /// The scene built by this call (published or not).
    pub scene: Arc<Scene>,
    /// Layers that were skipped.
    pub failures: Vec<BlobtoneError>,
    /// Whether `scene` replaced the published scene.
    pub published: bool,
}

/// Owns presets, configuration and the RNG stream; publishes whole scenes.
///
/// Regeneration is synchronous and serialized: concurrent callers (including the refresh timer)
/// take turns, and a scene is only published if it is newer than the one already visible.
/// Readers get `Arc<Scene>` snapshots and never observe a partially built scene.
pub struct LayerCompositor<R = SplitMix64> {
    config: CompositorConfig,
    presets: PresetProvider,
    halftone: HalftoneParams,
    rng: Mutex<R>,
    state: AtomicU8,
    next_generation: AtomicU64,
    published: RwLock<Arc<Scene>>,
    timer: Mutex<Option<RefreshTimer>>,
}

impl LayerCompositor<SplitMix64> {
    /// Compositor driven by a [`SplitMix64`] stream seeded with `seed`.
    pub fn with_seed(
        config: CompositorConfig,
        presets: PresetProvider,
        halftone: HalftoneParams,
        seed: u64,
    ) -> BlobtoneResult<Self> {
        Self::new(config, presets, halftone, SplitMix64::new(seed))
    }
}

impl<R: Rng + Send + 'static> LayerCompositor<R> {
    pub fn new(
        config: CompositorConfig,
        presets: PresetProvider,
        halftone: HalftoneParams,
        rng: R,
    ) -> BlobtoneResult<Self> {
        config.validate()?;
        halftone.validate()?;
        let empty = Arc::new(Scene::empty(config.container));
        Ok(Self {
            config,
            presets,
            halftone,
            rng: Mutex::new(rng),
            state: AtomicU8::new(CompositorState::Idle.to_u8()),
            next_generation: AtomicU64::new(1),
            published: RwLock::new(empty),
            timer: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn presets(&self) -> &PresetProvider {
        &self.presets
    }

    pub fn state(&self) -> CompositorState {
        CompositorState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The currently published scene.
    pub fn scene(&self) -> Arc<Scene> {
        Arc::clone(&self.published.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Regenerate with the configured layer count.
    pub fn regenerate(&self) -> BlobtoneResult<Regeneration> {
        self.regenerate_layers(self.config.layer_count)
    }

    /// Build and publish a new scene with `layer_count` layers.
    #[tracing::instrument(skip(self))]
    pub fn regenerate_layers(&self, layer_count: usize) -> BlobtoneResult<Regeneration> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = self.state();
        self.set_state(CompositorState::Generating);

        let batch = match compose_layers(
            layer_count,
            &self.presets,
            &self.config,
            &self.halftone,
            &mut *rng,
        ) {
            Ok(b) => b,
            Err(e) => {
                self.set_state(previous);
                return Err(e);
            }
        };
        let generation = self.next_generation.fetch_add(1, Ordering::AcqRel);
        drop(rng);

        let total_failure = layer_count > 0 && batch.layers.is_empty();
        let scene = Arc::new(Scene {
            generation,
            container: self.config.container,
            layers: batch.layers,
        });

        let published = if total_failure && self.config.retain_on_total_failure {
            tracing::warn!(generation, "every layer failed; keeping previous scene");
            false
        } else {
            self.publish(Arc::clone(&scene))
        };
        self.set_state(CompositorState::Ready);
        tracing::debug!(
            generation,
            layers = scene.layers.len(),
            skipped = batch.failures.len(),
            published,
            "regenerated"
        );

        Ok(Regeneration {
            scene,
            failures: batch.failures,
            published,
        })
    }

    /// Timer callback: regenerate with unchanged configuration, logging instead of returning errors.
    pub fn tick(&self) {
        if let Err(e) = self.regenerate() {
            tracing::warn!(error = %e, "scheduled regeneration failed");
        }
    }

    /// Initial regeneration, then the refresh timer when `auto_refresh` is enabled.
    pub fn start(self: &Arc<Self>) -> BlobtoneResult<Regeneration> {
        let first = self.regenerate()?;
        if self.config.auto_refresh {
            self.start_auto_refresh()?;
        }
        Ok(first)
    }

    /// Spawn the refresh timer (no-op if one is already running).
    ///
    /// The timer only holds a weak reference; it stops on [`Self::teardown`] or once the
    /// compositor is dropped.
    pub fn start_auto_refresh(self: &Arc<Self>) -> BlobtoneResult<()> {
        let mut slot = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Ok(());
        }
        let interval = Duration::from_millis(self.config.refresh_interval_ms);
        let weak = Arc::downgrade(self);
        let timer = RefreshTimer::spawn(interval, move || match weak.upgrade() {
            Some(compositor) => {
                compositor.tick();
                true
            }
            None => false,
        })?;
        tracing::debug!(interval_ms = self.config.refresh_interval_ms, "refresh timer started");
        *slot = Some(timer);
        Ok(())
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn publish(&self, scene: Arc<Scene>) -> bool {
        let mut slot = self.published.write().unwrap_or_else(PoisonError::into_inner);
        if scene.generation <= slot.generation {
            return false;
        }
        *slot = scene;
        true
    }

    fn set_state(&self, state: CompositorState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }
}

impl<R> LayerCompositor<R> {
    /// Stop the refresh timer if running. Idempotent.
    pub fn teardown(&self) {
        let timer = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = timer {
            timer.stop();
            tracing::debug!("refresh timer stopped");
        }
    }
}

impl<R> Drop for LayerCompositor<R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Background thread calling `on_tick` every period until stopped or `on_tick` returns false.
struct RefreshTimer {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl RefreshTimer {
    fn spawn(
        interval: Duration,
        mut on_tick: impl FnMut() -> bool + Send + 'static,
    ) -> BlobtoneResult<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = std::thread::Builder::new()
            .name("blobtone-refresh".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if !on_tick() {
                                break;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(|e| {
                BlobtoneError::Other(anyhow::Error::new(e).context("spawn refresh timer thread"))
            })?;
        Ok(Self { stop_tx, handle })
    }

    fn stop(self) {
        let _ = self.stop_tx.send(());
        // The last compositor handle may be dropped from inside a tick; never join ourselves.
        if self.handle.thread().id() != std::thread::current().id() {
            let _ = self.handle.join();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
