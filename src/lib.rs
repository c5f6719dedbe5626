//! blobtone generates procedural blob-halftone backgrounds.
//!
//! # Pipeline overview
//!
//! 1. **Presets**: [`PresetProvider`] supplies named shape templates.
//! 2. **Shape**: [`generate_shape`] turns [`ShapeParams`] into a closed, smooth [`BoundaryPath`].
//! 3. **Halftone**: [`rasterize`] samples a jittered grid over the shape box and emits a
//!    [`DotField`] of randomly sized dots for every interior sample.
//! 4. **Compose**: [`LayerCompositor`] repeats 1-3 per layer, assigns random placement, opacity
//!    and blend mode, and publishes complete [`Scene`] snapshots.
//! 5. **Render** (optional): [`render_scene`] draws a scene into premultiplied RGBA8 pixels.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Injected randomness**: every generating call takes an explicit `rand::Rng`; with a seeded
//!   [`SplitMix64`] identical inputs give identical paths, dots and scenes.
//! - **Pure stages**: shape generation and rasterization never touch a drawing surface.
#![forbid(unsafe_code)]

mod compose;
mod config;
mod foundation;
mod halftone;
mod render;
mod shape;

pub use compose::compositor::{
    Band, CompositorConfig, CompositorState, LayerBatch, LayerCompositor, PresetSelection,
    Regeneration, TransformRanges, compose_layers,
};
pub use compose::layer::{BlendMode, Layer, LayerTransform, Scene};
pub use compose::preset::{Preset, PresetProvider};
pub use config::scene_config::SceneConfig;
pub use foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Rgba8Premul, Size, Vec2};
pub use foundation::error::{BlobtoneError, BlobtoneResult};
pub use foundation::rng::SplitMix64;
pub use halftone::rasterizer::{
    Dot, DotField, HalftoneParams, MAX_GRID_POINTS, RasterMode, VISIBILITY_THRESHOLD, rasterize,
    rasterize_with_mode,
};
pub use render::composite::{PremulRgba8, blend, blend_in_place, multiply, over, screen};
pub use render::cpu::{CpuRenderer, MAX_FRAME_DIM, RenderSettings, render_scene};
pub use render::{FrameRGBA, SceneRenderer};
pub use shape::generator::{MAX_POINT_COUNT, MIN_RADIUS_FACTOR, ShapeParams, generate_shape};
pub use shape::path::{BoundaryPath, DEFAULT_FLATTEN_TOLERANCE, Segment};
pub use shape::winding::{FillRule, FlatRegion};
