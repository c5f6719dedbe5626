use kurbo::{Affine, Point};

use crate::compose::layer::{Layer, Scene};
use crate::foundation::core::{Rgba8, Size};
use crate::foundation::error::{BlobtoneError, BlobtoneResult};
use crate::halftone::rasterizer::Dot;
use crate::render::composite::{PremulRgba8, blend_in_place, over};
use crate::render::{FrameRGBA, SceneRenderer};

/// Largest accepted output dimension on either axis.
pub const MAX_FRAME_DIM: u32 = 16_384;

/// Output frame settings for [`CpuRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Fill applied before any layer; `None` leaves the frame transparent.
    pub clear_rgba: Option<Rgba8>,
}

impl RenderSettings {
    /// Frame matching the scene container (rounded up to whole pixels), cleared to white.
    pub fn for_scene(scene: &Scene) -> Self {
        Self {
            width: scene.container.width.ceil().max(1.0) as u32,
            height: scene.container.height.ceil().max(1.0) as u32,
            clear_rgba: Some(Rgba8::WHITE),
        }
    }

    fn validate(&self) -> BlobtoneResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BlobtoneError::render("frame width/height must be > 0"));
        }
        if self.width > MAX_FRAME_DIM || self.height > MAX_FRAME_DIM {
            return Err(BlobtoneError::render(format!(
                "frame {}x{} exceeds {MAX_FRAME_DIM}px",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Reference software renderer producing premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct CpuRenderer {
    settings: RenderSettings,
}

impl CpuRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }
}

impl SceneRenderer for CpuRenderer {
    fn render(&mut self, scene: &Scene) -> BlobtoneResult<FrameRGBA> {
        render_scene(scene, &self.settings)
    }
}

/// Draw `scene` into a new frame.
///
/// The container is stretched onto the frame. Each layer is drawn into its own buffer (box
/// background, then anti-aliased dots) and blended onto the frame with its opacity and mode, in
/// [`Scene::draw_order`].
#[tracing::instrument(
    skip(scene),
    fields(generation = scene.generation, layers = scene.layers.len())
)]
pub fn render_scene(scene: &Scene, settings: &RenderSettings) -> BlobtoneResult<FrameRGBA> {
    settings.validate()?;
    scene.container.validate("scene container")?;

    let w = settings.width as usize;
    let h = settings.height as usize;
    let clear = settings
        .clear_rgba
        .map(|c| c.premultiply().to_array())
        .unwrap_or([0; 4]);
    let mut data = Vec::with_capacity(w * h * 4);
    for _ in 0..w * h {
        data.extend_from_slice(&clear);
    }

    let to_frame = Affine::scale_non_uniform(
        f64::from(settings.width) / scene.container.width,
        f64::from(settings.height) / scene.container.height,
    );
    let mut layer_buf = vec![0u8; w * h * 4];
    for layer in scene.draw_order() {
        layer_buf.fill(0);
        let mut target = Target {
            data: &mut layer_buf,
            width: w,
            height: h,
        };
        let affine = to_frame * layer.transform.to_affine(layer.size(), scene.container);
        draw_layer(&mut target, layer, affine);
        blend_in_place(
            &mut data,
            &layer_buf,
            layer.transform.blend_mode,
            layer.transform.opacity.clamp(0.0, 1.0),
        )?;
    }

    Ok(FrameRGBA {
        width: settings.width,
        height: settings.height,
        data,
        premultiplied: true,
    })
}

struct Target<'a> {
    data: &'a mut [u8],
    width: usize,
    height: usize,
}

impl Target<'_> {
    fn blend_px(&mut self, x: usize, y: usize, src: PremulRgba8, coverage: f64) {
        let i = (y * self.width + x) * 4;
        let d = &mut self.data[i..i + 4];
        let out = over([d[0], d[1], d[2], d[3]], src, coverage);
        d.copy_from_slice(&out);
    }

    /// Clipped pixel range covering `[lo, hi]` on an axis of length `len`.
    fn span(lo: f64, hi: f64, len: usize) -> std::ops::Range<usize> {
        let a = lo.floor().max(0.0);
        let b = (hi.ceil() + 1.0).min(len as f64);
        if a.is_nan() || b.is_nan() || a >= b {
            return 0..0;
        }
        a as usize..b as usize
    }
}

fn draw_layer(target: &mut Target<'_>, layer: &Layer, affine: Affine) {
    let det = affine.determinant();
    if !det.is_finite() || det.abs() < 1e-12 {
        return;
    }
    let params = &layer.dot_field.params;
    if let Some(bg) = params.background_color {
        fill_box(target, layer.size(), affine, bg.premultiply().to_array());
    }
    let color = params.dot_color.premultiply().to_array();
    let radius_scale = det.abs().sqrt();
    for dot in &layer.dot_field.dots {
        draw_dot(target, dot, affine, radius_scale, color);
    }
}

fn fill_box(target: &mut Target<'_>, size: Size, affine: Affine, color: PremulRgba8) {
    let bbox = affine.transform_rect_bbox(size.to_rect());
    let inv = affine.inverse();
    for y in Target::span(bbox.y0, bbox.y1, target.height) {
        for x in Target::span(bbox.x0, bbox.x1, target.width) {
            let local = inv * Point::new(x as f64 + 0.5, y as f64 + 0.5);
            if local.x >= 0.0 && local.x < size.width && local.y >= 0.0 && local.y < size.height {
                target.blend_px(x, y, color, 1.0);
            }
        }
    }
}

fn draw_dot(
    target: &mut Target<'_>,
    dot: &Dot,
    affine: Affine,
    radius_scale: f64,
    color: PremulRgba8,
) {
    let c = affine * dot.center;
    let r = dot.radius * radius_scale;
    if r.is_nan() || r <= 0.0 || !c.x.is_finite() || !c.y.is_finite() {
        return;
    }
    for y in Target::span(c.y - r - 1.0, c.y + r + 1.0, target.height) {
        for x in Target::span(c.x - r - 1.0, c.x + r + 1.0, target.width) {
            let d = Point::new(x as f64 + 0.5, y as f64 + 0.5).distance(c);
            let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
            if coverage > 0.0 {
                target.blend_px(x, y, color, coverage);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
