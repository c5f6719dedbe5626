use crate::compose::layer::BlendMode;
use crate::foundation::error::{BlobtoneError, BlobtoneResult};
use crate::foundation::math::{mul_div255_u8, mul_div255_u16, unit_to_u8};

pub type PremulRgba8 = [u8; 4];

fn scale(px: PremulRgba8, op: u16) -> PremulRgba8 {
    [
        mul_div255_u8(u16::from(px[0]), op),
        mul_div255_u8(u16::from(px[1]), op),
        mul_div255_u8(u16::from(px[2]), op),
        mul_div255_u8(u16::from(px[3]), op),
    ]
}

/// Source-over.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let s = scale(src, unit_to_u8(opacity));
    if s[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(s[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = s[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Premultiplied multiply: `s*d + s*(1 - da) + d*(1 - sa)`.
pub fn multiply(dst: PremulRgba8, src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let s = scale(src, unit_to_u8(opacity));
    if s[3] == 0 {
        return dst;
    }
    let inv_sa = 255u16 - u16::from(s[3]);
    let inv_da = 255u16 - u16::from(dst[3]);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = u16::from(s[i]);
        let dc = u16::from(dst[i]);
        out[i] = mul_div255_u8(sc, dc)
            .saturating_add(mul_div255_u8(sc, inv_da))
            .saturating_add(mul_div255_u8(dc, inv_sa));
    }
    out[3] = alpha_union(s[3], dst[3]);
    out
}

/// Premultiplied screen: `s + d - s*d`.
pub fn screen(dst: PremulRgba8, src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let s = scale(src, unit_to_u8(opacity));
    if s[3] == 0 {
        return dst;
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let (sc, dc) = (u16::from(s[i]), u16::from(dst[i]));
        out[i] = (sc + dc - mul_div255_u16(sc, dc)).min(255) as u8;
    }
    out[3] = alpha_union(s[3], dst[3]);
    out
}

fn alpha_union(sa: u8, da: u8) -> u8 {
    sa.saturating_add(mul_div255_u8(u16::from(da), 255u16 - u16::from(sa)))
}

pub fn blend(mode: BlendMode, dst: PremulRgba8, src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    match mode {
        BlendMode::Normal => over(dst, src, opacity),
        BlendMode::Multiply => multiply(dst, src, opacity),
        BlendMode::Screen => screen(dst, src, opacity),
    }
}

pub fn blend_in_place(
    dst: &mut [u8],
    src: &[u8],
    mode: BlendMode,
    opacity: f64,
) -> BlobtoneResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(BlobtoneError::render(
            "blend_in_place expects equal-length rgba8 buffers",
        ));
    }
    if opacity <= 0.0 {
        return Ok(());
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = blend(mode, [d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
