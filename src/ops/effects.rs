// ============================================================================
// SPATIAL EFFECTS — convolution and geometry-aware transforms
// ============================================================================
//
// Same contract as the color adjustments: pure, caller-owned buffers in and
// out, clamped output, rayon-parallelized by row. These operations read
// pixel neighbourhoods or coordinates, so they live apart from the plain
// per-pixel adjustments.
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;

use crate::error::Result;
use crate::ops::adjustments::check_dims;
use crate::params::Param;

/// Per-pixel transform that also sees the pixel's coordinates.
fn apply_per_pixel<F>(src: &RgbaImage, transform: F) -> RgbaImage
where
    F: Fn(u32, u32, f32, f32, f32) -> (f32, f32, f32) + Sync,
{
    let w = src.width() as usize;
    let h = src.height() as usize;
    let src_raw = src.as_raw();
    let mut dst_raw = vec![0u8; w * h * 4];
    let stride = w * 4;

    dst_raw.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        let row_in = &src_raw[y * stride..(y + 1) * stride];
        for x in 0..w {
            let pi = x * 4;
            let r = row_in[pi] as f32;
            let g = row_in[pi + 1] as f32;
            let b = row_in[pi + 2] as f32;
            let (nr, ng, nb) = transform(x as u32, y as u32, r, g, b);
            row_out[pi] = nr.round().clamp(0.0, 255.0) as u8;
            row_out[pi + 1] = ng.round().clamp(0.0, 255.0) as u8;
            row_out[pi + 2] = nb.round().clamp(0.0, 255.0) as u8;
            row_out[pi + 3] = row_in[pi + 3];
        }
    });

    RgbaImage::from_raw(w as u32, h as u32, dst_raw).unwrap()
}

// ============================================================================
// SHARPEN
// ============================================================================

/// 3×3 sharpening convolution with kernel
/// `[[0,-k,0],[-k,1+4k,-k],[0,-k,0]]`, `k = intensity/100`.
///
/// Border policy: the 1-pixel border copies the source value (the kernel is
/// only applied to interior pixels). Negative intensity flips the sign of
/// `k`, turning the kernel into a normalized neighbour average — a softening
/// pass rather than an edge boost. RGB only; alpha is copied through.
pub fn sharpen(src: &RgbaImage, intensity: f32) -> Result<RgbaImage> {
    check_dims(src)?;
    Param::Sharpness.validate(intensity)?;

    let w = src.width() as usize;
    let h = src.height() as usize;
    if w < 3 || h < 3 {
        // No interior pixels to convolve.
        return Ok(src.clone());
    }

    let k = intensity / 100.0;
    let center = 1.0 + 4.0 * k;
    let src_raw = src.as_raw();
    let stride = w * 4;
    let mut dst_raw = vec![0u8; w * h * 4];

    dst_raw.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        let row_in = &src_raw[y * stride..(y + 1) * stride];
        if y == 0 || y == h - 1 {
            row_out.copy_from_slice(row_in);
            return;
        }
        let row_above = &src_raw[(y - 1) * stride..y * stride];
        let row_below = &src_raw[(y + 1) * stride..(y + 2) * stride];
        for x in 0..w {
            let pi = x * 4;
            if x == 0 || x == w - 1 {
                row_out[pi..pi + 4].copy_from_slice(&row_in[pi..pi + 4]);
                continue;
            }
            for c in 0..3 {
                let sum = center * row_in[pi + c] as f32
                    - k * (row_above[pi + c] as f32
                        + row_below[pi + c] as f32
                        + row_in[pi - 4 + c] as f32
                        + row_in[pi + 4 + c] as f32);
                row_out[pi + c] = sum.round().clamp(0.0, 255.0) as u8;
            }
            row_out[pi + 3] = row_in[pi + 3];
        }
    });

    Ok(RgbaImage::from_raw(w as u32, h as u32, dst_raw).unwrap())
}

// ============================================================================
// BOX BLUR
// ============================================================================

/// Separable box blur: one horizontal and one vertical averaging pass with a
/// kernel radius of `ceil(radius_px)`, edges clamped. This stands in for the
/// original renderer's built-in `blur()`; radii below 0.5 px are treated as
/// identity. All four channels pass through the kernel.
pub fn box_blur(src: &RgbaImage, radius_px: f32) -> Result<RgbaImage> {
    check_dims(src)?;
    Param::Blur.validate(radius_px)?;

    if radius_px < 0.5 {
        return Ok(src.clone());
    }
    let w = src.width() as usize;
    let h = src.height() as usize;

    let r = radius_px.ceil() as usize;
    let kernel_size = r * 2 + 1;
    let inv_k = 1.0 / (kernel_size as f32);
    let src_raw = src.as_raw();

    // Horizontal pass
    let mut h_buf = vec![0.0f32; w * h * 4];
    h_buf.par_chunks_mut(w * 4).enumerate().for_each(|(y, row_out)| {
        for x in 0..w {
            let mut sums = [0.0f32; 4];
            for k in 0..kernel_size {
                let sx = (x as i32 + k as i32 - r as i32).clamp(0, w as i32 - 1) as usize;
                let si = y * w * 4 + sx * 4;
                for c in 0..4 {
                    sums[c] += src_raw[si + c] as f32;
                }
            }
            let oi = x * 4;
            for c in 0..4 {
                row_out[oi + c] = sums[c] * inv_k;
            }
        }
    });

    // Vertical pass
    let mut v_buf = vec![0.0f32; w * h * 4];
    v_buf.par_chunks_mut(w * 4).enumerate().for_each(|(y, row_out)| {
        for x in 0..w {
            let mut sums = [0.0f32; 4];
            for k in 0..kernel_size {
                let sy = (y as i32 + k as i32 - r as i32).clamp(0, h as i32 - 1) as usize;
                let si = sy * w * 4 + x * 4;
                for c in 0..4 {
                    sums[c] += h_buf[si + c];
                }
            }
            let oi = x * 4;
            for c in 0..4 {
                row_out[oi + c] = sums[c] * inv_k;
            }
        }
    });

    let dst_raw: Vec<u8> = v_buf.iter().map(|&v| v.round().clamp(0.0, 255.0) as u8).collect();
    Ok(RgbaImage::from_raw(w as u32, h as u32, dst_raw).unwrap())
}

// ============================================================================
// VIGNETTE
// ============================================================================

/// Radial darkening from the image center:
/// `factor = 1 - (dist/max_dist) * (intensity/100)` multiplied into R,G,B.
/// `max_dist` is the center-to-corner distance, so the factor never goes
/// negative. `intensity=0` is the identity.
pub fn vignette(src: &RgbaImage, intensity: f32) -> Result<RgbaImage> {
    check_dims(src)?;
    Param::Vignette.validate(intensity)?;

    let cx = src.width() as f32 / 2.0;
    let cy = src.height() as f32 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt();
    let strength = intensity / 100.0;

    Ok(apply_per_pixel(src, move |x, y, r, g, b| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let dist = (dx * dx + dy * dy).sqrt();
        let factor = 1.0 - (dist / max_dist) * strength;
        (r * factor, g * factor, b * factor)
    }))
}
