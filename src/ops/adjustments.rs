// ============================================================================
// COLOR ADJUSTMENTS — pure per-pixel transforms over RGBA8 buffers
// ============================================================================
//
// Every operation reads the caller's buffer and returns a new one; nothing
// is retained across calls and nothing is partially applied. Output channels
// are clamped to [0,255]; alpha passes through untouched. Operations are
// parallelized by row via rayon.
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;

use crate::error::{FilterError, Result};
use crate::params::Param;

/// Reject degenerate buffers before any transform touches them.
pub(crate) fn check_dims(src: &RgbaImage) -> Result<()> {
    if src.width() == 0 || src.height() == 0 {
        return Err(FilterError::InvalidBuffer(format!(
            "degenerate dimensions {}x{}",
            src.width(),
            src.height()
        )));
    }
    Ok(())
}

// ============================================================================
// HELPER: per-pixel transform
// ============================================================================

/// Apply a per-pixel transform to a source buffer.
/// `transform` receives (r, g, b) as f32 and returns (r, g, b) as f32;
/// alpha is copied through unchanged.
fn apply_pixel_transform<F>(src: &RgbaImage, transform: F) -> RgbaImage
where
    F: Fn(f32, f32, f32) -> (f32, f32, f32) + Sync,
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
            let (nr, ng, nb) = transform(r, g, b);
            row_out[pi] = nr.round().clamp(0.0, 255.0) as u8;
            row_out[pi + 1] = ng.round().clamp(0.0, 255.0) as u8;
            row_out[pi + 2] = nb.round().clamp(0.0, 255.0) as u8;
            row_out[pi + 3] = row_in[pi + 3];
        }
    });

    RgbaImage::from_raw(w as u32, h as u32, dst_raw).unwrap()
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Brightness/Contrast adjustment.
/// `brightness`: -100..100 (additive offset, applied first, clamped)
/// `contrast`: -100..100 (remap around the 128 midpoint)
pub fn brightness_contrast(src: &RgbaImage, brightness: f32, contrast: f32) -> Result<RgbaImage> {
    check_dims(src)?;
    Param::Brightness.validate(brightness)?;
    Param::Contrast.validate(contrast)?;

    let factor = (259.0 * (contrast + 255.0)) / (255.0 * (259.0 - contrast));
    Ok(apply_pixel_transform(src, move |r, g, b| {
        let r = (r + brightness).clamp(0.0, 255.0);
        let g = (g + brightness).clamp(0.0, 255.0);
        let b = (b + brightness).clamp(0.0, 255.0);
        (
            factor * (r - 128.0) + 128.0,
            factor * (g - 128.0) + 128.0,
            factor * (b - 128.0) + 128.0,
        )
    }))
}

/// Saturation adjustment around the Rec.601 luma of each pixel.
/// `sat`: 0..200 where 100 = unchanged, 0 = grayscale, 200 = doubled.
pub fn saturation(src: &RgbaImage, sat: f32) -> Result<RgbaImage> {
    check_dims(src)?;
    Param::Saturation.validate(sat)?;

    let factor = sat / 100.0;
    Ok(apply_pixel_transform(src, move |r, g, b| {
        let gray = 0.299 * r + 0.587 * g + 0.114 * b;
        (
            gray + factor * (r - gray),
            gray + factor * (g - gray),
            gray + factor * (b - gray),
        )
    }))
}

/// Sepia tone: blend each pixel toward the classic sepia matrix.
/// `intensity`: 0..100 where 0 = unchanged.
pub fn sepia(src: &RgbaImage, intensity: f32) -> Result<RgbaImage> {
    check_dims(src)?;
    Param::Sepia.validate(intensity)?;

    let weight = intensity / 100.0;
    Ok(apply_pixel_transform(src, move |r, g, b| {
        let tr = 0.393 * r + 0.769 * g + 0.189 * b;
        let tg = 0.349 * r + 0.686 * g + 0.168 * b;
        let tb = 0.272 * r + 0.534 * g + 0.131 * b;
        (
            r + weight * (tr - r),
            g + weight * (tg - g),
            b + weight * (tb - b),
        )
    }))
}

/// Color temperature shift.
/// `t`: -100..100; positive warms (red up, blue down), negative cools.
pub fn temperature(src: &RgbaImage, t: f32) -> Result<RgbaImage> {
    check_dims(src)?;
    Param::Temperature.validate(t)?;

    let red_scale = 1.0 + (t / 100.0) * 0.3;
    let blue_scale = 1.0 - (t / 100.0) * 0.3;
    Ok(apply_pixel_transform(src, move |r, g, b| {
        (r * red_scale, g, b * blue_scale)
    }))
}

/// Rotate the hue of every pixel by `degrees` via HSL round-trip.
/// Degrees outside [0,360) wrap; 0 and ±360 are the identity.
pub fn hue_rotate(src: &RgbaImage, degrees: f32) -> Result<RgbaImage> {
    check_dims(src)?;
    if !degrees.is_finite() {
        return Err(FilterError::InvalidParameter {
            name: "hue_rotate",
            value: degrees,
            min: -360.0,
            max: 360.0,
        });
    }

    let shift = degrees / 360.0;
    Ok(apply_pixel_transform(src, move |r, g, b| {
        let (h, s, l) = rgb_to_hsl(r / 255.0, g / 255.0, b / 255.0);
        let mut nh = (h + shift).fract();
        if nh < 0.0 {
            nh += 1.0;
        }
        let (nr, ng, nb) = hsl_to_rgb(nh, s, l);
        (nr * 255.0, ng * 255.0, nb * 255.0)
    }))
}

/// Tint: hue rotation by the slider angle.
/// `degrees`: -180..180; 0 = unchanged.
pub fn tint(src: &RgbaImage, degrees: f32) -> Result<RgbaImage> {
    Param::Tint.validate(degrees)?;
    hue_rotate(src, degrees)
}

/// Vintage look: hue rotation of `v * 3.6`° followed by a saturation
/// pull-down to `(100 - v/2)%`.
/// `v`: 0..100 where 0 = unchanged.
pub fn vintage(src: &RgbaImage, v: f32) -> Result<RgbaImage> {
    check_dims(src)?;
    Param::Vintage.validate(v)?;

    let rotated = hue_rotate(src, v * 3.6)?;
    saturation(&rotated, 100.0 - v * 0.5)
}

// ============================================================================
// COLOR SPACE HELPERS
// ============================================================================

/// RGB (0..1) → HSL (H: 0..1, S: 0..1, L: 0..1)
pub fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < 1e-6 {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };

    let h = if (max - r).abs() < 1e-6 {
        let mut h = (g - b) / d;
        if h < 0.0 {
            h += 6.0;
        }
        h / 6.0
    } else if (max - g).abs() < 1e-6 {
        ((b - r) / d + 2.0) / 6.0
    } else {
        ((r - g) / d + 4.0) / 6.0
    };

    (h, s, l)
}

/// HSL (H: 0..1, S: 0..1, L: 0..1) → RGB (0..1)
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s.abs() < 1e-6 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    (r, g, b)
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::testutil::{checker_image, max_channel_delta, solid_image};

    #[test]
    fn brightness_contrast_neutral_is_identity() {
        let img = checker_image(8, 6);
        let out = brightness_contrast(&img, 0.0, 0.0).unwrap();
        assert_eq!(img.as_raw(), out.as_raw());
    }

    #[test]
    fn brightness_contrast_clamps_white() {
        let img = solid_image(4, 4, [255, 255, 255, 255]);
        let out = brightness_contrast(&img, 100.0, 100.0).unwrap();
        for px in out.pixels() {
            assert_eq!([px[0], px[1], px[2], px[3]], [255, 255, 255, 255]);
        }
    }

    #[test]
    fn brightness_shifts_midtones() {
        let img = solid_image(2, 2, [100, 100, 100, 255]);
        let out = brightness_contrast(&img, 20.0, 0.0).unwrap();
        assert_eq!(out.get_pixel(0, 0)[0], 120);
        // Alpha untouched.
        assert_eq!(out.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn brightness_contrast_rejects_out_of_range() {
        let img = solid_image(2, 2, [0, 0, 0, 255]);
        // The contrast=255 singularity is unreachable: 255 is already
        // outside the accepted domain.
        assert!(matches!(
            brightness_contrast(&img, 0.0, 255.0),
            Err(FilterError::InvalidParameter { name: "contrast", .. })
        ));
        assert!(brightness_contrast(&img, -101.0, 0.0).is_err());
    }

    #[test]
    fn saturation_at_100_drifts_at_most_one_lsb() {
        let img = checker_image(16, 16);
        let out = saturation(&img, 100.0).unwrap();
        assert!(max_channel_delta(&img, &out) <= 1);
    }

    #[test]
    fn saturation_zero_is_grayscale() {
        let img = solid_image(3, 3, [200, 50, 10, 255]);
        let out = saturation(&img, 0.0).unwrap();
        let px = out.get_pixel(1, 1);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn sepia_zero_is_identity_and_full_matches_matrix() {
        let img = solid_image(2, 2, [100, 150, 200, 255]);
        assert_eq!(sepia(&img, 0.0).unwrap().as_raw(), img.as_raw());

        let out = sepia(&img, 100.0).unwrap();
        let px = out.get_pixel(0, 0);
        // 0.393*100 + 0.769*150 + 0.189*200 = 192.45
        assert_eq!(px[0], 192);
        // 0.349*100 + 0.686*150 + 0.168*200 = 171.4
        assert_eq!(px[1], 171);
        // 0.272*100 + 0.534*150 + 0.131*200 = 133.5 (rounding may land either side)
        assert!((px[2] as i32 - 134).abs() <= 1);
    }

    #[test]
    fn temperature_warms_and_cools() {
        let img = solid_image(2, 2, [100, 100, 100, 255]);

        let warm = temperature(&img, 50.0).unwrap();
        let px = warm.get_pixel(0, 0);
        assert_eq!(px[0], 115); // 100 * 1.15
        assert_eq!(px[1], 100);
        assert_eq!(px[2], 85); // 100 * 0.85

        let cool = temperature(&img, -50.0).unwrap();
        let px = cool.get_pixel(0, 0);
        assert_eq!(px[0], 85);
        assert_eq!(px[2], 115);

        assert_eq!(temperature(&img, 0.0).unwrap().as_raw(), img.as_raw());
    }

    #[test]
    fn hue_rotate_full_turn_round_trips() {
        let img = checker_image(8, 8);
        let out = hue_rotate(&img, 360.0).unwrap();
        assert!(max_channel_delta(&img, &out) <= 1);
    }

    #[test]
    fn hue_rotate_moves_red_toward_green() {
        let img = solid_image(2, 2, [255, 0, 0, 255]);
        let out = hue_rotate(&img, 120.0).unwrap();
        let px = out.get_pixel(0, 0);
        assert_eq!([px[0], px[1], px[2]], [0, 255, 0]);
    }

    #[test]
    fn degenerate_buffer_is_rejected() {
        let img = RgbaImage::new(0, 0);
        assert!(matches!(
            saturation(&img, 100.0),
            Err(FilterError::InvalidBuffer(_))
        ));
    }
}
