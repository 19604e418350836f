// ============================================================================
// FILTER PIPELINE — fixed-order application of every non-neutral stage
// ============================================================================

use image::RgbaImage;

use crate::error::Result;
use crate::ops::{adjustments, effects};
use crate::params::FilterParameters;

/// Run the full filter pipeline against `src` and return a new buffer.
///
/// Stages run in a fixed order for reproducible output:
/// brightness/contrast → saturation → sepia → sharpen → temperature →
/// vignette → blur → vintage → tint. Stages sitting at their neutral value
/// are skipped outright, so an all-neutral record is a byte-for-byte
/// identity. The source buffer is never modified.
pub fn apply_pipeline(src: &RgbaImage, params: &FilterParameters) -> Result<RgbaImage> {
    adjustments::check_dims(src)?;
    params.validate()?;

    let mut out = src.clone();
    if params.brightness != 0.0 || params.contrast != 0.0 {
        out = adjustments::brightness_contrast(&out, params.brightness, params.contrast)?;
    }
    if params.saturation != 100.0 {
        out = adjustments::saturation(&out, params.saturation)?;
    }
    if params.sepia > 0.0 {
        out = adjustments::sepia(&out, params.sepia)?;
    }
    if params.sharpness != 0.0 {
        out = effects::sharpen(&out, params.sharpness)?;
    }
    if params.temperature != 0.0 {
        out = adjustments::temperature(&out, params.temperature)?;
    }
    if params.vignette > 0.0 {
        out = effects::vignette(&out, params.vignette)?;
    }
    if params.blur > 0.0 {
        out = effects::box_blur(&out, params.blur)?;
    }
    if params.vintage > 0.0 {
        out = adjustments::vintage(&out, params.vintage)?;
    }
    if params.tint != 0.0 {
        out = adjustments::tint(&out, params.tint)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use crate::ops::testutil::checker_image;
    use crate::params::Param;

    #[test]
    fn neutral_pipeline_is_byte_identity() {
        let img = checker_image(12, 9);
        let out = apply_pipeline(&img, &FilterParameters::neutral()).unwrap();
        assert_eq!(img.as_raw(), out.as_raw());
    }

    #[test]
    fn each_parameter_alone_at_neutral_is_identity() {
        // Explicitly pin every neutral point, one slider at a time.
        let img = checker_image(10, 10);
        for &p in Param::ALL.iter() {
            let mut params = FilterParameters::neutral();
            params.set(p, p.neutral()).unwrap();
            let out = apply_pipeline(&img, &params).unwrap();
            assert_eq!(img.as_raw(), out.as_raw(), "{} not identity", p.name());
        }
    }

    #[test]
    fn stage_order_is_pinned() {
        // brightness/contrast runs before sepia: applying the pipeline must
        // equal applying the two stages by hand in that order, and must
        // differ from the reversed order (the sepia matrix rows do not sum
        // to 1, so it does not commute with an additive brightness shift).
        let img = checker_image(8, 8);
        let mut params = FilterParameters::neutral();
        params.set(Param::Brightness, 40.0).unwrap();
        params.set(Param::Sepia, 100.0).unwrap();

        let piped = apply_pipeline(&img, &params).unwrap();

        let bc = crate::ops::adjustments::brightness_contrast(&img, 40.0, 0.0).unwrap();
        let expected = crate::ops::adjustments::sepia(&bc, 100.0).unwrap();
        assert_eq!(piped.as_raw(), expected.as_raw());

        let sep = crate::ops::adjustments::sepia(&img, 100.0).unwrap();
        let reversed = crate::ops::adjustments::brightness_contrast(&sep, 40.0, 0.0).unwrap();
        assert_ne!(piped.as_raw(), reversed.as_raw());
    }

    #[test]
    fn pipeline_output_is_deterministic() {
        let img = checker_image(16, 12);
        let mut params = FilterParameters::neutral();
        params.set(Param::Brightness, 15.0).unwrap();
        params.set(Param::Sepia, 40.0).unwrap();
        params.set(Param::Sharpness, 30.0).unwrap();
        params.set(Param::Vignette, 25.0).unwrap();
        params.set(Param::Blur, 2.0).unwrap();

        let a = apply_pipeline(&img, &params).unwrap();
        let b = apply_pipeline(&img, &params).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn invalid_params_fail_before_any_work() {
        let img = checker_image(4, 4);
        let mut params = FilterParameters::neutral();
        params.brightness = 500.0; // bypass `set` on purpose
        assert!(matches!(
            apply_pipeline(&img, &params),
            Err(FilterError::InvalidParameter { name: "brightness", .. })
        ));
    }

    #[test]
    fn alpha_survives_the_full_pipeline() {
        let mut img = checker_image(8, 8);
        img.get_pixel_mut(3, 3)[3] = 42;
        let mut params = FilterParameters::neutral();
        params.set(Param::Brightness, 50.0).unwrap();
        params.set(Param::Saturation, 30.0).unwrap();
        params.set(Param::Sepia, 60.0).unwrap();
        params.set(Param::Temperature, 40.0).unwrap();
        params.set(Param::Vignette, 50.0).unwrap();
        params.set(Param::Tint, 90.0).unwrap();
        let out = apply_pipeline(&img, &params).unwrap();
        assert_eq!(out.get_pixel(3, 3)[3], 42);
        assert_eq!(out.get_pixel(0, 0)[3], 255);
    }
}
