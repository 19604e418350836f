// ============================================================================
// SINGLE-IMAGE FILTER SESSION
// ============================================================================
//
// Owns the parameter record and active-preset label for exactly one image.
// Every mutation re-runs the pipeline against the ORIGINAL source buffer —
// never against a previously filtered result — so repeated slider tweaks
// cannot compound rounding error. The rendered frame is pushed to a
// caller-supplied display surface.
// ============================================================================

use image::RgbaImage;

use crate::error::{FilterError, Result};
use crate::io::{self, SaveFormat};
use crate::landmarks::LandmarkFrame;
use crate::ops::adjustments::check_dims;
use crate::ops::pipeline::apply_pipeline;
use crate::params::{self, FilterParameters, Param};

/// Anything the session can render into: a GUI texture, a terminal preview,
/// a test sink. The session writes frames; it never owns the surface's
/// lifecycle beyond holding it.
pub trait DisplaySurface {
    fn present(&mut self, frame: &RgbaImage);
}

/// In-memory surface, used by tests and headless previews.
#[derive(Default)]
pub struct MemorySurface {
    last: Option<RgbaImage>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently presented frame, if any.
    pub fn last_frame(&self) -> Option<&RgbaImage> {
        self.last.as_ref()
    }
}

impl DisplaySurface for MemorySurface {
    fn present(&mut self, frame: &RgbaImage) {
        self.last = Some(frame.clone());
    }
}

/// Where the session currently sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No image loaded.
    Idle,
    /// Image loaded, all parameters neutral.
    Ready,
    /// Image loaded, at least one parameter away from neutral.
    Modified,
}

pub struct FilterSession<S: DisplaySurface> {
    surface: S,
    original: Option<RgbaImage>,
    rendered: Option<RgbaImage>,
    params: FilterParameters,
    active_preset: Option<String>,
    landmarks: Option<LandmarkFrame>,
}

impl<S: DisplaySurface> FilterSession<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            original: None,
            rendered: None,
            params: FilterParameters::neutral(),
            active_preset: None,
            landmarks: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.original.is_none() {
            SessionState::Idle
        } else if self.params.is_neutral() {
            SessionState::Ready
        } else {
            SessionState::Modified
        }
    }

    pub fn params(&self) -> &FilterParameters {
        &self.params
    }

    pub fn active_preset(&self) -> Option<&str> {
        self.active_preset.as_deref()
    }

    pub fn landmarks(&self) -> Option<&LandmarkFrame> {
        self.landmarks.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Load a new source image. Parameters reset to neutral and the initial
    /// (unfiltered) frame is presented.
    pub fn load_image(&mut self, img: RgbaImage) -> Result<()> {
        check_dims(&img)?;
        self.original = Some(img);
        self.rendered = None;
        self.landmarks = None;
        self.params = FilterParameters::neutral();
        self.active_preset = None;
        self.recompute()
    }

    /// Drop the image and any derived buffers; back to `Idle`.
    pub fn remove_image(&mut self) {
        self.original = None;
        self.rendered = None;
        self.landmarks = None;
        self.params = FilterParameters::neutral();
        self.active_preset = None;
    }

    /// Set one slider. A manual edit always clears the active-preset label,
    /// even when the value matches what the preset had set.
    pub fn set_parameter(&mut self, param: Param, value: f32) -> Result<()> {
        self.require_image()?;
        self.params.set(param, value)?;
        self.active_preset = None;
        self.recompute()
    }

    /// Apply a built-in preset: reset to neutral, overlay the preset's
    /// fields, remember the label. Never cumulative with prior edits.
    pub fn apply_preset(&mut self, preset_id: &str) -> Result<()> {
        self.require_image()?;
        let preset = params::find_preset(preset_id).ok_or_else(|| {
            FilterError::InvalidState(format!("unknown preset '{}'", preset_id))
        })?;
        self.params = preset.resolve();
        self.active_preset = Some(preset.id.clone());
        self.recompute()
    }

    /// Back to all-neutral parameters. Idempotent; a no-op in `Idle`.
    pub fn reset(&mut self) -> Result<()> {
        self.params = FilterParameters::neutral();
        self.active_preset = None;
        if self.original.is_some() {
            self.recompute()?;
        }
        Ok(())
    }

    /// Attach a landmark frame from the external detector (shape-checked
    /// only). Cleared automatically when the image changes.
    pub fn attach_landmarks(&mut self, frame: LandmarkFrame) -> Result<()> {
        self.require_image()?;
        frame.validate()?;
        self.landmarks = Some(frame);
        Ok(())
    }

    /// Encode the currently rendered frame.
    pub fn export_result(&self, format: SaveFormat, quality: u8) -> Result<Vec<u8>> {
        let rendered = self.rendered.as_ref().ok_or_else(|| {
            FilterError::InvalidState("no rendered image to export".into())
        })?;
        io::encode_to_vec(rendered, format, quality)
    }

    fn require_image(&self) -> Result<()> {
        if self.original.is_none() {
            return Err(FilterError::InvalidState("no image loaded".into()));
        }
        Ok(())
    }

    /// Re-run the pipeline against the pristine source and present the
    /// result. Called after every parameter mutation.
    fn recompute(&mut self) -> Result<()> {
        let src = self
            .original
            .as_ref()
            .ok_or_else(|| FilterError::InvalidState("no image loaded".into()))?;
        let out = apply_pipeline(src, &self.params)?;
        self.surface.present(&out);
        self.rendered = Some(out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Handedness, Landmark};
    use crate::ops::testutil::checker_image;

    fn session_with_image() -> FilterSession<MemorySurface> {
        let mut session = FilterSession::new(MemorySurface::new());
        session.load_image(checker_image(12, 10)).unwrap();
        session
    }

    #[test]
    fn lifecycle_states() {
        let mut session = FilterSession::new(MemorySurface::new());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.set_parameter(Param::Brightness, 10.0).is_err());

        session.load_image(checker_image(4, 4)).unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.surface().last_frame().is_some());

        session.set_parameter(Param::Brightness, 10.0).unwrap();
        assert_eq!(session.state(), SessionState::Modified);

        session.remove_image();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn set_parameter_rejects_out_of_range_and_keeps_state() {
        let mut session = session_with_image();
        session.apply_preset("classic").unwrap();
        assert!(session.set_parameter(Param::Vignette, 101.0).is_err());
        // Failed edit: parameters and preset attribution untouched.
        assert_eq!(session.active_preset(), Some("classic"));
        assert_eq!(session.params().sepia, 30.0);
    }

    #[test]
    fn non_destructive_recompute() {
        // brightness 20 then back to 0 must reproduce the original bytes:
        // recompute always starts from the pristine source.
        let mut session = session_with_image();
        let original = session.surface().last_frame().unwrap().as_raw().clone();

        session.set_parameter(Param::Brightness, 20.0).unwrap();
        assert_ne!(session.surface().last_frame().unwrap().as_raw(), &original);

        session.set_parameter(Param::Brightness, 0.0).unwrap();
        assert_eq!(session.surface().last_frame().unwrap().as_raw(), &original);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut session = session_with_image();
        session.set_parameter(Param::Sepia, 70.0).unwrap();
        session.set_parameter(Param::Tint, -120.0).unwrap();

        session.reset().unwrap();
        let params_once = *session.params();
        let frame_once = session.surface().last_frame().unwrap().as_raw().clone();

        session.reset().unwrap();
        assert_eq!(*session.params(), params_once);
        assert_eq!(session.surface().last_frame().unwrap().as_raw(), &frame_once);
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.active_preset(), None);
    }

    #[test]
    fn preset_overlay_then_manual_edit() {
        let mut session = session_with_image();
        // Manual edits first, to prove the preset is not cumulative.
        session.set_parameter(Param::Brightness, 90.0).unwrap();

        session.apply_preset("vintage").unwrap();
        assert_eq!(session.active_preset(), Some("vintage"));
        assert_eq!(session.params().brightness, 0.0); // reset before overlay
        assert_eq!(session.params().sepia, 50.0);
        assert_eq!(session.params().saturation, 80.0);
        assert_eq!(session.params().tint, 15.0);

        // Manual tweak keeps the other preset fields but drops the label.
        session.set_parameter(Param::Sepia, 10.0).unwrap();
        assert_eq!(session.params().sepia, 10.0);
        assert_eq!(session.params().saturation, 80.0);
        assert_eq!(session.params().tint, 15.0);
        assert_eq!(session.active_preset(), None);
    }

    #[test]
    fn unknown_preset_fails() {
        let mut session = session_with_image();
        assert!(matches!(
            session.apply_preset("does-not-exist"),
            Err(FilterError::InvalidState(_))
        ));
    }

    #[test]
    fn export_requires_a_render() {
        let session = FilterSession::new(MemorySurface::new());
        assert!(session.export_result(SaveFormat::Png, 90).is_err());

        let session = session_with_image();
        let bytes = session.export_result(SaveFormat::Png, 90).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (12, 10));
    }

    #[test]
    fn landmarks_are_opaque_but_shape_checked() {
        let mut session = session_with_image();
        let frame = LandmarkFrame {
            points: vec![Landmark { x: 0.1, y: 0.9 }],
            handedness: Handedness::Left,
        };
        session.attach_landmarks(frame.clone()).unwrap();
        assert_eq!(session.landmarks(), Some(&frame));

        let empty = LandmarkFrame {
            points: vec![],
            handedness: Handedness::Right,
        };
        assert!(session.attach_landmarks(empty).is_err());

        // Landmarks belong to the image; removing it drops them.
        session.remove_image();
        assert!(session.landmarks().is_none());
    }
}
