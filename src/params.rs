// ============================================================================
// FILTER PARAMETERS & PRESETS
// ============================================================================
//
// FilterParameters is the full slider record for one image. Every field has
// a documented range and a neutral value at which its transform is a no-op;
// the default record is all-neutral. Presets are partial overlays applied on
// top of a fresh neutral record (never cumulative with manual edits).
// ============================================================================

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// Names every adjustable slider, so parameters can be set dynamically
/// (CLI flags, UI bindings) with per-parameter range validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    Brightness,
    Contrast,
    Saturation,
    Blur,
    Sepia,
    Vintage,
    Sharpness,
    Temperature,
    Tint,
    Vignette,
}

impl Param {
    pub const ALL: [Param; 10] = [
        Param::Brightness,
        Param::Contrast,
        Param::Saturation,
        Param::Blur,
        Param::Sepia,
        Param::Vintage,
        Param::Sharpness,
        Param::Temperature,
        Param::Tint,
        Param::Vignette,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Param::Brightness => "brightness",
            Param::Contrast => "contrast",
            Param::Saturation => "saturation",
            Param::Blur => "blur",
            Param::Sepia => "sepia",
            Param::Vintage => "vintage",
            Param::Sharpness => "sharpness",
            Param::Temperature => "temperature",
            Param::Tint => "tint",
            Param::Vignette => "vignette",
        }
    }

    /// Inclusive (min, max) domain for this slider.
    pub fn range(self) -> (f32, f32) {
        match self {
            Param::Brightness => (-100.0, 100.0),
            Param::Contrast => (-100.0, 100.0),
            Param::Saturation => (0.0, 200.0),
            Param::Blur => (0.0, 10.0),
            Param::Sepia => (0.0, 100.0),
            Param::Vintage => (0.0, 100.0),
            Param::Sharpness => (-50.0, 100.0),
            Param::Temperature => (-100.0, 100.0),
            Param::Tint => (-180.0, 180.0),
            Param::Vignette => (0.0, 100.0),
        }
    }

    /// The value at which this parameter's transform is the identity.
    pub fn neutral(self) -> f32 {
        match self {
            Param::Saturation => 100.0,
            _ => 0.0,
        }
    }

    /// Reject values outside the documented domain. NaN is never in range.
    pub fn validate(self, value: f32) -> Result<()> {
        let (min, max) = self.range();
        if value.is_nan() || value < min || value > max {
            return Err(FilterError::InvalidParameter {
                name: self.name(),
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

/// The full slider record for one image.
///
/// Serialized to JSON for parameter files (`--params`) and preset storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParameters {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub blur: f32,
    pub sepia: f32,
    pub vintage: f32,
    pub sharpness: f32,
    pub temperature: f32,
    pub tint: f32,
    pub vignette: f32,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            saturation: 100.0,
            blur: 0.0,
            sepia: 0.0,
            vintage: 0.0,
            sharpness: 0.0,
            temperature: 0.0,
            tint: 0.0,
            vignette: 0.0,
        }
    }
}

impl FilterParameters {
    /// All-neutral record (identity pipeline).
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn get(&self, param: Param) -> f32 {
        match param {
            Param::Brightness => self.brightness,
            Param::Contrast => self.contrast,
            Param::Saturation => self.saturation,
            Param::Blur => self.blur,
            Param::Sepia => self.sepia,
            Param::Vintage => self.vintage,
            Param::Sharpness => self.sharpness,
            Param::Temperature => self.temperature,
            Param::Tint => self.tint,
            Param::Vignette => self.vignette,
        }
    }

    /// Set one slider, rejecting out-of-range values.
    pub fn set(&mut self, param: Param, value: f32) -> Result<()> {
        param.validate(value)?;
        let slot = match param {
            Param::Brightness => &mut self.brightness,
            Param::Contrast => &mut self.contrast,
            Param::Saturation => &mut self.saturation,
            Param::Blur => &mut self.blur,
            Param::Sepia => &mut self.sepia,
            Param::Vintage => &mut self.vintage,
            Param::Sharpness => &mut self.sharpness,
            Param::Temperature => &mut self.temperature,
            Param::Tint => &mut self.tint,
            Param::Vignette => &mut self.vignette,
        };
        *slot = value;
        Ok(())
    }

    /// True when every slider sits at its neutral value.
    pub fn is_neutral(&self) -> bool {
        Param::ALL.iter().all(|&p| self.get(p) == p.neutral())
    }

    /// Validate every field against its domain (used on records built from
    /// deserialized JSON rather than through `set`).
    pub fn validate(&self) -> Result<()> {
        for &p in Param::ALL.iter() {
            p.validate(self.get(p))?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// PRESETS
// ============================================================================

/// A named bundle of partial parameter overrides. Fields left `None` stay at
/// their neutral values when the preset is resolved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterPreset {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sepia: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vintage: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vignette: Option<f32>,
}

impl FilterPreset {
    /// Resolve to a full record: neutral defaults overlaid with the preset's
    /// fields. Applying a preset is never cumulative with prior edits.
    pub fn resolve(&self) -> FilterParameters {
        let mut p = FilterParameters::neutral();
        if let Some(v) = self.brightness {
            p.brightness = v;
        }
        if let Some(v) = self.contrast {
            p.contrast = v;
        }
        if let Some(v) = self.saturation {
            p.saturation = v;
        }
        if let Some(v) = self.blur {
            p.blur = v;
        }
        if let Some(v) = self.sepia {
            p.sepia = v;
        }
        if let Some(v) = self.vintage {
            p.vintage = v;
        }
        if let Some(v) = self.sharpness {
            p.sharpness = v;
        }
        if let Some(v) = self.temperature {
            p.temperature = v;
        }
        if let Some(v) = self.tint {
            p.tint = v;
        }
        if let Some(v) = self.vignette {
            p.vignette = v;
        }
        p
    }
}

/// Built-in presets shipped with the tool.
pub fn builtin_presets() -> &'static [FilterPreset] {
    static PRESETS: OnceLock<Vec<FilterPreset>> = OnceLock::new();
    PRESETS.get_or_init(|| {
        vec![
            FilterPreset {
                id: "enhance".into(),
                name: "Enhance".into(),
                brightness: Some(10.0),
                contrast: Some(20.0),
                saturation: Some(110.0),
                ..Default::default()
            },
            FilterPreset {
                id: "classic".into(),
                name: "Classic".into(),
                sepia: Some(30.0),
                contrast: Some(10.0),
                ..Default::default()
            },
            FilterPreset {
                id: "vintage".into(),
                name: "Vintage".into(),
                sepia: Some(50.0),
                saturation: Some(80.0),
                tint: Some(15.0),
                ..Default::default()
            },
            FilterPreset {
                id: "mystic".into(),
                name: "Mystic".into(),
                contrast: Some(30.0),
                saturation: Some(150.0),
                tint: Some(-90.0),
                ..Default::default()
            },
            FilterPreset {
                id: "gold".into(),
                name: "Golden".into(),
                sepia: Some(80.0),
                saturation: Some(200.0),
                tint: Some(10.0),
                brightness: Some(10.0),
                ..Default::default()
            },
        ]
    })
}

/// Look up a built-in preset by id.
pub fn find_preset(id: &str) -> Option<&'static FilterPreset> {
    builtin_presets().iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_neutral() {
        let params = FilterParameters::default();
        assert!(params.is_neutral());
        assert_eq!(params.saturation, 100.0);
        assert_eq!(params.brightness, 0.0);
    }

    #[test]
    fn set_rejects_out_of_range() {
        let mut params = FilterParameters::neutral();
        assert!(params.set(Param::Brightness, 101.0).is_err());
        assert!(params.set(Param::Saturation, -1.0).is_err());
        assert!(params.set(Param::Blur, f32::NAN).is_err());
        // Rejected sets leave the record untouched.
        assert!(params.is_neutral());

        params.set(Param::Contrast, -100.0).unwrap();
        params.set(Param::Tint, 180.0).unwrap();
        assert_eq!(params.contrast, -100.0);
        assert_eq!(params.tint, 180.0);
    }

    #[test]
    fn json_round_trip() {
        let mut params = FilterParameters::neutral();
        params.set(Param::Sepia, 35.0).unwrap();
        params.set(Param::Temperature, -20.0).unwrap();

        let json = params.to_json().unwrap();
        let restored = FilterParameters::from_json(&json).unwrap();
        assert_eq!(params, restored);
        assert!(!restored.is_neutral());
    }

    #[test]
    fn partial_json_fills_neutral_defaults() {
        let restored = FilterParameters::from_json(r#"{"vignette": 40.0}"#).unwrap();
        assert_eq!(restored.vignette, 40.0);
        assert_eq!(restored.saturation, 100.0);
        assert_eq!(restored.brightness, 0.0);
    }

    #[test]
    fn preset_resolves_from_neutral() {
        let vintage = find_preset("vintage").unwrap();
        let params = vintage.resolve();
        assert_eq!(params.sepia, 50.0);
        assert_eq!(params.saturation, 80.0);
        assert_eq!(params.tint, 15.0);
        // Fields the preset does not name stay neutral.
        assert_eq!(params.brightness, 0.0);
        assert_eq!(params.vignette, 0.0);
    }

    #[test]
    fn builtin_presets_are_valid() {
        for preset in builtin_presets() {
            preset.resolve().validate().unwrap();
        }
        assert!(find_preset("no-such-preset").is_none());
    }
}
