// ============================================================================
// LANDMARK INPUT CONTRACT
// ============================================================================
//
// Landmarks arrive from an external detector as an ordered list of
// normalized points plus a handedness tag. This crate treats them as opaque
// cargo: the only check performed is shape (a non-empty ordered sequence),
// never semantic plausibility.
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// One detected point, normalized to [0,1] per axis by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

/// A full detection result for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub points: Vec<Landmark>,
    pub handedness: Handedness,
}

impl LandmarkFrame {
    /// Shape check only: the point list must be non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.points.is_empty() {
            return Err(FilterError::InvalidState(
                "landmark frame contains no points".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frame_is_rejected() {
        let frame = LandmarkFrame {
            points: vec![],
            handedness: Handedness::Left,
        };
        assert!(frame.validate().is_err());
    }

    #[test]
    fn any_non_empty_frame_passes() {
        // Out-of-range coordinates are the provider's problem, not ours.
        let frame = LandmarkFrame {
            points: vec![Landmark { x: 0.5, y: 0.25 }, Landmark { x: 7.0, y: -1.0 }],
            handedness: Handedness::Right,
        };
        assert!(frame.validate().is_ok());
    }
}
