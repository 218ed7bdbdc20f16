use serde::{Deserialize, Serialize};

use crate::error::DetError;
use crate::unclip::DEFAULT_MAX_MITER;

/// Which polygon the box scorer averages the confidence map over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    /// Score the pass-1 minimum-area rectangle.
    #[default]
    Fast,
    /// Score the traced contour itself.
    Slow,
}

/// Shape of the emitted region polygons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxType {
    /// Four-point oriented rectangle, corners ordered TL, TR, BR, BL.
    #[default]
    Quad,
    /// Expanded simplified contour with an arbitrary number of points.
    Poly,
}

/// Options of the text-region extraction pipeline.
///
/// Missing JSON fields fall back to the defaults below, so a partial
/// config like `{"box_thresh": 0.6}` is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetOptions {
    /// Binarization threshold, `mask = map > thresh`.
    pub thresh: f32,
    /// Minimum mean confidence of a kept region.
    pub box_thresh: f32,
    /// Number of contours (largest first) that reach the geometry steps.
    pub max_candidates: usize,
    pub unclip_ratio: f32,
    /// Minimum axis-aligned box area in original-image pixels.
    pub min_box_area: u32,
    /// Douglas-Peucker tolerance in map pixels.
    pub simplify_epsilon: f32,
    /// Upper bound of the miter factor at polygon corners.
    pub max_miter: f32,
    /// Minimum short side of the candidate rectangle in map pixels; the
    /// expanded rectangle must reach `min_size + 2`. This filter comes on top
    /// of `box_thresh` and `min_box_area` and drops text kernels thinner than
    /// 3px by default. Set it to 0 to filter by score and area only.
    pub min_size: f32,
    pub use_dilation: bool,
    pub score_mode: ScoreMode,
    pub box_type: BoxType,
}

impl Default for DetOptions {
    fn default() -> Self {
        Self {
            thresh: 0.3,
            box_thresh: 0.5,
            max_candidates: 1000,
            unclip_ratio: 1.5,
            min_box_area: 10,
            simplify_epsilon: 2.0,
            max_miter: DEFAULT_MAX_MITER,
            min_size: 3.0,
            use_dilation: false,
            score_mode: ScoreMode::Fast,
            box_type: BoxType::Quad,
        }
    }
}

impl DetOptions {
    pub fn from_json_str(json: &str) -> Result<Self, DetError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), DetError> {
        check_finite("thresh", self.thresh)?;
        check_finite("box_thresh", self.box_thresh)?;
        check_non_negative("unclip_ratio", self.unclip_ratio)?;
        check_non_negative("simplify_epsilon", self.simplify_epsilon)?;
        check_non_negative("min_size", self.min_size)?;

        if !self.max_miter.is_finite() || self.max_miter < 1.0 {
            return Err(DetError::InvalidOption(format!(
                "max_miter must be a finite value >= 1.0, got {}",
                self.max_miter
            )));
        }

        Ok(())
    }
}

fn check_finite(name: &str, value: f32) -> Result<(), DetError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DetError::InvalidOption(format!("{name} must be finite, got {value}")))
    }
}

fn check_non_negative(name: &str, value: f32) -> Result<(), DetError> {
    check_finite(name, value)?;
    if value < 0.0 {
        return Err(DetError::InvalidOption(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}
