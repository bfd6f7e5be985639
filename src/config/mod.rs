//! Watermark preset records and their numeric placement.

pub(crate) mod presets;

use std::ops::RangeInclusive;

use crate::assets::payload::RasterPayload;
use crate::foundation::core::{Canvas, Point};

/// Reserved preset id meaning "no watermark".
pub const NONE_ID: &str = "none";

/// Horizontal center position, percent of canvas width.
pub const X_RANGE: RangeInclusive<f64> = 0.0..=100.0;
/// Vertical center position, percent of canvas height.
pub const Y_RANGE: RangeInclusive<f64> = 0.0..=100.0;
/// Watermark width, percent of canvas width.
pub const SCALE_RANGE: RangeInclusive<f64> = 5.0..=100.0;
/// Global alpha applied to the watermark draw.
pub const OPACITY_RANGE: RangeInclusive<f64> = 0.1..=1.0;
/// Rotation in degrees.
pub const ROTATION_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Display name given to a preset created from scratch.
pub const DEFAULT_PRESET_NAME: &str = "My Watermark";

/// Resolution-independent placement of a watermark on a target canvas.
///
/// `x`/`y` locate the watermark's center (not its top-left corner). Only the width is stored;
/// the height always follows from the watermark's natural aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub opacity: f64,
    pub rotation: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 90.0,
            y: 90.0,
            scale: 15.0,
            opacity: 0.9,
            rotation: 0.0,
        }
    }
}

impl Placement {
    /// Clamp every field into its editor range. Non-finite values take the default.
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            x: clamp_field(self.x, &X_RANGE, d.x),
            y: clamp_field(self.y, &Y_RANGE, d.y),
            scale: clamp_field(self.scale, &SCALE_RANGE, d.scale),
            opacity: clamp_field(self.opacity, &OPACITY_RANGE, d.opacity),
            rotation: clamp_field(self.rotation, &ROTATION_RANGE, d.rotation),
        }
    }

    /// [`Placement::clamped`] plus rotation folded into `(-180, 180]`, so that `-180` and `180`
    /// describe the same transform bit for bit.
    pub fn sanitized(self) -> Self {
        let mut p = self.clamped();
        if p.rotation <= -180.0 {
            p.rotation = 180.0;
        }
        p
    }

    pub fn is_within_bounds(&self) -> bool {
        X_RANGE.contains(&self.x)
            && Y_RANGE.contains(&self.y)
            && SCALE_RANGE.contains(&self.scale)
            && OPACITY_RANGE.contains(&self.opacity)
            && ROTATION_RANGE.contains(&self.rotation)
    }

    /// Watermark center in pixel space of `canvas`.
    pub fn center_px(&self, canvas: Canvas) -> Point {
        Point::new(
            self.x / 100.0 * f64::from(canvas.width),
            self.y / 100.0 * f64::from(canvas.height),
        )
    }

    pub fn rotation_rad(&self) -> f64 {
        self.rotation.to_radians()
    }
}

fn clamp_field(v: f64, range: &RangeInclusive<f64>, default: f64) -> f64 {
    if !v.is_finite() {
        return default;
    }
    v.clamp(*range.start(), *range.end())
}

/// A named, persisted watermark preset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WatermarkConfig {
    pub id: String,
    pub name: String,
    /// Encoded watermark raster at its native resolution.
    #[serde(rename = "imageBase64")]
    pub image: RasterPayload,
    #[serde(flatten)]
    pub placement: Placement,
}

impl WatermarkConfig {
    /// New preset with the default placement.
    pub fn new(id: impl Into<String>, name: impl Into<String>, image: RasterPayload) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image,
            placement: Placement::default(),
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Return `true` when this record carries the reserved "no watermark" id.
    pub fn is_none_sentinel(&self) -> bool {
        self.id == NONE_ID
    }
}

/// Fresh preset id: the current UNIX time in milliseconds.
pub fn generate_preset_id() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
        .to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/config/placement.rs"]
mod tests;
