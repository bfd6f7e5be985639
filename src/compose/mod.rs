//! The two compositors and the caller-side helpers that choose whether to run them.

pub(crate) mod apply;
pub(crate) mod image;
pub(crate) mod video;

use crate::config::{Placement, WatermarkConfig};

/// Clamp the preset's placement before drawing. Out-of-range values are logged.
pub(crate) fn effective_placement(cfg: &WatermarkConfig) -> Placement {
    let p = cfg.placement.sanitized();
    if !cfg.placement.is_within_bounds() {
        tracing::warn!(
            preset = %cfg.id,
            requested = ?cfg.placement,
            clamped = ?p,
            "watermark placement out of range, clamping"
        );
    }
    p
}
