//! Caller-side wrappers around the compositors.
//!
//! They intercept the `"none"` preset so the compositors never see it, and they turn compositor
//! failures into a fallback to the unwatermarked asset while keeping the error for the caller.

use rayon::prelude::*;

use crate::assets::payload::{EncodedRaster, RasterPayload};
use crate::compose::image::{ComposeOpts, compose_image_with};
use crate::compose::video::{ComposedVideo, VideoComposeOpts, compose_video};
use crate::config::WatermarkConfig;
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::OverstampError;
use crate::media::probe::VideoSource;

/// What happened to one asset.
#[derive(Debug)]
pub enum Applied<T> {
    Watermarked(T),
    /// No watermark is active; the compositor was not invoked.
    Skipped,
    /// The compositor failed; the original asset should be used.
    Fallback(OverstampError),
}

impl<T> Applied<T> {
    pub fn is_watermarked(&self) -> bool {
        matches!(self, Self::Watermarked(_))
    }

    pub fn error(&self) -> Option<&OverstampError> {
        match self {
            Self::Fallback(e) => Some(e),
            _ => None,
        }
    }

    pub fn output(self) -> Option<T> {
        match self {
            Self::Watermarked(v) => Some(v),
            _ => None,
        }
    }
}

impl Applied<EncodedRaster> {
    /// The watermarked image, or `original` when skipped or failed.
    pub fn into_payload_or(self, original: RasterPayload) -> RasterPayload {
        match self {
            Self::Watermarked(out) => out.into_payload(),
            _ => original,
        }
    }
}

fn active(cfg: Option<&WatermarkConfig>) -> Option<&WatermarkConfig> {
    cfg.filter(|c| !c.is_none_sentinel())
}

/// Watermark one image if a real preset is active.
pub fn apply_image(
    source: &RasterPayload,
    cfg: Option<&WatermarkConfig>,
    opts: &ComposeOpts,
) -> Applied<EncodedRaster> {
    let Some(cfg) = active(cfg) else {
        return Applied::Skipped;
    };
    match compose_image_with(source, cfg, opts) {
        Ok(out) => Applied::Watermarked(out),
        Err(e) => {
            tracing::error!(preset = %cfg.id, error = %e, "image watermarking failed, using original");
            Applied::Fallback(e)
        }
    }
}

/// [`apply_image`] over a batch on the rayon pool. Results keep the input order; one failure
/// does not affect the other items.
pub fn apply_images(
    sources: &[RasterPayload],
    cfg: Option<&WatermarkConfig>,
    opts: &ComposeOpts,
) -> Vec<Applied<EncodedRaster>> {
    if active(cfg).is_none() {
        return sources.iter().map(|_| Applied::Skipped).collect();
    }
    sources
        .par_iter()
        .map(|source| apply_image(source, cfg, opts))
        .collect()
}

/// Watermark one video if a real preset is active.
pub fn apply_video(
    source: &VideoSource,
    cfg: Option<&WatermarkConfig>,
    opts: &VideoComposeOpts,
    cancel: &CancelToken,
) -> Applied<ComposedVideo> {
    let Some(cfg) = active(cfg) else {
        return Applied::Skipped;
    };
    match compose_video(source, cfg, opts, cancel) {
        Ok(out) => Applied::Watermarked(out),
        Err(e) => {
            tracing::error!(preset = %cfg.id, error = %e, "video watermarking failed, using original");
            Applied::Fallback(e)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/apply.rs"]
mod tests;
