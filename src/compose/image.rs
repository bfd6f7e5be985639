use crate::assets::decode::{DecodedImage, decode_raster};
use crate::assets::payload::{EncodedRaster, RasterPayload};
use crate::compose::effective_placement;
use crate::config::{Placement, WatermarkConfig};
use crate::foundation::error::OverstampResult;
use crate::render::filter::StyleFilter;
use crate::render::frame::FrameRGBA;
use crate::render::overlay::{DropShadow, PreparedOverlay};
use crate::render::surface::Surface;

/// Drawing options shared by the image and video compositors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComposeOpts {
    /// Applied to the base draw and to the watermark draw.
    pub filter: StyleFilter,
    pub shadow: Option<DropShadow>,
}

impl Default for ComposeOpts {
    fn default() -> Self {
        Self {
            filter: StyleFilter::ENHANCE,
            shadow: Some(DropShadow::STANDARD),
        }
    }
}

impl ComposeOpts {
    pub fn with_filter(mut self, filter: StyleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_shadow(mut self, shadow: Option<DropShadow>) -> Self {
        self.shadow = shadow;
        self
    }
}

/// Burn `cfg`'s watermark into `source` and return a PNG at the source's native size.
///
/// The placement is clamped into its valid ranges first (with a warning), so any stored preset
/// can be drawn. The `"none"` preset is not special here; callers filter it out
/// (see [`crate::apply_image`]).
pub fn compose_image(source: &RasterPayload, cfg: &WatermarkConfig) -> OverstampResult<EncodedRaster> {
    compose_image_with(source, cfg, &ComposeOpts::default())
}

/// [`compose_image`] with explicit drawing options.
#[tracing::instrument(level = "debug", skip_all, fields(preset = %cfg.id))]
pub fn compose_image_with(
    source: &RasterPayload,
    cfg: &WatermarkConfig,
    opts: &ComposeOpts,
) -> OverstampResult<EncodedRaster> {
    let base = decode_raster(source)?;
    let mark = decode_raster(&cfg.image)?;
    let placement = effective_placement(cfg);
    render_still(&base, &mark, &placement, opts)?.encode_png()
}

/// Composite decoded images into a premultiplied frame.
pub fn render_still(
    base: &DecodedImage,
    mark: &DecodedImage,
    placement: &Placement,
    opts: &ComposeOpts,
) -> OverstampResult<FrameRGBA> {
    let mut surface = Surface::new(base.canvas())?;
    let overlay = PreparedOverlay::new(mark, opts.filter)?;
    let lut = (!opts.filter.is_identity()).then(|| opts.filter.lut());
    surface.draw_base(&base.rgba8_premul, base.width, base.height, lut.as_ref())?;
    let layout = surface.draw_overlay(&overlay, placement, opts.shadow)?;
    tracing::debug!(
        width = base.width,
        height = base.height,
        target = ?layout.target_rect(),
        rotation = placement.rotation,
        "watermark drawn"
    );
    Ok(surface.to_frame())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/image.rs"]
mod tests;
