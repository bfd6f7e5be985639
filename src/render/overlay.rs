use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::Size;
use crate::foundation::error::{OverstampError, OverstampResult};
use crate::render::blur::radius_for_sigma;
use crate::render::filter::StyleFilter;

/// Black drop shadow drawn under the watermark with zero offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropShadow {
    /// Shadow color alpha, before the placement opacity is applied.
    pub alpha: f32,
    /// CSS-style blur length in pixels. The Gaussian sigma is half of it.
    pub blur_px: f32,
}

impl Default for DropShadow {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl DropShadow {
    /// `rgba(0, 0, 0, 0.5)` with a 4 px blur.
    pub const STANDARD: Self = Self {
        alpha: 0.5,
        blur_px: 4.0,
    };

    pub fn sigma(&self) -> f32 {
        self.blur_px / 2.0
    }

    pub fn radius(&self) -> u32 {
        radius_for_sigma(self.sigma())
    }
}

/// A decoded watermark with the compositor filter already applied, ready to be drawn on any
/// number of surfaces.
#[derive(Clone)]
pub struct PreparedOverlay {
    width: u32,
    height: u32,
    paint: vello_cpu::Image,
}

impl std::fmt::Debug for PreparedOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedOverlay")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PreparedOverlay {
    pub fn new(image: &DecodedImage, filter: StyleFilter) -> OverstampResult<Self> {
        let mut rgba = image.rgba8_premul.as_ref().clone();
        if !filter.is_identity() {
            filter.lut().apply_premul_in_place(&mut rgba);
        }
        let pixmap = premul_bytes_to_pixmap(&rgba, image.width, image.height)?;
        Ok(Self {
            width: image.width,
            height: image.height,
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn natural_size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        self.paint.clone()
    }
}

pub(crate) fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> OverstampResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| OverstampError::encode(format!("image width {width} exceeds 65535")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| OverstampError::encode(format!("image height {height} exceeds 65535")))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(OverstampError::validation("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<_> = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
