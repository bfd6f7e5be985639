use std::sync::Arc;

use crate::assets::payload::{RasterPayload, SVG_MIME, looks_like_svg};
use crate::assets::svg::{parse_svg, rasterize_svg_to_premul_rgba8, svg_intrinsic_size};
use crate::foundation::core::Canvas;
use crate::foundation::error::{OverstampError, OverstampResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster in premultiplied RGBA8 at its native resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 bytes.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap straight-alpha RGBA8 pixels, premultiplying them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> OverstampResult<Self> {
        if rgba.len() != Canvas::new(width, height).rgba8_len() {
            return Err(OverstampError::decode(format!(
                "pixel buffer of {} bytes does not match {width}x{height}",
                rgba.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba);
        Self::from_premul_rgba8(width, height, rgba)
    }

    pub fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: Vec<u8>) -> OverstampResult<Self> {
        if width == 0 || height == 0 {
            return Err(OverstampError::decode("decoded image has zero width or height"));
        }
        if rgba8_premul.len() != Canvas::new(width, height).rgba8_len() {
            return Err(OverstampError::decode("decoded image byte length mismatch"));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// Natural aspect ratio (`width / height`).
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Decode an encoded raster payload (PNG, JPEG, WebP, GIF, SVG, ...).
pub fn decode_raster(payload: &RasterPayload) -> OverstampResult<DecodedImage> {
    let bytes = payload.bytes()?;
    let is_svg = payload.mime().as_deref() == Some(SVG_MIME) || looks_like_svg(&bytes);
    if is_svg {
        return decode_svg(&bytes);
    }
    decode_image(&bytes)
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> OverstampResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| OverstampError::decode(format!("failed to decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    DecodedImage::from_straight_rgba8(width, height, rgba.into_raw())
}

fn decode_svg(bytes: &[u8]) -> OverstampResult<DecodedImage> {
    let tree = parse_svg(bytes)?;
    let (width, height) = svg_intrinsic_size(&tree)?;
    let rgba8_premul = rasterize_svg_to_premul_rgba8(&tree, width, height)?;
    DecodedImage::from_premul_rgba8(width, height, rgba8_premul)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
