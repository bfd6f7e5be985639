use std::io::Cursor;

use crate::assets::payload::{EncodedRaster, PNG_MIME};
use crate::foundation::core::Canvas;
use crate::foundation::error::{OverstampError, OverstampResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// A captured RGBA8 frame, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// Straight-alpha copy of the pixels, as image encoders and ffmpeg's `rgba` expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    /// Encode as PNG. Identical frames always produce identical bytes.
    pub fn encode_png(&self) -> OverstampResult<EncodedRaster> {
        let rgba = image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba8())
            .ok_or_else(|| OverstampError::encode("frame buffer does not match its dimensions"))?;
        let mut bytes = Vec::new();
        rgba.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| OverstampError::encode(format!("png encode failed: {e}")))?;
        Ok(EncodedRaster {
            mime: PNG_MIME.to_owned(),
            bytes,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
