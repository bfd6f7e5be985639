use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::foundation::error::{OverstampError, OverstampResult};

pub const SVG_MIME: &str = "image/svg+xml";
pub const PNG_MIME: &str = "image/png";

/// Opaque, MIME-typed encoded raster as handed over by an editor or a generation backend.
///
/// Payloads are parsed lazily: a malformed data URI is only reported (as a decode error) when
/// the bytes are requested.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RasterPayload {
    /// `data:<mime>[;base64],<data>` string.
    DataUri(String),
    /// Raw encoded bytes with an optional MIME type.
    Bytes {
        /// MIME type if known (sniffed otherwise).
        mime: Option<String>,
        /// Encoded file bytes.
        bytes: Arc<Vec<u8>>,
    },
}

impl RasterPayload {
    pub fn from_bytes(mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self::Bytes {
            mime,
            bytes: Arc::new(bytes),
        }
    }

    /// Read an encoded image file, deriving the MIME type from its extension.
    pub fn from_file(path: &Path) -> OverstampResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
        let mime = if is_svg {
            Some(SVG_MIME.to_owned())
        } else {
            image::ImageFormat::from_path(path)
                .ok()
                .map(|f| f.to_mime_type().to_owned())
        };
        Ok(Self::from_bytes(mime, bytes))
    }

    /// Declared (or sniffed) MIME type. `None` when nothing can be determined.
    pub fn mime(&self) -> Option<String> {
        match self {
            Self::DataUri(s) => parse_header(s).ok().and_then(|(mime, _)| mime),
            Self::Bytes { mime: Some(m), .. } => Some(m.clone()),
            Self::Bytes { mime: None, bytes } => sniff_mime(bytes).map(str::to_owned),
        }
    }

    /// Encoded bytes of the payload.
    pub fn bytes(&self) -> OverstampResult<Cow<'_, [u8]>> {
        match self {
            Self::DataUri(s) => parse_data_uri(s).map(|(_, bytes)| Cow::Owned(bytes)),
            Self::Bytes { bytes, .. } => Ok(Cow::Borrowed(bytes.as_slice())),
        }
    }

    /// Render the payload as a base64 data URI.
    pub fn to_data_uri(&self) -> String {
        match self {
            Self::DataUri(s) => s.clone(),
            Self::Bytes { bytes, .. } => {
                let mime = self
                    .mime()
                    .unwrap_or_else(|| "application/octet-stream".to_owned());
                format!("data:{mime};base64,{}", STANDARD.encode(bytes.as_slice()))
            }
        }
    }
}

impl From<String> for RasterPayload {
    fn from(s: String) -> Self {
        Self::DataUri(s)
    }
}

impl From<RasterPayload> for String {
    fn from(p: RasterPayload) -> Self {
        p.to_data_uri()
    }
}

/// Compositor output: an encoded raster with its MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedRaster {
    /// MIME type of `bytes` (always `image/png` for compositor output).
    pub mime: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

impl EncodedRaster {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    pub fn into_payload(self) -> RasterPayload {
        RasterPayload::from_bytes(Some(self.mime), self.bytes)
    }
}

fn parse_header(s: &str) -> OverstampResult<(Option<String>, bool)> {
    let rest = s
        .strip_prefix("data:")
        .ok_or_else(|| OverstampError::decode("payload is not a data URI"))?;
    let (header, _) = rest
        .split_once(',')
        .ok_or_else(|| OverstampError::decode("data URI is missing its ',' separator"))?;
    let mut parts = header.split(';');
    let mime = parts
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_ascii_lowercase);
    let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));
    Ok((mime, is_base64))
}

fn parse_data_uri(s: &str) -> OverstampResult<(Option<String>, Vec<u8>)> {
    let (mime, is_base64) = parse_header(s)?;
    let data = s
        .split_once(',')
        .map(|(_, d)| d)
        .ok_or_else(|| OverstampError::decode("data URI is missing its ',' separator"))?;

    let bytes = if is_base64 {
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| OverstampError::decode(format!("invalid base64 in data URI: {e}")))?
    } else {
        urlencoding::decode_binary(data.as_bytes()).into_owned()
    };
    if bytes.is_empty() {
        return Err(OverstampError::decode("data URI carries no bytes"));
    }
    Ok((mime, bytes))
}

pub(crate) fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if looks_like_svg(bytes) {
        return Some(SVG_MIME);
    }
    image::guess_format(bytes).ok().map(|f| f.to_mime_type())
}

pub(crate) fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/payload.rs"]
mod tests;
