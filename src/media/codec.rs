use std::collections::BTreeSet;
use std::fmt;
use std::process::{Command, Stdio};

use crate::foundation::core::Canvas;
use crate::foundation::error::{OverstampError, OverstampResult};

/// Container and codec pair the video compositor can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Vp9WebM,
    Vp8WebM,
    H264Mp4,
    Mpeg4Mp4,
}

impl OutputFormat {
    /// Most preferred first. The last entry is the baseline.
    pub const PREFERENCE: [Self; 4] = [Self::Vp9WebM, Self::Vp8WebM, Self::H264Mp4, Self::Mpeg4Mp4];

    pub fn mime(self) -> &'static str {
        match self {
            Self::Vp9WebM => "video/webm;codecs=vp9",
            Self::Vp8WebM => "video/webm;codecs=vp8",
            Self::H264Mp4 => "video/mp4;codecs=avc1",
            Self::Mpeg4Mp4 => "video/mp4",
        }
    }

    /// ffmpeg encoder name.
    pub fn encoder(self) -> &'static str {
        match self {
            Self::Vp9WebM => "libvpx-vp9",
            Self::Vp8WebM => "libvpx",
            Self::H264Mp4 => "libx264",
            Self::Mpeg4Mp4 => "mpeg4",
        }
    }

    /// ffmpeg muxer name.
    pub fn muxer(self) -> &'static str {
        match self {
            Self::Vp9WebM | Self::Vp8WebM => "webm",
            Self::H264Mp4 | Self::Mpeg4Mp4 => "mp4",
        }
    }

    pub fn extension(self) -> &'static str {
        self.muxer()
    }

    /// libx264 rejects odd frame sizes with 4:2:0 chroma.
    pub fn requires_even_dims(self) -> bool {
        matches!(self, Self::H264Mp4)
    }

    pub fn accepts(self, canvas: Canvas) -> bool {
        !self.requires_even_dims()
            || (canvas.width.is_multiple_of(2) && canvas.height.is_multiple_of(2))
    }

    /// Encoder and muxer options placed after `-c:v <encoder>`.
    pub(crate) fn codec_args(self) -> &'static [&'static str] {
        match self {
            Self::Vp9WebM => &[
                "-b:v", "0", "-crf", "32", "-deadline", "realtime", "-cpu-used", "8", "-row-mt",
                "1",
            ],
            Self::Vp8WebM => &["-b:v", "4M", "-deadline", "realtime", "-cpu-used", "8"],
            Self::H264Mp4 => &[
                "-preset",
                "veryfast",
                "-movflags",
                "frag_keyframe+empty_moov+default_base_moof",
            ],
            Self::Mpeg4Mp4 => &[
                "-q:v",
                "4",
                "-movflags",
                "frag_keyframe+empty_moov+default_base_moof",
            ],
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Encoders and muxers available in the host ffmpeg build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodecSupport {
    encoders: BTreeSet<String>,
    muxers: BTreeSet<String>,
}

impl CodecSupport {
    pub fn from_listings(encoders: &str, muxers: &str) -> Self {
        Self {
            encoders: parse_encoders(encoders),
            muxers: parse_muxers(muxers),
        }
    }

    /// Ask the ffmpeg on `PATH` once for its video encoders and muxers.
    pub fn query() -> OverstampResult<Self> {
        let encoders = ffmpeg_listing("-encoders")?;
        let muxers = ffmpeg_listing("-muxers")?;
        Ok(Self::from_listings(&encoders, &muxers))
    }

    pub fn supports(&self, format: OutputFormat) -> bool {
        self.encoders.contains(format.encoder()) && self.muxers.contains(format.muxer())
    }

    /// First supported format in [`OutputFormat::PREFERENCE`] that can encode `canvas`.
    pub fn select(&self, canvas: Canvas) -> OverstampResult<OutputFormat> {
        OutputFormat::PREFERENCE
            .into_iter()
            .find(|f| self.supports(*f) && f.accepts(canvas))
            .ok_or_else(|| {
                OverstampError::unsupported_format(format!(
                    "no supported video format for {}x{} (tried {})",
                    canvas.width,
                    canvas.height,
                    OutputFormat::PREFERENCE
                        .iter()
                        .map(|f| f.encoder())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

fn ffmpeg_listing(flag: &str) -> OverstampResult<String> {
    let out = Command::new("ffmpeg")
        .args(["-hide_banner", flag])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| {
            OverstampError::unsupported_format(format!(
                "failed to run ffmpeg {flag} (is it installed and on PATH?): {e}"
            ))
        })?;
    if !out.status.success() {
        return Err(OverstampError::unsupported_format(format!(
            "ffmpeg {flag} exited with status {}",
            out.status
        )));
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// Entries of an ffmpeg listing: `(flags, names)` for every row after the `--` separator line.
fn listing_rows(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines()
        .skip_while(|l| !l.trim_start().starts_with("--"))
        .skip(1)
        .filter_map(|l| {
            let mut parts = l.split_whitespace();
            Some((parts.next()?, parts.next()?))
        })
}

/// Video encoder names from `ffmpeg -encoders`.
pub(crate) fn parse_encoders(text: &str) -> BTreeSet<String> {
    listing_rows(text)
        .filter(|(flags, _)| flags.starts_with('V'))
        .map(|(_, name)| name.to_owned())
        .collect()
}

/// Muxer names from `ffmpeg -muxers`. Rows may list several comma-separated names.
pub(crate) fn parse_muxers(text: &str) -> BTreeSet<String> {
    listing_rows(text)
        .filter(|(flags, _)| flags.contains('E'))
        .flat_map(|(_, names)| names.split(','))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/media/codec.rs"]
mod tests;
