use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{OverstampError, OverstampResult};

/// Where a source video comes from. Anything ffmpeg can open is accepted as a URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoSource {
    Path(PathBuf),
    Url(String),
}

impl VideoSource {
    /// Treat `s` as a URL when it has a scheme, otherwise as a filesystem path.
    pub fn parse(s: &str) -> Self {
        match s.split_once("://") {
            Some((scheme, _))
                if !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                Self::Url(s.to_owned())
            }
            _ => Self::Path(PathBuf::from(s)),
        }
    }

    pub(crate) fn ffmpeg_input(&self) -> OsString {
        match self {
            Self::Path(p) => p.clone().into_os_string(),
            Self::Url(u) => OsString::from(u),
        }
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
        }
    }
}

/// Stream metadata read before any frame is decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSourceInfo {
    pub source: VideoSource,
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Container duration. Live or unfinalized streams may not report one.
    pub duration_secs: Option<f64>,
    pub has_audio: bool,
}

impl VideoSourceInfo {
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    pub fn source_fps(&self) -> f64 {
        self.fps.as_f64()
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
    tags: Option<ProbeTags>,
}

#[derive(serde::Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(serde::Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

impl ProbeStream {
    /// Display rotation in degrees from the display matrix, or the legacy `rotate` tag.
    fn rotation_degrees(&self) -> f64 {
        self.side_data_list
            .iter()
            .find_map(|d| d.rotation)
            .or_else(|| {
                self.tags
                    .as_ref()
                    .and_then(|t| t.rotate.as_deref())
                    .and_then(|r| r.trim().parse::<f64>().ok())
            })
            .filter(|r| r.is_finite())
            .unwrap_or(0.0)
    }

    /// `true` when the displayed picture is the stored one turned by a quarter turn.
    fn is_quarter_turned(&self) -> bool {
        let quarters = (self.rotation_degrees() / 90.0).round() as i64;
        quarters.rem_euclid(2) == 1
    }
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Read width, height, frame rate, duration and audio presence with `ffprobe`.
#[tracing::instrument(level = "debug", skip_all, fields(source = %source))]
pub fn probe_video(source: &VideoSource) -> OverstampResult<VideoSourceInfo> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source.ffmpeg_input())
        .stdin(Stdio::null())
        .output()
        .map_err(|e| OverstampError::decode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(OverstampError::decode(format!(
            "ffprobe failed for '{source}': {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_json(&out.stdout, source.clone())
}

pub(crate) fn parse_probe_json(json: &[u8], source: VideoSource) -> OverstampResult<VideoSourceInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| OverstampError::decode(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| OverstampError::decode(format!("no video stream found in '{source}'")))?;
    let stored_width = video
        .width
        .filter(|&w| w > 0)
        .ok_or_else(|| OverstampError::decode("missing video width from ffprobe"))?;
    let stored_height = video
        .height
        .filter(|&h| h > 0)
        .ok_or_else(|| OverstampError::decode("missing video height from ffprobe"))?;
    // ffmpeg autorotates decoded frames, so the canvas follows the displayed orientation.
    let (width, height) = if video.is_quarter_turned() {
        (stored_height, stored_width)
    } else {
        (stored_width, stored_height)
    };

    // `r_frame_rate` is the timebase for some WebM/Matroska streams (`1000/1`), and
    // `avg_frame_rate` is `0/0` for others.
    let fps = [video.avg_frame_rate.as_deref(), video.r_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|r| Fps::parse_ratio(r).ok())
        .ok_or_else(|| OverstampError::decode("video stream reports no usable frame rate"))?;

    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| parse_secs(f.duration.as_deref()))
        .or_else(|| parse_secs(video.duration.as_deref()));
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        source,
        width,
        height,
        fps,
        duration_secs,
        has_audio,
    })
}

fn parse_secs(s: Option<&str>) -> Option<f64> {
    s?.parse::<f64>().ok().filter(|d| d.is_finite() && *d > 0.0)
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
