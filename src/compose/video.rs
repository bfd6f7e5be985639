use std::time::Duration;

use crate::assets::decode::decode_raster;
use crate::compose::effective_placement;
use crate::compose::image::ComposeOpts;
use crate::config::{Placement, WatermarkConfig};
use crate::encode::recorder::{EncodedVideo, StreamingRecorder};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::Fps;
use crate::foundation::error::{OverstampError, OverstampResult};
use crate::media::clock::{Pacing, RefreshClock};
use crate::media::codec::{CodecSupport, OutputFormat};
use crate::media::probe::{VideoSource, probe_video};
use crate::media::source::{FfmpegFrameSource, FrameSampler, FrameSource};
use crate::render::overlay::PreparedOverlay;
use crate::render::surface::Surface;

const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// Options for [`compose_video`].
#[derive(Clone, Debug, PartialEq)]
pub struct VideoComposeOpts {
    pub compose: ComposeOpts,
    /// Rate at which output frames are captured, independent of the source rate.
    pub capture_fps: Fps,
    pub pacing: Pacing,
    /// Longest wait for the first decoded frame.
    pub ready_timeout: Duration,
    /// Longest wait for any later frame while the loop needs it.
    pub stall_timeout: Duration,
    /// Decoded frames buffered between the decoder thread and the draw loop.
    pub channel_capacity: usize,
}

impl Default for VideoComposeOpts {
    fn default() -> Self {
        Self {
            compose: ComposeOpts::default(),
            capture_fps: Fps { num: 30, den: 1 },
            pacing: Pacing::Unthrottled,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            stall_timeout: DEFAULT_READY_TIMEOUT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl VideoComposeOpts {
    /// Defaults overridden by `OVERSTAMP_READY_TIMEOUT_MS` (also used as the stall timeout) and
    /// `OVERSTAMP_PACING` (`realtime` | `unthrottled`). Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(ms) = std::env::var("OVERSTAMP_READY_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
        {
            opts.ready_timeout = Duration::from_millis(ms);
            opts.stall_timeout = Duration::from_millis(ms);
        }
        if let Some(pacing) = std::env::var("OVERSTAMP_PACING")
            .ok()
            .and_then(|v| v.parse::<Pacing>().ok())
        {
            opts.pacing = pacing;
        }
        opts
    }

    pub fn with_compose(mut self, compose: ComposeOpts) -> Self {
        self.compose = compose;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = timeout;
        self
    }

    pub fn with_capture_fps(mut self, fps: Fps) -> Self {
        self.capture_fps = fps;
        self
    }
}

/// A finished watermarked video.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedVideo {
    pub video: EncodedVideo,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub frame_count: u64,
}

/// Burn `cfg`'s watermark into every frame of `source` and re-encode it.
///
/// Frames are captured at `opts.capture_fps`; each captured frame shows the latest source frame
/// whose presentation time is not after the capture tick. The output container and codec are the
/// first of [`OutputFormat::PREFERENCE`] the host ffmpeg supports.
///
/// Placement is clamped as in [`crate::compose_image`]. Cancellation is checked on every frame.
/// On any failure the decoder and recorder processes are terminated before returning.
#[tracing::instrument(level = "info", skip_all, fields(source = %source, preset = %cfg.id))]
pub fn compose_video(
    source: &VideoSource,
    cfg: &WatermarkConfig,
    opts: &VideoComposeOpts,
    cancel: &CancelToken,
) -> OverstampResult<ComposedVideo> {
    cancel.check("video compose")?;
    let info = probe_video(source)?;
    let canvas = info.canvas();
    tracing::debug!(
        width = info.width,
        height = info.height,
        fps = info.source_fps(),
        duration = ?info.duration_secs,
        has_audio = info.has_audio,
        expected_frames = ?info.duration_secs.map(|d| opts.capture_fps.secs_to_frames_ceil(d)),
        "probed source"
    );

    let mark = decode_raster(&cfg.image)?;
    let overlay = PreparedOverlay::new(&mark, opts.compose.filter)?;
    let placement = effective_placement(cfg);

    let format = CodecSupport::query()?.select(canvas)?;
    tracing::debug!(%format, encoder = format.encoder(), "selected output format");

    cancel.check("video compose")?;
    let decoder = FfmpegFrameSource::spawn(info.clone(), opts.channel_capacity)?;
    let mut recorder = StreamingRecorder::new(format);
    let frame_count = run_capture_loop(
        decoder,
        &mut recorder,
        &overlay,
        &placement,
        info.duration_secs,
        opts,
        cancel,
    )?;
    let video = recorder
        .take_output()
        .ok_or_else(|| OverstampError::encode("recorder finished without output"))?;
    tracing::info!(frames = frame_count, bytes = video.bytes.len(), "video composed");

    Ok(ComposedVideo {
        video,
        format,
        width: canvas.width,
        height: canvas.height,
        fps: opts.capture_fps,
        frame_count,
    })
}

/// Drive the draw loop: wait for the first source frame, then capture one watermarked frame per
/// clock tick until the source is exhausted or `duration_secs` is reached.
///
/// The source is closed on every path. The sink is ended on success and aborted on failure.
/// Returns the number of captured frames.
pub fn run_capture_loop<S: FrameSource, K: FrameSink>(
    source: S,
    sink: &mut K,
    overlay: &PreparedOverlay,
    placement: &Placement,
    duration_secs: Option<f64>,
    opts: &VideoComposeOpts,
    cancel: &CancelToken,
) -> OverstampResult<u64> {
    let mut sampler = FrameSampler::new(source, opts.stall_timeout);
    let captured = capture_frames(&mut sampler, sink, overlay, placement, duration_secs, opts, cancel);
    sampler.close();
    match captured {
        Ok(n) => {
            if let Err(e) = sink.end() {
                sink.abort();
                return Err(e);
            }
            Ok(n)
        }
        Err(e) => {
            tracing::debug!(error = %e, "capture loop failed");
            sink.abort();
            Err(e)
        }
    }
}

fn capture_frames<S: FrameSource, K: FrameSink>(
    sampler: &mut FrameSampler<S>,
    sink: &mut K,
    overlay: &PreparedOverlay,
    placement: &Placement,
    duration_secs: Option<f64>,
    opts: &VideoComposeOpts,
    cancel: &CancelToken,
) -> OverstampResult<u64> {
    let canvas = sampler.source().canvas();
    let mut surface = Surface::new(canvas)?;
    let filter = opts.compose.filter;
    let lut = (!filter.is_identity()).then(|| filter.lut());

    sampler.prime(opts.ready_timeout)?;
    cancel.check("video capture")?;

    // The recorder starts right before the first tick so the first captured frame is a drawn one.
    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps: opts.capture_fps,
    })?;
    let mut clock = RefreshClock::new(opts.capture_fps, opts.pacing);
    let block = opts.pacing == Pacing::Unthrottled;

    let mut captured = 0u64;
    loop {
        cancel.check("video capture")?;
        let (idx, t) = clock.tick();
        if duration_secs.is_some_and(|d| t + 1e-6 >= d) {
            break;
        }
        sampler.advance_to(t, block)?;
        if sampler.is_exhausted(t) {
            break;
        }
        let frame = sampler
            .current()
            .ok_or_else(|| OverstampError::decode("no source frame available"))?;
        surface.draw_base(&frame.rgba8_premul, frame.width, frame.height, lut.as_ref())?;
        surface.draw_overlay(overlay, placement, opts.compose.shadow)?;
        sink.push_frame(idx, &surface.to_frame())?;
        captured += 1;
    }
    Ok(captured)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/video.rs"]
mod tests;
