use std::io::{Read, Write as _};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{OverstampError, OverstampResult};
use crate::foundation::math::mul_div255_u16;
use crate::media::codec::OutputFormat;
use crate::render::frame::FrameRGBA;

const STDOUT_CHUNK: usize = 64 * 1024;

/// Finished video bytes with their MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedVideo {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Sink that streams frames into the system `ffmpeg` and collects the encoded container from its
/// stdout as a sequence of chunks.
///
/// MP4 output is fragmented so the muxer never needs to seek.
pub struct StreamingRecorder {
    format: OutputFormat,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<JoinHandle<std::io::Result<Vec<Vec<u8>>>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    output: Option<EncodedVideo>,
}

impl StreamingRecorder {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            output: None,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// The finished video, available once after a successful `end`.
    pub fn take_output(&mut self) -> Option<EncodedVideo> {
        self.output.take()
    }

    fn kill_child(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(h) = self.stdout_drain.take() {
            let _ = h.join();
        }
        if let Some(h) = self.stderr_drain.take() {
            let _ = h.join();
        }
        self.cfg = None;
    }
}

impl Drop for StreamingRecorder {
    fn drop(&mut self) {
        self.kill_child();
    }
}

/// ffmpeg arguments for streaming `cfg`-sized raw RGBA frames to `format` on stdout.
pub(crate) fn recorder_args(cfg: &SinkConfig, format: OutputFormat) -> Vec<String> {
    let mut args: Vec<String> = [
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect();
    args.push(format!("{}x{}", cfg.width, cfg.height));
    // For rawvideo input, `-r` before `-i` sets the input frame rate.
    args.push("-r".to_owned());
    args.push(format!("{}/{}", cfg.fps.num, cfg.fps.den));
    args.extend(["-i", "pipe:0", "-an", "-c:v", format.encoder()].map(str::to_owned));
    args.extend(format.codec_args().iter().map(|s| (*s).to_owned()));
    args.extend(["-pix_fmt", "yuv420p", "-f", format.muxer(), "pipe:1"].map(str::to_owned));
    args
}

impl FrameSink for StreamingRecorder {
    fn begin(&mut self, cfg: SinkConfig) -> OverstampResult<()> {
        if self.child.is_some() {
            return Err(OverstampError::encode("recorder already started"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(OverstampError::validation(
                "recorder width/height must be non-zero",
            ));
        }
        if self.format.requires_even_dims()
            && (!cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2))
        {
            return Err(OverstampError::validation(format!(
                "{} output requires even width/height, got {}x{}",
                self.format.encoder(),
                cfg.width,
                cfg.height
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(recorder_args(&cfg, self.format))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            OverstampError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| OverstampError::encode("failed to open ffmpeg stdin"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| OverstampError::encode("failed to open ffmpeg stdout"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| OverstampError::encode("failed to open ffmpeg stderr"))?;

        let stdout_drain = std::thread::spawn(move || {
            let mut chunks = Vec::new();
            loop {
                let mut buf = vec![0u8; STDOUT_CHUNK];
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                buf.truncate(n);
                chunks.push(buf);
            }
            Ok(chunks)
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            format = %self.format,
            width = cfg.width,
            height = cfg.height,
            "recorder started"
        );

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.output = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> OverstampResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| OverstampError::encode("recorder not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(OverstampError::encode(
                "recorder received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(OverstampError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(OverstampError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque_rgba8(&mut self.scratch, &frame.data, frame.premultiplied)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(OverstampError::encode("recorder is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            OverstampError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> OverstampResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| OverstampError::encode("recorder not started"))?;

        let status = child
            .wait()
            .map_err(|e| OverstampError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let chunks = match self.stdout_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| OverstampError::encode("ffmpeg stdout drain thread panicked"))?
                .map_err(|e| OverstampError::encode(format!("ffmpeg stdout read failed: {e}")))?,
            None => Vec::new(),
        };
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| OverstampError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| OverstampError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(OverstampError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let bytes = chunks.concat();
        if bytes.is_empty() {
            return Err(OverstampError::encode("ffmpeg produced no output"));
        }
        tracing::debug!(chunks = chunks.len(), bytes = bytes.len(), "recorder finished");

        self.output = Some(EncodedVideo {
            mime: self.format.mime().to_owned(),
            bytes,
        });
        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        tracing::debug!("recorder aborted");
        self.kill_child();
        self.output = None;
    }
}

/// Flatten RGBA8 over opaque black. Video output carries no alpha.
fn flatten_to_opaque_rgba8(dst: &mut [u8], src: &[u8], src_is_premul: bool) -> OverstampResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(OverstampError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        for c in 0..3 {
            d[c] = if src_is_premul {
                s[c]
            } else {
                mul_div255_u16(u16::from(s[c]), a) as u8
            };
        }
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> OverstampResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/recorder.rs"]
mod tests;
