use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{OverstampError, OverstampResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::media::probe::VideoSourceInfo;

/// Tolerance when comparing presentation times.
const PTS_EPSILON: f64 = 1e-6;

/// One decoded source frame in premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedFrame {
    /// 0-based decode order.
    pub index: u64,
    /// Presentation time in seconds from the start of the source.
    pub pts_secs: f64,
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

/// Result of asking a [`FrameSource`] for its next frame.
#[derive(Debug)]
pub enum SourcePoll {
    Frame(DecodedFrame),
    /// Nothing available yet.
    Pending,
    /// No further frames will arrive.
    Ended,
}

/// Producer of decoded frames in presentation order.
pub trait FrameSource: Send {
    /// Size of every produced frame.
    fn canvas(&self) -> Canvas;
    /// Nominal rate of the produced frames.
    fn fps(&self) -> Fps;
    /// Next frame. `wait: None` never blocks; `Some(d)` blocks for at most `d`.
    fn poll(&mut self, wait: Option<Duration>) -> OverstampResult<SourcePoll>;
    /// Stop decoding and release resources. Safe to call more than once.
    fn close(&mut self);
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn canvas(&self) -> Canvas {
        (**self).canvas()
    }

    fn fps(&self) -> Fps {
        (**self).fps()
    }

    fn poll(&mut self, wait: Option<Duration>) -> OverstampResult<SourcePoll> {
        (**self).poll(wait)
    }

    fn close(&mut self) {
        (**self).close();
    }
}

enum DecoderMsg {
    Frame(DecodedFrame),
    End,
    Failed(OverstampError),
}

/// Decodes a video with the system `ffmpeg` on a background thread.
///
/// Frames are resampled to the probed constant rate and size and handed over through a bounded
/// channel, so a slow consumer applies backpressure to the decoder.
pub struct FfmpegFrameSource {
    info: VideoSourceInfo,
    rx: Option<Receiver<DecoderMsg>>,
    child: Arc<Mutex<Option<Child>>>,
    reader: Option<JoinHandle<()>>,
    ended: bool,
}

impl FfmpegFrameSource {
    pub fn spawn(info: VideoSourceInfo, channel_capacity: usize) -> OverstampResult<Self> {
        let canvas = info.canvas();
        if canvas.is_empty() {
            return Err(OverstampError::decode("source video has zero size"));
        }
        let mut child = Command::new("ffmpeg")
            .args(["-hide_banner", "-v", "error", "-nostdin", "-i"])
            .arg(info.source.ffmpeg_input())
            .args(["-an", "-sn", "-vf"])
            .arg(format!(
                "fps={}/{},scale={}:{}",
                info.fps.num, info.fps.den, canvas.width, canvas.height
            ))
            .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                OverstampError::decode(format!(
                    "failed to spawn ffmpeg decoder (is it installed and on PATH?): {e}"
                ))
            })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| OverstampError::decode("failed to open ffmpeg decoder stdout"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| OverstampError::decode("failed to open ffmpeg decoder stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            let _ = stderr.read_to_end(&mut bytes);
            bytes
        });

        let child = Arc::new(Mutex::new(Some(child)));
        let (tx, rx) = std::sync::mpsc::sync_channel(channel_capacity.max(1));
        let reader = {
            let child = Arc::clone(&child);
            let fps = info.fps;
            std::thread::spawn(move || decode_loop(stdout, stderr_drain, tx, child, canvas, fps))
        };

        Ok(Self {
            info,
            rx: Some(rx),
            child,
            reader: Some(reader),
            ended: false,
        })
    }

    pub fn info(&self) -> &VideoSourceInfo {
        &self.info
    }
}

fn decode_loop(
    mut stdout: impl Read,
    stderr_drain: JoinHandle<Vec<u8>>,
    tx: SyncSender<DecoderMsg>,
    child: Arc<Mutex<Option<Child>>>,
    canvas: Canvas,
    fps: Fps,
) {
    let frame_len = canvas.rgba8_len();
    let mut index = 0u64;
    let mut read_error = None;
    loop {
        let mut buf = vec![0u8; frame_len];
        match stdout.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => {
                read_error = Some(e);
                break;
            }
        }
        premultiply_rgba8_in_place(&mut buf);
        let frame = DecodedFrame {
            index,
            pts_secs: fps.frames_to_secs(index),
            width: canvas.width,
            height: canvas.height,
            rgba8_premul: buf,
        };
        if tx.send(DecoderMsg::Frame(frame)).is_err() {
            // Consumer is gone.
            reap(&child, true);
            return;
        }
        index += 1;
    }

    let status = reap(&child, false);
    let stderr = stderr_drain.join().unwrap_or_default();
    let stderr = String::from_utf8_lossy(&stderr);
    let stderr = stderr.trim();

    let msg = if let Some(e) = read_error {
        DecoderMsg::Failed(OverstampError::decode(format!(
            "failed to read decoded frames: {e}"
        )))
    } else if index == 0 && !status.is_some_and(|s| s.success()) {
        DecoderMsg::Failed(OverstampError::decode(format!(
            "ffmpeg could not decode the source: {stderr}"
        )))
    } else {
        if !status.is_some_and(|s| s.success()) {
            tracing::warn!(frames = index, stderr, "ffmpeg decoder exited with an error");
        }
        DecoderMsg::End
    };
    let _ = tx.send(msg);
}

fn reap(child: &Mutex<Option<Child>>, kill: bool) -> Option<std::process::ExitStatus> {
    let mut child = child.lock().ok()?.take()?;
    if kill {
        let _ = child.kill();
    }
    child.wait().ok()
}

impl FrameSource for FfmpegFrameSource {
    fn canvas(&self) -> Canvas {
        self.info.canvas()
    }

    fn fps(&self) -> Fps {
        self.info.fps
    }

    fn poll(&mut self, wait: Option<Duration>) -> OverstampResult<SourcePoll> {
        if self.ended {
            return Ok(SourcePoll::Ended);
        }
        let Some(rx) = self.rx.as_ref() else {
            return Ok(SourcePoll::Ended);
        };
        let gone = || DecoderMsg::Failed(OverstampError::decode("decoder thread exited unexpectedly"));
        let msg = match wait {
            None => match rx.try_recv() {
                Ok(m) => m,
                Err(TryRecvError::Empty) => return Ok(SourcePoll::Pending),
                Err(TryRecvError::Disconnected) => gone(),
            },
            Some(d) => match rx.recv_timeout(d) {
                Ok(m) => m,
                Err(RecvTimeoutError::Timeout) => return Ok(SourcePoll::Pending),
                Err(RecvTimeoutError::Disconnected) => gone(),
            },
        };
        match msg {
            DecoderMsg::Frame(f) => Ok(SourcePoll::Frame(f)),
            DecoderMsg::End => {
                self.ended = true;
                Ok(SourcePoll::Ended)
            }
            DecoderMsg::Failed(e) => {
                self.ended = true;
                Err(e)
            }
        }
    }

    fn close(&mut self) {
        if let Ok(mut guard) = self.child.lock()
            && let Some(child) = guard.as_mut()
        {
            let _ = child.kill();
        }
        drop(self.rx.take());
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        self.ended = true;
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        self.close();
    }
}

/// Generated solid-color frames for tests and dry runs. Frame `i` is
/// `[i % 256, 255 - i % 256, 128, 255]`.
#[derive(Debug)]
pub struct SyntheticFrameSource {
    canvas: Canvas,
    fps: Fps,
    frame_count: u64,
    next: u64,
    ready_delay: Duration,
    stall_at: Option<u64>,
    started: Option<Instant>,
    closed: bool,
}

impl SyntheticFrameSource {
    pub fn new(canvas: Canvas, fps: Fps, frame_count: u64) -> Self {
        Self {
            canvas,
            fps,
            frame_count,
            next: 0,
            ready_delay: Duration::ZERO,
            stall_at: None,
            started: None,
            closed: false,
        }
    }

    /// Produce nothing until `delay` after the first poll.
    pub fn with_ready_delay(mut self, delay: Duration) -> Self {
        self.ready_delay = delay;
        self
    }

    /// Stop producing (without ending) once frame `idx` would be next.
    pub fn with_stall_at(mut self, idx: u64) -> Self {
        self.stall_at = Some(idx);
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn frame_color(idx: u64) -> [u8; 4] {
        let v = (idx % 256) as u8;
        [v, 255 - v, 128, 255]
    }
}

impl FrameSource for SyntheticFrameSource {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn fps(&self) -> Fps {
        self.fps
    }

    fn poll(&mut self, wait: Option<Duration>) -> OverstampResult<SourcePoll> {
        if self.closed || self.next >= self.frame_count {
            return Ok(SourcePoll::Ended);
        }
        let started = *self.started.get_or_insert_with(Instant::now);
        let ready_at = started + self.ready_delay;
        let now = Instant::now();
        if now < ready_at {
            let Some(wait) = wait else {
                return Ok(SourcePoll::Pending);
            };
            if now + wait < ready_at {
                std::thread::sleep(wait);
                return Ok(SourcePoll::Pending);
            }
            std::thread::sleep(ready_at - now);
        }
        if self.stall_at == Some(self.next) {
            if let Some(wait) = wait {
                std::thread::sleep(wait);
            }
            return Ok(SourcePoll::Pending);
        }

        let idx = self.next;
        self.next += 1;
        Ok(SourcePoll::Frame(DecodedFrame {
            index: idx,
            pts_secs: self.fps.frames_to_secs(idx),
            width: self.canvas.width,
            height: self.canvas.height,
            rgba8_premul: Self::frame_color(idx).repeat(self.canvas.rgba8_len() / 4),
        }))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Picks, for each capture tick, the source frame whose presentation time is the latest one not
/// after the tick.
pub struct FrameSampler<S> {
    source: S,
    current: Option<DecodedFrame>,
    lookahead: Option<DecodedFrame>,
    ended: bool,
    frame_duration: f64,
    stall_timeout: Duration,
    last_arrival: Option<Instant>,
}

impl<S: FrameSource> FrameSampler<S> {
    pub fn new(source: S, stall_timeout: Duration) -> Self {
        let frame_duration = source.fps().frame_duration_secs();
        Self {
            source,
            current: None,
            lookahead: None,
            ended: false,
            frame_duration,
            stall_timeout,
            last_arrival: None,
        }
    }

    /// Block until the first frame is decoded.
    pub fn prime(&mut self, ready_timeout: Duration) -> OverstampResult<()> {
        if self.current.is_some() {
            return Ok(());
        }
        match self.source.poll(Some(ready_timeout))? {
            SourcePoll::Frame(f) => {
                self.current = Some(f);
                self.last_arrival = Some(Instant::now());
                Ok(())
            }
            SourcePoll::Pending => Err(OverstampError::timeout(format!(
                "source produced no frame within {} ms",
                ready_timeout.as_millis()
            ))),
            SourcePoll::Ended => {
                self.ended = true;
                Err(OverstampError::decode("source ended before its first frame"))
            }
        }
    }

    /// Advance to the frame shown at `t`. With `block` the sampler waits (up to the stall
    /// timeout) for frames it has not seen yet; without it, it uses what has arrived and fails
    /// once no new frame has arrived for longer than the stall timeout.
    pub fn advance_to(&mut self, t: f64, block: bool) -> OverstampResult<()> {
        loop {
            if let Some(next) = &self.lookahead {
                if next.pts_secs <= t + PTS_EPSILON {
                    self.current = self.lookahead.take();
                    continue;
                }
                return Ok(());
            }
            if self.ended {
                return Ok(());
            }
            let wait = block.then_some(self.stall_timeout);
            match self.source.poll(wait)? {
                SourcePoll::Frame(f) => {
                    self.lookahead = Some(f);
                    self.last_arrival = Some(Instant::now());
                }
                SourcePoll::Ended => self.ended = true,
                SourcePoll::Pending if block => return Err(self.stalled()),
                SourcePoll::Pending => {
                    let waited = self.last_arrival.get_or_insert_with(Instant::now).elapsed();
                    if waited > self.stall_timeout {
                        return Err(self.stalled());
                    }
                    return Ok(());
                }
            }
        }
    }

    fn stalled(&self) -> OverstampError {
        OverstampError::timeout(format!(
            "source stalled for {} ms",
            self.stall_timeout.as_millis()
        ))
    }

    pub fn current(&self) -> Option<&DecodedFrame> {
        self.current.as_ref()
    }

    /// `true` once the source ended and the last frame's display interval is over at `t`.
    pub fn is_exhausted(&self, t: f64) -> bool {
        if !self.ended || self.lookahead.is_some() {
            return false;
        }
        match &self.current {
            Some(last) => t + PTS_EPSILON >= last.pts_secs + self.frame_duration,
            None => true,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn close(&mut self) {
        self.source.close();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/source.rs"]
mod tests;
