use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::OverstampResult;
use crate::render::frame::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    /// Capture rate of the pushed frames.
    pub fps: Fps,
}

/// Consumer of captured frames.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order. After a failure the driver
/// calls `abort` instead of `end`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> OverstampResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> OverstampResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> OverstampResult<()>;
    /// Release resources without producing output.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    retain_pixels: bool,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    indices: Vec<FrameIndex>,
    last: Option<FrameRGBA>,
    ended: bool,
    aborted: bool,
}

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySink {
    /// Keep every pushed frame.
    pub fn new() -> Self {
        Self {
            cfg: None,
            retain_pixels: true,
            frames: Vec::new(),
            indices: Vec::new(),
            last: None,
            ended: false,
            aborted: false,
        }
    }

    /// Keep frame indices and only the most recent frame's pixels.
    pub fn last_frame_only() -> Self {
        Self {
            retain_pixels: false,
            ..Self::new()
        }
    }

    pub fn indices(&self) -> &[FrameIndex] {
        &self.indices
    }

    pub fn frame_count(&self) -> usize {
        self.indices.len()
    }

    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.last.as_ref()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames in capture order. Empty for [`InMemorySink::last_frame_only`].
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> OverstampResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.indices.clear();
        self.last = None;
        self.ended = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> OverstampResult<()> {
        self.indices.push(idx);
        if self.retain_pixels {
            self.frames.push((idx, frame.clone()));
        }
        self.last = Some(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> OverstampResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
