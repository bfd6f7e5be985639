use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::OverstampError;

/// How the capture loop relates to wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    /// Run as fast as decode and encode allow. Every tick waits for the source frames it needs.
    #[default]
    Unthrottled,
    /// Each tick waits for its wall-clock deadline and samples whatever the decoder has delivered
    /// by then, like capturing live playback.
    Realtime,
}

impl Pacing {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unthrottled => "unthrottled",
            Self::Realtime => "realtime",
        }
    }
}

impl FromStr for Pacing {
    type Err = OverstampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unthrottled" => Ok(Self::Unthrottled),
            "realtime" => Ok(Self::Realtime),
            other => Err(OverstampError::validation(format!(
                "unknown pacing '{other}' (expected 'realtime' or 'unthrottled')"
            ))),
        }
    }
}

/// Capture tick generator at a fixed refresh rate.
#[derive(Debug)]
pub struct RefreshClock {
    fps: Fps,
    pacing: Pacing,
    started: Option<Instant>,
    next: u64,
}

impl RefreshClock {
    pub fn new(fps: Fps, pacing: Pacing) -> Self {
        Self {
            fps,
            pacing,
            started: None,
            next: 0,
        }
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Presentation time of tick `idx` in seconds.
    pub fn tick_time(&self, idx: FrameIndex) -> f64 {
        self.fps.frames_to_secs(idx.0)
    }

    /// Advance to the next tick. Under [`Pacing::Realtime`] this sleeps until the tick's deadline;
    /// the first call anchors the clock.
    pub fn tick(&mut self) -> (FrameIndex, f64) {
        let idx = FrameIndex(self.next);
        self.next += 1;
        let t = self.tick_time(idx);
        if self.pacing == Pacing::Realtime {
            let started = *self.started.get_or_insert_with(Instant::now);
            let deadline = started + Duration::from_secs_f64(t);
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            }
        }
        (idx, t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/clock.rs"]
mod tests;
