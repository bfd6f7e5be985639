//! Overstamp burns a user-positioned watermark into still images and videos.
//!
//! - [`PlacementSession`] turns pointer gestures over a preview into a resolution-independent
//!   [`Placement`].
//! - [`compose_image`] draws a [`WatermarkConfig`] onto a raster and returns a PNG.
//! - [`compose_video`] draws it onto every frame of a video and re-encodes the stream with the
//!   system `ffmpeg`.
//! - [`apply_image`] / [`apply_video`] are the caller-side wrappers that skip the `"none"` preset
//!   and fall back to the original asset on failure.
#![forbid(unsafe_code)]

mod assets;
mod compose;
mod config;
mod encode;
mod foundation;
mod media;
mod placement;
mod render;

pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{Affine, Canvas, Fps, FrameIndex, Point, Rect, Size, Vec2};
pub use crate::foundation::error::{OverstampError, OverstampResult};

pub use crate::assets::decode::{DecodedImage, decode_image, decode_raster};
pub use crate::assets::payload::{EncodedRaster, PNG_MIME, RasterPayload, SVG_MIME};

pub use crate::config::presets::{ActiveWatermark, PresetLibrary};
pub use crate::config::{
    DEFAULT_PRESET_NAME, NONE_ID, OPACITY_RANGE, Placement, ROTATION_RANGE, SCALE_RANGE,
    WatermarkConfig, X_RANGE, Y_RANGE, generate_preset_id,
};

pub use crate::placement::gesture::{Gesture, PlacementSession, PointerId, QuickPosition};
pub use crate::placement::preview::{
    AspectRatio, Hit, RESIZE_HANDLE_RADIUS, WatermarkBox, fit_preview,
};

pub use crate::render::filter::{FilterLut, StyleFilter};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::layout::OverlayLayout;
pub use crate::render::overlay::{DropShadow, PreparedOverlay};
pub use crate::render::surface::{MAX_SURFACE_DIM, Surface};

pub use crate::encode::recorder::{
    EncodedVideo, StreamingRecorder, ensure_parent_dir, is_ffmpeg_on_path,
};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};

pub use crate::media::clock::{Pacing, RefreshClock};
pub use crate::media::codec::{CodecSupport, OutputFormat};
pub use crate::media::probe::{VideoSource, VideoSourceInfo, is_ffprobe_on_path, probe_video};
pub use crate::media::source::{
    DecodedFrame, FfmpegFrameSource, FrameSampler, FrameSource, SourcePoll, SyntheticFrameSource,
};

pub use crate::compose::apply::{Applied, apply_image, apply_images, apply_video};
pub use crate::compose::image::{ComposeOpts, compose_image, compose_image_with, render_still};
pub use crate::compose::video::{
    ComposedVideo, VideoComposeOpts, compose_video, run_capture_loop,
};
