//! Video input side: metadata probe, frame decoding, codec detection and capture pacing.

pub(crate) mod clock;
pub(crate) mod codec;
pub(crate) mod probe;
pub(crate) mod source;
