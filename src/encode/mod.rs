//! Frame sinks: the in-memory capture used by tests and the streaming ffmpeg recorder.

pub(crate) mod recorder;
pub(crate) mod sink;
