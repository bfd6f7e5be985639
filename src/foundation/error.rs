/// Crate-wide result alias.
pub type OverstampResult<T> = Result<T, OverstampError>;

/// Errors produced by the placement model and the compositors.
#[derive(thiserror::Error, Debug)]
pub enum OverstampError {
    /// A source or watermark asset could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// No drawable surface could be acquired, or the final encode failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// The host has no compatible output codec/container.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An asset did not become ready within its grace window.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The caller cancelled a long-running operation.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Invalid caller input (options, editor state, preset records).
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverstampError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Return `true` for asset decode failures.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
