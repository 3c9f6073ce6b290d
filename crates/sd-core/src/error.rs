//! Error taxonomy shared by every SD crate.
//!
//! All conditions are local to the call that raised them: a failed call
//! leaves buffers, pen, and viewport exactly as they were.

/// A recoverable drawing or query failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrawError {
    /// Negative radius or size, malformed polygon, empty range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The asset loader could not produce pixel data for a locator.
    #[error("cannot decode image {locator:?}: {reason}")]
    DecodeFailure { locator: String, reason: String },

    /// `next_key_typed` was called with no pending characters.
    #[error("no typed key is pending")]
    EmptyQueue,

    /// Persisting a buffer (or spawning the input thread) failed.
    #[error("i/o failure: {0}")]
    IoFailure(String),
}

impl DrawError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn decode(locator: impl Into<String>, reason: impl ToString) -> Self {
        Self::DecodeFailure {
            locator: locator.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for DrawError {
    fn from(err: std::io::Error) -> Self {
        Self::IoFailure(err.to_string())
    }
}
