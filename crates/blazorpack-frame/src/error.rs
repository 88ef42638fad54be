/// Errors that can occur while scanning length-prefixed frames.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// The buffer ended before a length prefix or frame body was complete.
    #[error("truncated input at offset {offset} ({needed} more byte(s) required)")]
    TruncatedInput { offset: usize, needed: usize },

    /// The length prefix is not a valid 32-bit varint.
    #[error("malformed length prefix at offset {offset}: {reason}")]
    MalformedPrefix { offset: usize, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, FrameError>;
