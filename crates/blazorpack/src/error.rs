use blazorpack_codec::{DecodeError, EncodeError};
use blazorpack_frame::FrameError;
use blazorpack_json::JsonError;

/// Any error a service call can return.
///
/// Calls either produce a complete valid result or one of these; partial
/// output is never returned.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Json(#[from] JsonError),
}

pub type Result<T> = std::result::Result<T, CodecError>;
