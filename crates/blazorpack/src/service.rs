//! Stateless editor-boundary operations.
//!
//! Every function is a pure function of its input bytes or text; nothing
//! is retained between calls, so the transport observer and the editor can
//! call in from separate threads without synchronization. Any "last known
//! good bytes" caching belongs to the editor adapter.

use blazorpack_codec::{decode_body, encode_frame, Value};
use blazorpack_frame::locate_frames;
use blazorpack_json::{from_json, to_json, JsonError};
use serde_json::Value as Json;
use tracing::{debug, trace};

use crate::error::Result;

/// Decode a raw buffer into per-frame value trees, frame grouping
/// preserved.
pub fn decode_message(buffer: &[u8]) -> Result<Vec<Vec<Value>>> {
    let scan = locate_frames(buffer)?;
    let mut frames = Vec::with_capacity(scan.frames.len());
    for span in &scan.frames {
        frames.push(decode_body(span.body(buffer))?);
    }
    trace!(bytes = buffer.len(), frames = frames.len(), "decoded message");
    Ok(frames)
}

/// Re-encode per-frame value trees into a framed buffer, one varint prefix
/// per frame. Byte-identical to the source for untouched trees.
pub fn encode_message(frames: &[Vec<Value>]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for values in frames {
        out.extend_from_slice(&encode_frame(values)?);
    }
    trace!(frames = frames.len(), bytes = out.len(), "encoded message");
    Ok(out)
}

/// The display path: every message in every frame, flattened into one JSON
/// array and pretty-printed for the editor.
pub fn unpack_to_json(buffer: &[u8]) -> Result<String> {
    let frames = decode_message(buffer)?;
    let messages: Vec<Json> = frames.iter().flatten().map(to_json).collect();
    let count = messages.len();
    let text = serde_json::to_string_pretty(&Json::Array(messages)).map_err(JsonError::from)?;
    debug!(bytes = buffer.len(), messages = count, "unpacked to JSON");
    Ok(text)
}

/// The save path: a JSON array of messages, each re-framed as its own
/// length-prefixed frame.
pub fn pack_from_json(text: &str) -> Result<Vec<u8>> {
    let json: Json = serde_json::from_str(text).map_err(JsonError::from)?;
    let messages = json.as_array().ok_or_else(|| JsonError::SchemaMismatch {
        detail: "top level must be a JSON array of messages".into(),
    })?;
    let mut out = Vec::new();
    for message in messages {
        let value = from_json(message)?;
        out.extend_from_slice(&encode_frame(std::slice::from_ref(&value))?);
    }
    debug!(messages = messages.len(), bytes = out.len(), "packed from JSON");
    Ok(out)
}

/// Boundary between framing metadata and the first payload byte.
pub fn body_offset(buffer: &[u8]) -> Result<usize> {
    Ok(blazorpack_frame::body_offset(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_types_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Value>();
        assert_send_sync::<crate::error::CodecError>();
    }

    #[test]
    fn top_level_json_must_be_an_array() {
        let err = pack_from_json("{\"$int\": \"1\"}").unwrap_err();
        assert!(matches!(err, crate::error::CodecError::Json(_)));
    }

    #[test]
    fn body_offset_matches_prefix_width() {
        assert_eq!(body_offset(&[0x01, 0xc0]).unwrap(), 1);
        let mut wire = vec![0xac, 0x02];
        wire.extend_from_slice(&[0xc0; 300]);
        assert_eq!(body_offset(&wire).unwrap(), 2);
    }
}
