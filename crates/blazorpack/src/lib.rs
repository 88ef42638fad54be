//! Inspect and edit BlazorPack traffic as JSON.
//!
//! BlazorPack is the MessagePack-derived encoding Blazor Server uses for
//! hub invocations, carried as length-prefixed frames inside WebSocket
//! payloads. This crate turns a raw payload into editable JSON and edited
//! JSON back into framed bytes, without ever mutating what the operator
//! did not touch.
//!
//! ```
//! // One frame: a 1-element array holding the string "abc".
//! let wire = [0x05, 0x91, 0xa3, 0x61, 0x62, 0x63];
//!
//! let text = blazorpack::unpack_to_json(&wire).unwrap();
//! let shown: serde_json::Value = serde_json::from_str(&text).unwrap();
//! assert_eq!(shown, serde_json::json!([["abc"]]));
//!
//! // Saving the unedited text reproduces the original bytes.
//! assert_eq!(blazorpack::pack_from_json(&text).unwrap(), wire);
//! ```
//!
//! # Crate Structure
//!
//! - [`frame`]: varint length prefix and frame-boundary scanning
//! - [`codec`]: the value tree, decoder, and encoder
//! - [`json`]: the Value/JSON bridge with its `$`-tagging scheme
//! - [`service`]: stateless editor-boundary operations

/// Re-export frame types.
pub mod frame {
    pub use blazorpack_frame::*;
}

/// Re-export codec types.
pub mod codec {
    pub use blazorpack_codec::*;
}

/// Re-export JSON bridge types.
pub mod json {
    pub use blazorpack_json::*;
}

pub mod error;
pub mod service;

pub use error::CodecError;
pub use service::{body_offset, decode_message, encode_message, pack_from_json, unpack_to_json};
