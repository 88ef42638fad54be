//! Value/JSON bridge: the human-editable face of a BlazorPack value tree.
//!
//! JSON cannot natively express everything BlazorPack carries: binary
//! payloads, non-UTF-8 strings, full 64-bit integers, non-finite floats,
//! maps with non-string or duplicate keys, extension values. Each of those
//! maps to a single-key `$`-tagged object with a reversible payload, so
//! the reverse direction is never ambiguous against plain data. Everything
//! else maps to its native JSON form.

pub mod bridge;
pub mod error;

pub use bridge::{from_json, from_json_text, to_json, to_json_text};
pub use error::{JsonError, Result};
