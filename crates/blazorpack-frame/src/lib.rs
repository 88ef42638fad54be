//! Length-prefixed frame scanning for BlazorPack streams.
//!
//! Blazor Server concatenates one or more frames per WebSocket payload.
//! Every frame is a little-endian base-128 varint length followed by
//! exactly that many body bytes. This crate finds those boundaries and
//! re-derives prefixes on the way back out; it never interprets body bytes.

pub mod error;
pub mod scanner;
pub mod varint;

pub use error::{FrameError, Result};
pub use scanner::{body_offset, locate_frames, FrameScan, FrameSpan};
pub use varint::{decode_prefix, encode_prefix, MAX_PREFIX_SIZE};
