use crate::error::{FrameError, Result};
use crate::varint::decode_prefix;

/// Byte span of one frame body within a scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpan {
    /// Offset of the first body byte.
    pub offset: usize,
    /// Body length in bytes.
    pub length: usize,
}

impl FrameSpan {
    /// Slice the frame body out of the buffer it was scanned from.
    pub fn body<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.offset..self.offset + self.length]
    }
}

/// Result of scanning a buffer for length-prefixed frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameScan {
    /// Body spans in wire order.
    pub frames: Vec<FrameSpan>,
    /// Body offset of the first frame: the boundary between framing
    /// metadata and the first payload byte. Zero for an empty buffer.
    pub body_offset: usize,
}

/// Locate every length-prefixed frame in `buf`.
///
/// Decodes a varint prefix, skips the declared body, and repeats until the
/// buffer is exhausted. A buffer ending exactly on a frame boundary yields
/// the accumulated list; a body shorter than its declared length is a
/// [`FrameError::TruncatedInput`] reported at the shortfall offset.
pub fn locate_frames(buf: &[u8]) -> Result<FrameScan> {
    let mut frames = Vec::new();
    let mut pos = 0usize;
    while pos < buf.len() {
        let (length, width) = decode_prefix(buf, pos)?;
        let length = length as usize;
        let body = pos + width;
        let available = buf.len() - body;
        if length > available {
            return Err(FrameError::TruncatedInput {
                offset: buf.len(),
                needed: length - available,
            });
        }
        frames.push(FrameSpan {
            offset: body,
            length,
        });
        pos = body + length;
    }
    Ok(FrameScan {
        body_offset: frames.first().map_or(0, |f| f.offset),
        frames,
    })
}

/// Body offset of the first frame in `buf`: the width of its length prefix.
pub fn body_offset(buf: &[u8]) -> Result<usize> {
    let (_, width) = decode_prefix(buf, 0)?;
    Ok(width)
}
